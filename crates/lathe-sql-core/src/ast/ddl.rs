//! DDL and utility statement AST.

use super::comments::Comments;
use super::expr::{QualifiedName, TypeValue, ValueExpr};
use super::select::{OrderDirection, SelectQuery};
use super::Statement;

/// A column definition in CREATE TABLE.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Declared type.
    pub data_type: TypeValue,
    /// NOT NULL.
    pub not_null: bool,
    /// DEFAULT expression.
    pub default: Option<ValueExpr>,
    /// Inline PRIMARY KEY.
    pub primary_key: bool,
    /// Inline UNIQUE.
    pub unique: bool,
}

/// A table-level constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum TableConstraint {
    PrimaryKey(Vec<String>),
    Unique(Vec<String>),
    ForeignKey {
        columns: Vec<String>,
        references: QualifiedName,
        ref_columns: Vec<String>,
    },
    Check(ValueExpr),
}

/// CREATE TABLE.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableQuery {
    /// Header comments.
    pub comments: Comments,
    /// Table name.
    pub name: QualifiedName,
    /// IF NOT EXISTS.
    pub if_not_exists: bool,
    /// TEMPORARY.
    pub temporary: bool,
    /// Column definitions.
    pub columns: Vec<ColumnDef>,
    /// Table constraints, optionally named.
    pub constraints: Vec<(Option<String>, TableConstraint)>,
    /// `CREATE TABLE … AS SELECT` body.
    pub as_query: Option<Box<SelectQuery>>,
}

/// One indexed column.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexColumn {
    /// Indexed expression (usually a bare column).
    pub expr: ValueExpr,
    /// Sort direction.
    pub direction: Option<OrderDirection>,
}

/// CREATE INDEX.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexQuery {
    /// Header comments.
    pub comments: Comments,
    /// UNIQUE.
    pub unique: bool,
    /// Index name, absent for auto-named indexes.
    pub name: Option<String>,
    /// IF NOT EXISTS.
    pub if_not_exists: bool,
    /// Indexed table.
    pub table: QualifiedName,
    /// Indexed columns/expressions.
    pub columns: Vec<IndexColumn>,
    /// Partial-index predicate.
    pub where_clause: Option<ValueExpr>,
}

/// CREATE SCHEMA.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateSchemaQuery {
    /// Header comments.
    pub comments: Comments,
    /// Schema name.
    pub name: String,
    /// IF NOT EXISTS.
    pub if_not_exists: bool,
}

/// CASCADE/RESTRICT on drops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropBehavior {
    Cascade,
    Restrict,
}

/// What a DROP statement removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropObjectKind {
    Table,
    Index,
    Schema,
}

impl DropObjectKind {
    /// Keyword spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Index => "index",
            Self::Schema => "schema",
        }
    }
}

/// DROP TABLE/INDEX/SCHEMA.
#[derive(Debug, Clone, PartialEq)]
pub struct DropObjectQuery {
    /// Header comments.
    pub comments: Comments,
    /// Object kind.
    pub kind: DropObjectKind,
    /// IF EXISTS.
    pub if_exists: bool,
    /// Dropped names.
    pub names: Vec<QualifiedName>,
    /// CASCADE/RESTRICT.
    pub behavior: Option<DropBehavior>,
}

/// One ALTER TABLE action.
#[derive(Debug, Clone, PartialEq)]
pub enum AlterTableAction {
    /// `ADD [CONSTRAINT [IF NOT EXISTS] name] constraint [NOT VALID]`.
    AddConstraint {
        name: Option<String>,
        if_not_exists: bool,
        constraint: TableConstraint,
        not_valid: bool,
    },
    /// `DROP CONSTRAINT [IF EXISTS] name [CASCADE|RESTRICT]`.
    DropConstraint {
        if_exists: bool,
        name: String,
        behavior: Option<DropBehavior>,
    },
    /// `DROP COLUMN [IF EXISTS] col [CASCADE|RESTRICT]`.
    DropColumn {
        if_exists: bool,
        name: String,
        behavior: Option<DropBehavior>,
    },
    /// `ALTER COLUMN col SET DEFAULT expr`.
    AlterColumnSetDefault { column: String, default: ValueExpr },
    /// `ALTER COLUMN col DROP DEFAULT`.
    AlterColumnDropDefault { column: String },
}

/// ALTER TABLE with its action list.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterTableQuery {
    /// Header comments.
    pub comments: Comments,
    /// Altered table.
    pub name: QualifiedName,
    /// Actions, in order.
    pub actions: Vec<AlterTableAction>,
}

/// What a COMMENT ON statement annotates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentTargetKind {
    Table,
    Column,
    Index,
    Schema,
}

impl CommentTargetKind {
    /// Keyword spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Column => "column",
            Self::Index => "index",
            Self::Schema => "schema",
        }
    }
}

/// COMMENT ON.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentOnQuery {
    /// Header comments.
    pub comments: Comments,
    /// Annotated object kind.
    pub target_kind: CommentTargetKind,
    /// Annotated object.
    pub target: QualifiedName,
    /// Comment text literal, or NULL to clear.
    pub text: Option<String>,
}

/// EXPLAIN with its options and inner statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplainQuery {
    /// Header comments.
    pub comments: Comments,
    /// ANALYZE.
    pub analyze: bool,
    /// VERBOSE.
    pub verbose: bool,
    /// The explained statement.
    pub statement: Box<Statement>,
}

/// VACUUM.
#[derive(Debug, Clone, PartialEq)]
pub struct VacuumQuery {
    /// Header comments.
    pub comments: Comments,
    /// FULL.
    pub full: bool,
    /// ANALYZE.
    pub analyze: bool,
    /// Target tables; empty vacuums everything.
    pub tables: Vec<QualifiedName>,
}

/// CHECKPOINT.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointQuery {
    /// Header comments.
    pub comments: Comments,
}
