//! AST types: statements, clauses, and value expressions.

mod comments;
mod ddl;
mod dml;
mod expr;
mod select;

pub use comments::Comments;
pub use ddl::{
    AlterTableAction, AlterTableQuery, CheckpointQuery, ColumnDef, CommentOnQuery,
    CommentTargetKind, CreateIndexQuery, CreateSchemaQuery, CreateTableQuery, DropBehavior,
    DropObjectKind, DropObjectQuery, ExplainQuery, IndexColumn, TableConstraint, VacuumQuery,
};
pub use dml::{
    DeleteQuery, InsertQuery, InsertSource, MergeAction, MergeMatchKind, MergeQuery,
    MergeWhenClause, SetItem, UpdateQuery,
};
pub use expr::{
    ArrayIndexExpression, ArraySliceExpression, BetweenExpression, BinaryExpression,
    CaseExpression, CaseKeyValuePair, CastExpression, CastForm, ColumnReference, FunctionArguments,
    FunctionCall, LiteralValue, OverClause, ParameterExpression, QualifiedName,
    StringSpecifierExpression, SwitchCaseArgument, TrimSide, TypeValue, UnaryExpression, ValueExpr,
    WindowFrameBoundary, WindowFrameSpec, WindowFrameUnit,
};
pub use select::{
    BinarySelectQuery, CommonTable, CteBody, Distinct, FetchClause, FetchKind, ForClause,
    FromClause, GroupByClause, HavingClause, JoinClause, JoinCondition, JoinType, LockMode,
    NullsOrder, OrderByClause, OrderByItem, OrderDirection, SelectClause, SelectItem, SelectQuery,
    SetOpKind, SetOperator, SimpleSelectQuery, SourceExpression, TableAlias, TableSource,
    ValuesQuery, WhereClause, WindowClause, WindowDefinition, WithClause,
};

/// Any parsed SQL statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(SelectQuery),
    Insert(InsertQuery),
    Update(UpdateQuery),
    Delete(DeleteQuery),
    Merge(MergeQuery),
    CreateTable(CreateTableQuery),
    CreateIndex(CreateIndexQuery),
    CreateSchema(CreateSchemaQuery),
    Drop(DropObjectQuery),
    AlterTable(AlterTableQuery),
    CommentOn(CommentOnQuery),
    Explain(ExplainQuery),
    Vacuum(VacuumQuery),
    Checkpoint(CheckpointQuery),
}

impl Statement {
    /// Header comments of the statement.
    #[must_use]
    pub const fn comments(&self) -> &Comments {
        match self {
            Self::Select(q) => q.comments(),
            Self::Insert(q) => &q.comments,
            Self::Update(q) => &q.comments,
            Self::Delete(q) => &q.comments,
            Self::Merge(q) => &q.comments,
            Self::CreateTable(q) => &q.comments,
            Self::CreateIndex(q) => &q.comments,
            Self::CreateSchema(q) => &q.comments,
            Self::Drop(q) => &q.comments,
            Self::AlterTable(q) => &q.comments,
            Self::CommentOn(q) => &q.comments,
            Self::Explain(q) => &q.comments,
            Self::Vacuum(q) => &q.comments,
            Self::Checkpoint(q) => &q.comments,
        }
    }
}
