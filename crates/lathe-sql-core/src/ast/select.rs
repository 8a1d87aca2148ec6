//! SELECT query AST: statement variants and clause types.

use super::comments::Comments;
use super::dml::{DeleteQuery, InsertQuery, MergeQuery, UpdateQuery};
use super::expr::{FunctionCall, OverClause, QualifiedName, ValueExpr};

/// Any SELECT-shaped query.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectQuery {
    /// A plain SELECT.
    Simple(SimpleSelectQuery),
    /// UNION/INTERSECT/EXCEPT.
    Binary(BinarySelectQuery),
    /// A bare VALUES list.
    Values(ValuesQuery),
}

impl SelectQuery {
    /// Header comments of the outermost statement.
    #[must_use]
    pub const fn comments(&self) -> &Comments {
        match self {
            Self::Simple(q) => &q.comments,
            Self::Binary(q) => &q.comments,
            Self::Values(q) => &q.comments,
        }
    }

    /// Mutable header comments.
    pub fn comments_mut(&mut self) -> &mut Comments {
        match self {
            Self::Simple(q) => &mut q.comments,
            Self::Binary(q) => &mut q.comments,
            Self::Values(q) => &mut q.comments,
        }
    }

    /// The WITH clause, when this is a simple query.
    #[must_use]
    pub const fn with_clause(&self) -> Option<&WithClause> {
        match self {
            Self::Simple(q) => q.with.as_ref(),
            _ => None,
        }
    }

    /// Returns the simple variant, if that is what this is.
    #[must_use]
    pub const fn as_simple(&self) -> Option<&SimpleSelectQuery> {
        match self {
            Self::Simple(q) => Some(q),
            _ => None,
        }
    }

    /// Mutable access to the simple variant.
    pub fn as_simple_mut(&mut self) -> Option<&mut SimpleSelectQuery> {
        match self {
            Self::Simple(q) => Some(q),
            _ => None,
        }
    }
}

/// A plain SELECT statement.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimpleSelectQuery {
    /// Header comments.
    pub comments: Comments,
    /// WITH clause.
    pub with: Option<WithClause>,
    /// SELECT list.
    pub select: SelectClause,
    /// FROM clause with joins.
    pub from: Option<FromClause>,
    /// WHERE clause.
    pub where_clause: Option<WhereClause>,
    /// GROUP BY clause.
    pub group_by: Option<GroupByClause>,
    /// HAVING clause. Only legal when `group_by` is present.
    pub having: Option<HavingClause>,
    /// WINDOW clause.
    pub window: Option<WindowClause>,
    /// ORDER BY clause.
    pub order_by: Option<OrderByClause>,
    /// LIMIT count.
    pub limit: Option<ValueExpr>,
    /// OFFSET count.
    pub offset: Option<ValueExpr>,
    /// FETCH clause.
    pub fetch: Option<FetchClause>,
    /// FOR UPDATE/SHARE locking clause.
    pub for_clause: Option<ForClause>,
}

impl SimpleSelectQuery {
    /// Builds a `SELECT <items>` with no other clauses.
    #[must_use]
    pub fn from_items(items: Vec<SelectItem>) -> Self {
        Self {
            select: SelectClause {
                comments: Comments::new(),
                distinct: None,
                items,
            },
            ..Self::default()
        }
    }

    /// Builds `SELECT * FROM <source>`.
    #[must_use]
    pub fn star_from(source: SourceExpression) -> Self {
        let mut query = Self::from_items(vec![SelectItem::new(ValueExpr::column("*"))]);
        query.from = Some(FromClause::new(source));
        query
    }
}

/// UNION/INTERSECT/EXCEPT of two queries.
#[derive(Debug, Clone, PartialEq)]
pub struct BinarySelectQuery {
    /// Header comments.
    pub comments: Comments,
    /// Left branch.
    pub left: Box<SelectQuery>,
    /// The set operator.
    pub operator: SetOperator,
    /// Right branch.
    pub right: Box<SelectQuery>,
}

/// A set operator with its ALL flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetOperator {
    /// UNION, INTERSECT, or EXCEPT.
    pub kind: SetOpKind,
    /// Whether ALL was given.
    pub all: bool,
}

impl SetOperator {
    /// Lowercased keyword phrase (`union all`, `except`, …).
    #[must_use]
    pub fn phrase(&self) -> String {
        let base = match self.kind {
            SetOpKind::Union => "union",
            SetOpKind::Intersect => "intersect",
            SetOpKind::Except => "except",
        };
        if self.all {
            format!("{base} all")
        } else {
            base.to_string()
        }
    }
}

/// Set operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOpKind {
    Union,
    Intersect,
    Except,
}

/// A bare VALUES query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValuesQuery {
    /// Header comments.
    pub comments: Comments,
    /// Row tuples.
    pub rows: Vec<Vec<ValueExpr>>,
    /// Column aliases assigned by context, required for conversion to
    /// a simple query.
    pub column_aliases: Option<Vec<String>>,
}

/// WITH clause: ordered CTE definitions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WithClause {
    /// Clause comments.
    pub comments: Comments,
    /// RECURSIVE flag.
    pub recursive: bool,
    /// CTE definitions in insertion order.
    pub tables: Vec<CommonTable>,
}

/// One CTE definition.
#[derive(Debug, Clone, PartialEq)]
pub struct CommonTable {
    /// Comments on the definition.
    pub comments: Comments,
    /// CTE alias with optional column list.
    pub alias: TableAlias,
    /// `MATERIALIZED` (`Some(true)`), `NOT MATERIALIZED`
    /// (`Some(false)`), or unspecified (`None`).
    pub materialized: Option<bool>,
    /// Body query.
    pub body: CteBody,
}

impl CommonTable {
    /// Creates a CTE over a select body.
    #[must_use]
    pub fn new(name: impl Into<String>, query: SelectQuery) -> Self {
        Self {
            comments: Comments::new(),
            alias: TableAlias::new(name),
            materialized: None,
            body: CteBody::Select(Box::new(query)),
        }
    }

    /// The CTE name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.alias.name
    }
}

/// Body of a CTE: a select or a writable statement.
#[derive(Debug, Clone, PartialEq)]
pub enum CteBody {
    Select(Box<SelectQuery>),
    Insert(Box<InsertQuery>),
    Update(Box<UpdateQuery>),
    Delete(Box<DeleteQuery>),
    Merge(Box<MergeQuery>),
}

impl CteBody {
    /// The select body, when this CTE is readable.
    #[must_use]
    pub fn as_select(&self) -> Option<&SelectQuery> {
        match self {
            Self::Select(q) => Some(q.as_ref()),
            _ => None,
        }
    }

    /// Mutable select body.
    pub fn as_select_mut(&mut self) -> Option<&mut SelectQuery> {
        match self {
            Self::Select(q) => Some(q.as_mut()),
            _ => None,
        }
    }
}

/// SELECT list with optional DISTINCT.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectClause {
    /// Clause comments.
    pub comments: Comments,
    /// DISTINCT / DISTINCT ON.
    pub distinct: Option<Distinct>,
    /// Projection items, in order.
    pub items: Vec<SelectItem>,
}

/// DISTINCT forms.
#[derive(Debug, Clone, PartialEq)]
pub enum Distinct {
    /// Plain DISTINCT.
    Distinct,
    /// `DISTINCT ON (exprs)`.
    DistinctOn(Vec<ValueExpr>),
}

/// One projection item with an optional alias.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    /// Item comments.
    pub comments: Comments,
    /// The projected expression.
    pub expr: ValueExpr,
    /// Alias, a valid identifier when present.
    pub alias: Option<String>,
}

impl SelectItem {
    /// An unaliased item.
    #[must_use]
    pub fn new(expr: ValueExpr) -> Self {
        Self {
            comments: Comments::new(),
            expr,
            alias: None,
        }
    }

    /// An aliased item.
    #[must_use]
    pub fn aliased(expr: ValueExpr, alias: impl Into<String>) -> Self {
        Self {
            comments: Comments::new(),
            expr,
            alias: Some(alias.into()),
        }
    }

    /// The name this item projects as: the alias when present, else the
    /// column name for plain column references.
    #[must_use]
    pub fn output_name(&self) -> Option<&str> {
        if let Some(alias) = &self.alias {
            return Some(alias);
        }
        self.expr.as_column().map(|c| c.name.as_str())
    }
}

/// Alias with an optional column list, used by sources and CTEs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableAlias {
    /// Alias name.
    pub name: String,
    /// Optional column aliases.
    pub columns: Option<Vec<String>>,
}

impl TableAlias {
    /// A bare alias.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: None,
        }
    }

    /// An alias with a column list.
    #[must_use]
    pub fn with_columns(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns: Some(columns),
        }
    }
}

/// What a FROM/JOIN item reads from.
#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    /// A named table or CTE reference.
    Table(QualifiedName),
    /// A parenthesized subquery.
    SubQuery(Box<SelectQuery>),
    /// A set-returning function call.
    Function(Box<FunctionCall>),
    /// An inline VALUES list.
    Values(Box<ValuesQuery>),
}

/// A source with its alias.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceExpression {
    /// The underlying source.
    pub source: TableSource,
    /// Optional alias.
    pub alias: Option<TableAlias>,
}

impl SourceExpression {
    /// A named table source.
    #[must_use]
    pub fn table(name: QualifiedName) -> Self {
        Self {
            source: TableSource::Table(name),
            alias: None,
        }
    }

    /// A subquery source with an alias.
    #[must_use]
    pub fn subquery(query: SelectQuery, alias: impl Into<String>) -> Self {
        Self {
            source: TableSource::SubQuery(Box::new(query)),
            alias: Some(TableAlias::new(alias)),
        }
    }

    /// The table name when this is a named source.
    #[must_use]
    pub const fn table_name(&self) -> Option<&QualifiedName> {
        match &self.source {
            TableSource::Table(name) => Some(name),
            _ => None,
        }
    }

    /// The name this source is known by in the enclosing query.
    #[must_use]
    pub fn effective_name(&self) -> Option<&str> {
        if let Some(alias) = &self.alias {
            return Some(&alias.name);
        }
        self.table_name().map(|n| n.name.as_str())
    }
}

/// FROM clause: one source plus joins.
#[derive(Debug, Clone, PartialEq)]
pub struct FromClause {
    /// Clause comments.
    pub comments: Comments,
    /// The first source.
    pub source: SourceExpression,
    /// Subsequent joins, in order.
    pub joins: Vec<JoinClause>,
}

impl FromClause {
    /// A FROM over one source.
    #[must_use]
    pub fn new(source: SourceExpression) -> Self {
        Self {
            comments: Comments::new(),
            source,
            joins: Vec::new(),
        }
    }
}

/// Join kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinType {
    /// Keyword phrase without the NATURAL prefix.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inner => "inner join",
            Self::Left => "left join",
            Self::Right => "right join",
            Self::Full => "full join",
            Self::Cross => "cross join",
        }
    }
}

/// One join step.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    /// Join kind.
    pub join_type: JoinType,
    /// NATURAL prefix.
    pub natural: bool,
    /// LATERAL source.
    pub lateral: bool,
    /// The joined source.
    pub source: SourceExpression,
    /// ON or USING. Absent for CROSS and NATURAL joins.
    pub condition: Option<JoinCondition>,
}

/// Join predicate forms.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinCondition {
    /// `ON predicate`.
    On(ValueExpr),
    /// `USING (columns)`.
    Using(Vec<String>),
}

/// WHERE clause.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    /// Clause comments.
    pub comments: Comments,
    /// The predicate.
    pub condition: ValueExpr,
}

impl WhereClause {
    /// Wraps a predicate.
    #[must_use]
    pub fn new(condition: ValueExpr) -> Self {
        Self {
            comments: Comments::new(),
            condition,
        }
    }
}

/// GROUP BY clause.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupByClause {
    /// Clause comments.
    pub comments: Comments,
    /// Grouping expressions.
    pub items: Vec<ValueExpr>,
}

/// HAVING clause.
#[derive(Debug, Clone, PartialEq)]
pub struct HavingClause {
    /// Clause comments.
    pub comments: Comments,
    /// The predicate.
    pub condition: ValueExpr,
}

/// WINDOW clause: named window definitions. Names are unique.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowClause {
    /// Clause comments.
    pub comments: Comments,
    /// Definitions in order.
    pub definitions: Vec<WindowDefinition>,
}

/// `name AS (window spec)`.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowDefinition {
    /// Window name.
    pub name: String,
    /// The specification.
    pub spec: OverClause,
}

/// ORDER BY clause.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByClause {
    /// Clause comments.
    pub comments: Comments,
    /// Sort items in order.
    pub items: Vec<OrderByItem>,
}

/// One sort key.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    /// Sort expression.
    pub expr: ValueExpr,
    /// ASC/DESC when given.
    pub direction: Option<OrderDirection>,
    /// NULLS FIRST/LAST when given.
    pub nulls: Option<NullsOrder>,
}

impl OrderByItem {
    /// A bare sort key.
    #[must_use]
    pub fn new(expr: ValueExpr) -> Self {
        Self {
            expr,
            direction: None,
            nulls: None,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

/// NULLS placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullsOrder {
    First,
    Last,
}

/// FETCH clause.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchClause {
    /// FIRST or NEXT.
    pub kind: FetchKind,
    /// Row count; absent means one row.
    pub count: Option<ValueExpr>,
    /// WITH TIES instead of ONLY.
    pub with_ties: bool,
}

/// FETCH FIRST vs FETCH NEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    First,
    Next,
}

/// FOR locking clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForClause {
    /// Lock strength.
    pub lock: LockMode,
    /// NOWAIT.
    pub nowait: bool,
    /// SKIP LOCKED.
    pub skip_locked: bool,
}

/// Lock strengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Update,
    Share,
    NoKeyUpdate,
    KeyShare,
}

impl LockMode {
    /// Keyword phrase including the FOR prefix.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Update => "for update",
            Self::Share => "for share",
            Self::NoKeyUpdate => "for no key update",
            Self::KeyShare => "for key share",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_item_output_name() {
        let aliased = SelectItem::aliased(ValueExpr::number("1"), "one");
        assert_eq!(aliased.output_name(), Some("one"));
        let column = SelectItem::new(ValueExpr::column("id"));
        assert_eq!(column.output_name(), Some("id"));
        let bare = SelectItem::new(ValueExpr::number("1"));
        assert_eq!(bare.output_name(), None);
    }

    #[test]
    fn test_source_effective_name() {
        let mut src = SourceExpression::table(QualifiedName::qualified(
            vec!["public".into()],
            "users",
        ));
        assert_eq!(src.effective_name(), Some("users"));
        src.alias = Some(TableAlias::new("u"));
        assert_eq!(src.effective_name(), Some("u"));
    }

    #[test]
    fn test_set_operator_phrase() {
        let op = SetOperator {
            kind: SetOpKind::Union,
            all: true,
        };
        assert_eq!(op.phrase(), "union all");
    }
}
