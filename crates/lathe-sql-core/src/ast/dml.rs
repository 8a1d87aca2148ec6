//! Write statement AST: INSERT, UPDATE, DELETE, MERGE.

use super::comments::Comments;
use super::expr::{QualifiedName, ValueExpr};
use super::select::{FromClause, SelectItem, SelectQuery, SourceExpression, TableAlias, WhereClause, WithClause};

/// Where an INSERT's rows come from.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    /// `VALUES (…), (…)`.
    Values(Vec<Vec<ValueExpr>>),
    /// `INSERT INTO … SELECT …`.
    Select(Box<SelectQuery>),
    /// `DEFAULT VALUES`.
    DefaultValues,
}

/// An INSERT statement.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertQuery {
    /// Header comments.
    pub comments: Comments,
    /// Leading WITH clause.
    pub with: Option<WithClause>,
    /// Target table.
    pub target: QualifiedName,
    /// Explicit column projection; empty means table order.
    pub columns: Vec<String>,
    /// Row source.
    pub source: InsertSource,
    /// RETURNING projection.
    pub returning: Option<Vec<SelectItem>>,
}

/// One `column = value` assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct SetItem {
    /// Assigned column.
    pub column: QualifiedName,
    /// New value.
    pub value: ValueExpr,
}

/// An UPDATE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateQuery {
    /// Header comments.
    pub comments: Comments,
    /// Leading WITH clause.
    pub with: Option<WithClause>,
    /// Target table.
    pub target: QualifiedName,
    /// Target alias.
    pub alias: Option<TableAlias>,
    /// SET assignments, in order.
    pub set: Vec<SetItem>,
    /// FROM sources joined into the update.
    pub from: Option<FromClause>,
    /// WHERE clause.
    pub where_clause: Option<WhereClause>,
    /// RETURNING projection.
    pub returning: Option<Vec<SelectItem>>,
}

/// A DELETE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteQuery {
    /// Header comments.
    pub comments: Comments,
    /// Leading WITH clause.
    pub with: Option<WithClause>,
    /// Target table.
    pub target: QualifiedName,
    /// Target alias.
    pub alias: Option<TableAlias>,
    /// USING sources.
    pub using: Option<FromClause>,
    /// WHERE clause.
    pub where_clause: Option<WhereClause>,
    /// RETURNING projection.
    pub returning: Option<Vec<SelectItem>>,
}

/// Match arm selector of a MERGE WHEN clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMatchKind {
    /// `WHEN MATCHED`.
    Matched,
    /// `WHEN NOT MATCHED [BY TARGET]`.
    NotMatchedByTarget,
    /// `WHEN NOT MATCHED BY SOURCE`.
    NotMatchedBySource,
}

impl MergeMatchKind {
    /// Keyword phrase.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Matched => "when matched",
            Self::NotMatchedByTarget => "when not matched",
            Self::NotMatchedBySource => "when not matched by source",
        }
    }
}

/// What a MERGE WHEN clause does.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeAction {
    /// `UPDATE SET …` with optional trailing predicate.
    Update {
        set: Vec<SetItem>,
        where_clause: Option<ValueExpr>,
    },
    /// `DELETE` with optional trailing predicate.
    Delete { where_clause: Option<ValueExpr> },
    /// `INSERT [(cols)] VALUES (…)`.
    Insert {
        columns: Vec<String>,
        values: Vec<ValueExpr>,
    },
    /// `INSERT DEFAULT VALUES`.
    InsertDefaultValues,
    /// `DO NOTHING`.
    DoNothing,
}

/// One WHEN clause of a MERGE.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeWhenClause {
    /// Which rows this arm applies to.
    pub match_kind: MergeMatchKind,
    /// Extra `AND` predicate.
    pub condition: Option<ValueExpr>,
    /// The action taken.
    pub action: MergeAction,
}

/// A MERGE statement. At least one WHEN clause is present.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeQuery {
    /// Header comments.
    pub comments: Comments,
    /// Leading WITH clause.
    pub with: Option<WithClause>,
    /// Target table.
    pub target: QualifiedName,
    /// Target alias.
    pub alias: Option<TableAlias>,
    /// USING source.
    pub source: SourceExpression,
    /// ON predicate.
    pub on: ValueExpr,
    /// WHEN clauses in order.
    pub when_clauses: Vec<MergeWhenClause>,
    /// RETURNING projection.
    pub returning: Option<Vec<SelectItem>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_match_kind_phrases() {
        assert_eq!(MergeMatchKind::Matched.as_str(), "when matched");
        assert_eq!(
            MergeMatchKind::NotMatchedBySource.as_str(),
            "when not matched by source"
        );
    }
}
