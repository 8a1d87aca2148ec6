//! Statement-to-statement conversions.

use crate::ast::{
    DeleteQuery, InsertQuery, InsertSource, MergeQuery, MergeWhenClause, QualifiedName,
    SelectItem, SelectQuery, SetItem, SimpleSelectQuery, SourceExpression, TableAlias,
    TableSource, UpdateQuery, ValueExpr, WhereClause,
};

use super::error::TransformError;

/// Options for converting a SELECT into an INSERT.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertConversionOptions {
    /// Columns to project into; derived from the SELECT's output names
    /// when absent.
    pub target_columns: Option<Vec<String>>,
}

/// Options for converting a SELECT into an UPDATE.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateConversionOptions {
    /// Primary-key columns used to match target rows.
    pub primary_keys: Vec<String>,
    /// Emit a WHERE clause matching by primary key.
    pub where_by_primary_key: bool,
}

/// Options for converting a SELECT into a DELETE.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteConversionOptions {
    /// Primary-key columns used to match target rows.
    pub primary_keys: Vec<String>,
    /// Emit a WHERE clause matching by primary key.
    pub where_by_primary_key: bool,
}

/// Options for converting a SELECT into a MERGE.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeConversionOptions {
    /// The ON predicate joining target and source.
    pub on_condition: ValueExpr,
    /// WHEN clauses, at least one.
    pub when_clauses: Vec<MergeWhenClause>,
}

impl SelectQuery {
    /// Converts any select variant into a simple query.
    ///
    /// A simple query converts to itself, so the conversion is
    /// idempotent. A binary query becomes `SELECT * FROM (…) AS bq`.
    /// A VALUES query requires column aliases.
    ///
    /// # Errors
    ///
    /// [`TransformError::MissingColumnAliases`] for a VALUES query with
    /// no column aliases.
    pub fn to_simple(self) -> Result<SimpleSelectQuery, TransformError> {
        match self {
            Self::Simple(simple) => Ok(simple),
            Self::Binary(binary) => Ok(SimpleSelectQuery::star_from(
                SourceExpression::subquery(Self::Binary(binary), "bq"),
            )),
            Self::Values(values) => {
                let Some(columns) = values.column_aliases.clone() else {
                    return Err(TransformError::MissingColumnAliases);
                };
                let items = columns
                    .iter()
                    .map(|column| SelectItem::new(ValueExpr::column(column.clone())))
                    .collect();
                let mut query = SimpleSelectQuery::from_items(items);
                let source = SourceExpression {
                    source: TableSource::Values(Box::new(values)),
                    alias: Some(TableAlias::with_columns("v", columns)),
                };
                query.from = Some(crate::ast::FromClause::new(source));
                Ok(query)
            }
        }
    }

    /// Output column names of the projection, when every item has one.
    fn output_columns(&self) -> Result<Vec<String>, TransformError> {
        let simple = match self {
            Self::Simple(simple) => simple,
            other => {
                return other.clone().to_simple()?.into_query().output_columns();
            }
        };
        simple
            .select
            .items
            .iter()
            .map(|item| {
                item.output_name()
                    .filter(|name| *name != "*")
                    .map(ToString::to_string)
                    .ok_or_else(|| TransformError::UnsupportedQueryType {
                        detail: "every select item needs a column name or alias".to_string(),
                    })
            })
            .collect()
    }

    /// Builds `INSERT INTO target (columns) SELECT …`.
    ///
    /// # Errors
    ///
    /// Fails when target columns cannot be derived.
    pub fn to_insert_query(
        &self,
        target: QualifiedName,
        options: &InsertConversionOptions,
    ) -> Result<InsertQuery, TransformError> {
        let columns = match &options.target_columns {
            Some(columns) => columns.clone(),
            None => self.output_columns()?,
        };
        Ok(InsertQuery {
            comments: crate::ast::Comments::new(),
            with: None,
            target,
            columns,
            source: InsertSource::Select(Box::new(self.clone())),
            returning: None,
        })
    }

    /// Builds `UPDATE target SET … FROM (…) AS src WHERE pk matches`.
    ///
    /// # Errors
    ///
    /// Fails when the projection has unnamed items or the primary keys
    /// are not part of the projection.
    pub fn to_update_query(
        &self,
        target: QualifiedName,
        options: &UpdateConversionOptions,
    ) -> Result<UpdateQuery, TransformError> {
        let columns = self.output_columns()?;
        for key in &options.primary_keys {
            if !columns.iter().any(|c| c.eq_ignore_ascii_case(key)) {
                return Err(TransformError::UnsupportedQueryType {
                    detail: format!("primary key '{key}' is not in the projection"),
                });
            }
        }
        let set = columns
            .iter()
            .filter(|column| {
                !options
                    .primary_keys
                    .iter()
                    .any(|key| key.eq_ignore_ascii_case(column))
            })
            .map(|column| SetItem {
                column: QualifiedName::new(column.clone()),
                value: ValueExpr::qualified_column("src", column.clone()),
            })
            .collect();
        let where_clause = if options.where_by_primary_key && !options.primary_keys.is_empty() {
            let target_name = target.name.clone();
            let mut predicate: Option<ValueExpr> = None;
            for key in &options.primary_keys {
                let comparison = ValueExpr::binary(
                    ValueExpr::qualified_column(target_name.clone(), key.clone()),
                    "=",
                    ValueExpr::qualified_column("src", key.clone()),
                );
                predicate = Some(match predicate {
                    Some(existing) => ValueExpr::and(existing, comparison),
                    None => comparison,
                });
            }
            predicate.map(WhereClause::new)
        } else {
            None
        };
        Ok(UpdateQuery {
            comments: crate::ast::Comments::new(),
            with: None,
            target,
            alias: None,
            set,
            from: Some(crate::ast::FromClause::new(SourceExpression::subquery(
                self.clone(),
                "src",
            ))),
            where_clause,
            returning: None,
        })
    }

    /// Builds `DELETE FROM target WHERE (pks) IN (SELECT pks FROM (…))`.
    ///
    /// # Errors
    ///
    /// Fails when no primary keys are given while matching is requested.
    pub fn to_delete_query(
        &self,
        target: QualifiedName,
        options: &DeleteConversionOptions,
    ) -> Result<DeleteQuery, TransformError> {
        let where_clause = if options.where_by_primary_key {
            if options.primary_keys.is_empty() {
                return Err(TransformError::UnsupportedQueryType {
                    detail: "whereByPrimaryKey requires at least one key column".to_string(),
                });
            }
            let keys = &options.primary_keys;
            let left = if keys.len() == 1 {
                ValueExpr::column(keys[0].clone())
            } else {
                ValueExpr::Tuple(
                    keys.iter()
                        .map(|key| ValueExpr::column(key.clone()))
                        .collect(),
                )
            };
            let inner_items = keys
                .iter()
                .map(|key| SelectItem::new(ValueExpr::column(key.clone())))
                .collect();
            let mut inner = SimpleSelectQuery::from_items(inner_items);
            inner.from = Some(crate::ast::FromClause::new(SourceExpression::subquery(
                self.clone(),
                "src",
            )));
            let predicate = ValueExpr::binary(
                left,
                "in",
                ValueExpr::InlineQuery(Box::new(SelectQuery::Simple(inner))),
            );
            Some(WhereClause::new(predicate))
        } else {
            None
        };
        Ok(DeleteQuery {
            comments: crate::ast::Comments::new(),
            with: None,
            target,
            alias: None,
            using: None,
            where_clause,
            returning: None,
        })
    }

    /// Builds `MERGE INTO target USING (…) AS src ON … WHEN …`.
    ///
    /// # Errors
    ///
    /// Fails when no WHEN clauses are provided.
    pub fn to_merge_query(
        &self,
        target: QualifiedName,
        options: &MergeConversionOptions,
    ) -> Result<MergeQuery, TransformError> {
        if options.when_clauses.is_empty() {
            return Err(TransformError::UnsupportedQueryType {
                detail: "MERGE conversion requires at least one WHEN clause".to_string(),
            });
        }
        Ok(MergeQuery {
            comments: crate::ast::Comments::new(),
            with: None,
            target,
            alias: None,
            source: SourceExpression::subquery(self.clone(), "src"),
            on: options.on_condition.clone(),
            when_clauses: options.when_clauses.clone(),
            returning: None,
        })
    }
}

impl SimpleSelectQuery {
    /// Wraps this simple query back into the select enum.
    #[must_use]
    pub fn into_query(self) -> SelectQuery {
        SelectQuery::Simple(self)
    }
}

/// Header comment access shared by all select variants.
impl SelectQuery {
    /// Adds a header comment to the statement.
    pub fn add_header_comment(&mut self, comment: &str) {
        self.comments_mut().add_positioned(
            crate::lexer::CommentPosition::Before,
            &[comment.to_string()],
        );
    }

    /// Snapshot of the statement's leading header comments.
    #[must_use]
    pub fn header_comments(&self) -> Vec<String> {
        self.comments()
            .effective(crate::lexer::CommentPosition::Before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_select;

    #[test]
    fn test_to_simple_is_idempotent() {
        let query = parse_select("SELECT 1 UNION SELECT 2").unwrap();
        let once = query.to_simple().unwrap();
        let twice = once.clone().into_query().to_simple().unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_values_to_simple_requires_aliases() {
        let query = parse_select("VALUES (1, 'a')").unwrap();
        let err = query.to_simple().unwrap_err();
        assert!(matches!(err, TransformError::MissingColumnAliases));
    }

    #[test]
    fn test_values_to_simple_with_aliases() {
        let mut query = parse_select("VALUES (1, 'a')").unwrap();
        if let SelectQuery::Values(values) = &mut query {
            values.column_aliases = Some(vec!["id".into(), "name".into()]);
        }
        let simple = query.to_simple().unwrap();
        assert_eq!(
            simple.to_string(),
            "select id, name from (values (1, 'a')) as v(id, name)"
        );
    }

    #[test]
    fn test_to_update_query_shape() {
        let query = parse_select("SELECT id, email FROM staged").unwrap();
        let update = query
            .to_update_query(
                QualifiedName::new("users"),
                &UpdateConversionOptions {
                    primary_keys: vec!["id".into()],
                    where_by_primary_key: true,
                },
            )
            .unwrap();
        let rendered = update.to_string();
        assert!(rendered.starts_with("update users set email = src.email"));
        assert!(rendered.contains("where users.id = src.id"));
    }

    #[test]
    fn test_to_delete_query_shape() {
        let query = parse_select("SELECT id FROM staged").unwrap();
        let delete = query
            .to_delete_query(
                QualifiedName::new("users"),
                &DeleteConversionOptions {
                    primary_keys: vec!["id".into()],
                    where_by_primary_key: true,
                },
            )
            .unwrap();
        let rendered = delete.to_string();
        assert!(rendered.contains("delete from users where id in (select id from"));
    }
}
