//! Object-graph CTE builder.
//!
//! Given a JSON mapping of nested entities, emits a chain of CTEs,
//! deepest first, that aggregate child entities into JSONB objects.
//! An entity whose columns are all NULL collapses to SQL NULL instead
//! of an object full of NULL members.

use serde::Deserialize;

use crate::ast::{
    CaseExpression, CaseKeyValuePair, CommonTable, Comments, CteBody, FromClause, QualifiedName,
    SelectItem, SelectQuery, SimpleSelectQuery, SourceExpression, SwitchCaseArgument, ValueExpr,
    WithClause,
};

use super::error::TransformError;

/// One projected JSON member: the object key and the source column.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JsonColumnMapping {
    /// JSON object key.
    pub key: String,
    /// Column in the underlying row set.
    pub column: String,
}

/// How a child entity nests into its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonRelation {
    /// A single nested object.
    Object,
    /// An aggregated array of objects.
    Array,
}

/// A mapped entity with its columns and nested children.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JsonEntity {
    /// Entity name; used for JSON column aliases.
    pub name: String,
    /// Projected members.
    pub columns: Vec<JsonColumnMapping>,
    /// Nested entities.
    #[serde(default)]
    pub children: Vec<JsonChild>,
}

/// A child entity plus its relationship to the parent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JsonChild {
    /// The nested entity.
    pub entity: JsonEntity,
    /// Object or array nesting.
    pub relation: JsonRelation,
}

/// The root mapping fed to the builder.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JsonMapping {
    /// Root entity of the object graph.
    pub root: JsonEntity,
}

/// Builds the CTE chain for a JSON mapping over a base row set.
#[derive(Debug, Default)]
pub struct ObjectGraphCteBuilder {
    counter: usize,
}

impl ObjectGraphCteBuilder {
    /// Creates a builder. Aliases are numbered from zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next_alias(&mut self, entity: &str) -> String {
        let alias = format!("{entity}_json_{}", self.counter);
        self.counter += 1;
        alias
    }

    /// Builds the query: one CTE per entity, deepest first, each
    /// aggregating its children, with a final projection of the root
    /// object.
    ///
    /// # Errors
    ///
    /// [`TransformError::UnsupportedQueryType`] when the mapping has an
    /// entity without columns.
    pub fn build(
        &mut self,
        base: SimpleSelectQuery,
        mapping: &JsonMapping,
    ) -> Result<SimpleSelectQuery, TransformError> {
        validate_entity(&mapping.root)?;

        let mut tables = vec![CommonTable {
            comments: Comments::new(),
            alias: crate::ast::TableAlias::new("__base_rows"),
            materialized: None,
            body: CteBody::Select(Box::new(SelectQuery::Simple(base))),
        }];
        let mut current = "__base_rows".to_string();

        // Children first, deepest entities resolve before their
        // parents reference them.
        let root_children = self.build_children(&mapping.root, &mut tables, &mut current)?;

        let root_expr = self.entity_object_expr(&mapping.root, &root_children);
        let root_alias = self.next_alias(&mapping.root.name);
        let mut outer = SimpleSelectQuery::from_items(vec![SelectItem::aliased(
            root_expr, root_alias,
        )]);
        outer.from = Some(FromClause::new(SourceExpression::table(
            QualifiedName::new(current),
        )));
        outer.with = Some(WithClause {
            comments: Comments::new(),
            recursive: false,
            tables,
        });
        Ok(outer)
    }

    /// Emits one CTE per child (recursively), returning the JSON
    /// column aliases the parent references.
    fn build_children(
        &mut self,
        entity: &JsonEntity,
        tables: &mut Vec<CommonTable>,
        current: &mut String,
    ) -> Result<Vec<(String, JsonRelation)>, TransformError> {
        let mut aliases = Vec::new();
        for child in &entity.children {
            validate_entity(&child.entity)?;
            let grand_children = self.build_children(&child.entity, tables, current)?;
            let object = self.entity_object_expr(&child.entity, &grand_children);
            let alias = self.next_alias(&child.entity.name);

            let mut items = vec![SelectItem::new(ValueExpr::column("*"))];
            let expr = match child.relation {
                JsonRelation::Object => object,
                JsonRelation::Array => ValueExpr::function("jsonb_agg", vec![object]),
            };
            items.push(SelectItem::aliased(expr, alias.clone()));

            let mut body = SimpleSelectQuery::from_items(items);
            body.from = Some(FromClause::new(SourceExpression::table(
                QualifiedName::new(current.clone()),
            )));

            let cte_name = format!("__{alias}");
            tables.push(CommonTable {
                comments: Comments::new(),
                alias: crate::ast::TableAlias::new(cte_name.clone()),
                materialized: None,
                body: CteBody::Select(Box::new(SelectQuery::Simple(body))),
            });
            *current = cte_name;
            aliases.push((alias, child.relation));
        }
        Ok(aliases)
    }

    /// `CASE WHEN c1 IS NULL AND c2 IS NULL … THEN NULL ELSE
    /// jsonb_build_object('k1', c1, …) END`.
    fn entity_object_expr(
        &self,
        entity: &JsonEntity,
        children: &[(String, JsonRelation)],
    ) -> ValueExpr {
        let mut args = Vec::new();
        for mapping in &entity.columns {
            args.push(ValueExpr::string(&mapping.key));
            args.push(ValueExpr::column(mapping.column.clone()));
        }
        for (alias, _) in children {
            args.push(ValueExpr::string(alias));
            args.push(ValueExpr::column(alias.clone()));
        }
        let object = ValueExpr::function("jsonb_build_object", args);

        let mut all_null: Option<ValueExpr> = None;
        for mapping in &entity.columns {
            let check = ValueExpr::binary(
                ValueExpr::column(mapping.column.clone()),
                "is",
                ValueExpr::null(),
            );
            all_null = Some(match all_null {
                Some(left) => ValueExpr::and(left, check),
                None => check,
            });
        }
        match all_null {
            Some(predicate) => ValueExpr::Case(Box::new(CaseExpression {
                operand: None,
                switch: SwitchCaseArgument {
                    pairs: vec![CaseKeyValuePair {
                        key: predicate,
                        value: ValueExpr::null(),
                    }],
                    else_value: Some(object),
                },
            })),
            None => object,
        }
    }
}

fn validate_entity(entity: &JsonEntity) -> Result<(), TransformError> {
    if entity.columns.is_empty() {
        return Err(TransformError::UnsupportedQueryType {
            detail: format!("entity '{}' maps no columns", entity.name),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_select;

    fn base_query() -> SimpleSelectQuery {
        match parse_select("SELECT o.id, o.total, c.name FROM orders AS o JOIN customers AS c ON c.id = o.customer_id")
            .unwrap()
        {
            SelectQuery::Simple(simple) => simple,
            _ => unreachable!(),
        }
    }

    fn mapping_json() -> JsonMapping {
        serde_json::from_str(
            r#"{
                "root": {
                    "name": "order",
                    "columns": [
                        {"key": "id", "column": "id"},
                        {"key": "total", "column": "total"}
                    ],
                    "children": [
                        {
                            "relation": "object",
                            "entity": {
                                "name": "customer",
                                "columns": [{"key": "name", "column": "name"}]
                            }
                        }
                    ]
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_builds_deepest_first_chain() {
        let mut builder = ObjectGraphCteBuilder::new();
        let query = builder.build(base_query(), &mapping_json()).unwrap();
        let names = query.get_cte_names();
        assert_eq!(names[0], "__base_rows");
        assert_eq!(names[1], "__customer_json_0");
        let sql = query.to_string();
        assert!(sql.contains("jsonb_build_object('name', name)"));
        assert!(sql.contains("jsonb_build_object('id', id, 'total', total, 'customer_json_0', customer_json_0)"));
    }

    #[test]
    fn test_all_null_collapses_to_null() {
        let mut builder = ObjectGraphCteBuilder::new();
        let query = builder.build(base_query(), &mapping_json()).unwrap();
        let sql = query.to_string();
        assert!(sql.contains("case when name is null then null else jsonb_build_object"));
    }

    #[test]
    fn test_aliases_are_numbered() {
        let mut builder = ObjectGraphCteBuilder::new();
        let first = builder.next_alias("a");
        let second = builder.next_alias("b");
        assert_eq!(first, "a_json_0");
        assert_eq!(second, "b_json_1");
    }

    #[test]
    fn test_entity_without_columns_fails() {
        let mut builder = ObjectGraphCteBuilder::new();
        let mapping = JsonMapping {
            root: JsonEntity {
                name: "empty".into(),
                columns: vec![],
                children: vec![],
            },
        };
        let err = builder.build(base_query(), &mapping).unwrap_err();
        assert!(matches!(err, TransformError::UnsupportedQueryType { .. }));
    }
}
