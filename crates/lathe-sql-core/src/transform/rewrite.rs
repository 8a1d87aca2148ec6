//! Structure-preserving fold over value expressions and queries.
//!
//! The rewriter rebuilds nodes only to host rewritten children; the
//! order of arguments, OVER/FILTER/WITHIN GROUP decorations, and
//! CASE/BETWEEN sub-parts is preserved exactly.

use crate::ast::{
    ArrayIndexExpression, ArraySliceExpression, BetweenExpression, BinaryExpression,
    BinarySelectQuery, CaseExpression, CaseKeyValuePair, CastExpression, ColumnReference,
    CommonTable, CteBody, DeleteQuery, Distinct, FromClause, FunctionArguments, FunctionCall,
    GroupByClause, HavingClause, InsertQuery, InsertSource, JoinClause, JoinCondition,
    LiteralValue, MergeAction, MergeQuery, MergeWhenClause, OrderByClause, OrderByItem,
    OverClause, ParameterExpression, SelectClause, SelectItem, SelectQuery, SetItem,
    SimpleSelectQuery, SourceExpression, SwitchCaseArgument, TableSource, TypeValue, UpdateQuery,
    UnaryExpression, ValueExpr, ValuesQuery, WhereClause, WindowClause, WindowDefinition,
    WindowFrameBoundary, WindowFrameSpec, WithClause,
};

/// Substitution callbacks for the fold. Returning `None` keeps the
/// node (its children are still rewritten).
pub trait ValueRewriter {
    /// Substitute a column reference.
    fn rewrite_column(&mut self, column: &ColumnReference) -> Option<ValueExpr> {
        let _ = column;
        None
    }

    /// Substitute a parameter.
    fn rewrite_parameter(&mut self, param: &ParameterExpression) -> Option<ValueExpr> {
        let _ = param;
        None
    }
}

/// Rewrites one value expression.
pub fn rewrite_value(expr: &ValueExpr, rewriter: &mut dyn ValueRewriter) -> ValueExpr {
    match expr {
        ValueExpr::Literal(_) | ValueExpr::RawString(_) | ValueExpr::IdentifierString(_) => {
            expr.clone()
        }
        ValueExpr::Column(column) => rewriter
            .rewrite_column(column)
            .unwrap_or_else(|| expr.clone()),
        ValueExpr::Parameter(param) => rewriter
            .rewrite_parameter(param)
            .unwrap_or_else(|| expr.clone()),
        ValueExpr::Function(call) => ValueExpr::Function(Box::new(rewrite_function(call, rewriter))),
        ValueExpr::Unary(unary) => ValueExpr::Unary(UnaryExpression {
            operator: unary.operator.clone(),
            expr: Box::new(rewrite_value(&unary.expr, rewriter)),
        }),
        ValueExpr::Binary(binary) => ValueExpr::Binary(Box::new(BinaryExpression {
            left: rewrite_value(&binary.left, rewriter),
            operator: binary.operator.clone(),
            right: rewrite_value(&binary.right, rewriter),
        })),
        ValueExpr::Between(between) => ValueExpr::Between(Box::new(BetweenExpression {
            expr: rewrite_value(&between.expr, rewriter),
            lower: rewrite_value(&between.lower, rewriter),
            upper: rewrite_value(&between.upper, rewriter),
            negated: between.negated,
        })),
        ValueExpr::Cast(cast) => ValueExpr::Cast(Box::new(CastExpression {
            expr: rewrite_value(&cast.expr, rewriter),
            target: rewrite_type(&cast.target, rewriter),
            form: cast.form,
        })),
        ValueExpr::Case(case) => ValueExpr::Case(Box::new(CaseExpression {
            operand: case
                .operand
                .as_ref()
                .map(|operand| rewrite_value(operand, rewriter)),
            switch: SwitchCaseArgument {
                pairs: case
                    .switch
                    .pairs
                    .iter()
                    .map(|pair| CaseKeyValuePair {
                        key: rewrite_value(&pair.key, rewriter),
                        value: rewrite_value(&pair.value, rewriter),
                    })
                    .collect(),
                else_value: case
                    .switch
                    .else_value
                    .as_ref()
                    .map(|value| rewrite_value(value, rewriter)),
            },
        })),
        ValueExpr::Paren(inner) => ValueExpr::Paren(Box::new(rewrite_value(inner, rewriter))),
        ValueExpr::Tuple(items) => ValueExpr::Tuple(rewrite_values(items, rewriter)),
        ValueExpr::ValueList(items) => ValueExpr::ValueList(rewrite_values(items, rewriter)),
        ValueExpr::Array(items) => ValueExpr::Array(rewrite_values(items, rewriter)),
        ValueExpr::ArrayQuery(query) => {
            ValueExpr::ArrayQuery(Box::new(rewrite_query(query, rewriter)))
        }
        ValueExpr::ArrayIndex(index) => ValueExpr::ArrayIndex(Box::new(ArrayIndexExpression {
            array: rewrite_value(&index.array, rewriter),
            index: rewrite_value(&index.index, rewriter),
        })),
        ValueExpr::ArraySlice(slice) => ValueExpr::ArraySlice(Box::new(ArraySliceExpression {
            array: rewrite_value(&slice.array, rewriter),
            from: slice.from.as_ref().map(|f| rewrite_value(f, rewriter)),
            to: slice.to.as_ref().map(|t| rewrite_value(t, rewriter)),
        })),
        ValueExpr::Type(type_value) => ValueExpr::Type(rewrite_type(type_value, rewriter)),
        ValueExpr::StringSpecifier(_) => expr.clone(),
        ValueExpr::InlineQuery(query) => {
            ValueExpr::InlineQuery(Box::new(rewrite_query(query, rewriter)))
        }
    }
}

fn rewrite_values(items: &[ValueExpr], rewriter: &mut dyn ValueRewriter) -> Vec<ValueExpr> {
    items
        .iter()
        .map(|item| rewrite_value(item, rewriter))
        .collect()
}

fn rewrite_type(type_value: &TypeValue, rewriter: &mut dyn ValueRewriter) -> TypeValue {
    TypeValue {
        name: type_value.name.clone(),
        args: rewrite_values(&type_value.args, rewriter),
    }
}

fn rewrite_function(call: &FunctionCall, rewriter: &mut dyn ValueRewriter) -> FunctionCall {
    let args = match &call.args {
        FunctionArguments::List(items) => FunctionArguments::List(rewrite_values(items, rewriter)),
        FunctionArguments::Substring {
            input,
            from,
            for_count,
        } => FunctionArguments::Substring {
            input: rewrite_value(input, rewriter),
            from: from.as_ref().map(|f| rewrite_value(f, rewriter)),
            for_count: for_count.as_ref().map(|f| rewrite_value(f, rewriter)),
        },
        FunctionArguments::Overlay {
            input,
            placing,
            from,
            for_count,
        } => FunctionArguments::Overlay {
            input: rewrite_value(input, rewriter),
            placing: rewrite_value(placing, rewriter),
            from: rewrite_value(from, rewriter),
            for_count: for_count.as_ref().map(|f| rewrite_value(f, rewriter)),
        },
        FunctionArguments::Trim {
            side,
            characters,
            input,
        } => FunctionArguments::Trim {
            side: *side,
            characters: characters.as_ref().map(|c| rewrite_value(c, rewriter)),
            input: rewrite_value(input, rewriter),
        },
        FunctionArguments::Position { needle, haystack } => FunctionArguments::Position {
            needle: rewrite_value(needle, rewriter),
            haystack: rewrite_value(haystack, rewriter),
        },
    };
    FunctionCall {
        name: call.name.clone(),
        args,
        distinct: call.distinct,
        within_group: call
            .within_group
            .as_ref()
            .map(|items| rewrite_order_items(items, rewriter)),
        filter: call.filter.as_ref().map(|f| rewrite_value(f, rewriter)),
        over: call.over.as_ref().map(|over| rewrite_over(over, rewriter)),
        with_ordinality: call.with_ordinality,
    }
}

fn rewrite_order_items(
    items: &[OrderByItem],
    rewriter: &mut dyn ValueRewriter,
) -> Vec<OrderByItem> {
    items
        .iter()
        .map(|item| OrderByItem {
            expr: rewrite_value(&item.expr, rewriter),
            direction: item.direction,
            nulls: item.nulls,
        })
        .collect()
}

fn rewrite_over(over: &OverClause, rewriter: &mut dyn ValueRewriter) -> OverClause {
    OverClause {
        window_name: over.window_name.clone(),
        partition_by: rewrite_values(&over.partition_by, rewriter),
        order_by: rewrite_order_items(&over.order_by, rewriter),
        frame: over.frame.as_ref().map(|frame| WindowFrameSpec {
            unit: frame.unit,
            start: rewrite_boundary(&frame.start, rewriter),
            end: frame.end.as_ref().map(|end| rewrite_boundary(end, rewriter)),
        }),
    }
}

fn rewrite_boundary(
    boundary: &WindowFrameBoundary,
    rewriter: &mut dyn ValueRewriter,
) -> WindowFrameBoundary {
    match boundary {
        WindowFrameBoundary::Preceding(offset) => {
            WindowFrameBoundary::Preceding(Box::new(rewrite_value(offset, rewriter)))
        }
        WindowFrameBoundary::Following(offset) => {
            WindowFrameBoundary::Following(Box::new(rewrite_value(offset, rewriter)))
        }
        other => other.clone(),
    }
}

/// Rewrites every value expression of a query, recursing into all
/// clauses, CTE bodies, and subqueries.
pub fn rewrite_query(query: &SelectQuery, rewriter: &mut dyn ValueRewriter) -> SelectQuery {
    match query {
        SelectQuery::Simple(simple) => SelectQuery::Simple(rewrite_simple(simple, rewriter)),
        SelectQuery::Binary(binary) => SelectQuery::Binary(BinarySelectQuery {
            comments: binary.comments.clone(),
            left: Box::new(rewrite_query(&binary.left, rewriter)),
            operator: binary.operator,
            right: Box::new(rewrite_query(&binary.right, rewriter)),
        }),
        SelectQuery::Values(values) => SelectQuery::Values(rewrite_values_query(values, rewriter)),
    }
}

fn rewrite_values_query(values: &ValuesQuery, rewriter: &mut dyn ValueRewriter) -> ValuesQuery {
    ValuesQuery {
        comments: values.comments.clone(),
        rows: values
            .rows
            .iter()
            .map(|row| rewrite_values(row, rewriter))
            .collect(),
        column_aliases: values.column_aliases.clone(),
    }
}

fn rewrite_simple(
    simple: &SimpleSelectQuery,
    rewriter: &mut dyn ValueRewriter,
) -> SimpleSelectQuery {
    SimpleSelectQuery {
        comments: simple.comments.clone(),
        with: simple.with.as_ref().map(|with| rewrite_with(with, rewriter)),
        select: SelectClause {
            comments: simple.select.comments.clone(),
            distinct: match &simple.select.distinct {
                Some(Distinct::DistinctOn(exprs)) => {
                    Some(Distinct::DistinctOn(rewrite_values(exprs, rewriter)))
                }
                other => other.clone(),
            },
            items: simple
                .select
                .items
                .iter()
                .map(|item| rewrite_select_item(item, rewriter))
                .collect(),
        },
        from: simple.from.as_ref().map(|from| rewrite_from(from, rewriter)),
        where_clause: simple.where_clause.as_ref().map(|w| WhereClause {
            comments: w.comments.clone(),
            condition: rewrite_value(&w.condition, rewriter),
        }),
        group_by: simple.group_by.as_ref().map(|g| GroupByClause {
            comments: g.comments.clone(),
            items: rewrite_values(&g.items, rewriter),
        }),
        having: simple.having.as_ref().map(|h| HavingClause {
            comments: h.comments.clone(),
            condition: rewrite_value(&h.condition, rewriter),
        }),
        window: simple.window.as_ref().map(|w| WindowClause {
            comments: w.comments.clone(),
            definitions: w
                .definitions
                .iter()
                .map(|d| WindowDefinition {
                    name: d.name.clone(),
                    spec: rewrite_over(&d.spec, rewriter),
                })
                .collect(),
        }),
        order_by: simple.order_by.as_ref().map(|o| OrderByClause {
            comments: o.comments.clone(),
            items: rewrite_order_items(&o.items, rewriter),
        }),
        limit: simple.limit.as_ref().map(|l| rewrite_value(l, rewriter)),
        offset: simple.offset.as_ref().map(|o| rewrite_value(o, rewriter)),
        fetch: simple.fetch.clone(),
        for_clause: simple.for_clause.clone(),
    }
}

fn rewrite_select_item(item: &SelectItem, rewriter: &mut dyn ValueRewriter) -> SelectItem {
    SelectItem {
        comments: item.comments.clone(),
        expr: rewrite_value(&item.expr, rewriter),
        alias: item.alias.clone(),
    }
}

fn rewrite_with(with: &WithClause, rewriter: &mut dyn ValueRewriter) -> WithClause {
    WithClause {
        comments: with.comments.clone(),
        recursive: with.recursive,
        tables: with
            .tables
            .iter()
            .map(|cte| CommonTable {
                comments: cte.comments.clone(),
                alias: cte.alias.clone(),
                materialized: cte.materialized,
                body: rewrite_cte_body(&cte.body, rewriter),
            })
            .collect(),
    }
}

fn rewrite_cte_body(body: &CteBody, rewriter: &mut dyn ValueRewriter) -> CteBody {
    match body {
        CteBody::Select(query) => CteBody::Select(Box::new(rewrite_query(query, rewriter))),
        CteBody::Insert(query) => CteBody::Insert(Box::new(rewrite_insert(query, rewriter))),
        CteBody::Update(query) => CteBody::Update(Box::new(rewrite_update(query, rewriter))),
        CteBody::Delete(query) => CteBody::Delete(Box::new(rewrite_delete(query, rewriter))),
        CteBody::Merge(query) => CteBody::Merge(Box::new(rewrite_merge(query, rewriter))),
    }
}

fn rewrite_from(from: &FromClause, rewriter: &mut dyn ValueRewriter) -> FromClause {
    FromClause {
        comments: from.comments.clone(),
        source: rewrite_source(&from.source, rewriter),
        joins: from
            .joins
            .iter()
            .map(|join| JoinClause {
                join_type: join.join_type,
                natural: join.natural,
                lateral: join.lateral,
                source: rewrite_source(&join.source, rewriter),
                condition: join.condition.as_ref().map(|c| match c {
                    JoinCondition::On(predicate) => {
                        JoinCondition::On(rewrite_value(predicate, rewriter))
                    }
                    JoinCondition::Using(columns) => JoinCondition::Using(columns.clone()),
                }),
            })
            .collect(),
    }
}

fn rewrite_source(source: &SourceExpression, rewriter: &mut dyn ValueRewriter) -> SourceExpression {
    SourceExpression {
        source: match &source.source {
            TableSource::Table(name) => TableSource::Table(name.clone()),
            TableSource::SubQuery(query) => {
                TableSource::SubQuery(Box::new(rewrite_query(query, rewriter)))
            }
            TableSource::Function(call) => {
                TableSource::Function(Box::new(rewrite_function(call, rewriter)))
            }
            TableSource::Values(values) => {
                TableSource::Values(Box::new(rewrite_values_query(values, rewriter)))
            }
        },
        alias: source.alias.clone(),
    }
}

pub(crate) fn rewrite_insert(query: &InsertQuery, rewriter: &mut dyn ValueRewriter) -> InsertQuery {
    InsertQuery {
        comments: query.comments.clone(),
        with: query.with.as_ref().map(|with| rewrite_with(with, rewriter)),
        target: query.target.clone(),
        columns: query.columns.clone(),
        source: match &query.source {
            InsertSource::Values(rows) => InsertSource::Values(
                rows.iter().map(|row| rewrite_values(row, rewriter)).collect(),
            ),
            InsertSource::Select(select) => {
                InsertSource::Select(Box::new(rewrite_query(select, rewriter)))
            }
            InsertSource::DefaultValues => InsertSource::DefaultValues,
        },
        returning: query
            .returning
            .as_ref()
            .map(|items| items.iter().map(|i| rewrite_select_item(i, rewriter)).collect()),
    }
}

fn rewrite_set_items(items: &[SetItem], rewriter: &mut dyn ValueRewriter) -> Vec<SetItem> {
    items
        .iter()
        .map(|item| SetItem {
            column: item.column.clone(),
            value: rewrite_value(&item.value, rewriter),
        })
        .collect()
}

pub(crate) fn rewrite_update(query: &UpdateQuery, rewriter: &mut dyn ValueRewriter) -> UpdateQuery {
    UpdateQuery {
        comments: query.comments.clone(),
        with: query.with.as_ref().map(|with| rewrite_with(with, rewriter)),
        target: query.target.clone(),
        alias: query.alias.clone(),
        set: rewrite_set_items(&query.set, rewriter),
        from: query.from.as_ref().map(|from| rewrite_from(from, rewriter)),
        where_clause: query.where_clause.as_ref().map(|w| WhereClause {
            comments: w.comments.clone(),
            condition: rewrite_value(&w.condition, rewriter),
        }),
        returning: query
            .returning
            .as_ref()
            .map(|items| items.iter().map(|i| rewrite_select_item(i, rewriter)).collect()),
    }
}

pub(crate) fn rewrite_delete(query: &DeleteQuery, rewriter: &mut dyn ValueRewriter) -> DeleteQuery {
    DeleteQuery {
        comments: query.comments.clone(),
        with: query.with.as_ref().map(|with| rewrite_with(with, rewriter)),
        target: query.target.clone(),
        alias: query.alias.clone(),
        using: query.using.as_ref().map(|from| rewrite_from(from, rewriter)),
        where_clause: query.where_clause.as_ref().map(|w| WhereClause {
            comments: w.comments.clone(),
            condition: rewrite_value(&w.condition, rewriter),
        }),
        returning: query
            .returning
            .as_ref()
            .map(|items| items.iter().map(|i| rewrite_select_item(i, rewriter)).collect()),
    }
}

pub(crate) fn rewrite_merge(query: &MergeQuery, rewriter: &mut dyn ValueRewriter) -> MergeQuery {
    MergeQuery {
        comments: query.comments.clone(),
        with: query.with.as_ref().map(|with| rewrite_with(with, rewriter)),
        target: query.target.clone(),
        alias: query.alias.clone(),
        source: rewrite_source(&query.source, rewriter),
        on: rewrite_value(&query.on, rewriter),
        when_clauses: query
            .when_clauses
            .iter()
            .map(|when| MergeWhenClause {
                match_kind: when.match_kind,
                condition: when.condition.as_ref().map(|c| rewrite_value(c, rewriter)),
                action: match &when.action {
                    MergeAction::Update { set, where_clause } => MergeAction::Update {
                        set: rewrite_set_items(set, rewriter),
                        where_clause: where_clause.as_ref().map(|w| rewrite_value(w, rewriter)),
                    },
                    MergeAction::Delete { where_clause } => MergeAction::Delete {
                        where_clause: where_clause.as_ref().map(|w| rewrite_value(w, rewriter)),
                    },
                    MergeAction::Insert { columns, values } => MergeAction::Insert {
                        columns: columns.clone(),
                        values: rewrite_values(values, rewriter),
                    },
                    MergeAction::InsertDefaultValues => MergeAction::InsertDefaultValues,
                    MergeAction::DoNothing => MergeAction::DoNothing,
                },
            })
            .collect(),
        returning: query
            .returning
            .as_ref()
            .map(|items| items.iter().map(|i| rewrite_select_item(i, rewriter)).collect()),
    }
}

/// Binds a named parameter's value wherever it occurs.
struct ParamBinder<'a> {
    name: &'a str,
    value: &'a LiteralValue,
    bound: usize,
}

impl ValueRewriter for ParamBinder<'_> {
    fn rewrite_parameter(&mut self, param: &ParameterExpression) -> Option<ValueExpr> {
        if param.name == self.name {
            self.bound += 1;
            Some(ValueExpr::Parameter(ParameterExpression {
                name: param.name.clone(),
                value: Some(self.value.clone()),
            }))
        } else {
            None
        }
    }
}

impl SelectQuery {
    /// Binds a value to every parameter with the given name. Returns
    /// how many placeholders were bound.
    pub fn set_param(&mut self, name: &str, value: LiteralValue) -> usize {
        let mut binder = ParamBinder {
            name,
            value: &value,
            bound: 0,
        };
        *self = rewrite_query(self, &mut binder);
        binder.bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_select;

    struct PrefixColumns;

    impl ValueRewriter for PrefixColumns {
        fn rewrite_column(&mut self, column: &ColumnReference) -> Option<ValueExpr> {
            if column.namespaces.is_empty() && !column.is_wildcard() {
                Some(ValueExpr::Column(ColumnReference::qualified(
                    vec!["t".into()],
                    column.name.clone(),
                )))
            } else {
                None
            }
        }
    }

    #[test]
    fn test_rewrite_preserves_structure() {
        let query = parse_select("SELECT a, b + 1 FROM t WHERE c BETWEEN 1 AND 2").unwrap();
        let rewritten = rewrite_query(&query, &mut PrefixColumns);
        assert_eq!(
            rewritten.to_string(),
            "select t.a, t.b + 1 from t where t.c between 1 and 2"
        );
    }

    #[test]
    fn test_rewrite_without_matches_is_identity() {
        struct Noop;
        impl ValueRewriter for Noop {}
        let query = parse_select(
            "SELECT count(*) FILTER (WHERE x > 0) OVER (PARTITION BY y) FROM t",
        )
        .unwrap();
        let rewritten = rewrite_query(&query, &mut Noop);
        assert_eq!(rewritten, query);
    }

    #[test]
    fn test_set_param_binds_all_occurrences() {
        let mut query = parse_select("SELECT * FROM t WHERE a = :lo AND b = :lo").unwrap();
        let bound = query.set_param("lo", LiteralValue::Number("5".into()));
        assert_eq!(bound, 2);
    }
}
