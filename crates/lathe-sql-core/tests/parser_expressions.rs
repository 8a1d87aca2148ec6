//! Tests for value expression parsing: precedence, special forms, and
//! the boundary behaviors around BETWEEN, casts, and wildcards.

mod common;
use common::*;

use lathe_sql_core::ast::{
    CastForm, FunctionArguments, LiteralValue, ValueExpr,
};
use lathe_sql_core::parser::ParseError;

fn where_expr(sql: &str) -> ValueExpr {
    parse_simple(sql).where_clause.unwrap().condition
}

fn first_item(sql: &str) -> ValueExpr {
    parse_simple(sql).select.items.remove(0).expr
}

#[test]
fn between_binds_tighter_than_and() {
    // Top-level AND whose left is the BETWEEN over (1, 0, 2).
    let expr = first_item("SELECT 1 BETWEEN 0 AND 2 AND TRUE");
    let ValueExpr::Binary(and) = expr else {
        panic!("expected a top-level AND, got something else");
    };
    assert_eq!(and.operator, "and");
    let ValueExpr::Between(between) = &and.left else {
        panic!("expected BETWEEN on the left");
    };
    assert!(!between.negated);
    assert_eq!(between.expr, ValueExpr::number("1"));
    assert_eq!(between.lower, ValueExpr::number("0"));
    assert_eq!(between.upper, ValueExpr::number("2"));
    assert_eq!(and.right, ValueExpr::boolean(true));
}

#[test]
fn not_between() {
    let expr = where_expr("SELECT * FROM t WHERE x NOT BETWEEN 1 AND 10");
    assert!(matches!(expr, ValueExpr::Between(b) if b.negated));
}

#[test]
fn arithmetic_precedence() {
    let expr = first_item("SELECT a + b * c");
    let ValueExpr::Binary(add) = expr else {
        panic!("expected binary +");
    };
    assert_eq!(add.operator, "+");
    assert!(matches!(&add.right, ValueExpr::Binary(mul) if mul.operator == "*"));
    round_trip("SELECT a + b * c");
}

#[test]
fn double_colon_right_operand_is_a_type() {
    let expr = first_item("SELECT total::numeric(10, 2)");
    let ValueExpr::Cast(cast) = expr else {
        panic!("expected a cast");
    };
    assert_eq!(cast.form, CastForm::Shorthand);
    assert_eq!(cast.target.name, "numeric");
    assert_eq!(cast.target.args.len(), 2);
    round_trip("SELECT total::numeric(10, 2)");
}

#[test]
fn cast_call_form() {
    let expr = first_item("SELECT CAST(x AS int)");
    assert!(matches!(expr, ValueExpr::Cast(c) if c.form == CastForm::Standard));
    round_trip("SELECT CAST(x AS int)");
}

#[test]
fn date_with_string_is_a_function() {
    let expr = first_item("SELECT DATE('2025-01-01')");
    assert!(matches!(expr, ValueExpr::Function(_)));
}

#[test]
fn date_with_number_is_a_type() {
    let expr = first_item("SELECT DATE(6)");
    assert!(matches!(expr, ValueExpr::Type(t) if t.name.eq_ignore_ascii_case("date")));
}

#[test]
fn numeric_is_a_type_constructor() {
    let expr = first_item("SELECT NUMERIC(10, 2)");
    assert!(matches!(expr, ValueExpr::Type(_)));
}

#[test]
fn wildcard_misuse_is_rejected() {
    let err = parse_err("SELECT *.a FROM t");
    assert!(matches!(err, ParseError::Context { source, .. }
        if matches!(*source, ParseError::WildcardMisuse { .. })));
}

#[test]
fn qualified_wildcard_is_terminal_only() {
    let item = first_item("SELECT t.* FROM t");
    assert!(matches!(item, ValueExpr::Column(c) if c.is_wildcard() && c.namespaces == ["t"]));
    let err = parse_err("SELECT t.*.b FROM t");
    assert!(matches!(err, ParseError::Context { source, .. }
        if matches!(*source, ParseError::WildcardMisuse { .. })));
}

#[test]
fn wildcard_as_sole_function_argument() {
    let expr = first_item("SELECT count(*)");
    let ValueExpr::Function(call) = expr else {
        panic!("expected a call");
    };
    let FunctionArguments::List(args) = &call.args else {
        panic!("expected plain args");
    };
    assert!(matches!(&args[0], ValueExpr::Column(c) if c.is_wildcard()));
}

#[test]
fn wildcard_mixed_into_argument_list_is_rejected() {
    for sql in ["SELECT count(*, 1)", "SELECT count(1, *)"] {
        let err = parse_err(sql);
        assert!(
            matches!(err, ParseError::Context { source, .. }
                if matches!(*source, ParseError::WildcardMisuse { .. })),
            "expected WildcardMisuse for {sql}"
        );
    }
}

#[test]
fn wildcard_cannot_be_an_operand() {
    for sql in ["SELECT * + 1 FROM t", "SELECT *::int FROM t", "SELECT (*) FROM t"] {
        let err = parse_err(sql);
        assert!(
            matches!(err, ParseError::Context { source, .. }
                if matches!(*source, ParseError::WildcardMisuse { .. })),
            "expected WildcardMisuse for {sql}"
        );
    }
}

#[test]
fn in_list_and_in_subquery() {
    let expr = where_expr("SELECT * FROM t WHERE id IN (1, 2, 3)");
    let ValueExpr::Binary(binary) = expr else {
        panic!("expected binary IN");
    };
    assert_eq!(binary.operator, "in");
    assert!(matches!(&binary.right, ValueExpr::ValueList(items) if items.len() == 3));

    let expr = where_expr("SELECT * FROM t WHERE id NOT IN (SELECT id FROM banned)");
    let ValueExpr::Binary(binary) = expr else {
        panic!("expected binary NOT IN");
    };
    assert_eq!(binary.operator, "not in");
    assert!(matches!(&binary.right, ValueExpr::InlineQuery(_)));
}

#[test]
fn exists_predicate() {
    let expr = where_expr("SELECT * FROM t WHERE EXISTS (SELECT 1 FROM u)");
    assert!(matches!(expr, ValueExpr::Unary(u) if u.operator == "exists"));
}

#[test]
fn is_not_distinct_from() {
    let expr = where_expr("SELECT * FROM t WHERE a IS NOT DISTINCT FROM b");
    assert!(matches!(expr, ValueExpr::Binary(b) if b.operator == "is not distinct from"));
}

#[test]
fn case_searched_and_simple() {
    let expr = first_item("SELECT CASE WHEN x > 0 THEN 'pos' ELSE 'neg' END");
    let ValueExpr::Case(case) = expr else {
        panic!("expected CASE");
    };
    assert!(case.operand.is_none());
    assert_eq!(case.switch.pairs.len(), 1);
    assert!(case.switch.else_value.is_some());

    let expr = first_item("SELECT CASE kind WHEN 1 THEN 'a' WHEN 2 THEN 'b' END");
    let ValueExpr::Case(case) = expr else {
        panic!("expected CASE");
    };
    assert!(case.operand.is_some());
    assert_eq!(case.switch.pairs.len(), 2);
    round_trip("SELECT CASE kind WHEN 1 THEN 'a' WHEN 2 THEN 'b' END");
}

#[test]
fn substring_from_for() {
    let expr = first_item("SELECT substring(name FROM 2 FOR 3)");
    let ValueExpr::Function(call) = expr else {
        panic!("expected a call");
    };
    assert!(matches!(
        &call.args,
        FunctionArguments::Substring { from: Some(_), for_count: Some(_), .. }
    ));
    round_trip("SELECT substring(name FROM 2 FOR 3)");
}

#[test]
fn trim_leading_form() {
    let expr = first_item("SELECT trim(LEADING 'x' FROM name)");
    let ValueExpr::Function(call) = expr else {
        panic!("expected a call");
    };
    assert!(matches!(&call.args, FunctionArguments::Trim { side: Some(_), characters: Some(_), .. }));
}

#[test]
fn position_in_form() {
    let expr = first_item("SELECT position('x' IN name)");
    let ValueExpr::Function(call) = expr else {
        panic!("expected a call");
    };
    assert!(matches!(&call.args, FunctionArguments::Position { .. }));
}

#[test]
fn window_function_decorations() {
    let expr = first_item(
        "SELECT rank() OVER (PARTITION BY dept ORDER BY salary DESC \
         ROWS BETWEEN UNBOUNDED PRECEDING AND CURRENT ROW) FROM emp",
    );
    let ValueExpr::Function(call) = expr else {
        panic!("expected a call");
    };
    let over = call.over.as_ref().unwrap();
    assert_eq!(over.partition_by.len(), 1);
    assert_eq!(over.order_by.len(), 1);
    assert!(over.frame.is_some());
}

#[test]
fn aggregate_filter_and_within_group() {
    let expr = first_item(
        "SELECT percentile_cont(0.5) WITHIN GROUP (ORDER BY x) FILTER (WHERE x > 0) FROM t",
    );
    let ValueExpr::Function(call) = expr else {
        panic!("expected a call");
    };
    assert!(call.within_group.is_some());
    assert!(call.filter.is_some());
}

#[test]
fn array_literal_and_query() {
    let expr = first_item("SELECT ARRAY[1, 2, 3]");
    assert!(matches!(expr, ValueExpr::Array(items) if items.len() == 3));
    let expr = first_item("SELECT ARRAY(SELECT id FROM t)");
    assert!(matches!(expr, ValueExpr::ArrayQuery(_)));
}

#[test]
fn array_index_and_slice() {
    let expr = first_item("SELECT tags[1]");
    assert!(matches!(expr, ValueExpr::ArrayIndex(_)));
    let expr = first_item("SELECT tags[1:2]");
    assert!(matches!(expr, ValueExpr::ArraySlice(_)));
}

#[test]
fn dollar_quoted_string_is_verbatim() {
    let expr = first_item("SELECT $body$line1;\nline2$body$");
    assert_eq!(
        expr,
        ValueExpr::Literal(LiteralValue::String("$body$line1;\nline2$body$".into()))
    );
}

#[test]
fn string_specifier_expression() {
    let expr = first_item("SELECT e'a\\nb'");
    assert!(matches!(expr, ValueExpr::StringSpecifier(s) if s.specifier == "e"));
}

#[test]
fn parameters_of_all_shapes() {
    for sql in ["SELECT ?", "SELECT $1", "SELECT :name", "SELECT @name"] {
        let expr = first_item(sql);
        assert!(matches!(expr, ValueExpr::Parameter(_)), "failed for {sql}");
    }
}

#[test]
fn json_operators_parse_as_comparisons() {
    let expr = where_expr("SELECT * FROM t WHERE doc ->> 'k' = 'v'");
    let ValueExpr::Binary(eq) = expr else {
        panic!("expected =");
    };
    assert_eq!(eq.operator, "=");
    assert!(matches!(&eq.left, ValueExpr::Binary(arrow) if arrow.operator == "->>"));
}

#[test]
fn unary_not_binds_below_comparison() {
    let expr = where_expr("SELECT * FROM t WHERE NOT a = b");
    let ValueExpr::Unary(not) = expr else {
        panic!("expected NOT");
    };
    assert!(matches!(&*not.expr, ValueExpr::Binary(eq) if eq.operator == "="));
}
