#![allow(dead_code)]

use lathe_sql_core::ast::{
    DeleteQuery, InsertQuery, MergeQuery, SelectQuery, SimpleSelectQuery, Statement, UpdateQuery,
};
use lathe_sql_core::parser::{self, ParseError};

pub fn parse(sql: &str) -> Statement {
    parser::parse_statement(sql)
        .unwrap_or_else(|e| panic!("Failed to parse: {sql}\nError: {e}"))
}

pub fn parse_err(sql: &str) -> ParseError {
    parser::parse_statement(sql).expect_err(&format!("Expected parse error for: {sql}"))
}

pub fn parse_select(sql: &str) -> SelectQuery {
    parser::parse_select(sql)
        .unwrap_or_else(|e| panic!("Failed to parse select: {sql}\nError: {e}"))
}

pub fn parse_simple(sql: &str) -> SimpleSelectQuery {
    match parse_select(sql) {
        SelectQuery::Simple(simple) => simple,
        other => panic!("Expected a simple select, got {other:?}"),
    }
}

pub fn parse_insert(sql: &str) -> InsertQuery {
    parser::parse_insert(sql)
        .unwrap_or_else(|e| panic!("Failed to parse insert: {sql}\nError: {e}"))
}

pub fn parse_update(sql: &str) -> UpdateQuery {
    parser::parse_update(sql)
        .unwrap_or_else(|e| panic!("Failed to parse update: {sql}\nError: {e}"))
}

pub fn parse_delete(sql: &str) -> DeleteQuery {
    parser::parse_delete(sql)
        .unwrap_or_else(|e| panic!("Failed to parse delete: {sql}\nError: {e}"))
}

pub fn parse_merge(sql: &str) -> MergeQuery {
    parser::parse_merge(sql)
        .unwrap_or_else(|e| panic!("Failed to parse merge: {sql}\nError: {e}"))
}

/// Verifies the parse/print fixed point: rendering a parsed statement
/// and re-parsing it yields the same rendering and the same tree.
pub fn round_trip(sql: &str) {
    let first = parse(sql);
    let rendered = first.to_string();
    let second = parse(&rendered);
    assert_eq!(
        second, first,
        "Round-trip changed the tree.\n  Input:    {sql}\n  Rendered: {rendered}"
    );
    assert_eq!(
        second.to_string(),
        rendered,
        "Round-trip is not a fixed point.\n  Input: {sql}"
    );
}

/// Collapses all whitespace runs to single spaces.
pub fn normalize_ws(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}
