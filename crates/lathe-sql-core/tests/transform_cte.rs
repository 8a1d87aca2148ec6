//! Tests for CTE management and renaming across the full
//! parse → transform → print pipeline.

mod common;
use common::*;

use pretty_assertions::assert_eq;

use lathe_sql_core::ast::SelectQuery;
use lathe_sql_core::print::{format_query, SqlPrintStyle};
use lathe_sql_core::transform::{
    rename_cte, rename_cte_at_position, smart_rename, CteOptions, SmartRenameOptions,
    TransformError,
};
use lathe_sql_core::LineColumn;

#[test]
fn add_cte_then_query_invariants() {
    let mut query = parse_select("SELECT * FROM t");
    let body = parse_select("SELECT 1 AS one");
    query.add_cte("numbers", body, CteOptions::default()).unwrap();
    assert!(query.has_cte("numbers"));
    assert!(query.get_cte_names().contains(&"numbers".to_string()));
}

#[test]
fn cte_ops_are_all_or_nothing() {
    let mut query = parse_select("WITH a AS (SELECT 1) SELECT * FROM a");
    let before = query.clone();
    let body = parse_select("SELECT 2");
    assert!(query.add_cte("a", body, CteOptions::default()).is_err());
    assert_eq!(query, before);
    assert!(query.remove_cte("zz").is_err());
    assert_eq!(query, before);
}

#[test]
fn rename_then_print_with_postgres_preset() {
    // Parse, rename c -> d, re-print; whitespace may vary.
    let mut query = parse_select("WITH c AS (SELECT id FROM t) SELECT * FROM c");
    rename_cte(&mut query, "c", "d").unwrap();
    let style = SqlPrintStyle::preset("postgres").unwrap();
    let out = normalize_ws(&format_query(&query, &style).sql);
    assert!(out.contains("with d as"), "got: {out}");
    assert!(out.contains("select id from t"), "got: {out}");
    assert!(out.ends_with("from d"), "got: {out}");
    assert!(!out.contains("from c"), "got: {out}");
}

#[test]
fn rename_soundness() {
    let mut query = parse_select(
        "WITH old AS (SELECT id FROM t) \
         SELECT old.id FROM old JOIN other ON other.ref = old.id",
    );
    rename_cte(&mut query, "old", "fresh").unwrap();
    let rendered = query.to_string();
    assert!(!rendered.contains("old."));
    assert!(!rendered.contains("from old"));
    assert!(rendered.contains("fresh"));
}

#[test]
fn rename_back_is_identity_when_unused() {
    let original = parse_select("WITH a AS (SELECT 1) SELECT * FROM a");
    let mut query = original.clone();
    rename_cte(&mut query, "a", "b").unwrap();
    rename_cte(&mut query, "b", "a").unwrap();
    assert_eq!(query, original);
}

#[test]
fn rename_does_not_touch_writable_cte_bodies() {
    let mut query = parse_select(
        "WITH c AS (SELECT 1), w AS (DELETE FROM c RETURNING id) SELECT * FROM c",
    );
    rename_cte(&mut query, "c", "d").unwrap();
    let rendered = query.to_string();
    // The writable body keeps its original reference.
    assert!(rendered.contains("delete from c"), "got: {rendered}");
    assert!(rendered.contains("with d as"), "got: {rendered}");
    assert!(rendered.ends_with("from d"), "got: {rendered}");
}

#[test]
fn rename_at_position_on_keyword_fails_and_preserves_input() {
    let sql = "WITH c AS (SELECT id FROM t) SELECT * FROM c";
    let err = rename_cte_at_position(sql, LineColumn::new(1, 31), "d").unwrap_err();
    assert!(matches!(err, TransformError::UnsupportedToken { .. }));
}

#[test]
fn rename_at_position_happy_path() {
    let sql = "WITH c AS (SELECT id FROM t) SELECT * FROM c";
    let updated = rename_cte_at_position(sql, LineColumn::new(1, 6), "d").unwrap();
    assert_eq!(updated, "with d as (select id from t) select * from d");
}

#[test]
fn smart_rename_routes_by_target_kind() {
    // Cursor on a CTE alias renames the CTE everywhere.
    let sql = "WITH c AS (SELECT id FROM t) SELECT * FROM c";
    let updated = smart_rename(sql, LineColumn::new(1, 6), "d", SmartRenameOptions::default())
        .unwrap();
    assert!(updated.contains("with d as"));

    // Cursor on a table alias renames just that alias's scope.
    let sql = "SELECT u.id FROM users AS u";
    let updated = smart_rename(sql, LineColumn::new(1, 8), "m", SmartRenameOptions::default())
        .unwrap();
    assert_eq!(updated, "select m.id from users as m");
}

#[test]
fn smart_rename_formatting_preserving_postconditions() {
    let sql = "WITH c AS (SELECT id\n           FROM t)\nSELECT *\nFROM c";
    let updated = smart_rename(
        sql,
        LineColumn::new(1, 6),
        "renamed",
        SmartRenameOptions {
            preserve_formatting: true,
        },
    )
    .unwrap();
    assert_ne!(updated, sql);
    assert!(updated.contains("renamed"));
    // Original layout survives.
    assert!(updated.contains("SELECT id\n           FROM t"));
}

#[test]
fn values_query_delegates_via_conversion() {
    let mut query = parse_select("VALUES (1), (2)");
    if let SelectQuery::Values(values) = &mut query {
        values.column_aliases = Some(vec!["n".into()]);
    }
    query
        .add_cte("c", parse_select("SELECT 1"), CteOptions::default())
        .unwrap();
    assert!(query.has_cte("c"));
    assert!(matches!(query, SelectQuery::Simple(_)));
}
