//! Tests for the print pipeline: presets, parameters, comments, and
//! the round-trip laws.

mod common;
use common::*;

use pretty_assertions::assert_eq;

use lathe_sql_core::lexer::tokenize;
use lathe_sql_core::print::{
    format_query, CommentMode, PlaceholderParams, PrintError, SqlPrintStyle,
};

#[test]
fn invalid_preset_is_rejected() {
    let err = SqlPrintStyle::preset("oracle").unwrap_err();
    assert!(matches!(err, PrintError::InvalidPreset { name } if name == "oracle"));
}

#[test]
fn postgres_preset_emission() {
    let query = parse_select("SELECT id FROM users WHERE name = :who");
    let style = SqlPrintStyle::preset("postgres").unwrap();
    let result = format_query(&query, &style);
    let flat = normalize_ws(&result.sql);
    assert_eq!(flat, "select id from users where name = $1");
    assert!(matches!(result.params, PlaceholderParams::Indexed(ref v) if v.len() == 1));
}

#[test]
fn mysql_preset_emission() {
    let query = parse_select("SELECT id FROM users WHERE name = :who");
    let style = SqlPrintStyle::preset("mysql").unwrap();
    let result = format_query(&query, &style);
    let flat = normalize_ws(&result.sql);
    assert_eq!(flat, "SELECT id FROM users WHERE name = ?");
    assert!(matches!(result.params, PlaceholderParams::Anonymous(_)));
}

#[test]
fn sqlserver_preset_keeps_names() {
    let query = parse_select("SELECT id FROM users WHERE name = :who AND age > :min_age");
    let style = SqlPrintStyle::preset("sqlserver").unwrap();
    let result = format_query(&query, &style);
    assert!(result.sql.contains("@who"));
    assert!(result.sql.contains("@min_age"));
    let PlaceholderParams::Named(named) = result.params else {
        panic!("expected named params");
    };
    assert_eq!(named[0].0, "who");
    assert_eq!(named[1].0, "min_age");
}

#[test]
fn sqlite_preset_named_colon() {
    let query = parse_select("SELECT id FROM t WHERE a = :x");
    let style = SqlPrintStyle::preset("sqlite").unwrap();
    let result = format_query(&query, &style);
    assert!(result.sql.contains(":x"));
}

#[test]
fn identifier_escaping_per_preset() {
    let query = parse_select("SELECT \"Weird Name\" FROM t");
    let pg = format_query(&query, &SqlPrintStyle::preset("postgres").unwrap());
    assert!(pg.sql.contains("\"Weird Name\""));
    let my = format_query(&query, &SqlPrintStyle::preset("mysql").unwrap());
    assert!(my.sql.contains("`Weird Name`"));
    let ms = format_query(&query, &SqlPrintStyle::preset("sqlserver").unwrap());
    assert!(ms.sql.contains("[Weird Name]"));
}

#[test]
fn bound_params_are_returned() {
    let mut query = parse_select("SELECT * FROM t WHERE a = :x");
    query.set_param("x", lathe_sql_core::ast::LiteralValue::Number("7".into()));
    let result = format_query(&query, &SqlPrintStyle::preset("postgres").unwrap());
    let PlaceholderParams::Indexed(values) = result.params else {
        panic!("expected indexed params");
    };
    assert_eq!(
        values[0],
        Some(lathe_sql_core::ast::LiteralValue::Number("7".into()))
    );
}

#[test]
fn comment_modes() {
    let query = parse_select("-- header\nSELECT id FROM t -- trailing\n");
    let mut style = SqlPrintStyle::compact();

    style.comment_mode = CommentMode::Full;
    let full = format_query(&query, &style).sql;
    assert!(full.contains("/* header */"), "got: {full}");

    style.comment_mode = CommentMode::None;
    let none = format_query(&query, &style).sql;
    assert!(!none.contains("header"), "got: {none}");

    style.comment_mode = CommentMode::TopHeaderOnly;
    let top = format_query(&query, &style).sql;
    assert!(top.contains("header"), "got: {top}");
}

#[test]
fn smart_comment_style_uses_line_comments() {
    let query = parse_select("-- header\nSELECT id FROM t");
    let style = SqlPrintStyle::preset("postgres").unwrap();
    let out = format_query(&query, &style).sql;
    assert!(out.starts_with("-- header"), "got: {out}");
}

#[test]
fn multiline_layout_breaks_clauses() {
    let query = parse_select("SELECT a, b FROM t WHERE a = 1 AND b = 2 ORDER BY a");
    let style = SqlPrintStyle::preset("postgres").unwrap();
    let out = format_query(&query, &style).sql;
    assert!(out.contains("\nfrom t"), "got: {out}");
    assert!(out.contains("\norder by"), "got: {out}");
    // and_break = Before puts AND at a line start.
    assert!(out.contains("\n    and"), "got: {out}");
}

#[test]
fn parse_print_parse_is_a_fixed_point() {
    for sql in [
        "SELECT a, b + 1 AS c FROM t WHERE a BETWEEN 1 AND 2",
        "WITH c AS (SELECT 1 AS n) SELECT n FROM c",
        "SELECT count(*) FROM t GROUP BY k HAVING count(*) > 2",
        "SELECT x::int FROM t",
        "INSERT INTO t (a) VALUES (1) RETURNING a",
        "SELECT CASE WHEN a THEN 1 ELSE 2 END FROM t",
    ] {
        round_trip(sql);
    }
}

#[test]
fn tokenize_format_parse_preserves_lexeme_values() {
    let sql = "SELECT Id, name FROM Users WHERE active = true";
    let original: Vec<String> = tokenize(sql).unwrap().into_iter().map(|l| l.value).collect();
    let rendered = parse_select(sql).to_string();
    let reprinted: Vec<String> = tokenize(&rendered)
        .unwrap()
        .into_iter()
        .map(|l| l.value)
        .collect();
    assert_eq!(original, reprinted);
}
