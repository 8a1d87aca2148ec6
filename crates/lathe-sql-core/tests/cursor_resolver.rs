//! Tests for the cursor resolver and the multi-query splitter.

use lathe_sql_core::cursor::{
    find_lexeme_at_line_column, find_lexeme_at_position, split_queries,
};
use lathe_sql_core::lexer::{
    line_column_to_offset, text_to_line_column, LexemeKind, LineColumn,
};

#[test]
fn offset_resolution_half_open() {
    let sql = "SELECT id FROM users";
    // First byte of `id`.
    assert_eq!(find_lexeme_at_position(sql, 7).unwrap().value, "id");
    // One past `id` lands in whitespace.
    assert!(find_lexeme_at_position(sql, 9).is_none());
}

#[test]
fn line_column_resolution() {
    let sql = "SELECT id\nFROM users\nWHERE active";
    let lexeme = find_lexeme_at_line_column(sql, LineColumn::new(3, 7)).unwrap();
    assert_eq!(lexeme.value, "active");
    assert!(lexeme.kind.contains(LexemeKind::IDENTIFIER));
}

#[test]
fn position_math_is_inverse() {
    let text = "one\ntwo three\nfour";
    for offset in 0..text.len() {
        let lc = text_to_line_column(text, offset);
        assert_eq!(line_column_to_offset(text, lc), Some(offset));
    }
}

#[test]
fn out_of_range_positions() {
    let text = "one\ntwo";
    assert_eq!(line_column_to_offset(text, LineColumn::new(5, 1)), None);
    assert_eq!(line_column_to_offset(text, LineColumn::new(1, 99)), None);
}

#[test]
fn split_basic_statements() {
    let parts = split_queries("SELECT 1;\nSELECT 2;\n");
    assert_eq!(parts.len(), 2);
}

#[test]
fn split_keeps_dollar_quoted_semicolons() {
    let sql = "CREATE TABLE t (body text);\nINSERT INTO t VALUES ($fn$do; done$fn$);\n";
    let parts = split_queries(sql);
    assert_eq!(parts.len(), 2);
    assert!(parts[1].contains("$fn$do; done$fn$"));
}

#[test]
fn split_keeps_quoted_and_commented_semicolons() {
    let sql = "SELECT 'a;b'; /* x;y */ SELECT 2; -- z;w\nSELECT 3;";
    let parts = split_queries(sql);
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], "SELECT 'a;b';");
    assert!(parts[1].ends_with("SELECT 2; -- z;w"));
    assert_eq!(parts[2], "SELECT 3;");
}

#[test]
fn trailing_statement_without_semicolon() {
    let parts = split_queries("SELECT 1; SELECT 2");
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[1], "SELECT 2");
}
