//! Cursor resolution: map text positions to lexemes, and split
//! multi-statement files.

use crate::lexer::{line_column_to_offset, tokenize, Lexeme, LineColumn};

/// Returns the lexeme whose half-open span covers the byte offset.
/// Whitespace positions and unparseable text yield `None`.
#[must_use]
pub fn find_lexeme_at_position(sql: &str, offset: usize) -> Option<Lexeme> {
    let lexemes = tokenize(sql).ok()?;
    lexemes
        .into_iter()
        .find(|lexeme| lexeme.position.is_some_and(|p| p.span.contains(offset)))
}

/// Returns the lexeme under a 1-based line/column cursor.
#[must_use]
pub fn find_lexeme_at_line_column(sql: &str, position: LineColumn) -> Option<Lexeme> {
    let offset = line_column_to_offset(sql, position)?;
    find_lexeme_at_position(sql, offset)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitState {
    Normal,
    SingleQuote,
    DoubleQuote,
    Backtick,
    LineComment,
    BlockComment,
}

/// Splits a file of SQL statements on semicolons, tracking quote,
/// comment, and dollar-quote state so embedded semicolons do not
/// split. Trailing same-line comments merge into their statement.
#[must_use]
pub fn split_queries(sql: &str) -> Vec<String> {
    let bytes = sql.as_bytes();
    let mut statements = Vec::new();
    let mut start = 0;
    let mut state = SplitState::Normal;
    let mut dollar_tag: Option<String> = None;
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;
        match state {
            SplitState::Normal => {
                if let Some(tag) = &dollar_tag {
                    // Inside $tag$ … $tag$; only the closing fence matters.
                    let fence = format!("${tag}$");
                    if c == '$' && sql[i..].starts_with(&fence) {
                        i += fence.len();
                        dollar_tag = None;
                        continue;
                    }
                    i += 1;
                    continue;
                }
                match c {
                    '\'' => state = SplitState::SingleQuote,
                    '"' => state = SplitState::DoubleQuote,
                    '`' => state = SplitState::Backtick,
                    '-' if sql[i..].starts_with("--") => state = SplitState::LineComment,
                    '/' if sql[i..].starts_with("/*") => state = SplitState::BlockComment,
                    '$' => {
                        if let Some(tag) = read_dollar_tag(&sql[i..]) {
                            i += tag.len() + 2;
                            dollar_tag = Some(tag);
                            continue;
                        }
                    }
                    ';' => {
                        let mut end = i + 1;
                        // Merge a same-line trailing comment into this
                        // statement.
                        let mut j = end;
                        while j < bytes.len() && matches!(bytes[j] as char, ' ' | '\t') {
                            j += 1;
                        }
                        if sql[j..].starts_with("--") {
                            while j < bytes.len() && bytes[j] as char != '\n' {
                                j += 1;
                            }
                            end = j;
                        }
                        let statement = sql[start..end].trim();
                        if !statement.is_empty() {
                            statements.push(statement.to_string());
                        }
                        start = end;
                        i = end;
                        continue;
                    }
                    _ => {}
                }
            }
            SplitState::SingleQuote => {
                if c == '\'' {
                    if sql[i + 1..].starts_with('\'') {
                        i += 2;
                        continue;
                    }
                    state = SplitState::Normal;
                }
            }
            SplitState::DoubleQuote => {
                if c == '"' {
                    state = SplitState::Normal;
                }
            }
            SplitState::Backtick => {
                if c == '`' {
                    state = SplitState::Normal;
                }
            }
            SplitState::LineComment => {
                if c == '\n' {
                    state = SplitState::Normal;
                }
            }
            SplitState::BlockComment => {
                if c == '*' && sql[i..].starts_with("*/") {
                    i += 2;
                    state = SplitState::Normal;
                    continue;
                }
            }
        }
        i += 1;
    }

    let tail = sql[start..].trim();
    if !tail.is_empty() {
        statements.push(tail.to_string());
    }
    statements
}

/// Reads the tag of a `$tag$` fence at the start of the slice,
/// returning the bare tag (possibly empty for `$$`).
fn read_dollar_tag(s: &str) -> Option<String> {
    let mut chars = s.chars();
    if chars.next() != Some('$') {
        return None;
    }
    let mut tag = String::new();
    for c in chars {
        if c == '$' {
            return Some(tag);
        }
        if c.is_alphanumeric() || c == '_' {
            tag.push(c);
        } else {
            return None;
        }
    }
    None
}
