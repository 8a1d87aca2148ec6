//! Whole-input tokenizer invariants: span coverage and comment
//! attachment.

use lathe_sql_core::lexer::{tokenize, CommentPosition, LexemeKind};

const SAMPLES: &[&str] = &[
    "SELECT id, name FROM users WHERE active = true",
    "WITH c AS (SELECT 1) SELECT * FROM c ORDER BY 1",
    "INSERT INTO t (a, b) VALUES (1, 'x''y'), (2, $q$a;b$q$)",
    "SELECT count(*) FILTER (WHERE x > 0) OVER (PARTITION BY y) FROM t",
    "MERGE INTO t USING s ON t.id = s.id WHEN MATCHED THEN DO NOTHING",
];

/// Interleaving the original whitespace with the lexeme spans
/// reproduces the input text.
#[test]
fn spans_reconstruct_the_input() {
    for sql in SAMPLES {
        let lexemes = tokenize(sql).unwrap();
        let mut rebuilt = String::new();
        let mut cursor = 0;
        for lexeme in &lexemes {
            let span = lexeme.position.expect("tokenizer fills positions").span;
            assert!(span.start >= cursor, "overlapping spans in: {sql}");
            let gap = &sql[cursor..span.start];
            assert!(
                gap.chars().all(char::is_whitespace),
                "non-trivia gap {gap:?} in: {sql}"
            );
            rebuilt.push_str(gap);
            rebuilt.push_str(&sql[span.start..span.end]);
            cursor = span.end;
        }
        rebuilt.push_str(&sql[cursor..]);
        assert_eq!(&rebuilt, sql);
    }
}

/// Lexeme spans cover their source spelling: the slice differs from
/// the value only by case and inner whitespace for keywords.
#[test]
fn keyword_spans_cover_their_phrases() {
    let sql = "select ORDER   BY from_col FROM t ORDER BY 1";
    let lexemes = tokenize(sql).unwrap();
    let order_by = lexemes
        .iter()
        .find(|l| l.is_command("order by"))
        .expect("order by lexeme");
    let span = order_by.position.unwrap().span;
    assert_eq!(&sql[span.start..span.end], "ORDER   BY");
}

#[test]
fn comment_attachment_before_and_after() {
    let sql = "-- leading\nSELECT 1, -- first row\n  2 /* mid */ + 3\nFROM t";
    let lexemes = tokenize(sql).unwrap();
    assert_eq!(
        lexemes[0].positioned_comments_at(CommentPosition::Before),
        vec!["leading".to_string()]
    );
    // `-- first row` trails the comma on its line.
    let comma = lexemes.iter().find(|l| l.is(LexemeKind::COMMA)).unwrap();
    assert_eq!(
        comma.positioned_comments_at(CommentPosition::After),
        vec!["first row".to_string()]
    );
    // `/* mid */` precedes the `+`.
    let plus = lexemes.iter().find(|l| l.is_operator("+")).unwrap();
    assert_eq!(
        plus.positioned_comments_at(CommentPosition::Before),
        vec!["mid".to_string()]
    );
}

#[test]
fn legacy_and_positioned_lists_stay_in_sync() {
    let sql = "-- a\n/* b */ SELECT 1";
    let lexemes = tokenize(sql).unwrap();
    assert_eq!(lexemes[0].comments, vec!["a".to_string(), "b".into()]);
    assert_eq!(
        lexemes[0].positioned_comments_at(CommentPosition::Before),
        vec!["a".to_string(), "b".into()]
    );
}
