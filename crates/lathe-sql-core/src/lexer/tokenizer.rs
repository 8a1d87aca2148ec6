//! SQL tokenizer.
//!
//! Scans SQL text left-to-right into positioned [`Lexeme`]s. Whitespace
//! and comments are not emitted; comments attach to the nearest lexeme
//! as `before`/`after` blocks. A top-level `;` terminates the scan.

use super::error::TokenizeError;
use super::keywords::KEYWORDS;
use super::position::{caret_diagram, LexemePosition, LineColumn, Span};
use super::token::{CommentPosition, Lexeme, LexemeKind};

/// Multi-character symbolic operators, longest first.
const OPERATOR_SYMBOLS: &[&str] = &[
    "!~*", "->>", "#>>", "<->", "::", "<=", ">=", "<>", "!=", "||", "->", "#>", "@>", "<@", "<<",
    ">>", "~*", "!~", "?|", "?&", "&&", "=", "<", ">", "+", "-", "*", "/", "%", "~", "^", "&", "|",
    "#",
];

#[derive(Debug, Clone, Copy)]
struct Scanner<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Scanner<'a> {
    const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(n)
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Advances by `bytes`, keeping line/column in sync.
    fn advance_bytes(&mut self, bytes: usize) {
        let target = self.pos + bytes;
        while self.pos < target {
            self.advance();
        }
    }

    const fn here(&self) -> LineColumn {
        LineColumn::new(self.line, self.column)
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }
}

/// The SQL tokenizer.
pub struct SqlTokenizer<'a> {
    scanner: Scanner<'a>,
}

impl<'a> SqlTokenizer<'a> {
    /// Creates a tokenizer over the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            scanner: Scanner::new(input),
        }
    }

    /// Tokenizes the entire input.
    ///
    /// # Errors
    ///
    /// Returns a [`TokenizeError`] on unterminated strings or comments,
    /// invalid dollar quotes, and characters that cannot start a lexeme.
    pub fn tokenize(mut self) -> Result<Vec<Lexeme>, TokenizeError> {
        let mut lexemes: Vec<Lexeme> = Vec::new();
        loop {
            let pending = self.collect_trivia()?;
            if self.scanner.is_eof() || self.scanner.peek() == Some(';') {
                // Comments after the last lexeme attach to it as `after`.
                if !pending.is_empty() {
                    if let Some(last) = lexemes.last_mut() {
                        last.add_positioned_comments(CommentPosition::After, &pending);
                    }
                }
                break;
            }
            let prev_kind = lexemes.last().map(|l| l.kind);
            let mut lexeme = self.next_lexeme(prev_kind)?;
            if !pending.is_empty() {
                lexeme.add_positioned_comments(CommentPosition::Before, &pending);
            }
            let trailing = self.collect_trailing_comments()?;
            if !trailing.is_empty() {
                lexeme.add_positioned_comments(CommentPosition::After, &trailing);
            }
            lexemes.push(lexeme);
        }
        Ok(lexemes)
    }

    /// Skips whitespace and comments, returning the comment texts seen.
    fn collect_trivia(&mut self) -> Result<Vec<String>, TokenizeError> {
        let mut comments = Vec::new();
        loop {
            while self.scanner.peek().is_some_and(char::is_whitespace) {
                self.scanner.advance();
            }
            if self.scanner.rest().starts_with("--") {
                comments.push(self.scan_line_comment());
                continue;
            }
            if self.scanner.rest().starts_with("/*") {
                comments.push(self.scan_block_comment()?);
                continue;
            }
            break;
        }
        Ok(comments)
    }

    /// After a lexeme, consumes comments that close out the current
    /// line. A block comment followed by more code on the same line is
    /// left in place so it attaches to the next lexeme as `before`.
    fn collect_trailing_comments(&mut self) -> Result<Vec<String>, TokenizeError> {
        let mut comments = Vec::new();
        loop {
            let saved = self.scanner;
            while matches!(self.scanner.peek(), Some(' ' | '\t')) {
                self.scanner.advance();
            }
            if self.scanner.rest().starts_with("--") {
                comments.push(self.scan_line_comment());
                continue;
            }
            if self.scanner.rest().starts_with("/*") {
                let start_line = self.scanner.line;
                let text = self.scan_block_comment()?;
                let multi_line = self.scanner.line != start_line;
                let mut lookahead = self.scanner;
                while matches!(lookahead.peek(), Some(' ' | '\t')) {
                    lookahead.advance();
                }
                let closes_line = matches!(lookahead.peek(), Some('\n' | '\r') | None);
                if !multi_line && closes_line {
                    comments.push(text);
                    continue;
                }
                self.scanner = saved;
                break;
            }
            self.scanner = saved;
            break;
        }
        Ok(comments)
    }

    fn scan_line_comment(&mut self) -> String {
        self.scanner.advance();
        self.scanner.advance();
        let start = self.scanner.pos;
        while self.scanner.peek().is_some_and(|c| c != '\n') {
            self.scanner.advance();
        }
        self.scanner.input[start..self.scanner.pos].trim().to_string()
    }

    fn scan_block_comment(&mut self) -> Result<String, TokenizeError> {
        let open = self.scanner.pos;
        self.scanner.advance();
        self.scanner.advance();
        let start = self.scanner.pos;
        loop {
            if self.scanner.rest().starts_with("*/") {
                let text = self.scanner.input[start..self.scanner.pos].trim().to_string();
                self.scanner.advance();
                self.scanner.advance();
                return Ok(text);
            }
            if self.scanner.advance().is_none() {
                return Err(TokenizeError::UnterminatedBlockComment {
                    span: Span::new(open, self.scanner.pos),
                    diagram: caret_diagram(self.scanner.input, open),
                });
            }
        }
    }

    fn next_lexeme(&mut self, prev_kind: Option<LexemeKind>) -> Result<Lexeme, TokenizeError> {
        let start = self.scanner.pos;
        let start_lc = self.scanner.here();
        let c = self.scanner.peek().unwrap_or_default();

        let (kind, value) = match c {
            '(' => self.single(LexemeKind::OPEN_PAREN),
            ')' => self.single(LexemeKind::CLOSE_PAREN),
            ',' => self.single(LexemeKind::COMMA),
            '.' => self.single(LexemeKind::DOT),
            ']' => self.single(LexemeKind::CLOSE_BRACKET),
            '[' => self.scan_bracket(prev_kind)?,
            '\'' => (LexemeKind::LITERAL, self.scan_quoted('\'', false)?),
            '"' => (LexemeKind::IDENTIFIER, self.scan_quoted_identifier('"')?),
            '`' => (LexemeKind::IDENTIFIER, self.scan_quoted_identifier('`')?),
            '$' => self.scan_dollar()?,
            ':' => self.scan_colon(),
            '@' => self.scan_at(),
            '?' => self.scan_question(),
            c if c.is_ascii_digit() => (LexemeKind::LITERAL, self.scan_number()),
            c if c.is_alphabetic() || c == '_' => self.scan_word()?,
            _ => {
                if let Some(op) = self.try_operator() {
                    (LexemeKind::OPERATOR, op)
                } else {
                    return Err(TokenizeError::InvalidCharacter {
                        character: c,
                        span: Span::new(start, start + c.len_utf8()),
                        diagram: caret_diagram(self.scanner.input, start),
                    });
                }
            }
        };

        let position = LexemePosition::new(
            Span::new(start, self.scanner.pos),
            start_lc,
            self.scanner.here(),
        );
        Ok(Lexeme::with_position(kind, value, position))
    }

    fn single(&mut self, kind: LexemeKind) -> (LexemeKind, String) {
        let c = self.scanner.advance().unwrap_or_default();
        (kind, c.to_string())
    }

    fn try_operator(&mut self) -> Option<String> {
        let rest = self.scanner.rest();
        for symbol in OPERATOR_SYMBOLS {
            if rest.starts_with(symbol) {
                self.scanner.advance_bytes(symbol.len());
                return Some((*symbol).to_string());
            }
        }
        None
    }

    /// `[` opens an array index after a value; otherwise it quotes an
    /// identifier, SQL Server style.
    fn scan_bracket(
        &mut self,
        prev_kind: Option<LexemeKind>,
    ) -> Result<(LexemeKind, String), TokenizeError> {
        let after_value = prev_kind.is_some_and(|k| {
            k.intersects(
                LexemeKind::IDENTIFIER
                    | LexemeKind::LITERAL
                    | LexemeKind::CLOSE_PAREN
                    | LexemeKind::CLOSE_BRACKET
                    | LexemeKind::PARAMETER,
            )
        });
        if after_value {
            return Ok(self.single(LexemeKind::OPEN_BRACKET));
        }
        let open = self.scanner.pos;
        self.scanner.advance();
        let start = self.scanner.pos;
        while self.scanner.peek().is_some_and(|c| c != ']' && c != '\n') {
            self.scanner.advance();
        }
        if self.scanner.peek() != Some(']') {
            return Err(TokenizeError::UnterminatedString {
                span: Span::new(open, self.scanner.pos),
                diagram: caret_diagram(self.scanner.input, open),
            });
        }
        let name = self.scanner.input[start..self.scanner.pos].to_string();
        self.scanner.advance();
        Ok((LexemeKind::IDENTIFIER, name))
    }

    /// Scans a quoted run, returning the raw text including quotes.
    /// A doubled quote escapes itself; `allow_backslash` additionally
    /// lets `\` escape the next character.
    fn scan_quoted(&mut self, quote: char, allow_backslash: bool) -> Result<String, TokenizeError> {
        let open = self.scanner.pos;
        self.scanner.advance();
        loop {
            match self.scanner.peek() {
                Some(c) if c == quote => {
                    if self.scanner.peek_at(1) == Some(quote) {
                        self.scanner.advance();
                        self.scanner.advance();
                    } else {
                        self.scanner.advance();
                        return Ok(self.scanner.input[open..self.scanner.pos].to_string());
                    }
                }
                Some('\\') if allow_backslash => {
                    self.scanner.advance();
                    self.scanner.advance();
                }
                Some(_) => {
                    self.scanner.advance();
                }
                None => {
                    return Err(TokenizeError::UnterminatedString {
                        span: Span::new(open, self.scanner.pos),
                        diagram: caret_diagram(self.scanner.input, open),
                    });
                }
            }
        }
    }

    /// Scans a quoted identifier, returning the unescaped inner text.
    fn scan_quoted_identifier(&mut self, quote: char) -> Result<String, TokenizeError> {
        let raw = self.scan_quoted(quote, false)?;
        let inner = &raw[quote.len_utf8()..raw.len() - quote.len_utf8()];
        let doubled: String = [quote, quote].iter().collect();
        Ok(inner.replace(&doubled, &quote.to_string()))
    }

    fn scan_number(&mut self) -> String {
        let start = self.scanner.pos;
        while self.scanner.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.scanner.advance();
        }
        if self.scanner.peek() == Some('.')
            && self.scanner.peek_at(1).is_some_and(|c| c.is_ascii_digit())
        {
            self.scanner.advance();
            while self.scanner.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.scanner.advance();
            }
        }
        if matches!(self.scanner.peek(), Some('e' | 'E'))
            && matches!(
                (self.scanner.peek_at(1), self.scanner.peek_at(2)),
                (Some(d), _) if d.is_ascii_digit()
            ) || matches!(
                (self.scanner.peek(), self.scanner.peek_at(1), self.scanner.peek_at(2)),
                (Some('e' | 'E'), Some('+' | '-'), Some(d)) if d.is_ascii_digit()
            )
        {
            self.scanner.advance();
            if matches!(self.scanner.peek(), Some('+' | '-')) {
                self.scanner.advance();
            }
            while self.scanner.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.scanner.advance();
            }
        }
        self.scanner.input[start..self.scanner.pos].to_string()
    }

    /// `$1`, `${name}`, `$name`, or `$tag$ ... $tag$`.
    fn scan_dollar(&mut self) -> Result<(LexemeKind, String), TokenizeError> {
        let open = self.scanner.pos;
        self.scanner.advance();
        match self.scanner.peek() {
            Some(c) if c.is_ascii_digit() => {
                while self.scanner.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.scanner.advance();
                }
                Ok((
                    LexemeKind::PARAMETER,
                    self.scanner.input[open..self.scanner.pos].to_string(),
                ))
            }
            Some('{') => {
                self.scanner.advance();
                let start = self.scanner.pos;
                while self.scanner.peek().is_some_and(|c| c != '}') {
                    self.scanner.advance();
                }
                if self.scanner.peek() != Some('}') {
                    return Err(TokenizeError::InvalidDollarQuote {
                        span: Span::new(open, self.scanner.pos),
                        diagram: caret_diagram(self.scanner.input, open),
                    });
                }
                let name = self.scanner.input[start..self.scanner.pos].to_string();
                self.scanner.advance();
                Ok((LexemeKind::PARAMETER, format!("${{{name}}}")))
            }
            Some(c) if c.is_alphanumeric() || c == '_' || c == '$' => {
                let tag_start = self.scanner.pos;
                while self
                    .scanner
                    .peek()
                    .is_some_and(|c| c.is_alphanumeric() || c == '_')
                {
                    self.scanner.advance();
                }
                if self.scanner.peek() == Some('$') {
                    let tag = self.scanner.input[tag_start..self.scanner.pos].to_string();
                    self.scanner.advance();
                    let fence = format!("${tag}$");
                    match self.scanner.rest().find(&fence) {
                        Some(i) => {
                            self.scanner.advance_bytes(i + fence.len());
                            Ok((
                                LexemeKind::LITERAL,
                                self.scanner.input[open..self.scanner.pos].to_string(),
                            ))
                        }
                        None => Err(TokenizeError::InvalidDollarQuote {
                            span: Span::new(open, self.scanner.pos),
                            diagram: caret_diagram(self.scanner.input, open),
                        }),
                    }
                } else {
                    // `$name` style named parameter.
                    Ok((
                        LexemeKind::PARAMETER,
                        self.scanner.input[open..self.scanner.pos].to_string(),
                    ))
                }
            }
            _ => Err(TokenizeError::InvalidDollarQuote {
                span: Span::new(open, self.scanner.pos),
                diagram: caret_diagram(self.scanner.input, open),
            }),
        }
    }

    fn scan_colon(&mut self) -> (LexemeKind, String) {
        if self.scanner.peek_at(1) == Some(':') {
            self.scanner.advance();
            self.scanner.advance();
            return (LexemeKind::OPERATOR, "::".to_string());
        }
        if self
            .scanner
            .peek_at(1)
            .is_some_and(|c| c.is_alphabetic() || c == '_')
        {
            let open = self.scanner.pos;
            self.scanner.advance();
            while self
                .scanner
                .peek()
                .is_some_and(|c| c.is_alphanumeric() || c == '_')
            {
                self.scanner.advance();
            }
            return (
                LexemeKind::PARAMETER,
                self.scanner.input[open..self.scanner.pos].to_string(),
            );
        }
        self.scanner.advance();
        (LexemeKind::OPERATOR, ":".to_string())
    }

    fn scan_at(&mut self) -> (LexemeKind, String) {
        if self
            .scanner
            .peek_at(1)
            .is_some_and(|c| c.is_alphabetic() || c == '_')
        {
            let open = self.scanner.pos;
            self.scanner.advance();
            while self
                .scanner
                .peek()
                .is_some_and(|c| c.is_alphanumeric() || c == '_')
            {
                self.scanner.advance();
            }
            return (
                LexemeKind::PARAMETER,
                self.scanner.input[open..self.scanner.pos].to_string(),
            );
        }
        // `@>` and friends fall through to the operator table.
        let op = self.try_operator().unwrap_or_else(|| {
            self.scanner.advance();
            "@".to_string()
        });
        (LexemeKind::OPERATOR, op)
    }

    fn scan_question(&mut self) -> (LexemeKind, String) {
        match self.scanner.peek_at(1) {
            Some('|' | '&') => {
                let op = self.try_operator().unwrap_or_default();
                (LexemeKind::OPERATOR, op)
            }
            _ => {
                self.scanner.advance();
                (LexemeKind::PARAMETER, "?".to_string())
            }
        }
    }

    /// Words: keyword phrases via the trie, string specifiers, plain
    /// identifiers.
    fn scan_word(&mut self) -> Result<(LexemeKind, String), TokenizeError> {
        let rest = self.scanner.rest();

        // String specifiers: e'...', x'...', b'...', n'...', u&'...'.
        let mut chars = rest.chars();
        let first = chars.next().unwrap_or_default();
        if matches!(first, 'e' | 'E' | 'x' | 'X' | 'b' | 'B' | 'n' | 'N') && chars.next() == Some('\'')
        {
            let open = self.scanner.pos;
            self.scanner.advance();
            let allow_backslash = matches!(first, 'e' | 'E');
            self.scan_quoted('\'', allow_backslash)?;
            return Ok((
                LexemeKind::STRING_SPECIFIER,
                self.scanner.input[open..self.scanner.pos].to_string(),
            ));
        }
        if (rest.starts_with("u&'") || rest.starts_with("U&'")) && rest.len() > 2 {
            let open = self.scanner.pos;
            self.scanner.advance();
            self.scanner.advance();
            self.scan_quoted('\'', true)?;
            return Ok((
                LexemeKind::STRING_SPECIFIER,
                self.scanner.input[open..self.scanner.pos].to_string(),
            ));
        }

        if let Some(m) = KEYWORDS.longest_match(rest) {
            self.scanner.advance_bytes(m.length);
            return Ok((m.kind, m.normalized));
        }

        let start = self.scanner.pos;
        while self
            .scanner
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            self.scanner.advance();
        }
        let word = self.scanner.input[start..self.scanner.pos].to_string();

        // A call-shaped word may be an identifier, a function, or a
        // type constructor; the parser decides which.
        let mut lookahead = self.scanner;
        while lookahead.peek().is_some_and(char::is_whitespace) {
            lookahead.advance();
        }
        let kind = if lookahead.peek() == Some('(') {
            LexemeKind::IDENTIFIER | LexemeKind::FUNCTION | LexemeKind::TYPE
        } else {
            LexemeKind::IDENTIFIER
        };
        Ok((kind, word))
    }
}

/// Tokenizes SQL text into lexemes.
///
/// # Errors
///
/// Returns a [`TokenizeError`] for unterminated strings/comments,
/// invalid dollar quotes, and unexpected characters.
pub fn tokenize(sql: &str) -> Result<Vec<Lexeme>, TokenizeError> {
    SqlTokenizer::new(sql).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_and_values(sql: &str) -> Vec<(LexemeKind, String)> {
        tokenize(sql)
            .unwrap()
            .into_iter()
            .map(|l| (l.kind, l.value))
            .collect()
    }

    fn values(sql: &str) -> Vec<String> {
        tokenize(sql).unwrap().into_iter().map(|l| l.value).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize("   \n\t ").unwrap().is_empty());
    }

    #[test]
    fn test_simple_select() {
        assert_eq!(
            values("SELECT id, name FROM users WHERE active = 1"),
            vec!["select", "id", ",", "name", "from", "users", "where", "active", "=", "1"]
        );
    }

    #[test]
    fn test_keyword_case_normalized() {
        let lexemes = tokenize("SeLeCt Id").unwrap();
        assert_eq!(lexemes[0].value, "select");
        assert!(lexemes[0].kind.contains(LexemeKind::COMMAND));
        // Identifiers keep their original casing.
        assert_eq!(lexemes[1].value, "Id");
    }

    #[test]
    fn test_multi_word_keyword() {
        assert_eq!(
            values("ORDER   BY name"),
            vec!["order by", "name"]
        );
        assert_eq!(
            values("when not matched by source then"),
            vec!["when not matched by source", "then"]
        );
    }

    #[test]
    fn test_escaped_string_literal() {
        let lexemes = tokenize("SELECT 'it''s';").unwrap();
        assert_eq!(lexemes.len(), 2);
        assert_eq!(lexemes[1].value, "'it''s'");
        assert!(lexemes[1].kind.contains(LexemeKind::LITERAL));
    }

    #[test]
    fn test_dollar_quoted_string() {
        let sql = "SELECT $tag$line1;\nline2$tag$";
        let lexemes = tokenize(sql).unwrap();
        assert_eq!(lexemes[1].value, "$tag$line1;\nline2$tag$");
        assert!(lexemes[1].kind.contains(LexemeKind::LITERAL));
    }

    #[test]
    fn test_anonymous_dollar_quote() {
        let lexemes = tokenize("SELECT $$a'b$$").unwrap();
        assert_eq!(lexemes[1].value, "$$a'b$$");
    }

    #[test]
    fn test_parameters() {
        assert_eq!(
            kinds_and_values("? $1 :name @p ${x}")
                .into_iter()
                .map(|(k, v)| (k.contains(LexemeKind::PARAMETER), v))
                .collect::<Vec<_>>(),
            vec![
                (true, "?".to_string()),
                (true, "$1".into()),
                (true, ":name".into()),
                (true, "@p".into()),
                (true, "${x}".into()),
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            values("a :: b -> c ->> d @> e ~* f"),
            vec!["a", "::", "b", "->", "c", "->>", "d", "@>", "e", "~*", "f"]
        );
    }

    #[test]
    fn test_word_operators() {
        let lexemes = tokenize("a is not null and b not in (1)").unwrap();
        assert_eq!(lexemes[1].value, "is not");
        assert!(lexemes[1].kind.contains(LexemeKind::OPERATOR));
        assert_eq!(lexemes[2].value, "null");
        assert!(lexemes[2].kind.contains(LexemeKind::LITERAL));
        assert_eq!(lexemes[4].value, "not in");
    }

    #[test]
    fn test_function_flag() {
        let lexemes = tokenize("count(*)").unwrap();
        assert!(lexemes[0].kind.contains(LexemeKind::FUNCTION));
        assert!(lexemes[0].kind.contains(LexemeKind::IDENTIFIER));
        let lexemes = tokenize("count").unwrap();
        assert!(!lexemes[0].kind.contains(LexemeKind::FUNCTION));
    }

    #[test]
    fn test_quoted_identifiers() {
        assert_eq!(
            values("\"column name\" `other` [bracketed]"),
            vec!["column name", "other", "bracketed"]
        );
    }

    #[test]
    fn test_bracket_after_value_is_index() {
        let lexemes = tokenize("arr[1]").unwrap();
        assert!(lexemes[1].kind.contains(LexemeKind::OPEN_BRACKET));
        assert!(lexemes[3].kind.contains(LexemeKind::CLOSE_BRACKET));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(values("42 3.14 1e10 2.5e-3"), vec!["42", "3.14", "1e10", "2.5e-3"]);
    }

    #[test]
    fn test_string_specifier() {
        let lexemes = tokenize("e'a\\'b' x'ff'").unwrap();
        assert!(lexemes[0].kind.contains(LexemeKind::STRING_SPECIFIER));
        assert_eq!(lexemes[0].value, "e'a\\'b'");
        assert!(lexemes[1].kind.contains(LexemeKind::STRING_SPECIFIER));
    }

    #[test]
    fn test_before_comment_attaches() {
        let lexemes = tokenize("-- header\nSELECT 1").unwrap();
        assert_eq!(
            lexemes[0].positioned_comments_at(CommentPosition::Before),
            vec!["header".to_string()]
        );
    }

    #[test]
    fn test_after_comment_attaches_same_line() {
        let lexemes = tokenize("SELECT 1 -- trailing\n+ 2").unwrap();
        assert_eq!(
            lexemes[1].positioned_comments_at(CommentPosition::After),
            vec!["trailing".to_string()]
        );
    }

    #[test]
    fn test_inline_block_comment_attaches_forward() {
        let lexemes = tokenize("SELECT /* c */ 1").unwrap();
        assert_eq!(
            lexemes[1].positioned_comments_at(CommentPosition::Before),
            vec!["c".to_string()]
        );
        assert!(lexemes[0].positioned_comments_at(CommentPosition::After).is_empty());
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("SELECT 'oops").unwrap_err();
        assert!(matches!(err, TokenizeError::UnterminatedString { .. }));
    }

    #[test]
    fn test_unterminated_block_comment() {
        let err = tokenize("SELECT 1 /* oops").unwrap_err();
        assert!(matches!(err, TokenizeError::UnterminatedBlockComment { .. }));
    }

    #[test]
    fn test_unterminated_dollar_quote() {
        let err = tokenize("SELECT $tag$oops").unwrap_err();
        assert!(matches!(err, TokenizeError::InvalidDollarQuote { .. }));
    }

    #[test]
    fn test_semicolon_terminates() {
        let lexemes = tokenize("SELECT 1;").unwrap();
        assert_eq!(lexemes.len(), 2);
    }

    #[test]
    fn test_position_tracking() {
        let lexemes = tokenize("select\n  id").unwrap();
        let pos = lexemes[1].position.unwrap();
        assert_eq!(pos.span, Span::new(9, 11));
        assert_eq!(pos.start, LineColumn::new(2, 3));
    }
}
