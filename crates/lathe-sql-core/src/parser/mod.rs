//! Recursive-descent SQL parsers.
//!
//! Every statement family exposes a `parse_*(sql)` entry point that
//! tokenizes and parses a single statement, rejecting trailing input.
//! [`Parser`] can also be driven over an existing lexeme slice via
//! [`Parser::new`] for resumable, index-based parsing.

mod ddl;
mod dml;
mod error;
mod expr;
mod select;

pub use error::ParseError;

use crate::ast::{
    AlterTableQuery, CheckpointQuery, CommentOnQuery, CreateIndexQuery, CreateSchemaQuery,
    CreateTableQuery, DeleteQuery, DropObjectKind, DropObjectQuery, ExplainQuery, InsertQuery,
    MergeQuery, SelectQuery, Statement, UpdateQuery, VacuumQuery,
};
use crate::lexer::{tokenize, Lexeme, LexemeKind, Span};

/// A cursor over a lexeme slice with single-token lookahead.
pub struct Parser<'a> {
    lexemes: &'a [Lexeme],
    pos: usize,
}

impl<'a> Parser<'a> {
    /// Creates a parser positioned at `index`.
    #[must_use]
    pub const fn new(lexemes: &'a [Lexeme], index: usize) -> Self {
        Self {
            lexemes,
            pos: index,
        }
    }

    /// The current index into the lexeme slice.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns true when all lexemes are consumed.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.pos >= self.lexemes.len()
    }

    pub(crate) fn peek(&self) -> Option<&'a Lexeme> {
        self.lexemes.get(self.pos)
    }

    pub(crate) fn peek_at(&self, ahead: usize) -> Option<&'a Lexeme> {
        self.lexemes.get(self.pos + ahead)
    }

    pub(crate) fn advance(&mut self) -> Option<&'a Lexeme> {
        let lexeme = self.lexemes.get(self.pos);
        if lexeme.is_some() {
            self.pos += 1;
        }
        lexeme
    }

    /// Span of the current lexeme, or an empty span at the end.
    pub(crate) fn span_here(&self) -> Span {
        self.peek()
            .or_else(|| self.lexemes.last())
            .and_then(|l| l.position)
            .map_or_else(Span::default, |p| p.span)
    }

    /// Values of up to five lexemes around the cursor, for diagnostics.
    pub(crate) fn nearby(&self) -> String {
        let lo = self.pos.saturating_sub(2);
        let hi = (self.pos + 3).min(self.lexemes.len());
        self.lexemes[lo..hi]
            .iter()
            .map(|l| l.value.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub(crate) fn found_value(&self) -> String {
        self.peek()
            .map_or_else(|| "end of input".to_string(), |l| l.value.clone())
    }

    pub(crate) fn unexpected(&self, expected: impl Into<String>) -> ParseError {
        ParseError::UnexpectedToken {
            expected: expected.into(),
            found: self.found_value(),
            span: self.span_here(),
            nearby: self.nearby(),
        }
    }

    pub(crate) fn check_command(&self, value: &str) -> bool {
        self.peek().is_some_and(|l| l.is_command(value))
    }

    pub(crate) fn check_operator(&self, value: &str) -> bool {
        self.peek().is_some_and(|l| l.is_operator(value))
    }

    pub(crate) fn check_kind(&self, kind: LexemeKind) -> bool {
        self.peek().is_some_and(|l| l.is(kind))
    }

    /// Consumes the given command keyword if present.
    pub(crate) fn eat_command(&mut self, value: &str) -> bool {
        if self.check_command(value) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consumes the given operator if present.
    pub(crate) fn eat_operator(&mut self, value: &str) -> bool {
        if self.check_operator(value) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consumes a lexeme of the given kind if present.
    pub(crate) fn eat_kind(&mut self, kind: LexemeKind) -> bool {
        if self.check_kind(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_command(&mut self, value: &str) -> Result<(), ParseError> {
        if self.eat_command(value) {
            Ok(())
        } else {
            Err(ParseError::ExpectedKeyword {
                keyword: value.to_string(),
                found: self.found_value(),
                span: self.span_here(),
                nearby: self.nearby(),
            })
        }
    }

    pub(crate) fn expect_open_paren(&mut self) -> Result<(), ParseError> {
        if self.eat_kind(LexemeKind::OPEN_PAREN) {
            Ok(())
        } else {
            Err(self.unexpected("("))
        }
    }

    pub(crate) fn expect_close_paren(&mut self) -> Result<(), ParseError> {
        if self.eat_kind(LexemeKind::CLOSE_PAREN) {
            Ok(())
        } else {
            Err(ParseError::ExpectedCloseParen {
                found: self.found_value(),
                span: self.span_here(),
                nearby: self.nearby(),
            })
        }
    }

    /// Returns true when the current lexeme can serve as an identifier:
    /// a proper identifier, or a single-word keyword on the allow-list.
    pub(crate) fn check_identifier(&self) -> bool {
        self.peek().is_some_and(|l| {
            l.is(LexemeKind::IDENTIFIER)
                || (l.is(LexemeKind::COMMAND | LexemeKind::OPERATOR)
                    && crate::lexer::is_identifier_allowed(&l.value))
        })
    }

    /// Consumes an identifier (or allow-listed keyword), returning its
    /// text with original casing.
    pub(crate) fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if self.check_identifier() {
            let value = self.peek().map(|l| l.value.clone()).unwrap_or_default();
            self.pos += 1;
            Ok(value)
        } else {
            Err(ParseError::ExpectedIdentifier {
                found: self.found_value(),
                span: self.span_here(),
                nearby: self.nearby(),
            })
        }
    }

    /// Rejects any lexemes left after a complete statement.
    pub(crate) fn expect_done(&self) -> Result<(), ParseError> {
        if self.is_done() {
            Ok(())
        } else {
            Err(ParseError::TrailingInput {
                found: self.found_value(),
                span: self.span_here(),
                nearby: self.nearby(),
            })
        }
    }

    /// Parses any supported statement at the cursor.
    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let first = match self.peek() {
            Some(lexeme) => lexeme.value.clone(),
            None => return Err(self.unexpected("a SQL statement")),
        };
        match first.as_str() {
            "select" | "with" | "values" => Ok(Statement::Select(self.parse_select_query()?)),
            "insert into" | "insert" => Ok(Statement::Insert(self.parse_insert_query()?)),
            "update" => Ok(Statement::Update(self.parse_update_query()?)),
            "delete from" | "delete" => Ok(Statement::Delete(self.parse_delete_query()?)),
            "merge into" => Ok(Statement::Merge(self.parse_merge_query()?)),
            "create table" | "create temporary table" | "create temp table" => {
                Ok(Statement::CreateTable(self.parse_create_table_query()?))
            }
            "create index" | "create unique index" => {
                Ok(Statement::CreateIndex(self.parse_create_index_query()?))
            }
            "create schema" => Ok(Statement::CreateSchema(self.parse_create_schema_query()?)),
            "drop table" => Ok(Statement::Drop(self.parse_drop_query(DropObjectKind::Table)?)),
            "drop index" => Ok(Statement::Drop(self.parse_drop_query(DropObjectKind::Index)?)),
            "drop schema" => Ok(Statement::Drop(
                self.parse_drop_query(DropObjectKind::Schema)?,
            )),
            "alter table" => Ok(Statement::AlterTable(self.parse_alter_table_query()?)),
            "comment on" => Ok(Statement::CommentOn(self.parse_comment_on_query()?)),
            "explain" => Ok(Statement::Explain(self.parse_explain_query()?)),
            "vacuum" => Ok(Statement::Vacuum(self.parse_vacuum_query()?)),
            "checkpoint" => Ok(Statement::Checkpoint(self.parse_checkpoint_query()?)),
            _ => Err(self.unexpected("a SQL statement")),
        }
    }
}

fn parse_single<T>(
    sql: &str,
    context: &str,
    parse: impl FnOnce(&mut Parser<'_>) -> Result<T, ParseError>,
) -> Result<T, ParseError> {
    let lexemes = tokenize(sql)?;
    let mut parser = Parser::new(&lexemes, 0);
    let node = parse(&mut parser).map_err(|e| e.with_context(context))?;
    parser.expect_done()?;
    Ok(node)
}

/// Parses a single statement of any supported kind.
///
/// # Errors
///
/// Returns a [`ParseError`] when the input is not a single valid
/// statement.
pub fn parse_statement(sql: &str) -> Result<Statement, ParseError> {
    parse_single(sql, "Statement", |p| Parser::parse_statement(p))
}

/// Parses a SELECT (or VALUES, or set operation) statement.
///
/// # Errors
///
/// Returns a [`ParseError`] when the input is not a single valid query.
pub fn parse_select(sql: &str) -> Result<SelectQuery, ParseError> {
    parse_single(sql, "SelectQuery", |p| Parser::parse_select_query(p))
}

/// Parses an INSERT statement.
///
/// # Errors
///
/// Returns a [`ParseError`] when the input is not a single valid INSERT.
pub fn parse_insert(sql: &str) -> Result<InsertQuery, ParseError> {
    parse_single(sql, "InsertQuery", |p| Parser::parse_insert_query(p))
}

/// Parses an UPDATE statement.
///
/// # Errors
///
/// Returns a [`ParseError`] when the input is not a single valid UPDATE.
pub fn parse_update(sql: &str) -> Result<UpdateQuery, ParseError> {
    parse_single(sql, "UpdateQuery", |p| Parser::parse_update_query(p))
}

/// Parses a DELETE statement.
///
/// # Errors
///
/// Returns a [`ParseError`] when the input is not a single valid DELETE.
pub fn parse_delete(sql: &str) -> Result<DeleteQuery, ParseError> {
    parse_single(sql, "DeleteQuery", |p| Parser::parse_delete_query(p))
}

/// Parses a MERGE statement.
///
/// # Errors
///
/// Returns a [`ParseError`] when the input is not a single valid MERGE.
pub fn parse_merge(sql: &str) -> Result<MergeQuery, ParseError> {
    parse_single(sql, "MergeQuery", |p| Parser::parse_merge_query(p))
}

/// Parses a CREATE TABLE statement.
///
/// # Errors
///
/// Returns a [`ParseError`] on invalid input.
pub fn parse_create_table(sql: &str) -> Result<CreateTableQuery, ParseError> {
    parse_single(sql, "CreateTableQuery", |p| Parser::parse_create_table_query(p))
}

/// Parses a CREATE INDEX statement.
///
/// # Errors
///
/// Returns a [`ParseError`] on invalid input.
pub fn parse_create_index(sql: &str) -> Result<CreateIndexQuery, ParseError> {
    parse_single(sql, "CreateIndexQuery", |p| Parser::parse_create_index_query(p))
}

/// Parses a CREATE SCHEMA statement.
///
/// # Errors
///
/// Returns a [`ParseError`] on invalid input.
pub fn parse_create_schema(sql: &str) -> Result<CreateSchemaQuery, ParseError> {
    parse_single(sql, "CreateSchemaQuery", |p| Parser::parse_create_schema_query(p))
}

/// Parses a DROP TABLE statement.
///
/// # Errors
///
/// Returns a [`ParseError`] on invalid input.
pub fn parse_drop_table(sql: &str) -> Result<DropObjectQuery, ParseError> {
    parse_single(sql, "DropTableQuery", |p| {
        p.parse_drop_query(DropObjectKind::Table)
    })
}

/// Parses a DROP INDEX statement.
///
/// # Errors
///
/// Returns a [`ParseError`] on invalid input.
pub fn parse_drop_index(sql: &str) -> Result<DropObjectQuery, ParseError> {
    parse_single(sql, "DropIndexQuery", |p| {
        p.parse_drop_query(DropObjectKind::Index)
    })
}

/// Parses an ALTER TABLE statement.
///
/// # Errors
///
/// Returns a [`ParseError`] on invalid input, including unknown actions.
pub fn parse_alter_table(sql: &str) -> Result<AlterTableQuery, ParseError> {
    parse_single(sql, "AlterTableQuery", |p| Parser::parse_alter_table_query(p))
}

/// Parses a COMMENT ON statement.
///
/// # Errors
///
/// Returns a [`ParseError`] on invalid input.
pub fn parse_comment_on(sql: &str) -> Result<CommentOnQuery, ParseError> {
    parse_single(sql, "CommentOnQuery", |p| Parser::parse_comment_on_query(p))
}

/// Parses an EXPLAIN statement.
///
/// # Errors
///
/// Returns a [`ParseError`] on invalid input.
pub fn parse_explain(sql: &str) -> Result<ExplainQuery, ParseError> {
    parse_single(sql, "ExplainQuery", |p| Parser::parse_explain_query(p))
}

/// Parses a VACUUM statement.
///
/// # Errors
///
/// Returns a [`ParseError`] on invalid input.
pub fn parse_vacuum(sql: &str) -> Result<VacuumQuery, ParseError> {
    parse_single(sql, "VacuumQuery", |p| Parser::parse_vacuum_query(p))
}

/// Parses a CHECKPOINT statement.
///
/// # Errors
///
/// Returns a [`ParseError`] on invalid input.
pub fn parse_checkpoint(sql: &str) -> Result<CheckpointQuery, ParseError> {
    parse_single(sql, "CheckpointQuery", |p| Parser::parse_checkpoint_query(p))
}
