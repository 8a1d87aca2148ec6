//! Parser error types.

use crate::lexer::{Span, TokenizeError};

/// A structured parse error: code (the variant), position, message, and
/// the lexemes around the failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    /// The tokenizer failed before parsing began.
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),

    /// A lexeme that does not fit the grammar at this point.
    #[error("unexpected token '{found}' at {span}: expected {expected} (near: {nearby})")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
        nearby: String,
    },

    /// A specific keyword was required.
    #[error("expected keyword '{keyword}' at {span}, found '{found}' (near: {nearby})")]
    ExpectedKeyword {
        keyword: String,
        found: String,
        span: Span,
        nearby: String,
    },

    /// An identifier was required.
    #[error("expected identifier at {span}, found '{found}' (near: {nearby})")]
    ExpectedIdentifier {
        found: String,
        span: Span,
        nearby: String,
    },

    /// A closing parenthesis was required.
    #[error("expected ')' at {span}, found '{found}' (near: {nearby})")]
    ExpectedCloseParen {
        found: String,
        span: Span,
        nearby: String,
    },

    /// UPDATE or a MERGE update action without a SET list.
    #[error("expected SET clause at {span} (near: {nearby})")]
    ExpectedSetClause { span: Span, nearby: String },

    /// An ALTER TABLE action the parser does not recognize.
    #[error("unsupported action '{action}' at {span} (near: {nearby})")]
    UnsupportedAction {
        action: String,
        span: Span,
        nearby: String,
    },

    /// Lexemes remain after a complete statement.
    #[error("trailing input '{found}' after statement at {span} (near: {nearby})")]
    TrailingInput {
        found: String,
        span: Span,
        nearby: String,
    },

    /// `*` somewhere other than a terminal name segment or sole
    /// function argument.
    #[error("wildcard '*' is not allowed here at {span} (near: {nearby})")]
    WildcardMisuse { span: Span, nearby: String },

    /// Two CTEs with the same name in one WITH clause.
    #[error("duplicate CTE name '{name}' at {span}")]
    DuplicateCte { name: String, span: Span },

    /// A frame added by a caller, wrapping the original error.
    #[error("[{context}] {source}")]
    Context {
        context: String,
        #[source]
        source: Box<ParseError>,
    },
}

impl ParseError {
    /// Wraps the error with a context frame without swallowing it.
    #[must_use]
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The span the error points at, when known.
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Tokenize(e) => Some(e.span()),
            Self::UnexpectedToken { span, .. }
            | Self::ExpectedKeyword { span, .. }
            | Self::ExpectedIdentifier { span, .. }
            | Self::ExpectedCloseParen { span, .. }
            | Self::ExpectedSetClause { span, .. }
            | Self::UnsupportedAction { span, .. }
            | Self::TrailingInput { span, .. }
            | Self::WildcardMisuse { span, .. }
            | Self::DuplicateCte { span, .. } => Some(*span),
            Self::Context { source, .. } => source.span(),
        }
    }
}
