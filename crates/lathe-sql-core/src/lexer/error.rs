//! Tokenizer error types.

use super::position::Span;

/// Errors raised while scanning SQL text.
///
/// Every variant carries the offending span and a caret diagram of the
/// surrounding text (up to five characters of context on each side).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenizeError {
    /// A quoted string or quoted identifier never closes.
    #[error("unterminated string at {span}\n{diagram}")]
    UnterminatedString {
        /// Span from the opening quote to end of input.
        span: Span,
        /// Caret diagram around the opening quote.
        diagram: String,
    },

    /// A `/* ... */` comment never closes.
    #[error("unterminated block comment at {span}\n{diagram}")]
    UnterminatedBlockComment {
        /// Span from the opening delimiter to end of input.
        span: Span,
        /// Caret diagram around the opening delimiter.
        diagram: String,
    },

    /// A `$tag$` fence opens but never closes, or a lone `$` appears.
    #[error("invalid dollar-quoted string at {span}\n{diagram}")]
    InvalidDollarQuote {
        /// Span of the offending fence.
        span: Span,
        /// Caret diagram around the fence.
        diagram: String,
    },

    /// A character that cannot start any lexeme.
    #[error("invalid character '{character}' at {span}\n{diagram}")]
    InvalidCharacter {
        /// The offending character.
        character: char,
        /// Its span.
        span: Span,
        /// Caret diagram around it.
        diagram: String,
    },
}

impl TokenizeError {
    /// Returns the span the error points at.
    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::UnterminatedString { span, .. }
            | Self::UnterminatedBlockComment { span, .. }
            | Self::InvalidDollarQuote { span, .. }
            | Self::InvalidCharacter { span, .. } => *span,
        }
    }
}
