//! Transformer error types.

use crate::parser::ParseError;

/// Errors raised by AST transformations. Transformers are
/// all-or-nothing: when one of these is returned, no partial mutation
/// of the input is visible.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    /// A CTE name that is empty after trimming.
    #[error("invalid CTE name '{name}'")]
    InvalidCteName { name: String },

    /// `add_cte` with a name that is already defined.
    #[error("duplicate CTE '{name}'")]
    DuplicateCte { name: String },

    /// `remove_cte`/`replace_cte` with an unknown name.
    #[error("CTE '{name}' not found")]
    CteNotFound { name: String },

    /// Converting a VALUES query that has no column aliases.
    #[error("VALUES query requires column aliases to become a simple query")]
    MissingColumnAliases,

    /// Renaming a CTE that does not exist.
    #[error("CTE '{name}' does not exist")]
    CteNotExists { name: String },

    /// Renaming to a CTE name that already exists.
    #[error("CTE '{name}' already exists")]
    CteAlreadyExists { name: String },

    /// A CTE chain that revisits a name.
    #[error("cyclic reference through CTE '{name}'")]
    CyclicReference { name: String },

    /// An operation applied to a query shape it does not support.
    #[error("unsupported query type: {detail}")]
    UnsupportedQueryType { detail: String },

    /// An INSERT that omits a NOT NULL column with no default.
    #[error("required column '{column}' of '{table}' is missing and has no default")]
    RequiredColumnMissing { table: String, column: String },

    /// Projection arity differs from the effective column list.
    #[error("column count mismatch: expected {expected}, found {actual}")]
    ArityMismatch { expected: usize, actual: usize },

    /// A target table that no definition or fixture resolves.
    #[error("unknown table '{name}'")]
    UnknownTable { name: String },

    /// A referenced physical table without a fixture, under the
    /// `Error` strategy.
    #[error("no fixture provided for table '{table}'")]
    MissingFixture { table: String },

    /// A VALUES payload the converter cannot express.
    #[error("unsupported VALUES payload: {detail}")]
    UnsupportedValuesPayload { detail: String },

    /// A cursor-based rename aimed at a non-identifier lexeme.
    #[error("unsupported token '{found}' under the cursor")]
    UnsupportedToken { found: String },

    /// A re-parse performed by a transformer failed.
    #[error(transparent)]
    Parse(#[from] ParseError),
}
