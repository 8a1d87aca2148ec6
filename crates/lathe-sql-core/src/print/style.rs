//! Style configuration and presets for SQL emission.

use crate::ast::LiteralValue;

/// Printing errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrintError {
    /// An unknown preset name.
    #[error("invalid preset '{name}': expected postgres, mysql, sqlserver, or sqlite")]
    InvalidPreset {
        /// The rejected name.
        name: String,
    },
}

/// How parameters are rendered and collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterStyle {
    /// `?` for every parameter.
    Anonymous,
    /// `$1, $2, …` in first-occurrence order.
    Indexed,
    /// `:name` / `@name`, original names retained.
    Named,
}

/// Line ending emitted between lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewlineStyle {
    /// `\n`.
    Lf,
    /// `\r\n`.
    CrLf,
    /// Single-line output.
    None,
}

impl NewlineStyle {
    /// The literal line terminator, empty for single-line output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::None => "",
        }
    }
}

/// Keyword casing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordCase {
    /// Keep the normalized (lowercase) spelling.
    None,
    Upper,
    Lower,
}

/// Where a list break lands relative to its comma.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommaBreak {
    None,
    Before,
    After,
}

/// Where a break lands relative to AND/OR in predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AndBreak {
    None,
    Before,
    After,
}

/// How WITH clauses are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithClauseStyle {
    /// Bodies expand over multiple lines.
    Standard,
    /// Each CTE body on one line.
    CteOneline,
    /// The whole WITH clause on one line.
    FullOneline,
}

/// How comments render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    /// Always `/* … */`.
    Block,
    /// Single-line comments become `--` when the layout permits.
    Smart,
}

/// Which comments are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentMode {
    /// No comments.
    None,
    /// Every attached comment.
    Full,
    /// Only leading comments of clause-level containers.
    HeaderOnly,
    /// Only the statement header.
    TopHeaderOnly,
}

/// Full style configuration driving the printer.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlPrintStyle {
    /// Opening/closing identifier escape pair.
    pub identifier_escape: (char, char),
    /// Prefix symbol for parameters (`$`, `:`, `@`, `?`).
    pub parameter_symbol: char,
    /// Parameter rendering style.
    pub parameter_style: ParameterStyle,
    /// Spaces (or characters) per indent level.
    pub indent_size: usize,
    /// Indent character.
    pub indent_char: char,
    /// Line endings.
    pub newline: NewlineStyle,
    /// Keyword casing.
    pub keyword_case: KeywordCase,
    /// List breaks.
    pub comma_break: CommaBreak,
    /// Predicate breaks.
    pub and_break: AndBreak,
    /// WITH clause layout.
    pub with_clause_style: WithClauseStyle,
    /// Comment rendering.
    pub comment_style: CommentStyle,
    /// Comment emission mode.
    pub comment_mode: CommentMode,
    /// Keep parenthesized expressions on one line.
    pub oneline_paren: bool,
    /// Keep BETWEEN on one line.
    pub oneline_between: bool,
    /// Keep VALUES rows on one line.
    pub oneline_values: bool,
    /// Keep JOIN clauses on one line.
    pub oneline_join: bool,
    /// Keep CASE expressions on one line.
    pub oneline_case: bool,
    /// Keep subqueries on one line.
    pub oneline_subquery: bool,
}

impl Default for SqlPrintStyle {
    fn default() -> Self {
        Self::compact()
    }
}

impl SqlPrintStyle {
    /// A compact single-line style with postgres escaping. This is what
    /// `Display` uses.
    #[must_use]
    pub fn compact() -> Self {
        Self {
            identifier_escape: ('"', '"'),
            parameter_symbol: '$',
            parameter_style: ParameterStyle::Named,
            indent_size: 0,
            indent_char: ' ',
            newline: NewlineStyle::None,
            keyword_case: KeywordCase::Lower,
            comma_break: CommaBreak::None,
            and_break: AndBreak::None,
            with_clause_style: WithClauseStyle::FullOneline,
            comment_style: CommentStyle::Block,
            comment_mode: CommentMode::Full,
            oneline_paren: true,
            oneline_between: true,
            oneline_values: true,
            oneline_join: true,
            oneline_case: true,
            oneline_subquery: true,
        }
    }

    /// Looks up a preset by name.
    ///
    /// # Errors
    ///
    /// Returns [`PrintError::InvalidPreset`] for unknown names.
    pub fn preset(name: &str) -> Result<Self, PrintError> {
        let base = Self {
            indent_size: 4,
            indent_char: ' ',
            newline: NewlineStyle::Lf,
            comma_break: CommaBreak::After,
            and_break: AndBreak::Before,
            with_clause_style: WithClauseStyle::Standard,
            comment_style: CommentStyle::Smart,
            comment_mode: CommentMode::Full,
            oneline_paren: true,
            oneline_between: true,
            oneline_values: true,
            oneline_join: true,
            oneline_case: false,
            oneline_subquery: false,
            ..Self::compact()
        };
        match name.to_ascii_lowercase().as_str() {
            "postgres" => Ok(Self {
                identifier_escape: ('"', '"'),
                parameter_symbol: '$',
                parameter_style: ParameterStyle::Indexed,
                keyword_case: KeywordCase::Lower,
                ..base
            }),
            "mysql" => Ok(Self {
                identifier_escape: ('`', '`'),
                parameter_symbol: '?',
                parameter_style: ParameterStyle::Anonymous,
                keyword_case: KeywordCase::Upper,
                ..base
            }),
            "sqlserver" => Ok(Self {
                identifier_escape: ('[', ']'),
                parameter_symbol: '@',
                parameter_style: ParameterStyle::Named,
                keyword_case: KeywordCase::Upper,
                ..base
            }),
            "sqlite" => Ok(Self {
                identifier_escape: ('"', '"'),
                parameter_symbol: ':',
                parameter_style: ParameterStyle::Named,
                keyword_case: KeywordCase::Lower,
                ..base
            }),
            _ => Err(PrintError::InvalidPreset {
                name: name.to_string(),
            }),
        }
    }

    /// One indent unit.
    #[must_use]
    pub fn indent_unit(&self) -> String {
        std::iter::repeat(self.indent_char)
            .take(self.indent_size)
            .collect()
    }
}

/// Parameters collected during formatting, shaped to match the style.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaceholderParams {
    /// Values for `?` placeholders, in emission order.
    Anonymous(Vec<Option<LiteralValue>>),
    /// Values for `$1, $2, …`, in first-occurrence order.
    Indexed(Vec<Option<LiteralValue>>),
    /// Name/value pairs for named placeholders.
    Named(Vec<(String, Option<LiteralValue>)>),
}

impl PlaceholderParams {
    /// Number of collected parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Anonymous(v) | Self::Indexed(v) => v.len(),
            Self::Named(v) => v.len(),
        }
    }

    /// Returns true when no parameters were collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Output of the formatter: SQL text plus its parameter collection.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatResult {
    /// The rendered SQL.
    pub sql: String,
    /// Collected parameters, shaped per the style.
    pub params: PlaceholderParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_table() {
        let pg = SqlPrintStyle::preset("postgres").unwrap();
        assert_eq!(pg.identifier_escape, ('"', '"'));
        assert_eq!(pg.parameter_style, ParameterStyle::Indexed);
        assert_eq!(pg.keyword_case, KeywordCase::Lower);

        let my = SqlPrintStyle::preset("mysql").unwrap();
        assert_eq!(my.identifier_escape, ('`', '`'));
        assert_eq!(my.parameter_style, ParameterStyle::Anonymous);
        assert_eq!(my.keyword_case, KeywordCase::Upper);

        let ms = SqlPrintStyle::preset("sqlserver").unwrap();
        assert_eq!(ms.identifier_escape, ('[', ']'));
        assert_eq!(ms.parameter_style, ParameterStyle::Named);
        assert_eq!(ms.parameter_symbol, '@');

        let lite = SqlPrintStyle::preset("sqlite").unwrap();
        assert_eq!(lite.parameter_symbol, ':');
        assert_eq!(lite.keyword_case, KeywordCase::Lower);
    }

    #[test]
    fn test_invalid_preset() {
        let err = SqlPrintStyle::preset("oracle").unwrap_err();
        assert!(matches!(err, PrintError::InvalidPreset { name } if name == "oracle"));
    }
}
