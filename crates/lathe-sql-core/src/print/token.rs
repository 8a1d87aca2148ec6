//! Print token model: the intermediate tree between the AST and text.

/// Which AST construct a container token corresponds to. Containers are
/// kept 1:1 with AST clauses so style rules can address them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Statement,
    WithClause,
    CommonTable,
    SelectClause,
    SelectItem,
    FromClause,
    JoinClause,
    WhereClause,
    GroupByClause,
    HavingClause,
    WindowClause,
    OrderByClause,
    LimitClause,
    OffsetClause,
    FetchClause,
    ForClause,
    SetClause,
    ValuesClause,
    ReturningClause,
    WhenClause,
    SubQuery,
    ParenExpr,
    CaseExpr,
    BetweenExpr,
    FunctionArguments,
    DdlClause,
}

impl ContainerKind {
    /// Containers that start a new line in multi-line output.
    #[must_use]
    pub const fn is_clause(&self) -> bool {
        matches!(
            self,
            Self::WithClause
                | Self::SelectClause
                | Self::FromClause
                | Self::JoinClause
                | Self::WhereClause
                | Self::GroupByClause
                | Self::HavingClause
                | Self::WindowClause
                | Self::OrderByClause
                | Self::LimitClause
                | Self::OffsetClause
                | Self::FetchClause
                | Self::ForClause
                | Self::SetClause
                | Self::ValuesClause
                | Self::ReturningClause
                | Self::WhenClause
        )
    }
}

/// How prominent a comment's host is; drives the emission modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentLevel {
    /// Statement header.
    Top,
    /// Clause-level container.
    Clause,
    /// Select item or CTE definition.
    Item,
}

/// Print token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintTokenKind {
    /// Grouping region tagged with its AST construct.
    Container(ContainerKind),
    Keyword,
    Value,
    Comma,
    ParenOpen,
    ParenClose,
    Operator,
    Comment(CommentLevel),
    Parameter,
    Dot,
    Type,
    Space,
    ArgumentSplitter,
    CommentNewline,
}

/// One node of the print token tree.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintToken {
    /// Kind, including container tagging.
    pub kind: PrintTokenKind,
    /// Token text; empty for pure containers.
    pub text: String,
    /// Inner tokens of containers.
    pub tokens: Vec<PrintToken>,
}

impl PrintToken {
    /// A leaf token.
    #[must_use]
    pub fn leaf(kind: PrintTokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            tokens: Vec::new(),
        }
    }

    /// A keyword token; text is stored lowercased and re-cased by the
    /// printer.
    #[must_use]
    pub fn keyword(text: impl Into<String>) -> Self {
        Self::leaf(PrintTokenKind::Keyword, text)
    }

    /// A plain value token (identifier or literal, already escaped).
    #[must_use]
    pub fn value(text: impl Into<String>) -> Self {
        Self::leaf(PrintTokenKind::Value, text)
    }

    /// An operator token.
    #[must_use]
    pub fn operator(text: impl Into<String>) -> Self {
        Self::leaf(PrintTokenKind::Operator, text)
    }

    /// A type token.
    #[must_use]
    pub fn type_name(text: impl Into<String>) -> Self {
        Self::leaf(PrintTokenKind::Type, text)
    }

    /// A comma.
    #[must_use]
    pub fn comma() -> Self {
        Self::leaf(PrintTokenKind::Comma, ",")
    }

    /// Opening parenthesis (text may be `(` or `[`).
    #[must_use]
    pub fn open(text: impl Into<String>) -> Self {
        Self::leaf(PrintTokenKind::ParenOpen, text)
    }

    /// Closing parenthesis (text may be `)` or `]`).
    #[must_use]
    pub fn close(text: impl Into<String>) -> Self {
        Self::leaf(PrintTokenKind::ParenClose, text)
    }

    /// A dot between name segments.
    #[must_use]
    pub fn dot() -> Self {
        Self::leaf(PrintTokenKind::Dot, ".")
    }

    /// A parameter placeholder, text already rendered per style.
    #[must_use]
    pub fn parameter(text: impl Into<String>) -> Self {
        Self::leaf(PrintTokenKind::Parameter, text)
    }

    /// A comment with its host level.
    #[must_use]
    pub fn comment(level: CommentLevel, text: impl Into<String>) -> Self {
        Self::leaf(PrintTokenKind::Comment(level), text)
    }

    /// A container wrapping inner tokens.
    #[must_use]
    pub fn container(kind: ContainerKind, tokens: Vec<PrintToken>) -> Self {
        Self {
            kind: PrintTokenKind::Container(kind),
            text: String::new(),
            tokens,
        }
    }

    /// The container kind, when this is a container.
    #[must_use]
    pub const fn container_kind(&self) -> Option<ContainerKind> {
        match self.kind {
            PrintTokenKind::Container(kind) => Some(kind),
            _ => None,
        }
    }
}
