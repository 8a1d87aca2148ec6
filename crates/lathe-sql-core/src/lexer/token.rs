//! Lexeme types produced by the tokenizer.

use bitflags::bitflags;

use super::position::LexemePosition;

bitflags! {
    /// Bit-flag roles a lexeme can play.
    ///
    /// A single lexeme may carry several roles at once (e.g. an unquoted
    /// word followed by `(` is `IDENTIFIER | FUNCTION | TYPE`); the parser
    /// picks the applicable one from context.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LexemeKind: u16 {
        const LITERAL = 1 << 0;
        const OPERATOR = 1 << 1;
        const OPEN_PAREN = 1 << 2;
        const CLOSE_PAREN = 1 << 3;
        const COMMA = 1 << 4;
        const DOT = 1 << 5;
        const IDENTIFIER = 1 << 6;
        const COMMAND = 1 << 7;
        const PARAMETER = 1 << 8;
        const OPEN_BRACKET = 1 << 9;
        const CLOSE_BRACKET = 1 << 10;
        const FUNCTION = 1 << 11;
        const STRING_SPECIFIER = 1 << 12;
        const TYPE = 1 << 13;
    }
}

/// Where a comment sits relative to its host lexeme or node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CommentPosition {
    /// The comment precedes the host.
    Before,
    /// The comment trails the host on the same line.
    After,
}

/// A block of comments tagged with a position relative to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedComment {
    /// Placement relative to the host.
    pub position: CommentPosition,
    /// Comment texts without their delimiters, in source order.
    pub comments: Vec<String>,
}

impl PositionedComment {
    /// Creates a new positioned comment block.
    #[must_use]
    pub fn new(position: CommentPosition, comments: Vec<String>) -> Self {
        Self { position, comments }
    }
}

/// A lexeme: a token with case-normalized value, position, and any
/// comments attached during scanning.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    /// Role bit-set.
    pub kind: LexemeKind,
    /// Textual value. Keywords and word operators are lowercased with
    /// inner whitespace collapsed; literals keep their source spelling.
    pub value: String,
    /// Source position, when known.
    pub position: Option<LexemePosition>,
    /// Legacy flat comment list, kept for compatibility.
    pub comments: Vec<String>,
    /// Positioned comments.
    pub positioned_comments: Vec<PositionedComment>,
}

impl Lexeme {
    /// Creates a new lexeme without position information.
    #[must_use]
    pub fn new(kind: LexemeKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            position: None,
            comments: Vec::new(),
            positioned_comments: Vec::new(),
        }
    }

    /// Creates a new lexeme with a position.
    #[must_use]
    pub fn with_position(
        kind: LexemeKind,
        value: impl Into<String>,
        position: LexemePosition,
    ) -> Self {
        Self {
            kind,
            value: value.into(),
            position: Some(position),
            comments: Vec::new(),
            positioned_comments: Vec::new(),
        }
    }

    /// Returns true if the lexeme carries the given role.
    #[must_use]
    pub const fn is(&self, kind: LexemeKind) -> bool {
        self.kind.intersects(kind)
    }

    /// Returns true if this is a command lexeme with the given
    /// (lowercase) value.
    #[must_use]
    pub fn is_command(&self, value: &str) -> bool {
        self.kind.contains(LexemeKind::COMMAND) && self.value == value
    }

    /// Returns true if this is an operator lexeme with the given value.
    #[must_use]
    pub fn is_operator(&self, value: &str) -> bool {
        self.kind.contains(LexemeKind::OPERATOR) && self.value == value
    }

    /// Adds comments at the given position, deduplicating while
    /// preserving insertion order. Also mirrors them into the legacy
    /// flat list.
    pub fn add_positioned_comments(&mut self, position: CommentPosition, comments: &[String]) {
        let fresh: Vec<String> = comments
            .iter()
            .filter(|c| !self.comments.contains(c))
            .cloned()
            .collect();
        if fresh.is_empty() {
            return;
        }
        self.comments.extend(fresh.iter().cloned());
        if let Some(block) = self
            .positioned_comments
            .iter_mut()
            .find(|b| b.position == position)
        {
            block.comments.extend(fresh);
        } else {
            self.positioned_comments
                .push(PositionedComment::new(position, fresh));
        }
    }

    /// Returns a snapshot of the comments attached at the given position.
    #[must_use]
    pub fn positioned_comments_at(&self, position: CommentPosition) -> Vec<String> {
        self.positioned_comments
            .iter()
            .filter(|b| b.position == position)
            .flat_map(|b| b.comments.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_bitset_roles() {
        let kind = LexemeKind::IDENTIFIER | LexemeKind::FUNCTION | LexemeKind::TYPE;
        assert!(kind.contains(LexemeKind::IDENTIFIER));
        assert!(kind.contains(LexemeKind::FUNCTION));
        assert!(!kind.contains(LexemeKind::COMMAND));
    }

    #[test]
    fn test_is_command() {
        let lexeme = Lexeme::new(LexemeKind::COMMAND, "select");
        assert!(lexeme.is_command("select"));
        assert!(!lexeme.is_command("from"));
    }

    #[test]
    fn test_add_positioned_comments_dedupes() {
        let mut lexeme = Lexeme::new(LexemeKind::IDENTIFIER, "id");
        lexeme.add_positioned_comments(CommentPosition::Before, &["a".into(), "b".into()]);
        lexeme.add_positioned_comments(CommentPosition::Before, &["b".into(), "c".into()]);
        assert_eq!(
            lexeme.positioned_comments_at(CommentPosition::Before),
            vec!["a".to_string(), "b".into(), "c".into()]
        );
        assert_eq!(lexeme.comments, vec!["a".to_string(), "b".into(), "c".into()]);
    }
}
