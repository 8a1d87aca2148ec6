//! Comment metadata shared by AST nodes.

use crate::lexer::{CommentPosition, PositionedComment};

/// Dual comment representation carried by statements and clauses: a
/// legacy flat list and a positioned list. The positioned list is
/// authoritative; the flat list is kept for compatibility and is only
/// consulted when the positioned list is empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Comments {
    /// Legacy flat list, in insertion order.
    pub legacy: Vec<String>,
    /// Positioned comment blocks.
    pub positioned: Vec<PositionedComment>,
}

impl Comments {
    /// Creates an empty comment set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            legacy: Vec::new(),
            positioned: Vec::new(),
        }
    }

    /// Returns true if no comments are attached in either channel.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.legacy.is_empty() && self.positioned.is_empty()
    }

    /// Adds comments at a position. Additive: existing entries are kept,
    /// duplicates are dropped, insertion order is preserved. The legacy
    /// list is updated in step.
    pub fn add_positioned(&mut self, position: CommentPosition, comments: &[String]) {
        let fresh: Vec<String> = comments
            .iter()
            .filter(|c| !self.legacy.contains(c))
            .cloned()
            .collect();
        if fresh.is_empty() {
            return;
        }
        self.legacy.extend(fresh.iter().cloned());
        if let Some(block) = self
            .positioned
            .iter_mut()
            .find(|b| b.position == position)
        {
            block.comments.extend(fresh);
        } else {
            self.positioned
                .push(PositionedComment::new(position, fresh));
        }
    }

    /// Returns a snapshot of the comments at a position.
    #[must_use]
    pub fn positioned_at(&self, position: CommentPosition) -> Vec<String> {
        self.positioned
            .iter()
            .filter(|b| b.position == position)
            .flat_map(|b| b.comments.iter().cloned())
            .collect()
    }

    /// Returns the comments the printer should emit at a position.
    /// Positioned comments win; the legacy list is emitted (as `before`)
    /// only when no positioned block exists, so the two channels are
    /// never double-printed.
    #[must_use]
    pub fn effective(&self, position: CommentPosition) -> Vec<String> {
        if !self.positioned.is_empty() {
            return self.positioned_at(position);
        }
        if position == CommentPosition::Before {
            return self.legacy.clone();
        }
        Vec::new()
    }

    /// Copies all comment blocks of `other` into `self`.
    pub fn merge(&mut self, other: &Self) {
        for block in &other.positioned {
            self.add_positioned(block.position, &block.comments);
        }
        let legacy_only: Vec<String> = other
            .legacy
            .iter()
            .filter(|c| !self.legacy.contains(*c))
            .cloned()
            .collect();
        if other.positioned.is_empty() && !legacy_only.is_empty() {
            self.add_positioned(CommentPosition::Before, &legacy_only);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_positioned_dedupes_preserving_order() {
        let mut c = Comments::new();
        c.add_positioned(CommentPosition::Before, &["a".into(), "b".into()]);
        c.add_positioned(CommentPosition::Before, &["b".into(), "c".into()]);
        assert_eq!(
            c.positioned_at(CommentPosition::Before),
            vec!["a".to_string(), "b".into(), "c".into()]
        );
    }

    #[test]
    fn test_effective_prefers_positioned() {
        let mut c = Comments::new();
        c.legacy.push("legacy".into());
        assert_eq!(c.effective(CommentPosition::Before), vec!["legacy".to_string()]);
        c.add_positioned(CommentPosition::Before, &["positioned".into()]);
        assert_eq!(
            c.effective(CommentPosition::Before),
            vec!["positioned".to_string()]
        );
    }

    #[test]
    fn test_effective_after_without_positioned_is_empty() {
        let mut c = Comments::new();
        c.legacy.push("legacy".into());
        assert!(c.effective(CommentPosition::After).is_empty());
    }
}
