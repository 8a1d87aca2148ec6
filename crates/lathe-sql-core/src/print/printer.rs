//! Phase 2 of the print pipeline: render a print token tree to text
//! under a style configuration.

use super::style::{
    AndBreak, CommaBreak, CommentMode, CommentStyle, KeywordCase, NewlineStyle, SqlPrintStyle,
    WithClauseStyle,
};
use super::token::{CommentLevel, ContainerKind, PrintToken, PrintTokenKind};

#[derive(Debug)]
enum Piece {
    Text { kind: PrintTokenKind, text: String },
    Newline(usize),
}

/// Renders print token trees to SQL text.
pub struct SqlPrinter<'a> {
    style: &'a SqlPrintStyle,
    pieces: Vec<Piece>,
}

impl<'a> SqlPrinter<'a> {
    /// Creates a printer for the given style.
    #[must_use]
    pub const fn new(style: &'a SqlPrintStyle) -> Self {
        Self {
            style,
            pieces: Vec::new(),
        }
    }

    /// Renders the token tree.
    #[must_use]
    pub fn print(mut self, root: &PrintToken) -> String {
        let oneline = self.style.newline == NewlineStyle::None;
        self.walk(root, 0, oneline, None);
        self.assemble()
    }

    fn push_text(&mut self, kind: PrintTokenKind, text: String) {
        self.pieces.push(Piece::Text { kind, text });
    }

    fn push_newline(&mut self, depth: usize) {
        if matches!(self.pieces.last(), Some(Piece::Newline(_))) {
            self.pieces.pop();
        }
        if self.pieces.is_empty() {
            return;
        }
        self.pieces.push(Piece::Newline(depth));
    }

    fn keep_comment(&self, level: CommentLevel) -> bool {
        match self.style.comment_mode {
            CommentMode::None => false,
            CommentMode::Full => true,
            CommentMode::HeaderOnly => {
                matches!(level, CommentLevel::Top | CommentLevel::Clause)
            }
            CommentMode::TopHeaderOnly => matches!(level, CommentLevel::Top),
        }
    }

    fn emit_comment(&mut self, level: CommentLevel, text: &str, depth: usize, oneline: bool) {
        if !self.keep_comment(level) {
            return;
        }
        let single_line = !text.contains('\n');
        let smart = self.style.comment_style == CommentStyle::Smart && !oneline && single_line;
        if smart {
            self.push_text(
                PrintTokenKind::Comment(level),
                format!("-- {}", text.trim()),
            );
            // The line must end here; a block comment would not force this.
            self.pieces.push(Piece::Newline(depth));
        } else {
            self.push_text(
                PrintTokenKind::Comment(level),
                format!("/* {} */", text.trim()),
            );
        }
    }

    fn list_breaks(&self, kind: ContainerKind) -> bool {
        matches!(
            kind,
            ContainerKind::SelectClause
                | ContainerKind::SetClause
                | ContainerKind::ReturningClause
                | ContainerKind::WithClause
                | ContainerKind::GroupByClause
                | ContainerKind::OrderByClause
                | ContainerKind::ValuesClause
                | ContainerKind::WindowClause
        )
    }

    fn walk(
        &mut self,
        token: &PrintToken,
        depth: usize,
        oneline: bool,
        parent: Option<ContainerKind>,
    ) {
        match token.kind {
            PrintTokenKind::Container(kind) => self.walk_container(token, kind, depth, oneline),
            PrintTokenKind::Comment(level) => {
                let text = token.text.clone();
                self.emit_comment(level, &text, depth, oneline);
            }
            PrintTokenKind::Comma => {
                let breaks = parent.is_some_and(|p| self.list_breaks(p)) && !oneline;
                if breaks && self.style.comma_break == CommaBreak::Before {
                    self.push_newline(depth + 1);
                }
                self.push_text(PrintTokenKind::Comma, token.text.clone());
                if breaks && self.style.comma_break == CommaBreak::After {
                    self.push_newline(depth + 1);
                }
            }
            PrintTokenKind::Operator => {
                let and_or = token.text == "and" || token.text == "or";
                let predicate_host = matches!(
                    parent,
                    Some(ContainerKind::WhereClause | ContainerKind::HavingClause)
                );
                let breaks = and_or && predicate_host && !oneline;
                if breaks && self.style.and_break == AndBreak::Before {
                    self.push_newline(depth + 1);
                }
                self.push_text(PrintTokenKind::Operator, token.text.clone());
                if breaks && self.style.and_break == AndBreak::After {
                    self.push_newline(depth + 1);
                }
            }
            PrintTokenKind::CommentNewline => {
                if !oneline {
                    self.push_newline(depth);
                }
            }
            _ => self.push_text(token.kind, token.text.clone()),
        }
    }

    fn walk_container(
        &mut self,
        token: &PrintToken,
        kind: ContainerKind,
        depth: usize,
        mut oneline: bool,
    ) {
        match kind {
            ContainerKind::WithClause
                if self.style.with_clause_style == WithClauseStyle::FullOneline =>
            {
                oneline = true;
            }
            ContainerKind::CommonTable
                if self.style.with_clause_style == WithClauseStyle::CteOneline =>
            {
                oneline = true;
            }
            ContainerKind::SubQuery if self.style.oneline_subquery => oneline = true,
            ContainerKind::CaseExpr if self.style.oneline_case => oneline = true,
            ContainerKind::BetweenExpr if self.style.oneline_between => oneline = true,
            ContainerKind::ParenExpr if self.style.oneline_paren => oneline = true,
            ContainerKind::ValuesClause if self.style.oneline_values => oneline = true,
            ContainerKind::JoinClause if self.style.oneline_join => {}
            _ => {}
        }

        if kind.is_clause() && !oneline {
            self.push_newline(depth);
        }

        match kind {
            ContainerKind::SubQuery if !oneline => {
                // ( \n inner \n )
                let total = token.tokens.len();
                for (i, child) in token.tokens.iter().enumerate() {
                    if i == 0 && child.kind == PrintTokenKind::ParenOpen {
                        self.walk(child, depth, oneline, Some(kind));
                        self.push_newline(depth + 1);
                        continue;
                    }
                    if i + 1 == total && child.kind == PrintTokenKind::ParenClose {
                        self.push_newline(depth);
                    }
                    self.walk(child, depth + 1, oneline, Some(kind));
                }
            }
            ContainerKind::CaseExpr if !oneline => {
                for child in &token.tokens {
                    if child.kind == PrintTokenKind::Keyword {
                        match child.text.as_str() {
                            "when" | "else" => self.push_newline(depth + 1),
                            "end" => self.push_newline(depth),
                            _ => {}
                        }
                    }
                    self.walk(child, depth + 1, oneline, Some(kind));
                }
            }
            _ => {
                for child in &token.tokens {
                    self.walk(child, depth, oneline, Some(kind));
                }
            }
        }
    }

    fn assemble(self) -> String {
        let newline = match self.style.newline {
            NewlineStyle::CrLf => "\r\n",
            _ => "\n",
        };
        let indent_unit = self.style.indent_unit();
        let mut out = String::new();
        let mut prev: Option<(PrintTokenKind, String)> = None;
        let mut at_line_start = true;

        for piece in &self.pieces {
            match piece {
                Piece::Newline(depth) => {
                    if self.style.newline == NewlineStyle::None {
                        continue;
                    }
                    out.push_str(newline);
                    out.push_str(&indent_unit.repeat(*depth));
                    prev = None;
                    at_line_start = true;
                }
                Piece::Text { kind, text } => {
                    let rendered = self.render_text(*kind, text);
                    if !at_line_start {
                        if let Some((prev_kind, prev_text)) = &prev {
                            if needs_space(*prev_kind, prev_text, *kind, text) {
                                out.push(' ');
                            }
                        }
                    }
                    out.push_str(&rendered);
                    prev = Some((*kind, text.clone()));
                    at_line_start = false;
                }
            }
        }
        out
    }

    fn render_text(&self, kind: PrintTokenKind, text: &str) -> String {
        match kind {
            PrintTokenKind::Keyword => self.case_keyword(text),
            PrintTokenKind::Operator if text.chars().all(|c| c.is_ascii_alphabetic() || c == ' ') => {
                self.case_keyword(text)
            }
            _ => text.to_string(),
        }
    }

    fn case_keyword(&self, text: &str) -> String {
        match self.style.keyword_case {
            KeywordCase::Upper => text.to_ascii_uppercase(),
            KeywordCase::Lower | KeywordCase::None => text.to_string(),
        }
    }
}

fn needs_space(
    prev_kind: PrintTokenKind,
    prev_text: &str,
    next_kind: PrintTokenKind,
    next_text: &str,
) -> bool {
    use PrintTokenKind as K;
    if matches!(prev_kind, K::ParenOpen | K::Dot) {
        return false;
    }
    if matches!(next_kind, K::ParenClose | K::Comma | K::Dot) {
        return false;
    }
    if prev_text == "::" || next_text == "::" {
        return false;
    }
    if prev_kind == K::Operator && prev_text == ":" || next_kind == K::Operator && next_text == ":"
    {
        return false;
    }
    if next_kind == K::ParenOpen {
        if matches!(prev_kind, K::Value | K::Type | K::Parameter) {
            return false;
        }
        if prev_kind == K::ParenClose && next_text == "[" {
            return false;
        }
        if prev_kind == K::Keyword && matches!(prev_text, "cast" | "array") {
            return false;
        }
    }
    true
}
