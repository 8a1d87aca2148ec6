//! Keyword recognition.
//!
//! Multi-word keywords (`order by`, `when not matched by source`, …) are
//! recognized greedily by a character trie over the lowercased input.
//! The trie is built once at process init and shared read-only.

use std::collections::HashMap;
use std::sync::LazyLock;

use super::token::LexemeKind;

/// A successful keyword match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMatch {
    /// Bytes of input consumed by the match.
    pub length: usize,
    /// Lowercased phrase with inner whitespace collapsed to single spaces.
    pub normalized: String,
    /// Lexeme role the phrase carries.
    pub kind: LexemeKind,
}

#[derive(Debug, Default)]
struct TrieNode {
    children: HashMap<char, TrieNode>,
    terminal: Option<LexemeKind>,
}

/// A longest-match trie over keyword phrases.
#[derive(Debug, Default)]
pub struct KeywordTrie {
    root: TrieNode,
}

impl KeywordTrie {
    fn insert(&mut self, phrase: &str, kind: LexemeKind) {
        let mut node = &mut self.root;
        for c in phrase.chars() {
            node = node.children.entry(c).or_default();
        }
        node.terminal = Some(kind);
    }

    /// Finds the longest keyword phrase at the start of `input`.
    ///
    /// Words inside a phrase may be separated by arbitrary whitespace;
    /// a match only counts when it ends at a word boundary.
    #[must_use]
    pub fn longest_match(&self, input: &str) -> Option<KeywordMatch> {
        let mut node = &self.root;
        let mut normalized = String::new();
        let mut best: Option<KeywordMatch> = None;
        let mut iter = input.char_indices().peekable();

        while let Some(&(i, c)) = iter.peek() {
            if c.is_whitespace() {
                let Some(next) = node.children.get(&' ') else {
                    break;
                };
                while let Some(&(_, w)) = iter.peek() {
                    if w.is_whitespace() {
                        iter.next();
                    } else {
                        break;
                    }
                }
                node = next;
                normalized.push(' ');
                continue;
            }
            let lower = c.to_ascii_lowercase();
            let Some(next) = node.children.get(&lower) else {
                break;
            };
            iter.next();
            node = next;
            normalized.push(lower);
            if let Some(kind) = node.terminal {
                let end = i + c.len_utf8();
                let at_boundary = match input[end..].chars().next() {
                    Some(n) => !(n.is_alphanumeric() || n == '_'),
                    None => true,
                };
                if at_boundary {
                    best = Some(KeywordMatch {
                        length: end,
                        normalized: normalized.clone(),
                        kind,
                    });
                }
            }
        }
        best
    }

    /// Returns true if the phrase is a known keyword.
    #[must_use]
    pub fn contains(&self, phrase: &str) -> bool {
        let m = self.longest_match(phrase);
        matches!(m, Some(ref m) if m.length == phrase.len())
    }
}

const COMMANDS: &[&str] = &[
    "select",
    "distinct",
    "distinct on",
    "all",
    "from",
    "where",
    "group by",
    "having",
    "window",
    "order by",
    "partition by",
    "limit",
    "offset",
    "fetch",
    "first",
    "next",
    "rows only",
    "row only",
    "with ties",
    "union",
    "union all",
    "intersect",
    "intersect all",
    "except",
    "except all",
    "with",
    "recursive",
    "materialized",
    "not materialized",
    "as",
    "join",
    "inner join",
    "left join",
    "left outer join",
    "right join",
    "right outer join",
    "full join",
    "full outer join",
    "cross join",
    "natural join",
    "natural inner join",
    "natural left join",
    "natural left outer join",
    "natural right join",
    "natural right outer join",
    "natural full join",
    "natural full outer join",
    "lateral",
    "on",
    "using",
    "insert",
    "insert into",
    "insert default values",
    "default values",
    "values",
    "returning",
    "update",
    "set",
    "delete",
    "delete from",
    "merge into",
    "when matched",
    "when not matched",
    "when not matched by source",
    "when not matched by target",
    "then",
    "do nothing",
    "default",
    "case",
    "when",
    "else",
    "end",
    "cast",
    "asc",
    "desc",
    "nulls first",
    "nulls last",
    "over",
    "filter",
    "within group",
    "with ordinality",
    "rows",
    "range",
    "groups",
    "unbounded preceding",
    "unbounded following",
    "current row",
    "preceding",
    "following",
    "for update",
    "for share",
    "for no key update",
    "for key share",
    "nowait",
    "skip locked",
    "create table",
    "create temporary table",
    "create temp table",
    "create index",
    "create unique index",
    "create schema",
    "drop table",
    "drop index",
    "drop schema",
    "alter table",
    "add",
    "drop",
    "column",
    "constraint",
    "alter column",
    "set default",
    "drop default",
    "cascade",
    "restrict",
    "not valid",
    "if exists",
    "if not exists",
    "primary key",
    "foreign key",
    "references",
    "unique",
    "check",
    "comment on",
    "explain",
    "analyze",
    "verbose",
    "vacuum",
    "full",
    "freeze",
    "checkpoint",
    "substring",
    "overlay",
    "trim",
    "position",
    "placing",
    "for",
    "leading",
    "trailing",
    "both",
];

const WORD_OPERATORS: &[&str] = &[
    "and",
    "or",
    "not",
    "is",
    "is not",
    "is distinct from",
    "is not distinct from",
    "in",
    "not in",
    "like",
    "not like",
    "ilike",
    "not ilike",
    "between",
    "not between",
    "similar to",
    "not similar to",
    "exists",
    "not exists",
];

const LITERAL_KEYWORDS: &[&str] = &[
    "null",
    "true",
    "false",
    "current_timestamp",
    "current_date",
    "current_time",
];

/// Non-reserved keywords accepted in identifier positions (aliases,
/// qualified-name segments).
const IDENTIFIER_ALLOWED: &[&str] = &[
    "groups",
    "rows",
    "range",
    "window",
    "over",
    "following",
    "preceding",
    "within",
    "ordinality",
    "lateral",
    "recursive",
    "materialized",
    "partition",
    "filter",
    "first",
    "next",
    "only",
    "column",
    "add",
    "position",
    "leading",
    "trailing",
    "both",
    "value",
];

/// Shared keyword trie, built once.
pub static KEYWORDS: LazyLock<KeywordTrie> = LazyLock::new(|| {
    let mut trie = KeywordTrie::default();
    for phrase in COMMANDS {
        trie.insert(phrase, LexemeKind::COMMAND);
    }
    for phrase in WORD_OPERATORS {
        trie.insert(phrase, LexemeKind::OPERATOR);
    }
    for phrase in LITERAL_KEYWORDS {
        trie.insert(phrase, LexemeKind::LITERAL);
    }
    trie
});

/// Returns true if a single word is a keyword that may still be used
/// as an identifier segment or alias.
#[must_use]
pub fn is_identifier_allowed(word: &str) -> bool {
    let lower = word.to_ascii_lowercase();
    IDENTIFIER_ALLOWED.contains(&lower.as_str())
}

/// Returns true if the word is reserved: recognized by the keyword trie
/// and not on the identifier allow-list.
#[must_use]
pub fn is_reserved(word: &str) -> bool {
    let lower = word.to_ascii_lowercase();
    KEYWORDS.contains(&lower) && !is_identifier_allowed(&lower)
}

/// SQL type-constructor names: `name(args)` parses as a type, not a
/// function call. `date` is absent on purpose; it is disambiguated by
/// its first argument.
pub const TYPE_CONSTRUCTORS: &[&str] = &[
    "numeric",
    "decimal",
    "varchar",
    "char",
    "character",
    "timestamp",
    "time",
    "interval",
];

/// Returns true for names that always denote a type constructor when
/// followed by a parenthesized argument list.
#[must_use]
pub fn is_type_constructor(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    TYPE_CONSTRUCTORS.contains(&lower.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_word_match() {
        let m = KEYWORDS.longest_match("select id").unwrap();
        assert_eq!(m.length, 6);
        assert_eq!(m.normalized, "select");
        assert_eq!(m.kind, LexemeKind::COMMAND);
    }

    #[test]
    fn test_multi_word_greedy() {
        let m = KEYWORDS.longest_match("order   by name").unwrap();
        assert_eq!(m.normalized, "order by");
        assert_eq!(m.length, "order   by".len());
    }

    #[test]
    fn test_longest_match_wins() {
        let m = KEYWORDS.longest_match("when not matched by source then").unwrap();
        assert_eq!(m.normalized, "when not matched by source");
    }

    #[test]
    fn test_word_boundary_respected() {
        // "order" must not match inside "orders".
        assert!(KEYWORDS.longest_match("orders").is_none());
        // "union all" falls back to "union" before "allies".
        let m = KEYWORDS.longest_match("union allies").unwrap();
        assert_eq!(m.normalized, "union");
    }

    #[test]
    fn test_case_insensitive() {
        let m = KEYWORDS.longest_match("SeLeCt 1").unwrap();
        assert_eq!(m.normalized, "select");
    }

    #[test]
    fn test_word_operator_kind() {
        let m = KEYWORDS.longest_match("is not distinct from x").unwrap();
        assert_eq!(m.normalized, "is not distinct from");
        assert_eq!(m.kind, LexemeKind::OPERATOR);
    }

    #[test]
    fn test_reserved_and_allowed() {
        assert!(is_reserved("select"));
        assert!(is_reserved("where"));
        assert!(!is_reserved("partition"));
        assert!(!is_reserved("my_table"));
        assert!(is_identifier_allowed("rows"));
    }

    #[test]
    fn test_type_constructors() {
        assert!(is_type_constructor("NUMERIC"));
        assert!(is_type_constructor("interval"));
        assert!(!is_type_constructor("date"));
        assert!(!is_type_constructor("count"));
    }
}
