//! Rename transformers: CTE rename with reference rewiring, a
//! cursor-position variant, and the smart renamer that routes between
//! CTE and table-alias renames.

use tracing::debug;

use crate::ast::{
    ColumnReference, CteBody, FromClause, SelectQuery, SimpleSelectQuery, SourceExpression,
    TableSource, ValueExpr,
};
use crate::cursor::find_lexeme_at_line_column;
use crate::lexer::{is_reserved, tokenize, LexemeKind, LineColumn, Span};
use crate::parser::parse_select;
use crate::print::{format_query, SqlPrintStyle};

use super::error::TransformError;

/// Mutable expression walk with pluggable column and subquery hooks.
trait MutWalker {
    fn on_column(&mut self, column: &mut ColumnReference);
    fn on_inline_query(&mut self, query: &mut SelectQuery);
}

fn walk_expr(expr: &mut ValueExpr, walker: &mut dyn MutWalker) {
    match expr {
        ValueExpr::Column(column) => walker.on_column(column),
        ValueExpr::Function(call) => {
            match &mut call.args {
                crate::ast::FunctionArguments::List(items) => {
                    for item in items {
                        walk_expr(item, walker);
                    }
                }
                crate::ast::FunctionArguments::Substring {
                    input,
                    from,
                    for_count,
                } => {
                    walk_expr(input, walker);
                    if let Some(from) = from {
                        walk_expr(from, walker);
                    }
                    if let Some(count) = for_count {
                        walk_expr(count, walker);
                    }
                }
                crate::ast::FunctionArguments::Overlay {
                    input,
                    placing,
                    from,
                    for_count,
                } => {
                    walk_expr(input, walker);
                    walk_expr(placing, walker);
                    walk_expr(from, walker);
                    if let Some(count) = for_count {
                        walk_expr(count, walker);
                    }
                }
                crate::ast::FunctionArguments::Trim {
                    characters, input, ..
                } => {
                    if let Some(characters) = characters {
                        walk_expr(characters, walker);
                    }
                    walk_expr(input, walker);
                }
                crate::ast::FunctionArguments::Position { needle, haystack } => {
                    walk_expr(needle, walker);
                    walk_expr(haystack, walker);
                }
            }
            if let Some(filter) = &mut call.filter {
                walk_expr(filter, walker);
            }
            if let Some(within) = &mut call.within_group {
                for item in within {
                    walk_expr(&mut item.expr, walker);
                }
            }
            if let Some(over) = &mut call.over {
                for expr in &mut over.partition_by {
                    walk_expr(expr, walker);
                }
                for item in &mut over.order_by {
                    walk_expr(&mut item.expr, walker);
                }
            }
        }
        ValueExpr::Unary(unary) => walk_expr(&mut unary.expr, walker),
        ValueExpr::Binary(binary) => {
            walk_expr(&mut binary.left, walker);
            walk_expr(&mut binary.right, walker);
        }
        ValueExpr::Between(between) => {
            walk_expr(&mut between.expr, walker);
            walk_expr(&mut between.lower, walker);
            walk_expr(&mut between.upper, walker);
        }
        ValueExpr::Cast(cast) => walk_expr(&mut cast.expr, walker),
        ValueExpr::Case(case) => {
            if let Some(operand) = &mut case.operand {
                walk_expr(operand, walker);
            }
            for pair in &mut case.switch.pairs {
                walk_expr(&mut pair.key, walker);
                walk_expr(&mut pair.value, walker);
            }
            if let Some(else_value) = &mut case.switch.else_value {
                walk_expr(else_value, walker);
            }
        }
        ValueExpr::Paren(inner) => walk_expr(inner, walker),
        ValueExpr::Tuple(items) | ValueExpr::ValueList(items) | ValueExpr::Array(items) => {
            for item in items {
                walk_expr(item, walker);
            }
        }
        ValueExpr::ArrayIndex(index) => {
            walk_expr(&mut index.array, walker);
            walk_expr(&mut index.index, walker);
        }
        ValueExpr::ArraySlice(slice) => {
            walk_expr(&mut slice.array, walker);
            if let Some(from) = &mut slice.from {
                walk_expr(from, walker);
            }
            if let Some(to) = &mut slice.to {
                walk_expr(to, walker);
            }
        }
        ValueExpr::ArrayQuery(query) | ValueExpr::InlineQuery(query) => {
            walker.on_inline_query(query);
        }
        ValueExpr::Literal(_)
        | ValueExpr::RawString(_)
        | ValueExpr::IdentifierString(_)
        | ValueExpr::Parameter(_)
        | ValueExpr::Type(_)
        | ValueExpr::StringSpecifier(_) => {}
    }
}

fn walk_simple_exprs(query: &mut SimpleSelectQuery, walker: &mut dyn MutWalker) {
    for item in &mut query.select.items {
        walk_expr(&mut item.expr, walker);
    }
    if let Some(where_clause) = &mut query.where_clause {
        walk_expr(&mut where_clause.condition, walker);
    }
    if let Some(group_by) = &mut query.group_by {
        for item in &mut group_by.items {
            walk_expr(item, walker);
        }
    }
    if let Some(having) = &mut query.having {
        walk_expr(&mut having.condition, walker);
    }
    if let Some(order_by) = &mut query.order_by {
        for item in &mut order_by.items {
            walk_expr(&mut item.expr, walker);
        }
    }
    if let Some(limit) = &mut query.limit {
        walk_expr(limit, walker);
    }
    if let Some(offset) = &mut query.offset {
        walk_expr(offset, walker);
    }
}

/// In-place CTE renamer.
struct CteRenamer<'a> {
    old: &'a str,
    new: &'a str,
}

impl MutWalker for CteRenamer<'_> {
    fn on_column(&mut self, column: &mut ColumnReference) {
        if column.namespace_matches(self.old) {
            column.namespaces[0] = self.new.to_string();
        }
    }

    fn on_inline_query(&mut self, query: &mut SelectQuery) {
        self.query(query);
    }
}

impl CteRenamer<'_> {
    fn query(&mut self, query: &mut SelectQuery) {
        match query {
            SelectQuery::Simple(simple) => self.simple(simple),
            SelectQuery::Binary(binary) => {
                self.query(&mut binary.left);
                self.query(&mut binary.right);
            }
            SelectQuery::Values(values) => {
                for row in &mut values.rows {
                    for expr in row {
                        walk_expr(expr, self);
                    }
                }
            }
        }
    }

    fn simple(&mut self, query: &mut SimpleSelectQuery) {
        if let Some(with) = &mut query.with {
            for cte in &mut with.tables {
                if cte.name().eq_ignore_ascii_case(self.old) {
                    cte.alias.name = self.new.to_string();
                }
                // Writable CTE bodies are not traversed for FROM/JOIN
                // rewrites.
                if let CteBody::Select(body) = &mut cte.body {
                    self.query(body);
                }
            }
        }
        if let Some(from) = &mut query.from {
            self.from(from);
        }
        walk_simple_exprs(query, self);
    }

    fn from(&mut self, from: &mut FromClause) {
        self.source(&mut from.source);
        for join in &mut from.joins {
            self.source(&mut join.source);
            if let Some(crate::ast::JoinCondition::On(predicate)) = &mut join.condition {
                walk_expr(predicate, self);
            }
        }
    }

    fn source(&mut self, source: &mut SourceExpression) {
        match &mut source.source {
            TableSource::Table(name) => {
                if name.namespaces.is_empty() && name.name.eq_ignore_ascii_case(self.old) {
                    name.name = self.new.to_string();
                }
            }
            TableSource::SubQuery(query) => self.query(query),
            TableSource::Function(call) => {
                if let crate::ast::FunctionArguments::List(items) = &mut call.args {
                    for item in items {
                        walk_expr(item, self);
                    }
                }
            }
            TableSource::Values(values) => {
                for row in &mut values.rows {
                    for expr in row {
                        walk_expr(expr, self);
                    }
                }
            }
        }
    }
}

fn check_cycles(query: &SelectQuery, stack: &mut Vec<String>) -> Result<(), TransformError> {
    let SelectQuery::Simple(simple) = query else {
        match query {
            SelectQuery::Binary(binary) => {
                check_cycles(&binary.left, stack)?;
                check_cycles(&binary.right, stack)?;
            }
            _ => {}
        }
        return Ok(());
    };
    if let Some(with) = &simple.with {
        for cte in &with.tables {
            let key = cte.name().to_ascii_lowercase();
            if stack.contains(&key) {
                return Err(TransformError::CyclicReference {
                    name: cte.name().to_string(),
                });
            }
            stack.push(key);
            if let CteBody::Select(body) = &cte.body {
                check_cycles(body, stack)?;
            }
            stack.pop();
        }
    }
    Ok(())
}

fn validated_name(name: &str) -> Result<String, TransformError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TransformError::InvalidCteName {
            name: name.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Renames a CTE and rewires every reference to it: the WITH alias,
/// column namespaces, table sources, and sources inside other CTE
/// bodies. Fails without touching the query.
///
/// # Errors
///
/// [`TransformError::CteNotExists`] when `old_name` is not defined,
/// [`TransformError::CteAlreadyExists`] when `new_name` is taken,
/// [`TransformError::UnsupportedQueryType`] for Binary/Values inputs,
/// [`TransformError::CyclicReference`] when the CTE chain loops.
pub fn rename_cte(
    query: &mut SelectQuery,
    old_name: &str,
    new_name: &str,
) -> Result<(), TransformError> {
    let old = validated_name(old_name)?;
    let new = validated_name(new_name)?;
    if old.eq_ignore_ascii_case(&new) {
        return Err(TransformError::CteAlreadyExists { name: new });
    }
    let SelectQuery::Simple(_) = query else {
        return Err(TransformError::UnsupportedQueryType {
            detail: "CTE rename requires a simple select query".to_string(),
        });
    };
    if !query.has_cte(&old) {
        return Err(TransformError::CteNotExists { name: old });
    }
    if query.has_cte(&new) {
        return Err(TransformError::CteAlreadyExists { name: new });
    }
    check_cycles(query, &mut Vec::new())?;

    debug!(old = %old, new = %new, "renaming CTE");
    let mut renamer = CteRenamer {
        old: &old,
        new: &new,
    };
    renamer.query(query);
    Ok(())
}

/// Renames the CTE whose alias sits under the cursor and returns the
/// re-printed SQL.
///
/// # Errors
///
/// [`TransformError::UnsupportedToken`] when the cursor is not on an
/// identifier, [`TransformError::InvalidCteName`] when the new name is
/// a reserved keyword, plus the [`rename_cte`] failures.
pub fn rename_cte_at_position(
    sql: &str,
    position: LineColumn,
    new_name: &str,
) -> Result<String, TransformError> {
    let Some(lexeme) = find_lexeme_at_line_column(sql, position) else {
        return Err(TransformError::UnsupportedToken {
            found: "nothing".to_string(),
        });
    };
    if !lexeme.is(LexemeKind::IDENTIFIER | LexemeKind::FUNCTION) {
        return Err(TransformError::UnsupportedToken {
            found: lexeme.value,
        });
    }
    let mut query = parse_select(sql)?;
    if !query.has_cte(&lexeme.value) {
        return Err(TransformError::CteNotExists {
            name: lexeme.value,
        });
    }
    if is_reserved(new_name) {
        return Err(TransformError::InvalidCteName {
            name: new_name.to_string(),
        });
    }
    rename_cte(&mut query, &lexeme.value, new_name)?;
    Ok(format_query(&query, &SqlPrintStyle::compact()).sql)
}

/// Options for [`smart_rename`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SmartRenameOptions {
    /// Replace tokens in the original text instead of re-printing,
    /// keeping byte-level formatting. Falls back to re-printing when
    /// the replacement cannot be verified.
    pub preserve_formatting: bool,
}

/// Scope-aware table alias renamer.
struct AliasRenamer<'a> {
    old: &'a str,
    new: &'a str,
    in_scope: bool,
}

impl MutWalker for AliasRenamer<'_> {
    fn on_column(&mut self, column: &mut ColumnReference) {
        if self.in_scope && column.namespace_matches(self.old) {
            column.namespaces[0] = self.new.to_string();
        }
    }

    fn on_inline_query(&mut self, query: &mut SelectQuery) {
        // Expression subqueries are correlated; the alias stays
        // visible inside them.
        rename_alias_query(query, self.old, self.new, self.in_scope);
    }
}

fn source_defines_alias(from: &FromClause, alias: &str) -> bool {
    let defined = |source: &SourceExpression| {
        source
            .alias
            .as_ref()
            .is_some_and(|a| a.name.eq_ignore_ascii_case(alias))
    };
    defined(&from.source) || from.joins.iter().any(|join| defined(&join.source))
}

fn rename_alias_query(query: &mut SelectQuery, old: &str, new: &str, in_scope: bool) {
    match query {
        SelectQuery::Simple(simple) => rename_alias_simple(simple, old, new, in_scope),
        SelectQuery::Binary(binary) => {
            rename_alias_query(&mut binary.left, old, new, in_scope);
            rename_alias_query(&mut binary.right, old, new, in_scope);
        }
        SelectQuery::Values(_) => {}
    }
}

fn rename_alias_simple(query: &mut SimpleSelectQuery, old: &str, new: &str, in_scope: bool) {
    let defines = query
        .from
        .as_ref()
        .is_some_and(|from| source_defines_alias(from, old));

    // An inner definition shadows an outer one; leave the subtree
    // untouched.
    if defines && in_scope {
        return;
    }

    if let Some(with) = &mut query.with {
        for cte in &mut with.tables {
            if let CteBody::Select(body) = &mut cte.body {
                rename_alias_query(body, old, new, false);
            }
        }
    }

    let scope = defines || in_scope;
    if let Some(from) = &mut query.from {
        let rename_source = |source: &mut SourceExpression| {
            if let Some(alias) = &mut source.alias {
                if alias.name.eq_ignore_ascii_case(old) {
                    alias.name = new.to_string();
                }
            }
        };
        if defines {
            rename_source(&mut from.source);
            for join in &mut from.joins {
                rename_source(&mut join.source);
            }
        }
        // Subqueries in FROM have their own scope unless LATERAL.
        let mut recurse = |source: &mut SourceExpression, lateral: bool| {
            if let TableSource::SubQuery(sub) = &mut source.source {
                rename_alias_query(sub, old, new, lateral && scope);
            }
        };
        recurse(&mut from.source, false);
        for join in &mut from.joins {
            let lateral = join.lateral;
            recurse(&mut join.source, lateral);
            if let Some(crate::ast::JoinCondition::On(predicate)) = &mut join.condition {
                let mut walker = AliasRenamer {
                    old,
                    new,
                    in_scope: scope,
                };
                walk_expr(predicate, &mut walker);
            }
        }
    }

    let mut walker = AliasRenamer {
        old,
        new,
        in_scope: scope,
    };
    walk_simple_exprs(query, &mut walker);
}

fn word_occurrences(sql: &str, word: &str) -> usize {
    tokenize(sql)
        .map(|lexemes| {
            lexemes
                .iter()
                .filter(|l| {
                    l.is(LexemeKind::IDENTIFIER | LexemeKind::FUNCTION)
                        && l.value.eq_ignore_ascii_case(word)
                })
                .count()
        })
        .unwrap_or(0)
}

/// Splices `new` over every identifier lexeme spelled `old`.
fn replace_identifier_tokens(sql: &str, old: &str, new: &str) -> Option<String> {
    let lexemes = tokenize(sql).ok()?;
    let spans: Vec<Span> = lexemes
        .iter()
        .filter(|l| {
            l.is(LexemeKind::IDENTIFIER | LexemeKind::FUNCTION)
                && l.value.eq_ignore_ascii_case(old)
        })
        .filter_map(|l| l.position.map(|p| p.span))
        .collect();
    if spans.is_empty() {
        return None;
    }
    let mut output = sql.to_string();
    for span in spans.iter().rev() {
        output.replace_range(span.start..span.end, new);
    }
    Some(output)
}

/// Routes a rename request at a cursor position to either the CTE
/// renamer or the table-alias renamer, returning the updated SQL.
///
/// # Errors
///
/// [`TransformError::UnsupportedToken`] when the cursor does not sit
/// on an identifier or the identifier is neither a CTE alias nor a
/// table alias; plus the [`rename_cte`] failure modes.
pub fn smart_rename(
    sql: &str,
    position: LineColumn,
    new_name: &str,
    options: SmartRenameOptions,
) -> Result<String, TransformError> {
    let Some(lexeme) = find_lexeme_at_line_column(sql, position) else {
        return Err(TransformError::UnsupportedToken {
            found: "nothing".to_string(),
        });
    };
    if !lexeme.is(LexemeKind::IDENTIFIER | LexemeKind::FUNCTION) {
        return Err(TransformError::UnsupportedToken {
            found: lexeme.value,
        });
    }
    let old = lexeme.value;
    let mut query = parse_select(sql)?;
    let is_cte = query.has_cte(&old);

    if options.preserve_formatting {
        if let Some(replaced) = replace_identifier_tokens(sql, &old, new_name) {
            let sound = replaced != sql
                && replaced.contains(new_name)
                && word_occurrences(&replaced, &old) < word_occurrences(sql, &old);
            if sound {
                return Ok(replaced);
            }
            debug!(old = %old, "token replacement failed its post-conditions, re-printing");
        }
    }

    if is_cte {
        rename_cte(&mut query, &old, new_name)?;
    } else {
        let defines = match &query {
            SelectQuery::Simple(simple) => simple
                .from
                .as_ref()
                .is_some_and(|from| source_defines_alias(from, &old)),
            _ => false,
        };
        if !defines && !query_mentions_alias(&query, &old) {
            return Err(TransformError::UnsupportedToken { found: old });
        }
        rename_alias_query(&mut query, &old, new_name, false);
    }
    Ok(format_query(&query, &SqlPrintStyle::compact()).sql)
}

fn query_mentions_alias(query: &SelectQuery, alias: &str) -> bool {
    match query {
        SelectQuery::Simple(simple) => {
            simple
                .from
                .as_ref()
                .is_some_and(|from| source_defines_alias(from, alias))
                || simple.with.as_ref().is_some_and(|with| {
                    with.tables.iter().any(|cte| {
                        cte.body
                            .as_select()
                            .is_some_and(|body| query_mentions_alias(body, alias))
                    })
                })
        }
        SelectQuery::Binary(binary) => {
            query_mentions_alias(&binary.left, alias) || query_mentions_alias(&binary.right, alias)
        }
        SelectQuery::Values(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rename_cte_rewires_references() {
        let mut query =
            parse_select("WITH c AS (SELECT id FROM t) SELECT c.id FROM c").unwrap();
        rename_cte(&mut query, "c", "d").unwrap();
        let rendered = query.to_string();
        assert!(rendered.contains("with d as (select id from t)"));
        assert!(rendered.contains("select d.id from d"));
        assert!(!rendered.contains(" c."));
    }

    #[test]
    fn test_rename_missing_cte_fails() {
        let mut query = parse_select("SELECT 1").unwrap();
        let err = rename_cte(&mut query, "c", "d").unwrap_err();
        assert!(matches!(err, TransformError::UnsupportedQueryType { .. })
            || matches!(err, TransformError::CteNotExists { .. }));
    }

    #[test]
    fn test_rename_to_existing_fails() {
        let mut query =
            parse_select("WITH a AS (SELECT 1), b AS (SELECT 2) SELECT * FROM a").unwrap();
        let before = query.clone();
        let err = rename_cte(&mut query, "a", "b").unwrap_err();
        assert!(matches!(err, TransformError::CteAlreadyExists { .. }));
        assert_eq!(query, before);
    }

    #[test]
    fn test_rename_inside_other_cte_bodies() {
        let mut query = parse_select(
            "WITH a AS (SELECT 1 AS x), b AS (SELECT x FROM a) SELECT * FROM b",
        )
        .unwrap();
        rename_cte(&mut query, "a", "base").unwrap();
        let rendered = query.to_string();
        assert!(rendered.contains("b as (select x from base)"));
    }

    #[test]
    fn test_rename_round_trip_is_identity() {
        let original =
            parse_select("WITH c AS (SELECT id FROM t) SELECT * FROM c").unwrap();
        let mut query = original.clone();
        rename_cte(&mut query, "c", "d").unwrap();
        rename_cte(&mut query, "d", "c").unwrap();
        assert_eq!(query, original);
    }

    #[test]
    fn test_rename_at_position() {
        let sql = "WITH c AS (SELECT id FROM t) SELECT * FROM c";
        let updated = rename_cte_at_position(sql, LineColumn::new(1, 6), "d").unwrap();
        assert_eq!(updated, "with d as (select id from t) select * from d");
    }

    #[test]
    fn test_rename_at_position_on_keyword_fails() {
        let sql = "WITH c AS (SELECT id FROM t) SELECT * FROM c";
        let err = rename_cte_at_position(sql, LineColumn::new(1, 2), "d").unwrap_err();
        assert!(matches!(err, TransformError::UnsupportedToken { .. }));
    }

    #[test]
    fn test_rename_at_position_reserved_target_fails() {
        let sql = "WITH c AS (SELECT id FROM t) SELECT * FROM c";
        let err = rename_cte_at_position(sql, LineColumn::new(1, 6), "select").unwrap_err();
        assert!(matches!(err, TransformError::InvalidCteName { .. }));
    }

    #[test]
    fn test_smart_rename_routes_to_alias() {
        let sql = "SELECT u.id FROM users AS u";
        let updated = smart_rename(
            sql,
            LineColumn::new(1, 27),
            "people",
            SmartRenameOptions::default(),
        )
        .unwrap();
        assert_eq!(updated, "select people.id from users as people");
    }

    #[test]
    fn test_smart_rename_preserves_formatting() {
        let sql = "WITH c AS (SELECT id FROM t)\nSELECT * FROM c";
        let updated = smart_rename(
            sql,
            LineColumn::new(1, 6),
            "d",
            SmartRenameOptions {
                preserve_formatting: true,
            },
        )
        .unwrap();
        assert_eq!(updated, "WITH d AS (SELECT id FROM t)\nSELECT * FROM d");
    }

    #[test]
    fn test_alias_rename_respects_shadowing() {
        let sql = "SELECT u.id, (SELECT u.n FROM v AS u LIMIT 1) FROM users AS u";
        let updated = smart_rename(
            sql,
            LineColumn::new(1, 61),
            "x",
            SmartRenameOptions::default(),
        )
        .unwrap();
        // The inner `u` is a different alias and keeps its name.
        assert!(updated.contains("(select u.n from v as u limit 1)"));
        assert!(updated.contains("select x.id"));
        assert!(updated.ends_with("from users as x"));
    }
}
