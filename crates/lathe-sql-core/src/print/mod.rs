//! Print pipeline: AST → print token tree → formatted SQL.

mod builder;
mod printer;
mod style;
mod token;

pub use builder::PrintTokenBuilder;
pub use printer::SqlPrinter;
pub use style::{
    AndBreak, CommaBreak, CommentMode, CommentStyle, FormatResult, KeywordCase, NewlineStyle,
    ParameterStyle, PlaceholderParams, PrintError, SqlPrintStyle, WithClauseStyle,
};
pub use token::{CommentLevel, ContainerKind, PrintToken, PrintTokenKind};

use std::fmt;

use crate::ast::{
    DeleteQuery, InsertQuery, LiteralValue, MergeQuery, SelectQuery, SimpleSelectQuery, Statement,
    UpdateQuery,
};

use style::ParameterStyle as PStyle;

fn shape_params(
    style: &SqlPrintStyle,
    collected: Vec<(String, Option<LiteralValue>)>,
) -> PlaceholderParams {
    match style.parameter_style {
        PStyle::Anonymous => {
            PlaceholderParams::Anonymous(collected.into_iter().map(|(_, v)| v).collect())
        }
        PStyle::Indexed => {
            PlaceholderParams::Indexed(collected.into_iter().map(|(_, v)| v).collect())
        }
        PStyle::Named => PlaceholderParams::Named(collected),
    }
}

/// Formats any statement under the given style.
#[must_use]
pub fn format_statement(statement: &Statement, style: &SqlPrintStyle) -> FormatResult {
    let mut builder = PrintTokenBuilder::new(style);
    let tree = builder.build_statement(statement);
    let params = builder.into_params();
    let sql = SqlPrinter::new(style).print(&tree);
    FormatResult {
        sql,
        params: shape_params(style, params),
    }
}

/// Formats a select query under the given style.
#[must_use]
pub fn format_query(query: &SelectQuery, style: &SqlPrintStyle) -> FormatResult {
    let mut builder = PrintTokenBuilder::new(style);
    let tree = builder.build_query(query);
    let params = builder.into_params();
    let sql = SqlPrinter::new(style).print(&tree);
    FormatResult {
        sql,
        params: shape_params(style, params),
    }
}

impl fmt::Display for crate::ast::ValueExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let style = SqlPrintStyle::compact();
        let mut builder = PrintTokenBuilder::new(&style);
        let tokens = builder.value_tokens(self);
        let tree = PrintToken::container(ContainerKind::Statement, tokens);
        f.write_str(&SqlPrinter::new(&style).print(&tree))
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = format_statement(self, &SqlPrintStyle::compact());
        f.write_str(&result.sql)
    }
}

impl fmt::Display for SelectQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = format_query(self, &SqlPrintStyle::compact());
        f.write_str(&result.sql)
    }
}

impl fmt::Display for SimpleSelectQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let query = SelectQuery::Simple(self.clone());
        write!(f, "{query}")
    }
}

impl fmt::Display for InsertQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let statement = Statement::Insert(self.clone());
        write!(f, "{statement}")
    }
}

impl fmt::Display for UpdateQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let statement = Statement::Update(self.clone());
        write!(f, "{statement}")
    }
}

impl fmt::Display for DeleteQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let statement = Statement::Delete(self.clone());
        write!(f, "{statement}")
    }
}

impl fmt::Display for MergeQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let statement = Statement::Merge(self.clone());
        write!(f, "{statement}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_select;

    #[test]
    fn test_compact_round_trip() {
        let sql = "SELECT id, name FROM users WHERE active = true";
        let query = parse_select(sql).unwrap();
        let rendered = query.to_string();
        assert_eq!(rendered, "select id, name from users where active = true");
        let again = parse_select(&rendered).unwrap();
        assert_eq!(again.to_string(), rendered);
    }

    #[test]
    fn test_postgres_indexed_params() {
        let query = parse_select("SELECT * FROM t WHERE a = :x AND b = :y AND c = :x").unwrap();
        let style = SqlPrintStyle::preset("postgres").unwrap();
        let result = format_query(&query, &style);
        assert!(result.sql.contains("$1"));
        assert!(result.sql.contains("$2"));
        assert!(!result.sql.contains("$3"));
        assert_eq!(result.params.len(), 2);
    }

    #[test]
    fn test_mysql_anonymous_params() {
        let query = parse_select("SELECT * FROM t WHERE a = :x AND b = :x").unwrap();
        let style = SqlPrintStyle::preset("mysql").unwrap();
        let result = format_query(&query, &style);
        assert_eq!(result.sql.matches('?').count(), 2);
        assert_eq!(result.params.len(), 2);
    }

    #[test]
    fn test_keyword_case_upper() {
        let query = parse_select("select id from t").unwrap();
        let style = SqlPrintStyle::preset("mysql").unwrap();
        let result = format_query(&query, &style);
        assert!(result.sql.starts_with("SELECT"));
        assert!(result.sql.contains("FROM"));
    }
}
