//! # lathe-sql-core
//!
//! A SQL round-trip toolkit: tokenize SQL text into positioned
//! lexemes, parse it into a typed AST, rewrite the tree with
//! semantics-preserving transformers, and print it back in
//! configurable styles.
//!
//! The dialect is PostgreSQL-leaning with tolerance for MySQL,
//! SQL Server, and SQLite forms.
//!
//! ## Parsing and printing
//!
//! ```rust
//! use lathe_sql_core::parser::parse_select;
//! use lathe_sql_core::print::{format_query, SqlPrintStyle};
//!
//! let query = parse_select("SELECT id, name FROM users WHERE active = true").unwrap();
//! let style = SqlPrintStyle::preset("postgres").unwrap();
//! let formatted = format_query(&query, &style);
//! assert!(formatted.sql.contains("select"));
//! ```
//!
//! ## Rewriting
//!
//! ```rust
//! use lathe_sql_core::parser::parse_select;
//! use lathe_sql_core::transform::rename_cte;
//!
//! let mut query = parse_select("WITH c AS (SELECT 1) SELECT * FROM c").unwrap();
//! rename_cte(&mut query, "c", "d").unwrap();
//! assert!(query.to_string().contains("with d as"));
//! ```

pub mod ast;
pub mod cursor;
pub mod lexer;
pub mod parser;
pub mod print;
pub mod transform;

pub use ast::{SelectQuery, Statement, ValueExpr};
pub use cursor::{find_lexeme_at_line_column, find_lexeme_at_position, split_queries};
pub use lexer::{tokenize, Lexeme, LexemeKind, LineColumn, Span, TokenizeError};
pub use parser::{parse_select, parse_statement, ParseError, Parser};
pub use print::{format_query, format_statement, FormatResult, PrintError, SqlPrintStyle};
pub use transform::TransformError;
