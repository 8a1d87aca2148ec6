//! Tests for DDL and utility statement parsing.

mod common;
use common::*;

use lathe_sql_core::ast::{
    AlterTableAction, DropBehavior, DropObjectKind, Statement, TableConstraint,
};
use lathe_sql_core::parser::{self, ParseError};

#[test]
fn create_table_columns_and_constraints() {
    let table = parser::parse_create_table(
        "CREATE TABLE users (\
           id int PRIMARY KEY, \
           email text NOT NULL UNIQUE, \
           active bool DEFAULT true, \
           org_id int REFERENCES orgs (id), \
           CONSTRAINT email_len CHECK (length(email) > 3))",
    )
    .unwrap();
    assert_eq!(table.name.name, "users");
    assert_eq!(table.columns.len(), 4);
    assert!(table.columns[0].primary_key);
    assert!(table.columns[1].not_null);
    assert!(table.columns[1].unique);
    assert!(table.columns[2].default.is_some());
    // Column REFERENCES becomes an anonymous table-level foreign key.
    assert!(table
        .constraints
        .iter()
        .any(|(name, c)| name.is_none() && matches!(c, TableConstraint::ForeignKey { .. })));
    assert!(table
        .constraints
        .iter()
        .any(|(name, c)| name.as_deref() == Some("email_len")
            && matches!(c, TableConstraint::Check(_))));
}

#[test]
fn create_table_if_not_exists_as_select() {
    let table = parser::parse_create_table(
        "CREATE TABLE IF NOT EXISTS snapshot AS SELECT * FROM live",
    )
    .unwrap();
    assert!(table.if_not_exists);
    assert!(table.as_query.is_some());
}

#[test]
fn create_temporary_table() {
    let table = parser::parse_create_table("CREATE TEMPORARY TABLE scratch (id int)").unwrap();
    assert!(table.temporary);
}

#[test]
fn create_index() {
    let index = parser::parse_create_index(
        "CREATE UNIQUE INDEX users_email_idx ON users (lower(email) ASC, id) WHERE active",
    )
    .unwrap();
    assert!(index.unique);
    assert_eq!(index.name.as_deref(), Some("users_email_idx"));
    assert_eq!(index.columns.len(), 2);
    assert!(index.where_clause.is_some());
}

#[test]
fn create_schema() {
    let schema = parser::parse_create_schema("CREATE SCHEMA IF NOT EXISTS reporting").unwrap();
    assert!(schema.if_not_exists);
    assert_eq!(schema.name, "reporting");
}

#[test]
fn drop_table_cascade() {
    let drop = parser::parse_drop_table("DROP TABLE IF EXISTS a, b CASCADE").unwrap();
    assert_eq!(drop.kind, DropObjectKind::Table);
    assert!(drop.if_exists);
    assert_eq!(drop.names.len(), 2);
    assert_eq!(drop.behavior, Some(DropBehavior::Cascade));
}

#[test]
fn drop_index() {
    let drop = parser::parse_drop_index("DROP INDEX users_email_idx").unwrap();
    assert_eq!(drop.kind, DropObjectKind::Index);
}

#[test]
fn alter_table_actions() {
    let alter = parser::parse_alter_table(
        "ALTER TABLE users \
         ADD CONSTRAINT org_fk FOREIGN KEY (org_id) REFERENCES orgs (id) NOT VALID, \
         DROP CONSTRAINT IF EXISTS old_ck CASCADE, \
         DROP COLUMN legacy RESTRICT, \
         ALTER COLUMN active SET DEFAULT false, \
         ALTER COLUMN email DROP DEFAULT",
    )
    .unwrap();
    assert_eq!(alter.actions.len(), 5);
    assert!(matches!(
        &alter.actions[0],
        AlterTableAction::AddConstraint { name: Some(n), not_valid: true, .. } if n == "org_fk"
    ));
    assert!(matches!(
        &alter.actions[1],
        AlterTableAction::DropConstraint { if_exists: true, behavior: Some(DropBehavior::Cascade), .. }
    ));
    assert!(matches!(
        &alter.actions[2],
        AlterTableAction::DropColumn { behavior: Some(DropBehavior::Restrict), .. }
    ));
    assert!(matches!(
        &alter.actions[3],
        AlterTableAction::AlterColumnSetDefault { .. }
    ));
    assert!(matches!(
        &alter.actions[4],
        AlterTableAction::AlterColumnDropDefault { .. }
    ));
}

#[test]
fn alter_table_unknown_action_is_rejected() {
    let err = parser::parse_alter_table("ALTER TABLE users RENAME TO people").unwrap_err();
    assert!(matches!(err, ParseError::Context { source, .. }
        if matches!(*source, ParseError::UnsupportedAction { .. })));
}

#[test]
fn comment_on_table() {
    let comment = parser::parse_comment_on("COMMENT ON TABLE users IS 'people'").unwrap();
    assert_eq!(comment.text.as_deref(), Some("'people'"));
    let cleared = parser::parse_comment_on("COMMENT ON COLUMN users.email IS NULL").unwrap();
    assert!(cleared.text.is_none());
}

#[test]
fn explain_wraps_a_statement() {
    let explain = parser::parse_explain("EXPLAIN ANALYZE SELECT * FROM t").unwrap();
    assert!(explain.analyze);
    assert!(matches!(*explain.statement, Statement::Select(_)));
}

#[test]
fn vacuum_and_checkpoint() {
    let vacuum = parser::parse_vacuum("VACUUM FULL ANALYZE users").unwrap();
    assert!(vacuum.full);
    assert!(vacuum.analyze);
    assert_eq!(vacuum.tables.len(), 1);
    assert!(parser::parse_checkpoint("CHECKPOINT").is_ok());
}

#[test]
fn ddl_statements_round_trip() {
    round_trip("CREATE TABLE t (id int NOT NULL, name text DEFAULT 'x')");
    round_trip("DROP TABLE IF EXISTS t CASCADE");
    round_trip("CREATE UNIQUE INDEX i ON t (a DESC) WHERE b");
    round_trip("COMMENT ON TABLE t IS 'note'");
    round_trip("VACUUM FULL t");
    round_trip("CHECKPOINT");
}
