//! Tests for INSERT, UPDATE, DELETE, and MERGE parsing.

mod common;
use common::*;

use lathe_sql_core::ast::{InsertSource, MergeAction, MergeMatchKind};
use lathe_sql_core::parser::ParseError;

#[test]
fn insert_values() {
    let insert = parse_insert("INSERT INTO users (id, email) VALUES (1, 'a@x'), (2, 'b@x')");
    assert_eq!(insert.target.name, "users");
    assert_eq!(insert.columns, vec!["id".to_string(), "email".into()]);
    let InsertSource::Values(rows) = &insert.source else {
        panic!("expected VALUES");
    };
    assert_eq!(rows.len(), 2);
    round_trip("INSERT INTO users (id, email) VALUES (1, 'a@x'), (2, 'b@x')");
}

#[test]
fn insert_select() {
    let insert = parse_insert("INSERT INTO archive SELECT * FROM events WHERE old");
    assert!(matches!(insert.source, InsertSource::Select(_)));
    assert!(insert.columns.is_empty());
    round_trip("INSERT INTO archive SELECT * FROM events WHERE old");
}

#[test]
fn insert_default_values() {
    let insert = parse_insert("INSERT INTO audit_log DEFAULT VALUES");
    assert!(matches!(insert.source, InsertSource::DefaultValues));
    round_trip("INSERT INTO audit_log DEFAULT VALUES");
}

#[test]
fn insert_returning() {
    let insert = parse_insert("INSERT INTO users (id) VALUES (1) RETURNING id, created_at");
    assert_eq!(insert.returning.unwrap().len(), 2);
}

#[test]
fn insert_returning_star() {
    let insert = parse_insert("INSERT INTO users (id) VALUES (1) RETURNING *");
    let returning = insert.returning.unwrap();
    assert_eq!(returning.len(), 1);
    assert!(returning[0].expr.as_column().unwrap().is_wildcard());
}

#[test]
fn insert_with_cte() {
    let insert = parse_insert(
        "WITH staged AS (SELECT 1 AS id) INSERT INTO users (id) SELECT id FROM staged",
    );
    assert!(insert.with.is_some());
}

#[test]
fn update_basics() {
    let update = parse_update("UPDATE users u SET email = 'x', active = false WHERE u.id = 1");
    assert_eq!(update.alias.as_ref().unwrap().name, "u");
    assert_eq!(update.set.len(), 2);
    assert!(update.where_clause.is_some());
    round_trip("UPDATE users AS u SET email = 'x', active = false WHERE u.id = 1");
}

#[test]
fn update_from_join() {
    let update = parse_update(
        "UPDATE t SET v = s.v FROM staging AS s WHERE t.id = s.id RETURNING t.id",
    );
    assert!(update.from.is_some());
    assert_eq!(update.returning.unwrap().len(), 1);
}

#[test]
fn update_without_set_is_rejected() {
    let err = parse_err("UPDATE users WHERE id = 1");
    assert!(matches!(err, ParseError::Context { source, .. }
        if matches!(*source, ParseError::ExpectedSetClause { .. })));
}

#[test]
fn delete_basics() {
    let delete = parse_delete("DELETE FROM sessions WHERE expires_at < now() RETURNING id");
    assert_eq!(delete.target.name, "sessions");
    assert!(delete.where_clause.is_some());
    assert!(delete.returning.is_some());
    round_trip("DELETE FROM sessions WHERE expires_at < now() RETURNING id");
}

#[test]
fn delete_using() {
    let delete = parse_delete("DELETE FROM a USING b WHERE a.id = b.a_id");
    assert!(delete.using.is_some());
}

#[test]
fn merge_all_when_forms() {
    let merge = parse_merge(
        "MERGE INTO accounts a USING updates u ON a.id = u.id \
         WHEN MATCHED AND u.closed THEN DELETE \
         WHEN MATCHED THEN UPDATE SET balance = u.balance \
         WHEN NOT MATCHED THEN INSERT (id, balance) VALUES (u.id, u.balance) \
         WHEN NOT MATCHED BY SOURCE THEN DO NOTHING",
    );
    assert_eq!(merge.when_clauses.len(), 4);
    assert_eq!(merge.when_clauses[0].match_kind, MergeMatchKind::Matched);
    assert!(merge.when_clauses[0].condition.is_some());
    assert!(matches!(merge.when_clauses[0].action, MergeAction::Delete { .. }));
    assert!(matches!(merge.when_clauses[1].action, MergeAction::Update { .. }));
    assert!(matches!(merge.when_clauses[2].action, MergeAction::Insert { .. }));
    assert_eq!(
        merge.when_clauses[3].match_kind,
        MergeMatchKind::NotMatchedBySource
    );
    assert!(matches!(merge.when_clauses[3].action, MergeAction::DoNothing));
}

#[test]
fn merge_insert_default_values() {
    let merge = parse_merge(
        "MERGE INTO t USING s ON t.id = s.id \
         WHEN NOT MATCHED THEN INSERT DEFAULT VALUES",
    );
    assert!(matches!(
        merge.when_clauses[0].action,
        MergeAction::InsertDefaultValues
    ));
}

#[test]
fn merge_update_with_trailing_predicate() {
    let merge = parse_merge(
        "MERGE INTO t USING s ON t.id = s.id \
         WHEN MATCHED THEN UPDATE SET v = s.v WHERE s.v IS NOT NULL",
    );
    let MergeAction::Update { where_clause, .. } = &merge.when_clauses[0].action else {
        panic!("expected an update action");
    };
    assert!(where_clause.is_some());
}

#[test]
fn merge_requires_when_clause() {
    let err = parse_err("MERGE INTO t USING s ON t.id = s.id");
    let message = err.to_string();
    assert!(message.contains("WHEN"), "got: {message}");
}

#[test]
fn merge_round_trip() {
    round_trip(
        "MERGE INTO accounts AS a USING updates AS u ON a.id = u.id \
         WHEN MATCHED THEN UPDATE SET balance = u.balance \
         WHEN NOT MATCHED THEN INSERT (id, balance) VALUES (u.id, u.balance)",
    );
}
