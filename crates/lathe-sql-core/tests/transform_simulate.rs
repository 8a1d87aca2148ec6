//! End-to-end tests for the write-to-SELECT simulation.

mod common;
use common::*;

use lathe_sql_core::transform::{
    delete_to_select, insert_to_select, merge_to_select, update_to_select, FixtureTable,
    MissingFixtureStrategy, SimulationOptions, TableColumnDefinition, TableDefinition,
    TransformError,
};

fn users_definition() -> TableDefinition {
    TableDefinition::new(
        "users",
        vec![
            TableColumnDefinition::typed("id", "int").not_null(),
            TableColumnDefinition::typed("email", "text").not_null(),
            TableColumnDefinition::typed("active", "bool").default_sql("true"),
        ],
    )
}

fn options() -> SimulationOptions {
    SimulationOptions {
        table_definitions: vec![users_definition()],
        ..SimulationOptions::default()
    }
}

#[test]
fn insert_returning_star_projects_defaults() {
    let insert = parse_insert("INSERT INTO users (id, email) VALUES (1, 'a@x') RETURNING *");
    let simulated = insert_to_select(&insert, &options()).unwrap();
    let sql = normalize_ws(&simulated.to_string());
    assert!(sql.contains("with __inserted_rows(id, email) as"), "got: {sql}");
    assert!(
        sql.contains("__inserted_rows.id as id, __inserted_rows.email as email, true as active"),
        "got: {sql}"
    );
    assert!(sql.ends_with("from __inserted_rows"), "got: {sql}");
}

#[test]
fn insert_without_returning_counts_rows() {
    let insert = parse_insert("INSERT INTO users (id, email) VALUES (1, 'a@x')");
    let simulated = insert_to_select(&insert, &options()).unwrap();
    let sql = simulated.to_string();
    assert!(sql.contains("select count(*) as count from __inserted_rows"), "got: {sql}");
}

#[test]
fn multi_row_values_become_union_all() {
    let insert =
        parse_insert("INSERT INTO users (id, email) VALUES (1, 'a@x'), (2, 'b@x') RETURNING id");
    let simulated = insert_to_select(&insert, &options()).unwrap();
    let sql = simulated.to_string();
    assert!(sql.contains("union all"), "got: {sql}");
}

#[test]
fn returning_expression_rewrites_column_references() {
    let insert =
        parse_insert("INSERT INTO users (id, email) VALUES (1, 'a@x') RETURNING id + 1 AS next_id");
    let simulated = insert_to_select(&insert, &options()).unwrap();
    let sql = simulated.to_string();
    assert!(sql.contains("__inserted_rows.id + 1 as next_id"), "got: {sql}");
}

#[test]
fn resolver_callback_wins() {
    let mut opts = SimulationOptions::default();
    opts.table_definition_resolver = Some(Box::new(|name| {
        (name == "users").then(users_definition)
    }));
    let insert = parse_insert("INSERT INTO users (id, email) VALUES (1, 'a@x')");
    assert!(insert_to_select(&insert, &opts).is_ok());
}

#[test]
fn fixture_only_resolution_has_no_types() {
    let mut opts = SimulationOptions::default();
    opts.fixture_tables.push(FixtureTable {
        name: "users".into(),
        columns: vec!["id".into(), "email".into()],
        rows: vec![],
    });
    let insert = parse_insert("INSERT INTO users (id, email) VALUES (1, 'a@x')");
    let simulated = insert_to_select(&insert, &opts).unwrap();
    // No declared types, so no casts are injected.
    assert!(!simulated.to_string().contains("cast("));
}

#[test]
fn warn_strategy_does_not_fail() {
    let insert = parse_insert("INSERT INTO users (id, email) SELECT id, email FROM staged");
    let mut opts = options();
    opts.missing_fixture_strategy = MissingFixtureStrategy::Warn;
    assert!(insert_to_select(&insert, &opts).is_ok());
}

#[test]
fn update_simulation_counts_without_returning() {
    let update = parse_update("UPDATE users SET active = false WHERE id = 9");
    let mut opts = options();
    opts.missing_fixture_strategy = MissingFixtureStrategy::Passthrough;
    let simulated = update_to_select(&update, &opts).unwrap();
    let sql = simulated.to_string();
    assert!(sql.contains("__updated_rows"), "got: {sql}");
    assert!(sql.contains("count(*) as count"), "got: {sql}");
    assert!(sql.contains("false as active"), "got: {sql}");
}

#[test]
fn delete_simulation_projects_returning() {
    let delete = parse_delete("DELETE FROM users WHERE active = false RETURNING id");
    let mut opts = options();
    opts.missing_fixture_strategy = MissingFixtureStrategy::Passthrough;
    let simulated = delete_to_select(&delete, &opts).unwrap();
    let sql = simulated.to_string();
    assert!(sql.contains("with __deleted_rows(id, email, active) as"), "got: {sql}");
    assert!(sql.contains("select __deleted_rows.id as id from __deleted_rows"), "got: {sql}");
}

#[test]
fn delete_with_fixture_shadows_table() {
    let delete = parse_delete("DELETE FROM users WHERE id = 1");
    let mut opts = options();
    opts.fixture_tables.push(FixtureTable {
        name: "users".into(),
        columns: vec!["id".into(), "email".into(), "active".into()],
        rows: vec![vec!["1".into(), "'a@x'".into(), "true".into()]],
    });
    let simulated = delete_to_select(&delete, &opts).unwrap();
    let sql = normalize_ws(&simulated.to_string());
    assert!(sql.contains("with users(id, email, active) as"), "got: {sql}");
    assert!(sql.contains("values (1, 'a@x', true)"), "got: {sql}");
}

#[test]
fn merge_simulation_unions_per_action() {
    let merge = parse_merge(
        "MERGE INTO users u USING staged s ON u.id = s.id \
         WHEN MATCHED THEN UPDATE SET email = s.email \
         WHEN NOT MATCHED THEN INSERT (id, email) VALUES (s.id, s.email)",
    );
    let mut opts = options();
    opts.missing_fixture_strategy = MissingFixtureStrategy::Passthrough;
    let simulated = merge_to_select(&merge, &opts).unwrap();
    let sql = simulated.to_string();
    assert!(sql.contains("__merged_rows"), "got: {sql}");
    assert!(sql.contains("union all"), "got: {sql}");
    assert!(sql.contains("not exists"), "got: {sql}");
    assert!(sql.contains("s.email as email"), "got: {sql}");
}

#[test]
fn merge_insert_default_values_uses_column_defaults() {
    let merge = parse_merge(
        "MERGE INTO users USING staged AS s ON users.id = s.id \
         WHEN NOT MATCHED THEN INSERT DEFAULT VALUES",
    );
    let mut opts = options();
    opts.missing_fixture_strategy = MissingFixtureStrategy::Passthrough;
    let simulated = merge_to_select(&merge, &opts).unwrap();
    let sql = simulated.to_string();
    // `active` carries its declared default, not NULL.
    assert!(sql.contains("true as active"), "got: {sql}");
    assert!(!sql.contains("null as active"), "got: {sql}");
}

#[test]
fn merge_insert_fills_omitted_columns_from_defaults() {
    let merge = parse_merge(
        "MERGE INTO users USING staged AS s ON users.id = s.id \
         WHEN NOT MATCHED THEN INSERT (id, email) VALUES (s.id, s.email)",
    );
    let mut opts = options();
    opts.missing_fixture_strategy = MissingFixtureStrategy::Passthrough;
    let simulated = merge_to_select(&merge, &opts).unwrap();
    let sql = simulated.to_string();
    assert!(sql.contains("s.id as id"), "got: {sql}");
    assert!(sql.contains("true as active"), "got: {sql}");
}

#[test]
fn merge_insert_missing_required_column_errors() {
    let merge = parse_merge(
        "MERGE INTO users USING staged AS s ON users.id = s.id \
         WHEN NOT MATCHED THEN INSERT (id) VALUES (s.id)",
    );
    let mut opts = options();
    opts.missing_fixture_strategy = MissingFixtureStrategy::Passthrough;
    let err = merge_to_select(&merge, &opts).unwrap_err();
    assert!(
        matches!(err, TransformError::RequiredColumnMissing { column, .. } if column == "email")
    );
}

#[test]
fn merge_do_nothing_only_is_rejected() {
    let merge = parse_merge(
        "MERGE INTO users USING staged AS s ON users.id = s.id \
         WHEN MATCHED THEN DO NOTHING",
    );
    let mut opts = options();
    opts.missing_fixture_strategy = MissingFixtureStrategy::Passthrough;
    let err = merge_to_select(&merge, &opts).unwrap_err();
    assert!(matches!(err, TransformError::UnsupportedQueryType { .. }));
}

#[test]
fn definition_from_create_table() {
    let create = lathe_sql_core::parser::parse_create_table(
        "CREATE TABLE users (id int NOT NULL, email text NOT NULL, active bool DEFAULT true)",
    )
    .unwrap();
    let definition = TableDefinition::from_create_table(&create);
    assert_eq!(definition.column_names(), vec!["id", "email", "active"]);
    assert!(definition.column("active").unwrap().default.is_some());

    let insert = parse_insert("INSERT INTO users (id, email) VALUES (1, 'a@x')");
    let opts = SimulationOptions {
        table_definitions: vec![definition],
        ..SimulationOptions::default()
    };
    assert!(insert_to_select(&insert, &opts).is_ok());
}
