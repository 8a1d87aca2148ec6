//! Write-to-SELECT simulation.
//!
//! Converts INSERT/UPDATE/DELETE/MERGE statements into SELECT queries
//! whose result set matches the write's RETURNING contract (or a
//! single-row affected count when RETURNING is absent), against
//! caller-supplied table definitions and fixtures.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ast::{
    ColumnReference, CommonTable, Comments, CreateTableQuery, CteBody, DeleteQuery, FromClause,
    InsertQuery, InsertSource, JoinCondition, MergeAction, MergeMatchKind, MergeQuery,
    QualifiedName, SelectItem, SelectQuery, SetItem, SimpleSelectQuery, SourceExpression,
    TableAlias, TableSource, TypeValue, UpdateQuery, ValueExpr, ValuesQuery, WhereClause,
    WithClause,
};
use crate::lexer::tokenize;
use crate::parser::Parser;

use super::error::TransformError;
use super::rewrite::{rewrite_value, ValueRewriter};

/// One column of a table definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableColumnDefinition {
    /// Column name.
    pub name: String,
    /// Declared SQL type, when known.
    #[serde(default)]
    pub sql_type: Option<String>,
    /// NOT NULL.
    #[serde(default)]
    pub not_null: bool,
    /// Default value as SQL text; re-parsed on use.
    #[serde(default)]
    pub default: Option<String>,
    /// Identity/serial column.
    #[serde(default)]
    pub identity: bool,
}

impl TableColumnDefinition {
    /// A bare nullable column.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: None,
            not_null: false,
            default: None,
            identity: false,
        }
    }

    /// A typed column.
    #[must_use]
    pub fn typed(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            sql_type: Some(sql_type.into()),
            ..Self::new(name)
        }
    }

    /// Marks the column NOT NULL.
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Sets the default value text.
    #[must_use]
    pub fn default_sql(mut self, sql: impl Into<String>) -> Self {
        self.default = Some(sql.into());
        self
    }

    /// A column is required when it is NOT NULL with neither a default
    /// nor an identity.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.not_null && self.default.is_none() && !self.identity
    }
}

/// A table definition used to resolve INSERT targets and RETURNING
/// projections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    /// Table name, optionally schema-qualified with dots.
    pub name: String,
    /// Columns in table order.
    pub columns: Vec<TableColumnDefinition>,
}

impl TableDefinition {
    /// Creates a definition.
    #[must_use]
    pub fn new(name: impl Into<String>, columns: Vec<TableColumnDefinition>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Looks up a column case-insensitively.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&TableColumnDefinition> {
        self.columns
            .iter()
            .find(|column| column.name.eq_ignore_ascii_case(name))
    }

    /// Column names in table order.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Lowercased dotted lookup key.
    #[must_use]
    pub fn lookup_key(&self) -> String {
        self.name.to_ascii_lowercase()
    }

    /// Derives a definition from a parsed CREATE TABLE statement.
    #[must_use]
    pub fn from_create_table(query: &CreateTableQuery) -> Self {
        let columns = query
            .columns
            .iter()
            .map(|column| TableColumnDefinition {
                name: column.name.clone(),
                sql_type: Some(column.data_type.name.clone()),
                not_null: column.not_null || column.primary_key,
                default: column.default.as_ref().map(std::string::ToString::to_string),
                identity: false,
            })
            .collect();
        Self::new(query.name.full_name(), columns)
    }
}

/// A shadow table: rows that stand in for a physical table inside the
/// simulated SELECT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureTable {
    /// Shadowed table name.
    pub name: String,
    /// Column names.
    pub columns: Vec<String>,
    /// Rows as SQL value texts, re-parsed when the fixture CTE is
    /// built.
    pub rows: Vec<Vec<String>>,
}

/// What to do when a referenced table has no fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingFixtureStrategy {
    /// Fail the conversion.
    #[default]
    Error,
    /// Log a warning and continue.
    Warn,
    /// Continue silently; the physical table is read as-is.
    Passthrough,
}

/// Resolver callback for table definitions.
pub type TableDefinitionResolver = Box<dyn Fn(&str) -> Option<TableDefinition>>;

/// Options shared by the write-to-SELECT conversions.
#[derive(Default)]
pub struct SimulationOptions {
    /// Registry of table definitions, keyed by lowercased name.
    pub table_definitions: Vec<TableDefinition>,
    /// Caller-supplied resolver, consulted first.
    pub table_definition_resolver: Option<TableDefinitionResolver>,
    /// Shadow tables for physical references.
    pub fixture_tables: Vec<FixtureTable>,
    /// Missing-fixture policy.
    pub missing_fixture_strategy: MissingFixtureStrategy,
}

impl fmt::Debug for SimulationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationOptions")
            .field("table_definitions", &self.table_definitions)
            .field(
                "table_definition_resolver",
                &self.table_definition_resolver.as_ref().map(|_| "<fn>"),
            )
            .field("fixture_tables", &self.fixture_tables)
            .field("missing_fixture_strategy", &self.missing_fixture_strategy)
            .finish()
    }
}

impl SimulationOptions {
    /// Resolves a table definition: resolver callback first, then the
    /// registry, then a typeless definition derived from a fixture.
    #[must_use]
    pub fn resolve_table(&self, name: &QualifiedName) -> Option<TableDefinition> {
        let key = name.lookup_key();
        let bare = name.name.to_ascii_lowercase();
        if let Some(resolver) = &self.table_definition_resolver {
            if let Some(definition) = resolver(&key).or_else(|| resolver(&bare)) {
                return Some(definition);
            }
        }
        if let Some(definition) = self
            .table_definitions
            .iter()
            .find(|d| d.lookup_key() == key || d.lookup_key() == bare)
        {
            return Some(definition.clone());
        }
        self.fixture_tables
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(&bare) || f.name.eq_ignore_ascii_case(&key))
            .map(|fixture| {
                TableDefinition::new(
                    fixture.name.clone(),
                    fixture
                        .columns
                        .iter()
                        .map(|c| TableColumnDefinition::new(c.clone()))
                        .collect(),
                )
            })
    }

    fn fixture_for(&self, table: &str) -> Option<&FixtureTable> {
        self.fixture_tables
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(table))
    }
}

/// Parses an expression from SQL text (used for column defaults and
/// fixture cells).
fn parse_value_text(text: &str) -> Result<ValueExpr, TransformError> {
    let lexemes = tokenize(text).map_err(crate::parser::ParseError::from)?;
    let mut parser = Parser::new(&lexemes, 0);
    let expr = parser.parse_value_expr()?;
    Ok(expr)
}

#[derive(Debug, Clone)]
struct ColumnMeta {
    name: String,
    provided: bool,
    sql_type: Option<String>,
    default: Option<ValueExpr>,
}

fn column_metadata(
    definition: &TableDefinition,
    effective: &[String],
    target: &QualifiedName,
) -> Result<Vec<ColumnMeta>, TransformError> {
    let mut metadata = Vec::with_capacity(definition.columns.len());
    for column in &definition.columns {
        let provided = effective
            .iter()
            .any(|name| name.eq_ignore_ascii_case(&column.name));
        let default = match &column.default {
            Some(text) => Some(parse_value_text(text)?),
            None => None,
        };
        if !provided && column.is_required() && default.is_none() {
            return Err(TransformError::RequiredColumnMissing {
                table: target.full_name(),
                column: column.name.clone(),
            });
        }
        metadata.push(ColumnMeta {
            name: column.name.clone(),
            provided,
            sql_type: column.sql_type.clone(),
            default,
        });
    }
    Ok(metadata)
}

/// Collects CTE names defined anywhere in the query.
fn collect_cte_names(query: &SelectQuery, out: &mut HashSet<String>) {
    match query {
        SelectQuery::Simple(simple) => {
            if let Some(with) = &simple.with {
                for cte in &with.tables {
                    out.insert(cte.name().to_ascii_lowercase());
                    if let CteBody::Select(body) = &cte.body {
                        collect_cte_names(body, out);
                    }
                }
            }
            if let Some(from) = &simple.from {
                collect_sources_cte_names(&from.source, out);
                for join in &from.joins {
                    collect_sources_cte_names(&join.source, out);
                }
            }
        }
        SelectQuery::Binary(binary) => {
            collect_cte_names(&binary.left, out);
            collect_cte_names(&binary.right, out);
        }
        SelectQuery::Values(_) => {}
    }
}

fn collect_sources_cte_names(source: &SourceExpression, out: &mut HashSet<String>) {
    if let TableSource::SubQuery(query) = &source.source {
        collect_cte_names(query, out);
    }
}

/// Collects physical table references, excluding CTE aliases, in first
/// reference order.
fn collect_physical_tables(
    query: &SelectQuery,
    exclude: &HashSet<String>,
    out: &mut Vec<String>,
) {
    match query {
        SelectQuery::Simple(simple) => {
            if let Some(with) = &simple.with {
                for cte in &with.tables {
                    if let CteBody::Select(body) = &cte.body {
                        collect_physical_tables(body, exclude, out);
                    }
                }
            }
            if let Some(from) = &simple.from {
                let sources =
                    std::iter::once(&from.source).chain(from.joins.iter().map(|j| &j.source));
                for source in sources {
                    match &source.source {
                        TableSource::Table(name) => push_physical_table(name, exclude, out),
                        TableSource::SubQuery(sub) => {
                            collect_physical_tables(sub, exclude, out);
                        }
                        _ => {}
                    }
                }
            }
        }
        SelectQuery::Binary(binary) => {
            collect_physical_tables(&binary.left, exclude, out);
            collect_physical_tables(&binary.right, exclude, out);
        }
        SelectQuery::Values(_) => {}
    }
}

fn push_physical_table(name: &QualifiedName, exclude: &HashSet<String>, out: &mut Vec<String>) {
    let key = name.name.to_ascii_lowercase();
    if exclude.contains(&key) || exclude.contains(&name.lookup_key()) {
        return;
    }
    if !out.iter().any(|t| t.eq_ignore_ascii_case(&key)) {
        out.push(name.name.clone());
    }
}

/// Builds a shadow CTE for a fixture table.
fn fixture_cte(fixture: &FixtureTable) -> Result<CommonTable, TransformError> {
    let body = if fixture.rows.is_empty() {
        // Zero rows: project NULLs and filter everything out.
        let items = fixture
            .columns
            .iter()
            .map(|column| SelectItem::aliased(ValueExpr::null(), column.clone()))
            .collect();
        let mut query = SimpleSelectQuery::from_items(items);
        query.where_clause = Some(WhereClause::new(ValueExpr::boolean(false)));
        SelectQuery::Simple(query)
    } else {
        let mut rows = Vec::with_capacity(fixture.rows.len());
        for row in &fixture.rows {
            if row.len() != fixture.columns.len() {
                return Err(TransformError::ArityMismatch {
                    expected: fixture.columns.len(),
                    actual: row.len(),
                });
            }
            let mut cells = Vec::with_capacity(row.len());
            for cell in row {
                cells.push(parse_value_text(cell)?);
            }
            rows.push(cells);
        }
        let values = ValuesQuery {
            comments: Comments::new(),
            rows,
            column_aliases: None,
        };
        let items = fixture
            .columns
            .iter()
            .map(|column| SelectItem::new(ValueExpr::column(column.clone())))
            .collect();
        let mut query = SimpleSelectQuery::from_items(items);
        query.from = Some(FromClause::new(SourceExpression {
            source: TableSource::Values(Box::new(values)),
            alias: Some(TableAlias::with_columns("v", fixture.columns.clone())),
        }));
        SelectQuery::Simple(query)
    };
    Ok(CommonTable {
        comments: Comments::new(),
        alias: TableAlias::with_columns(fixture.name.clone(), fixture.columns.clone()),
        materialized: None,
        body: CteBody::Select(Box::new(body)),
    })
}

/// Applies the missing-fixture policy to the referenced tables and
/// returns the shadow CTEs for those that have fixtures.
fn shadow_ctes(
    referenced: &[String],
    options: &SimulationOptions,
) -> Result<Vec<CommonTable>, TransformError> {
    let mut ctes = Vec::new();
    for table in referenced {
        match options.fixture_for(table) {
            Some(fixture) => ctes.push(fixture_cte(fixture)?),
            None => match options.missing_fixture_strategy {
                MissingFixtureStrategy::Error => {
                    return Err(TransformError::MissingFixture {
                        table: table.clone(),
                    });
                }
                MissingFixtureStrategy::Warn => {
                    warn!(table = %table, "no fixture for referenced table");
                }
                MissingFixtureStrategy::Passthrough => {}
            },
        }
    }
    Ok(ctes)
}

fn unique_cte_name(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(&base.to_ascii_lowercase()) {
        return base.to_string();
    }
    let mut n = 1;
    loop {
        let candidate = format!("{base}_{n}");
        if !taken.contains(&candidate.to_ascii_lowercase()) {
            return candidate;
        }
        n += 1;
    }
}

fn attach_with(query: &mut SelectQuery, with: WithClause) -> Result<(), TransformError> {
    match query {
        SelectQuery::Simple(simple) => {
            match &mut simple.with {
                Some(existing) => {
                    let mut tables = with.tables;
                    tables.append(&mut existing.tables);
                    existing.tables = tables;
                    existing.recursive |= with.recursive;
                }
                None => simple.with = Some(with),
            }
            Ok(())
        }
        SelectQuery::Binary(binary) => attach_with(&mut binary.left, with),
        SelectQuery::Values(_) => Err(TransformError::UnsupportedValuesPayload {
            detail: "cannot attach a WITH clause to a bare VALUES query".to_string(),
        }),
    }
}

/// Wraps simulated rows into the final query: shadow CTEs, the rows
/// CTE, and the count/RETURNING projection.
fn finish_simulation(
    body: SelectQuery,
    cte_base: &str,
    columns: Vec<String>,
    metadata: &[ColumnMeta],
    returning: Option<&[SelectItem]>,
    options: &SimulationOptions,
) -> Result<SelectQuery, TransformError> {
    let mut known = HashSet::new();
    collect_cte_names(&body, &mut known);

    let mut referenced = Vec::new();
    collect_physical_tables(&body, &known, &mut referenced);
    let shadows = shadow_ctes(&referenced, options)?;
    for shadow in &shadows {
        known.insert(shadow.name().to_ascii_lowercase());
    }

    let rows_cte_name = unique_cte_name(cte_base, &known);
    debug!(cte = %rows_cte_name, tables = referenced.len(), "building simulated select");

    let mut tables = shadows;
    tables.push(CommonTable {
        comments: Comments::new(),
        alias: TableAlias::with_columns(rows_cte_name.clone(), columns),
        materialized: None,
        body: CteBody::Select(Box::new(body)),
    });

    let mut outer = match returning {
        None => {
            let count = SelectItem::aliased(
                ValueExpr::function("count", vec![ValueExpr::column("*")]),
                "count",
            );
            SimpleSelectQuery::from_items(vec![count])
        }
        Some(items) => {
            let projected = project_returning(items, &rows_cte_name, metadata)?;
            SimpleSelectQuery::from_items(projected)
        }
    };
    outer.from = Some(FromClause::new(SourceExpression::table(
        QualifiedName::new(rows_cte_name),
    )));
    outer.with = Some(WithClause {
        comments: Comments::new(),
        recursive: false,
        tables,
    });
    Ok(SelectQuery::Simple(outer))
}

struct ReturningResolver<'a> {
    cte: &'a str,
    metadata: &'a [ColumnMeta],
}

impl ReturningResolver<'_> {
    fn resolve(&self, name: &str) -> Option<ValueExpr> {
        let meta = self
            .metadata
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))?;
        if meta.provided {
            return Some(ValueExpr::qualified_column(self.cte, meta.name.clone()));
        }
        if let Some(default) = &meta.default {
            return Some(default.clone());
        }
        Some(ValueExpr::null())
    }
}

impl ValueRewriter for ReturningResolver<'_> {
    fn rewrite_column(&mut self, column: &ColumnReference) -> Option<ValueExpr> {
        if column.is_wildcard() {
            return None;
        }
        self.resolve(&column.name)
    }
}

fn project_returning(
    items: &[SelectItem],
    cte: &str,
    metadata: &[ColumnMeta],
) -> Result<Vec<SelectItem>, TransformError> {
    let mut resolver = ReturningResolver { cte, metadata };
    let mut projected = Vec::new();
    for item in items {
        if item.expr.as_column().is_some_and(ColumnReference::is_wildcard) {
            // RETURNING * expands to the full column list in table
            // order.
            for meta in metadata {
                let expr = resolver
                    .resolve(&meta.name)
                    .unwrap_or_else(ValueExpr::null);
                projected.push(SelectItem::aliased(expr, meta.name.clone()));
            }
            continue;
        }
        let rewritten = rewrite_value(&item.expr, &mut resolver);
        let alias = item
            .alias
            .clone()
            .or_else(|| item.expr.as_column().map(|c| c.name.clone()));
        projected.push(match alias {
            Some(alias) => SelectItem::aliased(rewritten, alias),
            None => SelectItem::new(rewritten),
        });
    }
    Ok(projected)
}

/// Wraps CTE-body select items in casts to their declared types.
fn apply_casts(query: &mut SelectQuery, types: &[Option<String>]) {
    match query {
        SelectQuery::Simple(simple) => {
            for (item, sql_type) in simple.select.items.iter_mut().zip(types) {
                let Some(sql_type) = sql_type else { continue };
                if item.expr.is_cast() {
                    continue;
                }
                let expr = std::mem::replace(&mut item.expr, ValueExpr::null());
                item.expr = ValueExpr::cast(expr, TypeValue::new(sql_type.clone()));
            }
        }
        SelectQuery::Binary(binary) => {
            apply_casts(&mut binary.left, types);
            apply_casts(&mut binary.right, types);
        }
        SelectQuery::Values(_) => {}
    }
}

/// Converts an INSERT into a simulated SELECT.
///
/// # Errors
///
/// See [`TransformError`]; notably `UnknownTable`, `ArityMismatch`,
/// `RequiredColumnMissing`, and `MissingFixture` under the `Error`
/// strategy.
pub fn insert_to_select(
    insert: &InsertQuery,
    options: &SimulationOptions,
) -> Result<SelectQuery, TransformError> {
    let definition = options
        .resolve_table(&insert.target)
        .ok_or_else(|| TransformError::UnknownTable {
            name: insert.target.full_name(),
        })?;

    let effective: Vec<String> = if insert.columns.is_empty() {
        definition.column_names()
    } else {
        insert.columns.clone()
    };
    let metadata = column_metadata(&definition, &effective, &insert.target)?;

    let mut body = match &insert.source {
        InsertSource::Values(rows) => {
            // A VALUES payload becomes a UNION ALL of one-row SELECTs,
            // each item aliased to its target column.
            let mut branches = Vec::with_capacity(rows.len());
            for row in rows {
                if row.len() != effective.len() {
                    return Err(TransformError::ArityMismatch {
                        expected: effective.len(),
                        actual: row.len(),
                    });
                }
                let items = row
                    .iter()
                    .zip(&effective)
                    .map(|(value, column)| SelectItem::aliased(value.clone(), column.clone()))
                    .collect();
                branches.push(SelectQuery::Simple(SimpleSelectQuery::from_items(items)));
            }
            union_all(branches).ok_or_else(|| TransformError::UnsupportedValuesPayload {
                detail: "INSERT VALUES with no rows".to_string(),
            })?
        }
        InsertSource::Select(select) => {
            if let SelectQuery::Simple(simple) = select.as_ref() {
                let countable = simple
                    .select
                    .items
                    .iter()
                    .all(|item| !matches!(item.expr.as_column(), Some(c) if c.is_wildcard()));
                if countable && simple.select.items.len() != effective.len() {
                    return Err(TransformError::ArityMismatch {
                        expected: effective.len(),
                        actual: simple.select.items.len(),
                    });
                }
            }
            select.as_ref().clone()
        }
        InsertSource::DefaultValues => {
            let items = metadata
                .iter()
                .filter(|meta| {
                    effective
                        .iter()
                        .any(|name| name.eq_ignore_ascii_case(&meta.name))
                })
                .map(|meta| {
                    let expr = meta.default.clone().unwrap_or_else(ValueExpr::null);
                    SelectItem::aliased(expr, meta.name.clone())
                })
                .collect();
            SelectQuery::Simple(SimpleSelectQuery::from_items(items))
        }
    };

    if let Some(with) = &insert.with {
        attach_with(&mut body, with.clone())?;
    }

    let types: Vec<Option<String>> = effective
        .iter()
        .map(|column| {
            definition
                .column(column)
                .and_then(|c| c.sql_type.clone())
        })
        .collect();
    apply_casts(&mut body, &types);

    finish_simulation(
        body,
        "__inserted_rows",
        effective,
        &metadata,
        insert.returning.as_deref(),
        options,
    )
}

fn union_all(branches: Vec<SelectQuery>) -> Option<SelectQuery> {
    let mut iter = branches.into_iter();
    let first = iter.next()?;
    Some(iter.fold(first, |left, right| {
        SelectQuery::Binary(crate::ast::BinarySelectQuery {
            comments: Comments::new(),
            left: Box::new(left),
            operator: crate::ast::SetOperator {
                kind: crate::ast::SetOpKind::Union,
                all: true,
            },
            right: Box::new(right),
        })
    }))
}

/// Projection of all definition columns, qualified by the effective
/// source name, with per-column overrides.
fn row_projection(
    definition: &TableDefinition,
    qualifier: &str,
    overrides: &[SetItem],
) -> Vec<SelectItem> {
    definition
        .columns
        .iter()
        .map(|column| {
            let replaced = overrides
                .iter()
                .find(|item| item.column.name.eq_ignore_ascii_case(&column.name))
                .map(|item| item.value.clone());
            let expr = replaced.unwrap_or_else(|| {
                ValueExpr::qualified_column(qualifier, column.name.clone())
            });
            SelectItem::aliased(expr, column.name.clone())
        })
        .collect()
}

fn simulation_metadata(definition: &TableDefinition) -> Vec<ColumnMeta> {
    definition
        .columns
        .iter()
        .map(|column| ColumnMeta {
            name: column.name.clone(),
            provided: true,
            sql_type: column.sql_type.clone(),
            default: None,
        })
        .collect()
}

/// Converts an UPDATE into a simulated SELECT over the matched rows
/// with SET values applied.
///
/// # Errors
///
/// `UnknownTable` when the target has no definition; `MissingFixture`
/// per the strategy.
pub fn update_to_select(
    update: &UpdateQuery,
    options: &SimulationOptions,
) -> Result<SelectQuery, TransformError> {
    let definition = options
        .resolve_table(&update.target)
        .ok_or_else(|| TransformError::UnknownTable {
            name: update.target.full_name(),
        })?;
    let qualifier = update
        .alias
        .as_ref()
        .map_or_else(|| update.target.name.clone(), |a| a.name.clone());

    let items = row_projection(&definition, &qualifier, &update.set);
    let mut body = SimpleSelectQuery::from_items(items);
    body.with = update.with.clone();
    let mut from = FromClause::new(SourceExpression {
        source: TableSource::Table(update.target.clone()),
        alias: update.alias.clone(),
    });
    if let Some(extra) = &update.from {
        from.joins.push(crate::ast::JoinClause {
            join_type: crate::ast::JoinType::Cross,
            natural: false,
            lateral: false,
            source: extra.source.clone(),
            condition: None,
        });
        from.joins.extend(extra.joins.iter().cloned());
    }
    body.from = Some(from);
    body.where_clause = update.where_clause.clone();

    let metadata = simulation_metadata(&definition);
    finish_simulation(
        SelectQuery::Simple(body),
        "__updated_rows",
        definition.column_names(),
        &metadata,
        update.returning.as_deref(),
        options,
    )
}

/// Converts a DELETE into a simulated SELECT over the deleted rows.
///
/// # Errors
///
/// `UnknownTable` when the target has no definition; `MissingFixture`
/// per the strategy.
pub fn delete_to_select(
    delete: &DeleteQuery,
    options: &SimulationOptions,
) -> Result<SelectQuery, TransformError> {
    let definition = options
        .resolve_table(&delete.target)
        .ok_or_else(|| TransformError::UnknownTable {
            name: delete.target.full_name(),
        })?;
    let qualifier = delete
        .alias
        .as_ref()
        .map_or_else(|| delete.target.name.clone(), |a| a.name.clone());

    let items = row_projection(&definition, &qualifier, &[]);
    let mut body = SimpleSelectQuery::from_items(items);
    body.with = delete.with.clone();
    let mut from = FromClause::new(SourceExpression {
        source: TableSource::Table(delete.target.clone()),
        alias: delete.alias.clone(),
    });
    if let Some(using) = &delete.using {
        from.joins.push(crate::ast::JoinClause {
            join_type: crate::ast::JoinType::Cross,
            natural: false,
            lateral: false,
            source: using.source.clone(),
            condition: None,
        });
        from.joins.extend(using.joins.iter().cloned());
    }
    body.from = Some(from);
    body.where_clause = delete.where_clause.clone();

    let metadata = simulation_metadata(&definition);
    finish_simulation(
        SelectQuery::Simple(body),
        "__deleted_rows",
        definition.column_names(),
        &metadata,
        delete.returning.as_deref(),
        options,
    )
}

/// Converts a MERGE into a simulated SELECT: a UNION ALL of one branch
/// per row-producing WHEN clause.
///
/// # Errors
///
/// `UnknownTable` for an unresolved target, `UnsupportedQueryType` when
/// no WHEN clause produces rows, `MissingFixture` per the strategy.
pub fn merge_to_select(
    merge: &MergeQuery,
    options: &SimulationOptions,
) -> Result<SelectQuery, TransformError> {
    let definition = options
        .resolve_table(&merge.target)
        .ok_or_else(|| TransformError::UnknownTable {
            name: merge.target.full_name(),
        })?;
    let target_qualifier = merge
        .alias
        .as_ref()
        .map_or_else(|| merge.target.name.clone(), |a| a.name.clone());

    let mut branches = Vec::new();
    for when in &merge.when_clauses {
        // Insert-like actions resolve every column through the same
        // metadata path as `insert_to_select`: provided values win,
        // otherwise the declared default, otherwise NULL, and a
        // required column that is neither provided nor defaulted is
        // rejected.
        let overrides: Vec<SetItem> = match &when.action {
            MergeAction::Update { set, .. } => set.clone(),
            MergeAction::Delete { .. } => Vec::new(),
            MergeAction::Insert { columns, values } => {
                let effective: Vec<String> = if columns.is_empty() {
                    definition.column_names()
                } else {
                    columns.clone()
                };
                if effective.len() != values.len() {
                    return Err(TransformError::ArityMismatch {
                        expected: effective.len(),
                        actual: values.len(),
                    });
                }
                let metadata = column_metadata(&definition, &effective, &merge.target)?;
                metadata
                    .iter()
                    .map(|meta| {
                        let provided = effective
                            .iter()
                            .position(|name| name.eq_ignore_ascii_case(&meta.name));
                        let value = match provided {
                            Some(i) => values[i].clone(),
                            None => meta.default.clone().unwrap_or_else(ValueExpr::null),
                        };
                        SetItem {
                            column: QualifiedName::new(meta.name.clone()),
                            value,
                        }
                    })
                    .collect()
            }
            MergeAction::InsertDefaultValues => {
                let effective = definition.column_names();
                let metadata = column_metadata(&definition, &effective, &merge.target)?;
                metadata
                    .iter()
                    .map(|meta| SetItem {
                        column: QualifiedName::new(meta.name.clone()),
                        value: meta.default.clone().unwrap_or_else(ValueExpr::null),
                    })
                    .collect()
            }
            MergeAction::DoNothing => continue,
        };

        // Insert-like overrides cover every column, so the fallback
        // only fires for UPDATE/DELETE arms.
        let items: Vec<SelectItem> = definition
            .columns
            .iter()
            .map(|column| {
                let replaced = overrides
                    .iter()
                    .find(|item| item.column.name.eq_ignore_ascii_case(&column.name))
                    .map(|item| item.value.clone());
                let expr = replaced.unwrap_or_else(|| {
                    ValueExpr::qualified_column(
                        target_qualifier.clone(),
                        column.name.clone(),
                    )
                });
                SelectItem::aliased(expr, column.name.clone())
            })
            .collect();

        let mut branch = SimpleSelectQuery::from_items(items);
        let target_source = SourceExpression {
            source: TableSource::Table(merge.target.clone()),
            alias: merge.alias.clone(),
        };
        let mut predicate: Option<ValueExpr> = None;
        let mut push_predicate = |existing: &mut Option<ValueExpr>, next: ValueExpr| {
            *existing = Some(match existing.take() {
                Some(left) => ValueExpr::and(left, next),
                None => next,
            });
        };
        match when.match_kind {
            MergeMatchKind::Matched => {
                let mut from = FromClause::new(target_source);
                from.joins.push(crate::ast::JoinClause {
                    join_type: crate::ast::JoinType::Inner,
                    natural: false,
                    lateral: false,
                    source: merge.source.clone(),
                    condition: Some(JoinCondition::On(merge.on.clone())),
                });
                branch.from = Some(from);
            }
            MergeMatchKind::NotMatchedByTarget => {
                branch.from = Some(FromClause::new(merge.source.clone()));
                push_predicate(&mut predicate, not_exists_over(&target_source, &merge.on));
            }
            MergeMatchKind::NotMatchedBySource => {
                branch.from = Some(FromClause::new(target_source));
                push_predicate(&mut predicate, not_exists_over(&merge.source, &merge.on));
            }
        }
        if let Some(condition) = &when.condition {
            push_predicate(&mut predicate, condition.clone());
        }
        if let MergeAction::Update {
            where_clause: Some(extra),
            ..
        }
        | MergeAction::Delete {
            where_clause: Some(extra),
        } = &when.action
        {
            push_predicate(&mut predicate, extra.clone());
        }
        branch.where_clause = predicate.map(WhereClause::new);
        branches.push(SelectQuery::Simple(branch));
    }

    let mut body = union_all(branches).ok_or_else(|| TransformError::UnsupportedQueryType {
        detail: "MERGE with no row-producing WHEN clause".to_string(),
    })?;
    if let Some(with) = &merge.with {
        attach_with(&mut body, with.clone())?;
    }

    let metadata = simulation_metadata(&definition);
    finish_simulation(
        body,
        "__merged_rows",
        definition.column_names(),
        &metadata,
        merge.returning.as_deref(),
        options,
    )
}

/// `NOT EXISTS (SELECT 1 FROM source WHERE on)`.
fn not_exists_over(source: &SourceExpression, on: &ValueExpr) -> ValueExpr {
    let mut inner = SimpleSelectQuery::from_items(vec![SelectItem::new(ValueExpr::number("1"))]);
    inner.from = Some(FromClause::new(source.clone()));
    inner.where_clause = Some(WhereClause::new(on.clone()));
    ValueExpr::Unary(crate::ast::UnaryExpression {
        operator: "not exists".to_string(),
        expr: Box::new(ValueExpr::InlineQuery(Box::new(SelectQuery::Simple(inner)))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_insert, parse_update};

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
    fn test_insert_returning_star() {
        let insert =
            parse_insert("INSERT INTO users (id, email) VALUES (1, 'a@x') RETURNING *").unwrap();
        let simulated = insert_to_select(&insert, &options()).unwrap();
        let sql = simulated.to_string();
        assert!(sql.contains("with __inserted_rows(id, email) as"));
        assert!(sql.contains("cast(1 as int) as id"));
        assert!(sql.contains("__inserted_rows.id as id"));
        assert!(sql.contains("__inserted_rows.email as email"));
        assert!(sql.contains("true as active"));
        assert!(sql.ends_with("from __inserted_rows"));
    }

    #[test]
    fn test_insert_without_returning_counts() {
        let insert = parse_insert("INSERT INTO users (id, email) VALUES (1, 'a@x')").unwrap();
        let simulated = insert_to_select(&insert, &options()).unwrap();
        let sql = simulated.to_string();
        assert!(sql.contains("select count(*) as count from __inserted_rows"));
    }

    #[test]
    fn test_insert_unknown_table() {
        let insert = parse_insert("INSERT INTO ghosts (id) VALUES (1)").unwrap();
        let err = insert_to_select(&insert, &options()).unwrap_err();
        assert!(matches!(err, TransformError::UnknownTable { .. }));
    }

    #[test]
    fn test_insert_required_column_missing() {
        let insert = parse_insert("INSERT INTO users (id) VALUES (1)").unwrap();
        let err = insert_to_select(&insert, &options()).unwrap_err();
        assert!(
            matches!(err, TransformError::RequiredColumnMissing { column, .. } if column == "email")
        );
    }

    #[test]
    fn test_insert_arity_mismatch() {
        let insert = parse_insert("INSERT INTO users (id, email) VALUES (1)").unwrap();
        let err = insert_to_select(&insert, &options()).unwrap_err();
        assert!(matches!(
            err,
            TransformError::ArityMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_insert_select_missing_fixture_errors() {
        let insert = parse_insert("INSERT INTO users (id, email) SELECT id, email FROM staged")
            .unwrap();
        let err = insert_to_select(&insert, &options()).unwrap_err();
        assert!(matches!(err, TransformError::MissingFixture { table } if table == "staged"));
    }

    #[test]
    fn test_insert_select_with_fixture_shadows() {
        let insert = parse_insert("INSERT INTO users (id, email) SELECT id, email FROM staged")
            .unwrap();
        let mut opts = options();
        opts.fixture_tables.push(FixtureTable {
            name: "staged".into(),
            columns: vec!["id".into(), "email".into()],
            rows: vec![vec!["1".into(), "'a@x'".into()]],
        });
        let simulated = insert_to_select(&insert, &opts).unwrap();
        let sql = simulated.to_string();
        assert!(sql.contains("with staged(id, email) as"));
        assert!(sql.contains("__inserted_rows(id, email)"));
    }

    #[test]
    fn test_insert_passthrough_strategy() {
        let insert = parse_insert("INSERT INTO users (id, email) SELECT id, email FROM staged")
            .unwrap();
        let mut opts = options();
        opts.missing_fixture_strategy = MissingFixtureStrategy::Passthrough;
        assert!(insert_to_select(&insert, &opts).is_ok());
    }

    #[test]
    fn test_cte_name_collision_gets_suffix() {
        let insert = parse_insert(
            "WITH __inserted_rows AS (SELECT 1 AS id) \
             INSERT INTO users (id, email) SELECT id, 'a@x' FROM __inserted_rows",
        )
        .unwrap();
        let mut opts = options();
        opts.missing_fixture_strategy = MissingFixtureStrategy::Passthrough;
        let simulated = insert_to_select(&insert, &opts).unwrap();
        let sql = simulated.to_string();
        assert!(sql.contains("__inserted_rows_1(id, email)"));
        assert!(sql.ends_with("from __inserted_rows_1"));
    }

    #[test]
    fn test_update_to_select_applies_set() {
        let update =
            parse_update("UPDATE users SET email = 'new@x' WHERE id = 1 RETURNING id, email")
                .unwrap();
        let mut opts = options();
        opts.missing_fixture_strategy = MissingFixtureStrategy::Passthrough;
        let simulated = update_to_select(&update, &opts).unwrap();
        let sql = simulated.to_string();
        assert!(sql.contains("with __updated_rows(id, email, active) as"));
        assert!(sql.contains("'new@x' as email"));
        assert!(sql.contains("where id = 1"));
        assert!(sql.contains("select __updated_rows.id as id, __updated_rows.email as email"));
    }
}
