//! CTE management: add, remove, replace, and query operations.
//!
//! These operations mutate the query in place. Validation happens
//! before any mutation, so a failed call leaves the input untouched.

use crate::ast::{CommonTable, CteBody, SelectQuery, SimpleSelectQuery, TableAlias, WithClause};

use super::error::TransformError;

/// Options for `add_cte`/`replace_cte`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CteOptions {
    /// `Some(true)` emits MATERIALIZED, `Some(false)` NOT MATERIALIZED,
    /// `None` leaves the hint out.
    pub materialized: Option<bool>,
}

fn validate_name(name: &str) -> Result<String, TransformError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TransformError::InvalidCteName {
            name: name.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

impl SimpleSelectQuery {
    /// Appends a CTE definition at the end of the WITH clause.
    ///
    /// # Errors
    ///
    /// [`TransformError::InvalidCteName`] for empty names,
    /// [`TransformError::DuplicateCte`] when the name is taken.
    pub fn add_cte(
        &mut self,
        name: &str,
        query: SelectQuery,
        options: CteOptions,
    ) -> Result<(), TransformError> {
        let name = validate_name(name)?;
        if self.has_cte(&name) {
            return Err(TransformError::DuplicateCte { name });
        }
        let cte = CommonTable {
            comments: crate::ast::Comments::new(),
            alias: TableAlias::new(name),
            materialized: options.materialized,
            body: CteBody::Select(Box::new(query)),
        };
        self.with
            .get_or_insert_with(WithClause::default)
            .tables
            .push(cte);
        Ok(())
    }

    /// Removes the named CTE. An emptied WITH clause is dropped.
    ///
    /// # Errors
    ///
    /// [`TransformError::CteNotFound`] for unknown names.
    pub fn remove_cte(&mut self, name: &str) -> Result<(), TransformError> {
        let name = validate_name(name)?;
        let Some(with) = &mut self.with else {
            return Err(TransformError::CteNotFound { name });
        };
        let Some(index) = with
            .tables
            .iter()
            .position(|cte| cte.name().eq_ignore_ascii_case(&name))
        else {
            return Err(TransformError::CteNotFound { name });
        };
        with.tables.remove(index);
        if with.tables.is_empty() {
            self.with = None;
        }
        Ok(())
    }

    /// Replaces the named CTE's body and options, keeping its position.
    ///
    /// # Errors
    ///
    /// [`TransformError::CteNotFound`] for unknown names.
    pub fn replace_cte(
        &mut self,
        name: &str,
        query: SelectQuery,
        options: CteOptions,
    ) -> Result<(), TransformError> {
        let name = validate_name(name)?;
        let Some(with) = &mut self.with else {
            return Err(TransformError::CteNotFound { name });
        };
        let Some(cte) = with
            .tables
            .iter_mut()
            .find(|cte| cte.name().eq_ignore_ascii_case(&name))
        else {
            return Err(TransformError::CteNotFound { name });
        };
        cte.materialized = options.materialized;
        cte.body = CteBody::Select(Box::new(query));
        Ok(())
    }

    /// Returns true when a CTE with the given name exists
    /// (case-insensitive, trimmed).
    #[must_use]
    pub fn has_cte(&self, name: &str) -> bool {
        let trimmed = name.trim();
        self.with.as_ref().is_some_and(|with| {
            with.tables
                .iter()
                .any(|cte| cte.name().eq_ignore_ascii_case(trimmed))
        })
    }

    /// CTE names in definition order.
    #[must_use]
    pub fn get_cte_names(&self) -> Vec<String> {
        self.with
            .as_ref()
            .map(|with| with.tables.iter().map(|cte| cte.name().to_string()).collect())
            .unwrap_or_default()
    }
}

impl SelectQuery {
    fn ensure_simple(&mut self) -> Result<&mut SimpleSelectQuery, TransformError> {
        if !matches!(self, Self::Simple(_)) {
            let owned = std::mem::replace(
                self,
                Self::Simple(SimpleSelectQuery::default()),
            );
            *self = Self::Simple(owned.to_simple()?);
        }
        match self {
            Self::Simple(simple) => Ok(simple),
            _ => unreachable!("just converted to the simple variant"),
        }
    }

    /// Appends a CTE, converting Binary/Values queries to a simple
    /// query first.
    ///
    /// # Errors
    ///
    /// Propagates conversion errors plus the `add_cte` failures.
    pub fn add_cte(
        &mut self,
        name: &str,
        query: SelectQuery,
        options: CteOptions,
    ) -> Result<(), TransformError> {
        // Validate before the conversion so a bad name leaves a
        // Binary/Values query untouched.
        let trimmed = validate_name(name)?;
        self.ensure_simple()?.add_cte(&trimmed, query, options)
    }

    /// Removes a CTE; see [`SimpleSelectQuery::remove_cte`].
    ///
    /// # Errors
    ///
    /// [`TransformError::CteNotFound`] for unknown names.
    pub fn remove_cte(&mut self, name: &str) -> Result<(), TransformError> {
        match self {
            Self::Simple(simple) => simple.remove_cte(name),
            _ => Err(TransformError::CteNotFound {
                name: name.trim().to_string(),
            }),
        }
    }

    /// Replaces a CTE; see [`SimpleSelectQuery::replace_cte`].
    ///
    /// # Errors
    ///
    /// [`TransformError::CteNotFound`] for unknown names.
    pub fn replace_cte(
        &mut self,
        name: &str,
        query: SelectQuery,
        options: CteOptions,
    ) -> Result<(), TransformError> {
        match self {
            Self::Simple(simple) => simple.replace_cte(name, query, options),
            _ => Err(TransformError::CteNotFound {
                name: name.trim().to_string(),
            }),
        }
    }

    /// Returns true when the named CTE exists.
    #[must_use]
    pub fn has_cte(&self, name: &str) -> bool {
        match self {
            Self::Simple(simple) => simple.has_cte(name),
            _ => false,
        }
    }

    /// CTE names in definition order; empty for Binary/Values queries.
    #[must_use]
    pub fn get_cte_names(&self) -> Vec<String> {
        match self {
            Self::Simple(simple) => simple.get_cte_names(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_select;

    fn cte_body(sql: &str) -> SelectQuery {
        parse_select(sql).unwrap()
    }

    #[test]
    fn test_add_and_query() {
        let mut query = parse_select("SELECT * FROM t").unwrap();
        query
            .add_cte("c", cte_body("SELECT 1 AS one"), CteOptions::default())
            .unwrap();
        assert!(query.has_cte("c"));
        assert_eq!(query.get_cte_names(), vec!["c".to_string()]);
    }

    #[test]
    fn test_add_duplicate_fails() {
        let mut query = parse_select("WITH c AS (SELECT 1) SELECT * FROM c").unwrap();
        let err = query
            .add_cte("C", cte_body("SELECT 2"), CteOptions::default())
            .unwrap_err();
        assert!(matches!(err, TransformError::DuplicateCte { name } if name == "C"));
    }

    #[test]
    fn test_add_empty_name_fails() {
        let mut query = parse_select("SELECT 1").unwrap();
        let err = query
            .add_cte("   ", cte_body("SELECT 2"), CteOptions::default())
            .unwrap_err();
        assert!(matches!(err, TransformError::InvalidCteName { .. }));
    }

    #[test]
    fn test_remove_unknown_fails() {
        let mut query = parse_select("SELECT 1").unwrap();
        let err = query.remove_cte("missing").unwrap_err();
        assert!(matches!(err, TransformError::CteNotFound { .. }));
    }

    #[test]
    fn test_remove_drops_empty_with() {
        let mut query = parse_select("WITH c AS (SELECT 1) SELECT * FROM c").unwrap();
        query.remove_cte("c").unwrap();
        assert!(query.with_clause().is_none());
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut query =
            parse_select("WITH a AS (SELECT 1), b AS (SELECT 2) SELECT * FROM a").unwrap();
        query
            .replace_cte(
                "a",
                cte_body("SELECT 3"),
                CteOptions {
                    materialized: Some(true),
                },
            )
            .unwrap();
        assert_eq!(query.get_cte_names(), vec!["a".to_string(), "b".into()]);
        let rendered = query.to_string();
        assert!(rendered.contains("a as materialized (select 3)"));
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut query = parse_select("SELECT 1").unwrap();
        for name in ["x", "y", "z"] {
            query
                .add_cte(name, cte_body("SELECT 1"), CteOptions::default())
                .unwrap();
        }
        assert_eq!(
            query.get_cte_names(),
            vec!["x".to_string(), "y".into(), "z".into()]
        );
    }

    #[test]
    fn test_add_cte_on_binary_converts() {
        let mut query = parse_select("SELECT 1 UNION SELECT 2").unwrap();
        query
            .add_cte("c", cte_body("SELECT 3"), CteOptions::default())
            .unwrap();
        assert!(query.has_cte("c"));
        assert!(query.to_string().contains("from (select 1 union select 2) as bq"));
    }
}
