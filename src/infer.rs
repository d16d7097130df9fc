//! Parameter type inference.
//!
//! A parameter's type is resolved through an ordered chain; the first step
//! that produces a type wins:
//!
//! 1. **Exact match**: a column with the same name in one of the referenced
//!    tables
//! 2. **SQL context**: the column the parameter is compared with, assigned to
//!    or inserted into
//! 3. **Name heuristic**: naming conventions such as `*_id` or `is_*`
//! 4. **Default**: the type mapping's `DEFAULT` entry
//!
//! Inference never fails. Every SQL type found along the way is mapped
//! through the catalog's [`TypeMapping`](crate::schema::TypeMapping).
//!
//! # Example
//!
//! ```
//! use sql_template_analyzer::{
//!     dialect::SqlDialect,
//!     infer::{BindingSource, NameHeuristics, ParameterTypeInferrer},
//!     query::Statement,
//!     schema::{SchemaCatalog, TypeMapping}
//! };
//!
//! let catalog = SchemaCatalog::load(
//!     &["CREATE TABLE products (id INTEGER, price DECIMAL(10, 2))"],
//!     TypeMapping::default(),
//!     SqlDialect::Generic
//! )
//! .unwrap();
//! let heuristics = NameHeuristics::default();
//! let inferrer = ParameterTypeInferrer::new(&catalog, &heuristics);
//!
//! let statement = Statement::parse(
//!     "SELECT * FROM products WHERE id = :id AND price > :min_price",
//!     SqlDialect::Generic
//! )
//! .unwrap();
//!
//! let id = inferrer.infer(&statement, "id");
//! assert_eq!(id.inferred_type, "int");
//! assert_eq!(id.source, BindingSource::ExactMatch);
//!
//! assert_eq!(inferrer.infer(&statement, "min_price").inferred_type, "float");
//! ```

mod context;
mod heuristics;

pub use context::{ColumnRef, context_columns};
pub use heuristics::{HeuristicConfig, HeuristicRule, NameHeuristics};
use serde::Serialize;
use tracing::trace;

use crate::{dialect::SqlDialect, query::Statement, schema::SchemaCatalog};

/// Which step of the chain produced a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingSource {
    ExactMatch,
    SqlContext,
    NameHeuristic,
    Default
}

/// Inferred type of one parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterBinding {
    pub name:          String,
    pub inferred_type: String,
    pub source:        BindingSource
}

/// Resolves parameter types against a read-only catalog
#[derive(Debug, Clone, Copy)]
pub struct ParameterTypeInferrer<'a> {
    catalog:    &'a SchemaCatalog,
    heuristics: &'a NameHeuristics
}

impl<'a> ParameterTypeInferrer<'a> {
    pub fn new(catalog: &'a SchemaCatalog, heuristics: &'a NameHeuristics) -> Self {
        Self {
            catalog,
            heuristics
        }
    }

    /// Infer the type of `parameter` as used in `statement`
    pub fn infer(&self, statement: &Statement, parameter: &str) -> ParameterBinding {
        let (inferred_type, source) = self
            .exact_match(statement, parameter)
            .map(|t| (t, BindingSource::ExactMatch))
            .or_else(|| {
                self.context_match(statement, parameter)
                    .map(|t| (t, BindingSource::SqlContext))
            })
            .or_else(|| {
                self.heuristics
                    .resolve(parameter)
                    .map(|t| (t, BindingSource::NameHeuristic))
            })
            .map(|(sql_type, source)| (self.catalog.target_type(sql_type), source))
            .unwrap_or((self.catalog.default_type(), BindingSource::Default));
        trace!(parameter, inferred_type, ?source, "inferred parameter type");
        ParameterBinding {
            name: parameter.to_owned(),
            inferred_type: inferred_type.to_owned(),
            source
        }
    }

    fn exact_match(&self, statement: &Statement, parameter: &str) -> Option<&'a str> {
        statement
            .tables
            .iter()
            .find_map(|table| self.catalog.column_type(table, parameter))
    }

    fn context_match(&self, statement: &Statement, parameter: &str) -> Option<&'a str> {
        context_columns(statement, parameter)
            .iter()
            .find_map(|column| self.resolve_column(statement, column))
    }

    /// SQL type of a context column. A qualifier naming a referenced table
    /// is tried first; aliases fall back to every referenced table in order.
    fn resolve_column(&self, statement: &Statement, column: &ColumnRef) -> Option<&'a str> {
        let preferred = column
            .qualifier
            .as_ref()
            .filter(|q| statement.tables.contains(q))
            .and_then(|table| self.catalog.column_type(table, &column.column));
        preferred.or_else(|| {
            statement
                .tables
                .iter()
                .find_map(|table| self.catalog.column_type(table, &column.column))
        })
    }
}

/// Target type of `parameter` in `sql`.
///
/// Uses the built-in name heuristics. An empty statement resolves to the
/// default type.
pub fn infer_parameter_type(
    sql: &str,
    parameter: &str,
    catalog: &SchemaCatalog,
    dialect: SqlDialect
) -> String {
    let heuristics = NameHeuristics::default();
    let inferrer = ParameterTypeInferrer::new(catalog, &heuristics);
    match Statement::parse(sql, dialect) {
        Ok(statement) => inferrer.infer(&statement, parameter).inferred_type,
        Err(_) => heuristics
            .resolve(parameter)
            .map_or(catalog.default_type(), |t| catalog.target_type(t))
            .to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TypeMapping;

    fn catalog() -> SchemaCatalog {
        SchemaCatalog::load(
            &[
                "CREATE TABLE users (id INTEGER, status VARCHAR(20), email TEXT, active BOOLEAN)",
                "CREATE TABLE orders (id BIGINT, user_id INTEGER, total DECIMAL(12, 2), status INTEGER)"
            ],
            TypeMapping::default(),
            SqlDialect::Generic
        )
        .unwrap()
    }

    fn infer(sql: &str, parameter: &str) -> ParameterBinding {
        let catalog = catalog();
        let heuristics = NameHeuristics::default();
        let statement = Statement::parse(sql, SqlDialect::Generic).unwrap();
        ParameterTypeInferrer::new(&catalog, &heuristics).infer(&statement, parameter)
    }

    #[test]
    fn test_exact_match_uses_first_table() {
        let binding = infer("SELECT * FROM orders o JOIN users u ON u.id = o.user_id WHERE status = :status", "status");
        assert_eq!(binding.source, BindingSource::ExactMatch);
        assert_eq!(binding.inferred_type, "int");
    }

    #[test]
    fn test_exact_match_case_insensitive() {
        let binding = infer("SELECT * FROM users WHERE email = :EMAIL", "EMAIL");
        assert_eq!(binding.source, BindingSource::ExactMatch);
        assert_eq!(binding.inferred_type, "str");
    }

    #[test]
    fn test_context_match_prefers_qualified_table() {
        let binding = infer(
            "SELECT * FROM orders o JOIN users ON users.id = o.user_id WHERE users.status = :wanted",
            "wanted"
        );
        assert_eq!(binding.source, BindingSource::SqlContext);
        assert_eq!(binding.inferred_type, "str");
    }

    #[test]
    fn test_context_match_insert_values() {
        let binding = infer("INSERT INTO users (email, active) VALUES (:address, :on)", "on");
        assert_eq!(binding.source, BindingSource::SqlContext);
        assert_eq!(binding.inferred_type, "bool");
    }

    #[test]
    fn test_heuristic_without_tables() {
        let binding = infer("SELECT 1 AS value WHERE 1 = :item_count", "item_count");
        assert_eq!(binding.source, BindingSource::NameHeuristic);
        assert_eq!(binding.inferred_type, "int");
    }

    #[test]
    fn test_default() {
        let binding = infer("SELECT * FROM users WHERE :payload IS NOT NULL", "payload");
        assert_eq!(binding.source, BindingSource::Default);
        assert_eq!(binding.inferred_type, "Any");
    }

    #[test]
    fn test_free_function_never_fails() {
        let catalog = catalog();
        assert_eq!(infer_parameter_type("", "user_id", &catalog, SqlDialect::Generic), "int");
        assert_eq!(infer_parameter_type("  ", "blob", &catalog, SqlDialect::Generic), "Any");
    }
}
