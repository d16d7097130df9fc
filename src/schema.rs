//! Schema catalog built from `CREATE TABLE` statements.
//!
//! The catalog maps lower-cased table names to their ordered column
//! definitions and owns the [`TypeMapping`] that turns SQL types into target
//! types. It is built once and never mutated afterwards; share it by
//! reference between analysis calls and threads.
//!
//! # Supported Statements
//!
//! - `CREATE [OR REPLACE] [TEMP|TEMPORARY|...] TABLE [IF NOT EXISTS] name (...)`
//! - Names quoted with `"`, `` ` `` or `[]`, optionally schema-qualified
//! - Inline and table-level primary keys, `NOT NULL`
//!
//! # Example
//!
//! ```
//! use sql_template_analyzer::{
//!     dialect::SqlDialect,
//!     schema::{SchemaCatalog, TypeMapping}
//! };
//!
//! let sql = r#"
//!     CREATE TABLE users (
//!         id INT PRIMARY KEY,
//!         email VARCHAR(255) NOT NULL
//!     );
//!     CREATE INDEX idx_email ON users(email);
//! "#;
//!
//! let catalog = SchemaCatalog::parse(sql, TypeMapping::default(), SqlDialect::Generic).unwrap();
//!
//! assert_eq!(catalog.column_type("USERS", "Email"), Some("VARCHAR"));
//! assert_eq!(catalog.target_type("VARCHAR"), "str");
//! assert_eq!(catalog.target_type("no such type"), "Any");
//!
//! let summary = catalog.to_summary();
//! assert!(summary.contains("users"));
//! ```

mod mapping;
mod parse;
mod types;

use std::collections::BTreeMap;

use compact_str::CompactString;
pub use mapping::{DEFAULT_KEY, FALLBACK_TARGET, TypeMapping};
pub use parse::{is_create_table, parse_create_table};
use tracing::{debug, warn};
pub use types::{ColumnDefinition, TableSchema, normalize_sql_type};

use crate::{
    dialect::SqlDialect,
    error::{AnalysisError, excerpt},
    token::{split_statements, tokenize}
};

/// Immutable table catalog plus SQL-type mapping.
///
/// Tables are stored in a `BTreeMap` for deterministic iteration order.
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    tables:  BTreeMap<CompactString, TableSchema>,
    mapping: TypeMapping
}

impl SchemaCatalog {
    /// Catalog without tables. Every exact or context match misses, so
    /// inference relies on name heuristics.
    pub fn empty(mapping: TypeMapping) -> Self {
        Self {
            tables: BTreeMap::new(),
            mapping
        }
    }

    /// Build a catalog from individual `CREATE TABLE` statements
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Schema`] for the first statement that is not
    /// a `CREATE TABLE` with at least one column.
    pub fn load<S: AsRef<str>>(
        statements: &[S],
        mapping: TypeMapping,
        dialect: SqlDialect
    ) -> Result<Self, AnalysisError> {
        let mut builder = CatalogBuilder::new(dialect);
        for statement in statements {
            builder.add_statement(statement.as_ref())?;
        }
        Ok(builder.build(mapping))
    }

    /// Build a catalog from a schema script. Statements other than
    /// `CREATE TABLE` (indexes, views, comments) are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Schema`] for a malformed `CREATE TABLE`.
    pub fn parse(
        script: &str,
        mapping: TypeMapping,
        dialect: SqlDialect
    ) -> Result<Self, AnalysisError> {
        let mut builder = CatalogBuilder::new(dialect);
        builder.add_script(script)?;
        Ok(builder.build(mapping))
    }

    /// Case-insensitive table lookup
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name.to_lowercase().as_str())
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableSchema> {
        self.tables.values()
    }

    /// Normalized SQL type of `table.column`, both case-insensitive
    pub fn column_type(&self, table: &str, column: &str) -> Option<&str> {
        self.table(table)?
            .column(column)
            .map(|c| c.sql_type.as_str())
    }

    /// Target type for a SQL type; the mapping's `DEFAULT` when unknown
    pub fn target_type(&self, sql_type: &str) -> &str {
        self.mapping.target_type(sql_type)
    }

    pub fn default_type(&self) -> &str {
        self.mapping.default_type()
    }

    pub fn mapping(&self) -> &TypeMapping {
        &self.mapping
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Human-readable listing of tables and columns with their target types
    pub fn to_summary(&self) -> String {
        let mut summary = String::from("Database Schema:\n\n");
        for table in self.tables.values() {
            match &table.qualifier {
                Some(qualifier) => {
                    summary.push_str(&format!("Table: {}.{}\n", qualifier, table.table_name))
                }
                None => summary.push_str(&format!("Table: {}\n", table.table_name))
            }
            summary.push_str("Columns:\n");
            for col in table.columns.values() {
                let nullable = if col.is_nullable { "NULL" } else { "NOT NULL" };
                let primary = if col.is_primary { " PRIMARY KEY" } else { "" };
                summary.push_str(&format!(
                    "  - {name} {sql_type} {nullable}{primary} -> {target}\n",
                    name = col.name,
                    sql_type = col.sql_type,
                    nullable = nullable,
                    primary = primary,
                    target = self.target_type(&col.sql_type)
                ));
            }
            summary.push('\n');
        }
        summary
    }
}

/// Accumulates tables from several schema sources before freezing them into
/// a [`SchemaCatalog`].
///
/// A table defined twice keeps the later definition.
#[derive(Debug)]
pub struct CatalogBuilder {
    dialect: SqlDialect,
    tables:  BTreeMap<CompactString, TableSchema>
}

impl CatalogBuilder {
    pub fn new(dialect: SqlDialect) -> Self {
        Self {
            dialect,
            tables: BTreeMap::new()
        }
    }

    /// Add one `CREATE TABLE` statement
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Schema`] when the statement is not a valid
    /// `CREATE TABLE`.
    pub fn add_statement(&mut self, sql: &str) -> Result<&mut Self, AnalysisError> {
        let stream = tokenize(sql, self.dialect)
            .map_err(|e| AnalysisError::schema(None, e.to_string(), sql))?;
        let table = parse_create_table(&stream)?;
        self.insert(table);
        Ok(self)
    }

    /// Add every `CREATE TABLE` of a `;`-separated script
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Schema`] for a malformed `CREATE TABLE`.
    pub fn add_script(&mut self, script: &str) -> Result<&mut Self, AnalysisError> {
        for statement in split_statements(script, self.dialect) {
            let Ok(stream) = tokenize(&statement, self.dialect) else {
                continue;
            };
            if !is_create_table(&stream) {
                debug!(statement = %excerpt(&statement), "skipping non-table schema statement");
                continue;
            }
            let table = parse_create_table(&stream)?;
            self.insert(table);
        }
        Ok(self)
    }

    fn insert(&mut self, table: TableSchema) {
        debug!(table = %table.table_name, columns = table.columns.len(), "loaded table");
        if let Some(previous) = self.tables.insert(table.table_name.clone(), table) {
            warn!(table = %previous.table_name, "table defined more than once, keeping the later definition");
        }
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn build(self, mapping: TypeMapping) -> SchemaCatalog {
        SchemaCatalog {
            tables: self.tables,
            mapping
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_other_statements() {
        let catalog = SchemaCatalog::parse(
            "CREATE TABLE a (id INT); CREATE INDEX i ON a (id); -- trailing\nCREATE VIEW v AS SELECT 1;",
            TypeMapping::default(),
            SqlDialect::Generic
        )
        .unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.table("A").is_some());
    }

    #[test]
    fn test_load_rejects_non_table_statement() {
        let err = SchemaCatalog::load(
            &["CREATE TABLE a (id INT)", "CREATE INDEX i ON a (id)"],
            TypeMapping::default(),
            SqlDialect::Generic
        )
        .unwrap_err();
        assert!(err.is_schema());
    }

    #[test]
    fn test_later_definition_wins() {
        let catalog = SchemaCatalog::load(
            &["CREATE TABLE a (id INT)", "CREATE TABLE A (id TEXT, name TEXT)"],
            TypeMapping::default(),
            SqlDialect::Generic
        )
        .unwrap();
        assert_eq!(catalog.column_type("a", "id"), Some("TEXT"));
        assert_eq!(catalog.table("a").map(|t| t.columns.len()), Some(2));
    }

    #[test]
    fn test_unknown_lookups() {
        let catalog = SchemaCatalog::empty(TypeMapping::default());
        assert!(catalog.is_empty());
        assert_eq!(catalog.column_type("missing", "id"), None);
        assert_eq!(catalog.target_type("!!"), catalog.default_type());
    }

    #[test]
    fn test_summary_lists_target_types() {
        let catalog = SchemaCatalog::load(
            &["CREATE TABLE s.items (id INTEGER NOT NULL, price DECIMAL(10,2))"],
            TypeMapping::default(),
            SqlDialect::Generic
        )
        .unwrap();
        let summary = catalog.to_summary();
        assert!(summary.contains("Table: s.items"));
        assert!(summary.contains("id INTEGER NOT NULL -> int"));
        assert!(summary.contains("price DECIMAL NULL -> float"));
    }
}
