//! Per-method analysis: tokenize once, classify, infer every parameter.
//!
//! # Example
//!
//! ```
//! use sql_template_analyzer::{
//!     analyzer::TemplateAnalyzer,
//!     query::ExecutionKind,
//!     schema::{SchemaCatalog, TypeMapping}
//! };
//!
//! let catalog = SchemaCatalog::parse(
//!     "CREATE TABLE county (id VARCHAR(36), state_alias VARCHAR(128));",
//!     TypeMapping::default(),
//!     Default::default()
//! )
//! .unwrap();
//! let analyzer = TemplateAnalyzer::new(&catalog);
//!
//! let method = analyzer
//!     .analyze(
//!         "by_state",
//!         "SELECT * FROM county WHERE state_alias = :state_alias",
//!         &["state_alias"]
//!     )
//!     .unwrap();
//!
//! assert_eq!(method.execution_kind, ExecutionKind::RowReturning);
//! assert_eq!(method.parameters[0].inferred_type, "str");
//! ```

use std::path::Path;

use indexmap::IndexSet;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    cache::{DEFAULT_CACHE_SIZE, InferenceCache},
    dialect::SqlDialect,
    error::AnalysisError,
    infer::{NameHeuristics, ParameterBinding, ParameterTypeInferrer},
    query::{ExecutionKind, Statement, StatementKind},
    schema::SchemaCatalog,
    template::{SqlBlock, TemplateFile}
};

/// Statements larger than this many bytes are logged as oversize
pub const DEFAULT_LARGE_STATEMENT_BYTES: usize = 64 * 1024;

/// Analysis result for one SQL block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodDescriptor {
    pub name:           String,
    pub execution_kind: ExecutionKind,
    pub statement_kind: StatementKind,
    pub has_returning:  bool,
    pub sql_text:       String,
    /// One binding per distinct parameter, in input order
    pub parameters:     Vec<ParameterBinding>
}

/// Analysis result for a whole template file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateDescriptor {
    pub class_name: String,
    /// Path of the template the descriptor was built from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source:     Option<String>,
    pub methods:    Vec<MethodDescriptor>
}

/// Orchestrates classification and type inference over a shared catalog.
///
/// The analyzer is `Sync`: one instance can serve parallel workers, sharing
/// its inference cache.
#[derive(Debug)]
pub struct TemplateAnalyzer<'c> {
    catalog:               &'c SchemaCatalog,
    heuristics:            NameHeuristics,
    dialect:               SqlDialect,
    large_statement_bytes: usize,
    cache:                 InferenceCache
}

impl<'c> TemplateAnalyzer<'c> {
    pub fn new(catalog: &'c SchemaCatalog) -> Self {
        Self {
            catalog,
            heuristics: NameHeuristics::default(),
            dialect: SqlDialect::default(),
            large_statement_bytes: DEFAULT_LARGE_STATEMENT_BYTES,
            cache: InferenceCache::new(DEFAULT_CACHE_SIZE)
        }
    }

    pub fn with_dialect(mut self, dialect: SqlDialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_heuristics(mut self, heuristics: NameHeuristics) -> Self {
        self.heuristics = heuristics;
        self
    }

    pub fn with_large_statement_bytes(mut self, bytes: usize) -> Self {
        self.large_statement_bytes = bytes;
        self
    }

    /// Replace the inference cache with one of `size` entries; 0 disables it
    pub fn with_cache_size(mut self, size: usize) -> Self {
        self.cache = InferenceCache::new(size);
        self
    }

    pub fn catalog(&self) -> &SchemaCatalog {
        self.catalog
    }

    pub fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    pub fn cache(&self) -> &InferenceCache {
        &self.cache
    }

    /// Analyze one statement.
    ///
    /// Repeated names in `parameter_names` produce a single binding at the
    /// position of their first occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Parse`] when `sql` is empty.
    pub fn analyze<S: AsRef<str>>(
        &self,
        method_name: &str,
        sql: &str,
        parameter_names: &[S]
    ) -> Result<MethodDescriptor, AnalysisError> {
        if sql.len() > self.large_statement_bytes {
            warn!(
                method = method_name,
                bytes = sql.len(),
                threshold = self.large_statement_bytes,
                "statement exceeds size threshold"
            );
        }
        let statement = Statement::parse(sql, self.dialect)?;
        let inferrer = ParameterTypeInferrer::new(self.catalog, &self.heuristics);

        let names: IndexSet<&str> = parameter_names.iter().map(|name| name.as_ref()).collect();
        let parameters = names
            .into_iter()
            .map(|name| match self.cache.get(sql, name) {
                Some(binding) => binding,
                None => {
                    let binding = inferrer.infer(&statement, name);
                    self.cache.insert(sql, name, binding.clone());
                    binding
                }
            })
            .collect();

        debug!(
            method = method_name,
            kind = %statement.execution_kind,
            tables = statement.tables.len(),
            "analyzed method"
        );
        Ok(MethodDescriptor {
            name: method_name.to_owned(),
            execution_kind: statement.execution_kind,
            statement_kind: statement.statement_kind,
            has_returning: statement.has_returning,
            sql_text: sql.to_owned(),
            parameters
        })
    }

    /// Analyze a framed block
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Parse`] when the block's SQL is empty.
    pub fn analyze_block(&self, block: &SqlBlock) -> Result<MethodDescriptor, AnalysisError> {
        self.analyze(&block.method_name, &block.sql_text, block.parameter_names.as_slice())
    }

    /// Analyze every block of a template, keeping block order
    ///
    /// # Errors
    ///
    /// Returns the first block's error; the file is not partially described.
    pub fn analyze_template(
        &self,
        template: &TemplateFile,
        source: Option<&Path>
    ) -> Result<TemplateDescriptor, AnalysisError> {
        let methods = template
            .blocks
            .iter()
            .map(|block| self.analyze_block(block))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TemplateDescriptor {
            class_name: template.class_name.clone(),
            source: source.map(|p| p.display().to_string()),
            methods
        })
    }
}

/// One-shot analysis with default heuristics and no cache sharing
///
/// # Errors
///
/// Returns [`AnalysisError::Parse`] when `sql` is empty.
pub fn analyze<S: AsRef<str>>(
    method_name: &str,
    sql: &str,
    parameter_names: &[S],
    catalog: &SchemaCatalog
) -> Result<MethodDescriptor, AnalysisError> {
    TemplateAnalyzer::new(catalog)
        .with_cache_size(0)
        .analyze(method_name, sql, parameter_names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{infer::BindingSource, schema::TypeMapping};

    fn catalog() -> SchemaCatalog {
        SchemaCatalog::load(
            &["CREATE TABLE products (id INTEGER, price DECIMAL(10,2))"],
            TypeMapping::default(),
            SqlDialect::Generic
        )
        .unwrap()
    }

    #[test]
    fn test_parameters_in_input_order_deduplicated() {
        let catalog = catalog();
        let method = analyze(
            "find",
            "SELECT * FROM products WHERE id = :id AND price > :min_price",
            &["min_price", "id", "min_price"],
            &catalog
        )
        .unwrap();
        let names: Vec<_> = method.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["min_price", "id"]);
        assert_eq!(method.parameters[1].source, BindingSource::ExactMatch);
    }

    #[test]
    fn test_empty_sql_is_parse_error() {
        let catalog = catalog();
        let err = analyze::<&str>("noop", "   ", &[], &catalog).unwrap_err();
        assert!(matches!(err, AnalysisError::Parse { .. }));
    }

    #[test]
    fn test_cache_is_filled_and_reused() {
        let catalog = catalog();
        let analyzer = TemplateAnalyzer::new(&catalog);
        let sql = "SELECT * FROM products WHERE id = :id";
        let first = analyzer.analyze("a", sql, &["id"]).unwrap();
        assert_eq!(analyzer.cache().len(), 1);
        let second = analyzer.analyze("b", sql, &["id"]).unwrap();
        assert_eq!(first.parameters, second.parameters);
        assert_eq!(analyzer.cache().len(), 1);
    }

    #[test]
    fn test_oversize_statement_is_still_analyzed() {
        let catalog = catalog();
        let analyzer = TemplateAnalyzer::new(&catalog).with_large_statement_bytes(8);
        let method = analyzer
            .analyze("big", "SELECT * FROM products WHERE id = :id", &["id"])
            .unwrap();
        assert_eq!(method.parameters[0].inferred_type, "int");
    }

    #[test]
    fn test_returning_keeps_execution_kind() {
        let catalog = catalog();
        let method = analyze(
            "add",
            "INSERT INTO products (id, price) VALUES (:id, :price) RETURNING id",
            &["id", "price"],
            &catalog
        )
        .unwrap();
        assert_eq!(method.execution_kind, ExecutionKind::NonRowReturning);
        assert_eq!(method.statement_kind, StatementKind::Insert);
        assert!(method.has_returning);
    }
}
