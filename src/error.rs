//! Error types for the analysis engine and constructors for application
//! errors.
//!
//! The engine (tokenizer, classifier, schema catalog, inferrer) reports
//! failures as [`AnalysisError`]. Everything above it (file I/O,
//! configuration, template framing, the CLI) works with
//! [`masterror::AppError`]; engine errors convert into it through `?`.

use std::fmt;

pub use masterror::{AppError, AppResult};

/// Maximum number of characters of SQL text kept in an error excerpt
const EXCERPT_LEN: usize = 80;

/// Failure raised by the analysis engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The statement was empty or contained only whitespace
    Parse {
        message: String
    },
    /// A token required by the caller's contract was not found
    Tokenization {
        expected: String,
        at_index: usize,
        excerpt:  String
    },
    /// A schema statement could not be reduced to a table with columns
    Schema {
        table:   Option<String>,
        message: String,
        excerpt: String
    }
}

impl AnalysisError {
    /// Error for an empty or whitespace-only statement
    pub fn empty_statement() -> Self {
        Self::Parse {
            message: String::from("statement is empty")
        }
    }

    /// Error for a missing required token
    pub fn tokenization(expected: impl Into<String>, at_index: usize, sql: &str) -> Self {
        Self::Tokenization {
            expected: expected.into(),
            at_index,
            excerpt: excerpt(sql)
        }
    }

    /// Error for a schema statement that does not describe a table
    pub fn schema(table: Option<&str>, message: impl Into<String>, sql: &str) -> Self {
        Self::Schema {
            table:   table.map(str::to_owned),
            message: message.into(),
            excerpt: excerpt(sql)
        }
    }

    /// Whether this is a schema error
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::Schema { .. })
    }

    /// Whether this is a tokenization error
    pub fn is_tokenization(&self) -> bool {
        matches!(self, Self::Tokenization { .. })
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse {
                message
            } => write!(f, "Parse error: {}", message),
            Self::Tokenization {
                expected,
                at_index,
                excerpt
            } => write!(
                f,
                "Tokenization error: expected {} at token {}:\n  {}",
                expected, at_index, excerpt
            ),
            Self::Schema {
                table: Some(table),
                message,
                excerpt
            } => write!(f, "Schema error in table '{}': {}:\n  {}", table, message, excerpt),
            Self::Schema {
                table: None,
                message,
                excerpt
            } => write!(f, "Schema error: {}:\n  {}", message, excerpt)
        }
    }
}

impl std::error::Error for AnalysisError {}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        AppError::bad_request(err.to_string())
    }
}

/// Collapse whitespace and cut SQL text down to a short single-line excerpt
pub fn excerpt(sql: &str) -> String {
    let flat = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= EXCERPT_LEN {
        flat
    } else {
        let mut cut: String = flat.chars().take(EXCERPT_LEN).collect();
        cut.push_str("...");
        cut
    }
}

/// Create file read error
pub fn file_read_error(path: &str, source: std::io::Error) -> AppError {
    AppError::internal(format!("Failed to read file '{}': {}", path, source))
}

/// Create file write error
pub fn file_write_error(path: &str, source: std::io::Error) -> AppError {
    AppError::internal(format!("Failed to write file '{}': {}", path, source))
}

/// Create schema parse error for a named schema source
pub fn schema_parse_error(source: &str, err: AnalysisError) -> AppError {
    AppError::bad_request(format!("Schema source '{}': {}", source, err))
}

/// Create template framing error
pub fn template_error(path: &str, message: impl Into<String>) -> AppError {
    AppError::bad_request(format!("Template '{}': {}", path, message.into()))
}

/// Create config error
pub fn config_error(message: impl Into<String>) -> AppError {
    AppError::bad_request(message.into())
}
