//! Statement-level analysis over a [`TokenStream`].
//!
//! - [`classify`] decides whether a statement returns rows
//! - [`extract_tables`] lists the tables a statement references
//! - [`bind_markers`] finds named parameter placeholders
//!
//! [`Statement`] bundles the results for one statement so the stream is
//! produced once and shared by every consumer.

mod classify;
mod params;
mod tables;
mod types;

pub use classify::{classify, has_returning, statement_kind, terminal_statement};
pub use params::{BindMarker, bind_markers, marker_at, parameter_names};
pub use tables::extract_tables;
pub use types::{ExecutionKind, StatementKind, TableVec};

use crate::{
    dialect::SqlDialect,
    error::AnalysisError,
    token::{TokenStream, tokenize}
};

/// Tokenized statement with its classification and referenced tables
#[derive(Debug, Clone)]
pub struct Statement {
    stream:             TokenStream,
    pub execution_kind: ExecutionKind,
    pub statement_kind: StatementKind,
    pub has_returning:  bool,
    pub tables:         TableVec
}

impl Statement {
    /// Tokenize and analyze a statement
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Parse`] for empty input.
    pub fn parse(sql: &str, dialect: SqlDialect) -> Result<Self, AnalysisError> {
        Ok(Self::from_stream(tokenize(sql, dialect)?))
    }

    /// Analyze an already tokenized statement
    pub fn from_stream(stream: TokenStream) -> Self {
        Self {
            execution_kind: classify(&stream),
            statement_kind: statement_kind(&stream),
            has_returning: has_returning(&stream),
            tables: extract_tables(&stream),
            stream
        }
    }

    pub fn stream(&self) -> &TokenStream {
        &self.stream
    }

    pub fn sql(&self) -> &str {
        self.stream.source()
    }

    /// Occurrences of the named parameter, compared case-insensitively
    pub fn markers_for<'a>(&'a self, parameter: &'a str) -> impl Iterator<Item = BindMarker> + 'a {
        bind_markers(&self.stream)
            .into_iter()
            .filter(move |m| m.name.eq_ignore_ascii_case(parameter))
    }
}
