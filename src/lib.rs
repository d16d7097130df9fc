//! # SQL Template Analyzer Library
//!
//! Statement classification and parameter type inference for annotated SQL
//! templates.
//!
//! - [`token`] - dialect-aware tokenizer and token navigation
//! - [`query`] - statement classification, table and bind-marker extraction
//! - [`schema`] - `CREATE TABLE` catalog and SQL-to-target type mapping
//! - [`infer`] - parameter type inference chain
//! - [`analyzer`] - per-method orchestration producing descriptors
//! - [`template`] - template file framing

pub mod analyzer;
pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod dialect;
pub mod error;
pub mod infer;
pub mod output;
pub mod query;
pub mod schema;
pub mod template;
pub mod token;
