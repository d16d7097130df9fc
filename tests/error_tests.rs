// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use sql_template_analyzer::error::{
    AnalysisError, AppError, config_error, excerpt, file_read_error, file_write_error,
    schema_parse_error, template_error
};

fn details(error: &AppError) -> String {
    format!("{:?}", error)
}

#[test]
fn test_file_read_error() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error = file_read_error("/path/to/file.sql", io_error);
    assert!(details(&error).contains("/path/to/file.sql"));
}

#[test]
fn test_file_write_error() {
    let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let error = file_write_error("/out/repo.json", io_error);
    assert!(details(&error).contains("/out/repo.json"));
}

#[test]
fn test_schema_parse_error_names_source() {
    let error = schema_parse_error(
        "schema.sql",
        AnalysisError::schema(Some("users"), "table defines no columns", "CREATE TABLE users ()")
    );
    let msg = details(&error);
    assert!(msg.contains("schema.sql"));
    assert!(msg.contains("users"));
}

#[test]
fn test_template_error() {
    let error = template_error("repo.sql", "class name cannot be empty");
    assert!(details(&error).contains("repo.sql"));
}

#[test]
fn test_config_error() {
    let error = config_error("Invalid configuration");
    assert!(details(&error).contains("Invalid configuration"));
}

#[test]
fn test_empty_statement_error() {
    let error = AnalysisError::empty_statement();
    assert!(!error.is_schema());
    assert!(!error.is_tokenization());
    assert_eq!(error.to_string(), "Parse error: statement is empty");
}

#[test]
fn test_tokenization_error_display() {
    let error = AnalysisError::tokenization("table name", 3, "CREATE TABLE");
    assert!(error.is_tokenization());
    let msg = error.to_string();
    assert!(msg.contains("table name"));
    assert!(msg.contains("token 3"));
    assert!(msg.contains("CREATE TABLE"));
}

#[test]
fn test_schema_error_without_table() {
    let error = AnalysisError::schema(None, "expected CREATE TABLE", "DROP TABLE x");
    assert!(error.is_schema());
    assert!(error.to_string().starts_with("Schema error: expected CREATE TABLE"));
}

#[test]
fn test_analysis_error_into_app_error() {
    let error: AppError = AnalysisError::empty_statement().into();
    assert!(details(&error).contains("statement is empty"));
}

#[test]
fn test_excerpt_collapses_and_truncates() {
    assert_eq!(excerpt("SELECT\n   *\tFROM t"), "SELECT * FROM t");
    let long = format!("SELECT {} FROM t", "col, ".repeat(40));
    let cut = excerpt(&long);
    assert!(cut.ends_with("..."));
    assert_eq!(cut.chars().count(), 83);
}
