// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use std::fs;

use sql_template_analyzer::{
    cache::DEFAULT_CACHE_SIZE, config::Config, dialect::SqlDialect
};
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.analysis.dialect, SqlDialect::Generic);
    assert_eq!(config.analysis.cache_size, DEFAULT_CACHE_SIZE);
    assert_eq!(config.analysis.large_statement_bytes, 64 * 1024);
    assert!(config.types.file.is_none());
    assert!(config.types.mapping.is_empty());
    assert!(config.heuristics.is_empty());
}

#[test]
fn test_from_toml_full() {
    let config = Config::from_toml(
        r#"
        [analysis]
        dialect = "postgresql"
        large_statement_bytes = 1024
        cache_size = 10

        [types]
        file = "types.yaml"

        [types.mapping]
        UUID = "UUID"

        [[heuristics]]
        pattern = "_uuid$"
        sql_type = "UUID"
        "#
    )
    .unwrap();

    assert_eq!(config.analysis.dialect, SqlDialect::PostgreSQL);
    assert_eq!(config.analysis.large_statement_bytes, 1024);
    assert_eq!(config.analysis.cache_size, 10);
    assert_eq!(config.types.mapping.get("UUID").map(String::as_str), Some("UUID"));
    assert_eq!(config.heuristics.len(), 1);
}

#[test]
fn test_from_toml_partial_uses_defaults() {
    let config = Config::from_toml("[analysis]\ndialect = \"postgres\"\n").unwrap();
    assert_eq!(config.analysis.dialect, SqlDialect::PostgreSQL);
    assert_eq!(config.analysis.cache_size, DEFAULT_CACHE_SIZE);
}

#[test]
fn test_from_toml_invalid() {
    assert!(Config::from_toml("[analysis\n").is_err());
    assert!(Config::from_toml("[analysis]\ndialect = \"oracle\"\n").is_err());
}

#[test]
fn test_type_mapping_builtin_with_overrides() {
    let config = Config::from_toml("[types.mapping]\nGEOMETRY = \"Shape\"\n").unwrap();
    let mapping = config.type_mapping().unwrap();
    assert_eq!(mapping.target_type("GEOMETRY"), "Shape");
    assert_eq!(mapping.target_type("INTEGER"), "int");
}

#[test]
fn test_from_file_resolves_relative_types_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("types.yaml"), "INTEGER: i64\nDEFAULT: Value\n").unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "[types]\nfile = \"types.yaml\"\n").unwrap();

    let config = Config::from_file(&config_path).unwrap();
    assert_eq!(config.types.file.as_deref(), Some(dir.path().join("types.yaml").as_path()));
    let mapping = config.type_mapping().unwrap();
    assert_eq!(mapping.target_type("INTEGER"), "i64");
    assert_eq!(mapping.target_type("TEXT"), "Value");
}

#[test]
fn test_from_file_missing() {
    let dir = TempDir::new().unwrap();
    assert!(Config::from_file(&dir.path().join("absent.toml")).is_err());
}

#[test]
fn test_name_heuristics_from_config() {
    let config = Config::from_toml("[[heuristics]]\npattern = \"^ref$\"\nsql_type = \"UUID\"\n").unwrap();
    let heuristics = config.name_heuristics().unwrap();
    assert_eq!(heuristics.resolve("REF"), Some("UUID"));
    assert_eq!(heuristics.resolve("user_id"), Some("INTEGER"));
}

#[test]
fn test_name_heuristics_invalid_pattern() {
    let config = Config::from_toml("[[heuristics]]\npattern = \"[\"\nsql_type = \"TEXT\"\n").unwrap();
    assert!(config.name_heuristics().is_err());
}
