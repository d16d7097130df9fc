// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use std::io::Write;

use sql_template_analyzer::{dialect::SqlDialect, template::TemplateFile};
use tempfile::NamedTempFile;

fn parse(source: &str) -> TemplateFile {
    TemplateFile::parse(source, SqlDialect::Generic).unwrap()
}

#[test]
fn test_parse_blocks_in_order() {
    let template = parse(
        "# UserRepository\n\
         # get_user\n\
         SELECT *\n  FROM users\n WHERE id = :user_id;\n\
         \n\
         # rename_user\n\
         UPDATE users SET name = :new_name WHERE id = :user_id;\n"
    );
    assert_eq!(template.class_name, "UserRepository");
    let names: Vec<&str> = template.blocks.iter().map(|b| b.method_name.as_str()).collect();
    assert_eq!(names, vec!["get_user", "rename_user"]);
    assert_eq!(template.blocks[0].sql_text, "SELECT *\n  FROM users\n WHERE id = :user_id");
    assert_eq!(template.blocks[1].parameter_names, vec!["new_name", "user_id"]);
}

#[test]
fn test_parameter_names_skip_literals_and_comments() {
    let template = parse(
        "# Repo\n# find\nSELECT ':fake' FROM t /* :hidden */ WHERE a = :real AND b = :real\n"
    );
    assert_eq!(template.blocks[0].parameter_names, vec!["real"]);
}

#[test]
fn test_empty_blocks_are_skipped() {
    let template = parse("# Repo\n# nothing\n\n   \n# one\nSELECT 1;\n");
    assert_eq!(template.blocks.len(), 1);
    assert_eq!(template.blocks[0].method_name, "one");
}

#[test]
fn test_duplicate_method_keeps_later_sql() {
    let template = parse("# Repo\n# a\nSELECT 1\n# b\nSELECT 2\n# a\nSELECT 3\n");
    assert_eq!(template.blocks.len(), 2);
    assert_eq!(template.blocks[0].method_name, "a");
    assert_eq!(template.blocks[0].sql_text, "SELECT 3");
    assert_eq!(template.blocks[1].method_name, "b");
}

#[test]
fn test_lines_before_first_marker_are_ignored() {
    let template = parse("# Repo\n-- header comment\n# only\nSELECT 1\n");
    assert_eq!(template.blocks.len(), 1);
    assert_eq!(template.blocks[0].sql_text, "SELECT 1");
}

#[test]
fn test_missing_class_line() {
    let err = TemplateFile::parse("SELECT 1\n", SqlDialect::Generic).unwrap_err();
    assert!(format!("{:?}", err).contains("class"));
}

#[test]
fn test_class_line_without_space() {
    assert!(TemplateFile::parse("#Repo\n# a\nSELECT 1\n", SqlDialect::Generic).is_err());
    assert!(TemplateFile::parse("# \n# a\nSELECT 1\n", SqlDialect::Generic).is_err());
}

#[test]
fn test_empty_template() {
    assert!(TemplateFile::parse("", SqlDialect::Generic).is_err());
    let template = parse("# Empty\n");
    assert!(template.blocks.is_empty());
}

#[test]
fn test_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "# Repo").unwrap();
    writeln!(file, "# count_users").unwrap();
    writeln!(file, "SELECT COUNT(*) FROM users WHERE active = :active;").unwrap();

    let template = TemplateFile::load(file.path(), SqlDialect::Generic).unwrap();
    assert_eq!(template.blocks[0].parameter_names, vec!["active"]);
}

#[test]
fn test_load_missing_file() {
    let err = TemplateFile::load(
        std::path::Path::new("/nonexistent/template.sql"),
        SqlDialect::Generic
    )
    .unwrap_err();
    assert!(format!("{:?}", err).contains("/nonexistent/template.sql"));
}
