// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use sql_template_analyzer::{
    dialect::SqlDialect,
    token::{TokenKind, read_object_name, split_statements, tokenize}
};

#[test]
fn test_tokenize_empty_input() {
    let err = tokenize("", SqlDialect::Generic).unwrap_err();
    assert!(err.to_string().contains("empty"));
    assert!(tokenize("   \n\t ", SqlDialect::Generic).is_err());
}

#[test]
fn test_tokenize_preserves_source() {
    let sql = "SELECT a, b\n  FROM t -- trailing\nWHERE x = 'y'";
    let stream = tokenize(sql, SqlDialect::Generic).unwrap();
    let rebuilt: String = stream.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(rebuilt, sql);
}

#[test]
fn test_tokenize_classifies_tokens() {
    let stream = tokenize("SELECT name FROM users WHERE id = 1", SqlDialect::Generic).unwrap();
    let (_, first) = stream.next_significant(0).unwrap();
    assert_eq!(first.kind, TokenKind::Keyword);
    assert!(first.is_keyword("select"));

    let kinds: Vec<TokenKind> = stream.significant().map(|(_, t)| t.kind).collect();
    assert!(kinds.contains(&TokenKind::Punctuation));
    assert!(kinds.contains(&TokenKind::Literal));
    assert!(stream.iter().any(|t| t.kind == TokenKind::Whitespace));
}

#[test]
fn test_tokenize_comments_are_not_significant() {
    let stream = tokenize("/* lead */ -- note\nSELECT 1", SqlDialect::Generic).unwrap();
    assert!(stream.iter().any(|t| t.kind == TokenKind::Comment));
    let (_, first) = stream.next_significant(0).unwrap();
    assert!(first.is_keyword("SELECT"));
}

#[test]
fn test_tokenize_malformed_input_still_yields_tokens() {
    let stream = tokenize("SELECT 'unterminated FROM t", SqlDialect::Generic).unwrap();
    assert!(!stream.is_empty());
    let (_, first) = stream.next_significant(0).unwrap();
    assert!(first.is_keyword("SELECT"));
}

#[test]
fn test_next_significant_end_of_input() {
    let stream = tokenize("SELECT 1  ", SqlDialect::Generic).unwrap();
    let (last, _) = stream.significant().last().unwrap();
    assert!(stream.next_significant(last + 1).is_none());
}

#[test]
fn test_require_significant_error() {
    let stream = tokenize("SELECT", SqlDialect::Generic).unwrap();
    assert!(stream.require_significant(0, "verb").is_ok());
    let err = stream.require_significant(stream.len(), "table name").unwrap_err();
    assert!(err.is_tokenization());
    assert!(err.to_string().contains("table name"));
}

#[test]
fn test_prev_significant() {
    let stream = tokenize("a = b", SqlDialect::Generic).unwrap();
    let (eq, _) = stream.significant().find(|(_, t)| t.is_punct("=")).unwrap();
    let (_, prev) = stream.prev_significant(eq).unwrap();
    assert_eq!(prev.value, "a");
    assert!(stream.prev_significant(0).is_none());
}

#[test]
fn test_matching_paren() {
    let stream = tokenize("f((a), b)", SqlDialect::Generic).unwrap();
    let (open, _) = stream.significant().find(|(_, t)| t.is_punct("(")).unwrap();
    let close = stream.matching_paren(open).unwrap();
    let (last, _) = stream.significant().last().unwrap();
    assert_eq!(close, last);
}

#[test]
fn test_quoted_identifier_value() {
    let stream = tokenize("SELECT \"Order Id\" FROM t", SqlDialect::PostgreSQL).unwrap();
    let quoted = stream.iter().find(|t| t.quoted).unwrap();
    assert_eq!(quoted.value, "Order Id");
    assert_eq!(quoted.text, "\"Order Id\"");
    assert!(!quoted.is_keyword("Order Id"));
}

#[test]
fn test_read_object_name_qualified() {
    let stream = tokenize("\"sales\".\"Orders\"", SqlDialect::PostgreSQL).unwrap();
    let (name, _) = read_object_name(&stream, 0).unwrap();
    assert_eq!(name.name(), "Orders");
    assert_eq!(name.key(), "orders");
    assert_eq!(name.qualifier().as_deref(), Some("sales"));
}

#[test]
fn test_split_statements() {
    let script = "CREATE TABLE a (x INT);\n-- a; comment\nINSERT INTO a VALUES (';');\n;";
    let statements = split_statements(script, SqlDialect::Generic);
    assert_eq!(statements.len(), 2);
    assert!(statements[0].starts_with("CREATE TABLE"));
    assert!(statements[1].ends_with("(';')"));
}
