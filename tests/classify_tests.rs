// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use sql_template_analyzer::{
    dialect::SqlDialect,
    query::{ExecutionKind, Statement, StatementKind, parameter_names},
    token::tokenize
};

fn parse(sql: &str) -> Statement {
    Statement::parse(sql, SqlDialect::Generic).unwrap()
}

fn kind(sql: &str) -> ExecutionKind {
    parse(sql).execution_kind
}

#[test]
fn test_select_is_row_returning() {
    assert_eq!(kind("SELECT * FROM users"), ExecutionKind::RowReturning);
    assert_eq!(kind("select id from users"), ExecutionKind::RowReturning);
    assert_eq!(kind("SELECT 1 as value"), ExecutionKind::RowReturning);
}

#[test]
fn test_dml_is_non_row_returning() {
    assert_eq!(kind("INSERT INTO users (id) VALUES (1)"), ExecutionKind::NonRowReturning);
    assert_eq!(kind("UPDATE users SET name = 'a'"), ExecutionKind::NonRowReturning);
    assert_eq!(kind("DELETE FROM users WHERE id = 1"), ExecutionKind::NonRowReturning);
    assert_eq!(kind("CREATE TABLE t (id INT)"), ExecutionKind::NonRowReturning);
}

#[test]
fn test_leading_comment_is_skipped() {
    assert_eq!(
        kind("-- fetch everything\n/* block */ SELECT * FROM users"),
        ExecutionKind::RowReturning
    );
}

#[test]
fn test_unterminated_trailing_comment_keeps_classification() {
    let statement = parse("SELECT * FROM users WHERE id = :id /* trailing note");
    assert_eq!(statement.execution_kind, ExecutionKind::RowReturning);
    let tables: Vec<&str> = statement.tables.iter().map(|t| t.as_str()).collect();
    assert_eq!(tables, vec!["users"]);
}

#[test]
fn test_cte_classified_by_main_statement() {
    assert_eq!(
        kind("WITH recent AS (SELECT id FROM orders) SELECT * FROM recent"),
        ExecutionKind::RowReturning
    );
    assert_eq!(
        kind("WITH stale AS (SELECT id FROM orders) DELETE FROM orders WHERE id IN (SELECT id FROM stale)"),
        ExecutionKind::NonRowReturning
    );
}

#[test]
fn test_cte_with_multiple_definitions() {
    let sql = "WITH a AS (SELECT f(1, 2) AS x), b AS (SELECT x FROM a) \
               UPDATE t SET y = 1 WHERE x IN (SELECT x FROM b)";
    assert_eq!(kind(sql), ExecutionKind::NonRowReturning);
    assert_eq!(parse(sql).statement_kind, StatementKind::Cte);
}

#[test]
fn test_recursive_cte() {
    let sql = "WITH RECURSIVE n(i) AS (SELECT 1 UNION ALL SELECT i + 1 FROM n WHERE i < 5) \
               SELECT i FROM n";
    assert_eq!(kind(sql), ExecutionKind::RowReturning);
}

#[test]
fn test_insert_returning_keeps_verb_classification() {
    let statement = parse("INSERT INTO users (name) VALUES (:name) RETURNING id");
    assert_eq!(statement.execution_kind, ExecutionKind::NonRowReturning);
    assert!(statement.has_returning);
}

#[test]
fn test_statement_kind() {
    assert_eq!(parse("SELECT 1").statement_kind, StatementKind::Select);
    assert_eq!(parse("INSERT INTO t VALUES (1)").statement_kind, StatementKind::Insert);
    assert_eq!(parse("UPDATE t SET a = 1").statement_kind, StatementKind::Update);
    assert_eq!(parse("DELETE FROM t").statement_kind, StatementKind::Delete);
    assert_eq!(parse("VACUUM").statement_kind, StatementKind::Other);
}

#[test]
fn test_tables_extracted_in_order() {
    let statement = parse(
        "SELECT * FROM orders o, regions r JOIN customers c ON c.id = o.customer_id WHERE o.id = :id"
    );
    let tables: Vec<&str> = statement.tables.iter().map(|t| t.as_str()).collect();
    assert_eq!(tables, vec!["orders", "regions", "customers"]);
}

#[test]
fn test_tables_are_unqualified_and_lowercase() {
    let statement = Statement::parse(
        "UPDATE \"Sales\".\"Orders\" SET total = :total",
        SqlDialect::PostgreSQL
    )
    .unwrap();
    let tables: Vec<&str> = statement.tables.iter().map(|t| t.as_str()).collect();
    assert_eq!(tables, vec!["orders"]);
}

#[test]
fn test_select_without_tables() {
    assert!(parse("SELECT 1 as value").tables.is_empty());
}

#[test]
fn test_parameter_names_first_appearance() {
    let stream = tokenize(
        "SELECT * FROM t WHERE a = :b AND c = :a OR d = :b AND e = ':literal'",
        SqlDialect::Generic
    )
    .unwrap();
    assert_eq!(parameter_names(&stream), vec!["b", "a"]);
}

#[test]
fn test_parameter_names_ignore_comments() {
    let stream = tokenize(
        "SELECT * FROM t -- WHERE x = :hidden\nWHERE y = :shown",
        SqlDialect::Generic
    )
    .unwrap();
    assert_eq!(parameter_names(&stream), vec!["shown"]);
}

#[test]
fn test_postgres_cast_is_not_a_parameter() {
    let stream = tokenize("SELECT a::text FROM t WHERE b = :p", SqlDialect::PostgreSQL).unwrap();
    assert_eq!(parameter_names(&stream), vec!["p"]);
}
