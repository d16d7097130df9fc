use compact_str::CompactString;
use indexmap::IndexMap;
use tracing::debug;

use super::types::{ColumnDefinition, TableSchema, normalize_sql_type};
use crate::{
    error::AnalysisError,
    token::{TokenStream, read_identifier, read_object_name}
};

/// Words allowed between CREATE and TABLE
const CREATE_MODIFIERS: &[&str] = &[
    "OR",
    "REPLACE",
    "TEMP",
    "TEMPORARY",
    "GLOBAL",
    "LOCAL",
    "UNLOGGED",
    "TRANSIENT"
];

/// First words of a table-level constraint segment
const CONSTRAINT_LEADERS: &[&str] = &[
    "PRIMARY",
    "FOREIGN",
    "UNIQUE",
    "CHECK",
    "CONSTRAINT",
    "INDEX",
    "KEY",
    "FULLTEXT",
    "SPATIAL"
];

/// Words that end the type run of a column definition
const TYPE_TERMINATORS: &[&str] = &[
    "NOT",
    "NULL",
    "PRIMARY",
    "REFERENCES",
    "DEFAULT",
    "UNIQUE",
    "CHECK",
    "CONSTRAINT",
    "COLLATE",
    "GENERATED",
    "AUTO_INCREMENT",
    "AUTOINCREMENT",
    "IDENTITY",
    "COMMENT",
    "ON",
    "AS",
    "KEY"
];

/// Index of the first token after `CREATE [modifiers] TABLE`, if the stream
/// starts that way
fn table_keyword_end(stream: &TokenStream) -> Option<usize> {
    let (create, token) = stream.next_significant(0)?;
    if !token.is_keyword("CREATE") {
        return None;
    }
    let mut cursor = create + 1;
    loop {
        let (idx, token) = stream.next_significant(cursor)?;
        if token.is_keyword("TABLE") {
            return Some(idx + 1);
        }
        if !token.is_any_keyword(CREATE_MODIFIERS) {
            return None;
        }
        cursor = idx + 1;
    }
}

/// Whether the statement is a `CREATE TABLE`
pub fn is_create_table(stream: &TokenStream) -> bool {
    table_keyword_end(stream).is_some()
}

/// Parse one `CREATE TABLE` statement.
///
/// # Errors
///
/// Returns [`AnalysisError::Schema`] when the statement is not shaped like
/// `CREATE TABLE name (...)`, the column list is unbalanced, or the body has
/// no column definitions.
pub fn parse_create_table(stream: &TokenStream) -> Result<TableSchema, AnalysisError> {
    let sql = stream.source();
    let mut cursor = table_keyword_end(stream)
        .ok_or_else(|| AnalysisError::schema(None, "expected CREATE TABLE", sql))?;

    if let Some((idx, token)) = stream.next_significant(cursor)
        && token.is_keyword("IF")
    {
        cursor = idx + 1;
        for expected in ["NOT", "EXISTS"] {
            let (idx, token) = stream
                .require_significant(cursor, expected)
                .map_err(|e| AnalysisError::schema(None, e.to_string(), sql))?;
            if !token.is_keyword(expected) {
                return Err(AnalysisError::schema(
                    None,
                    format!("expected IF NOT EXISTS, found '{}'", token.text),
                    sql
                ));
            }
            cursor = idx + 1;
        }
    }

    let (name, after_name) = read_object_name(stream, cursor)
        .ok_or_else(|| AnalysisError::schema(None, "missing table name", sql))?;
    let table = name.key();

    let open = match stream.next_significant(after_name) {
        Some((idx, token)) if token.is_punct("(") => idx,
        _ => {
            return Err(AnalysisError::schema(
                Some(&table),
                "expected '(' after table name",
                sql
            ));
        }
    };
    let close = stream.matching_paren(open).ok_or_else(|| {
        AnalysisError::schema(Some(&table), "unbalanced parentheses in column list", sql)
    })?;

    let mut columns = IndexMap::new();
    let mut primary_keys = Vec::new();
    for (start, end) in segments(stream, open + 1, close) {
        let Some((first, token)) = stream.next_significant(start).filter(|(i, _)| *i < end) else {
            continue;
        };
        if token.is_any_keyword(CONSTRAINT_LEADERS) {
            primary_keys.extend(primary_key_columns(stream, first, end));
            continue;
        }
        match column_definition(stream, first, end) {
            Some(column) => {
                columns.insert(column.name.clone(), column);
            }
            None => debug!(table = %table, segment = %segment_text(stream, start, end), "skipping column without type")
        }
    }

    if columns.is_empty() {
        return Err(AnalysisError::schema(
            Some(&table),
            "table defines no columns",
            sql
        ));
    }
    for key in primary_keys {
        if let Some(column) = columns.get_mut(&key) {
            column.is_primary = true;
            column.is_nullable = false;
        }
    }

    Ok(TableSchema {
        table_name: table,
        qualifier: name.qualifier(),
        columns
    })
}

/// Token ranges between top-level commas of the body `(from..end)`
fn segments(stream: &TokenStream, from: usize, end: usize) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut depth = 0usize;
    let mut start = from;
    for idx in from..end {
        let Some(token) = stream.get(idx) else {
            break;
        };
        if token.is_punct("(") {
            depth += 1;
        } else if token.is_punct(")") {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && token.is_punct(",") {
            ranges.push((start, idx));
            start = idx + 1;
        }
    }
    ranges.push((start, end));
    ranges
}

fn segment_text(stream: &TokenStream, start: usize, end: usize) -> String {
    stream.tokens()[start..end]
        .iter()
        .map(|t| t.text.as_str())
        .collect::<String>()
        .trim()
        .to_owned()
}

/// Type words of a column, with quoted names such as `[int]` unwrapped
fn type_text(stream: &TokenStream, start: usize, end: usize) -> String {
    stream.tokens()[start..end]
        .iter()
        .map(|t| if t.quoted { t.value.as_str() } else { t.text.as_str() })
        .collect::<String>()
}

fn column_definition(stream: &TokenStream, first: usize, end: usize) -> Option<ColumnDefinition> {
    let (name, after) = read_identifier(stream, first)?;
    let mut depth = 0usize;
    let mut stop = end;
    for idx in after..end {
        let token = stream.get(idx)?;
        if token.is_punct("(") {
            depth += 1;
        } else if token.is_punct(")") {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && token.is_any_keyword(TYPE_TERMINATORS) {
            stop = idx;
            break;
        }
    }
    let sql_type = normalize_sql_type(&type_text(stream, after.min(stop), stop));
    if sql_type.is_empty() {
        return None;
    }

    let tail: Vec<_> = stream.tokens()[stop..end]
        .iter()
        .filter(|t| t.is_significant())
        .collect();
    let not_null = tail
        .windows(2)
        .any(|pair| pair[0].is_keyword("NOT") && pair[1].is_keyword("NULL"));
    let is_primary = tail.iter().any(|t| t.is_keyword("PRIMARY"));

    Some(ColumnDefinition {
        name: name.to_lowercase().into(),
        sql_type: sql_type.into(),
        is_nullable: !(not_null || is_primary),
        is_primary
    })
}

/// Columns of a `[CONSTRAINT name] PRIMARY KEY (a, b)` segment
fn primary_key_columns(stream: &TokenStream, first: usize, end: usize) -> Vec<CompactString> {
    let Some(primary) = (first..end).find(|&i| stream.get(i).is_some_and(|t| t.is_keyword("PRIMARY")))
    else {
        return Vec::new();
    };
    let Some(open) = (primary..end).find(|&i| stream.get(i).is_some_and(|t| t.is_punct("(")))
    else {
        return Vec::new();
    };
    let close = stream.matching_paren(open).unwrap_or(end).min(end);
    let mut keys = Vec::new();
    let mut cursor = open + 1;
    while cursor < close {
        match read_identifier(stream, cursor) {
            Some((name, next)) if next <= close => {
                keys.push(name.to_lowercase().into());
                cursor = next;
            }
            _ => break
        }
        match stream.next_significant(cursor) {
            Some((comma, token)) if comma < close && token.is_punct(",") => cursor = comma + 1,
            _ => break
        }
    }
    keys
}
