use compact_str::CompactString;

use crate::{
    query::{BindMarker, Statement},
    token::{TokenStream, read_identifier, read_object_name}
};

const COMPARISON_OPERATORS: &[&str] = &["=", "<>", "!=", "<", ">", "<=", ">="];

const PATTERN_OPERATORS: &[&str] = &["LIKE", "ILIKE"];

/// Words that end the backwards search for the `BETWEEN` of an `AND`
const PREDICATE_BOUNDARIES: &[&str] = &["AND", "OR", "WHERE", "ON", "WHEN", "HAVING", "NOT"];

/// Maximum number of tokens between `BETWEEN` and its `AND`
const BETWEEN_LOOKBACK: usize = 8;

/// Column a bind marker is compared with, assigned to or inserted into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    /// Lower-cased table name or alias in front of the column, if any
    pub qualifier: Option<CompactString>,
    /// Lower-cased column name
    pub column:    CompactString
}

/// Columns related to each occurrence of `parameter`, in order of
/// appearance. Occurrences without a recognisable column are skipped.
pub fn context_columns(statement: &Statement, parameter: &str) -> Vec<ColumnRef> {
    let stream = statement.stream();
    statement
        .markers_for(parameter)
        .filter_map(|marker| column_for_marker(stream, &marker))
        .collect()
}

fn column_for_marker(stream: &TokenStream, marker: &BindMarker) -> Option<ColumnRef> {
    left_operand(stream, marker.start)
        .or_else(|| right_operand(stream, marker.end))
        .or_else(|| insert_values_column(stream, marker.start))
}

/// `col <op> :p`, `col [NOT] LIKE :p`, `col BETWEEN :p AND :q`,
/// `col [NOT] IN (..., :p, ...)`
fn left_operand(stream: &TokenStream, start: usize) -> Option<ColumnRef> {
    let (op_idx, op) = stream.prev_significant(start)?;
    if COMPARISON_OPERATORS.iter().any(|p| op.is_punct(p)) {
        return column_before(stream, op_idx);
    }
    if op.is_any_keyword(PATTERN_OPERATORS) || op.is_keyword("BETWEEN") {
        return column_before(stream, skip_not(stream, op_idx));
    }
    if op.is_keyword("AND") {
        let between = between_for_and(stream, op_idx)?;
        return column_before(stream, skip_not(stream, between));
    }
    if op.is_punct("(") || op.is_punct(",") {
        let open = stream.enclosing_paren(start)?;
        let (in_idx, keyword) = stream.prev_significant(open)?;
        if keyword.is_keyword("IN") {
            return column_before(stream, skip_not(stream, in_idx));
        }
    }
    None
}

/// `:p <op> col`
fn right_operand(stream: &TokenStream, end: usize) -> Option<ColumnRef> {
    let (op_idx, op) = stream.next_significant(end + 1)?;
    if !COMPARISON_OPERATORS.iter().any(|p| op.is_punct(p)) {
        return None;
    }
    let (first_idx, first) = stream.next_significant(op_idx + 1)?;
    if !first.is_word() {
        return None;
    }
    match stream.next_significant(first_idx + 1) {
        Some((dot, token)) if token.is_punct(".") => {
            let (_, column) = stream.next_significant(dot + 1).filter(|(_, t)| t.is_word())?;
            Some(ColumnRef {
                qualifier: Some(lower(&first.value)),
                column:    lower(&column.value)
            })
        }
        _ => Some(ColumnRef {
            qualifier: None,
            column:    lower(&first.value)
        })
    }
}

/// Index of a `NOT` directly before `idx`, or `idx` itself
fn skip_not(stream: &TokenStream, idx: usize) -> usize {
    match stream.prev_significant(idx) {
        Some((not, token)) if token.is_keyword("NOT") => not,
        _ => idx
    }
}

fn between_for_and(stream: &TokenStream, and_idx: usize) -> Option<usize> {
    let mut cursor = and_idx;
    for _ in 0..BETWEEN_LOOKBACK {
        let (idx, token) = stream.prev_significant(cursor)?;
        if token.is_keyword("BETWEEN") {
            return Some(idx);
        }
        if token.is_any_keyword(PREDICATE_BOUNDARIES) || token.is_punct("(") || token.is_punct(",")
        {
            return None;
        }
        cursor = idx;
    }
    None
}

/// Column (optionally `qualifier.column`) ending just before `idx`
fn column_before(stream: &TokenStream, idx: usize) -> Option<ColumnRef> {
    let (col_idx, token) = stream.prev_significant(idx)?;
    if !token.is_word() {
        return None;
    }
    let column = lower(&token.value);
    match stream.prev_significant(col_idx) {
        // `:a = :b` compares two parameters
        Some((_, prev)) if prev.is_punct(":") => None,
        Some((dot, prev)) if prev.is_punct(".") => {
            let qualifier = stream
                .prev_significant(dot)
                .filter(|(_, q)| q.is_word())
                .map(|(_, q)| lower(&q.value));
            Some(ColumnRef {
                qualifier,
                column
            })
        }
        _ => Some(ColumnRef {
            qualifier: None,
            column
        })
    }
}

/// `INSERT INTO t (c1, c2) VALUES (:a, :b)` maps `:b` to `t.c2`
fn insert_values_column(stream: &TokenStream, start: usize) -> Option<ColumnRef> {
    let open = stream.enclosing_paren(start)?;
    let (prev_idx, prev) = stream.prev_significant(open)?;
    let is_tuple = prev.is_keyword("VALUES")
        || (prev.is_punct(",")
            && stream
                .prev_significant(prev_idx)
                .is_some_and(|(_, t)| t.is_punct(")")));
    if !is_tuple {
        return None;
    }

    let mut depth = 0usize;
    let mut position = 0usize;
    for token in &stream.tokens()[open + 1..start] {
        if token.is_punct("(") {
            depth += 1;
        } else if token.is_punct(")") {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && token.is_punct(",") {
            position += 1;
        }
    }

    let (table, columns) = insert_target(stream)?;
    let column = columns.into_iter().nth(position)?;
    Some(ColumnRef {
        qualifier: Some(table),
        column
    })
}

/// Target table and explicit column list of an `INSERT`
fn insert_target(stream: &TokenStream) -> Option<(CompactString, Vec<CompactString>)> {
    let (insert, _) = stream
        .significant()
        .find(|(_, t)| t.is_keyword("INSERT"))?;
    let mut cursor = insert + 1;
    if let Some((into, token)) = stream.next_significant(cursor)
        && token.is_keyword("INTO")
    {
        cursor = into + 1;
    }
    let (name, after) = read_object_name(stream, cursor)?;
    let (open, token) = stream.next_significant(after)?;
    if !token.is_punct("(") {
        return None;
    }
    let close = stream.matching_paren(open)?;

    let mut columns = Vec::new();
    let mut cursor = open + 1;
    while let Some((column, next)) = read_identifier(stream, cursor) {
        if next > close {
            break;
        }
        columns.push(lower(&column));
        match stream.next_significant(next) {
            Some((comma, token)) if comma < close && token.is_punct(",") => cursor = comma + 1,
            _ => break
        }
    }
    Some((name.key(), columns))
}

fn lower(text: &str) -> CompactString {
    text.to_lowercase().into()
}
