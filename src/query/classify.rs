use super::types::{ExecutionKind, StatementKind};
use crate::token::TokenStream;

/// Verbs whose statements produce a result set
const ROW_RETURNING: &[&str] = &[
    "SELECT", "SHOW", "EXPLAIN", "DESCRIBE", "DESC", "PRAGMA", "VALUES"
];

/// Words that may follow a closed group inside a CTE list without starting
/// the main statement
const CTE_CONNECTORS: &[&str] = &["AS", "NOT", "MATERIALIZED", "SEARCH", "CYCLE"];

/// Determine whether a statement returns rows.
///
/// Classification is driven by the primary verb only: `INSERT ... RETURNING`
/// stays [`ExecutionKind::NonRowReturning`]. `WITH` statements are classified
/// by the main statement that follows the CTE list. Unknown verbs and
/// statements without any verb are non-row-returning.
pub fn classify(stream: &TokenStream) -> ExecutionKind {
    leading_verb(stream, 0).map_or(ExecutionKind::NonRowReturning, |idx| {
        classify_at(stream, idx)
    })
}

fn classify_at(stream: &TokenStream, idx: usize) -> ExecutionKind {
    let Some(token) = stream.get(idx) else {
        return ExecutionKind::NonRowReturning;
    };
    if token.is_keyword("WITH") {
        return terminal_statement(stream, idx + 1)
            .map_or(ExecutionKind::NonRowReturning, |main| classify_at(stream, main));
    }
    if token.is_any_keyword(ROW_RETURNING) {
        ExecutionKind::RowReturning
    } else {
        ExecutionKind::NonRowReturning
    }
}

/// Leading verb of the statement, as written
pub fn statement_kind(stream: &TokenStream) -> StatementKind {
    let Some(token) = leading_verb(stream, 0).and_then(|idx| stream.get(idx)) else {
        return StatementKind::Other;
    };
    match token.upper().as_str() {
        "SELECT" => StatementKind::Select,
        "INSERT" => StatementKind::Insert,
        "UPDATE" => StatementKind::Update,
        "DELETE" => StatementKind::Delete,
        "WITH" => StatementKind::Cte,
        "VALUES" => StatementKind::Values,
        "SHOW" => StatementKind::Show,
        "EXPLAIN" => StatementKind::Explain,
        "DESCRIBE" | "DESC" => StatementKind::Describe,
        _ => StatementKind::Other
    }
}

/// `RETURNING` clause or MSSQL `OUTPUT INSERTED.* / DELETED.*`
pub fn has_returning(stream: &TokenStream) -> bool {
    stream.significant().any(|(idx, token)| {
        token.is_keyword("RETURNING")
            || (token.is_keyword("OUTPUT")
                && stream
                    .next_significant(idx + 1)
                    .is_some_and(|(_, next)| next.is_any_keyword(&["INSERTED", "DELETED"])))
    })
}

/// First significant token at or after `from`, descending into leading
/// parentheses
fn leading_verb(stream: &TokenStream, from: usize) -> Option<usize> {
    let mut cursor = from;
    loop {
        let (idx, token) = stream.next_significant(cursor)?;
        if !token.is_punct("(") {
            return Some(idx);
        }
        cursor = idx + 1;
    }
}

/// Locate the main statement of a `WITH` clause.
///
/// `after_with` is the index right after the `WITH` keyword. The main
/// statement starts at the first top-level word that directly follows a
/// closed top-level group and is not part of a CTE definition. Commas only
/// separate CTE definitions at depth zero.
pub fn terminal_statement(stream: &TokenStream, after_with: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut closed_group = false;
    for (idx, token) in stream.significant().skip_while(|(i, _)| *i < after_with) {
        if token.is_punct("(") {
            if depth == 0 && closed_group {
                return leading_verb(stream, idx);
            }
            depth += 1;
            closed_group = false;
            continue;
        }
        if token.is_punct(")") {
            depth = depth.saturating_sub(1);
            closed_group = depth == 0;
            continue;
        }
        if depth > 0 {
            continue;
        }
        if closed_group && token.is_word() && !token.is_any_keyword(CTE_CONNECTORS) {
            return Some(idx);
        }
        closed_group = false;
    }
    None
}
