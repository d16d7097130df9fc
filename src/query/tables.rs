use compact_str::CompactString;
use indexmap::IndexSet;

use super::types::TableVec;
use crate::token::{TokenStream, read_identifier, read_object_name};

/// Keywords followed by a table reference
const TABLE_INTRODUCERS: &[&str] = &["FROM", "JOIN", "UPDATE", "INTO"];

/// Words that precede `UPDATE` when it is not a statement verb
/// (`FOR UPDATE`, `DO UPDATE`, `ON UPDATE CASCADE`)
const NON_TABLE_UPDATE: &[&str] = &["FOR", "DO", "ON"];

/// Table modifiers skipped before the name
const TABLE_MODIFIERS: &[&str] = &["ONLY", "LATERAL"];

/// Words that end a table reference instead of naming an alias
const CLAUSE_KEYWORDS: &[&str] = &[
    "WHERE", "JOIN", "INNER", "LEFT", "RIGHT", "FULL", "CROSS", "OUTER", "NATURAL", "ON", "USING",
    "GROUP", "ORDER", "HAVING", "LIMIT", "OFFSET", "UNION", "EXCEPT", "INTERSECT", "SET", "VALUES",
    "RETURNING", "WINDOW", "FETCH", "FOR", "SELECT", "DEFAULT", "OUTPUT", "QUALIFY"
];

/// Extract the tables a statement reads from or writes to.
///
/// Names are lower-cased and unqualified, in order of first appearance.
/// Derived tables are skipped; `FROM a, b` lists are followed.
pub fn extract_tables(stream: &TokenStream) -> TableVec {
    let mut tables = IndexSet::new();
    for (idx, token) in stream.significant() {
        if !token.is_any_keyword(TABLE_INTRODUCERS) {
            continue;
        }
        if token.is_keyword("UPDATE")
            && stream
                .prev_significant(idx)
                .is_some_and(|(_, prev)| prev.is_any_keyword(NON_TABLE_UPDATE))
        {
            continue;
        }
        if token.is_keyword("FROM") && !is_query_from(stream, idx) {
            continue;
        }
        read_table_list(stream, idx + 1, token.is_keyword("FROM"), &mut tables);
    }
    tables.into_iter().collect()
}

/// `FROM` inside a function call (`EXTRACT(YEAR FROM ts)`) is not a table
/// reference
fn is_query_from(stream: &TokenStream, idx: usize) -> bool {
    let Some(open) = stream.enclosing_paren(idx) else {
        return true;
    };
    stream
        .next_significant(open + 1)
        .is_some_and(|(_, first)| first.is_any_keyword(&["SELECT", "WITH", "DELETE"]))
}

fn read_table_list(
    stream: &TokenStream,
    from: usize,
    follow_commas: bool,
    tables: &mut IndexSet<CompactString>
) {
    let mut cursor = from;
    loop {
        let Some((idx, token)) = stream.next_significant(cursor) else {
            return;
        };
        if token.is_any_keyword(TABLE_MODIFIERS) {
            cursor = idx + 1;
            continue;
        }
        if token.is_punct("(") {
            let Some(close) = stream.matching_paren(idx) else {
                return;
            };
            cursor = close + 1;
        } else {
            let Some((name, next)) = read_object_name(stream, idx) else {
                return;
            };
            tables.insert(name.key());
            cursor = next;
        }
        if !follow_commas {
            return;
        }
        cursor = skip_alias(stream, cursor);
        match stream.next_significant(cursor) {
            Some((comma, token)) if token.is_punct(",") => cursor = comma + 1,
            _ => return
        }
    }
}

fn skip_alias(stream: &TokenStream, from: usize) -> usize {
    let Some((idx, token)) = stream.next_significant(from) else {
        return from;
    };
    if token.is_keyword("AS") {
        return read_identifier(stream, idx + 1).map_or(idx + 1, |(_, next)| next);
    }
    if token.is_word() && !token.is_any_keyword(CLAUSE_KEYWORDS) {
        return idx + 1;
    }
    from
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dialect::SqlDialect, token::tokenize};

    fn tables(sql: &str) -> Vec<String> {
        extract_tables(&tokenize(sql, SqlDialect::Generic).unwrap())
            .into_iter()
            .map(|t| t.to_string())
            .collect()
    }

    #[test]
    fn test_select_from_join() {
        assert_eq!(
            tables("SELECT * FROM users u JOIN orders o ON u.id = o.user_id"),
            vec!["users", "orders"]
        );
    }

    #[test]
    fn test_comma_list_with_aliases() {
        assert_eq!(
            tables("SELECT * FROM users AS u, public.orders o, items WHERE 1 = 1"),
            vec!["users", "orders", "items"]
        );
    }

    #[test]
    fn test_dml_targets() {
        assert_eq!(tables("INSERT INTO Users (id) VALUES (:id)"), vec!["users"]);
        assert_eq!(tables("UPDATE accounts SET a = 1"), vec!["accounts"]);
        assert_eq!(tables("DELETE FROM logs WHERE id = 1"), vec!["logs"]);
    }

    #[test]
    fn test_derived_table_is_skipped_but_inner_tables_found() {
        assert_eq!(
            tables("SELECT * FROM (SELECT id FROM users) AS u WHERE u.id = :id"),
            vec!["users"]
        );
    }

    #[test]
    fn test_function_from_is_not_a_table() {
        assert_eq!(
            tables("SELECT EXTRACT(YEAR FROM created_at) FROM events"),
            vec!["events"]
        );
    }

    #[test]
    fn test_locking_and_upsert_update_ignored() {
        assert_eq!(tables("SELECT * FROM jobs FOR UPDATE"), vec!["jobs"]);
        assert_eq!(
            tables("INSERT INTO kv (k, v) VALUES (1, 2) ON CONFLICT (k) DO UPDATE SET v = 2"),
            vec!["kv"]
        );
    }

    #[test]
    fn test_no_tables() {
        assert!(tables("SELECT 1 as value").is_empty());
    }

    #[test]
    fn test_deduplicated() {
        assert_eq!(
            tables("SELECT * FROM a WHERE id IN (SELECT id FROM a)"),
            vec!["a"]
        );
    }
}
