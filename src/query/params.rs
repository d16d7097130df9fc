use compact_str::CompactString;
use indexmap::IndexSet;

use crate::token::TokenStream;

/// One occurrence of a named bind marker in a statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindMarker {
    pub name:  CompactString,
    /// Index of the first token of the marker
    pub start: usize,
    /// Index of the last token of the marker
    pub end:   usize
}

/// Named bind markers in order of appearance.
///
/// Recognised forms are `:name` (comments may separate the colon from the
/// name), `@name` and `$name`. Markers inside literals and comments are
/// never seen because they are not separate tokens; positional markers
/// (`?`, `$1`) are skipped.
pub fn bind_markers(stream: &TokenStream) -> Vec<BindMarker> {
    let mut markers = Vec::new();
    let mut cursor = 0;
    while let Some((idx, _)) = stream.next_significant(cursor) {
        match marker_at(stream, idx) {
            Some(marker) => {
                cursor = marker.end + 1;
                markers.push(marker);
            }
            None => cursor = idx + 1
        }
    }
    markers
}

/// Distinct parameter names in order of first appearance
pub fn parameter_names(stream: &TokenStream) -> Vec<String> {
    bind_markers(stream)
        .into_iter()
        .map(|m| m.name.to_string())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// Bind marker starting at token `idx`, if any
pub fn marker_at(stream: &TokenStream, idx: usize) -> Option<BindMarker> {
    let token = stream.get(idx)?;
    if token.is_punct(":") {
        let (end, name) = stream.next_significant(idx + 1)?;
        return (name.is_word() && !name.quoted).then(|| BindMarker {
            name: name.value.as_str().into(),
            start: idx,
            end
        });
    }
    if token.is_bind_marker() {
        let name = &token.text[1..];
        let valid = !name.is_empty()
            && name.chars().all(|c| c.is_alphanumeric() || c == '_')
            && !name.chars().all(|c| c.is_ascii_digit());
        return valid.then(|| BindMarker {
            name: name.into(),
            start: idx,
            end: idx
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dialect::SqlDialect, token::tokenize};

    fn names(sql: &str) -> Vec<String> {
        parameter_names(&tokenize(sql, SqlDialect::Generic).unwrap())
    }

    #[test]
    fn test_colon_markers_deduplicated() {
        assert_eq!(
            names("SELECT * FROM users WHERE id = :user_id OR parent_id = :user_id AND s = :status"),
            vec!["user_id", "status"]
        );
    }

    #[test]
    fn test_markers_in_literals_and_comments_ignored() {
        assert_eq!(
            names("SELECT ':not_a_param' AS s FROM t WHERE x = :x -- :nope"),
            vec!["x"]
        );
    }

    #[test]
    fn test_cast_is_not_a_marker() {
        assert_eq!(names("SELECT created::date FROM t WHERE id = :id"), vec!["id"]);
    }

    #[test]
    fn test_comment_between_colon_and_name() {
        assert_eq!(
            names("SELECT * FROM users WHERE id = : /* inline */ user_id"),
            vec!["user_id"]
        );
    }

    #[test]
    fn test_at_markers() {
        let stream = tokenize("SELECT * FROM t WHERE id = @id", SqlDialect::MsSql).unwrap();
        assert_eq!(parameter_names(&stream), vec!["id"]);
    }

    #[test]
    fn test_positional_markers_skipped() {
        assert!(names("SELECT * FROM t WHERE id = ? OR id = $1").is_empty());
    }
}
