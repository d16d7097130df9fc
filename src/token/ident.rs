use compact_str::CompactString;
use smallvec::SmallVec;

use super::TokenStream;

/// Possibly schema-qualified object name, e.g. `"sales"."orders"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectName {
    pub parts: SmallVec<[CompactString; 2]>
}

impl ObjectName {
    /// Unqualified name as written
    pub fn name(&self) -> &str {
        self.parts.last().map_or("", |p| p.as_str())
    }

    /// Lower-cased unqualified name, used as lookup key
    pub fn key(&self) -> CompactString {
        self.name().to_lowercase().into()
    }

    /// Schema (and catalog) prefix, if any
    pub fn qualifier(&self) -> Option<String> {
        let n = self.parts.len();
        (n > 1).then(|| {
            self.parts[..n - 1]
                .iter()
                .map(|p| p.as_str())
                .collect::<Vec<_>>()
                .join(".")
        })
    }
}

/// Read one identifier starting at the first significant token at or after
/// `from`.
///
/// Accepts plain or quoted words and `[bracketed names]` for dialects that
/// do not lex brackets as quotes. Returns the unquoted name and the index
/// just past it.
pub fn read_identifier(stream: &TokenStream, from: usize) -> Option<(CompactString, usize)> {
    let (idx, token) = stream.next_significant(from)?;
    if token.is_word() {
        return Some((token.value.as_str().into(), idx + 1));
    }
    if !token.is_punct("[") {
        return None;
    }
    let mut words = Vec::new();
    let mut cursor = idx + 1;
    loop {
        let (next, token) = stream.next_significant(cursor)?;
        if token.is_punct("]") {
            return (!words.is_empty()).then(|| (words.join(" ").into(), next + 1));
        }
        if !token.is_word() {
            return None;
        }
        words.push(token.value.as_str());
        cursor = next + 1;
    }
}

/// Read a dotted object name starting at `from`
pub fn read_object_name(stream: &TokenStream, from: usize) -> Option<(ObjectName, usize)> {
    let (first, mut cursor) = read_identifier(stream, from)?;
    let mut parts = SmallVec::new();
    parts.push(first);
    while let Some((dot, token)) = stream.next_significant(cursor) {
        if !token.is_punct(".") {
            break;
        }
        let Some((part, next)) = read_identifier(stream, dot + 1) else {
            break;
        };
        parts.push(part);
        cursor = next;
    }
    Some((ObjectName {
        parts
    }, cursor))
}
