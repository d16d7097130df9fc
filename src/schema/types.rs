use compact_str::CompactString;
use indexmap::IndexMap;
use serde::Serialize;

/// Column metadata extracted from CREATE TABLE
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDefinition {
    /// Lower-cased column name
    pub name:        CompactString,
    /// Normalized SQL type (upper-case, size/precision removed)
    pub sql_type:    CompactString,
    /// Whether NULL values are allowed
    pub is_nullable: bool,
    /// Whether the column is part of the primary key
    pub is_primary:  bool
}

/// One table of the catalog. Columns keep declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    /// Lower-cased unqualified table name
    pub table_name: CompactString,
    /// Schema prefix as written, if the name was qualified
    pub qualifier:  Option<String>,
    pub columns:    IndexMap<CompactString, ColumnDefinition>
}

impl TableSchema {
    /// Case-insensitive column lookup
    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.get(name.to_lowercase().as_str())
    }
}

/// Normalize a SQL type name: upper-case, drop every parenthesized suffix
/// (`VARCHAR(255)`, `NUMERIC(10, 2)`) and array suffix (`INT[]`, `INT[3]`),
/// unwrap bracket-quoted names (`[nvarchar]`) and collapse whitespace.
///
/// ```
/// use sql_template_analyzer::schema::normalize_sql_type;
///
/// assert_eq!(normalize_sql_type("varchar(255)"), "VARCHAR");
/// assert_eq!(normalize_sql_type("DECIMAL (10, 2)"), "DECIMAL");
/// assert_eq!(normalize_sql_type("double   precision"), "DOUBLE PRECISION");
/// assert_eq!(normalize_sql_type("[nvarchar](50)"), "NVARCHAR");
/// ```
pub fn normalize_sql_type(sql_type: &str) -> String {
    let mut stripped = String::with_capacity(sql_type.len());
    let mut depth = 0usize;
    let mut rest = sql_type;
    while let Some(ch) = rest.chars().next() {
        rest = &rest[ch.len_utf8()..];
        match ch {
            '(' => {
                depth += 1;
                stripped.push(' ');
            }
            ')' => depth = depth.saturating_sub(1),
            '[' if depth == 0 => {
                let (inner, after) = rest.split_once(']').unwrap_or((rest, ""));
                rest = after;
                stripped.push(' ');
                if !inner.trim().chars().all(|c| c.is_ascii_digit()) {
                    stripped.push_str(inner);
                    stripped.push(' ');
                }
            }
            ']' => {}
            _ if depth == 0 => stripped.push(ch),
            _ => {}
        }
    }
    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}
