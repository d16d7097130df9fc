use compact_str::CompactString;
use serde::Serialize;
use smallvec::SmallVec;

/// Type alias for the tables referenced by one statement (usually few)
pub type TableVec = SmallVec<[CompactString; 4]>;

/// Whether the caller reads a primary result set from the statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionKind {
    RowReturning,
    NonRowReturning
}

impl ExecutionKind {
    pub fn is_row_returning(self) -> bool {
        self == Self::RowReturning
    }
}

/// Leading verb of a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Cte,
    Values,
    Show,
    Explain,
    Describe,
    Other
}

impl std::fmt::Display for ExecutionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RowReturning => write!(f, "fetch"),
            Self::NonRowReturning => write!(f, "execute")
        }
    }
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Select => write!(f, "SELECT"),
            Self::Insert => write!(f, "INSERT"),
            Self::Update => write!(f, "UPDATE"),
            Self::Delete => write!(f, "DELETE"),
            Self::Cte => write!(f, "CTE"),
            Self::Values => write!(f, "VALUES"),
            Self::Show => write!(f, "SHOW"),
            Self::Explain => write!(f, "EXPLAIN"),
            Self::Describe => write!(f, "DESCRIBE"),
            Self::Other => write!(f, "OTHER")
        }
    }
}
