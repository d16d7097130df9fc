use std::{collections::HashMap, fs, path::Path};

use tracing::warn;

use super::types::normalize_sql_type;
use crate::error::{AppResult, config_error, file_read_error};

/// Key of the mandatory fallback entry
pub const DEFAULT_KEY: &str = "DEFAULT";

/// Target type used when a mapping source omits `DEFAULT`
pub const FALLBACK_TARGET: &str = "Any";

const BUILTIN: &[(&str, &str)] = &[
    // SQLite / generic
    ("INTEGER", "int"),
    ("INT", "int"),
    ("BIGINT", "int"),
    ("TEXT", "str"),
    ("VARCHAR", "str"),
    ("CHAR", "str"),
    ("CHARACTER", "str"),
    ("CHARACTER VARYING", "str"),
    ("DECIMAL", "float"),
    ("REAL", "float"),
    ("FLOAT", "float"),
    ("DOUBLE", "float"),
    ("DOUBLE PRECISION", "float"),
    ("BOOLEAN", "bool"),
    ("BOOL", "bool"),
    ("TIMESTAMP", "str"),
    ("TIMESTAMP WITH TIME ZONE", "str"),
    ("TIMESTAMP WITHOUT TIME ZONE", "str"),
    ("TIMESTAMPTZ", "str"),
    ("DATETIME", "str"),
    ("DATE", "str"),
    ("BLOB", "bytes"),
    // PostgreSQL
    ("JSON", "dict"),
    ("JSONB", "dict"),
    ("UUID", "str"),
    ("SERIAL", "int"),
    ("BIGSERIAL", "int"),
    ("BYTEA", "bytes"),
    // MySQL
    ("TINYINT", "int"),
    ("SMALLINT", "int"),
    ("MEDIUMINT", "int"),
    ("INT UNSIGNED", "int"),
    ("BIGINT UNSIGNED", "int"),
    ("LONGTEXT", "str"),
    ("MEDIUMTEXT", "str"),
    ("ENUM", "str"),
    // MSSQL
    ("BIT", "bool"),
    ("NUMERIC", "float"),
    ("MONEY", "float"),
    ("SMALLMONEY", "float"),
    ("NCHAR", "str"),
    ("NVARCHAR", "str"),
    ("NTEXT", "str"),
    ("BINARY", "bytes"),
    ("VARBINARY", "bytes"),
    ("IMAGE", "bytes"),
    ("DATETIME2", "str"),
    ("SMALLDATETIME", "str"),
    ("TIME", "str"),
    ("DATETIMEOFFSET", "str"),
    ("ROWVERSION", "str"),
    ("UNIQUEIDENTIFIER", "str"),
    ("XML", "str"),
    ("SQL_VARIANT", "Any"),
    // Oracle
    ("NUMBER", "float"),
    ("VARCHAR2", "str"),
    ("NVARCHAR2", "str"),
    ("CLOB", "str"),
    ("NCLOB", "str"),
    ("LONG", "str"),
    ("RAW", "bytes"),
    ("ROWID", "str"),
    ("INTERVAL", "str"),
    (DEFAULT_KEY, FALLBACK_TARGET)
];

/// SQL type to target type lookup with a mandatory `DEFAULT` entry.
///
/// Lookups are total: unknown types resolve to the `DEFAULT` target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMapping {
    entries: HashMap<String, String>,
    default: String
}

impl TypeMapping {
    /// Build a mapping from validated entries
    ///
    /// # Errors
    ///
    /// Returns a config error when no `DEFAULT` entry is present.
    pub fn new(entries: HashMap<String, String>) -> AppResult<Self> {
        let entries: HashMap<String, String> = entries
            .into_iter()
            .map(|(k, v)| (normalize_sql_type(&k), v))
            .collect();
        let default = entries
            .get(DEFAULT_KEY)
            .cloned()
            .ok_or_else(|| config_error("Type mapping has no DEFAULT entry"))?;
        Ok(Self {
            entries,
            default
        })
    }

    /// Parse a YAML type mapping.
    ///
    /// Non-string values are dropped and a missing `DEFAULT` is added as
    /// `Any`, each with a warning.
    ///
    /// # Errors
    ///
    /// Returns a config error for invalid YAML or a document that is not a
    /// mapping.
    pub fn from_yaml(source: &str) -> AppResult<Self> {
        let document: serde_yaml::Value = serde_yaml::from_str(source)
            .map_err(|e| config_error(format!("Invalid type mapping: {}", e)))?;
        let serde_yaml::Value::Mapping(map) = document else {
            return Err(config_error("Type mapping must be a YAML mapping"));
        };
        let mut entries = HashMap::with_capacity(map.len());
        for (key, value) in map {
            match (key, value) {
                (serde_yaml::Value::String(k), serde_yaml::Value::String(v)) => {
                    entries.insert(k, v);
                }
                (key, _) => {
                    warn!(entry = ?key, "dropping type mapping entry without a string type");
                }
            }
        }
        if !entries.keys().any(|k| normalize_sql_type(k) == DEFAULT_KEY) {
            warn!(fallback = FALLBACK_TARGET, "type mapping has no DEFAULT entry, adding one");
            entries.insert(DEFAULT_KEY.to_owned(), FALLBACK_TARGET.to_owned());
        }
        Self::new(entries)
    }

    /// Load a YAML type mapping file
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed.
    pub fn load(path: &Path) -> AppResult<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| file_read_error(&path.display().to_string(), e))?;
        Self::from_yaml(&content)
    }

    /// Return a copy with `overrides` applied on top
    pub fn with_overrides(mut self, overrides: &HashMap<String, String>) -> Self {
        for (sql_type, target) in overrides {
            let key = normalize_sql_type(sql_type);
            if key == DEFAULT_KEY {
                self.default = target.clone();
            }
            self.entries.insert(key, target.clone());
        }
        self
    }

    /// Target type for a SQL type, `DEFAULT` when unknown
    pub fn target_type(&self, sql_type: &str) -> &str {
        self.entries
            .get(&normalize_sql_type(sql_type))
            .map_or(self.default.as_str(), String::as_str)
    }

    /// Target type of the `DEFAULT` entry
    pub fn default_type(&self) -> &str {
        &self.default
    }

    /// Whether the SQL type has its own entry
    pub fn contains(&self, sql_type: &str) -> bool {
        self.entries.contains_key(&normalize_sql_type(sql_type))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TypeMapping {
    fn default() -> Self {
        Self {
            entries: BUILTIN
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
            default: FALLBACK_TARGET.to_owned()
        }
    }
}
