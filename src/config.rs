//! Configuration loading and management.
//!
//! Configuration is loaded from multiple sources with the following precedence
//! (highest to lowest):
//!
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. `.sql-template-analyzer.toml` in current directory
//! 4. `~/.config/sql-template-analyzer/config.toml`
//! 5. Default values
//!
//! # Configuration File Format
//!
//! ```toml
//! [analysis]
//! dialect = "postgresql"          # generic, mysql, postgresql, sqlite, mssql, clickhouse
//! large_statement_bytes = 65536   # statements above this size are logged
//! cache_size = 1000               # memoised parameter bindings per run
//!
//! [types]
//! file = "types.yaml"             # YAML map of SQL type -> target type
//!
//! [types.mapping]                 # inline overrides, applied last
//! UUID = "UUID"
//!
//! [[heuristics]]                  # checked before the built-in name rules
//! pattern = "_uuid$"
//! sql_type = "UUID"
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `SQL_TEMPLATE_DIALECT` | SQL dialect |
//! | `SQL_TEMPLATE_TYPES` | Path of a YAML type mapping |

use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf}
};

use serde::Deserialize;

use crate::{
    analyzer::DEFAULT_LARGE_STATEMENT_BYTES,
    cache::DEFAULT_CACHE_SIZE,
    dialect::SqlDialect,
    error::{AppResult, config_error},
    infer::{HeuristicConfig, NameHeuristics},
    schema::TypeMapping
};

/// Name of the per-project configuration file
pub const LOCAL_CONFIG_FILE: &str = ".sql-template-analyzer.toml";

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub analysis:   AnalysisConfig,
    #[serde(default)]
    pub types:      TypesConfig,
    #[serde(default)]
    pub heuristics: Vec<HeuristicConfig>
}

/// Analysis settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub dialect:               SqlDialect,
    pub large_statement_bytes: usize,
    pub cache_size:            usize
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            dialect:               SqlDialect::Generic,
            large_statement_bytes: DEFAULT_LARGE_STATEMENT_BYTES,
            cache_size:            DEFAULT_CACHE_SIZE
        }
    }
}

/// Type mapping sources
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TypesConfig {
    /// YAML type mapping replacing the built-in one
    pub file:    Option<PathBuf>,
    /// Overrides applied on top of the file or built-in mapping
    #[serde(default)]
    pub mapping: HashMap<String, String>
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. Config file in current directory (.sql-template-analyzer.toml)
    /// 3. Config file in home directory
    ///    (~/.config/sql-template-analyzer/config.toml)
    /// 4. Default values
    ///
    /// # Errors
    ///
    /// Returns a config error for unreadable or invalid files and unknown
    /// dialect names.
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        // Try to load from home directory config
        if let Some(home) = env::var_os("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("sql-template-analyzer")
                .join("config.toml");

            if home_config.exists() {
                config = Self::from_file(&home_config)?;
            }
        }

        // Current directory config overrides home config
        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            config = Self::from_file(&local_config)?;
        }

        // Override with environment variables
        if let Ok(dialect) = env::var("SQL_TEMPLATE_DIALECT") {
            config.analysis.dialect = dialect.parse().map_err(config_error)?;
        }

        if let Ok(types) = env::var("SQL_TEMPLATE_TYPES") {
            config.types.file = Some(PathBuf::from(types));
        }

        Ok(config)
    }

    /// Read one TOML file. A relative `types.file` is resolved against the
    /// file's directory.
    ///
    /// # Errors
    ///
    /// Returns a config error when the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| config_error(format!("Failed to read config file: {}", e)))?;
        let mut config = Self::from_toml(&content)?;
        if let (Some(file), Some(dir)) = (config.types.file.as_mut(), path.parent())
            && file.is_relative()
        {
            *file = dir.join(&*file);
        }
        Ok(config)
    }

    /// Parse TOML configuration text
    ///
    /// # Errors
    ///
    /// Returns a config error for invalid TOML or unknown keys' values.
    pub fn from_toml(content: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|e| config_error(format!("Invalid config file: {}", e)))
    }

    /// Type mapping from `types.file` (or the built-in one) with inline
    /// overrides applied
    ///
    /// # Errors
    ///
    /// Returns an error when the mapping file cannot be read or parsed.
    pub fn type_mapping(&self) -> AppResult<TypeMapping> {
        let base = match &self.types.file {
            Some(path) => TypeMapping::load(path)?,
            None => TypeMapping::default()
        };
        Ok(base.with_overrides(&self.types.mapping))
    }

    /// Built-in name heuristics preceded by the configured ones
    ///
    /// # Errors
    ///
    /// Returns a config error for an invalid pattern.
    pub fn name_heuristics(&self) -> AppResult<NameHeuristics> {
        NameHeuristics::with_rules(&self.heuristics)
    }
}
