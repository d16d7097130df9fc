use std::str::FromStr;

use serde::Deserialize;
use sqlparser::dialect::{
    ClickHouseDialect, Dialect, GenericDialect, MsSqlDialect, MySqlDialect, PostgreSqlDialect,
    SQLiteDialect
};

/// SQL dialect used for lexing statements and schema sources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum SqlDialect {
    #[default]
    Generic,
    MySQL,
    #[serde(alias = "postgres")]
    PostgreSQL,
    SQLite,
    #[serde(alias = "sqlserver")]
    MsSql,
    ClickHouse
}

impl SqlDialect {
    /// Convert to sqlparser dialect for lexing
    pub fn into_parser_dialect(self) -> Box<dyn Dialect> {
        match self {
            Self::Generic => Box::new(GenericDialect {}),
            Self::MySQL => Box::new(MySqlDialect {}),
            Self::PostgreSQL => Box::new(PostgreSqlDialect {}),
            Self::SQLite => Box::new(SQLiteDialect {}),
            Self::MsSql => Box::new(MsSqlDialect {}),
            Self::ClickHouse => Box::new(ClickHouseDialect {})
        }
    }
}

impl FromStr for SqlDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generic" => Ok(Self::Generic),
            "mysql" => Ok(Self::MySQL),
            "postgresql" | "postgres" => Ok(Self::PostgreSQL),
            "sqlite" => Ok(Self::SQLite),
            "mssql" | "sqlserver" => Ok(Self::MsSql),
            "clickhouse" => Ok(Self::ClickHouse),
            other => Err(format!("unknown SQL dialect '{}'", other))
        }
    }
}
