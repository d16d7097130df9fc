use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// SQL Template Analyzer - Describe annotated SQL templates for code
/// generation
#[derive(Parser, Debug)]
#[command(name = "sql-template-analyzer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze SQL template files and emit method descriptors
    Generate {
        /// SQL template files or directories (searched recursively for *.sql)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Schema file with CREATE TABLE statements (repeatable); *.schema
        /// files are discovered when omitted
        #[arg(short, long)]
        schema: Vec<PathBuf>,

        /// YAML type mapping (SQL type -> target type)
        #[arg(short, long, env = "SQL_TEMPLATE_TYPES")]
        types: Option<PathBuf>,

        /// SQL dialect for lexing
        #[arg(long, value_enum)]
        dialect: Option<Dialect>,

        /// Directory to write one descriptor file per template into
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        output_format: Format,

        /// Analyze and print, but write no files
        #[arg(long)]
        dry_run: bool,

        /// Treat skipped inputs as errors
        #[arg(long)]
        strict: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Show statement kinds, inference sources and SQL text
        #[arg(short, long)]
        verbose: bool
    },
    /// Parse schema files and print the resulting catalog
    Schema {
        /// Schema files with CREATE TABLE statements
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// YAML type mapping (SQL type -> target type)
        #[arg(short, long, env = "SQL_TEMPLATE_TYPES")]
        types: Option<PathBuf>,

        /// SQL dialect for lexing
        #[arg(long, value_enum)]
        dialect: Option<Dialect>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        output_format: Format,

        /// Disable colored output
        #[arg(long)]
        no_color: bool
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Dialect {
    Generic,
    Mysql,
    Postgresql,
    Sqlite,
    Mssql,
    Clickhouse
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    Text,
    Json,
    Yaml
}
