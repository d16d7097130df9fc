//! # SQL Template Analyzer
//!
//! Turns annotated SQL template files into typed method descriptors for
//! data-access code generation.
//!
//! A template declares a class on its first line and one method per marker
//! line. For every method the analyzer decides whether the statement returns
//! rows and infers a target type for each bound parameter from the schema,
//! the SQL around the parameter, or its name.
//!
//! # Quick Start
//!
//! ```bash
//! # Describe every template under queries/ against the given schema
//! sql-template-analyzer generate queries/ --schema schema.sql
//!
//! # Write one JSON descriptor per template
//! sql-template-analyzer generate queries/ -s schema.sql -f json -o out/
//!
//! # Inspect how the schema and type mapping are understood
//! sql-template-analyzer schema schema.sql --types types.yaml
//! ```
//!
//! # Template Format
//!
//! ```sql
//! # UserRepository
//! # get_user
//! SELECT * FROM users WHERE id = :user_id;
//!
//! # rename_user
//! UPDATE users SET name = :new_name WHERE id = :user_id;
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded from (in order of precedence):
//!
//! 1. Command-line arguments
//! 2. Environment variables (`SQL_TEMPLATE_DIALECT`, `SQL_TEMPLATE_TYPES`)
//! 3. `.sql-template-analyzer.toml` in current directory
//! 4. `~/.config/sql-template-analyzer/config.toml`
//!
//! ## Example Configuration
//!
//! ```toml
//! [analysis]
//! dialect = "postgresql"
//!
//! [types]
//! file = "types.yaml"
//!
//! [[heuristics]]
//! pattern = "_uuid$"
//! sql_type = "UUID"
//! ```
//!
//! # Exit Codes
//!
//! - `0` - Every template was described
//! - `1` - At least one template failed, or setup failed
//!
//! # Output Formats
//!
//! - `text` - Human-readable colored output (default)
//! - `json` - Structured JSON for code generators
//! - `yaml` - YAML

use std::process;

use clap::Parser;
use sql_template_analyzer::{
    app::{GenerateParams, SchemaParams, run_generate, run_schema},
    cli::{Cli, Commands},
    config::Config,
    error::AppResult
};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);
    match run(cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn init_tracing(cli: &Cli) {
    let verbose = matches!(cli.command, Commands::Generate { verbose: true, .. });
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> AppResult<i32> {
    let config = Config::load()?;

    match cli.command {
        Commands::Generate {
            paths,
            schema,
            types,
            dialect,
            output_dir,
            output_format,
            dry_run,
            strict,
            no_color,
            verbose
        } => {
            let params = GenerateParams {
                paths,
                schema_paths: schema,
                types_path: types,
                dialect,
                output_dir,
                output_format,
                dry_run,
                strict,
                no_color,
                verbose
            };
            let result = run_generate(params, &config)?;
            for report in &result.reports {
                match (&report.result, &report.written) {
                    (Ok(_), Some(target)) => println!("Wrote {}", target.display()),
                    (Ok(rendered), None) => println!("{}", rendered),
                    (Err(e), _) => eprintln!("Error: {}: {}", report.path.display(), e)
                }
            }
            if result.failed() > 0 {
                eprintln!(
                    "{} of {} templates failed",
                    result.failed(),
                    result.reports.len()
                );
            }
            Ok(result.exit_code)
        }
        Commands::Schema {
            files,
            types,
            dialect,
            output_format,
            no_color
        } => {
            let params = SchemaParams {
                files,
                types_path: types,
                dialect,
                output_format,
                no_color
            };
            println!("{}", run_schema(params, &config)?);
            Ok(0)
        }
    }
}
