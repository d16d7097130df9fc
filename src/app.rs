//! Application logic for the SQL Template Analyzer CLI.
//!
//! This module contains the core application logic separated from the main
//! entry point to enable testing.

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf}
};

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::{
    analyzer::{TemplateAnalyzer, TemplateDescriptor},
    cli::{Dialect, Format},
    config::Config,
    dialect::SqlDialect,
    error::{AppError, AppResult, config_error, file_read_error, file_write_error, schema_parse_error},
    output::{OutputFormat, OutputOptions, format_catalog, format_descriptor, output_file_name},
    schema::{CatalogBuilder, SchemaCatalog, TypeMapping},
    template::TemplateFile
};

/// Extension of SQL template files
pub const TEMPLATE_EXTENSION: &str = "sql";

/// Extension of discoverable schema files
pub const SCHEMA_EXTENSION: &str = "schema";

/// Parameters for the generate command
#[derive(Debug, Clone)]
pub struct GenerateParams {
    pub paths:         Vec<PathBuf>,
    pub schema_paths:  Vec<PathBuf>,
    pub types_path:    Option<PathBuf>,
    pub dialect:       Option<Dialect>,
    pub output_dir:    Option<PathBuf>,
    pub output_format: Format,
    pub dry_run:       bool,
    pub strict:        bool,
    pub no_color:      bool,
    pub verbose:       bool
}

/// Parameters for the schema command
#[derive(Debug, Clone)]
pub struct SchemaParams {
    pub files:         Vec<PathBuf>,
    pub types_path:    Option<PathBuf>,
    pub dialect:       Option<Dialect>,
    pub output_format: Format,
    pub no_color:      bool
}

/// Outcome of one template file
#[derive(Debug)]
pub struct FileReport {
    pub path:    PathBuf,
    /// Rendered descriptor, or the failure for this file
    pub result:  Result<String, AppError>,
    /// Where the descriptor was written, if it was
    pub written: Option<PathBuf>
}

/// Result of the generate command
#[derive(Debug)]
pub struct GenerateResult {
    pub exit_code: i32,
    pub reports:   Vec<FileReport>
}

impl GenerateResult {
    pub fn failed(&self) -> usize {
        self.reports.iter().filter(|r| r.result.is_err()).count()
    }
}

/// Convert CLI dialect to internal SqlDialect
pub fn convert_dialect(dialect: Dialect) -> SqlDialect {
    match dialect {
        Dialect::Generic => SqlDialect::Generic,
        Dialect::Mysql => SqlDialect::MySQL,
        Dialect::Postgresql => SqlDialect::PostgreSQL,
        Dialect::Sqlite => SqlDialect::SQLite,
        Dialect::Mssql => SqlDialect::MsSql,
        Dialect::Clickhouse => SqlDialect::ClickHouse
    }
}

/// Convert CLI format to internal OutputFormat
pub fn convert_format(format: Format) -> OutputFormat {
    match format {
        Format::Text => OutputFormat::Text,
        Format::Json => OutputFormat::Json,
        Format::Yaml => OutputFormat::Yaml
    }
}

/// Create output options from parameters
pub fn create_output_options(format: Format, no_color: bool, verbose: bool) -> OutputOptions {
    OutputOptions {
        format: convert_format(format),
        colored: !no_color,
        verbose
    }
}

/// Exit code for a batch: 1 when any file failed
pub fn calculate_exit_code(reports: &[FileReport]) -> i32 {
    if reports.iter().any(|r| r.result.is_err()) {
        1
    } else {
        0
    }
}

/// Expand files and directories into the sorted list of `*.sql` templates.
///
/// Non-`.sql` files and directories without templates are skipped with a
/// warning, or rejected when `strict` is set.
///
/// # Errors
///
/// Returns an error for missing paths, unreadable directories, skipped
/// inputs in strict mode, or when no template is found at all.
pub fn collect_sql_files(paths: &[PathBuf], strict: bool) -> AppResult<Vec<PathBuf>> {
    let mut files = BTreeSet::new();
    for path in paths {
        if path.is_dir() {
            let found = walk_dir(path, TEMPLATE_EXTENSION)?;
            if found.is_empty() {
                skip_input(path, "directory contains no .sql files", strict)?;
            }
            files.extend(found);
        } else if path.is_file() {
            if has_extension(path, TEMPLATE_EXTENSION) {
                files.insert(path.clone());
            } else {
                skip_input(path, "not a .sql file", strict)?;
            }
        } else {
            return Err(config_error(format!("Path not found: {}", path.display())));
        }
    }
    if files.is_empty() {
        return Err(config_error("No SQL template files found"));
    }
    Ok(files.into_iter().collect())
}

fn skip_input(path: &Path, reason: &str, strict: bool) -> AppResult<()> {
    if strict {
        return Err(config_error(format!("{}: {}", path.display(), reason)));
    }
    warn!(path = %path.display(), reason, "skipping input");
    Ok(())
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

fn walk_dir(dir: &Path, extension: &str) -> AppResult<Vec<PathBuf>> {
    let mut found = Vec::new();
    let entries =
        fs::read_dir(dir).map_err(|e| file_read_error(&dir.display().to_string(), e))?;
    for entry in entries {
        let path = entry
            .map_err(|e| file_read_error(&dir.display().to_string(), e))?
            .path();
        if path.is_dir() {
            found.extend(walk_dir(&path, extension)?);
        } else if has_extension(&path, extension) {
            found.push(path);
        }
    }
    Ok(found)
}

/// `*.schema` files in `base` and in the directories of `sql_files`, sorted
/// and without duplicates
pub fn discover_schema_files(base: &Path, sql_files: &[PathBuf]) -> Vec<PathBuf> {
    let mut dirs = BTreeSet::new();
    dirs.insert(canonical(base));
    for file in sql_files {
        match file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => dirs.insert(canonical(parent)),
            _ => dirs.insert(canonical(base))
        };
    }
    let mut schemas = BTreeSet::new();
    for dir in dirs {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        schemas.extend(
            entries
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .filter(|path| path.is_file() && has_extension(path, SCHEMA_EXTENSION))
        );
    }
    schemas.into_iter().collect()
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Type mapping from the CLI path, else from configuration
///
/// # Errors
///
/// Returns an error when a mapping file cannot be read or parsed.
pub fn resolve_type_mapping(types_path: Option<&Path>, config: &Config) -> AppResult<TypeMapping> {
    match types_path {
        Some(path) => Ok(TypeMapping::load(path)?.with_overrides(&config.types.mapping)),
        None => config.type_mapping()
    }
}

/// Merge all schema files into one catalog
///
/// # Errors
///
/// Returns an error naming the file for unreadable or malformed schemas.
pub fn build_catalog(
    files: &[PathBuf],
    mapping: TypeMapping,
    dialect: SqlDialect
) -> AppResult<SchemaCatalog> {
    let mut builder = CatalogBuilder::new(dialect);
    for file in files {
        let name = file.display().to_string();
        let script = fs::read_to_string(file).map_err(|e| file_read_error(&name, e))?;
        builder
            .add_script(&script)
            .map_err(|e| schema_parse_error(&name, e))?;
    }
    info!(files = files.len(), tables = builder.len(), "schema loaded");
    Ok(builder.build(mapping))
}

/// Run the generate command
///
/// # Errors
///
/// Returns an error for setup failures (inputs, configuration, schema).
/// Per-file failures are reported in [`GenerateResult::reports`].
pub fn run_generate(params: GenerateParams, config: &Config) -> AppResult<GenerateResult> {
    let dialect = params
        .dialect
        .map_or(config.analysis.dialect, convert_dialect);
    let files = collect_sql_files(&params.paths, params.strict)?;

    let schema_files = if params.schema_paths.is_empty() {
        let discovered = discover_schema_files(Path::new("."), &files);
        if discovered.is_empty() {
            return Err(config_error(
                "No schema files found (pass --schema or add *.schema files)"
            ));
        }
        discovered
    } else {
        params.schema_paths.clone()
    };

    let mapping = resolve_type_mapping(params.types_path.as_deref(), config)?;
    let catalog = build_catalog(&schema_files, mapping, dialect)?;
    let analyzer = TemplateAnalyzer::new(&catalog)
        .with_dialect(dialect)
        .with_heuristics(config.name_heuristics()?)
        .with_large_statement_bytes(config.analysis.large_statement_bytes)
        .with_cache_size(config.analysis.cache_size);

    let output_opts = create_output_options(params.output_format, params.no_color, params.verbose);
    let write_dir = params.output_dir.as_deref().filter(|_| !params.dry_run);
    if let Some(dir) = write_dir {
        fs::create_dir_all(dir).map_err(|e| file_write_error(&dir.display().to_string(), e))?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{bar:30}] {pos}/{len} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message("Analyzing templates...");

    let reports: Vec<FileReport> = files
        .par_iter()
        .map(|path| {
            let report = process_file(path, &analyzer, &output_opts, write_dir);
            pb.inc(1);
            report
        })
        .collect();
    pb.finish_and_clear();

    Ok(GenerateResult {
        exit_code: calculate_exit_code(&reports),
        reports
    })
}

fn process_file(
    path: &Path,
    analyzer: &TemplateAnalyzer<'_>,
    opts: &OutputOptions,
    write_dir: Option<&Path>
) -> FileReport {
    let mut written = None;
    let result = describe_file(path, analyzer).and_then(|descriptor| {
        let rendered = format_descriptor(&descriptor, opts);
        if let Some(dir) = write_dir {
            let target = dir.join(output_file_name(&descriptor.class_name, opts.format));
            fs::write(&target, &rendered)
                .map_err(|e| file_write_error(&target.display().to_string(), e))?;
            written = Some(target);
        }
        Ok(rendered)
    });
    FileReport {
        path: path.to_path_buf(),
        result,
        written
    }
}

/// Frame and analyze one template file
///
/// # Errors
///
/// Returns an error when the file cannot be read, is not a valid template,
/// or contains an empty statement.
pub fn describe_file(path: &Path, analyzer: &TemplateAnalyzer<'_>) -> AppResult<TemplateDescriptor> {
    let template = TemplateFile::load(path, analyzer.dialect())?;
    Ok(analyzer.analyze_template(&template, Some(path))?)
}

/// Run the schema command and return the rendered catalog
///
/// # Errors
///
/// Returns an error for unreadable or malformed schema or mapping files.
pub fn run_schema(params: SchemaParams, config: &Config) -> AppResult<String> {
    let dialect = params
        .dialect
        .map_or(config.analysis.dialect, convert_dialect);
    let mapping = resolve_type_mapping(params.types_path.as_deref(), config)?;
    let catalog = build_catalog(&params.files, mapping, dialect)?;
    let opts = create_output_options(params.output_format, params.no_color, false);
    Ok(format_catalog(&catalog, &opts))
}
