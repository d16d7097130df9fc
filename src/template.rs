//! SQL template files.
//!
//! A template names a class on its first line and separates methods with
//! marker lines:
//!
//! ```sql
//! # UserRepository
//! # get_user
//! SELECT * FROM users WHERE id = :user_id;
//!
//! # deactivate
//! UPDATE users SET active = FALSE WHERE id = :user_id;
//! ```
//!
//! # Example
//!
//! ```
//! use sql_template_analyzer::{dialect::SqlDialect, template::TemplateFile};
//!
//! let source = "# UserRepository\n# get_user\nSELECT * FROM users WHERE id = :user_id;\n";
//! let template = TemplateFile::parse(source, SqlDialect::Generic).unwrap();
//!
//! assert_eq!(template.class_name, "UserRepository");
//! assert_eq!(template.blocks[0].method_name, "get_user");
//! assert_eq!(template.blocks[0].sql_text, "SELECT * FROM users WHERE id = :user_id");
//! assert_eq!(template.blocks[0].parameter_names, vec!["user_id"]);
//! ```

use std::{fs, path::Path, sync::LazyLock};

use regex::Regex;
use serde::Serialize;
use tracing::warn;

use crate::{
    dialect::SqlDialect,
    error::{AppResult, file_read_error, template_error},
    query::parameter_names,
    token::tokenize
};

static METHOD_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#\s*(\w+)\s*$").expect("valid regex"));

/// One method of a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SqlBlock {
    pub method_name:     String,
    pub sql_text:        String,
    /// Bind markers in order of first appearance
    pub parameter_names: Vec<String>
}

/// Parsed template: class name plus its methods in file order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateFile {
    pub class_name: String,
    pub blocks:     Vec<SqlBlock>
}

impl TemplateFile {
    /// Read and parse a template file
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or is not a valid
    /// template.
    pub fn load(path: &Path, dialect: SqlDialect) -> AppResult<Self> {
        let source =
            fs::read_to_string(path).map_err(|e| file_read_error(&path.display().to_string(), e))?;
        Self::parse_from(&source, &path.display().to_string(), dialect)
    }

    /// Parse template text.
    ///
    /// Blocks with no SQL are skipped; a method defined twice keeps its
    /// later SQL at the position of the first definition.
    ///
    /// # Errors
    ///
    /// Returns a template error when the first line is not `# ClassName`.
    pub fn parse(source: &str, dialect: SqlDialect) -> AppResult<Self> {
        Self::parse_from(source, "<template>", dialect)
    }

    fn parse_from(source: &str, origin: &str, dialect: SqlDialect) -> AppResult<Self> {
        let mut lines = source.lines();
        let class_name = class_name(lines.next().unwrap_or_default(), origin)?;

        let mut blocks: Vec<SqlBlock> = Vec::new();
        let mut current: Option<(String, Vec<&str>)> = None;
        for line in lines {
            if let Some(captures) = METHOD_MARKER.captures(line.trim()) {
                if let Some((name, body)) = current.take() {
                    push_block(&mut blocks, name, &body, dialect);
                }
                current = Some((captures[1].to_owned(), Vec::new()));
            } else if let Some((_, body)) = current.as_mut() {
                body.push(line);
            }
        }
        if let Some((name, body)) = current {
            push_block(&mut blocks, name, &body, dialect);
        }

        Ok(Self {
            class_name,
            blocks
        })
    }
}

fn class_name(line: &str, origin: &str) -> AppResult<String> {
    let line = line.trim();
    if !line.starts_with('#') {
        return Err(template_error(
            origin,
            "first line must be a class comment starting with '#'"
        ));
    }
    let Some(name) = line.strip_prefix("# ") else {
        return Err(template_error(
            origin,
            format!("class comment must start with '# ': {}", line)
        ));
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(template_error(origin, "class name cannot be empty"));
    }
    Ok(name.to_owned())
}

fn push_block(blocks: &mut Vec<SqlBlock>, method_name: String, body: &[&str], dialect: SqlDialect) {
    let text = body.join("\n");
    let text = text.trim();
    let sql_text = text.strip_suffix(';').unwrap_or(text).trim_end();
    if sql_text.is_empty() {
        return;
    }
    let parameter_names = tokenize(sql_text, dialect)
        .map(|stream| parameter_names(&stream))
        .unwrap_or_default();
    let block = SqlBlock {
        method_name,
        sql_text: sql_text.to_owned(),
        parameter_names
    };
    match blocks.iter_mut().find(|b| b.method_name == block.method_name) {
        Some(existing) => {
            warn!(method = %block.method_name, "method defined more than once, keeping the later SQL");
            *existing = block;
        }
        None => blocks.push(block)
    }
}
