use colored::Colorize;

use crate::{
    analyzer::{MethodDescriptor, TemplateDescriptor},
    infer::BindingSource,
    query::ExecutionKind,
    schema::SchemaCatalog
};

/// Output format for descriptors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml
}

impl OutputFormat {
    /// File extension used when descriptors are written to a directory
    pub fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Json => "json",
            Self::Yaml => "yaml"
        }
    }
}

/// Output options
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format:  OutputFormat,
    pub colored: bool,
    pub verbose: bool
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format:  OutputFormat::Text,
            colored: true,
            verbose: false
        }
    }
}

/// Render a template descriptor in the requested format
pub fn format_descriptor(descriptor: &TemplateDescriptor, opts: &OutputOptions) -> String {
    match opts.format {
        OutputFormat::Json => serde_json::to_string_pretty(descriptor).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(descriptor).unwrap_or_default(),
        OutputFormat::Text => format_text_descriptor(descriptor, opts)
    }
}

fn format_text_descriptor(descriptor: &TemplateDescriptor, opts: &OutputOptions) -> String {
    let header = format!("class {}", descriptor.class_name);
    let mut output = if opts.colored {
        header.bold().to_string()
    } else {
        header
    };
    if let Some(source) = &descriptor.source {
        output.push_str(&format!(" ({})", source));
    }
    output.push_str("\n\n");
    for method in &descriptor.methods {
        output.push_str(&format_text_method(method, opts));
        output.push('\n');
    }
    output
}

fn format_text_method(method: &MethodDescriptor, opts: &OutputOptions) -> String {
    let kind = method.execution_kind.to_string();
    let kind = match (opts.colored, method.execution_kind) {
        (false, _) => kind,
        (true, ExecutionKind::RowReturning) => kind.green().to_string(),
        (true, ExecutionKind::NonRowReturning) => kind.yellow().to_string()
    };
    let params = method
        .parameters
        .iter()
        .map(|p| format!("{}: {}", p.name, p.inferred_type))
        .collect::<Vec<_>>()
        .join(", ");
    let signature = format!("{}({})", method.name, params);
    let signature = if opts.colored {
        signature.cyan().bold().to_string()
    } else {
        signature
    };

    let mut text = format!("  {} [{}]", signature, kind);
    if method.has_returning {
        text.push_str(" RETURNING");
    }
    text.push('\n');

    if opts.verbose {
        text.push_str(&format!("    Statement: {}\n", method.statement_kind));
        for param in &method.parameters {
            text.push_str(&format!(
                "    :{} -> {} ({})\n",
                param.name,
                param.inferred_type,
                source_label(param.source)
            ));
        }
        for line in method.sql_text.lines() {
            let line = format!("    | {}", line);
            if opts.colored {
                text.push_str(&line.dimmed().to_string());
            } else {
                text.push_str(&line);
            }
            text.push('\n');
        }
    }
    text
}

fn source_label(source: BindingSource) -> &'static str {
    match source {
        BindingSource::ExactMatch => "exact match",
        BindingSource::SqlContext => "sql context",
        BindingSource::NameHeuristic => "name heuristic",
        BindingSource::Default => "default"
    }
}

/// Render a schema catalog
pub fn format_catalog(catalog: &SchemaCatalog, opts: &OutputOptions) -> String {
    match opts.format {
        OutputFormat::Json => serde_json::to_string_pretty(&catalog_rows(catalog)).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(&catalog_rows(catalog)).unwrap_or_default(),
        OutputFormat::Text if opts.colored => catalog.to_summary().bold().to_string(),
        OutputFormat::Text => catalog.to_summary()
    }
}

#[derive(serde::Serialize)]
struct CatalogRow<'a> {
    table:       &'a str,
    column:      &'a str,
    sql_type:    &'a str,
    target_type: &'a str
}

fn catalog_rows(catalog: &SchemaCatalog) -> Vec<CatalogRow<'_>> {
    catalog
        .tables()
        .flat_map(|table| {
            table.columns.values().map(move |column| CatalogRow {
                table:       &table.table_name,
                column:      &column.name,
                sql_type:    &column.sql_type,
                target_type: catalog.target_type(&column.sql_type)
            })
        })
        .collect()
}

/// `UserRepository` -> `user_repository`, `HTTPClient` -> `http_client`
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1);
            let boundary = prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit())
                || (prev.is_some_and(char::is_uppercase) && next.is_some_and(|n| n.is_lowercase()));
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else if c == '-' || c.is_whitespace() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Output file name for a descriptor
pub fn output_file_name(class_name: &str, format: OutputFormat) -> String {
    format!("{}.{}", snake_case(class_name), format.extension())
}
