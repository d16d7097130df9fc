use std::sync::LazyLock;

use compact_str::CompactString;
use regex::Regex;
use serde::Deserialize;

use crate::error::{AppResult, config_error};

/// User-supplied name rule from configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HeuristicConfig {
    /// Regular expression matched case-insensitively against the parameter
    /// name
    pub pattern:  String,
    /// SQL type assigned on match, mapped through the type mapping
    pub sql_type: String
}

/// Compiled name rule
#[derive(Debug, Clone)]
pub struct HeuristicRule {
    pattern:  Regex,
    sql_type: CompactString
}

impl HeuristicRule {
    /// Compile a rule. The pattern is matched case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns a config error for an invalid regular expression.
    pub fn new(pattern: &str, sql_type: &str) -> AppResult<Self> {
        let pattern = Regex::new(&format!("(?i){}", pattern))
            .map_err(|e| config_error(format!("Invalid heuristic pattern '{}': {}", pattern, e)))?;
        Ok(Self {
            pattern,
            sql_type: sql_type.trim().to_uppercase().into()
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }

    pub fn sql_type(&self) -> &str {
        &self.sql_type
    }
}

fn builtin(pattern: &str, sql_type: &str) -> HeuristicRule {
    HeuristicRule {
        pattern:  Regex::new(&format!("(?i){}", pattern)).expect("valid regex"),
        sql_type: sql_type.into()
    }
}

/// Built-in rules. Order matters: the first match wins.
static BUILTIN_RULES: LazyLock<Vec<HeuristicRule>> = LazyLock::new(|| {
    vec![
        builtin(r"^(?:id|.*_id)$", "INTEGER"),
        builtin(r"(?:^|_)(?:count|quantity|threshold)$", "INTEGER"),
        builtin(
            r"(?:^|_)(?:price|amount|salary|budget|cost|rate|total)$",
            "DECIMAL"
        ),
        builtin(
            r"(?:^|_)(?:term|name|email|code|title|label|description|text|content|search|query)$",
            "TEXT"
        ),
        builtin(r"^(?:is|has)_|(?:^|_)(?:flag|active|enabled)$", "BOOLEAN"),
        builtin(r"(?:^|_)date$|_at$", "TIMESTAMP"),
    ]
});

/// Ordered parameter-name rules resolving to SQL type names.
///
/// ```
/// use sql_template_analyzer::infer::NameHeuristics;
///
/// let heuristics = NameHeuristics::default();
/// assert_eq!(heuristics.resolve("user_id"), Some("INTEGER"));
/// assert_eq!(heuristics.resolve("min_price"), Some("DECIMAL"));
/// assert_eq!(heuristics.resolve("is_active"), Some("BOOLEAN"));
/// assert_eq!(heuristics.resolve("payload"), None);
/// ```
#[derive(Debug, Clone)]
pub struct NameHeuristics {
    rules: Vec<HeuristicRule>
}

impl NameHeuristics {
    /// Built-in rules preceded by `custom` rules, which keep their order
    ///
    /// # Errors
    ///
    /// Returns a config error when a custom pattern does not compile.
    pub fn with_rules(custom: &[HeuristicConfig]) -> AppResult<Self> {
        let mut rules = custom
            .iter()
            .map(|rule| HeuristicRule::new(&rule.pattern, &rule.sql_type))
            .collect::<AppResult<Vec<_>>>()?;
        rules.extend(BUILTIN_RULES.iter().cloned());
        Ok(Self {
            rules
        })
    }

    /// SQL type of the first rule matching `name`
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.matches(name))
            .map(HeuristicRule::sql_type)
    }

    pub fn rules(&self) -> &[HeuristicRule] {
        &self.rules
    }
}

impl Default for NameHeuristics {
    fn default() -> Self {
        Self {
            rules: BUILTIN_RULES.clone()
        }
    }
}
