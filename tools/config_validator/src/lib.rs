pub mod schema;
pub mod validation;

use schema::Config;
use serde_yaml::Error as YamlError;
use thiserror::Error;

pub use validation::{LABEL_BUDGET, Location, Severity, ValidationIssue, validate_config};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Parse(#[from] YamlError),
}

pub fn parse_config_str(src: &str) -> Result<Config, ConfigError> {
    let config = serde_yaml::from_str::<Config>(src)?;
    Ok(config)
}

/// Formats an issue the way both command-line tools print it.
pub fn format_issue(issue: &ValidationIssue) -> String {
    let level = match issue.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "info",
    };
    match issue.location {
        Some(loc) => format!(
            "- [{}] {}: {} (line {}, column {})",
            level, issue.path, issue.message, loc.line, loc.column
        ),
        None => format!("- [{}] {}: {}", level, issue.path, issue.message),
    }
}
