use std::fs;
use std::path::{Path, PathBuf};

use binding_builder::{
    build_from_path as builder_build_from_path, build_from_str as builder_build_from_str,
    load_table, BuildError,
};
use binding_format::BindingTable;
use config_validator::{Location, Severity, ValidationIssue};
use thiserror::Error;

/// Extension of compiled binding tables written by `binding_builder`.
pub const COMPILED_EXTENSION: &str = "bindings";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
    Info,
}

impl From<Severity> for DiagnosticSeverity {
    fn from(value: Severity) -> Self {
        match value {
            Severity::Error => DiagnosticSeverity::Error,
            Severity::Warning => DiagnosticSeverity::Warning,
            Severity::Info => DiagnosticSeverity::Info,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub path: String,
    pub message: String,
    pub location: Option<Location>,
    pub severity: DiagnosticSeverity,
}

#[derive(Debug, Clone)]
pub struct LoadedProfile {
    pub path: Option<PathBuf>,
    pub table: BindingTable,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error while reading profile: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation errors prevented loading")]
    Validation(Vec<Diagnostic>),
    #[error("Failed to build binding table: {0}")]
    Build(BuildError),
}

impl From<BuildError> for LoadError {
    fn from(value: BuildError) -> Self {
        match value {
            BuildError::Validation(issues) => LoadError::Validation(convert_issues(issues)),
            BuildError::Io(err) => LoadError::Io(err),
            other => LoadError::Build(other),
        }
    }
}

/// Loads a YAML profile, or a compiled table when the extension is `.bindings`.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<LoadedProfile, LoadError> {
    let path_ref = path.as_ref();
    let compiled = path_ref
        .extension()
        .is_some_and(|ext| ext == COMPILED_EXTENSION);

    let mut loaded = if compiled {
        let bytes = fs::read(path_ref)?;
        LoadedProfile {
            path: None,
            table: load_table(&bytes)?,
            diagnostics: Vec::new(),
        }
    } else {
        let (output, _bytes) = builder_build_from_path(path_ref)?;
        LoadedProfile {
            path: None,
            table: output.table,
            diagnostics: convert_issues(output.diagnostics),
        }
    };
    loaded.path = Some(path_ref.to_path_buf());
    Ok(loaded)
}

pub fn load_from_str(content: &str) -> Result<LoadedProfile, LoadError> {
    let output = builder_build_from_str(content)?;
    Ok(LoadedProfile {
        path: None,
        table: output.table,
        diagnostics: convert_issues(output.diagnostics),
    })
}

fn convert_issues(issues: Vec<ValidationIssue>) -> Vec<Diagnostic> {
    issues.into_iter().map(convert_issue).collect()
}

fn convert_issue(issue: ValidationIssue) -> Diagnostic {
    Diagnostic {
        path: issue.path,
        message: issue.message,
        location: issue.location,
        severity: DiagnosticSeverity::from(issue.severity),
    }
}
