use std::path::PathBuf;

use binding_format::BindingTable;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{load_from_path, Diagnostic, DiagnosticSeverity, LoadError, LoadedProfile};

#[derive(Debug)]
pub struct AppState {
    profile_path: PathBuf,
    pub loaded: LoadedProfile,
}

#[derive(Debug, Error)]
pub enum AppStateError {
    #[error("Failed to load profile: {0}")]
    Load(#[from] LoadError),
    #[error("Profile binds no switches")]
    NoSwitches,
}

impl AppState {
    pub fn initialize(profile_path: impl Into<PathBuf>) -> Result<Self, AppStateError> {
        let path = profile_path.into();
        let loaded = load_from_path(&path)?;
        if loaded.table.switches.is_empty() {
            return Err(AppStateError::NoSwitches);
        }
        for diag in &loaded.diagnostics {
            match diag.severity {
                DiagnosticSeverity::Warning => warn!(path = %diag.path, "{}", diag.message),
                _ => info!(path = %diag.path, "{}", diag.message),
            }
        }
        info!(
            profile = %path.display(),
            switches = loaded.table.switches.len(),
            actions = loaded.table.actions.len(),
            source_hash = format_args!("{:016x}", loaded.table.header.source_hash),
            "profile loaded"
        );
        Ok(Self {
            profile_path: path,
            loaded,
        })
    }

    pub fn profile_path(&self) -> &PathBuf {
        &self.profile_path
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.loaded.diagnostics
    }

    pub fn table(&self) -> &BindingTable {
        &self.loaded.table
    }
}
