//! Ralph Board CLI library.
//!
//! This crate provides the command-line interface and the terminal dashboard
//! for watching a Ralph loop.

pub mod cli;
pub mod commands;
pub mod error;
pub mod tui;

use std::path::{Path, PathBuf};

use ralph_core::config::{expand_project_path, settings_file_in};
use ralph_core::ProjectFiles;
use ralph_models::Settings;
use ralph_persistence::SettingsStore;

use crate::error::{CliError, Result};

/// Everything a command needs to find its files.
#[derive(Debug, Clone)]
pub struct Context {
    /// Base state directory.
    pub state_dir: PathBuf,
    /// Persisted settings.
    pub store: SettingsStore,
    /// Project root given on the command line.
    pub project_override: Option<PathBuf>,
}

impl Context {
    /// Create a context for the given state directory.
    pub fn new(state_dir: impl Into<PathBuf>, project_override: Option<PathBuf>) -> Self {
        let state_dir = state_dir.into();
        let store = SettingsStore::new(settings_file_in(&state_dir));
        Self {
            state_dir,
            store,
            project_override,
        }
    }

    /// Load saved settings.
    pub fn settings(&self) -> Result<Settings> {
        Ok(self.store.load()?)
    }

    /// The project to work on: the command-line override, else the saved path.
    pub fn project(&self, settings: &Settings) -> Result<ProjectFiles> {
        resolve_project(self.project_override.as_deref(), settings).ok_or(CliError::NoProject)
    }
}

/// Pick the project root from an override or the saved settings.
pub fn resolve_project(project_override: Option<&Path>, settings: &Settings) -> Option<ProjectFiles> {
    if let Some(path) = project_override {
        return Some(ProjectFiles::new(path));
    }
    if settings.project_path.trim().is_empty() {
        return None;
    }
    Some(ProjectFiles::new(expand_project_path(&settings.project_path)))
}

/// Validate that a project path exists, is a directory, and is accessible.
///
/// Returns `Ok(())` if the path is valid, or `Err(message)` describing the issue.
pub fn validate_project_path(raw: &str) -> std::result::Result<(), String> {
    let path = expand_project_path(raw);

    if !path.exists() {
        return Err(format!("Project path does not exist: {}", path.display()));
    }

    if !path.is_dir() {
        return Err(format!(
            "Project path is not a directory: {}",
            path.display()
        ));
    }

    if path.read_dir().is_err() {
        return Err(format!(
            "Cannot access project path: {} (permission denied)",
            path.display()
        ));
    }

    Ok(())
}
