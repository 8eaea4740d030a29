//! Error type for the CLI and dashboard.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced to the user by `ralph-board`.
#[derive(Debug, Error)]
pub enum CliError {
    /// No project configured or passed on the command line.
    #[error("no project configured; pass --project or run `ralph-board settings set --project-path <dir>`")]
    NoProject,

    /// The project path is unusable.
    #[error("{0}")]
    InvalidProject(String),

    /// A story id that isn't in the PRD.
    #[error("story not found: {0}")]
    StoryNotFound(String),

    /// An input file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Persistence(#[from] ralph_persistence::PersistenceError),

    #[error("{0}")]
    Agent(#[from] ralph_agent::AgentError),

    #[error("{0}")]
    Runtime(#[from] ralph_runtime::RuntimeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, CliError>;
