//! Error types for the runtime crate.

use thiserror::Error;

/// Errors that can occur while controlling the watcher.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Watcher not started.
    #[error("watcher not started")]
    NotStarted,

    /// Watcher already started.
    #[error("watcher already started")]
    AlreadyStarted,

    /// Shutdown error.
    #[error("shutdown error: {0}")]
    Shutdown(String),
}

/// Result type for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;
