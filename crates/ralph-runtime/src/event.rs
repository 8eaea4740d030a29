//! Watch events.

use ralph_models::{IterationRecord, Prd, Session};

/// Events emitted by the file watcher, one per successfully decoded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// `prd.json` decoded.
    PrdUpdated(Prd),
    /// `session.json` decoded.
    SessionUpdated(Session),
    /// `progress.txt` changed.
    ProgressUpdated {
        /// Raw file content.
        content: String,
        /// Records parsed from the content.
        records: Vec<IterationRecord>,
    },
}

impl WatchEvent {
    /// Name of the file the event came from.
    pub fn file_name(&self) -> &'static str {
        match self {
            WatchEvent::PrdUpdated(_) => ralph_core::config::PRD_FILE,
            WatchEvent::SessionUpdated(_) => ralph_core::config::SESSION_FILE,
            WatchEvent::ProgressUpdated { .. } => ralph_core::config::PROGRESS_FILE,
        }
    }
}
