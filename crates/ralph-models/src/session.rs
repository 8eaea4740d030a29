//! Loop session types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default iteration cap for a new session.
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

/// State of the agent loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No loop has been started.
    #[default]
    Idle,
    /// The loop is executing iterations.
    Running,
    /// The loop was paused.
    Paused,
    /// All stories pass or the iteration cap was reached.
    Completed,
}

impl SessionStatus {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "Idle",
            SessionStatus::Running => "Running",
            SessionStatus::Paused => "Paused",
            SessionStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Contents of `session.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Session identifier.
    #[serde(default)]
    pub id: String,

    /// Current loop status.
    pub status: SessionStatus,

    /// Iteration currently being executed.
    #[serde(default)]
    pub current_iteration: u32,

    /// Iteration cap.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// When the loop started (ISO-8601).
    #[serde(default)]
    pub started_at: Option<String>,

    /// Last time the session was updated (ISO-8601).
    #[serde(default)]
    pub last_updated: Option<String>,
}

fn default_max_iterations() -> u32 {
    DEFAULT_MAX_ITERATIONS
}

impl Default for Session {
    fn default() -> Self {
        Self {
            id: String::new(),
            status: SessionStatus::Idle,
            current_iteration: 0,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            started_at: None,
            last_updated: None,
        }
    }
}

impl Session {
    /// Returns a copy with a new status.
    pub fn with_status(&self, status: SessionStatus) -> Self {
        Self {
            status,
            last_updated: Some(chrono::Utc::now().to_rfc3339()),
            ..self.clone()
        }
    }

    /// Returns a copy advanced by one iteration.
    pub fn with_next_iteration(&self) -> Self {
        Self {
            current_iteration: self.current_iteration.saturating_add(1),
            last_updated: Some(chrono::Utc::now().to_rfc3339()),
            ..self.clone()
        }
    }

    /// Whether the iteration cap has been reached.
    pub fn is_exhausted(&self) -> bool {
        self.current_iteration >= self.max_iterations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_default() {
        let session = Session::default();
        assert_eq!(session.status, SessionStatus::Idle);
        assert_eq!(session.current_iteration, 0);
        assert_eq!(session.max_iterations, 10);
        assert!(session.last_updated.is_none());
    }

    #[test]
    fn test_session_with_status_stamps_update() {
        let session = Session::default().with_status(SessionStatus::Running);
        assert_eq!(session.status, SessionStatus::Running);
        assert!(session.last_updated.is_some());
    }

    #[test]
    fn test_session_with_next_iteration() {
        let session = Session::default().with_next_iteration().with_next_iteration();
        assert_eq!(session.current_iteration, 2);
        assert!(!session.is_exhausted());
    }

    #[test]
    fn test_session_deserialize() {
        let json = r#"{
            "id": "sess-1",
            "status": "running",
            "currentIteration": 3,
            "maxIterations": 10,
            "startedAt": "2025-01-08T10:00:00Z",
            "lastUpdated": null
        }"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.status, SessionStatus::Running);
        assert_eq!(session.current_iteration, 3);
        assert_eq!(session.status.to_string(), "Running");
    }
}
