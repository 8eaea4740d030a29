//! Decoders for the JSON files the agent loop writes.
//!
//! The agent rewrites these files while the dashboard polls them, so a read
//! can observe a half-written document. Decoding never reports an error to the
//! caller: anything that isn't a complete document of the right shape is
//! `None`, and the caller keeps whatever state it already had.

use serde::de::DeserializeOwned;
use tracing::debug;

use ralph_models::{Prd, Session};

/// Decode `prd.json` content.
pub fn parse_prd(text: &str) -> Option<Prd> {
    decode(text, "prd")
}

/// Decode `session.json` content.
pub fn parse_session(text: &str) -> Option<Session> {
    decode(text, "session")
}

fn decode<T: DeserializeOwned>(text: &str, kind: &'static str) -> Option<T> {
    match serde_json::from_str(text) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(kind, error = %e, "ignoring undecodable document");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ralph_models::{SessionStatus, StoryStatus};

    const PRD_JSON: &str = r#"{
        "title": "Task priorities",
        "createdAt": "2025-01-08T10:00:00Z",
        "stories": [
            {
                "id": "story-1",
                "title": "Add priority column",
                "description": "As a user, I want priorities",
                "acceptanceCriteria": ["Column exists"],
                "status": "in_progress",
                "passes": false,
                "iteration": 1,
                "startedAt": "2025-01-08T10:30:00Z",
                "completedAt": null,
                "filesChanged": [],
                "notes": ""
            }
        ]
    }"#;

    #[test]
    fn test_parse_prd() {
        let prd = parse_prd(PRD_JSON).unwrap();
        assert_eq!(prd.title, "Task priorities");
        assert_eq!(prd.stories.len(), 1);
        assert_eq!(prd.stories[0].status, StoryStatus::InProgress);
        assert_eq!(prd.stories[0].iteration, Some(1));
    }

    #[test]
    fn test_parse_session() {
        let json = r#"{"id":"s1","status":"paused","currentIteration":4,"maxIterations":10,"startedAt":null,"lastUpdated":null}"#;
        let session = parse_session(json).unwrap();
        assert_eq!(session.status, SessionStatus::Paused);
        assert_eq!(session.current_iteration, 4);
    }

    #[test]
    fn test_malformed_json_is_none() {
        assert!(parse_prd("{ not json").is_none());
        assert!(parse_session("{ not json").is_none());
    }

    #[test]
    fn test_truncated_document_is_none() {
        let half = &PRD_JSON[..PRD_JSON.len() / 2];
        assert!(parse_prd(half).is_none());
        assert!(parse_prd("").is_none());
    }

    #[test]
    fn test_wrong_shape_is_none() {
        assert!(parse_prd(r#"{"id":"s1","status":"idle"}"#).is_none());
        assert!(parse_session(r#"{"status":"sleeping"}"#).is_none());
        assert!(parse_session("[]").is_none());
    }
}
