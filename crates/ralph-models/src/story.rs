//! Story types.
//!
//! A story is a single unit of work with acceptance criteria. Stories move
//! through a fixed lifecycle as the agent loop picks them up and verifies them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoryStatus {
    /// Not yet picked up.
    #[default]
    Backlog,
    /// Currently being implemented.
    InProgress,
    /// Implemented, acceptance criteria being verified.
    Testing,
    /// All acceptance criteria pass.
    Done,
    /// Gave up on the story.
    Failed,
}

impl StoryStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [StoryStatus; 5] = [
        StoryStatus::Backlog,
        StoryStatus::InProgress,
        StoryStatus::Testing,
        StoryStatus::Done,
        StoryStatus::Failed,
    ];

    /// Wire name as it appears in `prd.json`.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryStatus::Backlog => "backlog",
            StoryStatus::InProgress => "in_progress",
            StoryStatus::Testing => "testing",
            StoryStatus::Done => "done",
            StoryStatus::Failed => "failed",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            StoryStatus::Backlog => "Backlog",
            StoryStatus::InProgress => "In Progress",
            StoryStatus::Testing => "Testing",
            StoryStatus::Done => "Done",
            StoryStatus::Failed => "Failed",
        }
    }
}

impl fmt::Display for StoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A story as stored in `prd.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    /// Story identifier (e.g., "story-1").
    pub id: String,

    /// Short action-oriented title.
    pub title: String,

    /// User-story style description.
    #[serde(default)]
    pub description: String,

    /// Testable acceptance criteria.
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,

    /// Current lifecycle status.
    #[serde(default)]
    pub status: StoryStatus,

    /// Whether all acceptance criteria pass.
    #[serde(default)]
    pub passes: bool,

    /// Iteration that last worked on the story.
    #[serde(default)]
    pub iteration: Option<u32>,

    /// When work on the story started (ISO-8601).
    #[serde(default)]
    pub started_at: Option<String>,

    /// When the story was completed (ISO-8601).
    #[serde(default)]
    pub completed_at: Option<String>,

    /// Files touched while implementing the story.
    #[serde(default)]
    pub files_changed: Vec<String>,

    /// Free-form implementation notes.
    #[serde(default)]
    pub notes: String,
}

impl Story {
    /// Creates a fresh backlog story.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        acceptance_criteria: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            acceptance_criteria,
            status: StoryStatus::Backlog,
            passes: false,
            iteration: None,
            started_at: None,
            completed_at: None,
            files_changed: Vec::new(),
            notes: String::new(),
        }
    }

    /// Returns a copy of the story with the update applied.
    pub fn with_update(&self, update: &StoryUpdate) -> Self {
        let mut story = self.clone();
        if let Some(status) = update.status {
            story.status = status;
        }
        if let Some(passes) = update.passes {
            story.passes = passes;
        }
        if let Some(iteration) = update.iteration {
            story.iteration = Some(iteration);
        }
        if let Some(started_at) = &update.started_at {
            story.started_at = Some(started_at.clone());
        }
        if let Some(completed_at) = &update.completed_at {
            story.completed_at = Some(completed_at.clone());
        }
        if let Some(files) = &update.files_changed {
            story.files_changed = files.clone();
        }
        if let Some(notes) = &update.notes {
            story.notes = notes.clone();
        }
        story
    }
}

/// Partial update for a story. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoryUpdate {
    pub status: Option<StoryStatus>,
    pub passes: Option<bool>,
    pub iteration: Option<u32>,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub files_changed: Option<Vec<String>>,
    pub notes: Option<String>,
}

impl StoryUpdate {
    /// Creates an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the status.
    pub fn status(mut self, status: StoryStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the passes flag.
    pub fn passes(mut self, passes: bool) -> Self {
        self.passes = Some(passes);
        self
    }

    /// Sets the iteration number.
    pub fn iteration(mut self, iteration: u32) -> Self {
        self.iteration = Some(iteration);
        self
    }

    /// Sets the completion timestamp.
    pub fn completed_at(mut self, completed_at: impl Into<String>) -> Self {
        self.completed_at = Some(completed_at.into());
        self
    }

    /// Sets the changed files.
    pub fn files_changed(mut self, files: Vec<String>) -> Self {
        self.files_changed = Some(files);
        self
    }

    /// Sets the notes.
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Generates an identifier for a story that arrived without one.
pub fn generate_story_id() -> String {
    let raw = uuid::Uuid::new_v4().simple().to_string();
    format!("story-{}", &raw[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_status_default() {
        assert_eq!(StoryStatus::default(), StoryStatus::Backlog);
    }

    #[test]
    fn test_story_status_wire_names() {
        let json = serde_json::to_string(&StoryStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");

        let status: StoryStatus = serde_json::from_str("\"done\"").unwrap();
        assert_eq!(status, StoryStatus::Done);
        assert_eq!(StoryStatus::Testing.to_string(), "testing");
    }

    #[test]
    fn test_story_new_is_backlog() {
        let story = Story::new("story-1", "Add login", "As a user...", vec!["Form renders".into()]);

        assert_eq!(story.status, StoryStatus::Backlog);
        assert!(!story.passes);
        assert!(story.iteration.is_none());
        assert!(story.started_at.is_none());
        assert!(story.files_changed.is_empty());
        assert!(story.notes.is_empty());
    }

    #[test]
    fn test_story_camel_case_fields() {
        let story = Story::new("story-1", "Add login", "", vec![]);
        let json = serde_json::to_value(&story).unwrap();

        assert!(json.get("acceptanceCriteria").is_some());
        assert!(json.get("filesChanged").is_some());
        assert!(json.get("startedAt").is_some());
        assert_eq!(json["status"], "backlog");
    }

    #[test]
    fn test_story_with_update_only_touches_set_fields() {
        let story = Story::new("story-1", "Add login", "desc", vec!["a".into()]);
        let update = StoryUpdate::new()
            .status(StoryStatus::Done)
            .passes(true)
            .iteration(3)
            .files_changed(vec!["src/Login.tsx".into()]);

        let updated = story.with_update(&update);

        assert_eq!(updated.status, StoryStatus::Done);
        assert!(updated.passes);
        assert_eq!(updated.iteration, Some(3));
        assert_eq!(updated.files_changed, vec!["src/Login.tsx".to_string()]);
        assert_eq!(updated.title, "Add login");
        assert_eq!(updated.notes, "");
        // Original is untouched
        assert_eq!(story.status, StoryStatus::Backlog);
    }

    #[test]
    fn test_generate_story_id() {
        let id = generate_story_id();
        assert!(id.starts_with("story-"));
        assert_eq!(id.len(), "story-".len() + 8);
        assert_ne!(id, generate_story_id());
    }
}
