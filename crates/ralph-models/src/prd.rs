//! PRD types.

use serde::{Deserialize, Serialize};

use crate::story::{Story, StoryStatus, StoryUpdate};

/// A product requirements document broken into stories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prd {
    /// Feature name.
    pub title: String,

    /// When the PRD was created (ISO-8601).
    #[serde(default)]
    pub created_at: String,

    /// Stories ordered by dependency.
    pub stories: Vec<Story>,
}

impl Prd {
    /// Creates a PRD stamped with the current time.
    pub fn new(title: impl Into<String>, stories: Vec<Story>) -> Self {
        Self {
            title: title.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
            stories,
        }
    }

    /// Finds a story by id.
    pub fn story(&self, id: &str) -> Option<&Story> {
        self.stories.iter().find(|s| s.id == id)
    }

    /// Returns a copy with the status of one story replaced.
    ///
    /// Unknown ids leave the PRD unchanged.
    pub fn with_story_status(&self, id: &str, status: StoryStatus) -> Self {
        self.with_story_update(id, &StoryUpdate::new().status(status))
    }

    /// Returns a copy with a partial update applied to one story.
    pub fn with_story_update(&self, id: &str, update: &StoryUpdate) -> Self {
        Self {
            title: self.title.clone(),
            created_at: self.created_at.clone(),
            stories: self
                .stories
                .iter()
                .map(|s| if s.id == id { s.with_update(update) } else { s.clone() })
                .collect(),
        }
    }

    /// Stories currently in the given status, in PRD order.
    pub fn stories_in(&self, status: StoryStatus) -> Vec<&Story> {
        self.stories.iter().filter(|s| s.status == status).collect()
    }

    /// Number of stories whose criteria pass.
    pub fn completed_count(&self) -> usize {
        self.stories.iter().filter(|s| s.passes).count()
    }
}
