//! Conversion of free-form requirements into a PRD.
//!
//! There are two paths to the same result:
//! - [`PrdConverter::convert`] sends the document to the API
//! - [`manual_conversion_prompt`] produces a prompt the user pastes into any
//!   chat model, and [`prd_from_response`] decodes the pasted answer

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info};

use ralph_models::{generate_story_id, Prd, Story};

use crate::client::AnthropicClient;
use crate::error::{AgentError, Result};

/// First fenced block, optionally tagged `json`.
static FENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(?:json)?\s*((?s:.*?))```").expect("Invalid code fence regex")
});

/// System instruction for the conversion request.
pub const CONVERSION_INSTRUCTION: &str = r#"You convert product requirement documents into structured user stories for the Ralph autonomous agent loop.

## Input
A product requirements document, feature brief, or description of what to build.

## Output
Return ONLY valid JSON (no markdown, no explanation):

{
  "title": "Feature name",
  "stories": [
    {
      "id": "story-1",
      "title": "Short action-oriented title",
      "description": "As a [user], I want [goal] so that [benefit]",
      "acceptanceCriteria": [
        "Specific, testable criterion that an AI can verify",
        "Another criterion"
      ]
    }
  ]
}

## Rules
1. Small stories: each one fits in a single agent iteration (15-30 minutes of work)
2. Ordered by dependency: foundation and setup stories first
3. Testable criteria: an AI must be able to verify each criterion without human input
4. 3-8 stories is typical: break large features into atomic pieces
5. No vague criteria. Bad: "Works well". Good: "Returns 200 status with user object"

## Good acceptance criteria
- "Database table 'tasks' has 'priority' column with default 'medium'"
- "GET /api/tasks returns array with priority field"
- "Priority persists after page reload"

## Bad acceptance criteria
- "Priority feature works" (not specific)
- "User can set priority" (how to verify?)
- "Looks good" (subjective)"#;

/// Converts requirements documents through the API.
#[derive(Debug, Clone)]
pub struct PrdConverter {
    client: AnthropicClient,
}

impl PrdConverter {
    /// Create a converter using the given client.
    pub fn new(client: AnthropicClient) -> Self {
        Self { client }
    }

    /// Convert a requirements document into a PRD of backlog stories.
    ///
    /// # Errors
    /// Fails on empty input, transport or API errors, and replies that don't
    /// decode as a PRD.
    pub async fn convert(&self, prd_text: &str) -> Result<Prd> {
        if prd_text.trim().is_empty() {
            return Err(AgentError::EmptyInput);
        }

        info!(model = %self.client.model(), chars = prd_text.len(), "converting requirements");
        let reply = self.client.complete(CONVERSION_INSTRUCTION, prd_text).await?;
        let prd = prd_from_response(&reply, Utc::now())?;
        info!(title = %prd.title, stories = prd.stories.len(), "conversion complete");
        Ok(prd)
    }
}

/// Prompt for converting a document by hand in any chat interface.
pub fn manual_conversion_prompt(prd_text: &str) -> Result<String> {
    let text = prd_text.trim();
    if text.is_empty() {
        return Err(AgentError::EmptyInput);
    }
    Ok(format!(
        "{}\n\n---\n\nConvert this document:\n\n{}\n",
        CONVERSION_INSTRUCTION, text
    ))
}

/// Body of the first code fence, or the whole text when there is none.
pub fn strip_code_fence(text: &str) -> &str {
    FENCE_REGEX
        .captures(text)
        .and_then(|cap| cap.get(1))
        .map_or(text, |m| m.as_str())
        .trim()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConvertedPrd {
    #[serde(default)]
    title: String,
    stories: Vec<ConvertedStory>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConvertedStory {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    acceptance_criteria: Vec<String>,
}

/// Decode a model reply into a PRD created at `now`.
///
/// Every story starts in the backlog. Stories without an id get a generated
/// one.
pub fn prd_from_response(text: &str, now: DateTime<Utc>) -> Result<Prd> {
    let json = strip_code_fence(text);
    let parsed: ConvertedPrd = serde_json::from_str(json).map_err(|e| {
        debug!(error = %e, "reply is not a PRD");
        AgentError::InvalidResponse
    })?;

    let stories = parsed
        .stories
        .into_iter()
        .map(|s| {
            let id = s
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(generate_story_id);
            Story::new(id, s.title, s.description, s.acceptance_criteria)
        })
        .collect();

    Ok(Prd {
        title: parsed.title,
        created_at: now.to_rfc3339(),
        stories,
    })
}
