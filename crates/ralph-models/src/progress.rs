//! Parsed progress log records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Outcome of a single iteration as logged by the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IterationStatus {
    /// Iteration has begun (also the default when no status is logged).
    #[default]
    Started,
    /// Story completed.
    Completed,
    /// Story failed.
    Failed,
}

impl IterationStatus {
    /// Canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            IterationStatus::Started => "STARTED",
            IterationStatus::Completed => "COMPLETED",
            IterationStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for IterationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IterationStatus {
    type Err = String;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "STARTED" => Ok(IterationStatus::Started),
            "COMPLETED" => Ok(IterationStatus::Completed),
            "FAILED" => Ok(IterationStatus::Failed),
            other => Err(format!("unknown iteration status: {}", other)),
        }
    }
}

/// One `=== ITERATION <n> ===` block of `progress.txt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IterationRecord {
    /// Iteration number from the block header.
    pub iteration: u32,
    /// Raw timestamp text; empty when absent.
    pub timestamp: String,
    /// Story id; empty when the story line is absent or malformed.
    pub story_id: String,
    /// Story title; empty when the story line is absent or malformed.
    pub story_title: String,
    /// Logged status.
    pub status: IterationStatus,
    /// `[HH:MM:SS] ...` lines in document order.
    pub log_lines: Vec<String>,
    /// Bare paths from the "Files Changed:" section.
    pub files_changed: Vec<String>,
    /// Items from the "Learnings:" section.
    pub learnings: Vec<String>,
}

impl IterationRecord {
    /// A record with every field at its default.
    pub fn new(iteration: u32) -> Self {
        Self {
            iteration,
            timestamp: String::new(),
            story_id: String::new(),
            story_title: String::new(),
            status: IterationStatus::Started,
            log_lines: Vec::new(),
            files_changed: Vec::new(),
            learnings: Vec::new(),
        }
    }

    /// Whether the iteration reached a terminal status.
    pub fn is_finished(&self) -> bool {
        self.status != IterationStatus::Started
    }
}
