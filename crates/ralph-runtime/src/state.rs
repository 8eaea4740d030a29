//! Board state snapshots.
//!
//! The dashboard keeps one [`BoardState`] and replaces it wholesale on every
//! change. Each update returns a new snapshot and leaves the old one intact.

use ralph_models::{IterationRecord, Prd, Session, Story, StoryStatus};

use crate::event::WatchEvent;

/// Statuses shown as board columns, in display order.
///
/// Failed stories have no column.
pub const BOARD_COLUMNS: [StoryStatus; 4] = [
    StoryStatus::Backlog,
    StoryStatus::InProgress,
    StoryStatus::Testing,
    StoryStatus::Done,
];

/// Everything the dashboard knows about the loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardState {
    /// Last PRD that decoded, if any.
    pub prd: Option<Prd>,
    /// Last session that decoded, or the default session.
    pub session: Session,
    /// Raw `progress.txt` content.
    pub progress: String,
    /// Records parsed from `progress`.
    pub records: Vec<IterationRecord>,
}

/// One board column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column<'a> {
    pub status: StoryStatus,
    pub stories: Vec<&'a Story>,
}

impl BoardState {
    /// Returns the state with a watch event applied.
    pub fn apply(&self, event: &WatchEvent) -> BoardState {
        match event {
            WatchEvent::PrdUpdated(prd) => BoardState {
                prd: Some(prd.clone()),
                ..self.clone()
            },
            WatchEvent::SessionUpdated(session) => BoardState {
                session: session.clone(),
                ..self.clone()
            },
            WatchEvent::ProgressUpdated { content, records } => BoardState {
                progress: content.clone(),
                records: records.clone(),
                ..self.clone()
            },
        }
    }

    /// Returns the state with one story moved to a new status.
    ///
    /// Without a PRD, or for an unknown id, the state is unchanged.
    pub fn with_story_status(&self, story_id: &str, status: StoryStatus) -> BoardState {
        BoardState {
            prd: self
                .prd
                .as_ref()
                .map(|prd| prd.with_story_status(story_id, status)),
            ..self.clone()
        }
    }

    /// A cleared board.
    pub fn reset() -> BoardState {
        BoardState::default()
    }

    /// Stories grouped into the board columns.
    pub fn columns(&self) -> Vec<Column<'_>> {
        BOARD_COLUMNS
            .iter()
            .map(|&status| Column {
                status,
                stories: self
                    .prd
                    .as_ref()
                    .map(|prd| prd.stories_in(status))
                    .unwrap_or_default(),
            })
            .collect()
    }

    /// Whether a PRD has been loaded.
    pub fn has_prd(&self) -> bool {
        self.prd.is_some()
    }
}
