//! Core data models for the Ralph loop dashboard.
//!
//! This crate provides the data types shared by every other crate: the PRD
//! and its stories, the loop session, parsed progress records, and user
//! settings. Update operations return new values instead of mutating in place.

pub mod prd;
pub mod progress;
pub mod session;
pub mod settings;
pub mod story;

// Re-export main types
pub use prd::Prd;
pub use progress::{IterationRecord, IterationStatus};
pub use session::{Session, SessionStatus, DEFAULT_MAX_ITERATIONS};
pub use settings::{mask_secret, Settings, SettingsUpdate, Toast, ToastKind, SETTINGS_KEY};
pub use story::{generate_story_id, Story, StoryStatus, StoryUpdate};
