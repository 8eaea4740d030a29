//! Terminal dashboard for a running Ralph loop.
//!
//! Provides a multi-pane TUI with:
//! - Header showing session status, iteration count and PRD title
//! - Kanban board with one column per story status
//! - Execution log built from `progress.txt`
//! - Settings dialog and transient toasts
//! - Footer with keybindings

mod app;
mod events;
mod ui;

pub use app::{Action, App, Pane, SettingsDialog, SettingsField, ToastQueue, TOAST_TTL};
pub use events::run;
