//! Core logic for the Ralph loop dashboard.
//!
//! This crate provides:
//! - [`progress`]: the `progress.txt` parser
//! - [`decode`]: tolerant decoders for `prd.json` and `session.json`
//! - [`format`]: display helpers
//! - [`prompt`]: the agent loop prompt
//! - [`config`]: state directory and project file locations

pub mod config;
pub mod decode;
pub mod format;
pub mod progress;
pub mod prompt;

pub use config::ProjectFiles;
pub use decode::{parse_prd, parse_session};
pub use format::format_timestamp;
pub use progress::parse_progress;
pub use prompt::loop_prompt;
