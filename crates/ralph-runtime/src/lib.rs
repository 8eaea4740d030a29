//! Async runtime for the Ralph loop dashboard.
//!
//! This crate watches a project's `.ralph/` directory and turns file contents
//! into events:
//! - [`FileWatcher`] reads and decodes the loop's files on a fixed interval
//! - [`Watcher`] owns the polling task and its shutdown signal
//! - [`BoardState`] is the immutable snapshot the dashboard renders
//!
//! # Example
//!
//! ```no_run
//! use ralph_core::ProjectFiles;
//! use ralph_runtime::{BoardState, RuntimeConfig, Watcher};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut watcher = Watcher::new(ProjectFiles::new("/work/app"), RuntimeConfig::default());
//!     let mut events = watcher.subscribe();
//!     watcher.start().await?;
//!
//!     let mut state = BoardState::default();
//!     while let Ok(event) = events.recv().await {
//!         state = state.apply(&event);
//!         println!("iterations so far: {}", state.records.len());
//!     }
//!
//!     watcher.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod poller;
pub mod runtime;
pub mod state;

pub use config::RuntimeConfig;
pub use error::{Result, RuntimeError};
pub use event::WatchEvent;
pub use poller::FileWatcher;
pub use runtime::Watcher;
pub use state::{BoardState, Column, BOARD_COLUMNS};
