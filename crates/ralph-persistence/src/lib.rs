//! Persistence layer for the Ralph loop dashboard.
//!
//! Files are written atomically (temp file, then rename) so a crash or a
//! concurrent reader never observes a partial write.
//!
//! # Example
//!
//! ```no_run
//! use ralph_models::SettingsUpdate;
//! use ralph_persistence::SettingsStore;
//!
//! let store = SettingsStore::new("/home/user/.ralph-board/config/ralph-kanban-settings.json");
//!
//! let settings = store
//!     .update(&SettingsUpdate {
//!         max_iterations: Some(20),
//!         ..SettingsUpdate::default()
//!     })
//!     .unwrap();
//! assert_eq!(settings.max_iterations, 20);
//! ```

pub mod atomic;
pub mod error;
pub mod settings_store;

pub use atomic::{atomic_write, atomic_write_json, read_json, read_json_optional};
pub use error::{PersistenceError, Result};
pub use settings_store::SettingsStore;
