//! Shared configuration for ralph-board.
//!
//! Provides functions to locate the application's state directory and the
//! files the agent loop writes inside a project.
//!
//! # Storage Structure
//!
//! Application data is stored under `~/.ralph-board/`:
//!
//! ```text
//! ~/.ralph-board/
//! ├── config/       # Settings and .env.local
//! └── logs/         # Dashboard log file
//! ```
//!
//! The agent loop keeps its state inside the project itself:
//!
//! ```text
//! <project>/.ralph/
//! ├── prd.json
//! ├── session.json
//! ├── progress.txt
//! └── learnings.md
//! ```
//!
//! # Environment Variables
//!
//! - `RALPH_BOARD_STATE_DIR`: Override the base state directory
//! - `RALPH_BOARD_CONFIG_DIR`: Override the config directory
//! - `RALPH_BOARD_LOG_DIR`: Override the log directory

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use ralph_models::SETTINGS_KEY;

/// Environment variable for custom state directory.
pub const STATE_DIR_ENV: &str = "RALPH_BOARD_STATE_DIR";

/// Environment variable for custom config directory.
pub const CONFIG_DIR_ENV: &str = "RALPH_BOARD_CONFIG_DIR";

/// Environment variable for custom log directory.
pub const LOG_DIR_ENV: &str = "RALPH_BOARD_LOG_DIR";

/// Default state directory name under home.
const DEFAULT_STATE_DIR: &str = ".ralph-board";

// Subdirectory names
const CONFIG_SUBDIR: &str = "config";
const LOGS_SUBDIR: &str = "logs";

const ENV_FILE: &str = ".env.local";
const LOG_FILE: &str = "ralph-board.log";

/// Directory inside a project where the agent loop keeps its files.
pub const RALPH_DIR: &str = ".ralph";

/// PRD file name.
pub const PRD_FILE: &str = "prd.json";

/// Session file name.
pub const SESSION_FILE: &str = "session.json";

/// Progress log file name.
pub const PROGRESS_FILE: &str = "progress.txt";

/// Accumulated learnings file name.
pub const LEARNINGS_FILE: &str = "learnings.md";

/// Exported loop prompt file name.
pub const PROMPT_FILE: &str = "prompt.md";

static STATE_DIR_CACHE: OnceLock<PathBuf> = OnceLock::new();

/// Get the ralph-board state directory.
///
/// The state directory is determined by:
/// 1. `RALPH_BOARD_STATE_DIR` environment variable if set
/// 2. `~/.ralph-board` if home directory is available
/// 3. `.ralph-board` in current directory as fallback
pub fn state_dir() -> PathBuf {
    STATE_DIR_CACHE
        .get_or_init(|| {
            std::env::var(STATE_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    dirs::home_dir()
                        .map(|h| h.join(DEFAULT_STATE_DIR))
                        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
                })
        })
        .clone()
}

/// Get the config directory under a given state directory.
///
/// `RALPH_BOARD_CONFIG_DIR` wins when set.
pub fn config_dir_in(state_dir: &Path) -> PathBuf {
    std::env::var(CONFIG_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| state_dir.join(CONFIG_SUBDIR))
}

/// Get the logs directory under a given state directory.
pub fn logs_dir_in(state_dir: &Path) -> PathBuf {
    std::env::var(LOG_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| state_dir.join(LOGS_SUBDIR))
}

/// Get the settings file path under a given state directory.
///
/// Named after the namespaced settings key.
pub fn settings_file_in(state_dir: &Path) -> PathBuf {
    config_dir_in(state_dir).join(format!("{}.json", SETTINGS_KEY))
}

/// Get the .env.local file path under a given state directory.
///
/// Environment file for secrets (API keys).
pub fn env_file_in(state_dir: &Path) -> PathBuf {
    config_dir_in(state_dir).join(ENV_FILE)
}

/// Get the dashboard log file path under a given state directory.
pub fn log_file_in(state_dir: &Path) -> PathBuf {
    logs_dir_in(state_dir).join(LOG_FILE)
}

/// Ensure the config and logs directories exist.
///
/// # Errors
/// Returns an error if any directory cannot be created.
pub fn ensure_dirs_in(state_dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(config_dir_in(state_dir))?;
    std::fs::create_dir_all(logs_dir_in(state_dir))?;
    Ok(())
}

/// Expand `~` and environment variables in a user-entered project path.
///
/// Falls back to the raw input when expansion fails (e.g. unknown variable).
pub fn expand_project_path(raw: &str) -> PathBuf {
    let expanded: Cow<'_, str> = shellexpand::full(raw.trim()).unwrap_or(Cow::Borrowed(raw.trim()));
    PathBuf::from(expanded.as_ref())
}

/// Locations of the agent loop's files inside one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFiles {
    root: PathBuf,
}

impl ProjectFiles {
    /// Creates the layout for a project root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The project root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `.ralph/` directory.
    pub fn ralph_dir(&self) -> PathBuf {
        self.root.join(RALPH_DIR)
    }

    /// Path to `prd.json`.
    pub fn prd(&self) -> PathBuf {
        self.ralph_dir().join(PRD_FILE)
    }

    /// Path to `session.json`.
    pub fn session(&self) -> PathBuf {
        self.ralph_dir().join(SESSION_FILE)
    }

    /// Path to `progress.txt`.
    pub fn progress(&self) -> PathBuf {
        self.ralph_dir().join(PROGRESS_FILE)
    }

    /// Path to `learnings.md`.
    pub fn learnings(&self) -> PathBuf {
        self.ralph_dir().join(LEARNINGS_FILE)
    }

    /// Path the loop prompt is exported to.
    pub fn prompt(&self) -> PathBuf {
        self.ralph_dir().join(PROMPT_FILE)
    }

    /// Whether the project already has a `.ralph/` directory.
    pub fn has_ralph_dir(&self) -> bool {
        self.ralph_dir().is_dir()
    }
}
