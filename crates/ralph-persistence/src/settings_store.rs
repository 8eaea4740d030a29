//! Settings persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use ralph_models::{Settings, SettingsUpdate, SETTINGS_KEY};

use crate::atomic::{atomic_write_json, read_json_optional, remove_if_exists};
use crate::error::{PersistenceError, Result};

/// Stores user settings as a single JSON file.
///
/// The file keeps the settings under their namespaced key:
/// ```text
/// {
///   "ralph-kanban-settings": {
///     "settings": { "apiKey": "...", "projectPath": "...", "maxIterations": 10 }
///   }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

#[derive(Serialize, Deserialize)]
struct Entry {
    settings: Settings,
}

impl SettingsStore {
    /// Creates a store backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the settings, falling back to defaults when nothing was saved.
    ///
    /// # Errors
    /// Returns an error if the file exists but can't be read or decoded.
    pub fn load(&self) -> Result<Settings> {
        let Some(root) = read_json_optional::<serde_json::Value>(&self.path)? else {
            debug!(path = %self.path.display(), "no saved settings, using defaults");
            return Ok(Settings::default());
        };

        let entry = root
            .get(SETTINGS_KEY)
            .cloned()
            .ok_or_else(|| PersistenceError::InvalidData {
                path: self.path.clone(),
                reason: format!("missing \"{}\" entry", SETTINGS_KEY),
            })?;
        let entry: Entry = serde_json::from_value(entry)?;
        Ok(entry.settings)
    }

    /// Saves the settings, replacing anything stored before.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        let root = serde_json::json!({
            SETTINGS_KEY: Entry { settings: settings.clone() },
        });
        atomic_write_json(&self.path, &root)?;
        info!(path = %self.path.display(), "saved settings");
        Ok(())
    }

    /// Merges a partial update into the stored settings and saves the result.
    ///
    /// Returns the new settings snapshot.
    pub fn update(&self, update: &SettingsUpdate) -> Result<Settings> {
        let current = self.load()?;
        if update.is_empty() {
            return Ok(current);
        }
        let next = current.merged(update);
        self.save(&next)?;
        Ok(next)
    }

    /// Deletes the stored settings so the next load yields defaults.
    pub fn reset(&self) -> Result<()> {
        if remove_if_exists(&self.path)? {
            info!(path = %self.path.display(), "reset settings");
        }
        Ok(())
    }
}
