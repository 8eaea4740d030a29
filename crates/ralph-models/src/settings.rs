//! User settings and notifications.

use serde::{Deserialize, Serialize};

use crate::session::DEFAULT_MAX_ITERATIONS;

/// Namespaced key the settings are persisted under.
pub const SETTINGS_KEY: &str = "ralph-kanban-settings";

/// User-entered settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Credential for the text-generation API.
    #[serde(default)]
    pub api_key: String,

    /// Root of the project whose `.ralph/` directory is watched.
    #[serde(default)]
    pub project_path: String,

    /// Iteration cap handed to the agent loop.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
}

fn default_max_iterations() -> u32 {
    DEFAULT_MAX_ITERATIONS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            project_path: String::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl Settings {
    /// Returns a copy with the update merged in.
    pub fn merged(&self, update: &SettingsUpdate) -> Self {
        Self {
            api_key: update.api_key.clone().unwrap_or_else(|| self.api_key.clone()),
            project_path: update
                .project_path
                .clone()
                .unwrap_or_else(|| self.project_path.clone()),
            max_iterations: update.max_iterations.unwrap_or(self.max_iterations),
        }
    }

    /// Whether an API key has been entered.
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// API key with all but the last four characters hidden.
    pub fn masked_api_key(&self) -> String {
        mask_secret(&self.api_key)
    }
}

/// Partial settings update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub api_key: Option<String>,
    pub project_path: Option<String>,
    pub max_iterations: Option<u32>,
}

impl SettingsUpdate {
    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.api_key.is_none() && self.project_path.is_none() && self.max_iterations.is_none()
    }
}

/// Hide all but the last four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count == 0 {
        return String::new();
    }
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), tail)
}

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

/// A transient user notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    /// Unique identifier.
    pub id: String,
    /// Message text.
    pub message: String,
    /// Severity.
    #[serde(rename = "type")]
    pub kind: ToastKind,
}

impl Toast {
    /// Creates a toast with a fresh id.
    pub fn new(kind: ToastKind, message: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            message: message.into(),
            kind,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Error, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Info, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert!(settings.api_key.is_empty());
        assert!(settings.project_path.is_empty());
        assert_eq!(settings.max_iterations, 10);
        assert!(!settings.has_api_key());
    }

    #[test]
    fn test_settings_merged() {
        let settings = Settings::default();
        let update = SettingsUpdate {
            project_path: Some("/work/app".into()),
            max_iterations: Some(25),
            ..Default::default()
        };

        let merged = settings.merged(&update);
        assert_eq!(merged.project_path, "/work/app");
        assert_eq!(merged.max_iterations, 25);
        assert!(merged.api_key.is_empty());
    }

    #[test]
    fn test_settings_partial_json() {
        let settings: Settings = serde_json::from_str(r#"{"projectPath": "/p"}"#).unwrap();
        assert_eq!(settings.project_path, "/p");
        assert_eq!(settings.max_iterations, 10);
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret(""), "");
        assert_eq!(mask_secret("abc"), "***");
        assert_eq!(mask_secret("sk-ant-123456"), "*********3456");
    }

    #[test]
    fn test_update_is_empty() {
        assert!(SettingsUpdate::default().is_empty());
        let update = SettingsUpdate {
            max_iterations: Some(3),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn test_toast_ids_unique() {
        let a = Toast::success("saved");
        let b = Toast::success("saved");
        assert_ne!(a.id, b.id);
        assert_eq!(a.kind, ToastKind::Success);
    }
}
