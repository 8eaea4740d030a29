//! TUI application state and logic.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{info, warn};

use ralph_core::{loop_prompt, ProjectFiles};
use ralph_models::{mask_secret, Settings, SettingsUpdate, Toast};
use ralph_persistence::{atomic_write, SettingsStore};
use ralph_runtime::{BoardState, WatchEvent, BOARD_COLUMNS};

use crate::{resolve_project, validate_project_path};

/// How long a toast stays on screen.
pub const TOAST_TTL: Duration = Duration::from_secs(4);

/// Which pane has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pane {
    /// Kanban columns
    #[default]
    Board,
    /// Execution log
    Log,
}

/// Follow-up work the event loop must do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    /// Drop the current watcher and start a fresh one for `App::project`.
    RestartWatcher,
}

/// A toast with the moment it was shown.
#[derive(Debug, Clone)]
pub struct ActiveToast {
    pub toast: Toast,
    pub shown_at: Instant,
}

/// Notifications that disappear after [`TOAST_TTL`].
#[derive(Debug, Clone, Default)]
pub struct ToastQueue {
    entries: Vec<ActiveToast>,
}

impl ToastQueue {
    pub fn push(&mut self, toast: Toast, now: Instant) {
        self.entries.push(ActiveToast {
            toast,
            shown_at: now,
        });
    }

    /// Drop toasts older than [`TOAST_TTL`].
    pub fn expire(&mut self, now: Instant) {
        self.entries
            .retain(|entry| now.saturating_duration_since(entry.shown_at) < TOAST_TTL);
    }

    /// Toasts still on screen, oldest first.
    pub fn visible(&self) -> &[ActiveToast] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Fields of the settings dialog, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsField {
    #[default]
    ApiKey,
    ProjectPath,
    MaxIterations,
}

impl SettingsField {
    pub const ALL: [SettingsField; 3] = [
        SettingsField::ApiKey,
        SettingsField::ProjectPath,
        SettingsField::MaxIterations,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SettingsField::ApiKey => "API key",
            SettingsField::ProjectPath => "Project path",
            SettingsField::MaxIterations => "Max iterations",
        }
    }

    fn next(self) -> Self {
        match self {
            SettingsField::ApiKey => SettingsField::ProjectPath,
            SettingsField::ProjectPath => SettingsField::MaxIterations,
            SettingsField::MaxIterations => SettingsField::ApiKey,
        }
    }

    fn prev(self) -> Self {
        match self {
            SettingsField::ApiKey => SettingsField::MaxIterations,
            SettingsField::ProjectPath => SettingsField::ApiKey,
            SettingsField::MaxIterations => SettingsField::ProjectPath,
        }
    }
}

/// Editable copy of the settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsDialog {
    pub api_key: String,
    pub project_path: String,
    pub max_iterations: String,
    pub focus: SettingsField,
}

impl SettingsDialog {
    pub fn new(settings: &Settings) -> Self {
        Self {
            api_key: settings.api_key.clone(),
            project_path: settings.project_path.clone(),
            max_iterations: settings.max_iterations.to_string(),
            focus: SettingsField::default(),
        }
    }

    /// Display text for a field. The API key is always masked.
    pub fn display(&self, field: SettingsField) -> String {
        match field {
            SettingsField::ApiKey => mask_secret(&self.api_key),
            SettingsField::ProjectPath => self.project_path.clone(),
            SettingsField::MaxIterations => self.max_iterations.clone(),
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            SettingsField::ApiKey => &mut self.api_key,
            SettingsField::ProjectPath => &mut self.project_path,
            SettingsField::MaxIterations => &mut self.max_iterations,
        }
    }

    pub fn enter_char(&mut self, c: char) {
        if self.focus == SettingsField::MaxIterations && !c.is_ascii_digit() {
            return;
        }
        self.focused_mut().push(c);
    }

    pub fn delete_char(&mut self) {
        self.focused_mut().pop();
    }

    /// Turn the edited fields into an update, or explain what's wrong.
    pub fn to_update(&self, current: &Settings) -> Result<SettingsUpdate, String> {
        let max_iterations = match self.max_iterations.trim().parse::<u32>() {
            Ok(n) if n >= 1 => n,
            _ => return Err("Max iterations must be a whole number of at least 1".to_string()),
        };

        let project_path = self.project_path.trim();
        if !project_path.is_empty() && project_path != current.project_path {
            validate_project_path(project_path)?;
        }

        let changed = |new: &str, old: &str| (new != old).then(|| new.to_string());
        Ok(SettingsUpdate {
            api_key: changed(self.api_key.trim(), current.api_key.as_str()),
            project_path: changed(project_path, current.project_path.as_str()),
            max_iterations: (max_iterations != current.max_iterations).then_some(max_iterations),
        })
    }
}

/// TUI application state.
pub struct App {
    // Data
    /// Latest snapshot of the loop's files
    pub board: BoardState,
    /// Saved settings
    pub settings: Settings,
    /// Settings persistence
    pub store: SettingsStore,
    /// Project root from the command line, if any
    pub project_override: Option<PathBuf>,
    /// Project currently watched
    pub project: Option<ProjectFiles>,

    // UI State
    /// Focused pane
    pub pane: Pane,
    /// Selected board column (index into `BOARD_COLUMNS`)
    pub selected_column: usize,
    /// Selected card within the column
    pub selected_story: usize,
    /// Story whose card shows details
    pub expanded_story: Option<String>,
    /// Selected log entry
    pub log_selected: usize,
    /// Expanded log entries (indices into `board.records`)
    pub expanded_iterations: HashSet<usize>,
    /// Follow new iterations as they arrive
    pub auto_scroll: bool,
    /// On-screen notifications
    pub toasts: ToastQueue,
    /// Open settings dialog
    pub dialog: Option<SettingsDialog>,
    /// Waiting for y/n after `r`
    pub confirm_reset: bool,

    // Runtime
    /// Whether the app should quit
    pub should_quit: bool,
}

impl App {
    /// Create a new App instance.
    pub fn new(store: SettingsStore, settings: Settings, project_override: Option<PathBuf>) -> Self {
        let project = resolve_project(project_override.as_deref(), &settings);
        Self {
            board: BoardState::default(),
            settings,
            store,
            project_override,
            project,
            pane: Pane::default(),
            selected_column: 0,
            selected_story: 0,
            expanded_story: None,
            log_selected: 0,
            expanded_iterations: HashSet::new(),
            auto_scroll: true,
            toasts: ToastQueue::default(),
            dialog: None,
            confirm_reset: false,
            should_quit: false,
        }
    }

    /// Fold a watch event into the board.
    pub fn apply_event(&mut self, event: &WatchEvent) {
        self.board = self.board.apply(event);

        if matches!(event, WatchEvent::ProgressUpdated { .. }) {
            self.expanded_iterations
                .retain(|&i| i < self.board.records.len());
            if self.auto_scroll {
                self.log_selected = self.board.records.len().saturating_sub(1);
            }
        }
        self.clamp_selection();
    }

    /// Expire old toasts.
    pub fn tick(&mut self, now: Instant) {
        self.toasts.expire(now);
    }

    pub fn notify(&mut self, toast: Toast) {
        self.toasts.push(toast, Instant::now());
    }

    /// Handle one key press.
    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Action::None;
        }

        if self.dialog.is_some() {
            return self.handle_dialog_key(key);
        }

        if self.confirm_reset {
            self.confirm_reset = false;
            if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                return self.reset_board();
            }
            return Action::None;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::BackTab => self.toggle_pane(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.select_prev(),
            KeyCode::Left | KeyCode::Char('h') => self.select_column(-1),
            KeyCode::Right | KeyCode::Char('l') => self.select_column(1),
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_expanded(),
            KeyCode::Char('a') => self.toggle_auto_scroll(),
            KeyCode::Char('s') => self.open_settings(),
            KeyCode::Char('p') => self.export_prompt(),
            KeyCode::Char('r') => self.confirm_reset = true,
            _ => {}
        }
        Action::None
    }

    fn handle_dialog_key(&mut self, key: KeyEvent) -> Action {
        let Some(dialog) = self.dialog.as_mut() else {
            return Action::None;
        };

        match key.code {
            KeyCode::Esc => self.dialog = None,
            KeyCode::Tab | KeyCode::Down => dialog.focus = dialog.focus.next(),
            KeyCode::BackTab | KeyCode::Up => dialog.focus = dialog.focus.prev(),
            KeyCode::Backspace => dialog.delete_char(),
            KeyCode::Char(c) => dialog.enter_char(c),
            KeyCode::Enter => return self.save_settings(),
            _ => {}
        }
        Action::None
    }

    pub fn toggle_pane(&mut self) {
        self.pane = match self.pane {
            Pane::Board => Pane::Log,
            Pane::Log => Pane::Board,
        };
    }

    /// Stories in the selected column.
    pub fn column_len(&self, column: usize) -> usize {
        let Some(status) = BOARD_COLUMNS.get(column) else {
            return 0;
        };
        self.board
            .prd
            .as_ref()
            .map(|prd| prd.stories_in(*status).len())
            .unwrap_or(0)
    }

    /// Id of the story under the cursor.
    pub fn selected_story_id(&self) -> Option<&str> {
        let status = BOARD_COLUMNS.get(self.selected_column)?;
        let prd = self.board.prd.as_ref()?;
        prd.stories_in(*status)
            .get(self.selected_story)
            .map(|story| story.id.as_str())
    }

    fn select_next(&mut self) {
        match self.pane {
            Pane::Board => {
                if self.selected_story + 1 < self.column_len(self.selected_column) {
                    self.selected_story += 1;
                }
            }
            Pane::Log => {
                if self.log_selected + 1 < self.board.records.len() {
                    self.log_selected += 1;
                }
            }
        }
    }

    fn select_prev(&mut self) {
        match self.pane {
            Pane::Board => self.selected_story = self.selected_story.saturating_sub(1),
            Pane::Log => {
                self.log_selected = self.log_selected.saturating_sub(1);
                // Moving up means the user is reading history.
                self.auto_scroll = false;
            }
        }
    }

    fn select_column(&mut self, delta: isize) {
        if self.pane != Pane::Board {
            return;
        }
        let last = BOARD_COLUMNS.len() - 1;
        self.selected_column = self.selected_column.saturating_add_signed(delta).min(last);
        self.clamp_selection();
    }

    fn toggle_expanded(&mut self) {
        match self.pane {
            Pane::Board => {
                let id = self.selected_story_id().map(str::to_string);
                self.expanded_story = if self.expanded_story == id { None } else { id };
            }
            Pane::Log => {
                if self.log_selected >= self.board.records.len() {
                    return;
                }
                if !self.expanded_iterations.remove(&self.log_selected) {
                    self.expanded_iterations.insert(self.log_selected);
                }
            }
        }
    }

    fn toggle_auto_scroll(&mut self) {
        self.auto_scroll = !self.auto_scroll;
        if self.auto_scroll {
            self.log_selected = self.board.records.len().saturating_sub(1);
        }
        let state = if self.auto_scroll { "on" } else { "off" };
        self.notify(Toast::info(format!("Auto-scroll {}", state)));
    }

    fn clamp_selection(&mut self) {
        let len = self.column_len(self.selected_column);
        self.selected_story = self.selected_story.min(len.saturating_sub(1));
        self.log_selected = self
            .log_selected
            .min(self.board.records.len().saturating_sub(1));
    }

    pub fn open_settings(&mut self) {
        self.dialog = Some(SettingsDialog::new(&self.settings));
    }

    /// Persist the dialog's edits.
    fn save_settings(&mut self) -> Action {
        let Some(dialog) = &self.dialog else {
            return Action::None;
        };

        let update = match dialog.to_update(&self.settings) {
            Ok(update) => update,
            Err(message) => {
                self.notify(Toast::error(message));
                return Action::None;
            }
        };
        self.dialog = None;

        if update.is_empty() {
            self.notify(Toast::info("No changes"));
            return Action::None;
        }

        match self.store.update(&update) {
            Ok(settings) => {
                info!("settings saved");
                self.settings = settings;
                self.notify(Toast::success("Settings saved"));
            }
            Err(e) => {
                warn!(error = %e, "failed to save settings");
                self.notify(Toast::error(format!("Failed to save settings: {}", e)));
                return Action::None;
            }
        }

        let project = resolve_project(self.project_override.as_deref(), &self.settings);
        if project == self.project {
            return Action::None;
        }

        self.project = project;
        self.clear_board();
        Action::RestartWatcher
    }

    /// Write the loop prompt to `.ralph/prompt.md`.
    pub fn export_prompt(&mut self) {
        let Some(project) = &self.project else {
            self.notify(Toast::error("No project configured. Press s to set one."));
            return;
        };

        let path = project.prompt();
        let prompt = loop_prompt(self.settings.max_iterations);
        let toast = match atomic_write(&path, prompt.as_bytes()) {
            Ok(()) => {
                info!(path = %path.display(), "exported loop prompt");
                Toast::success(format!("Prompt written to {}", path.display()))
            }
            Err(e) => {
                warn!(error = %e, "failed to export prompt");
                Toast::error(format!("Failed to write prompt: {}", e))
            }
        };
        self.notify(toast);
    }

    fn reset_board(&mut self) -> Action {
        self.clear_board();
        self.notify(Toast::info("Board reset"));
        Action::RestartWatcher
    }

    fn clear_board(&mut self) {
        self.board = BoardState::reset();
        self.selected_story = 0;
        self.expanded_story = None;
        self.log_selected = 0;
        self.expanded_iterations.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ralph_core::parse_progress;
    use ralph_models::{Prd, Story, StoryStatus, ToastKind};
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app() -> (TempDir, App) {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));
        let app = App::new(store, Settings::default(), Some(dir.path().join("app")));
        (dir, app)
    }

    fn sample_prd() -> Prd {
        let mut stories = vec![
            Story::new("story-1", "Login form", "", vec![]),
            Story::new("story-2", "Logout", "", vec![]),
            Story::new("story-3", "Profile", "", vec![]),
        ];
        stories[2].status = StoryStatus::InProgress;
        Prd::new("Auth", stories)
    }

    fn progress_event(iterations: u32) -> WatchEvent {
        let content: String = (1..=iterations)
            .map(|n| format!("=== ITERATION {} ===\nStatus: COMPLETED\n", n))
            .collect();
        WatchEvent::ProgressUpdated {
            records: parse_progress(&content),
            content,
        }
    }

    #[test]
    fn test_toast_expiry() {
        let mut toasts = ToastQueue::default();
        let start = Instant::now();
        toasts.push(Toast::info("first"), start);
        toasts.push(Toast::info("second"), start + Duration::from_secs(2));

        toasts.expire(start + Duration::from_secs(3));
        assert_eq!(toasts.visible().len(), 2);

        toasts.expire(start + Duration::from_secs(5));
        assert_eq!(toasts.visible().len(), 1);
        assert_eq!(toasts.visible()[0].toast.message, "second");

        toasts.expire(start + Duration::from_secs(7));
        assert!(toasts.is_empty());
    }

    #[test]
    fn test_quit_keys() {
        for code in [KeyCode::Char('q'), KeyCode::Esc] {
            let (_dir, mut app) = test_app();
            app.handle_key(key(code));
            assert!(app.should_quit);
        }

        let (_dir, mut app) = test_app();
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_board_navigation() {
        let (_dir, mut app) = test_app();
        app.apply_event(&WatchEvent::PrdUpdated(sample_prd()));

        assert_eq!(app.selected_story_id(), Some("story-1"));
        app.handle_key(key(KeyCode::Char('j')));
        assert_eq!(app.selected_story_id(), Some("story-2"));
        app.handle_key(key(KeyCode::Char('j')));
        assert_eq!(app.selected_story_id(), Some("story-2"));

        app.handle_key(key(KeyCode::Char('l')));
        assert_eq!(app.selected_column, 1);
        assert_eq!(app.selected_story_id(), Some("story-3"));

        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Right));
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.selected_column, BOARD_COLUMNS.len() - 1);
        assert_eq!(app.selected_story_id(), None);
    }

    #[test]
    fn test_expand_story() {
        let (_dir, mut app) = test_app();
        app.apply_event(&WatchEvent::PrdUpdated(sample_prd()));

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.expanded_story.as_deref(), Some("story-1"));
        app.handle_key(key(KeyCode::Char(' ')));
        assert_eq!(app.expanded_story, None);
    }

    #[test]
    fn test_log_auto_scroll_follows_new_iterations() {
        let (_dir, mut app) = test_app();
        app.apply_event(&progress_event(3));
        assert_eq!(app.log_selected, 2);

        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.pane, Pane::Log);
        app.handle_key(key(KeyCode::Char('k')));
        assert_eq!(app.log_selected, 1);
        assert!(!app.auto_scroll);

        app.apply_event(&progress_event(5));
        assert_eq!(app.log_selected, 1);

        app.handle_key(key(KeyCode::Char('a')));
        assert!(app.auto_scroll);
        assert_eq!(app.log_selected, 4);
    }

    #[test]
    fn test_expand_iteration() {
        let (_dir, mut app) = test_app();
        app.apply_event(&progress_event(2));
        app.pane = Pane::Log;

        app.handle_key(key(KeyCode::Enter));
        assert!(app.expanded_iterations.contains(&1));
        app.handle_key(key(KeyCode::Enter));
        assert!(app.expanded_iterations.is_empty());
    }

    #[test]
    fn test_reset_requires_confirmation() {
        let (_dir, mut app) = test_app();
        app.apply_event(&WatchEvent::PrdUpdated(sample_prd()));

        assert_eq!(app.handle_key(key(KeyCode::Char('r'))), Action::None);
        assert!(app.confirm_reset);
        assert_eq!(app.handle_key(key(KeyCode::Char('n'))), Action::None);
        assert!(app.board.has_prd());

        app.handle_key(key(KeyCode::Char('r')));
        assert_eq!(app.handle_key(key(KeyCode::Char('y'))), Action::RestartWatcher);
        assert_eq!(app.board, BoardState::default());
    }

    #[test]
    fn test_export_prompt() {
        let (dir, mut app) = test_app();
        app.handle_key(key(KeyCode::Char('p')));

        let written = std::fs::read_to_string(dir.path().join("app/.ralph/prompt.md")).unwrap();
        assert!(written.contains("=== ITERATION"));
        assert_eq!(app.toasts.visible()[0].toast.kind, ToastKind::Success);
    }

    #[test]
    fn test_export_prompt_without_project() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));
        let mut app = App::new(store, Settings::default(), None);

        app.export_prompt();
        assert_eq!(app.toasts.visible()[0].toast.kind, ToastKind::Error);
    }

    #[test]
    fn test_settings_dialog_masks_key_and_filters_digits() {
        let mut dialog = SettingsDialog::new(&Settings {
            api_key: "sk-ant-secret".to_string(),
            ..Settings::default()
        });
        assert!(!dialog.display(SettingsField::ApiKey).contains("secret"));

        dialog.focus = SettingsField::MaxIterations;
        dialog.delete_char();
        dialog.delete_char();
        dialog.enter_char('x');
        dialog.enter_char('7');
        assert_eq!(dialog.max_iterations, "7");
    }

    #[test]
    fn test_settings_dialog_rejects_bad_values() {
        let settings = Settings::default();
        let mut dialog = SettingsDialog::new(&settings);

        dialog.max_iterations = "0".to_string();
        assert!(dialog.to_update(&settings).is_err());

        dialog.max_iterations = "5".to_string();
        dialog.project_path = "/nonexistent/ralph/project".to_string();
        assert!(dialog.to_update(&settings).unwrap_err().contains("does not exist"));
    }

    #[test]
    fn test_settings_save_changes_project() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));
        let mut app = App::new(store, Settings::default(), None);
        app.apply_event(&WatchEvent::PrdUpdated(sample_prd()));

        app.handle_key(key(KeyCode::Char('s')));
        app.handle_key(key(KeyCode::Tab));
        for c in dir.path().to_string_lossy().chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }

        assert_eq!(app.handle_key(key(KeyCode::Enter)), Action::RestartWatcher);
        assert!(app.dialog.is_none());
        assert_eq!(app.project.as_ref().map(|p| p.root()), Some(dir.path()));
        assert!(!app.board.has_prd());
        assert_eq!(app.store.load().unwrap().project_path, dir.path().to_string_lossy());
    }

    #[test]
    fn test_settings_save_without_changes() {
        let (_dir, mut app) = test_app();
        app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(app.handle_key(key(KeyCode::Enter)), Action::None);
        assert!(!app.store.path().exists());
        assert_eq!(app.toasts.visible()[0].toast.message, "No changes");
    }

    #[test]
    fn test_settings_escape_discards_edits() {
        let (_dir, mut app) = test_app();
        app.handle_key(key(KeyCode::Char('s')));
        app.handle_key(key(KeyCode::Char('x')));
        app.handle_key(key(KeyCode::Esc));

        assert!(app.dialog.is_none());
        assert!(!app.should_quit);
        assert_eq!(app.settings, Settings::default());
    }
}
