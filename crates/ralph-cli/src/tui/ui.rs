//! TUI rendering using ratatui.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use ralph_core::format_timestamp;
use ralph_models::{IterationRecord, IterationStatus, SessionStatus, Story, StoryStatus, ToastKind};
use ralph_runtime::Column;

use super::app::{App, Pane, SettingsField};

/// Draw the TUI.
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(5),    // Board + log
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
        .split(chunks[1]);

    draw_board(frame, app, body[0]);
    draw_log(frame, app, body[1]);
    draw_footer(frame, app, chunks[2]);

    draw_toasts(frame, app, chunks[1]);

    if app.dialog.is_some() {
        draw_settings(frame, app);
    } else if app.confirm_reset {
        draw_confirm_reset(frame);
    }
}

fn session_color(status: SessionStatus) -> Color {
    match status {
        SessionStatus::Idle => Color::Gray,
        SessionStatus::Running => Color::Green,
        SessionStatus::Paused => Color::Yellow,
        SessionStatus::Completed => Color::Cyan,
    }
}

fn iteration_color(status: IterationStatus) -> Color {
    match status {
        IterationStatus::Started => Color::Yellow,
        IterationStatus::Completed => Color::Green,
        IterationStatus::Failed => Color::Red,
    }
}

fn column_color(status: StoryStatus) -> Color {
    match status {
        StoryStatus::Backlog => Color::Gray,
        StoryStatus::InProgress => Color::Yellow,
        StoryStatus::Testing => Color::Magenta,
        StoryStatus::Done => Color::Green,
        StoryStatus::Failed => Color::Red,
    }
}

/// Draw the header bar.
fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let session = &app.board.session;
    let title = app
        .board
        .prd
        .as_ref()
        .map(|prd| prd.title.as_str())
        .unwrap_or("No PRD loaded");

    let line = Line::from(vec![
        Span::styled(
            " Ralph Board ",
            Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            format!(" {} ", session.status.label()),
            Style::default()
                .bg(session_color(session.status))
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "  Iteration {} / {}  ",
            session.current_iteration, app.settings.max_iterations
        )),
        Span::styled(title.to_string(), Style::default().add_modifier(Modifier::BOLD)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Draw the kanban columns.
fn draw_board(frame: &mut Frame, app: &App, area: Rect) {
    if !app.board.has_prd() {
        let message = match &app.project {
            None => "No project configured. Press s to open settings.".to_string(),
            Some(project) if !project.has_ralph_dir() => format!(
                "No .ralph/ directory in {}. Press p to export the loop prompt.",
                project.root().display()
            ),
            Some(_) => "Waiting for .ralph/prd.json ...".to_string(),
        };
        let placeholder = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Board "));
        frame.render_widget(placeholder, area);
        return;
    }

    let columns = app.board.columns();
    let constraints = vec![Constraint::Ratio(1, columns.len() as u32); columns.len()];
    let areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (index, (column, column_area)) in columns.iter().zip(areas.iter()).enumerate() {
        draw_column(frame, app, index, column, *column_area);
    }
}

fn draw_column(frame: &mut Frame, app: &App, index: usize, column: &Column<'_>, area: Rect) {
    let focused = app.pane == Pane::Board && app.selected_column == index;
    let border_style = if focused {
        Style::default().fg(column_color(column.status))
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(format!(" {} ({}) ", column.status.label(), column.stories.len()));

    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = column
        .stories
        .iter()
        .map(|story| {
            let expanded = app.expanded_story.as_deref() == Some(story.id.as_str());
            ListItem::new(story_card(story, expanded, width))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("▌");

    let mut state = ListState::default();
    if focused && !column.stories.is_empty() {
        state.select(Some(app.selected_story));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn story_card(story: &Story, expanded: bool, width: usize) -> Vec<Line<'static>> {
    let dim = Style::default().fg(Color::DarkGray);

    let mut meta = format!("{} criteria", story.acceptance_criteria.len());
    if let Some(iteration) = story.iteration {
        meta.push_str(&format!(" · iter {}", iteration));
    }
    if story.passes {
        meta.push_str(" · passing");
    }

    let mut lines = vec![
        Line::from(Span::styled(story.id.clone(), dim)),
        Line::from(Span::styled(
            truncate(&story.title, width),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(meta, dim)),
    ];

    if expanded {
        if !story.description.is_empty() {
            lines.push(Line::from(truncate(&story.description, width)));
        }
        for criterion in &story.acceptance_criteria {
            lines.push(Line::from(format!("✓ {}", truncate(criterion, width.saturating_sub(2)))));
        }
        for file in &story.files_changed {
            lines.push(Line::from(Span::styled(format!("  {}", file), dim)));
        }
        if !story.notes.is_empty() {
            lines.push(Line::from(Span::styled(
                truncate(&story.notes, width),
                Style::default().add_modifier(Modifier::ITALIC),
            )));
        }
    }

    lines.push(Line::from(""));
    lines
}

/// Draw the execution log.
fn draw_log(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.pane == Pane::Log;
    let scroll = if app.auto_scroll { " [auto-scroll]" } else { "" };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        })
        .title(format!(" Execution Log{} ", scroll));

    if app.board.records.is_empty() {
        let empty = Paragraph::new("No iterations yet. Start the loop to see progress here.")
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = app
        .board
        .records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            ListItem::new(log_entry(record, app.expanded_iterations.contains(&i), width))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default().with_selected(Some(app.log_selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn log_entry(record: &IterationRecord, expanded: bool, width: usize) -> Vec<Line<'static>> {
    let title = if record.story_title.is_empty() {
        "Unknown story"
    } else {
        record.story_title.as_str()
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!("#{} ", record.iteration),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(truncate(title, width.saturating_sub(14))),
        Span::raw(" "),
        Span::styled(
            record.status.as_str(),
            Style::default().fg(iteration_color(record.status)),
        ),
    ])];

    if !expanded {
        return lines;
    }

    let dim = Style::default().fg(Color::DarkGray);
    if !record.timestamp.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("  Started: {}", format_timestamp(&record.timestamp)),
            dim,
        )));
    }
    for log in &record.log_lines {
        lines.push(Line::from(format!("  {}", truncate(log, width.saturating_sub(2)))));
    }
    if !record.files_changed.is_empty() {
        lines.push(Line::from(Span::styled("  Files changed:", dim)));
        for file in &record.files_changed {
            lines.push(Line::from(format!("    {}", file)));
        }
    }
    if !record.learnings.is_empty() {
        lines.push(Line::from(Span::styled("  Learnings:", dim)));
        for learning in &record.learnings {
            lines.push(Line::from(format!("    {}", truncate(learning, width.saturating_sub(4)))));
        }
    }
    lines
}

/// Draw the footer with keybindings.
fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let project = app
        .project
        .as_ref()
        .map(|p| p.root().display().to_string())
        .unwrap_or_else(|| "no project".to_string());

    let keys = if app.dialog.is_some() {
        "Tab: next field | Enter: save | Esc: cancel"
    } else if app.confirm_reset {
        "y: reset board | any other key: cancel"
    } else {
        "Tab: pane | j/k h/l: move | Enter: expand | a: auto-scroll | s: settings | p: prompt | r: reset | q: quit"
    };

    let footer = Paragraph::new(format!(" {} | {} ", project, keys))
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(footer, area);
}

/// Stack toasts in the top-right corner of `area`.
fn draw_toasts(frame: &mut Frame, app: &App, area: Rect) {
    let width = area.width.min(48);
    let mut y = area.y + 1;

    for entry in app.toasts.visible().iter().rev() {
        if y + 3 > area.y + area.height {
            break;
        }
        let color = match entry.toast.kind {
            ToastKind::Success => Color::Green,
            ToastKind::Error => Color::Red,
            ToastKind::Info => Color::Blue,
        };
        let rect = Rect::new(area.x + area.width - width, y, width, 3);
        let toast = Paragraph::new(truncate(&entry.toast.message, width.saturating_sub(2) as usize))
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(color)));

        frame.render_widget(Clear, rect);
        frame.render_widget(toast, rect);
        y += 3;
    }
}

fn draw_settings(frame: &mut Frame, app: &App) {
    let Some(dialog) = &app.dialog else {
        return;
    };
    let area = centered_rect(64, 9, frame.area());

    let mut lines = vec![Line::from("")];
    for field in SettingsField::ALL {
        let focused = dialog.focus == field;
        let value_style = if focused {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default()
        };
        let marker = if focused { "> " } else { "  " };
        lines.push(Line::from(vec![
            Span::raw(format!("{}{:<16}", marker, field.label())),
            Span::styled(format!("{} ", dialog.display(field)), value_style),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Tab: next field | Enter: save | Esc: cancel",
        Style::default().fg(Color::DarkGray),
    )));

    let popup = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Settings "),
    );

    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

fn draw_confirm_reset(frame: &mut Frame) {
    let area = centered_rect(44, 5, frame.area());
    let popup = Paragraph::new(vec![
        Line::from(""),
        Line::from("  Reset board state? (y/n)"),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Reset "),
    );

    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

/// A `width` x `height` rectangle centered in `area`, clipped to fit.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Shorten `text` to `max` characters, ending in `…` when cut.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(max - 1).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ralph_core::parse_progress;
    use ralph_models::{Prd, Settings, Toast};
    use ralph_persistence::SettingsStore;
    use ralph_runtime::WatchEvent;
    use ratatui::{backend::TestBackend, Terminal};

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();

        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app_with_project(dir: &tempfile::TempDir) -> App {
        let store = SettingsStore::new(dir.path().join("settings.json"));
        App::new(store, Settings::default(), Some(dir.path().to_path_buf()))
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer title", 6), "a lon…");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn test_centered_rect_clips() {
        let rect = centered_rect(100, 50, Rect::new(0, 0, 40, 10));
        assert_eq!(rect, Rect::new(0, 0, 40, 10));

        let rect = centered_rect(20, 4, Rect::new(0, 0, 40, 10));
        assert_eq!(rect, Rect::new(10, 3, 20, 4));
    }

    #[test]
    fn test_render_without_project() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));
        let app = App::new(store, Settings::default(), None);

        let screen = render(&app);
        assert!(screen.contains("No project configured"));
        assert!(screen.contains("Idle"));
        assert!(screen.contains("Iteration 0 / 10"));
        assert!(screen.contains("No iterations yet"));
    }

    #[test]
    fn test_render_board_and_log() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_project(&dir);

        let mut story = Story::new("story-1", "Add login form", "", vec!["Renders".into()]);
        story.status = StoryStatus::InProgress;
        app.apply_event(&WatchEvent::PrdUpdated(Prd::new("Auth flow", vec![story])));

        let content = "=== ITERATION 1 ===\nStory: story-1 - Add login form\nStatus: COMPLETED\n".to_string();
        app.apply_event(&WatchEvent::ProgressUpdated {
            records: parse_progress(&content),
            content,
        });

        let screen = render(&app);
        assert!(screen.contains("Auth flow"));
        assert!(screen.contains("Backlog (0)"));
        assert!(screen.contains("In Progress (1)"));
        assert!(screen.contains("1 criteria"));
        assert!(screen.contains("#1 Add login form COMPLETED"));
        assert!(screen.contains("[auto-scroll]"));
    }

    #[test]
    fn test_render_expanded_iteration() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_project(&dir);

        let content = "=== ITERATION 2 ===
Timestamp: not-a-date
[10:30:15] Creating component
Files Changed:
- src/Login.tsx (+42/-0)
"
        .to_string();
        app.apply_event(&WatchEvent::ProgressUpdated {
            records: parse_progress(&content),
            content,
        });
        app.expanded_iterations.insert(0);

        let screen = render(&app);
        assert!(screen.contains("#2 Unknown story STARTED"));
        assert!(screen.contains("Started: not-a-date"));
        assert!(screen.contains("[10:30:15] Creating component"));
        assert!(screen.contains("src/Login.tsx"));
    }

    #[test]
    fn test_render_settings_dialog_masks_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));
        let settings = Settings {
            api_key: "sk-ant-abcdefgh".to_string(),
            ..Settings::default()
        };
        let mut app = App::new(store, settings, None);
        app.open_settings();

        let screen = render(&app);
        assert!(screen.contains(" Settings "));
        assert!(screen.contains("efgh"));
        assert!(!screen.contains("sk-ant"));
    }

    #[test]
    fn test_render_toast() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_project(&dir);
        app.notify(Toast::success("Settings saved"));

        assert!(render(&app).contains("Settings saved"));
    }
}
