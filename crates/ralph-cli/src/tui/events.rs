//! Event handling for the TUI.

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::runtime::Runtime;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, warn};

use ralph_runtime::{RuntimeConfig, WatchEvent, Watcher};

use super::app::{Action, App};
use super::ui;
use crate::error::Result;
use crate::Context;

/// A running watcher and the receiving end of its events.
struct Feed {
    watcher: Watcher,
    events: broadcast::Receiver<WatchEvent>,
}

/// Initialize the terminal for TUI mode.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the dashboard until the user quits.
pub fn run(ctx: &Context) -> Result<()> {
    let settings = ctx.settings()?;
    let mut app = App::new(ctx.store.clone(), settings, ctx.project_override.clone());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let mut feed = start_feed(&runtime, &app)?;

    // Setup terminal
    let mut terminal = setup_terminal()?;

    // Run event loop
    let result = run_loop(&mut terminal, &mut app, &runtime, &mut feed);

    // Restore terminal
    restore_terminal(&mut terminal)?;

    stop_feed(&runtime, feed.take());
    result
}

/// Main event loop.
fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    runtime: &Runtime,
    feed: &mut Option<Feed>,
) -> Result<()> {
    let tick_rate = Duration::from_millis(100);

    loop {
        if let Some(feed) = feed.as_mut() {
            drain_events(&mut feed.events, app);
        }
        app.tick(Instant::now());

        // Draw UI
        terminal.draw(|f| ui::draw(f, app))?;

        // Poll for events with timeout
        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                if app.handle_key(key) == Action::RestartWatcher {
                    stop_feed(runtime, feed.take());
                    *feed = start_feed(runtime, app)?;
                }
            }
        }

        // Check if should quit
        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Apply every event waiting in the channel.
fn drain_events(events: &mut broadcast::Receiver<WatchEvent>, app: &mut App) {
    loop {
        match events.try_recv() {
            Ok(event) => {
                debug!(file = event.file_name(), "applying watch event");
                app.apply_event(&event);
            }
            Err(TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "dashboard fell behind the watcher");
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }
}

/// Start watching the app's project, if it has one.
fn start_feed(runtime: &Runtime, app: &App) -> Result<Option<Feed>> {
    let Some(files) = app.project.clone() else {
        return Ok(None);
    };

    let mut watcher = Watcher::new(files, RuntimeConfig::default());
    let events = watcher.subscribe();
    runtime.block_on(watcher.start())?;

    Ok(Some(Feed { watcher, events }))
}

fn stop_feed(runtime: &Runtime, feed: Option<Feed>) {
    let Some(mut feed) = feed else {
        return;
    };
    if let Err(e) = runtime.block_on(feed.watcher.shutdown()) {
        warn!(error = %e, "failed to stop watcher");
    }
}
