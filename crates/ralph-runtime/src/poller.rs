//! Polls a project's `.ralph/` files.

use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, trace, warn};

use ralph_core::{parse_prd, parse_progress, parse_session, ProjectFiles};

use crate::event::WatchEvent;

/// Reads `prd.json`, `session.json` and `progress.txt` on every tick.
///
/// Each file is read and decoded independently. A file that is missing or
/// doesn't decode produces no event, so subscribers keep their previous
/// state for it.
pub struct FileWatcher {
    files: ProjectFiles,
    event_tx: broadcast::Sender<WatchEvent>,
    shutdown: watch::Receiver<bool>,
    /// Progress content from the last successful read.
    last_progress: Option<String>,
}

impl FileWatcher {
    /// Creates a watcher for the given project.
    pub fn new(
        files: ProjectFiles,
        event_tx: broadcast::Sender<WatchEvent>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            files,
            event_tx,
            shutdown,
            last_progress: None,
        }
    }

    /// Run the polling loop until the shutdown signal.
    ///
    /// The first poll happens immediately.
    pub async fn run(&mut self, poll_interval: Duration) {
        let mut ticker = interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut shutdown = self.shutdown.clone();

        debug!(
            poll_interval_ms = poll_interval.as_millis(),
            project = %self.files.root().display(),
            "starting file watcher"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.poll_once().await;
                }
                changed = shutdown.changed() => {
                    // A dropped sender also means stop.
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("watcher received shutdown signal");
                        break;
                    }
                }
            }
        }

        debug!("file watcher stopped");
    }

    /// Read and decode all three files once, emitting an event per result.
    ///
    /// Returns the number of events emitted.
    pub async fn poll_once(&mut self) -> usize {
        let (prd, session, progress) = tokio::join!(
            read_file(self.files.prd()),
            read_file(self.files.session()),
            read_file(self.files.progress()),
        );

        let mut events = Vec::with_capacity(3);

        if let Some(text) = prd {
            match parse_prd(&text) {
                Some(prd) => events.push(WatchEvent::PrdUpdated(prd)),
                None => debug!("prd.json did not decode, keeping previous"),
            }
        }

        if let Some(text) = session {
            match parse_session(&text) {
                Some(session) => events.push(WatchEvent::SessionUpdated(session)),
                None => debug!("session.json did not decode, keeping previous"),
            }
        }

        if let Some(content) = progress {
            if self.last_progress.as_deref() != Some(content.as_str()) {
                let records = parse_progress(&content);
                trace!(records = records.len(), "progress changed");
                self.last_progress = Some(content.clone());
                events.push(WatchEvent::ProgressUpdated { content, records });
            }
        }

        let count = events.len();
        for event in events {
            // No receivers is fine.
            let _ = self.event_tx.send(event);
        }
        count
    }
}

/// Read a file, logging anything other than its absence.
async fn read_file(path: impl AsRef<Path>) -> Option<String> {
    let path = path.as_ref();
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Some(text),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            trace!(path = %path.display(), "file not present yet");
            None
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read file");
            None
        }
    }
}
