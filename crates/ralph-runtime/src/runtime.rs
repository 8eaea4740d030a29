//! Watcher lifecycle.

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use ralph_core::ProjectFiles;

use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::event::WatchEvent;
use crate::poller::FileWatcher;

/// Owns the polling task for one project.
///
/// Subscribers survive restarts: the event channel belongs to the watcher, not
/// to the task.
pub struct Watcher {
    files: ProjectFiles,
    config: RuntimeConfig,
    /// Event broadcast channel.
    event_tx: broadcast::Sender<WatchEvent>,
    /// Handle to the polling task.
    poller_handle: Option<JoinHandle<()>>,
    /// Shutdown signal for the current task.
    shutdown_tx: Option<watch::Sender<bool>>,
}

impl Watcher {
    /// Create a watcher for the given project.
    pub fn new(files: ProjectFiles, config: RuntimeConfig) -> Self {
        let (event_tx, _) = broadcast::channel(config.channel_capacity);
        Self {
            files,
            config,
            event_tx,
            poller_handle: None,
            shutdown_tx: None,
        }
    }

    /// Start polling.
    pub async fn start(&mut self) -> Result<()> {
        if self.is_started() {
            return Err(RuntimeError::AlreadyStarted);
        }

        info!(project = %self.files.root().display(), "starting watcher");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut poller = FileWatcher::new(self.files.clone(), self.event_tx.clone(), shutdown_rx);
        let poll_interval = self.config.poll_interval;

        let handle = tokio::spawn(async move {
            poller.run(poll_interval).await;
        });

        self.poller_handle = Some(handle);
        self.shutdown_tx = Some(shutdown_tx);

        debug!("watcher started");
        Ok(())
    }

    /// Stop polling and wait for the task to finish.
    pub async fn shutdown(&mut self) -> Result<()> {
        let Some(shutdown_tx) = self.shutdown_tx.take() else {
            return Err(RuntimeError::NotStarted);
        };

        info!("shutting down watcher");

        shutdown_tx.send(true).map_err(|e| {
            RuntimeError::Shutdown(format!("failed to send shutdown signal: {}", e))
        })?;

        if let Some(handle) = self.poller_handle.take() {
            debug!("waiting for poller to stop");
            handle
                .await
                .map_err(|e| RuntimeError::Shutdown(format!("poller task panicked: {}", e)))?;
        }

        info!("watcher stopped");
        Ok(())
    }

    /// Subscribe to watch events.
    pub fn subscribe(&self) -> broadcast::Receiver<WatchEvent> {
        self.event_tx.subscribe()
    }

    /// Check if the watcher is running.
    pub fn is_started(&self) -> bool {
        self.shutdown_tx.is_some()
    }

    /// The watched project.
    pub fn files(&self) -> &ProjectFiles {
        &self.files
    }
}

impl Drop for Watcher {
    fn drop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(true);
        }
    }
}
