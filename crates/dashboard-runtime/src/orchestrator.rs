//! Async reload orchestrator.
//!
//! Drives a [`DataManager`] from a tokio task and sends a
//! [`DashboardSnapshot`] through an `mpsc` channel on start, whenever the
//! watched file changes, and whenever a reload is requested. The UI consumes
//! snapshots without any shared mutable state.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use dashboard_data::report::{DashboardReport, ReportOptions};
use tokio::sync::mpsc;
use tokio::time;

use crate::data_manager::DataManager;

// ── Public types ──────────────────────────────────────────────────────────────

/// One reload result forwarded to the UI.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    /// Latest good report, if any load has ever succeeded.
    pub report: Option<Arc<DashboardReport>>,
    /// Error of this reload, when it failed.
    pub error: Option<String>,
    /// When this reload finished.
    pub loaded_at: DateTime<Local>,
    /// Number of reloads performed so far, this one included.
    pub reload_count: u64,
}

// ── ReloadOrchestrator ────────────────────────────────────────────────────────

/// Background reload coordinator.
///
/// Call [`ReloadOrchestrator::start`] to spawn the reload loop and receive a
/// channel endpoint for [`DashboardSnapshot`] updates.
pub struct ReloadOrchestrator {
    path: PathBuf,
    sheet: Option<String>,
    options: ReportOptions,
    /// How often the file's modification time is checked.
    poll_interval: Duration,
    /// Reload automatically when the file changes.
    watch: bool,
}

impl ReloadOrchestrator {
    pub fn new(
        path: PathBuf,
        sheet: Option<String>,
        options: ReportOptions,
        poll_interval_secs: u64,
        watch: bool,
    ) -> Self {
        Self {
            path,
            sheet,
            options,
            poll_interval: Duration::from_secs(poll_interval_secs.max(1)),
            watch,
        }
    }

    /// Spawn the reload loop.
    ///
    /// Returns the snapshot receiver and a [`ReloadHandle`] used to request
    /// manual reloads or abort the loop.
    pub fn start(self) -> (mpsc::Receiver<DashboardSnapshot>, ReloadHandle) {
        let (tx, rx) = mpsc::channel(16);
        let (reload_tx, reload_rx) = mpsc::channel(4);

        let handle = tokio::spawn(async move {
            self.reload_loop(tx, reload_rx).await;
        });

        (rx, ReloadHandle { handle, reload_tx })
    }

    // ── Private implementation ────────────────────────────────────────────

    /// Load once immediately, then react to file changes and reload requests.
    ///
    /// Exits when the snapshot receiver is closed or every request sender is
    /// gone while not watching.
    async fn reload_loop(
        self,
        tx: mpsc::Sender<DashboardSnapshot>,
        mut reload_rx: mpsc::Receiver<()>,
    ) {
        let mut manager = DataManager::new(self.path.clone(), self.sheet.clone(), self.options.clone());

        if !reload_and_send(&mut manager, &tx).await {
            return;
        }

        let mut interval = time::interval(self.poll_interval);
        // First tick fires immediately; the initial load already happened.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick(), if self.watch => {
                    if tx.is_closed() {
                        tracing::debug!("snapshot channel closed; exiting loop");
                        break;
                    }
                    if manager.has_changed() {
                        tracing::info!(path = %self.path.display(), "source file changed; reloading");
                        if !reload_and_send(&mut manager, &tx).await {
                            break;
                        }
                    }
                }
                Some(()) = reload_rx.recv() => {
                    tracing::info!("manual reload requested");
                    if !reload_and_send(&mut manager, &tx).await {
                        break;
                    }
                }
                else => break,
            }
        }
    }
}

/// Refresh the manager and send the resulting snapshot.
///
/// Returns `false` when the receiver is gone.
async fn reload_and_send(manager: &mut DataManager, tx: &mpsc::Sender<DashboardSnapshot>) -> bool {
    let report = manager.refresh();
    let snapshot = DashboardSnapshot {
        report,
        error: manager.last_error().map(str::to_string),
        loaded_at: Local::now(),
        reload_count: manager.reload_count(),
    };

    if let Err(e) = tx.send(snapshot).await {
        tracing::warn!(error = %e, "failed to send snapshot; receiver dropped");
        return false;
    }
    true
}

// ── ReloadHandle ──────────────────────────────────────────────────────────────

/// A handle to the background reload task.
pub struct ReloadHandle {
    handle: tokio::task::JoinHandle<()>,
    reload_tx: mpsc::Sender<()>,
}

impl ReloadHandle {
    /// Ask the loop to reload now. Requests made while one is pending are
    /// coalesced.
    pub fn request_reload(&self) {
        if self.reload_tx.try_send(()).is_err() {
            tracing::debug!("reload already pending");
        }
    }

    /// Immediately abort the reload loop.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
