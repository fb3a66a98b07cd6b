//! AutoSaver - Debounced background persistence of one analysis.
//!
//! Every mutation of an open analysis hands the saver a fresh snapshot.
//! The saver waits for edits to go quiet before writing, and never runs
//! two saves of the same analysis at once.
//!
//! ## Scheduling
//!
//! | Event | Effect |
//! |-------|--------|
//! | `schedule` | Replace the pending snapshot and restart the quiet timer |
//! | timer fires | Start saving the pending snapshot, or queue it behind the in-flight save |
//! | `save_now` | Same as a timer firing immediately |
//! | save completes | Publish the outcome, then start the queued snapshot if any |
//! | close / drop | Discard the pending snapshot, finish the in-flight and queued saves |
//!
//! A newer queued snapshot replaces an older queued one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, Instant};

use crate::domain::analysis::{AnalysisSnapshot, RecordState};
use crate::domain::foundation::AnalysisId;
use crate::ports::{AnalysisStore, StoreError};

/// Configuration for the AutoSaver.
#[derive(Debug, Clone)]
pub struct AutoSaveConfig {
    /// How long edits must stay quiet before a save starts.
    pub debounce: Duration,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(1000),
        }
    }
}

impl AutoSaveConfig {
    /// Create config with a custom debounce window.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

/// Persistence progress of one analysis, published after every change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStatus {
    /// Revision currently being written.
    pub in_flight: Option<u64>,
    /// Highest revision confirmed by the store.
    pub last_saved: Option<u64>,
    /// Message of the most recent failed save, cleared by the next success.
    pub last_error: Option<String>,
}

impl SyncStatus {
    /// Status of a record that is already stored at `revision`.
    pub fn saved_at(revision: u64) -> Self {
        Self {
            last_saved: Some(revision),
            ..Self::default()
        }
    }

    /// Derives the record state for a record currently at `revision`.
    pub fn record_state(&self, revision: u64) -> RecordState {
        if self.in_flight.is_some() {
            RecordState::Saving
        } else if self.last_saved == Some(revision) {
            RecordState::Loaded
        } else {
            RecordState::Dirty
        }
    }
}

enum Command {
    Schedule(AnalysisSnapshot),
    SaveNow(AnalysisSnapshot),
}

type SaveOutcome = (u64, Result<(), StoreError>);

/// Handle to the background save task of one analysis.
///
/// Dropping the handle discards any pending save; saves already in
/// flight or queued still run to completion.
pub struct AutoSaver {
    commands: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<SyncStatus>,
    task: JoinHandle<()>,
}

impl AutoSaver {
    /// Spawns the save task for an analysis.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        id: AnalysisId,
        store: Arc<dyn AnalysisStore>,
        config: AutoSaveConfig,
        initial: SyncStatus,
    ) -> Self {
        let (commands, receiver) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(initial);

        let worker = Worker {
            id,
            store,
            debounce: config.debounce,
            status: status_tx,
        };
        let task = tokio::spawn(worker.run(receiver));

        Self {
            commands,
            status,
            task,
        }
    }

    /// Schedules a debounced save of the snapshot.
    pub fn schedule(&self, snapshot: AnalysisSnapshot) {
        tracing::debug!(revision = snapshot.revision, "Scheduling save");
        self.send(Command::Schedule(snapshot));
    }

    /// Saves the snapshot without waiting for the debounce window.
    pub fn save_now(&self, snapshot: AnalysisSnapshot) {
        tracing::debug!(revision = snapshot.revision, "Saving immediately");
        self.send(Command::SaveNow(snapshot));
    }

    /// Returns the latest sync status.
    pub fn status(&self) -> SyncStatus {
        self.status.borrow().clone()
    }

    /// Subscribes to sync status changes.
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status.clone()
    }

    /// Stops the saver, discarding any pending save.
    ///
    /// Waits for saves already in flight or queued and returns the final status.
    pub async fn close(self) -> SyncStatus {
        let AutoSaver {
            commands,
            status,
            task,
        } = self;
        drop(commands);
        if let Err(e) = task.await {
            tracing::error!(error = %e, "Save task ended abnormally");
        }
        let final_status = status.borrow().clone();
        final_status
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::warn!("Save task is no longer running; edit not persisted");
        }
    }
}

struct Worker {
    id: AnalysisId,
    store: Arc<dyn AnalysisStore>,
    debounce: Duration,
    status: watch::Sender<SyncStatus>,
}

impl Worker {
    async fn run(self, mut commands: mpsc::UnboundedReceiver<Command>) {
        let mut pending: Option<AnalysisSnapshot> = None;
        let mut deadline: Option<Instant> = None;
        let mut queued: Option<AnalysisSnapshot> = None;
        let mut in_flight: Option<JoinHandle<SaveOutcome>> = None;

        loop {
            tokio::select! {
                biased;

                command = commands.recv() => match command {
                    Some(Command::Schedule(snapshot)) => {
                        pending = Some(snapshot);
                        deadline = Some(Instant::now() + self.debounce);
                    }
                    Some(Command::SaveNow(snapshot)) => {
                        pending = None;
                        deadline = None;
                        self.start_or_queue(snapshot, &mut in_flight, &mut queued);
                    }
                    None => break,
                },

                outcome = wait_for(&mut in_flight) => {
                    in_flight = None;
                    self.finish(outcome);
                    if let Some(snapshot) = queued.take() {
                        in_flight = Some(self.start(snapshot));
                    }
                }

                _ = sleep_until(deadline) => {
                    deadline = None;
                    if let Some(snapshot) = pending.take() {
                        self.start_or_queue(snapshot, &mut in_flight, &mut queued);
                    }
                }
            }
        }

        if let Some(snapshot) = pending {
            tracing::debug!(
                analysis_id = %self.id,
                revision = snapshot.revision,
                "Discarding pending snapshot on close"
            );
        }
        // Queued snapshots have already fired.
        if let Some(handle) = in_flight {
            self.finish(handle.await);
        }
        if let Some(snapshot) = queued {
            self.finish(self.start(snapshot).await);
        }
    }

    fn start_or_queue(
        &self,
        snapshot: AnalysisSnapshot,
        in_flight: &mut Option<JoinHandle<SaveOutcome>>,
        queued: &mut Option<AnalysisSnapshot>,
    ) {
        if in_flight.is_some() {
            tracing::debug!(
                analysis_id = %self.id,
                revision = snapshot.revision,
                "Save in flight; queueing snapshot"
            );
            *queued = Some(snapshot);
        } else {
            *in_flight = Some(self.start(snapshot));
        }
    }

    fn start(&self, snapshot: AnalysisSnapshot) -> JoinHandle<SaveOutcome> {
        let revision = snapshot.revision;
        self.status
            .send_modify(|status| status.in_flight = Some(revision));

        let store = Arc::clone(&self.store);
        let id = self.id;
        tokio::spawn(async move { (revision, store.save(id, &snapshot).await) })
    }

    fn finish(&self, outcome: Result<SaveOutcome, JoinError>) {
        let (revision, result) = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                let in_flight = self.status.borrow().in_flight.unwrap_or_default();
                (in_flight, Err(StoreError::Unavailable(e.to_string())))
            }
        };

        match result {
            Ok(()) => {
                tracing::info!(analysis_id = %self.id, revision, "Analysis saved");
                self.status.send_modify(|status| {
                    status.in_flight = None;
                    status.last_saved = Some(status.last_saved.map_or(revision, |r| r.max(revision)));
                    status.last_error = None;
                });
            }
            Err(e) => {
                tracing::warn!(analysis_id = %self.id, revision, error = %e, "Analysis save failed");
                self.status.send_modify(|status| {
                    status.in_flight = None;
                    status.last_error = Some(format!("Changes could not be saved: {}", e));
                });
            }
        }
    }
}

async fn wait_for(
    in_flight: &mut Option<JoinHandle<SaveOutcome>>,
) -> Result<SaveOutcome, JoinError> {
    match in_flight {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
