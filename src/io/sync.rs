use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::model::AppState;

/// Debounce window for autosave. Edits within this window coalesce into one
/// write; last write wins.
pub const DEBOUNCE: Duration = Duration::from_millis(800);

/// Anything that can persist the state document.
pub trait StateStore: Send + 'static {
    fn persist(&self, state: &AppState) -> Result<()>;
}

impl StateStore for super::api::StateClient {
    fn persist(&self, state: &AppState) -> Result<()> {
        self.save(state)
    }
}

/// Store used when no HTTP client could be built: drops every write after
/// logging it, so the app keeps working purely in memory.
pub struct NullStore;

impl StateStore for NullStore {
    fn persist(&self, _state: &AppState) -> Result<()> {
        tracing::debug!("no backend configured, dropping state snapshot");
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Idle,
    Pending,
    Saved,
    Failed,
}

/// Debounced background writer for the state document.
///
/// Snapshots queue through a channel; the worker keeps only the newest one
/// and writes it once the debounce window closes. A failed write is logged
/// and retried on the next cycle, never surfaced to the user.
pub struct Autosaver {
    tx: Sender<AppState>,
    status: Arc<Mutex<SyncStatus>>,
}

impl Autosaver {
    pub fn spawn(store: impl StateStore) -> Self {
        Self::spawn_with(store, DEBOUNCE)
    }

    pub fn spawn_with(store: impl StateStore, debounce: Duration) -> Self {
        let (tx, rx) = mpsc::channel::<AppState>();
        let status = Arc::new(Mutex::new(SyncStatus::Idle));
        let worker_status = Arc::clone(&status);

        thread::Builder::new()
            .name("autosave".into())
            .spawn(move || run_worker(store, rx, worker_status, debounce))
            .expect("failed to spawn autosave thread");

        Self { tx, status }
    }

    /// Queue a snapshot. Coalesced with any snapshot already waiting.
    pub fn queue(&self, state: AppState) {
        if self.tx.send(state).is_ok() {
            *self.status.lock().unwrap() = SyncStatus::Pending;
        }
    }

    pub fn status(&self) -> SyncStatus {
        *self.status.lock().unwrap()
    }
}

fn run_worker(
    store: impl StateStore,
    rx: Receiver<AppState>,
    status: Arc<Mutex<SyncStatus>>,
    debounce: Duration,
) {
    let mut pending: Option<AppState> = None;
    let mut due: Option<Instant> = None;

    loop {
        let wait = match due {
            Some(at) => at.saturating_duration_since(Instant::now()),
            None => Duration::from_millis(250),
        };
        match rx.recv_timeout(wait) {
            Ok(state) => {
                // Newest snapshot replaces whatever was waiting.
                pending = Some(state);
                due = Some(Instant::now() + debounce);
            }
            Err(RecvTimeoutError::Timeout) => {
                let matured = due.is_some_and(|at| Instant::now() >= at);
                if !matured {
                    continue;
                }
                if let Some(state) = pending.take() {
                    match store.persist(&state) {
                        Ok(()) => {
                            due = None;
                            *status.lock().unwrap() = SyncStatus::Saved;
                        }
                        Err(err) => {
                            tracing::warn!(error = %err, "state save failed, will retry");
                            // Keep the snapshot and retry after another window.
                            pending = Some(state);
                            due = Some(Instant::now() + debounce);
                            *status.lock().unwrap() = SyncStatus::Failed;
                        }
                    }
                } else {
                    due = None;
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                // App is shutting down: one last attempt with whatever is queued.
                if let Some(state) = pending.take() {
                    if let Err(err) = store.persist(&state) {
                        tracing::warn!(error = %err, "final state save failed");
                    }
                }
                return;
            }
        }
    }
}

/// Fire a one-shot background load; the UI polls the receiver each frame.
pub fn spawn_load(
    client: super::api::StateClient,
) -> Receiver<Result<Option<AppState>>> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("state-load".into())
        .spawn(move || {
            let _ = tx.send(client.load());
        })
        .expect("failed to spawn load thread");
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::state::seed_state;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Default)]
    struct RecordingStore {
        saves: Arc<Mutex<Vec<usize>>>,
        fail_first: Arc<AtomicUsize>,
    }

    impl StateStore for RecordingStore {
        fn persist(&self, state: &AppState) -> Result<()> {
            if self.fail_first.load(Ordering::SeqCst) > 0 {
                self.fail_first.fetch_sub(1, Ordering::SeqCst);
                anyhow::bail!("backend unavailable");
            }
            self.saves.lock().unwrap().push(state.version as usize);
            Ok(())
        }
    }

    fn versioned(version: u32) -> AppState {
        let mut state = seed_state();
        state.version = version;
        state
    }

    #[test]
    fn rapid_edits_coalesce_to_last_write() {
        let store = RecordingStore::default();
        let saves = Arc::clone(&store.saves);
        let saver = Autosaver::spawn_with(store, Duration::from_millis(30));

        saver.queue(versioned(1));
        saver.queue(versioned(2));
        saver.queue(versioned(3));

        thread::sleep(Duration::from_millis(250));
        assert_eq!(saves.lock().unwrap().as_slice(), &[3]);
        assert_eq!(saver.status(), SyncStatus::Saved);
    }

    #[test]
    fn failed_save_retries_on_next_cycle() {
        let store = RecordingStore::default();
        store.fail_first.store(1, Ordering::SeqCst);
        let saves = Arc::clone(&store.saves);
        let saver = Autosaver::spawn_with(store, Duration::from_millis(30));

        saver.queue(versioned(7));
        thread::sleep(Duration::from_millis(300));
        assert_eq!(saves.lock().unwrap().as_slice(), &[7]);
        assert_eq!(saver.status(), SyncStatus::Saved);
    }
}
