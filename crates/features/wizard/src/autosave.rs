use crate::draft::DraftStore;
use crate::error::WizardError;
use fleetdesk_domain::constants::DEFAULT_AUTOSAVE_INTERVAL_MS;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{Instrument, debug, debug_span};

pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_millis(DEFAULT_AUTOSAVE_INTERVAL_MS);

/// Periodic draft snapshots.
#[derive(Debug, Clone, Copy)]
pub struct Autosave;

impl Autosave {
    /// Starts saving `get_current_data()` into `store` every `interval`.
    ///
    /// The first save happens one full interval after this call. A tick that runs long
    /// pushes the next one back instead of triggering a catch-up burst. The timer lives
    /// on the current tokio runtime until the returned handle is stopped or dropped.
    ///
    /// `get_current_data` must not stop its own handle; the tick holds the stop gate
    /// while it runs.
    ///
    /// # Errors
    ///
    /// - [`WizardError::InvalidInterval`] for a zero `interval`.
    /// - [`WizardError::Runtime`] when called outside a tokio runtime.
    pub fn start<T, F>(
        store: DraftStore<T>,
        get_current_data: F,
        interval: Duration,
    ) -> Result<AutosaveHandle, WizardError>
    where
        T: Serialize + Send + 'static,
        F: Fn() -> T + Send + 'static,
    {
        if interval.is_zero() {
            return Err(WizardError::InvalidInterval {
                message: "interval must be greater than zero".into(),
                context: None,
            });
        }
        let runtime = Handle::try_current()?;

        let ticks = Arc::new(AtomicU64::new(0));
        let live = Arc::new(Mutex::new(true));
        let span = debug_span!("autosave", key = %store.key(), ?interval);
        let first_tick = Instant::now() + interval;

        let task = runtime.spawn({
            let (ticks, live) = (Arc::clone(&ticks), Arc::clone(&live));
            async move {
                let mut timer = tokio::time::interval_at(first_tick, interval);
                timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    timer.tick().await;
                    let gate = live.lock();
                    if !*gate {
                        break;
                    }
                    store.save(&get_current_data());
                    ticks.fetch_add(1, Ordering::Release);
                    drop(gate);
                }
            }
            .instrument(span)
        });

        debug!(?interval, "Autosave started");
        Ok(AutosaveHandle { task: task.abort_handle(), live, running: AtomicBool::new(true), ticks })
    }
}

/// Owner of a running autosave timer. Dropping it stops the timer.
#[derive(Debug)]
#[must_use = "Dropping the handle stops autosave immediately"]
pub struct AutosaveHandle {
    task: AbortHandle,
    live: Arc<Mutex<bool>>,
    running: AtomicBool,
    ticks: Arc<AtomicU64>,
}

impl AutosaveHandle {
    /// Cancels the timer. Safe to call any number of times.
    ///
    /// A save already in progress finishes before this returns; none starts after.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::AcqRel) {
            *self.live.lock() = false;
            self.task.abort();
            debug!(ticks = self.ticks(), "Autosave stopped");
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Completed save attempts, successful or not.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }
}

impl Drop for AutosaveHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetdesk_storage::{KeyValueStore, MemoryStore};
    use serde_json::{Value, json};

    fn store() -> DraftStore<Value> {
        DraftStore::open(Arc::new(MemoryStore::new()), "autosave").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_is_rejected() {
        let err = Autosave::start(store(), || json!({}), Duration::ZERO).unwrap_err();
        assert_eq!(err.kind(), "InvalidInterval");
    }

    #[test]
    fn outside_runtime_is_an_error() {
        let err = Autosave::start(store(), || json!({}), Duration::from_secs(1)).unwrap_err();
        assert_eq!(err.kind(), "Runtime");
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_is_saved_before_the_first_interval() {
        let memory = Arc::new(MemoryStore::new());
        let drafts: DraftStore<Value> = DraftStore::open(memory.clone(), "autosave").unwrap();
        let handle = Autosave::start(drafts.clone(), || json!({"x": 1}), Duration::from_secs(30))
            .unwrap();

        tokio::time::sleep(Duration::from_millis(29_999)).await;
        assert_eq!(handle.ticks(), 0);
        assert!(memory.get_item(drafts.key()).unwrap().is_none());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(handle.ticks(), 1);
        assert!(drafts.load().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent() {
        let handle = Autosave::start(store(), || json!({}), Duration::from_secs(1)).unwrap();
        assert!(handle.is_running());
        handle.stop();
        handle.stop();
        assert!(!handle.is_running());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(handle.ticks(), 0);
    }
}
