//! Periodic autosave task
//!
//! Ticks every period and lets the coordinator decide whether to save. Any
//! change to the form re-arms the timer, so the next tick lands one full
//! period after the latest edit.

use super::coordinator::{AutosaveOutcome, DraftSync};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

/// Handle to the running autosave task. Dropping it cancels the timer;
/// a save already in flight is left to finish.
#[derive(Debug)]
pub struct AutosaveTask {
    handle: JoinHandle<()>,
}

impl AutosaveTask {
    pub fn spawn(sync: Arc<DraftSync>, period: Duration) -> Self {
        let mut revisions = sync.form().subscribe();
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let AutosaveOutcome::Created(id) | AutosaveOutcome::Updated(id) =
                            sync.autosave_tick().await
                        {
                            debug!("Autosaved draft {id}");
                        }
                    }
                    changed = revisions.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        ticker.reset();
                    }
                }
            }
        });
        Self { handle }
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for AutosaveTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
