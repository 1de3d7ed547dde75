//! Draft authoring session
//!
//! [`DraftSession`] is the surface the UI talks to. One is built per signed-in
//! user; `init` starts the autosave timer and the logout watcher, `teardown`
//! stops them and empties the session.

mod auth;
mod autosave;
mod coordinator;
mod notice;

pub use auth::AuthContext;
pub use autosave::AutosaveTask;
pub use coordinator::{AutosaveOutcome, DraftSync, SaveOutcome, SkipReason};
pub use notice::{Notice, Notifier};

use crate::state::{DraftState, RequirementFormData, StepErrors};
use crate::storage::{CacheError, DraftStorage, FallbackCache, StorageError};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::info;

/// Background work owned by an initialised session
#[derive(Debug)]
struct SessionTasks {
    autosave: AutosaveTask,
    auth_watch: JoinHandle<()>,
}

impl Drop for SessionTasks {
    fn drop(&mut self) {
        self.auth_watch.abort();
    }
}

/// Public facade over the form store, the edit tracker and the draft
/// coordinator
pub struct DraftSession {
    sync: Arc<DraftSync>,
    cache: Arc<dyn FallbackCache>,
    autosave_period: Duration,
    tasks: Mutex<Option<SessionTasks>>,
}

impl DraftSession {
    /// Build a session. Notices for the UI arrive on the returned receiver.
    pub fn new(
        storage: Arc<dyn DraftStorage>,
        cache: Arc<dyn FallbackCache>,
        auth: AuthContext,
        autosave_period: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (notifier, notices) = Notifier::channel();
        let sync = Arc::new(DraftSync::new(storage, cache.clone(), auth, notifier));
        let session = Self {
            sync,
            cache,
            autosave_period,
            tasks: Mutex::new(None),
        };
        (session, notices)
    }

    /// Start the autosave timer and the logout watcher. Calling it again
    /// restarts both.
    pub fn init(&self) {
        let autosave = AutosaveTask::spawn(self.sync.clone(), self.autosave_period);

        let sync = self.sync.clone();
        let mut auth = sync.auth().subscribe();
        let auth_watch = tokio::spawn(async move {
            while auth.changed().await.is_ok() {
                let authenticated = *auth.borrow_and_update();
                if !authenticated {
                    info!("Signed out, clearing draft session");
                    sync.reset_session().await;
                }
            }
        });

        *self.tasks.lock() = Some(SessionTasks {
            autosave,
            auth_watch,
        });
    }

    /// Stop background work and empty the session
    pub async fn teardown(&self) {
        let tasks = self.tasks.lock().take();
        drop(tasks);
        self.sync.reset_session().await;
    }

    pub fn is_running(&self) -> bool {
        self.tasks
            .lock()
            .as_ref()
            .is_some_and(|tasks| !tasks.autosave.is_finished())
    }

    /// Merge a partial change into the form
    pub fn update_form_data(&self, f: impl FnOnce(&mut RequirementFormData)) {
        self.sync.form().update(f);
    }

    /// Replace the form wholesale, as when resuming a draft
    pub fn load_draft_data(&self, form: RequirementFormData) {
        self.sync.form().replace(form);
    }

    /// Start over with an empty form and no remote draft
    pub async fn reset_form(&self) {
        self.sync.form().reset();
        self.sync.clear_draft_state().await;
    }

    pub async fn clear_draft_state(&self) {
        self.sync.clear_draft_state().await;
    }

    /// Validate a step (1..=6) and publish its errors
    pub fn validate_step(&self, step: u8) -> bool {
        self.sync.form().validate_step(step)
    }

    /// Validate all six steps. Afterwards [`DraftSession::step_errors`]
    /// reflects step 6 only, even when an earlier step failed.
    pub fn is_form_valid(&self) -> bool {
        self.sync.form().is_form_valid()
    }

    pub async fn save_as_draft(&self) -> SaveOutcome {
        self.sync.save_as_draft().await
    }

    pub async fn load_draft_by_id(
        &self,
        id: &str,
    ) -> Result<Option<RequirementFormData>, StorageError> {
        self.sync.load_draft_by_id(id).await
    }

    /// Bring back the local fallback copy, if one exists. The remote draft
    /// state is left alone.
    pub fn restore_local_fallback(&self) -> Result<Option<RequirementFormData>, CacheError> {
        let restored = self.cache.load()?;
        if let Some(form) = &restored {
            self.sync.form().replace(form.clone());
        }
        Ok(restored)
    }

    pub fn start_editing(&self) {
        self.sync.editing().start();
    }

    pub fn stop_editing(&self) {
        self.sync.editing().stop();
    }

    pub fn is_editing(&self) -> bool {
        self.sync.editing().is_editing()
    }

    pub fn form_data(&self) -> RequirementFormData {
        self.sync.form().snapshot()
    }

    pub fn draft_id(&self) -> Option<String> {
        self.sync.state().draft_id
    }

    pub fn is_saving(&self) -> bool {
        self.sync.state().is_saving
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.sync.state().last_saved
    }

    pub fn step_errors(&self) -> StepErrors {
        self.sync.form().step_errors()
    }

    pub fn draft_state(&self) -> DraftState {
        self.sync.state()
    }

    /// Receiver that updates whenever the draft state does
    pub fn watch_draft_state(&self) -> watch::Receiver<DraftState> {
        self.sync.subscribe()
    }

    /// Run one autosave evaluation now, outside the timer
    pub async fn autosave_now(&self) -> AutosaveOutcome {
        self.sync.autosave_tick().await
    }
}
