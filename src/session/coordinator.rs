//! Draft sync coordinator
//!
//! Decides when the form is persisted as a remote draft and whether a save
//! creates a new draft or updates the existing one. The draft id cell is a
//! mutex held across the create/update request: the first save to find it
//! empty performs the only create, and every later save updates that id.

use super::auth::AuthContext;
use super::notice::{Notice, Notifier};
use crate::state::{DraftState, EditingFlag, FormStore, RequirementFormData, RequirementStatus};
use crate::storage::{DraftStorage, FallbackCache, StorageError};
use chrono::Utc;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

/// Why an autosave tick did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotAuthenticated,
    NotEditing,
    SentForApproval,
    Archived,
    EmptyForm,
    /// Another save holds the draft id
    SaveInFlight,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::NotAuthenticated => "not authenticated",
            Self::NotEditing => "not editing",
            Self::SentForApproval => "sent for approval",
            Self::Archived => "requirement archived",
            Self::EmptyForm => "form is empty",
            Self::SaveInFlight => "save already in flight",
        };
        f.write_str(reason)
    }
}

/// Result of one autosave tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutosaveOutcome {
    Skipped(SkipReason),
    Created(String),
    Updated(String),
    Failed,
}

/// Result of a manual save
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(String),
    Updated(String),
    /// Refused before any request was made
    Rejected(SkipReason),
    /// The service was unreachable; only the fallback copy was written
    SavedLocally,
    Failed,
}

impl SaveOutcome {
    pub fn draft_id(&self) -> Option<&str> {
        match self {
            Self::Created(id) | Self::Updated(id) => Some(id),
            _ => None,
        }
    }
}

/// Counts one manual save for as long as it lives. `is_saving` stays set
/// until the last overlapping save finishes or is dropped.
struct SavingGuard<'a> {
    sync: &'a DraftSync,
}

impl<'a> SavingGuard<'a> {
    fn enter(sync: &'a DraftSync) -> Self {
        // counter changes happen under the state lock so the flag always
        // matches the count
        sync.state.send_modify(|s| {
            sync.saves_in_flight.fetch_add(1, Ordering::SeqCst);
            s.is_saving = true;
        });
        Self { sync }
    }
}

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        let sync = self.sync;
        sync.state.send_modify(|s| {
            let remaining = sync.saves_in_flight.fetch_sub(1, Ordering::SeqCst) - 1;
            s.is_saving = remaining > 0;
        });
    }
}

enum Persisted {
    Created(String),
    Updated(String),
}

/// Owns the draft state and every request that writes a draft
pub struct DraftSync {
    storage: Arc<dyn DraftStorage>,
    cache: Arc<dyn FallbackCache>,
    auth: AuthContext,
    notifier: Notifier,
    form: FormStore,
    editing: EditingFlag,
    /// Authoritative draft id; consulted before every create/update
    draft_id: Mutex<Option<String>>,
    /// Manual saves started and not yet finished
    saves_in_flight: AtomicUsize,
    /// Observable copy for the UI
    state: watch::Sender<DraftState>,
}

impl DraftSync {
    pub fn new(
        storage: Arc<dyn DraftStorage>,
        cache: Arc<dyn FallbackCache>,
        auth: AuthContext,
        notifier: Notifier,
    ) -> Self {
        let (state, _) = watch::channel(DraftState::default());
        Self {
            storage,
            cache,
            auth,
            notifier,
            form: FormStore::new(),
            editing: EditingFlag::new(),
            draft_id: Mutex::new(None),
            saves_in_flight: AtomicUsize::new(0),
            state,
        }
    }

    pub fn form(&self) -> &FormStore {
        &self.form
    }

    pub fn editing(&self) -> &EditingFlag {
        &self.editing
    }

    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    pub fn state(&self) -> DraftState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DraftState> {
        self.state.subscribe()
    }

    /// First condition that blocks autosave, if any. Every status except
    /// archived is eligible, including approved and published.
    pub fn autosave_blocker(&self, form: &RequirementFormData) -> Option<SkipReason> {
        if !self.auth.is_authenticated() {
            Some(SkipReason::NotAuthenticated)
        } else if !self.editing.is_editing() {
            Some(SkipReason::NotEditing)
        } else if form.is_sent_for_approval {
            Some(SkipReason::SentForApproval)
        } else if form.status == RequirementStatus::Archived {
            Some(SkipReason::Archived)
        } else {
            None
        }
    }

    pub fn should_auto_save(&self, form: &RequirementFormData) -> bool {
        self.autosave_blocker(form).is_none()
    }

    /// One timer tick: persist silently if the gate allows it
    pub async fn autosave_tick(&self) -> AutosaveOutcome {
        let form = self.form.snapshot();
        let blocker = self
            .autosave_blocker(&form)
            .or_else(|| form.is_blank().then_some(SkipReason::EmptyForm));
        if let Some(reason) = blocker {
            debug!("Autosave skipped: {reason}");
            return AutosaveOutcome::Skipped(reason);
        }

        let Ok(mut draft_id) = self.draft_id.try_lock() else {
            debug!("Autosave skipped: {}", SkipReason::SaveInFlight);
            return AutosaveOutcome::Skipped(SkipReason::SaveInFlight);
        };

        match self.persist(&mut draft_id, false).await {
            Ok(Persisted::Created(id)) => AutosaveOutcome::Created(id),
            Ok(Persisted::Updated(id)) => AutosaveOutcome::Updated(id),
            Err(err) => {
                warn!("Autosave failed: {err}");
                self.store_fallback();
                AutosaveOutcome::Failed
            }
        }
    }

    /// Save on request. Never fails outward: every error becomes a notice
    /// and the fallback copy is written.
    pub async fn save_as_draft(&self) -> SaveOutcome {
        if self.form.with(RequirementFormData::is_blank) {
            self.notifier.notify(Notice::EmptyForm);
            return SaveOutcome::Rejected(SkipReason::EmptyForm);
        }

        let _saving = SavingGuard::enter(self);
        let result = {
            let mut draft_id = self.draft_id.lock().await;
            self.persist(&mut draft_id, true).await
        };

        match result {
            Ok(persisted) => {
                self.store_fallback();
                match persisted {
                    Persisted::Created(id) => {
                        self.notifier.notify(Notice::DraftCreated);
                        SaveOutcome::Created(id)
                    }
                    Persisted::Updated(id) => {
                        self.notifier.notify(Notice::DraftSaved);
                        SaveOutcome::Updated(id)
                    }
                }
            }
            Err(err) => self.handle_save_failure(err).await,
        }
    }

    async fn handle_save_failure(&self, err: StorageError) -> SaveOutcome {
        warn!("Failed to save draft: {err}");
        let outcome = if !self.storage.is_online().await {
            self.notifier.notify(Notice::SavedLocally);
            SaveOutcome::SavedLocally
        } else {
            match err.validation_message() {
                Some(message) => self
                    .notifier
                    .notify(Notice::ServerValidation(message.to_string())),
                None => self.notifier.notify(Notice::SaveFailed),
            }
            SaveOutcome::Failed
        };
        self.store_fallback();
        outcome
    }

    /// Fetch a draft and make it the form being edited. Later saves update
    /// this draft. Fetch errors are returned as-is.
    pub async fn load_draft_by_id(
        &self,
        id: &str,
    ) -> Result<Option<RequirementFormData>, StorageError> {
        let Some(form) = self.storage.load_draft(id).await? else {
            return Ok(None);
        };
        if form == RequirementFormData::default() {
            return Ok(None);
        }

        let mut draft_id = self.draft_id.lock().await;
        self.form.replace(form.clone());
        self.form.clear_errors();
        *draft_id = Some(id.to_string());
        self.state.send_modify(|s| s.draft_id = Some(id.to_string()));
        info!("Loaded draft {id}");
        Ok(Some(form))
    }

    /// Forget the remote draft. Waits for the save holding the draft id to
    /// settle; saves still queued keep `is_saving` set.
    pub async fn clear_draft_state(&self) {
        let mut draft_id = self.draft_id.lock().await;
        *draft_id = None;
        self.state.send_modify(|s| {
            *s = DraftState {
                is_saving: s.is_saving,
                ..DraftState::default()
            }
        });
    }

    /// Logout teardown: empty form, no draft, not editing
    pub async fn reset_session(&self) {
        self.editing.stop();
        self.form.reset();
        self.clear_draft_state().await;
    }

    async fn persist(
        &self,
        draft_id: &mut Option<String>,
        notify: bool,
    ) -> Result<Persisted, StorageError> {
        let form = self.form.snapshot();
        let persisted = match draft_id.clone() {
            Some(id) => {
                self.storage.update_draft(&id, &form, notify).await?;
                debug!("Updated draft {id}");
                Persisted::Updated(id)
            }
            None => {
                let id = self.storage.create_draft(&form).await?;
                *draft_id = Some(id.clone());
                info!("Created draft {id}");
                Persisted::Created(id)
            }
        };

        let now = Utc::now();
        self.state.send_modify(|s| {
            if let Persisted::Created(id) = &persisted {
                s.draft_id = Some(id.clone());
            }
            s.last_saved = Some(now);
        });
        Ok(persisted)
    }

    fn store_fallback(&self) {
        if let Err(err) = self.cache.store(&self.form.snapshot()) {
            warn!("Failed to write local fallback copy: {err}");
        }
    }
}
