//! Form state store
//!
//! Holds the requirement being authored and the errors of the most recent
//! validation call. Every change to the form bumps a revision counter that
//! the autosave task watches.

use super::forms::{validate_step_number, RequirementFormData, Step, StepErrors};
use parking_lot::RwLock;
use tokio::sync::watch;

/// Shared container for the in-progress requirement
#[derive(Debug)]
pub struct FormStore {
    data: RwLock<RequirementFormData>,
    errors: RwLock<StepErrors>,
    revision: watch::Sender<u64>,
}

impl Default for FormStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FormStore {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            data: RwLock::new(RequirementFormData::default()),
            errors: RwLock::new(StepErrors::new()),
            revision,
        }
    }

    /// Clone of the current form
    pub fn snapshot(&self) -> RequirementFormData {
        self.data.read().clone()
    }

    /// Read a value out of the form without cloning all of it
    pub fn with<R>(&self, f: impl FnOnce(&RequirementFormData) -> R) -> R {
        f(&self.data.read())
    }

    /// Merge a partial change into the form
    pub fn update(&self, f: impl FnOnce(&mut RequirementFormData)) {
        f(&mut self.data.write());
        self.bump();
    }

    /// Replace the form wholesale, as when resuming an existing draft
    pub fn replace(&self, form: RequirementFormData) {
        *self.data.write() = form;
        self.bump();
    }

    /// Back to an empty form with no errors
    pub fn reset(&self) {
        *self.data.write() = RequirementFormData::default();
        self.errors.write().clear();
        self.bump();
    }

    /// Validate one step and publish its errors, replacing the previous map
    pub fn validate_step(&self, step: u8) -> bool {
        let errors = self.with(|form| validate_step_number(form, step));
        let valid = errors.is_empty();
        *self.errors.write() = errors;
        valid
    }

    /// Validate every step in order. Each step publishes its own errors, so
    /// afterwards [`FormStore::step_errors`] holds the errors of step 6 only.
    pub fn is_form_valid(&self) -> bool {
        Step::ALL
            .iter()
            .fold(true, |valid, step| self.validate_step(step.number()) && valid)
    }

    pub fn step_errors(&self) -> StepErrors {
        self.errors.read().clone()
    }

    pub fn clear_errors(&self) {
        self.errors.write().clear();
    }

    /// Receiver that changes whenever the form does
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
    }
}
