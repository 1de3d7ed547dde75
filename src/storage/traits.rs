//! Trait abstraction for the draft storage service to enable mocking in tests

use super::error::StorageError;
use crate::state::RequirementFormData;
use async_trait::async_trait;

/// Remote persistence for requirement drafts
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DraftStorage: Send + Sync {
    /// Check if the draft service is reachable
    async fn is_online(&self) -> bool;

    /// Persist a new draft and return its id
    async fn create_draft(&self, form: &RequirementFormData) -> Result<String, StorageError>;

    /// Overwrite an existing draft. `notify = false` asks the service not to
    /// raise a user-visible confirmation.
    async fn update_draft(
        &self,
        draft_id: &str,
        form: &RequirementFormData,
        notify: bool,
    ) -> Result<(), StorageError>;

    /// Fetch a draft. `Ok(None)` means the service returned an empty payload.
    async fn load_draft(&self, draft_id: &str) -> Result<Option<RequirementFormData>, StorageError>;
}
