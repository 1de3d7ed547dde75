//! Observable draft persistence state

use chrono::{DateTime, Utc};

/// What the UI shows about the remote draft
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DraftState {
    /// Set once, on the first successful create
    pub draft_id: Option<String>,
    /// A manual save is in flight
    pub is_saving: bool,
    /// Time of the last successful create or update
    pub last_saved: Option<DateTime<Utc>>,
}

impl DraftState {
    /// Short human readable summary for status lines
    pub fn status_label(&self) -> String {
        match (&self.draft_id, self.is_saving, self.last_saved) {
            (_, true, _) => "Saving...".to_string(),
            (Some(_), false, Some(at)) => format!("Saved {}", at.format("%H:%M:%S")),
            (Some(_), false, None) => "Draft".to_string(),
            (None, false, _) => "Not saved".to_string(),
        }
    }
}
