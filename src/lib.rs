//! Requirement Drafts - draft authoring for procurement requirements
//!
//! Keeps a multi-step requirement form synchronised with a remotely persisted
//! draft: step validation, periodic autosave while the user is editing, and a
//! manual save that never creates a second draft for the same session.

pub mod config;
pub mod session;
pub mod state;
pub mod storage;

pub use config::DraftConfig;
pub use session::{AuthContext, DraftSession, Notice, SaveOutcome};
pub use state::{RequirementFormData, Step, StepErrors};
