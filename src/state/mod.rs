//! Requirement authoring state

mod draft_state;
mod editing;
mod form_store;
mod forms;

pub use draft_state::*;
pub use editing::*;
pub use form_store::*;
pub use forms::*;
