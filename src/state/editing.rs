//! Edit-session tracking
//!
//! The UI flips this on focus and blur of the form. The flag carries no
//! rules of its own; the autosave gate reads it on every tick.

use std::sync::atomic::{AtomicBool, Ordering};

/// Whether the user is actively editing the requirement
#[derive(Debug, Default)]
pub struct EditingFlag(AtomicBool);

impl EditingFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn stop(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_editing(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
