//! Session authentication context

use std::sync::Arc;
use tokio::sync::watch;

/// Shared view of whether the user is signed in
#[derive(Debug, Clone)]
pub struct AuthContext {
    tx: Arc<watch::Sender<bool>>,
}

impl AuthContext {
    pub fn new(authenticated: bool) -> Self {
        let (tx, _) = watch::channel(authenticated);
        Self { tx: Arc::new(tx) }
    }

    pub fn is_authenticated(&self) -> bool {
        *self.tx.borrow()
    }

    /// Signing out wakes every subscriber, which tears the session down
    pub fn set_authenticated(&self, authenticated: bool) {
        self.tx.send_if_modified(|current| {
            let changed = *current != authenticated;
            *current = authenticated;
            changed
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}
