//! User-facing notices produced by draft saves

use tokio::sync::mpsc;

/// Something the UI should show as a toast
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    DraftCreated,
    DraftSaved,
    /// The service was unreachable; the form only exists locally
    SavedLocally,
    /// The service rejected the form with this message
    ServerValidation(String),
    SaveFailed,
    /// Nothing worth saving yet
    EmptyForm,
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Self::DraftCreated => "Draft created".to_string(),
            Self::DraftSaved => "Draft saved".to_string(),
            Self::SavedLocally => {
                "You are offline. Changes are saved locally only".to_string()
            }
            Self::ServerValidation(message) => message.clone(),
            Self::SaveFailed => "Failed to save draft".to_string(),
            Self::EmptyForm => "Cannot save an empty form. Add a title or description first".to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::ServerValidation(_) | Self::SaveFailed | Self::EmptyForm
        )
    }
}

/// Sending half of the notice channel. A closed receiver is ignored.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl Notifier {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn notify(&self, notice: Notice) {
        if notice.is_error() {
            tracing::debug!("Notice (error): {}", notice.message());
        }
        let _ = self.tx.send(notice);
    }
}
