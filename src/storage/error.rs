//! Errors raised by the draft storage service

/// Failure talking to the draft service
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The request never got a response
    #[error("draft service unreachable: {0}")]
    Transport(String),

    /// The service rejected the payload (HTTP 422) with a message for the user
    #[error("{message}")]
    Validation { message: String },

    #[error("draft {id} not found")]
    NotFound { id: String },

    /// Any other non-success response
    #[error("draft service returned {status}: {message}")]
    Remote { status: u16, message: String },

    /// The response body could not be understood
    #[error("unexpected response from draft service: {0}")]
    Decode(String),
}

impl StorageError {
    /// The server's message when the payload was rejected as invalid
    pub fn validation_message(&self) -> Option<&str> {
        match self {
            Self::Validation { message } if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Remote {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
