use serde::Deserialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("API error {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Api { status: u16, message: Option<String> },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request cancelled")]
    Cancelled,
}

/// Error body shape returned by the backend on non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: Option<String>,
}

impl ClientError {
    /// Message to show the user: the server's own message when it sent one,
    /// otherwise the fallback for the operation that failed.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Api {
                message: Some(message),
                ..
            } if !message.is_empty() => message.clone(),
            ClientError::Validation(msg) => msg.clone(),
            ClientError::Storage(e) => {
                error!("storage error: {}", e);
                fallback.to_string()
            }
            _ => fallback.to_string(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }
}
