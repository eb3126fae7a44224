//! Failure categories surfaced to API callers

use crate::providers::ProviderError;

/// Errors from the chat engine and conversation store
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Malformed or out-of-range request fields
    #[error("{0}")]
    Validation(String),

    /// Conversation id that was never referenced
    #[error("Conversation not found: {0}")]
    NotFound(String),

    /// The inference runtime failed; its message is passed through as-is
    #[error("{0}")]
    Inference(String),
}

impl From<ProviderError> for ChatError {
    fn from(err: ProviderError) -> Self {
        ChatError::Inference(err.to_string())
    }
}
