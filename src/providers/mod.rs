//! Inference runtime integrations

mod ollama;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::conversation::Turn;

pub use ollama::OllamaProvider;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Inference timed out after {0:?}")]
    Timeout(Duration),
}

/// Sampling options forwarded with every chat call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingOptions {
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
}

/// A model server that turns a transcript into the next assistant reply
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Generate a reply for `turns`, returning the assistant text
    async fn chat(
        &self,
        model: &str,
        turns: &[Turn],
        options: &SamplingOptions,
    ) -> Result<String, ProviderError>;

    /// List installed models in the runtime's own format
    async fn list_models(&self) -> Result<Value, ProviderError>;
}
