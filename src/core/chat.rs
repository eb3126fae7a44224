//! Chat engine
//!
//! The ChatEngine ties the conversation store to the inference runtime. For
//! every message it:
//! 1. Validates the sampling parameters
//! 2. Appends the user turn to the conversation
//! 3. Sends the whole transcript to the model
//! 4. Appends the assistant reply and returns the updated transcript

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::conversation::{SamplingParams, Turn};
use crate::providers::{ChatProvider, ProviderError, SamplingOptions};

use super::error::ChatError;
use super::store::ConversationStore;

/// Conversation used when a request does not name one
pub const DEFAULT_CONVERSATION_ID: &str = "default";

/// Default bound on a single inference call
pub const DEFAULT_INFERENCE_TIMEOUT: Duration = Duration::from_secs(120);

/// Result of one user/assistant exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOutcome {
    /// The assistant's reply
    pub response: String,

    /// Conversation the exchange was recorded under
    pub conversation_id: String,

    /// Full transcript after both turns were appended
    pub history: Vec<Turn>,
}

/// The core chat engine
pub struct ChatEngine {
    store: Arc<ConversationStore>,
    provider: Arc<dyn ChatProvider>,
    timeout: Duration,
}

impl ChatEngine {
    /// Create a new chat engine
    pub fn new(store: Arc<ConversationStore>, provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            store,
            provider,
            timeout: DEFAULT_INFERENCE_TIMEOUT,
        }
    }

    /// Set the bound on each inference call
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Record a user message, ask the model for a reply and record that too.
    ///
    /// Calls for the same conversation run one at a time. If the model call
    /// fails the user turn stays in the transcript.
    pub async fn submit_message(
        &self,
        conversation_id: &str,
        text: &str,
        params: Option<SamplingParams>,
    ) -> Result<ChatOutcome, ChatError> {
        let params = params.unwrap_or_default();
        params.validate().map_err(ChatError::Validation)?;

        let options = SamplingOptions {
            temperature: params.temperature,
            top_p: params.top_p,
            max_tokens: params.token_limit(),
        };

        let conversation = self.store.conversation(conversation_id).await;
        let _writer = conversation.lock_writer().await;

        conversation.push(Turn::user(text)).await;
        let history = conversation.turns().await;

        tracing::debug!(
            "Calling {} for conversation {} with {} turn(s)",
            params.model,
            conversation.id(),
            history.len()
        );

        let reply = match tokio::time::timeout(
            self.timeout,
            self.provider.chat(&params.model, &history, &options),
        )
        .await
        {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                tracing::error!("Inference failed for conversation {}: {}", conversation_id, e);
                return Err(e.into());
            }
            Err(_) => {
                let e = ProviderError::Timeout(self.timeout);
                tracing::error!("Inference failed for conversation {}: {}", conversation_id, e);
                return Err(e.into());
            }
        };

        conversation.push(Turn::assistant(reply.clone())).await;

        Ok(ChatOutcome {
            response: reply,
            conversation_id: conversation_id.to_string(),
            history: conversation.turns().await,
        })
    }

    /// Get the transcript of a known conversation
    pub async fn history(&self, conversation_id: &str) -> Result<Vec<Turn>, ChatError> {
        self.store.get_history(conversation_id).await
    }

    /// Get every known conversation id
    pub async fn conversations(&self) -> Vec<String> {
        self.store.list_ids().await
    }

    /// List models installed in the inference runtime, bounded by the same
    /// timeout as chat calls
    pub async fn models(&self) -> Result<Value, ChatError> {
        let result = tokio::time::timeout(self.timeout, self.provider.list_models())
            .await
            .unwrap_or(Err(ProviderError::Timeout(self.timeout)));

        result.map_err(|e| {
            tracing::error!("Listing models failed: {}", e);
            ChatError::from(e)
        })
    }
}
