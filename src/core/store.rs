//! In-memory conversation storage
//!
//! Maps conversation ids to their ordered turns. Conversations are created on
//! first reference and live for the lifetime of the process.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, RwLock};

use crate::conversation::{Role, Turn};

use super::error::ChatError;

/// Default retention cap, in turns
pub const DEFAULT_MAX_TURNS: usize = 200;

/// Smallest cap that still holds one full user/assistant exchange
pub const MIN_MAX_TURNS: usize = 2;

/// One conversation's transcript plus the gate that orders its writers
#[derive(Debug)]
pub struct Conversation {
    id: String,
    turns: Mutex<Vec<Turn>>,
    writer: Mutex<()>,
    max_turns: Option<usize>,
}

impl Conversation {
    fn new(id: &str, max_turns: Option<usize>) -> Self {
        Self {
            id: id.to_string(),
            turns: Mutex::new(Vec::new()),
            writer: Mutex::new(()),
            max_turns,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Wait for exclusive write access to this conversation.
    ///
    /// Held across a whole user/assistant exchange. Readers of the turn list
    /// do not take this lock.
    pub async fn lock_writer(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().await
    }

    /// Append a turn, applying the retention cap
    pub async fn push(&self, turn: Turn) {
        let mut turns = self.turns.lock().await;
        turns.push(turn);

        if let Some(max) = self.max_turns {
            if turns.len() > max {
                let excess = turns.len() - max;
                turns.drain(..excess);
                // Keep the transcript starting on a user turn
                let leading = turns
                    .iter()
                    .take_while(|t| t.role == Role::Assistant)
                    .count();
                turns.drain(..leading);
            }
        }
    }

    /// Clone of the current transcript
    pub async fn turns(&self) -> Vec<Turn> {
        self.turns.lock().await.clone()
    }
}

/// Store owning every conversation in the process
#[derive(Debug)]
pub struct ConversationStore {
    conversations: RwLock<HashMap<String, Arc<Conversation>>>,
    max_turns: Option<usize>,
}

impl ConversationStore {
    /// Create a store with the default retention cap
    pub fn new() -> Self {
        Self::with_max_turns(DEFAULT_MAX_TURNS)
    }

    /// Create a store that keeps at most `max_turns` turns per conversation.
    /// Zero disables the cap; nonzero values are raised to `MIN_MAX_TURNS`.
    pub fn with_max_turns(max_turns: usize) -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
            max_turns: (max_turns > 0).then(|| max_turns.max(MIN_MAX_TURNS)),
        }
    }

    /// Get a conversation handle, creating an empty conversation if the id is new
    pub async fn conversation(&self, conversation_id: &str) -> Arc<Conversation> {
        let existing = self.conversations.read().await.get(conversation_id).cloned();
        if let Some(conversation) = existing {
            return conversation;
        }

        let mut conversations = self.conversations.write().await;
        let entry = conversations
            .entry(conversation_id.to_string())
            .or_insert_with(|| {
                tracing::debug!("Creating conversation {}", conversation_id);
                Arc::new(Conversation::new(conversation_id, self.max_turns))
            });
        Arc::clone(entry)
    }

    /// Append a turn to a conversation, creating it if needed.
    ///
    /// Does not take the writer gate. `ChatEngine::submit_message` pushes
    /// through the conversation handle instead so both of its turns land
    /// under one gate.
    pub async fn append(&self, conversation_id: &str, turn: Turn) {
        self.conversation(conversation_id).await.push(turn).await;
    }

    /// Get all turns in a conversation
    pub async fn get_history(&self, conversation_id: &str) -> Result<Vec<Turn>, ChatError> {
        let conversation = self
            .conversations
            .read()
            .await
            .get(conversation_id)
            .cloned()
            .ok_or_else(|| ChatError::NotFound(conversation_id.to_string()))?;

        Ok(conversation.turns().await)
    }

    /// Get all conversation IDs, sorted
    pub async fn list_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.conversations.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}
