//! Core chat components
//!
//! This module contains the conversation store and the engine that drives
//! each exchange with the inference runtime.

mod chat;
mod error;
mod store;

pub use chat::{ChatEngine, ChatOutcome, DEFAULT_CONVERSATION_ID};
pub use error::ChatError;
pub use store::ConversationStore;

#[cfg(test)]
pub(crate) use chat::tests::MockProvider;
