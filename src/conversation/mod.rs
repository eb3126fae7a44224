//! Conversation types and sampling parameters

use serde::{Deserialize, Serialize};

/// Default model used when a request does not name one
pub const DEFAULT_MODEL: &str = "llama2";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Generation controls supplied per request.
///
/// Every field falls back to its default on its own, so a partial
/// `model_params` object only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_top_p")]
    pub top_p: f64,

    /// Signed so that negative input reaches validation instead of
    /// failing deserialization with an opaque message
    #[serde(default = "default_max_tokens")]
    pub max_tokens: i64,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_top_p() -> f64 {
    0.9
}

fn default_max_tokens() -> i64 {
    500
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl SamplingParams {
    /// Check the documented ranges, returning a message naming the first
    /// offending field
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(format!(
                "temperature must be between 0 and 1, got {}",
                self.temperature
            ));
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(format!("top_p must be between 0 and 1, got {}", self.top_p));
        }
        if self.max_tokens <= 0 {
            return Err(format!(
                "max_tokens must be greater than 0, got {}",
                self.max_tokens
            ));
        }
        if self.max_tokens > u32::MAX as i64 {
            return Err(format!("max_tokens is too large: {}", self.max_tokens));
        }
        Ok(())
    }

    /// Token budget as the unsigned value the runtime expects.
    /// Only meaningful after `validate` has passed.
    pub fn token_limit(&self) -> u32 {
        self.max_tokens.clamp(1, u32::MAX as i64) as u32
    }
}
