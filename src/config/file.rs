//! Optional TOML configuration file
//!
//! Every section and key may be omitted; missing values fall back to the
//! built-in defaults.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 5001
//!
//! [ollama]
//! url = "http://localhost:11434"
//! timeout_secs = 120
//!
//! [history]
//! max_turns = 200
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root of the configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub ollama: OllamaSection,

    #[serde(default)]
    pub history: HistorySection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OllamaSection {
    pub url: Option<String>,
    /// Bound on a single inference call, in seconds
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistorySection {
    /// Turns kept per conversation, 0 for unbounded
    pub max_turns: Option<usize>,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: ConfigFile = toml::from_str(content)?;
        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
