//! Application configuration
//!
//! Built-in defaults, then the optional file named by `CHAT_API_CONFIG`,
//! then environment variables.

pub mod file;

use std::env;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use file::{ConfigError, ConfigFile};

/// Environment variable naming the TOML config file
pub const CONFIG_PATH_ENV: &str = "CHAT_API_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub ollama_url: String,
    pub inference_timeout_secs: u64,
    pub max_history_turns: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 5001,
            ollama_url: "http://localhost:11434".into(),
            inference_timeout_secs: 120,
            max_history_turns: 200,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            tracing::info!("Loading configuration from {}", path);
            config.merge_file(ConfigFile::from_file(Path::new(&path))?);
        }

        config.merge_env(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Overlay values present in a config file
    pub fn merge_file(&mut self, file: ConfigFile) {
        if let Some(host) = file.server.host {
            self.host = host;
        }
        if let Some(port) = file.server.port {
            self.port = port;
        }
        if let Some(url) = file.ollama.url {
            self.ollama_url = url;
        }
        if let Some(secs) = file.ollama.timeout_secs {
            self.inference_timeout_secs = secs;
        }
        if let Some(max) = file.history.max_turns {
            self.max_history_turns = max;
        }
    }

    /// Overlay values from environment-style lookups
    pub fn merge_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = parse_var(&lookup, "PORT")? {
            self.port = port;
        }
        if let Some(url) = lookup("OLLAMA_URL") {
            self.ollama_url = url;
        }
        if let Some(secs) = parse_var(&lookup, "INFERENCE_TIMEOUT_SECS")? {
            self.inference_timeout_secs = secs;
        }
        if let Some(max) = parse_var(&lookup, "MAX_HISTORY_TURNS")? {
            self.max_history_turns = max;
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value,
            }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 5001);
        assert_eq!(config.ollama_url, "http://localhost:11434");
        assert_eq!(config.inference_timeout_secs, 120);
        assert_eq!(config.max_history_turns, 200);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::default();
        config.merge_file(
            ConfigFile::parse("[server]\nport = 8080\nhost = \"0.0.0.0\"\n[history]\nmax_turns = 0\n")
                .unwrap(),
        );
        config
            .merge_env(lookup_from(&[("PORT", "9000"), ("OLLAMA_URL", "http://ollama:11434")]))
            .unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.ollama_url, "http://ollama:11434");
        assert_eq!(config.max_history_turns, 0);
    }

    #[test]
    fn test_invalid_env_value() {
        let mut config = Config::default();
        let result = config.merge_env(lookup_from(&[("PORT", "not-a-port")]));
        match result {
            Err(ConfigError::InvalidValue { key, value }) => {
                assert_eq!(key, "PORT");
                assert_eq!(value, "not-a-port");
            }
            other => panic!("expected invalid value, got {:?}", other),
        }
    }
}
