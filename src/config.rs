//! Runtime configuration, read from the process environment.
//!
//! The binary loads a `.env` file first (see `main.rs`), so every key below can
//! live there during development.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_OLLAMA_HOST: &str = "http://127.0.0.1:11434";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

const OLLAMA_HOST: &str = "OLLAMA_HOST";
const LLM_MODEL: &str = "LLM_MODEL";
const DATA_DIR: &str = "CONVOPRO_DATA_DIR";
const REQUEST_TIMEOUT: &str = "CONVOPRO_REQUEST_TIMEOUT_SECS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub ollama_host: String,
    /// Model to pre-select when the catalog contains it.
    pub preferred_model: Option<String>,
    pub data_dir: PathBuf,
    pub request_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let ollama_host = non_empty(OLLAMA_HOST)
            .map(|host| host.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_OLLAMA_HOST.to_string());

        let data_dir = non_empty(DATA_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let request_timeout = match non_empty(REQUEST_TIMEOUT) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: REQUEST_TIMEOUT,
                        value: raw,
                    });
                }
            },
            None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        Ok(Self {
            ollama_host,
            preferred_model: non_empty(LLM_MODEL),
            data_dir,
            request_timeout,
        })
    }
}

fn default_data_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        return data_dir.join("convopro").join("conversations");
    }

    PathBuf::from("cache").join("conversations")
}
