//! Model-facing services for ConvoPro
//!
//! The session orchestrator talks to three narrow capabilities: the model
//! catalog, the title generator and the answer generator. Each one is a trait
//! so the orchestrator can be driven by the local Ollama client in production
//! and by in-process doubles in tests.
//!
//! # Architecture
//!
//! - `ollama` - HTTP client for a local Ollama server implementing all three traits
//! - `title` - prompt construction and cleanup for conversation titles
//!
//! # Usage
//!
//! ```rust,no_run
//! use convopro::ai::{AnswerGenerator, OllamaClient};
//! use convopro::types::ChatMessage;
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let ollama = OllamaClient::new("http://127.0.0.1:11434", Duration::from_secs(60))?;
//! let reply = ollama
//!     .generate_answer("llama3", &[ChatMessage::user("Hello!")])
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod ollama;
pub mod title;

use crate::types::ChatMessage;
use async_trait::async_trait;
use thiserror::Error;

pub use ollama::OllamaClient;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("request failed: {0}")]
    Http(String),
    #[error("request timed out")]
    Timeout,
    #[error("Ollama error {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("model returned an empty title")]
    EmptyTitle,
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ChatError::Timeout
        } else {
            ChatError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::Decode(err.to_string())
    }
}

pub type ChatResult<T> = Result<T, ChatError>;

#[async_trait]
pub trait ModelCatalog: Send + Sync {
    /// Model identifiers available for selection, in server order.
    async fn list_models(&self) -> ChatResult<Vec<String>>;
}

#[async_trait]
pub trait TitleGenerator: Send + Sync {
    async fn generate_title(&self, model: &str, seed: &str) -> ChatResult<String>;
}

#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate_answer(&self, model: &str, history: &[ChatMessage]) -> ChatResult<String>;
}
