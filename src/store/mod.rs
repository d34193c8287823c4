//! Conversation persistence.
//!
//! A conversation is stored as a single document holding its title and the
//! ordered list of messages. Backends:
//! - [`JsonFileStore`] keeps one JSON document per conversation on disk
//! - [`MemoryStore`] keeps documents in process (tests, ephemeral sessions)

mod json_file;
mod memory;

use crate::types::{ChatMessage, Role};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("conversation '{0}' not found")]
    NotFound(String),
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt conversation document: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub role: Role,
    pub content: String,
    /// Unix seconds.
    pub created_at: i64,
}

impl StoredMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: now_unix(),
        }
    }
}

impl From<&StoredMessage> for ChatMessage {
    fn from(message: &StoredMessage) -> Self {
        ChatMessage {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<StoredMessage>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Conversation {
    pub(crate) fn seeded(id: String, title: &str, role: Role, content: &str) -> Self {
        let first = StoredMessage::new(role, content);
        Self {
            id,
            title: title.to_string(),
            created_at: first.created_at,
            updated_at: first.created_at,
            messages: vec![first],
        }
    }

    pub(crate) fn push(&mut self, role: Role, content: &str) {
        let message = StoredMessage::new(role, content);
        self.updated_at = message.created_at;
        self.messages.push(message);
    }

    pub fn summary(&self) -> ConversationSummary {
        ConversationSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            updated_at: self.updated_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
    pub updated_at: i64,
}

#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Creates a conversation seeded with its first message and returns the new id.
    async fn create_conversation(
        &self,
        title: &str,
        role: Role,
        content: &str,
    ) -> StoreResult<String>;

    /// Appends a message; fails with [`StoreError::NotFound`] for unknown ids.
    async fn append_message(&self, id: &str, role: Role, content: &str) -> StoreResult<()>;

    async fn get_conversation(&self, id: &str) -> StoreResult<Option<Conversation>>;

    /// Summaries ordered by most recently updated first.
    async fn list_conversations(&self) -> StoreResult<Vec<ConversationSummary>>;

    /// Removes a conversation. Unknown ids are not an error.
    async fn delete_conversation(&self, id: &str) -> StoreResult<()>;
}

pub(crate) fn new_conversation_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

pub(crate) fn sort_summaries(summaries: &mut [ConversationSummary]) {
    summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
}

pub(crate) fn now_unix() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}
