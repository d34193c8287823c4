use super::{
    Conversation, ConversationStore, ConversationSummary, StoreError, StoreResult,
    new_conversation_id, sort_summaries,
};
use crate::types::Role;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

const EXTENSION: &str = "json";

/// One `<id>.json` document per conversation under a single directory.
pub struct JsonFileStore {
    dir: PathBuf,
    // Serializes read-modify-write cycles on documents.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), "opened conversation store");
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Ids that would not map cleanly onto a file name never exist.
    fn document_path(&self, id: &str) -> Option<PathBuf> {
        if !is_valid_id(id) {
            return None;
        }
        Some(self.dir.join(format!("{id}.{EXTENSION}")))
    }

    async fn read_document(&self, path: &Path) -> StoreResult<Option<Conversation>> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn write_document(&self, conversation: &Conversation) -> StoreResult<()> {
        let path = self
            .document_path(&conversation.id)
            .ok_or_else(|| StoreError::NotFound(conversation.id.clone()))?;
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(conversation)?;
        fs::write(&tmp, bytes).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for JsonFileStore {
    async fn create_conversation(
        &self,
        title: &str,
        role: Role,
        content: &str,
    ) -> StoreResult<String> {
        let _guard = self.write_lock.lock().await;
        let id = new_conversation_id();
        let conversation = Conversation::seeded(id.clone(), title, role, content);
        self.write_document(&conversation).await?;
        debug!(id = %id, "created conversation document");
        Ok(id)
    }

    async fn append_message(&self, id: &str, role: Role, content: &str) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let path = self
            .document_path(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let mut conversation = self
            .read_document(&path)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        conversation.push(role, content);
        self.write_document(&conversation).await
    }

    async fn get_conversation(&self, id: &str) -> StoreResult<Option<Conversation>> {
        match self.document_path(id) {
            Some(path) => self.read_document(&path).await,
            None => Ok(None),
        }
    }

    async fn list_conversations(&self) -> StoreResult<Vec<ConversationSummary>> {
        let mut summaries = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            match self.read_document(&path).await {
                Ok(Some(conversation)) => summaries.push(conversation.summary()),
                Ok(None) => {}
                Err(StoreError::Serialization(err)) => {
                    warn!(path = %path.display(), error = %err, "skipping unreadable conversation");
                }
                Err(err) => return Err(err),
            }
        }
        sort_summaries(&mut summaries);
        Ok(summaries)
    }

    async fn delete_conversation(&self, id: &str) -> StoreResult<()> {
        let Some(path) = self.document_path(id) else {
            return Ok(());
        };
        let _guard = self.write_lock.lock().await;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(id, "deleted conversation document");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_id() {
        assert!(is_valid_id("3f2a9c0d7e"));
        assert!(is_valid_id("chat_1-a"));
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("../escape"));
        assert!(!is_valid_id("a b"));
        assert!(!is_valid_id(&"x".repeat(65)));
    }
}
