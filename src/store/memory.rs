use super::{
    Conversation, ConversationStore, ConversationSummary, StoreError, StoreResult,
    new_conversation_id, sort_summaries,
};
use crate::types::Role;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

#[derive(Default)]
pub struct MemoryStore {
    conversations: Mutex<HashMap<String, Conversation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn create_conversation(
        &self,
        title: &str,
        role: Role,
        content: &str,
    ) -> StoreResult<String> {
        let id = new_conversation_id();
        let conversation = Conversation::seeded(id.clone(), title, role, content);
        self.conversations
            .lock()
            .await
            .insert(id.clone(), conversation);
        Ok(id)
    }

    async fn append_message(&self, id: &str, role: Role, content: &str) -> StoreResult<()> {
        let mut conversations = self.conversations.lock().await;
        let conversation = conversations
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        conversation.push(role, content);
        Ok(())
    }

    async fn get_conversation(&self, id: &str) -> StoreResult<Option<Conversation>> {
        Ok(self.conversations.lock().await.get(id).cloned())
    }

    async fn list_conversations(&self) -> StoreResult<Vec<ConversationSummary>> {
        let mut summaries: Vec<_> = self
            .conversations
            .lock()
            .await
            .values()
            .map(Conversation::summary)
            .collect();
        sort_summaries(&mut summaries);
        Ok(summaries)
    }

    async fn delete_conversation(&self, id: &str) -> StoreResult<()> {
        self.conversations.lock().await.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_append_read() {
        let store = MemoryStore::new();
        let id = store
            .create_conversation("Greeting", Role::User, "Hello")
            .await
            .unwrap();
        store
            .append_message(&id, Role::Assistant, "Hi!")
            .await
            .unwrap();

        let conversation = store.get_conversation(&id).await.unwrap().unwrap();
        assert_eq!(conversation.title, "Greeting");
        let roles: Vec<_> = conversation.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
    }

    #[tokio::test]
    async fn append_to_unknown_conversation_fails() {
        let store = MemoryStore::new();
        let err = store
            .append_message("missing", Role::User, "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn append_moves_conversation_to_top() {
        let store = MemoryStore::new();
        let older = store
            .create_conversation("Older", Role::User, "a")
            .await
            .unwrap();
        let newer = store
            .create_conversation("Newer", Role::User, "b")
            .await
            .unwrap();
        {
            let mut conversations = store.conversations.lock().await;
            conversations.get_mut(&older).unwrap().updated_at = 100;
            conversations.get_mut(&newer).unwrap().updated_at = 200;
        }

        let ids: Vec<_> = store
            .list_conversations()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![newer.clone(), older.clone()]);

        store
            .append_message(&older, Role::Assistant, "back again")
            .await
            .unwrap();
        let ids: Vec<_> = store
            .list_conversations()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![older, newer]);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryStore::new();
        let id = store
            .create_conversation("Temp", Role::User, "x")
            .await
            .unwrap();
        store.delete_conversation(&id).await.unwrap();
        store.delete_conversation(&id).await.unwrap();
        assert!(store.get_conversation(&id).await.unwrap().is_none());
        assert!(store.list_conversations().await.unwrap().is_empty());
    }
}
