//! Integration tests for the on-disk conversation store

use convopro::store::{ConversationStore, JsonFileStore, StoreError};
use convopro::types::Role;
use tempfile::TempDir;

fn open_store() -> (TempDir, JsonFileStore) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = JsonFileStore::open(dir.path().join("conversations")).expect("Failed to open store");
    (dir, store)
}

mod document_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get() {
        let (_dir, store) = open_store();

        let id = store
            .create_conversation("Greeting", Role::User, "Hello")
            .await
            .expect("Failed to create");

        let conversation = store
            .get_conversation(&id)
            .await
            .expect("Failed to read")
            .expect("conversation exists");
        assert_eq!(conversation.id, id);
        assert_eq!(conversation.title, "Greeting");
        assert_eq!(conversation.messages.len(), 1);
        assert_eq!(conversation.messages[0].role, Role::User);
        assert_eq!(conversation.messages[0].content, "Hello");
        assert_eq!(conversation.created_at, conversation.updated_at);
    }

    #[tokio::test]
    async fn test_append_preserves_order() {
        let (_dir, store) = open_store();
        let id = store
            .create_conversation("Numbers", Role::User, "one")
            .await
            .unwrap();

        store.append_message(&id, Role::Assistant, "two").await.unwrap();
        store.append_message(&id, Role::User, "three").await.unwrap();

        let conversation = store.get_conversation(&id).await.unwrap().unwrap();
        let contents: Vec<_> = conversation
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
        assert!(conversation.updated_at >= conversation.created_at);
    }

    #[tokio::test]
    async fn test_documents_survive_reopen() {
        let (dir, store) = open_store();
        let id = store
            .create_conversation("Persistent", Role::User, "remember me")
            .await
            .unwrap();
        drop(store);

        let reopened = JsonFileStore::open(dir.path().join("conversations")).unwrap();
        let conversation = reopened.get_conversation(&id).await.unwrap().unwrap();
        assert_eq!(conversation.title, "Persistent");
        assert_eq!(conversation.messages[0].content, "remember me");
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let (_dir, store) = open_store();
        assert!(store.get_conversation("0123abcd").await.unwrap().is_none());
        assert!(store.get_conversation("../../etc/passwd").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_append_to_nonexistent_fails() {
        let (_dir, store) = open_store();
        let err = store
            .append_message("0123abcd", Role::User, "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == "0123abcd"));
    }
}

mod listing_tests {
    use super::*;

    #[tokio::test]
    async fn test_list_and_delete() {
        let (_dir, store) = open_store();
        let first = store
            .create_conversation("First", Role::User, "a")
            .await
            .unwrap();
        let second = store
            .create_conversation("Second", Role::User, "b")
            .await
            .unwrap();

        let list = store.list_conversations().await.unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.iter().any(|s| s.id == first && s.title == "First"));
        assert!(list.iter().any(|s| s.id == second && s.title == "Second"));

        store.delete_conversation(&first).await.unwrap();
        let list = store.list_conversations().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, second);

        // Deleting again is a no-op.
        store.delete_conversation(&first).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_skips_foreign_and_corrupt_files() {
        let (_dir, store) = open_store();
        let id = store
            .create_conversation("Real", Role::User, "x")
            .await
            .unwrap();

        std::fs::write(store.dir().join("notes.txt"), "not a conversation").unwrap();
        std::fs::write(store.dir().join("broken.json"), "{ nope").unwrap();

        let list = store.list_conversations().await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, id);
    }

    #[tokio::test]
    async fn test_empty_store_lists_nothing() {
        let (_dir, store) = open_store();
        assert!(store.list_conversations().await.unwrap().is_empty());
    }
}
