//! Session orchestration: the state behind one open chat window and the
//! command handlers that drive it.
//!
//! A [`ChatSession`] is created per user session and owns its
//! [`SessionState`]. Every handler runs to completion before the next one is
//! accepted; the presentation layer only reads state back through
//! [`ChatSession::state`].

use crate::ai::{AnswerGenerator, ChatResult, ModelCatalog, TitleGenerator};
use crate::store::{ConversationStore, StoreError, StoreResult, now_unix};
use crate::types::{ChatMessage, Role};
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Title given to a conversation when the model cannot name it.
pub const DEFAULT_TITLE: &str = "New Chat";
/// Title shown when a selected conversation no longer exists.
pub const UNTITLED_CONVERSATION: &str = "Untitled Conversation";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    selected_model: Option<String>,
    conversation_id: Option<String>,
    conversation_title: Option<String>,
    history: Vec<ChatMessage>,
    sent_at: Vec<i64>,
}

impl SessionState {
    pub fn selected_model(&self) -> Option<&str> {
        self.selected_model.as_deref()
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    pub fn conversation_title(&self) -> Option<&str> {
        self.conversation_title.as_deref()
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Unix seconds at which the history entry at `index` was written.
    pub fn sent_at(&self, index: usize) -> Option<i64> {
        self.sent_at.get(index).copied()
    }

    pub fn has_active_conversation(&self) -> bool {
        self.conversation_id.is_some()
    }

    fn push_message(&mut self, message: ChatMessage) {
        self.history.push(message);
        self.sent_at.push(now_unix());
    }

    fn pop_message(&mut self) {
        self.history.pop();
        self.sent_at.pop();
    }

    fn clear_conversation(&mut self) {
        self.conversation_id = None;
        self.conversation_title = None;
        self.history.clear();
        self.sent_at.clear();
    }
}

/// The model-facing collaborators of a session.
#[derive(Clone)]
pub struct Services {
    pub catalog: Arc<dyn ModelCatalog>,
    pub titles: Arc<dyn TitleGenerator>,
    pub answers: Arc<dyn AnswerGenerator>,
}

impl Services {
    /// Uses one backend for all three capabilities.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: ModelCatalog + TitleGenerator + AnswerGenerator + 'static,
    {
        Self {
            catalog: backend.clone(),
            titles: backend.clone(),
            answers: backend,
        }
    }
}

/// A row of the conversation list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversationEntry {
    pub id: String,
    pub title: String,
    /// Unix seconds of the last message.
    pub updated_at: i64,
    pub is_active: bool,
}

/// Result of one completed user turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnOutcome {
    pub conversation_id: String,
    /// The turn created the conversation record.
    pub started_conversation: bool,
    pub reply: String,
    /// Set when the reply is a failure notice rather than a model answer.
    pub answer_error: Option<String>,
}

pub struct ChatSession {
    store: Arc<dyn ConversationStore>,
    services: Services,
    preferred_model: Option<String>,
    models: Option<Vec<String>>,
    state: SessionState,
}

impl ChatSession {
    pub fn new(store: Arc<dyn ConversationStore>, services: Services) -> Self {
        Self {
            store,
            services,
            preferred_model: None,
            models: None,
            state: SessionState::default(),
        }
    }

    /// Model to pre-select once the catalog is loaded, if the catalog has it.
    pub fn with_preferred_model(mut self, model: Option<String>) -> Self {
        self.preferred_model = model;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Catalog of models, fetched once per session.
    ///
    /// A failed fetch is not cached, so the next call asks the catalog again.
    pub async fn models(&mut self) -> ChatResult<&[String]> {
        if self.models.is_none() {
            let models = self.services.catalog.list_models().await?;
            debug!(count = models.len(), "loaded model catalog");
            if self.state.selected_model.is_none() {
                self.state.selected_model = self
                    .preferred_model
                    .as_ref()
                    .filter(|preferred| models.contains(preferred))
                    .or_else(|| models.first())
                    .cloned();
            }
            self.models = Some(models);
        }
        Ok(self.models.as_deref().unwrap_or_default())
    }

    pub fn select_model(&mut self, model: impl Into<String>) -> &SessionState {
        self.state.selected_model = Some(model.into());
        &self.state
    }

    pub async fn list_conversations(&self) -> StoreResult<Vec<ConversationEntry>> {
        let active = self.state.conversation_id();
        Ok(self
            .store
            .list_conversations()
            .await?
            .into_iter()
            .map(|summary| ConversationEntry {
                is_active: active == Some(summary.id.as_str()),
                id: summary.id,
                title: summary.title,
                updated_at: summary.updated_at,
            })
            .collect())
    }

    pub fn start_new_conversation(&mut self) -> &SessionState {
        self.state.clear_conversation();
        &self.state
    }

    /// Makes `id` the active conversation.
    ///
    /// An id missing from the store yields an empty, untitled view instead of
    /// an error.
    pub async fn select_conversation(&mut self, id: &str) -> StoreResult<&SessionState> {
        let conversation = self.store.get_conversation(id).await?;
        self.state.conversation_id = Some(id.to_string());
        match conversation {
            Some(conversation) => {
                info!(id, messages = conversation.messages.len(), "selected conversation");
                self.state.conversation_title = Some(conversation.title);
                self.state.history = conversation.messages.iter().map(ChatMessage::from).collect();
                self.state.sent_at = conversation.messages.iter().map(|m| m.created_at).collect();
            }
            None => {
                warn!(id, "selected conversation not found in store");
                self.state.conversation_title = Some(UNTITLED_CONVERSATION.to_string());
                self.state.history.clear();
                self.state.sent_at.clear();
            }
        }
        Ok(&self.state)
    }

    /// Deletes `id` from the store, resetting the session when it was active.
    pub async fn delete_conversation(&mut self, id: &str) -> StoreResult<&SessionState> {
        self.store.delete_conversation(id).await?;
        info!(id, "deleted conversation");
        if self.state.conversation_id() == Some(id) {
            self.state.clear_conversation();
        }
        Ok(&self.state)
    }

    /// Runs one turn: persist the user message, ask the model, persist the reply.
    ///
    /// Title and answer failures are absorbed. Store failures are returned
    /// after the in-memory history is rolled back to what the store holds.
    /// An active id the store no longer knows is replaced by a fresh record
    /// holding the current history. Blank input is ignored and yields `Ok(None)`.
    pub async fn submit_user_message(
        &mut self,
        model: &str,
        text: &str,
    ) -> StoreResult<Option<TurnOutcome>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        self.state.push_message(ChatMessage::user(text));

        let (conversation_id, started_conversation) = match self.state.conversation_id.clone() {
            None => {
                let title =
                    title_or_default(self.services.titles.generate_title(model, text).await);
                match self.store.create_conversation(&title, Role::User, text).await {
                    Ok(id) => {
                        info!(id = %id, title = %title, "started conversation");
                        self.state.conversation_id = Some(id.clone());
                        self.state.conversation_title = Some(title);
                        (id, true)
                    }
                    Err(err) => {
                        self.state.pop_message();
                        return Err(err);
                    }
                }
            }
            Some(id) => match self.store.append_message(&id, Role::User, text).await {
                Ok(()) => (id, false),
                Err(StoreError::NotFound(_)) => match self.recreate_conversation().await {
                    Ok(new_id) => {
                        warn!(missing = %id, id = %new_id, "active conversation missing from store, recreated");
                        self.state.conversation_id = Some(new_id.clone());
                        (new_id, true)
                    }
                    Err(err) => {
                        self.state.pop_message();
                        return Err(err);
                    }
                },
                Err(err) => {
                    self.state.pop_message();
                    return Err(err);
                }
            },
        };

        let answer = self
            .services
            .answers
            .generate_answer(model, &self.state.history)
            .await;
        let answer_error = answer.as_ref().err().map(ToString::to_string);
        let reply = answer_or_notice(answer);

        self.state.push_message(ChatMessage::assistant(reply.clone()));
        if let Err(err) = self
            .store
            .append_message(&conversation_id, Role::Assistant, &reply)
            .await
        {
            self.state.pop_message();
            return Err(err);
        }

        Ok(Some(TurnOutcome {
            conversation_id,
            started_conversation,
            reply,
            answer_error,
        }))
    }

    /// Writes the whole in-memory history into a new record under the
    /// current title.
    async fn recreate_conversation(&mut self) -> StoreResult<String> {
        let title = self
            .state
            .conversation_title
            .get_or_insert_with(|| UNTITLED_CONVERSATION.to_string())
            .clone();
        let Some((first, rest)) = self.state.history.split_first() else {
            return Err(StoreError::NotFound(String::new()));
        };
        let id = self
            .store
            .create_conversation(&title, first.role, &first.content)
            .await?;
        for message in rest {
            self.store
                .append_message(&id, message.role, &message.content)
                .await?;
        }
        Ok(id)
    }
}

/// Title to store for a new conversation, falling back to [`DEFAULT_TITLE`].
pub fn title_or_default(result: ChatResult<String>) -> String {
    match result {
        Ok(title) if !title.trim().is_empty() => title.trim().to_string(),
        Ok(_) => DEFAULT_TITLE.to_string(),
        Err(err) => {
            warn!(error = %err, "title generation failed");
            DEFAULT_TITLE.to_string()
        }
    }
}

/// Assistant content for a turn: the answer, or a notice carrying the error.
pub fn answer_or_notice(result: ChatResult<String>) -> String {
    match result {
        Ok(answer) => answer,
        Err(err) => {
            warn!(error = %err, "answer generation failed");
            answer_failure_notice(&err)
        }
    }
}

pub fn answer_failure_notice(detail: &impl Display) -> String {
    format!("Error {detail}: Unable to get response from the model.")
}
