use super::title::{clean_title, title_prompt};
use super::{AnswerGenerator, ChatError, ChatResult, ModelCatalog, TitleGenerator};
use crate::types::ChatMessage;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

pub struct OllamaClient {
    client: Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ChatResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn chat(&self, model: &str, messages: &[ChatMessage]) -> ChatResult<String> {
        let response = self
            .client
            .post(self.endpoint("/api/chat"))
            .json(&OllamaChatRequest {
                model,
                messages,
                stream: false,
            })
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ChatError::Status {
                status: status.as_u16(),
                body,
            });
        }
        parse_chat_response(&body)
    }
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaMessage {
    content: String,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: Option<OllamaMessage>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: Option<String>,
    model: Option<String>,
}

#[derive(Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<OllamaModel>,
}

pub fn parse_chat_response(body: &str) -> ChatResult<String> {
    let parsed: OllamaChatResponse = serde_json::from_str(body)?;
    parsed
        .message
        .map(|msg| msg.content)
        .ok_or_else(|| ChatError::Decode("response has no message".to_string()))
}

/// Model names from a `/api/tags` body, deduplicated in server order.
pub fn parse_model_tags(body: &str) -> ChatResult<Vec<String>> {
    let parsed: OllamaTagsResponse = serde_json::from_str(body)?;
    let mut seen = HashSet::new();
    Ok(parsed
        .models
        .into_iter()
        .filter_map(|m| m.name.or(m.model))
        .filter(|name| seen.insert(name.clone()))
        .collect())
}

#[async_trait]
impl ModelCatalog for OllamaClient {
    async fn list_models(&self) -> ChatResult<Vec<String>> {
        debug!(base_url = %self.base_url, "listing models");
        let response = self.client.get(self.endpoint("/api/tags")).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ChatError::Status {
                status: status.as_u16(),
                body,
            });
        }
        parse_model_tags(&body)
    }
}

#[async_trait]
impl TitleGenerator for OllamaClient {
    async fn generate_title(&self, model: &str, seed: &str) -> ChatResult<String> {
        debug!(model, "generating conversation title");
        let prompt = [ChatMessage::user(title_prompt(seed))];
        let raw = self.chat(model, &prompt).await?;
        clean_title(&raw).ok_or(ChatError::EmptyTitle)
    }
}

#[async_trait]
impl AnswerGenerator for OllamaClient {
    async fn generate_answer(&self, model: &str, history: &[ChatMessage]) -> ChatResult<String> {
        debug!(model, turns = history.len(), "requesting answer");
        self.chat(model, history).await
    }
}
