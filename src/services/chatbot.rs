use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::{CircuitBreakerConfig, OpenAiConfig};
use crate::models::{ChatMessage, ChatRole};
use crate::services::circuit_breaker::CircuitBreaker;

/// Restaurant facts and the topic restriction sent ahead of every conversation.
pub const SYSTEM_PROMPT: &str = include_str!("system_prompt.txt");

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Chatbot is not configured")]
    NotConfigured,

    #[error("OpenAI API key is invalid or expired")]
    InvalidApiKey,

    #[error("OpenAI API rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("Chatbot is temporarily unavailable. Please try again later.")]
    CircuitOpen,

    #[error("Failed to get AI response. Please try again later.")]
    Upstream { detail: String },
}

// --- Модели данных для API чат-комплишенов ---

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

/// Клиент для API чат-комплишенов.
#[derive(Clone)]
pub struct ChatClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    max_history: usize,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl ChatClient {
    pub fn from_config(
        config: &OpenAiConfig,
        breaker: &CircuitBreakerConfig,
    ) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http_client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            max_history: config.max_history.max(1),
            circuit_breaker: Arc::new(CircuitBreaker::new(
                breaker.failure_threshold,
                breaker.timeout_seconds,
            )),
        })
    }

    /// Drops client supplied system messages, keeps the latest `max_history`
    /// turns and puts the restaurant prompt in front.
    pub fn prepare_messages(&self, history: Vec<ChatMessage>) -> Vec<ChatMessage> {
        let mut turns: Vec<ChatMessage> = history
            .into_iter()
            .filter(|m| m.role != ChatRole::System)
            .collect();
        if turns.len() > self.max_history {
            turns.drain(..turns.len() - self.max_history);
        }

        let mut messages = Vec::with_capacity(turns.len() + 1);
        messages.push(ChatMessage::system(SYSTEM_PROMPT));
        messages.extend(turns);
        messages
    }

    pub async fn reply(&self, history: Vec<ChatMessage>) -> Result<String, ChatError> {
        let api_key = self.api_key.as_deref().ok_or(ChatError::NotConfigured)?;

        let messages = self.prepare_messages(history);

        if !self.circuit_breaker.can_execute() {
            warn!("Circuit breaker is OPEN - blocking chat completion request");
            return Err(ChatError::CircuitOpen);
        }

        let request = CompletionRequest {
            model: &self.model,
            messages: &messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        debug!("Sending {} messages to {}", messages.len(), self.model);

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.upstream_failure(e.to_string()))?;

        match response.status() {
            StatusCode::UNAUTHORIZED => {
                self.circuit_breaker.release_trial();
                error!("Chat completion API rejected the API key");
                return Err(ChatError::InvalidApiKey);
            }
            StatusCode::TOO_MANY_REQUESTS => {
                self.circuit_breaker.record_failure();
                warn!("Chat completion API rate limit hit");
                return Err(ChatError::RateLimited);
            }
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(self.upstream_failure(format!("status {status}: {body}")));
            }
            _ => {}
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| self.upstream_failure(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| self.upstream_failure("completion had no content".to_string()))?;

        self.circuit_breaker.record_success();
        info!("Chat completion returned {} chars", content.len());
        Ok(content)
    }

    fn upstream_failure(&self, detail: String) -> ChatError {
        error!("Chat completion request failed: {}", detail);
        self.circuit_breaker.record_failure();
        ChatError::Upstream { detail }
    }
}
