//! LLM abstraction and OpenAI-compatible chat-completions client.
//!
//! `LlmBackend` is the seam between the completion fallback and the provider; tests
//! substitute their own backend.

mod openai;

pub use openai::OpenAiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("completion api key not configured")]
    MissingApiKey,
    #[error("completion request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("completion api error: {0}")]
    Api(String),
}

impl LlmError {
    /// True when the request hit the client timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, LlmError::Request(e) if e.is_timeout())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Result of one chat call: the first generated message, if the provider returned one.
#[derive(Debug, Clone, Default)]
pub struct ChatResponse {
    pub message: Option<ChatMessage>,
}

impl ChatResponse {
    /// Text content of the assistant message, if any.
    pub fn content(&self) -> &str {
        self.message
            .as_ref()
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }
}

/// Chat-completion provider.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Non-streaming chat completion with the given sampling temperature.
    async fn chat(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
        temperature: f32,
    ) -> Result<ChatResponse, LlmError>;
}
