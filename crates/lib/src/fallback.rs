//! Completion fallback: answer unmatched messages with the LLM.
//!
//! One system instruction plus the customer's text verbatim; the first generated
//! message, trimmed, is the reply. Failures come back as `UpstreamError` and the
//! caller decides what the customer sees (normally [`APOLOGY`]).

use crate::config::Config;
use crate::llm::{ChatMessage, LlmBackend, LlmError, OpenAiClient};
use std::sync::Arc;
use std::time::Duration;

/// Reply sent when the completion call fails.
pub const APOLOGY: &str = "Tuve un pequeño error técnico 🤖, probá de nuevo o escribí *menú*.";

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("completion returned no text")]
    EmptyResponse,
}

/// System instruction for the sales assistant, with the business name interpolated.
pub fn system_prompt(business_name: &str) -> String {
    format!(
        "Sos un asesor de ventas de {business_name}. Respondé en español rioplatense, de forma clara y amable.\n\
         Objetivo: ayudar al cliente a comprar o resolver dudas sobre productos Apple.\n\
         Nunca inventes precios; pedí modelo y condición (sellado/usado) si falta información.\n\
         Podés ofrecer cuotas, garantía, envío y derivar a un humano si lo piden.\n\
         Usá emojis sobrios y viñetas si ayudan a la claridad."
    )
}

pub struct CompletionFallback {
    backend: Arc<dyn LlmBackend>,
    model: String,
    temperature: f32,
    system_prompt: String,
}

impl CompletionFallback {
    pub fn new(
        backend: Arc<dyn LlmBackend>,
        model: impl Into<String>,
        temperature: f32,
        business_name: &str,
    ) -> Self {
        Self {
            backend,
            model: model.into(),
            temperature,
            system_prompt: system_prompt(business_name),
        }
    }

    /// Fallback backed by the configured OpenAI-compatible provider.
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        let client = OpenAiClient::new(
            Some(config.completion.base_url.clone()),
            config.api_key().map(str::to_string),
            Duration::from_secs(config.completion.timeout_secs.max(1)),
        )?;
        Ok(Self::with_backend(config, Arc::new(client)))
    }

    /// Fallback using the configured model settings over a caller-supplied backend.
    pub fn with_backend(config: &Config, backend: Arc<dyn LlmBackend>) -> Self {
        Self::new(
            backend,
            config.completion.model.clone(),
            config.completion.temperature,
            &config.business.name,
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate a reply for the customer's text.
    pub async fn generate(&self, text: &str) -> Result<String, UpstreamError> {
        let messages = vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(text),
        ];
        let res = self
            .backend
            .chat(&self.model, messages, self.temperature)
            .await?;
        let reply = res.content().trim();
        if reply.is_empty() {
            return Err(UpstreamError::EmptyResponse);
        }
        Ok(reply.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatResponse;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records the last request and answers with a fixed result.
    struct Recording {
        reply: Result<String, String>,
        seen: Mutex<Option<(String, Vec<ChatMessage>, f32)>>,
    }

    #[async_trait]
    impl LlmBackend for Recording {
        async fn chat(
            &self,
            model: &str,
            messages: Vec<ChatMessage>,
            temperature: f32,
        ) -> Result<ChatResponse, LlmError> {
            *self.seen.lock().unwrap() = Some((model.to_string(), messages, temperature));
            match &self.reply {
                Ok(text) => Ok(ChatResponse {
                    message: Some(ChatMessage {
                        role: "assistant".to_string(),
                        content: text.clone(),
                    }),
                }),
                Err(e) => Err(LlmError::Api(e.clone())),
            }
        }
    }

    fn recording(reply: Result<&str, &str>) -> Arc<Recording> {
        Arc::new(Recording {
            reply: reply.map(str::to_string).map_err(str::to_string),
            seen: Mutex::new(None),
        })
    }

    #[tokio::test]
    async fn sends_system_and_user_messages() {
        let backend = recording(Ok("  El iPhone 13 está disponible.\n"));
        let fallback = CompletionFallback::new(backend.clone(), "gpt-4o-mini", 0.3, "Global iPhone");
        let reply = fallback.generate("cuánto cuesta el iPhone 13").await.unwrap();
        assert_eq!(reply, "El iPhone 13 está disponible.");

        let (model, messages, temperature) = backend.seen.lock().unwrap().clone().unwrap();
        assert_eq!(model, "gpt-4o-mini");
        assert!((temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert!(messages[0].content.contains("asesor de ventas de Global iPhone"));
        assert!(messages[0].content.contains("Nunca inventes precios"));
        assert_eq!(messages[1], ChatMessage::user("cuánto cuesta el iPhone 13"));
    }

    #[tokio::test]
    async fn provider_error_is_upstream_error() {
        let fallback =
            CompletionFallback::new(recording(Err("401 unauthorized")), "gpt-4o-mini", 0.3, "X");
        let err = fallback.generate("hola?").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Llm(LlmError::Api(_))));
    }

    #[tokio::test]
    async fn blank_completion_is_upstream_error() {
        let fallback = CompletionFallback::new(recording(Ok(" \n ")), "gpt-4o-mini", 0.3, "X");
        let err = fallback.generate("hola?").await.unwrap_err();
        assert!(matches!(err, UpstreamError::EmptyResponse));
    }

    #[test]
    fn from_config_uses_configured_model() {
        let mut config = Config::default();
        config.completion.model = "gpt-4.1-mini".to_string();
        let fallback = CompletionFallback::from_config(&config).unwrap();
        assert_eq!(fallback.model(), "gpt-4.1-mini");
    }
}
