//! Agent turn: quick rules first, then the completion fallback, then the apology on failure.
//! Every inbound text produces exactly one reply.

use crate::fallback::{CompletionFallback, APOLOGY};
use crate::rules::{QuickRules, RuleGroup};

/// Where a reply came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    QuickRule(RuleGroup),
    Completion,
    Apology,
}

/// Result of one turn.
#[derive(Debug, Clone)]
pub struct AgentTurnResult {
    pub content: String,
    pub source: ReplySource,
}

/// Run one turn for the (already trimmed) inbound text.
pub async fn run_turn(
    rules: &QuickRules,
    fallback: &CompletionFallback,
    text: &str,
) -> AgentTurnResult {
    if let Some(group) = RuleGroup::classify(text) {
        log::debug!("agent: quick rule matched ({})", group.name());
        return AgentTurnResult {
            content: rules.render(group),
            source: ReplySource::QuickRule(group),
        };
    }

    match fallback.generate(text).await {
        Ok(content) => AgentTurnResult {
            content,
            source: ReplySource::Completion,
        },
        Err(e) => {
            log::warn!("agent: completion fallback failed: {}", e);
            AgentTurnResult {
                content: APOLOGY.to_string(),
                source: ReplySource::Apology,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatMessage, ChatResponse, LlmBackend, LlmError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counting {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl LlmBackend for Counting {
        async fn chat(
            &self,
            _model: &str,
            messages: Vec<ChatMessage>,
            _temperature: f32,
        ) -> Result<ChatResponse, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(LlmError::Api("503 Service Unavailable".to_string()));
            }
            Ok(ChatResponse {
                message: Some(ChatMessage {
                    role: "assistant".to_string(),
                    content: format!("eco: {}", messages[1].content),
                }),
            })
        }
    }

    fn setup(fail: bool) -> (QuickRules, CompletionFallback, Arc<Counting>) {
        let backend = Arc::new(Counting {
            calls: AtomicUsize::new(0),
            fail,
        });
        let fallback = CompletionFallback::new(backend.clone(), "gpt-4o-mini", 0.3, "Global iPhone");
        (QuickRules::new("Global iPhone", ""), fallback, backend)
    }

    #[tokio::test]
    async fn quick_rule_skips_completion() {
        let (rules, fallback, backend) = setup(false);
        let res = run_turn(&rules, &fallback, "Menú").await;
        assert_eq!(res.source, ReplySource::QuickRule(RuleGroup::Menu));
        assert_eq!(res.content, rules.render(RuleGroup::Menu));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unmatched_text_goes_to_completion() {
        let (rules, fallback, backend) = setup(false);
        let res = run_turn(&rules, &fallback, "cuánto cuesta el iPhone 13").await;
        assert_eq!(res.source, ReplySource::Completion);
        assert_eq!(res.content, "eco: cuánto cuesta el iPhone 13");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn completion_failure_becomes_apology() {
        let (rules, fallback, _) = setup(true);
        let res = run_turn(&rules, &fallback, "tienen el 16 pro max?").await;
        assert_eq!(res.source, ReplySource::Apology);
        assert_eq!(res.content, APOLOGY);
    }
}
