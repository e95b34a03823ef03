//! Gateway HTTP server: liveness, webhook verification, event ingestion and message replies.

use crate::agent::{self, ReplySource};
use crate::channels::{
    twiml, verify_subscription, MessagingResponse, VerifyQuery, WhatsAppInbound,
};
use crate::config::Config;
use crate::fallback::CompletionFallback;
use crate::llm::LlmBackend;
use crate::rules::QuickRules;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{
        rejection::{FormRejection, QueryRejection},
        Query, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Form, Router,
};
use std::sync::Arc;

/// Body of GET /.
pub const HEALTH_TEXT: &str = "Bot activo ✅";
/// Body of a rejected verification handshake.
pub const VERIFY_REJECTED_TEXT: &str = "Token de verificación inválido";
/// Body of the event-ingestion acknowledgment.
pub const EVENT_RECEIVED_TEXT: &str = "EVENT_RECEIVED";

/// Shared state for the gateway. Built once at startup; never mutated.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    pub rules: Arc<QuickRules>,
    pub fallback: Arc<CompletionFallback>,
}

impl GatewayState {
    /// State backed by the configured completion provider.
    pub fn from_config(config: Config) -> Result<Self> {
        let fallback = CompletionFallback::from_config(&config)
            .context("building completion client")?;
        Ok(Self::assemble(config, fallback))
    }

    /// State with a caller-supplied completion backend.
    pub fn with_backend(config: Config, backend: Arc<dyn LlmBackend>) -> Self {
        let fallback = CompletionFallback::with_backend(&config, backend);
        Self::assemble(config, fallback)
    }

    fn assemble(config: Config, fallback: CompletionFallback) -> Self {
        Self {
            rules: Arc::new(QuickRules::from_config(&config.business)),
            fallback: Arc::new(fallback),
            config: Arc::new(config),
        }
    }
}

/// All gateway routes over the given state.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(health_http))
        .route("/webhook", get(verify_webhook).post(webhook_event))
        .route("/whatsapp", post(whatsapp_message))
        .with_state(state)
}

/// Run the gateway until SIGINT/SIGTERM.
pub async fn run_gateway(config: Config) -> Result<()> {
    if config.api_key().is_none() {
        log::warn!(
            "no completion api key configured (OPENAI_API_KEY); unmatched messages will get the apology reply"
        );
    }
    let bind_addr = format!("{}:{}", config.gateway.bind.trim(), config.gateway.port);
    let state = GatewayState::from_config(config)?;
    log::info!(
        "business: {}, completion model: {}",
        state.config.business.name,
        state.fallback.model()
    );

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// GET / — liveness probe.
async fn health_http() -> &'static str {
    HEALTH_TEXT
}

/// GET /webhook — platform verification handshake. Echoes hub.challenge only on an exact match.
async fn verify_webhook(
    State(state): State<GatewayState>,
    query: Result<Query<VerifyQuery>, QueryRejection>,
) -> (StatusCode, String) {
    let query = query.map(|Query(q)| q).unwrap_or_default();
    match verify_subscription(&query, &state.config.webhook.verify_token) {
        Some(challenge) => {
            log::info!("webhook verified");
            (StatusCode::OK, challenge)
        }
        None => {
            log::warn!("webhook verification rejected (mode: {:?})", query.mode);
            (StatusCode::FORBIDDEN, VERIFY_REJECTED_TEXT.to_string())
        }
    }
}

/// POST /webhook — event notification; logged and acknowledged, never processed.
async fn webhook_event(body: Bytes) -> (StatusCode, &'static str) {
    match serde_json::from_slice::<serde_json::Value>(&body) {
        Ok(event) => log::info!("webhook event received: {}", event),
        Err(_) => log::info!("webhook event received ({} bytes, not JSON)", body.len()),
    }
    (StatusCode::OK, EVENT_RECEIVED_TEXT)
}

/// POST /whatsapp — answer one inbound message with a TwiML envelope. Always 200.
async fn whatsapp_message(
    State(state): State<GatewayState>,
    form: Result<Form<WhatsAppInbound>, FormRejection>,
) -> impl IntoResponse {
    let inbound = match form {
        Ok(Form(f)) => f,
        Err(e) => {
            log::debug!("whatsapp: unreadable form body ({}), treating as empty", e);
            WhatsAppInbound::default()
        }
    };
    let msg = inbound.into_inbound();
    let from = if msg.conversation_id.is_empty() {
        "unknown"
    } else {
        msg.conversation_id.as_str()
    };
    log::info!(
        "whatsapp: inbound from {} ({} chars)",
        from,
        msg.text.chars().count()
    );

    let result = agent::run_turn(&state.rules, &state.fallback, &msg.text).await;
    match result.source {
        ReplySource::QuickRule(group) => {
            log::info!("whatsapp: replied with quick rule {}", group.name())
        }
        ReplySource::Completion => log::info!("whatsapp: replied with completion"),
        ReplySource::Apology => log::info!("whatsapp: replied with apology"),
    }

    let mut resp = MessagingResponse::new();
    resp.message(result.content);
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, twiml::CONTENT_TYPE)],
        resp.render(),
    )
}
