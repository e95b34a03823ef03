//! WhatsApp webhook payloads: the form-encoded inbound message and the Meta
//! `hub.*` verification handshake.

use crate::channels::inbound::InboundMessage;
use serde::Deserialize;

/// Only mode accepted by the verification handshake.
pub const SUBSCRIBE_MODE: &str = "subscribe";

/// Form fields posted by the messaging transport for one inbound WhatsApp message.
/// Only `Body` is used for the reply; the rest feed log lines.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WhatsAppInbound {
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub message_sid: Option<String>,
    #[serde(default)]
    pub profile_name: Option<String>,
}

impl WhatsAppInbound {
    /// Message text, trimmed; empty when the field is absent.
    pub fn text(&self) -> &str {
        self.body.as_deref().unwrap_or("").trim()
    }

    pub fn into_inbound(self) -> InboundMessage {
        InboundMessage {
            channel_id: "whatsapp".to_string(),
            conversation_id: self.from.clone().unwrap_or_default(),
            text: self.text().to_string(),
        }
    }
}

/// Query parameters of the GET verification handshake.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Challenge to echo back when mode is `subscribe` and the token matches exactly; None otherwise.
/// An absent challenge on an accepted handshake echoes as the empty string.
pub fn verify_subscription(query: &VerifyQuery, expected_token: &str) -> Option<String> {
    let mode_ok = query.mode.as_deref() == Some(SUBSCRIBE_MODE);
    let token_ok = query.verify_token.as_deref() == Some(expected_token);
    if mode_ok && token_ok {
        Some(query.challenge.clone().unwrap_or_default())
    } else {
        None
    }
}
