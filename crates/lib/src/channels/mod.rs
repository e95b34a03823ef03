//! Messaging channel plumbing: the WhatsApp webhook payloads and the TwiML reply envelope.
//!
//! Inbound requests are turned into an `InboundMessage`; replies go back in the HTTP
//! response body wrapped by `MessagingResponse`.

mod inbound;
pub mod twiml;
mod whatsapp;

pub use inbound::InboundMessage;
pub use twiml::MessagingResponse;
pub use whatsapp::{verify_subscription, VerifyQuery, WhatsAppInbound, SUBSCRIBE_MODE};
