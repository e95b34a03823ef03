//! Inbound message from a channel: one request's text, handled and then dropped.

/// A message from a channel to be answered in the same request.
#[derive(Debug, Clone, Default)]
pub struct InboundMessage {
    pub channel_id: String,
    /// Sender address as given by the provider (e.g. "whatsapp:+5493510000000"); may be empty.
    pub conversation_id: String,
    pub text: String,
}
