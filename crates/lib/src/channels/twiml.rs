//! TwiML messaging response: the XML envelope the messaging transport expects as the
//! webhook reply (`<Response><Message><Body>…</Body></Message></Response>`).

/// Content type of a rendered envelope.
pub const CONTENT_TYPE: &str = "application/xml";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Builder for a messaging response holding zero or more outbound messages.
#[derive(Debug, Clone, Default)]
pub struct MessagingResponse {
    messages: Vec<String>,
}

impl MessagingResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one outbound message with the given body text.
    pub fn message(&mut self, body: impl Into<String>) -> &mut Self {
        self.messages.push(body.into());
        self
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn render(&self) -> String {
        let mut out = String::from(XML_DECLARATION);
        if self.messages.is_empty() {
            out.push_str("<Response />");
            return out;
        }
        out.push_str("<Response>");
        for body in &self.messages {
            out.push_str("<Message><Body>");
            out.push_str(&escape_xml(body));
            out.push_str("</Body></Message>");
        }
        out.push_str("</Response>");
        out
    }
}

/// Escape text for use inside an XML element.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_message_envelope() {
        let mut resp = MessagingResponse::new();
        resp.message("Hola 👋\nElegí una opción");
        assert_eq!(
            resp.render(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message><Body>Hola 👋\nElegí una opción</Body></Message></Response>"
        );
    }

    #[test]
    fn body_is_escaped() {
        let mut resp = MessagingResponse::new();
        resp.message("Promos & cuotas <3 \"ya\" 'hoy'");
        let xml = resp.render();
        assert!(xml.contains("<Body>Promos &amp; cuotas &lt;3 &quot;ya&quot; &apos;hoy&apos;</Body>"));
        assert_eq!(xml.matches("<Message>").count(), 1);
    }

    #[test]
    fn empty_response() {
        assert!(MessagingResponse::new().render().ends_with("<Response />"));
    }
}
