//! Quick rules: fixed keyword groups answered with canned replies, checked before any LLM call.
//!
//! Matching is exact membership of the normalized text (trimmed, lower-cased) in a
//! group's trigger set. There is no partial or fuzzy matching.

use crate::config::BusinessConfig;

/// One group of trigger phrases sharing a canned reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleGroup {
    Menu,
    Pricing,
    Promotions,
    Shipping,
    Warranty,
    Handoff,
}

impl RuleGroup {
    /// Evaluation order. Trigger sets are disjoint, so order only affects logging.
    pub const ALL: [RuleGroup; 6] = [
        RuleGroup::Menu,
        RuleGroup::Pricing,
        RuleGroup::Promotions,
        RuleGroup::Shipping,
        RuleGroup::Warranty,
        RuleGroup::Handoff,
    ];

    /// Normalized trigger phrases for this group.
    pub fn triggers(self) -> &'static [&'static str] {
        match self {
            RuleGroup::Menu => &["hola", "menu", "menú", "inicio", "ayuda"],
            RuleGroup::Pricing => &["1", "precios", "precio", "stock", "lista"],
            RuleGroup::Promotions => &["2", "promos", "promo", "cuotas", "payway"],
            RuleGroup::Shipping => &["3", "envio", "envíos", "retiro", "retiros", "entrega"],
            RuleGroup::Warranty => &[
                "4",
                "garantia",
                "garantía",
                "cambios",
                "devolucion",
                "devolución",
            ],
            RuleGroup::Handoff => &["5", "humano", "asesor", "vendedor"],
        }
    }

    /// Short name for log lines.
    pub fn name(self) -> &'static str {
        match self {
            RuleGroup::Menu => "menu",
            RuleGroup::Pricing => "pricing",
            RuleGroup::Promotions => "promotions",
            RuleGroup::Shipping => "shipping",
            RuleGroup::Warranty => "warranty",
            RuleGroup::Handoff => "handoff",
        }
    }

    /// Group whose trigger set contains the normalized text, if any.
    pub fn classify(text: &str) -> Option<RuleGroup> {
        let t = normalize(text);
        if t.is_empty() {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|g| g.triggers().contains(&t.as_str()))
    }
}

/// Trim surrounding whitespace and lower-case (Unicode-aware, so "MENÚ" becomes "menú").
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Canned-reply matcher bound to the business name and optional human contact.
#[derive(Debug, Clone)]
pub struct QuickRules {
    business_name: String,
    human_contact: Option<String>,
}

impl QuickRules {
    pub fn new(business_name: impl Into<String>, human_contact: &str) -> Self {
        let contact = human_contact.trim();
        Self {
            business_name: business_name.into(),
            human_contact: if contact.is_empty() {
                None
            } else {
                Some(contact.to_string())
            },
        }
    }

    pub fn from_config(business: &BusinessConfig) -> Self {
        Self::new(business.name.clone(), &business.human_contact)
    }

    /// Canned reply for the text, or None when no group matches (caller falls back to the LLM).
    pub fn reply(&self, text: &str) -> Option<String> {
        RuleGroup::classify(text).map(|g| self.render(g))
    }

    /// Canned reply text for a group.
    pub fn render(&self, group: RuleGroup) -> String {
        match group {
            RuleGroup::Menu => format!(
                "Hola 👋 soy el asistente de *{}*.\n\
                 Elegí una opción o escribí tu consulta:\n\
                 1️⃣ Precios y stock\n\
                 2️⃣ Promos & cuotas (Payway)\n\
                 3️⃣ Envíos y retiros\n\
                 4️⃣ Garantía y cambios\n\
                 5️⃣ Hablar con una persona",
                self.business_name
            ),
            RuleGroup::Pricing => "Decime el *modelo* y si lo querés *sellado o usado* \
                 (ej: “iPhone 15 Pro 256 sellado”)."
                .to_string(),
            RuleGroup::Promotions => "Promo ⭐ *3 cuotas sin interés*.\n\
                 Con interés: 6 y 9 cuotas vía Payway.\n\
                 Decime el *monto* y la *cantidad de cuotas* y te calculo al toque."
                .to_string(),
            RuleGroup::Shipping => "Entregamos en *Córdoba* y *Catamarca*. \
                 Podés retirar o pedir envío a domicilio 🚚."
                .to_string(),
            RuleGroup::Warranty => "Todos nuestros equipos tienen *garantía escrita*. \
                 Si surge un problema real de fábrica, *te cambiamos el equipo*."
                .to_string(),
            RuleGroup::Handoff => match &self.human_contact {
                Some(contact) => format!(
                    "Te derivo con un asesor humano 👉 {}\n\
                     También podés seguir consultando conmigo 🤖.",
                    contact
                ),
                None => "¡Listo! Aviso a un asesor humano para que te escriba en breve.".to_string(),
            },
        }
    }
}
