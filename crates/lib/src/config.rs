//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (default `./storebot.json`) and then overridden
//! from the environment. Built once at startup and shared read-only.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP listener settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Business identity used in canned replies and the system prompt.
    #[serde(default)]
    pub business: BusinessConfig,

    /// Completion provider (OpenAI-compatible) settings.
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Platform webhook verification.
    #[serde(default)]
    pub webhook: WebhookConfig,
}

/// Gateway bind and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for HTTP (default 3000). Overridden by PORT env.
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "0.0.0.0"; the messaging provider must reach it).
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
}

fn default_gateway_port() -> u16 {
    3000
}

fn default_gateway_bind() -> String {
    "0.0.0.0".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessConfig {
    /// Display name (default "Global iPhone"). Overridden by BUSINESS_NAME env.
    #[serde(default = "default_business_name")]
    pub name: String,

    /// Human operator contact shown on handoff. Empty disables it. Overridden by WHATSAPP_HUMAN_NUMBER env.
    #[serde(default)]
    pub human_contact: String,
}

fn default_business_name() -> String {
    "Global iPhone".to_string()
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            name: default_business_name(),
            human_contact: String::new(),
        }
    }
}

/// Completion provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionConfig {
    /// API key. Overridden by OPENAI_API_KEY env. Not validated at startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API. Overridden by OPENAI_BASE_URL env.
    #[serde(default = "default_completion_base_url")]
    pub base_url: String,

    #[serde(default = "default_completion_model")]
    pub model: String,

    #[serde(default = "default_completion_temperature")]
    pub temperature: f32,

    /// Upper bound on one completion round-trip, in seconds.
    #[serde(default = "default_completion_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_completion_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_completion_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_completion_temperature() -> f32 {
    0.3
}

fn default_completion_timeout_secs() -> u64 {
    30
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_completion_base_url(),
            model: default_completion_model(),
            temperature: default_completion_temperature(),
            timeout_secs: default_completion_timeout_secs(),
        }
    }
}

/// Webhook verification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookConfig {
    /// Pre-shared token compared literally against hub.verify_token. Overridden by WHATSAPP_VERIFY_TOKEN env.
    #[serde(default = "default_verify_token")]
    pub verify_token: String,
}

fn default_verify_token() -> String {
    "globalstore123".to_string()
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            verify_token: default_verify_token(),
        }
    }
}

impl Config {
    /// Apply environment overrides. `lookup` returns the raw value of a variable, if set.
    /// Blank values are ignored, except WHATSAPP_HUMAN_NUMBER which may clear the contact.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        if let Some(port) = non_empty("PORT") {
            match port.parse::<u16>() {
                Ok(p) => self.gateway.port = p,
                Err(_) => log::warn!("ignoring invalid PORT value: {}", port),
            }
        }
        if let Some(name) = non_empty("BUSINESS_NAME") {
            self.business.name = name;
        }
        if let Some(contact) = lookup("WHATSAPP_HUMAN_NUMBER") {
            self.business.human_contact = contact.trim().to_string();
        }
        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.completion.api_key = Some(key);
        }
        if let Some(url) = non_empty("OPENAI_BASE_URL") {
            self.completion.base_url = url;
        }
        if let Some(token) = non_empty("WHATSAPP_VERIFY_TOKEN") {
            self.webhook.verify_token = token;
        }
    }

    /// Configured API key, with surrounding whitespace removed; None when blank.
    pub fn api_key(&self) -> Option<&str> {
        self.completion
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("STOREBOT_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("storebot.json"))
}

/// Load config from the given path (or the default), then apply environment overrides.
/// Missing file => default config. Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let mut config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    config.apply_env(|key| std::env::var(key).ok());
    Ok((config, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults() {
        let c = Config::default();
        assert_eq!(c.gateway.port, 3000);
        assert_eq!(c.gateway.bind, "0.0.0.0");
        assert_eq!(c.business.name, "Global iPhone");
        assert!(c.business.human_contact.is_empty());
        assert_eq!(c.completion.model, "gpt-4o-mini");
        assert!((c.completion.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(c.webhook.verify_token, "globalstore123");
        assert!(c.api_key().is_none());
    }

    #[test]
    fn empty_json_uses_defaults() {
        let c: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(c.gateway.port, 3000);
        assert_eq!(c.completion.timeout_secs, 30);
    }

    #[test]
    fn camel_case_keys() {
        let c: Config = serde_json::from_str(
            r#"{"business":{"name":"Tienda","humanContact":"+54 351 000"},"completion":{"timeoutSecs":5}}"#,
        )
        .unwrap();
        assert_eq!(c.business.name, "Tienda");
        assert_eq!(c.business.human_contact, "+54 351 000");
        assert_eq!(c.completion.timeout_secs, 5);
    }

    #[test]
    fn env_overrides_file_values() {
        let vars = env(&[
            ("PORT", "8080"),
            ("BUSINESS_NAME", "Otra Tienda"),
            ("WHATSAPP_HUMAN_NUMBER", " +5493510000000 "),
            ("OPENAI_API_KEY", "sk-test"),
        ]);
        let mut c = Config::default();
        c.apply_env(|k| vars.get(k).cloned());
        assert_eq!(c.gateway.port, 8080);
        assert_eq!(c.business.name, "Otra Tienda");
        assert_eq!(c.business.human_contact, "+5493510000000");
        assert_eq!(c.api_key(), Some("sk-test"));
    }

    #[test]
    fn blank_or_invalid_env_is_ignored() {
        let vars = env(&[("PORT", "not-a-port"), ("BUSINESS_NAME", "   ")]);
        let mut c = Config::default();
        c.apply_env(|k| vars.get(k).cloned());
        assert_eq!(c.gateway.port, 3000);
        assert_eq!(c.business.name, "Global iPhone");
    }
}
