//! Server configuration
//!
//! Everything is env-driven with working defaults: bind address, database
//! path, password hashing cost, and the three LLM provider endpoints the
//! proxy relay forwards to. Base URLs are overridable so tests (and
//! self-hosted gateways) can point the relay elsewhere; the provider set
//! itself is fixed.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::ServerError;
use crate::proxy::Provider;

/// Default bind address
pub const DEFAULT_BIND: &str = "127.0.0.1:8787";

/// Default PBKDF2 cost for password hashing
pub const DEFAULT_PASSWORD_ROUNDS: u32 = 210_000;

/// Per-provider API keys and base URLs
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub anthropic_key: Option<String>,
    pub openai_key: Option<String>,
    pub gemini_key: Option<String>,
    pub anthropic_base: String,
    pub openai_base: String,
    pub gemini_base: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            anthropic_key: None,
            openai_key: None,
            gemini_key: None,
            anthropic_base: "https://api.anthropic.com".to_string(),
            openai_base: "https://api.openai.com".to_string(),
            gemini_base: "https://generativelanguage.googleapis.com".to_string(),
        }
    }
}

impl ProviderConfig {
    /// API key for a provider, if configured
    pub fn key_for(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::Anthropic => self.anthropic_key.as_deref(),
            Provider::OpenAi => self.openai_key.as_deref(),
            Provider::Gemini => self.gemini_key.as_deref(),
        }
    }

    /// Base URL for a provider
    pub fn base_for(&self, provider: Provider) -> &str {
        match provider {
            Provider::Anthropic => &self.anthropic_base,
            Provider::OpenAi => &self.openai_base,
            Provider::Gemini => &self.gemini_base,
        }
    }
}

/// Full server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind: SocketAddr,
    /// Path to the SQLite database file
    pub db_path: PathBuf,
    /// PBKDF2 cost for password hashing
    pub password_rounds: u32,
    /// Provider keys and endpoints for the proxy relay
    pub providers: ProviderConfig,
}

impl ServerConfig {
    /// Build a config with defaults for the given database path.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            bind: DEFAULT_BIND.parse().expect("default bind is valid"),
            db_path: db_path.into(),
            password_rounds: DEFAULT_PASSWORD_ROUNDS,
            providers: ProviderConfig::default(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Recognized: `RELEYE_BIND`, `RELEYE_DB`, `ANTHROPIC_API_KEY`,
    /// `OPENAI_API_KEY`, `GEMINI_API_KEY`, and
    /// `RELEYE_{ANTHROPIC,OPENAI,GEMINI}_BASE_URL`.
    pub fn from_env() -> Result<Self, ServerError> {
        let mut config = Self::new(
            std::env::var("RELEYE_DB").unwrap_or_else(|_| "releye.db".to_string()),
        );

        if let Ok(bind) = std::env::var("RELEYE_BIND") {
            config.bind = bind
                .parse()
                .map_err(|_| ServerError::Config(format!("invalid bind address: {bind}")))?;
        }

        config.providers.anthropic_key = std::env::var("ANTHROPIC_API_KEY").ok();
        config.providers.openai_key = std::env::var("OPENAI_API_KEY").ok();
        config.providers.gemini_key = std::env::var("GEMINI_API_KEY").ok();

        if let Ok(base) = std::env::var("RELEYE_ANTHROPIC_BASE_URL") {
            config.providers.anthropic_base = base;
        }
        if let Ok(base) = std::env::var("RELEYE_OPENAI_BASE_URL") {
            config.providers.openai_base = base;
        }
        if let Ok(base) = std::env::var("RELEYE_GEMINI_BASE_URL") {
            config.providers.gemini_base = base;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::new("test.db");
        assert_eq!(config.bind.port(), 8787);
        assert_eq!(config.password_rounds, DEFAULT_PASSWORD_ROUNDS);
        assert!(config.providers.anthropic_key.is_none());
        assert!(config
            .providers
            .base_for(Provider::Gemini)
            .contains("googleapis.com"));
    }
}
