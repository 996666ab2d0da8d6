//! LLM proxy relay
//!
//! Forwards a JSON payload to one of exactly three provider endpoints,
//! attaching the server-side API key so it never ships to the client.
//! Upstream 2xx bodies pass through as `data`; upstream failures pass
//! their status through in the error envelope.

use std::time::Instant;

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::ProviderConfig;
use crate::error::ApiError;

/// Anthropic API version header value sent with relayed requests
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// The three supported LLM providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    OpenAi,
    Gemini,
}

impl Provider {
    /// Parse a provider name from a request.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "anthropic" => Some(Provider::Anthropic),
            "openai" => Some(Provider::OpenAi),
            "gemini" => Some(Provider::Gemini),
            _ => None,
        }
    }

    /// Canonical name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Anthropic => "anthropic",
            Provider::OpenAi => "openai",
            Provider::Gemini => "gemini",
        }
    }
}

/// Body of a `POST /api/proxy` request
#[derive(Debug, Deserialize)]
pub struct ProxyRequest {
    /// One of `anthropic`, `openai`, `gemini`
    pub provider: String,
    /// The payload forwarded verbatim to the provider
    pub body: Value,
}

/// Resolve the full upstream URL for a request.
///
/// Gemini's endpoint embeds the model name in the path, so it is taken
/// (and removed) from the payload; the other providers keep `model` in
/// the body where their APIs expect it.
fn upstream_url(
    provider: Provider,
    providers: &ProviderConfig,
    body: &mut Value,
) -> Result<String, ApiError> {
    let base = providers.base_for(provider).trim_end_matches('/');
    match provider {
        Provider::Anthropic => Ok(format!("{base}/v1/messages")),
        Provider::OpenAi => Ok(format!("{base}/v1/chat/completions")),
        Provider::Gemini => {
            let model = body
                .get("model")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    ApiError::BadRequest("gemini requests require a 'model' field".to_string())
                })?
                .to_string();
            if let Some(map) = body.as_object_mut() {
                map.remove("model");
            }
            Ok(format!("{base}/v1beta/models/{model}:generateContent"))
        }
    }
}

/// Forward a proxy request to its provider and return the upstream body.
pub async fn relay(
    client: &reqwest::Client,
    providers: &ProviderConfig,
    request: ProxyRequest,
) -> Result<Value, ApiError> {
    let provider = Provider::parse(&request.provider).ok_or_else(|| {
        ApiError::BadRequest(format!("unknown provider: {}", request.provider))
    })?;

    let key = providers.key_for(provider).ok_or_else(|| {
        ApiError::BadRequest(format!("no API key configured for {}", provider.name()))
    })?;

    let mut body = request.body;
    let url = upstream_url(provider, providers, &mut body)?;

    let builder = match provider {
        Provider::Anthropic => client
            .post(&url)
            .header("x-api-key", key)
            .header("anthropic-version", ANTHROPIC_VERSION),
        Provider::OpenAi => client.post(&url).bearer_auth(key),
        Provider::Gemini => client.post(&url).header("x-goog-api-key", key),
    };

    let started = Instant::now();
    let response = builder.json(&body).send().await.map_err(|e| {
        warn!(provider = provider.name(), error = %e, "relay transport failure");
        ApiError::Upstream {
            status: 502,
            body: Value::String(e.to_string()),
        }
    })?;

    let status = response.status();
    let payload: Value = response.json().await.unwrap_or(Value::Null);
    info!(
        provider = provider.name(),
        status = status.as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "relayed request"
    );

    if status.is_success() {
        Ok(payload)
    } else {
        Err(ApiError::Upstream {
            status: status.as_u16(),
            body: payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_parse() {
        assert_eq!(Provider::parse("anthropic"), Some(Provider::Anthropic));
        assert_eq!(Provider::parse("OpenAI"), Some(Provider::OpenAi));
        assert_eq!(Provider::parse("gemini"), Some(Provider::Gemini));
        assert_eq!(Provider::parse("mistral"), None);
    }

    #[test]
    fn test_upstream_urls() {
        let providers = ProviderConfig::default();

        let mut body = json!({});
        let url = upstream_url(Provider::Anthropic, &providers, &mut body).unwrap();
        assert_eq!(url, "https://api.anthropic.com/v1/messages");

        let url = upstream_url(Provider::OpenAi, &providers, &mut body).unwrap();
        assert_eq!(url, "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_gemini_model_moves_to_path() {
        let providers = ProviderConfig::default();
        let mut body = json!({"model": "gemini-pro", "contents": []});

        let url = upstream_url(Provider::Gemini, &providers, &mut body).unwrap();
        assert_eq!(
            url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent"
        );
        // Model is stripped from the forwarded payload
        assert!(body.get("model").is_none());
        assert!(body.get("contents").is_some());
    }

    #[test]
    fn test_gemini_requires_model() {
        let providers = ProviderConfig::default();
        let mut body = json!({"contents": []});
        let err = upstream_url(Provider::Gemini, &providers, &mut body).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
