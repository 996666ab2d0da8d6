//! Proxy relay tests against a mock upstream

mod common;

use common::spawn_server_with_config;
use httpmock::prelude::*;
use releye_server::ServerConfig;
use serde_json::{json, Value};

fn config_with_upstream(upstream: &str) -> ServerConfig {
    let mut config = ServerConfig::new("unused.db");
    config.providers.anthropic_key = Some("test-anthropic-key".to_string());
    config.providers.gemini_key = Some("test-gemini-key".to_string());
    // OpenAI deliberately left keyless
    config.providers.anthropic_base = upstream.to_string();
    config.providers.gemini_base = upstream.to_string();
    config.providers.openai_base = upstream.to_string();
    config
}

#[tokio::test]
async fn test_relay_forwards_to_anthropic() {
    let upstream = MockServer::start();
    let mock = upstream.mock(|when, then| {
        when.method(POST)
            .path("/v1/messages")
            .header("x-api-key", "test-anthropic-key")
            .header("anthropic-version", "2023-06-01")
            .json_body_partial(r#"{"model": "claude-3-5-sonnet"}"#);
        then.status(200)
            .json_body(json!({"id": "msg_1", "content": [{"type": "text", "text": "hi"}]}));
    });

    let base = spawn_server_with_config(config_with_upstream(&upstream.base_url())).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/api/proxy"))
        .json(&json!({
            "provider": "anthropic",
            "body": {
                "model": "claude-3-5-sonnet",
                "max_tokens": 64,
                "messages": [{"role": "user", "content": "hello"}],
            }
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["id"], "msg_1");
    mock.assert();
}

#[tokio::test]
async fn test_relay_gemini_model_in_path() {
    let upstream = MockServer::start();
    let mock = upstream.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-pro:generateContent")
            .header("x-goog-api-key", "test-gemini-key");
        then.status(200).json_body(json!({"candidates": []}));
    });

    let base = spawn_server_with_config(config_with_upstream(&upstream.base_url())).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/api/proxy"))
        .json(&json!({
            "provider": "gemini",
            "body": {"model": "gemini-pro", "contents": []}
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    mock.assert();
}

#[tokio::test]
async fn test_relay_gemini_without_model_rejected() {
    let upstream = MockServer::start();
    let base = spawn_server_with_config(config_with_upstream(&upstream.base_url())).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/api/proxy"))
        .json(&json!({"provider": "gemini", "body": {"contents": []}}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_relay_passes_upstream_error_through() {
    let upstream = MockServer::start();
    upstream.mock(|when, then| {
        when.method(POST).path("/v1/messages");
        then.status(429)
            .json_body(json!({"error": {"type": "rate_limit_error"}}));
    });

    let base = spawn_server_with_config(config_with_upstream(&upstream.base_url())).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/api/proxy"))
        .json(&json!({"provider": "anthropic", "body": {"model": "m", "messages": []}}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 429);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["upstream"]["error"]["type"], "rate_limit_error");
}

#[tokio::test]
async fn test_relay_unknown_provider_rejected() {
    let upstream = MockServer::start();
    let base = spawn_server_with_config(config_with_upstream(&upstream.base_url())).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/api/proxy"))
        .json(&json!({"provider": "mistral", "body": {}}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_relay_missing_key_rejected() {
    let upstream = MockServer::start();
    let base = spawn_server_with_config(config_with_upstream(&upstream.base_url())).await;
    let client = reqwest::Client::new();

    // No OpenAI key configured
    let response = client
        .post(format!("{base}/api/proxy"))
        .json(&json!({"provider": "openai", "body": {"model": "gpt-4o", "messages": []}}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("no API key"));
}
