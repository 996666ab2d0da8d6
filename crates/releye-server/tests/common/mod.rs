//! Shared helpers for API integration tests

use releye_server::{app, AppState, ServerConfig};
use serde_json::Value;

/// Fast hashing for tests; the default cost is for production
pub const TEST_PASSWORD_ROUNDS: u32 = 1_000;

/// Spawn the API over an in-memory database on an ephemeral port.
///
/// Returns the base URL, e.g. `http://127.0.0.1:49152`.
pub async fn spawn_server() -> String {
    spawn_server_with_config(ServerConfig::new("unused.db")).await
}

/// Spawn with a customized config (provider endpoints, etc.).
pub async fn spawn_server_with_config(mut config: ServerConfig) -> String {
    config.password_rounds = TEST_PASSWORD_ROUNDS;
    let state = AppState::in_memory(config).expect("in-memory state");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, app(state)).await.expect("serve");
    });

    format!("http://{addr}")
}

/// POST a user and return the created record from the envelope.
pub async fn create_user(client: &reqwest::Client, base: &str, email: &str) -> Value {
    let response = client
        .post(format!("{base}/api/users"))
        .json(&serde_json::json!({
            "email": email,
            "password": "correct horse",
            "display_name": "Test User",
        }))
        .send()
        .await
        .expect("create user request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("create user body");
    assert_eq!(body["success"], true);
    body["data"].clone()
}
