//! Login endpoint tests

mod common;

use common::{create_user, spawn_server};
use serde_json::{json, Value};

#[tokio::test]
async fn test_login_success_updates_login_count() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    create_user(&client, &base, "ada@example.com").await;

    let response = client
        .post(format!("{base}/api/auth/login"))
        .json(&json!({"email": "ada@example.com", "password": "correct horse"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["login_count"], 1);
    assert!(body["data"]["last_login_at"].is_i64());

    // A second login bumps the counter again
    let response = client
        .post(format!("{base}/api/auth/login"))
        .json(&json!({"email": "ada@example.com", "password": "correct horse"}))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["login_count"], 2);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    create_user(&client, &base, "ada@example.com").await;

    let response = client
        .post(format!("{base}/api/auth/login"))
        .json(&json!({"email": "ada@example.com", "password": "wrong horse"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_login_unknown_email_same_error() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    create_user(&client, &base, "ada@example.com").await;

    let wrong_password = client
        .post(format!("{base}/api/auth/login"))
        .json(&json!({"email": "ada@example.com", "password": "wrong horse"}))
        .send()
        .await
        .unwrap();
    let unknown_email = client
        .post(format!("{base}/api/auth/login"))
        .json(&json!({"email": "nobody@example.com", "password": "wrong horse"}))
        .send()
        .await
        .unwrap();

    // Same status and message either way - no account enumeration
    assert_eq!(wrong_password.status(), 401);
    assert_eq!(unknown_email.status(), 401);
    let a: Value = wrong_password.json().await.unwrap();
    let b: Value = unknown_email.json().await.unwrap();
    assert_eq!(a["error"], b["error"]);
}

#[tokio::test]
async fn test_login_deactivated_account() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let user = create_user(&client, &base, "ada@example.com").await;
    let id = user["id"].as_str().unwrap();

    client
        .put(format!("{base}/api/users/{id}"))
        .json(&json!({"is_active": false}))
        .send()
        .await
        .unwrap();

    let response = client
        .post(format!("{base}/api/auth/login"))
        .json(&json!({"email": "ada@example.com", "password": "correct horse"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_login_missing_fields() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base}/api/auth/login"))
        .json(&json!({"email": "", "password": ""}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_activity_log_records_logins() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    create_user(&client, &base, "ada@example.com").await;
    client
        .post(format!("{base}/api/auth/login"))
        .json(&json!({"email": "ada@example.com", "password": "correct horse"}))
        .send()
        .await
        .unwrap();

    let response = client
        .get(format!("{base}/api/activity?limit=10"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    let entries = body["data"].as_array().unwrap();

    // Newest first: login, then user_created
    assert_eq!(entries[0]["action"], "login");
    assert_eq!(entries[1]["action"], "user_created");
}
