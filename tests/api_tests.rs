//! API integration tests
//!
//! These run against a live server on localhost with a seeded
//! `admin@bookwise.example` / `admin` administrator account.
//! Run with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:4000";

/// Helper to get an authenticated admin token
async fn get_admin_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({
            "email": "admin@bookwise.example",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

fn unique_suffix() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos()
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_register_and_login() {
    let client = Client::new();
    let suffix = unique_suffix();
    let email = format!("reader{}@bookwise.example", suffix);

    let response = client
        .post(format!("{}/register", BASE_URL))
        .json(&json!({
            "username": format!("reader{}", suffix),
            "email": email,
            "password": "bookworm"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({
            "email": email,
            "password": "bookworm"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["role"], "user");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({
            "email": "admin@bookwise.example",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_list_reviews_is_public() {
    let client = Client::new();

    let response = client
        .get(format!("{}/reviews", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body.is_array());
}

#[tokio::test]
#[ignore]
async fn test_borrow_requires_auth() {
    let client = Client::new();

    let response = client
        .get(format!("{}/borrow", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_borrow_lifecycle() {
    let client = Client::new();
    let token = get_admin_token(&client).await;

    // Create record
    let response = client
        .post(format!("{}/borrow", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "username": "alice",
            "book": "Dune",
            "borrowDate": "2024-01-01",
            "returnDate": "2024-01-22"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let record_id = body["id"].as_i64().expect("No record ID");
    assert_eq!(body["returnDate"], "2024-01-22");

    // Listing is sorted by return date and includes the new record
    let response = client
        .get(format!("{}/borrow", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let records: Vec<Value> = response.json().await.expect("Failed to parse response");
    assert!(records.iter().any(|r| r["id"].as_i64() == Some(record_id)));

    // Delete record
    let response = client
        .delete(format!("{}/borrow/{}", BASE_URL, record_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);

    // Deleting again reports not found
    let response = client
        .delete(format!("{}/borrow/{}", BASE_URL, record_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_create_borrow_missing_book() {
    let client = Client::new();
    let token = get_admin_token(&client).await;

    let response = client
        .post(format!("{}/borrow", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "username": "alice",
            "borrowDate": "2024-01-01",
            "returnDate": "2024-01-22"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_create_borrow_rejects_non_canonical_date() {
    let client = Client::new();
    let token = get_admin_token(&client).await;

    let response = client
        .post(format!("{}/borrow", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "username": "alice",
            "book": "Dune",
            "borrowDate": "2024-01-01",
            "returnDate": "2024-1-22"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}
