//! API integration tests
//!
//! These run against a live server with a clean database:
//! `cargo test -- --ignored`

use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to get an authenticated token
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Helper to create a book, returning its id
async fn create_book(client: &Client, token: &str, title: &str) -> i64 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": title,
            "author": "Test Author",
            "isbn": "9780000000000"
        }))
        .send()
        .await
        .expect("Failed to create book");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    body["id"].as_i64().expect("No book id")
}

/// Helper to register a member, returning its id
async fn create_member(client: &Client, token: &str, last_name: &str) -> i64 {
    let response = client
        .post(format!("{}/members", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "first_name": "Test",
            "last_name": last_name,
            "national_id": "12345678",
            "email": "test@example.com",
            "phone": "555-0100",
            "address": "1 Test St"
        }))
        .send()
        .await
        .expect("Failed to create member");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    body["id"].as_i64().expect("No member id")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
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
async fn test_readiness_check_reaches_database() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_get_current_admin() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["username"], "admin");
}

#[tokio::test]
#[ignore]
async fn test_list_books_requires_auth() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_book_crud() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, "Ficciones").await;

    // New books start available
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "available");

    // Update keeps the status untouched
    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "Ficciones (2nd ed.)",
            "author": "Jorge Luis Borges",
            "isbn": "9780000000000"
        }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["title"], "Ficciones (2nd ed.)");
    assert_eq!(body["status"], "available");

    // Delete
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_member_registration_assigns_membership_number() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .post(format!("{}/members", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "first_name": "Ana",
            "last_name": "García",
            "national_id": "30123456",
            "email": "ana@example.com",
            "phone": "555-0101",
            "address": "2 Test St"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    let number = body["membership_number"].as_str().unwrap();
    assert_eq!(number.len(), 8);
    assert!(number
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
}

#[tokio::test]
#[ignore]
async fn test_check_out_and_check_in_round_trip() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, "Round Trip").await;
    let member_id = create_member(&client, &token, "RoundTrip").await;
    let due_date = Utc::now() + Duration::days(7);

    // Check out
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "member_id": member_id,
            "book_id": book_id,
            "due_date": due_date
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let loan: Value = response.json().await.unwrap();
    let loan_id = loan["id"].as_i64().unwrap();

    // Book is now loaned; a second check-out must be rejected
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "member_id": member_id,
            "book_id": book_id,
            "due_date": due_date
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);

    // Check in: book back to available, no fine for an on-time return
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "returned");
    assert!(body["fine"].is_null());

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "available");

    // Closing an already closed loan is rejected
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);
}

#[tokio::test]
#[ignore]
async fn test_check_out_rejects_past_due_date() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, "Past Due").await;
    let member_id = create_member(&client, &token, "PastDue").await;

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "member_id": member_id,
            "book_id": book_id,
            "due_date": Utc::now() - Duration::days(1)
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_check_out_for_deleted_member_is_not_found() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, "Orphaned").await;
    let member_id = create_member(&client, &token, "Departed").await;

    let response = client
        .delete(format!("{}/members/{}", BASE_URL, member_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    // A check-out against the stale member id must come back as not
    // found, never a bare database error
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "member_id": member_id,
            "book_id": book_id,
            "due_date": Utc::now() + Duration::days(7)
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    // The losing check-out must not leave the book stuck in loaned
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "available");
}

#[tokio::test]
#[ignore]
async fn test_concurrent_check_out_has_exactly_one_winner() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, "Contended").await;
    let member_a = create_member(&client, &token, "RacerA").await;
    let member_b = create_member(&client, &token, "RacerB").await;
    let due_date = Utc::now() + Duration::days(7);

    let request = |member_id: i64| {
        let client = client.clone();
        let token = token.clone();
        async move {
            client
                .post(format!("{}/loans", BASE_URL))
                .header("Authorization", format!("Bearer {}", token))
                .json(&json!({
                    "member_id": member_id,
                    "book_id": book_id,
                    "due_date": due_date
                }))
                .send()
                .await
                .unwrap()
                .status()
        }
    };

    let (status_a, status_b) = tokio::join!(request(member_a), request(member_b));

    let successes = [status_a, status_b]
        .iter()
        .filter(|s| s.as_u16() == 201)
        .count();
    assert_eq!(successes, 1, "exactly one check-out must win");

    let loser = if status_a.as_u16() == 201 { status_b } else { status_a };
    assert!(
        loser.as_u16() == 422 || loser.as_u16() == 409,
        "loser must see an invalid-state or conflict outcome, got {}",
        loser
    );
}

#[tokio::test]
#[ignore]
async fn test_dashboard_counters() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/dashboard", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert!(body["loaned_books"].is_number());
    assert!(body["overdue_loans"].is_number());
    assert!(body["total_members"].is_number());
    assert!(body["total_books"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_delete_book_with_open_loan_is_rejected() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let book_id = create_book(&client, &token, "Undeletable").await;
    let member_id = create_member(&client, &token, "Keeper").await;

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "member_id": member_id,
            "book_id": book_id,
            "due_date": Utc::now() + Duration::days(7)
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);
}
