// SPDX-License-Identifier: MIT

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running
//! (FIRESTORE_EMULATOR_HOST set). The emulator provides a clean state
//! for each test run.

use calendar_bridge::models::{PendingAuthState, TokenBundle, User};

mod common;
use common::test_db;

/// Generate a unique email for test isolation.
fn unique_email() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("user{}@example.com", nanos)
}

/// Helper to create a basic test user.
fn test_user(email: &str) -> User {
    User {
        email: email.to_string(),
        name: "Test User".to_string(),
        google_email: Some("test.google@gmail.com".to_string()),
        tokens: Some(TokenBundle {
            access_token: "ya29.test-access".to_string(),
            refresh_token: Some("1//test-refresh".to_string()),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
            expires_at: "2024-01-15T10:00:00Z".to_string(),
        }),
        authenticated_at: Some("2024-01-15T09:00:00Z".to_string()),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// USER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_user_upsert_and_fetch() {
    require_emulator!();

    let db = test_db().await;
    let email = unique_email();

    let before = db.get_user(&email).await.unwrap();
    assert!(before.is_none(), "User should not exist before creation");

    db.upsert_user(&test_user(&email)).await.unwrap();

    let fetched = db.get_user(&email).await.unwrap().expect("user stored");
    assert_eq!(fetched.email, email);
    assert_eq!(fetched.name, "Test User");
    let tokens = fetched.tokens.expect("token bundle stored");
    assert_eq!(tokens.access_token, "ya29.test-access");
    assert_eq!(tokens.refresh_token.as_deref(), Some("1//test-refresh"));
}

#[tokio::test]
async fn test_user_upsert_overwrites_access_token_only() {
    require_emulator!();

    let db = test_db().await;
    let email = unique_email();
    db.upsert_user(&test_user(&email)).await.unwrap();

    // Mirror the silent-refresh write: only access token and expiry change
    let mut user = db.get_user(&email).await.unwrap().unwrap();
    if let Some(bundle) = user.tokens.as_mut() {
        bundle.access_token = "ya29.refreshed".to_string();
        bundle.expires_at = "2024-01-15T11:00:00Z".to_string();
    }
    db.upsert_user(&user).await.unwrap();

    let fetched = db.get_user(&email).await.unwrap().unwrap();
    let tokens = fetched.tokens.unwrap();
    assert_eq!(tokens.access_token, "ya29.refreshed");
    assert_eq!(tokens.expires_at, "2024-01-15T11:00:00Z");
    // Refresh token and the rest of the record untouched
    assert_eq!(tokens.refresh_token.as_deref(), Some("1//test-refresh"));
    assert_eq!(fetched.google_email.as_deref(), Some("test.google@gmail.com"));
    assert_eq!(fetched.authenticated_at.as_deref(), Some("2024-01-15T09:00:00Z"));
}

// ═══════════════════════════════════════════════════════════════════════════
// PENDING AUTH STATE TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_auth_state_lifecycle() {
    require_emulator!();

    let db = test_db().await;
    let email = unique_email();

    let pending = PendingAuthState {
        state: format!("state-{}", email),
        email: email.clone(),
        name: "A".to_string(),
        created_at: chrono::Utc::now().to_rfc3339(),
    };
    db.insert_auth_state(&pending).await.unwrap();

    let fetched = db
        .get_auth_state(&pending.state)
        .await
        .unwrap()
        .expect("state stored");
    assert_eq!(fetched.email, email);
    assert_eq!(fetched.name, "A");

    // Consumed states are gone
    db.delete_auth_state(&pending.state).await.unwrap();
    let after = db.get_auth_state(&pending.state).await.unwrap();
    assert!(after.is_none(), "Consumed state should not be retrievable");
}

#[tokio::test]
async fn test_unknown_auth_state_not_found() {
    require_emulator!();

    let db = test_db().await;
    let result = db.get_auth_state("bogus-state-that-was-never-issued").await;
    assert!(result.unwrap().is_none());
}
