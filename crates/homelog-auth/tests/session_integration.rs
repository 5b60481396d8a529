//! Integration tests for NestSession using wiremock.
//!
//! These tests drive the full token lifecycle against a mock token endpoint
//! and check what ends up in the credential file.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use chrono::{Duration, Utc};
use homelog_auth::{AuthError, CredentialState, CredentialStore, Credentials, NestOAuth, NestSession};
use reqwest::header::AUTHORIZATION;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create a configured credential record
fn configured() -> Credentials {
    Credentials {
        project_id: "project-1".to_string(),
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        redirect_uri: "https://www.google.com".to_string(),
        authorization_code: "4/0Abc".to_string(),
        refresh_token: None,
        access_token: None,
        access_token_expiration: None,
    }
}

fn authorized(token: &str, expires_in_secs: i64) -> Credentials {
    Credentials {
        refresh_token: Some("1//refresh".to_string()),
        access_token: Some(format!("Bearer {}", token)),
        access_token_expiration: Some(Utc::now() + Duration::seconds(expires_in_secs)),
        ..configured()
    }
}

fn oauth(server: &MockServer) -> NestOAuth {
    NestOAuth::with_client(
        reqwest::Client::new(),
        &format!("{}/token", server.uri()),
        "https://nestservices.google.com/partnerconnections",
    )
}

async fn mount_refresh(server: &MockServer, access_token: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": access_token,
            "token_type": "Bearer",
            "expires_in": 3599
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_open_exchanges_code_on_first_use() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "ya29.first",
            "token_type": "Bearer",
            "expires_in": 3599,
            "refresh_token": "1//refresh"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join("creds.json"));
    store.save(&configured()).unwrap();

    let session = NestSession::open(oauth(&server), store.clone()).await.unwrap();
    let creds = session.credentials().await;
    assert_eq!(creds.access_token.as_deref(), Some("Bearer ya29.first"));
    assert_eq!(creds.state_at(Utc::now()), CredentialState::Authorized);

    // Persisted after the exchange
    let stored = store.load().unwrap();
    assert_eq!(stored.refresh_token.as_deref(), Some("1//refresh"));
    assert_eq!(stored.access_token.as_deref(), Some("Bearer ya29.first"));
}

#[tokio::test]
async fn test_open_without_file_is_config_missing() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join("missing.json"));

    let result = NestSession::open(oauth(&server), store).await;
    assert!(matches!(result, Err(AuthError::ConfigMissing(_))));
}

#[tokio::test]
async fn test_open_refreshes_expired_token() {
    let server = MockServer::start().await;
    mount_refresh(&server, "ya29.fresh", 1).await;

    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join("creds.json"));
    store.save(&authorized("stale", -60)).unwrap();

    let session = NestSession::open(oauth(&server), store).await.unwrap();
    let creds = session.credentials().await;
    assert_eq!(creds.access_token.as_deref(), Some("Bearer ya29.fresh"));
    assert_eq!(creds.refresh_token.as_deref(), Some("1//refresh"));
}

#[tokio::test]
async fn test_refresh_twice_is_idempotent() {
    let server = MockServer::start().await;
    mount_refresh(&server, "ya29.fresh", 2).await;

    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join("creds.json"));
    let session = NestSession::new(oauth(&server), store.clone(), authorized("valid", 3000));

    let first = session.refresh().await.unwrap();
    let second = session.refresh().await.unwrap();
    assert!(second >= first);

    let stored = store.load().unwrap();
    assert_eq!(stored.access_token_expiration, Some(second));
    assert_eq!(stored.refresh_token.as_deref(), Some("1//refresh"));
}

#[tokio::test]
async fn test_auth_headers_uses_valid_token_without_refresh() {
    let server = MockServer::start().await;
    mount_refresh(&server, "unused", 0).await;

    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join("creds.json"));
    let session = NestSession::new(oauth(&server), store, authorized("valid", 3600));

    let headers = session.auth_headers().await.unwrap();
    assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer valid");
    assert_eq!(headers.get("content-type").unwrap(), "application/json");
}

#[tokio::test]
async fn test_auth_headers_refreshes_token_near_expiry() {
    let server = MockServer::start().await;
    mount_refresh(&server, "ya29.fresh", 1).await;

    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join("creds.json"));
    // Inside the refresh buffer but not yet expired
    let session = NestSession::new(oauth(&server), store, authorized("old", 60));

    let headers = session.auth_headers().await.unwrap();
    assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer ya29.fresh");

    // Second call reuses the refreshed token
    let headers = session.auth_headers().await.unwrap();
    assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer ya29.fresh");
}

#[tokio::test]
async fn test_failed_refresh_keeps_stored_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join("creds.json"));
    let original = authorized("old", -10);
    store.save(&original).unwrap();

    let session = NestSession::new(oauth(&server), store.clone(), original.clone());
    assert!(matches!(session.refresh().await, Err(AuthError::OAuthFailed(_))));
    assert_eq!(store.load().unwrap(), original);
}

#[tokio::test]
async fn test_refresh_keeps_stored_refresh_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "ya29.new",
            "token_type": "Bearer",
            "expires_in": 3599,
            "refresh_token": "1//rotated"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join("creds.json"));
    let stored = authorized("old", -10);
    store.save(&stored).unwrap();

    let session = NestSession::new(oauth(&server), store.clone(), stored);
    session.refresh().await.unwrap();

    let saved = store.load().unwrap();
    assert_eq!(saved.access_token.as_deref(), Some("Bearer ya29.new"));
    assert_eq!(saved.refresh_token.as_deref(), Some("1//refresh"));
}

#[tokio::test]
async fn test_refresh_rejects_out_of_range_expiry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "ya29.new",
            "token_type": "Bearer",
            "expires_in": u64::MAX
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join("creds.json"));
    let stored = authorized("old", -10);
    store.save(&stored).unwrap();

    let session = NestSession::new(oauth(&server), store.clone(), stored.clone());
    assert!(matches!(session.refresh().await, Err(AuthError::OAuthFailed(_))));
    assert_eq!(store.load().unwrap(), stored);
}
