//! Integration tests for the Cognito session provider using wiremock

use archiver_client::token_cache::{self, CachedTokens};
use archiver_client::{ApiConfig, ArchiverClient, CognitoConfig, CognitoSessionProvider};
use archiver_core::{ArchiveApi, Error, SessionProvider};
use chrono::{Duration, Utc};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
};

const TARGET: &str = "AWSCognitoIdentityProviderService.InitiateAuth";

fn config_for(server: &MockServer) -> CognitoConfig {
    CognitoConfig::new("app-client").with_endpoint(format!("{}/", server.uri()))
}

async fn mount_password_auth(server: &MockServer, expires_in: i64) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("x-amz-target", TARGET))
        .and(header("content-type", "application/x-amz-json-1.1"))
        .and(body_partial_json(json!({
            "AuthFlow": "USER_PASSWORD_AUTH",
            "ClientId": "app-client",
            "AuthParameters": {"USERNAME": "alice", "PASSWORD": "hunter2"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "AuthenticationResult": {
                "IdToken": "id-1",
                "AccessToken": "access-1",
                "RefreshToken": "refresh-1",
                "ExpiresIn": expires_in,
                "TokenType": "Bearer"
            }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_sign_in_success() {
    let mock_server = MockServer::start().await;
    mount_password_auth(&mock_server, 3600).await;

    let provider = CognitoSessionProvider::new(config_for(&mock_server)).unwrap();
    let session = provider.sign_in("alice", "hunter2").await.unwrap();

    assert_eq!(session.username, "alice");
    assert_eq!(session.id_token, "id-1");
    assert!(session.expires_at.unwrap() > Utc::now() + Duration::seconds(3500));
    assert_eq!(provider.identity().await.as_deref(), Some("alice"));
    assert_eq!(provider.session().await.unwrap().unwrap().id_token, "id-1");
}

#[tokio::test]
async fn test_sign_in_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "__type": "NotAuthorizedException",
            "message": "Incorrect username or password."
        })))
        .mount(&mock_server)
        .await;

    let provider = CognitoSessionProvider::new(config_for(&mock_server)).unwrap();
    let err = provider.sign_in("alice", "wrong").await.unwrap_err();

    assert!(matches!(err, Error::Auth(_)));
    assert_eq!(err.to_string(), "Incorrect username or password.");
    assert!(provider.identity().await.is_none());
}

#[tokio::test]
async fn test_challenge_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ChallengeName": "NEW_PASSWORD_REQUIRED",
            "Session": "opaque"
        })))
        .mount(&mock_server)
        .await;

    let provider = CognitoSessionProvider::new(config_for(&mock_server)).unwrap();
    let err = provider.sign_in("alice", "hunter2").await.unwrap_err();
    assert!(err.to_string().contains("NEW_PASSWORD_REQUIRED"));
}

#[tokio::test]
async fn test_expiring_token_is_refreshed_silently() {
    let mock_server = MockServer::start().await;
    // expires inside the 60s skew, so the next session() call refreshes
    mount_password_auth(&mock_server, 30).await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({
            "AuthFlow": "REFRESH_TOKEN_AUTH",
            "AuthParameters": {"REFRESH_TOKEN": "refresh-1"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "AuthenticationResult": {
                "IdToken": "id-2",
                "AccessToken": "access-2",
                "ExpiresIn": 3600,
                "TokenType": "Bearer"
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = CognitoSessionProvider::new(config_for(&mock_server)).unwrap();
    provider.sign_in("alice", "hunter2").await.unwrap();

    let session = provider.session().await.unwrap().unwrap();
    assert_eq!(session.id_token, "id-2");
    assert_eq!(session.username, "alice");

    // fresh token now, no second refresh
    let again = provider.session().await.unwrap().unwrap();
    assert_eq!(again.id_token, "id-2");
}

#[tokio::test]
async fn test_explicit_refresh_rotates_fresh_token() {
    let mock_server = MockServer::start().await;
    mount_password_auth(&mock_server, 3600).await;
    let dir = TempDir::new().unwrap();
    let cache = dir.path().join("session.json");

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({
            "AuthFlow": "REFRESH_TOKEN_AUTH",
            "AuthParameters": {"REFRESH_TOKEN": "refresh-1"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "AuthenticationResult": {
                "IdToken": "id-2",
                "AccessToken": "access-2",
                "ExpiresIn": 3600,
                "TokenType": "Bearer"
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider =
        CognitoSessionProvider::new(config_for(&mock_server).with_token_cache(&cache)).unwrap();
    provider.sign_in("alice", "hunter2").await.unwrap();

    // the token is nowhere near expiry, so only an explicit refresh rotates it
    assert_eq!(provider.session().await.unwrap().unwrap().id_token, "id-1");
    let refreshed = provider.refresh().await.unwrap().unwrap();
    assert_eq!(refreshed.id_token, "id-2");
    assert_eq!(refreshed.username, "alice");
    assert_eq!(provider.session().await.unwrap().unwrap().id_token, "id-2");

    let cached = token_cache::load(&cache).unwrap().unwrap();
    assert_eq!(cached.id_token, "id-2");
    assert_eq!(cached.refresh_token.as_deref(), Some("refresh-1"));
}

#[tokio::test]
async fn test_refresh_when_signed_out_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    let provider = CognitoSessionProvider::new(config_for(&mock_server)).unwrap();
    assert!(provider.refresh().await.unwrap().is_none());
}

#[tokio::test]
async fn test_rejected_refresh_signs_out() {
    let mock_server = MockServer::start().await;
    mount_password_auth(&mock_server, 0).await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"AuthFlow": "REFRESH_TOKEN_AUTH"})))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "__type": "NotAuthorizedException",
            "message": "Refresh Token has expired"
        })))
        .mount(&mock_server)
        .await;

    let provider = CognitoSessionProvider::new(config_for(&mock_server)).unwrap();
    provider.sign_in("alice", "hunter2").await.unwrap();

    assert!(provider.session().await.unwrap().is_none());
    assert!(provider.identity().await.is_none());
}

#[tokio::test]
async fn test_token_cache_round_trip_and_sign_out() {
    let mock_server = MockServer::start().await;
    mount_password_auth(&mock_server, 3600).await;
    let dir = TempDir::new().unwrap();
    let cache = dir.path().join("session.json");

    let provider =
        CognitoSessionProvider::new(config_for(&mock_server).with_token_cache(&cache)).unwrap();
    provider.sign_in("alice", "hunter2").await.unwrap();
    assert!(cache.exists());

    // a second process picks the session up from the cache
    let restored =
        CognitoSessionProvider::new(config_for(&mock_server).with_token_cache(&cache)).unwrap();
    assert_eq!(restored.identity().await.as_deref(), Some("alice"));
    assert_eq!(restored.session().await.unwrap().unwrap().id_token, "id-1");

    restored.sign_out().await.unwrap();
    assert!(!cache.exists());
    assert!(restored.session().await.unwrap().is_none());
}

#[tokio::test]
async fn test_api_client_uses_refreshed_token() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let cache = dir.path().join("session.json");

    token_cache::store(
        &cache,
        &CachedTokens {
            username: "alice".to_string(),
            id_token: "stale".to_string(),
            access_token: "access".to_string(),
            refresh_token: Some("refresh-1".to_string()),
            expires_at: Utc::now() - Duration::minutes(5),
        },
    )
    .unwrap();

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({"AuthFlow": "REFRESH_TOKEN_AUTH"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "AuthenticationResult": {"IdToken": "fresh", "AccessToken": "a", "ExpiresIn": 3600}
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/listurls"))
        .and(header("authorization", "fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let sessions = Arc::new(
        CognitoSessionProvider::new(config_for(&mock_server).with_token_cache(&cache)).unwrap(),
    );
    let client =
        ArchiverClient::new(ApiConfig::new(format!("{}/v1", mock_server.uri())), sessions).unwrap();

    assert!(client.list_urls().await.unwrap().is_empty());
}
