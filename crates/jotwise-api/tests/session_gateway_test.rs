//! Hosted session gateway against a mock auth service.

use jotwise_api::HostedSessionGateway;
use jotwise_core::{Error, SessionGateway};
use uuid::Uuid;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_resolves_user_with_apikey_and_bearer() {
    let mock_server = MockServer::start().await;
    let user_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("apikey", "anon-key"))
        .and(header("authorization", "Bearer session-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": user_id,
            "email": "alice@example.com",
            "aud": "authenticated",
            "role": "authenticated"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = HostedSessionGateway::new(format!("{}/", mock_server.uri()), "anon-key").unwrap();
    let user = gateway.resolve("session-token").await.unwrap();

    assert_eq!(user.id, user_id);
    assert_eq!(user.email.as_deref(), Some("alice@example.com"));
}

#[tokio::test]
async fn test_rejected_token_is_unauthorized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "msg": "invalid JWT"
        })))
        .mount(&mock_server)
        .await;

    let gateway = HostedSessionGateway::new(mock_server.uri(), "anon-key").unwrap();
    let err = gateway.resolve("expired").await.unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));
}

#[tokio::test]
async fn test_auth_service_outage_is_request_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let gateway = HostedSessionGateway::new(mock_server.uri(), "anon-key").unwrap();
    let err = gateway.resolve("token").await.unwrap_err();
    assert!(matches!(err, Error::Request(_)));
}
