//! Integration tests for the refresh-token exchange

use super::*;
use integrations_drive_deploy::errors::{AuthenticationError, DriveError, ResponseError};
use integrations_drive_deploy::OAuthCredentials;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn credentials() -> OAuthCredentials {
    OAuthCredentials::new_with_strings("client-id", "client-secret", "refresh-token")
}

#[tokio::test]
async fn test_exchange_success() {
    let server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "client_id": "client-id",
            "client_secret": "client-secret",
            "refresh_token": "refresh-token",
            "grant_type": "refresh_token"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.abc",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let token = client
        .token_exchanger(credentials())
        .exchange()
        .await
        .expect("exchange should succeed");

    assert_eq!(token.secret(), "ya29.abc");
    assert_eq!(token.token_type, "Bearer");
    assert_eq!(token.expires_in, Some(3599));
    assert!(!token.is_expired());
}

#[tokio::test]
async fn test_exchange_empty_token_is_error() {
    let server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "",
            "expires_in": 3599
        })))
        .mount(&server)
        .await;

    let err = mock_client(&server)
        .token_exchanger(credentials())
        .exchange()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DriveError::Response(ResponseError::MissingField { ref field, .. }) if field == "access_token"
    ));
}

#[tokio::test]
async fn test_exchange_rejected_grant() {
    let server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Token has been expired or revoked."
        })))
        .mount(&server)
        .await;

    let err = mock_client(&server)
        .token_exchanger(credentials())
        .exchange()
        .await
        .unwrap_err();

    match err {
        DriveError::Authentication(AuthenticationError::RefreshFailed { status, message }) => {
            assert_eq!(status.as_u16(), 400);
            assert_eq!(message, "Token has been expired or revoked.");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_exchange_invalid_json() {
    let server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = mock_client(&server)
        .token_exchanger(credentials())
        .exchange()
        .await
        .unwrap_err();

    assert!(err.to_string().contains("failed to decode token response"));
}
