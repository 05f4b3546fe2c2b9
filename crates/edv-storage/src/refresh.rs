//! OAuth2 token refresh
//!
//! Exchanges the stored refresh token for a new access token. One exchange attempt per
//! call; the caller decides whether to retry anything.

use crate::credentials::CredentialStore;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    /// The token endpoint answered with a non-200 status. `payload` is the response body.
    #[error("Failed to refresh access token (status {status}): {payload}")]
    Rejected { status: u16, payload: String },

    #[error("Failed to reach token endpoint: {0}")]
    Transport(String),

    #[error("Invalid token response: {0}")]
    InvalidResponse(String),
}

/// Refreshes the credential held by a [`CredentialStore`].
#[async_trait]
pub trait CredentialRefresher: Send + Sync {
    /// On success the store holds a new snapshot; on failure it is unchanged.
    async fn refresh(&self) -> Result<(), RefreshError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Token refresher for the `refresh_token` grant.
#[derive(Clone)]
pub struct TokenRefresher {
    client: Client,
    token_url: String,
    store: Arc<CredentialStore>,
}

impl TokenRefresher {
    pub fn new(client: Client, token_url: impl Into<String>, store: Arc<CredentialStore>) -> Self {
        Self {
            client,
            token_url: token_url.into(),
            store,
        }
    }
}

#[async_trait]
impl CredentialRefresher for TokenRefresher {
    #[tracing::instrument(skip(self), fields(token_url = %self.token_url))]
    async fn refresh(&self) -> Result<(), RefreshError> {
        let current = self.store.snapshot();
        let start = std::time::Instant::now();

        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", current.refresh_token.as_str()),
            ("client_id", current.client_id.as_str()),
            ("client_secret", current.client_secret.as_str()),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Token endpoint unreachable");
                RefreshError::Transport(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RefreshError::Transport(e.to_string()))?;

        if status != reqwest::StatusCode::OK {
            let payload = error_payload(&body);
            tracing::warn!(
                status = status.as_u16(),
                payload = %payload,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Token refresh rejected"
            );
            return Err(RefreshError::Rejected {
                status: status.as_u16(),
                payload,
            });
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| RefreshError::InvalidResponse(e.to_string()))?;

        if token.access_token.is_empty() {
            return Err(RefreshError::InvalidResponse(
                "access_token is empty".to_string(),
            ));
        }

        let rotated = token.refresh_token.is_some();
        self.store
            .replace(current.with_tokens(token.access_token, token.refresh_token));

        tracing::info!(
            refresh_token_rotated = rotated,
            expires_in = ?token.expires_in,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Access token refreshed"
        );

        Ok(())
    }
}

/// Compact JSON if the body parses, otherwise the raw text.
fn error_payload(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value.to_string(),
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edv_core::Credentials;
    use mockito::Matcher;

    fn store() -> Arc<CredentialStore> {
        Arc::new(CredentialStore::new(Credentials {
            access_token: "expired-access".to_string(),
            refresh_token: "refresh-1".to_string(),
            client_id: "app-key".to_string(),
            client_secret: "app-secret".to_string(),
        }))
    }

    fn refresher(server: &mockito::Server, store: Arc<CredentialStore>) -> TokenRefresher {
        TokenRefresher::new(
            Client::new(),
            format!("{}/oauth2/token", server.url()),
            store,
        )
    }

    #[tokio::test]
    async fn test_refresh_success_replaces_tokens() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth2/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
                Matcher::UrlEncoded("refresh_token".into(), "refresh-1".into()),
                Matcher::UrlEncoded("client_id".into(), "app-key".into()),
                Matcher::UrlEncoded("client_secret".into(), "app-secret".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"fresh-access","refresh_token":"refresh-2","expires_in":14400}"#)
            .expect(1)
            .create_async()
            .await;

        let store = store();
        refresher(&server, store.clone()).refresh().await.unwrap();

        mock.assert_async().await;
        let current = store.snapshot();
        assert_eq!(current.access_token, "fresh-access");
        assert_eq!(current.refresh_token, "refresh-2");
        assert_eq!(current.client_id, "app-key");
    }

    #[tokio::test]
    async fn test_refresh_without_rotated_refresh_token() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth2/token")
            .with_status(200)
            .with_body(r#"{"access_token":"fresh-access","token_type":"bearer","expires_in":14400}"#)
            .create_async()
            .await;

        let store = store();
        refresher(&server, store.clone()).refresh().await.unwrap();

        assert_eq!(store.snapshot().access_token, "fresh-access");
        assert_eq!(store.snapshot().refresh_token, "refresh-1");
    }

    #[tokio::test]
    async fn test_refresh_rejected_keeps_store_and_reports_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth2/token")
            .with_status(400)
            .with_body(r#"{"error": "invalid_grant", "error_description": "refresh token is malformed"}"#)
            .expect(1)
            .create_async()
            .await;

        let store = store();
        let err = refresher(&server, store.clone()).refresh().await.unwrap_err();

        mock.assert_async().await;
        match err {
            RefreshError::Rejected { status, payload } => {
                assert_eq!(status, 400);
                assert!(payload.contains("invalid_grant"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.snapshot().access_token, "expired-access");
        assert_eq!(store.snapshot().refresh_token, "refresh-1");
    }

    #[tokio::test]
    async fn test_refresh_non_200_success_status_is_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth2/token")
            .with_status(202)
            .with_body("accepted")
            .create_async()
            .await;

        let err = refresher(&server, store()).refresh().await.unwrap_err();
        assert_eq!(
            err,
            RefreshError::Rejected {
                status: 202,
                payload: "accepted".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_refresh_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth2/token")
            .with_status(200)
            .with_body(r#"{"token_type":"bearer"}"#)
            .create_async()
            .await;

        let store = store();
        let err = refresher(&server, store.clone()).refresh().await.unwrap_err();
        assert!(matches!(err, RefreshError::InvalidResponse(_)));
        assert_eq!(store.snapshot().access_token, "expired-access");
    }

    #[tokio::test]
    async fn test_refresh_unreachable_endpoint() {
        let refresher = TokenRefresher::new(
            Client::new(),
            "http://127.0.0.1:1/oauth2/token",
            store(),
        );
        let err = refresher.refresh().await.unwrap_err();
        assert!(matches!(err, RefreshError::Transport(_)));
    }

    #[test]
    fn test_error_payload_shapes() {
        assert_eq!(error_payload(r#"{ "error": "x" }"#), r#"{"error":"x"}"#);
        assert_eq!(error_payload("  plain text "), "plain text");
        assert_eq!(error_payload(""), "empty response body");
    }
}
