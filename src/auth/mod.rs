//! OAuth2 refresh-token exchange for Google APIs.
//!
//! Every call to [`TokenExchanger::exchange`] posts to the token endpoint; tokens
//! are not cached. Callers that need a token for several Drive calls hold on to
//! the returned [`AccessToken`] themselves.
//!
//! # Example
//!
//! ```no_run
//! use integrations_drive_deploy::auth::OAuthCredentials;
//! use integrations_drive_deploy::DriveDeployClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = DriveDeployClient::from_env()?;
//! let credentials = OAuthCredentials::new_with_strings(
//!     "client_id.apps.googleusercontent.com",
//!     "client_secret",
//!     "refresh_token",
//! );
//!
//! let token = client.token_exchanger(credentials).exchange().await?;
//! # Ok(())
//! # }
//! ```

use crate::errors::{AuthenticationError, ConfigurationError, DriveError, DriveResult};
use crate::transport::{HttpMethod, HttpRequest, HttpTransport, RequestBody};
use chrono::{DateTime, Duration, Utc};
use reqwest::header::{HeaderValue, USER_AGENT};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// Bearer access token.
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// The token string.
    pub token: SecretString,

    /// Token type (usually "Bearer").
    pub token_type: String,

    /// Lifetime in seconds as reported by the token endpoint.
    pub expires_in: Option<i64>,

    /// Expiration time, when known.
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Creates a token as returned by the token endpoint.
    ///
    /// A lifetime too large to represent leaves `expires_at` unset.
    pub fn new(token: impl Into<String>, token_type: impl Into<String>, expires_in: i64) -> Self {
        Self {
            token: SecretString::new(token.into()),
            token_type: token_type.into(),
            expires_in: Some(expires_in),
            expires_at: Duration::try_seconds(expires_in)
                .and_then(|lifetime| Utc::now().checked_add_signed(lifetime)),
        }
    }

    /// Wraps a caller-supplied bearer token of unknown lifetime.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::new(token.into()),
            token_type: "Bearer".to_string(),
            expires_in: None,
            expires_at: None,
        }
    }

    /// Returns true if the token string is empty.
    pub fn is_empty(&self) -> bool {
        self.token.expose_secret().is_empty()
    }

    /// Checks if the token is known to be expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at.map_or(false, |at| Utc::now() >= at)
    }

    /// Exposes the raw token string.
    pub fn secret(&self) -> &str {
        self.token.expose_secret()
    }

    /// Returns the authorization header value.
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.token.expose_secret())
    }
}

/// OAuth2 client credentials plus a long-lived refresh token.
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    /// OAuth2 client ID.
    pub client_id: String,
    /// OAuth2 client secret.
    pub client_secret: SecretString,
    /// Refresh token.
    pub refresh_token: SecretString,
}

impl OAuthCredentials {
    /// Creates credentials.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: SecretString,
        refresh_token: SecretString,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            refresh_token,
        }
    }

    /// Creates credentials from plain strings.
    pub fn new_with_strings(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self::new(
            client_id,
            SecretString::new(client_secret.into()),
            SecretString::new(refresh_token.into()),
        )
    }

    /// Reads `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET` and `GOOGLE_REFRESH_TOKEN`.
    pub fn from_env() -> DriveResult<Self> {
        fn var(name: &str) -> DriveResult<String> {
            std::env::var(name).map_err(|_| {
                DriveError::Configuration(ConfigurationError::MissingCredentials(format!(
                    "{} environment variable not set",
                    name
                )))
            })
        }

        Ok(Self::new_with_strings(
            var("GOOGLE_CLIENT_ID")?,
            var("GOOGLE_CLIENT_SECRET")?,
            var("GOOGLE_REFRESH_TOKEN")?,
        ))
    }
}

/// Exchanges a refresh token for a short-lived access token.
pub struct TokenExchanger {
    credentials: OAuthCredentials,
    token_url: Url,
    transport: Arc<dyn HttpTransport>,
    timeout: Option<std::time::Duration>,
    user_agent: Option<String>,
}

impl TokenExchanger {
    /// Creates a new exchanger posting to `token_url` through `transport`.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        token_url: Url,
        credentials: OAuthCredentials,
    ) -> Self {
        Self {
            credentials,
            token_url,
            transport,
            timeout: None,
            user_agent: None,
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the `User-Agent` sent with the grant.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Returns the token endpoint.
    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    /// Posts the refresh grant and returns the new access token.
    ///
    /// Empty credentials are not checked locally; the endpoint rejects them.
    pub async fn exchange(&self) -> DriveResult<AccessToken> {
        #[derive(Serialize)]
        struct RefreshRequest<'a> {
            client_id: &'a str,
            client_secret: &'a str,
            refresh_token: &'a str,
            grant_type: &'a str,
        }

        #[derive(Deserialize)]
        struct RefreshResponse {
            #[serde(default)]
            access_token: Option<String>,
            #[serde(default)]
            expires_in: Option<i64>,
            #[serde(default)]
            token_type: Option<String>,
        }

        #[derive(Deserialize)]
        struct OAuthErrorResponse {
            error: Option<String>,
            error_description: Option<String>,
        }

        let body = RequestBody::json(&RefreshRequest {
            client_id: &self.credentials.client_id,
            client_secret: self.credentials.client_secret.expose_secret(),
            refresh_token: self.credentials.refresh_token.expose_secret(),
            grant_type: "refresh_token",
        })?;

        let mut request = HttpRequest::new(HttpMethod::Post, self.token_url.clone());
        request.body = Some(body);
        request.timeout = self.timeout;
        if let Some(user_agent) = &self.user_agent {
            let value = HeaderValue::from_str(user_agent)
                .map_err(|e| DriveError::invalid_request(format!("Invalid user agent: {}", e)))?;
            request.headers.insert(USER_AGENT, value);
        }

        debug!(token_url = %self.token_url, "exchanging refresh token");
        let response = self.transport.send(request).await?;

        if !response.status.is_success() {
            let text = response.text();
            let message = serde_json::from_slice::<OAuthErrorResponse>(&response.body)
                .ok()
                .and_then(|e| e.error_description.or(e.error))
                .unwrap_or(text);
            return Err(AuthenticationError::RefreshFailed {
                status: response.status,
                message,
            }
            .into());
        }

        let refresh: RefreshResponse = serde_json::from_slice(&response.body).map_err(|e| {
            DriveError::deserialization(format!("failed to decode token response: {}", e))
        })?;

        let access_token = match refresh.access_token {
            Some(token) if !token.is_empty() => token,
            _ => return Err(DriveError::missing_field("access_token", response.text())),
        };

        let token_type = refresh
            .token_type
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Bearer".to_string());

        let token = match refresh.expires_in {
            Some(expires_in) => AccessToken::new(access_token, token_type, expires_in),
            None => AccessToken {
                token_type,
                ..AccessToken::bearer(access_token)
            },
        };

        info!(expires_in = ?token.expires_in, "obtained access token");
        Ok(token)
    }
}
