//! Request executor: URL building, bearer auth, status and decode handling.

use crate::auth::AccessToken;
use crate::config::DriveConfig;
use crate::errors::{DriveError, DriveResult};
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, RequestBody};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Characters escaped in a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Executes authenticated Drive requests through the injected transport.
///
/// Every request carries `Authorization: Bearer <token>` and the configured
/// user agent. The executor never retries.
pub struct RequestExecutor {
    config: DriveConfig,
    transport: Arc<dyn HttpTransport>,
}

impl RequestExecutor {
    /// Creates a new request executor.
    pub fn new(config: DriveConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    /// Gets the configuration.
    pub fn config(&self) -> &DriveConfig {
        &self.config
    }

    /// Gets the transport.
    pub fn transport(&self) -> &Arc<dyn HttpTransport> {
        &self.transport
    }

    /// Builds a full URL from a path relative to the metadata base URL.
    pub fn build_url(&self, path: &str) -> DriveResult<Url> {
        self.config
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| DriveError::invalid_request(format!("Invalid URL: {}", e)))
    }

    /// Builds a full URL from a path relative to the upload base URL.
    pub fn build_upload_url(&self, path: &str) -> DriveResult<Url> {
        self.config
            .upload_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| DriveError::invalid_request(format!("Invalid upload URL: {}", e)))
    }

    /// URL of a single file resource.
    pub fn file_url(&self, file_id: &str) -> DriveResult<Url> {
        self.build_url(&format!(
            "files/{}",
            utf8_percent_encode(file_id, PATH_SEGMENT)
        ))
    }

    /// Creates a request carrying the bearer token and user agent.
    pub fn authorized(
        &self,
        method: HttpMethod,
        url: Url,
        token: &AccessToken,
    ) -> DriveResult<HttpRequest> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&token.authorization_header())
            .map_err(|e| DriveError::invalid_request(format!("Invalid auth header: {}", e)))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.config.user_agent)
                .map_err(|e| DriveError::invalid_request(format!("Invalid user agent: {}", e)))?,
        );

        Ok(HttpRequest {
            method,
            url,
            headers,
            body: None,
            timeout: Some(self.config.timeout),
        })
    }

    /// Sends a request and returns the response whatever its status.
    pub async fn send(&self, request: HttpRequest) -> DriveResult<HttpResponse> {
        debug!(method = ?request.method, url = %request.url, "sending request");
        let response = self.transport.send(request).await?;
        debug!(status = %response.status, "received response");
        Ok(response)
    }

    /// Sends an authorized request with an optional body and requires a 2xx status.
    pub async fn execute(
        &self,
        method: HttpMethod,
        url: Url,
        token: &AccessToken,
        body: Option<RequestBody>,
    ) -> DriveResult<HttpResponse> {
        let mut request = self.authorized(method, url, token)?;
        request.body = body;
        let response = self.send(request).await?;
        ensure_success(response)
    }

    /// Like [`execute`](Self::execute), decoding the JSON response.
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        url: Url,
        token: &AccessToken,
        body: Option<RequestBody>,
    ) -> DriveResult<T> {
        let response = self.execute(method, url, token, body).await?;
        decode(&response)
    }
}

/// Maps a non-2xx response to a remote error carrying status and raw body.
pub fn ensure_success(response: HttpResponse) -> DriveResult<HttpResponse> {
    if response.status.is_success() {
        Ok(response)
    } else {
        Err(DriveError::remote(response.status, response.text()))
    }
}

/// Decodes a JSON response body.
pub fn decode<T: DeserializeOwned>(response: &HttpResponse) -> DriveResult<T> {
    serde_json::from_slice(&response.body).map_err(|e| {
        DriveError::deserialization(format!(
            "Failed to deserialize response: {}: {}",
            e,
            response.text()
        ))
    })
}
