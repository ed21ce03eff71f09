//! HTTP transport layer for the Drive and OAuth2 endpoints.

use crate::config::DriveConfig;
use crate::errors::{DriveError, DriveResult, TransportError};
use async_trait::async_trait;
use bytes::Bytes;
use rand::distributions::Alphanumeric;
use rand::Rng;
use reqwest::{header::HeaderMap, header::CONTENT_TYPE, Client, Method, StatusCode};
use url::Url;

/// HTTP transport abstraction, injected into every component for testability.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send an HTTP request and receive a response.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// HTTP request representation.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Request URL.
    pub url: Url,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body.
    pub body: Option<RequestBody>,
    /// Request timeout.
    pub timeout: Option<std::time::Duration>,
}

impl HttpRequest {
    /// Creates a request with no headers and no body.
    pub fn new(method: HttpMethod, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
        }
    }
}

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET method.
    Get,
    /// POST method.
    Post,
    /// PATCH method.
    Patch,
    /// DELETE method.
    Delete,
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

/// Request body variants.
#[derive(Clone)]
pub enum RequestBody {
    /// Empty body.
    Empty,
    /// JSON bytes, sent with `application/json`.
    Json(Bytes),
    /// Multipart/related body.
    Multipart(MultipartBody),
}

impl RequestBody {
    /// Serializes a value into a JSON body.
    pub fn json<T: serde::Serialize>(value: &T) -> DriveResult<Self> {
        serde_json::to_vec(value)
            .map(|v| RequestBody::Json(Bytes::from(v)))
            .map_err(|e| DriveError::invalid_request(format!("Failed to serialize request: {}", e)))
    }
}

impl std::fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestBody::Empty => write!(f, "Empty"),
            RequestBody::Json(bytes) => write!(f, "Json({} bytes)", bytes.len()),
            RequestBody::Multipart(m) => write!(f, "Multipart({} bytes)", m.content.len()),
        }
    }
}

/// Two-part multipart/related body: JSON metadata followed by file content.
#[derive(Debug, Clone)]
pub struct MultipartBody {
    /// Metadata part (JSON).
    pub metadata: Bytes,
    /// Content part.
    pub content: Bytes,
    /// Content type of the content part.
    pub content_type: String,
    /// Optional `Content-Disposition` header for the content part.
    pub content_disposition: Option<String>,
    /// Boundary string.
    pub boundary: String,
}

impl MultipartBody {
    /// Creates a new multipart body with a random boundary.
    pub fn new(metadata: Bytes, content: Bytes, content_type: impl Into<String>) -> Self {
        Self {
            metadata,
            content,
            content_type: content_type.into(),
            content_disposition: None,
            boundary: Self::generate_boundary(),
        }
    }

    /// Adds a `form-data` disposition naming the uploaded file.
    pub fn with_file_name(mut self, file_name: &str) -> Self {
        self.content_disposition = Some(format!(
            "form-data; name=\"file\"; filename=\"{}\"",
            file_name.replace('"', "\\\"")
        ));
        self
    }

    fn generate_boundary() -> String {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(30)
            .map(char::from)
            .collect();
        token
    }

    /// Converts to bytes.
    pub fn to_bytes(&self) -> Bytes {
        let mut out = Vec::with_capacity(self.metadata.len() + self.content.len() + 256);

        out.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        out.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
        out.extend_from_slice(&self.metadata);
        out.extend_from_slice(b"\r\n");

        out.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        if let Some(disposition) = &self.content_disposition {
            out.extend_from_slice(format!("Content-Disposition: {}\r\n", disposition).as_bytes());
        }
        out.extend_from_slice(format!("Content-Type: {}\r\n\r\n", self.content_type).as_bytes());
        out.extend_from_slice(&self.content);
        out.extend_from_slice(format!("\r\n--{}--\r\n", self.boundary).as_bytes());

        Bytes::from(out)
    }

    /// Gets the content type header value.
    pub fn content_type_header(&self) -> String {
        format!("multipart/related; boundary={}", self.boundary)
    }
}

/// HTTP response representation.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Response status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Bytes,
}

impl HttpResponse {
    /// Creates a new HTTP response.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Body as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Reqwest-based HTTP transport implementation.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a new reqwest transport.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a transport using the timeouts and user agent from the configuration.
    pub fn from_config(config: &DriveConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| TransportError::Http(format!("Failed to create client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method: Method = request.method.into();
        let mut req = self.client.request(method, request.url);

        req = req.headers(request.headers);

        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }

        match request.body {
            None | Some(RequestBody::Empty) => {}
            Some(RequestBody::Json(bytes)) => {
                req = req.header(CONTENT_TYPE, "application/json").body(bytes);
            }
            Some(RequestBody::Multipart(multipart)) => {
                req = req
                    .header(CONTENT_TYPE, multipart.content_type_header())
                    .body(multipart.to_bytes());
            }
        }

        let response = req.send().await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(HttpResponse::new(status, headers, body))
    }
}
