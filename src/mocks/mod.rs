//! Recording transport double for unit tests.

use crate::errors::TransportError;
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, RequestBody};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Mock HTTP transport that replays queued responses and records requests.
pub struct MockHttpTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockHttpTransport {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn enqueue_json_response(&self, status: u16, body: &str) {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.responses.lock().unwrap().push_back(Ok(HttpResponse::new(
            StatusCode::from_u16(status).unwrap(),
            headers,
            Bytes::from(body.to_string()),
        )));
    }

    pub fn enqueue_empty_response(&self, status: u16) {
        self.responses.lock().unwrap().push_back(Ok(HttpResponse::new(
            StatusCode::from_u16(status).unwrap(),
            HeaderMap::new(),
            Bytes::new(),
        )));
    }

    pub fn enqueue_error(&self, error: TransportError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn get_requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Methods of all recorded requests, in order.
    pub fn methods(&self) -> Vec<HttpMethod> {
        self.requests.lock().unwrap().iter().map(|r| r.method).collect()
    }

    pub fn verify_request_count(&self, expected: usize) {
        let actual = self.requests.lock().unwrap().len();
        assert_eq!(actual, expected, "Expected {} requests, got {}", expected, actual);
    }

    pub fn verify_request(&self, index: usize, method: HttpMethod, url_contains: &str) {
        let requests = self.requests.lock().unwrap();
        assert!(index < requests.len(), "No request at index {}", index);

        let request = &requests[index];
        assert_eq!(request.method, method, "Expected method {:?}, got {:?}", method, request.method);
        assert!(
            request.url.as_str().contains(url_contains),
            "Expected URL to contain '{}', got '{}'",
            url_contains,
            request.url
        );
    }

    /// Decodes the JSON body of the request at `index`.
    pub fn json_body(&self, index: usize) -> serde_json::Value {
        let requests = self.requests.lock().unwrap();
        match &requests[index].body {
            Some(RequestBody::Json(bytes)) => serde_json::from_slice(bytes).unwrap(),
            other => panic!("Expected JSON body at index {}, got {:?}", index, other),
        }
    }
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::Network(
                    "No response configured in MockHttpTransport".to_string(),
                ))
            })
    }
}
