//! HTTP transport implementation.
//!
//! The actual HTTP client is abstracted via a trait so different stacks
//! (reqwest in production, an in-process loopback in tests) can carry
//! the same JSON-over-POST transport.

use crate::error::{SyncError, SyncResult};
use crate::transport::ChatTransport;
use async_trait::async_trait;
use plugchat_protocol::{FetchRequest, FetchResponse, SendRequest};
use serde::Serialize;
use std::sync::Arc;

/// Path of the append endpoint.
pub(crate) const SEND_PATH: &str = "/messages/send";
/// Path of the tail-read endpoint.
pub(crate) const FETCH_PATH: &str = "/messages/get";

/// A plain HTTP response: status plus body text.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
}

impl HttpResponse {
    /// A 200 response with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// A bodyless response with the given status.
    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }
}

/// Raw HTTP POST abstraction.
///
/// Implement this to provide the actual transport. The error string is a
/// connection-level failure; a non-2xx answer is a normal return and is
/// classified by [`HttpTransport`].
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends a POST with a JSON body and returns the response.
    async fn post_json(&self, url: &str, body: String) -> Result<HttpResponse, String>;
}

/// HTTP-based chat transport.
///
/// Encodes requests as JSON, posts them to the two backend endpoints and
/// decodes JSON responses. Relies on the underlying client's default
/// timeout; no explicit deadline is set at this layer.
pub struct HttpTransport<C: HttpClient> {
    base_url: String,
    client: C,
}

impl<C: HttpClient> HttpTransport<C> {
    /// Creates a transport against a backend base URL.
    pub fn new(base_url: impl Into<String>, client: C) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url, client }
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<Req: Serialize + Sync>(&self, path: &str, request: &Req) -> SyncResult<String> {
        let body =
            serde_json::to_string(request).map_err(|e| SyncError::Codec(e.to_string()))?;
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post_json(&url, body)
            .await
            .map_err(SyncError::transport_retryable)?;

        if !(200..300).contains(&response.status) {
            return Err(SyncError::Status {
                code: response.status,
            });
        }
        Ok(response.body)
    }
}

#[async_trait]
impl<C: HttpClient> ChatTransport for HttpTransport<C> {
    async fn send(&self, request: &SendRequest) -> SyncResult<()> {
        // The response body carries nothing beyond the success status.
        self.post(SEND_PATH, request).await.map(|_| ())
    }

    async fn fetch(&self, request: &FetchRequest) -> SyncResult<FetchResponse> {
        let body = self.post(FETCH_PATH, request).await?;
        serde_json::from_str(&body).map_err(|e| SyncError::Codec(e.to_string()))
    }
}

/// Production HTTP client backed by [`reqwest`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a client with reqwest's default configuration.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn post_json(&self, url: &str, body: String) -> Result<HttpResponse, String> {
        let response = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| e.to_string())?;
        Ok(HttpResponse { status, body })
    }
}

/// A server that can answer loopback requests in-process.
///
/// Useful for integration tests without network overhead.
pub trait LoopbackServer: Send + Sync {
    /// Handles a POST and returns the response, or a connection-level
    /// failure.
    fn handle_post(&self, path: &str, body: &str) -> Result<HttpResponse, String>;
}

impl<S: LoopbackServer + ?Sized> LoopbackServer for Arc<S> {
    fn handle_post(&self, path: &str, body: &str) -> Result<HttpResponse, String> {
        (**self).handle_post(path, body)
    }
}

/// An HTTP client that routes requests directly to a [`LoopbackServer`].
pub struct LoopbackClient<S: LoopbackServer> {
    server: S,
}

impl<S: LoopbackServer> LoopbackClient<S> {
    /// Creates a loopback client connected to the given server.
    pub fn new(server: S) -> Self {
        Self { server }
    }
}

#[async_trait]
impl<S: LoopbackServer> HttpClient for LoopbackClient<S> {
    async fn post_json(&self, url: &str, body: String) -> Result<HttpResponse, String> {
        let path = url
            .find("/messages/")
            .map(|i| &url[i..])
            .unwrap_or(url);
        self.server.handle_post(path, &body)
    }
}
