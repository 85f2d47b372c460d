//! Transport layer abstraction for the two backend operations.

use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use plugchat_protocol::{FetchRequest, FetchResponse, SendRequest};
use std::collections::VecDeque;

/// A chat transport handles network communication with the message
/// backend.
///
/// This trait abstracts the network layer, allowing for different
/// implementations (HTTP, mock for testing, an in-process loopback).
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Appends a message to the backend's ordered log.
    async fn send(&self, request: &SendRequest) -> SyncResult<()>;

    /// Reads the tail of the log past the request's cursor.
    async fn fetch(&self, request: &FetchRequest) -> SyncResult<FetchResponse>;
}

/// A mock transport for testing.
///
/// Responses are scripted as queues: each call pops the next result, and
/// an empty queue yields success (an empty batch for fetch). Every
/// request is recorded for assertions.
#[derive(Debug, Default)]
pub struct MockTransport {
    send_results: Mutex<VecDeque<SyncResult<()>>>,
    fetch_results: Mutex<VecDeque<SyncResult<FetchResponse>>>,
    send_requests: Mutex<Vec<SendRequest>>,
    fetch_requests: Mutex<Vec<FetchRequest>>,
}

impl MockTransport {
    /// Creates a mock that answers every call with success.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a send result.
    pub fn push_send_result(&self, result: SyncResult<()>) {
        self.send_results.lock().push_back(result);
    }

    /// Queues a fetch result.
    pub fn push_fetch_result(&self, result: SyncResult<FetchResponse>) {
        self.fetch_results.lock().push_back(result);
    }

    /// Queues a successful fetch batch.
    pub fn push_fetch_batch(&self, messages: Vec<plugchat_protocol::Message>) {
        self.push_fetch_result(Ok(FetchResponse::new(messages)));
    }

    /// All send requests observed so far.
    pub fn send_requests(&self) -> Vec<SendRequest> {
        self.send_requests.lock().clone()
    }

    /// All fetch requests observed so far.
    pub fn fetch_requests(&self) -> Vec<FetchRequest> {
        self.fetch_requests.lock().clone()
    }

    /// Number of fetch calls observed so far.
    pub fn fetch_count(&self) -> usize {
        self.fetch_requests.lock().len()
    }

    /// Number of send calls observed so far.
    pub fn send_count(&self) -> usize {
        self.send_requests.lock().len()
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn send(&self, request: &SendRequest) -> SyncResult<()> {
        self.send_requests.lock().push(request.clone());
        self.send_results.lock().pop_front().unwrap_or(Ok(()))
    }

    async fn fetch(&self, request: &FetchRequest) -> SyncResult<FetchResponse> {
        self.fetch_requests.lock().push(*request);
        self.fetch_results
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(FetchResponse::default()))
    }
}
