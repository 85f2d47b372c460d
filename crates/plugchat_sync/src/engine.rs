//! The sync engine.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::transport::ChatTransport;
use parking_lot::RwLock;
use plugchat_bridge::NativeSink;
use plugchat_protocol::{FetchRequest, OutboundEvent, SendRequest};
use plugchat_store::StateStore;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Statistics about sync operations.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Total completed fetches (including empty batches).
    pub fetches: u64,
    /// Total failed fetch attempts.
    pub fetch_failures: u64,
    /// Total successful sends.
    pub sends: u64,
    /// Total failed sends.
    pub send_failures: u64,
    /// Messages merged into the store by fetches.
    pub messages_merged: u64,
    /// Delayed retry attempts made.
    pub retries: u64,
    /// Last error message.
    pub last_error: Option<String>,
}

struct EngineInner<T: ChatTransport> {
    config: SyncConfig,
    transport: T,
    store: Arc<StateStore>,
    sink: Arc<dyn NativeSink>,
    cursor: AtomicI64,
    stats: RwLock<SyncStats>,
}

/// The sync engine owns the polling cursor and the two backend
/// operations.
///
/// The cursor starts at zero and only ever advances, to the `createdAt`
/// of the last message of a successful non-empty fetch. Overlapping
/// fetches are tolerated rather than excluded: a stale result can
/// neither move the cursor backwards nor duplicate a message, because
/// the advance is a monotonic max and the store deduplicates on append.
///
/// The engine is a cheap handle; clones share all state.
pub struct SyncEngine<T: ChatTransport> {
    inner: Arc<EngineInner<T>>,
}

impl<T: ChatTransport> Clone for SyncEngine<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: ChatTransport + 'static> SyncEngine<T> {
    /// Creates an engine with the cursor at the epoch.
    pub fn new(
        config: SyncConfig,
        transport: T,
        store: Arc<StateStore>,
        sink: Arc<dyn NativeSink>,
    ) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                config,
                transport,
                store,
                sink,
                cursor: AtomicI64::new(0),
                stats: RwLock::new(SyncStats::default()),
            }),
        }
    }

    /// The engine's configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    /// The current cursor value.
    pub fn cursor(&self) -> i64 {
        self.inner.cursor.load(Ordering::SeqCst)
    }

    /// A snapshot of the current stats.
    pub fn stats(&self) -> SyncStats {
        self.inner.stats.read().clone()
    }

    /// Posts one message to the backend.
    ///
    /// On success, immediately triggers one out-of-band fetch so the
    /// sender's own message round-trips back through the ordered log
    /// rather than being optimistically trusted. On failure the attempt
    /// is abandoned: no retry, no cursor movement, no local merge. The
    /// failure is surfaced to the store's error field and returned.
    pub async fn send(&self, username: &str, text: &str) -> SyncResult<()> {
        let request = SendRequest::new(username, text);
        match self.inner.transport.send(&request).await {
            Ok(()) => {
                debug!(username, "message sent");
                self.inner.stats.write().sends += 1;
                // The post-send fetch handles its own failures.
                let _ = self.fetch_new().await;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "error sending message");
                let mut stats = self.inner.stats.write();
                stats.send_failures += 1;
                stats.last_error = Some(e.to_string());
                drop(stats);
                self.inner.store.set_error(format!("send failed: {e}"));
                Err(e)
            }
        }
    }

    /// Fetches everything past the cursor and merges it.
    ///
    /// On failure, surfaces the error and schedules the delayed one-shot
    /// retry per the configured policy; the periodic ticker independently
    /// re-attempts on its own cadence, so recovery happens via whichever
    /// fires first. Returns the number of messages merged.
    pub async fn fetch_new(&self) -> SyncResult<usize> {
        match self.fetch_once().await {
            Ok(merged) => Ok(merged),
            Err(e) => {
                self.note_fetch_failure(&e);
                if e.is_retryable() {
                    self.schedule_retry();
                }
                Err(e)
            }
        }
    }

    /// One fetch attempt, with no retry scheduling.
    async fn fetch_once(&self) -> SyncResult<usize> {
        let from = self.cursor();
        let response = self.inner.transport.fetch(&FetchRequest::new(from)).await?;
        self.inner.stats.write().fetches += 1;

        let Some(last) = response.last_timestamp() else {
            return Ok(0);
        };
        // Monotonic: a racing stale batch must never regress the cursor.
        self.inner.cursor.fetch_max(last, Ordering::SeqCst);

        let mut merged = 0usize;
        for message in response.messages {
            // Only messages the store accepted are forwarded, so the
            // host never sees duplicates from overlapping batches.
            if self.inner.store.append(message.clone()) {
                merged += 1;
                if let Err(e) = self
                    .inner
                    .sink
                    .post_event(&OutboundEvent::ReceiveMessage(message))
                {
                    warn!(error = %e, "failed to forward message to host");
                }
            }
        }

        if merged > 0 {
            info!(merged, cursor = self.cursor(), "merged new messages");
        }
        self.inner.stats.write().messages_merged += merged as u64;
        Ok(merged)
    }

    fn note_fetch_failure(&self, e: &SyncError) {
        error!(error = %e, "error fetching messages");
        let mut stats = self.inner.stats.write();
        stats.fetch_failures += 1;
        stats.last_error = Some(e.to_string());
        drop(stats);
        self.inner.store.set_error(format!("fetch failed: {e}"));
    }

    /// Spawns the delayed retry for a failed fetch.
    ///
    /// The retry attempts do not reschedule themselves; once the policy
    /// is exhausted the ticker is the backstop.
    fn schedule_retry(&self) {
        let policy = self.inner.config.retry;
        if policy.max_attempts == 0 {
            return;
        }
        debug!(delay = ?policy.delay, "retrying fetch after delay");

        let engine = self.clone();
        tokio::spawn(async move {
            for _ in 0..policy.max_attempts {
                tokio::time::sleep(policy.delay).await;
                engine.inner.stats.write().retries += 1;
                match engine.fetch_once().await {
                    Ok(_) => break,
                    Err(e) => {
                        engine.note_fetch_failure(&e);
                        if !e.is_retryable() {
                            break;
                        }
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryPolicy;
    use crate::transport::MockTransport;
    use plugchat_bridge::CollectingSink;
    use plugchat_protocol::{Message, Sender};
    use std::time::Duration;

    fn msg(created_at: i64, text: &str) -> Message {
        Message::new(Sender::Remote, "ana", text, created_at)
    }

    struct Harness {
        engine: SyncEngine<MockTransport>,
        store: Arc<StateStore>,
        sink: Arc<CollectingSink>,
    }

    fn harness() -> Harness {
        harness_with(SyncConfig::new("http://chat.test"))
    }

    fn harness_with(config: SyncConfig) -> Harness {
        let store = Arc::new(StateStore::new());
        let sink = Arc::new(CollectingSink::new());
        let engine = SyncEngine::new(config, MockTransport::new(), store.clone(), sink.clone());
        Harness {
            engine,
            store,
            sink,
        }
    }

    fn transport(h: &Harness) -> &MockTransport {
        h.engine.transport()
    }

    #[tokio::test]
    async fn fetch_scenario_cursor_and_bridge() {
        let h = harness();
        transport(&h).push_fetch_batch(vec![msg(100, "hi")]);

        // cursor 0 -> 100, one store entry, one bridge event
        let merged = h.engine.fetch_new().await.unwrap();
        assert_eq!(merged, 1);
        assert_eq!(h.engine.cursor(), 100);
        assert_eq!(h.store.len(), 1);
        assert_eq!(h.sink.count("receiveMessage"), 1);

        // empty batch from 100: nothing moves, nothing fires
        let merged = h.engine.fetch_new().await.unwrap();
        assert_eq!(merged, 0);
        assert_eq!(h.engine.cursor(), 100);
        assert_eq!(h.store.len(), 1);
        assert_eq!(h.sink.count("receiveMessage"), 1);

        let requests = transport(&h).fetch_requests();
        assert_eq!(requests[0].from_timestamp, 0);
        assert_eq!(requests[1].from_timestamp, 100);
    }

    #[tokio::test]
    async fn overlapping_batches_merge_once() {
        let h = harness();
        // Two racing fetches from the same cursor can both return the
        // same batch; the second merge must be a no-op.
        transport(&h).push_fetch_batch(vec![msg(100, "hi"), msg(150, "yo")]);
        transport(&h).push_fetch_batch(vec![msg(100, "hi"), msg(150, "yo")]);

        h.engine.fetch_new().await.unwrap();
        let merged = h.engine.fetch_new().await.unwrap();

        assert_eq!(merged, 0);
        assert_eq!(h.store.len(), 2);
        assert_eq!(h.engine.cursor(), 150);
        assert_eq!(h.sink.count("receiveMessage"), 2);
    }

    #[tokio::test]
    async fn stale_batch_cannot_regress_cursor() {
        let h = harness();
        transport(&h).push_fetch_batch(vec![msg(200, "late")]);
        transport(&h).push_fetch_batch(vec![msg(100, "stale")]);

        h.engine.fetch_new().await.unwrap();
        assert_eq!(h.engine.cursor(), 200);

        // A slower in-flight fetch delivering an older batch afterwards.
        h.engine.fetch_new().await.unwrap();
        assert_eq!(h.engine.cursor(), 200);
    }

    #[tokio::test]
    async fn send_triggers_exactly_one_fetch() {
        let h = harness();
        h.engine.send("ana", "hello").await.unwrap();

        assert_eq!(transport(&h).send_count(), 1);
        assert_eq!(transport(&h).fetch_count(), 1);
        assert_eq!(
            transport(&h).send_requests()[0],
            SendRequest::new("ana", "hello")
        );
        assert_eq!(h.engine.stats().sends, 1);
    }

    #[tokio::test]
    async fn failed_send_is_abandoned_and_surfaced() {
        let h = harness();
        transport(&h).push_send_result(Err(SyncError::transport_retryable("down")));

        let result = h.engine.send("ana", "hello").await;
        assert!(result.is_err());

        // No post-send fetch, no local merge, error surfaced.
        assert_eq!(transport(&h).fetch_count(), 0);
        assert!(h.store.is_empty());
        assert!(h.store.error().unwrap().message.contains("send failed"));
        assert_eq!(h.engine.stats().send_failures, 1);
    }

    #[tokio::test]
    async fn failed_fetch_leaves_cursor_and_surfaces_error() {
        let h = harness();
        transport(&h).push_fetch_batch(vec![msg(100, "hi")]);
        h.engine.fetch_new().await.unwrap();
        h.store.clear_error();

        transport(&h).push_fetch_result(Err(SyncError::Status { code: 502 }));
        assert!(h.engine.fetch_new().await.is_err());

        assert_eq!(h.engine.cursor(), 100);
        assert!(h.store.error().is_some());
        assert_eq!(h.engine.stats().fetch_failures, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_retries_once_after_delay() {
        let h = harness();
        transport(&h).push_fetch_result(Err(SyncError::transport_retryable("down")));
        transport(&h).push_fetch_batch(vec![msg(100, "recovered")]);

        assert!(h.engine.fetch_new().await.is_err());
        assert_eq!(transport(&h).fetch_count(), 1);

        // The one-shot retry fires after the fixed 10 s delay.
        tokio::time::sleep(Duration::from_secs(11)).await;

        assert_eq!(transport(&h).fetch_count(), 2);
        assert_eq!(h.engine.cursor(), 100);
        assert_eq!(h.store.len(), 1);
        assert_eq!(h.engine.stats().retries, 1);

        // And it is one-shot: no further attempts follow.
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(transport(&h).fetch_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_failure_is_not_rescheduled() {
        let h = harness();
        transport(&h).push_fetch_result(Err(SyncError::transport_retryable("down")));
        transport(&h).push_fetch_result(Err(SyncError::transport_retryable("still down")));

        assert!(h.engine.fetch_new().await.is_err());
        tokio::time::sleep(Duration::from_secs(60)).await;

        // Initial attempt plus exactly one retry.
        assert_eq!(transport(&h).fetch_count(), 2);
        assert_eq!(h.engine.stats().fetch_failures, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn no_retry_policy_disables_the_retry() {
        let h = harness_with(
            SyncConfig::new("http://chat.test").with_retry(RetryPolicy::no_retry()),
        );
        transport(&h).push_fetch_result(Err(SyncError::transport_retryable("down")));

        assert!(h.engine.fetch_new().await.is_err());
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(transport(&h).fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn undecodable_response_retries_once_after_delay() {
        let h = harness();
        transport(&h).push_fetch_result(Err(SyncError::Codec("garbage".into())));
        transport(&h).push_fetch_batch(vec![msg(100, "recovered")]);

        assert!(h.engine.fetch_new().await.is_err());
        assert_eq!(transport(&h).fetch_count(), 1);

        // A malformed body is a fetch failure like any other: the
        // one-shot retry fires after the fixed delay.
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(transport(&h).fetch_count(), 2);
        assert_eq!(h.engine.cursor(), 100);
        assert_eq!(h.engine.stats().retries, 1);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // After any sequence of fetches the cursor equals the max
            // createdAt seen so far and never decreases along the way.
            #[test]
            fn cursor_is_monotonic_max(
                batches in proptest::collection::vec(
                    proptest::collection::vec(0i64..1000, 0..5),
                    0..8,
                )
            ) {
                let rt = tokio::runtime::Builder::new_current_thread()
                    .enable_time()
                    .build()
                    .unwrap();
                rt.block_on(async {
                    let h = harness();
                    let mut max_seen = 0i64;

                    for stamps in &batches {
                        let mut stamps = stamps.clone();
                        // Backends deliver batches ascending by createdAt.
                        stamps.sort_unstable();
                        let batch: Vec<Message> =
                            stamps.iter().map(|&t| msg(t, "x")).collect();
                        transport(&h).push_fetch_batch(batch);

                        let before = h.engine.cursor();
                        let _ = h.engine.fetch_new().await;
                        let after = h.engine.cursor();

                        prop_assert!(after >= before);
                        max_seen = max_seen.max(stamps.last().copied().unwrap_or(0));
                        prop_assert_eq!(after, max_seen);
                    }
                    Ok(())
                })?;
            }
        }
    }
}
