//! Configuration for the sync engine.

use std::time::Duration;

/// Configuration for sync operations.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL of the message backend (e.g. `https://chat.example.com`).
    pub base_url: String,
    /// Interval of the periodic fetch ticker.
    pub poll_interval: Duration,
    /// Retry policy for failed fetches.
    pub retry: RetryPolicy,
}

impl SyncConfig {
    /// Creates a configuration with the default 10 s cadence.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            poll_interval: Duration::from_secs(10),
            retry: RetryPolicy::default(),
        }
    }

    /// Sets the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// The delayed-retry policy for failed fetches.
///
/// This is deliberately not a backoff schedule: the default is a single
/// retry after a fixed delay, because the periodic ticker independently
/// re-attempts on its own cadence and recovery happens via whichever
/// fires first. The policy exists as its own value so it can be tested
/// apart from the ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum delayed attempts after a failure (0 disables the retry).
    pub max_attempts: u32,
    /// Fixed delay before each attempt.
    pub delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy with a given number of fixed-delay attempts.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// A policy that never retries; the ticker remains the only backstop.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 0,
            delay: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::from_secs(10),
        }
    }
}
