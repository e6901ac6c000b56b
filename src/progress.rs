//! Progress-callback trait for per-attempt request events.
//!
//! Inject an [`Arc<dyn AskProgressCallback>`] via
//! [`crate::config::AskConfigBuilder::progress_callback`] to receive real-time
//! events as the executor works through its attempts — most importantly the
//! rate-limit waits, which can add many seconds to an otherwise instant call.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a terminal spinner, a status line in a UI, or a broadcast
//! channel without the library knowing anything about how the host application
//! communicates. The trait is `Send + Sync` so a session can be driven from a
//! spawned task.

use std::sync::Arc;

/// Called by the request executor as it works through attempts.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait AskProgressCallback: Send + Sync {
    /// Called just before an attempt's HTTP request is sent.
    ///
    /// # Arguments
    /// * `attempt`      — 1-indexed attempt number
    /// * `max_attempts` — the configured attempt ceiling
    fn on_attempt_start(&self, attempt: u32, max_attempts: u32) {
        let _ = (attempt, max_attempts);
    }

    /// Called after a rate-limited response, just before the executor sleeps.
    ///
    /// # Arguments
    /// * `delay_secs`   — the wait that is about to happen
    /// * `next_attempt` — 1-indexed number of the attempt that will follow
    /// * `max_attempts` — the configured attempt ceiling
    fn on_retry_wait(&self, delay_secs: u64, next_attempt: u32, max_attempts: u32) {
        let _ = (delay_secs, next_attempt, max_attempts);
    }

    /// Called once when a reply is received and parsed.
    ///
    /// # Arguments
    /// * `reply_len` — byte length of the assistant reply
    fn on_reply(&self, reply_len: usize) {
        let _ = reply_len;
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl AskProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::AskConfig`].
pub type ProgressCallback = Arc<dyn AskProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    struct TrackingCallback {
        attempts: AtomicUsize,
        waited_secs: AtomicU64,
        replies: AtomicUsize,
    }

    impl AskProgressCallback for TrackingCallback {
        fn on_attempt_start(&self, _attempt: u32, _max: u32) {
            self.attempts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_retry_wait(&self, delay_secs: u64, _next: u32, _max: u32) {
            self.waited_secs.fetch_add(delay_secs, Ordering::SeqCst);
        }

        fn on_reply(&self, _reply_len: usize) {
            self.replies.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_attempt_start(1, 5);
        cb.on_retry_wait(2, 2, 5);
        cb.on_reply(42);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            attempts: AtomicUsize::new(0),
            waited_secs: AtomicU64::new(0),
            replies: AtomicUsize::new(0),
        };

        tracker.on_attempt_start(1, 5);
        tracker.on_retry_wait(1, 2, 5);
        tracker.on_attempt_start(2, 5);
        tracker.on_retry_wait(2, 3, 5);
        tracker.on_attempt_start(3, 5);
        tracker.on_reply(128);

        assert_eq!(tracker.attempts.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.waited_secs.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.replies.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn AskProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_attempt_start(1, 1);
        cb.on_reply(7);
    }
}
