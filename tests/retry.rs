//! Retry-executor behaviour against a scripted transport.
//!
//! These tests run on a paused tokio clock, so the backoff sleeps complete
//! instantly while `Instant::now()` still reports the virtual time the
//! executor would have spent waiting. That lets each test assert both the
//! exact number of HTTP attempts and the exact wait schedule.

use docask::{AskConfig, ChatMessage, ChatRequest, ChatTransport, DocAskError, HttpExchange};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::time::{Duration, Instant};

/// Transport that replays a fixed script of exchanges, one per attempt.
struct ScriptedTransport {
    script: Mutex<Vec<HttpExchange>>,
    sends: AtomicUsize,
}

impl ScriptedTransport {
    fn new(script: Vec<HttpExchange>) -> Self {
        let mut script = script;
        script.reverse(); // pop() from the back yields original order
        Self {
            script: Mutex::new(script),
            sends: AtomicUsize::new(0),
        }
    }

    fn sends(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }
}

impl ChatTransport for ScriptedTransport {
    async fn send(&self, _request: &ChatRequest) -> Result<HttpExchange, DocAskError> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop()
            .ok_or(DocAskError::RequestFailed {
                reason: "scripted transport ran out of responses".into(),
            })
    }
}

fn ok(body: &str) -> HttpExchange {
    HttpExchange {
        status: 200,
        retry_after: None,
        body: body.to_string(),
    }
}

fn rate_limited(retry_after: Option<u64>) -> HttpExchange {
    HttpExchange {
        status: 429,
        retry_after,
        body: "rate limited".to_string(),
    }
}

fn config() -> AskConfig {
    AskConfig::builder().api_key("test-key").build().unwrap()
}

fn request(config: &AskConfig) -> ChatRequest {
    ChatRequest::new(config, vec![ChatMessage::user("doc\n\nPregunta: q")])
}

#[tokio::test(start_paused = true)]
async fn immediate_success_sends_once_and_waits_nothing() {
    let transport = ScriptedTransport::new(vec![ok("body")]);
    let config = config();
    let start = Instant::now();

    let body = docask::retry::execute(&transport, &request(&config), &config)
        .await
        .unwrap();

    assert_eq!(body, "body");
    assert_eq!(transport.sends(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn one_rate_limit_waits_initial_backoff_then_succeeds() {
    let transport = ScriptedTransport::new(vec![rate_limited(None), ok("after retry")]);
    let config = config();
    let start = Instant::now();

    let body = docask::retry::execute(&transport, &request(&config), &config)
        .await
        .unwrap();

    assert_eq!(body, "after retry");
    assert_eq!(transport.sends(), 2);
    assert_eq!(start.elapsed(), Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn backoff_doubles_across_consecutive_rate_limits() {
    let transport = ScriptedTransport::new(vec![
        rate_limited(None),
        rate_limited(None),
        rate_limited(None),
        ok("finally"),
    ]);
    let config = config();
    let start = Instant::now();

    let body = docask::retry::execute(&transport, &request(&config), &config)
        .await
        .unwrap();

    assert_eq!(body, "finally");
    assert_eq!(transport.sends(), 4);
    // 1s + 2s + 4s of backoff before the fourth attempt.
    assert_eq!(start.elapsed(), Duration::from_secs(7));
}

#[tokio::test(start_paused = true)]
async fn retry_after_header_overrides_computed_backoff() {
    let transport = ScriptedTransport::new(vec![
        rate_limited(Some(9)),
        rate_limited(None),
        ok("done"),
    ]);
    let config = config();
    let start = Instant::now();

    docask::retry::execute(&transport, &request(&config), &config)
        .await
        .unwrap();

    assert_eq!(transport.sends(), 3);
    // 9s from the header, then 2s: the doubling schedule advanced past the
    // overridden first wait regardless.
    assert_eq!(start.elapsed(), Duration::from_secs(11));
}

#[tokio::test(start_paused = true)]
async fn persistent_rate_limiting_exhausts_the_budget() {
    let transport = ScriptedTransport::new(vec![
        rate_limited(Some(2)),
        rate_limited(Some(2)),
        rate_limited(Some(2)),
        rate_limited(Some(2)),
        rate_limited(Some(2)),
    ]);
    let config = config();
    let start = Instant::now();

    let err = docask::retry::execute(&transport, &request(&config), &config)
        .await
        .unwrap_err();

    assert!(matches!(err, DocAskError::RetriesExhausted { attempts: 5 }));
    assert_eq!(transport.sends(), 5);
    // Four waits of 2s each; no sleep after the final rate-limited attempt.
    assert_eq!(start.elapsed(), Duration::from_secs(8));
}

#[tokio::test(start_paused = true)]
async fn server_error_fails_immediately_without_waiting() {
    let transport = ScriptedTransport::new(vec![HttpExchange {
        status: 500,
        retry_after: None,
        body: "internal error".to_string(),
    }]);
    let config = config();
    let start = Instant::now();

    let err = docask::retry::execute(&transport, &request(&config), &config)
        .await
        .unwrap_err();

    assert!(
        matches!(&err, DocAskError::ApiError { status: 500, body } if body == "internal error")
    );
    assert_eq!(transport.sends(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn auth_failure_is_not_retried() {
    let transport = ScriptedTransport::new(vec![
        HttpExchange {
            status: 401,
            retry_after: None,
            body: "bad token".to_string(),
        },
        ok("never reached"),
    ]);
    let config = config();

    let err = docask::retry::execute(&transport, &request(&config), &config)
        .await
        .unwrap_err();

    assert!(matches!(err, DocAskError::ApiError { status: 401, .. }));
    assert_eq!(transport.sends(), 1);
}

#[tokio::test]
async fn transport_failure_propagates_unchanged() {
    let transport = ScriptedTransport::new(vec![]);
    let config = config();

    let err = docask::retry::execute(&transport, &request(&config), &config)
        .await
        .unwrap_err();

    assert!(matches!(err, DocAskError::RequestFailed { .. }));
}

#[tokio::test]
async fn zero_attempts_errors_instead_of_panicking() {
    // The builder floors max_retries at 1, but the field is public; a config
    // mutated to 0 after build() must still fail cleanly.
    let transport = ScriptedTransport::new(vec![ok("never sent")]);
    let mut config = config();
    config.max_retries = 0;

    let err = docask::retry::execute(&transport, &request(&config), &config)
        .await
        .unwrap_err();

    assert!(matches!(err, DocAskError::RetriesExhausted { attempts: 0 }));
    assert_eq!(transport.sends(), 0);
}

#[tokio::test(start_paused = true)]
async fn lowered_budget_is_respected() {
    let transport = ScriptedTransport::new(vec![
        rate_limited(None),
        rate_limited(None),
        rate_limited(None),
    ]);
    let config = AskConfig::builder()
        .api_key("test-key")
        .max_retries(2)
        .build()
        .unwrap();

    let err = docask::retry::execute(&transport, &request(&config), &config)
        .await
        .unwrap_err();

    assert!(matches!(err, DocAskError::RetriesExhausted { attempts: 2 }));
    assert_eq!(transport.sends(), 2);
}
