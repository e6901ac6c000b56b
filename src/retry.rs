//! The retrying request executor: one logical call, many attempts.
//!
//! ## Retry Strategy
//!
//! Only HTTP 429 is transient here. The executor waits for the
//! server-supplied `Retry-After` value when the header is present, otherwise
//! for the current backoff (`retry_backoff_secs * 2^n`): with a 1 s base and
//! 5 attempts the waits absent a hint are 1 s → 2 s → 4 s → 8 s → 16 s.
//! Exponential backoff avoids hammering a recovering endpoint; honouring the
//! header defers to the server when it knows better.
//!
//! Everything else is terminal on first sight: a 200 returns the raw body for
//! the caller to parse, any other status becomes
//! [`DocAskError::ApiError`] with the exact status and body, and a transport
//! failure propagates as-is. When the attempt budget is spent while still
//! rate-limited the call ends in [`DocAskError::RetriesExhausted`].
//!
//! Waits are timer futures (`tokio::time::sleep`), never thread-blocking
//! sleeps, so a host application's runtime keeps breathing while a call backs
//! off. Each wait is announced through `tracing::warn!` and the optional
//! progress callback before it starts.

use crate::chat::{ChatRequest, ChatTransport, HttpExchange};
use crate::config::AskConfig;
use crate::error::DocAskError;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

/// Outcome of classifying one [`HttpExchange`].
#[derive(Debug)]
enum AttemptOutcome {
    Success(String),
    RateLimited { delay_secs: u64 },
    HardFailure { status: u16, body: String },
}

/// Map an exchange to an outcome, resolving the delay for a rate-limited
/// attempt from the header hint or the current backoff value.
fn classify(exchange: HttpExchange, backoff_secs: u64) -> AttemptOutcome {
    match exchange.status {
        200 => AttemptOutcome::Success(exchange.body),
        429 => AttemptOutcome::RateLimited {
            delay_secs: exchange.retry_after.unwrap_or(backoff_secs),
        },
        status => AttemptOutcome::HardFailure {
            status,
            body: exchange.body,
        },
    }
}

/// Execute one logical chat-completion call, absorbing transient rate
/// limiting up to `config.max_retries` attempts.
///
/// Returns the raw success body; parsing is the caller's concern so the
/// executor stays oblivious to the response schema.
pub async fn execute<T: ChatTransport>(
    transport: &T,
    request: &ChatRequest,
    config: &AskConfig,
) -> Result<String, DocAskError> {
    let max_attempts = config.max_retries;
    let mut backoff_secs = config.retry_backoff_secs;

    for attempt in 1..=max_attempts {
        debug!("Chat attempt {}/{}", attempt, max_attempts);
        if let Some(ref cb) = config.progress_callback {
            cb.on_attempt_start(attempt, max_attempts);
        }

        let exchange = transport.send(request).await?;

        match classify(exchange, backoff_secs) {
            AttemptOutcome::Success(body) => {
                debug!("Chat attempt {} succeeded ({} bytes)", attempt, body.len());
                return Ok(body);
            }
            AttemptOutcome::RateLimited { delay_secs } => {
                if attempt == max_attempts {
                    return Err(DocAskError::RetriesExhausted {
                        attempts: max_attempts,
                    });
                }
                warn!(
                    "Rate limited on attempt {}/{}; retrying in {}s",
                    attempt, max_attempts, delay_secs
                );
                if let Some(ref cb) = config.progress_callback {
                    cb.on_retry_wait(delay_secs, attempt + 1, max_attempts);
                }
                sleep(Duration::from_secs(delay_secs)).await;
                backoff_secs = backoff_secs.saturating_mul(2);
            }
            AttemptOutcome::HardFailure { status, body } => {
                return Err(DocAskError::ApiError { status, body });
            }
        }
    }

    // Only reachable when max_retries is 0: the builder floors it at 1, but
    // the fields are public, so a zero-attempt call fails instead of running.
    Err(DocAskError::RetriesExhausted { attempts: 0 })
}
