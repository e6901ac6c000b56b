//! Configuration types for document question-answering.
//!
//! All behaviour is controlled through [`AskConfig`], built via its
//! [`AskConfigBuilder`]. Keeping every knob in one struct makes it trivial to
//! share a config across a session's calls and to diff two runs to understand
//! why their outcomes differ. The bearer token lives here too: nothing in the
//! library reads secrets from the environment behind the caller's back —
//! [`AskConfig::from_env`] is the one explicit, opt-in place that does.
//!
//! # Design choice: builder over constructor
//! A ten-field constructor is unreadable and breaks on every new field. The
//! builder lets callers set only what they care about and rely on documented
//! defaults for the rest.

use crate::error::DocAskError;
use crate::progress::ProgressCallback;
use std::fmt;

/// Default chat-completion endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.x.ai/v1/chat/completions";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "grok-2-1212";

/// Configuration for a document question-answering session.
///
/// Built via [`AskConfig::builder()`].
///
/// # Example
/// ```rust
/// use docask::AskConfig;
///
/// let config = AskConfig::builder()
///     .api_key("xai-…")
///     .model("grok-2-1212")
///     .max_retries(3)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct AskConfig {
    /// Chat-completion endpoint URL. Default: [`DEFAULT_ENDPOINT`].
    pub endpoint: String,

    /// Bearer token sent in the `Authorization` header. Required.
    pub api_key: String,

    /// Model identifier sent in the request body. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Sampling temperature. Default: 0.7.
    ///
    /// 0.7 keeps answers grounded in the document while allowing the model to
    /// paraphrase instead of quoting verbatim. Lower it towards 0 for literal
    /// extraction, raise it for more free-form summaries.
    pub temperature: f64,

    /// Custom system prompt. If None, uses the built-in default.
    pub system_prompt: Option<String>,

    /// Maximum attempts per logical call. Default: 5.
    ///
    /// Only HTTP 429 consumes attempts — any other failure is terminal on the
    /// first occurrence. Five attempts with doubling backoff absorb bursts of
    /// rate limiting lasting up to half a minute without hammering a
    /// recovering endpoint.
    pub max_retries: u32,

    /// Initial retry delay in seconds (exponential backoff). Default: 1.
    ///
    /// Doubles after each rate-limited attempt: 1 s → 2 s → 4 s → 8 s → 16 s.
    /// A server-supplied `Retry-After` header overrides the computed value
    /// for that wait; the doubling continues regardless.
    pub retry_backoff_secs: u64,

    /// Per-request HTTP timeout in seconds. Default: 120.
    ///
    /// A whole book's text travels in the request body, so generation can take
    /// far longer than a typical chat round-trip.
    pub api_timeout_secs: u64,

    /// Optional progress callback for attempt and retry-wait events.
    pub progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for AskConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AskConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_secs", &self.retry_backoff_secs)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn AskProgressCallback>"),
            )
            .finish()
    }
}

impl AskConfig {
    /// Create a new builder for `AskConfig`.
    pub fn builder() -> AskConfigBuilder {
        AskConfigBuilder {
            config: Self::unvalidated_defaults(),
        }
    }

    /// Build a config from the environment: the token is read from
    /// `DOCASK_API_KEY`, falling back to `XAI_API_KEY`.
    ///
    /// This is a convenience for binaries; library callers should prefer
    /// threading the token explicitly through [`AskConfig::builder`].
    pub fn from_env() -> Result<Self, DocAskError> {
        let api_key = std::env::var("DOCASK_API_KEY")
            .or_else(|_| std::env::var("XAI_API_KEY"))
            .map_err(|_| {
                DocAskError::InvalidConfig(
                    "No API key found. Set DOCASK_API_KEY or XAI_API_KEY.".into(),
                )
            })?;
        Self::builder().api_key(api_key).build()
    }

    fn unvalidated_defaults() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            system_prompt: None,
            max_retries: 5,
            retry_backoff_secs: 1,
            api_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

/// Builder for [`AskConfig`].
pub struct AskConfigBuilder {
    config: AskConfig,
}

impl AskConfigBuilder {
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.config.endpoint = url.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn temperature(mut self, t: f64) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n.max(1);
        self
    }

    pub fn retry_backoff_secs(mut self, secs: u64) -> Self {
        self.config.retry_backoff_secs = secs;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AskConfig, DocAskError> {
        let c = &self.config;
        if c.api_key.trim().is_empty() {
            return Err(DocAskError::InvalidConfig(
                "API key must not be empty".into(),
            ));
        }
        if !c.endpoint.starts_with("http://") && !c.endpoint.starts_with("https://") {
            return Err(DocAskError::InvalidConfig(format!(
                "Endpoint must be an HTTP/HTTPS URL, got '{}'",
                c.endpoint
            )));
        }
        if c.max_retries == 0 {
            return Err(DocAskError::InvalidConfig(
                "max_retries must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
