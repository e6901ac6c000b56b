//! Chat-completion wire types and the HTTP transport.
//!
//! The request body follows the OpenAI-compatible shape the endpoint expects:
//! `{messages: [{role, content}], model, stream: false, temperature}`; the
//! success body is `{choices: [{message: {content}}], …}`. Extra response
//! fields are ignored on deserialisation.
//!
//! [`ChatTransport`] is the seam between the retry executor and the network:
//! the executor only ever sees an [`HttpExchange`] (status, optional
//! `Retry-After`, raw body), so tests can drive it with a scripted transport
//! and a paused clock while production uses [`HttpTransport`] over `reqwest`.

use crate::config::AskConfig;
use crate::error::DocAskError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ── Request types ────────────────────────────────────────────────────────

/// One (role, content) entry in the message list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// One logical chat-completion request. Built fresh per question,
/// immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub model: String,
    pub stream: bool,
    pub temperature: f64,
}

impl ChatRequest {
    /// Build a request from the config's model parameters and a message list.
    pub fn new(config: &AskConfig, messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            model: config.model.clone(),
            stream: false,
            temperature: config.temperature,
        }
    }
}

// ── Response types ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    pub content: String,
}

/// Parse a success body and extract the first choice's message content.
pub fn parse_reply(body: &str) -> Result<String, DocAskError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| DocAskError::MalformedResponse {
            detail: e.to_string(),
        })?;
    response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or(DocAskError::EmptyChoices)
}

// ── Transport ────────────────────────────────────────────────────────────

/// The observable result of one HTTP attempt.
///
/// `retry_after` is the parsed `Retry-After` header in seconds, when the
/// server sent one the executor can honour.
#[derive(Debug, Clone)]
pub struct HttpExchange {
    pub status: u16,
    pub retry_after: Option<u64>,
    pub body: String,
}

/// Seam between the retry executor and the network.
///
/// One `send` is one attempt: no retries happen below this trait.
pub trait ChatTransport {
    fn send(
        &self,
        request: &ChatRequest,
    ) -> impl std::future::Future<Output = Result<HttpExchange, DocAskError>> + Send;
}

/// Production transport: HTTP POST with bearer auth via `reqwest`.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

// Same redaction policy as AskConfig: the bearer token never reaches logs.
impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("client", &self.client)
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl HttpTransport {
    /// Build a transport from the config's endpoint, token, and timeout.
    pub fn new(config: &AskConfig) -> Result<Self, DocAskError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| DocAskError::RequestFailed {
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

impl ChatTransport for HttpTransport {
    async fn send(&self, request: &ChatRequest) -> Result<HttpExchange, DocAskError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| DocAskError::RequestFailed {
                reason: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        let body = response
            .text()
            .await
            .map_err(|e| DocAskError::RequestFailed {
                reason: e.to_string(),
            })?;

        Ok(HttpExchange {
            status,
            retry_after,
            body,
        })
    }
}
