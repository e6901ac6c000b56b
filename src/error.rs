//! Error types for the docask library.
//!
//! One fatal enum, [`DocAskError`], covers the whole flow. The variants fall
//! into four families that callers usually want to tell apart:
//!
//! * **Local validation** (`EmptyQuestion`, `NoDocument`, `SubmissionInFlight`)
//!   — rejected before any network call is made.
//! * **Extraction** (`FileNotFound`, `PermissionDenied`, `UnsupportedFormat`,
//!   `InvalidUtf8`, `ExtractionFailed`) — the document could not be turned
//!   into text; the load halts, nothing is sent.
//! * **Request** (`RequestFailed`, `ApiError`, `RetriesExhausted`) — the chat
//!   endpoint was reached (or could not be reached) and the call ended in a
//!   terminal non-success state. Rate limiting is absorbed by the executor and
//!   only surfaces here once the retry budget is spent.
//! * **Response shape** (`EmptyChoices`, `MalformedResponse`) — HTTP 200 but
//!   the body was not the documented `{choices: [{message: {content}}]}`.
//!
//! None of these are logged to a durable store; they are rendered to the user
//! and dropped.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the docask library.
#[derive(Debug, Error)]
pub enum DocAskError {
    // ── Local validation ──────────────────────────────────────────────────
    /// The question was empty (or whitespace-only) after trimming.
    #[error("Question is empty. Type a question before submitting.")]
    EmptyQuestion,

    /// `ask` was called before any document was loaded.
    #[error("No document is loaded. Load a PDF or text file first.")]
    NoDocument,

    /// A previous submission on this session has not finished yet.
    #[error("A submission is already in flight on this session. Wait for it to finish before asking again.")]
    SubmissionInFlight,

    // ── Extraction errors ─────────────────────────────────────────────────
    /// Pre-loaded document path does not exist.
    #[error("Document not found: '{}'\nCheck the path exists and is readable.", path.display())]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{}'\nTry: chmod +r '{}'", path.display(), path.display())]
    PermissionDenied { path: PathBuf },

    /// Declared MIME type (or sniffed format) is neither PDF nor plain text.
    #[error("Unsupported document type '{mime}'. Supported: application/pdf, text/plain.")]
    UnsupportedFormat { mime: String },

    /// Plain-text source was not valid UTF-8.
    #[error("Document is not valid UTF-8 text (bad byte at offset {offset})")]
    InvalidUtf8 { offset: usize },

    /// The PDF parser failed on the document.
    #[error("Failed to extract text from document: {detail}")]
    ExtractionFailed { detail: String },

    // ── Request errors ────────────────────────────────────────────────────
    /// The HTTP request itself failed (connect error, timeout, bad TLS).
    #[error("Chat request failed: {reason}\nCheck your network connection and the endpoint URL.")]
    RequestFailed { reason: String },

    /// The endpoint returned a non-200, non-429 status. Not retried.
    #[error("Chat API error: HTTP {status} — {body}")]
    ApiError { status: u16, body: String },

    /// Every attempt was rate-limited; the retry budget is spent.
    #[error("Rate limited by the chat endpoint; gave up after {attempts} attempts.\nTry again later or raise max_retries.")]
    RetriesExhausted { attempts: u32 },

    // ── Response-shape errors ─────────────────────────────────────────────
    /// HTTP 200 but `choices` was empty.
    #[error("Chat endpoint returned no choices")]
    EmptyChoices,

    /// HTTP 200 but the body did not parse as a chat-completion response.
    #[error("Malformed chat response: {detail}")]
    MalformedResponse { detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_carries_status_and_body() {
        let e = DocAskError::ApiError {
            status: 503,
            body: "upstream overloaded".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("503"), "got: {msg}");
        assert!(msg.contains("upstream overloaded"));
    }

    #[test]
    fn retries_exhausted_display() {
        let e = DocAskError::RetriesExhausted { attempts: 5 };
        assert!(e.to_string().contains("5 attempts"));
    }

    #[test]
    fn file_not_found_display_names_path() {
        let e = DocAskError::FileNotFound {
            path: PathBuf::from("/tmp/missing.pdf"),
        };
        assert!(e.to_string().contains("/tmp/missing.pdf"));
    }

    #[test]
    fn unsupported_format_display_names_mime() {
        let e = DocAskError::UnsupportedFormat {
            mime: "image/png".into(),
        };
        assert!(e.to_string().contains("image/png"));
    }
}
