//! # docask
//!
//! Ask questions about a single document — PDF or plain text — through an
//! OpenAI-compatible chat-completion endpoint.
//!
//! ```text
//! ┌──────────┐   ┌─────────────┐   ┌──────────────┐   ┌─────────────┐
//! │ document │──►│  extraction │──►│    prompt    │──►│    retry    │──► reply
//! │ pdf/txt  │   │  (+ cache)  │   │   assembly   │   │  executor   │
//! └──────────┘   └─────────────┘   └──────────────┘   └─────────────┘
//! ```
//!
//! The document's full extracted text travels with every question, so answers
//! need no index, no embeddings, and no stored conversation state. Rate
//! limiting (HTTP 429) is absorbed transparently by the retry executor with
//! exponential backoff; every other failure is surfaced immediately as a
//! [`DocAskError`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use docask::{AskConfig, AskSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), docask::DocAskError> {
//!     let config = AskConfig::builder()
//!         .api_key(std::env::var("XAI_API_KEY").unwrap_or_default())
//!         .build()?;
//!
//!     let mut session = AskSession::new(config)?;
//!     session.load_path("informe.pdf")?;
//!
//!     let reply = session.ask("¿De qué trata el documento?").await?;
//!     println!("{reply}");
//!     Ok(())
//! }
//! ```
//!
//! ## Feature flags
//!
//! | Feature | Default | Effect |
//! |---------|---------|--------|
//! | `cli`   | yes     | Builds the `docask` binary (clap, indicatif, anyhow, tracing-subscriber) |
//!
//! The library itself has no optional features; disable `cli` with
//! `default-features = false` when embedding.

pub mod chat;
pub mod config;
pub mod error;
pub mod extract;
pub mod progress;
pub mod prompts;
pub mod retry;
pub mod session;

pub use chat::{ChatMessage, ChatRequest, ChatTransport, HttpExchange, HttpTransport};
pub use config::{AskConfig, AskConfigBuilder, DEFAULT_ENDPOINT, DEFAULT_MODEL};
pub use error::DocAskError;
pub use extract::SourceFormat;
pub use progress::{AskProgressCallback, NoopProgressCallback, ProgressCallback};
pub use session::{ask_document, AskSession};
