//! The question-answering session: one document, many questions.
//!
//! [`AskSession`] owns the loaded document text and the transport, and walks
//! each question through validation → prompt assembly → the retry executor →
//! reply parsing. The full document travels with every question; there is no
//! conversation history, so every ask is independent and reproducible.
//!
//! A session accepts one submission at a time. A second `ask` while the first
//! is still in flight is rejected immediately with
//! [`DocAskError::SubmissionInFlight`] rather than queued, so a caller wired
//! to a UI can tell the user to wait instead of silently stacking requests.

use crate::chat::{parse_reply, ChatMessage, ChatRequest, ChatTransport, HttpTransport};
use crate::config::AskConfig;
use crate::error::DocAskError;
use crate::extract::{extract_from_bytes, extract_from_path, SourceFormat};
use crate::prompts::{build_user_message, DEFAULT_SYSTEM_PROMPT};
use crate::retry;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// A single-document question-answering session.
///
/// Generic over the transport so tests can substitute a scripted one; the
/// default is the `reqwest`-backed [`HttpTransport`].
///
/// # Example
/// ```rust,no_run
/// use docask::{AskConfig, AskSession};
///
/// # async fn run() -> Result<(), docask::DocAskError> {
/// let config = AskConfig::from_env()?;
/// let mut session = AskSession::new(config)?;
/// session.load_path("informe.pdf")?;
/// let reply = session.ask("¿Cuál es la conclusión principal?").await?;
/// println!("{reply}");
/// # Ok(())
/// # }
/// ```
pub struct AskSession<T: ChatTransport = HttpTransport> {
    config: AskConfig,
    transport: T,
    document: Option<Arc<str>>,
    in_flight: tokio::sync::Mutex<()>,
}

impl AskSession<HttpTransport> {
    /// Create a session with the production HTTP transport.
    pub fn new(config: AskConfig) -> Result<Self, DocAskError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: ChatTransport> AskSession<T> {
    /// Create a session over a caller-supplied transport.
    pub fn with_transport(config: AskConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            document: None,
            in_flight: tokio::sync::Mutex::new(()),
        }
    }

    /// Load a document from disk, replacing any previously loaded one.
    ///
    /// Uses the process-wide extraction cache, so re-loading an unchanged
    /// file costs one `stat`.
    pub fn load_path(&mut self, path: impl AsRef<Path>) -> Result<(), DocAskError> {
        let text = extract_from_path(path.as_ref())?;
        info!(
            "Loaded '{}' ({} chars of text)",
            path.as_ref().display(),
            text.len()
        );
        self.document = Some(text);
        Ok(())
    }

    /// Load a document from in-memory bytes with a declared MIME type
    /// (`application/pdf` or `text/plain`), replacing any previously loaded
    /// one. Bypasses the extraction cache.
    pub fn load_bytes(&mut self, bytes: &[u8], mime: &str) -> Result<(), DocAskError> {
        let format = SourceFormat::from_mime(mime)?;
        let text = extract_from_bytes(bytes, format)?;
        info!("Loaded in-memory document ({} chars of text)", text.len());
        self.document = Some(text);
        Ok(())
    }

    /// The underlying transport. Mostly useful to tests that inject a
    /// recording transport via [`AskSession::with_transport`].
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Whether a document is currently loaded.
    pub fn has_document(&self) -> bool {
        self.document.is_some()
    }

    /// The loaded document's extracted text, if any.
    pub fn document_text(&self) -> Option<&str> {
        self.document.as_deref()
    }

    /// Ask one question about the loaded document and return the assistant's
    /// reply.
    ///
    /// Validation happens before anything touches the network: an empty
    /// question, a missing document, or an in-flight submission each fail
    /// without sending a single request.
    pub async fn ask(&self, question: &str) -> Result<String, DocAskError> {
        let _guard = self
            .in_flight
            .try_lock()
            .map_err(|_| DocAskError::SubmissionInFlight)?;

        let question = question.trim();
        if question.is_empty() {
            return Err(DocAskError::EmptyQuestion);
        }
        let document = self.document.as_ref().ok_or(DocAskError::NoDocument)?;

        let system = self
            .config
            .system_prompt
            .as_deref()
            .unwrap_or(DEFAULT_SYSTEM_PROMPT);
        let messages = vec![
            ChatMessage::system(system),
            ChatMessage::user(build_user_message(document, question)),
        ];
        let request = ChatRequest::new(&self.config, messages);

        info!("Submitting question ({} chars)", question.len());
        let body = retry::execute(&self.transport, &request, &self.config).await?;
        let reply = parse_reply(&body)?;

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_reply(reply.len());
        }
        info!("Reply received ({} chars)", reply.len());
        Ok(reply)
    }
}

/// One-shot convenience: load `path`, ask `question`, return the reply.
///
/// Equivalent to building a session, loading the document, and asking once.
pub async fn ask_document(
    config: AskConfig,
    path: impl AsRef<Path>,
    question: &str,
) -> Result<String, DocAskError> {
    let mut session = AskSession::new(config)?;
    session.load_path(path)?;
    session.ask(question).await
}
