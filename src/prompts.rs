//! Prompt assembly for document question-answering.
//!
//! Centralising every prompt literal here serves two purposes:
//!
//! 1. **Single source of truth** — the system instruction, the page-header
//!    format, and the question label each live in exactly one place.
//!
//! 2. **Testability** — unit tests can inspect prompt assembly directly
//!    without a live endpoint.
//!
//! The page header and question label are kept byte-for-byte compatible with
//! the original deployment, so replies remain comparable across versions.
//! Callers can override the system instruction via
//! [`crate::config::AskConfig::system_prompt`].

/// Default system instruction: answer using the supplied document.
///
/// Used when `AskConfig::system_prompt` is `None`.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that answers questions based on the supplied document.";

/// Header emitted before each PDF page's text.
///
/// `n` is the 1-indexed physical page number. The header is only ever emitted
/// together with extracted text — a page with nothing extractable contributes
/// neither header nor body.
pub fn page_header(n: usize) -> String {
    format!("--- Página {n} ---")
}

/// Assemble the user message: the whole document text followed by the literal
/// question. No windowing, no relevance filtering.
pub fn build_user_message(document_text: &str, question: &str) -> String {
    format!("{document_text}\n\nPregunta: {question}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_header_numbers_pages() {
        assert_eq!(page_header(1), "--- Página 1 ---");
        assert_eq!(page_header(42), "--- Página 42 ---");
    }

    #[test]
    fn user_message_is_document_then_question() {
        let msg = build_user_message("the document body", "who wrote it?");
        assert!(msg.starts_with("the document body"));
        assert!(msg.ends_with("Pregunta: who wrote it?"));
    }
}
