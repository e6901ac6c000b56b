//! Document text extraction: PDF and plain text in, one `String` out.
//!
//! ## Pipeline position
//!
//! ```text
//! path / bytes ──► format sniff ──► extract ──► page assembly ──► String
//! ```
//!
//! PDFs go through `pdf-extract`, which reads the text layer embedded in the
//! file. Scanned PDFs with no text layer therefore come back (near) empty —
//! there is no OCR fallback, and that is deliberate: a silent garbage answer
//! is worse than an obviously empty document.
//!
//! Each PDF page that yields text is rendered as a `--- Página N ---` header
//! followed by the page's text; pages with nothing extractable are omitted
//! entirely, header included, so page numbers in the output always refer to
//! physical pages that actually said something. Plain-text sources are passed
//! through byte-for-byte after UTF-8 validation.
//!
//! Extraction from a path is memoised process-wide, keyed on the path plus
//! its modification time. Re-loading the same unchanged file is free; touching
//! the file invalidates its entry.

use crate::error::DocAskError;
use crate::prompts::page_header;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;
use tracing::{debug, info};

// ── Source format ────────────────────────────────────────────────────────

/// The two document formats the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Pdf,
    PlainText,
}

impl SourceFormat {
    /// Resolve a declared MIME type.
    pub fn from_mime(mime: &str) -> Result<Self, DocAskError> {
        match mime {
            "application/pdf" => Ok(Self::Pdf),
            "text/plain" => Ok(Self::PlainText),
            other => Err(DocAskError::UnsupportedFormat {
                mime: other.to_string(),
            }),
        }
    }

    /// Resolve a format from content and path: the `%PDF` magic wins, then
    /// the file extension. Anything else is treated as plain text, which the
    /// UTF-8 check downstream will reject if it is actually binary.
    pub fn sniff(bytes: &[u8], path: &Path) -> Self {
        if bytes.starts_with(b"%PDF") {
            return Self::Pdf;
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => Self::Pdf,
            _ => Self::PlainText,
        }
    }
}

// ── Extraction ───────────────────────────────────────────────────────────

/// Extract text from in-memory document bytes.
///
/// The returned `Arc<str>` is shared cheaply between the session, the cache,
/// and any prompt built from it.
pub fn extract_from_bytes(bytes: &[u8], format: SourceFormat) -> Result<Arc<str>, DocAskError> {
    match format {
        SourceFormat::Pdf => extract_pdf(bytes),
        SourceFormat::PlainText => extract_plain_text(bytes),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<Arc<str>, DocAskError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes).map_err(|e| {
        DocAskError::ExtractionFailed {
            detail: e.to_string(),
        }
    })?;
    debug!("PDF parsed: {} physical pages", pages.len());
    Ok(assemble_pages(&pages).into())
}

fn extract_plain_text(bytes: &[u8]) -> Result<Arc<str>, DocAskError> {
    let text = std::str::from_utf8(bytes).map_err(|e| DocAskError::InvalidUtf8 {
        offset: e.valid_up_to(),
    })?;
    Ok(text.into())
}

/// Join per-page text into one document string.
///
/// Pages are numbered by physical position (1-indexed); blank pages
/// contribute nothing, not even their header.
fn assemble_pages(pages: &[String]) -> String {
    let mut out = String::new();
    for (i, text) in pages.iter().enumerate() {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }
        out.push_str(&page_header(i + 1));
        out.push('\n');
        out.push_str(trimmed);
        out.push('\n');
    }
    out
}

// ── Path loading with cache ──────────────────────────────────────────────

type CacheKey = (PathBuf, SystemTime);

static EXTRACTION_CACHE: Lazy<Mutex<HashMap<CacheKey, Arc<str>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Extract text from a file on disk, consulting the process-wide cache.
///
/// The cache key is `(path as given, mtime)`: editing the file naturally
/// invalidates its entry, while repeated loads of an unchanged file reuse the
/// extracted text. The path is not canonicalised, so two spellings of the
/// same file cache independently.
pub fn extract_from_path(path: &Path) -> Result<Arc<str>, DocAskError> {
    let meta = std::fs::metadata(path).map_err(|e| io_error(e, path))?;
    let mtime = meta.modified().map_err(|e| io_error(e, path))?;
    let key = (path.to_path_buf(), mtime);

    load_cached(key, || {
        let bytes = std::fs::read(path).map_err(|e| io_error(e, path))?;
        let format = SourceFormat::sniff(&bytes, path);
        info!(
            "Extracting '{}' ({:?}, {} bytes)",
            path.display(),
            format,
            bytes.len()
        );
        extract_from_bytes(&bytes, format)
    })
}

/// Cache lookup around a loader closure. Split out so tests can count loader
/// invocations with fabricated keys.
fn load_cached<F>(key: CacheKey, loader: F) -> Result<Arc<str>, DocAskError>
where
    F: FnOnce() -> Result<Arc<str>, DocAskError>,
{
    if let Ok(cache) = EXTRACTION_CACHE.lock() {
        if let Some(text) = cache.get(&key) {
            debug!("Extraction cache hit for '{}'", key.0.display());
            return Ok(Arc::clone(text));
        }
    }
    let text = loader()?;
    if let Ok(mut cache) = EXTRACTION_CACHE.lock() {
        cache.insert(key, Arc::clone(&text));
    }
    Ok(text)
}

fn io_error(e: io::Error, path: &Path) -> DocAskError {
    match e.kind() {
        io::ErrorKind::NotFound => DocAskError::FileNotFound {
            path: path.to_path_buf(),
        },
        io::ErrorKind::PermissionDenied => DocAskError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => DocAskError::ExtractionFailed {
            detail: e.to_string(),
        },
    }
}
