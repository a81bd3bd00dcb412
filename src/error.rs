//! Error types for the edgequake-ocr library.
//!
//! Three error types mirror the three places things can go wrong:
//!
//! * [`OcrError`] (fatal): the engine cannot be built or the document
//!   cannot be loaded (missing API key, unreachable endpoint, no model,
//!   unreadable input). Returned as `Err(OcrError)` from constructors and the
//!   top-level `ocr_*` functions.
//!
//! * [`PageError`] (non-fatal): recognition of one page failed part-way.
//!   Stored on the [`crate::page::Page`] itself; the stream moves on to the
//!   next page and the page keeps its original cells.
//!
//! * [`ClientError`]: a single remote call failed. Produced by
//!   [`crate::pipeline::client::VisionClient`] implementations and folded into
//!   one of the two types above by the caller.
//!
//! [`BackendError`] covers page rasterisation and is likewise folded into a
//! [`PageError`].

use std::path::PathBuf;
use thiserror::Error;

/// Fixed user-facing text for connection failures; the display text of
/// [`OcrError::ConnectionFailed`]. The low-level cause is kept as the error
/// source instead of being spliced into the message.
pub const CONNECTION_GUIDANCE: &str =
    "Failed to connect to the API. Please check your API key and API URL.";

/// All fatal errors returned by the edgequake-ocr library.
#[derive(Debug, Error)]
pub enum OcrError {
    // ── Configuration errors ──────────────────────────────────────────────
    /// Engine enabled without an API key.
    #[error("api_key is required.\nSet it with --api-key or LLM_OCR_API_KEY.")]
    MissingApiKey,

    /// Engine enabled without an API base URL.
    #[error("api_url is required.\nSet it with --api-url or LLM_OCR_API_URL (e.g. https://api.openai.com/v1).")]
    MissingApiUrl,

    /// No explicit model and the service did not report a usable one.
    #[error("No model found. Please check your configurations.")]
    NoModelAvailable {
        #[source]
        source: Option<ClientError>,
    },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Dependency errors ─────────────────────────────────────────────────
    /// The built-in remote client was compiled out.
    #[error(
        "The OpenAI-compatible client is not available in this build.\n\
Rebuild with `--features openai` to use this OCR engine, or construct the \
engine with `LlmOcrModel::with_client` and supply your own client \
(for example an edgequake-llm provider via `ProviderClient`)."
    )]
    ClientUnavailable,

    // ── Connectivity errors ───────────────────────────────────────────────
    /// The client handle could not be created for the given key and URL.
    #[error("{guidance}", guidance = CONNECTION_GUIDANCE)]
    ConnectionFailed {
        #[source]
        source: ClientError,
    },

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// The file is neither a PDF nor a decodable image.
    #[error("Unsupported input '{path}': not a PDF and not a readable image ({detail})")]
    UnsupportedInput { path: PathBuf, detail: String },

    /// PDF could not be opened by pdfium.
    #[error("PDF '{path}' could not be opened: {detail}")]
    PdfLoadFailed { path: PathBuf, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDFium is normally downloaded automatically on first run.\n\
If the auto-download failed, set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single page.
///
/// The first failing region aborts the rest of its page; the page is still
/// emitted, with its original cells and this error attached.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// Rasterising a region failed.
    #[error("Page {page}: rendering region {region} failed: {detail}")]
    RenderFailed {
        page: usize,
        region: usize,
        detail: String,
    },

    /// Encoding a rendered region failed.
    #[error("Page {page}: encoding region {region} failed: {detail}")]
    EncodeFailed {
        page: usize,
        region: usize,
        detail: String,
    },

    /// The remote call for a region failed.
    #[error("Page {page}: recognition of region {region} failed: {detail}")]
    RecognitionFailed {
        page: usize,
        region: usize,
        detail: String,
    },
}

impl PageError {
    /// 1-indexed page number the error refers to.
    pub fn page(&self) -> usize {
        match self {
            PageError::RenderFailed { page, .. }
            | PageError::EncodeFailed { page, .. }
            | PageError::RecognitionFailed { page, .. } => *page,
        }
    }
}

/// Failure of a single call to the remote vision service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP client could not be built (bad URL, TLS backend, ...).
    #[error("client setup failed: {0}")]
    Setup(String),

    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The response contained no completion choice.
    #[error("response contained no choices")]
    EmptyResponse,

    /// A provider-level failure reported by edgequake-llm.
    #[error("provider error: {0}")]
    Provider(String),
}

/// Failure inside a [`crate::page::PageBackend`].
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend no longer has a usable source (closed, corrupt, unbound).
    #[error("page backend is not valid")]
    Invalid,

    /// The requested crop lies outside the rendered page.
    #[error("crop box {0:?} is outside the page")]
    CropOutOfBounds((f64, f64, f64, f64)),

    /// The rasteriser reported an error.
    #[error("rendering failed: {0}")]
    Render(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn connection_failed_keeps_fixed_message_and_cause() {
        let e = OcrError::ConnectionFailed {
            source: ClientError::Setup("relative URL without a base".into()),
        };
        assert_eq!(e.to_string(), CONNECTION_GUIDANCE);
        let cause = e.source().expect("cause preserved");
        assert!(cause.to_string().contains("relative URL"));
    }

    #[test]
    fn missing_key_is_actionable() {
        let msg = OcrError::MissingApiKey.to_string();
        assert!(msg.contains("api_key is required"), "got: {msg}");
        assert!(msg.contains("LLM_OCR_API_KEY"));
    }

    #[test]
    fn client_unavailable_names_remedy() {
        let msg = OcrError::ClientUnavailable.to_string();
        assert!(msg.contains("--features openai"), "got: {msg}");
    }

    #[test]
    fn page_error_reports_page_number() {
        let e = PageError::RecognitionFailed {
            page: 4,
            region: 1,
            detail: "HTTP 500".into(),
        };
        assert_eq!(e.page(), 4);
        assert!(e.to_string().starts_with("Page 4"));
    }
}
