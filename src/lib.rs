//! # edgequake-ocr
//!
//! An OCR stage for document-conversion pipelines that hands text
//! recognition to a remote vision-language model (any OpenAI-compatible
//! `/chat/completions` endpoint) instead of a local OCR engine.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Page stream
//!  │
//!  ├─ 1. Regions  bitmap areas worth recognising (or the full page)
//!  ├─ 2. Render   crop each region at 3× on the blocking pool
//!  ├─ 3. Encode   RGB → JPEG → base64 data URL
//!  ├─ 4. VLM      one chat completion per region, sequentially
//!  ├─ 5. Cells    one TextCell per region, confidence 1.0
//!  └─ 6. Merge    append OCR cells that don't overlap existing text
//! ```
//!
//! Pages are pulled lazily and come out in input order. A region failure
//! aborts only its page, which is emitted with its original cells and a
//! [`PageError`] attached.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_ocr::{ocr_document, LlmOcrModel, LlmOcrOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = LlmOcrOptions::builder()
//!         .api_key(std::env::var("LLM_OCR_API_KEY")?)
//!         .api_url("https://api.openai.com/v1")
//!         .model("gpt-4o-mini")
//!         .force_full_page_ocr(true)
//!         .build()?;
//!     let engine = LlmOcrModel::new(true, options).await?;
//!     let output = ocr_document("scan.pdf", &engine, None).await?;
//!     println!("{}", output.text());
//!     eprintln!(
//!         "{}/{} pages recognised",
//!         output.stats.processed_pages, output.stats.total_pages
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature   | Default | Description |
//! |-----------|---------|-------------|
//! | `cli`     | on      | Enables the `vlm-ocr` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `openai`  | on      | Built-in OpenAI-compatible HTTP client used by [`LlmOcrModel::new`] |
//! | `bundled` | off     | Embeds the pdfium library in the binary instead of downloading it on first use |
//!
//! Without `openai`, [`LlmOcrModel::new`] fails with
//! [`OcrError::ClientUnavailable`]; supply a client through
//! [`LlmOcrModel::with_client`] instead (for example a [`ProviderClient`]).

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod output;
pub mod page;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod stream;
pub mod timing;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::pdfium::PdfiumPageBackend;
pub use backend::raster::ImagePageBackend;
pub use config::{DebugSettings, LlmOcrOptions, LlmOcrOptionsBuilder};
pub use convert::{load_pages, ocr_document, ocr_document_with, ocr_resolved};
pub use engine::{LlmOcrModel, OCR_SCALE, OCR_TIMER_KEY};
pub use error::{BackendError, ClientError, OcrError, PageError};
pub use geometry::{BoundingBox, CoordOrigin, Size};
pub use output::{OcrOutput, OcrStats, PageOutput};
pub use page::{Page, PageBackend, TextCell};
pub use pipeline::cells::OCR_CONFIDENCE;
pub use pipeline::client::VisionClient;
pub use pipeline::input::{resolve_input, InputKind, ResolvedInput};
pub use pipeline::merge::{CellMerger, OverlapFilterMerger};
#[cfg(feature = "openai")]
pub use pipeline::openai::OpenAiClient;
pub use pipeline::provider::ProviderClient;
pub use pipeline::regions::{BitmapRegionSelector, RegionSelector};
pub use progress::{NoopProgressCallback, OcrProgressCallback, ProgressCallback};
pub use stream::{process_page_iter, process_pages, PageStream};
pub use timing::{ProfilingItem, ProfilingScope, TimeRecorder, Timings};
