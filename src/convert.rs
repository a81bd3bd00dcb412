//! Whole-document entry points.
//!
//! These wrap the page stream for the common case of "OCR this file": resolve
//! the input, load its pages, drive [`crate::stream::process_pages`] and
//! collect per-page results and statistics. Page-level failures are reported
//! in the returned [`OcrOutput`], never as `Err`.

use crate::backend::pdfium::load_pdf_pages;
use crate::backend::raster::ImagePageBackend;
use crate::engine::LlmOcrModel;
use crate::error::OcrError;
use crate::output::{OcrOutput, OcrStats, PageOutput};
use crate::page::Page;
use crate::pipeline::input::{self, InputKind, ResolvedInput};
use crate::progress::ProgressCallback;
use crate::stream::process_pages;
use crate::timing::{ProfilingScope, TimeRecorder, Timings};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Timing key for opening the document and creating its pages.
pub const LOAD_TIMER_KEY: &str = "load";

/// Timeout for downloading URL inputs when none is given.
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 120;

/// Load every page of a resolved input.
///
/// PDFs yield one page per PDF page; images yield a single page.
///
/// # Errors
/// [`OcrError::PdfiumBindingFailed`], [`OcrError::PdfLoadFailed`] or
/// [`OcrError::UnsupportedInput`] when the file cannot be opened.
pub async fn load_pages(
    resolved: &ResolvedInput,
    password: Option<&str>,
) -> Result<Vec<Page>, OcrError> {
    let path = resolved.path().to_path_buf();
    match resolved.kind() {
        InputKind::Pdf => {
            let password = password.map(str::to_string);
            tokio::task::spawn_blocking(move || load_pdf_pages(&path, password.as_deref()))
                .await
                .map_err(|e| OcrError::Internal(format!("PDF load task panicked: {e}")))?
        }
        InputKind::Image => {
            let backend =
                tokio::task::spawn_blocking(move || ImagePageBackend::open(&path))
                    .await
                    .map_err(|e| OcrError::Internal(format!("image load task panicked: {e}")))??;
            Ok(vec![Page::new(0).with_backend(Arc::new(backend))])
        }
    }
}

/// OCR a PDF or image file (or HTTP(S) URL) with `engine`.
///
/// # Example
/// ```rust,no_run
/// use edgequake_ocr::{ocr_document, LlmOcrModel, LlmOcrOptions};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let options = LlmOcrOptions::builder()
///     .api_key("sk-...")
///     .api_url("http://localhost:8000/v1")
///     .force_full_page_ocr(true)
///     .build()?;
/// let engine = LlmOcrModel::new(true, options).await?;
/// let output = ocr_document("scan.png", &engine, None).await?;
/// for page in &output.pages {
///     println!("page {}: {} cells", page.page_num, page.cells.len());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn ocr_document(
    input: impl AsRef<str>,
    engine: &LlmOcrModel,
    callback: Option<ProgressCallback>,
) -> Result<OcrOutput, OcrError> {
    ocr_document_with(input, engine, callback, None, DEFAULT_DOWNLOAD_TIMEOUT_SECS).await
}

/// [`ocr_document`] with a PDF password and a download timeout for URLs.
pub async fn ocr_document_with(
    input: impl AsRef<str>,
    engine: &LlmOcrModel,
    callback: Option<ProgressCallback>,
    password: Option<&str>,
    download_timeout_secs: u64,
) -> Result<OcrOutput, OcrError> {
    let input = input.as_ref();
    info!("Starting OCR: {}", input);

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let resolved = input::resolve_input(input, download_timeout_secs).await?;
    ocr_resolved(&resolved, engine, callback, password).await
}

/// OCR an input that has already been resolved to a local file.
///
/// Lets a caller inspect [`ResolvedInput::kind`] before any page is loaded,
/// e.g. to provision pdfium only for PDFs.
pub async fn ocr_resolved(
    resolved: &ResolvedInput,
    engine: &LlmOcrModel,
    callback: Option<ProgressCallback>,
    password: Option<&str>,
) -> Result<OcrOutput, OcrError> {
    let total_start = Instant::now();

    // ── Step 2: Load pages ───────────────────────────────────────────────
    let timings = Arc::new(Timings::new());
    let pages = {
        let _timer =
            TimeRecorder::with_scope(&timings, LOAD_TIMER_KEY, ProfilingScope::Document);
        load_pages(resolved, password).await?
    };
    let total_pages = pages.len();
    info!("Loaded {} pages", total_pages);

    if let Some(ref cb) = callback {
        cb.on_document_start(total_pages);
    }

    // ── Step 3: Run the page stream ──────────────────────────────────────
    // Pass-through pages look identical to empty recognised ones on the way
    // out, so record up front which pages the engine will touch.
    let plan: Vec<bool> = pages.iter().map(|p| engine.will_process(p)).collect();

    let notify = callback.clone();
    let tagged = stream::iter(pages.into_iter().zip(plan.clone())).map(move |(page, will)| {
        if let Some(ref cb) = notify {
            if will {
                cb.on_page_start(page.page_num(), total_pages);
            }
        }
        page
    });

    let mut processed =
        process_pages(engine, tagged, Arc::clone(&timings)).zip(stream::iter(plan));

    // ── Step 4: Collect results as pages come out ────────────────────────
    let mut stats = OcrStats {
        total_pages,
        ..OcrStats::default()
    };
    let mut outputs = Vec::with_capacity(total_pages);

    while let Some((page, will)) = processed.next().await {
        let output = PageOutput::from_page(page, !will);
        if output.skipped {
            stats.skipped_pages += 1;
            if let Some(ref cb) = callback {
                cb.on_page_skipped(output.page_num, total_pages);
            }
        } else if let Some(ref e) = output.error {
            stats.failed_pages += 1;
            if let Some(ref cb) = callback {
                cb.on_page_error(output.page_num, total_pages, &e.to_string());
            }
        } else {
            stats.processed_pages += 1;
            if let Some(ref cb) = callback {
                cb.on_page_complete(output.page_num, total_pages, output.cells.len());
            }
        }
        stats.total_cells += output.cells.len();
        stats.ocr_cells += output.ocr_cell_count();
        outputs.push(output);
    }

    stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
    debug!("OCR stats: {:?}", stats);
    info!(
        "OCR complete: {}/{} pages recognised, {} skipped, {} failed, {}ms total",
        stats.processed_pages,
        total_pages,
        stats.skipped_pages,
        stats.failed_pages,
        stats.total_duration_ms
    );

    if let Some(ref cb) = callback {
        cb.on_document_complete(total_pages, stats.processed_pages);
    }

    Ok(OcrOutput {
        pages: outputs,
        stats,
        timings: timings.snapshot(),
    })
}
