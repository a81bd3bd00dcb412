//! The vision-LLM OCR engine: construction and per-page processing.
//!
//! ## Construction
//!
//! An enabled engine validates its options, creates the client handle and
//! fixes the model identifier before any page is seen, so misconfiguration
//! fails the pipeline at build time instead of producing empty output later.
//! A disabled engine does none of this and passes pages through unchanged.
//!
//! ## Per page
//!
//! ```text
//! page ──▶ regions ──▶ drop zero-area ──▶ render ×3 ──▶ JPEG/base64 ──▶ VLM
//!                                                                      │
//! page.cells ◀── merge(existing, ocr cells) ◀── one cell per region ◀──┘
//! ```
//!
//! Regions are handled strictly one after another. The first failing region
//! aborts its page: the page keeps its original cells, gets a
//! [`PageError`] attached and the caller moves on to the next page.

use crate::config::LlmOcrOptions;
use crate::error::{OcrError, PageError};
use crate::geometry::BoundingBox;
use crate::page::{Page, PageBackend, TextCell};
use crate::pipeline::cells;
use crate::pipeline::client::VisionClient;
use crate::pipeline::debug::draw_ocr_rects_and_cells;
use crate::pipeline::encode::encode_region;
use crate::pipeline::merge::{CellMerger, OverlapFilterMerger};
use crate::pipeline::regions::{BitmapRegionSelector, RegionSelector};
use crate::timing::{TimeRecorder, Timings};
use image::DynamicImage;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Magnification applied when rasterising a region (3 × 72 dpi = 216 dpi).
pub const OCR_SCALE: f64 = 3.0;

/// Timing key under which recognition and merge time is recorded.
pub const OCR_TIMER_KEY: &str = "ocr";

/// Live connection to the remote service.
#[derive(Clone)]
struct Remote {
    client: Arc<dyn VisionClient>,
    model: String,
}

/// OCR stage backed by a remote vision model.
///
/// Cloning is cheap; clones share the client handle.
#[derive(Clone)]
pub struct LlmOcrModel {
    enabled: bool,
    options: Arc<LlmOcrOptions>,
    remote: Option<Remote>,
    selector: Arc<dyn RegionSelector>,
    merger: Arc<dyn CellMerger>,
}

impl LlmOcrModel {
    /// Build the engine with the built-in OpenAI-compatible client.
    ///
    /// # Errors
    /// When `enabled`: [`OcrError::MissingApiKey`], [`OcrError::MissingApiUrl`],
    /// [`OcrError::ClientUnavailable`] (built without the `openai` feature),
    /// [`OcrError::ConnectionFailed`] and [`OcrError::NoModelAvailable`].
    pub async fn new(enabled: bool, options: LlmOcrOptions) -> Result<Self, OcrError> {
        if !enabled {
            return Ok(Self::disabled(options));
        }
        let (api_key, api_url) = validate(&options)?;
        let client = default_client(api_key, api_url, &options)?;
        Self::connect(options, client).await
    }

    /// Build the engine around a caller-supplied client.
    ///
    /// Options are validated exactly as in [`LlmOcrModel::new`]; the client
    /// is only contacted to resolve the model when none is configured.
    pub async fn with_client(
        enabled: bool,
        options: LlmOcrOptions,
        client: Arc<dyn VisionClient>,
    ) -> Result<Self, OcrError> {
        if !enabled {
            return Ok(Self::disabled(options));
        }
        validate(&options)?;
        Self::connect(options, client).await
    }

    fn disabled(options: LlmOcrOptions) -> Self {
        debug!("LLM OCR engine disabled; pages pass through unchanged");
        Self::assemble(false, options, None)
    }

    async fn connect(
        options: LlmOcrOptions,
        client: Arc<dyn VisionClient>,
    ) -> Result<Self, OcrError> {
        let model = match options.model.as_deref().filter(|m| !m.is_empty()) {
            Some(model) => model.to_string(),
            None => {
                let resolved = client
                    .resolve_default_model()
                    .await
                    .map_err(|e| OcrError::NoModelAvailable { source: Some(e) })?;
                let model = resolved.ok_or(OcrError::NoModelAvailable { source: None })?;
                info!("No model configured; using first reported model '{}'", model);
                model
            }
        };
        info!("LLM OCR engine ready (model '{}')", model);
        Ok(Self::assemble(true, options, Some(Remote { client, model })))
    }

    fn assemble(enabled: bool, options: LlmOcrOptions, remote: Option<Remote>) -> Self {
        let selector = Arc::new(BitmapRegionSelector::new(
            options.force_full_page_ocr,
            options.bitmap_area_threshold,
        ));
        Self {
            enabled,
            options: Arc::new(options),
            remote,
            selector,
            merger: Arc::new(OverlapFilterMerger),
        }
    }

    /// Replace the default [`BitmapRegionSelector`].
    pub fn with_region_selector(mut self, selector: Arc<dyn RegionSelector>) -> Self {
        self.selector = selector;
        self
    }

    /// Replace the default [`OverlapFilterMerger`].
    pub fn with_cell_merger(mut self, merger: Arc<dyn CellMerger>) -> Self {
        self.merger = merger;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Model identifier in use; `None` for a disabled engine.
    pub fn model(&self) -> Option<&str> {
        self.remote.as_ref().map(|r| r.model.as_str())
    }

    pub fn options(&self) -> &LlmOcrOptions {
        &self.options
    }

    /// `true` when `page` will be recognised rather than passed through.
    pub fn will_process(&self, page: &Page) -> bool {
        self.enabled && self.remote.is_some() && page.has_valid_backend()
    }

    /// Recognise one page and return it.
    ///
    /// Pages the engine will not process come back untouched and untimed.
    pub async fn process_page(&self, mut page: Page, timings: &Timings) -> Page {
        let (Some(remote), Some(backend)) = (self.remote.as_ref(), page.backend().cloned())
        else {
            return page;
        };
        if !self.will_process(&page) {
            debug!("Page {}: backend invalid, passing through", page.page_num());
            return page;
        }

        let regions = {
            let _timer = TimeRecorder::new(timings, OCR_TIMER_KEY);
            let regions = self.selector.regions(&page);
            debug!("Page {}: {} candidate regions", page.page_num(), regions.len());

            match self.recognize_regions(&page, backend, &regions, remote).await {
                Ok(ocr_cells) => {
                    let existing = to_top_left(std::mem::take(&mut page.cells), &page);
                    page.cells = self.merger.merge(ocr_cells, existing);
                }
                Err(e) => {
                    warn!("{}", e);
                    page.error = Some(e);
                }
            }
            regions
        };

        if self.options.debug.visualize_ocr && page.error.is_none() {
            self.draw_debug(&page, regions).await;
        }

        page
    }

    /// Recognise every non-degenerate region in order.
    async fn recognize_regions(
        &self,
        page: &Page,
        backend: Arc<dyn PageBackend>,
        regions: &[BoundingBox],
        remote: &Remote,
    ) -> Result<Vec<TextCell>, PageError> {
        let page_num = page.page_num();
        let mut ocr_cells = Vec::new();

        for (idx, region) in regions.iter().enumerate() {
            let region_num = idx + 1;
            if region.area() == 0.0 {
                debug!("Page {}: skipping zero-area region {}", page_num, region_num);
                continue;
            }

            let image = render_region(Arc::clone(&backend), *region)
                .await
                .map_err(|detail| PageError::RenderFailed {
                    page: page_num,
                    region: region_num,
                    detail,
                })?;

            let encoded = encode_region(&image).map_err(|e| PageError::EncodeFailed {
                page: page_num,
                region: region_num,
                detail: e.to_string(),
            })?;
            drop(image);

            let text = remote
                .client
                .recognize(&remote.model, &self.options.prompt, &encoded)
                .await
                .map_err(|e| PageError::RecognitionFailed {
                    page: page_num,
                    region: region_num,
                    detail: e.to_string(),
                })?;
            debug!(
                "Page {}: region {} → {} chars",
                page_num,
                region_num,
                text.len()
            );

            if let Some(cell) = cells::synthesize(region, text) {
                ocr_cells.push(cell);
            }
        }

        Ok(ocr_cells)
    }

    async fn draw_debug(&self, page: &Page, regions: Vec<BoundingBox>) {
        let settings = self.options.debug.clone();
        let page = page.clone();
        let result =
            tokio::task::spawn_blocking(move || draw_ocr_rects_and_cells(&settings, &page, &regions))
                .await;
        match result {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!("OCR debug rendering failed: {}", e),
            Err(e) => warn!("OCR debug rendering task failed: {}", e),
        }
    }
}

/// Rasterise `region` at [`OCR_SCALE`] on the blocking pool.
async fn render_region(
    backend: Arc<dyn PageBackend>,
    region: BoundingBox,
) -> Result<DynamicImage, String> {
    tokio::task::spawn_blocking(move || backend.get_page_image(OCR_SCALE, Some(&region)))
        .await
        .map_err(|e| format!("render task panicked: {e}"))?
        .map_err(|e| e.to_string())
}

/// Re-express `cells` in the page's top-left frame, the frame OCR cells use.
/// Without a page size bottom-left cells cannot be flipped and stay as-is.
fn to_top_left(mut cells: Vec<TextCell>, page: &Page) -> Vec<TextCell> {
    if let Some(size) = page.size {
        for cell in &mut cells {
            cell.bbox = cell.bbox.to_top_left_origin(size.height);
        }
    }
    cells
}

/// Presence checks for an enabled engine, in order: key, then URL.
fn validate(options: &LlmOcrOptions) -> Result<(&str, &str), OcrError> {
    let api_key = options.api_key().ok_or(OcrError::MissingApiKey)?;
    let api_url = options.api_url().ok_or(OcrError::MissingApiUrl)?;
    Ok((api_key, api_url))
}

#[cfg(feature = "openai")]
fn default_client(
    api_key: &str,
    api_url: &str,
    options: &LlmOcrOptions,
) -> Result<Arc<dyn VisionClient>, OcrError> {
    use crate::pipeline::openai::OpenAiClient;
    use std::time::Duration;

    let client = OpenAiClient::new(
        api_key,
        api_url,
        Duration::from_secs(options.request_timeout_secs),
    )
    .map_err(|source| OcrError::ConnectionFailed { source })?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "openai"))]
fn default_client(
    _api_key: &str,
    _api_url: &str,
    _options: &LlmOcrOptions,
) -> Result<Arc<dyn VisionClient>, OcrError> {
    Err(OcrError::ClientUnavailable)
}
