//! PDF page backend rendered through pdfium.
//!
//! pdfium is not async-safe, so every call here is blocking and the engine
//! runs it on tokio's blocking pool. A backend stores only the file path,
//! password and page index; each render opens the document afresh, which
//! keeps the backend `Send + Sync` without sharing pdfium handles.

use super::crop_rendered;
use crate::error::{BackendError, OcrError};
use crate::geometry::{BoundingBox, Size};
use crate::page::{Page, PageBackend};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One page of a PDF file.
pub struct PdfiumPageBackend {
    path: PathBuf,
    password: Option<String>,
    index: u16,
    size: Option<Size>,
    valid: bool,
}

impl PdfiumPageBackend {
    /// 0-indexed page within the document.
    pub fn index(&self) -> u16 {
        self.index
    }
}

fn bind() -> Result<Pdfium, String> {
    pdfium_auto::bind_pdfium_silent().map_err(|e| e.to_string())
}

impl PageBackend for PdfiumPageBackend {
    fn is_valid(&self) -> bool {
        self.valid
    }

    fn size(&self) -> Option<Size> {
        self.size
    }

    /// Embedded-image analysis is not performed; PDFs rely on
    /// `force_full_page_ocr` to be recognised.
    fn bitmap_rects(&self) -> Vec<BoundingBox> {
        Vec::new()
    }

    fn get_page_image(
        &self,
        scale: f64,
        cropbox: Option<&BoundingBox>,
    ) -> Result<DynamicImage, BackendError> {
        if !self.valid {
            return Err(BackendError::Invalid);
        }
        let size = self.size.ok_or(BackendError::Invalid)?;

        let pdfium = bind().map_err(BackendError::Render)?;
        let document = pdfium
            .load_pdf_from_file(&self.path, self.password.as_deref())
            .map_err(|e| BackendError::Render(format!("{:?}", e)))?;
        let page = document
            .pages()
            .get(self.index)
            .map_err(|e| BackendError::Render(format!("{:?}", e)))?;

        let render_config = PdfRenderConfig::new().scale_page_by_factor(scale as f32);
        let image = page
            .render_with_config(&render_config)
            .map_err(|e| BackendError::Render(format!("{:?}", e)))?
            .as_image();
        debug!(
            "Rendered page {} at {}x → {}x{} px",
            self.index as usize + 1,
            scale,
            image.width(),
            image.height()
        );

        match cropbox {
            None => Ok(image),
            Some(bbox) => {
                let bbox = bbox.to_top_left_origin(size.height);
                let px_per_unit = (
                    image.width() as f64 / size.width,
                    image.height() as f64 / size.height,
                );
                crop_rendered(&image, &bbox, px_per_unit)
            }
        }
    }
}

/// Open `pdf_path` and create one [`Page`] per PDF page.
///
/// Blocking; call from `spawn_blocking`. Pages pdfium cannot open are
/// still returned, with an invalid backend, so they pass through OCR.
pub fn load_pdf_pages(pdf_path: &Path, password: Option<&str>) -> Result<Vec<Page>, OcrError> {
    let pdfium = bind().map_err(OcrError::PdfiumBindingFailed)?;
    let document = pdfium
        .load_pdf_from_file(pdf_path, password)
        .map_err(|e| OcrError::PdfLoadFailed {
            path: pdf_path.to_path_buf(),
            detail: format!("{:?}", e),
        })?;

    let pages = document.pages();
    let total = pages.len();
    info!("PDF loaded: {} pages", total);

    let mut out = Vec::with_capacity(total as usize);
    for index in 0..total {
        let (size, valid) = match pages.get(index) {
            Ok(page) => (
                Some(Size::new(page.width().value as f64, page.height().value as f64)),
                true,
            ),
            Err(e) => {
                warn!("Page {} cannot be opened: {:?}", index as usize + 1, e);
                (None, false)
            }
        };
        let backend = PdfiumPageBackend {
            path: pdf_path.to_path_buf(),
            password: password.map(str::to_string),
            index,
            size,
            valid,
        };
        out.push(Page::new(index as usize).with_backend(Arc::new(backend)));
    }
    Ok(out)
}
