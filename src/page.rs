//! Pages, text cells and the backend contract pages are rasterised through.

use crate::error::{BackendError, PageError};
use crate::geometry::{BoundingBox, Size};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A piece of text with its location on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextCell {
    /// Identity within the producing region. OCR cells always use `0`.
    pub id: usize,
    pub text: String,
    /// `1.0` for OCR cells; the remote model reports no confidence.
    pub confidence: f32,
    pub bbox: BoundingBox,
    /// `true` when the cell was produced by recognition rather than read
    /// from the document's text layer.
    #[serde(default)]
    pub from_ocr: bool,
}

impl TextCell {
    /// A cell read from the document itself.
    pub fn programmatic(id: usize, text: impl Into<String>, bbox: BoundingBox) -> Self {
        Self {
            id,
            text: text.into(),
            confidence: 1.0,
            bbox,
            from_ocr: false,
        }
    }
}

/// Rasterisation capability behind a page.
///
/// Implementations are shared between the stream and the blocking pool, so
/// they must be `Send + Sync`.
pub trait PageBackend: Send + Sync {
    /// `false` when the page cannot be rendered at all. Invalid pages pass
    /// through OCR untouched.
    fn is_valid(&self) -> bool;

    /// Page size in page units (72 per inch for PDFs, pixels for images).
    fn size(&self) -> Option<Size>;

    /// Rectangles covered by embedded bitmaps, top-left origin.
    fn bitmap_rects(&self) -> Vec<BoundingBox>;

    /// Rasterise `cropbox` (whole page when `None`) magnified by `scale`
    /// relative to 72 units per inch.
    fn get_page_image(
        &self,
        scale: f64,
        cropbox: Option<&BoundingBox>,
    ) -> Result<DynamicImage, BackendError>;
}

/// One page travelling through the pipeline.
#[derive(Clone)]
pub struct Page {
    /// 0-indexed position in the document.
    pub page_no: usize,
    pub size: Option<Size>,
    pub cells: Vec<TextCell>,
    /// Set when recognition of this page was aborted.
    pub error: Option<PageError>,
    backend: Option<Arc<dyn PageBackend>>,
}

impl Page {
    pub fn new(page_no: usize) -> Self {
        Self {
            page_no,
            size: None,
            cells: Vec::new(),
            error: None,
            backend: None,
        }
    }

    /// Attach a backend; the page size is taken from it unless already set.
    pub fn with_backend(mut self, backend: Arc<dyn PageBackend>) -> Self {
        if self.size.is_none() {
            self.size = backend.size();
        }
        self.backend = Some(backend);
        self
    }

    pub fn with_cells(mut self, cells: Vec<TextCell>) -> Self {
        self.cells = cells;
        self
    }

    pub fn backend(&self) -> Option<&Arc<dyn PageBackend>> {
        self.backend.as_ref()
    }

    /// `true` when a backend is attached and reports itself usable.
    pub fn has_valid_backend(&self) -> bool {
        self.backend.as_ref().is_some_and(|b| b.is_valid())
    }

    /// 1-indexed page number, as used in messages.
    pub fn page_num(&self) -> usize {
        self.page_no + 1
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("page_no", &self.page_no)
            .field("size", &self.size)
            .field("cells", &self.cells)
            .field("error", &self.error)
            .field("backend", &self.backend.as_ref().map(|_| "<dyn PageBackend>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedBackend {
        valid: bool,
    }

    impl PageBackend for FixedBackend {
        fn is_valid(&self) -> bool {
            self.valid
        }

        fn size(&self) -> Option<Size> {
            Some(Size::new(612.0, 792.0))
        }

        fn bitmap_rects(&self) -> Vec<BoundingBox> {
            Vec::new()
        }

        fn get_page_image(
            &self,
            _scale: f64,
            _cropbox: Option<&BoundingBox>,
        ) -> Result<DynamicImage, BackendError> {
            Err(BackendError::Invalid)
        }
    }

    #[test]
    fn page_without_backend_is_invalid() {
        let page = Page::new(0);
        assert!(!page.has_valid_backend());
        assert_eq!(page.page_num(), 1);
    }

    #[test]
    fn backend_supplies_size() {
        let page = Page::new(2).with_backend(Arc::new(FixedBackend { valid: true }));
        assert!(page.has_valid_backend());
        assert_eq!(page.size, Some(Size::new(612.0, 792.0)));
    }

    #[test]
    fn invalid_backend_is_reported() {
        let page = Page::new(0).with_backend(Arc::new(FixedBackend { valid: false }));
        assert!(!page.has_valid_backend());
    }
}
