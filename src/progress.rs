//! Progress-callback trait for per-page OCR events.
//!
//! Pass an [`Arc<dyn OcrProgressCallback>`] to
//! [`crate::convert::ocr_document`] to receive events as each page leaves the
//! OCR stream. Callers can forward them to a terminal progress bar, a channel
//! or a log without the library knowing how.
//!
//! # Example
//!
//! ```rust
//! use edgequake_ocr::OcrProgressCallback;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct CellCounter {
//!     cells: AtomicUsize,
//! }
//!
//! impl OcrProgressCallback for CellCounter {
//!     fn on_page_complete(&self, _page_num: usize, _total_pages: usize, cell_count: usize) {
//!         self.cells.fetch_add(cell_count, Ordering::SeqCst);
//!     }
//! }
//! ```

use std::sync::Arc;

/// Called by [`crate::convert::ocr_document`] as pages are processed.
///
/// All methods default to no-ops so callers override only what they need.
/// Page numbers are 1-indexed.
pub trait OcrProgressCallback: Send + Sync {
    /// Called once before the first page, with the number of pages.
    fn on_document_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called before a page is recognised.
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page was recognised and merged.
    ///
    /// `cell_count` is the page's cell count after the merge.
    fn on_page_complete(&self, page_num: usize, total_pages: usize, cell_count: usize) {
        let _ = (page_num, total_pages, cell_count);
    }

    /// Called when a page passed through unprocessed (engine disabled or the
    /// page cannot be rendered).
    fn on_page_skipped(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when recognition of a page was aborted.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once after the last page.
    ///
    /// `success_count` counts recognised pages, excluding skipped and failed ones.
    fn on_document_complete(&self, total_pages: usize, success_count: usize) {
        let _ = (total_pages, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl OcrProgressCallback for NoopProgressCallback {}

/// Convenience alias for a shared callback.
pub type ProgressCallback = Arc<dyn OcrProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        skips: AtomicUsize,
        errors: AtomicUsize,
    }

    impl OcrProgressCallback for TrackingCallback {
        fn on_page_start(&self, _page_num: usize, _total_pages: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_complete(&self, _page_num: usize, _total_pages: usize, _cell_count: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_skipped(&self, _page_num: usize, _total_pages: usize) {
            self.skips.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_error(&self, _page_num: usize, _total_pages: usize, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_document_start(3);
        cb.on_page_start(1, 3);
        cb.on_page_complete(1, 3, 7);
        cb.on_page_skipped(2, 3);
        cb.on_page_error(3, 3, "HTTP 500");
        cb.on_document_complete(3, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_page_start(1, 3);
        tracker.on_page_complete(1, 3, 2);
        tracker.on_page_skipped(2, 3);
        tracker.on_page_start(3, 3);
        tracker.on_page_error(3, 3, "timeout");

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.skips.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_document_start(10);
        cb.on_page_complete(1, 10, 0);
    }
}
