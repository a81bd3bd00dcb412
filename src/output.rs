//! Output types for whole-document OCR runs.

use crate::error::PageError;
use crate::page::{Page, TextCell};
use crate::timing::ProfilingItem;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Result of one page after it left the OCR stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageOutput {
    /// 1-indexed page number.
    pub page_num: usize,
    /// Cells after merging, existing cells first.
    pub cells: Vec<TextCell>,
    /// Set when recognition was aborted; `cells` then holds the original cells.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<PageError>,
    /// The page was passed through without recognition.
    pub skipped: bool,
}

impl PageOutput {
    pub(crate) fn from_page(page: Page, skipped: bool) -> Self {
        Self {
            page_num: page.page_num(),
            cells: page.cells,
            error: page.error,
            skipped,
        }
    }

    /// Number of cells produced by OCR on this page.
    pub fn ocr_cell_count(&self) -> usize {
        self.cells.iter().filter(|c| c.from_ocr).count()
    }

    /// Cell texts in order, one per line.
    pub fn text(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Counters for a document run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrStats {
    pub total_pages: usize,
    pub processed_pages: usize,
    pub skipped_pages: usize,
    pub failed_pages: usize,
    /// Cells across all pages after merging.
    pub total_cells: usize,
    /// Of which produced by OCR.
    pub ocr_cells: usize,
    pub total_duration_ms: u64,
}

/// Everything [`crate::convert::ocr_document`] produces.
#[derive(Debug, Clone, Serialize)]
pub struct OcrOutput {
    pub pages: Vec<PageOutput>,
    pub stats: OcrStats,
    /// Phase timings keyed by name; OCR time is under `"ocr"`.
    pub timings: BTreeMap<String, ProfilingItem>,
}

impl OcrOutput {
    /// Plain text of the document: each page's cell texts, pages separated
    /// by a blank line. Pages without text are left out.
    pub fn text(&self) -> String {
        self.pages
            .iter()
            .map(PageOutput::text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoundingBox;
    use crate::pipeline::cells;

    fn page(page_num: usize, texts: &[&str]) -> PageOutput {
        let cells = texts
            .iter()
            .filter_map(|t| cells::synthesize(&BoundingBox::new(0.0, 0.0, 10.0, 10.0), t.to_string()))
            .collect();
        PageOutput {
            page_num,
            cells,
            error: None,
            skipped: false,
        }
    }

    #[test]
    fn document_text_skips_empty_pages() {
        let output = OcrOutput {
            pages: vec![page(1, &["a", "b"]), page(2, &[]), page(3, &["c"])],
            stats: OcrStats::default(),
            timings: BTreeMap::new(),
        };
        assert_eq!(output.text(), "a\nb\n\nc");
    }

    #[test]
    fn ocr_cell_count_ignores_programmatic_cells() {
        let mut p = page(1, &["scanned"]);
        p.cells.push(TextCell::programmatic(
            3,
            "native",
            BoundingBox::new(50.0, 50.0, 60.0, 60.0),
        ));
        assert_eq!(p.ocr_cell_count(), 1);
    }

    #[test]
    fn error_is_omitted_from_json_when_absent() {
        let json = serde_json::to_string(&page(1, &["x"])).unwrap();
        assert!(!json.contains("\"error\""));
        assert!(json.contains("\"page_num\":1"));
    }
}
