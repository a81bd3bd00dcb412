//! Merging recognised cells into a page's existing cells.
//!
//! A page read from a PDF may already carry cells from its text layer. Those
//! are exact, so they win: OCR cells that overlap any of them are dropped and
//! the remainder is appended after the existing cells.

use crate::page::TextCell;

/// Combines new OCR cells with a page's current cells.
///
/// The engine hands over both sequences in top-left page coordinates;
/// existing bottom-left cells are flipped first when the page size is known.
pub trait CellMerger: Send + Sync {
    fn merge(&self, ocr_cells: Vec<TextCell>, existing: Vec<TextCell>) -> Vec<TextCell>;
}

/// Keep existing cells, append OCR cells that overlap none of them.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlapFilterMerger;

impl CellMerger for OverlapFilterMerger {
    fn merge(&self, ocr_cells: Vec<TextCell>, mut existing: Vec<TextCell>) -> Vec<TextCell> {
        let kept: Vec<TextCell> = ocr_cells
            .into_iter()
            .filter(|ocr| {
                !existing
                    .iter()
                    .any(|cell| cell.bbox.intersection_area_with(&ocr.bbox) > 0.0)
            })
            .collect();
        existing.extend(kept);
        existing
    }
}
