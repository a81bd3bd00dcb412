//! Cell synthesis: one recognised region → one text cell.

use crate::geometry::{BoundingBox, CoordOrigin};
use crate::page::TextCell;

/// Confidence given to every OCR cell.
///
/// Vision LLMs return text without calibrated scores, so OCR cells carry the
/// maximum value rather than a measurement.
pub const OCR_CONFIDENCE: f32 = 1.0;

/// Build the cell for `region` from the model's verbatim output.
///
/// Returns `None` for an empty response. The text is not trimmed or
/// otherwise altered.
pub fn synthesize(region: &BoundingBox, text: String) -> Option<TextCell> {
    if text.is_empty() {
        return None;
    }
    Some(TextCell {
        // A region produces a single cell; cells of one page are siblings.
        id: 0,
        text,
        confidence: OCR_CONFIDENCE,
        bbox: BoundingBox::from_tuple(region.as_tuple(), CoordOrigin::TopLeft),
        from_ocr: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_copies_region_geometry() {
        let region = BoundingBox::new(10.0, 20.0, 300.0, 400.0);
        let cell = synthesize(&region, "Hello".into()).unwrap();
        assert_eq!(cell.id, 0);
        assert_eq!(cell.confidence, OCR_CONFIDENCE);
        assert!(cell.from_ocr);
        assert_eq!(cell.bbox.coord_origin, CoordOrigin::TopLeft);
        assert_eq!(cell.bbox.as_tuple(), region.as_tuple());
    }

    #[test]
    fn empty_text_yields_no_cell() {
        let region = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        assert!(synthesize(&region, String::new()).is_none());
    }

    #[test]
    fn text_is_kept_verbatim() {
        let region = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let cell = synthesize(&region, "  line one\nline two \n".into()).unwrap();
        assert_eq!(cell.text, "  line one\nline two \n");
    }
}
