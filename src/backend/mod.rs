//! Page backends: the rasterisation capability behind each [`crate::page::Page`].
//!
//! * [`raster::ImagePageBackend`]: a decoded raster (PNG, JPEG); the whole
//!   image counts as one bitmap, so it is always recognised in full.
//! * [`pdfium::PdfiumPageBackend`]: one page of a PDF rendered through
//!   pdfium on demand.

pub mod raster;
pub mod pdfium;

use crate::error::BackendError;
use crate::geometry::BoundingBox;
use image::DynamicImage;

/// Crop `cropbox` (page units, top-left origin) out of `rendered`, where one
/// page unit spans `px_per_unit` pixels in each direction.
///
/// The crop is widened to whole pixels and clipped to the image.
pub(crate) fn crop_rendered(
    rendered: &DynamicImage,
    cropbox: &BoundingBox,
    px_per_unit: (f64, f64),
) -> Result<DynamicImage, BackendError> {
    let (sx, sy) = px_per_unit;
    let (w, h) = (rendered.width() as f64, rendered.height() as f64);

    let x0 = (cropbox.l.min(cropbox.r) * sx).floor().clamp(0.0, w);
    let x1 = (cropbox.l.max(cropbox.r) * sx).ceil().clamp(0.0, w);
    let y0 = (cropbox.t.min(cropbox.b) * sy).floor().clamp(0.0, h);
    let y1 = (cropbox.t.max(cropbox.b) * sy).ceil().clamp(0.0, h);

    if x1 <= x0 || y1 <= y0 {
        return Err(BackendError::CropOutOfBounds(cropbox.as_tuple()));
    }

    Ok(rendered.crop_imm(x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_scales_and_clips() {
        let img = DynamicImage::new_rgb8(300, 300);
        let crop = crop_rendered(&img, &BoundingBox::new(10.0, 20.0, 200.0, 50.0), (3.0, 3.0))
            .unwrap();
        assert_eq!((crop.width(), crop.height()), (270, 90));
    }

    #[test]
    fn crop_outside_image_fails() {
        let img = DynamicImage::new_rgb8(100, 100);
        let err = crop_rendered(&img, &BoundingBox::new(200.0, 200.0, 300.0, 300.0), (1.0, 1.0));
        assert!(matches!(err, Err(BackendError::CropOutOfBounds(_))));
    }
}
