//! Debug rendering: page image with OCR regions and cells outlined.
//!
//! Regions are drawn in grey, OCR cells in red. Output is diagnostic only;
//! the caller logs and ignores any error from here.

use crate::config::DebugSettings;
use crate::error::BackendError;
use crate::geometry::BoundingBox;
use crate::page::Page;
use image::{Rgba, RgbaImage};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

const REGION_COLOUR: Rgba<u8> = Rgba([128, 128, 128, 255]);
const CELL_COLOUR: Rgba<u8> = Rgba([220, 20, 60, 255]);

#[derive(Debug, Error)]
pub enum DebugRenderError {
    #[error("page has no backend")]
    NoBackend,
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("could not create '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Write `debug_ocr_page_NNNNN.png` for `page` and return its path.
pub fn draw_ocr_rects_and_cells(
    settings: &DebugSettings,
    page: &Page,
    regions: &[BoundingBox],
) -> Result<PathBuf, DebugRenderError> {
    let backend = page.backend().ok_or(DebugRenderError::NoBackend)?;
    let mut image = backend.get_page_image(1.0, None)?.to_rgba8();

    for region in regions {
        outline(&mut image, region, REGION_COLOUR);
    }
    for cell in page.cells.iter().filter(|c| c.from_ocr) {
        outline(&mut image, &cell.bbox, CELL_COLOUR);
    }

    std::fs::create_dir_all(&settings.output_dir).map_err(|source| DebugRenderError::Io {
        path: settings.output_dir.clone(),
        source,
    })?;
    let path = settings
        .output_dir
        .join(format!("debug_ocr_page_{:05}.png", page.page_num()));
    image.save(&path)?;
    debug!("Wrote OCR debug image {}", path.display());
    Ok(path)
}

/// Draw a 1-pixel rectangle outline, clipped to the image.
fn outline(image: &mut RgbaImage, bbox: &BoundingBox, colour: Rgba<u8>) {
    let (w, h) = (image.width(), image.height());
    if w == 0 || h == 0 {
        return;
    }
    let clamp = |v: f64, max: u32| (v.round().max(0.0) as u32).min(max - 1);
    let (x0, x1) = (clamp(bbox.l.min(bbox.r), w), clamp(bbox.l.max(bbox.r), w));
    let (y0, y1) = (clamp(bbox.t.min(bbox.b), h), clamp(bbox.t.max(bbox.b), h));

    for x in x0..=x1 {
        image.put_pixel(x, y0, colour);
        image.put_pixel(x, y1, colour);
    }
    for y in y0..=y1 {
        image.put_pixel(x0, y, colour);
        image.put_pixel(x1, y, colour);
    }
}
