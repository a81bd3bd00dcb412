//! Region encoding: `DynamicImage` → base64 JPEG wrapped in `ImageData`.
//!
//! Vision APIs accept images as base64 data URLs inside the JSON request
//! body. Regions are rendered at 3× magnification, so JPEG keeps the payload
//! small while the glyphs stay large enough to survive compression.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// MIME type of every encoded region.
pub const REGION_MIME_TYPE: &str = "image/jpeg";

/// Encode a rendered region as a base64 JPEG.
///
/// JPEG has no alpha channel, so the image is flattened to RGB first.
pub fn encode_region(img: &DynamicImage) -> Result<ImageData, image::ImageError> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buf = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)?;

    let b64 = STANDARD.encode(&buf);
    debug!(
        "Encoded {}x{} region → {} bytes base64",
        img.width(),
        img.height(),
        b64.len()
    );

    Ok(ImageData::new(b64, REGION_MIME_TYPE))
}

/// `data:` URL embedding an encoded image.
pub fn data_url(image: &ImageData) -> String {
    format!("data:{};base64,{}", image.mime_type, image.data)
}
