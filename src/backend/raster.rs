//! Raster page backend: a PNG or JPEG treated as a single page.
//!
//! The page size equals the pixel size, i.e. one page unit per pixel at
//! scale 1.0, and the whole image is reported as one bitmap.

use super::crop_rendered;
use crate::error::{BackendError, OcrError};
use crate::geometry::{BoundingBox, Size};
use crate::page::PageBackend;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::path::Path;

pub struct ImagePageBackend {
    image: DynamicImage,
}

impl ImagePageBackend {
    pub fn new(image: DynamicImage) -> Self {
        Self { image }
    }

    /// Decode an image file. The format is sniffed from its content, so
    /// extensionless paths (and downloads named `downloaded.img`) work.
    pub fn open(path: &Path) -> Result<Self, OcrError> {
        let unsupported = |detail: String| OcrError::UnsupportedInput {
            path: path.to_path_buf(),
            detail,
        };
        let image = ImageReader::open(path)
            .and_then(ImageReader::with_guessed_format)
            .map_err(|e| unsupported(e.to_string()))?
            .decode()
            .map_err(|e| unsupported(e.to_string()))?;
        Ok(Self::new(image))
    }
}

impl PageBackend for ImagePageBackend {
    fn is_valid(&self) -> bool {
        self.image.width() > 0 && self.image.height() > 0
    }

    fn size(&self) -> Option<Size> {
        Some(Size::new(self.image.width() as f64, self.image.height() as f64))
    }

    fn bitmap_rects(&self) -> Vec<BoundingBox> {
        vec![BoundingBox::new(
            0.0,
            0.0,
            self.image.width() as f64,
            self.image.height() as f64,
        )]
    }

    fn get_page_image(
        &self,
        scale: f64,
        cropbox: Option<&BoundingBox>,
    ) -> Result<DynamicImage, BackendError> {
        if !self.is_valid() {
            return Err(BackendError::Invalid);
        }
        let cropped = match cropbox {
            Some(bbox) => {
                let bbox = bbox.to_top_left_origin(self.image.height() as f64);
                crop_rendered(&self.image, &bbox, (1.0, 1.0))?
            }
            None => self.image.clone(),
        };

        if (scale - 1.0).abs() < f64::EPSILON {
            return Ok(cropped);
        }
        let width = ((cropped.width() as f64) * scale).round().max(1.0) as u32;
        let height = ((cropped.height() as f64) * scale).round().max(1.0) as u32;
        Ok(cropped.resize_exact(width, height, FilterType::Lanczos3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> ImagePageBackend {
        ImagePageBackend::new(DynamicImage::new_rgb8(40, 20))
    }

    #[test]
    fn size_and_bitmap_cover_the_image() {
        let b = backend();
        assert!(b.is_valid());
        assert_eq!(b.size(), Some(Size::new(40.0, 20.0)));
        assert_eq!(b.bitmap_rects(), vec![BoundingBox::new(0.0, 0.0, 40.0, 20.0)]);
    }

    #[test]
    fn crop_is_magnified() {
        let img = backend()
            .get_page_image(3.0, Some(&BoundingBox::new(0.0, 0.0, 10.0, 5.0)))
            .unwrap();
        assert_eq!((img.width(), img.height()), (30, 15));
    }

    #[test]
    fn full_page_at_scale_one() {
        let img = backend().get_page_image(1.0, None).unwrap();
        assert_eq!((img.width(), img.height()), (40, 20));
    }

    #[test]
    fn open_sniffs_format_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan");
        DynamicImage::new_rgb8(16, 12)
            .save_with_format(&path, image::ImageFormat::Png)
            .unwrap();

        let b = ImagePageBackend::open(&path).unwrap();
        assert_eq!(b.size(), Some(Size::new(16.0, 12.0)));
    }

    #[test]
    fn open_rejects_non_image_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.png");
        std::fs::write(&path, b"just some text").unwrap();

        let err = ImagePageBackend::open(&path).err().unwrap();
        assert!(matches!(err, OcrError::UnsupportedInput { .. }), "got: {err:?}");
    }

    #[test]
    fn empty_image_is_invalid() {
        let b = ImagePageBackend::new(DynamicImage::new_rgb8(0, 0));
        assert!(!b.is_valid());
    }
}
