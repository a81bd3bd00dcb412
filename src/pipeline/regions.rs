//! Region selection: decide which parts of a page are worth recognising.
//!
//! Text that exists only as pixels lives inside embedded bitmaps (scans,
//! screenshots, photographed tables). The default selector rasterises the
//! page's bitmap rectangles onto a boolean grid, measures how much of the page
//! they cover and groups touching rectangles into connected components:
//!
//! | Coverage | Regions returned |
//! |----------|------------------|
//! | above `max(0.75, threshold)` or forced | the full page |
//! | above `threshold` | one box per connected bitmap component |
//! | otherwise | none |

use crate::geometry::{BoundingBox, Size};
use crate::page::Page;
use std::collections::VecDeque;

/// Coverage above which the page is treated as a scan and recognised whole.
pub const BITMAP_COVERAGE_THRESHOLD: f64 = 0.75;

/// Produces the candidate regions of a page, top-left origin, in order.
pub trait RegionSelector: Send + Sync {
    fn regions(&self, page: &Page) -> Vec<BoundingBox>;
}

/// Bitmap-coverage region selection.
#[derive(Debug, Clone, PartialEq)]
pub struct BitmapRegionSelector {
    pub force_full_page_ocr: bool,
    pub bitmap_area_threshold: f64,
}

impl BitmapRegionSelector {
    pub fn new(force_full_page_ocr: bool, bitmap_area_threshold: f64) -> Self {
        Self {
            force_full_page_ocr,
            bitmap_area_threshold,
        }
    }

    /// Select regions for a page of `size` whose bitmaps cover `bitmap_rects`.
    pub fn select(&self, size: Size, bitmap_rects: &[BoundingBox]) -> Vec<BoundingBox> {
        let (coverage, components) = find_ocr_rects(size, bitmap_rects);

        if self.force_full_page_ocr
            || coverage > BITMAP_COVERAGE_THRESHOLD.max(self.bitmap_area_threshold)
        {
            vec![BoundingBox::new(0.0, 0.0, size.width, size.height)]
        } else if coverage > self.bitmap_area_threshold {
            components
        } else {
            Vec::new()
        }
    }
}

impl RegionSelector for BitmapRegionSelector {
    fn regions(&self, page: &Page) -> Vec<BoundingBox> {
        let Some(size) = page.size else {
            return Vec::new();
        };
        let bitmap_rects = page
            .backend()
            .map(|b| b.bitmap_rects())
            .unwrap_or_default();
        self.select(size, &bitmap_rects)
    }
}

/// Coverage fraction of the page and the enclosing box of each connected
/// group of bitmap pixels.
fn find_ocr_rects(size: Size, bitmap_rects: &[BoundingBox]) -> (f64, Vec<BoundingBox>) {
    let width = size.width.round().max(0.0) as usize;
    let height = size.height.round().max(0.0) as usize;
    if width == 0 || height == 0 {
        return (0.0, Vec::new());
    }

    let mut grid = vec![false; width * height];
    for rect in bitmap_rects {
        let x0 = clamp_index(rect.l.min(rect.r), width);
        let x1 = clamp_index(rect.l.max(rect.r), width);
        let y0 = clamp_index(rect.t.min(rect.b), height);
        let y1 = clamp_index(rect.t.max(rect.b), height);
        // Corners are inclusive.
        for y in y0..=y1 {
            grid[y * width + x0..=y * width + x1].fill(true);
        }
    }

    let covered = grid.iter().filter(|&&c| c).count();
    let coverage = covered as f64 / (size.width * size.height);

    let mut boxes = Vec::new();
    let mut seen = vec![false; width * height];
    let mut queue = VecDeque::new();
    for start in 0..grid.len() {
        if !grid[start] || seen[start] {
            continue;
        }
        seen[start] = true;
        queue.push_back(start);
        let (mut min_x, mut min_y) = (usize::MAX, usize::MAX);
        let (mut max_x, mut max_y) = (0, 0);
        while let Some(idx) = queue.pop_front() {
            let (x, y) = (idx % width, idx / width);
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);

            let mut visit = |n: usize| {
                if grid[n] && !seen[n] {
                    seen[n] = true;
                    queue.push_back(n);
                }
            };
            if x > 0 {
                visit(idx - 1);
            }
            if x + 1 < width {
                visit(idx + 1);
            }
            if y > 0 {
                visit(idx - width);
            }
            if y + 1 < height {
                visit(idx + width);
            }
        }
        boxes.push(BoundingBox::new(
            min_x as f64,
            min_y as f64,
            max_x as f64,
            max_y as f64,
        ));
    }

    (coverage, boxes)
}

fn clamp_index(v: f64, len: usize) -> usize {
    (v.round().max(0.0) as usize).min(len - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: Size = Size {
        width: 100.0,
        height: 100.0,
    };

    #[test]
    fn forced_full_page() {
        let selector = BitmapRegionSelector::new(true, 0.05);
        let regions = selector.select(PAGE, &[]);
        assert_eq!(regions, vec![BoundingBox::new(0.0, 0.0, 100.0, 100.0)]);
    }

    #[test]
    fn no_bitmaps_no_regions() {
        let selector = BitmapRegionSelector::new(false, 0.05);
        assert!(selector.select(PAGE, &[]).is_empty());
    }

    #[test]
    fn dominant_bitmap_selects_full_page() {
        let selector = BitmapRegionSelector::new(false, 0.05);
        let scan = BoundingBox::new(0.0, 0.0, 99.0, 90.0);
        let regions = selector.select(PAGE, &[scan]);
        assert_eq!(regions, vec![BoundingBox::new(0.0, 0.0, 100.0, 100.0)]);
    }

    #[test]
    fn separate_bitmaps_become_separate_regions() {
        let selector = BitmapRegionSelector::new(false, 0.05);
        let a = BoundingBox::new(0.0, 0.0, 19.0, 19.0);
        let b = BoundingBox::new(50.0, 50.0, 69.0, 69.0);
        let regions = selector.select(PAGE, &[a, b]);
        assert_eq!(regions, vec![a, b]);
    }

    #[test]
    fn touching_bitmaps_merge() {
        let selector = BitmapRegionSelector::new(false, 0.05);
        let a = BoundingBox::new(0.0, 0.0, 19.0, 19.0);
        let b = BoundingBox::new(20.0, 10.0, 39.0, 29.0);
        let regions = selector.select(PAGE, &[a, b]);
        assert_eq!(regions, vec![BoundingBox::new(0.0, 0.0, 39.0, 29.0)]);
    }

    #[test]
    fn small_bitmaps_are_ignored() {
        let selector = BitmapRegionSelector::new(false, 0.05);
        let icon = BoundingBox::new(10.0, 10.0, 14.0, 14.0);
        assert!(selector.select(PAGE, &[icon]).is_empty());
    }

    #[test]
    fn page_without_size_has_no_regions() {
        let selector = BitmapRegionSelector::new(true, 0.05);
        assert!(selector.regions(&Page::new(0)).is_empty());
    }
}
