//! Page geometry: sizes, bounding boxes and their coordinate origins.
//!
//! PDF user space puts the origin at the bottom-left corner, raster images at
//! the top-left. Every box therefore carries its [`CoordOrigin`] and can be
//! converted between the two given the page height.

use serde::{Deserialize, Serialize};

/// Page size in page units (points for PDFs, pixels for images).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// Which corner of the page `(0, 0)` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoordOrigin {
    #[default]
    TopLeft,
    BottomLeft,
}

/// Axis-aligned rectangle `(l, t, r, b)`.
///
/// With a top-left origin `t <= b`; with a bottom-left origin `t >= b`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub l: f64,
    pub t: f64,
    pub r: f64,
    pub b: f64,
    #[serde(default)]
    pub coord_origin: CoordOrigin,
}

impl BoundingBox {
    /// Box with a top-left origin.
    pub fn new(l: f64, t: f64, r: f64, b: f64) -> Self {
        Self::from_tuple((l, t, r, b), CoordOrigin::TopLeft)
    }

    pub fn from_tuple(coord: (f64, f64, f64, f64), origin: CoordOrigin) -> Self {
        let (l, t, r, b) = coord;
        Self {
            l,
            t,
            r,
            b,
            coord_origin: origin,
        }
    }

    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.l, self.t, self.r, self.b)
    }

    pub fn width(&self) -> f64 {
        self.r - self.l
    }

    pub fn height(&self) -> f64 {
        (self.b - self.t).abs()
    }

    pub fn area(&self) -> f64 {
        self.width().abs() * self.height()
    }

    pub fn to_top_left_origin(&self, page_height: f64) -> Self {
        match self.coord_origin {
            CoordOrigin::TopLeft => *self,
            CoordOrigin::BottomLeft => Self {
                l: self.l,
                t: page_height - self.t,
                r: self.r,
                b: page_height - self.b,
                coord_origin: CoordOrigin::TopLeft,
            },
        }
    }

    pub fn to_bottom_left_origin(&self, page_height: f64) -> Self {
        match self.coord_origin {
            CoordOrigin::BottomLeft => *self,
            CoordOrigin::TopLeft => Self {
                l: self.l,
                t: page_height - self.t,
                r: self.r,
                b: page_height - self.b,
                coord_origin: CoordOrigin::BottomLeft,
            },
        }
    }

    /// Area shared with `other`. Both boxes must use the same origin.
    pub fn intersection_area_with(&self, other: &BoundingBox) -> f64 {
        let left = self.l.max(other.l);
        let right = self.r.min(other.r);
        let (top, bottom) = match self.coord_origin {
            CoordOrigin::TopLeft => (self.t.max(other.t), self.b.min(other.b)),
            CoordOrigin::BottomLeft => (self.b.max(other.b), self.t.min(other.t)),
        };
        let width = right - left;
        let height = bottom - top;
        if width <= 0.0 || height <= 0.0 {
            0.0
        } else {
            width * height
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_of_degenerate_box_is_zero() {
        assert_eq!(BoundingBox::new(10.0, 10.0, 10.0, 40.0).area(), 0.0);
        assert_eq!(BoundingBox::new(0.0, 5.0, 30.0, 5.0).area(), 0.0);
        assert_eq!(BoundingBox::new(0.0, 0.0, 4.0, 5.0).area(), 20.0);
    }

    #[test]
    fn tuple_round_trip_keeps_ltrb_order() {
        let coords = (12.5, 30.25, 200.0, 410.75);
        let bbox = BoundingBox::from_tuple(coords, CoordOrigin::TopLeft);
        assert_eq!(bbox.as_tuple(), coords);
    }

    #[test]
    fn origin_conversion_is_reversible() {
        let bbox = BoundingBox::new(10.0, 20.0, 110.0, 70.0);
        let flipped = bbox.to_bottom_left_origin(800.0);
        assert_eq!(flipped.t, 780.0);
        assert_eq!(flipped.b, 730.0);
        assert_eq!(flipped.to_top_left_origin(800.0), bbox);
    }

    #[test]
    fn intersection_area() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 5.0, 20.0, 20.0);
        let c = BoundingBox::new(10.0, 0.0, 20.0, 10.0);
        assert_eq!(a.intersection_area_with(&b), 25.0);
        assert_eq!(a.intersection_area_with(&c), 0.0);
    }

    #[test]
    fn bottom_left_intersection() {
        let a = BoundingBox::from_tuple((0.0, 10.0, 10.0, 0.0), CoordOrigin::BottomLeft);
        let b = BoundingBox::from_tuple((5.0, 20.0, 20.0, 5.0), CoordOrigin::BottomLeft);
        assert_eq!(a.intersection_area_with(&b), 25.0);
    }
}
