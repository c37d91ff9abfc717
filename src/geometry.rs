//! Bounding box primitives shared by every detector.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Axis-aligned bounding box in image pixel space.
///
/// Corners follow the detector convention: `(x1, y1)` is the top-left corner,
/// `(x2, y2)` the bottom-right one, with the origin at the top-left of the frame.
/// Serialized as `[x1, y1, x2, y2]`; deserialization applies the same checks as
/// [`BoundingBox::try_new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    /// Create a bounding box without validating its corners.
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Create a bounding box, rejecting non-finite or inverted corners.
    pub fn try_new(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self> {
        if ![x1, y1, x2, y2].iter().all(|v| v.is_finite()) {
            return Err(Error::InvalidBoundingBox(format!(
                "non-finite corner in ({}, {}, {}, {})",
                x1, y1, x2, y2
            )));
        }
        if x1 > x2 || y1 > y2 {
            return Err(Error::InvalidBoundingBox(format!(
                "expected x1 <= x2 and y1 <= y2, got ({}, {}, {}, {})",
                x1, y1, x2, y2
            )));
        }
        Ok(Self::new(x1, y1, x2, y2))
    }

    /// Create a bounding box from a `[x1, y1, x2, y2]` array.
    pub fn from_array(coords: [f64; 4]) -> Result<Self> {
        Self::try_new(coords[0], coords[1], coords[2], coords[3])
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn center(&self) -> Point2<f64> {
        Point2::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// Bottom-center point, used as the player's ground-plane position.
    pub fn foot_position(&self) -> Point2<f64> {
        Point2::new((self.x1 + self.x2) / 2.0, self.y2)
    }

    /// Area of the overlap between two boxes (0 when they are disjoint).
    pub fn intersection_area(&self, other: &BoundingBox) -> f64 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);

        (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0)
    }

    /// Top-left corner.
    pub fn top_left(&self) -> Point2<f64> {
        Point2::new(self.x1, self.y1)
    }
}

impl TryFrom<[f64; 4]> for BoundingBox {
    type Error = Error;

    fn try_from(coords: [f64; 4]) -> Result<Self> {
        Self::from_array(coords)
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(bbox: BoundingBox) -> Self {
        [bbox.x1, bbox.y1, bbox.x2, bbox.y2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_center_and_foot_position() {
        let bbox = BoundingBox::new(10.0, 20.0, 30.0, 60.0);

        assert_eq!(bbox.center(), Point2::new(20.0, 40.0));
        assert_eq!(bbox.foot_position(), Point2::new(20.0, 60.0));
        assert_relative_eq!(bbox.width(), 20.0);
        assert_relative_eq!(bbox.height(), 40.0);
        assert_relative_eq!(bbox.area(), 800.0);
    }

    #[test]
    fn test_intersection_area_partial_overlap() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 5.0, 15.0, 15.0);

        assert_relative_eq!(a.intersection_area(&b), 25.0);
        assert_relative_eq!(b.intersection_area(&a), 25.0);
    }

    #[test]
    fn test_intersection_area_disjoint() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(20.0, 20.0, 30.0, 30.0);

        assert_eq!(a.intersection_area(&b), 0.0);
    }

    #[test]
    fn test_try_new_rejects_inverted_corners() {
        assert!(BoundingBox::try_new(10.0, 0.0, 5.0, 10.0).is_err());
        assert!(BoundingBox::try_new(0.0, 10.0, 5.0, 0.0).is_err());
        assert!(BoundingBox::try_new(0.0, 0.0, f64::NAN, 1.0).is_err());
        assert!(BoundingBox::from_array([1.0, 2.0, 3.0, 4.0]).is_ok());
    }

    #[test]
    fn test_serde_uses_corner_array() {
        let bbox = BoundingBox::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(serde_json::to_string(&bbox).unwrap(), "[1.0,2.0,3.0,4.0]");

        let parsed: BoundingBox = serde_json::from_str("[10, 20, 30, 60]").unwrap();
        assert_eq!(parsed, BoundingBox::new(10.0, 20.0, 30.0, 60.0));
    }

    #[test]
    fn test_deserialize_rejects_inverted_corners() {
        assert!(serde_json::from_str::<BoundingBox>("[30, 20, 10, 60]").is_err());
        assert!(serde_json::from_str::<BoundingBox>("[0, 60, 10, 20]").is_err());
    }
}
