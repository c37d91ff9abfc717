//! Fixed court-map layout: diagram size, real-world size and reference keypoints.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Number of court keypoints the keypoint detector reports per frame.
pub const NUM_COURT_KEYPOINTS: usize = 18;

// Court markings, in meters from the left / top edges.
const BASELINE_OFFSET_M: f64 = 0.91;
const LANE_TOP_M: f64 = 5.18;
const LANE_BOTTOM_M: f64 = 10.0;
const SIDELINE_OFFSET_M: f64 = 14.1;
const FREE_THROW_LINE_M: f64 = 5.79;

/// Court diagram dimensions in pixels and in meters.
///
/// The default is a 28.65m x 15.24m court drawn onto a 300 x 161 px diagram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourtLayout {
    /// Diagram width in pixels.
    pub width_px: f64,
    /// Diagram height in pixels.
    pub height_px: f64,
    /// Court length in meters.
    pub width_m: f64,
    /// Court width in meters.
    pub height_m: f64,
}

impl Default for CourtLayout {
    fn default() -> Self {
        Self {
            width_px: 300.0,
            height_px: 161.0,
            width_m: 28.65,
            height_m: 15.24,
        }
    }
}

impl CourtLayout {
    /// Check that every dimension is finite and positive.
    pub fn validate(&self) -> Result<()> {
        let dims = [self.width_px, self.height_px, self.width_m, self.height_m];
        if dims.iter().any(|d| !d.is_finite() || *d <= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "court dimensions must be positive, got {:?}",
                self
            )));
        }
        Ok(())
    }

    /// Meters per diagram pixel along (x, y).
    pub fn meters_per_pixel(&self) -> (f64, f64) {
        (self.width_m / self.width_px, self.height_m / self.height_px)
    }

    /// The 18 reference keypoints in diagram pixel space, indexed like the detector output.
    ///
    /// Coordinates are truncated to whole pixels.
    pub fn keypoints(&self) -> Vec<Point2<f64>> {
        let w = self.width_px.trunc();
        let h = self.height_px.trunc();
        let x = |meters: f64| (meters / self.width_m * self.width_px).trunc();
        let y = |meters: f64| (meters / self.height_m * self.height_px).trunc();

        let left_ft = x(FREE_THROW_LINE_M);
        let right_ft = x(self.width_m - FREE_THROW_LINE_M);
        let mid = (self.width_px / 2.0).trunc();

        vec![
            // left edge
            Point2::new(0.0, 0.0),
            Point2::new(0.0, y(BASELINE_OFFSET_M)),
            Point2::new(0.0, y(LANE_TOP_M)),
            Point2::new(0.0, y(LANE_BOTTOM_M)),
            Point2::new(0.0, y(SIDELINE_OFFSET_M)),
            Point2::new(0.0, h),
            // left free-throw line
            Point2::new(left_ft, y(LANE_TOP_M)),
            Point2::new(left_ft, y(LANE_BOTTOM_M)),
            // half-court line
            Point2::new(mid, h),
            Point2::new(mid, 0.0),
            // right free-throw line
            Point2::new(right_ft, y(LANE_TOP_M)),
            Point2::new(right_ft, y(LANE_BOTTOM_M)),
            // right edge
            Point2::new(w, h),
            Point2::new(w, y(SIDELINE_OFFSET_M)),
            Point2::new(w, y(LANE_BOTTOM_M)),
            Point2::new(w, y(LANE_TOP_M)),
            Point2::new(w, y(BASELINE_OFFSET_M)),
            Point2::new(w, 0.0),
        ]
    }
}
