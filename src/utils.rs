//! Utility functions for courtvision.

use nalgebra::{DMatrix, Point2};
use crate::{Error, Result};

/// Validate that points have shape (n_points, 2).
///
/// An empty matrix is accepted regardless of its column count.
pub fn validate_points(points: &DMatrix<f64>) -> Result<()> {
    if points.nrows() == 0 {
        return Ok(());
    }

    if points.ncols() != 2 {
        return Err(Error::InvalidInput(format!(
            "points must have shape (N, 2), got ({}, {})",
            points.nrows(),
            points.ncols()
        )));
    }

    Ok(())
}

/// Stack 2D points into an (n_points x 2) matrix.
pub fn points_to_matrix(points: &[Point2<f64>]) -> DMatrix<f64> {
    DMatrix::from_fn(points.len(), 2, |i, j| points[i][j])
}

/// Fail fast when a per-frame series does not have the expected frame count.
pub fn ensure_frame_count(series: &str, expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(Error::SeriesLengthMismatch {
            series: series.to_string(),
            expected,
            got,
        });
    }
    Ok(())
}

/// A keypoint counts as detected only when both coordinates are strictly positive.
pub fn is_detected(point: &Point2<f64>) -> bool {
    point.x > 0.0 && point.y > 0.0
}
