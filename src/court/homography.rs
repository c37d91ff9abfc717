//! Planar projective transform between image space and court-map space.

use nalgebra::{DMatrix, Matrix3, Point2, Vector3};

use crate::utils::{points_to_matrix, validate_points};
use crate::{Error, Result};

/// Minimum number of point correspondences for a homography.
pub const MIN_CORRESPONDENCES: usize = 4;

// Below this ratio to the largest singular value the DLT system has more
// than one solution.
const RANK_TOLERANCE: f64 = 1e-10;
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Full perspective transformation using a 3x3 homography matrix.
///
/// Built once from one frame's point correspondences and never mutated; a new
/// instance is constructed for every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Homography {
    matrix: Matrix3<f64>,
}

impl Homography {
    /// Estimate the homography mapping `source` onto `target`.
    ///
    /// Both inputs are (N x 2) matrices with N >= 4. The solution minimises the
    /// algebraic error over all correspondences (normalized DLT).
    ///
    /// # Errors
    /// * `InvalidInput` if the shapes differ, are not (N, 2) or N < 4
    /// * `DegenerateGeometry` if the points admit no unique non-singular solution
    pub fn new(source: &DMatrix<f64>, target: &DMatrix<f64>) -> Result<Self> {
        if source.shape() != target.shape() {
            return Err(Error::InvalidInput(format!(
                "source and target must have the same shape, got {:?} and {:?}",
                source.shape(),
                target.shape()
            )));
        }
        if source.ncols() != 2 {
            return Err(Error::InvalidInput(format!(
                "source and target must have shape (N, 2), got {:?}",
                source.shape()
            )));
        }
        if source.nrows() < MIN_CORRESPONDENCES {
            return Err(Error::InvalidInput(format!(
                "at least {} correspondences required, got {}",
                MIN_CORRESPONDENCES,
                source.nrows()
            )));
        }
        if source.iter().chain(target.iter()).any(|v| !v.is_finite()) {
            return Err(Error::DegenerateGeometry("non-finite point coordinates".to_string()));
        }

        let (src_norm, src_t) = normalize(source)?;
        let (dst_norm, dst_t) = normalize(target)?;

        // Pad to at least 9 rows so the SVD yields the full right singular basis.
        let n = source.nrows();
        let mut a = DMatrix::<f64>::zeros((2 * n).max(9), 9);
        for i in 0..n {
            let (x, y) = (src_norm[(i, 0)], src_norm[(i, 1)]);
            let (u, v) = (dst_norm[(i, 0)], dst_norm[(i, 1)]);

            let r = 2 * i;
            a[(r, 0)] = -x;
            a[(r, 1)] = -y;
            a[(r, 2)] = -1.0;
            a[(r, 6)] = u * x;
            a[(r, 7)] = u * y;
            a[(r, 8)] = u;

            a[(r + 1, 3)] = -x;
            a[(r + 1, 4)] = -y;
            a[(r + 1, 5)] = -1.0;
            a[(r + 1, 6)] = v * x;
            a[(r + 1, 7)] = v * y;
            a[(r + 1, 8)] = v;
        }

        let svd = a.svd(false, true);
        let v_t = svd
            .v_t
            .ok_or_else(|| Error::DegenerateGeometry("SVD did not converge".to_string()))?;

        let mut order: Vec<usize> = (0..svd.singular_values.len()).collect();
        order.sort_by(|&i, &j| svd.singular_values[i].total_cmp(&svd.singular_values[j]));

        let largest = svd.singular_values[order[order.len() - 1]];
        let second_smallest = svd.singular_values[order[1]];
        if largest <= 0.0 || second_smallest <= RANK_TOLERANCE * largest {
            return Err(Error::DegenerateGeometry(
                "correspondences do not determine a unique homography (collinear or coincident points)"
                    .to_string(),
            ));
        }

        let h = v_t.row(order[0]);
        let h_norm = Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], h[8]);
        if h_norm.determinant().abs() < SINGULAR_TOLERANCE {
            return Err(Error::DegenerateGeometry("homography matrix is singular".to_string()));
        }

        let dst_t_inv = dst_t
            .try_inverse()
            .ok_or_else(|| Error::DegenerateGeometry("cannot invert target normalization".to_string()))?;
        let mut matrix = dst_t_inv * h_norm * src_t;

        let scale = matrix[(2, 2)];
        if scale.abs() > f64::EPSILON {
            matrix /= scale;
        }

        Self::from_matrix(matrix)
    }

    /// Estimate the homography from paired point slices.
    pub fn from_points(source: &[Point2<f64>], target: &[Point2<f64>]) -> Result<Self> {
        Self::new(&points_to_matrix(source), &points_to_matrix(target))
    }

    /// Wrap an existing 3x3 matrix.
    pub fn from_matrix(matrix: Matrix3<f64>) -> Result<Self> {
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(Error::DegenerateGeometry("homography matrix has non-finite entries".to_string()));
        }
        Ok(Self { matrix })
    }

    /// The 3x3 model.
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    /// Transform mapping target space back to source space.
    pub fn inverse(&self) -> Result<Self> {
        let inverse = self
            .matrix
            .try_inverse()
            .ok_or_else(|| Error::DegenerateGeometry("cannot invert homography matrix".to_string()))?;
        Self::from_matrix(inverse)
    }

    /// Apply the homography to an (N x 2) matrix of points.
    ///
    /// Empty input is returned unchanged.
    pub fn transform_points(&self, points: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        if points.is_empty() {
            return Ok(points.clone());
        }
        validate_points(points)?;

        let mut result = DMatrix::zeros(points.nrows(), 2);
        for i in 0..points.nrows() {
            let p = self.transform_point(&Point2::new(points[(i, 0)], points[(i, 1)]))?;
            result[(i, 0)] = p.x;
            result[(i, 1)] = p.y;
        }

        Ok(result)
    }

    /// Apply the homography to a single point.
    pub fn transform_point(&self, point: &Point2<f64>) -> Result<Point2<f64>> {
        // [x', y', w'] = H * [x, y, 1]^T
        let projected = self.matrix * Vector3::new(point.x, point.y, 1.0);
        let w = projected.z;
        if w.abs() < f64::EPSILON {
            return Err(Error::DegenerateGeometry(format!(
                "point ({}, {}) maps to infinity",
                point.x, point.y
            )));
        }

        let mapped = Point2::new(projected.x / w, projected.y / w);
        if !mapped.x.is_finite() || !mapped.y.is_finite() {
            return Err(Error::InvalidInput(format!(
                "point ({}, {}) has no finite image",
                point.x, point.y
            )));
        }
        Ok(mapped)
    }
}

/// Translate points to their centroid and scale them to mean distance sqrt(2).
fn normalize(points: &DMatrix<f64>) -> Result<(DMatrix<f64>, Matrix3<f64>)> {
    let n = points.nrows() as f64;
    let cx = points.column(0).sum() / n;
    let cy = points.column(1).sum() / n;

    let mean_dist = (0..points.nrows())
        .map(|i| ((points[(i, 0)] - cx).powi(2) + (points[(i, 1)] - cy).powi(2)).sqrt())
        .sum::<f64>()
        / n;
    if mean_dist <= f64::EPSILON {
        return Err(Error::DegenerateGeometry("all points coincide".to_string()));
    }

    let s = std::f64::consts::SQRT_2 / mean_dist;
    let transform = Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0);

    let mut normalized = points.clone();
    for i in 0..points.nrows() {
        normalized[(i, 0)] = s * (points[(i, 0)] - cx);
        normalized[(i, 1)] = s * (points[(i, 1)] - cy);
    }

    Ok((normalized, transform))
}
