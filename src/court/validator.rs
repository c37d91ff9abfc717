//! Per-frame rejection of geometrically inconsistent court keypoints.

use nalgebra::{distance, Point2};
use serde::{Deserialize, Serialize};

use crate::court::layout::CourtLayout;
use crate::utils::is_detected;
use crate::{Error, Result};

/// Configuration for the keypoint validator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Maximum relative error between the image and map distance ratios.
    pub max_ratio_error: f64,

    /// Frames with fewer detected keypoints than this are left untouched.
    pub min_detected: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_ratio_error: 0.8,
            min_detected: 3,
        }
    }
}

/// Zeroes out detected keypoints whose distance ratios disagree with the court map.
///
/// For each detected keypoint `i1` (in index order), the first two other detected
/// keypoints not yet invalidated in the frame serve as references `i2`, `i3`. The
/// ratio `dist(i1, i2) / dist(i1, i3)` is compared between image and map space and
/// `i1` is invalidated when the relative error exceeds the configured maximum. Each
/// frame is checked in a single pass; invalidated keypoints stop serving as
/// references for the rest of that frame.
#[derive(Debug, Clone)]
pub struct KeypointValidator {
    map_keypoints: Vec<Point2<f64>>,
    config: ValidatorConfig,
}

impl KeypointValidator {
    /// Create a validator for the given court layout.
    pub fn new(layout: &CourtLayout, config: ValidatorConfig) -> Result<Self> {
        layout.validate()?;

        if !config.max_ratio_error.is_finite() || config.max_ratio_error <= 0.0 {
            return Err(Error::InvalidConfig(
                "max_ratio_error must be positive".to_string(),
            ));
        }
        if config.min_detected < 3 {
            return Err(Error::InvalidConfig(
                "min_detected must be at least 3 to compare distance ratios".to_string(),
            ));
        }

        Ok(Self {
            map_keypoints: layout.keypoints(),
            config,
        })
    }

    /// Validate every frame, returning new keypoint frames with rejected entries zeroed.
    pub fn validate(&self, frames: &[Vec<Point2<f64>>]) -> Result<Vec<Vec<Point2<f64>>>> {
        let validated = frames
            .iter()
            .enumerate()
            .map(|(frame_idx, keypoints)| self.validate_frame(frame_idx, keypoints))
            .collect::<Result<Vec<_>>>()?;

        let rejected: usize = frames
            .iter()
            .zip(validated.iter())
            .map(|(before, after)| {
                before
                    .iter()
                    .zip(after.iter())
                    .filter(|(b, a)| is_detected(b) && !is_detected(a))
                    .count()
            })
            .sum();
        log::debug!(
            "keypoint validation: {} frames, {} keypoints rejected",
            frames.len(),
            rejected
        );

        Ok(validated)
    }

    /// Validate the keypoints of a single frame.
    ///
    /// A frame without one entry per reference keypoint cannot be cross-checked
    /// and is returned unchanged.
    pub fn validate_frame(&self, frame_idx: usize, keypoints: &[Point2<f64>]) -> Result<Vec<Point2<f64>>> {
        if keypoints.len() != self.map_keypoints.len() {
            log::warn!(
                "frame {}: expected {} keypoints, got {}; skipping validation",
                frame_idx,
                self.map_keypoints.len(),
                keypoints.len()
            );
            return Ok(keypoints.to_vec());
        }

        let mut validated = keypoints.to_vec();

        let detected: Vec<usize> = (0..keypoints.len())
            .filter(|&i| is_detected(&keypoints[i]))
            .collect();
        if detected.len() < self.config.min_detected {
            return Ok(validated);
        }

        let mut invalidated: Vec<usize> = Vec::new();

        for &i1 in &detected {
            let mut references = detected
                .iter()
                .copied()
                .filter(|&i| i != i1 && !invalidated.contains(&i));
            let (Some(i2), Some(i3)) = (references.next(), references.next()) else {
                continue;
            };

            let map_12 = distance(&self.map_keypoints[i1], &self.map_keypoints[i2]);
            let map_13 = distance(&self.map_keypoints[i1], &self.map_keypoints[i3]);
            if map_12 <= 0.0 || map_13 <= 0.0 {
                continue;
            }

            let frame_12 = distance(&keypoints[i1], &keypoints[i2]);
            let frame_13 = distance(&keypoints[i1], &keypoints[i3]);

            let ratio_frame = if frame_13 > 0.0 { frame_12 / frame_13 } else { f64::INFINITY };
            let ratio_map = map_12 / map_13;
            let error = ((ratio_frame - ratio_map) / ratio_map).abs();

            if error > self.config.max_ratio_error {
                log::trace!(
                    "frame {}: keypoint {} rejected (ratio error {:.3} against {} and {})",
                    frame_idx, i1, error, i2, i3
                );
                validated[i1] = Point2::origin();
                invalidated.push(i1);
            }
        }

        Ok(validated)
    }
}
