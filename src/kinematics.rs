//! Per-frame distance and smoothed speed of mapped players.

use std::collections::BTreeMap;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::court::CourtLayout;
use crate::tracks::{PositionFrame, ScalarFrame, TrackId};
use crate::{Error, Result};

/// Configuration for the kinematics estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KinematicsConfig {
    /// Video frame rate.
    pub fps: f64,

    /// Length of the sliding speed window, in frames, ending at the current frame.
    pub window_frames: usize,

    /// A speed is only reported with strictly more counted samples than this.
    pub min_samples: usize,

    /// Empirical correction applied to every converted distance.
    pub scale_correction: f64,
}

impl Default for KinematicsConfig {
    fn default() -> Self {
        Self {
            fps: 30.0,
            window_frames: 15,
            min_samples: 5,
            scale_correction: 0.4,
        }
    }
}

/// Converts court-map positions into distances (meters) and speeds (m/s).
#[derive(Debug, Clone)]
pub struct KinematicsEstimator {
    /// Estimator configuration.
    pub config: KinematicsConfig,
    meters_per_px: (f64, f64),
}

impl KinematicsEstimator {
    /// Create an estimator for the given court layout.
    pub fn new(layout: &CourtLayout, config: KinematicsConfig) -> Result<Self> {
        layout.validate()?;

        if !config.fps.is_finite() || config.fps <= 0.0 {
            return Err(Error::InvalidConfig("fps must be positive".to_string()));
        }
        if config.window_frames == 0 {
            return Err(Error::InvalidConfig("window_frames must be at least 1".to_string()));
        }
        if !config.scale_correction.is_finite() || config.scale_correction < 0.0 {
            return Err(Error::InvalidConfig(
                "scale_correction must be non-negative".to_string(),
            ));
        }

        Ok(Self {
            config,
            meters_per_px: layout.meters_per_pixel(),
        })
    }

    /// Corrected distance in meters between two court-map positions.
    pub fn meter_distance(&self, from: &Point2<f64>, to: &Point2<f64>) -> f64 {
        let (mx, my) = self.meters_per_px;
        let dx = (to.x - from.x) * mx;
        let dy = (to.y - from.y) * my;
        (dx * dx + dy * dy).sqrt() * self.config.scale_correction
    }

    /// Distance each player covered since the last frame they were mapped.
    ///
    /// A player's first mapped frame yields no entry.
    pub fn distances(&self, positions: &[PositionFrame]) -> Vec<ScalarFrame> {
        let mut last_seen: BTreeMap<TrackId, Point2<f64>> = BTreeMap::new();

        positions
            .iter()
            .map(|frame| {
                let mut distances = ScalarFrame::new();
                for (&player_id, position) in frame {
                    if let Some(previous) = last_seen.insert(player_id, *position) {
                        distances.insert(player_id, self.meter_distance(&previous, position));
                    }
                }
                distances
            })
            .collect()
    }

    /// Sliding-window speed for every player with a distance entry in a frame.
    ///
    /// Within the window, the first sample of a player is skipped and the rest are
    /// summed. Players with too few counted samples get a speed of exactly 0.
    pub fn speeds(&self, distances: &[ScalarFrame]) -> Vec<ScalarFrame> {
        (0..distances.len())
            .map(|frame_idx| {
                let start = (frame_idx + 1).saturating_sub(self.config.window_frames);
                let window = &distances[start..=frame_idx];

                distances[frame_idx]
                    .keys()
                    .map(|&player_id| (player_id, self.window_speed(window, player_id)))
                    .collect()
            })
            .collect()
    }

    fn window_speed(&self, window: &[ScalarFrame], player_id: TrackId) -> f64 {
        let mut total = 0.0;
        let mut counted = 0usize;
        let mut seen = false;

        for frame in window {
            if let Some(&dist) = frame.get(&player_id) {
                if seen {
                    total += dist;
                    counted += 1;
                }
                seen = true;
            }
        }

        if counted > self.config.min_samples {
            total / (counted as f64 / self.config.fps)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn estimator() -> KinematicsEstimator {
        KinematicsEstimator::new(&CourtLayout::default(), KinematicsConfig::default()).unwrap()
    }

    fn frame(entries: &[(TrackId, f64, f64)]) -> PositionFrame {
        entries.iter().map(|&(id, x, y)| (id, Point2::new(x, y))).collect()
    }

    #[test]
    fn test_meter_distance_along_axes() {
        let est = estimator();
        let origin = Point2::new(0.0, 0.0);

        // 300px across = 28.65m, times the 0.4 correction
        assert_relative_eq!(est.meter_distance(&origin, &Point2::new(300.0, 0.0)), 28.65 * 0.4, epsilon = 1e-9);
        assert_relative_eq!(est.meter_distance(&origin, &Point2::new(0.0, 161.0)), 15.24 * 0.4, epsilon = 1e-9);
    }

    #[test]
    fn test_first_appearance_has_no_distance() {
        let positions = vec![frame(&[(1, 10.0, 10.0)]), frame(&[(1, 40.0, 10.0)])];
        let distances = estimator().distances(&positions);

        assert!(distances[0].is_empty());
        assert_relative_eq!(distances[1][&1], 30.0 * (28.65 / 300.0) * 0.4, epsilon = 1e-9);
    }

    #[test]
    fn test_distance_spans_unmapped_frames() {
        let positions = vec![
            frame(&[(1, 0.0, 0.0)]),
            frame(&[]),
            frame(&[]),
            frame(&[(1, 30.0, 0.0)]),
        ];
        let distances = estimator().distances(&positions);

        assert!(distances[1].is_empty() && distances[2].is_empty());
        assert_relative_eq!(distances[3][&1], 30.0 * (28.65 / 300.0) * 0.4, epsilon = 1e-9);
    }

    #[test]
    fn test_stationary_player_has_zero_distance_and_speed() {
        let positions = vec![frame(&[(7, 120.0, 80.0)]); 30];
        let est = estimator();
        let distances = est.distances(&positions);
        let speeds = est.speeds(&distances);

        for frame_idx in 1..30 {
            assert_eq!(distances[frame_idx][&7], 0.0);
            assert_eq!(speeds[frame_idx][&7], 0.0);
        }
    }

    #[test]
    fn test_speed_requires_more_than_min_samples() {
        // Constant 0.1m per frame
        let distances: Vec<ScalarFrame> = (0..10)
            .map(|_| [(3, 0.1)].into_iter().collect())
            .collect();
        let speeds = estimator().speeds(&distances);

        // Frame 5 has 5 counted samples (the first is skipped): still 0
        for frame_idx in 0..=5 {
            assert_eq!(speeds[frame_idx][&3], 0.0, "frame {}", frame_idx);
        }
        // Frame 6 has 6 counted samples: 0.6m over 6/30s = 3 m/s
        assert_relative_eq!(speeds[6][&3], 3.0, epsilon = 1e-9);
        assert_relative_eq!(speeds[9][&3], 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_speed_window_is_bounded() {
        // 0.1m per frame for 20 frames, then 0.3m per frame
        let distances: Vec<ScalarFrame> = (0..40)
            .map(|i| [(3, if i < 20 { 0.1 } else { 0.3 })].into_iter().collect())
            .collect();
        let speeds = estimator().speeds(&distances);

        // Window of 15 ending at frame 39 covers frames 25..=39, all at 0.3m
        assert_relative_eq!(speeds[39][&3], 9.0, epsilon = 1e-9);
    }

    #[test]
    fn test_speed_only_for_players_in_frame() {
        let distances: Vec<ScalarFrame> = vec![
            [(1, 0.1), (2, 0.1)].into_iter().collect(),
            [(1, 0.1)].into_iter().collect(),
        ];
        let speeds = estimator().speeds(&distances);

        assert_eq!(speeds[1].len(), 1);
        assert_eq!(speeds[1][&1], 0.0);
    }

    #[test]
    fn test_invalid_config() {
        let config = KinematicsConfig { fps: 0.0, ..KinematicsConfig::default() };
        assert!(KinematicsEstimator::new(&CourtLayout::default(), config).is_err());

        let config = KinematicsConfig { window_frames: 0, ..KinematicsConfig::default() };
        assert!(KinematicsEstimator::new(&CourtLayout::default(), config).is_err());
    }
}
