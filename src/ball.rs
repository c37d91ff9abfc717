//! Ball track cleanup ahead of possession detection.
//!
//! The ball detector occasionally fires on distant objects and misses the ball
//! for a few frames at a time. Implausible jumps are removed first, then the
//! remaining gaps are filled by linear interpolation.

use nalgebra::distance;
use serde::{Deserialize, Serialize};

use crate::geometry::BoundingBox;
use crate::tracks::{ball_bbox, TrackFrame, BALL_TRACK_ID};
use crate::{Error, Result};

/// Configuration for ball track cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallCleanupConfig {
    /// Run the cleanup at all.
    pub enabled: bool,

    /// Maximum top-left corner movement (pixels) per elapsed frame.
    pub max_jump_per_frame: f64,

    /// Fill frames without a ball after jump rejection.
    pub interpolate: bool,
}

impl Default for BallCleanupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_jump_per_frame: 25.0,
            interpolate: true,
        }
    }
}

impl BallCleanupConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.max_jump_per_frame.is_finite() || self.max_jump_per_frame < 0.0 {
            return Err(Error::InvalidConfig(
                "max_jump_per_frame must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply the configured cleanup steps.
    pub fn apply(&self, ball_tracks: &[TrackFrame]) -> Vec<TrackFrame> {
        if !self.enabled {
            return ball_tracks.to_vec();
        }

        let trimmed = trim_false_detections(ball_tracks, self.max_jump_per_frame);
        if self.interpolate {
            interpolate_ball_positions(&trimmed)
        } else {
            trimmed
        }
    }
}

/// Remove ball detections that jumped too far from the last accepted one.
///
/// The allowed movement grows linearly with the number of frames since the last
/// accepted detection. The first detection is always accepted.
pub fn trim_false_detections(ball_tracks: &[TrackFrame], max_jump_per_frame: f64) -> Vec<TrackFrame> {
    let mut cleaned = ball_tracks.to_vec();
    let mut last_valid: Option<(usize, BoundingBox)> = None;
    let mut removed = 0usize;

    for (frame_idx, frame) in cleaned.iter_mut().enumerate() {
        let Some(current) = ball_bbox(frame).copied() else {
            continue;
        };

        let Some((last_idx, last_bbox)) = last_valid else {
            last_valid = Some((frame_idx, current));
            continue;
        };

        let gap = (frame_idx - last_idx) as f64;
        let jump = distance(&current.top_left(), &last_bbox.top_left());

        if jump > max_jump_per_frame * gap {
            frame.remove(&BALL_TRACK_ID);
            removed += 1;
        } else {
            last_valid = Some((frame_idx, current));
        }
    }

    log::debug!("ball cleanup: {} false detections removed", removed);
    cleaned
}

/// Fill frames without a ball by interpolating between neighbouring detections.
///
/// Leading and trailing gaps copy the nearest detection. A series without any
/// detection is returned unchanged.
pub fn interpolate_ball_positions(ball_tracks: &[TrackFrame]) -> Vec<TrackFrame> {
    let known: Vec<(usize, BoundingBox)> = ball_tracks
        .iter()
        .enumerate()
        .filter_map(|(i, frame)| ball_bbox(frame).map(|bbox| (i, *bbox)))
        .collect();

    let (Some(&(first_idx, first)), Some(&(last_idx, last))) = (known.first(), known.last()) else {
        return ball_tracks.to_vec();
    };

    let mut filled = ball_tracks.to_vec();

    for frame in filled.iter_mut().take(first_idx) {
        frame.insert(BALL_TRACK_ID, first);
    }
    for frame in filled.iter_mut().skip(last_idx + 1) {
        frame.insert(BALL_TRACK_ID, last);
    }

    for pair in known.windows(2) {
        let (start_idx, start) = pair[0];
        let (end_idx, end) = pair[1];
        let span = (end_idx - start_idx) as f64;

        for frame_idx in (start_idx + 1)..end_idx {
            let t = (frame_idx - start_idx) as f64 / span;
            filled[frame_idx].insert(BALL_TRACK_ID, lerp(&start, &end, t));
        }
    }

    filled
}

fn lerp(a: &BoundingBox, b: &BoundingBox, t: f64) -> BoundingBox {
    let mix = |from: f64, to: f64| from + (to - from) * t;
    BoundingBox::new(mix(a.x1, b.x1), mix(a.y1, b.y1), mix(a.x2, b.x2), mix(a.y2, b.y2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ball(x: f64, y: f64) -> TrackFrame {
        let mut frame = TrackFrame::new();
        frame.insert(BALL_TRACK_ID, BoundingBox::new(x, y, x + 10.0, y + 10.0));
        frame
    }

    #[test]
    fn test_trim_removes_large_jump() {
        let tracks = vec![ball(100.0, 100.0), ball(110.0, 100.0), ball(400.0, 100.0), ball(120.0, 100.0)];
        let trimmed = trim_false_detections(&tracks, 25.0);

        assert!(ball_bbox(&trimmed[0]).is_some());
        assert!(ball_bbox(&trimmed[1]).is_some());
        assert!(ball_bbox(&trimmed[2]).is_none());
        assert!(ball_bbox(&trimmed[3]).is_some());
    }

    #[test]
    fn test_trim_allowance_grows_with_gap() {
        // 60px after a 3 frame gap is within 3 * 25px
        let tracks = vec![ball(100.0, 100.0), TrackFrame::new(), TrackFrame::new(), ball(160.0, 100.0)];
        let trimmed = trim_false_detections(&tracks, 25.0);
        assert!(ball_bbox(&trimmed[3]).is_some());

        // but not after a single frame
        let tracks = vec![ball(100.0, 100.0), ball(160.0, 100.0)];
        let trimmed = trim_false_detections(&tracks, 25.0);
        assert!(ball_bbox(&trimmed[1]).is_none());
    }

    #[test]
    fn test_interpolate_fills_gaps() {
        let tracks = vec![
            TrackFrame::new(),
            ball(100.0, 100.0),
            TrackFrame::new(),
            TrackFrame::new(),
            ball(130.0, 160.0),
            TrackFrame::new(),
        ];
        let filled = interpolate_ball_positions(&tracks);

        assert_eq!(filled.len(), 6);
        assert_eq!(ball_bbox(&filled[0]), ball_bbox(&tracks[1]));

        let mid = ball_bbox(&filled[2]).unwrap();
        assert_relative_eq!(mid.x1, 110.0, epsilon = 1e-9);
        assert_relative_eq!(mid.y1, 120.0, epsilon = 1e-9);
        let mid = ball_bbox(&filled[3]).unwrap();
        assert_relative_eq!(mid.x1, 120.0, epsilon = 1e-9);
        assert_relative_eq!(mid.y2, 150.0, epsilon = 1e-9);

        assert_eq!(ball_bbox(&filled[5]), ball_bbox(&tracks[4]));
    }

    #[test]
    fn test_interpolate_without_detections_is_noop() {
        let tracks = vec![TrackFrame::new(); 4];
        let filled = interpolate_ball_positions(&tracks);
        assert!(filled.iter().all(|frame| frame.is_empty()));
    }

    #[test]
    fn test_disabled_cleanup_returns_input() {
        let tracks = vec![ball(100.0, 100.0), ball(400.0, 100.0), TrackFrame::new()];
        let config = BallCleanupConfig { enabled: false, ..BallCleanupConfig::default() };
        assert_eq!(config.apply(&tracks), tracks);
    }

    #[test]
    fn test_apply_trims_then_interpolates() {
        let tracks = vec![ball(100.0, 100.0), ball(400.0, 100.0), ball(120.0, 100.0)];
        let cleaned = BallCleanupConfig::default().apply(&tracks);

        let middle = ball_bbox(&cleaned[1]).unwrap();
        assert_relative_eq!(middle.x1, 110.0, epsilon = 1e-9);
    }
}
