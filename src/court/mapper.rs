//! Projection of player foot positions onto the court map.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::court::homography::{Homography, MIN_CORRESPONDENCES};
use crate::court::layout::CourtLayout;
use crate::tracks::{PositionFrame, TrackFrame};
use crate::utils::{ensure_frame_count, is_detected};
use crate::{Error, Result};

/// Configuration for the position mapper.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Minimum number of detected keypoints needed to build a frame's homography.
    pub min_keypoints: usize,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            min_keypoints: MIN_CORRESPONDENCES,
        }
    }
}

/// Maps tracked players into court-map pixel space, one homography per frame.
///
/// Frames whose homography cannot be built yield no positions, and players whose
/// foot position cannot be transformed are left out of their frame; neither aborts
/// the run.
#[derive(Debug, Clone)]
pub struct PositionMapper {
    map_keypoints: Vec<Point2<f64>>,
    config: MapperConfig,
}

impl PositionMapper {
    /// Create a mapper targeting the given court layout.
    pub fn new(layout: &CourtLayout, config: MapperConfig) -> Result<Self> {
        layout.validate()?;

        if config.min_keypoints < MIN_CORRESPONDENCES {
            return Err(Error::InvalidConfig(format!(
                "min_keypoints must be at least {}",
                MIN_CORRESPONDENCES
            )));
        }

        Ok(Self {
            map_keypoints: layout.keypoints(),
            config,
        })
    }

    /// Map every frame's players. Both series must have the same length.
    pub fn map_positions(
        &self,
        keypoints: &[Vec<Point2<f64>>],
        player_tracks: &[TrackFrame],
    ) -> Result<Vec<PositionFrame>> {
        ensure_frame_count("court_keypoints", player_tracks.len(), keypoints.len())?;

        let positions = keypoints
            .iter()
            .zip(player_tracks.iter())
            .enumerate()
            .map(|(frame_idx, (frame_keypoints, players))| {
                self.map_frame(frame_idx, frame_keypoints, players)
            })
            .collect::<Result<Vec<_>>>()?;

        let mapped_frames = positions.iter().filter(|frame| !frame.is_empty()).count();
        log::debug!(
            "position mapping: {} of {} frames mapped",
            mapped_frames,
            positions.len()
        );

        Ok(positions)
    }

    /// Map the players of a single frame.
    pub fn map_frame(
        &self,
        frame_idx: usize,
        keypoints: &[Point2<f64>],
        players: &TrackFrame,
    ) -> Result<PositionFrame> {
        let mut positions = PositionFrame::new();

        let Some(homography) = self.frame_homography(frame_idx, keypoints)? else {
            return Ok(positions);
        };

        for (&player_id, bbox) in players {
            match homography.transform_point(&bbox.foot_position()) {
                Ok(point) => {
                    positions.insert(player_id, point);
                }
                Err(e) => {
                    log::warn!("frame {}: skipping player {}: {}", frame_idx, player_id, e);
                }
            }
        }

        Ok(positions)
    }

    /// Build the frame's image-to-map homography from its detected keypoints.
    ///
    /// Returns `Ok(None)` when the frame does not carry one entry per reference
    /// keypoint, when too few are detected, or when the solve fails.
    pub fn frame_homography(&self, frame_idx: usize, keypoints: &[Point2<f64>]) -> Result<Option<Homography>> {
        if keypoints.len() != self.map_keypoints.len() {
            log::warn!(
                "frame {}: expected {} keypoints, got {}; not mapping",
                frame_idx,
                self.map_keypoints.len(),
                keypoints.len()
            );
            return Ok(None);
        }

        // Pair by keypoint identity, never by position in the filtered list
        let (source, target): (Vec<Point2<f64>>, Vec<Point2<f64>>) = keypoints
            .iter()
            .zip(self.map_keypoints.iter())
            .filter(|(detected, _)| is_detected(detected))
            .map(|(detected, reference)| (*detected, *reference))
            .unzip();

        if source.len() < self.config.min_keypoints {
            log::trace!(
                "frame {}: {} keypoints detected, not mapping",
                frame_idx,
                source.len()
            );
            return Ok(None);
        }

        match Homography::from_points(&source, &target) {
            Ok(homography) => Ok(Some(homography)),
            Err(e) => {
                log::warn!("frame {}: homography failed: {}", frame_idx, e);
                Ok(None)
            }
        }
    }
}
