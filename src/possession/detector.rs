//! Debounced ball possession over a whole video.

use serde::{Deserialize, Serialize};

use crate::possession::candidate::find_best_candidate;
use crate::tracks::{ball_bbox, TrackFrame, TrackId};
use crate::utils::ensure_frame_count;
use crate::{Error, Result};

/// Configuration for the possession detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PossessionConfig {
    /// Fraction of the ball's box a player must cover for tight possession.
    pub containment_threshold: f64,

    /// Maximum key-point distance (pixels) for loose possession.
    pub max_loose_distance: f64,

    /// Consecutive winning frames before a candidate is reported as holder.
    pub min_streak_frames: usize,
}

impl Default for PossessionConfig {
    fn default() -> Self {
        Self {
            containment_threshold: 0.8,
            max_loose_distance: 50.0,
            min_streak_frames: 11,
        }
    }
}

/// Running streak of the current frame-local leader.
///
/// A single leader is tracked: any change of leader, or a frame without one,
/// restarts the count from zero. A player who regains the lead after someone
/// else held it briefly starts over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PossessionStreak {
    leader: Option<TrackId>,
    length: usize,
}

impl PossessionStreak {
    /// Record one frame's candidate and return the new streak length.
    pub fn observe(&mut self, candidate: Option<TrackId>) -> usize {
        match candidate {
            Some(player_id) if self.leader == Some(player_id) => {
                self.length += 1;
            }
            Some(player_id) => {
                self.leader = Some(player_id);
                self.length = 1;
            }
            None => {
                *self = Self::default();
            }
        }
        self.length
    }

    pub fn leader(&self) -> Option<TrackId> {
        self.leader
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// The leader, once its streak has reached `min_frames`.
    pub fn confirmed(&self, min_frames: usize) -> Option<TrackId> {
        self.leader.filter(|_| self.length >= min_frames)
    }
}

/// Detects which player holds the ball in every frame.
///
/// Per frame, the best candidate is chosen from containment and distance; it is
/// only reported once it has won `min_streak_frames` frames in a row. Frames
/// without a ball detection report no holder and leave the streak untouched.
#[derive(Debug, Clone)]
pub struct PossessionDetector {
    /// Detector configuration.
    pub config: PossessionConfig,
}

impl PossessionDetector {
    /// Create a new detector with the given configuration.
    pub fn new(config: PossessionConfig) -> Result<Self> {
        if !(0.0..=1.0).contains(&config.containment_threshold) {
            return Err(Error::InvalidConfig(
                "containment_threshold must be within [0, 1]".to_string(),
            ));
        }
        if !config.max_loose_distance.is_finite() || config.max_loose_distance < 0.0 {
            return Err(Error::InvalidConfig(
                "max_loose_distance must be non-negative".to_string(),
            ));
        }
        if config.min_streak_frames == 0 {
            return Err(Error::InvalidConfig(
                "min_streak_frames must be at least 1".to_string(),
            ));
        }

        Ok(Self { config })
    }

    /// Best frame-local candidate, without debouncing.
    pub fn frame_candidate(&self, players: &TrackFrame, balls: &TrackFrame) -> Option<TrackId> {
        let ball = ball_bbox(balls)?;
        find_best_candidate(
            ball,
            players,
            self.config.containment_threshold,
            self.config.max_loose_distance,
        )
    }

    /// Compute the possession series. Both inputs must have the same length.
    pub fn detect(&self, player_tracks: &[TrackFrame], ball_tracks: &[TrackFrame]) -> Result<Vec<Option<TrackId>>> {
        ensure_frame_count("player_tracks", ball_tracks.len(), player_tracks.len())?;

        let mut possession = vec![None; ball_tracks.len()];
        let mut streak = PossessionStreak::default();

        for (frame_idx, (players, balls)) in player_tracks.iter().zip(ball_tracks.iter()).enumerate() {
            let Some(ball) = ball_bbox(balls) else {
                continue;
            };

            let candidate = find_best_candidate(
                ball,
                players,
                self.config.containment_threshold,
                self.config.max_loose_distance,
            );

            streak.observe(candidate);
            if let Some(holder) = streak.confirmed(self.config.min_streak_frames) {
                possession[frame_idx] = Some(holder);
                if streak.length() == self.config.min_streak_frames {
                    log::trace!("frame {}: possession confirmed for player {}", frame_idx, holder);
                }
            }
        }

        log::debug!(
            "possession: {} of {} frames have a holder",
            possession.iter().filter(|p| p.is_some()).count(),
            possession.len()
        );

        Ok(possession)
    }

    /// Debounce an already computed series of frame-local candidates.
    pub fn debounce(&self, candidates: &[Option<TrackId>]) -> Vec<Option<TrackId>> {
        let mut streak = PossessionStreak::default();
        candidates
            .iter()
            .map(|&candidate| {
                streak.observe(candidate);
                streak.confirmed(self.config.min_streak_frames)
            })
            .collect()
    }
}
