//! Per-frame track containers and identity types.

use std::collections::BTreeMap;

use nalgebra::Point2;

use crate::geometry::BoundingBox;

/// Stable identity assigned to a tracked object by the upstream tracker.
pub type TrackId = i32;

/// Team identifier (the two teams are `1` and `2`).
pub type TeamId = i32;

/// Reserved identity of the ball in every ball-track frame.
pub const BALL_TRACK_ID: TrackId = 1;

/// Integer stand-in for "nobody" used by collaborators that store plain integers.
pub const NO_ID: i32 = -1;

/// Tracks valid for exactly one frame, ordered by identity.
pub type TrackFrame = BTreeMap<TrackId, BoundingBox>;

/// Team assignment of every player in one frame.
pub type TeamFrame = BTreeMap<TrackId, TeamId>;

/// Court-map position of every mapped player in one frame.
pub type PositionFrame = BTreeMap<TrackId, Point2<f64>>;

/// Per-player scalar (meters, meters per second) in one frame.
pub type ScalarFrame = BTreeMap<TrackId, f64>;

/// Ball bounding box of a frame, if the ball was detected.
pub fn ball_bbox(frame: &TrackFrame) -> Option<&BoundingBox> {
    frame.get(&BALL_TRACK_ID)
}

/// Convert an optional-id series into the `-1` sentinel form.
pub fn sentinel_series(series: &[Option<i32>]) -> Vec<i32> {
    series.iter().map(|id| id.unwrap_or(NO_ID)).collect()
}
