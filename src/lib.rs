//! # courtvision - Basketball Tracking Analytics
//!
//! Turns per-frame detector and tracker output from a basketball broadcast into
//! stable, frame-aligned analytics series.
//!
//! ## Features
//!
//! - Debounced ball possession from player/ball bounding boxes
//! - Pass and interception events from possession changes and team assignments
//! - Court keypoint validation and image-to-court homography mapping
//! - Player distance and sliding-window speed in real-world units
//! - Ball track cleanup (jump rejection, gap interpolation) and team statistics
//!
//! All processing is offline: every component consumes fully materialized
//! per-frame series and produces series of the same length.
//!
//! ## Example
//!
//! ```rust,ignore
//! use courtvision::{AnalysisInput, Analyzer, AnalyzerConfig};
//!
//! let analyzer = Analyzer::new(AnalyzerConfig::default()).unwrap();
//! let output = analyzer.analyze(&AnalysisInput {
//!     player_tracks,
//!     ball_tracks,
//!     court_keypoints,
//!     team_assignments,
//! })?;
//!
//! println!("passes: {:?}", output.passes);
//! ```

// Public modules
pub mod geometry;
pub mod tracks;
pub mod court;
pub mod possession;
pub mod events;
pub mod kinematics;
pub mod ball;
pub mod stats;
pub mod pipeline;
pub mod utils;

// Re-exports for convenience
pub use geometry::BoundingBox;
pub use tracks::{
    TrackId, TeamId, TrackFrame, TeamFrame, PositionFrame, ScalarFrame, BALL_TRACK_ID, sentinel_series,
};
pub use court::{CourtLayout, Homography, KeypointValidator, PositionMapper};
pub use possession::{PossessionConfig, PossessionDetector};
pub use events::EventDetector;
pub use kinematics::{KinematicsConfig, KinematicsEstimator};
pub use pipeline::{AnalysisInput, AnalysisOutput, Analyzer, AnalyzerConfig};

// Error types
pub use crate::error::{Error, Result};

mod error {
    use thiserror::Error;

    /// Errors that can occur in the courtvision library
    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Invalid configuration: {0}")]
        InvalidConfig(String),

        #[error("Invalid input: {0}")]
        InvalidInput(String),

        #[error("Degenerate geometry: {0}")]
        DegenerateGeometry(String),

        #[error("Invalid bounding box: {0}")]
        InvalidBoundingBox(String),

        #[error("Series length mismatch: {series} has {got} frames, expected {expected}")]
        SeriesLengthMismatch {
            series: String,
            expected: usize,
            got: usize,
        },
    }

    /// Result type for courtvision operations
    pub type Result<T> = std::result::Result<T, Error>;
}
