//! End-to-end analysis of one video's detector and tracker output.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::ball::BallCleanupConfig;
use crate::court::{CourtLayout, KeypointValidator, MapperConfig, PositionMapper, ValidatorConfig};
use crate::events::EventDetector;
use crate::kinematics::{KinematicsConfig, KinematicsEstimator};
use crate::possession::{PossessionConfig, PossessionDetector};
use crate::stats;
use crate::tracks::{PositionFrame, ScalarFrame, TeamFrame, TeamId, TrackFrame, TrackId};
use crate::utils::ensure_frame_count;
use crate::Result;

/// Configuration for every stage of the analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub layout: CourtLayout,
    pub ball_cleanup: BallCleanupConfig,
    pub possession: PossessionConfig,
    pub validator: ValidatorConfig,
    pub mapper: MapperConfig,
    pub kinematics: KinematicsConfig,
}

/// Per-frame inputs for one video. All series must have the same length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub player_tracks: Vec<TrackFrame>,
    pub ball_tracks: Vec<TrackFrame>,
    /// Detected court keypoints in image space, 18 per frame.
    pub court_keypoints: Vec<Vec<Point2<f64>>>,
    pub team_assignments: Vec<TeamFrame>,
}

impl AnalysisInput {
    /// Number of frames, taken from the player tracks.
    pub fn frame_count(&self) -> usize {
        self.player_tracks.len()
    }
}

/// Every analytics series for one video, each with one entry per frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutput {
    /// Ball tracks after jump rejection and interpolation.
    pub ball_tracks: Vec<TrackFrame>,
    pub possession: Vec<Option<TrackId>>,
    pub passes: Vec<Option<TeamId>>,
    pub interceptions: Vec<Option<TeamId>>,
    pub team_ball_control: Vec<Option<TeamId>>,
    /// Keypoints with geometrically inconsistent detections zeroed out.
    pub validated_keypoints: Vec<Vec<Point2<f64>>>,
    pub positions: Vec<PositionFrame>,
    pub distances: Vec<ScalarFrame>,
    pub speeds: Vec<ScalarFrame>,
    pub cumulative_distances: Vec<ScalarFrame>,
}

impl AnalysisOutput {
    pub fn frame_count(&self) -> usize {
        self.possession.len()
    }

    /// Percentage of frames up to `frame` that `team` controlled the ball.
    pub fn control_share(&self, frame: usize, team: TeamId) -> f64 {
        stats::control_share(&self.team_ball_control, frame, team)
    }

    /// Passes by `team` up to and including `frame`.
    pub fn pass_count(&self, frame: usize, team: TeamId) -> usize {
        stats::event_count(&self.passes, frame, team)
    }

    /// Interceptions by `team` up to and including `frame`.
    pub fn interception_count(&self, frame: usize, team: TeamId) -> usize {
        stats::event_count(&self.interceptions, frame, team)
    }
}

/// Runs the whole analysis chain.
///
/// The ball chain (cleanup, possession, events, team control) and the court chain
/// (keypoint validation, mapping, kinematics) are independent of each other and
/// each runs strictly in frame order.
#[derive(Debug, Clone)]
pub struct Analyzer {
    /// Analyzer configuration.
    pub config: AnalyzerConfig,
    possession: PossessionDetector,
    events: EventDetector,
    validator: KeypointValidator,
    mapper: PositionMapper,
    kinematics: KinematicsEstimator,
}

impl Analyzer {
    /// Create a new analyzer, validating every stage's configuration.
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        config.ball_cleanup.validate()?;

        let possession = PossessionDetector::new(config.possession)?;
        let validator = KeypointValidator::new(&config.layout, config.validator)?;
        let mapper = PositionMapper::new(&config.layout, config.mapper)?;
        let kinematics = KinematicsEstimator::new(&config.layout, config.kinematics)?;

        Ok(Self {
            config,
            possession,
            events: EventDetector::new(),
            validator,
            mapper,
            kinematics,
        })
    }

    /// Analyze one video.
    ///
    /// Fails before doing any work if the input series have different lengths.
    pub fn analyze(&self, input: &AnalysisInput) -> Result<AnalysisOutput> {
        let frames = input.frame_count();
        ensure_frame_count("ball_tracks", frames, input.ball_tracks.len())?;
        ensure_frame_count("court_keypoints", frames, input.court_keypoints.len())?;
        ensure_frame_count("team_assignments", frames, input.team_assignments.len())?;

        log::debug!("analyzing {} frames", frames);

        // Ball chain
        let ball_tracks = self.config.ball_cleanup.apply(&input.ball_tracks);
        let possession = self.possession.detect(&input.player_tracks, &ball_tracks)?;
        let passes = self.events.detect_passes(&possession, &input.team_assignments)?;
        let interceptions = self.events.detect_interceptions(&possession, &input.team_assignments)?;
        let team_ball_control = stats::team_ball_control(&possession, &input.team_assignments)?;

        log::debug!(
            "events: {} passes, {} interceptions",
            passes.iter().filter(|p| p.is_some()).count(),
            interceptions.iter().filter(|i| i.is_some()).count()
        );

        // Court chain
        let validated_keypoints = self.validator.validate(&input.court_keypoints)?;
        let positions = self.mapper.map_positions(&validated_keypoints, &input.player_tracks)?;
        let distances = self.kinematics.distances(&positions);
        let speeds = self.kinematics.speeds(&distances);
        let cumulative_distances = stats::cumulative_distances(&distances);

        Ok(AnalysisOutput {
            ball_tracks,
            possession,
            passes,
            interceptions,
            team_ball_control,
            validated_keypoints,
            positions,
            distances,
            speeds,
            cumulative_distances,
        })
    }
}
