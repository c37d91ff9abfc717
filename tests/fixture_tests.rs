//! Fixture tests for courtvision.
//!
//! Reference scenarios are stored as JSON under `testdata/fixtures/`, using the
//! `-1` sentinel convention of the downstream collaborators.
//!
//! Run with: cargo test fixture

use approx::assert_relative_eq;
use nalgebra::Point2;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use courtvision::court::{MapperConfig, ValidatorConfig};
use courtvision::{
    sentinel_series, BoundingBox, CourtLayout, EventDetector, KeypointValidator, PositionMapper,
    PossessionConfig, PossessionDetector, TeamFrame, TrackFrame, TrackId, BALL_TRACK_ID,
};

// ============================================================================
// Fixture JSON Schema
// ============================================================================

#[derive(Debug, Deserialize)]
struct PossessionFixture {
    players: TrackFrame,
    scenarios: Vec<PossessionScenario>,
}

#[derive(Debug, Deserialize)]
struct PossessionScenario {
    name: String,
    ball: Vec<Option<BoundingBox>>,
    expected_possession: Vec<i32>,
}

#[derive(Debug, Deserialize)]
struct EventFixture {
    scenarios: Vec<EventScenario>,
}

#[derive(Debug, Deserialize)]
struct EventScenario {
    name: String,
    possession: Vec<i32>,
    teams: TeamFrame,
    expected_passes: Vec<i32>,
    expected_interceptions: Vec<i32>,
}

#[derive(Debug, Deserialize)]
struct CourtFixture {
    #[allow(dead_code)]
    description: String,
    frames: Vec<CourtFrame>,
}

#[derive(Debug, Deserialize)]
struct CourtFrame {
    keypoints: Vec<[f64; 2]>,
    players: TrackFrame,
    expected_rejected: Vec<usize>,
    expected_positions: BTreeMap<TrackId, [f64; 2]>,
}

// ============================================================================
// Test Helpers
// ============================================================================

fn find_testdata_dir() -> PathBuf {
    let candidates = [
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata/fixtures"),
        PathBuf::from("testdata/fixtures"),
    ];

    for candidate in &candidates {
        if candidate.exists() {
            return candidate.clone();
        }
    }
    panic!("Could not find testdata/fixtures directory");
}

fn load_fixture<T: for<'de> Deserialize<'de>>(scenario: &str) -> T {
    let path = find_testdata_dir().join(format!("fixture_{}.json", scenario));

    let content = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture file {:?}: {}", path, e));

    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture file {:?}: {}", path, e))
}

fn from_sentinel(series: &[i32]) -> Vec<Option<TrackId>> {
    series.iter().map(|&id| (id != -1).then_some(id)).collect()
}

// ============================================================================
// Fixture Tests
// ============================================================================

#[test]
fn test_fixture_possession() {
    let fixture: PossessionFixture = load_fixture("possession");
    let detector = PossessionDetector::new(PossessionConfig::default()).unwrap();
    let players = &fixture.players;

    for scenario in &fixture.scenarios {
        let ball_tracks: Vec<TrackFrame> = scenario
            .ball
            .iter()
            .map(|ball| {
                let mut frame = TrackFrame::new();
                if let Some(bbox) = ball {
                    frame.insert(BALL_TRACK_ID, *bbox);
                }
                frame
            })
            .collect();
        let player_tracks = vec![players.clone(); ball_tracks.len()];

        let possession = detector.detect(&player_tracks, &ball_tracks).unwrap();

        assert_eq!(
            sentinel_series(&possession),
            scenario.expected_possession,
            "scenario {}",
            scenario.name
        );
    }
}

#[test]
fn test_fixture_events() {
    let fixture: EventFixture = load_fixture("events");

    for scenario in &fixture.scenarios {
        let possession = from_sentinel(&scenario.possession);
        let teams = vec![scenario.teams.clone(); possession.len()];

        let passes = EventDetector.detect_passes(&possession, &teams).unwrap();
        let interceptions = EventDetector.detect_interceptions(&possession, &teams).unwrap();

        assert_eq!(sentinel_series(&passes), scenario.expected_passes, "scenario {}", scenario.name);
        assert_eq!(
            sentinel_series(&interceptions),
            scenario.expected_interceptions,
            "scenario {}",
            scenario.name
        );
    }
}

#[test]
fn test_fixture_court_mapping() {
    let fixture: CourtFixture = load_fixture("court");
    let layout = CourtLayout::default();
    let validator = KeypointValidator::new(&layout, ValidatorConfig::default()).unwrap();
    let mapper = PositionMapper::new(&layout, MapperConfig::default()).unwrap();

    for (frame_idx, frame) in fixture.frames.iter().enumerate() {
        let keypoints: Vec<Point2<f64>> = frame.keypoints.iter().map(|&[x, y]| Point2::new(x, y)).collect();

        let validated = validator.validate_frame(frame_idx, &keypoints).unwrap();
        let rejected: Vec<usize> = (0..keypoints.len())
            .filter(|&i| keypoints[i] != validated[i])
            .collect();
        assert_eq!(rejected, frame.expected_rejected, "frame {}", frame_idx);

        let positions = mapper
            .map_frame(frame_idx, &validated, &frame.players)
            .unwrap();

        assert_eq!(
            positions.keys().collect::<Vec<_>>(),
            frame.expected_positions.keys().collect::<Vec<_>>(),
            "frame {}",
            frame_idx
        );
        for (player_id, &[x, y]) in &frame.expected_positions {
            assert_relative_eq!(positions[player_id].x, x, epsilon = 1e-6);
            assert_relative_eq!(positions[player_id].y, y, epsilon = 1e-6);
        }
    }
}
