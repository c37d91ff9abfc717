//! Team-level tallies derived from possession, events and distances.

use crate::tracks::{ScalarFrame, TeamFrame, TeamId, TrackId, NO_ID};
use crate::utils::ensure_frame_count;
use crate::Result;

/// Team in control of the ball at every frame.
///
/// A frame without a holder, or whose holder has no team in that frame, yields `None`.
pub fn team_ball_control(possession: &[Option<TrackId>], teams: &[TeamFrame]) -> Result<Vec<Option<TeamId>>> {
    ensure_frame_count("team_assignments", possession.len(), teams.len())?;

    Ok(possession
        .iter()
        .zip(teams.iter())
        .map(|(holder, frame_teams)| {
            holder
                .and_then(|player_id| frame_teams.get(&player_id).copied())
                .filter(|&team| team != NO_ID)
        })
        .collect())
}

/// Percentage (0 to 100) of frames `0..=frame` in which `team` controlled the ball.
///
/// Frames past the end of the series are ignored.
pub fn control_share(control: &[Option<TeamId>], frame: usize, team: TeamId) -> f64 {
    let upto = control.len().min(frame + 1);
    if upto == 0 {
        return 0.0;
    }

    let controlled = control[..upto].iter().filter(|&&c| c == Some(team)).count();
    controlled as f64 / upto as f64 * 100.0
}

/// Number of events tagged `team` within frames `0..=frame`.
pub fn event_count(events: &[Option<TeamId>], frame: usize, team: TeamId) -> usize {
    events
        .iter()
        .take(frame.saturating_add(1))
        .filter(|&&e| e == Some(team))
        .count()
}

/// Running total distance per player.
///
/// Every player seen so far keeps an entry, including in frames where they
/// did not move or were not mapped.
pub fn cumulative_distances(distances: &[ScalarFrame]) -> Vec<ScalarFrame> {
    let mut totals = ScalarFrame::new();

    distances
        .iter()
        .map(|frame| {
            for (&player_id, &dist) in frame {
                *totals.entry(player_id).or_insert(0.0) += dist;
            }
            totals.clone()
        })
        .collect()
}
