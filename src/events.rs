//! Pass and interception events from possession changes.

use crate::tracks::{TeamFrame, TeamId, TrackId, NO_ID};
use crate::utils::ensure_frame_count;
use crate::Result;

/// A change of ball holder between two possessed frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HolderTransition {
    /// Frame at which the new holder appears.
    pub frame: usize,
    /// Last frame in which the previous holder had the ball.
    pub previous_frame: usize,
    pub previous_holder: TrackId,
    pub current_holder: TrackId,
}

/// Every frame at which the holder differs from the last known holder.
///
/// Frames without a holder are skipped; the last known holder carries forward
/// across them.
pub fn holder_transitions(possession: &[Option<TrackId>]) -> Vec<HolderTransition> {
    let mut transitions = Vec::new();
    let mut last: Option<(usize, TrackId)> = None;

    for (frame, holder) in possession.iter().enumerate() {
        let Some(current_holder) = *holder else {
            continue;
        };

        if let Some((previous_frame, previous_holder)) = last {
            if previous_holder != current_holder {
                transitions.push(HolderTransition {
                    frame,
                    previous_frame,
                    previous_holder,
                    current_holder,
                });
            }
        }
        last = Some((frame, current_holder));
    }

    transitions
}

/// Detects passes (same-team holder changes) and interceptions (cross-team changes).
///
/// Each holder's team is looked up in the assignment of the frame where that holder
/// had the ball. A holder missing from its frame's assignment produces no event.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventDetector;

impl EventDetector {
    pub fn new() -> Self {
        Self
    }

    /// Team id at every frame where a pass completes.
    pub fn detect_passes(
        &self,
        possession: &[Option<TrackId>],
        teams: &[TeamFrame],
    ) -> Result<Vec<Option<TeamId>>> {
        self.detect_events(possession, teams, |previous_team, current_team| {
            (previous_team == current_team).then_some(current_team)
        })
    }

    /// Intercepting team id at every frame where possession changes teams.
    pub fn detect_interceptions(
        &self,
        possession: &[Option<TrackId>],
        teams: &[TeamFrame],
    ) -> Result<Vec<Option<TeamId>>> {
        self.detect_events(possession, teams, |previous_team, current_team| {
            (previous_team != current_team).then_some(current_team)
        })
    }

    fn detect_events<F>(
        &self,
        possession: &[Option<TrackId>],
        teams: &[TeamFrame],
        classify: F,
    ) -> Result<Vec<Option<TeamId>>>
    where
        F: Fn(TeamId, TeamId) -> Option<TeamId>,
    {
        ensure_frame_count("team_assignments", possession.len(), teams.len())?;

        let mut events = vec![None; possession.len()];
        for transition in holder_transitions(possession) {
            let previous_team = team_of(&teams[transition.previous_frame], transition.previous_holder);
            let current_team = team_of(&teams[transition.frame], transition.current_holder);

            if let (Some(previous_team), Some(current_team)) = (previous_team, current_team) {
                events[transition.frame] = classify(previous_team, current_team);
            }
        }

        Ok(events)
    }
}

fn team_of(teams: &TeamFrame, player_id: TrackId) -> Option<TeamId> {
    teams.get(&player_id).copied().filter(|&team| team != NO_ID)
}
