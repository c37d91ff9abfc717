//! Ball possession inference.
//!
//! Frame-local candidate selection (containment first, then key-point distance)
//! followed by a debounce that only reports a holder after a minimum run of
//! consecutive wins.

mod candidate;
mod detector;

pub use candidate::{containment_ratio, find_best_candidate, key_points, min_distance_to_ball};
pub use detector::{PossessionConfig, PossessionDetector, PossessionStreak};
