//! Court-space mapping.
//!
//! This module projects image-space player positions onto a fixed court diagram:
//!
//! - Fixed court layout and its 18 reference keypoints
//! - Per-frame keypoint validation against the layout
//! - Homography estimation from keypoint correspondences
//! - Per-frame player position mapping

mod homography;
mod layout;
mod mapper;
mod validator;

pub use homography::{Homography, MIN_CORRESPONDENCES};
pub use layout::{CourtLayout, NUM_COURT_KEYPOINTS};
pub use mapper::{MapperConfig, PositionMapper};
pub use validator::{KeypointValidator, ValidatorConfig};
