//! Coordinate frame math and the frame-lookup seam.
//!
//! The fusion core never owns a frame graph; it consumes rotations and
//! chained transforms that a host resolves through [`FrameProvider`].
//! This module holds the two pieces of frame-aware math the pipeline
//! needs:
//!
//! - [`rotate_covariance`]: express a covariance from a sensor's frame in
//!   the robot body frame
//! - [`correction_transform`]: derive the world→odom correction that keeps
//!   the published frame tree single-parented

mod composer;
mod provider;
mod rotation;

pub use composer::correction_transform;
pub use provider::{FrameError, FrameProvider};
pub use rotation::{rotate_covariance, FrameRotation};
