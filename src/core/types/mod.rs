//! Core data types for pose fusion.
//!
//! - [`Point2D`]: 2D point in meters
//! - [`Pose2D`]: Robot pose (x, y, theta) in meters and radians
//! - [`Mat2`], [`Mat3`]: Fixed-size row-major matrices for covariance and rotation math
//! - [`Twist2D`]: 2D velocity (linear and angular)
//! - [`Observation`]: Tagged union over the three sensor modalities

mod matrix;
mod observation;
mod pose;
mod twist;

pub use matrix::{Mat2, Mat3};
pub use observation::{
    EncoderObservation, HeadingObservation, Observation, PositionObservation, WheelDisplacement,
};
pub use pose::{Point2D, Pose2D};
pub use twist::Twist2D;
