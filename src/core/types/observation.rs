//! Sensor observation types.
//!
//! Observations are created by the host's transport layer, handed to the
//! fusion controller once, and discarded. Each carries its measurement,
//! the covariance in the sensor's native frame, the source frame name and
//! a timestamp in microseconds.

use serde::{Deserialize, Serialize};

use super::matrix::{Mat2, Mat3};
use super::pose::{Point2D, Pose2D};

/// Absolute heading from a compass or IMU orientation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingObservation {
    /// Yaw in radians, in the source frame
    pub yaw: f32,
    /// 3x3 orientation covariance in the source frame.
    ///
    /// Only the θθ element survives the update, but the full matrix is
    /// needed so it can be rotated into the body frame first.
    pub covariance: Mat3,
    /// Frame the measurement is expressed in
    pub frame_id: String,
    /// Timestamp in microseconds
    pub timestamp_us: u64,
}

/// Encoder displacement, in one of two reporting modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WheelDisplacement {
    /// Per-wheel travel in meters since the previous report.
    Wheels {
        /// Left wheel movement in meters
        left: f32,
        /// Right wheel movement in meters
        right: f32,
        /// 2x2 covariance over (left, right)
        covariance: Mat2,
    },
    /// A pre-integrated body-frame pose delta.
    BodyDelta {
        /// Incremental motion (Δx, Δy, Δθ) in the body frame
        delta: Pose2D,
        /// 3x3 covariance over (Δx, Δy, Δθ)
        covariance: Mat3,
    },
}

/// Relative displacement from wheel encoders.
///
/// Always reported in the robot body frame; the controller rejects any
/// other `frame_id` rather than attempting a frame conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderObservation {
    /// The measured displacement
    pub displacement: WheelDisplacement,
    /// Wheel separation in meters, must be positive
    pub separation: f32,
    /// Frame the measurement is expressed in (must be the body frame)
    pub frame_id: String,
    /// Timestamp in microseconds
    pub timestamp_us: u64,
}

/// Absolute position fix (GPS or equivalent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionObservation {
    /// Measured position in the source frame
    pub position: Point2D,
    /// 3x3 pose covariance in the source frame.
    ///
    /// The full pose block is rotated into the body frame, then the
    /// top-left 2x2 position block feeds the update.
    pub covariance: Mat3,
    /// Frame the measurement is expressed in
    pub frame_id: String,
    /// Timestamp in microseconds
    pub timestamp_us: u64,
}

/// A single sensor observation, tagged by modality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Observation {
    /// Compass/IMU heading
    Heading(HeadingObservation),
    /// Wheel encoder displacement
    Encoders(EncoderObservation),
    /// Absolute position fix
    Position(PositionObservation),
}

impl Observation {
    /// Source frame of the observation.
    pub fn frame_id(&self) -> &str {
        match self {
            Observation::Heading(o) => &o.frame_id,
            Observation::Encoders(o) => &o.frame_id,
            Observation::Position(o) => &o.frame_id,
        }
    }

    /// Timestamp in microseconds.
    pub fn timestamp_us(&self) -> u64 {
        match self {
            Observation::Heading(o) => o.timestamp_us,
            Observation::Encoders(o) => o.timestamp_us,
            Observation::Position(o) => o.timestamp_us,
        }
    }
}
