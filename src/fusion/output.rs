//! Published output types and the publisher seam.

use serde::{Deserialize, Serialize};

use crate::core::types::{Pose2D, Twist2D};

/// The world→odom correction transform produced on a publishing update.
///
/// A fresh value every time; consumers rebroadcast it into their frame
/// graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputTransform {
    /// Parent frame (the world frame)
    pub parent_frame: String,
    /// Child frame (the odometry frame)
    pub child_frame: String,
    /// The correction transform T1 = T3 · T2⁻¹
    pub transform: Pose2D,
    /// Timestamp in microseconds
    pub timestamp_us: u64,
}

/// Fused pose record emitted alongside the correction transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputPose {
    /// Frame the record is stamped in (the odometry frame)
    pub frame_id: String,
    /// Timestamp in microseconds
    pub timestamp_us: u64,
    /// The fused (x, y, theta) estimate
    pub pose: Pose2D,
    /// Whether the pose covariance is populated. Always false here: the
    /// filter tracks a 3x3 planar covariance, not the full pose
    /// covariance this record would need.
    pub covariance_valid: bool,
    /// Velocity from the host's dead-reckoning source
    pub velocity: Twist2D,
    /// Whether the velocity covariance is populated (always false)
    pub velocity_valid: bool,
}

/// External consumer of fusion outputs.
///
/// Implemented by the host over its transport; implemented by a recording
/// stub in tests. Publishing must not fail back into the controller, so
/// the method is infallible; hosts handle their own IO errors.
pub trait OutputPublisher {
    /// Deliver one publishing update's transform and pose record.
    fn publish(&mut self, transform: &OutputTransform, pose: &OutputPose);
}
