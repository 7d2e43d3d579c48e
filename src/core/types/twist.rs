//! Velocity types.

use serde::{Deserialize, Serialize};

/// 2D velocity: linear (m/s, along the body x axis) and angular (rad/s).
///
/// The fusion core does not estimate velocity; this type carries the
/// dead-reckoned twist a host feeds in for published pose records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Twist2D {
    /// Linear velocity in m/s
    pub linear: f32,
    /// Angular velocity in rad/s (CCW positive)
    pub angular: f32,
}

impl Twist2D {
    /// Create a new twist.
    #[inline]
    pub fn new(linear: f32, angular: f32) -> Self {
        Self { linear, angular }
    }
}

impl Default for Twist2D {
    fn default() -> Self {
        Self {
            linear: 0.0,
            angular: 0.0,
        }
    }
}
