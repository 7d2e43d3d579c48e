//! Fusion controller configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the fusion controller.
///
/// Passed at construction; there is no ambient or process-global
/// configuration, so tests run deterministically against a plain struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionConfig {
    /// Publish an output after every heading update
    pub publish_on_heading: bool,
    /// Publish an output after every encoder update
    pub publish_on_encoders: bool,
    /// Publish an output after every position update
    pub publish_on_gps: bool,

    /// Fixed world frame the fused estimate lives in
    pub world_frame: String,
    /// Drifting dead-reckoning frame tracked by the odometry source
    pub odom_frame: String,
    /// Frame rigidly attached to the robot chassis
    pub base_frame: String,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            publish_on_heading: true,
            publish_on_encoders: true,
            publish_on_gps: true,
            world_frame: "/map".to_string(),
            odom_frame: "/odom".to_string(),
            base_frame: "/base_footprint".to_string(),
        }
    }
}
