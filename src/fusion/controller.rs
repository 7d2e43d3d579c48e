//! The per-observation fusion pipeline.

use crate::core::math::normalize_angle;
use crate::core::types::{
    EncoderObservation, HeadingObservation, Observation, PositionObservation, Twist2D,
};
use crate::estimator::{FilterError, PoseFilter};
use crate::frames::{correction_transform, rotate_covariance, FrameError, FrameProvider};

use super::config::FusionConfig;
use super::output::{OutputPose, OutputPublisher, OutputTransform};

/// Why an observation was discarded without touching the estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// Failed modality-specific validation (wrong frame, bad separation,
    /// non-finite values)
    InvalidInput,
    /// The frame graph could not resolve the needed rotation or transform
    MissingTransform,
    /// The filter update failed numerically; the last good state stands
    NumericFailure,
}

/// Outcome of one pass through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    /// The filter was updated. `published` reports whether an output was
    /// emitted (the modality's flag was set and the odometry chain
    /// resolved).
    Applied {
        /// Whether an output pair was handed to the publisher
        published: bool,
    },
    /// The observation was dropped; the estimator is unchanged.
    Discarded(DiscardReason),
}

/// Orchestrates sensor observations through the estimator.
///
/// Each call to [`handle_observation`](Self::handle_observation) runs one
/// observation to completion: validation, frame resolution, covariance
/// rotation, filter update, and (per the modality's publish flag) output
/// composition. Processing is strictly serialized by `&mut self`; hosts
/// with threaded transports put the controller behind their own
/// single-owner executor or mutex.
///
/// Every failure path is fail-soft: log, discard, keep the last good
/// estimate. The controller never panics on observation content.
pub struct FusionController {
    config: FusionConfig,
    filter: PoseFilter,
    frames: Box<dyn FrameProvider>,
    publisher: Box<dyn OutputPublisher>,
    /// Dead-reckoned velocity echoed into published pose records.
    velocity: Twist2D,
}

impl FusionController {
    /// Create a controller around an estimator and the host's seams.
    pub fn new(
        config: FusionConfig,
        filter: PoseFilter,
        frames: Box<dyn FrameProvider>,
        publisher: Box<dyn OutputPublisher>,
    ) -> Self {
        Self {
            config,
            filter,
            frames,
            publisher,
            velocity: Twist2D::default(),
        }
    }

    /// Feed the dead-reckoned twist used in published pose records.
    pub fn set_velocity(&mut self, velocity: Twist2D) {
        self.velocity = velocity;
    }

    /// Snapshot of the fused pose.
    pub fn pose(&self) -> crate::core::types::Pose2D {
        self.filter.pose()
    }

    /// Snapshot of the fused covariance.
    pub fn covariance(&self) -> crate::core::types::Mat3 {
        self.filter.covariance()
    }

    /// Process one observation to completion.
    pub fn handle_observation(&mut self, observation: &Observation) -> UpdateStatus {
        match observation {
            Observation::Heading(obs) => self.handle_heading(obs),
            Observation::Encoders(obs) => self.handle_encoders(obs),
            Observation::Position(obs) => self.handle_position(obs),
        }
    }

    fn handle_heading(&mut self, obs: &HeadingObservation) -> UpdateStatus {
        let rotation = match self.frames.lookup_rotation(
            &self.config.base_frame,
            &obs.frame_id,
            obs.timestamp_us,
        ) {
            Ok(rotation) => rotation,
            Err(e) => {
                log::warn!("heading observation dropped: {}", e);
                return UpdateStatus::Discarded(DiscardReason::MissingTransform);
            }
        };

        // Carry the yaw into the body frame, then rotate the covariance
        // the same way and keep its θθ element.
        let yaw_base = normalize_angle(obs.yaw + rotation.yaw());
        let cov_base = rotate_covariance(&obs.covariance, &rotation);
        let variance = cov_base.at(2, 2);

        match self.filter.update_heading(yaw_base, variance) {
            Ok(()) => self.finish_update(self.config.publish_on_heading, obs.timestamp_us),
            Err(e) => self.discard_for_filter_error("heading", e),
        }
    }

    fn handle_encoders(&mut self, obs: &EncoderObservation) -> UpdateStatus {
        // Encoder displacement is only meaningful in the body frame;
        // reject rather than guess a conversion.
        if obs.frame_id != self.config.base_frame {
            log::warn!(
                "encoder observation dropped: frame '{}' is not the body frame '{}'",
                obs.frame_id,
                self.config.base_frame
            );
            return UpdateStatus::Discarded(DiscardReason::InvalidInput);
        }

        match self.filter.update_encoders(&obs.displacement, obs.separation) {
            Ok(()) => self.finish_update(self.config.publish_on_encoders, obs.timestamp_us),
            Err(e) => self.discard_for_filter_error("encoder", e),
        }
    }

    fn handle_position(&mut self, obs: &PositionObservation) -> UpdateStatus {
        let transform = match self.frames.lookup_transform(
            &self.config.base_frame,
            &obs.frame_id,
            obs.timestamp_us,
        ) {
            Ok(transform) => transform,
            Err(e) => {
                log::warn!("position observation dropped: {}", e);
                return UpdateStatus::Discarded(DiscardReason::MissingTransform);
            }
        };

        // Map the measured point into the body frame, rotate the pose
        // covariance alongside it, and keep the position block.
        let position = transform.transform_point(&obs.position);
        let rotation = crate::frames::FrameRotation::from_yaw(transform.theta);
        let cov_base = rotate_covariance(&obs.covariance, &rotation);
        let cov_position = cov_base.top_left_2x2();

        match self.filter.update_gps(position, cov_position) {
            Ok(()) => self.finish_update(self.config.publish_on_gps, obs.timestamp_us),
            Err(e) => self.discard_for_filter_error("position", e),
        }
    }

    fn discard_for_filter_error(&self, modality: &str, error: FilterError) -> UpdateStatus {
        match error {
            FilterError::InvalidInput(_) => {
                log::warn!("{} observation dropped: {}", modality, error);
                UpdateStatus::Discarded(DiscardReason::InvalidInput)
            }
            // Numeric failures point at an estimator consistency problem,
            // not transient frame noise; keep them loud.
            FilterError::SingularCovariance | FilterError::NonFinite => {
                log::error!("{} update failed, keeping last good state: {}", modality, error);
                UpdateStatus::Discarded(DiscardReason::NumericFailure)
            }
        }
    }

    fn finish_update(&mut self, publish: bool, timestamp_us: u64) -> UpdateStatus {
        let published = publish && self.publish_output(timestamp_us);
        UpdateStatus::Applied { published }
    }

    /// Compose and emit the correction transform and pose record.
    ///
    /// Returns false when the odometry chain cannot be resolved; the
    /// filter update already happened and stands either way.
    fn publish_output(&mut self, timestamp_us: u64) -> bool {
        let world_from_body = self.filter.pose();

        let odom_from_body = match self.frames.lookup_transform(
            &self.config.odom_frame,
            &self.config.base_frame,
            timestamp_us,
        ) {
            Ok(transform) => transform,
            Err(e) => {
                log::warn!("publish skipped: {}", e);
                return false;
            }
        };

        let t1 = match correction_transform(&world_from_body, &odom_from_body) {
            Ok(t1) => t1,
            Err(e @ FrameError::DegenerateTransform(_)) => {
                log::error!("publish skipped: {}", e);
                return false;
            }
            Err(e) => {
                log::warn!("publish skipped: {}", e);
                return false;
            }
        };

        let transform = OutputTransform {
            parent_frame: self.config.world_frame.clone(),
            child_frame: self.config.odom_frame.clone(),
            transform: t1,
            timestamp_us,
        };
        let pose = OutputPose {
            frame_id: self.config.odom_frame.clone(),
            timestamp_us,
            pose: world_from_body,
            covariance_valid: false,
            velocity: self.velocity,
            velocity_valid: false,
        };

        self.publisher.publish(&transform, &pose);
        true
    }
}
