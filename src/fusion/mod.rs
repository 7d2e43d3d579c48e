//! Fusion orchestration layer.
//!
//! Drives one synchronous pass per observation: validate, resolve frames,
//! rotate covariance, update the filter, optionally compose and publish
//! the correction transform. All failure paths discard the observation
//! and leave the estimator's last good state intact.
//!
//! # Components
//!
//! - [`FusionController`]: the per-observation pipeline
//! - [`FusionConfig`]: publish flags and frame names
//! - [`OutputTransform`] / [`OutputPose`] / [`OutputPublisher`]: what gets
//!   emitted and through which seam
//! - [`UpdateStatus`] / [`DiscardReason`]: the outcome a host can inspect
//!   without parsing logs

mod config;
mod controller;
mod output;

pub use config::FusionConfig;
pub use controller::{DiscardReason, FusionController, UpdateStatus};
pub use output::{OutputPose, OutputPublisher, OutputTransform};
