//! State estimation module.
//!
//! The pure numeric core of the fusion stack: no I/O, no frame lookups,
//! no logging. Owns the (x, y, theta) belief and corrects it one
//! observation at a time.
//!
//! # Components
//!
//! - [`PoseFilter`]: Kalman filter over (x, y, theta) with one update per
//!   sensor modality
//! - [`MotionModel`] / [`DifferentialDrive`]: pluggable encoder kinematics
//! - [`FilterError`]: update failure taxonomy; any error leaves the state
//!   untouched

mod kalman;
mod motion;

pub use kalman::{FilterError, PoseFilter, PoseFilterConfig};
pub use motion::{DifferentialDrive, MotionModel};
