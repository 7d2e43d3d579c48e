//! SthitiFusion - 2D pose estimation from heterogeneous sensor streams.
//!
//! Fuses compass/IMU heading, wheel encoder displacement and absolute
//! position fixes (GPS) into a single (x, y, theta) estimate with
//! uncertainty, using a Kalman-filter correction per observation.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    fusion/                          │  ← Orchestration
//! │     (controller, config, output publishing)         │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌──────────────────────────┬──────────────────────────┐
//! │       estimator/         │         frames/          │  ← Core algorithms
//! │  (Kalman core, motion    │  (covariance rotation,   │
//! │   models)                │   transform composition) │
//! └──────────────────────────┴──────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Foundation
//! │                (types, math)                        │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Data flow
//!
//! Each inbound [`Observation`] makes exactly one synchronous pass:
//! frame-covariance rotation → filter update → (optional) transform
//! composition → publish through the host-supplied [`OutputPublisher`].
//! Transport, frame lookup and message decoding live outside this crate,
//! behind the [`FrameProvider`] and [`OutputPublisher`] seams.

// ============================================================================
// Layer 1: Core foundation (no internal deps)
// ============================================================================
pub mod core;

// ============================================================================
// Layer 2: Estimation and frame math (depends on core)
// ============================================================================
pub mod estimator;
pub mod frames;

// ============================================================================
// Layer 3: Fusion orchestration (depends on all layers)
// ============================================================================
pub mod fusion;

// ============================================================================
// Convenience re-exports (flat namespace for common use)
// ============================================================================

// Core types
pub use crate::core::math;
pub use crate::core::types::{
    EncoderObservation, HeadingObservation, Mat2, Mat3, Observation, Point2D, Pose2D,
    PositionObservation, Twist2D, WheelDisplacement,
};

// Estimator
pub use crate::estimator::{
    DifferentialDrive, FilterError, MotionModel, PoseFilter, PoseFilterConfig,
};

// Frame math
pub use crate::frames::{
    correction_transform, rotate_covariance, FrameError, FrameProvider, FrameRotation,
};

// Fusion
pub use crate::fusion::{
    DiscardReason, FusionConfig, FusionController, OutputPose, OutputPublisher, OutputTransform,
    UpdateStatus,
};
