//! Core foundation layer.
//!
//! This is the bottom layer of the fusion stack with no internal dependencies.
//! All other layers depend on core.
//!
//! # Contents
//!
//! - [`types`]: Core data types (poses, matrices, observations)
//! - [`math`]: Mathematical primitives (angle normalization and arithmetic)

pub mod math;
pub mod types;
