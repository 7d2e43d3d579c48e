//! The frame-lookup seam.

use thiserror::Error;

use crate::core::types::Pose2D;

use super::rotation::FrameRotation;

/// Frame resolution and composition errors.
#[derive(Error, Debug)]
pub enum FrameError {
    /// The host's frame graph has no transform for the requested pair and
    /// time. Routine and frequent: sensor timestamps race the frame
    /// buffer's window, especially at startup.
    #[error("no transform from '{from}' to '{to}' at {timestamp_us} us")]
    MissingTransform {
        /// Source frame
        from: String,
        /// Target frame
        to: String,
        /// Requested time in microseconds
        timestamp_us: u64,
    },

    /// A chained transform could not be inverted. Valid rigid transforms
    /// are always invertible, so this indicates a host-side logic fault,
    /// not a condition to retry.
    #[error("degenerate transform: {0}")]
    DegenerateTransform(String),
}

/// External frame-graph collaborator.
///
/// Implemented by the host over whatever tf service it runs; implemented
/// by fixed maps in tests. Lookups may fail with
/// [`FrameError::MissingTransform`] at any time and callers treat that as
/// a soft discard, never a fatal error.
pub trait FrameProvider {
    /// Rotation that re-expresses vectors from `from` in `to`, at `timestamp_us`.
    fn lookup_rotation(
        &self,
        to: &str,
        from: &str,
        timestamp_us: u64,
    ) -> Result<FrameRotation, FrameError>;

    /// Rigid transform of `from` relative to `to`, at `timestamp_us`.
    fn lookup_transform(&self, to: &str, from: &str, timestamp_us: u64)
        -> Result<Pose2D, FrameError>;
}
