//! Frame rotations and covariance rotation.

use serde::{Deserialize, Serialize};

use crate::core::types::Mat3;

/// An orthonormal rotation between two named frames at a point in time.
///
/// Stored as a full 3x3 matrix so hosts with tilted sensor mounts can
/// supply a genuine 3D rotation; the planar pipeline only consumes the
/// yaw component and the rotated covariance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameRotation {
    matrix: Mat3,
}

impl FrameRotation {
    /// Identity rotation (frames are aligned).
    #[inline]
    pub fn identity() -> Self {
        Self {
            matrix: Mat3::identity(),
        }
    }

    /// Rotation about the vertical axis by `yaw` radians.
    pub fn from_yaw(yaw: f32) -> Self {
        let (sin_t, cos_t) = yaw.sin_cos();
        Self {
            matrix: Mat3::from_rows([
                [cos_t, -sin_t, 0.0],
                [sin_t, cos_t, 0.0],
                [0.0, 0.0, 1.0],
            ]),
        }
    }

    /// Wrap an externally-supplied rotation matrix.
    ///
    /// The caller is responsible for orthonormality; this crate never
    /// constructs rotations from raw sensor data itself.
    #[inline]
    pub fn from_matrix(matrix: Mat3) -> Self {
        Self { matrix }
    }

    /// The underlying 3x3 matrix.
    #[inline]
    pub fn matrix(&self) -> &Mat3 {
        &self.matrix
    }

    /// The inverse rotation (transpose, for an orthonormal matrix).
    #[inline]
    pub fn inverse(&self) -> FrameRotation {
        Self {
            matrix: self.matrix.transpose(),
        }
    }

    /// Yaw component of the rotation, in radians.
    #[inline]
    pub fn yaw(&self) -> f32 {
        self.matrix.at(1, 0).atan2(self.matrix.at(0, 0))
    }
}

/// Rotate a covariance matrix between frames: `cov_target = Rᵗ · cov · R`.
///
/// Pure and stateless. The result is symmetric by construction when the
/// input is. Position covariance uses the same call: rotate the full 3x3
/// pose block, then take [`Mat3::top_left_2x2`] of the result.
pub fn rotate_covariance(cov: &Mat3, rotation: &FrameRotation) -> Mat3 {
    let r = rotation.matrix();
    r.transpose().mul(cov).mul(r)
}
