//! Encoder motion models.
//!
//! Maps a reported wheel displacement to an incremental body-frame motion
//! plus the body-frame process noise it injects. The kinematic formula is
//! behind a trait so hosts with better-characterized drivetrains can swap
//! in their own model without touching the filter.

use crate::core::types::{Mat3, Pose2D, WheelDisplacement};

use super::kalman::FilterError;

/// Converts encoder displacement into body-frame motion.
pub trait MotionModel: std::fmt::Debug + Send + Sync {
    /// Compute the body-frame pose delta and its 3x3 covariance.
    ///
    /// `separation` is the wheel-center distance in meters; callers
    /// validate it is positive before this is reached, but models using
    /// it must still guard their own division.
    fn body_delta(
        &self,
        displacement: &WheelDisplacement,
        separation: f32,
    ) -> Result<(Pose2D, Mat3), FilterError>;
}

/// Differential-drive kinematics.
///
/// For a wheel pair with movements (l, r) and separation b:
/// ```text
///   Δx = (l + r) / 2
///   Δy = 0
///   Δθ = (r - l) / b
/// ```
/// This is the straight-segment approximation (no arc correction); per-update
/// movements are small enough that the error is dominated by encoder noise.
///
/// Wheel noise maps into the body frame through the Jacobian
/// J = ∂(Δx, Δy, Δθ)/∂(l, r), giving Q_body = J · C · Jᵗ.
#[derive(Debug, Clone, Copy, Default)]
pub struct DifferentialDrive;

impl MotionModel for DifferentialDrive {
    fn body_delta(
        &self,
        displacement: &WheelDisplacement,
        separation: f32,
    ) -> Result<(Pose2D, Mat3), FilterError> {
        match displacement {
            WheelDisplacement::Wheels {
                left,
                right,
                covariance,
            } => {
                if !left.is_finite() || !right.is_finite() || !covariance.is_finite() {
                    return Err(FilterError::InvalidInput(
                        "non-finite wheel displacement".into(),
                    ));
                }
                if separation <= 0.0 {
                    return Err(FilterError::InvalidInput(format!(
                        "wheel separation must be positive, got {}",
                        separation
                    )));
                }

                let linear = 0.5 * (left + right);
                let dtheta = (right - left) / separation;
                let delta = Pose2D::new(linear, 0.0, dtheta);

                // Q_body = J * C * J^T with J = | 1/2   1/2 |
                //                               |  0     0  |
                //                               | -1/b  1/b |
                let j = [
                    [0.5, 0.5],
                    [0.0, 0.0],
                    [-1.0 / separation, 1.0 / separation],
                ];
                let c = covariance.as_rows();
                let mut q = [[0.0f32; 3]; 3];
                for row in 0..3 {
                    for col in 0..3 {
                        let mut acc = 0.0;
                        for a in 0..2 {
                            for b in 0..2 {
                                acc += j[row][a] * c[a][b] * j[col][b];
                            }
                        }
                        q[row][col] = acc;
                    }
                }

                Ok((delta, Mat3::from_rows(q)))
            }
            WheelDisplacement::BodyDelta { delta, covariance } => {
                if !delta.is_finite() || !covariance.is_finite() {
                    return Err(FilterError::InvalidInput(
                        "non-finite body-frame delta".into(),
                    ));
                }
                Ok((*delta, *covariance))
            }
        }
    }
}
