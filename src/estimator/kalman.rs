//! Kalman filter over the robot's (x, y, theta) pose.
//!
//! The filter keeps a continuously-evolving belief: a [`Pose2D`] mean and a
//! 3x3 covariance. Heading and position observations are absolute
//! corrections sharing one audited correction routine; the encoder update
//! is relative, composing an incremental motion into the state and
//! injecting its noise into the covariance.
//!
//! # Correction pattern
//!
//! For measurement dimension M (1 for heading, 2 for position):
//! ```text
//!   y = z - h(x)                 innovation
//!   S = H P Hᵗ + R               innovation covariance
//!   K = P Hᵗ S⁻¹                 gain
//!   x ← x + K y
//!   P ← (I - K H) P,  then  P ← (P + Pᵗ) / 2
//! ```
//! All results are computed into temporaries and committed only after a
//! finiteness check, so a failed update leaves the belief bit-for-bit
//! unchanged.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::math::angle_diff;
use crate::core::types::{Mat2, Mat3, Point2D, Pose2D, WheelDisplacement};

use super::motion::{DifferentialDrive, MotionModel};

/// Pivot threshold below which the innovation covariance is treated as
/// singular. Matches the guard the gyro-fusion path uses on scalar S.
const SINGULAR_EPS: f32 = 1e-10;

/// Filter update failures. Every variant leaves the state untouched.
#[derive(Error, Debug)]
pub enum FilterError {
    /// Measurement failed validation before touching the filter.
    #[error("invalid measurement input: {0}")]
    InvalidInput(String),

    /// The innovation covariance S could not be inverted.
    #[error("singular innovation covariance")]
    SingularCovariance,

    /// The update produced a NaN or infinity.
    #[error("update produced a non-finite state or covariance")]
    NonFinite,
}

/// Configuration for the pose filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseFilterConfig {
    /// Initial variance on x and y (m²).
    ///
    /// The default is a large "position unknown" sentinel; the first
    /// absolute fix then dominates the correction.
    pub initial_position_variance: f32,
    /// Initial variance on theta (rad²), same sentinel convention.
    pub initial_heading_variance: f32,
}

impl Default for PoseFilterConfig {
    fn default() -> Self {
        Self {
            initial_position_variance: 99999.0,
            initial_heading_variance: 99999.0,
        }
    }
}

/// Kalman filter for 2D robot pose estimation.
///
/// Owns the fused state; mutation happens only through the three update
/// operations, and a failed update never corrupts the belief.
///
/// # Example
///
/// ```
/// use sthiti_fusion::{Mat2, Point2D, PoseFilter, PoseFilterConfig};
///
/// let mut filter = PoseFilter::new(PoseFilterConfig::default());
/// filter
///     .update_gps(Point2D::new(5.0, 2.0), Mat2::diagonal(0.1, 0.1))
///     .unwrap();
/// assert!((filter.pose().x - 5.0).abs() < 1e-2);
/// ```
#[derive(Debug)]
pub struct PoseFilter {
    /// State mean (x, y, theta)
    pose: Pose2D,
    /// State covariance P
    covariance: Mat3,
    /// Encoder kinematics
    motion_model: Box<dyn MotionModel>,
}

impl PoseFilter {
    /// Create a filter at the origin with differential-drive kinematics.
    pub fn new(config: PoseFilterConfig) -> Self {
        Self::with_motion_model(config, Box::new(DifferentialDrive))
    }

    /// Create a filter with a custom encoder motion model.
    pub fn with_motion_model(config: PoseFilterConfig, motion_model: Box<dyn MotionModel>) -> Self {
        Self {
            pose: Pose2D::identity(),
            covariance: Mat3::diagonal(
                config.initial_position_variance,
                config.initial_position_variance,
                config.initial_heading_variance,
            ),
            motion_model,
        }
    }

    /// Snapshot of the state mean.
    #[inline]
    pub fn pose(&self) -> Pose2D {
        self.pose
    }

    /// Snapshot of the state covariance.
    #[inline]
    pub fn covariance(&self) -> Mat3 {
        self.covariance
    }

    /// Absolute heading correction.
    ///
    /// `yaw` is the measured heading in the body frame, `variance` its
    /// scalar noise. The innovation is wrapped to (-π, π] first, so a
    /// measurement of θ and θ + 2π produce identical updates.
    pub fn update_heading(&mut self, yaw: f32, variance: f32) -> Result<(), FilterError> {
        if !yaw.is_finite() || !variance.is_finite() {
            return Err(FilterError::InvalidInput(
                "non-finite heading measurement".into(),
            ));
        }

        let innovation = [angle_diff(self.pose.theta, yaw)];
        self.apply_correction(innovation, [[0.0, 0.0, 1.0]], [[variance]])
    }

    /// Absolute position correction.
    ///
    /// Heading is untouched except through cross-covariance terms.
    pub fn update_gps(&mut self, position: Point2D, covariance: Mat2) -> Result<(), FilterError> {
        if !position.is_finite() || !covariance.is_finite() {
            return Err(FilterError::InvalidInput(
                "non-finite position measurement".into(),
            ));
        }

        let innovation = [position.x - self.pose.x, position.y - self.pose.y];
        let h = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        self.apply_correction(innovation, h, covariance.as_rows())
    }

    /// Relative encoder update.
    ///
    /// Unlike the absolute corrections this composes an increment into the
    /// state: the motion model yields a body-frame delta and its noise, the
    /// delta is rotated into the global frame through the current heading,
    /// and the covariance is propagated as
    /// ```text
    ///   P ← F P Fᵗ + G Q_body Gᵗ
    /// ```
    /// where F is the pose-composition Jacobian and G rotates body-frame
    /// noise into the global frame.
    pub fn update_encoders(
        &mut self,
        displacement: &WheelDisplacement,
        separation: f32,
    ) -> Result<(), FilterError> {
        if !(separation > 0.0) {
            return Err(FilterError::InvalidInput(format!(
                "wheel separation must be positive, got {}",
                separation
            )));
        }

        let (delta, q_body) = self.motion_model.body_delta(displacement, separation)?;

        let (sin_t, cos_t) = self.pose.theta.sin_cos();

        // Jacobian of pose composition with respect to the state:
        // | 1  0  -δx·sinθ - δy·cosθ |
        // | 0  1   δx·cosθ - δy·sinθ |
        // | 0  0   1                 |
        let f = Mat3::from_rows([
            [1.0, 0.0, -delta.x * sin_t - delta.y * cos_t],
            [0.0, 1.0, delta.x * cos_t - delta.y * sin_t],
            [0.0, 0.0, 1.0],
        ]);

        // Body-frame noise rotated into the global frame.
        let g = Mat3::from_rows([
            [cos_t, -sin_t, 0.0],
            [sin_t, cos_t, 0.0],
            [0.0, 0.0, 1.0],
        ]);

        let new_pose = self.pose.compose(&delta);
        let propagated = f.mul(&self.covariance).mul(&f.transpose());
        let injected = g.mul(&q_body).mul(&g.transpose());
        let new_cov = propagated.add(&injected).symmetrized();

        if !new_pose.is_finite() || !new_cov.is_finite() {
            return Err(FilterError::NonFinite);
        }

        self.pose = new_pose;
        self.covariance = new_cov;
        Ok(())
    }

    /// The shared linear correction primitive.
    ///
    /// `M` is the measurement dimension: `y` the innovation, `h` the
    /// observation matrix rows, `r` the measurement noise. Commits the new
    /// state and covariance only after every element checks finite.
    fn apply_correction<const M: usize>(
        &mut self,
        y: [f32; M],
        h: [[f32; 3]; M],
        r: [[f32; M]; M],
    ) -> Result<(), FilterError> {
        let p = &self.covariance;

        // P Hᵗ (3 x M)
        let mut pht = [[0.0f32; M]; 3];
        for (i, row) in pht.iter_mut().enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                let mut acc = 0.0;
                for k in 0..3 {
                    acc += p.at(i, k) * h[j][k];
                }
                *v = acc;
            }
        }

        // S = H P Hᵗ + R (M x M)
        let mut s = [[0.0f32; M]; M];
        for i in 0..M {
            for j in 0..M {
                let mut acc = r[i][j];
                for k in 0..3 {
                    acc += h[i][k] * pht[k][j];
                }
                s[i][j] = acc;
            }
        }

        let s_inv = invert(s).ok_or(FilterError::SingularCovariance)?;

        // K = P Hᵗ S⁻¹ (3 x M)
        let mut gain = [[0.0f32; M]; 3];
        for (i, row) in gain.iter_mut().enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                let mut acc = 0.0;
                for k in 0..M {
                    acc += pht[i][k] * s_inv[k][j];
                }
                *v = acc;
            }
        }

        // State correction K y
        let mut dx = [0.0f32; 3];
        for (i, v) in dx.iter_mut().enumerate() {
            let mut acc = 0.0;
            for k in 0..M {
                acc += gain[i][k] * y[k];
            }
            *v = acc;
        }

        // (I - K H) (3 x 3)
        let mut ikh = [[0.0f32; 3]; 3];
        for (i, row) in ikh.iter_mut().enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                let mut acc = if i == j { 1.0 } else { 0.0 };
                for k in 0..M {
                    acc -= gain[i][k] * h[k][j];
                }
                *v = acc;
            }
        }

        let new_cov = Mat3::from_rows(ikh).mul(&self.covariance).symmetrized();
        let new_pose = Pose2D::new(
            self.pose.x + dx[0],
            self.pose.y + dx[1],
            self.pose.theta + dx[2],
        );

        if !new_pose.is_finite() || !new_cov.is_finite() {
            return Err(FilterError::NonFinite);
        }

        self.pose = new_pose;
        self.covariance = new_cov;
        Ok(())
    }
}

/// Invert an M x M matrix by Gauss-Jordan elimination with partial
/// pivoting. Returns `None` when a pivot falls below [`SINGULAR_EPS`].
fn invert<const M: usize>(mut a: [[f32; M]; M]) -> Option<[[f32; M]; M]> {
    let mut inv = [[0.0f32; M]; M];
    for (i, row) in inv.iter_mut().enumerate() {
        row[i] = 1.0;
    }

    for col in 0..M {
        let mut pivot = col;
        for row in (col + 1)..M {
            if a[row][col].abs() > a[pivot][col].abs() {
                pivot = row;
            }
        }
        if a[pivot][col].abs() < SINGULAR_EPS {
            return None;
        }
        a.swap(col, pivot);
        inv.swap(col, pivot);

        let d = a[col][col];
        for j in 0..M {
            a[col][j] /= d;
            inv[col][j] /= d;
        }
        for row in 0..M {
            if row != col {
                let factor = a[row][col];
                if factor != 0.0 {
                    for j in 0..M {
                        a[row][j] -= factor * a[col][j];
                        inv[row][j] -= factor * inv[col][j];
                    }
                }
            }
        }
    }

    Some(inv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    fn test_filter() -> PoseFilter {
        PoseFilter::new(PoseFilterConfig::default())
    }

    fn assert_symmetric(m: &Mat3) {
        for row in 0..3 {
            for col in 0..3 {
                assert_relative_eq!(m.at(row, col), m.at(col, row), epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn test_invert_identity() {
        let inv = invert([[1.0, 0.0], [0.0, 1.0]]).unwrap();
        assert_relative_eq!(inv[0][0], 1.0);
        assert_relative_eq!(inv[1][1], 1.0);
        assert_relative_eq!(inv[0][1], 0.0);
    }

    #[test]
    fn test_invert_known_2x2() {
        let inv = invert([[4.0, 0.0], [0.0, 2.0]]).unwrap();
        assert_relative_eq!(inv[0][0], 0.25);
        assert_relative_eq!(inv[1][1], 0.5);
    }

    #[test]
    fn test_invert_singular() {
        assert!(invert([[0.0f32; 2]; 2]).is_none());
        assert!(invert([[1.0, 2.0], [2.0, 4.0]]).is_none());
    }

    #[test]
    fn test_gps_pulls_position_to_measurement() {
        let mut filter = test_filter();
        filter
            .update_gps(Point2D::new(5.0, 2.0), Mat2::diagonal(0.1, 0.1))
            .unwrap();

        // Initial covariance is huge, so the gain is nearly identity.
        let pose = filter.pose();
        assert_relative_eq!(pose.x, 5.0, epsilon = 1e-2);
        assert_relative_eq!(pose.y, 2.0, epsilon = 1e-2);
        assert_relative_eq!(pose.theta, 0.0, epsilon = 1e-6);

        // Position variance shrinks below the measurement noise.
        let cov = filter.covariance();
        assert!(cov.at(0, 0) < 0.1);
        assert!(cov.at(1, 1) < 0.1);
        assert_symmetric(&cov);
    }

    #[test]
    fn test_gps_zero_covariance_is_exact() {
        let mut filter = test_filter();
        filter
            .update_gps(Point2D::new(3.0, -1.5), Mat2::diagonal(0.0, 0.0))
            .unwrap();

        let pose = filter.pose();
        assert_relative_eq!(pose.x, 3.0, epsilon = 1e-4);
        assert_relative_eq!(pose.y, -1.5, epsilon = 1e-4);
        let cov = filter.covariance();
        assert_relative_eq!(cov.at(0, 0), 0.0, epsilon = 1e-3);
        assert_relative_eq!(cov.at(1, 1), 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_heading_update() {
        let mut filter = test_filter();
        filter.update_heading(PI / 2.0, 0.01).unwrap();

        let pose = filter.pose();
        assert_relative_eq!(pose.theta, PI / 2.0, epsilon = 1e-3);
        // Position mean is not directly altered by a heading correction.
        assert_relative_eq!(pose.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(pose.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_heading_invariant_under_2pi() {
        let yaw = 0.7f32;
        let variance = 0.05f32;

        let mut a = test_filter();
        a.update_heading(yaw, variance).unwrap();

        let mut b = test_filter();
        b.update_heading(yaw + 2.0 * PI, variance).unwrap();

        let pa = a.pose();
        let pb = b.pose();
        assert_relative_eq!(pa.theta, pb.theta, epsilon = 1e-5);
        assert_relative_eq!(pa.x, pb.x, epsilon = 1e-6);
        let ca = a.covariance();
        let cb = b.covariance();
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(ca.at(i, j), cb.at(i, j), epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn test_encoder_update_moves_state() {
        let mut filter = test_filter();
        // Pin down heading first so the motion direction is predictable.
        filter.update_heading(0.0, 0.0001).unwrap();

        let displacement = WheelDisplacement::Wheels {
            left: 0.1,
            right: 0.1,
            covariance: Mat2::diagonal(0.001, 0.001),
        };
        filter.update_encoders(&displacement, 0.2).unwrap();

        let pose = filter.pose();
        assert_relative_eq!(pose.x, 0.1, epsilon = 1e-4);
        assert_relative_eq!(pose.y, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_encoder_update_grows_covariance() {
        let mut filter = PoseFilter::new(PoseFilterConfig {
            initial_position_variance: 0.01,
            initial_heading_variance: 0.01,
        });

        let before = filter.covariance();
        let displacement = WheelDisplacement::Wheels {
            left: 0.1,
            right: 0.12,
            covariance: Mat2::diagonal(0.005, 0.005),
        };
        filter.update_encoders(&displacement, 0.2).unwrap();

        let after = filter.covariance();
        assert!(after.at(0, 0) > before.at(0, 0));
        assert!(after.at(2, 2) > before.at(2, 2));
        assert_symmetric(&after);
    }

    #[test]
    fn test_encoder_invalid_separation_leaves_state_unchanged() {
        let mut filter = test_filter();
        filter
            .update_gps(Point2D::new(1.0, 1.0), Mat2::diagonal(0.1, 0.1))
            .unwrap();
        let pose_before = filter.pose();
        let cov_before = *filter.covariance().as_slice();

        let displacement = WheelDisplacement::Wheels {
            left: 0.1,
            right: 0.1,
            covariance: Mat2::diagonal(0.001, 0.001),
        };
        for separation in [0.0f32, -0.5] {
            let err = filter.update_encoders(&displacement, separation);
            assert!(matches!(err, Err(FilterError::InvalidInput(_))));
            assert_eq!(filter.pose(), pose_before);
            assert_eq!(*filter.covariance().as_slice(), cov_before);
        }
    }

    #[test]
    fn test_singular_innovation_rejected() {
        // Zero prior covariance and zero measurement noise make S singular.
        let mut filter = PoseFilter::new(PoseFilterConfig {
            initial_position_variance: 0.0,
            initial_heading_variance: 0.0,
        });
        let pose_before = filter.pose();
        let cov_before = *filter.covariance().as_slice();

        let err = filter.update_gps(Point2D::new(1.0, 1.0), Mat2::diagonal(0.0, 0.0));
        assert!(matches!(err, Err(FilterError::SingularCovariance)));
        assert_eq!(filter.pose(), pose_before);
        assert_eq!(*filter.covariance().as_slice(), cov_before);
    }

    #[test]
    fn test_nonfinite_measurement_rejected() {
        let mut filter = test_filter();
        assert!(matches!(
            filter.update_heading(f32::NAN, 0.01),
            Err(FilterError::InvalidInput(_))
        ));
        assert!(matches!(
            filter.update_gps(Point2D::new(f32::INFINITY, 0.0), Mat2::diagonal(0.1, 0.1)),
            Err(FilterError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_covariance_stays_psd_over_random_sequences() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..1000 {
            let mut filter = PoseFilter::new(PoseFilterConfig {
                initial_position_variance: rng.gen_range(0.1..10.0),
                initial_heading_variance: rng.gen_range(0.1..10.0),
            });

            for _ in 0..10 {
                match rng.gen_range(0..3) {
                    0 => {
                        let yaw = rng.gen_range(-PI..PI);
                        let var = rng.gen_range(0.001..1.0);
                        filter.update_heading(yaw, var).unwrap();
                    }
                    1 => {
                        let z = Point2D::new(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0));
                        let cov =
                            Mat2::diagonal(rng.gen_range(0.001..1.0), rng.gen_range(0.001..1.0));
                        filter.update_gps(z, cov).unwrap();
                    }
                    _ => {
                        let displacement = WheelDisplacement::Wheels {
                            left: rng.gen_range(-0.1..0.1),
                            right: rng.gen_range(-0.1..0.1),
                            covariance: Mat2::diagonal(
                                rng.gen_range(0.0001..0.01),
                                rng.gen_range(0.0001..0.01),
                            ),
                        };
                        filter.update_encoders(&displacement, 0.25).unwrap();
                    }
                }

                let cov = filter.covariance();
                assert!(cov.is_finite());
                assert_symmetric(&cov);

                // PSD probe: quadratic form is non-negative (up to noise)
                // for a handful of random directions.
                for _ in 0..5 {
                    let v = [
                        rng.gen_range(-1.0f32..1.0),
                        rng.gen_range(-1.0..1.0),
                        rng.gen_range(-1.0..1.0),
                    ];
                    let mut quad = 0.0;
                    for i in 0..3 {
                        for j in 0..3 {
                            quad += v[i] * cov.at(i, j) * v[j];
                        }
                    }
                    assert!(quad >= -1e-3, "covariance not PSD: vᵗPv = {}", quad);
                }
            }
        }
    }
}
