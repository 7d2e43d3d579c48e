//! Correction-transform composition.

use crate::core::types::Pose2D;

use super::provider::FrameError;

/// Derive the world→odom correction transform from the filter's absolute
/// estimate and the independently-tracked odometry chain.
///
/// The filter estimates the robot directly in the world frame, but that
/// estimate must never be broadcast as-is: the body frame already has the
/// odometry frame as its parent, and publishing world→body would give it
/// a second one.
///
/// ```text
/// world --[T1]--> odom --[T2]--> body
/// world ----------[T3]---------> body
/// ```
///
/// The filter output is T3; the odometry source tracks T2. Broadcasting
/// `T1 = T3 · T2⁻¹` keeps the tree single-parented while world→body stays
/// implicit as `T1 · T2`.
///
/// Pure function of its inputs. Fails with
/// [`FrameError::DegenerateTransform`] only when `odom_from_body` is
/// non-finite, which no valid rigid transform is.
pub fn correction_transform(
    world_from_body: &Pose2D,
    odom_from_body: &Pose2D,
) -> Result<Pose2D, FrameError> {
    if !odom_from_body.is_finite() {
        return Err(FrameError::DegenerateTransform(format!(
            "odom->body transform is not a rigid transform: {:?}",
            odom_from_body
        )));
    }

    Ok(world_from_body.compose(&odom_from_body.inverse()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn assert_pose_eq(a: &Pose2D, b: &Pose2D, epsilon: f32) {
        assert_relative_eq!(a.x, b.x, epsilon = epsilon);
        assert_relative_eq!(a.y, b.y, epsilon = epsilon);
        assert_relative_eq!(
            crate::core::math::angle_diff(a.theta, b.theta),
            0.0,
            epsilon = epsilon
        );
    }

    #[test]
    fn test_identity_odometry_passes_through() {
        let t3 = Pose2D::new(2.0, 1.0, 0.3);
        let t1 = correction_transform(&t3, &Pose2D::identity()).unwrap();
        assert_pose_eq(&t1, &t3, 1e-6);
    }

    #[test]
    fn test_matching_chains_give_identity() {
        let t = Pose2D::new(1.5, -0.5, FRAC_PI_2);
        let t1 = correction_transform(&t, &t).unwrap();
        assert_pose_eq(&t1, &Pose2D::identity(), 1e-5);
    }

    #[test]
    fn test_composition_identity() {
        // compose(T3, T2) ∘ T2 == T3
        let t3 = Pose2D::new(3.0, -2.0, 0.8);
        let t2 = Pose2D::new(1.0, 0.5, -0.4);
        let t1 = correction_transform(&t3, &t2).unwrap();
        let recomposed = t1.compose(&t2);
        assert_pose_eq(&recomposed, &t3, 1e-5);
    }

    #[test]
    fn test_composition_identity_randomized() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..500 {
            let t3 = Pose2D::new(
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-PI..PI),
            );
            let t2 = Pose2D::new(
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-PI..PI),
            );
            let t1 = correction_transform(&t3, &t2).unwrap();
            let recomposed = t1.compose(&t2);
            assert_pose_eq(&recomposed, &t3, 1e-3);
        }
    }

    #[test]
    fn test_degenerate_odometry_rejected() {
        let t3 = Pose2D::new(1.0, 1.0, 0.0);
        let bad = Pose2D {
            x: f32::NAN,
            y: 0.0,
            theta: 0.0,
        };
        assert!(matches!(
            correction_transform(&t3, &bad),
            Err(FrameError::DegenerateTransform(_))
        ));
    }
}
