//! Small fixed-size matrices for covariance and rotation math.
//!
//! The filter state is 3-dimensional (x, y, theta), so every matrix the
//! estimator touches is at most 3x3. Storage is a row-major array:
//! `[m00, m01, m02, m10, m11, m12, m20, m21, m22]`.

use serde::{Deserialize, Serialize};

/// 2x2 matrix, row-major: [xx, xy, yx, yy].
///
/// Used for position-measurement covariance (the top-left block of a
/// rotated 3x3 pose covariance) and for wheel-pair displacement covariance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat2 {
    data: [f32; 4],
}

impl Mat2 {
    /// Create a diagonal matrix from variances.
    #[inline]
    pub fn diagonal(xx: f32, yy: f32) -> Self {
        Self {
            data: [xx, 0.0, 0.0, yy],
        }
    }

    /// Create from row-major array.
    #[inline]
    pub fn from_array(data: [f32; 4]) -> Self {
        Self { data }
    }

    /// Element at (row, col).
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> f32 {
        self.data[row * 2 + col]
    }

    /// Rows as nested arrays.
    #[inline]
    pub fn as_rows(&self) -> [[f32; 2]; 2] {
        [[self.data[0], self.data[1]], [self.data[2], self.data[3]]]
    }

    /// True if every element is finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}

impl Default for Mat2 {
    fn default() -> Self {
        Self { data: [0.0; 4] }
    }
}

/// 3x3 matrix, row-major.
///
/// Serves both as a pose covariance over (x, y, theta) and as a rotation
/// matrix between coordinate frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat3 {
    data: [f32; 9],
}

impl Mat3 {
    /// Create a zero matrix.
    #[inline]
    pub fn zero() -> Self {
        Self { data: [0.0; 9] }
    }

    /// Create an identity matrix.
    #[inline]
    pub fn identity() -> Self {
        Self::diagonal(1.0, 1.0, 1.0)
    }

    /// Create a diagonal matrix.
    ///
    /// For a covariance the parameters are variances:
    /// xx = σ²_x, yy = σ²_y, tt = σ²_θ.
    #[inline]
    pub fn diagonal(xx: f32, yy: f32, tt: f32) -> Self {
        Self {
            data: [xx, 0.0, 0.0, 0.0, yy, 0.0, 0.0, 0.0, tt],
        }
    }

    /// Create from row-major array.
    #[inline]
    pub fn from_array(data: [f32; 9]) -> Self {
        Self { data }
    }

    /// Create from nested row arrays.
    #[inline]
    pub fn from_rows(rows: [[f32; 3]; 3]) -> Self {
        Self {
            data: [
                rows[0][0], rows[0][1], rows[0][2], rows[1][0], rows[1][1], rows[1][2], rows[2][0],
                rows[2][1], rows[2][2],
            ],
        }
    }

    /// Element at (row, col).
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> f32 {
        self.data[row * 3 + col]
    }

    /// Get raw data as slice.
    #[inline]
    pub fn as_slice(&self) -> &[f32; 9] {
        &self.data
    }

    /// Matrix transpose.
    #[inline]
    pub fn transpose(&self) -> Mat3 {
        let d = &self.data;
        Mat3::from_array([d[0], d[3], d[6], d[1], d[4], d[7], d[2], d[5], d[8]])
    }

    /// Matrix product self · rhs.
    pub fn mul(&self, rhs: &Mat3) -> Mat3 {
        let mut out = [0.0f32; 9];
        for row in 0..3 {
            for col in 0..3 {
                let mut acc = 0.0;
                for k in 0..3 {
                    acc += self.at(row, k) * rhs.at(k, col);
                }
                out[row * 3 + col] = acc;
            }
        }
        Mat3::from_array(out)
    }

    /// Element-wise sum self + rhs.
    pub fn add(&self, rhs: &Mat3) -> Mat3 {
        let mut out = [0.0f32; 9];
        for (i, v) in out.iter_mut().enumerate() {
            *v = self.data[i] + rhs.data[i];
        }
        Mat3::from_array(out)
    }

    /// Symmetric part (M + Mᵗ) / 2.
    ///
    /// Covariance updates accumulate floating-point asymmetry; every
    /// covariance write in the filter passes through this.
    pub fn symmetrized(&self) -> Mat3 {
        let d = &self.data;
        let m01 = 0.5 * (d[1] + d[3]);
        let m02 = 0.5 * (d[2] + d[6]);
        let m12 = 0.5 * (d[5] + d[7]);
        Mat3::from_array([d[0], m01, m02, m01, d[4], m12, m02, m12, d[8]])
    }

    /// Top-left 2x2 block (the position part of a pose covariance).
    #[inline]
    pub fn top_left_2x2(&self) -> Mat2 {
        Mat2::from_array([self.data[0], self.data[1], self.data[3], self.data[4]])
    }

    /// True if every element is finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_diagonal_and_at() {
        let m = Mat3::diagonal(0.1, 0.2, 0.05);
        assert_eq!(m.at(0, 0), 0.1);
        assert_eq!(m.at(1, 1), 0.2);
        assert_eq!(m.at(2, 2), 0.05);
        assert_eq!(m.at(0, 1), 0.0);
    }

    #[test]
    fn test_identity_mul() {
        let m = Mat3::from_array([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        let i = Mat3::identity();
        assert_eq!(m.mul(&i), m);
        assert_eq!(i.mul(&m), m);
    }

    #[test]
    fn test_mul_known_product() {
        let a = Mat3::from_array([1.0, 2.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        let b = Mat3::from_array([1.0, 0.0, 0.0, 3.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        let c = a.mul(&b);
        // First row: [1 + 2*3, 2, 0]
        assert_relative_eq!(c.at(0, 0), 7.0);
        assert_relative_eq!(c.at(0, 1), 2.0);
        assert_relative_eq!(c.at(1, 0), 3.0);
    }

    #[test]
    fn test_transpose() {
        let m = Mat3::from_array([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        let t = m.transpose();
        for row in 0..3 {
            for col in 0..3 {
                assert_eq!(t.at(row, col), m.at(col, row));
            }
        }
    }

    #[test]
    fn test_symmetrized() {
        let m = Mat3::from_array([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        let s = m.symmetrized();
        for row in 0..3 {
            for col in 0..3 {
                assert_relative_eq!(s.at(row, col), s.at(col, row));
            }
        }
        assert_relative_eq!(s.at(0, 1), 3.0);
        assert_relative_eq!(s.at(0, 2), 5.0);
    }

    #[test]
    fn test_top_left_2x2() {
        let m = Mat3::from_array([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        let b = m.top_left_2x2();
        assert_eq!(b.at(0, 0), 1.0);
        assert_eq!(b.at(0, 1), 2.0);
        assert_eq!(b.at(1, 0), 4.0);
        assert_eq!(b.at(1, 1), 5.0);
    }

    #[test]
    fn test_is_finite() {
        assert!(Mat3::identity().is_finite());
        let mut data = [0.0f32; 9];
        data[4] = f32::NAN;
        assert!(!Mat3::from_array(data).is_finite());
    }
}
