use nalgebra as na;
use crate::math::Vector3;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Sub, SubAssign};

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// A 3x3 matrix representation for physics calculations, stored row-major
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Matrix3 {
    pub data: [[f32; 3]; 3],
}

impl Matrix3 {
    /// Creates a new 3x3 matrix from a 2D array
    #[inline]
    pub fn new(data: [[f32; 3]; 3]) -> Self {
        Self { data }
    }

    /// Creates a new 3x3 identity matrix
    #[inline]
    pub fn identity() -> Self {
        Self {
            data: [
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a new 3x3 zero matrix
    #[inline]
    pub fn zero() -> Self {
        Self {
            data: [
                [0.0, 0.0, 0.0],
                [0.0, 0.0, 0.0],
                [0.0, 0.0, 0.0],
            ],
        }
    }

    /// Creates a new 3x3 diagonal matrix
    #[inline]
    pub fn from_diagonal(diagonal: Vector3) -> Self {
        Self {
            data: [
                [diagonal.x, 0.0, 0.0],
                [0.0, diagonal.y, 0.0],
                [0.0, 0.0, diagonal.z],
            ],
        }
    }

    /// Creates a rotation matrix from an axis and an angle in radians,
    /// using Rodrigues' formula. The axis must be normalized.
    pub fn from_axis_angle(axis: Vector3, radians: f32) -> Self {
        let s = radians.sin();
        let c = radians.cos();
        let t = 1.0 - c;
        let Vector3 { x, y, z } = axis;

        Self {
            data: [
                [x * x * t + c, x * y * t - z * s, z * x * t + y * s],
                [x * y * t + z * s, y * y * t + c, y * z * t - x * s],
                [z * x * t - y * s, y * z * t + x * s, z * z * t + c],
            ],
        }
    }

    /// Creates the skew-symmetric matrix of a vector, so that for any
    /// vector `u`, `skew_symmetric(v).multiply_vector(u) == v.cross(&u)`.
    /// Used to linearize small rotations when integrating orientation.
    #[inline]
    pub fn skew_symmetric(v: Vector3) -> Self {
        Self {
            data: [
                [0.0, -v.z, v.y],
                [v.z, 0.0, -v.x],
                [-v.y, v.x, 0.0],
            ],
        }
    }

    /// Returns the i-th row as a vector
    #[inline]
    pub fn row(&self, i: usize) -> Vector3 {
        Vector3::new(self.data[i][0], self.data[i][1], self.data[i][2])
    }

    /// Returns the i-th column as a vector
    #[inline]
    pub fn column(&self, i: usize) -> Vector3 {
        Vector3::new(self.data[0][i], self.data[1][i], self.data[2][i])
    }

    /// Returns the determinant of the matrix
    pub fn determinant(&self) -> f32 {
        let [[a, b, c], [d, e, f], [g, h, i]] = self.data;

        a * (e * i - f * h) -
        b * (d * i - f * g) +
        c * (d * h - e * g)
    }

    /// Returns the inverse of the matrix via the cofactor (Cramer-rule)
    /// expansion, or None if the determinant is below tolerance.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();

        if det.abs() < crate::math::EPSILON {
            return None;
        }

        let [[a, b, c], [d, e, f], [g, h, i]] = self.data;
        let inv_det = 1.0 / det;

        Some(Self {
            data: [
                [
                    (e * i - f * h) * inv_det,
                    (c * h - b * i) * inv_det,
                    (b * f - c * e) * inv_det,
                ],
                [
                    (f * g - d * i) * inv_det,
                    (a * i - c * g) * inv_det,
                    (c * d - a * f) * inv_det,
                ],
                [
                    (d * h - e * g) * inv_det,
                    (g * b - a * h) * inv_det,
                    (a * e - b * d) * inv_det,
                ],
            ],
        })
    }

    /// Returns the transpose of the matrix
    #[inline]
    pub fn transpose(&self) -> Self {
        let [[a, b, c], [d, e, f], [g, h, i]] = self.data;

        Self {
            data: [
                [a, d, g],
                [b, e, h],
                [c, f, i],
            ],
        }
    }

    /// Multiplies the matrix by a vector
    #[inline]
    pub fn multiply_vector(&self, v: Vector3) -> Vector3 {
        let [[a, b, c], [d, e, f], [g, h, i]] = self.data;

        Vector3::new(
            a * v.x + b * v.y + c * v.z,
            d * v.x + e * v.y + f * v.z,
            g * v.x + h * v.y + i * v.z,
        )
    }

    /// Multiplies the matrix by another matrix
    pub fn multiply_matrix(&self, other: &Self) -> Self {
        let mut result = Self::zero();

        for i in 0..3 {
            for j in 0..3 {
                let mut sum = 0.0;
                for k in 0..3 {
                    sum += self.data[i][k] * other.data[k][j];
                }
                result.data[i][j] = sum;
            }
        }

        result
    }

    /// Restores the columns to an orthonormal basis after accumulated
    /// integration drift: the first column is normalized (X), Z is the
    /// normalized cross of X with the old second column, and Y is rebuilt
    /// as Z x X.
    ///
    /// Only valid for rigid-body orientation matrices that are already
    /// close to orthonormal; this is not a general-purpose Gram-Schmidt
    /// and must not be used on arbitrary matrices.
    pub fn orthonormalize(&mut self) {
        let x = self.column(0).normalize();
        let y = self.column(1);
        let z = x.cross(&y).normalize();
        let y = z.cross(&x).normalize();

        self.data = [
            [x.x, y.x, z.x],
            [x.y, y.y, z.y],
            [x.z, y.z, z.z],
        ];
    }

    /// Convert to nalgebra Matrix3
    #[inline]
    pub fn to_nalgebra(&self) -> na::Matrix3<f32> {
        let [[a, b, c], [d, e, f], [g, h, i]] = self.data;

        na::Matrix3::new(
            a, b, c,
            d, e, f,
            g, h, i,
        )
    }

    /// Convert from nalgebra Matrix3
    #[inline]
    pub fn from_nalgebra(m: &na::Matrix3<f32>) -> Self {
        Self {
            data: [
                [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
                [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
                [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
            ],
        }
    }
}

impl fmt::Display for Matrix3 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "[ {}, {}, {} ]", self.data[0][0], self.data[0][1], self.data[0][2])?;
        writeln!(f, "[ {}, {}, {} ]", self.data[1][0], self.data[1][1], self.data[1][2])?;
        write!(f, "[ {}, {}, {} ]", self.data[2][0], self.data[2][1], self.data[2][2])
    }
}

impl Add for Matrix3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        let mut result = self;
        result += rhs;
        result
    }
}

impl AddAssign for Matrix3 {
    fn add_assign(&mut self, rhs: Self) {
        for i in 0..3 {
            for j in 0..3 {
                self.data[i][j] += rhs.data[i][j];
            }
        }
    }
}

impl Sub for Matrix3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        let mut result = self;
        result -= rhs;
        result
    }
}

impl SubAssign for Matrix3 {
    fn sub_assign(&mut self, rhs: Self) {
        for i in 0..3 {
            for j in 0..3 {
                self.data[i][j] -= rhs.data[i][j];
            }
        }
    }
}

impl Mul<f32> for Matrix3 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        let mut result = self;
        result *= rhs;
        result
    }
}

impl Mul<Matrix3> for f32 {
    type Output = Matrix3;

    #[inline]
    fn mul(self, rhs: Matrix3) -> Matrix3 {
        rhs * self
    }
}

impl MulAssign<f32> for Matrix3 {
    fn mul_assign(&mut self, rhs: f32) {
        for i in 0..3 {
            for j in 0..3 {
                self.data[i][j] *= rhs;
            }
        }
    }
}
