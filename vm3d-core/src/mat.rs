//! Row-major 2x2, 3x3 and 4x4 float matrices
//!
//! Element `(i, j)` is row `i`, column `j` and lives at `v[i * N + j]`.
//! Matrices multiply column vectors, so a composed transform `A * B` applies
//! `B` first. Graphics APIs that expect column-major data must upload these
//! with their transpose flag set.

use bytemuck::{Pod, Zeroable};
use std::ops;

use crate::error::{CoreError, CoreResult};
use crate::vec::{Vec2f, Vec3f, Vec4f};

/// A matrix is treated as singular when its determinant is at most this
/// fraction of its Hadamard bound (the product of its row or column norms).
pub const SINGULAR_EPSILON: f32 = 1e-6;

macro_rules! mat_impl {
    ($m: ident, $v: ident, $n: literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
        #[repr(C)]
        pub struct $m {
            pub v: [f32; $n * $n],
        }

        impl $m {
            pub const IDENTITY: $m = {
                let mut v = [0.0; $n * $n];
                let mut i = 0;
                while i < $n {
                    v[i * $n + i] = 1.0;
                    i += 1;
                }
                $m { v }
            };

            #[inline]
            pub const fn from_rows(v: [f32; $n * $n]) -> $m {
                $m { v }
            }

            #[inline]
            pub fn as_slice(&self) -> &[f32] {
                &self.v
            }

            pub fn transpose(&self) -> $m {
                let mut ret = *self;
                for i in 0..$n {
                    for j in 0..$n {
                        ret[(j, i)] = self[(i, j)];
                    }
                }
                ret
            }
        }

        impl Default for $m {
            fn default() -> $m {
                $m::IDENTITY
            }
        }

        impl ops::Index<(usize, usize)> for $m {
            type Output = f32;

            #[inline]
            fn index(&self, (i, j): (usize, usize)) -> &f32 {
                debug_assert!(i < $n && j < $n);
                &self.v[i * $n + j]
            }
        }

        impl ops::IndexMut<(usize, usize)> for $m {
            #[inline]
            fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f32 {
                debug_assert!(i < $n && j < $n);
                &mut self.v[i * $n + j]
            }
        }

        impl ops::Mul<$m> for $m {
            type Output = $m;

            fn mul(self, rhs: $m) -> $m {
                let mut ret = $m { v: [0.0; $n * $n] };
                for i in 0..$n {
                    for j in 0..$n {
                        ret[(i, j)] = (0..$n).map(|k| self[(i, k)] * rhs[(k, j)]).sum();
                    }
                }
                ret
            }
        }

        impl ops::Mul<$v> for $m {
            type Output = $v;

            fn mul(self, rhs: $v) -> $v {
                let rhs = rhs.to_array();
                let mut ret = [0.0; $n];
                for (i, out) in ret.iter_mut().enumerate() {
                    *out = (0..$n).map(|j| self[(i, j)] * rhs[j]).sum();
                }
                $v::from(ret)
            }
        }
    };
}

mat_impl!(Mat22f, Vec2f, 2);
mat_impl!(Mat33f, Vec3f, 3);
mat_impl!(Mat44f, Vec4f, 4);

impl Mat22f {
    /// Counter-clockwise rotation in the plane.
    pub fn rotation(angle: f32) -> Mat22f {
        let (sin, cos) = angle.sin_cos();
        Mat22f::from_rows([cos, -sin, sin, cos])
    }
}

impl From<Mat44f> for Mat33f {
    /// Upper-left 3x3 block (the linear part of an affine transform).
    fn from(m: Mat44f) -> Mat33f {
        Mat33f::from_rows([
            m[(0, 0)], m[(0, 1)], m[(0, 2)],
            m[(1, 0)], m[(1, 1)], m[(1, 2)],
            m[(2, 0)], m[(2, 1)], m[(2, 2)],
        ])
    }
}

/// 2x2 sub-determinants shared by `determinant` and `invert`.
struct Cofactors {
    s: [f32; 6],
    c: [f32; 6],
}

impl Mat44f {
    fn cofactors(&self) -> Cofactors {
        let a = |i: usize, j: usize| self[(i, j)];
        Cofactors {
            s: [
                a(0, 0) * a(1, 1) - a(1, 0) * a(0, 1),
                a(0, 0) * a(1, 2) - a(1, 0) * a(0, 2),
                a(0, 0) * a(1, 3) - a(1, 0) * a(0, 3),
                a(0, 1) * a(1, 2) - a(1, 1) * a(0, 2),
                a(0, 1) * a(1, 3) - a(1, 1) * a(0, 3),
                a(0, 2) * a(1, 3) - a(1, 2) * a(0, 3),
            ],
            c: [
                a(2, 0) * a(3, 1) - a(3, 0) * a(2, 1),
                a(2, 0) * a(3, 2) - a(3, 0) * a(2, 2),
                a(2, 0) * a(3, 3) - a(3, 0) * a(2, 3),
                a(2, 1) * a(3, 2) - a(3, 1) * a(2, 2),
                a(2, 1) * a(3, 3) - a(3, 1) * a(2, 3),
                a(2, 2) * a(3, 3) - a(3, 2) * a(2, 3),
            ],
        }
    }

    pub fn determinant(&self) -> f32 {
        let Cofactors { s, c } = self.cofactors();
        s[0] * c[5] - s[1] * c[4] + s[2] * c[3] + s[3] * c[2] - s[4] * c[1] + s[5] * c[0]
    }

    /// Upper bound on `|det|`: the smaller of the products of row norms and
    /// of column norms.
    fn hadamard_bound(&self) -> f32 {
        let mut rows = 1.0f32;
        let mut cols = 1.0f32;
        for i in 0..4 {
            rows *= (0..4).map(|j| self[(i, j)] * self[(i, j)]).sum::<f32>().sqrt();
            cols *= (0..4).map(|j| self[(j, i)] * self[(j, i)]).sum::<f32>().sqrt();
        }
        rows.min(cols)
    }

    /// General inverse by cofactor expansion.
    ///
    /// Returns [`CoreError::SingularMatrix`] when the determinant is not
    /// finite or is at most [`SINGULAR_EPSILON`] times the Hadamard bound,
    /// so the test does not depend on the overall scale of the matrix.
    pub fn invert(&self) -> CoreResult<Mat44f> {
        let Cofactors { s, c } = self.cofactors();
        let det = s[0] * c[5] - s[1] * c[4] + s[2] * c[3] + s[3] * c[2] - s[4] * c[1] + s[5] * c[0];
        if !det.is_finite() || det.abs() <= SINGULAR_EPSILON * self.hadamard_bound() {
            return Err(CoreError::SingularMatrix { determinant: det });
        }

        let a = |i: usize, j: usize| self[(i, j)];
        let inv = 1.0 / det;
        #[rustfmt::skip]
        let v = [
            a(1, 1) * c[5] - a(1, 2) * c[4] + a(1, 3) * c[3],
            -a(0, 1) * c[5] + a(0, 2) * c[4] - a(0, 3) * c[3],
            a(3, 1) * s[5] - a(3, 2) * s[4] + a(3, 3) * s[3],
            -a(2, 1) * s[5] + a(2, 2) * s[4] - a(2, 3) * s[3],

            -a(1, 0) * c[5] + a(1, 2) * c[2] - a(1, 3) * c[1],
            a(0, 0) * c[5] - a(0, 2) * c[2] + a(0, 3) * c[1],
            -a(3, 0) * s[5] + a(3, 2) * s[2] - a(3, 3) * s[1],
            a(2, 0) * s[5] - a(2, 2) * s[2] + a(2, 3) * s[1],

            a(1, 0) * c[4] - a(1, 1) * c[2] + a(1, 3) * c[0],
            -a(0, 0) * c[4] + a(0, 1) * c[2] - a(0, 3) * c[0],
            a(3, 0) * s[4] - a(3, 1) * s[2] + a(3, 3) * s[0],
            -a(2, 0) * s[4] + a(2, 1) * s[2] - a(2, 3) * s[0],

            -a(1, 0) * c[3] + a(1, 1) * c[1] - a(1, 2) * c[0],
            a(0, 0) * c[3] - a(0, 1) * c[1] + a(0, 2) * c[0],
            -a(3, 0) * s[3] + a(3, 1) * s[1] - a(3, 2) * s[0],
            a(2, 0) * s[3] - a(2, 1) * s[1] + a(2, 2) * s[0],
        ];

        Ok(Mat44f { v: v.map(|x| x * inv) })
    }

    /// Apply to a point: lift with w = 1, multiply, divide by the resulting w.
    #[inline]
    pub fn transform_point(&self, p: Vec3f) -> Vec3f {
        (*self * p.extend(1.0)).perspective_divide()
    }

    /// Apply to a direction (w = 0); translation has no effect.
    #[inline]
    pub fn transform_vector(&self, d: Vec3f) -> Vec3f {
        (*self * d.extend(0.0)).truncate()
    }
}

impl From<Mat44f> for nalgebra::Matrix4<f32> {
    fn from(m: Mat44f) -> Self {
        nalgebra::Matrix4::from_row_slice(&m.v)
    }
}

impl From<nalgebra::Matrix4<f32>> for Mat44f {
    fn from(m: nalgebra::Matrix4<f32>) -> Self {
        // nalgebra stores columns contiguously; the transpose's columns are our rows.
        let mut v = [0.0; 16];
        v.copy_from_slice(m.transpose().as_slice());
        Mat44f { v }
    }
}
