//! Square matrices for frames and rotations
//!
//! Matrices are stored as rows. A shape or camera frame keeps its basis vectors
//! in the rows, so `frame * v` gives the coordinates of `v` in that basis and
//! `frame.transpose() * v` maps frame coordinates back to world space.

use std::fmt::Debug;
use std::ops::{Add, Index, IndexMut, Mul};

use crate::vector::{Field, VectorTrait, EPSILON};
use crate::{Vec2, Vec3, Vec4};

/// A square matrix whose rows are vectors of type `V`
pub trait MatrixTrait<V: VectorTrait>:
    Copy + Debug + PartialEq + Index<usize, Output = V> + IndexMut<usize> + Mul<V, Output = V> + Add<Output = Self>
{
    /// Build a matrix row by row
    fn from_rows<F: FnMut(usize) -> V>(f: F) -> Self;

    fn identity() -> Self {
        Self::from_rows(V::one_hot)
    }

    fn zero() -> Self {
        Self::from_rows(|_| V::zero())
    }

    fn transpose(self) -> Self {
        Self::from_rows(|i| V::from_fn(|j| self[j][i]))
    }

    /// Outer product `a ⊗ b` (entry `[i][j] = a[i] * b[j]`)
    fn outer(a: V, b: V) -> Self {
        Self::from_rows(|i| b * a[i])
    }

    /// Matrix product `self · rhs`
    fn dot(self, rhs: Self) -> Self {
        Self::from_rows(|i| (0..V::DIM).fold(V::zero(), |acc, k| acc + rhs[k] * self[i][k]))
    }

    /// Matrix-vector product (row dot products)
    fn transform(self, v: V) -> V {
        V::from_fn(|i| self[i].dot(v))
    }

    /// Check that the rows are mutually orthogonal unit vectors
    fn is_orthonormal(self) -> bool {
        (0..V::DIM).all(|i| {
            (0..V::DIM).all(|j| {
                let expected: Field = if i == j { 1.0 } else { 0.0 };
                (self[i].dot(self[j]) - expected).abs() < EPSILON * 10.0
            })
        })
    }

    /// Element-wise approximate equality
    fn is_close(self, other: Self) -> bool {
        (0..V::DIM).all(|i| self[i].is_close(other[i]))
    }
}

macro_rules! impl_matrix {
    ($name:ident, $vec:ident, $dim:expr) => {
        #[doc = concat!(stringify!($dim), "x", stringify!($dim), " row-major matrix")]
        #[derive(Clone, Copy, Debug, PartialEq)]
        pub struct $name(pub [$vec; $dim]);

        impl MatrixTrait<$vec> for $name {
            #[inline]
            fn from_rows<F: FnMut(usize) -> $vec>(f: F) -> Self {
                Self(std::array::from_fn(f))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                <Self as MatrixTrait<$vec>>::identity()
            }
        }

        impl Index<usize> for $name {
            type Output = $vec;
            #[inline]
            fn index(&self, i: usize) -> &$vec {
                &self.0[i]
            }
        }

        impl IndexMut<usize> for $name {
            #[inline]
            fn index_mut(&mut self, i: usize) -> &mut $vec {
                &mut self.0[i]
            }
        }

        impl Mul<$vec> for $name {
            type Output = $vec;
            #[inline]
            fn mul(self, v: $vec) -> $vec {
                self.transform(v)
            }
        }

        impl Add for $name {
            type Output = Self;
            #[inline]
            fn add(self, other: Self) -> Self {
                Self::from_rows(|i| self.0[i] + other.0[i])
            }
        }
    };
}

impl_matrix!(Mat2, Vec2, 2);
impl_matrix!(Mat3, Vec3, 3);
impl_matrix!(Mat4, Vec4, 4);
