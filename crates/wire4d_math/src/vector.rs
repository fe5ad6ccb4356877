//! The dimension-generic vector contract

use std::fmt::Debug;
use std::ops::{Add, Div, Index, IndexMut, Mul, Neg, Sub};

use crate::matrix::MatrixTrait;

/// Scalar type used for all geometry
pub type Field = f32;

/// Tolerance for approximate comparisons
pub const EPSILON: Field = 1e-4;

/// Approximate scalar equality within [`EPSILON`]
#[inline]
pub fn is_close(a: Field, b: Field) -> bool {
    (a - b).abs() < EPSILON
}

/// Linear interpolation between two scalars (`t = 0` gives `a`)
#[inline]
pub fn scalar_lerp(a: Field, b: Field, t: Field) -> Field {
    a * (1.0 - t) + b * t
}

/// A fixed-dimension vector of [`Field`] components
///
/// Implementors only provide storage access; the linear algebra is shared.
pub trait VectorTrait:
    Copy
    + Debug
    + Default
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + Mul<Field, Output = Self>
    + Div<Field, Output = Self>
    + Index<usize, Output = Field>
    + IndexMut<usize>
{
    /// Square matrix type of the same dimension
    type M: MatrixTrait<Self>;

    /// Number of components
    const DIM: usize;

    /// Build a vector component by component
    fn from_fn<F: FnMut(usize) -> Field>(f: F) -> Self;

    /// Components as a slice
    fn as_slice(&self) -> &[Field];

    /// Build from a slice, returning `None` on a length mismatch
    fn from_slice(values: &[Field]) -> Option<Self> {
        if values.len() != Self::DIM {
            return None;
        }
        Some(Self::from_fn(|i| values[i]))
    }

    #[inline]
    fn zero() -> Self {
        Self::from_fn(|_| 0.0)
    }

    #[inline]
    fn ones() -> Self {
        Self::from_fn(|_| 1.0)
    }

    /// Unit vector along `axis`
    #[inline]
    fn one_hot(axis: usize) -> Self {
        Self::from_fn(|i| if i == axis { 1.0 } else { 0.0 })
    }

    /// Index of the last (depth) axis
    #[inline]
    fn last_axis() -> usize {
        Self::DIM - 1
    }

    #[inline]
    fn dot(self, other: Self) -> Field {
        self.as_slice()
            .iter()
            .zip(other.as_slice())
            .map(|(a, b)| a * b)
            .sum()
    }

    #[inline]
    fn length_squared(self) -> Field {
        self.dot(self)
    }

    #[inline]
    fn length(self) -> Field {
        self.length_squared().sqrt()
    }

    /// Largest absolute component
    fn linf_norm(self) -> Field {
        self.as_slice().iter().fold(0.0, |m, c| m.max(c.abs()))
    }

    /// Normalize to unit length (zero stays zero)
    #[inline]
    fn normalized(self) -> Self {
        let len = self.length();
        if len > 0.0 {
            self * (1.0 / len)
        } else {
            Self::zero()
        }
    }

    /// Linear interpolation, `t = 0` gives `self`, `t = 1` gives `other`
    #[inline]
    fn lerp(self, other: Self, t: Field) -> Self {
        self * (1.0 - t) + other * t
    }

    /// Approximate equality within [`EPSILON`]
    #[inline]
    fn is_close(self, other: Self) -> bool {
        (self - other).length_squared() < EPSILON * EPSILON
    }
}

/// Vectors that have a one-lower-dimensional counterpart
///
/// Used for perspective projection (dropping the depth axis).
pub trait HasSubspace: VectorTrait {
    type SubV: VectorTrait;

    /// Remove the component at `index`
    fn drop_index(self, index: usize) -> Self::SubV {
        Self::SubV::from_fn(|k| if k < index { self[k] } else { self[k + 1] })
    }

    /// Inverse of [`HasSubspace::drop_index`]: put `value` back at `index`
    fn insert_index(sub: Self::SubV, index: usize, value: Field) -> Self {
        Self::from_fn(|k| {
            if k < index {
                sub[k]
            } else if k == index {
                value
            } else {
                sub[k - 1]
            }
        })
    }

    /// Drop the last axis
    #[inline]
    fn truncate(self) -> Self::SubV {
        self.drop_index(Self::last_axis())
    }
}

/// Mean of a set of points (zero for an empty set)
pub fn barycenter<V: VectorTrait>(points: &[V]) -> V {
    if points.is_empty() {
        return V::zero();
    }
    points.iter().fold(V::zero(), |sum, &p| sum + p) / points.len() as Field
}

/// Implements storage access, indexing and arithmetic for a `#[repr(C)]` `Pod` vector
macro_rules! impl_vector {
    ($name:ident, $dim:expr, $mat:ident) => {
        impl $crate::vector::VectorTrait for $name {
            type M = $crate::matrix::$mat;
            const DIM: usize = $dim;

            #[inline]
            fn from_fn<F: FnMut(usize) -> f32>(f: F) -> Self {
                bytemuck::cast::<[f32; $dim], Self>(std::array::from_fn(f))
            }

            #[inline]
            fn as_slice(&self) -> &[f32] {
                bytemuck::cast_ref::<Self, [f32; $dim]>(self)
            }
        }

        impl std::ops::Index<usize> for $name {
            type Output = f32;
            #[inline]
            fn index(&self, i: usize) -> &f32 {
                &bytemuck::cast_ref::<Self, [f32; $dim]>(self)[i]
            }
        }

        impl std::ops::IndexMut<usize> for $name {
            #[inline]
            fn index_mut(&mut self, i: usize) -> &mut f32 {
                &mut bytemuck::cast_mut::<Self, [f32; $dim]>(self)[i]
            }
        }

        impl std::ops::Add for $name {
            type Output = Self;
            #[inline]
            fn add(self, other: Self) -> Self {
                <Self as $crate::vector::VectorTrait>::from_fn(|i| self[i] + other[i])
            }
        }

        impl std::ops::AddAssign for $name {
            #[inline]
            fn add_assign(&mut self, other: Self) {
                *self = *self + other;
            }
        }

        impl std::ops::Sub for $name {
            type Output = Self;
            #[inline]
            fn sub(self, other: Self) -> Self {
                <Self as $crate::vector::VectorTrait>::from_fn(|i| self[i] - other[i])
            }
        }

        impl std::ops::SubAssign for $name {
            #[inline]
            fn sub_assign(&mut self, other: Self) {
                *self = *self - other;
            }
        }

        impl std::ops::Mul<f32> for $name {
            type Output = Self;
            #[inline]
            fn mul(self, scalar: f32) -> Self {
                <Self as $crate::vector::VectorTrait>::from_fn(|i| self[i] * scalar)
            }
        }

        impl std::ops::MulAssign<f32> for $name {
            #[inline]
            fn mul_assign(&mut self, scalar: f32) {
                *self = *self * scalar;
            }
        }

        impl std::ops::Div<f32> for $name {
            type Output = Self;
            #[inline]
            fn div(self, scalar: f32) -> Self {
                <Self as $crate::vector::VectorTrait>::from_fn(|i| self[i] / scalar)
            }
        }

        impl std::ops::Neg for $name {
            type Output = Self;
            #[inline]
            fn neg(self) -> Self {
                <Self as $crate::vector::VectorTrait>::from_fn(|i| -self[i])
            }
        }
    };
}

pub(crate) use impl_vector;
