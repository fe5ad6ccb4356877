//! Dimension-generic math for wire4d
//!
//! Everything above this crate is written against [`VectorTrait`] so the same
//! clipping code runs for 3D scenes (projected onto a 2D screen) and 4D scenes
//! (projected into a 3D view volume).
//!
//! ## Core Types
//!
//! - [`Vec2`], [`Vec3`], [`Vec4`] - fixed-size vectors
//! - [`Mat2`], [`Mat3`], [`Mat4`] - row-major square matrices whose rows are basis vectors
//! - [`rotation_matrix`] - rotation in the plane spanned by two vectors

mod vector;
mod vec2;
mod vec3;
mod vec4;
pub mod matrix;
pub mod rotation;

pub use vector::{barycenter, is_close, scalar_lerp, Field, HasSubspace, VectorTrait, EPSILON};
pub use vec2::Vec2;
pub use vec3::Vec3;
pub use vec4::Vec4;
pub use matrix::{Mat2, Mat3, Mat4, MatrixTrait};
pub use rotation::{plane_rotation, rotation_matrix};
