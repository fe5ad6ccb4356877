//! Core types for wire4d
//!
//! This crate provides the geometry that the renderer draws:
//!
//! - [`Line`] - A segment between two points
//! - [`HyperPlane`] - A hyperplane and its safe half-space
//! - [`ConvexShape`] - A convex polytope with faces, edges and subfaces
//! - [`World`] - Container for all shapes, keyed by [`ShapeKey`]
//! - [`ShapeTemplate`] - Serializable shape template
//! - [`SceneTemplate`] - Loadable/saveable scene of shapes

mod line;
mod plane;
mod color;
mod face;
mod shape;
mod shapes;
mod world;
mod scene;

pub use line::Line;
pub use plane::HyperPlane;
pub use color::Color;
pub use face::{Edge, EdgeIndex, Face, FaceIndex, SubFace, VertIndex};
pub use shape::{ConvexShape, ShapeError, PLANARITY_TOLERANCE};
pub use shapes::{build_cube, build_prism, build_prism_3d, ShapeTemplate};
pub use world::{ShapeKey, World};
pub use scene::{SceneError, SceneTemplate, ShapeEntry};

// Re-export commonly used math types for convenience
pub use wire4d_math::{Field, Vec2, Vec3, Vec4, VectorTrait};
