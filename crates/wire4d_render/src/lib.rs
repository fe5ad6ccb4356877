//! Hidden-line rendering for wire4d
//!
//! This crate turns a [`World`] of convex shapes into clipped, projected
//! line segments and hands them to a backend.
//!
//! ## Key Components
//!
//! - [`camera::Camera`] - Camera with an orthonormal frame and near plane
//! - [`clipping`] - Occlusion boundaries, line clipping and view volumes
//! - [`pipeline::RenderContext`] - Runs the per-frame render pass
//! - [`backend::Renderer2D`] - 3D worlds drawn onto a 2D screen
//! - [`backend::StereoRenderer3D`] - 4D worlds drawn as a (stereo) 3D scene

pub mod backend;
pub mod camera;
pub mod clipping;
pub mod pipeline;

pub use backend::{Eye, LineVertex2D, LineVertex3D, Renderer, Renderer2D, StereoRenderer3D};
pub use camera::{Camera, CameraSettings};
pub use clipping::{BoundarySet, ClipResult, InFrontSet, Separation, ViewBoundary};
pub use pipeline::{project, FrameStats, RenderContext, RenderFlags, RenderSettings};

// Re-export core types for convenience
pub use wire4d_core::{Color, ConvexShape, Line, ShapeKey, World};
