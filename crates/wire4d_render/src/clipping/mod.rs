//! Occlusion and view-volume clipping
//!
//! Each opaque shape hides a convex region of space from the camera. That
//! region is described by a list of boundary planes (see [`calc_boundaries`]).
//! Edges of other shapes are cut against those regions with [`clip_line`],
//! then against the camera's near plane with [`clip_line_plane`], and after
//! projection against the [`ViewBoundary`]. An [`InFrontSet`] limits the
//! shapes each shape is clipped against to those that may be in front of it.

mod boundaries;
mod line;
mod separation;
mod view;

pub use boundaries::{calc_boundaries, calc_boundary, point_occluded, BoundarySet};
pub use line::{clip_line, clip_line_plane, clip_lines, ClipResult};
pub use separation::{
    dynamic_separate, normal_separate, separate_between_centers, BoundingBall, InFrontSet, Separation, Separator,
};
pub use view::{clip_line_cylinder, clip_line_sphere, sphere_t_intersect, ViewBoundary, OUTLINE_SEGMENTS};
