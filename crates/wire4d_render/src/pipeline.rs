//! Per-frame render orchestration
//!
//! [`RenderContext::render_frame`] runs one pass over the world:
//!
//! 1. update face visibility from the camera position
//! 2. recompute every shape's occlusion boundaries and which shapes may be
//!    in front of which
//! 3. for each visible face: shrink its edges toward the face center, clip
//!    them against the opaque shapes in front, clip to the near plane, move to
//!    camera space, project, clip to the view volume and hand to the renderer
//! 4. optionally scatter fuzz points over visible faces, outline the view
//!    volume and draw the camera's axis indicator

use bitflags::bitflags;
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use wire4d_core::{Color, ConvexShape, FaceIndex, Line, ShapeKey, World};
use wire4d_math::{is_close, Field, HasSubspace, VectorTrait};

use crate::backend::Renderer;
use crate::camera::Camera;
use crate::clipping::{clip_line_plane, clip_lines, point_occluded, BoundarySet, InFrontSet, ViewBoundary};

bitflags! {
    /// Optional stages of the render pass
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct RenderFlags: u32 {
        /// Clip edges against other opaque shapes
        const CLIPPING = 1 << 0;
        /// Clip to the view volume and draw its outline
        const VIEW_BOUNDARY = 1 << 1;
        /// Scatter random points over visible faces
        const FACE_FUZZ = 1 << 2;
        /// Draw the camera's axis indicator
        const CAMERA_FRAME = 1 << 3;
    }
}

impl Default for RenderFlags {
    fn default() -> Self {
        RenderFlags::CLIPPING | RenderFlags::VIEW_BOUNDARY
    }
}

/// Projection and drawing parameters
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSettings {
    /// Perspective focal length
    pub focal: Field,
    /// Near-plane offset; also stands in for a zero depth during projection
    pub small_z: Field,
    pub view_boundary: ViewBoundary,
    /// Each visible face is drawn once per scale, shrunk toward its center
    pub face_scales: Vec<Field>,
    /// Fuzz points per visible face
    pub fuzz_points: usize,
    pub flags: RenderFlags,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            focal: 4.0,
            small_z: 0.001,
            view_boundary: ViewBoundary::default(),
            face_scales: vec![0.9],
            fuzz_points: 100,
            flags: RenderFlags::default(),
        }
    }
}

/// Counters from the last rendered frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub shapes: usize,
    pub boundary_planes: usize,
    pub faces_drawn: usize,
    /// Face edge segments before any clipping
    pub lines_in: usize,
    /// Segments handed to the renderer
    pub lines_drawn: usize,
    pub points_drawn: usize,
}

/// Perspective projection: divide by depth (the last coordinate) and drop it.
///
/// A depth close to zero is replaced by `small_z`.
pub fn project<V: HasSubspace>(v: V, focal: Field, small_z: Field) -> V::SubV {
    let z = v[V::last_axis()];
    let z = if is_close(z, 0.0) { small_z } else { z };
    v.truncate() * (focal / z)
}

/// State carried between frames
pub struct RenderContext<V: VectorTrait> {
    pub settings: RenderSettings,
    rng: StdRng,
    boundaries: BoundarySet<V>,
    in_front: InFrontSet<V>,
    stats: FrameStats,
}

impl<V: HasSubspace> RenderContext<V> {
    /// `seed` drives the fuzz point placement
    pub fn new(settings: RenderSettings, seed: u64) -> Self {
        Self {
            settings,
            rng: StdRng::seed_from_u64(seed),
            boundaries: BoundarySet::new(),
            in_front: InFrontSet::new(),
            stats: FrameStats::default(),
        }
    }

    /// Boundaries computed by the last frame
    pub fn boundaries(&self) -> &BoundarySet<V> {
        &self.boundaries
    }

    /// In-front relations computed by the last frame
    pub fn in_front(&self) -> &InFrontSet<V> {
        &self.in_front
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Draw one frame of `world` as seen by `camera`
    pub fn render_frame<R: Renderer<V::SubV>>(
        &mut self,
        world: &mut World<V>,
        camera: &Camera<V>,
        renderer: &mut R,
    ) -> FrameStats {
        let flags = self.settings.flags;
        let mut stats = FrameStats {
            shapes: world.len(),
            ..FrameStats::default()
        };

        renderer.begin_frame();
        world.update_visibility(camera.pos);
        if flags.contains(RenderFlags::CLIPPING) {
            self.boundaries.recompute(world, camera.pos);
            self.in_front.recompute(world, camera.pos);
            stats.boundary_planes = self.boundaries.plane_count();
            trace!(
                "{} of {} shape pairs may occlude",
                self.in_front.occluding_pairs(),
                self.in_front.len()
            );
        }

        let world: &World<V> = world;
        for (key, shape) in world.iter() {
            for (fi, face) in shape.faces.iter().enumerate() {
                if !face.visible {
                    continue;
                }
                stats.faces_drawn += 1;

                let mut lines = Vec::with_capacity(face.edges.len() * self.settings.face_scales.len());
                for &scale in &self.settings.face_scales {
                    lines.extend(shape.face_lines(fi, scale));
                }
                stats.lines_in += lines.len();
                if flags.contains(RenderFlags::CLIPPING) {
                    lines = clip_lines(lines, key, world, &self.boundaries, &self.in_front);
                }
                stats.lines_drawn += self.draw_lines(camera, lines, face.color, renderer);

                if flags.contains(RenderFlags::FACE_FUZZ) {
                    stats.points_drawn += self.draw_face_fuzz(camera, world, key, shape, fi, renderer);
                }
            }
        }

        if flags.contains(RenderFlags::VIEW_BOUNDARY) {
            let outline = self.settings.view_boundary.outline::<V::SubV>();
            renderer.draw_lines(&outline, Color::GRAY);
        }
        if flags.contains(RenderFlags::CAMERA_FRAME) {
            for (line, color) in camera.frame_lines() {
                self.draw_lines(camera, vec![line], color, renderer);
            }
        }
        renderer.end_frame();

        trace!("Frame stats: {:?}", stats);
        self.stats = stats;
        stats
    }

    /// World-space lines to the renderer; returns the number of segments drawn
    fn draw_lines<R: Renderer<V::SubV>>(
        &self,
        camera: &Camera<V>,
        lines: Vec<Line<V>>,
        color: Color,
        renderer: &mut R,
    ) -> usize {
        let projected = self.project_lines(camera, lines);
        if !projected.is_empty() {
            renderer.draw_lines(&projected, color);
        }
        projected.len()
    }

    /// Near-plane clip, camera transform, projection and view-volume clip
    pub fn project_lines(&self, camera: &Camera<V>, lines: Vec<Line<V>>) -> Vec<Line<V::SubV>> {
        let RenderSettings { focal, small_z, view_boundary, flags, .. } = &self.settings;
        lines
            .into_iter()
            .filter_map(|line| clip_line_plane(line, camera.plane(), *small_z))
            .map(|line| line.map(|p| project(camera.transform(p), *focal, *small_z)))
            .filter_map(|line| {
                if flags.contains(RenderFlags::VIEW_BOUNDARY) {
                    view_boundary.clip(line)
                } else {
                    Some(line)
                }
            })
            .collect()
    }

    /// Random points on a visible face, dropped when an opaque shape in front
    /// hides them or they fall outside the view. Returns the number drawn.
    fn draw_face_fuzz<R: Renderer<V::SubV>>(
        &mut self,
        camera: &Camera<V>,
        world: &World<V>,
        owner: ShapeKey,
        shape: &ConvexShape<V>,
        face: FaceIndex,
        renderer: &mut R,
    ) -> usize {
        let verts: Vec<V> = shape.face_verts(face).collect();
        if verts.is_empty() {
            return 0;
        }
        let plane = camera.plane();
        let RenderSettings { focal, small_z, view_boundary, flags, fuzz_points, .. } = &self.settings;

        let mut points = Vec::with_capacity(*fuzz_points);
        for _ in 0..*fuzz_points {
            let weights: Vec<Field> = verts.iter().map(|_| self.rng.gen_range(0.0..1.0)).collect();
            let total: Field = weights.iter().sum();
            if total <= 0.0 {
                continue;
            }
            let point = verts
                .iter()
                .zip(&weights)
                .fold(V::zero(), |acc, (&v, &w)| acc + v * (w / total));

            if !plane.contains(point - plane.normal * *small_z) {
                continue;
            }
            if flags.contains(RenderFlags::CLIPPING) && self.occluded_by_others(point, owner, world) {
                continue;
            }
            let projected = project(camera.transform(point), *focal, *small_z);
            if flags.contains(RenderFlags::VIEW_BOUNDARY) && !view_boundary.contains(projected) {
                continue;
            }
            points.push(projected);
        }

        if !points.is_empty() {
            renderer.draw_points(&points, shape.faces[face].color);
        }
        points.len()
    }

    fn occluded_by_others(&self, point: V, owner: ShapeKey, world: &World<V>) -> bool {
        world.iter().any(|(key, shape)| {
            key != owner
                && !shape.transparent
                && self.in_front.may_occlude(key, owner)
                && self
                    .boundaries
                    .get(key)
                    .is_some_and(|planes| point_occluded(point, planes, 0.0))
        })
    }
}

impl<V: HasSubspace> Default for RenderContext<V> {
    fn default() -> Self {
        debug!("Creating render context with default settings");
        Self::new(RenderSettings::default(), 0)
    }
}
