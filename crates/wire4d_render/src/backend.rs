//! Rendering backends
//!
//! A [`Renderer`] receives projected, clipped geometry and turns it into vertex
//! buffers for a graphics API. No draw calls are issued here; the buffers are
//! `bytemuck::Pod` so a windowing layer can upload them as they are.
//!
//! - [`Renderer2D`] draws the projection of a 3D world onto a 2D screen
//! - [`StereoRenderer3D`] draws the projection of a 4D world as a 3D scene,
//!   optionally twice side by side for stereo viewing

use bytemuck::{Pod, Zeroable};
use log::trace;
use wire4d_core::{Color, Line};
use wire4d_math::{plane_rotation, Field, Mat3, MatrixTrait, Vec2, Vec3, VectorTrait};

/// Consumer of projected lines and points
pub trait Renderer<U: VectorTrait> {
    /// Start a new frame, discarding the previous one
    fn begin_frame(&mut self);

    fn draw_lines(&mut self, lines: &[Line<U>], color: Color);

    fn draw_points(&mut self, points: &[U], color: Color);

    fn end_frame(&mut self);
}

/// A 2D screen-space vertex with color
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct LineVertex2D {
    /// Pixel position, origin at the top-left corner
    pub position: [f32; 2],
    pub color: [f32; 3],
}

/// A 3D scene-space vertex with color
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct LineVertex3D {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

/// Renders projected 2D geometry to screen pixels
pub struct Renderer2D {
    width: u32,
    height: u32,
    screen_scale: Field,
    center: Vec2,
    lines: Vec<LineVertex2D>,
    points: Vec<LineVertex2D>,
    frames: u64,
}

impl Renderer2D {
    pub fn new(width: u32, height: u32, screen_scale: Field) -> Self {
        Self {
            width,
            height,
            screen_scale,
            center: Vec2::new((width / 2) as Field, (height / 2) as Field),
            lines: Vec::new(),
            points: Vec::new(),
            frames: 0,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Projected point to pixel coordinates; y grows downward on screen
    pub fn to_screen(&self, p: Vec2) -> [f32; 2] {
        [
            p.x * self.screen_scale + self.center.x,
            -p.y * self.screen_scale + self.center.y,
        ]
    }

    /// Line list vertices for the current frame, two per segment
    pub fn line_vertices(&self) -> &[LineVertex2D] {
        &self.lines
    }

    pub fn point_vertices(&self) -> &[LineVertex2D] {
        &self.points
    }

    /// Raw bytes of the line vertex buffer
    pub fn line_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.lines)
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer<Vec2> for Renderer2D {
    fn begin_frame(&mut self) {
        self.lines.clear();
        self.points.clear();
    }

    fn draw_lines(&mut self, lines: &[Line<Vec2>], color: Color) {
        for line in lines {
            for p in [line.0, line.1] {
                let position = self.to_screen(p);
                self.lines.push(LineVertex2D { position, color: color.0 });
            }
        }
    }

    fn draw_points(&mut self, points: &[Vec2], color: Color) {
        for &p in points {
            let position = self.to_screen(p);
            self.points.push(LineVertex2D { position, color: color.0 });
        }
    }

    fn end_frame(&mut self) {
        self.frames += 1;
        trace!(
            "2D frame {}: {} line vertices, {} points",
            self.frames,
            self.lines.len(),
            self.points.len()
        );
    }
}

/// One viewpoint of the 3D scene
#[derive(Clone, Debug)]
pub struct Eye {
    /// Where the projected scene's origin is placed
    pub origin: Vec3,
    /// Yaw and pitch of the scene in degrees
    pub view_angles: [Field; 2],
    rotation: Mat3,
    lines: Vec<LineVertex3D>,
    points: Vec<LineVertex3D>,
}

impl Eye {
    pub fn new(origin: Vec3, view_angles: [Field; 2]) -> Self {
        let [yaw, pitch] = view_angles;
        // pitch about x applied after yaw about y
        let rotation = plane_rotation::<Vec3>(pitch.to_radians(), 1, 2)
            .dot(plane_rotation::<Vec3>(yaw.to_radians(), 2, 0));
        Self {
            origin,
            view_angles,
            rotation,
            lines: Vec::new(),
            points: Vec::new(),
        }
    }

    /// Projected point to this eye's scene coordinates
    pub fn place(&self, p: Vec3) -> Vec3 {
        self.rotation.transform(p) + self.origin
    }

    pub fn line_vertices(&self) -> &[LineVertex3D] {
        &self.lines
    }

    pub fn point_vertices(&self) -> &[LineVertex3D] {
        &self.points
    }

    pub fn line_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.lines)
    }

    fn clear(&mut self) {
        self.lines.clear();
        self.points.clear();
    }
}

/// Renders projected 3D geometry, once per eye
pub struct StereoRenderer3D {
    eyes: Vec<Eye>,
    frames: u64,
}

impl StereoRenderer3D {
    pub const DEFAULT_ORIGIN: Vec3 = Vec3 { x: 0.0, y: 0.0, z: -15.0 };
    pub const DEFAULT_SEPARATION: Vec3 = Vec3 { x: 5.0, y: 0.0, z: 0.0 };
    pub const MONO_VIEW_ANGLES: [Field; 2] = [30.0, 30.0];
    pub const STEREO_VIEW_ANGLES: [[Field; 2]; 2] = [[30.0, 30.0], [120.0, 30.0]];

    /// Two eyes at `origin ± separation`
    pub fn stereo(origin: Vec3, separation: Vec3) -> Self {
        Self {
            eyes: vec![
                Eye::new(origin + separation, Self::STEREO_VIEW_ANGLES[0]),
                Eye::new(origin - separation, Self::STEREO_VIEW_ANGLES[1]),
            ],
            frames: 0,
        }
    }

    /// A single eye at `origin`
    pub fn mono(origin: Vec3) -> Self {
        Self {
            eyes: vec![Eye::new(origin, Self::MONO_VIEW_ANGLES)],
            frames: 0,
        }
    }

    pub fn eyes(&self) -> &[Eye] {
        &self.eyes
    }

    pub fn is_stereo(&self) -> bool {
        self.eyes.len() > 1
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for StereoRenderer3D {
    fn default() -> Self {
        Self::stereo(Self::DEFAULT_ORIGIN, Self::DEFAULT_SEPARATION)
    }
}

impl Renderer<Vec3> for StereoRenderer3D {
    fn begin_frame(&mut self) {
        for eye in &mut self.eyes {
            eye.clear();
        }
    }

    fn draw_lines(&mut self, lines: &[Line<Vec3>], color: Color) {
        for eye in &mut self.eyes {
            for line in lines {
                for p in [line.0, line.1] {
                    let position = eye.place(p).to_array();
                    eye.lines.push(LineVertex3D { position, color: color.0 });
                }
            }
        }
    }

    fn draw_points(&mut self, points: &[Vec3], color: Color) {
        for eye in &mut self.eyes {
            for &p in points {
                let position = eye.place(p).to_array();
                eye.points.push(LineVertex3D { position, color: color.0 });
            }
        }
    }

    fn end_frame(&mut self) {
        self.frames += 1;
        let vertices: usize = self.eyes.iter().map(|e| e.lines.len()).sum();
        trace!("3D frame {}: {} eyes, {} line vertices", self.frames, self.eyes.len(), vertices);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_sizes() {
        assert_eq!(std::mem::size_of::<LineVertex2D>(), 20);
        assert_eq!(std::mem::size_of::<LineVertex3D>(), 24);
    }

    #[test]
    fn test_renderer_2d_screen_mapping() {
        let renderer = Renderer2D::new(800, 600, 60.0);
        assert_eq!(renderer.to_screen(Vec2::ZERO), [400.0, 300.0]);
        assert_eq!(renderer.to_screen(Vec2::new(1.0, 1.0)), [460.0, 240.0]);
    }

    #[test]
    fn test_renderer_2d_buffers() {
        let mut renderer = Renderer2D::new(800, 600, 60.0);
        renderer.begin_frame();
        renderer.draw_lines(&[Line(Vec2::ZERO, Vec2::X)], Color::RED);
        renderer.draw_points(&[Vec2::Y], Color::BLUE);
        renderer.end_frame();
        assert_eq!(renderer.line_vertices().len(), 2);
        assert_eq!(renderer.line_vertices()[1].position, [460.0, 300.0]);
        assert_eq!(renderer.line_vertices()[0].color, Color::RED.0);
        assert_eq!(renderer.point_vertices().len(), 1);
        assert_eq!(renderer.line_bytes().len(), 40);

        renderer.begin_frame();
        assert!(renderer.line_vertices().is_empty());
        assert_eq!(renderer.frames(), 1);
    }

    #[test]
    fn test_eye_rotation() {
        let eye = Eye::new(Vec3::ZERO, [90.0, 0.0]);
        // yaw about y turns z into x
        assert!(eye.place(Vec3::Z).is_close(Vec3::X));
        let eye = Eye::new(Vec3::new(0.0, 0.0, -15.0), [0.0, 90.0]);
        // pitch about x turns y into z
        assert!(eye.place(Vec3::Y).is_close(Vec3::new(0.0, 0.0, -14.0)));
    }

    #[test]
    fn test_stereo_draws_per_eye() {
        let mut renderer = StereoRenderer3D::default();
        assert!(renderer.is_stereo());
        renderer.begin_frame();
        renderer.draw_lines(&[Line(Vec3::ZERO, Vec3::X)], Color::GREEN);
        renderer.end_frame();
        let eyes = renderer.eyes();
        assert_eq!(eyes.len(), 2);
        assert_eq!(eyes[0].line_vertices().len(), 2);
        assert_eq!(eyes[1].line_vertices().len(), 2);
        // the scene origin lands on each eye's origin
        assert_eq!(eyes[0].line_vertices()[0].position, [5.0, 0.0, -15.0]);
        assert_eq!(eyes[1].line_vertices()[0].position, [-5.0, 0.0, -15.0]);
    }

    #[test]
    fn test_mono() {
        let mut renderer = StereoRenderer3D::mono(Vec3::ZERO);
        assert!(!renderer.is_stereo());
        renderer.begin_frame();
        renderer.draw_points(&[Vec3::ZERO, Vec3::X], Color::WHITE);
        assert_eq!(renderer.eyes()[0].point_vertices().len(), 2);
    }
}
