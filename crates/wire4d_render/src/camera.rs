//! Free-flying camera in 3 or 4 dimensions
//!
//! The camera keeps an orthonormal frame whose rows are its axes in world
//! space. It looks along its last axis (z in 3D, w in 4D). The near plane is
//! the hyperplane through the camera position perpendicular to that axis and is
//! recomputed after every rotation or move.

use serde::{Deserialize, Serialize};
use wire4d_core::{Color, HyperPlane, Line};
use wire4d_math::{rotation_matrix, Field, MatrixTrait, VectorTrait};

/// Movement speeds, in units (or radians) per second
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraSettings {
    pub speed: Field,
    pub angular_speed: Field,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            speed: 2.0,
            angular_speed: 1.5,
        }
    }
}

/// Camera with a position, an orthonormal frame and a near plane
#[derive(Clone, Debug)]
pub struct Camera<V: VectorTrait> {
    pub pos: V,
    pub settings: CameraSettings,
    frame: V::M,
    plane: HyperPlane<V>,
}

impl<V: VectorTrait> Camera<V> {
    pub fn new(pos: V) -> Self {
        let frame = V::M::identity();
        let heading = frame[V::last_axis()];
        Self {
            pos,
            settings: CameraSettings::default(),
            frame,
            plane: HyperPlane::through(pos, heading),
        }
    }

    pub fn with_settings(mut self, settings: CameraSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Rows are the camera axes in world space
    pub fn frame(&self) -> V::M {
        self.frame
    }

    /// Viewing direction (the frame's last axis)
    pub fn heading(&self) -> V {
        self.frame[V::last_axis()]
    }

    /// Near plane; points with `x·heading >= heading·pos` are in front
    pub fn plane(&self) -> &HyperPlane<V> {
        &self.plane
    }

    /// Rotate the camera's own axes `axis1` and `axis2` by `angle`
    pub fn update_rotation(&mut self, axis1: usize, axis2: usize, angle: Field) {
        let rot = rotation_matrix(self.frame[axis1], self.frame[axis2], Some(angle));
        self.frame = self.frame.dot(rot);
        self.update_plane();
    }

    /// Rotate at the configured angular speed for `dt` seconds
    pub fn rotate(&mut self, axis1: usize, axis2: usize, speed_mult: Field, dt: Field) {
        let angle = speed_mult * self.settings.angular_speed * dt;
        self.update_rotation(axis1, axis2, angle);
    }

    /// Move along a camera-local `direction` at the configured speed for `dt` seconds
    pub fn slide(&mut self, direction: V, dt: Field) {
        let world_dir = self.frame.transpose().transform(direction.normalized());
        self.translate(world_dir * (self.settings.speed * dt));
    }

    pub fn translate(&mut self, delta: V) {
        self.pos = self.pos + delta;
        self.update_plane();
    }

    pub fn set_pos(&mut self, pos: V) {
        self.pos = pos;
        self.update_plane();
    }

    /// Turn the camera so that its heading points at `point`.
    ///
    /// Does nothing when `point` is the camera position.
    pub fn look_at(&mut self, point: V) {
        let direction = point - self.pos;
        if direction.length_squared() < wire4d_math::EPSILON * wire4d_math::EPSILON {
            return;
        }
        let rot = rotation_matrix(V::one_hot(V::last_axis()), direction, None);
        self.frame = rot.transpose();
        if !self.heading().is_close(direction.normalized()) {
            // antiparallel heading spans no rotation plane; flip through the first axis
            let rot = rotation_matrix(V::one_hot(V::last_axis()), V::one_hot(0), Some(std::f32::consts::PI));
            self.frame = rot.transpose();
        }
        self.update_plane();
    }

    /// World point to camera-local coordinates
    #[inline]
    pub fn transform(&self, point: V) -> V {
        self.frame.transform(point - self.pos)
    }

    /// Short axis indicator lines just in front of the camera, one per axis
    pub fn frame_lines(&self) -> Vec<(Line<V>, Color)> {
        const AXIS_COLORS: [Color; 4] = [Color::PURPLE, Color::MAGENTA, Color::ORANGE, Color::CYAN];
        let origin = self.heading() * 0.1 + self.pos;
        (0..V::DIM)
            .map(|i| {
                let line = Line(origin, origin + self.frame[i] * 0.5);
                (line, AXIS_COLORS[i % AXIS_COLORS.len()])
            })
            .collect()
    }

    fn update_plane(&mut self) {
        self.plane = HyperPlane::through(self.pos, self.heading());
    }
}
