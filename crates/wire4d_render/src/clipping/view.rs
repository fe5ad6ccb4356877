//! View-volume clipping in projected space
//!
//! After perspective projection, lines are kept inside a ball or an upright
//! cylinder centered on the origin of the projected space.

use serde::{Deserialize, Serialize};
use wire4d_core::{HyperPlane, Line};
use wire4d_math::{Field, VectorTrait, EPSILON};

use super::clip_line_plane;

/// Segments in each outline circle
pub const OUTLINE_SEGMENTS: usize = 32;

/// Parameters where the segment's supporting line meets the sphere of radius `r`.
///
/// The roots `t⁻ <= t⁺` are in units of the segment parameter, so the segment
/// itself is `t ∈ [0, 1]`. They are not clamped: either root may lie outside
/// the segment and callers must check. Returns `None` when the line misses the
/// sphere or the segment has no length.
pub fn sphere_t_intersect<V: VectorTrait>(line: &Line<V>, r: Field) -> Option<(Field, Field)> {
    let dv = line.direction();
    let len = dv.length();
    if len < EPSILON * EPSILON {
        return None;
    }
    let dir = dv / len;
    let p0_dir = line.0.dot(dir);
    let discr = p0_dir * p0_dir - line.0.dot(line.0) + r * r;
    if discr < 0.0 {
        return None;
    }
    let sqrt_discr = discr.sqrt();
    Some(((-p0_dir - sqrt_discr) / len, (-p0_dir + sqrt_discr) / len))
}

/// Clip `line` to the open ball of radius `r` around the origin
pub fn clip_line_sphere<V: VectorTrait>(line: Line<V>, r: Field) -> Option<Line<V>> {
    let inside = |p: V| p.dot(p) < r * r;
    let (p0_in, p1_in) = (inside(line.0), inside(line.1));
    if p0_in && p1_in {
        return Some(line);
    }
    let (tm, tp) = sphere_t_intersect(&line, r)?;
    if (tm < 0.0 && tp < 0.0) || (tm > 1.0 && tp > 1.0) {
        return None;
    }
    match (p0_in, p1_in) {
        (false, false) => Some(Line(line.lerp(tm), line.lerp(tp))),
        (false, true) => Some(Line(line.lerp(tm), line.1)),
        _ => Some(Line(line.0, line.lerp(tp))),
    }
}

/// The cylinder axis as an index into `V`; out-of-range axes use the last one
fn cylinder_axis<V: VectorTrait>(axis: usize) -> usize {
    axis.min(V::DIM - 1)
}

/// Clip `line` to the cylinder of radius `r` around `axis`, with `|x[axis]| <= h`.
///
/// An `axis` past the last one is treated as the last axis.
pub fn clip_line_cylinder<V: VectorTrait>(line: Line<V>, r: Field, h: Field, axis: usize) -> Option<Line<V>> {
    let axis = cylinder_axis::<V>(axis);
    let (a0, a1) = (line.0[axis], line.1[axis]);
    if (a0 > h && a1 > h) || (a0 < -h && a1 < -h) {
        return None;
    }

    let perpendicular = |p: V| {
        let mut q = p;
        q[axis] = 0.0;
        q
    };
    let tube = Line(perpendicular(line.0), perpendicular(line.1));
    let inside = |p: V| p.dot(p) < r * r;
    let tube_clipped = if inside(tube.0) && inside(tube.1) {
        line
    } else {
        let (tm, tp) = sphere_t_intersect(&tube, r)?;
        if (tm < 0.0 && tp < 0.0) || (tm > 1.0 && tp > 1.0) {
            return None;
        }
        Line(line.lerp(tm.max(0.0)), line.lerp(tp.min(1.0)))
    };

    let axis_dir = V::one_hot(axis);
    let bottom = HyperPlane::new(axis_dir, -h);
    let top = HyperPlane::new(-axis_dir, -h);
    clip_line_plane(tube_clipped, &bottom, 0.0).and_then(|l| clip_line_plane(l, &top, 0.0))
}

/// Outer limit of the drawn volume in projected space
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewBoundary {
    Sphere { radius: Field },
    /// `height` is the half-extent along `axis`. An `axis` outside the
    /// projected space falls back to its last axis.
    Cylinder { radius: Field, height: Field, axis: usize },
}

impl Default for ViewBoundary {
    fn default() -> Self {
        ViewBoundary::Sphere { radius: 5.0 }
    }
}

impl ViewBoundary {
    pub fn clip<V: VectorTrait>(&self, line: Line<V>) -> Option<Line<V>> {
        match *self {
            ViewBoundary::Sphere { radius } => clip_line_sphere(line, radius),
            ViewBoundary::Cylinder { radius, height, axis } => clip_line_cylinder(line, radius, height, axis),
        }
    }

    pub fn contains<V: VectorTrait>(&self, point: V) -> bool {
        match *self {
            ViewBoundary::Sphere { radius } => point.dot(point) < radius * radius,
            ViewBoundary::Cylinder { radius, height, axis } => {
                let axis = cylinder_axis::<V>(axis);
                let mut perp = point;
                perp[axis] = 0.0;
                point[axis].abs() <= height && perp.dot(perp) < radius * radius
            }
        }
    }

    /// Lines tracing the volume: great circles of the sphere, or the
    /// cylinder's middle and end circles (a rectangle in 2D)
    pub fn outline<V: VectorTrait>(&self) -> Vec<Line<V>> {
        match *self {
            ViewBoundary::Sphere { radius } => {
                let mut lines = Vec::new();
                for i in 0..V::DIM {
                    for j in (i + 1)..V::DIM {
                        lines.extend(circle(V::zero(), radius, i, j));
                    }
                }
                lines
            }
            ViewBoundary::Cylinder { radius, height, axis } => {
                let axis = cylinder_axis::<V>(axis);
                let perp: Vec<usize> = (0..V::DIM).filter(|&a| a != axis).collect();
                let up = V::one_hot(axis) * height;
                if let &[i, j] = perp.as_slice() {
                    [-height, 0.0, height]
                        .into_iter()
                        .flat_map(|h| circle(V::one_hot(axis) * h, radius, i, j))
                        .collect()
                } else {
                    let side = perp.first().map_or(V::zero(), |&i| V::one_hot(i) * radius);
                    vec![
                        Line(up - side, up + side),
                        Line(-up - side, -up + side),
                        Line(-up - side, up - side),
                        Line(-up + side, up + side),
                    ]
                }
            }
        }
    }
}

fn circle<V: VectorTrait>(center: V, radius: Field, axis1: usize, axis2: usize) -> Vec<Line<V>> {
    let point = |k: usize| {
        let angle = std::f32::consts::TAU * k as Field / OUTLINE_SEGMENTS as Field;
        center + V::one_hot(axis1) * (radius * angle.cos()) + V::one_hot(axis2) * (radius * angle.sin())
    };
    (0..OUTLINE_SEGMENTS).map(|k| Line(point(k), point(k + 1))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use wire4d_math::{Vec2, Vec3};

    fn between(p: Vec3, line: &Line<Vec3>) -> bool {
        let t = (p - line.0).dot(line.direction()) / line.direction().length_squared();
        (-1e-4..=1.0 + 1e-4).contains(&t) && line.lerp(t).is_close(p)
    }

    #[test]
    fn test_sphere_degenerate_line() {
        let inside = Line(Vec3::new(0.5, 0.0, 0.0), Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(clip_line_sphere(inside, 1.0), Some(inside));
        let outside = Line(Vec3::new(2.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(clip_line_sphere(outside, 1.0), None);
    }

    #[test]
    fn test_sphere_chord() {
        let line = Line(Vec3::new(-3.0, 0.0, 0.0), Vec3::new(3.0, 0.0, 0.0));
        let clipped = clip_line_sphere(line, 2.0).unwrap();
        assert!(clipped.is_close(&Line(Vec3::new(-2.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0))));
    }

    #[test]
    fn test_sphere_one_inside() {
        let line = Line(Vec3::ZERO, Vec3::new(0.0, 4.0, 0.0));
        let clipped = clip_line_sphere(line, 1.0).unwrap();
        assert_eq!(clipped.0, Vec3::ZERO);
        assert!(clipped.1.is_close(Vec3::Y));

        let clipped = clip_line_sphere(line.reverse(), 1.0).unwrap();
        assert!(clipped.0.is_close(Vec3::Y));
        assert_eq!(clipped.1, Vec3::ZERO);
    }

    #[test]
    fn test_sphere_miss() {
        // supporting line misses
        let line = Line(Vec3::new(-3.0, 2.0, 0.0), Vec3::new(3.0, 2.0, 0.0));
        assert!(clip_line_sphere(line, 1.0).is_none());
        // supporting line hits, segment stops short
        let line = Line(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(-3.0, 0.0, 0.0));
        assert!(clip_line_sphere(line, 1.0).is_none());
    }

    #[test]
    fn test_sphere_t_intersect_unclamped() {
        let line = Line(Vec3::new(2.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 0.0));
        let (tm, tp) = sphere_t_intersect(&line, 1.0).unwrap();
        assert!((tm + 1.5).abs() < 1e-5);
        assert!((tp + 0.5).abs() < 1e-5);
        assert!(sphere_t_intersect(&Line(Vec3::X, Vec3::X), 1.0).is_none());
    }

    #[test]
    fn test_cylinder_beyond_caps() {
        let line = Line(Vec3::new(0.0, 3.0, 0.0), Vec3::new(0.5, 4.0, 0.0));
        assert!(clip_line_cylinder(line, 1.0, 2.0, 1).is_none());
        let line = Line(Vec3::new(0.0, -3.0, 0.0), Vec3::new(0.5, -4.0, 0.0));
        assert!(clip_line_cylinder(line, 1.0, 2.0, 1).is_none());
    }

    #[test]
    fn test_cylinder_inside_unchanged() {
        let line = Line(Vec3::new(0.2, -1.5, 0.1), Vec3::new(-0.3, 1.5, 0.4));
        assert_eq!(clip_line_cylinder(line, 1.0, 2.0, 1), Some(line));
    }

    #[test]
    fn test_cylinder_clips_caps() {
        let line = Line(Vec3::new(0.0, -5.0, 0.0), Vec3::new(0.0, 5.0, 0.0));
        let clipped = clip_line_cylinder(line, 1.0, 2.0, 1).unwrap();
        assert!(clipped.is_close(&Line(Vec3::new(0.0, -2.0, 0.0), Vec3::new(0.0, 2.0, 0.0))));
    }

    #[test]
    fn test_cylinder_clips_side() {
        let line = Line(Vec3::new(-3.0, 1.0, 0.0), Vec3::new(3.0, 1.0, 0.0));
        let clipped = clip_line_cylinder(line, 1.0, 2.0, 1).unwrap();
        assert!(clipped.is_close(&Line(Vec3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, 1.0, 0.0))));
    }

    #[test]
    fn test_cylinder_2d() {
        let line = Line(Vec2::new(-3.0, 0.5), Vec2::new(3.0, 0.5));
        let clipped = clip_line_cylinder(line, 1.0, 2.0, 1).unwrap();
        assert!(clipped.is_close(&Line(Vec2::new(-1.0, 0.5), Vec2::new(1.0, 0.5))));
    }

    #[test]
    fn test_clipped_points_stay_on_segment() {
        let mut rng = StdRng::seed_from_u64(7);
        let random_point = |rng: &mut StdRng| {
            Vec3::new(rng.gen_range(-4.0..4.0), rng.gen_range(-4.0..4.0), rng.gen_range(-4.0..4.0))
        };
        for _ in 0..500 {
            let line = Line(random_point(&mut rng), random_point(&mut rng));
            if let Some(clipped) = clip_line_sphere(line, 2.0) {
                assert!(between(clipped.0, &line) && between(clipped.1, &line), "{:?} -> {:?}", line, clipped);
            }
            if let Some(clipped) = clip_line_cylinder(line, 2.0, 1.5, 2) {
                assert!(between(clipped.0, &line) && between(clipped.1, &line), "{:?} -> {:?}", line, clipped);
            }
        }
    }

    #[test]
    fn test_view_boundary_contains() {
        let sphere = ViewBoundary::Sphere { radius: 2.0 };
        assert!(sphere.contains(Vec3::new(1.0, 1.0, 1.0)));
        assert!(!sphere.contains(Vec3::new(2.0, 1.0, 0.0)));

        let cylinder = ViewBoundary::Cylinder { radius: 1.0, height: 3.0, axis: 1 };
        assert!(cylinder.contains(Vec3::new(0.5, 2.9, 0.5)));
        assert!(!cylinder.contains(Vec3::new(0.5, 3.1, 0.5)));
        assert!(!cylinder.contains(Vec3::new(1.0, 0.0, 0.5)));
    }

    #[test]
    fn test_cylinder_axis_out_of_range() {
        let wide = ViewBoundary::Cylinder { radius: 1.0, height: 2.0, axis: 5 };
        let last = ViewBoundary::Cylinder { radius: 1.0, height: 2.0, axis: 1 };
        let line = Line(Vec2::new(-3.0, 0.5), Vec2::new(3.0, 0.5));
        assert_eq!(wide.clip(line), last.clip(line));
        assert!(wide.contains(Vec2::new(0.5, 1.5)));
        assert!(!wide.contains(Vec2::new(0.5, 2.5)));
        assert_eq!(wide.outline::<Vec2>(), last.outline::<Vec2>());
    }

    #[test]
    fn test_outline() {
        let sphere = ViewBoundary::Sphere { radius: 2.0 };
        assert_eq!(sphere.outline::<Vec2>().len(), OUTLINE_SEGMENTS);
        let lines = sphere.outline::<Vec3>();
        assert_eq!(lines.len(), 3 * OUTLINE_SEGMENTS);
        for line in &lines {
            assert!((line.0.length() - 2.0).abs() < 1e-4);
        }

        let cylinder = ViewBoundary::Cylinder { radius: 1.0, height: 3.0, axis: 1 };
        assert_eq!(cylinder.outline::<Vec3>().len(), 3 * OUTLINE_SEGMENTS);
        assert_eq!(cylinder.outline::<Vec2>().len(), 4);
    }
}
