//! Shape builders and serializable shape templates

use serde::{Deserialize, Serialize};
use wire4d_math::{Field, Vec3, VectorTrait};

use crate::{Color, ConvexShape, Edge, Face, ShapeError};

/// Serializable description of a shape, used by scene files
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ShapeTemplate {
    /// Axis-aligned cube (tesseract in 4D) with the given edge length
    Cube { size: Field },
    /// Regular polygon in the x-z plane extruded over the remaining axes
    Prism { radius: Field, height: Field, sides: usize },
}

impl ShapeTemplate {
    pub fn cube(size: Field) -> Self {
        ShapeTemplate::Cube { size }
    }

    pub fn prism(radius: Field, height: Field, sides: usize) -> Self {
        ShapeTemplate::Prism { radius, height, sides }
    }

    pub fn build<V: VectorTrait>(&self) -> Result<ConvexShape<V>, ShapeError> {
        match *self {
            ShapeTemplate::Cube { size } => build_cube(size),
            ShapeTemplate::Prism { radius, height, sides } => build_prism(radius, height, sides),
        }
    }
}

/// Axis-aligned hypercube centered on the origin.
///
/// Vertex `i` has `+length/2` on axis `k` when bit `k` of `i` is set.
pub fn build_cube<V: VectorTrait>(length: Field) -> Result<ConvexShape<V>, ShapeError> {
    let d = V::DIM;
    let half = length / 2.0;
    let verts: Vec<V> = (0..1usize << d)
        .map(|i| V::from_fn(|k| if i >> k & 1 == 1 { half } else { -half }))
        .collect();

    let mut edges = Vec::new();
    for i in 0..verts.len() {
        for k in 0..d {
            let j = i | 1 << k;
            if j != i {
                edges.push(Edge(i, j));
            }
        }
    }

    let mut face_sets = Vec::with_capacity(2 * d);
    for k in 0..d {
        for bit in [0, 1] {
            let members: Vec<bool> = (0..verts.len()).map(|i| i >> k & 1 == bit).collect();
            let sign = if bit == 1 { 1.0 } else { -1.0 };
            face_sets.push((members, V::one_hot(k) * sign));
        }
    }

    ConvexShape::new(verts, edges.clone(), faces_from_vertex_sets(&edges, face_sets))
}

/// Prism over a regular `sides`-gon of circumradius `radius`.
///
/// The polygon lies in the plane of axes 0 and 2 and is extruded by `height`
/// along every other axis. In 3D this is an ordinary prism; in 4D it is the
/// product of the polygon with a square.
pub fn build_prism<V: VectorTrait>(
    radius: Field,
    height: Field,
    sides: usize,
) -> Result<ConvexShape<V>, ShapeError> {
    let d = V::DIM;
    if d != 3 && d != 4 {
        return Err(ShapeError::UnsupportedDimension(d));
    }
    if sides < 3 {
        return Err(ShapeError::TooFewSides(sides));
    }

    let extrude_axes: Vec<usize> = (0..d).filter(|&a| a != 0 && a != 2).collect();
    let n_ext = 1usize << extrude_axes.len();
    let half = height / 2.0;
    let angle = |i: usize| std::f32::consts::TAU * i as Field / sides as Field;
    let index = |p: usize, c: usize| (p % sides) * n_ext + c;

    let mut verts = Vec::with_capacity(sides * n_ext);
    for p in 0..sides {
        let (sin, cos) = angle(p).sin_cos();
        for c in 0..n_ext {
            verts.push(V::from_fn(|axis| match axis {
                0 => radius * cos,
                2 => radius * sin,
                _ => {
                    let bit = extrude_axes.iter().position(|&a| a == axis).unwrap_or(0);
                    if c >> bit & 1 == 1 {
                        half
                    } else {
                        -half
                    }
                }
            }));
        }
    }

    let mut edges = Vec::new();
    for p in 0..sides {
        for c in 0..n_ext {
            edges.push(Edge(index(p, c), index(p + 1, c)));
            for bit in 0..extrude_axes.len() {
                if c >> bit & 1 == 0 {
                    edges.push(Edge(index(p, c), index(p, c | 1 << bit)));
                }
            }
        }
    }

    let mut face_sets = Vec::new();
    for p in 0..sides {
        let members: Vec<bool> = (0..verts.len())
            .map(|i| {
                let q = i / n_ext;
                q == p || q == (p + 1) % sides
            })
            .collect();
        let (sin, cos) = (angle(p) + std::f32::consts::PI / sides as Field).sin_cos();
        let normal = V::from_fn(|axis| match axis {
            0 => cos,
            2 => sin,
            _ => 0.0,
        });
        face_sets.push((members, normal));
    }
    for (bit, &axis) in extrude_axes.iter().enumerate() {
        for side in [0, 1] {
            let members: Vec<bool> = (0..verts.len()).map(|i| (i % n_ext) >> bit & 1 == side).collect();
            let sign = if side == 1 { 1.0 } else { -1.0 };
            face_sets.push((members, V::one_hot(axis) * sign));
        }
    }

    ConvexShape::new(verts, edges.clone(), faces_from_vertex_sets(&edges, face_sets))
}

/// Prism in 3D with its `sides`-gon in the x-z plane, extruded along y
pub fn build_prism_3d(radius: Field, height: Field, sides: usize) -> Result<ConvexShape<Vec3>, ShapeError> {
    build_prism(radius, height, sides)
}

/// Turn vertex membership masks into faces holding every edge inside the mask
fn faces_from_vertex_sets<V: VectorTrait>(edges: &[Edge], sets: Vec<(Vec<bool>, V)>) -> Vec<Face<V>> {
    sets.into_iter()
        .enumerate()
        .map(|(fi, (members, normal))| {
            let face_edges = edges
                .iter()
                .enumerate()
                .filter(|(_, e)| members[e.0] && members[e.1])
                .map(|(ei, _)| ei)
                .collect();
            Face::new(face_edges, normal).with_color(Color::PALETTE[fi % Color::PALETTE.len()])
        })
        .collect()
}
