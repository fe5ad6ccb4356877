//! Occlusion boundaries of convex shapes
//!
//! Seen from an origin, a convex shape hides the region behind it. That region
//! is the intersection of the open half-spaces `x·n < threshold` over the
//! shape's boundary planes:
//!
//! - every visible face contributes its own plane
//! - every subface whose two faces differ in visibility contributes a
//!   silhouette plane interpolated between the two face planes so that it
//!   passes through the origin

use log::trace;
use slotmap::SecondaryMap;
use wire4d_core::{Face, HyperPlane, ShapeKey, SubFace, World};
use wire4d_math::{scalar_lerp, Field, VectorTrait, EPSILON};

/// Silhouette plane between two adjacent faces of differing visibility.
///
/// With `k = n·origin - threshold` for each face, the plane is the
/// interpolation of the two face planes at `t = k1 / (k1 - k2)`, which puts the
/// origin exactly on it. Returns `None` when `k1` and `k2` are too close to
/// interpolate.
pub fn calc_boundary<V: VectorTrait>(face1: &Face<V>, face2: &Face<V>, origin: V) -> Option<HyperPlane<V>> {
    let k1 = face1.normal.dot(origin) - face1.threshold;
    let k2 = face2.normal.dot(origin) - face2.threshold;
    let denom = k1 - k2;
    if denom.abs() < EPSILON {
        trace!("Skipping silhouette boundary: k1={} k2={}", k1, k2);
        return None;
    }
    let t = k1 / denom;
    Some(HyperPlane::new(
        face1.normal.lerp(face2.normal, t),
        scalar_lerp(face1.threshold, face2.threshold, t),
    ))
}

/// Boundary planes of the region a shape hides from `origin`.
///
/// Face visibility must already be up to date for `origin`.
pub fn calc_boundaries<V: VectorTrait>(faces: &[Face<V>], subfaces: &[SubFace], origin: V) -> Vec<HyperPlane<V>> {
    let mut boundaries = Vec::new();
    for subface in subfaces {
        let [i, j] = subface.faces;
        let (face1, face2) = (&faces[i], &faces[j]);
        if face1.visible != face2.visible {
            if let Some(boundary) = calc_boundary(face1, face2, origin) {
                boundaries.push(boundary);
            }
        }
    }
    boundaries.extend(faces.iter().filter(|f| f.visible).map(Face::plane));
    boundaries
}

/// Whether `point` lies inside every boundary, i.e. in the hidden region.
///
/// `epsilon` widens the hidden region. An empty boundary list hides nothing,
/// matching [`clip_line`](super::clip_line).
pub fn point_occluded<V: VectorTrait>(point: V, boundaries: &[HyperPlane<V>], epsilon: Field) -> bool {
    !boundaries.is_empty()
        && boundaries
            .iter()
            .all(|b| point.dot(b.normal) < b.threshold + epsilon)
}

/// Per-shape boundary planes for one frame, keyed by [`ShapeKey`]
#[derive(Clone, Debug)]
pub struct BoundarySet<V> {
    boundaries: SecondaryMap<ShapeKey, Vec<HyperPlane<V>>>,
}

impl<V: VectorTrait> Default for BoundarySet<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: VectorTrait> BoundarySet<V> {
    pub fn new() -> Self {
        Self {
            boundaries: SecondaryMap::new(),
        }
    }

    /// Boundaries of every shape in `world` as seen from `origin`
    pub fn compute(world: &World<V>, origin: V) -> Self {
        let mut set = Self::new();
        set.recompute(world, origin);
        set
    }

    /// Replace the stored boundaries, reusing allocations where possible
    pub fn recompute(&mut self, world: &World<V>, origin: V) {
        self.boundaries.retain(|key, _| world.contains(key));
        for (key, shape) in world.iter() {
            let planes = calc_boundaries(&shape.faces, &shape.subfaces, origin);
            self.boundaries.insert(key, planes);
        }
    }

    pub fn get(&self, key: ShapeKey) -> Option<&[HyperPlane<V>]> {
        self.boundaries.get(key).map(Vec::as_slice)
    }

    /// Number of shapes with boundaries
    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    /// Total number of planes over all shapes
    pub fn plane_count(&self) -> usize {
        self.boundaries.values().map(Vec::len).sum()
    }
}
