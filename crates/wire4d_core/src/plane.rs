//! Hyperplanes and half-spaces
//!
//! A [`HyperPlane`] splits space into the half-space `{x : x·n >= threshold}`,
//! which counts as the safe (kept) side, and its open complement, which is clipped.

use serde::{Deserialize, Serialize};
use wire4d_math::{Field, VectorTrait, EPSILON};

use crate::Line;

/// A hyperplane `x·normal = threshold`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HyperPlane<V> {
    pub normal: V,
    pub threshold: Field,
}

impl<V: VectorTrait> HyperPlane<V> {
    pub fn new(normal: V, threshold: Field) -> Self {
        Self { normal, threshold }
    }

    /// Plane through `point` with the given normal
    pub fn through(point: V, normal: V) -> Self {
        Self {
            normal,
            threshold: normal.dot(point),
        }
    }

    /// `point·normal - threshold`; scaled by the normal's length
    #[inline]
    pub fn signed_distance(&self, point: V) -> Field {
        point.dot(self.normal) - self.threshold
    }

    /// Whether `point` lies on the safe side (on the plane counts as safe)
    #[inline]
    pub fn contains(&self, point: V) -> bool {
        point.dot(self.normal) >= self.threshold
    }

    /// Intersection point of a segment with the plane.
    ///
    /// Returns `None` when the segment is parallel to the plane or the
    /// crossing lies outside the segment.
    pub fn intersect_line(&self, line: &Line<V>) -> Option<V> {
        let p0n = line.0.dot(self.normal);
        let p1n = line.1.dot(self.normal);
        let denom = p0n - p1n;
        if denom.abs() < EPSILON * EPSILON {
            return None;
        }
        let t = (p0n - self.threshold) / denom;
        if !(0.0..=1.0).contains(&t) {
            return None;
        }
        Some(line.lerp(t))
    }
}
