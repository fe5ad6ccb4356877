//! Clipping segments against occlusion boundaries and single planes

use wire4d_core::{HyperPlane, Line, ShapeKey, World};
use wire4d_math::{Field, VectorTrait};

use super::{BoundarySet, InFrontSet};

/// Visible pieces of a segment after clipping against one shape
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClipResult<V> {
    /// Entirely hidden
    Hidden,
    One(Line<V>),
    /// The shape hides a middle portion
    Two(Line<V>, Line<V>),
}

impl<V> ClipResult<V> {
    pub fn len(&self) -> usize {
        match self {
            ClipResult::Hidden => 0,
            ClipResult::One(_) => 1,
            ClipResult::Two(_, _) => 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ClipResult::Hidden)
    }
}

impl<V> IntoIterator for ClipResult<V> {
    type Item = Line<V>;
    type IntoIter = std::iter::Flatten<std::array::IntoIter<Option<Line<V>>, 2>>;

    fn into_iter(self) -> Self::IntoIter {
        let pieces = match self {
            ClipResult::Hidden => [None, None],
            ClipResult::One(line) => [Some(line), None],
            ClipResult::Two(first, second) => [Some(first), Some(second)],
        };
        pieces.into_iter().flatten()
    }
}

/// Clip `line` to the part not hidden by one shape's `boundaries`.
///
/// Walks the boundaries keeping an interval `[a, b]` of the hidden part. An
/// endpoint counts as visible once it is on the safe side of any boundary. A
/// boundary with both endpoints on its safe side proves the whole segment
/// visible and ends the scan. A shape without boundaries, such as one the
/// camera is inside, hides nothing.
pub fn clip_line<V: VectorTrait>(line: Line<V>, boundaries: &[HyperPlane<V>]) -> ClipResult<V> {
    if boundaries.is_empty() {
        return ClipResult::One(line);
    }
    let Line(p0, p1) = line;
    let (mut a, mut b): (Field, Field) = (0.0, 1.0);
    let (mut p0_any_safe, mut p1_any_safe) = (false, false);

    for boundary in boundaries {
        let th = boundary.threshold;
        let (p0n, p1n) = (p0.dot(boundary.normal), p1.dot(boundary.normal));
        let (p0_safe, p1_safe) = (p0n >= th, p1n >= th);

        if p0_safe && p1_safe {
            a = 0.0;
            b = 1.0;
            p0_any_safe = true;
            p1_any_safe = true;
            break;
        }
        // exactly one side is safe here, so p0n != p1n
        if p0_safe {
            a = a.max((p0n - th) / (p0n - p1n));
        }
        if p1_safe {
            b = b.min((p0n - th) / (p0n - p1n));
        }
        p0_any_safe |= p0_safe;
        p1_any_safe |= p1_safe;
    }

    match (p0_any_safe, p1_any_safe) {
        (true, true) if a > 0.0 && b < 1.0 => ClipResult::Two(Line(p0, line.lerp(a)), Line(line.lerp(b), p1)),
        (true, true) => ClipResult::One(line),
        (true, false) => ClipResult::One(Line(p0, line.lerp(a))),
        (false, true) => ClipResult::One(Line(line.lerp(b), p1)),
        (false, false) => ClipResult::Hidden,
    }
}

/// Clip `lines` belonging to shape `owner` against every other opaque shape
/// that `in_front` says may hide it.
///
/// The line list is threaded through the shapes one at a time. For
/// overlapping occluders the result can depend on the iteration order.
pub fn clip_lines<V: VectorTrait>(
    lines: Vec<Line<V>>,
    owner: ShapeKey,
    world: &World<V>,
    boundaries: &BoundarySet<V>,
    in_front: &InFrontSet<V>,
) -> Vec<Line<V>> {
    let mut lines = lines;
    for (key, shape) in world.iter() {
        if key == owner || shape.transparent || !in_front.may_occlude(key, owner) {
            continue;
        }
        let Some(planes) = boundaries.get(key) else {
            continue;
        };
        lines = lines.into_iter().flat_map(|line| clip_line(line, planes)).collect();
        if lines.is_empty() {
            break;
        }
    }
    lines
}

/// Clip `line` to the half-space `x·normal >= threshold + epsilon`
pub fn clip_line_plane<V: VectorTrait>(line: Line<V>, plane: &HyperPlane<V>, epsilon: Field) -> Option<Line<V>> {
    let Line(p0, p1) = line;
    let th = plane.threshold + epsilon;
    let (p0n, p1n) = (p0.dot(plane.normal), p1.dot(plane.normal));
    match (p0n >= th, p1n >= th) {
        (false, false) => None,
        (true, true) => Some(line),
        (p0_safe, _) => {
            let intersect = line.lerp((p0n - th) / (p0n - p1n));
            if p0_safe {
                Some(Line(p0, intersect))
            } else {
                Some(Line(intersect, p1))
            }
        }
    }
}
