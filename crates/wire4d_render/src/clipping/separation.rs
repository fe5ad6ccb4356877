//! In-front separation between pairs of shapes
//!
//! Most pairs of shapes can never hide one another from a given camera
//! position. Before clipping, every pair is classified: one of the two is in
//! front, neither is, or the test is inconclusive. A shape's edges are then
//! only clipped against the shapes that may be in front of it.
//!
//! Two tests run per pair:
//!
//! - dynamic: the shapes' bounding balls, usable while the balls are disjoint
//! - static: the gap between the shapes along the line joining their
//!   centers, cached per pair until either shape is transformed again

use std::collections::HashMap;

use log::trace;
use wire4d_core::{ConvexShape, ShapeKey, World};
use wire4d_math::{Field, VectorTrait, EPSILON};

/// Vertex projections may overlap by this much and still count as separated
const SEPARATION_OVERLAP: Field = 1e-6;

/// Ball around a shape's position containing all of its vertices
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBall<V> {
    pub center: V,
    pub radius: Field,
}

impl<V: VectorTrait> BoundingBall<V> {
    pub fn new(center: V, verts: &[V]) -> Self {
        let radius = verts
            .iter()
            .map(|&v| (v - center).length())
            .fold(0.0, Field::max);
        Self { center, radius }
    }

    pub fn of_shape(shape: &ConvexShape<V>) -> Self {
        Self::new(shape.pos(), &shape.verts)
    }
}

/// Which shape of a pair may hide the other
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Separation {
    /// Neither shape can hide the other
    NoneInFront,
    FirstInFront,
    SecondInFront,
    /// Either shape may hide the other
    Unknown,
}

impl Separation {
    /// The same relation with the two shapes swapped
    pub fn swapped(self) -> Self {
        match self {
            Separation::FirstInFront => Separation::SecondInFront,
            Separation::SecondInFront => Separation::FirstInFront,
            other => other,
        }
    }
}

/// A direction along which two shapes do not overlap
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Separator<V> {
    Unknown,
    /// Vertex projections onto `normal` leave the gap `[low, high]` between
    /// the shapes. `first_below` is set when the first shape lies below it.
    Normal {
        normal: V,
        low: Field,
        high: Field,
        first_below: bool,
    },
}

impl<V: VectorTrait> Separator<V> {
    /// Classify the pair as seen from `origin`
    pub fn apply(&self, origin: V) -> Separation {
        match *self {
            Separator::Unknown => Separation::Unknown,
            Separator::Normal { normal, low, high, first_below } => {
                let below = if first_below {
                    Separation::FirstInFront
                } else {
                    Separation::SecondInFront
                };
                let d = origin.dot(normal);
                if d < low {
                    below
                } else if d > high {
                    below.swapped()
                } else {
                    Separation::NoneInFront
                }
            }
        }
    }
}

/// Classify a pair from their bounding balls alone.
///
/// The two cones tangent to both balls meet at a point between them. A
/// camera outside that double cone, or in the slab between the balls, sees
/// neither ball in front of the other. Overlapping balls give `Unknown`.
pub fn dynamic_separate<V: VectorTrait>(ball1: &BoundingBall<V>, ball2: &BoundingBall<V>, origin: V) -> Separation {
    let axis = ball2.center - ball1.center;
    let d = axis.length();
    let (r1, r2) = (ball1.radius, ball2.radius);
    if d <= r1 + r2 {
        return Separation::Unknown;
    }

    let ratio = r1 / (r1 + r2);
    let dist1 = d * ratio;
    let rel = origin - (ball1.center + axis * ratio);

    // signed distance from the apex toward ball 2
    let adj = rel.dot(axis) / d;
    if adj >= r1 - dist1 && adj <= d - dist1 - r2 {
        return Separation::NoneInFront;
    }

    let hyp2 = rel.length_squared();
    let opp2 = hyp2 - adj * adj;
    let sin_cone = r1 / dist1;
    if opp2 >= hyp2 * sin_cone * sin_cone {
        return Separation::NoneInFront;
    }

    if adj > 0.0 {
        Separation::SecondInFront
    } else {
        Separation::FirstInFront
    }
}

fn extent<V: VectorTrait>(verts: &[V], normal: V) -> (Field, Field) {
    verts
        .iter()
        .map(|v| v.dot(normal))
        .fold((Field::INFINITY, Field::NEG_INFINITY), |(lo, hi), x| (lo.min(x), hi.max(x)))
}

/// Separator along `normal` when the two vertex sets project onto disjoint ranges
pub fn normal_separate<V: VectorTrait>(verts1: &[V], verts2: &[V], normal: V) -> Separator<V> {
    if verts1.is_empty() || verts2.is_empty() {
        return Separator::Unknown;
    }
    let (min1, max1) = extent(verts1, normal);
    let (min2, max2) = extent(verts2, normal);

    if min2 - max1 >= -SEPARATION_OVERLAP {
        Separator::Normal { normal, low: max1, high: min2, first_below: true }
    } else if min1 - max2 >= -SEPARATION_OVERLAP {
        Separator::Normal { normal, low: max2, high: min1, first_below: false }
    } else {
        Separator::Unknown
    }
}

/// Try to separate two shapes along the line joining their positions
pub fn separate_between_centers<V: VectorTrait>(shape1: &ConvexShape<V>, shape2: &ConvexShape<V>) -> Separator<V> {
    let normal = shape2.pos() - shape1.pos();
    if normal.length_squared() <= EPSILON * EPSILON {
        return Separator::Unknown;
    }
    normal_separate(&shape1.verts, &shape2.verts, normal)
}

#[derive(Clone, Copy, Debug)]
struct CachedSeparator<V> {
    /// Shape revisions the separator was computed for
    revisions: (u64, u64),
    separator: Separator<V>,
}

/// Key of an unordered pair, and whether `(a, b)` was swapped to build it
fn pair_key(a: ShapeKey, b: ShapeKey) -> ((ShapeKey, ShapeKey), bool) {
    if a <= b {
        ((a, b), false)
    } else {
        ((b, a), true)
    }
}

/// Pairwise in-front relations for one camera position
#[derive(Clone, Debug)]
pub struct InFrontSet<V> {
    relations: HashMap<(ShapeKey, ShapeKey), Separation>,
    separators: HashMap<(ShapeKey, ShapeKey), CachedSeparator<V>>,
}

impl<V: VectorTrait> Default for InFrontSet<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: VectorTrait> InFrontSet<V> {
    pub fn new() -> Self {
        Self {
            relations: HashMap::new(),
            separators: HashMap::new(),
        }
    }

    /// Relations between every pair of shapes in `world` as seen from `origin`
    pub fn compute(world: &World<V>, origin: V) -> Self {
        let mut set = Self::new();
        set.recompute(world, origin);
        set
    }

    /// Reclassify every pair. Static separators are reused while neither
    /// shape of the pair has been transformed.
    pub fn recompute(&mut self, world: &World<V>, origin: V) {
        self.relations.clear();
        self.separators
            .retain(|&(a, b), _| world.contains(a) && world.contains(b));

        let mut shapes: Vec<_> = world
            .iter()
            .map(|(key, shape)| (key, shape, BoundingBall::of_shape(shape)))
            .collect();
        shapes.sort_by_key(|&(key, _, _)| key);

        for (i, &(key1, shape1, ball1)) in shapes.iter().enumerate() {
            for &(key2, shape2, ball2) in &shapes[i + 1..] {
                let mut separation = dynamic_separate(&ball1, &ball2, origin);
                if separation == Separation::Unknown {
                    let revisions = (shape1.revision(), shape2.revision());
                    let separator = match self.separators.get(&(key1, key2)) {
                        Some(cached) if cached.revisions == revisions => cached.separator,
                        _ => {
                            let separator = separate_between_centers(shape1, shape2);
                            trace!("Static separator for {:?}/{:?}: {:?}", key1, key2, separator);
                            self.separators
                                .insert((key1, key2), CachedSeparator { revisions, separator });
                            separator
                        }
                    };
                    separation = separator.apply(origin);
                }
                self.relations.insert((key1, key2), separation);
            }
        }
    }

    /// Relation between `a` and `b`, with `a` as the first shape
    pub fn separation(&self, a: ShapeKey, b: ShapeKey) -> Option<Separation> {
        let (key, swapped) = pair_key(a, b);
        self.relations
            .get(&key)
            .map(|&s| if swapped { s.swapped() } else { s })
    }

    /// Whether `occluder` may hide part of `target`.
    ///
    /// Pairs without a computed relation may always hide each other.
    pub fn may_occlude(&self, occluder: ShapeKey, target: ShapeKey) -> bool {
        !matches!(
            self.separation(occluder, target),
            Some(Separation::NoneInFront | Separation::SecondInFront)
        )
    }

    /// Number of classified pairs
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Pairs in which at least one shape may hide the other
    pub fn occluding_pairs(&self) -> usize {
        self.relations
            .values()
            .filter(|&&s| s != Separation::NoneInFront)
            .count()
    }

    /// Number of cached static separators
    pub fn cached_separators(&self) -> usize {
        self.separators.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wire4d_core::build_cube;
    use wire4d_math::Vec3;

    fn ball(x: Field, y: Field, z: Field, radius: Field) -> BoundingBall<Vec3> {
        BoundingBall {
            center: Vec3::new(x, y, z),
            radius,
        }
    }

    fn cube_at(pos: Vec3) -> ConvexShape<Vec3> {
        let mut cube = build_cube::<Vec3>(2.0).unwrap();
        cube.set_pos(pos);
        cube
    }

    #[test]
    fn test_bounding_ball_of_cube() {
        let cube = cube_at(Vec3::new(1.0, 2.0, 3.0));
        let bball = BoundingBall::of_shape(&cube);
        assert!(bball.center.is_close(Vec3::new(1.0, 2.0, 3.0)));
        assert!((bball.radius - 3.0_f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn test_dynamic_separate_on_axis() {
        let near = ball(0.0, 0.0, 0.0, 1.0);
        let far = ball(0.0, 0.0, -5.0, 1.0);
        let camera = Vec3::new(0.0, 0.0, 10.0);
        assert_eq!(dynamic_separate(&near, &far, camera), Separation::FirstInFront);
        assert_eq!(dynamic_separate(&far, &near, camera), Separation::SecondInFront);
    }

    #[test]
    fn test_dynamic_separate_no_front() {
        let a = ball(0.0, 0.0, 0.0, 1.0);
        let b = ball(0.0, 0.0, -5.0, 1.0);
        // in the slab between the balls
        assert_eq!(dynamic_separate(&a, &b, Vec3::new(10.0, 0.0, -2.5)), Separation::NoneInFront);
        // outside the tangent cone
        assert_eq!(dynamic_separate(&a, &b, Vec3::new(10.0, 0.0, 10.0)), Separation::NoneInFront);
    }

    #[test]
    fn test_dynamic_separate_overlapping_balls() {
        let a = ball(0.0, 0.0, 0.0, 2.0);
        let b = ball(3.0, 0.0, 0.0, 2.0);
        assert_eq!(dynamic_separate(&a, &b, Vec3::new(10.0, 0.0, 0.0)), Separation::Unknown);
    }

    #[test]
    fn test_static_separator() {
        let a = cube_at(Vec3::ZERO);
        let b = cube_at(Vec3::new(3.0, 0.0, 0.0));
        // bounding balls overlap, the cubes do not
        assert_eq!(
            dynamic_separate(&BoundingBall::of_shape(&a), &BoundingBall::of_shape(&b), Vec3::new(10.0, 0.0, 0.0)),
            Separation::Unknown
        );

        let separator = separate_between_centers(&a, &b);
        match separator {
            Separator::Normal { low, high, first_below, .. } => {
                assert!((low - 3.0).abs() < 1e-4);
                assert!((high - 6.0).abs() < 1e-4);
                assert!(first_below);
            }
            Separator::Unknown => panic!("cubes should separate"),
        }
        assert_eq!(separator.apply(Vec3::new(-10.0, 0.0, 0.0)), Separation::FirstInFront);
        assert_eq!(separator.apply(Vec3::new(10.0, 0.0, 0.0)), Separation::SecondInFront);
        assert_eq!(separator.apply(Vec3::new(1.5, 0.0, 10.0)), Separation::NoneInFront);
    }

    #[test]
    fn test_static_separator_unknown() {
        let a = cube_at(Vec3::ZERO);
        assert_eq!(separate_between_centers(&a, &cube_at(Vec3::ZERO)), Separator::Unknown);
        assert_eq!(separate_between_centers(&a, &cube_at(Vec3::new(1.0, 0.0, 0.0))), Separator::Unknown);
    }

    #[test]
    fn test_in_front_set_uses_static_separator() {
        let mut world = World::new();
        let a = world.add_shape(cube_at(Vec3::ZERO));
        let b = world.add_shape(cube_at(Vec3::new(3.0, 0.0, 0.0)));
        let set = InFrontSet::compute(&world, Vec3::new(10.0, 0.0, 0.0));

        assert_eq!(set.len(), 1);
        assert_eq!(set.cached_separators(), 1);
        assert_eq!(set.separation(a, b), Some(Separation::SecondInFront));
        assert_eq!(set.separation(b, a), Some(Separation::FirstInFront));
        assert!(set.may_occlude(b, a));
        assert!(!set.may_occlude(a, b));
    }

    #[test]
    fn test_in_front_set_refreshes_moved_shapes() {
        let mut world = World::new();
        let a = world.add_shape(cube_at(Vec3::ZERO));
        let b = world.add_shape(cube_at(Vec3::new(3.0, 0.0, 0.0)));
        let camera = Vec3::new(10.0, 0.0, 0.0);
        let mut set = InFrontSet::compute(&world, camera);
        assert!(set.may_occlude(b, a));

        // a stale separator would still put b in front
        world.get_mut(b).unwrap().set_pos(Vec3::new(-3.0, 0.0, 0.0));
        set.recompute(&world, camera);
        assert_eq!(set.separation(a, b), Some(Separation::FirstInFront));
        assert!(set.may_occlude(a, b));
        assert!(!set.may_occlude(b, a));
    }

    #[test]
    fn test_in_front_set_unknown_clips_both_ways() {
        let mut world = World::new();
        let a = world.add_shape(cube_at(Vec3::ZERO));
        let b = world.add_shape(cube_at(Vec3::new(1.0, 0.5, 0.0)));
        let set = InFrontSet::compute(&world, Vec3::new(0.0, 0.0, 10.0));
        assert_eq!(set.separation(a, b), Some(Separation::Unknown));
        assert!(set.may_occlude(a, b));
        assert!(set.may_occlude(b, a));
        assert_eq!(set.occluding_pairs(), 1);
    }

    #[test]
    fn test_in_front_set_dynamic_pairs() {
        let mut world = World::new();
        let near = world.add_shape(cube_at(Vec3::new(0.0, 0.0, 5.0)));
        let far = world.add_shape(cube_at(Vec3::new(0.0, 0.0, 10.0)));
        let aside = world.add_shape(cube_at(Vec3::new(20.0, 0.0, 5.0)));
        let set = InFrontSet::compute(&world, Vec3::ZERO);

        assert_eq!(set.len(), 3);
        // balls are disjoint, so no static separator is needed
        assert_eq!(set.cached_separators(), 0);
        assert_eq!(set.separation(near, far), Some(Separation::FirstInFront));
        assert_eq!(set.separation(near, aside), Some(Separation::NoneInFront));
        assert!(!set.may_occlude(aside, far));
    }

    #[test]
    fn test_empty_set_may_always_occlude() {
        let mut world = World::new();
        let a = world.add_shape(cube_at(Vec3::ZERO));
        let b = world.add_shape(cube_at(Vec3::new(0.0, 0.0, 5.0)));
        let set: InFrontSet<Vec3> = InFrontSet::new();
        assert!(set.may_occlude(a, b));
        assert!(set.may_occlude(b, a));
    }

    #[test]
    fn test_in_front_set_drops_removed_shapes() {
        let mut world = World::new();
        let a = world.add_shape(cube_at(Vec3::ZERO));
        world.add_shape(cube_at(Vec3::new(3.0, 0.0, 0.0)));
        let camera = Vec3::new(10.0, 0.0, 0.0);
        let mut set = InFrontSet::compute(&world, camera);
        assert_eq!(set.cached_separators(), 1);

        world.remove(a);
        set.recompute(&world, camera);
        assert!(set.is_empty());
        assert_eq!(set.cached_separators(), 0);
    }
}
