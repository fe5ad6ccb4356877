//! World container for shapes
//!
//! Shapes live in a slot map so that renderers can refer to them by a stable
//! [`ShapeKey`], both to skip a shape when clipping against "every other" shape
//! and to key per-frame caches.

use slotmap::{new_key_type, SlotMap};
use wire4d_math::VectorTrait;

use crate::ConvexShape;

new_key_type! {
    /// Handle to a shape in a [`World`]
    pub struct ShapeKey;
}

/// All shapes in the scene
#[derive(Debug)]
pub struct World<V: VectorTrait> {
    shapes: SlotMap<ShapeKey, ConvexShape<V>>,
}

impl<V: VectorTrait> Default for World<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: VectorTrait> World<V> {
    pub fn new() -> Self {
        Self {
            shapes: SlotMap::with_key(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            shapes: SlotMap::with_capacity_and_key(capacity),
        }
    }

    pub fn add_shape(&mut self, shape: ConvexShape<V>) -> ShapeKey {
        self.shapes.insert(shape)
    }

    pub fn get(&self, key: ShapeKey) -> Option<&ConvexShape<V>> {
        self.shapes.get(key)
    }

    pub fn get_mut(&mut self, key: ShapeKey) -> Option<&mut ConvexShape<V>> {
        self.shapes.get_mut(key)
    }

    pub fn remove(&mut self, key: ShapeKey) -> Option<ConvexShape<V>> {
        self.shapes.remove(key)
    }

    pub fn contains(&self, key: ShapeKey) -> bool {
        self.shapes.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = ShapeKey> + '_ {
        self.shapes.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ShapeKey, &ConvexShape<V>)> {
        self.shapes.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ShapeKey, &mut ConvexShape<V>)> {
        self.shapes.iter_mut()
    }

    /// Recompute face visibility of every shape for a camera at `camera_pos`
    pub fn update_visibility(&mut self, camera_pos: V) {
        for shape in self.shapes.values_mut() {
            shape.update_visibility(camera_pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_cube;
    use wire4d_math::Vec3;

    #[test]
    fn test_world_new() {
        let world: World<Vec3> = World::new();
        assert!(world.is_empty());
        assert_eq!(world.len(), 0);
    }

    #[test]
    fn test_add_and_remove() {
        let mut world = World::new();
        let a = world.add_shape(build_cube::<Vec3>(1.0).unwrap());
        let b = world.add_shape(build_cube::<Vec3>(2.0).unwrap());
        assert_eq!(world.len(), 2);
        assert_ne!(a, b);

        let removed = world.remove(a).unwrap();
        assert_eq!(removed.verts.len(), 8);
        assert!(!world.contains(a));
        assert!(world.get(a).is_none());
        assert!(world.get(b).is_some());
    }

    #[test]
    fn test_stale_key_is_not_reused() {
        let mut world = World::new();
        let a = world.add_shape(build_cube::<Vec3>(1.0).unwrap());
        world.remove(a);
        let b = world.add_shape(build_cube::<Vec3>(1.0).unwrap());
        assert_ne!(a, b);
        assert!(world.get(a).is_none());
    }

    #[test]
    fn test_get_mut() {
        let mut world = World::new();
        let key = world.add_shape(build_cube::<Vec3>(2.0).unwrap());
        world.get_mut(key).unwrap().set_pos(Vec3::new(0.0, 3.0, 0.0));
        assert_eq!(world.get(key).unwrap().pos(), Vec3::new(0.0, 3.0, 0.0));
    }

    #[test]
    fn test_update_visibility() {
        let mut world = World::new();
        world.add_shape(build_cube::<Vec3>(2.0).unwrap());
        world.update_visibility(Vec3::new(5.0, 5.0, 5.0));
        let (_, cube) = world.iter().next().unwrap();
        assert_eq!(cube.faces.iter().filter(|f| f.visible).count(), 3);
    }
}
