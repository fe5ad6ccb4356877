//! Faces, edges and subfaces of a convex shape
//!
//! A face only knows the indices of its edges; vertex positions come from the
//! owning [`ConvexShape`](crate::ConvexShape), which passes them in on every update.

use wire4d_math::{barycenter, Field, VectorTrait};

use crate::{Color, HyperPlane};

pub type VertIndex = usize;
pub type EdgeIndex = usize;
pub type FaceIndex = usize;

/// An edge between two vertices of the same shape
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Edge(pub VertIndex, pub VertIndex);

impl Edge {
    pub fn contains(&self, vert: VertIndex) -> bool {
        self.0 == vert || self.1 == vert
    }
}

/// A pair of faces that share a ridge (an edge in 3D, a polygon in 4D)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubFace {
    pub faces: [FaceIndex; 2],
}

/// A bounding facet of a convex shape
#[derive(Clone, Debug)]
pub struct Face<V> {
    pub edges: Vec<EdgeIndex>,
    pub color: Color,
    /// World-space outward normal, unit length
    pub normal: V,
    /// World-space center (mean of the face vertices)
    pub center: V,
    /// `normal·center`
    pub threshold: Field,
    /// Whether the face points toward the camera
    pub visible: bool,
    normal_ref: V,
    verts: Vec<VertIndex>,
}

impl<V: VectorTrait> Face<V> {
    /// Create a face from its edges and its outward normal in the shape's
    /// reference frame. The normal is normalized here.
    pub fn new(edges: Vec<EdgeIndex>, normal: V) -> Self {
        let normal_ref = normal.normalized();
        Self {
            edges,
            color: Color::default(),
            normal: normal_ref,
            center: V::zero(),
            threshold: 0.0,
            visible: true,
            normal_ref,
            verts: Vec::new(),
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Outward normal in the shape's reference frame
    pub fn normal_ref(&self) -> V {
        self.normal_ref
    }

    /// Distinct vertex indices touched by this face's edges, sorted
    pub fn verts(&self) -> &[VertIndex] {
        &self.verts
    }

    pub fn plane(&self) -> HyperPlane<V> {
        HyperPlane::new(self.normal, self.threshold)
    }

    pub(crate) fn calc_verts(&mut self, edges: &[Edge]) {
        let mut verts: Vec<VertIndex> = self
            .edges
            .iter()
            .flat_map(|&ei| [edges[ei].0, edges[ei].1])
            .collect();
        verts.sort_unstable();
        verts.dedup();
        self.verts = verts;
    }

    /// Recompute the world-space normal, center and threshold.
    ///
    /// `shape_verts` are the owning shape's world-space vertices and `rotate`
    /// maps a reference-frame direction into world space.
    pub fn update<F: Fn(V) -> V>(&mut self, shape_verts: &[V], rotate: F) {
        self.normal = rotate(self.normal_ref);
        let face_verts: Vec<V> = self.verts.iter().map(|&vi| shape_verts[vi]).collect();
        self.center = barycenter(&face_verts);
        self.threshold = self.normal.dot(self.center);
    }

    /// A face is visible when its normal points back toward the camera
    pub fn update_visibility(&mut self, camera_pos: V) {
        self.visible = self.normal.dot(self.center - camera_pos) < 0.0;
    }
}

/// Count the edges two faces have in common
pub(crate) fn shared_edge_count<V>(a: &Face<V>, b: &Face<V>) -> usize {
    a.edges.iter().filter(|e| b.edges.contains(e)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wire4d_math::Vec3;

    fn square_face() -> (Vec<Vec3>, Vec<Edge>, Face<Vec3>) {
        let verts = vec![
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
        ];
        let edges = vec![Edge(0, 1), Edge(1, 2), Edge(2, 3), Edge(3, 0)];
        let mut face = Face::new(vec![0, 1, 2, 3], Vec3::new(0.0, 0.0, 2.0));
        face.calc_verts(&edges);
        face.update(&verts, |n| n);
        (verts, edges, face)
    }

    #[test]
    fn test_face_verts_are_distinct() {
        let (_, _, face) = square_face();
        assert_eq!(face.verts(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_face_update() {
        let (_, _, face) = square_face();
        assert_eq!(face.normal, Vec3::Z);
        assert!(face.center.is_close(Vec3::new(0.0, 0.0, 1.0)));
        assert!((face.threshold - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_face_visibility() {
        let (_, _, mut face) = square_face();
        face.update_visibility(Vec3::new(0.0, 0.0, 5.0));
        assert!(face.visible);
        face.update_visibility(Vec3::new(0.0, 0.0, -5.0));
        assert!(!face.visible);
    }

    #[test]
    fn test_shared_edge_count() {
        let a: Face<Vec3> = Face::new(vec![0, 1, 2], Vec3::X);
        let b: Face<Vec3> = Face::new(vec![2, 3, 4], Vec3::Y);
        assert_eq!(shared_edge_count(&a, &b), 1);
    }
}
