//! Convex polytopes
//!
//! A [`ConvexShape`] owns its reference-frame vertices and a pose (position,
//! orientation frame, uniform scale). World-space vertices, face normals, centers
//! and thresholds are cached and recomputed by [`ConvexShape::transform`] whenever
//! the pose changes.

use std::fmt;

use log::trace;
use wire4d_math::{rotation_matrix, Field, MatrixTrait, VectorTrait};

use crate::face::shared_edge_count;
use crate::{Edge, EdgeIndex, Face, FaceIndex, Line, SubFace};

/// Maximum distance a face vertex may sit off its face's plane
pub const PLANARITY_TOLERANCE: Field = 1e-3;

/// Error building a convex shape
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeError {
    /// Only 3D and 4D shapes are supported
    UnsupportedDimension(usize),
    /// An edge references a vertex that does not exist
    EdgeOutOfRange { edge: EdgeIndex, vertex: usize },
    /// A face references an edge that does not exist
    FaceEdgeOutOfRange { face: FaceIndex, edge: EdgeIndex },
    /// A face has no edges
    EmptyFace(FaceIndex),
    /// A face normal has zero length
    DegenerateNormal(FaceIndex),
    /// A face vertex lies off the face's plane
    NonPlanarFace { face: FaceIndex, deviation: Field },
    /// A prism needs at least three sides
    TooFewSides(usize),
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeError::UnsupportedDimension(d) => {
                write!(f, "Unsupported dimension: {} (expected 3 or 4)", d)
            }
            ShapeError::EdgeOutOfRange { edge, vertex } => {
                write!(f, "Edge {} references missing vertex {}", edge, vertex)
            }
            ShapeError::FaceEdgeOutOfRange { face, edge } => {
                write!(f, "Face {} references missing edge {}", face, edge)
            }
            ShapeError::EmptyFace(face) => write!(f, "Face {} has no edges", face),
            ShapeError::DegenerateNormal(face) => write!(f, "Face {} has a zero normal", face),
            ShapeError::NonPlanarFace { face, deviation } => {
                write!(f, "Face {} is not planar (deviation {})", face, deviation)
            }
            ShapeError::TooFewSides(n) => write!(f, "Prism needs at least 3 sides, got {}", n),
        }
    }
}

impl std::error::Error for ShapeError {}

/// A convex polytope in `V::DIM` dimensions
#[derive(Clone, Debug)]
pub struct ConvexShape<V: VectorTrait> {
    /// World-space vertices
    pub verts: Vec<V>,
    pub edges: Vec<Edge>,
    pub faces: Vec<Face<V>>,
    pub subfaces: Vec<SubFace>,
    /// Transparent shapes never occlude and draw all their faces
    pub transparent: bool,
    verts_ref: Vec<V>,
    pos: V,
    frame: V::M,
    scale: Field,
    revision: u64,
}

impl<V: VectorTrait> ConvexShape<V> {
    /// Build a shape from reference-frame vertices, edges and faces.
    ///
    /// Face vertex sets and subfaces are derived from the edge lists. Two faces
    /// form a subface when they share at least one edge (3D) or two edges (4D).
    pub fn new(verts: Vec<V>, edges: Vec<Edge>, mut faces: Vec<Face<V>>) -> Result<Self, ShapeError> {
        if V::DIM != 3 && V::DIM != 4 {
            return Err(ShapeError::UnsupportedDimension(V::DIM));
        }
        for (ei, edge) in edges.iter().enumerate() {
            for vertex in [edge.0, edge.1] {
                if vertex >= verts.len() {
                    return Err(ShapeError::EdgeOutOfRange { edge: ei, vertex });
                }
            }
        }
        for (fi, face) in faces.iter_mut().enumerate() {
            if face.edges.is_empty() {
                return Err(ShapeError::EmptyFace(fi));
            }
            if let Some(&edge) = face.edges.iter().find(|&&e| e >= edges.len()) {
                return Err(ShapeError::FaceEdgeOutOfRange { face: fi, edge });
            }
            if face.normal_ref().length_squared() == 0.0 {
                return Err(ShapeError::DegenerateNormal(fi));
            }
            face.calc_verts(&edges);
        }

        let subfaces = calc_subfaces(&faces, V::DIM - 2);
        trace!(
            "Built shape: {} verts, {} edges, {} faces, {} subfaces",
            verts.len(),
            edges.len(),
            faces.len(),
            subfaces.len()
        );

        let mut shape = Self {
            verts: verts.clone(),
            edges,
            faces,
            subfaces,
            transparent: false,
            verts_ref: verts,
            pos: V::zero(),
            frame: V::M::identity(),
            scale: 1.0,
            revision: 0,
        };
        shape.transform();
        shape.check_planarity()?;
        Ok(shape)
    }

    pub fn with_transparent(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }

    pub fn pos(&self) -> V {
        self.pos
    }

    /// Orientation frame; rows are the body axes in world space
    pub fn frame(&self) -> V::M {
        self.frame
    }

    pub fn scale(&self) -> Field {
        self.scale
    }

    /// Bumped every time the world-space vertices are recomputed
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn verts_ref(&self) -> &[V] {
        &self.verts_ref
    }

    pub fn set_pos(&mut self, pos: V) {
        self.pos = pos;
        self.transform();
    }

    pub fn set_scale(&mut self, scale: Field) {
        self.scale = scale;
        self.transform();
    }

    pub fn set_frame(&mut self, frame: V::M) {
        self.frame = frame;
        self.transform();
    }

    /// Rotate the shape's own axes `axis1` and `axis2` toward each other by `angle`
    pub fn rotate(&mut self, axis1: usize, axis2: usize, angle: Field) {
        let rot = rotation_matrix(self.frame[axis1], self.frame[axis2], Some(angle));
        self.frame = self.frame.dot(rot);
        self.transform();
    }

    /// Recompute world-space vertices and face data from the current pose
    pub fn transform(&mut self) {
        let world_rot = self.frame.transpose();
        for (vert, vert_ref) in self.verts.iter_mut().zip(&self.verts_ref) {
            *vert = world_rot.transform(*vert_ref * self.scale) + self.pos;
        }
        for face in &mut self.faces {
            face.update(&self.verts, |n| world_rot.transform(n));
        }
        self.revision = self.revision.wrapping_add(1);
    }

    /// Mark faces facing `camera_pos`. Transparent shapes show every face.
    pub fn update_visibility(&mut self, camera_pos: V) {
        for face in &mut self.faces {
            if self.transparent {
                face.visible = true;
            } else {
                face.update_visibility(camera_pos);
            }
        }
    }

    pub fn edge_line(&self, edge: EdgeIndex) -> Line<V> {
        let Edge(a, b) = self.edges[edge];
        Line(self.verts[a], self.verts[b])
    }

    /// The edges of `face`, shrunk toward its center by `scale`
    pub fn face_lines(&self, face: FaceIndex, scale: Field) -> impl Iterator<Item = Line<V>> + '_ {
        let face = &self.faces[face];
        let center = face.center;
        face.edges
            .iter()
            .map(move |&ei| self.edge_line(ei).map(|v| center.lerp(v, scale)))
    }

    /// World-space vertices of `face`
    pub fn face_verts(&self, face: FaceIndex) -> impl Iterator<Item = V> + '_ {
        self.faces[face].verts().iter().map(|&vi| self.verts[vi])
    }

    fn check_planarity(&self) -> Result<(), ShapeError> {
        for (fi, face) in self.faces.iter().enumerate() {
            for v in self.face_verts(fi) {
                let deviation = (face.normal.dot(v) - face.threshold).abs();
                if deviation > PLANARITY_TOLERANCE {
                    return Err(ShapeError::NonPlanarFace { face: fi, deviation });
                }
            }
        }
        Ok(())
    }
}

fn calc_subfaces<V>(faces: &[Face<V>], min_shared: usize) -> Vec<SubFace> {
    let mut subfaces = Vec::new();
    for i in 0..faces.len() {
        for j in (i + 1)..faces.len() {
            if shared_edge_count(&faces[i], &faces[j]) >= min_shared {
                subfaces.push(SubFace { faces: [i, j] });
            }
        }
    }
    subfaces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_cube;
    use wire4d_math::{Vec3, Vec4};

    #[test]
    fn test_cube_topology() {
        let cube = build_cube::<Vec3>(2.0).unwrap();
        assert_eq!(cube.verts.len(), 8);
        assert_eq!(cube.edges.len(), 12);
        assert_eq!(cube.faces.len(), 6);
        // every face pair except the 3 opposite pairs
        assert_eq!(cube.subfaces.len(), 12);
        for face in &cube.faces {
            assert_eq!(face.verts().len(), 4);
        }
    }

    #[test]
    fn test_tesseract_topology() {
        let tesseract = build_cube::<Vec4>(2.0).unwrap();
        assert_eq!(tesseract.verts.len(), 16);
        assert_eq!(tesseract.edges.len(), 32);
        assert_eq!(tesseract.faces.len(), 8);
        assert_eq!(tesseract.subfaces.len(), 24);
    }

    #[test]
    fn test_set_pos_moves_verts_and_faces() {
        let mut cube = build_cube::<Vec3>(2.0).unwrap();
        cube.set_pos(Vec3::new(10.0, 0.0, 0.0));
        for v in &cube.verts {
            assert!(v.x >= 9.0 && v.x <= 11.0);
        }
        let plus_x = cube
            .faces
            .iter()
            .find(|f| f.normal.is_close(Vec3::X))
            .unwrap();
        assert!((plus_x.threshold - 11.0).abs() < 1e-5);
    }

    #[test]
    fn test_revision_tracks_pose_changes() {
        let mut cube = build_cube::<Vec3>(2.0).unwrap();
        let built = cube.revision();
        cube.update_visibility(Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(cube.revision(), built);

        cube.set_pos(Vec3::new(1.0, 0.0, 0.0));
        assert!(cube.revision() > built);
        let moved = cube.revision();
        cube.rotate(0, 1, 0.3);
        assert!(cube.revision() > moved);
    }

    #[test]
    fn test_set_scale() {
        let mut cube = build_cube::<Vec3>(2.0).unwrap();
        cube.set_scale(3.0);
        for v in &cube.verts {
            assert!((v.linf_norm() - 3.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let mut cube = build_cube::<Vec3>(2.0).unwrap();
        let original = cube.verts.clone();
        cube.rotate(0, 2, std::f32::consts::FRAC_PI_2);
        assert!(cube.frame().is_orthonormal());
        // a quarter turn maps the cube onto itself
        for v in &cube.verts {
            assert!(original.iter().any(|o| o.is_close(*v)));
        }
        // face normals stay unit length and outward
        for face in &cube.faces {
            assert!((face.normal.length() - 1.0).abs() < 1e-4);
            assert!((face.threshold - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_visibility_from_front() {
        let mut cube = build_cube::<Vec3>(2.0).unwrap();
        cube.update_visibility(Vec3::new(0.0, 0.0, 5.0));
        let visible: Vec<_> = cube.faces.iter().filter(|f| f.visible).collect();
        assert_eq!(visible.len(), 1);
        assert!(visible[0].normal.is_close(Vec3::Z));
    }

    #[test]
    fn test_transparent_shows_all_faces() {
        let mut cube = build_cube::<Vec3>(2.0).unwrap().with_transparent(true);
        cube.update_visibility(Vec3::new(0.0, 0.0, 5.0));
        assert!(cube.faces.iter().all(|f| f.visible));
    }

    #[test]
    fn test_face_lines_scaled_toward_center() {
        let cube = build_cube::<Vec3>(2.0).unwrap();
        let fi = cube.faces.iter().position(|f| f.normal.is_close(Vec3::Z)).unwrap();
        let lines: Vec<_> = cube.face_lines(fi, 0.5).collect();
        assert_eq!(lines.len(), 4);
        for line in lines {
            for p in [line.0, line.1] {
                assert!((p.z - 1.0).abs() < 1e-6);
                assert!((p.x.abs() - 0.5).abs() < 1e-6);
                assert!((p.y.abs() - 0.5).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_non_planar_face_rejected() {
        let verts = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.5),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let edges = vec![Edge(0, 1), Edge(1, 2), Edge(2, 3), Edge(3, 0)];
        let faces = vec![Face::new(vec![0, 1, 2, 3], Vec3::Z)];
        let err = ConvexShape::new(verts, edges, faces).unwrap_err();
        assert!(matches!(err, ShapeError::NonPlanarFace { face: 0, .. }));
    }

    #[test]
    fn test_bad_edge_index_rejected() {
        let verts = vec![Vec3::ZERO, Vec3::X];
        let edges = vec![Edge(0, 2)];
        let faces = vec![Face::new(vec![0], Vec3::Y)];
        let err = ConvexShape::new(verts, edges, faces).unwrap_err();
        assert_eq!(err, ShapeError::EdgeOutOfRange { edge: 0, vertex: 2 });
    }

    #[test]
    fn test_empty_face_rejected() {
        let verts = vec![Vec3::ZERO, Vec3::X];
        let edges = vec![Edge(0, 1)];
        let faces = vec![Face::new(vec![], Vec3::Y)];
        assert_eq!(
            ConvexShape::new(verts, edges, faces).unwrap_err(),
            ShapeError::EmptyFace(0)
        );
    }

    #[test]
    fn test_shape_error_display() {
        let err = ShapeError::UnsupportedDimension(2);
        assert_eq!(format!("{}", err), "Unsupported dimension: 2 (expected 3 or 4)");
    }
}
