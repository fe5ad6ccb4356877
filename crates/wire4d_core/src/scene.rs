//! Scene serialization
//!
//! A [`SceneTemplate`] is a RON description of a world: its dimension, the
//! camera start position and the shapes to place. Templates are dimension-tagged
//! and only instantiate into a [`World`] of matching dimension.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

use log::debug;
use wire4d_math::{Field, VectorTrait};

use crate::{Color, ShapeError, ShapeTemplate, World};

/// A shape placed in a scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeEntry {
    pub shape: ShapeTemplate,
    /// World position; empty means the origin
    #[serde(default)]
    pub position: Vec<Field>,
    #[serde(default = "default_scale")]
    pub scale: Field,
    /// Plane rotations `(axis1, axis2, angle)` applied in order
    #[serde(default)]
    pub rotations: Vec<(usize, usize, Field)>,
    /// Single color for every face; `None` keeps the per-face palette
    #[serde(default)]
    pub color: Option<[f32; 3]>,
    #[serde(default)]
    pub transparent: bool,
}

fn default_scale() -> Field {
    1.0
}

impl ShapeEntry {
    pub fn new(shape: ShapeTemplate) -> Self {
        Self {
            shape,
            position: Vec::new(),
            scale: 1.0,
            rotations: Vec::new(),
            color: None,
            transparent: false,
        }
    }

    pub fn at(mut self, position: &[Field]) -> Self {
        self.position = position.to_vec();
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color.0);
        self
    }

    pub fn with_scale(mut self, scale: Field) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, axis1: usize, axis2: usize, angle: Field) -> Self {
        self.rotations.push((axis1, axis2, angle));
        self
    }

    pub fn transparent(mut self) -> Self {
        self.transparent = true;
        self
    }
}

/// A serializable scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneTemplate {
    /// Scene name (for display/debugging)
    pub name: String,
    /// Spatial dimension, 3 or 4
    pub dimension: usize,
    /// Camera start position; empty means the default camera position
    #[serde(default)]
    pub camera_start: Vec<Field>,
    #[serde(default)]
    pub shapes: Vec<ShapeEntry>,
}

impl SceneTemplate {
    pub fn new(name: impl Into<String>, dimension: usize) -> Self {
        Self {
            name: name.into(),
            dimension,
            camera_start: Vec::new(),
            shapes: Vec::new(),
        }
    }

    pub fn with_camera_start(mut self, position: &[Field]) -> Self {
        self.camera_start = position.to_vec();
        self
    }

    pub fn with_shape(mut self, entry: ShapeEntry) -> Self {
        self.shapes.push(entry);
        self
    }

    /// Load a scene from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SceneError> {
        let contents = fs::read_to_string(path)?;
        let scene = ron::from_str(&contents)?;
        Ok(scene)
    }

    /// Save a scene to a RON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SceneError> {
        let pretty = ron::ser::PrettyConfig::new()
            .struct_names(true)
            .enumerate_arrays(false);
        let contents = ron::ser::to_string_pretty(self, pretty)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Camera start position as a vector, if the scene sets one
    pub fn camera_start<V: VectorTrait>(&self) -> Result<Option<V>, SceneError> {
        self.check_dimension::<V>()?;
        if self.camera_start.is_empty() {
            return Ok(None);
        }
        vector_from(&self.camera_start).map(Some)
    }

    /// Build every shape of the scene into a new world
    pub fn instantiate<V: VectorTrait>(&self) -> Result<World<V>, SceneError> {
        self.check_dimension::<V>()?;
        let mut world = World::with_capacity(self.shapes.len());
        for entry in &self.shapes {
            let mut shape = entry.shape.build::<V>()?;
            for &(axis1, axis2, angle) in &entry.rotations {
                if axis1 >= V::DIM || axis2 >= V::DIM || axis1 == axis2 {
                    return Err(SceneError::InvalidRotation { axis1, axis2 });
                }
                shape.rotate(axis1, axis2, angle);
            }
            shape.set_scale(entry.scale);
            if !entry.position.is_empty() {
                shape.set_pos(vector_from(&entry.position)?);
            }
            if let Some(color) = entry.color {
                for face in &mut shape.faces {
                    face.color = Color(color);
                }
            }
            shape.transparent = entry.transparent;
            world.add_shape(shape);
        }
        debug!("Instantiated scene '{}' with {} shapes", self.name, world.len());
        Ok(world)
    }

    fn check_dimension<V: VectorTrait>(&self) -> Result<(), SceneError> {
        if self.dimension != V::DIM {
            return Err(SceneError::DimensionMismatch {
                expected: V::DIM,
                found: self.dimension,
            });
        }
        Ok(())
    }
}

fn vector_from<V: VectorTrait>(values: &[Field]) -> Result<V, SceneError> {
    V::from_slice(values).ok_or(SceneError::DimensionMismatch {
        expected: V::DIM,
        found: values.len(),
    })
}

/// Error loading, saving or instantiating a scene
#[derive(Debug)]
pub enum SceneError {
    /// IO error (file not found, permission denied, etc.)
    Io(io::Error),
    /// Parse error (invalid RON syntax)
    Parse(ron::error::SpannedError),
    /// Serialization error
    Serialize(ron::Error),
    /// Scene or vector dimension does not match the world
    DimensionMismatch { expected: usize, found: usize },
    /// A rotation names an axis outside the world or the same axis twice
    InvalidRotation { axis1: usize, axis2: usize },
    /// A shape failed to build
    Shape(ShapeError),
}

impl From<io::Error> for SceneError {
    fn from(e: io::Error) -> Self {
        SceneError::Io(e)
    }
}

impl From<ron::error::SpannedError> for SceneError {
    fn from(e: ron::error::SpannedError) -> Self {
        SceneError::Parse(e)
    }
}

impl From<ron::Error> for SceneError {
    fn from(e: ron::Error) -> Self {
        SceneError::Serialize(e)
    }
}

impl From<ShapeError> for SceneError {
    fn from(e: ShapeError) -> Self {
        SceneError::Shape(e)
    }
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneError::Io(e) => write!(f, "IO error: {}", e),
            SceneError::Parse(e) => write!(f, "Parse error: {}", e),
            SceneError::Serialize(e) => write!(f, "Serialize error: {}", e),
            SceneError::DimensionMismatch { expected, found } => {
                write!(f, "Dimension mismatch: expected {}, found {}", expected, found)
            }
            SceneError::InvalidRotation { axis1, axis2 } => {
                write!(f, "Invalid rotation plane: ({}, {})", axis1, axis2)
            }
            SceneError::Shape(e) => write!(f, "Shape error: {}", e),
        }
    }
}

impl std::error::Error for SceneError {}
