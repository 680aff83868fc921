//! Mesh data structures for per-camera candidates and composited frames

use crate::point::Point3f;
use serde::{Deserialize, Serialize};

/// A triangle candidate produced for one 2x2 pixel square.
///
/// `keep` exempts the triangle from the aggressive first simplification
/// pass; it marks genuine, non-redundant depth edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateTriangle {
    pub vertices: [usize; 3],
    pub keep: bool,
}

impl CandidateTriangle {
    pub fn new(vertices: [usize; 3], keep: bool) -> Self {
        Self { vertices, keep }
    }
}

/// One camera's candidate triangle soup in camera space.
///
/// The vertex buffer is dense over the depth grid while the mesh is being
/// built (index = `row * width + col`); unreferenced vertices are dropped
/// by the reducer's compaction, not here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateMesh {
    pub vertices: Vec<Point3f>,
    pub triangles: Vec<CandidateTriangle>,
}

impl CandidateMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(vertices: Vec<Point3f>, triangles: Vec<CandidateTriangle>) -> Self {
        Self {
            vertices,
            triangles,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Check that every triangle index points into the vertex buffer.
    pub fn indices_in_bounds(&self) -> bool {
        self.triangles
            .iter()
            .flat_map(|t| t.vertices)
            .all(|v| v < self.vertices.len())
    }
}

/// The composited world-space mesh of one frame.
///
/// Vertices from all cameras live in one flat buffer; each camera's
/// triangle indices are offset by the vertex total of the cameras before
/// it, so per-camera index ranges never overlap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameMesh {
    pub vertices: Vec<Point3f>,
    pub triangles: Vec<[u32; 3]>,
}

impl FrameMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(vertices: Vec<Point3f>, triangles: Vec<[u32; 3]>) -> Self {
        Self {
            vertices,
            triangles,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.triangles.is_empty()
    }

    /// Check that every triangle index points into the vertex buffer.
    pub fn indices_in_bounds(&self) -> bool {
        let count = self.vertices.len() as u32;
        self.triangles
            .iter()
            .flat_map(|t| *t)
            .all(|v| v < count)
    }
}
