//! Triangle mesh input for distance field generation
//!
//! A [`Mesh`] is just vertex positions and triangle index triples. The
//! converter needs nothing more. Sign propagation assumes the mesh is
//! closed with consistent winding; open or self-intersecting meshes still
//! convert, but inside/outside can be locally wrong near the defect.
//!
//! Author: Pierre Vandel

pub mod obj;

pub use obj::{load_obj, ObjError};

use glam::Vec3;
use thiserror::Error;

use crate::types::Aabb;

/// The mesh cannot produce a distance grid
///
/// Raised only for inputs with no usable volume (a degenerate bounding
/// box). Quality defects like open boundaries degrade sign correctness
/// but do not error.
#[derive(Error, Debug)]
#[error("invalid mesh: {0}")]
pub struct InvalidMeshError(pub String);

/// Triangle mesh: vertex positions plus index triples
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// Vertex positions
    pub vertices: Vec<Vec3>,
    /// Triangle indices, three per face
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create an empty mesh
    pub fn new() -> Self {
        Mesh::default()
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertices of triangle `i`
    #[inline]
    pub fn triangle(&self, i: usize) -> [Vec3; 3] {
        let base = i * 3;
        [
            self.vertices[self.indices[base] as usize],
            self.vertices[self.indices[base + 1] as usize],
            self.vertices[self.indices[base + 2] as usize],
        ]
    }

    /// Bounding box over all vertices, or None for an empty mesh
    pub fn bounds(&self) -> Option<Aabb> {
        if self.vertices.is_empty() {
            return None;
        }
        let mut aabb = Aabb::empty();
        for &v in &self.vertices {
            aabb.expand_point(v);
        }
        Some(aabb)
    }

    /// Check the mesh can enclose a volume worth gridding
    ///
    /// Fails when the mesh is empty, has no triangles, or its bounding
    /// box has collapsed to (near) zero extent on every axis — e.g. all
    /// vertices coincident.
    pub fn validate_for_gridding(&self) -> Result<Aabb, InvalidMeshError> {
        if self.vertices.is_empty() || self.indices.is_empty() {
            return Err(InvalidMeshError("mesh has no geometry".into()));
        }
        if self.indices.len() % 3 != 0 {
            return Err(InvalidMeshError(format!(
                "index count {} is not a multiple of 3",
                self.indices.len()
            )));
        }
        if let Some(&bad) = self.indices.iter().find(|&&i| i as usize >= self.vertices.len()) {
            return Err(InvalidMeshError(format!(
                "index {} out of range ({} vertices)",
                bad,
                self.vertices.len()
            )));
        }
        let aabb = self.bounds().expect("non-empty mesh has bounds");
        let size = aabb.size();
        if size.max_element() <= f32::EPSILON {
            return Err(InvalidMeshError(
                "degenerate bounding box: all vertices coincident".into(),
            ));
        }
        Ok(aabb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_mesh() -> Mesh {
        Mesh {
            vertices: vec![
                Vec3::ZERO,
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.5, 1.0, 0.0),
            ],
            indices: vec![0, 1, 2],
        }
    }

    #[test]
    fn test_bounds() {
        let mesh = triangle_mesh();
        let aabb = mesh.bounds().unwrap();
        assert!((aabb.min - Vec3::ZERO).length() < 1e-6);
        assert!((aabb.max - Vec3::new(1.0, 1.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_validate_flat_mesh_ok() {
        // A flat triangle still has a usable (2D-degenerate) box; only the
        // fully collapsed case is fatal
        assert!(triangle_mesh().validate_for_gridding().is_ok());
    }

    #[test]
    fn test_validate_empty() {
        assert!(Mesh::new().validate_for_gridding().is_err());
    }

    #[test]
    fn test_validate_coincident_vertices() {
        let mesh = Mesh {
            vertices: vec![Vec3::splat(2.0); 3],
            indices: vec![0, 1, 2],
        };
        let err = mesh.validate_for_gridding().unwrap_err();
        assert!(err.to_string().contains("degenerate"));
    }

    #[test]
    fn test_validate_bad_index() {
        let mut mesh = triangle_mesh();
        mesh.indices = vec![0, 1, 7];
        assert!(mesh.validate_for_gridding().is_err());
    }
}
