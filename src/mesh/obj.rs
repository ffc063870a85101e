//! Wavefront OBJ import
//!
//! Reads vertex positions and faces; everything else in the file (uvs,
//! normals, materials, groups) is skipped. Polygons with more than three
//! vertices are triangulated as fans.
//!
//! Author: Pierre Vandel

use std::io::{BufRead, BufReader};
use std::path::Path;

use glam::Vec3;
use thiserror::Error;

use super::Mesh;

/// OBJ import errors
#[derive(Error, Debug)]
pub enum ObjError {
    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed file content
    #[error("parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What went wrong
        message: String,
    },
}

/// Load a mesh from a Wavefront OBJ file
pub fn load_obj(path: impl AsRef<Path>) -> Result<Mesh, ObjError> {
    let file = std::fs::File::open(path.as_ref())?;
    let reader = BufReader::new(file);

    let mut mesh = Mesh::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        let mut parts = line.split_whitespace();

        match parts.next() {
            Some("v") => {
                let mut coord = |axis: &str| -> Result<f32, ObjError> {
                    parts
                        .next()
                        .ok_or_else(|| ObjError::Parse {
                            line: line_no + 1,
                            message: format!("vertex missing {axis} coordinate"),
                        })?
                        .parse::<f32>()
                        .map_err(|e| ObjError::Parse {
                            line: line_no + 1,
                            message: format!("bad {axis} coordinate: {e}"),
                        })
                };
                let x = coord("x")?;
                let y = coord("y")?;
                let z = coord("z")?;
                mesh.vertices.push(Vec3::new(x, y, z));
            }
            Some("f") => {
                let mut face: Vec<u32> = Vec::with_capacity(4);
                for token in parts {
                    // "v", "v/vt", "v//vn", "v/vt/vn" — position index first
                    let pos = token.split('/').next().unwrap_or(token);
                    let idx: i64 = pos.parse().map_err(|e| ObjError::Parse {
                        line: line_no + 1,
                        message: format!("bad face index '{token}': {e}"),
                    })?;
                    // OBJ is 1-indexed; negative indices count from the end
                    let resolved = if idx > 0 {
                        idx - 1
                    } else {
                        mesh.vertices.len() as i64 + idx
                    };
                    if resolved < 0 || resolved >= mesh.vertices.len() as i64 {
                        return Err(ObjError::Parse {
                            line: line_no + 1,
                            message: format!("face index {idx} out of range"),
                        });
                    }
                    face.push(resolved as u32);
                }
                if face.len() < 3 {
                    return Err(ObjError::Parse {
                        line: line_no + 1,
                        message: format!("face with {} vertices", face.len()),
                    });
                }
                // Fan triangulation
                for i in 1..face.len() - 1 {
                    mesh.indices.push(face[0]);
                    mesh.indices.push(face[i]);
                    mesh.indices.push(face[i + 1]);
                }
            }
            // Comments, normals, uvs, groups, materials: skipped
            _ => {}
        }
    }

    Ok(mesh)
}
