//! Analytic SDF to grid baking
//!
//! Samples a scene tree onto a [`DistanceGrid`] with Z-slab parallelism.
//! The converter handles meshes; this path exists for demo scenes, test
//! fixtures, and regenerating grids from procedural shapes.
//!
//! Author: Pierre Vandel

use glam::Vec3;
use rayon::prelude::*;

use crate::eval::eval;
use crate::types::SdfNode;

use super::DistanceGrid;

/// Baking parameters
#[derive(Debug, Clone, Copy)]
pub struct BakeConfig {
    /// Number of cells per axis
    pub dims: [u32; 3],
    /// World-space minimum corner of the sample lattice
    pub world_min: Vec3,
    /// World-space maximum corner of the sample lattice
    pub world_max: Vec3,
}

impl BakeConfig {
    /// Cubic lattice: `resolution` cells per axis over `[-half, half]^3`
    pub fn cube(resolution: u32, half: f32) -> Self {
        BakeConfig {
            dims: [resolution.max(2); 3],
            world_min: Vec3::splat(-half),
            world_max: Vec3::splat(half),
        }
    }
}

/// Sample a scene tree onto a distance grid
pub fn bake_grid(node: &SdfNode, config: &BakeConfig) -> DistanceGrid {
    let dims = [
        config.dims[0].max(2),
        config.dims[1].max(2),
        config.dims[2].max(2),
    ];
    let size = config.world_max - config.world_min;
    // A single cell_size serves all axes; dims follow the longest axis
    let cell_size = size.max_element() / (dims[0].max(dims[1]).max(dims[2]) - 1) as f32;

    let mut grid = DistanceGrid::new(dims, config.world_min, cell_size);
    let slab = dims[0] as usize * dims[1] as usize;
    let origin = config.world_min;

    grid.data
        .par_chunks_mut(slab)
        .enumerate()
        .for_each(|(z, slice)| {
            let z_pos = origin.z + z as f32 * cell_size;
            for y in 0..dims[1] as usize {
                let y_pos = origin.y + y as f32 * cell_size;
                let row = y * dims[0] as usize;
                for x in 0..dims[0] as usize {
                    let x_pos = origin.x + x as f32 * cell_size;
                    slice[row + x] = eval(node, Vec3::new(x_pos, y_pos, z_pos));
                }
            }
        });

    grid
}
