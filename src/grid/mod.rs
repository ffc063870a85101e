//! Discretized signed distance grids
//!
//! A [`DistanceGrid`] is a uniform 3D lattice of signed distances over an
//! axis-aligned region. Grids are produced once — by the mesh converter
//! ([`generate`]) or the analytic baker ([`bake_grid`]) — and are
//! immutable afterwards, so rendering threads share them freely.
//!
//! Storage is a flat X-major array (`x + y*nx + z*nx*ny`). Values are the
//! signed distance from each cell center to the nearest surface point:
//! negative inside, positive outside.
//!
//! Author: Pierre Vandel

pub mod atlas;
pub mod bake;
pub mod generate;

pub use atlas::{
    decode_atlas, encode_atlas, load_atlas, save_atlas, AtlasMeta, EncodeStats, GridFormatError,
};
pub use bake::{bake_grid, BakeConfig};
pub use generate::{generate, GridConfig};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::types::Aabb;

/// Reconstruction filter for grid sampling
///
/// Sphere tracing steps by the local distance value, so trilinear
/// filtering is the default: nearest-neighbor jumps between quantized
/// cells cause visible banding and can step over thin surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SampleFilter {
    /// Nearest cell value
    Nearest,
    /// Interpolate between the 8 neighboring cells
    #[default]
    Trilinear,
}

/// A 3D grid of signed distances
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceGrid {
    /// World-space position of cell (0, 0, 0)'s center
    pub origin: Vec3,
    /// Uniform voxel edge length
    pub cell_size: f32,
    /// Number of cells per axis
    pub dims: [u32; 3],
    /// Flat cell data, X-major
    pub data: Vec<f32>,
}

impl DistanceGrid {
    /// Create a grid with every cell set to +infinity (no surface seen yet)
    pub fn new(dims: [u32; 3], origin: Vec3, cell_size: f32) -> Self {
        let total = dims[0] as usize * dims[1] as usize * dims[2] as usize;
        DistanceGrid {
            origin,
            cell_size,
            dims,
            data: vec![f32::INFINITY; total],
        }
    }

    /// Total number of cells
    #[inline(always)]
    pub fn cell_count(&self) -> usize {
        self.dims[0] as usize * self.dims[1] as usize * self.dims[2] as usize
    }

    /// Flat index from 3D coordinates (bounds-unchecked)
    #[inline(always)]
    pub fn index(&self, x: u32, y: u32, z: u32) -> usize {
        x as usize
            + y as usize * self.dims[0] as usize
            + z as usize * self.dims[0] as usize * self.dims[1] as usize
    }

    /// Cell value at integer coordinates
    ///
    /// Out-of-range coordinates return [`Self::outside_distance`], a
    /// sentinel larger than any in-grid distance, so a march that indexes
    /// past the lattice keeps advancing and exits cleanly.
    #[inline(always)]
    pub fn get(&self, x: i32, y: i32, z: i32) -> f32 {
        if x < 0
            || y < 0
            || z < 0
            || x >= self.dims[0] as i32
            || y >= self.dims[1] as i32
            || z >= self.dims[2] as i32
        {
            return self.outside_distance();
        }
        self.data[self.index(x as u32, y as u32, z as u32)]
    }

    /// Set cell value at integer coordinates
    #[inline(always)]
    pub fn set(&mut self, x: u32, y: u32, z: u32, value: f32) {
        let idx = self.index(x, y, z);
        self.data[idx] = value;
    }

    /// World-space center of a cell
    #[inline(always)]
    pub fn cell_center(&self, x: u32, y: u32, z: u32) -> Vec3 {
        self.origin
            + Vec3::new(x as f32, y as f32, z as f32) * self.cell_size
    }

    /// Bounding box of the sample lattice (first to last cell center)
    pub fn bounds(&self) -> Aabb {
        let extent = Vec3::new(
            (self.dims[0].max(1) - 1) as f32,
            (self.dims[1].max(1) - 1) as f32,
            (self.dims[2].max(1) - 1) as f32,
        ) * self.cell_size;
        Aabb::new(self.origin, self.origin + extent)
    }

    /// Sentinel distance returned for samples outside the lattice
    ///
    /// The lattice diagonal: strictly larger than any distance a cell
    /// inside the grid can hold.
    #[inline]
    pub fn outside_distance(&self) -> f32 {
        self.bounds().size().length().max(self.cell_size)
    }

    /// Minimum and maximum cell value
    pub fn value_range(&self) -> (f32, f32) {
        let mut lo = f32::INFINITY;
        let mut hi = f32::NEG_INFINITY;
        for &v in &self.data {
            lo = lo.min(v);
            hi = hi.max(v);
        }
        (lo, hi)
    }

    /// Sample the field at a world-space position
    ///
    /// Inside the lattice this reconstructs with the requested filter.
    /// Outside, it returns the distance to the lattice boundary plus the
    /// (non-negative) boundary sample — a conservative lower bound on the
    /// true distance, so sphere tracing can approach the grid from any
    /// direction without overshooting into it and without false hits.
    pub fn sample(&self, pos: Vec3, filter: SampleFilter) -> f32 {
        let bounds = self.bounds();
        if bounds.contains(pos) {
            return self.sample_local(pos, filter);
        }
        let clamped = pos.clamp(bounds.min, bounds.max);
        let boundary = self.sample_local(clamped, filter);
        (pos - clamped).length() + boundary.max(0.0)
    }

    /// Filtered lookup for a position already inside (or clamped to) the lattice
    fn sample_local(&self, pos: Vec3, filter: SampleFilter) -> f32 {
        let inv = 1.0 / self.cell_size;
        let f = (pos - self.origin) * inv;
        let fx = f.x.clamp(0.0, (self.dims[0] - 1) as f32);
        let fy = f.y.clamp(0.0, (self.dims[1] - 1) as f32);
        let fz = f.z.clamp(0.0, (self.dims[2] - 1) as f32);

        match filter {
            SampleFilter::Nearest => {
                let x = fx.round() as u32;
                let y = fy.round() as u32;
                let z = fz.round() as u32;
                self.data[self.index(
                    x.min(self.dims[0] - 1),
                    y.min(self.dims[1] - 1),
                    z.min(self.dims[2] - 1),
                )]
            }
            SampleFilter::Trilinear => {
                let x0 = fx as u32;
                let y0 = fy as u32;
                let z0 = fz as u32;
                let x1 = (x0 + 1).min(self.dims[0] - 1);
                let y1 = (y0 + 1).min(self.dims[1] - 1);
                let z1 = (z0 + 1).min(self.dims[2] - 1);

                let tx = fx - x0 as f32;
                let ty = fy - y0 as f32;
                let tz = fz - z0 as f32;

                // 8-corner lookup
                let c000 = self.data[self.index(x0, y0, z0)];
                let c100 = self.data[self.index(x1, y0, z0)];
                let c010 = self.data[self.index(x0, y1, z0)];
                let c110 = self.data[self.index(x1, y1, z0)];
                let c001 = self.data[self.index(x0, y0, z1)];
                let c101 = self.data[self.index(x1, y0, z1)];
                let c011 = self.data[self.index(x0, y1, z1)];
                let c111 = self.data[self.index(x1, y1, z1)];

                // 3-axis lerp
                let c00 = c000 * (1.0 - tx) + c100 * tx;
                let c10 = c010 * (1.0 - tx) + c110 * tx;
                let c01 = c001 * (1.0 - tx) + c101 * tx;
                let c11 = c011 * (1.0 - tx) + c111 * tx;

                let c0 = c00 * (1.0 - ty) + c10 * ty;
                let c1 = c01 * (1.0 - ty) + c11 * ty;

                c0 * (1.0 - tz) + c1 * tz
            }
        }
    }
}
