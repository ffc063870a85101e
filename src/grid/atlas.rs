//! Grid atlas encoding and decoding
//!
//! Persists a [`DistanceGrid`] as an 8-bit grayscale PNG: Z-slices are
//! tiled left-to-right, top-to-bottom into a near-square grid of tiles
//! (`ceil(sqrt(depth))` columns), and distances are quantized into a
//! recorded `[min, max]` range. The tiling is fully determined by the
//! grid dimensions, so decoding needs only the sidecar metadata:
//! dimensions, cell size, origin, and the quantization range.
//!
//! The metadata travels in a `<stem>.meta.json` file next to the image,
//! since PNG itself carries none of these fields.
//!
//! Author: Pierre Vandel

use std::path::{Path, PathBuf};

use glam::Vec3;
use image::GrayImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::DistanceGrid;

/// Atlas decode/IO errors
///
/// All fatal for the affected grid: a texture that cannot be decoded has
/// no usable fallback.
#[derive(Error, Debug)]
pub enum GridFormatError {
    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The image file could not be read or written
    #[error("image error: {0}")]
    Image(String),

    /// Sidecar metadata missing fields, unparseable, or inconsistent
    #[error("bad atlas metadata: {0}")]
    Metadata(String),

    /// Image dimensions disagree with the tiling derived from `dims`
    #[error("atlas is {actual_w}x{actual_h}, but dims {dims:?} tile to {expected_w}x{expected_h}")]
    DimensionMismatch {
        /// Width the tiling requires
        expected_w: u32,
        /// Height the tiling requires
        expected_h: u32,
        /// Width found in the file
        actual_w: u32,
        /// Height found in the file
        actual_h: u32,
        /// Grid dimensions from the metadata
        dims: [u32; 3],
    },
}

/// Sidecar metadata: everything needed to invert the encoding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AtlasMeta {
    /// Grid cells per axis
    pub dims: [u32; 3],
    /// Voxel edge length
    pub cell_size: f32,
    /// World position of cell (0, 0, 0)'s center
    pub origin: Vec3,
    /// Quantization range `[min, max]` in world distance units
    pub range: [f32; 2],
}

impl AtlasMeta {
    /// One quantization step in distance units
    pub fn quantization_step(&self) -> f32 {
        (self.range[1] - self.range[0]).max(1e-6) / 255.0
    }

    fn validate(&self) -> Result<(), GridFormatError> {
        if self.dims.iter().any(|&d| d == 0) {
            return Err(GridFormatError::Metadata(format!(
                "zero grid dimension: {:?}",
                self.dims
            )));
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(GridFormatError::Metadata(format!(
                "bad cell size: {}",
                self.cell_size
            )));
        }
        if !(self.range[0].is_finite() && self.range[1].is_finite())
            || self.range[1] < self.range[0]
        {
            return Err(GridFormatError::Metadata(format!(
                "bad quantization range: {:?}",
                self.range
            )));
        }
        Ok(())
    }
}

/// Encoder side effects worth surfacing
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeStats {
    /// Cells whose value fell outside the quantization range and was clamped
    pub clamped: usize,
}

/// Tile columns and rows for a given slice count
#[inline]
fn tile_layout(depth: u32) -> (u32, u32) {
    let tiles_x = (depth as f32).sqrt().ceil() as u32;
    let tiles_y = depth.div_ceil(tiles_x);
    (tiles_x.max(1), tiles_y.max(1))
}

/// Encode a grid into a tiled grayscale atlas
///
/// The quantization range is the grid's own value range, recorded in the
/// returned metadata. Nothing clamps on this path.
pub fn encode_atlas(grid: &DistanceGrid) -> (GrayImage, AtlasMeta, EncodeStats) {
    let (lo, hi) = grid.value_range();
    // A grid that was never written still has infinite cells; fall back
    // to a unit range rather than recording an unusable one
    let range = if lo.is_finite() && hi.is_finite() && hi >= lo {
        [lo, hi]
    } else {
        [0.0, 1.0]
    };
    encode_atlas_with_range(grid, range).expect("sanitized range is valid")
}

/// Encode with an explicit quantization range
///
/// Values outside the range are clamped (counted, not an error), which
/// lets several grids share one fixed range.
pub fn encode_atlas_with_range(
    grid: &DistanceGrid,
    range: [f32; 2],
) -> Result<(GrayImage, AtlasMeta, EncodeStats), GridFormatError> {
    let meta = AtlasMeta {
        dims: grid.dims,
        cell_size: grid.cell_size,
        origin: grid.origin,
        range,
    };
    meta.validate()?;

    let [nx, ny, nz] = grid.dims;
    let (tiles_x, tiles_y) = tile_layout(nz);
    let width = nx * tiles_x;
    let height = ny * tiles_y;

    let lo = range[0];
    let span = (range[1] - range[0]).max(1e-6);
    let inv_span = 1.0 / span;

    let mut img = GrayImage::new(width, height);
    let mut clamped = 0usize;

    for z in 0..nz {
        let tile_x = (z % tiles_x) * nx;
        let tile_y = (z / tiles_x) * ny;
        for y in 0..ny {
            for x in 0..nx {
                let d = grid.data[grid.index(x, y, z)];
                let t = (d - lo) * inv_span;
                if !(0.0..=1.0).contains(&t) {
                    clamped += 1;
                }
                let q = (t.clamp(0.0, 1.0) * 255.0).round() as u8;
                img.put_pixel(tile_x + x, tile_y + y, image::Luma([q]));
            }
        }
    }

    debug!(dims = ?grid.dims, tiles_x, tiles_y, clamped, "atlas encoded");

    Ok((img, meta, EncodeStats { clamped }))
}

/// Decode a tiled atlas back into a distance grid
///
/// # Errors
/// [`GridFormatError`] when the metadata is inconsistent or the image
/// does not match the tiling the metadata implies.
pub fn decode_atlas(img: &GrayImage, meta: &AtlasMeta) -> Result<DistanceGrid, GridFormatError> {
    meta.validate()?;

    let [nx, ny, nz] = meta.dims;
    let (tiles_x, tiles_y) = tile_layout(nz);
    let (expected_w, expected_h) = (nx * tiles_x, ny * tiles_y);
    if img.width() != expected_w || img.height() != expected_h {
        return Err(GridFormatError::DimensionMismatch {
            expected_w,
            expected_h,
            actual_w: img.width(),
            actual_h: img.height(),
            dims: meta.dims,
        });
    }

    let lo = meta.range[0];
    let span = (meta.range[1] - meta.range[0]).max(1e-6);

    let mut grid = DistanceGrid::new(meta.dims, meta.origin, meta.cell_size);
    for z in 0..nz {
        let tile_x = (z % tiles_x) * nx;
        let tile_y = (z / tiles_x) * ny;
        for y in 0..ny {
            for x in 0..nx {
                let q = img.get_pixel(tile_x + x, tile_y + y).0[0];
                let d = lo + (q as f32 / 255.0) * span;
                let idx = grid.index(x, y, z);
                grid.data[idx] = d;
            }
        }
    }

    debug!(dims = ?meta.dims, "atlas decoded");

    Ok(grid)
}

/// Path of the sidecar metadata file for an atlas image path
pub fn meta_path(atlas_path: &Path) -> PathBuf {
    atlas_path.with_extension("meta.json")
}

/// Write an atlas PNG and its sidecar metadata
pub fn save_atlas(grid: &DistanceGrid, path: impl AsRef<Path>) -> Result<AtlasMeta, GridFormatError> {
    let path = path.as_ref();
    let (img, meta, stats) = encode_atlas(grid);

    img.save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| GridFormatError::Image(e.to_string()))?;

    let sidecar = meta_path(path);
    let json = serde_json::to_string_pretty(&meta)
        .map_err(|e| GridFormatError::Metadata(e.to_string()))?;
    std::fs::write(&sidecar, json)?;

    debug!(
        atlas = %path.display(),
        sidecar = %sidecar.display(),
        clamped = stats.clamped,
        "atlas saved"
    );

    Ok(meta)
}

/// Load an atlas PNG plus its sidecar metadata back into a grid
pub fn load_atlas(path: impl AsRef<Path>) -> Result<DistanceGrid, GridFormatError> {
    let path = path.as_ref();

    let json = std::fs::read_to_string(meta_path(path))?;
    let meta: AtlasMeta =
        serde_json::from_str(&json).map_err(|e| GridFormatError::Metadata(e.to_string()))?;

    let img = image::open(path)
        .map_err(|e| GridFormatError::Image(e.to_string()))?
        .to_luma8();

    decode_atlas(&img, &meta)
}
