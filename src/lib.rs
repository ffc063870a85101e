//! # gridmarch
//!
//! Signed distance field rendering without polygons: convert a closed
//! triangle mesh into a discretized signed distance grid, pack that grid
//! into a compact 2D atlas texture, and sphere-trace the result (or any
//! analytic SDF scene) into depth, normal, and color buffers.
//!
//! ## Pipeline
//!
//! ```text
//! Mesh (.obj) -> [generate] -> DistanceGrid -> [encode] -> atlas .png + .meta.json
//!                                                  |
//!                                       [decode, at render time]
//!                                                  v
//!                          SdfNode scene -> [raymarch] -> per-pixel hit/depth/color
//! ```
//!
//! ## Example
//!
//! ```rust
//! use gridmarch::prelude::*;
//!
//! // Two spheres fused with a smooth blend
//! let scene = SdfNode::sphere(Vec3::new(-1.5, 0.0, 0.0), 1.0)
//!     .smooth_union(SdfNode::sphere(Vec3::new(1.5, 0.0, 0.0), 1.0), 0.5);
//!
//! // Distance at the origin
//! let d = eval(&scene, Vec3::ZERO);
//! assert!(d > 0.0);
//!
//! // March a ray at it
//! let hit = raymarch(&scene, Vec3::new(-10.0, 0.0, 0.0), Vec3::X, 20.0);
//! assert!(hit.is_some());
//! ```
//!
//! Author: Pierre Vandel

#![warn(missing_docs)]

pub mod types;
pub mod primitives;
pub mod operations;
pub mod modifiers;
pub mod eval;
pub mod mesh;
pub mod grid;
pub mod raycast;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude - commonly used types and functions
pub mod prelude {
    pub use crate::types::{Aabb, Hit, Ray, SdfNode};
    pub use crate::eval::{eval, eval_batch, eval_batch_parallel, normal, normal_tetrahedral};
    pub use crate::operations::{sdf_union, smooth_min, smooth_min_exp};
    pub use crate::modifiers::{repeat_finite, repeat_infinite};
    pub use crate::mesh::{InvalidMeshError, Mesh};
    pub use crate::grid::{
        bake_grid, generate, load_atlas, save_atlas, AtlasMeta, BakeConfig, DistanceGrid,
        GridConfig, GridFormatError, SampleFilter,
    };
    pub use crate::raycast::{
        raymarch, raymarch_detailed, raymarch_with_config, render_color, render_depth,
        render_normals, CameraConfig, FrameConfig, Material, RaymarchConfig, RaymarchResult,
        ShadingMode, TerminationReason,
    };
    pub use glam::Vec3;
}

// Re-exports for convenience
pub use eval::eval;
pub use grid::{generate, DistanceGrid};
pub use types::SdfNode;

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_basic_workflow() {
        // Analytic scene: sphere blended with an offset box
        let scene = SdfNode::sphere(Vec3::ZERO, 1.0).smooth_union(
            SdfNode::box3d(Vec3::new(2.0, 0.0, 0.0), Vec3::splat(0.5)),
            0.2,
        );

        // Origin is inside the sphere
        assert!(eval(&scene, Vec3::ZERO) < 0.0);

        // A ray from -X hits the sphere front face at x = -1
        let hit =
            raymarch(&scene, Vec3::new(-5.0, 0.0, 0.0), Vec3::X, 20.0).expect("ray should hit");
        assert!((hit.distance - 4.0).abs() < 0.01);
    }

    #[test]
    fn test_grid_workflow() {
        // Bake a sphere into a grid and march against the sampled field
        let sphere = SdfNode::sphere(Vec3::ZERO, 1.0);
        let grid = bake_grid(&sphere, &BakeConfig::cube(32, 2.0));
        let scene = SdfNode::grid(grid, SampleFilter::Trilinear);

        let hit = raymarch(&scene, Vec3::new(-1.9, 0.0, 0.0), Vec3::X, 10.0)
            .expect("grid surface should be hit");
        assert!((hit.point.x - (-1.0)).abs() < 0.1);
    }
}
