//! Sphere tracing renderer
//!
//! Per-pixel ray marching against an [`crate::types::SdfNode`] scene.
//! All per-frame state lives in an immutable [`FrameConfig`] built by the
//! host before the pass; pixels share nothing mutable, so rows render in
//! parallel.
//!
//! Author: Pierre Vandel

pub mod camera;
pub mod march;
pub mod shade;

pub use camera::CameraConfig;
pub use march::{
    raymarch, raymarch_detailed, raymarch_with_config, render_color, render_depth,
    render_normals, RaymarchConfig, RaymarchResult, TerminationReason,
};
pub use shade::{shade, Material, ShadingMode};

use serde::{Deserialize, Serialize};

/// Everything the renderer needs for one frame
///
/// Built once per frame from host state (camera, settings) and never
/// mutated mid-frame.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FrameConfig {
    /// Camera for this frame
    pub camera: CameraConfig,
    /// Marching budget and thresholds
    pub march: RaymarchConfig,
    /// Shading model selection
    pub mode: ShadingMode,
    /// Surface and light parameters
    pub material: Material,
}
