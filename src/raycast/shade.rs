//! Hit shading
//!
//! Small fixed set of shading models applied to a marched hit. The
//! surface color and light come from a [`Material`] config object built
//! alongside the frame.
//!
//! Author: Pierre Vandel

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Shading model selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ShadingMode {
    /// Unlit base color
    Flat,
    /// Diffuse-only lighting
    #[default]
    Lambert,
    /// Diffuse plus Blinn-Phong specular highlight
    Blinn,
}

/// Surface and light parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Material {
    /// Surface base color, linear [0, 1] per channel
    pub base_color: Vec3,
    /// Direction toward the light (normalized on use)
    pub light_dir: Vec3,
    /// Ambient term so unlit faces stay readable
    pub ambient: f32,
    /// Specular exponent for the Blinn mode
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Material {
            base_color: Vec3::splat(0.18),
            light_dir: Vec3::new(0.4, 0.8, 0.45),
            ambient: 0.1,
            shininess: 32.0,
        }
    }
}

/// Shade a hit: surface normal and view direction to linear color
pub fn shade(mode: ShadingMode, material: &Material, normal: Vec3, view_dir: Vec3) -> Vec3 {
    match mode {
        ShadingMode::Flat => material.base_color,
        ShadingMode::Lambert => {
            let l = material.light_dir.normalize_or_zero();
            let diffuse = normal.dot(l).max(0.0);
            material.base_color * (material.ambient + (1.0 - material.ambient) * diffuse)
        }
        ShadingMode::Blinn => {
            let l = material.light_dir.normalize_or_zero();
            let diffuse = normal.dot(l).max(0.0);
            let half = (l - view_dir).normalize_or_zero();
            let spec = normal.dot(half).max(0.0).powf(material.shininess);
            material.base_color * (material.ambient + (1.0 - material.ambient) * diffuse)
                + Vec3::splat(spec * 0.5)
        }
    }
}

/// Convert a linear color to 8-bit RGB
#[inline]
pub fn to_rgb8(color: Vec3) -> [u8; 3] {
    let c = color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
    [c.x as u8, c.y as u8, c.z as u8]
}
