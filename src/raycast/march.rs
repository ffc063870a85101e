//! Sphere tracing
//!
//! The core invariant: stepping by the exact local distance value never
//! overshoots the nearest surface, so no ray penetrates geometry. The
//! cost is slow convergence where the bound is loose (thin or concave
//! features), which is why the step budget exists — exhausting it is a
//! defined "no surface found" result, not an error.
//!
//! Author: Pierre Vandel

use glam::Vec3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::eval::{eval, normal};
use crate::types::{Hit, SdfNode};

use super::shade::{shade, to_rgb8};
use super::FrameConfig;

/// Marching budget and thresholds
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RaymarchConfig {
    /// Maximum number of marching steps per ray
    pub max_steps: u32,
    /// Base distance threshold for a surface hit
    pub epsilon: f32,
    /// Rays farther than this are misses
    pub max_distance: f32,
    /// Minimum advance per step, guards against stalling
    pub min_step: f32,
    /// Grow the hit threshold with ray distance
    ///
    /// One pixel covers more world space the farther it looks, so a fixed
    /// epsilon produces stair-stepping at depth. Scaling by `max(t, 1)`
    /// keeps the threshold roughly one screen-space footprint wide.
    pub scale_epsilon: bool,
}

impl Default for RaymarchConfig {
    fn default() -> Self {
        RaymarchConfig {
            max_steps: 128,
            epsilon: 0.0001,
            max_distance: 100.0,
            min_step: 0.0001,
            scale_epsilon: true,
        }
    }
}

impl RaymarchConfig {
    /// High quality configuration
    pub fn high_quality() -> Self {
        RaymarchConfig {
            max_steps: 256,
            epsilon: 0.00001,
            min_step: 0.00001,
            ..Default::default()
        }
    }

    /// Fast configuration for preview
    pub fn fast() -> Self {
        RaymarchConfig {
            max_steps: 64,
            epsilon: 0.0005,
            ..Default::default()
        }
    }

    /// Hit threshold at ray distance t
    #[inline(always)]
    pub fn epsilon_at(&self, t: f32) -> f32 {
        if self.scale_epsilon {
            self.epsilon * t.max(1.0)
        } else {
            self.epsilon
        }
    }
}

/// Why a march ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// The sampled distance fell below the hit threshold
    Hit,
    /// The ray exceeded the distance limit (or sampled a non-finite value)
    Miss,
    /// The step budget ran out before hit or miss
    StepBudget,
}

/// Full per-ray result, including misses
#[derive(Debug, Clone, Copy)]
pub struct RaymarchResult {
    /// How the march ended
    pub reason: TerminationReason,
    /// Distance traveled along the ray
    pub distance: f32,
    /// Final sample position
    pub point: Vec3,
    /// Surface normal (zero unless a hit)
    pub normal: Vec3,
    /// Steps taken
    pub steps: u32,
}

/// Sphere-trace a ray with default settings
#[inline(always)]
pub fn raymarch(node: &SdfNode, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Hit> {
    let config = RaymarchConfig {
        max_distance,
        ..Default::default()
    };
    raymarch_with_config(node, origin, direction, &config)
}

/// Sphere-trace a ray with explicit configuration
#[inline(always)]
pub fn raymarch_with_config(
    node: &SdfNode,
    origin: Vec3,
    direction: Vec3,
    config: &RaymarchConfig,
) -> Option<Hit> {
    raymarch_detailed(node, origin, direction, config).into_hit()
}

impl RaymarchResult {
    /// Convert to the compact hit representation
    pub fn into_hit(self) -> Option<Hit> {
        if self.reason == TerminationReason::Hit {
            Some(Hit {
                distance: self.distance,
                point: self.point,
                normal: self.normal,
                steps: self.steps,
            })
        } else {
            None
        }
    }
}

/// Sphere-trace a ray, reporting the termination reason
pub fn raymarch_detailed(
    node: &SdfNode,
    origin: Vec3,
    direction: Vec3,
    config: &RaymarchConfig,
) -> RaymarchResult {
    let dir = direction.normalize();
    let mut t = 0.0f32;
    let mut steps = 0u32;

    while steps < config.max_steps {
        let point = origin + dir * t;

        // Past the distance limit nothing counts as a surface, even if
        // the last step landed on one
        if t > config.max_distance {
            return RaymarchResult {
                reason: TerminationReason::Miss,
                distance: t,
                point,
                normal: Vec3::ZERO,
                steps,
            };
        }

        let d = eval(node, point);

        // Corrupt evaluations (NaN/Inf) read as "no surface here"
        if !d.is_finite() {
            return RaymarchResult {
                reason: TerminationReason::Miss,
                distance: t,
                point,
                normal: Vec3::ZERO,
                steps,
            };
        }

        let eps = config.epsilon_at(t);
        if d < eps {
            return RaymarchResult {
                reason: TerminationReason::Hit,
                distance: t,
                point,
                normal: normal(node, point, eps),
                steps,
            };
        }

        t += d.max(config.min_step);
        steps += 1;
    }

    RaymarchResult {
        reason: TerminationReason::StepBudget,
        distance: t,
        point: origin + dir * t,
        normal: Vec3::ZERO,
        steps,
    }
}

/// Render a depth buffer; misses are `f32::MAX`
pub fn render_depth(node: &SdfNode, frame: &FrameConfig, width: u32, height: u32) -> Vec<f32> {
    let march = clip_to_camera(frame);
    let mut buffer = vec![0.0f32; width as usize * height as usize];

    buffer
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, pixel) in row.iter_mut().enumerate() {
                let ray = frame.camera.ray_for_pixel(x as u32, y as u32, width, height);
                let origin = ray.origin + ray.direction * frame.camera.near;
                *pixel = match raymarch_with_config(node, origin, ray.direction, &march) {
                    Some(hit) => hit.distance + frame.camera.near,
                    None => f32::MAX,
                };
            }
        });

    buffer
}

/// Render normals as RGB values; misses are black
pub fn render_normals(
    node: &SdfNode,
    frame: &FrameConfig,
    width: u32,
    height: u32,
) -> Vec<[u8; 3]> {
    let march = clip_to_camera(frame);
    let mut buffer = vec![[0u8; 3]; width as usize * height as usize];

    buffer
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, pixel) in row.iter_mut().enumerate() {
                let ray = frame.camera.ray_for_pixel(x as u32, y as u32, width, height);
                let origin = ray.origin + ray.direction * frame.camera.near;
                if let Some(hit) = raymarch_with_config(node, origin, ray.direction, &march) {
                    *pixel = [
                        ((hit.normal.x * 0.5 + 0.5) * 255.0) as u8,
                        ((hit.normal.y * 0.5 + 0.5) * 255.0) as u8,
                        ((hit.normal.z * 0.5 + 0.5) * 255.0) as u8,
                    ];
                }
            }
        });

    buffer
}

/// Render a shaded color buffer; misses are black
pub fn render_color(node: &SdfNode, frame: &FrameConfig, width: u32, height: u32) -> Vec<[u8; 3]> {
    let march = clip_to_camera(frame);
    let mut buffer = vec![[0u8; 3]; width as usize * height as usize];

    buffer
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, pixel) in row.iter_mut().enumerate() {
                let ray = frame.camera.ray_for_pixel(x as u32, y as u32, width, height);
                let origin = ray.origin + ray.direction * frame.camera.near;
                if let Some(hit) = raymarch_with_config(node, origin, ray.direction, &march) {
                    let color = shade(frame.mode, &frame.material, hit.normal, ray.direction);
                    *pixel = to_rgb8(color);
                }
            }
        });

    buffer
}

/// March config with the far limit pulled in to the camera's clip range
fn clip_to_camera(frame: &FrameConfig) -> RaymarchConfig {
    RaymarchConfig {
        max_distance: frame
            .march
            .max_distance
            .min((frame.camera.far - frame.camera.near).max(0.0)),
        ..frame.march
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raycast::CameraConfig;

    #[test]
    fn test_march_sphere_hit() {
        let sphere = SdfNode::sphere(Vec3::ZERO, 1.0);
        let hit = raymarch(&sphere, Vec3::new(-5.0, 0.0, 0.0), Vec3::X, 10.0)
            .expect("should hit");
        assert!((hit.distance - 4.0).abs() < 0.01);
        assert!((hit.normal - Vec3::NEG_X).length() < 0.01);
        // Hit point sits within the (scaled) threshold of the surface
        let eps = RaymarchConfig::default().epsilon_at(hit.distance);
        assert!(eval(&sphere, hit.point).abs() <= eps * 2.0);
    }

    #[test]
    fn test_march_miss() {
        let sphere = SdfNode::sphere(Vec3::ZERO, 1.0);
        let hit = raymarch(&sphere, Vec3::new(-5.0, 5.0, 0.0), Vec3::X, 20.0);
        assert!(hit.is_none());
    }

    #[test]
    fn test_miss_reason_is_distance() {
        let sphere = SdfNode::sphere(Vec3::ZERO, 1.0);
        let config = RaymarchConfig {
            max_distance: 20.0,
            ..Default::default()
        };
        let result =
            raymarch_detailed(&sphere, Vec3::new(-5.0, 5.0, 0.0), Vec3::X, &config);
        assert_eq!(result.reason, TerminationReason::Miss);
        assert!(result.steps < config.max_steps);
    }

    #[test]
    fn test_step_budget_is_a_result_not_an_error() {
        let sphere = SdfNode::sphere(Vec3::ZERO, 1.0);
        let config = RaymarchConfig {
            max_steps: 3,
            // Tiny steps so three of them cannot reach the surface
            min_step: 0.001,
            max_distance: 1000.0,
            ..Default::default()
        };
        // Grazing ray: distance stays small but positive for many steps
        let result = raymarch_detailed(
            &sphere,
            Vec3::new(-5.0, 1.0001, 0.0),
            Vec3::X,
            &config,
        );
        assert_eq!(result.reason, TerminationReason::StepBudget);
        assert_eq!(result.steps, 3);
        assert!(raymarch_with_config(
            &sphere,
            Vec3::new(-5.0, 1.0001, 0.0),
            Vec3::X,
            &config
        )
        .is_none());
    }

    #[test]
    fn test_terminates_within_budget() {
        let sphere = SdfNode::sphere(Vec3::ZERO, 1.0);
        let config = RaymarchConfig::default();
        let result = raymarch_detailed(&sphere, Vec3::new(-5.0, 0.3, 0.1), Vec3::X, &config);
        assert!(result.steps <= config.max_steps);
    }

    #[test]
    fn test_non_finite_field_is_a_miss() {
        // NaN radius poisons every evaluation
        let bad = SdfNode::sphere(Vec3::ZERO, f32::NAN);
        let result = raymarch_detailed(
            &bad,
            Vec3::new(-5.0, 0.0, 0.0),
            Vec3::X,
            &RaymarchConfig::default(),
        );
        assert_eq!(result.reason, TerminationReason::Miss);
    }

    #[test]
    fn test_scaled_epsilon_grows() {
        let config = RaymarchConfig::default();
        assert_eq!(config.epsilon_at(0.5), config.epsilon);
        assert!(config.epsilon_at(50.0) > config.epsilon * 40.0);

        let fixed = RaymarchConfig {
            scale_epsilon: false,
            ..Default::default()
        };
        assert_eq!(fixed.epsilon_at(50.0), fixed.epsilon);
    }

    #[test]
    fn test_render_depth_center() {
        let sphere = SdfNode::sphere(Vec3::ZERO, 1.0);
        let frame = FrameConfig {
            camera: CameraConfig {
                position: Vec3::new(0.0, 0.0, 5.0),
                ..Default::default()
            },
            ..Default::default()
        };

        let depth = render_depth(&sphere, &frame, 9, 9);
        assert_eq!(depth.len(), 81);

        let center = depth[9 * 4 + 4];
        assert!(center < f32::MAX);
        assert!((center - 4.0).abs() < 0.05, "center depth {center}");

        // Corner rays miss the unit sphere at this FOV
        assert_eq!(depth[0], f32::MAX);
    }

    #[test]
    fn test_render_normals_center_faces_camera() {
        let sphere = SdfNode::sphere(Vec3::ZERO, 1.0);
        let frame = FrameConfig {
            camera: CameraConfig {
                position: Vec3::new(0.0, 0.0, 5.0),
                ..Default::default()
            },
            ..Default::default()
        };

        let normals = render_normals(&sphere, &frame, 9, 9);
        let center = normals[9 * 4 + 4];
        // Normal is +Z toward the camera: encoded z near 255
        assert!(center[2] > 230, "encoded normal {center:?}");
    }

    #[test]
    fn test_render_color_modes_differ() {
        let sphere = SdfNode::sphere(Vec3::ZERO, 1.0);
        let mut frame = FrameConfig {
            camera: CameraConfig {
                position: Vec3::new(0.0, 0.0, 5.0),
                ..Default::default()
            },
            ..Default::default()
        };

        frame.mode = crate::raycast::ShadingMode::Flat;
        let flat = render_color(&sphere, &frame, 9, 9);
        frame.mode = crate::raycast::ShadingMode::Lambert;
        let lambert = render_color(&sphere, &frame, 9, 9);

        // Background stays black in both
        assert_eq!(flat[0], [0, 0, 0]);
        // Flat center is the raw base color; Lambert modulates it
        assert_ne!(flat[9 * 4 + 4], lambert[9 * 4 + 4]);
    }
}
