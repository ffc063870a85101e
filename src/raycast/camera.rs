//! Per-frame camera configuration
//!
//! Position, Euler-angle orientation, vertical field of view, and clip
//! range — the parameter set a host viewport hands over each frame. The
//! camera looks down its local -Z axis.
//!
//! Author: Pierre Vandel

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::types::Ray;

/// Immutable camera state for one frame
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CameraConfig {
    /// World-space position
    pub position: Vec3,
    /// Euler rotation in radians, applied in XYZ order
    pub rotation: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Near clip distance; marching starts here
    pub near: f32,
    /// Far clip distance; marching never exceeds it
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        CameraConfig {
            position: Vec3::new(0.0, 0.0, 5.0),
            rotation: Vec3::ZERO,
            fov_y: std::f32::consts::FRAC_PI_4,
            near: 0.01,
            far: 100.0,
        }
    }
}

impl CameraConfig {
    /// Camera at `position` oriented toward `target`
    pub fn look_at(position: Vec3, target: Vec3, fov_y: f32) -> Self {
        let forward = (target - position).normalize_or_zero();
        let rotation = if forward.length_squared() > 0.0 {
            let q = Quat::from_rotation_arc(Vec3::NEG_Z, forward);
            let (rx, ry, rz) = q.to_euler(EulerRot::XYZ);
            Vec3::new(rx, ry, rz)
        } else {
            Vec3::ZERO
        };
        CameraConfig {
            position,
            rotation,
            fov_y,
            ..Default::default()
        }
    }

    /// Orientation basis: (forward, right, up)
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let q = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        (q * Vec3::NEG_Z, q * Vec3::X, q * Vec3::Y)
    }

    /// Ray through the center of pixel (x, y) on a width x height target
    ///
    /// Pixel (0, 0) is the top-left corner; aspect comes from the target
    /// size.
    pub fn ray_for_pixel(&self, x: u32, y: u32, width: u32, height: u32) -> Ray {
        let (forward, right, up) = self.basis();
        let aspect = width as f32 / height as f32;
        let half_h = (self.fov_y * 0.5).tan();
        let half_w = half_h * aspect;

        let u = ((x as f32 + 0.5) / width as f32) * 2.0 - 1.0;
        let v = 1.0 - ((y as f32 + 0.5) / height as f32) * 2.0;

        Ray::new(
            self.position,
            forward + right * (u * half_w) + up * (v * half_h),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_looks_down_neg_z() {
        let cam = CameraConfig::default();
        let (forward, right, up) = cam.basis();
        assert!((forward - Vec3::NEG_Z).length() < 1e-5);
        assert!((right - Vec3::X).length() < 1e-5);
        assert!((up - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_center_pixel_is_forward() {
        let cam = CameraConfig::default();
        // Odd target so a pixel center sits exactly on the axis
        let ray = cam.ray_for_pixel(4, 4, 9, 9);
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
        assert!((ray.origin - cam.position).length() < 1e-6);
    }

    #[test]
    fn test_pixel_spread_follows_fov() {
        let cam = CameraConfig::default();
        let left = cam.ray_for_pixel(0, 50, 101, 101);
        let right = cam.ray_for_pixel(100, 50, 101, 101);
        // Opposite horizontal deflection, same vertical
        assert!(left.direction.x < 0.0 && right.direction.x > 0.0);
        assert!((left.direction.x + right.direction.x).abs() < 1e-4);
    }

    #[test]
    fn test_look_at_faces_target() {
        let cam = CameraConfig::look_at(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::ZERO,
            std::f32::consts::FRAC_PI_4,
        );
        let (forward, _, _) = cam.basis();
        assert!((forward - Vec3::NEG_Z).length() < 1e-4);

        let cam = CameraConfig::look_at(
            Vec3::new(5.0, 0.0, 0.0),
            Vec3::ZERO,
            std::f32::consts::FRAC_PI_4,
        );
        let (forward, _, _) = cam.basis();
        assert!((forward - Vec3::NEG_X).length() < 1e-4);
    }

    #[test]
    fn test_yaw_rotation() {
        let cam = CameraConfig {
            rotation: Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0),
            ..Default::default()
        };
        let (forward, _, _) = cam.basis();
        // Yaw 90 degrees turns -Z into -X
        assert!((forward - Vec3::NEG_X).length() < 1e-5);
    }
}
