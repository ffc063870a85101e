//! Analytic SDF primitives
//!
//! Pure distance functions evaluated per ray sample. Negative inside,
//! positive outside, zero on the surface.
//!
//! Author: Pierre Vandel

use glam::Vec3;

/// Signed distance to a sphere
///
/// # Arguments
/// * `point` - Point to evaluate
/// * `center` - Sphere center
/// * `radius` - Sphere radius
///
/// # Returns
/// Signed distance (negative inside, positive outside)
#[inline(always)]
pub fn sdf_sphere(point: Vec3, center: Vec3, radius: f32) -> f32 {
    (point - center).length() - radius
}

/// Signed distance to an axis-aligned box centered at `center`
#[inline(always)]
pub fn sdf_box3d(point: Vec3, center: Vec3, half_extents: Vec3) -> f32 {
    let q = (point - center).abs() - half_extents;
    q.max(Vec3::ZERO).length() + q.x.max(q.y.max(q.z)).min(0.0)
}

/// Signed distance to an infinite plane
///
/// `normal` must be unit length; `distance` is the plane's signed offset
/// from the origin along the normal.
#[inline(always)]
pub fn sdf_plane(point: Vec3, normal: Vec3, distance: f32) -> f32 {
    point.dot(normal) - distance
}
