//! Domain repetition modifiers
//!
//! Space folds applied to the sample position before primitive
//! evaluation. The fold `p - s * round(p / s)` maps every point into the
//! centered cell `[-s/2, s/2]`, so the evaluated distance is the distance
//! to the nearest repeated instance and the field stays a valid lower
//! bound across tile boundaries.
//!
//! Author: Pierre Vandel

use glam::Vec3;

/// Infinite repetition with the given period along each axis
#[inline(always)]
pub fn repeat_infinite(point: Vec3, period: Vec3) -> Vec3 {
    Vec3::new(
        point.x - period.x * (point.x / period.x).round(),
        point.y - period.y * (point.y / period.y).round(),
        point.z - period.z * (point.z / period.z).round(),
    )
}

/// Finite repetition: `count` instances per axis, spaced by `period`
///
/// The cell index is clamped to the tile-count range, so points beyond
/// the last instance see the true distance to that instance rather than
/// a phantom copy.
#[inline(always)]
pub fn repeat_finite(point: Vec3, count: [u32; 3], period: Vec3) -> Vec3 {
    let limit = Vec3::new(
        (count[0].saturating_sub(1)) as f32 * 0.5,
        (count[1].saturating_sub(1)) as f32 * 0.5,
        (count[2].saturating_sub(1)) as f32 * 0.5,
    );
    let cell = (point / period).round().clamp(-limit, limit);
    point - cell * period
}
