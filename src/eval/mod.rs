//! Scene evaluation
//!
//! The recursive interpreter over [`SdfNode`] trees, plus the
//! finite-difference gradient used for surface normals and rayon batch
//! helpers for offline work.
//!
//! Author: Pierre Vandel

use glam::Vec3;
use rayon::prelude::*;

use crate::modifiers::{repeat_finite, repeat_infinite};
use crate::operations::{sdf_union, smooth_min};
use crate::primitives::{sdf_box3d, sdf_plane, sdf_sphere};
use crate::types::SdfNode;

/// Evaluate a scene tree at a single point
///
/// Recursively traverses the tree and computes the signed distance.
/// Marked `#[inline]` so small trees flatten into the marching loop.
#[inline]
pub fn eval(node: &SdfNode, point: Vec3) -> f32 {
    match node {
        // === Primitives (leaf nodes) ===
        SdfNode::Sphere { center, radius } => sdf_sphere(point, *center, *radius),
        SdfNode::Box3d {
            center,
            half_extents,
        } => sdf_box3d(point, *center, *half_extents),
        SdfNode::Plane { normal, distance } => sdf_plane(point, *normal, *distance),
        SdfNode::Grid { grid, filter } => grid.sample(point, *filter),

        // === Operations ===
        SdfNode::Union { a, b } => {
            let d1 = eval(a, point);
            let d2 = eval(b, point);
            sdf_union(d1, d2)
        }
        SdfNode::SmoothUnion { a, b, k } => {
            let d1 = eval(a, point);
            let d2 = eval(b, point);
            smooth_min(d1, d2, *k)
        }

        // === Modifiers: transform point, then recurse ===
        SdfNode::RepeatInfinite { child, period } => {
            eval(child, repeat_infinite(point, *period))
        }
        SdfNode::RepeatFinite {
            child,
            count,
            period,
        } => eval(child, repeat_finite(point, *count, *period)),
        SdfNode::Translate { child, offset } => eval(child, point - *offset),
    }
}

/// Surface normal from the six-sample finite-difference gradient
///
/// Central differences along each axis, normalized. `epsilon` should be
/// on the order of the hit threshold.
#[inline]
pub fn normal(node: &SdfNode, point: Vec3, epsilon: f32) -> Vec3 {
    let ex = Vec3::new(epsilon, 0.0, 0.0);
    let ey = Vec3::new(0.0, epsilon, 0.0);
    let ez = Vec3::new(0.0, 0.0, epsilon);

    let g = Vec3::new(
        eval(node, point + ex) - eval(node, point - ex),
        eval(node, point + ey) - eval(node, point - ey),
        eval(node, point + ez) - eval(node, point - ez),
    );
    normalize_gradient(g)
}

/// Surface normal from the four-sample tetrahedral gradient
///
/// Two fewer evaluations than central differences; the offsets are the
/// vertices of a tetrahedron so directional bias cancels.
#[inline]
pub fn normal_tetrahedral(node: &SdfNode, point: Vec3, epsilon: f32) -> Vec3 {
    let k0 = Vec3::new(1.0, -1.0, -1.0);
    let k1 = Vec3::new(-1.0, -1.0, 1.0);
    let k2 = Vec3::new(-1.0, 1.0, -1.0);
    let k3 = Vec3::new(1.0, 1.0, 1.0);

    let g = k0 * eval(node, point + k0 * epsilon)
        + k1 * eval(node, point + k1 * epsilon)
        + k2 * eval(node, point + k2 * epsilon)
        + k3 * eval(node, point + k3 * epsilon);
    normalize_gradient(g)
}

#[inline(always)]
fn normalize_gradient(g: Vec3) -> Vec3 {
    let len_sq = g.length_squared();
    if !len_sq.is_finite() || len_sq < 1e-20 {
        Vec3::Y // degenerate gradient, pick a stable fallback
    } else {
        g / len_sq.sqrt()
    }
}

/// Evaluate the scene at multiple points (single-threaded)
#[inline]
pub fn eval_batch(node: &SdfNode, points: &[Vec3]) -> Vec<f32> {
    points.iter().map(|&p| eval(node, p)).collect()
}

/// Evaluate the scene at multiple points (parallel)
#[inline]
pub fn eval_batch_parallel(node: &SdfNode, points: &[Vec3]) -> Vec<f32> {
    points.par_iter().map(|&p| eval(node, p)).collect()
}
