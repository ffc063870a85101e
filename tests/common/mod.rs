//! Common test helpers for gridmarch integration tests
//!
//! Author: Pierre Vandel
#![allow(dead_code)] // not every suite uses every helper

use gridmarch::prelude::*;

// ============================================================================
// Standard test shapes
// ============================================================================

/// Unit sphere at origin
pub fn test_sphere() -> SdfNode {
    SdfNode::sphere(Vec3::ZERO, 1.0)
}

/// The two-sphere smooth blend scenario: r=1 at (-1.5,0,0) and (1.5,0,0), k=0.5
pub fn test_blend() -> SdfNode {
    SdfNode::sphere(Vec3::new(-1.5, 0.0, 0.0), 1.0)
        .smooth_union(SdfNode::sphere(Vec3::new(1.5, 0.0, 0.0), 1.0), 0.5)
}

/// Closed axis-aligned cube mesh with outward winding, half-extent `half`
pub fn cube_mesh(half: f32) -> Mesh {
    let h = half;
    let vertices = vec![
        Vec3::new(-h, -h, -h),
        Vec3::new(h, -h, -h),
        Vec3::new(h, h, -h),
        Vec3::new(-h, h, -h),
        Vec3::new(-h, -h, h),
        Vec3::new(h, -h, h),
        Vec3::new(h, h, h),
        Vec3::new(-h, h, h),
    ];
    let indices = vec![
        0, 2, 1, 0, 3, 2, // -Z
        4, 5, 6, 4, 6, 7, // +Z
        0, 1, 5, 0, 5, 4, // -Y
        3, 6, 2, 3, 7, 6, // +Y
        0, 7, 3, 0, 4, 7, // -X
        1, 2, 6, 1, 6, 5, // +X
    ];
    Mesh { vertices, indices }
}

// ============================================================================
// Assertion helpers
// ============================================================================

/// Assert two f32 values are close within tolerance
#[allow(dead_code)]
pub fn assert_close(a: f32, b: f32, tol: f32, msg: &str) {
    assert!(
        (a - b).abs() < tol,
        "{}: {} vs {} (diff={}, tol={})",
        msg,
        a,
        b,
        (a - b).abs(),
        tol
    );
}
