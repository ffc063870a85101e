//! CSG combinators for SDFs
//!
//! `union` is the exact minimum of two fields. `smooth_min` is the
//! polynomial blend; the blend zone has width `k` and the result is C¹
//! across it. At `k <= 0` the blend must collapse to the exact union,
//! which is why the guard is a branch and not a clamp.
//!
//! Author: Pierre Vandel

/// Union of two SDFs (distance to the nearer surface; exact)
#[inline(always)]
pub fn sdf_union(d1: f32, d2: f32) -> f32 {
    d1.min(d2)
}

/// Polynomial smooth minimum
///
/// Blends two distance fields over a zone of width `k`, producing a
/// C¹-continuous transition. `smooth_min(a, b, 0) == a.min(b)` exactly.
#[inline(always)]
pub fn smooth_min(a: f32, b: f32, k: f32) -> f32 {
    if k <= 0.0 {
        return a.min(b);
    }
    let h = (k - (a - b).abs()).max(0.0) / k;
    a.min(b) - h * h * k * 0.25
}

/// Exponential smooth minimum
///
/// Sharper falloff than the polynomial form; useful when many fields
/// blend at once. Degrades to exact union at `k <= 0`.
#[inline(always)]
pub fn smooth_min_exp(a: f32, b: f32, k: f32) -> f32 {
    if k <= 0.0 {
        return a.min(b);
    }
    let res = (-a / k).exp() + (-b / k).exp();
    -res.ln() * k
}
