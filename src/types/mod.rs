//! Core scene types
//!
//! Defines the `SdfNode` scene tree and related containers. A scene is
//! built once per frame from primitives and combinators, then treated as
//! immutable for the whole pass; `Arc` children make subtree sharing and
//! cross-thread access cheap.
//!
//! Author: Pierre Vandel

use std::sync::Arc;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::grid::{DistanceGrid, SampleFilter};

mod constructors;
mod containers;

pub use containers::{Aabb, Hit, Ray};

/// Signed distance scene node
///
/// A tagged variant per primitive or combinator, evaluated by the
/// recursive interpreter in [`crate::eval`]. This replaces per-kind
/// shader branches with one enum dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SdfNode {
    // === Primitives ===
    /// Sphere with center and radius
    Sphere {
        /// Sphere center
        center: Vec3,
        /// Sphere radius
        radius: f32,
    },

    /// Axis-aligned box
    Box3d {
        /// Box center
        center: Vec3,
        /// Half-extents along each axis
        half_extents: Vec3,
    },

    /// Infinite plane with unit normal and offset from origin
    Plane {
        /// Plane normal direction (unit length)
        normal: Vec3,
        /// Signed distance from origin along normal
        distance: f32,
    },

    /// Sampled distance grid (a decoded atlas or baked volume)
    Grid {
        /// The shared, read-only grid
        grid: Arc<DistanceGrid>,
        /// Reconstruction filter used per sample
        filter: SampleFilter,
    },

    // === Operations ===
    /// Union of two fields (min distance)
    Union {
        /// First operand
        a: Arc<SdfNode>,
        /// Second operand
        b: Arc<SdfNode>,
    },

    /// Smooth union with blend width k (polynomial smooth-min)
    SmoothUnion {
        /// First operand
        a: Arc<SdfNode>,
        /// Second operand
        b: Arc<SdfNode>,
        /// Blend zone width; 0 degrades to exact union
        k: f32,
    },

    // === Modifiers ===
    /// Infinite domain repetition with the given period
    RepeatInfinite {
        /// Child node
        child: Arc<SdfNode>,
        /// Repetition period per axis
        period: Vec3,
    },

    /// Finite domain repetition: `count` instances spaced by `period`
    RepeatFinite {
        /// Child node
        child: Arc<SdfNode>,
        /// Instance count per axis
        count: [u32; 3],
        /// Repetition period per axis
        period: Vec3,
    },

    /// Translation
    Translate {
        /// Child node
        child: Arc<SdfNode>,
        /// Translation offset
        offset: Vec3,
    },
}

impl SdfNode {
    /// Count total nodes in the tree
    pub fn node_count(&self) -> u32 {
        match self {
            SdfNode::Sphere { .. }
            | SdfNode::Box3d { .. }
            | SdfNode::Plane { .. }
            | SdfNode::Grid { .. } => 1,

            SdfNode::Union { a, b } | SdfNode::SmoothUnion { a, b, .. } => {
                1 + a.node_count() + b.node_count()
            }

            SdfNode::RepeatInfinite { child, .. }
            | SdfNode::RepeatFinite { child, .. }
            | SdfNode::Translate { child, .. } => 1 + child.node_count(),
        }
    }
}
