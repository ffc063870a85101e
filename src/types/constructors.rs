//! Builder-style constructors for SdfNode
//!
//! Author: Pierre Vandel

use std::sync::Arc;

use glam::Vec3;

use crate::grid::{DistanceGrid, SampleFilter};

use super::SdfNode;

impl SdfNode {
    // === Primitive constructors ===

    /// Create a sphere
    #[must_use]
    #[inline]
    pub fn sphere(center: Vec3, radius: f32) -> Self {
        SdfNode::Sphere { center, radius }
    }

    /// Create an axis-aligned box from center and half-extents
    #[must_use]
    #[inline]
    pub fn box3d(center: Vec3, half_extents: Vec3) -> Self {
        SdfNode::Box3d {
            center,
            half_extents,
        }
    }

    /// Create an infinite plane (normal is normalized)
    #[must_use]
    #[inline]
    pub fn plane(normal: Vec3, distance: f32) -> Self {
        SdfNode::Plane {
            normal: normal.normalize(),
            distance,
        }
    }

    /// Create a grid-lookup node from a decoded or baked distance grid
    #[must_use]
    #[inline]
    pub fn grid(grid: DistanceGrid, filter: SampleFilter) -> Self {
        SdfNode::Grid {
            grid: Arc::new(grid),
            filter,
        }
    }

    /// Create a grid-lookup node sharing an already-wrapped grid
    #[must_use]
    #[inline]
    pub fn grid_shared(grid: Arc<DistanceGrid>, filter: SampleFilter) -> Self {
        SdfNode::Grid { grid, filter }
    }

    // === Combinators ===

    /// Union with another node
    #[must_use]
    pub fn union(self, other: SdfNode) -> Self {
        SdfNode::Union {
            a: Arc::new(self),
            b: Arc::new(other),
        }
    }

    /// Smooth union with blend width k
    #[must_use]
    pub fn smooth_union(self, other: SdfNode, k: f32) -> Self {
        SdfNode::SmoothUnion {
            a: Arc::new(self),
            b: Arc::new(other),
            k,
        }
    }

    /// Repeat infinitely with the given period per axis
    #[must_use]
    pub fn repeat_infinite(self, period: Vec3) -> Self {
        SdfNode::RepeatInfinite {
            child: Arc::new(self),
            period,
        }
    }

    /// Repeat a finite number of instances per axis
    #[must_use]
    pub fn repeat_finite(self, count: [u32; 3], period: Vec3) -> Self {
        SdfNode::RepeatFinite {
            child: Arc::new(self),
            count,
            period,
        }
    }

    /// Translate by an offset
    #[must_use]
    pub fn translate(self, offset: Vec3) -> Self {
        SdfNode::Translate {
            child: Arc::new(self),
            offset,
        }
    }
}
