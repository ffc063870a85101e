//! Mesh to distance grid conversion
//!
//! Three phases:
//!
//! 1. **Seed** — exact unsigned point-triangle distances are written into
//!    a narrow band of cells around every triangle.
//! 2. **Sweep** — a fast-sweeping relaxation (eight axis-ordered
//!    Gauss-Seidel passes, repeated to convergence) propagates the band
//!    outward by solving the eikonal equation `|∇d| = 1` per cell. Each
//!    pass finishes all cells before the next begins.
//! 3. **Sign** — one axis-aligned parity ray per (y, z) grid row
//!    classifies cells as inside or outside; rows are independent and run
//!    in parallel.
//!
//! Brute-force all-pairs distance is cubic in cells times triangles; the
//! band + sweep combination touches each cell a small constant number of
//! times and each triangle only near its own footprint.
//!
//! Sign correctness requires a closed mesh with consistent winding. Open
//! or self-intersecting meshes still produce a grid, with locally wrong
//! signs near the defect.
//!
//! Author: Pierre Vandel

use std::time::Instant;

use glam::{Vec2, Vec3};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::mesh::{InvalidMeshError, Mesh};

use super::DistanceGrid;

/// Width of the exact-distance band around each triangle, in cells
const SEED_BAND: i32 = 2;

/// Upper bound on full sweep rounds (each round is 8 directional passes)
const MAX_SWEEP_ROUNDS: usize = 4;

/// Generator parameters
#[derive(Debug, Clone, Copy)]
pub struct GridConfig {
    /// Cell count along the longest bounding-box axis; other axes are
    /// derived proportionally
    pub resolution: u32,
    /// Margin added around the bounding box on every side, as a fraction
    /// of the longest axis, so rays can approach the surface from outside
    pub padding: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            resolution: 64,
            padding: 0.125,
        }
    }
}

/// Convert a closed triangle mesh into a signed distance grid
///
/// # Errors
/// [`InvalidMeshError`] when the mesh is empty, indexes out of range, or
/// its bounding box has collapsed to a point — no grid can enclose it.
pub fn generate(mesh: &Mesh, config: &GridConfig) -> Result<DistanceGrid, InvalidMeshError> {
    let aabb = mesh.validate_for_gridding()?;

    let size = aabb.size();
    let longest = size.max_element();
    let pad = longest * config.padding.max(0.0);
    let world_min = aabb.min - Vec3::splat(pad);
    let world_max = aabb.max + Vec3::splat(pad);
    let padded = world_max - world_min;

    let resolution = config.resolution.max(2);
    let cell_size = padded.max_element() / (resolution - 1) as f32;
    let dims = [
        ((padded.x / cell_size).round() as u32 + 1).max(2),
        ((padded.y / cell_size).round() as u32 + 1).max(2),
        ((padded.z / cell_size).round() as u32 + 1).max(2),
    ];

    info!(
        triangles = mesh.triangle_count(),
        ?dims,
        cell_size,
        "generating distance grid"
    );

    let mut grid = DistanceGrid::new(dims, world_min, cell_size);

    let seed_start = Instant::now();
    seed_band(&mut grid, mesh);
    debug!(elapsed_ms = seed_start.elapsed().as_millis() as u64, "band seeded");

    let sweep_start = Instant::now();
    let rounds = sweep_to_convergence(&mut grid);
    debug!(
        rounds,
        elapsed_ms = sweep_start.elapsed().as_millis() as u64,
        "sweeping converged"
    );

    let sign_start = Instant::now();
    apply_parity_sign(&mut grid, mesh);
    debug!(elapsed_ms = sign_start.elapsed().as_millis() as u64, "signs applied");

    Ok(grid)
}

/// Phase 1: exact unsigned distances in a band around each triangle
fn seed_band(grid: &mut DistanceGrid, mesh: &Mesh) {
    let inv = 1.0 / grid.cell_size;
    let [nx, ny, nz] = grid.dims;

    for t in 0..mesh.triangle_count() {
        let [a, b, c] = mesh.triangle(t);

        // Zero-area triangles contribute nothing but noise
        if (b - a).cross(c - a).length_squared() < 1e-20 {
            continue;
        }

        let tri_min = a.min(b).min(c);
        let tri_max = a.max(b).max(c);

        let lo = ((tri_min - grid.origin) * inv).floor();
        let hi = ((tri_max - grid.origin) * inv).ceil();

        let x0 = (lo.x as i32 - SEED_BAND).max(0) as u32;
        let y0 = (lo.y as i32 - SEED_BAND).max(0) as u32;
        let z0 = (lo.z as i32 - SEED_BAND).max(0) as u32;
        let x1 = ((hi.x as i32 + SEED_BAND) as u32).min(nx - 1);
        let y1 = ((hi.y as i32 + SEED_BAND) as u32).min(ny - 1);
        let z1 = ((hi.z as i32 + SEED_BAND) as u32).min(nz - 1);

        for z in z0..=z1 {
            for y in y0..=y1 {
                for x in x0..=x1 {
                    let p = grid.cell_center(x, y, z);
                    let d = triangle_distance(p, a, b, c);
                    let idx = grid.index(x, y, z);
                    if d < grid.data[idx] {
                        grid.data[idx] = d;
                    }
                }
            }
        }
    }
}

/// Exact unsigned distance from a point to a triangle
fn triangle_distance(point: Vec3, v0: Vec3, v1: Vec3, v2: Vec3) -> f32 {
    let v10 = v1 - v0;
    let v21 = v2 - v1;
    let v02 = v0 - v2;

    let p0 = point - v0;
    let p1 = point - v1;
    let p2 = point - v2;

    let n = v10.cross(-v02);

    // Does the point project inside the triangle?
    let s0 = v10.cross(n).dot(p0);
    let s1 = v21.cross(n).dot(p1);
    let s2 = v02.cross(n).dot(p2);

    if s0 <= 0.0 && s1 <= 0.0 && s2 <= 0.0 {
        // Interior: distance to the plane
        let n_len_sq = n.length_squared();
        if n_len_sq > 1e-20 {
            let h = n.dot(p0);
            return (h * h / n_len_sq).sqrt();
        }
    }

    // Exterior: nearest point on one of the edges
    let clamp01 = |t: f32| t.clamp(0.0, 1.0);

    let t0 = clamp01(v10.dot(p0) / v10.length_squared().max(1e-20));
    let d0 = (p0 - v10 * t0).length_squared();

    let t1 = clamp01(v21.dot(p1) / v21.length_squared().max(1e-20));
    let d1 = (p1 - v21 * t1).length_squared();

    let t2 = clamp01((-v02).dot(p2) / v02.length_squared().max(1e-20));
    let d2 = (p2 + v02 * t2).length_squared();

    d0.min(d1).min(d2).sqrt()
}

/// Phase 2: eight-ordering fast sweeping until no cell improves
///
/// Returns the number of full rounds run.
fn sweep_to_convergence(grid: &mut DistanceGrid) -> usize {
    let tolerance = 1e-4 * grid.cell_size;
    for round in 0..MAX_SWEEP_ROUNDS {
        let mut max_change = 0.0f32;
        for ordering in 0..8u32 {
            max_change = max_change.max(sweep_pass(grid, ordering));
        }
        if max_change < tolerance {
            return round + 1;
        }
    }
    MAX_SWEEP_ROUNDS
}

/// One Gauss-Seidel pass over the whole grid in one of the 8 axis orderings
///
/// The ordering bits select ascending/descending traversal per axis. The
/// pass has sequential data dependencies along its sweep direction, so it
/// runs single-threaded; parallelism lives in seeding and sign phases.
fn sweep_pass(grid: &mut DistanceGrid, ordering: u32) -> f32 {
    let [nx, ny, nz] = grid.dims;
    let h = grid.cell_size;
    let mut max_change = 0.0f32;

    let xs: Vec<u32> = axis_order(nx, ordering & 1 != 0);
    let ys: Vec<u32> = axis_order(ny, ordering & 2 != 0);
    let zs: Vec<u32> = axis_order(nz, ordering & 4 != 0);

    for &z in &zs {
        for &y in &ys {
            for &x in &xs {
                let ax = neighbor_min_axis(grid, x, y, z, 0);
                let ay = neighbor_min_axis(grid, x, y, z, 1);
                let az = neighbor_min_axis(grid, x, y, z, 2);

                let candidate = eikonal_update(ax, ay, az, h);
                let idx = grid.index(x, y, z);
                let current = grid.data[idx];
                if candidate < current {
                    grid.data[idx] = candidate;
                    let change = if current.is_finite() {
                        current - candidate
                    } else {
                        f32::INFINITY
                    };
                    max_change = max_change.max(change);
                }
            }
        }
    }

    max_change
}

fn axis_order(n: u32, descending: bool) -> Vec<u32> {
    if descending {
        (0..n).rev().collect()
    } else {
        (0..n).collect()
    }
}

/// Smaller of the two axis neighbors (infinite past the boundary)
#[inline(always)]
fn neighbor_min_axis(grid: &DistanceGrid, x: u32, y: u32, z: u32, axis: usize) -> f32 {
    let (x, y, z) = (x as i32, y as i32, z as i32);
    let (lo, hi) = match axis {
        0 => ((x - 1, y, z), (x + 1, y, z)),
        1 => ((x, y - 1, z), (x, y + 1, z)),
        _ => ((x, y, z - 1), (x, y, z + 1)),
    };
    let a = value_or_inf(grid, lo);
    let b = value_or_inf(grid, hi);
    a.min(b)
}

#[inline(always)]
fn value_or_inf(grid: &DistanceGrid, (x, y, z): (i32, i32, i32)) -> f32 {
    if x < 0
        || y < 0
        || z < 0
        || x >= grid.dims[0] as i32
        || y >= grid.dims[1] as i32
        || z >= grid.dims[2] as i32
    {
        f32::INFINITY
    } else {
        grid.data[grid.index(x as u32, y as u32, z as u32)]
    }
}

/// Solve the upwind eikonal update for one cell
///
/// Takes the per-axis neighbor minima and grid spacing `h`; returns the
/// smallest distance consistent with `|∇d| = 1`. Infinite neighbors drop
/// out of the stencil instead of poisoning the arithmetic.
fn eikonal_update(ax: f32, ay: f32, az: f32, h: f32) -> f32 {
    let mut vals = [ax, ay, az];
    vals.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    if !vals[0].is_finite() {
        return f32::INFINITY;
    }

    // One-sided update
    let mut d = vals[0] + h;
    if !vals[1].is_finite() || d <= vals[1] {
        return d;
    }

    // Two-axis update
    let diff = vals[0] - vals[1];
    d = 0.5 * (vals[0] + vals[1] + (2.0 * h * h - diff * diff).max(0.0).sqrt());
    if !vals[2].is_finite() || d <= vals[2] {
        return d;
    }

    // Three-axis update
    let s = vals[0] + vals[1] + vals[2];
    let q = vals[0] * vals[0] + vals[1] * vals[1] + vals[2] * vals[2];
    let disc = (s * s - 3.0 * (q - h * h)).max(0.0);
    (s + disc.sqrt()) / 3.0
}

/// Phase 3: inside/outside via ray parity, one +X ray per (y, z) row
///
/// Rows are contiguous in the X-major layout, so each rayon chunk owns
/// one row and no two threads touch the same cell.
fn apply_parity_sign(grid: &mut DistanceGrid, mesh: &Mesh) {
    let [nx, ny, _nz] = grid.dims;
    let origin = grid.origin;
    let cell_size = grid.cell_size;

    let triangles: Vec<[Vec3; 3]> = (0..mesh.triangle_count())
        .map(|t| mesh.triangle(t))
        .collect();

    grid.data
        .par_chunks_mut(nx as usize)
        .enumerate()
        .for_each(|(row, cells)| {
            let y = (row as u32) % ny;
            let z = (row as u32) / ny;
            // Nudge the ray off the lattice so it cannot run exactly
            // through a shared triangle edge or vertex (which would
            // double-count the crossing and flip the whole row)
            let yc = origin.y + (y as f32 + 2.39e-4) * cell_size;
            let zc = origin.z + (z as f32 + 7.61e-4) * cell_size;

            // Every x where the row's +X line pierces a triangle
            let mut crossings: Vec<f32> = Vec::new();
            for tri in &triangles {
                if let Some(x) = line_x_crossing(tri, Vec2::new(yc, zc)) {
                    crossings.push(x);
                }
            }
            crossings
                .sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

            // Walk the row once; parity flips at each crossing
            let mut next = 0usize;
            let mut inside = false;
            for (x, cell) in cells.iter_mut().enumerate() {
                let xc = origin.x + x as f32 * cell_size;
                while next < crossings.len() && crossings[next] < xc {
                    inside = !inside;
                    next += 1;
                }
                if inside {
                    *cell = -*cell;
                }
            }
        });
}

/// X coordinate where the line `{y, z} = at` crosses the triangle, if it does
///
/// Triangles whose (y, z) projection is degenerate (faces parallel to the
/// X axis) never flip parity, which is exactly right for a closed mesh.
fn line_x_crossing(tri: &[Vec3; 3], at: Vec2) -> Option<f32> {
    let p0 = Vec2::new(tri[0].y, tri[0].z);
    let p1 = Vec2::new(tri[1].y, tri[1].z);
    let p2 = Vec2::new(tri[2].y, tri[2].z);

    let e1 = p1 - p0;
    let e2 = p2 - p0;
    let det = e1.x * e2.y - e2.x * e1.y;
    if det.abs() < 1e-12 {
        return None;
    }

    let rel = at - p0;
    let inv = 1.0 / det;
    let u = (rel.x * e2.y - e2.x * rel.y) * inv;
    let v = (e1.x * rel.y - rel.x * e1.y) * inv;

    // Half-open bounds keep shared edges from double counting
    if u < 0.0 || v < 0.0 || u + v >= 1.0 {
        return None;
    }

    Some(tri[0].x + u * (tri[1].x - tri[0].x) + v * (tri[2].x - tri[0].x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::sdf_box3d;

    /// Axis-aligned cube mesh with outward winding
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

    #[test]
    fn test_triangle_distance_plane_and_edge() {
        let a = Vec3::ZERO;
        let b = Vec3::new(2.0, 0.0, 0.0);
        let c = Vec3::new(0.0, 2.0, 0.0);
        // Above the interior
        let d = triangle_distance(Vec3::new(0.5, 0.5, 1.0), a, b, c);
        assert!((d - 1.0).abs() < 1e-5);
        // Beyond an edge
        let d = triangle_distance(Vec3::new(3.0, 0.0, 0.0), a, b, c);
        assert!((d - 1.0).abs() < 1e-5);
        // At a vertex
        let d = triangle_distance(Vec3::ZERO, a, b, c);
        assert!(d.abs() < 1e-5);
    }

    #[test]
    fn test_eikonal_single_axis() {
        let d = eikonal_update(1.0, f32::INFINITY, f32::INFINITY, 0.5);
        assert!((d - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_eikonal_two_axis() {
        // Equal neighbors at 0: the update solves 2d^2 = h^2, d = h/sqrt(2)
        let d = eikonal_update(0.0, 0.0, f32::INFINITY, 1.0);
        assert!((d - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-5);
    }

    #[test]
    fn test_eikonal_all_infinite() {
        assert!(eikonal_update(f32::INFINITY, f32::INFINITY, f32::INFINITY, 1.0).is_infinite());
    }

    #[test]
    fn test_generate_cube_signs() {
        let mesh = cube_mesh(1.0);
        let grid = generate(
            &mesh,
            &GridConfig {
                resolution: 24,
                padding: 0.25,
            },
        )
        .unwrap();

        let [nx, ny, nz] = grid.dims;
        let tol = grid.cell_size * 1.5;
        for z in 0..nz {
            for y in 0..ny {
                for x in 0..nx {
                    let p = grid.cell_center(x, y, z);
                    let reference = sdf_box3d(p, Vec3::ZERO, Vec3::splat(1.0));
                    // Skip the ambiguous shell right at the surface
                    if reference.abs() < tol {
                        continue;
                    }
                    let got = grid.get(x as i32, y as i32, z as i32);
                    assert_eq!(
                        got.signum(),
                        reference.signum(),
                        "sign mismatch at {:?}: grid={}, reference={}",
                        p,
                        got,
                        reference
                    );
                }
            }
        }
    }

    #[test]
    fn test_generate_cube_distances_near_surface() {
        let mesh = cube_mesh(1.0);
        let grid = generate(
            &mesh,
            &GridConfig {
                resolution: 32,
                padding: 0.25,
            },
        )
        .unwrap();

        // Within the exact seeded band the values should track the
        // analytic box closely
        let [nx, ny, nz] = grid.dims;
        for z in 0..nz {
            for y in 0..ny {
                for x in 0..nx {
                    let p = grid.cell_center(x, y, z);
                    let reference = sdf_box3d(p, Vec3::ZERO, Vec3::splat(1.0));
                    if reference.abs() > grid.cell_size {
                        continue;
                    }
                    let got = grid.get(x as i32, y as i32, z as i32);
                    assert!(
                        (got - reference).abs() < grid.cell_size,
                        "distance off at {:?}: grid={}, reference={}",
                        p,
                        got,
                        reference
                    );
                }
            }
        }
    }

    #[test]
    fn test_generate_all_finite() {
        let mesh = cube_mesh(0.5);
        let grid = generate(&mesh, &GridConfig::default()).unwrap();
        assert!(grid.data.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_generate_degenerate_mesh_fails() {
        let mesh = Mesh {
            vertices: vec![Vec3::splat(1.0); 3],
            indices: vec![0, 1, 2],
        };
        let err = generate(&mesh, &GridConfig::default());
        assert!(err.is_err());
    }

    #[test]
    fn test_generate_padding_expands_bounds() {
        let mesh = cube_mesh(1.0);
        let grid = generate(
            &mesh,
            &GridConfig {
                resolution: 16,
                padding: 0.5,
            },
        )
        .unwrap();
        let bounds = grid.bounds();
        assert!(bounds.min.x < -1.5);
        assert!(bounds.max.x > 1.5);
    }
}
