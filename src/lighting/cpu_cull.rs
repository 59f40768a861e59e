//! CPU reference implementation of the cluster culling kernel.
//!
//! Runs when the compute facility is unavailable and doubles as the testable
//! specification of the kernel's output. Each cluster cell is a convex region
//! bounded by four side planes through the camera position and two depth
//! planes; a light lands in a cell when its world-space AABB survives all six
//! half-space tests. The test is conservative (plane test against the box's
//! positive vertex), which can over-include near cell corners but never drops
//! a light the cell can see.

use glam::Vec3;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::bounds::ClusterBounds;
use super::cluster_cull::{CameraParams, ClusterGrid, MAX_LIGHTS_PER_CLUSTER};

/// Half-space `dot(normal, x) >= offset`.
#[derive(Clone, Copy)]
struct Plane {
    normal: Vec3,
    offset: f32,
}

impl Plane {
    fn through(normal: Vec3, point: Vec3) -> Self {
        Self {
            normal,
            offset: normal.dot(point),
        }
    }

    /// True when any part of the AABB lies inside the half-space.
    fn intersects(&self, bounds: &ClusterBounds) -> bool {
        let positive = Vec3::new(
            if self.normal.x >= 0.0 { bounds.max.x } else { bounds.min.x },
            if self.normal.y >= 0.0 { bounds.max.y } else { bounds.min.y },
            if self.normal.z >= 0.0 { bounds.max.z } else { bounds.min.z },
        );
        self.normal.dot(positive) >= self.offset
    }
}

/// The four side planes of one screen tile, all passing through the camera.
/// Normals point into the tile's frustum.
fn tile_planes(grid: &ClusterGrid, camera: &CameraParams, tx: u32, ty: u32) -> [Plane; 4] {
    let tile_right = grid.tile_rb - grid.tile_lb;
    let tile_up = grid.tile_lu - grid.tile_lb;

    // Near-plane directions through the tile's four edges.
    let left_dir = grid.tile_lb + tile_right * tx as f32;
    let right_dir = grid.tile_lb + tile_right * (tx + 1) as f32;
    let bottom_dir = grid.tile_lb + tile_up * ty as f32;
    let top_dir = grid.tile_lb + tile_up * (ty + 1) as f32;

    [
        Plane::through(camera.up.cross(left_dir), camera.position),
        Plane::through(right_dir.cross(camera.up), camera.position),
        Plane::through(bottom_dir.cross(camera.right), camera.position),
        Plane::through(camera.right.cross(top_dir), camera.position),
    ]
}

fn cell_intersects(
    grid: &ClusterGrid,
    camera: &CameraParams,
    planes: &[Plane; 4],
    slice: u32,
    bounds: &ClusterBounds,
) -> bool {
    let z_min = grid.near * grid.depth_ratio.powi(slice as i32);
    let z_max = z_min * grid.depth_ratio;

    let near = Plane {
        normal: camera.forward,
        offset: camera.forward.dot(camera.position) + z_min,
    };
    let far = Plane {
        normal: -camera.forward,
        offset: -(camera.forward.dot(camera.position) + z_max),
    };

    near.intersects(bounds)
        && far.intersects(bounds)
        && planes.iter().all(|p| p.intersects(bounds))
}

fn cull_cell(
    grid: &ClusterGrid,
    camera: &CameraParams,
    bounds: &[ClusterBounds],
    cell: usize,
    indices: &mut [u32],
    count: &mut u32,
) {
    let (tx, ty, slice) = grid.decompose_cell(cell);
    let planes = tile_planes(grid, camera, tx, ty);

    let mut n = 0usize;
    for (light, aabb) in bounds.iter().enumerate() {
        if n == indices.len() {
            break;
        }
        if cell_intersects(grid, camera, &planes, slice, aabb) {
            indices[n] = light as u32;
            n += 1;
        }
    }
    *count = n as u32;
}

/// Fill the per-cluster index and count buffers for the given lights.
///
/// `indices` and `counts` are resized to the grid's buffer lengths; indices
/// beyond each cell's count are left untouched and must not be read.
pub fn cull_clusters(
    grid: &ClusterGrid,
    camera: &CameraParams,
    bounds: &[ClusterBounds],
    indices: &mut Vec<u32>,
    counts: &mut Vec<u32>,
) {
    indices.clear();
    indices.resize(grid.index_buffer_len(), 0);
    counts.clear();
    counts.resize(grid.count_buffer_len(), 0);

    #[cfg(feature = "parallel")]
    {
        indices
            .par_chunks_mut(MAX_LIGHTS_PER_CLUSTER as usize)
            .zip(counts.par_iter_mut())
            .enumerate()
            .for_each(|(cell, (chunk, count))| {
                cull_cell(grid, camera, bounds, cell, chunk, count);
            });
    }

    #[cfg(not(feature = "parallel"))]
    {
        for (cell, (chunk, count)) in indices
            .chunks_mut(MAX_LIGHTS_PER_CLUSTER as usize)
            .zip(counts.iter_mut())
            .enumerate()
        {
            cull_cell(grid, camera, bounds, cell, chunk, count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lighting::light::{Light, LightHandle};

    fn camera() -> CameraParams {
        CameraParams {
            position: Vec3::ZERO,
            forward: Vec3::Z,
            up: Vec3::Y,
            right: Vec3::X,
            fov_y: 60f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
        }
    }

    fn run(bounds: &[ClusterBounds]) -> (ClusterGrid, Vec<u32>, Vec<u32>) {
        let camera = camera();
        let grid = ClusterGrid::for_camera(&camera, 1920, 1080);
        let mut indices = Vec::new();
        let mut counts = Vec::new();
        cull_clusters(&grid, &camera, bounds, &mut indices, &mut counts);
        (grid, indices, counts)
    }

    fn point_bounds(position: Vec3, range: f32) -> ClusterBounds {
        ClusterBounds::from_point(&Light::point(LightHandle(0), position, range, Vec3::ONE))
    }

    #[test]
    fn test_centered_light_lands_in_matching_depth_slices() {
        let bounds = [point_bounds(Vec3::new(0.0, 0.0, 10.0), 3.0)];
        let (grid, _, counts) = run(&bounds);

        let hits: Vec<usize> = counts
            .iter()
            .enumerate()
            .filter(|(_, c)| **c > 0)
            .map(|(i, _)| i)
            .collect();
        assert!(!hits.is_empty());

        // The light's AABB spans z in [7, 13]; every hit cell's depth slab
        // must overlap that window.
        for cell in hits {
            let (_, _, slice) = grid.decompose_cell(cell);
            let z_min = grid.near * grid.depth_ratio.powi(slice as i32);
            let z_max = z_min * grid.depth_ratio;
            assert!(z_max >= 7.0 && z_min <= 13.0, "slice {slice} out of window");
        }
    }

    #[test]
    fn test_light_behind_camera_hits_nothing() {
        let bounds = [point_bounds(Vec3::new(0.0, 0.0, -10.0), 3.0)];
        let (_, _, counts) = run(&bounds);
        assert!(counts.iter().all(|c| *c == 0));
    }

    #[test]
    fn test_light_outside_frustum_hits_nothing() {
        // At z = 11 the frustum half-width is about 11.3; an AABB entirely
        // left of x = -20 is outside every tile.
        let bounds = [point_bounds(Vec3::new(-25.0, 0.0, 10.0), 1.0)];
        let (_, _, counts) = run(&bounds);
        assert!(counts.iter().all(|c| *c == 0));
    }

    #[test]
    fn test_cell_capacity_is_clamped() {
        let bounds: Vec<ClusterBounds> = (0..MAX_LIGHTS_PER_CLUSTER + 8)
            .map(|_| point_bounds(Vec3::new(0.0, 0.0, 10.0), 3.0))
            .collect();
        let (grid, indices, counts) = run(&bounds);

        let max = counts.iter().copied().max().unwrap();
        assert_eq!(max, MAX_LIGHTS_PER_CLUSTER);

        // Indices within a full cell keep input order.
        let full = counts.iter().position(|c| *c == MAX_LIGHTS_PER_CLUSTER).unwrap();
        let chunk = &indices[full * MAX_LIGHTS_PER_CLUSTER as usize..][..MAX_LIGHTS_PER_CLUSTER as usize];
        for (i, idx) in chunk.iter().enumerate() {
            assert_eq!(*idx, i as u32);
        }
        assert!(full < grid.cell_count());
    }

    #[test]
    fn test_offset_camera_position() {
        // Same scene, camera translated; results must follow the camera.
        let mut camera = camera();
        camera.position = Vec3::new(100.0, 50.0, -20.0);
        let grid = ClusterGrid::for_camera(&camera, 1920, 1080);

        let visible = point_bounds(camera.position + Vec3::new(0.0, 0.0, 10.0), 3.0);
        let behind = point_bounds(camera.position - Vec3::new(0.0, 0.0, 10.0), 3.0);

        let mut indices = Vec::new();
        let mut counts = Vec::new();
        cull_clusters(&grid, &camera, &[visible], &mut indices, &mut counts);
        assert!(counts.iter().any(|c| *c > 0));

        cull_clusters(&grid, &camera, &[behind], &mut indices, &mut counts);
        assert!(counts.iter().all(|c| *c == 0));
    }
}
