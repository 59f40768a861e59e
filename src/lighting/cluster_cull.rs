//! Clustered light culling pass.
//!
//! The view frustum is split into a fixed 8x4 grid of screen tiles and a
//! camera-dependent number of exponential depth slices. Each frame the pass
//! uploads cluster-tier light bounds, computes the grid parameters, and either
//! dispatches the culling kernel on the compute facility or runs the CPU
//! reference culler and uploads its output. The lighting subpass then reads
//! one index list per cluster.

use glam::Vec3;

use super::backend::ComputeBackend;
use super::classify::FrameLightSet;
use super::cpu_cull;
use crate::Result;

/// Screen tiles along the horizontal axis.
pub const CLUSTER_TILES_X: u32 = 8;
/// Screen tiles along the vertical axis.
pub const CLUSTER_TILES_Y: u32 = 4;
/// Upper bound on exponential depth slices.
pub const MAX_DEPTH_SLICES: u32 = 64;
/// Index-list capacity per cluster cell.
pub const MAX_LIGHTS_PER_CLUSTER: u32 = 16;

/// Camera state the culling grid is derived from. Perspective projection only.
#[derive(Clone, Copy, Debug)]
pub struct CameraParams {
    pub position: Vec3,
    /// View direction, unit length.
    pub forward: Vec3,
    /// View-space up, unit length, orthogonal to `forward`.
    pub up: Vec3,
    /// View-space right, unit length, orthogonal to both.
    pub right: Vec3,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width over height.
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

/// Per-frame cluster grid layout.
///
/// The depth-slice ratio ties slice height to tile height: each successive
/// slice grows by the same factor a tile subtends vertically at the near
/// plane, which keeps clusters roughly cubical in view space.
#[derive(Clone, Copy, Debug)]
pub struct ClusterGrid {
    pub tiles: (u32, u32),
    pub depth_slices: u32,
    /// Geometric growth factor between successive slice depths.
    pub depth_ratio: f32,
    /// Near-plane corner of tile (0, 0), relative to the camera position.
    pub tile_lb: Vec3,
    /// Near-plane corner one tile to the right of `tile_lb`.
    pub tile_rb: Vec3,
    /// Near-plane corner one tile above `tile_lb`.
    pub tile_lu: Vec3,
    /// x = tile width in pixels, y = tile height in pixels,
    /// z = depth ratio, w = 1/ln(depth ratio)
    pub cluster_size: [f32; 4],
    pub near: f32,
    pub far: f32,
}

impl ClusterGrid {
    /// Build the grid for a camera and render-target size.
    pub fn for_camera(camera: &CameraParams, width: u32, height: u32) -> Self {
        let half_h = (camera.fov_y * 0.5).tan() * camera.near;
        let half_w = half_h * camera.aspect;

        let depth_ratio = 1.0 + 2.0 * (camera.fov_y * 0.5).tan() / CLUSTER_TILES_Y as f32;
        let depth_slices = ((camera.far / camera.near).ln() / depth_ratio.ln()).ceil() as u32;
        let depth_slices = depth_slices.clamp(1, MAX_DEPTH_SLICES);

        let near_center = camera.forward * camera.near;
        let tile_w = 2.0 * half_w / CLUSTER_TILES_X as f32;
        let tile_h = 2.0 * half_h / CLUSTER_TILES_Y as f32;
        let tile_lb = near_center - camera.right * half_w - camera.up * half_h;
        let tile_rb = tile_lb + camera.right * tile_w;
        let tile_lu = tile_lb + camera.up * tile_h;

        Self {
            tiles: (CLUSTER_TILES_X, CLUSTER_TILES_Y),
            depth_slices,
            depth_ratio,
            tile_lb,
            tile_rb,
            tile_lu,
            cluster_size: [
                width as f32 / CLUSTER_TILES_X as f32,
                height as f32 / CLUSTER_TILES_Y as f32,
                depth_ratio,
                1.0 / depth_ratio.ln(),
            ],
            near: camera.near,
            far: camera.far,
        }
    }

    pub fn cell_count(&self) -> usize {
        (self.tiles.0 * self.tiles.1 * self.depth_slices) as usize
    }

    /// Total length of the per-cluster index buffer.
    pub fn index_buffer_len(&self) -> usize {
        self.cell_count() * MAX_LIGHTS_PER_CLUSTER as usize
    }

    /// Length of the per-cluster count buffer.
    pub fn count_buffer_len(&self) -> usize {
        self.cell_count()
    }

    /// Work-group counts for the culling dispatch, one invocation per cell.
    pub fn dispatch_dimensions(&self) -> (u32, u32, u32) {
        (self.tiles.0, self.tiles.1, self.depth_slices)
    }

    /// Split a flat cell index into (tile_x, tile_y, slice).
    pub fn decompose_cell(&self, cell: usize) -> (u32, u32, u32) {
        let cell = cell as u32;
        let per_slice = self.tiles.0 * self.tiles.1;
        let slice = cell / per_slice;
        let rem = cell % per_slice;
        (rem % self.tiles.0, rem / self.tiles.0, slice)
    }
}

/// Uniform block consumed by the culling kernel.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CullParams {
    /// xyz = camera position, w = near plane distance
    pub camera_position: [f32; 4],
    /// xyz = view direction, w = far plane distance
    pub camera_forward: [f32; 4],
    /// xyz = near-plane corner of tile (0,0), w = light count
    pub tile_lb: [f32; 4],
    /// xyz = corner one tile right of tile_lb, w = depth slice count
    pub tile_rb: [f32; 4],
    /// xyz = corner one tile above tile_lb, w = 0
    pub tile_lu: [f32; 4],
    /// x/y = tile size in pixels, z = depth ratio, w = 1/ln(depth ratio)
    pub cluster_size: [f32; 4],
}

impl CullParams {
    fn new(grid: &ClusterGrid, camera: &CameraParams, light_count: u32) -> Self {
        let p = camera.position;
        let f = camera.forward;
        Self {
            camera_position: [p.x, p.y, p.z, grid.near],
            camera_forward: [f.x, f.y, f.z, grid.far],
            tile_lb: [grid.tile_lb.x, grid.tile_lb.y, grid.tile_lb.z, light_count as f32],
            tile_rb: [
                grid.tile_rb.x,
                grid.tile_rb.y,
                grid.tile_rb.z,
                grid.depth_slices as f32,
            ],
            tile_lu: [grid.tile_lu.x, grid.tile_lu.y, grid.tile_lu.z, 0.0],
            cluster_size: grid.cluster_size,
        }
    }
}

/// Owns the per-frame scratch buffers for cluster culling and drives either
/// the compute or the CPU path.
#[derive(Default)]
pub struct ClusterCullingPass {
    min_bounds: Vec<[f32; 4]>,
    max_bounds: Vec<[f32; 4]>,
    cpu_indices: Vec<u32>,
    cpu_counts: Vec<u32>,
    last_grid: Option<ClusterGrid>,
}

impl ClusterCullingPass {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grid from the most recent dispatch, if any.
    pub fn grid(&self) -> Option<&ClusterGrid> {
        self.last_grid.as_ref()
    }

    /// Run cluster culling for this frame's cluster-tier lights.
    ///
    /// Must not be called with an empty cluster tier; the caller skips the
    /// pass entirely so the kernel never runs against a zero light count.
    pub fn dispatch(
        &mut self,
        set: &FrameLightSet,
        camera: &CameraParams,
        width: u32,
        height: u32,
        compute: &mut dyn ComputeBackend,
    ) -> Result<()> {
        let count = set.cluster_count();
        debug_assert!(count > 0, "cluster culling dispatched with no lights");
        debug_assert!(count <= set.cluster_bounds().len());
        if count == 0 {
            return Ok(());
        }

        let grid = ClusterGrid::for_camera(camera, width, height);

        self.min_bounds.clear();
        self.max_bounds.clear();
        for bounds in set.cluster_bounds() {
            self.min_bounds
                .push([bounds.min.x, bounds.min.y, bounds.min.z, 0.0]);
            self.max_bounds
                .push([bounds.max.x, bounds.max.y, bounds.max.z, 0.0]);
        }

        if compute.supports_compute() {
            compute.upload_cluster_bounds(&self.min_bounds, &self.max_bounds)?;
            compute.upload_cull_params(&CullParams::new(&grid, camera, count as u32))?;
            compute.dispatch_cluster_cull(grid.dispatch_dimensions())?;
        } else {
            cpu_cull::cull_clusters(
                &grid,
                camera,
                set.cluster_bounds(),
                &mut self.cpu_indices,
                &mut self.cpu_counts,
            );
            compute.upload_cpu_cull_results(&self.cpu_indices, &self.cpu_counts)?;
        }
        compute.bind_cluster_output()?;

        self.last_grid = Some(grid);
        Ok(())
    }
}
