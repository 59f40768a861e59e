//! External facility contracts.
//!
//! The lighting core never talks to a GPU directly. Shadow rendering,
//! rasterization, and compute execution are collaborators owned by the
//! surrounding renderer and reached through these traits. Ordering matters:
//! everything recorded through one backend is assumed to execute in submit
//! order on the GPU command stream, which is what makes the cluster-cull
//! dispatch visible to the lighting subpass without a CPU-side wait.

use glam::Mat4;

use super::classify::{LightTier, LightingFlags};
use super::cluster_cull::CullParams;
use super::encode::{DirectionalLightRecord, EncodedLightRecord, ShadowRecord};
use super::light::LightHandle;
use crate::Result;

/// Frame-global light state handed to the rasterization facility.
///
/// Counts are the slice lengths; both toggles are set explicitly every frame
/// so no state leaks over from the previous one.
pub struct FrameLightBinding<'a> {
    pub directional: &'a [DirectionalLightRecord],
    pub stencil: &'a [EncodedLightRecord],
    pub cluster: &'a [EncodedLightRecord],
    pub flags: LightingFlags,
}

/// Full-screen draws issued by the lighting subpass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FullscreenShade {
    /// Directional lights plus ambient/indirect terms.
    DirectionalAmbient,
    /// One stencil-tier light, restricted to pixels the stencil mask marked.
    StencilLight(usize),
    /// All cluster-tier lights, resolved through the per-cluster index buffer.
    ClusterResolve,
}

/// Bounding volume mesh selector for stencil-tier draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VolumeShape {
    Sphere,
    Cone,
}

/// Stencil state for one bounding-volume draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StencilVolumePass {
    /// Single draw, stencil comparison always passes and writes.
    WriteAlways,
    /// First draw of the two-sided pair: write on back faces only.
    WriteBackFaces,
    /// Second draw of the two-sided pair: write on front faces only.
    WriteFrontFaces,
}

/// One bounding-volume draw of the stencil masking sequence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightVolumeDraw {
    pub shape: VolumeShape,
    pub transform: Mat4,
    pub stencil: StencilVolumePass,
}

/// Outcome of the external G-buffer pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GBufferStatus {
    Rendered,
    /// Nothing visible this frame; the lit pass is skipped entirely.
    Skipped,
}

/// Shadow data binder: owns shadow-map bookkeeping and hands back opaque
/// per-light lookup records embedded in the encoded arrays.
pub trait ShadowBinder {
    /// Request shadow data for a directional light in the given tier slot.
    fn bind_directional(&mut self, handle: LightHandle, slot: usize) -> ShadowRecord;

    /// Request shadow data for a local light in the given tier-local slot.
    fn bind_local(&mut self, handle: LightHandle, tier: LightTier, slot: usize) -> ShadowRecord;

    /// Render all shadow maps bound this frame. Invoked once per frame after
    /// light setup.
    fn render(&mut self, used_shadow_mask: bool) -> Result<()>;
}

/// Shadow binder for renderers without shadow support.
#[derive(Default)]
pub struct NoShadows;

impl ShadowBinder for NoShadows {
    fn bind_directional(&mut self, _handle: LightHandle, _slot: usize) -> ShadowRecord {
        ShadowRecord::NONE
    }

    fn bind_local(&mut self, _handle: LightHandle, _tier: LightTier, _slot: usize) -> ShadowRecord {
        ShadowRecord::NONE
    }

    fn render(&mut self, _used_shadow_mask: bool) -> Result<()> {
        Ok(())
    }
}

/// Rasterization facility: G-buffer pass plus the lighting subpass draw surface.
pub trait RasterBackend {
    /// Bind encoded arrays, counts, and both lighting toggles as frame-global
    /// state for shading code.
    fn bind_frame_lights(&mut self, binding: &FrameLightBinding<'_>) -> Result<()>;

    /// Run the surface (G-buffer) pass.
    fn render_gbuffer(&mut self) -> Result<GBufferStatus>;

    fn draw_fullscreen(&mut self, shade: FullscreenShade) -> Result<()>;

    fn draw_light_volume(&mut self, draw: &LightVolumeDraw) -> Result<()>;

    /// Release transient per-frame resources. Must be safe to call on frames
    /// that exited early.
    fn release_frame_resources(&mut self);
}

/// Compute execution facility for the cluster culling pass.
pub trait ComputeBackend {
    /// Whether a compute dispatch path exists; when false the CPU reference
    /// culler runs instead and its results are uploaded directly.
    fn supports_compute(&self) -> bool;

    /// Upload per-light world-space AABBs (xyz used, w padding).
    fn upload_cluster_bounds(
        &mut self,
        min_bounds: &[[f32; 4]],
        max_bounds: &[[f32; 4]],
    ) -> Result<()>;

    fn upload_cull_params(&mut self, params: &CullParams) -> Result<()>;

    /// Issue the cluster culling dispatch with the given work-group counts.
    /// The output buffer must be visible to later lighting-subpass reads in
    /// the same command stream.
    fn dispatch_cluster_cull(&mut self, groups: (u32, u32, u32)) -> Result<()>;

    /// Fallback path: upload index/count buffers produced by the CPU culler.
    fn upload_cpu_cull_results(&mut self, indices: &[u32], counts: &[u32]) -> Result<()>;

    /// Bind the per-cluster index buffer for the lighting subpass.
    fn bind_cluster_output(&mut self) -> Result<()>;

    /// Release transient per-frame resources. Must be safe to call on frames
    /// that exited early.
    fn release_frame_resources(&mut self);
}
