//! Hybrid deferred lighting core.
//!
//! Per-frame pipeline: classify visible lights into tiers, encode them into
//! GPU records, cull cluster-tier lights against the view grid, then sequence
//! the lighting subpass draws. Shadow rendering, rasterization, and compute
//! execution stay behind the traits in [`backend`].

pub mod backend;
pub mod bounds;
pub mod classify;
pub mod cluster_cull;
pub mod cpu_cull;
pub mod encode;
pub mod light;
pub mod orchestrator;

pub use backend::{
    ComputeBackend, FrameLightBinding, FullscreenShade, GBufferStatus, LightVolumeDraw,
    NoShadows, RasterBackend, ShadowBinder, StencilVolumePass, VolumeShape,
};
pub use bounds::ClusterBounds;
pub use classify::{FrameLightSet, LightClassifier, LightTier, LightingFlags};
pub use cluster_cull::{
    CameraParams, ClusterCullingPass, ClusterGrid, CullParams, CLUSTER_TILES_X, CLUSTER_TILES_Y,
    MAX_DEPTH_SLICES, MAX_LIGHTS_PER_CLUSTER,
};
pub use encode::{DirectionalLightRecord, EncodedLightRecord, ShadowRecord, ANGLE_RANGE_FLOOR};
pub use light::{BakeMode, Light, LightHandle, LightKind};
pub use orchestrator::{FrameState, LightingOrchestrator};
