//! # Deferred Lighting
//!
//! Per-frame light classification and hybrid deferred-lighting orchestration
//! for a real-time renderer.
//!
//! ## Features
//!
//! - **Tiered classification**: directional, stencil-masked, and clustered
//!   lighting paths with fixed per-tier budgets
//! - **GPU record encoding**: fixed-layout light records with precomputed
//!   attenuation and angular-falloff terms
//! - **Clustered culling**: 8x4 screen tiles times exponential depth slices,
//!   dispatched on compute or run on a CPU reference culler
//! - **Stencil volumes**: per-light bounding-volume masking so shading cost
//!   scales with screen coverage
//!
//! ## Quick Start
//!
//! ```ignore
//! use deferred_lighting::{CameraParams, LightingOrchestrator, NoShadows, Result};
//!
//! fn frame(orchestrator: &mut LightingOrchestrator, camera: &CameraParams) -> Result<()> {
//!     let lights = collect_visible_lights();
//!     orchestrator.render_frame(
//!         &lights, camera, 1920, 1080,
//!         &mut NoShadows, &mut raster, &mut compute,
//!     )
//! }
//! ```
//!
//! ## Architecture
//!
//! The lighting core is purely an in-memory, per-frame protocol. The G-buffer
//! pass, shadow-map rasterization, and compute execution belong to the
//! surrounding renderer and are reached through the traits in
//! [`lighting::backend`].

#![warn(clippy::all)]

mod error;

pub mod config;
pub mod lighting;

pub use error::{LightingError, Result};

pub use glam::{Mat4, Quat, Vec3};

pub use config::LightBudget;
pub use lighting::{
    BakeMode, CameraParams, ClusterBounds, ClusterCullingPass, ClusterGrid, ComputeBackend,
    CullParams, DirectionalLightRecord, EncodedLightRecord, FrameLightBinding, FrameLightSet,
    FrameState, FullscreenShade, GBufferStatus, Light, LightClassifier, LightHandle, LightKind,
    LightTier, LightVolumeDraw, LightingFlags, LightingOrchestrator, NoShadows, RasterBackend,
    ShadowBinder, ShadowRecord, StencilVolumePass, VolumeShape,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        BakeMode, CameraParams, ComputeBackend, FrameLightSet, Light, LightBudget,
        LightClassifier, LightHandle, LightKind, LightTier, LightingError, LightingFlags,
        LightingOrchestrator, NoShadows, RasterBackend, Result, ShadowBinder,
    };
}
