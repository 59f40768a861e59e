//! Frame sequencing for the deferred lighting path.
//!
//! Drives one frame end to end: classify lights, bind frame-global light
//! state, render shadow maps, run cluster culling when the cluster tier is
//! populated, run the external G-buffer pass, then issue the lighting subpass
//! draws in their fixed order. Early exits (empty G-buffer, backend errors)
//! still release both facilities' transient frame resources.

use glam::{Mat4, Quat, Vec3};

use super::backend::{
    ComputeBackend, FrameLightBinding, FullscreenShade, GBufferStatus, LightVolumeDraw,
    RasterBackend, ShadowBinder, StencilVolumePass, VolumeShape,
};
use super::classify::{FrameLightSet, LightClassifier};
use super::cluster_cull::{CameraParams, ClusterCullingPass};
use super::encode::EncodedLightRecord;
use super::light::{Light, LightKind};
use crate::config::{LightBudget, CONE_MESH_REFERENCE_ANGLE_DEG};
use crate::Result;

/// Frame progress marker, advanced in order and reset at the start of the
/// next frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameState {
    Idle,
    Classified,
    ClusterCulled,
    GBufferRendered,
    Lit,
    Done,
}

/// Owns the classifier and culling pass and sequences them every frame.
pub struct LightingOrchestrator {
    classifier: LightClassifier,
    cluster_pass: ClusterCullingPass,
    state: FrameState,
}

impl LightingOrchestrator {
    pub fn new() -> Self {
        Self::with_budget(LightBudget::default())
    }

    pub fn with_budget(budget: LightBudget) -> Self {
        Self {
            classifier: LightClassifier::with_budget(budget),
            cluster_pass: ClusterCullingPass::new(),
            state: FrameState::Idle,
        }
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    /// The most recent frame's classification result.
    pub fn frame_lights(&self) -> &FrameLightSet {
        self.classifier.frame_lights()
    }

    /// Run light setup and the lighting subpass for one frame.
    ///
    /// On any outcome, transient frame resources of both facilities are
    /// released before returning.
    #[allow(clippy::too_many_arguments)]
    pub fn render_frame(
        &mut self,
        lights: &[Light],
        camera: &CameraParams,
        width: u32,
        height: u32,
        shadows: &mut dyn ShadowBinder,
        raster: &mut dyn RasterBackend,
        compute: &mut dyn ComputeBackend,
    ) -> Result<()> {
        self.state = FrameState::Idle;
        let result = Self::run_frame(
            &mut self.classifier,
            &mut self.cluster_pass,
            &mut self.state,
            lights,
            camera,
            width,
            height,
            shadows,
            raster,
            compute,
        );
        raster.release_frame_resources();
        compute.release_frame_resources();
        if result.is_ok() {
            self.state = FrameState::Done;
        }
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn run_frame(
        classifier: &mut LightClassifier,
        cluster_pass: &mut ClusterCullingPass,
        state: &mut FrameState,
        lights: &[Light],
        camera: &CameraParams,
        width: u32,
        height: u32,
        shadows: &mut dyn ShadowBinder,
        raster: &mut dyn RasterBackend,
        compute: &mut dyn ComputeBackend,
    ) -> Result<()> {
        let set = classifier.classify(lights, shadows);
        *state = FrameState::Classified;
        log::trace!(
            "frame lights: {} directional, {} stencil, {} cluster",
            set.directional_count(),
            set.stencil_count(),
            set.cluster_count()
        );

        raster.bind_frame_lights(&FrameLightBinding {
            directional: set.directional_records(),
            stencil: set.stencil_records(),
            cluster: set.cluster_records(),
            flags: set.flags(),
        })?;

        shadows.render(set.used_shadow_mask())?;

        if set.cluster_count() > 0 {
            cluster_pass.dispatch(set, camera, width, height, compute)?;
            *state = FrameState::ClusterCulled;
        }

        match raster.render_gbuffer()? {
            GBufferStatus::Rendered => {}
            GBufferStatus::Skipped => return Ok(()),
        }
        *state = FrameState::GBufferRendered;

        Self::lit_pass(set, camera, raster)?;
        *state = FrameState::Lit;
        Ok(())
    }

    /// Issue the lighting subpass draws in their fixed order.
    fn lit_pass(
        set: &FrameLightSet,
        camera: &CameraParams,
        raster: &mut dyn RasterBackend,
    ) -> Result<()> {
        if set.directional_count() > 0 {
            raster.draw_fullscreen(FullscreenShade::DirectionalAmbient)?;
        }

        for (slot, (light, record)) in set
            .stencil_sources()
            .iter()
            .zip(set.stencil_records())
            .enumerate()
        {
            for draw in stencil_volume_draws(light, record, camera) {
                raster.draw_light_volume(&draw)?;
            }
            raster.draw_fullscreen(FullscreenShade::StencilLight(slot))?;
        }

        if set.cluster_count() > 0 {
            raster.draw_fullscreen(FullscreenShade::ClusterResolve)?;
        }
        Ok(())
    }
}

impl Default for LightingOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

/// Bounding-volume draw sequence for one stencil-tier light.
///
/// When the camera is safely outside the volume a single always-write draw
/// suffices. When it may be inside (including the near plane cutting the
/// volume), back faces and front faces are written in separate draws so the
/// mask stays correct regardless of camera containment.
fn stencil_volume_draws(
    light: &Light,
    record: &EncodedLightRecord,
    camera: &CameraParams,
) -> Vec<LightVolumeDraw> {
    let (shape, transform) = light_volume_transform(light);
    let center = Vec3::new(record.sphere[0], record.sphere[1], record.sphere[2]);
    let dist_sq = camera.position.distance_squared(center);
    let mut camera_outside = dist_sq > light.range * light.range - camera.near;

    // A spot's lit volume is the cone, not the whole sphere; a camera inside
    // the sphere but outside the cone still gets the cheap single draw.
    if !camera_outside && light.kind == LightKind::Spot {
        let to_camera = (camera.position - center).normalize_or_zero();
        let angular = (1.0 - to_camera.dot(light.forward())) * record.thresholds[2];
        camera_outside = angular >= 1.0;
    }

    if camera_outside {
        vec![LightVolumeDraw {
            shape,
            transform,
            stencil: StencilVolumePass::WriteAlways,
        }]
    } else {
        vec![
            LightVolumeDraw {
                shape,
                transform,
                stencil: StencilVolumePass::WriteBackFaces,
            },
            LightVolumeDraw {
                shape,
                transform,
                stencil: StencilVolumePass::WriteFrontFaces,
            },
        ]
    }
}

/// World transform scaling a unit bounding mesh over the light's volume.
///
/// The cone mesh is authored for a reference half-angle; wider or narrower
/// spots scale its base linearly with the angle ratio.
fn light_volume_transform(light: &Light) -> (VolumeShape, Mat4) {
    match light.kind {
        LightKind::Spot => {
            // The reference mesh is authored for a full cone angle.
            let angle_scale =
                light.spot_half_angle.to_degrees() * 2.0 / CONE_MESH_REFERENCE_ANGLE_DEG;
            let scale = Vec3::new(
                light.range * angle_scale,
                light.range * angle_scale,
                light.range,
            );
            (
                VolumeShape::Cone,
                Mat4::from_scale_rotation_translation(scale, light.orientation, light.position),
            )
        }
        _ => (
            VolumeShape::Sphere,
            Mat4::from_scale_rotation_translation(
                Vec3::splat(light.range),
                Quat::IDENTITY,
                light.position,
            ),
        ),
    }
}
