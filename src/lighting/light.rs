//! Scene-facing light description consumed by the classifier.
//!
//! Lights arrive here already frustum/occlusion-culled by the visible-light
//! provider; this module only describes them, it never validates them.

use glam::{Quat, Vec3};

/// Opaque handle identifying a light to the shadow data binder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LightHandle(pub u32);

/// The shape of a light source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightKind {
    Directional,
    Point,
    Spot,
}

/// How the light participates in baked lighting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BakeMode {
    /// Fully real-time light.
    Realtime,
    /// Mixed light; `shadow_mask` is true when its occlusion is baked into a
    /// shadow-mask channel.
    Mixed { shadow_mask: bool },
    /// Fully baked; contributes no real-time lighting and is skipped.
    Baked,
}

/// One visible light for the current frame.
///
/// Read-only during the frame; owned by the external scene/culling system.
#[derive(Clone, Copy, Debug)]
pub struct Light {
    pub handle: LightHandle,
    pub kind: LightKind,
    /// World-space position (unused for directional lights).
    pub position: Vec3,
    /// World-space orientation; the light emits along its local +Z axis.
    pub orientation: Quat,
    /// Influence radius for point/spot lights.
    pub range: f32,
    /// Outer cone half-angle in radians (spot lights only).
    pub spot_half_angle: f32,
    /// Linear color, intensity pre-multiplied.
    pub color: Vec3,
    pub bake_mode: BakeMode,
}

impl Light {
    /// Axis the light emits along (third basis column of its orientation).
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::Z
    }

    /// Direction used by shading code: from the light toward the scene, negated.
    pub fn shading_direction(&self) -> Vec3 {
        -self.forward()
    }

    /// Convenience constructor for a real-time directional light.
    pub fn directional(handle: LightHandle, orientation: Quat, color: Vec3) -> Self {
        Self {
            handle,
            kind: LightKind::Directional,
            position: Vec3::ZERO,
            orientation,
            range: 0.0,
            spot_half_angle: 0.0,
            color,
            bake_mode: BakeMode::Realtime,
        }
    }

    /// Convenience constructor for a real-time point light.
    pub fn point(handle: LightHandle, position: Vec3, range: f32, color: Vec3) -> Self {
        Self {
            handle,
            kind: LightKind::Point,
            position,
            orientation: Quat::IDENTITY,
            range,
            spot_half_angle: 0.0,
            color,
            bake_mode: BakeMode::Realtime,
        }
    }

    /// Convenience constructor for a real-time spot light.
    pub fn spot(
        handle: LightHandle,
        position: Vec3,
        orientation: Quat,
        range: f32,
        half_angle: f32,
        color: Vec3,
    ) -> Self {
        Self {
            handle,
            kind: LightKind::Spot,
            position,
            orientation,
            range,
            spot_half_angle: half_angle,
            color,
            bake_mode: BakeMode::Realtime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_orientation_forward() {
        let light = Light::point(LightHandle(0), Vec3::ZERO, 10.0, Vec3::ONE);
        assert_eq!(light.forward(), Vec3::Z);
        assert_eq!(light.shading_direction(), -Vec3::Z);
    }

    #[test]
    fn test_rotated_forward() {
        // Rotate the emission axis from +Z onto +X.
        let orientation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let light = Light::spot(LightHandle(1), Vec3::ZERO, orientation, 5.0, 0.5, Vec3::ONE);
        let fwd = light.forward();
        assert!((fwd - Vec3::X).length() < 1e-5);
    }
}
