//! GPU-facing light record encoding.
//!
//! Pure data transforms from [`Light`] to the fixed-layout records the shading
//! code reads. Inputs are assumed already validated by the light-authoring
//! system; degenerate values (zero range, NaN transforms) propagate unchanged.

use super::light::Light;

/// Floor applied to `1 - cos(halfAngle)` so the angular falloff scale stays
/// finite as the spot angle approaches zero.
pub const ANGLE_RANGE_FLOOR: f32 = 0.001;

/// Opaque shadow-lookup record produced by the external shadow data binder.
///
/// Stored alongside the light record but never interpreted here.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ShadowRecord(pub [f32; 4]);

impl ShadowRecord {
    /// Record meaning "no shadow bound for this light".
    pub const NONE: Self = Self([0.0; 4]);
}

/// GPU record for one directional light.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DirectionalLightRecord {
    /// rgb = linear color, a unused
    pub color: [f32; 4],
    /// xyz = direction from surfaces toward the light, w = 0
    pub direction: [f32; 4],
    /// Opaque shadow lookup data
    pub shadow: ShadowRecord,
}

impl DirectionalLightRecord {
    /// Encode a directional light. The shadow slot is filled by the classifier.
    pub fn from_light(light: &Light) -> Self {
        let dir = light.shading_direction();
        Self {
            color: [light.color.x, light.color.y, light.color.z, 0.0],
            direction: [dir.x, dir.y, dir.z, 0.0],
            shadow: ShadowRecord::NONE,
        }
    }
}

/// GPU record for one local (point or spot) light.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct EncodedLightRecord {
    /// rgb = linear color, a unused
    pub color: [f32; 4],
    /// xyz = world position, w = 1/range^2
    pub sphere: [f32; 4],
    /// xyz = negated emission axis (zero for point lights), w = 0
    pub direction: [f32; 4],
    /// x = 1/(1-w), y = w = 1/range^2, z = angular falloff scale, w = -cos(outer) * z
    pub thresholds: [f32; 4],
    /// Opaque shadow lookup data
    pub shadow: ShadowRecord,
}

/// Shared range-attenuation term written into both `sphere.w` and
/// `thresholds.y`.
///
/// The two slots must never disagree: culling and stencil masking derive their
/// bounding geometry from the same range, and shading reads the value back
/// from either slot. One computation, two writes.
pub fn inverse_range_squared(range: f32) -> f32 {
    1.0 / (range * range)
}

impl EncodedLightRecord {
    /// Encode a point light. The shadow slot is filled by the classifier.
    pub fn from_point(light: &Light) -> Self {
        let inv_range_sq = inverse_range_squared(light.range);
        let p = light.position;
        Self {
            color: [light.color.x, light.color.y, light.color.z, 0.0],
            sphere: [p.x, p.y, p.z, inv_range_sq],
            direction: [0.0; 4],
            thresholds: [1.0 / (1.0 - inv_range_sq), inv_range_sq, 0.0, 1.0],
            shadow: ShadowRecord::NONE,
        }
    }

    /// Encode a spot light: point base plus emission axis and angular falloff.
    pub fn from_spot(light: &Light) -> Self {
        let mut record = Self::from_point(light);
        let dir = light.shading_direction();
        let outer_cos = light.spot_half_angle.cos();
        let angle_range_inv = 1.0 / (1.0 - outer_cos).max(ANGLE_RANGE_FLOOR);
        record.direction = [dir.x, dir.y, dir.z, 0.0];
        record.thresholds[2] = angle_range_inv;
        record.thresholds[3] = -outer_cos * angle_range_inv;
        record
    }
}
