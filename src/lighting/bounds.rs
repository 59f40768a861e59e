//! World-space bounds for cluster-tier lights.
//!
//! The cluster culling pass bins lights by axis-aligned bounds. Bounds must be
//! conservative: a box that misses part of the light's volume produces visible
//! culling artifacts, an oversized box only costs shading time.

use glam::Vec3;

use super::light::Light;

/// Axis-aligned min/max bounds in the cluster grid's space (world space).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClusterBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl ClusterBounds {
    /// Bounding box of a point light's influence sphere.
    pub fn from_point(light: &Light) -> Self {
        let extent = Vec3::splat(light.range);
        Self {
            min: light.position - extent,
            max: light.position + extent,
        }
    }

    /// Bounding box of a spot light's 5-point cone approximation: the apex
    /// plus four extrema of the base circle.
    pub fn from_spot(light: &Light) -> Self {
        let forward = light.forward();
        let up = light.orientation * Vec3::Y;
        let right = light.orientation * Vec3::X;

        let sin_range = light.spot_half_angle.sin() * light.range;
        let apex = light.position;
        let base = apex + forward * light.range;
        let upward = up * sin_range;
        let rightward = right * sin_range;

        let p1 = base + upward + rightward;
        let p2 = base + upward - rightward;
        let p3 = base - upward + rightward;
        let p4 = base - upward - rightward;

        Self {
            min: apex.min(p1).min(p2).min(p3).min(p4),
            max: apex.max(p1).max(p2).max(p3).max(p4),
        }
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lighting::light::LightHandle;
    use glam::Quat;

    #[test]
    fn test_point_bounds_are_sphere_box() {
        let light = Light::point(LightHandle(0), Vec3::new(1.0, -2.0, 3.0), 4.0, Vec3::ONE);
        let bounds = ClusterBounds::from_point(&light);
        assert_eq!(bounds.min, Vec3::new(-3.0, -6.0, -1.0));
        assert_eq!(bounds.max, Vec3::new(5.0, 2.0, 7.0));
    }

    #[test]
    fn test_spot_bounds_contain_cone_points() {
        let orientation = Quat::from_rotation_x(-0.7) * Quat::from_rotation_y(0.3);
        let light = Light::spot(
            LightHandle(0),
            Vec3::new(2.0, 5.0, -1.0),
            orientation,
            12.0,
            40f32.to_radians(),
            Vec3::ONE,
        );
        let bounds = ClusterBounds::from_spot(&light);

        let forward = light.forward();
        let up = light.orientation * Vec3::Y;
        let right = light.orientation * Vec3::X;
        let sin_range = light.spot_half_angle.sin() * light.range;
        let base = light.position + forward * light.range;

        let slop = Vec3::splat(1e-4);
        let grown = ClusterBounds {
            min: bounds.min - slop,
            max: bounds.max + slop,
        };
        assert!(grown.contains_point(light.position));
        for (su, sr) in [(1.0, 1.0), (1.0, -1.0), (-1.0, 1.0), (-1.0, -1.0)] {
            let p = base + up * (sin_range * su) + right * (sin_range * sr);
            assert!(grown.contains_point(p), "extremum {p:?} outside {bounds:?}");
        }
    }

    #[test]
    fn test_spot_bounds_tighter_than_sphere() {
        // A narrow forward-facing cone should not span the full sphere box.
        let light = Light::spot(
            LightHandle(0),
            Vec3::ZERO,
            Quat::IDENTITY,
            10.0,
            10f32.to_radians(),
            Vec3::ONE,
        );
        let bounds = ClusterBounds::from_spot(&light);
        assert!(bounds.max.x < 10.0 * 0.5);
        assert!(bounds.min.z >= 0.0);
        assert!(bounds.max.z <= 10.0 + 1e-4);
    }
}
