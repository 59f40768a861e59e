//! Global configuration constants for the deferred lighting core.

use serde::{Deserialize, Serialize};

/// Default maximum number of directional lights shaded per frame.
pub const DEFAULT_MAX_DIRECTIONAL_LIGHTS: usize = 1;

/// Default maximum number of stencil-tier local lights per frame.
pub const DEFAULT_MAX_STENCIL_LIGHTS: usize = 8;

/// Default maximum number of cluster-tier local lights per frame.
pub const DEFAULT_MAX_CLUSTER_LIGHTS: usize = 64;

/// Full spot cone angle (degrees) the stencil cone mesh is authored for.
///
/// The bounding-volume cone mesh in the rasterization facility is modeled at
/// this reference angle; the stencil pass scales its XY footprint by
/// `spot_angle / CONE_MESH_REFERENCE_ANGLE_DEG`.
pub const CONE_MESH_REFERENCE_ANGLE_DEG: f32 = 30.0;

/// Per-frame light capacity budget.
///
/// Fixed for the lifetime of the renderer; every per-tier arena is bounded by
/// these limits and lights beyond them are silently dropped for the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightBudget {
    /// Maximum directional lights per frame.
    pub max_directional: usize,
    /// Maximum stencil-tier local lights per frame.
    pub max_stencil: usize,
    /// Maximum cluster-tier local lights per frame.
    pub max_cluster: usize,
}

impl LightBudget {
    /// Combined local-light budget (stencil + cluster tiers).
    pub fn max_total_local(&self) -> usize {
        self.max_stencil + self.max_cluster
    }
}

impl Default for LightBudget {
    fn default() -> Self {
        Self {
            max_directional: DEFAULT_MAX_DIRECTIONAL_LIGHTS,
            max_stencil: DEFAULT_MAX_STENCIL_LIGHTS,
            max_cluster: DEFAULT_MAX_CLUSTER_LIGHTS,
        }
    }
}
