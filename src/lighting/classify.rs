//! Per-frame light classification.
//!
//! Walks the visible-light list once and assigns every light to a tier:
//! directional lights get the full-screen pass, the first local lights within
//! budget get the per-light stencil technique, the rest fall into the
//! clustered pass, and anything beyond capacity is dropped for the frame.
//! Assignment is strictly first-come-first-served in input order; there is no
//! intensity or distance heuristic, so tier membership is deterministic for a
//! given input order.

use super::backend::ShadowBinder;
use super::bounds::ClusterBounds;
use super::encode::{DirectionalLightRecord, EncodedLightRecord};
use super::light::{BakeMode, Light, LightKind};
use crate::config::LightBudget;

/// Lighting technique assigned to a light for one frame.
///
/// `Rejected` covers both over-budget lights and fully baked lights.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightTier {
    Directional,
    Stencil,
    Cluster,
    Rejected,
}

/// Shader-path toggles, recomputed from counts every frame.
///
/// Both fields are always written, on or off, so a frame with no lights of a
/// kind cannot inherit an enabled path from the previous frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LightingFlags {
    pub directional_enabled: bool,
    pub cluster_enabled: bool,
}

/// The full classification result for one frame.
///
/// Storage is reused across frames (cleared, never shrunk) to avoid per-frame
/// allocation; every consumer reads at most `count` entries of each arena, so
/// stale entries from a previous frame are never observable.
pub struct FrameLightSet {
    directional: Vec<DirectionalLightRecord>,
    stencil: Vec<EncodedLightRecord>,
    stencil_sources: Vec<Light>,
    cluster: Vec<EncodedLightRecord>,
    cluster_bounds: Vec<ClusterBounds>,
    tiers: Vec<LightTier>,
    used_shadow_mask: bool,
}

impl FrameLightSet {
    fn with_budget(budget: &LightBudget) -> Self {
        Self {
            directional: Vec::with_capacity(budget.max_directional),
            stencil: Vec::with_capacity(budget.max_stencil),
            stencil_sources: Vec::with_capacity(budget.max_stencil),
            cluster: Vec::with_capacity(budget.max_cluster),
            cluster_bounds: Vec::with_capacity(budget.max_cluster),
            tiers: Vec::new(),
            used_shadow_mask: false,
        }
    }

    fn reset(&mut self) {
        self.directional.clear();
        self.stencil.clear();
        self.stencil_sources.clear();
        self.cluster.clear();
        self.cluster_bounds.clear();
        self.tiers.clear();
        self.used_shadow_mask = false;
    }

    pub fn directional_records(&self) -> &[DirectionalLightRecord] {
        &self.directional
    }

    pub fn stencil_records(&self) -> &[EncodedLightRecord] {
        &self.stencil
    }

    /// Source lights for stencil-tier slots; the orchestrator needs their
    /// shape data to build bounding-volume transforms.
    pub fn stencil_sources(&self) -> &[Light] {
        &self.stencil_sources
    }

    pub fn cluster_records(&self) -> &[EncodedLightRecord] {
        &self.cluster
    }

    pub fn cluster_bounds(&self) -> &[ClusterBounds] {
        &self.cluster_bounds
    }

    pub fn directional_count(&self) -> usize {
        self.directional.len()
    }

    pub fn stencil_count(&self) -> usize {
        self.stencil.len()
    }

    pub fn cluster_count(&self) -> usize {
        self.cluster.len()
    }

    /// Tier assigned to each input light, in input order.
    pub fn tiers(&self) -> &[LightTier] {
        &self.tiers
    }

    /// True when any visible light is a shadow-mask mixed light.
    pub fn used_shadow_mask(&self) -> bool {
        self.used_shadow_mask
    }

    /// Shader-path toggles for this frame, derived from the tier counts.
    pub fn flags(&self) -> LightingFlags {
        LightingFlags {
            directional_enabled: !self.directional.is_empty(),
            cluster_enabled: !self.cluster.is_empty(),
        }
    }
}

/// Single-pass, order-preserving light classifier.
pub struct LightClassifier {
    budget: LightBudget,
    set: FrameLightSet,
}

impl LightClassifier {
    pub fn new() -> Self {
        Self::with_budget(LightBudget::default())
    }

    pub fn with_budget(budget: LightBudget) -> Self {
        Self {
            set: FrameLightSet::with_budget(&budget),
            budget,
        }
    }

    pub fn budget(&self) -> &LightBudget {
        &self.budget
    }

    /// Last frame's classification result.
    pub fn frame_lights(&self) -> &FrameLightSet {
        &self.set
    }

    /// Classify the frame's visible lights into tiers.
    ///
    /// Capacity overflow is silent truncation: excess lights simply do not
    /// light the scene this frame. Shadow data is requested for every light
    /// that lands in a tier, keyed by its tier-local slot.
    pub fn classify(&mut self, lights: &[Light], shadows: &mut dyn ShadowBinder) -> &FrameLightSet {
        let set = &mut self.set;
        set.reset();

        let mut warned_directional = false;
        let mut warned_local = false;

        for light in lights {
            if set.directional.len() >= self.budget.max_directional
                && set.stencil.len() >= self.budget.max_stencil
                && set.cluster.len() >= self.budget.max_cluster
            {
                // Every budget is exhausted; the rest of the list cannot change
                // the result.
                break;
            }

            if let BakeMode::Mixed { shadow_mask: true } = light.bake_mode {
                set.used_shadow_mask = true;
            }
            if light.bake_mode == BakeMode::Baked {
                set.tiers.push(LightTier::Rejected);
                continue;
            }

            let tier = match light.kind {
                LightKind::Directional => {
                    if set.directional.len() < self.budget.max_directional {
                        let slot = set.directional.len();
                        let mut record = DirectionalLightRecord::from_light(light);
                        record.shadow = shadows.bind_directional(light.handle, slot);
                        set.directional.push(record);
                        LightTier::Directional
                    } else {
                        if !warned_directional {
                            log::warn!(
                                "directional light budget ({}) exceeded; dropping excess lights",
                                self.budget.max_directional
                            );
                            warned_directional = true;
                        }
                        LightTier::Rejected
                    }
                }
                LightKind::Point | LightKind::Spot => {
                    let record = match light.kind {
                        LightKind::Point => EncodedLightRecord::from_point(light),
                        _ => EncodedLightRecord::from_spot(light),
                    };
                    if set.stencil.len() < self.budget.max_stencil {
                        let slot = set.stencil.len();
                        let mut record = record;
                        record.shadow = shadows.bind_local(light.handle, LightTier::Stencil, slot);
                        set.stencil.push(record);
                        set.stencil_sources.push(*light);
                        LightTier::Stencil
                    } else if set.cluster.len() < self.budget.max_cluster {
                        let slot = set.cluster.len();
                        let mut record = record;
                        record.shadow = shadows.bind_local(light.handle, LightTier::Cluster, slot);
                        let bounds = match light.kind {
                            LightKind::Point => ClusterBounds::from_point(light),
                            _ => ClusterBounds::from_spot(light),
                        };
                        set.cluster.push(record);
                        set.cluster_bounds.push(bounds);
                        LightTier::Cluster
                    } else {
                        if !warned_local {
                            log::warn!(
                                "local light budget ({}) exceeded; dropping excess lights",
                                self.budget.max_total_local()
                            );
                            warned_local = true;
                        }
                        LightTier::Rejected
                    }
                }
            };
            set.tiers.push(tier);
        }

        // Lights skipped by the early exit were never shaded.
        set.tiers.resize(lights.len(), LightTier::Rejected);

        &self.set
    }
}

impl Default for LightClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lighting::backend::NoShadows;
    use crate::lighting::encode::ShadowRecord;
    use crate::lighting::light::LightHandle;
    use glam::{Quat, Vec3};

    fn point(id: u32) -> Light {
        Light::point(LightHandle(id), Vec3::splat(id as f32), 5.0, Vec3::ONE)
    }

    fn small_budget() -> LightBudget {
        LightBudget {
            max_directional: 1,
            max_stencil: 2,
            max_cluster: 3,
        }
    }

    #[test]
    fn test_empty_frame() {
        let mut classifier = LightClassifier::new();
        let set = classifier.classify(&[], &mut NoShadows);
        assert_eq!(set.directional_count(), 0);
        assert_eq!(set.stencil_count(), 0);
        assert_eq!(set.cluster_count(), 0);
        assert!(!set.flags().directional_enabled);
        assert!(!set.flags().cluster_enabled);
        assert!(!set.used_shadow_mask());
    }

    #[test]
    fn test_first_come_tier_assignment() {
        let mut classifier = LightClassifier::with_budget(small_budget());
        let lights: Vec<Light> = (0..7).map(point).collect();
        let set = classifier.classify(&lights, &mut NoShadows);

        assert_eq!(set.stencil_count(), 2);
        assert_eq!(set.cluster_count(), 3);
        assert_eq!(
            set.tiers(),
            &[
                LightTier::Stencil,
                LightTier::Stencil,
                LightTier::Cluster,
                LightTier::Cluster,
                LightTier::Cluster,
                LightTier::Rejected,
                LightTier::Rejected,
            ]
        );
        // Slot order follows input order.
        assert_eq!(set.stencil_sources()[0].handle, LightHandle(0));
        assert_eq!(set.stencil_sources()[1].handle, LightHandle(1));
        assert_eq!(set.cluster_records()[0].sphere[0], 2.0);
    }

    #[test]
    fn test_capacity_invariant_holds_for_any_input() {
        let budget = small_budget();
        let mut classifier = LightClassifier::with_budget(budget);
        let mut lights: Vec<Light> = (0..100).map(point).collect();
        lights.push(Light::directional(LightHandle(100), Quat::IDENTITY, Vec3::ONE));
        lights.push(Light::directional(LightHandle(101), Quat::IDENTITY, Vec3::ONE));

        let set = classifier.classify(&lights, &mut NoShadows);
        assert!(set.directional_count() <= budget.max_directional);
        assert!(set.stencil_count() <= budget.max_stencil);
        assert!(set.cluster_count() <= budget.max_cluster);
    }

    #[test]
    fn test_tier_exclusivity() {
        let mut classifier = LightClassifier::with_budget(small_budget());
        let lights: Vec<Light> = (0..6).map(point).collect();
        let set = classifier.classify(&lights, &mut NoShadows);
        let shaded = set
            .tiers()
            .iter()
            .filter(|t| **t != LightTier::Rejected)
            .count();
        assert_eq!(shaded, set.stencil_count() + set.cluster_count());
    }

    #[test]
    fn test_baked_light_is_skipped() {
        let mut baked = point(0);
        baked.bake_mode = BakeMode::Baked;
        let mut classifier = LightClassifier::new();
        let set = classifier.classify(&[baked], &mut NoShadows);
        assert_eq!(set.stencil_count(), 0);
        assert_eq!(set.tiers(), &[LightTier::Rejected]);
        assert!(!set.used_shadow_mask());
    }

    #[test]
    fn test_shadow_mask_flag() {
        let mut mixed = point(0);
        mixed.bake_mode = BakeMode::Mixed { shadow_mask: true };
        let mut classifier = LightClassifier::new();
        let set = classifier.classify(&[mixed], &mut NoShadows);
        assert!(set.used_shadow_mask());
        assert_eq!(set.stencil_count(), 1);
    }

    #[test]
    fn test_arena_reuse_leaves_no_stale_entries() {
        let mut classifier = LightClassifier::with_budget(small_budget());
        let many: Vec<Light> = (0..6).map(point).collect();
        classifier.classify(&many, &mut NoShadows);

        let one = [point(42)];
        let set = classifier.classify(&one, &mut NoShadows);
        assert_eq!(set.stencil_count(), 1);
        assert_eq!(set.cluster_count(), 0);
        assert_eq!(set.stencil_records().len(), 1);
        assert_eq!(set.stencil_sources()[0].handle, LightHandle(42));
    }

    #[test]
    fn test_shadow_binder_receives_tier_local_slots() {
        struct Recorder(Vec<(u32, LightTier, usize)>);
        impl ShadowBinder for Recorder {
            fn bind_directional(&mut self, handle: LightHandle, slot: usize) -> ShadowRecord {
                self.0.push((handle.0, LightTier::Directional, slot));
                ShadowRecord::NONE
            }
            fn bind_local(
                &mut self,
                handle: LightHandle,
                tier: LightTier,
                slot: usize,
            ) -> ShadowRecord {
                self.0.push((handle.0, tier, slot));
                ShadowRecord::NONE
            }
            fn render(&mut self, _used_shadow_mask: bool) -> crate::Result<()> {
                Ok(())
            }
        }

        let mut recorder = Recorder(Vec::new());
        let mut classifier = LightClassifier::with_budget(small_budget());
        let lights: Vec<Light> = (0..4).map(point).collect();
        classifier.classify(&lights, &mut recorder);

        assert_eq!(
            recorder.0,
            vec![
                (0, LightTier::Stencil, 0),
                (1, LightTier::Stencil, 1),
                (2, LightTier::Cluster, 0),
                (3, LightTier::Cluster, 1),
            ]
        );
    }
}
