#![forbid(unsafe_code)]

//! Memoization of computed layout plans.
//!
//! [`LayoutCache`] maps the optimizer's inputs to the plan it produced, keeps
//! the last plan handed to the renderer, and remembers each control's last
//! measured size.
//!
//! # Invalidation
//!
//! - Wholesale: [`LayoutCache::invalidate_all`] bumps the generation, making
//!   every entry stale. The monitor calls it on orientation change.
//! - Per control: [`LayoutCache::record_measurement`] drops every entry that
//!   laid out a control whose measured size changed.
//!
//! Viewport resizes need no invalidation; the viewport is part of the key.
//!
//! # Eviction
//!
//! Least-used entry first once `max_entries` is reached.

use std::hash::{Hash, Hasher};

use boardfit_core::geometry::{Dimensions, ViewportInfo};
use boardfit_core::logging::TARGET_CACHE;
use rustc_hash::{FxHashMap, FxHasher};

use crate::control::{ControlId, ControlSpec};
use crate::plan::LayoutPlan;

/// Default entry capacity.
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Everything the optimizer's output depends on, by exact bit pattern.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct LayoutCacheKey {
    pub width_bits: u64,
    pub height_bits: u64,
    pub aspect_bits: u64,
    /// Fingerprint of control ids and sizes, in order.
    pub controls_hash: u64,
}

impl LayoutCacheKey {
    pub fn new(viewport: &ViewportInfo, controls: &[ControlSpec], board_aspect: f64) -> Self {
        Self {
            width_bits: viewport.width().to_bits(),
            height_bits: viewport.height().to_bits(),
            aspect_bits: board_aspect.to_bits(),
            controls_hash: Self::hash_controls(controls),
        }
    }

    fn hash_controls(controls: &[ControlSpec]) -> u64 {
        let mut hasher = FxHasher::default();
        controls.len().hash(&mut hasher);
        for c in controls {
            c.id.hash(&mut hasher);
            c.size.w.to_bits().hash(&mut hasher);
            c.size.h.to_bits().hash(&mut hasher);
        }
        hasher.finish()
    }
}

#[derive(Clone, Debug)]
struct CachedPlan {
    plan: LayoutPlan,
    controls: Vec<ControlId>,
    generation: u64,
    access_count: u32,
}

/// Statistics about cache effectiveness.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutCacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    /// Hits over lookups, 0.0 when nothing was looked up.
    pub hit_rate: f64,
    /// Entries dropped because a control was re-measured with a new size.
    pub measurement_invalidations: u64,
    /// Wholesale invalidations.
    pub generation_bumps: u64,
}

/// Single-owner plan cache.
#[derive(Debug)]
pub struct LayoutCache {
    entries: FxHashMap<LayoutCacheKey, CachedPlan>,
    measured: FxHashMap<ControlId, Dimensions>,
    last_applied: Option<LayoutPlan>,
    generation: u64,
    max_entries: usize,
    hits: u64,
    misses: u64,
    measurement_invalidations: u64,
    generation_bumps: u64,
}

impl LayoutCache {
    /// Create a cache holding at most `max_entries` plans (at least one).
    pub fn new(max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            entries: FxHashMap::with_capacity_and_hasher(max_entries, Default::default()),
            measured: FxHashMap::default(),
            last_applied: None,
            generation: 0,
            max_entries,
            hits: 0,
            misses: 0,
            measurement_invalidations: 0,
            generation_bumps: 0,
        }
    }

    /// Look up a plan computed for `key` in the current generation.
    pub fn get(&mut self, key: &LayoutCacheKey) -> Option<LayoutPlan> {
        if let Some(entry) = self.entries.get_mut(key)
            && entry.generation == self.generation
        {
            self.hits += 1;
            entry.access_count = entry.access_count.saturating_add(1);
            return Some(entry.plan.clone());
        }
        self.misses += 1;
        None
    }

    /// Store a freshly computed plan.
    pub fn insert(&mut self, key: LayoutCacheKey, plan: LayoutPlan) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.evict_lru();
        }
        let controls = plan.controls().iter().map(|c| c.id).collect();
        self.entries.insert(
            key,
            CachedPlan {
                plan,
                controls,
                generation: self.generation,
                access_count: 1,
            },
        );
    }

    /// Stale every entry.
    pub fn invalidate_all(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.generation_bumps += 1;
        boardfit_core::debug!(
            target: TARGET_CACHE,
            generation = self.generation,
            "layout cache invalidated"
        );
    }

    /// Record a control's freshly measured size.
    ///
    /// If it differs from the previous measurement, every entry that placed
    /// this control is dropped. Returns the number of dropped entries.
    pub fn record_measurement(&mut self, id: ControlId, size: Dimensions) -> usize {
        let changed = match self.measured.insert(id, size) {
            Some(prev) => prev != size,
            None => false,
        };
        if !changed {
            return 0;
        }
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.controls.contains(&id));
        let dropped = before - self.entries.len();
        self.measurement_invalidations += dropped as u64;
        if dropped > 0 {
            boardfit_core::debug!(
                target: TARGET_CACHE,
                id = id.get(),
                dropped,
                "control resized, cached plans dropped"
            );
        }
        dropped
    }

    /// Last measured size of a control.
    pub fn measurement(&self, id: ControlId) -> Option<Dimensions> {
        self.measured.get(&id).copied()
    }

    /// Remember the plan most recently handed to the renderer.
    pub fn set_last_applied(&mut self, plan: LayoutPlan) {
        self.last_applied = Some(plan);
    }

    pub fn last_applied(&self) -> Option<&LayoutPlan> {
        self.last_applied.as_ref()
    }

    pub fn stats(&self) -> LayoutCacheStats {
        let total = self.hits + self.misses;
        LayoutCacheStats {
            entries: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
            hit_rate: if total > 0 {
                self.hits as f64 / total as f64
            } else {
                0.0
            },
            measurement_invalidations: self.measurement_invalidations,
            generation_bumps: self.generation_bumps,
        }
    }

    /// Drop all entries and measurements.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.measured.clear();
        self.last_applied = None;
        self.generation = self.generation.wrapping_add(1);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    fn evict_lru(&mut self) {
        // Stale entries go first.
        let generation = self.generation;
        if let Some(key) = self
            .entries
            .iter()
            .min_by_key(|(_, e)| (e.generation == generation, e.access_count))
            .map(|(k, _)| *k)
        {
            self.entries.remove(&key);
        }
    }
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
