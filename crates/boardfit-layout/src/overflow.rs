#![forbid(unsafe_code)]

//! Scroll-region packaging for overflowing controls.
//!
//! The optimizer only decides *which* controls overflow; building the actual
//! scrollable container is the host's job, behind [`OverflowPackager`].

use crate::control::ControlId;
use crate::plan::{LayoutPlan, OverflowGroup};

/// Opaque handle to a host-created scroll region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScrollRegionHandle(pub u64);

/// Wraps a group of controls into a bounded scrollable region.
pub trait OverflowPackager {
    fn wrap(&mut self, controls: &[ControlId], max_height: f64) -> ScrollRegionHandle;
}

/// Wrap every overflow group of `plan`. Returns one handle per group, in
/// order; empty when the plan does not scroll.
pub fn package_overflow<P: OverflowPackager + ?Sized>(
    packager: &mut P,
    plan: &LayoutPlan,
) -> Vec<(OverflowGroup, ScrollRegionHandle)> {
    if !plan.requires_scrolling() {
        return Vec::new();
    }
    plan.overflow_groups()
        .iter()
        .map(|group| {
            let handle = packager.wrap(&group.controls, group.max_height());
            (group.clone(), handle)
        })
        .collect()
}

/// Packager that records every call; handles are sequential.
#[derive(Debug, Clone, Default)]
pub struct RecordingPackager {
    calls: Vec<(Vec<ControlId>, f64)>,
    next: u64,
}

impl RecordingPackager {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(controls, max_height)` per `wrap` call, oldest first.
    pub fn calls(&self) -> &[(Vec<ControlId>, f64)] {
        &self.calls
    }
}

impl OverflowPackager for RecordingPackager {
    fn wrap(&mut self, controls: &[ControlId], max_height: f64) -> ScrollRegionHandle {
        self.calls.push((controls.to_vec(), max_height));
        let handle = ScrollRegionHandle(self.next);
        self.next += 1;
        handle
    }
}
