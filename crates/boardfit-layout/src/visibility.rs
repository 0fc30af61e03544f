#![forbid(unsafe_code)]

//! Outside-viewport control detection.
//!
//! The optimizer only lays out controls that would otherwise leave the
//! viewport. A [`VisibilitySource`] reports that set on demand; the monitor
//! calls [`refresh`](VisibilitySource::refresh) with the new viewport and
//! then pulls [`outside_viewport_controls`](VisibilitySource::outside_viewport_controls).
//!
//! # Invariants
//!
//! 1. Reported controls keep registration order.
//! 2. A control id is reported at most once.
//! 3. [`GeometricVisibility`] reports a control iff its rect is not fully
//!    inside the last refreshed viewport.

use boardfit_core::geometry::{Rectangle, ViewportInfo};

use crate::control::{ControlId, ControlSpec};

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Pull interface for the outside-viewport control set.
pub trait VisibilitySource {
    /// Controls currently outside the viewport, in order.
    fn outside_viewport_controls(&self) -> Vec<ControlSpec>;

    /// Re-evaluate membership for a new viewport.
    fn refresh(&mut self, viewport: &ViewportInfo);
}

impl<T: VisibilitySource + ?Sized> VisibilitySource for Box<T> {
    fn outside_viewport_controls(&self) -> Vec<ControlSpec> {
        (**self).outside_viewport_controls()
    }

    fn refresh(&mut self, viewport: &ViewportInfo) {
        (**self).refresh(viewport);
    }
}

// ---------------------------------------------------------------------------
// Static
// ---------------------------------------------------------------------------

/// A fixed set, reported regardless of the viewport.
#[derive(Debug, Clone, Default)]
pub struct StaticVisibility {
    controls: Vec<ControlSpec>,
}

impl StaticVisibility {
    pub fn new(controls: impl IntoIterator<Item = ControlSpec>) -> Self {
        Self {
            controls: controls.into_iter().collect(),
        }
    }

    /// Replace the reported set.
    pub fn set(&mut self, controls: impl IntoIterator<Item = ControlSpec>) {
        self.controls = controls.into_iter().collect();
    }
}

impl VisibilitySource for StaticVisibility {
    fn outside_viewport_controls(&self) -> Vec<ControlSpec> {
        self.controls.clone()
    }

    fn refresh(&mut self, _viewport: &ViewportInfo) {}
}

// ---------------------------------------------------------------------------
// Geometric
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Tracked {
    spec: ControlSpec,
    home: Rectangle,
    outside: bool,
}

/// Tracks each control's home rect (where the page would put it without
/// intervention) and reports the ones the viewport does not fully contain.
#[derive(Debug, Clone, Default)]
pub struct GeometricVisibility {
    tracked: Vec<Tracked>,
}

impl GeometricVisibility {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a control, or update its home rect if already tracked.
    /// The size reported to the optimizer follows the rect's extents.
    pub fn track(&mut self, id: ControlId, home: Rectangle) {
        let spec = ControlSpec {
            id,
            size: home.size(),
        };
        match self.tracked.iter_mut().find(|t| t.spec.id == id) {
            Some(t) => {
                t.spec = spec;
                t.home = home;
            }
            None => self.tracked.push(Tracked {
                spec,
                home,
                outside: false,
            }),
        }
    }

    /// Stop tracking a control. Returns whether it was tracked.
    pub fn untrack(&mut self, id: ControlId) -> bool {
        let before = self.tracked.len();
        self.tracked.retain(|t| t.spec.id != id);
        before != self.tracked.len()
    }

    /// Home rect of a tracked control.
    pub fn home_rect(&self, id: ControlId) -> Option<Rectangle> {
        self.tracked.iter().find(|t| t.spec.id == id).map(|t| t.home)
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }
}

impl VisibilitySource for GeometricVisibility {
    fn outside_viewport_controls(&self) -> Vec<ControlSpec> {
        self.tracked
            .iter()
            .filter(|t| t.outside)
            .map(|t| t.spec)
            .collect()
    }

    fn refresh(&mut self, viewport: &ViewportInfo) {
        for t in &mut self.tracked {
            t.outside = !viewport.contains(&t.home);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_reports_fixed_set() {
        let set = [ControlSpec::new(ControlId::new(3), 10.0, 10.0)];
        let mut vis = StaticVisibility::new(set);
        vis.refresh(&ViewportInfo::new(3840.0, 2160.0).unwrap());
        assert_eq!(vis.outside_viewport_controls(), set.to_vec());
    }

    #[test]
    fn geometric_reports_controls_past_edges() {
        let mut vis = GeometricVisibility::new();
        vis.track(ControlId::new(1), Rectangle::new(10.0, 10.0, 100.0, 40.0));
        vis.track(ControlId::new(2), Rectangle::new(900.0, 10.0, 200.0, 40.0));
        vis.track(ControlId::new(3), Rectangle::new(10.0, 700.0, 100.0, 40.0));

        vis.refresh(&ViewportInfo::new(1000.0, 720.0).unwrap());
        let ids: Vec<_> = vis.outside_viewport_controls().iter().map(|c| c.id.get()).collect();
        assert_eq!(ids, vec![2, 3]);

        vis.refresh(&ViewportInfo::new(1200.0, 800.0).unwrap());
        assert!(vis.outside_viewport_controls().is_empty());
    }

    #[test]
    fn track_updates_in_place() {
        let mut vis = GeometricVisibility::new();
        let id = ControlId::new(1);
        vis.track(id, Rectangle::new(0.0, 0.0, 10.0, 10.0));
        vis.track(id, Rectangle::new(5.0, 5.0, 20.0, 30.0));
        assert_eq!(vis.len(), 1);
        assert_eq!(vis.home_rect(id), Some(Rectangle::new(5.0, 5.0, 20.0, 30.0)));
        assert!(vis.untrack(id));
        assert!(!vis.untrack(id));
        assert!(vis.is_empty());
    }

    #[test]
    fn refresh_before_query_is_required() {
        let mut vis = GeometricVisibility::new();
        vis.track(ControlId::new(1), Rectangle::new(5000.0, 0.0, 10.0, 10.0));
        assert!(vis.outside_viewport_controls().is_empty());
        vis.refresh(&ViewportInfo::new(800.0, 600.0).unwrap());
        assert_eq!(vis.outside_viewport_controls().len(), 1);
    }
}
