#![forbid(unsafe_code)]

//! Control identity and measured size.

use std::fmt;

use boardfit_core::geometry::{Dimensions, GeometryError};

/// Stable identity of an auxiliary control.
///
/// Identity persists across layout cycles; only the control's rect and its
/// outside-viewport membership change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControlId(u32);

impl ControlId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "control#{}", self.0)
    }
}

/// A control as seen by the optimizer: identity plus measured size.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControlSpec {
    pub id: ControlId,
    pub size: Dimensions,
}

impl ControlSpec {
    #[inline]
    pub const fn new(id: ControlId, w: f64, h: f64) -> Self {
        Self {
            id,
            size: Dimensions::new(w, h),
        }
    }

    /// Require a finite, non-empty size.
    pub fn validate(&self) -> Result<(), GeometryError> {
        self.size.validate()
    }
}

/// Widest control, or 0 for an empty set.
pub fn max_width(controls: &[ControlSpec]) -> f64 {
    controls.iter().map(|c| c.size.w).fold(0.0, f64::max)
}

/// Tallest control, or 0 for an empty set.
pub fn max_height(controls: &[ControlSpec]) -> f64 {
    controls.iter().map(|c| c.size.h).fold(0.0, f64::max)
}
