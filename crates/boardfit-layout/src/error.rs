#![forbid(unsafe_code)]

//! Layout computation errors.

use std::fmt;

use boardfit_core::geometry::GeometryError;

use crate::control::ControlId;

/// Rejected optimizer input or output.
///
/// Every variant is a calculation error: the caller substitutes the fixed
/// default plan ([`LayoutPlan::fallback`](crate::LayoutPlan::fallback)).
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// The viewport had a non-finite or non-positive extent.
    InvalidViewport(GeometryError),
    /// A control reported an unusable size.
    InvalidControl { id: ControlId, source: GeometryError },
    /// The requested board aspect ratio was not finite and positive.
    InvalidAspect(f64),
    /// A produced rect failed validation.
    InvalidOutput { what: String, source: GeometryError },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidViewport(err) => write!(f, "invalid viewport: {err}"),
            Self::InvalidControl { id, source } => write!(f, "invalid size for {id}: {source}"),
            Self::InvalidAspect(aspect) => write!(f, "invalid board aspect ratio {aspect}"),
            Self::InvalidOutput { what, source } => write!(f, "computed {what} is invalid: {source}"),
        }
    }
}

impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidViewport(err) => Some(err),
            Self::InvalidControl { source, .. } | Self::InvalidOutput { source, .. } => Some(source),
            Self::InvalidAspect(_) => None,
        }
    }
}
