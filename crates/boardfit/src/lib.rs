#![forbid(unsafe_code)]

//! boardfit public facade crate.
//!
//! Re-exports the geometry, layout, and runtime types a host needs and
//! offers a prelude for day-to-day usage.
//!
//! ```
//! use boardfit::prelude::*;
//!
//! let viewport = ViewportInfo::new(320.0, 2160.0)?;
//! let plan = LayoutOptimizer::default().compute(&viewport, &[], 1.0)?;
//! assert_eq!(plan.board_edge(), 288.0);
//! # Ok::<(), boardfit::Error>(())
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use boardfit_core::animation::{Animation, Easing, Tween};
pub use boardfit_core::geometry::{
    Dimensions, ExtremeKind, GeometryError, Orientation, Rectangle, ViewportBounds, ViewportInfo,
};
#[cfg(feature = "tracing-json")]
pub use boardfit_core::logging::init_json_subscriber;

// --- Layout re-exports -----------------------------------------------------

pub use boardfit_layout::{
    ControlId, ControlSpec, GeometricVisibility, LayoutCache, LayoutCacheKey, LayoutError,
    LayoutOptimizer, LayoutPlan, OptimizerConfig, OverflowGroup, OverflowPackager, Panel,
    PlacedControl, PlanDiff, RecordingPackager, ScrollRegionHandle, StaticVisibility, Strategy,
    VisibilitySource,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use boardfit_runtime::{
    AnalysisState, ConfigError, ControlSurface, EngineConfig, EngineDiagnostics, EngineTick,
    ErrorCategory, ErrorLog, LayoutEngine, MemorySurface, MonitorConfig, PerformanceBudgets,
    PerformanceStats, PlacementMode, QueuePolicy, RendererState, SurfaceError, Target,
    TransitionCompletion, TransitionConfig, TransitionOutcome, TransitionRenderer,
    ViewportMonitor,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for boardfit hosts.
#[derive(Debug)]
pub enum Error {
    /// Invalid viewport or rect.
    Geometry(GeometryError),
    /// Layout computation rejected its input.
    Layout(LayoutError),
    /// Configuration could not be loaded or failed validation.
    #[cfg(feature = "runtime")]
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Geometry(err) => write!(f, "{err}"),
            Self::Layout(err) => write!(f, "{err}"),
            #[cfg(feature = "runtime")]
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Geometry(err) => Some(err),
            Self::Layout(err) => Some(err),
            #[cfg(feature = "runtime")]
            Self::Config(err) => Some(err),
        }
    }
}

impl From<GeometryError> for Error {
    fn from(err: GeometryError) -> Self {
        Self::Geometry(err)
    }
}

impl From<LayoutError> for Error {
    fn from(err: LayoutError) -> Self {
        Self::Layout(err)
    }
}

#[cfg(feature = "runtime")]
impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Standard result type for boardfit APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        ControlId, ControlSpec, Error, LayoutOptimizer, LayoutPlan, OptimizerConfig, Rectangle,
        Result, Strategy, ViewportInfo,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{
        ControlSurface, EngineConfig, LayoutEngine, MemorySurface, Target, TransitionCompletion,
        ViewportMonitor,
    };

    pub use boardfit_core;
    pub use boardfit_layout;
    #[cfg(feature = "runtime")]
    pub use boardfit_runtime;
}
