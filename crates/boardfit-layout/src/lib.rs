#![forbid(unsafe_code)]

//! Board-priority layout computation.
//!
//! - [`LayoutOptimizer`] - viewport + outside-viewport controls to [`LayoutPlan`]
//! - [`flow`] - row-then-stack placement inside one panel
//! - [`LayoutCache`] - memoized plans with generation and per-control invalidation
//! - [`VisibilitySource`] - which controls need relocating
//! - [`OverflowPackager`] - host hook for scroll regions
//!
//! ```
//! use boardfit_layout::{ControlId, ControlSpec, LayoutOptimizer, Strategy};
//! use boardfit_core::ViewportInfo;
//!
//! let viewport = ViewportInfo::new(1400.0, 800.0).unwrap();
//! let controls = [ControlSpec::new(ControlId::new(1), 240.0, 48.0)];
//! let plan = LayoutOptimizer::default().compute(&viewport, &controls, 1.0).unwrap();
//! assert_eq!(plan.strategy(), Strategy::Horizontal);
//! assert_eq!(plan.board_edge(), 768.0);
//! ```

pub mod cache;
pub mod control;
pub mod error;
pub mod flow;
pub mod optimizer;
pub mod overflow;
pub mod plan;
pub mod visibility;

pub use cache::{LayoutCache, LayoutCacheKey, LayoutCacheStats};
pub use control::{ControlId, ControlSpec};
pub use error::LayoutError;
pub use optimizer::{LayoutOptimizer, OptimizerConfig, breakpoint, select_strategy, size_board};
pub use overflow::{OverflowPackager, RecordingPackager, ScrollRegionHandle, package_overflow};
pub use plan::{LayoutPlan, OverflowGroup, Panel, PlacedControl, PlanDiff, Strategy};
pub use visibility::{GeometricVisibility, StaticVisibility, VisibilitySource};
