#![forbid(unsafe_code)]

//! Runtime half of boardfit: turns platform resize notifications into
//! debounced layout analyses and applies the resulting plans as queued,
//! non-interruptible transitions.
//!
//! Everything runs on the host's event loop. Nothing spawns threads or
//! timers; the host calls `tick_at(now)` and asks `time_until_due` /
//! `time_until_next` when to call again.
//!
//! # Key Components
//!
//! - [`ViewportMonitor`] - debounce, clamp, threshold-skip, cache, analyze
//! - [`TransitionRenderer`] - eased placement with a FIFO plan queue
//! - [`LayoutEngine`] - both of the above plus overflow packaging
//! - [`ErrorLog`] - bounded record of recoverable failures
//! - [`EngineConfig`] - all settings, loadable from TOML/JSON with `config`

pub mod config;
pub mod engine;
pub mod error_log;
pub mod perf;
pub mod surface;
pub mod transition;
pub mod viewport_monitor;

pub use config::{ConfigError, EngineConfig};
pub use engine::{EngineDiagnostics, EngineTick, LayoutEngine};
pub use error_log::{DEFAULT_ERROR_LOG_CAPACITY, ErrorCategory, ErrorEntry, ErrorLog};
pub use perf::{ComputeTimePercentiles, PerformanceBudgets, PerformanceStats, Stage};
pub use surface::{ControlSurface, MemorySurface, PlacementMode, SurfaceError, Target};
pub use transition::{
    AnimationQueueEntry, ControlState, QueuePolicy, RendererState, TransitionCompletion,
    TransitionConfig, TransitionKind, TransitionOutcome, TransitionRenderer, TransitionRequest,
};
pub use viewport_monitor::{
    AnalysisState, MonitorAction, MonitorConfig, MonitorDecision, ViewportMonitor,
};
