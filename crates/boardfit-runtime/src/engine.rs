#![forbid(unsafe_code)]

//! Host-facing wiring of the layout pipeline.
//!
//! [`LayoutEngine`] owns a [`ViewportMonitor`], a [`TransitionRenderer`], and
//! an [`OverflowPackager`], sharing one [`ErrorLog`] between them. The host
//! forwards raw resize notifications to [`on_change`](LayoutEngine::on_change)
//! and calls [`tick`](LayoutEngine::tick) from its event loop, sleeping for
//! [`time_until_next`](LayoutEngine::time_until_next) in between.
//!
//! ```ignore
//! let mut engine = LayoutEngine::new(config, visibility, surface, packager);
//! loop {
//!     for (w, h) in platform.drain_resizes() {
//!         engine.on_change(w, h);
//!     }
//!     engine.tick();
//!     platform.sleep(engine.time_until_next(Instant::now()));
//! }
//! ```

use std::time::Duration;

use boardfit_core::geometry::Dimensions;
use boardfit_core::logging::TARGET_MONITOR;
use boardfit_layout::{
    ControlId, LayoutPlan, OverflowGroup, OverflowPackager, ScrollRegionHandle, VisibilitySource,
    package_overflow,
};
use web_time::Instant;

use crate::config::EngineConfig;
use crate::error_log::ErrorLog;
use crate::perf::PerformanceStats;
use crate::surface::ControlSurface;
use crate::transition::{RendererState, TransitionCompletion, TransitionOutcome, TransitionRenderer};
use crate::viewport_monitor::ViewportMonitor;

/// What one engine tick did.
#[derive(Debug, Default)]
pub struct EngineTick {
    /// Completion of the plan handed to the renderer this tick, if any.
    pub applied: Option<TransitionCompletion>,
    /// Transitions that finished this tick.
    pub completed: Vec<TransitionOutcome>,
}

/// Point-in-time summary for logs and dashboards.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineDiagnostics {
    pub analyses: u64,
    pub computes: u64,
    pub skipped: u64,
    pub cache_hit_rate: f64,
    pub budget_violations: u64,
    pub errors_recorded: u64,
    pub renderer_state: RendererState,
    pub queued_transitions: usize,
    pub scroll_regions: usize,
}

impl EngineDiagnostics {
    /// Serialize to JSONL format.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        format!(
            r#"{{"event":"engine_diagnostics","analyses":{},"computes":{},"skipped":{},"cache_hit_rate":{:.3},"budget_violations":{},"errors_recorded":{},"renderer_state":"{}","queued_transitions":{},"scroll_regions":{}}}"#,
            self.analyses,
            self.computes,
            self.skipped,
            self.cache_hit_rate,
            self.budget_violations,
            self.errors_recorded,
            self.renderer_state.as_str(),
            self.queued_transitions,
            self.scroll_regions
        )
    }
}

/// Monitor, renderer, and overflow packaging driven from one event loop.
#[derive(Debug)]
pub struct LayoutEngine<V, S, P>
where
    V: VisibilitySource,
    S: ControlSurface,
    P: OverflowPackager,
{
    monitor: ViewportMonitor<V>,
    renderer: TransitionRenderer<S>,
    packager: P,
    error_log: ErrorLog,
    scroll_regions: Vec<(OverflowGroup, ScrollRegionHandle)>,
    frame_interval: Duration,
}

impl<V, S, P> LayoutEngine<V, S, P>
where
    V: VisibilitySource,
    S: ControlSurface,
    P: OverflowPackager,
{
    pub fn new(config: EngineConfig, visibility: V, surface: S, packager: P) -> Self {
        let error_log = ErrorLog::new(config.error_log_capacity);
        let frame_interval = Duration::from_millis(config.transition.frame_interval_ms.max(1));
        let monitor = ViewportMonitor::new(config.monitor, config.optimizer, visibility)
            .with_error_log(error_log.clone());
        let renderer =
            TransitionRenderer::new(config.transition, surface).with_error_log(error_log.clone());
        Self {
            monitor,
            renderer,
            packager,
            error_log,
            scroll_regions: Vec::new(),
            frame_interval,
        }
    }

    /// Forward a raw size notification.
    pub fn on_change(&mut self, width: f64, height: f64) {
        self.monitor.on_change(width, height);
    }

    /// Forward a raw size notification at a specific time (for testing).
    pub fn on_change_at(&mut self, width: f64, height: f64, now: Instant) {
        self.monitor.on_change_at(width, height, now);
    }

    /// Run due analyses and advance transitions.
    pub fn tick(&mut self) -> EngineTick {
        self.tick_at(Instant::now())
    }

    /// Run due analyses and advance transitions at a specific time (for testing).
    pub fn tick_at(&mut self, now: Instant) -> EngineTick {
        let applied = self
            .monitor
            .tick_at(now)
            .map(|plan| self.dispatch(plan, now));
        let completed = self.renderer.tick_at(now);
        EngineTick { applied, completed }
    }

    /// Analyze and apply immediately, bypassing the debounce.
    pub fn analyze_now(&mut self) -> TransitionCompletion {
        self.analyze_now_at(Instant::now())
    }

    /// Analyze and apply immediately at a specific time (for testing).
    pub fn analyze_now_at(&mut self, now: Instant) -> TransitionCompletion {
        let plan = self.monitor.analyze_at(now);
        self.dispatch(plan, now)
    }

    fn dispatch(&mut self, plan: LayoutPlan, now: Instant) -> TransitionCompletion {
        self.scroll_regions = package_overflow(&mut self.packager, &plan);
        if !self.scroll_regions.is_empty() {
            tracing::debug!(
                target: TARGET_MONITOR,
                groups = self.scroll_regions.len(),
                "overflow packaged into scroll regions"
            );
        }
        self.monitor.cache_mut().set_last_applied(plan.clone());
        self.renderer.apply_at(plan, now)
    }

    /// Restore first-touch rects (queued behind any running transition).
    pub fn revert_to_default(&mut self, controls: Option<&[ControlId]>) -> TransitionCompletion {
        self.revert_to_default_at(controls, Instant::now())
    }

    /// Revert at a specific time (for testing).
    pub fn revert_to_default_at(
        &mut self,
        controls: Option<&[ControlId]>,
        now: Instant,
    ) -> TransitionCompletion {
        self.scroll_regions.clear();
        self.renderer.revert_to_default_at(controls, now)
    }

    /// A control was measured. Cached plans built with an older size are
    /// dropped; returns how many.
    pub fn measure_control(&mut self, id: ControlId, size: Dimensions) -> usize {
        self.monitor.cache_mut().record_measurement(id, size)
    }

    /// How long the host may sleep before the next tick, `None` when idle.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        let due = self.monitor.time_until_due(now);
        let frame = self.renderer.time_until_complete().map(|left| left.min(self.frame_interval));
        match (due, frame) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.renderer.is_animating()
    }

    /// Scroll regions created for the most recently dispatched plan.
    pub fn scroll_regions(&self) -> &[(OverflowGroup, ScrollRegionHandle)] {
        &self.scroll_regions
    }

    pub fn diagnostics(&self) -> EngineDiagnostics {
        let stats = self.monitor.performance_stats();
        EngineDiagnostics {
            analyses: stats.analyses,
            computes: stats.computes,
            skipped: stats.skipped,
            cache_hit_rate: stats.cache_hit_rate(),
            budget_violations: stats.budget_violations,
            errors_recorded: self.error_log.total_recorded(),
            renderer_state: self.renderer.renderer_state(),
            queued_transitions: self.renderer.queue_len(),
            scroll_regions: self.scroll_regions.len(),
        }
    }

    #[inline]
    pub fn performance_stats(&self) -> &PerformanceStats {
        self.monitor.performance_stats()
    }

    #[inline]
    pub fn error_log(&self) -> &ErrorLog {
        &self.error_log
    }

    #[inline]
    pub fn monitor(&self) -> &ViewportMonitor<V> {
        &self.monitor
    }

    #[inline]
    pub fn monitor_mut(&mut self) -> &mut ViewportMonitor<V> {
        &mut self.monitor
    }

    #[inline]
    pub fn renderer(&self) -> &TransitionRenderer<S> {
        &self.renderer
    }

    #[inline]
    pub fn renderer_mut(&mut self) -> &mut TransitionRenderer<S> {
        &mut self.renderer
    }

    #[inline]
    pub fn packager(&self) -> &P {
        &self.packager
    }
}
