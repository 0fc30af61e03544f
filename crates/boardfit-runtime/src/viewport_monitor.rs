#![forbid(unsafe_code)]

//! Debounced viewport analysis.
//!
//! The monitor turns a stream of raw size notifications into a small number
//! of layout computations. It:
//!
//! - substitutes a known size when the platform reports nothing usable
//! - clamps sizes into the supported range (logged, never rejected)
//! - collapses bursts: only the last size of a burst is analyzed
//! - bounds latency: a pending size is analyzed within `max_wait_ms` of the
//!   first event of its burst, however long the burst lasts
//! - skips analyses for changes below `skip_threshold` on both axes
//! - invalidates the plan cache when orientation flips
//!
//! # Usage
//!
//! ```ignore
//! let mut monitor = ViewportMonitor::new(MonitorConfig::default(), OptimizerConfig::default(), visibility);
//!
//! // On every platform resize notification
//! monitor.on_change(width, height);
//!
//! // From the host event loop
//! if let Some(plan) = monitor.tick() {
//!     renderer.apply(plan);
//! }
//! ```
//!
//! # Decision Rule
//!
//! 1) Each event sets the pending size and resets the due time to
//!    `now + delay`, where `delay` is the orientation settle window when the
//!    orientation differs from the last analyzed one, else `debounce_ms`.
//! 2) The due time never passes `burst_start + max_wait_ms`.
//! 3) At the due time, **skip** if orientation is unchanged and both axes moved
//!    less than `skip_threshold` since the last analysis; otherwise **analyze**.
//!
//! # Invariants
//!
//! - **Latest-wins**: the final size of a burst is the one analyzed.
//! - **Bounded latency**: at most `max_wait_ms` between a burst's first event
//!   and its analysis.
//! - **Deterministic**: identical event sequences yield identical decisions.
//! - **Never stalls**: failed computations yield the fallback plan.

use std::time::Duration;

use boardfit_core::geometry::{Orientation, ViewportBounds, ViewportInfo};
use boardfit_core::logging::TARGET_MONITOR;
use boardfit_layout::{
    LayoutCache, LayoutCacheKey, LayoutOptimizer, LayoutPlan, OptimizerConfig, VisibilitySource,
};
use web_time::Instant;

use crate::error_log::{ErrorCategory, ErrorLog};
use crate::perf::{PerformanceBudgets, PerformanceStats, Stage};

/// Retained decision log entries when logging is enabled.
const MAX_DECISION_LOGS: usize = 1024;

/// Configuration for the viewport monitor.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct MonitorConfig {
    /// Quiet period after the last event of a burst (ms). Default: 150.
    pub debounce_ms: u64,
    /// Quiet period after an orientation flip (ms). Default: 150.
    pub orientation_settle_ms: u64,
    /// Upper bound from a burst's first event to its analysis (ms). Default: 400.
    pub max_wait_ms: u64,
    /// Changes smaller than this on both axes are not re-analyzed. Default: 10.
    pub skip_threshold: f64,
    /// Accepted viewport range.
    pub bounds: ViewportBounds,
    /// Size assumed when the platform reports none. Default: 1024x768.
    pub fallback_width: f64,
    pub fallback_height: f64,
    /// Board width over height. Default: 1 (square).
    pub board_aspect: f64,
    pub budgets: PerformanceBudgets,
    /// Plan cache entries. Default: 64.
    pub cache_capacity: usize,
    /// Keep a decision log (see [`ViewportMonitor::decision_logs`]).
    pub enable_logging: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 150,
            orientation_settle_ms: 150,
            max_wait_ms: 400,
            skip_threshold: 10.0,
            bounds: ViewportBounds::default(),
            fallback_width: boardfit_core::geometry::DEFAULT_VIEWPORT_WIDTH,
            fallback_height: boardfit_core::geometry::DEFAULT_VIEWPORT_HEIGHT,
            board_aspect: 1.0,
            budgets: PerformanceBudgets::default(),
            cache_capacity: boardfit_layout::cache::DEFAULT_CACHE_CAPACITY,
            enable_logging: false,
        }
    }
}

impl MonitorConfig {
    #[must_use]
    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    #[must_use]
    pub fn with_orientation_settle_ms(mut self, ms: u64) -> Self {
        self.orientation_settle_ms = ms;
        self
    }

    #[must_use]
    pub fn with_max_wait_ms(mut self, ms: u64) -> Self {
        self.max_wait_ms = ms;
        self
    }

    #[must_use]
    pub fn with_skip_threshold(mut self, threshold: f64) -> Self {
        self.skip_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_board_aspect(mut self, aspect: f64) -> Self {
        self.board_aspect = aspect;
        self
    }

    #[must_use]
    pub fn with_budgets(mut self, budgets: PerformanceBudgets) -> Self {
        self.budgets = budgets;
        self
    }

    #[must_use]
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }

    /// Human-readable problems with this configuration; empty when valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.max_wait_ms < self.debounce_ms {
            errors.push(format!(
                "monitor.max_wait_ms ({}) must be >= monitor.debounce_ms ({})",
                self.max_wait_ms, self.debounce_ms
            ));
        }
        if !self.skip_threshold.is_finite() || self.skip_threshold < 0.0 {
            errors.push(format!(
                "monitor.skip_threshold must be finite and >= 0, got {}",
                self.skip_threshold
            ));
        }
        if !self.bounds.is_valid() {
            errors.push(format!(
                "monitor.bounds must be finite, positive, and non-empty: {:?}",
                self.bounds
            ));
        }
        if !(self.fallback_width > 0.0 && self.fallback_height > 0.0) {
            errors.push("monitor.fallback_width/height must be > 0".into());
        }
        if !self.board_aspect.is_finite() || self.board_aspect <= 0.0 {
            errors.push(format!("monitor.board_aspect must be finite and > 0, got {}", self.board_aspect));
        }
        if self.cache_capacity == 0 {
            errors.push("monitor.cache_capacity must be > 0".into());
        }
        errors
    }
}

/// The last analyzed viewport and plan.
///
/// Owned by the monitor but movable in and out of it, so a host can carry it
/// across monitor instances.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisState {
    pub last_viewport: Option<ViewportInfo>,
    pub last_plan: Option<LayoutPlan>,
    pub analyses: u64,
}

impl AnalysisState {
    /// Orientation of the last analyzed viewport.
    pub fn orientation(&self) -> Option<Orientation> {
        self.last_viewport.map(|vp| vp.orientation())
    }
}

/// What the monitor did with an event or tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorAction {
    /// A pending analysis was scheduled or rescheduled.
    Schedule,
    /// The pending change was below the threshold.
    Skip,
    /// A plan was produced by the optimizer.
    Compute,
    /// A plan was served from the cache.
    CacheHit,
    /// The fallback plan was used.
    Fallback,
}

impl MonitorAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Schedule => "schedule",
            Self::Skip => "skip",
            Self::Compute => "compute",
            Self::CacheHit => "cache_hit",
            Self::Fallback => "fallback",
        }
    }
}

/// Decision log entry.
#[derive(Debug, Clone)]
pub struct MonitorDecision {
    pub timestamp: Instant,
    /// Raw events seen so far.
    pub event_idx: u64,
    pub action: MonitorAction,
    pub width: f64,
    pub height: f64,
    pub orientation_changed: bool,
    /// Due time was capped by `max_wait_ms`.
    pub forced: bool,
}

impl MonitorDecision {
    /// Serialize to JSONL format.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        format!(
            r#"{{"event":"viewport_decision","idx":{},"action":"{}","width":{:.1},"height":{:.1},"orientation_changed":{},"forced":{}}}"#,
            self.event_idx,
            self.action.as_str(),
            self.width,
            self.height,
            self.orientation_changed,
            self.forced
        )
    }
}

/// Debouncing front end of the layout pipeline.
#[derive(Debug)]
pub struct ViewportMonitor<V: VisibilitySource> {
    config: MonitorConfig,
    optimizer: LayoutOptimizer,
    visibility: V,
    cache: LayoutCache,
    state: AnalysisState,
    error_log: ErrorLog,
    stats: PerformanceStats,

    /// Latest size of the current burst.
    pending: Option<ViewportInfo>,
    /// First event of the current burst.
    burst_start: Option<Instant>,
    /// When the pending size is analyzed.
    due: Option<Instant>,
    due_forced: bool,

    event_count: u64,
    logs: Vec<MonitorDecision>,
}

impl<V: VisibilitySource> ViewportMonitor<V> {
    /// Unusable `bounds` are replaced by [`ViewportBounds::default`].
    pub fn new(mut config: MonitorConfig, optimizer: OptimizerConfig, visibility: V) -> Self {
        if !config.bounds.is_valid() {
            tracing::warn!(
                target: TARGET_MONITOR,
                bounds = ?config.bounds,
                "unusable viewport bounds replaced by defaults"
            );
            config.bounds = ViewportBounds::default();
        }
        let cache = LayoutCache::new(config.cache_capacity);
        Self {
            config,
            optimizer: LayoutOptimizer::new(optimizer),
            visibility,
            cache,
            state: AnalysisState::default(),
            error_log: ErrorLog::default(),
            stats: PerformanceStats::default(),
            pending: None,
            burst_start: None,
            due: None,
            due_forced: false,
            event_count: 0,
            logs: Vec::new(),
        }
    }

    /// Record into a shared error log.
    #[must_use]
    pub fn with_error_log(mut self, log: ErrorLog) -> Self {
        self.error_log = log;
        self
    }

    /// Resume from a previously captured analysis state.
    #[must_use]
    pub fn with_state(mut self, state: AnalysisState) -> Self {
        self.state = state;
        self
    }

    /// Handle a raw size notification.
    pub fn on_change(&mut self, width: f64, height: f64) {
        self.on_change_at(width, height, Instant::now());
    }

    /// Handle a raw size notification at a specific time (for testing).
    pub fn on_change_at(&mut self, width: f64, height: f64, now: Instant) {
        self.event_count += 1;
        let viewport = self.sanitize(width, height);

        let orientation_changed = self
            .state
            .orientation()
            .is_some_and(|o| o != viewport.orientation());
        let delay_ms = if orientation_changed {
            self.config.orientation_settle_ms
        } else {
            self.config.debounce_ms
        };

        let burst_start = *self.burst_start.get_or_insert(now);
        let settle_at = now + Duration::from_millis(delay_ms);
        let deadline = burst_start + Duration::from_millis(self.config.max_wait_ms);
        self.due_forced = deadline < settle_at;
        self.due = Some(settle_at.min(deadline));
        self.pending = Some(viewport);

        tracing::trace!(
            target: TARGET_MONITOR,
            width = viewport.width(),
            height = viewport.height(),
            delay_ms,
            forced = self.due_forced,
            "analysis scheduled"
        );
        self.log_decision(now, MonitorAction::Schedule, &viewport, orientation_changed);
    }

    /// Fire the debounce timer.
    pub fn tick(&mut self) -> Option<LayoutPlan> {
        self.tick_at(Instant::now())
    }

    /// Fire the debounce timer at a specific time (for testing).
    ///
    /// Returns a plan when a pending size came due and was analyzed.
    pub fn tick_at(&mut self, now: Instant) -> Option<LayoutPlan> {
        let due = self.due?;
        if now < due {
            return None;
        }
        let viewport = self.pending.take()?;
        self.due = None;
        self.burst_start = None;

        if let Some(last) = self.state.last_viewport
            && last.orientation() == viewport.orientation()
            && viewport.within_threshold(&last, self.config.skip_threshold)
        {
            self.stats.skipped += 1;
            tracing::debug!(
                target: TARGET_MONITOR,
                width = viewport.width(),
                height = viewport.height(),
                "change below threshold, analysis skipped"
            );
            self.log_decision(now, MonitorAction::Skip, &viewport, false);
            return None;
        }

        Some(self.run_analysis(viewport, now))
    }

    /// Time until the pending analysis is due, `None` when nothing is pending.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.due.map(|due| due.saturating_duration_since(now))
    }

    /// Whether an analysis is pending.
    #[inline]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Analyze immediately, bypassing the debounce and the change threshold.
    pub fn analyze(&mut self) -> LayoutPlan {
        self.analyze_at(Instant::now())
    }

    /// Analyze immediately at a specific time (for testing).
    ///
    /// Uses the pending size if any, else the last analyzed size, else the
    /// configured fallback size.
    pub fn analyze_at(&mut self, now: Instant) -> LayoutPlan {
        let viewport = match self.pending.take() {
            Some(vp) => vp,
            None => self.state.last_viewport.unwrap_or_else(|| self.fallback_viewport()),
        };
        self.due = None;
        self.burst_start = None;
        self.run_analysis(viewport, now)
    }

    /// Compute (or fetch) the plan for `viewport` and record it as analyzed.
    ///
    /// A compute that overruns its stage budget is still used and cached, so
    /// the next identical request is served from the cache.
    fn run_analysis(&mut self, viewport: ViewportInfo, now: Instant) -> LayoutPlan {
        let (stage, orientation_changed) = match self.state.last_viewport {
            None => (Stage::Initial, false),
            Some(last) if last.orientation() != viewport.orientation() => {
                (Stage::OrientationChange, true)
            }
            Some(_) => (Stage::Recompute, false),
        };
        if orientation_changed {
            self.cache.invalidate_all();
        }

        self.visibility.refresh(&viewport);
        let controls = self.visibility.outside_viewport_controls();
        let aspect = self.config.board_aspect;
        let key = LayoutCacheKey::new(&viewport, &controls, aspect);

        let (plan, action) = if let Some(plan) = self.cache.get(&key) {
            self.stats.cache_hits += 1;
            (plan, MonitorAction::CacheHit)
        } else {
            self.stats.cache_misses += 1;
            let started = Instant::now();
            let result = self.optimizer.compute(&viewport, &controls, aspect);
            let elapsed = started.elapsed();
            let budget = self.config.budgets.budget_for(stage);
            if self.stats.record_compute(stage, elapsed, budget) {
                self.error_log.record(
                    ErrorCategory::Performance,
                    format!(
                        "{} analysis of {viewport} took {:.3}ms (budget {}ms)",
                        stage.as_str(),
                        elapsed.as_secs_f64() * 1000.0,
                        budget.as_millis()
                    ),
                );
            }
            match result {
                Ok(plan) => {
                    self.cache.insert(key, plan.clone());
                    (plan, MonitorAction::Compute)
                }
                Err(err) => {
                    self.error_log.record(
                        ErrorCategory::Calculation,
                        format!("layout for {viewport} failed: {err}"),
                    );
                    self.stats.fallbacks += 1;
                    (
                        LayoutPlan::fallback(self.optimizer.config().margin),
                        MonitorAction::Fallback,
                    )
                }
            }
        };

        self.state.last_viewport = Some(viewport);
        self.state.last_plan = Some(plan.clone());
        self.state.analyses += 1;
        self.stats.analyses += 1;

        tracing::debug!(
            target: TARGET_MONITOR,
            viewport = %viewport,
            stage = stage.as_str(),
            action = action.as_str(),
            strategy = plan.strategy().as_str(),
            "viewport analyzed"
        );
        self.log_decision(now, action, &viewport, orientation_changed);
        plan
    }

    /// Replace unusable platform input and clamp into range.
    fn sanitize(&mut self, width: f64, height: f64) -> ViewportInfo {
        let usable = width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0;
        let (width, height) = if usable {
            (width, height)
        } else {
            let substitute = self.state.last_viewport.unwrap_or_else(|| self.fallback_viewport());
            self.error_log.record(
                ErrorCategory::ApiUnavailable,
                format!(
                    "viewport size unavailable ({width}x{height}), using {:.0}x{:.0}",
                    substitute.width(),
                    substitute.height()
                ),
            );
            (substitute.width(), substitute.height())
        };

        match ViewportInfo::clamped(width, height, &self.config.bounds) {
            Ok((viewport, clamped)) => {
                if clamped {
                    tracing::warn!(
                        target: TARGET_MONITOR,
                        raw_width = width,
                        raw_height = height,
                        width = viewport.width(),
                        height = viewport.height(),
                        "viewport clamped into supported range"
                    );
                }
                viewport
            }
            Err(err) => {
                self.error_log.record(
                    ErrorCategory::Calculation,
                    format!("viewport {width}x{height} rejected: {err}"),
                );
                self.fallback_viewport()
            }
        }
    }

    fn fallback_viewport(&self) -> ViewportInfo {
        ViewportInfo::clamped(
            self.config.fallback_width,
            self.config.fallback_height,
            &self.config.bounds,
        )
        .map(|(vp, _)| vp)
        .unwrap_or_default()
    }

    fn log_decision(
        &mut self,
        now: Instant,
        action: MonitorAction,
        viewport: &ViewportInfo,
        orientation_changed: bool,
    ) {
        if !self.config.enable_logging {
            return;
        }
        if self.logs.len() >= MAX_DECISION_LOGS {
            self.logs.remove(0);
        }
        self.logs.push(MonitorDecision {
            timestamp: now,
            event_idx: self.event_count,
            action,
            width: viewport.width(),
            height: viewport.height(),
            orientation_changed,
            forced: action == MonitorAction::Schedule && self.due_forced,
        });
    }

    #[inline]
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    #[inline]
    pub fn optimizer(&self) -> &LayoutOptimizer {
        &self.optimizer
    }

    #[inline]
    pub fn state(&self) -> &AnalysisState {
        &self.state
    }

    /// Take the analysis state out, leaving a fresh one.
    pub fn take_state(&mut self) -> AnalysisState {
        std::mem::take(&mut self.state)
    }

    /// Consume the monitor, returning its analysis state.
    pub fn into_state(self) -> AnalysisState {
        self.state
    }

    #[inline]
    pub fn performance_stats(&self) -> &PerformanceStats {
        &self.stats
    }

    #[inline]
    pub fn error_log(&self) -> &ErrorLog {
        &self.error_log
    }

    #[inline]
    pub fn cache(&self) -> &LayoutCache {
        &self.cache
    }

    #[inline]
    pub fn cache_mut(&mut self) -> &mut LayoutCache {
        &mut self.cache
    }

    #[inline]
    pub fn visibility(&self) -> &V {
        &self.visibility
    }

    #[inline]
    pub fn visibility_mut(&mut self) -> &mut V {
        &mut self.visibility
    }

    /// Raw events handled so far.
    #[inline]
    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    /// Decision log (empty unless logging is enabled).
    pub fn decision_logs(&self) -> &[MonitorDecision] {
        &self.logs
    }

    /// Decision log as JSONL, one entry per line.
    pub fn decision_logs_jsonl(&self) -> String {
        let mut out = String::new();
        for entry in &self.logs {
            out.push_str(&entry.to_jsonl());
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardfit_layout::{ControlId, ControlSpec, StaticVisibility, Strategy};

    const MS: Duration = Duration::from_millis(1);

    fn monitor() -> ViewportMonitor<StaticVisibility> {
        let controls = [
            ControlSpec::new(ControlId::new(1), 200.0, 48.0),
            ControlSpec::new(ControlId::new(2), 200.0, 48.0),
        ];
        ViewportMonitor::new(
            MonitorConfig::default().with_logging(true),
            OptimizerConfig::default(),
            StaticVisibility::new(controls),
        )
    }

    #[test]
    fn single_event_analyzes_after_debounce() {
        let mut m = monitor();
        let t0 = Instant::now();
        m.on_change_at(1280.0, 800.0, t0);
        assert!(m.has_pending());
        assert_eq!(m.time_until_due(t0), Some(150 * MS));
        assert!(m.tick_at(t0 + 149 * MS).is_none());
        let plan = m.tick_at(t0 + 150 * MS).expect("due");
        assert_eq!(plan.strategy(), Strategy::Horizontal);
        assert!(!m.has_pending());
        assert_eq!(m.state().analyses, 1);
        assert_eq!(m.time_until_due(t0 + 200 * MS), None);
    }

    #[test]
    fn burst_collapses_to_latest() {
        let mut m = monitor();
        let t0 = Instant::now();
        for i in 0..11u32 {
            m.on_change_at(1000.0 + f64::from(i) * 20.0, 800.0, t0 + i * 10 * MS);
        }
        let mut plans = Vec::new();
        let mut t = t0;
        while t <= t0 + 1000 * MS {
            if let Some(plan) = m.tick_at(t) {
                plans.push(plan);
            }
            t += 16 * MS;
        }
        assert_eq!(plans.len(), 1);
        assert_eq!(m.state().last_viewport.map(|v| v.width()), Some(1200.0));
    }

    #[test]
    fn storm_is_bounded_by_max_wait() {
        let mut m = monitor();
        let t0 = Instant::now();
        let mut analyzed_at = None;
        for i in 0..100u32 {
            let now = t0 + i * 20 * MS;
            m.on_change_at(900.0 + f64::from(i), 700.0, now);
            if m.tick_at(now).is_some() && analyzed_at.is_none() {
                analyzed_at = Some(now);
            }
        }
        assert_eq!(analyzed_at, Some(t0 + 400 * MS));
        assert!(m.decision_logs().iter().any(|d| d.forced));
    }

    #[test]
    fn small_change_is_skipped() {
        let mut m = monitor();
        let t0 = Instant::now();
        m.on_change_at(1280.0, 800.0, t0);
        assert!(m.tick_at(t0 + 200 * MS).is_some());
        m.on_change_at(1289.0, 791.0, t0 + 300 * MS);
        assert!(m.tick_at(t0 + 500 * MS).is_none());
        assert_eq!(m.performance_stats().skipped, 1);
        m.on_change_at(1290.0, 800.0, t0 + 600 * MS);
        assert!(m.tick_at(t0 + 800 * MS).is_some());
    }

    #[test]
    fn orientation_flip_invalidates_cache() {
        let mut m = monitor().with_state(AnalysisState::default());
        let t0 = Instant::now();
        m.on_change_at(1280.0, 800.0, t0);
        m.tick_at(t0 + 150 * MS);
        m.on_change_at(800.0, 1280.0, t0 + 200 * MS);
        assert!(m.tick_at(t0 + 350 * MS).is_some());
        assert_eq!(m.cache().stats().generation_bumps, 1);
        assert_eq!(m.performance_stats().last_stage, Some(Stage::OrientationChange));
    }

    #[test]
    fn repeated_viewport_hits_cache() {
        let mut m = monitor();
        let t0 = Instant::now();
        m.on_change_at(1280.0, 800.0, t0);
        m.tick_at(t0 + 150 * MS);
        m.on_change_at(1600.0, 900.0, t0 + 200 * MS);
        m.tick_at(t0 + 350 * MS);
        m.on_change_at(1280.0, 800.0, t0 + 400 * MS);
        m.tick_at(t0 + 550 * MS);
        let stats = m.performance_stats();
        assert_eq!(stats.analyses, 3);
        assert_eq!(stats.computes, 2);
        assert_eq!(stats.cache_hits, 1);
    }

    #[test]
    fn unusable_size_falls_back_to_last_analyzed() {
        let mut m = monitor();
        let t0 = Instant::now();
        m.on_change_at(1280.0, 800.0, t0);
        m.tick_at(t0 + 150 * MS);
        m.on_change_at(f64::NAN, 0.0, t0 + 200 * MS);
        assert_eq!(m.error_log().count(ErrorCategory::ApiUnavailable), 1);
        // Substituted size equals the last analyzed one, so nothing to redo.
        assert!(m.tick_at(t0 + 400 * MS).is_none());
    }

    #[test]
    fn first_unusable_size_uses_configured_fallback() {
        let mut m = monitor();
        let plan = {
            m.on_change_at(f64::INFINITY, 600.0, Instant::now());
            m.analyze()
        };
        assert_eq!(m.state().last_viewport, Some(ViewportInfo::default()));
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn out_of_range_size_is_clamped() {
        let mut m = monitor();
        m.on_change_at(100.0, 9000.0, Instant::now());
        m.analyze();
        let vp = m.state().last_viewport.unwrap();
        assert_eq!((vp.width(), vp.height()), (320.0, 2160.0));
        assert!(m.error_log().is_empty());
    }

    #[test]
    fn invalid_control_yields_fallback_plan() {
        let mut m = ViewportMonitor::new(
            MonitorConfig::default(),
            OptimizerConfig::default(),
            StaticVisibility::new([ControlSpec::new(ControlId::new(9), f64::NAN, 10.0)]),
        );
        let plan = m.analyze();
        assert_eq!(plan, LayoutPlan::fallback(16.0));
        assert_eq!(m.error_log().count(ErrorCategory::Calculation), 1);
        assert_eq!(m.performance_stats().fallbacks, 1);
    }

    #[test]
    fn zero_budget_records_performance_error_and_keeps_plan() {
        let budgets = PerformanceBudgets {
            initial_ms: 0,
            recompute_ms: 0,
            orientation_ms: 0,
        };
        let mut m = ViewportMonitor::new(
            MonitorConfig::default().with_budgets(budgets),
            OptimizerConfig::default(),
            StaticVisibility::default(),
        );
        m.on_change_at(1280.0, 800.0, Instant::now());
        let plan = m.analyze();
        assert_eq!(plan.board_edge(), 768.0);
        assert_eq!(m.error_log().count(ErrorCategory::Performance), 1);
        assert_eq!(m.performance_stats().budget_violations, 1);

        // The over-budget plan was cached; repeating the request reuses it.
        let again = m.analyze();
        assert_eq!(again, plan);
        assert_eq!(m.performance_stats().cache_hits, 1);
        assert_eq!(m.performance_stats().computes, 1);
        assert_eq!(m.error_log().count(ErrorCategory::Performance), 1);
    }

    #[test]
    fn nan_bounds_fall_back_to_defaults() {
        let config = MonitorConfig {
            bounds: ViewportBounds {
                min_width: f64::NAN,
                ..ViewportBounds::default()
            },
            ..MonitorConfig::default()
        };
        assert!(!config.validate().is_empty());
        let mut m = ViewportMonitor::new(config, OptimizerConfig::default(), StaticVisibility::default());
        assert_eq!(m.config().bounds, ViewportBounds::default());
        m.on_change_at(100.0, 9000.0, Instant::now());
        m.analyze();
        let vp = m.state().last_viewport.unwrap();
        assert_eq!((vp.width(), vp.height()), (320.0, 2160.0));
    }

    #[test]
    fn state_round_trips_between_monitors() {
        let mut m = monitor();
        m.on_change_at(1280.0, 800.0, Instant::now());
        m.analyze();
        let state = m.into_state();
        assert_eq!(state.analyses, 1);

        let mut resumed = monitor().with_state(state);
        let t0 = Instant::now();
        resumed.on_change_at(1285.0, 805.0, t0);
        assert!(resumed.tick_at(t0 + 150 * MS).is_none());
    }

    #[test]
    fn decision_log_jsonl() {
        let mut m = monitor();
        let t0 = Instant::now();
        m.on_change_at(1280.0, 800.0, t0);
        m.tick_at(t0 + 150 * MS);
        let jsonl = m.decision_logs_jsonl();
        let lines: Vec<_> = jsonl.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(r#""action":"schedule""#));
        assert!(lines[1].contains(r#""action":"compute""#));
    }
}
