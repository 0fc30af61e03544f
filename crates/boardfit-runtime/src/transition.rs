#![forbid(unsafe_code)]

//! Animated application of layout plans.
//!
//! [`TransitionRenderer`] moves the board and controls from where they are to
//! where a [`LayoutPlan`] puts them, interpolating over `duration_ms`.
//!
//! # Queueing
//!
//! A plan that arrives while a transition runs is appended to a FIFO queue.
//! It starts, as a fresh transition, on the tick that completes the current
//! one. Running transitions are never interrupted or retargeted, and with the
//! default [`QueuePolicy::ApplyAll`] every queued plan is applied in arrival
//! order.
//!
//! # State machine
//!
//! ```text
//! control:  Idle ──apply──▶ Animating ──duration elapsed──▶ Idle
//! renderer: Idle ──1 track──▶ Animating
//!           Idle ──n tracks─▶ BatchAnimating
//! ```
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Target cannot be measured on first touch | Dom error, target skipped |
//! | `place` fails mid-transition | Dom error, track dropped, others continue |
//! | Plan rect fails validation | Calculation error, target skipped |
//! | Every target skipped or unchanged | Completion resolves immediately |
//!
//! A touched control that a later plan leaves out is returned to the rect
//! measured when it was first touched.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};
use std::time::Duration;

use boardfit_core::animation::{Animation, Easing, Tween};
use boardfit_core::geometry::Rectangle;
use boardfit_core::logging::TARGET_TRANSITION;
use boardfit_layout::{ControlId, LayoutPlan};
use web_time::Instant;

use crate::error_log::{ErrorCategory, ErrorLog};
use crate::surface::{ControlSurface, PlacementMode, Target};

/// What happens to queued plans when another one arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum QueuePolicy {
    /// Apply every queued request in order.
    #[default]
    ApplyAll,
    /// Keep only the newest queued request; older ones resolve as superseded.
    LatestOnly,
}

/// Configuration for the transition renderer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct TransitionConfig {
    /// Transition length (ms). Default: 300.
    pub duration_ms: u64,
    pub easing: Easing,
    pub placement: PlacementMode,
    /// Rects closer than this on every field are not animated. Default: 0.5.
    pub move_tolerance: f64,
    pub queue_policy: QueuePolicy,
    /// Suggested tick interval while animating (ms). Default: 16.
    pub frame_interval_ms: u64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            duration_ms: 300,
            easing: Easing::EaseOut,
            placement: PlacementMode::Transform,
            move_tolerance: 0.5,
            queue_policy: QueuePolicy::ApplyAll,
            frame_interval_ms: 16,
        }
    }
}

impl TransitionConfig {
    #[must_use]
    pub fn with_duration_ms(mut self, ms: u64) -> Self {
        self.duration_ms = ms;
        self
    }

    #[must_use]
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    #[must_use]
    pub fn with_placement(mut self, placement: PlacementMode) -> Self {
        self.placement = placement;
        self
    }

    #[must_use]
    pub fn with_queue_policy(mut self, policy: QueuePolicy) -> Self {
        self.queue_policy = policy;
        self
    }

    #[inline]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Human-readable problems with this configuration; empty when valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !self.move_tolerance.is_finite() || self.move_tolerance < 0.0 {
            errors.push(format!(
                "transition.move_tolerance must be finite and >= 0, got {}",
                self.move_tolerance
            ));
        }
        if self.frame_interval_ms == 0 {
            errors.push("transition.frame_interval_ms must be > 0".into());
        }
        errors
    }
}

/// Per-target animation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlState {
    #[default]
    Idle,
    Animating,
}

/// Renderer-wide animation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererState {
    Idle,
    /// One target moving.
    Animating,
    /// Several targets moving together.
    BatchAnimating,
}

impl RendererState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Animating => "animating",
            Self::BatchAnimating => "batch_animating",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Plan,
    Revert,
}

impl TransitionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plan => "plan",
            Self::Revert => "revert",
        }
    }
}

/// How a transition ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    pub seq: u64,
    pub kind: TransitionKind,
    /// Targets that reached their destination.
    pub moved: Vec<Target>,
    /// Targets dropped after a failure.
    pub skipped: Vec<Target>,
    /// Dropped from the queue by [`QueuePolicy::LatestOnly`].
    pub superseded: bool,
}

impl TransitionOutcome {
    fn superseded(seq: u64, kind: TransitionKind) -> Self {
        Self {
            seq,
            kind,
            moved: Vec::new(),
            skipped: Vec::new(),
            superseded: true,
        }
    }
}

#[derive(Debug, Default)]
struct CompletionSlot {
    outcome: Option<TransitionOutcome>,
    waker: Option<Waker>,
}

/// Resolves when its transition ends.
///
/// Poll it with [`is_complete`](Self::is_complete) from an event loop or
/// `.await` it; clones observe the same transition.
#[derive(Debug, Clone)]
pub struct TransitionCompletion {
    seq: u64,
    slot: Rc<RefCell<CompletionSlot>>,
}

impl TransitionCompletion {
    fn new(seq: u64) -> Self {
        Self {
            seq,
            slot: Rc::new(RefCell::new(CompletionSlot::default())),
        }
    }

    fn resolve(&self, outcome: TransitionOutcome) {
        let waker = {
            let mut slot = self.slot.borrow_mut();
            if slot.outcome.is_some() {
                return;
            }
            slot.outcome = Some(outcome);
            slot.waker.take()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    /// Submission sequence number.
    #[inline]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn is_complete(&self) -> bool {
        self.slot.borrow().outcome.is_some()
    }

    pub fn outcome(&self) -> Option<TransitionOutcome> {
        self.slot.borrow().outcome.clone()
    }
}

impl Future for TransitionCompletion {
    type Output = TransitionOutcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut slot = self.slot.borrow_mut();
        match &slot.outcome {
            Some(outcome) => Poll::Ready(outcome.clone()),
            None => {
                slot.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

/// Work for the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionRequest {
    Plan(LayoutPlan),
    /// Restore first-touch rects: the listed controls, or every touched
    /// target when `None`.
    Revert(Option<Vec<ControlId>>),
}

impl TransitionRequest {
    pub fn kind(&self) -> TransitionKind {
        match self {
            Self::Plan(_) => TransitionKind::Plan,
            Self::Revert(_) => TransitionKind::Revert,
        }
    }
}

/// A request deferred until the running transition completes.
#[derive(Debug)]
pub struct AnimationQueueEntry {
    pub request: TransitionRequest,
    pub completion: TransitionCompletion,
}

#[derive(Debug, Clone, Copy)]
struct Track {
    target: Target,
    from: Rectangle,
    to: Rectangle,
}

#[derive(Debug)]
struct ActiveTransition {
    kind: TransitionKind,
    tween: Tween,
    tracks: Vec<Track>,
    skipped: Vec<Target>,
    completion: TransitionCompletion,
    last_tick: Instant,
}

/// Applies plans to a [`ControlSurface`] through eased transitions.
#[derive(Debug)]
pub struct TransitionRenderer<S: ControlSurface> {
    config: TransitionConfig,
    surface: S,
    error_log: ErrorLog,

    /// Last placed rect per target.
    current: HashMap<Target, Rectangle>,
    /// Rect measured on first touch.
    defaults: HashMap<Target, Rectangle>,
    /// Targets in first-touch order.
    touched: Vec<Target>,
    states: HashMap<Target, ControlState>,

    active: Option<ActiveTransition>,
    queue: VecDeque<AnimationQueueEntry>,
    next_seq: u64,
    completed: u64,
}

impl<S: ControlSurface> TransitionRenderer<S> {
    pub fn new(config: TransitionConfig, surface: S) -> Self {
        Self {
            config,
            surface,
            error_log: ErrorLog::default(),
            current: HashMap::new(),
            defaults: HashMap::new(),
            touched: Vec::new(),
            states: HashMap::new(),
            active: None,
            queue: VecDeque::new(),
            next_seq: 0,
            completed: 0,
        }
    }

    /// Record into a shared error log.
    #[must_use]
    pub fn with_error_log(mut self, log: ErrorLog) -> Self {
        self.error_log = log;
        self
    }

    /// Apply a plan, or queue it behind the running transition.
    pub fn apply(&mut self, plan: LayoutPlan) -> TransitionCompletion {
        self.apply_at(plan, Instant::now())
    }

    /// Apply a plan at a specific time (for testing).
    pub fn apply_at(&mut self, plan: LayoutPlan, now: Instant) -> TransitionCompletion {
        self.submit(TransitionRequest::Plan(plan), now)
    }

    /// Restore first-touch rects for `controls`, or for every touched target.
    pub fn revert_to_default(&mut self, controls: Option<&[ControlId]>) -> TransitionCompletion {
        self.revert_to_default_at(controls, Instant::now())
    }

    /// Revert at a specific time (for testing).
    pub fn revert_to_default_at(
        &mut self,
        controls: Option<&[ControlId]>,
        now: Instant,
    ) -> TransitionCompletion {
        self.submit(TransitionRequest::Revert(controls.map(<[ControlId]>::to_vec)), now)
    }

    fn submit(&mut self, request: TransitionRequest, now: Instant) -> TransitionCompletion {
        let completion = TransitionCompletion::new(self.next_seq);
        self.next_seq += 1;

        if self.active.is_some() {
            if self.config.queue_policy == QueuePolicy::LatestOnly {
                for stale in self.queue.drain(..) {
                    stale
                        .completion
                        .resolve(TransitionOutcome::superseded(stale.completion.seq(), stale.request.kind()));
                }
            }
            tracing::debug!(
                target: TARGET_TRANSITION,
                seq = completion.seq(),
                kind = request.kind().as_str(),
                queue_len = self.queue.len() + 1,
                "transition queued"
            );
            self.queue.push_back(AnimationQueueEntry {
                request,
                completion: completion.clone(),
            });
            return completion;
        }

        self.start(request, completion.clone(), now);
        completion
    }

    /// Begin a transition. Returns the outcome when it resolves immediately.
    fn start(
        &mut self,
        request: TransitionRequest,
        completion: TransitionCompletion,
        now: Instant,
    ) -> Option<TransitionOutcome> {
        let kind = request.kind();
        let targets: Vec<(Target, Rectangle)> = match request {
            TransitionRequest::Plan(plan) => {
                let mut targets: Vec<(Target, Rectangle)> =
                    std::iter::once((Target::Board, plan.board_rect()))
                        .chain(plan.control_rects().map(|(id, rect)| (Target::Control(id), rect)))
                        .collect();
                // Controls the plan no longer relocates go back home.
                for target in &self.touched {
                    if let Target::Control(id) = *target
                        && !plan.contains(id)
                        && let Some(home) = self.defaults.get(target)
                    {
                        targets.push((*target, *home));
                    }
                }
                targets
            }
            TransitionRequest::Revert(ids) => {
                let wanted: Vec<Target> = match ids {
                    Some(ids) => ids.into_iter().map(Target::Control).collect(),
                    None => self.touched.clone(),
                };
                wanted
                    .into_iter()
                    .filter_map(|t| self.defaults.get(&t).map(|rect| (t, *rect)))
                    .collect()
            }
        };

        let mut tracks = Vec::with_capacity(targets.len());
        let mut skipped = Vec::new();
        for (target, to) in targets {
            if let Err(err) = to.validate() {
                self.error_log.record(
                    ErrorCategory::Calculation,
                    format!("rect for {target} rejected: {err}"),
                );
                skipped.push(target);
                continue;
            }
            let Some(from) = self.current_or_measure(target) else {
                self.error_log
                    .record(ErrorCategory::Dom, format!("{target} could not be located"));
                skipped.push(target);
                continue;
            };
            if from.approx_eq(&to, self.config.move_tolerance) {
                continue;
            }
            tracks.push(Track { target, from, to });
        }

        if tracks.is_empty() {
            let outcome = TransitionOutcome {
                seq: completion.seq(),
                kind,
                moved: Vec::new(),
                skipped,
                superseded: false,
            };
            completion.resolve(outcome.clone());
            self.completed += 1;
            return Some(outcome);
        }

        for track in &tracks {
            self.states.insert(track.target, ControlState::Animating);
        }
        tracing::debug!(
            target: TARGET_TRANSITION,
            seq = completion.seq(),
            kind = kind.as_str(),
            tracks = tracks.len(),
            duration_ms = self.config.duration_ms,
            "transition started"
        );
        self.active = Some(ActiveTransition {
            kind,
            tween: Tween::new(self.config.duration()).easing(self.config.easing.function()),
            tracks,
            skipped,
            completion,
            last_tick: now,
        });
        None
    }

    fn current_or_measure(&mut self, target: Target) -> Option<Rectangle> {
        if let Some(rect) = self.current.get(&target) {
            return Some(*rect);
        }
        let rect = self.surface.measure(target)?;
        self.defaults.insert(target, rect);
        self.touched.push(target);
        self.current.insert(target, rect);
        Some(rect)
    }

    /// Advance the running transition.
    pub fn tick(&mut self) -> Vec<TransitionOutcome> {
        self.tick_at(Instant::now())
    }

    /// Advance at a specific time (for testing).
    ///
    /// Returns the transitions that completed during this tick; when one
    /// completes, the next queued request starts at `now`.
    pub fn tick_at(&mut self, now: Instant) -> Vec<TransitionOutcome> {
        let mut finished = Vec::new();
        let Some(mut active) = self.active.take() else {
            return finished;
        };
        let dt = now.saturating_duration_since(active.last_tick);
        active.last_tick = now;
        active.tween.tick(dt);

        if !active.tween.is_complete() {
            let t = f64::from(active.tween.value());
            self.place_frame(&mut active, t);
            if !active.tracks.is_empty() {
                self.active = Some(active);
                return finished;
            }
        }

        finished.push(self.finish(active));
        self.start_queued(now, &mut finished);
        finished
    }

    fn place_frame(&mut self, active: &mut ActiveTransition, t: f64) {
        let mode = self.config.placement;
        let surface = &mut self.surface;
        let current = &mut self.current;
        let states = &mut self.states;
        let log = &self.error_log;
        let skipped = &mut active.skipped;
        active.tracks.retain(|track| {
            let rect = track.from.lerp(&track.to, t);
            match surface.place(track.target, rect, mode) {
                Ok(()) => {
                    current.insert(track.target, rect);
                    true
                }
                Err(err) => {
                    log.record(ErrorCategory::Dom, err.to_string());
                    states.insert(track.target, ControlState::Idle);
                    skipped.push(track.target);
                    false
                }
            }
        });
    }

    fn finish(&mut self, active: ActiveTransition) -> TransitionOutcome {
        let mut moved = Vec::with_capacity(active.tracks.len());
        let mut skipped = active.skipped;
        for track in &active.tracks {
            match self.surface.place(track.target, track.to, self.config.placement) {
                Ok(()) => {
                    self.current.insert(track.target, track.to);
                    moved.push(track.target);
                }
                Err(err) => {
                    self.error_log.record(ErrorCategory::Dom, err.to_string());
                    skipped.push(track.target);
                }
            }
            self.states.insert(track.target, ControlState::Idle);
        }
        let outcome = TransitionOutcome {
            seq: active.completion.seq(),
            kind: active.kind,
            moved,
            skipped,
            superseded: false,
        };
        tracing::debug!(
            target: TARGET_TRANSITION,
            seq = outcome.seq,
            moved = outcome.moved.len(),
            skipped = outcome.skipped.len(),
            "transition completed"
        );
        active.completion.resolve(outcome.clone());
        self.completed += 1;
        outcome
    }

    fn start_queued(&mut self, now: Instant, finished: &mut Vec<TransitionOutcome>) {
        while self.active.is_none() {
            let Some(entry) = self.queue.pop_front() else {
                break;
            };
            if let Some(outcome) = self.start(entry.request, entry.completion, now) {
                finished.push(outcome);
            }
        }
    }

    /// Whether a transition is running.
    #[inline]
    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }

    pub fn renderer_state(&self) -> RendererState {
        match &self.active {
            None => RendererState::Idle,
            Some(active) if active.tracks.len() > 1 => RendererState::BatchAnimating,
            Some(_) => RendererState::Animating,
        }
    }

    pub fn control_state(&self, id: ControlId) -> ControlState {
        self.states
            .get(&Target::Control(id))
            .copied()
            .unwrap_or_default()
    }

    /// Time left in the running transition.
    pub fn time_until_complete(&self) -> Option<Duration> {
        self.active
            .as_ref()
            .map(|a| a.tween.duration().saturating_sub(a.tween.elapsed()))
    }

    /// Requests waiting behind the running transition.
    #[inline]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Transitions resolved so far (including immediate ones).
    #[inline]
    pub fn completed(&self) -> u64 {
        self.completed
    }

    /// Last placed rect of a target.
    pub fn current_rect(&self, target: Target) -> Option<Rectangle> {
        self.current.get(&target).copied()
    }

    /// Rect measured when the target was first touched.
    pub fn default_rect(&self, target: Target) -> Option<Rectangle> {
        self.defaults.get(&target).copied()
    }

    #[inline]
    pub fn config(&self) -> &TransitionConfig {
        &self.config
    }

    #[inline]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[inline]
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    #[inline]
    pub fn error_log(&self) -> &ErrorLog {
        &self.error_log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MemorySurface;
    use boardfit_layout::{Panel, PlacedControl, Strategy};

    const MS: Duration = Duration::from_millis(1);

    fn c(id: u32) -> Target {
        Target::Control(ControlId::new(id))
    }

    fn surface() -> MemorySurface {
        MemorySurface::new()
            .with(Target::Board, Rectangle::new(0.0, 0.0, 300.0, 300.0))
            .with(c(1), Rectangle::new(0.0, 400.0, 100.0, 40.0))
            .with(c(2), Rectangle::new(120.0, 400.0, 100.0, 40.0))
    }

    fn plan(board_x: f64, control_x: f64) -> LayoutPlan {
        let mut plan = LayoutPlan::board_only(
            Rectangle::new(board_x, 16.0, 300.0, 300.0),
            Strategy::Horizontal,
        );
        for (i, id) in [1u32, 2].into_iter().enumerate() {
            plan.push_control(PlacedControl {
                id: ControlId::new(id),
                rect: Rectangle::new(control_x, 16.0 + i as f64 * 56.0, 100.0, 40.0),
                panel: Panel::Side,
                overflow: false,
            });
        }
        plan
    }

    fn linear_renderer() -> TransitionRenderer<MemorySurface> {
        TransitionRenderer::new(
            TransitionConfig::default().with_easing(Easing::Linear),
            surface(),
        )
    }

    #[test]
    fn interpolates_then_lands_exactly() {
        let mut r = linear_renderer();
        let t0 = Instant::now();
        let done = r.apply_at(plan(16.0, 332.0), t0);
        assert_eq!(r.renderer_state(), RendererState::BatchAnimating);
        assert_eq!(r.control_state(ControlId::new(1)), ControlState::Animating);

        assert!(r.tick_at(t0 + 150 * MS).is_empty());
        let mid = r.surface().measure(Target::Board).unwrap();
        assert!((mid.x - 8.0).abs() < 1e-3, "{mid}");

        let finished = r.tick_at(t0 + 300 * MS);
        assert_eq!(finished.len(), 1);
        assert!(done.is_complete());
        assert_eq!(r.surface().measure(c(1)), Some(Rectangle::new(332.0, 16.0, 100.0, 40.0)));
        assert_eq!(r.renderer_state(), RendererState::Idle);
        assert_eq!(r.control_state(ControlId::new(1)), ControlState::Idle);
    }

    #[test]
    fn queued_plan_waits_for_running_transition() {
        let mut r = linear_renderer();
        let t0 = Instant::now();
        let first = r.apply_at(plan(16.0, 332.0), t0);
        let second = r.apply_at(plan(40.0, 360.0), t0 + 100 * MS);
        assert_eq!(r.queue_len(), 1);
        assert!(r.is_animating());

        r.tick_at(t0 + 299 * MS);
        assert!(r.is_animating());
        assert!(!first.is_complete());
        // The first transition still heads to its own target.
        let board = r.surface().measure(Target::Board).unwrap();
        assert!(board.x < 16.0);

        let finished = r.tick_at(t0 + 300 * MS);
        assert_eq!(finished.iter().map(|o| o.seq).collect::<Vec<_>>(), vec![first.seq()]);
        assert!(first.is_complete());
        assert!(!second.is_complete());
        assert!(r.is_animating());
        assert_eq!(r.queue_len(), 0);

        r.tick_at(t0 + 600 * MS);
        assert!(second.is_complete());
        assert_eq!(r.current_rect(Target::Board).map(|b| b.x), Some(40.0));
    }

    #[test]
    fn queued_plans_apply_in_order() {
        let mut r = linear_renderer();
        let t0 = Instant::now();
        let completions: Vec<_> = (0..4)
            .map(|i| r.apply_at(plan(16.0 + f64::from(i) * 10.0, 332.0), t0))
            .collect();
        let mut order = Vec::new();
        let mut t = t0;
        while r.is_animating() {
            t += 50 * MS;
            order.extend(r.tick_at(t).into_iter().map(|o| o.seq));
        }
        assert_eq!(order, vec![0, 1, 2, 3]);
        assert!(completions.iter().all(TransitionCompletion::is_complete));
        assert_eq!(r.completed(), 4);
    }

    #[test]
    fn latest_only_supersedes_queued_requests() {
        let mut r = TransitionRenderer::new(
            TransitionConfig::default().with_queue_policy(QueuePolicy::LatestOnly),
            surface(),
        );
        let t0 = Instant::now();
        r.apply_at(plan(16.0, 332.0), t0);
        let stale = r.apply_at(plan(20.0, 332.0), t0);
        let latest = r.apply_at(plan(30.0, 332.0), t0);
        assert_eq!(r.queue_len(), 1);
        assert_eq!(stale.outcome().map(|o| o.superseded), Some(true));
        r.tick_at(t0 + 300 * MS);
        r.tick_at(t0 + 600 * MS);
        assert!(latest.is_complete());
        assert_eq!(r.current_rect(Target::Board).map(|b| b.x), Some(30.0));
    }

    #[test]
    fn unchanged_plan_resolves_immediately() {
        let mut r = linear_renderer();
        let t0 = Instant::now();
        r.apply_at(plan(16.0, 332.0), t0);
        r.tick_at(t0 + 300 * MS);
        let again = r.apply_at(plan(16.2, 332.0), t0 + 400 * MS);
        assert!(again.is_complete());
        assert!(!r.is_animating());
        assert!(again.outcome().unwrap().moved.is_empty());
    }

    #[test]
    fn missing_control_is_skipped() {
        let mut r = linear_renderer();
        r.surface_mut().remove(c(2));
        let t0 = Instant::now();
        let done = r.apply_at(plan(16.0, 332.0), t0);
        r.tick_at(t0 + 300 * MS);
        let outcome = done.outcome().unwrap();
        assert_eq!(outcome.skipped, vec![c(2)]);
        assert!(outcome.moved.contains(&c(1)));
        assert_eq!(r.error_log().count(ErrorCategory::Dom), 1);
    }

    #[test]
    fn control_detached_mid_transition_is_dropped() {
        let mut r = linear_renderer();
        let t0 = Instant::now();
        let done = r.apply_at(plan(16.0, 332.0), t0);
        r.tick_at(t0 + 100 * MS);
        r.surface_mut().remove(c(1));
        r.tick_at(t0 + 200 * MS);
        assert!(r.is_animating());
        r.tick_at(t0 + 300 * MS);
        let outcome = done.outcome().unwrap();
        assert_eq!(outcome.skipped, vec![c(1)]);
        assert_eq!(outcome.moved.len(), 2);
    }

    #[test]
    fn revert_restores_first_touch_rects() {
        let mut r = linear_renderer();
        let t0 = Instant::now();
        r.apply_at(plan(16.0, 332.0), t0);
        let revert = r.revert_to_default_at(Some(&[ControlId::new(1)]), t0 + 10 * MS);
        assert_eq!(r.queue_len(), 1);
        r.tick_at(t0 + 300 * MS);
        r.tick_at(t0 + 600 * MS);
        assert_eq!(revert.outcome().map(|o| o.kind), Some(TransitionKind::Revert));
        assert_eq!(r.surface().measure(c(1)), Some(Rectangle::new(0.0, 400.0, 100.0, 40.0)));
        assert_eq!(r.surface().measure(c(2)), Some(Rectangle::new(332.0, 72.0, 100.0, 40.0)));

        r.revert_to_default_at(None, t0 + 700 * MS);
        r.tick_at(t0 + 1000 * MS);
        assert_eq!(r.surface().measure(Target::Board), Some(Rectangle::new(0.0, 0.0, 300.0, 300.0)));
        assert_eq!(r.surface().measure(c(2)), Some(Rectangle::new(120.0, 400.0, 100.0, 40.0)));
    }

    #[test]
    fn controls_left_out_of_plan_return_home() {
        let mut r = linear_renderer();
        let t0 = Instant::now();
        r.apply_at(plan(16.0, 332.0), t0);
        r.tick_at(t0 + 300 * MS);
        assert_eq!(r.surface().measure(c(2)), Some(Rectangle::new(332.0, 72.0, 100.0, 40.0)));

        let mut only_first = LayoutPlan::board_only(
            Rectangle::new(16.0, 16.0, 300.0, 300.0),
            Strategy::Horizontal,
        );
        only_first.push_control(PlacedControl {
            id: ControlId::new(1),
            rect: Rectangle::new(332.0, 16.0, 100.0, 40.0),
            panel: Panel::Side,
            overflow: false,
        });
        let done = r.apply_at(only_first, t0 + 400 * MS);
        assert_eq!(r.renderer_state(), RendererState::Animating);
        r.tick_at(t0 + 700 * MS);
        let outcome = done.outcome().unwrap();
        assert_eq!(outcome.moved, vec![c(2)]);
        assert_eq!(r.surface().measure(c(2)), Some(Rectangle::new(120.0, 400.0, 100.0, 40.0)));
        assert_eq!(r.surface().measure(c(1)), Some(Rectangle::new(332.0, 16.0, 100.0, 40.0)));
    }

    #[test]
    fn completion_is_a_future() {
        let mut r = linear_renderer();
        let t0 = Instant::now();
        let mut done = r.apply_at(plan(16.0, 332.0), t0);
        let mut cx = Context::from_waker(Waker::noop());
        assert!(Pin::new(&mut done).poll(&mut cx).is_pending());
        r.tick_at(t0 + 300 * MS);
        match Pin::new(&mut done).poll(&mut cx) {
            Poll::Ready(outcome) => assert_eq!(outcome.seq, 0),
            Poll::Pending => panic!("transition should be complete"),
        }
    }
}
