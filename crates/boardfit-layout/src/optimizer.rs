#![forbid(unsafe_code)]

//! Board sizing, strategy selection and control placement.
//!
//! # Pipeline
//!
//! 1. Validate inputs and drop duplicate control ids (first wins).
//! 2. Size the board from the space left after margins.
//! 3. Pick a [`Strategy`] from the extreme-ratio class, else from the
//!    content-derived breakpoint `board.w + 2 * margin + max_control_width`.
//! 4. With board priority off, reserve the control panel's extent along the
//!    chosen axis and size the board again (it only shrinks).
//! 5. Flow controls through the strategy's panels (see [`crate::flow`]) and
//!    collect overflow groups.
//!
//! The computation is pure: identical inputs produce identical plans.

use boardfit_core::geometry::{Dimensions, ExtremeKind, Rectangle, ViewportInfo};
use boardfit_core::logging::TARGET_OPTIMIZER;
use rustc_hash::FxHashSet;

use crate::control::{self, ControlSpec};
use crate::error::LayoutError;
use crate::flow::{self, PanelBounds};
use crate::plan::{LayoutPlan, OverflowGroup, Panel, PlacedControl, Strategy};

/// Default gap between the viewport edge, the board and the control panels.
pub const DEFAULT_MARGIN: f64 = 16.0;
/// Default gap between neighbouring controls.
pub const DEFAULT_SPACING: f64 = 16.0;
/// Smallest board short side; never violated.
pub const MIN_BOARD_EDGE: f64 = 280.0;

/// Optimizer tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OptimizerConfig {
    /// Gap around the board and panels.
    pub margin: f64,
    /// Gap between consecutive controls.
    pub spacing: f64,
    /// Lower bound for the board's short side.
    pub min_board_edge: f64,
    /// Size the board before considering controls.
    pub board_priority: bool,
    /// Optional cap for the board's short side (raised to `min_board_edge`).
    pub max_board_edge: Option<f64>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            margin: DEFAULT_MARGIN,
            spacing: DEFAULT_SPACING,
            min_board_edge: MIN_BOARD_EDGE,
            board_priority: true,
            max_board_edge: None,
        }
    }
}

impl OptimizerConfig {
    #[must_use]
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    #[must_use]
    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    #[must_use]
    pub fn with_min_board_edge(mut self, edge: f64) -> Self {
        self.min_board_edge = edge;
        self
    }

    #[must_use]
    pub fn with_board_priority(mut self, enabled: bool) -> Self {
        self.board_priority = enabled;
        self
    }

    #[must_use]
    pub fn with_max_board_edge(mut self, edge: Option<f64>) -> Self {
        self.max_board_edge = edge;
        self
    }

    /// Effective cap, never below the minimum edge.
    #[inline]
    pub fn effective_max_edge(&self) -> Option<f64> {
        self.max_board_edge.map(|cap| cap.max(self.min_board_edge))
    }

    /// Human-readable problems with this configuration; empty when valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !self.margin.is_finite() || self.margin < 0.0 {
            errors.push(format!("optimizer.margin must be finite and >= 0 (got {})", self.margin));
        }
        if !self.spacing.is_finite() || self.spacing < 0.0 {
            errors.push(format!("optimizer.spacing must be finite and >= 0 (got {})", self.spacing));
        }
        if !self.min_board_edge.is_finite() || self.min_board_edge <= 0.0 {
            errors.push(format!(
                "optimizer.min_board_edge must be finite and > 0 (got {})",
                self.min_board_edge
            ));
        }
        if let Some(cap) = self.max_board_edge
            && !cap.is_finite()
        {
            errors.push(format!("optimizer.max_board_edge must be finite (got {cap})"));
        }
        errors
    }
}

/// Content-derived width at which controls fit beside the board.
#[inline]
pub fn breakpoint(board_width: f64, margin: f64, max_control_width: f64) -> f64 {
    board_width + 2.0 * margin + max_control_width
}

/// Board size for the given free space and aspect ratio (`w / h`).
///
/// The short side is as large as the space allows, capped by `max_edge` and
/// never below `min_edge`. Negative space yields the minimum.
pub fn size_board(
    avail_w: f64,
    avail_h: f64,
    aspect: f64,
    min_edge: f64,
    max_edge: Option<f64>,
) -> Dimensions {
    let fit_short = if aspect >= 1.0 {
        avail_h.min(avail_w / aspect)
    } else {
        avail_w.min(avail_h * aspect)
    };
    let mut short = fit_short;
    if let Some(cap) = max_edge {
        short = short.min(cap.max(min_edge));
    }
    let short = short.max(min_edge);
    if aspect >= 1.0 {
        Dimensions::new(short * aspect, short)
    } else {
        Dimensions::new(short, short / aspect)
    }
}

/// Side panel beside a board placed at the top-left margin.
fn side_panel(viewport: &ViewportInfo, board: Dimensions, margin: f64, bottom: f64) -> PanelBounds {
    PanelBounds::new(margin + board.w + margin, margin, viewport.width(), bottom)
}

/// Pick the arrangement for a board of the given size.
pub fn select_strategy(
    viewport: &ViewportInfo,
    board: Dimensions,
    controls: &[ControlSpec],
    margin: f64,
) -> Strategy {
    match viewport.extreme_kind() {
        ExtremeKind::UltraWide => return Strategy::Horizontal,
        ExtremeKind::VeryTall => return Strategy::Vertical,
        ExtremeKind::None => {}
    }
    let Some(first) = controls.first() else {
        return Strategy::Horizontal;
    };
    if viewport.width() >= breakpoint(board.w, margin, control::max_width(controls)) {
        return Strategy::Horizontal;
    }
    let beside = side_panel(viewport, board, margin, margin + board.h);
    if beside.admits(first.size) {
        Strategy::Hybrid
    } else {
        Strategy::Vertical
    }
}

/// Stateless layout calculator.
#[derive(Debug, Clone, Default)]
pub struct LayoutOptimizer {
    config: OptimizerConfig,
}

impl LayoutOptimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Compute from raw viewport extents. Fails on non-finite or
    /// non-positive sizes; range clamping is the monitor's job.
    pub fn compute_raw(
        &self,
        width: f64,
        height: f64,
        controls: &[ControlSpec],
        board_aspect: f64,
    ) -> Result<LayoutPlan, LayoutError> {
        let viewport = ViewportInfo::new(width, height).map_err(LayoutError::InvalidViewport)?;
        self.compute(&viewport, controls, board_aspect)
    }

    /// Compute a plan for `controls` (the outside-viewport set, in order).
    pub fn compute(
        &self,
        viewport: &ViewportInfo,
        controls: &[ControlSpec],
        board_aspect: f64,
    ) -> Result<LayoutPlan, LayoutError> {
        if !board_aspect.is_finite() || board_aspect <= 0.0 {
            return Err(LayoutError::InvalidAspect(board_aspect));
        }
        let controls = dedup_controls(controls)?;
        let cfg = &self.config;
        let m = cfg.margin;
        let avail_w = viewport.width() - 2.0 * m;
        let avail_h = viewport.height() - 2.0 * m;
        let max_edge = cfg.effective_max_edge();

        let natural = size_board(avail_w, avail_h, board_aspect, cfg.min_board_edge, max_edge);

        if controls.is_empty() {
            let x = ((viewport.width() - natural.w) / 2.0).max(0.0);
            let y = ((viewport.height() - natural.h) / 2.0).max(0.0);
            let plan = LayoutPlan::board_only(Rectangle::from_origin(x, y, natural), Strategy::Horizontal);
            plan.validate()?;
            return Ok(plan);
        }

        let strategy = select_strategy(viewport, natural, &controls, m);
        let board = if cfg.board_priority {
            natural
        } else {
            let (w, h) = match strategy {
                Strategy::Horizontal => (avail_w - (control::max_width(&controls) + m), avail_h),
                Strategy::Vertical | Strategy::Hybrid => {
                    (avail_w, avail_h - (control::max_height(&controls) + m))
                }
            };
            size_board(w, h, board_aspect, cfg.min_board_edge, max_edge)
        };

        let plan = match strategy {
            Strategy::Horizontal => self.place_horizontal(viewport, board, &controls),
            Strategy::Vertical => self.place_vertical(viewport, board, &controls),
            Strategy::Hybrid => self.place_hybrid(viewport, board, &controls),
        };
        plan.validate()?;

        boardfit_core::debug!(
            target: TARGET_OPTIMIZER,
            viewport_w = viewport.width(),
            viewport_h = viewport.height(),
            strategy = strategy.as_str(),
            board_edge = plan.board_edge(),
            controls = controls.len(),
            requires_scrolling = plan.requires_scrolling(),
            "layout computed"
        );
        Ok(plan)
    }

    fn place_horizontal(
        &self,
        viewport: &ViewportInfo,
        board: Dimensions,
        controls: &[ControlSpec],
    ) -> LayoutPlan {
        let m = self.config.margin;
        let board_rect = Rectangle::from_origin(m, m, board);
        let mut plan = LayoutPlan::board_only(board_rect, Strategy::Horizontal);
        let panel = side_panel(viewport, board, m, viewport.height() - m);
        self.fill_panel(&mut plan, panel, Panel::Side, controls);
        plan
    }

    fn place_vertical(
        &self,
        viewport: &ViewportInfo,
        board: Dimensions,
        controls: &[ControlSpec],
    ) -> LayoutPlan {
        let m = self.config.margin;
        let x = ((viewport.width() - board.w) / 2.0).max(0.0);
        let board_rect = Rectangle::from_origin(x, m, board);
        let mut plan = LayoutPlan::board_only(board_rect, Strategy::Vertical);
        let panel = lower_panel(viewport, board_rect, m);
        self.fill_panel(&mut plan, panel, Panel::Below, controls);
        plan
    }

    fn place_hybrid(
        &self,
        viewport: &ViewportInfo,
        board: Dimensions,
        controls: &[ControlSpec],
    ) -> LayoutPlan {
        let m = self.config.margin;
        let board_rect = Rectangle::from_origin(m, m, board);
        let mut plan = LayoutPlan::board_only(board_rect, Strategy::Hybrid);

        // Side controls stay level with the board so they never meet the
        // full-width lower panel.
        let side = side_panel(viewport, board, m, board_rect.bottom());
        let sizes: Vec<Dimensions> = controls.iter().map(|c| c.size).collect();
        let fitting = flow::flow(side, &sizes, self.config.spacing).fitting();
        let (beside, below) = controls.split_at(fitting);

        self.fill_panel(&mut plan, side, Panel::Side, beside);
        self.fill_panel(&mut plan, lower_panel(viewport, board_rect, m), Panel::Below, below);
        plan
    }

    fn fill_panel(
        &self,
        plan: &mut LayoutPlan,
        panel: PanelBounds,
        which: Panel,
        controls: &[ControlSpec],
    ) {
        if controls.is_empty() {
            return;
        }
        let sizes: Vec<Dimensions> = controls.iter().map(|c| c.size).collect();
        let outcome = flow::flow(panel, &sizes, self.config.spacing);
        let fitting = outcome.fitting();
        for (i, (spec, rect)) in controls.iter().zip(&outcome.rects).enumerate() {
            plan.push_control(PlacedControl {
                id: spec.id,
                rect: *rect,
                panel: which,
                overflow: i >= fitting,
            });
        }
        if fitting < controls.len() {
            plan.push_overflow_group(OverflowGroup {
                panel: which,
                controls: controls[fitting..].iter().map(|c| c.id).collect(),
                viewport_region: Rectangle::new(
                    panel.left.max(0.0),
                    panel.top.max(0.0),
                    panel.width().max(0.0),
                    panel.height().max(0.0),
                ),
            });
        }
    }
}

/// Full-width panel below the board.
fn lower_panel(viewport: &ViewportInfo, board_rect: Rectangle, margin: f64) -> PanelBounds {
    PanelBounds::new(
        margin,
        board_rect.bottom() + margin,
        viewport.width() - margin,
        viewport.height() - margin,
    )
}

/// Validate sizes and drop repeated ids, keeping the first occurrence.
fn dedup_controls(controls: &[ControlSpec]) -> Result<Vec<ControlSpec>, LayoutError> {
    let mut seen = FxHashSet::default();
    let mut out = Vec::with_capacity(controls.len());
    for spec in controls {
        spec.validate()
            .map_err(|source| LayoutError::InvalidControl { id: spec.id, source })?;
        if seen.insert(spec.id) {
            out.push(*spec);
        } else {
            boardfit_core::debug!(
                target: TARGET_OPTIMIZER,
                id = spec.id.get(),
                "duplicate control id ignored"
            );
        }
    }
    Ok(out)
}
