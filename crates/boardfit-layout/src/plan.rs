#![forbid(unsafe_code)]

//! Layout plans: the optimizer's output and the renderer's input.

use std::fmt;
use std::fmt::Write as _;

use boardfit_core::geometry::Rectangle;
use rustc_hash::FxHashSet;

use crate::control::ControlId;
use crate::error::LayoutError;

/// Board edge used by [`LayoutPlan::fallback`].
pub const FALLBACK_BOARD_EDGE: f64 = 400.0;

/// Macro-arrangement of controls relative to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Strategy {
    /// Controls beside the board.
    #[default]
    Horizontal,
    /// Controls below the board.
    Vertical,
    /// Leading controls beside the board, the rest below it.
    Hybrid,
}

impl Strategy {
    /// Stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
            Self::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Region of the viewport a control was placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Panel {
    /// To the right of the board.
    Side,
    /// Below the board.
    Below,
}

impl Panel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Side => "side",
            Self::Below => "below",
        }
    }
}

/// One control's computed placement.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlacedControl {
    pub id: ControlId,
    pub rect: Rectangle,
    pub panel: Panel,
    /// Whether the control lives in an overflow group (scroll content).
    pub overflow: bool,
}

/// Controls that did not fit their panel and need a scroll region.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OverflowGroup {
    pub panel: Panel,
    /// Members in input order.
    pub controls: Vec<ControlId>,
    /// Visible part of the panel the scroll region occupies.
    pub viewport_region: Rectangle,
}

impl OverflowGroup {
    /// Height the scroll region may occupy.
    #[inline]
    pub fn max_height(&self) -> f64 {
        self.viewport_region.h.max(0.0)
    }
}

/// Controls whose placement differs between two plans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanDiff {
    pub board_moved: bool,
    /// Present in both plans with a different rect.
    pub moved: Vec<ControlId>,
    /// Only in the newer plan.
    pub entered: Vec<ControlId>,
    /// Only in the older plan.
    pub left: Vec<ControlId>,
}

impl PlanDiff {
    /// Whether the two plans are equivalent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.board_moved && self.moved.is_empty() && self.entered.is_empty() && self.left.is_empty()
    }
}

/// Complete geometry for one layout cycle.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutPlan {
    board_rect: Rectangle,
    controls: Vec<PlacedControl>,
    strategy: Strategy,
    requires_scrolling: bool,
    overflow_groups: Vec<OverflowGroup>,
}

impl LayoutPlan {
    /// A plan with only a board.
    #[must_use]
    pub fn board_only(board_rect: Rectangle, strategy: Strategy) -> Self {
        Self {
            board_rect,
            controls: Vec::new(),
            strategy,
            requires_scrolling: false,
            overflow_groups: Vec::new(),
        }
    }

    /// The fixed default plan substituted after a calculation error:
    /// a 400x400 board inset by `margin`, horizontal, no scrolling.
    #[must_use]
    pub fn fallback(margin: f64) -> Self {
        let margin = if margin.is_finite() { margin.max(0.0) } else { 0.0 };
        Self::board_only(
            Rectangle::new(margin, margin, FALLBACK_BOARD_EDGE, FALLBACK_BOARD_EDGE),
            Strategy::Horizontal,
        )
    }

    /// Add a placed control. Returns `false` (and keeps the first placement)
    /// if the id is already present.
    pub fn push_control(&mut self, placed: PlacedControl) -> bool {
        if self.controls.iter().any(|c| c.id == placed.id) {
            return false;
        }
        self.controls.push(placed);
        true
    }

    /// Builder form of [`push_control`](Self::push_control).
    #[must_use]
    pub fn with_control(mut self, placed: PlacedControl) -> Self {
        self.push_control(placed);
        self
    }

    /// Record an overflow group and mark the plan as scrolling.
    pub fn push_overflow_group(&mut self, group: OverflowGroup) {
        if group.controls.is_empty() {
            return;
        }
        self.requires_scrolling = true;
        self.overflow_groups.push(group);
    }

    #[inline]
    pub fn board_rect(&self) -> Rectangle {
        self.board_rect
    }

    #[inline]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    #[inline]
    pub fn requires_scrolling(&self) -> bool {
        self.requires_scrolling
    }

    #[inline]
    pub fn overflow_groups(&self) -> &[OverflowGroup] {
        &self.overflow_groups
    }

    /// Placed controls in input order.
    #[inline]
    pub fn controls(&self) -> &[PlacedControl] {
        &self.controls
    }

    /// `(id, rect)` pairs in input order.
    pub fn control_rects(&self) -> impl Iterator<Item = (ControlId, Rectangle)> + '_ {
        self.controls.iter().map(|c| (c.id, c.rect))
    }

    /// Rect for a specific control.
    #[must_use]
    pub fn rect(&self, id: ControlId) -> Option<Rectangle> {
        self.controls.iter().find(|c| c.id == id).map(|c| c.rect)
    }

    /// Whether the plan positions this control.
    #[must_use]
    pub fn contains(&self, id: ControlId) -> bool {
        self.controls.iter().any(|c| c.id == id)
    }

    /// Board edge (short side of the board rect).
    #[inline]
    pub fn board_edge(&self) -> f64 {
        self.board_rect.w.min(self.board_rect.h)
    }

    /// Check every rect and the uniqueness of control ids.
    pub fn validate(&self) -> Result<(), LayoutError> {
        self.board_rect
            .validate()
            .map_err(|source| LayoutError::InvalidOutput {
                what: "board rect".to_string(),
                source,
            })?;
        let mut seen = FxHashSet::default();
        for placed in &self.controls {
            placed
                .rect
                .validate()
                .map_err(|source| LayoutError::InvalidOutput {
                    what: format!("rect for {}", placed.id),
                    source,
                })?;
            debug_assert!(seen.insert(placed.id), "duplicate {}", placed.id);
        }
        Ok(())
    }

    /// Compare against an older plan. Rects within `tolerance` count as equal.
    #[must_use]
    pub fn diff(&self, older: &LayoutPlan, tolerance: f64) -> PlanDiff {
        let mut diff = PlanDiff {
            board_moved: !self.board_rect.approx_eq(&older.board_rect, tolerance),
            ..PlanDiff::default()
        };
        for placed in &self.controls {
            match older.rect(placed.id) {
                Some(prev) if prev.approx_eq(&placed.rect, tolerance) => {}
                Some(_) => diff.moved.push(placed.id),
                None => diff.entered.push(placed.id),
            }
        }
        diff.left = older
            .controls
            .iter()
            .filter(|c| !self.contains(c.id))
            .map(|c| c.id)
            .collect();
        diff
    }

    /// Whether both plans agree within `tolerance`.
    #[must_use]
    pub fn approx_eq(&self, other: &LayoutPlan, tolerance: f64) -> bool {
        self.strategy == other.strategy
            && self.requires_scrolling == other.requires_scrolling
            && self.overflow_groups.len() == other.overflow_groups.len()
            && self.diff(other, tolerance).is_empty()
    }

    /// Serialize a summary line in JSONL format.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        let mut controls = String::new();
        for (i, placed) in self.controls.iter().enumerate() {
            if i > 0 {
                controls.push(',');
            }
            let _ = write!(
                controls,
                r#"{{"id":{},"x":{:.2},"y":{:.2},"w":{:.2},"h":{:.2},"panel":"{}","overflow":{}}}"#,
                placed.id.get(),
                placed.rect.x,
                placed.rect.y,
                placed.rect.w,
                placed.rect.h,
                placed.panel.as_str(),
                placed.overflow
            );
        }
        let groups = self
            .overflow_groups
            .iter()
            .map(|g| {
                let ids = g
                    .controls
                    .iter()
                    .map(|id| id.get().to_string())
                    .collect::<Vec<_>>()
                    .join(",");
                format!(r#"{{"panel":"{}","controls":[{}]}}"#, g.panel.as_str(), ids)
            })
            .collect::<Vec<_>>()
            .join(",");
        let b = self.board_rect;
        format!(
            r#"{{"event":"layout_plan","strategy":"{}","board":{{"x":{:.2},"y":{:.2},"w":{:.2},"h":{:.2}}},"requires_scrolling":{},"controls":[{}],"overflow_groups":[{}]}}"#,
            self.strategy.as_str(),
            b.x,
            b.y,
            b.w,
            b.h,
            self.requires_scrolling,
            controls,
            groups
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placed(id: u32, x: f64) -> PlacedControl {
        PlacedControl {
            id: ControlId::new(id),
            rect: Rectangle::new(x, 0.0, 10.0, 10.0),
            panel: Panel::Side,
            overflow: false,
        }
    }

    #[test]
    fn fallback_is_fixed_default() {
        let plan = LayoutPlan::fallback(16.0);
        assert_eq!(plan.board_rect(), Rectangle::new(16.0, 16.0, 400.0, 400.0));
        assert_eq!(plan.strategy(), Strategy::Horizontal);
        assert!(!plan.requires_scrolling());
        assert!(plan.controls().is_empty());
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let mut plan = LayoutPlan::board_only(Rectangle::new(0.0, 0.0, 1.0, 1.0), Strategy::Vertical);
        assert!(plan.push_control(placed(1, 5.0)));
        assert!(!plan.push_control(placed(1, 50.0)));
        assert_eq!(plan.controls().len(), 1);
        assert_eq!(plan.rect(ControlId::new(1)).map(|r| r.x), Some(5.0));
    }

    #[test]
    fn empty_overflow_group_is_ignored() {
        let mut plan = LayoutPlan::fallback(0.0);
        plan.push_overflow_group(OverflowGroup {
            panel: Panel::Below,
            controls: Vec::new(),
            viewport_region: Rectangle::default(),
        });
        assert!(!plan.requires_scrolling());
        assert!(plan.overflow_groups().is_empty());
    }

    #[test]
    fn diff_classifies_changes() {
        let board = Rectangle::new(0.0, 0.0, 300.0, 300.0);
        let old = LayoutPlan::board_only(board, Strategy::Horizontal)
            .with_control(placed(1, 0.0))
            .with_control(placed(2, 20.0));
        let new = LayoutPlan::board_only(board, Strategy::Horizontal)
            .with_control(placed(1, 0.5))
            .with_control(placed(3, 40.0));
        let diff = new.diff(&old, 1.0);
        assert!(!diff.board_moved);
        assert!(diff.moved.is_empty());
        assert_eq!(diff.entered, vec![ControlId::new(3)]);
        assert_eq!(diff.left, vec![ControlId::new(2)]);

        let strict = new.diff(&old, 0.1);
        assert_eq!(strict.moved, vec![ControlId::new(1)]);
    }

    #[test]
    fn jsonl_mentions_strategy_and_controls() {
        let plan = LayoutPlan::fallback(16.0).with_control(placed(7, 1.0));
        let line = plan.to_jsonl();
        assert!(line.starts_with('{') && line.ends_with('}'));
        assert!(line.contains(r#""strategy":"horizontal""#));
        assert!(line.contains(r#""id":7"#));
    }
}
