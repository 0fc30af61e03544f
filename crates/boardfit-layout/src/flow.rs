#![forbid(unsafe_code)]

//! Panel flow: a row along x, then a stack beneath the last row member.
//!
//! ```text
//!  panel.left                               panel.right
//!  ┌──────────────────────────────────────────────┐
//!  │ [c0]  [c1]  [  c2  ]                         │  row, bottom-aligned
//!  │             [ c3 ]                           │  stack, anchored at c2.x
//!  │             [   c4   ]                       │
//!  └──────────────────────────────────────────────┘ panel.bottom
//!                [ c5 ]    <- overflow: c5 and everything after it
//! ```

use boardfit_core::geometry::{Dimensions, Rectangle};

/// Slack for float comparisons against panel edges.
pub const EPSILON: f64 = 1e-6;

/// Edges of a panel. Unlike [`Rectangle`] the extent may be empty or
/// negative when the board leaves no room.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelBounds {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl PanelBounds {
    #[inline]
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Whether a control of this size fits the panel at all.
    #[inline]
    pub fn admits(&self, size: Dimensions) -> bool {
        size.w <= self.width() + EPSILON && size.h <= self.height() + EPSILON
    }

    /// Visible region as a rectangle, or `None` when the panel is empty.
    pub fn visible_rect(&self) -> Option<Rectangle> {
        (self.width() > 0.0 && self.height() > 0.0)
            .then(|| Rectangle::new(self.left, self.top, self.width(), self.height()))
    }
}

/// Result of flowing controls through one panel.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowOutcome {
    /// One rect per input size, in input order.
    pub rects: Vec<Rectangle>,
    /// Index of the first control that leaves the panel; it and every later
    /// control overflow.
    pub first_overflow: Option<usize>,
    /// Number of controls placed in the row.
    pub row_len: usize,
}

impl FlowOutcome {
    /// Number of controls that stay inside the panel.
    #[inline]
    pub fn fitting(&self) -> usize {
        self.first_overflow.unwrap_or(self.rects.len())
    }
}

/// Flow `sizes` through `panel` with `spacing` between neighbours.
///
/// The first control always starts the row. Later controls join the row while
/// they fit horizontally; the rest stack below, anchored at the last row
/// member's x and pushed left as needed to stay inside the right edge.
pub fn flow(panel: PanelBounds, sizes: &[Dimensions], spacing: f64) -> FlowOutcome {
    let mut rects = Vec::with_capacity(sizes.len());
    if sizes.is_empty() {
        return FlowOutcome {
            rects,
            first_overflow: None,
            row_len: 0,
        };
    }

    // Row: count members first so they can be bottom-aligned.
    let mut row_len = 1;
    let mut cursor = panel.left + sizes[0].w;
    for size in &sizes[1..] {
        let next_right = cursor + spacing + size.w;
        if next_right > panel.right + EPSILON {
            break;
        }
        cursor = next_right;
        row_len += 1;
    }
    let row_h = sizes[..row_len].iter().map(|s| s.h).fold(0.0, f64::max);
    let row_bottom = panel.top + row_h;

    let mut x = panel.left;
    for size in &sizes[..row_len] {
        rects.push(Rectangle::from_origin(x, row_bottom - size.h, *size));
        x += size.w + spacing;
    }

    // Stack.
    let anchor = rects[row_len - 1].x;
    let mut y = row_bottom + spacing;
    for size in &sizes[row_len..] {
        let sx = anchor.min(panel.right - size.w).max(panel.left);
        rects.push(Rectangle::from_origin(sx, y, *size));
        y += size.h + spacing;
    }

    let first_overflow = rects.iter().position(|r| {
        r.bottom() > panel.bottom + EPSILON || r.right() > panel.right + EPSILON
    });

    FlowOutcome {
        rects,
        first_overflow,
        row_len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(list: &[(f64, f64)]) -> Vec<Dimensions> {
        list.iter().map(|&(w, h)| Dimensions::new(w, h)).collect()
    }

    #[test]
    fn empty_input_places_nothing() {
        let out = flow(PanelBounds::new(0.0, 0.0, 100.0, 100.0), &[], 16.0);
        assert!(out.rects.is_empty());
        assert_eq!(out.first_overflow, None);
        assert_eq!(out.fitting(), 0);
    }

    #[test]
    fn row_is_bottom_aligned() {
        let panel = PanelBounds::new(10.0, 10.0, 500.0, 500.0);
        let out = flow(panel, &sizes(&[(50.0, 20.0), (50.0, 40.0)]), 16.0);
        assert_eq!(out.row_len, 2);
        assert_eq!(out.rects[0], Rectangle::new(10.0, 30.0, 50.0, 20.0));
        assert_eq!(out.rects[1], Rectangle::new(76.0, 10.0, 50.0, 40.0));
        assert_eq!(out.rects[0].gap_to(&out.rects[1]), 16.0);
    }

    #[test]
    fn wraps_into_stack_under_last_row_member() {
        let panel = PanelBounds::new(0.0, 0.0, 200.0, 1000.0);
        let out = flow(panel, &sizes(&[(80.0, 30.0), (80.0, 30.0), (80.0, 30.0), (150.0, 30.0)]), 16.0);
        assert_eq!(out.row_len, 2);
        // Anchored at the second member's x (96), shifted left for the wide one.
        assert_eq!(out.rects[2], Rectangle::new(96.0, 46.0, 80.0, 30.0));
        assert_eq!(out.rects[3], Rectangle::new(50.0, 92.0, 150.0, 30.0));
        for pair in out.rects.windows(2) {
            assert!((pair[0].gap_to(&pair[1]) - 16.0).abs() < 1e-9);
            assert!(!pair[0].intersects(&pair[1]));
        }
        assert_eq!(out.first_overflow, None);
    }

    #[test]
    fn overflow_marks_suffix() {
        let panel = PanelBounds::new(0.0, 0.0, 100.0, 100.0);
        let out = flow(panel, &sizes(&[(90.0, 40.0), (90.0, 40.0), (90.0, 40.0)]), 16.0);
        // 0..40, 56..96, 112..152
        assert_eq!(out.first_overflow, Some(2));
        assert_eq!(out.fitting(), 2);
        assert_eq!(out.rects[2].y, 112.0);
    }

    #[test]
    fn too_wide_control_overflows() {
        let panel = PanelBounds::new(0.0, 0.0, 100.0, 400.0);
        let out = flow(panel, &sizes(&[(50.0, 10.0), (140.0, 10.0)]), 16.0);
        assert_eq!(out.first_overflow, Some(1));
        assert_eq!(out.rects[1].x, 0.0);
    }

    #[test]
    fn empty_panel_overflows_everything() {
        let panel = PanelBounds::new(16.0, 600.0, 400.0, 580.0);
        assert!(panel.visible_rect().is_none());
        let out = flow(panel, &sizes(&[(40.0, 40.0)]), 16.0);
        assert_eq!(out.first_overflow, Some(0));
    }
}
