//! Strategy selection at fixed reference viewports.

use boardfit_core::geometry::ViewportInfo;
use boardfit_layout::{
    ControlId, ControlSpec, LayoutOptimizer, OptimizerConfig, Strategy, breakpoint,
    select_strategy, size_board,
};

fn controls(width: f64, count: u32) -> Vec<ControlSpec> {
    (0..count)
        .map(|i| ControlSpec::new(ControlId::new(i), width, 48.0))
        .collect()
}

fn strategy_at(cfg: OptimizerConfig, w: f64, h: f64, controls: &[ControlSpec]) -> Strategy {
    let vp = ViewportInfo::new(w, h).unwrap();
    LayoutOptimizer::new(cfg).compute(&vp, controls, 1.0).unwrap().strategy()
}

#[test]
fn ultra_wide_is_horizontal_for_any_control_width() {
    for width in [40.0, 400.0, 2000.0, 3500.0] {
        assert_eq!(
            strategy_at(OptimizerConfig::default(), 3840.0, 480.0, &controls(width, 3)),
            Strategy::Horizontal,
            "control width {width}"
        );
    }
}

#[test]
fn very_tall_is_vertical() {
    for width in [40.0, 200.0] {
        assert_eq!(
            strategy_at(OptimizerConfig::default(), 320.0, 2160.0, &controls(width, 3)),
            Strategy::Vertical
        );
    }
}

#[test]
fn breakpoint_follows_board_and_widest_control() {
    let cfg = OptimizerConfig::default().with_max_board_edge(Some(400.0));
    let set = controls(300.0, 2);
    assert_eq!(breakpoint(400.0, 16.0, 300.0), 732.0);
    assert_ne!(strategy_at(cfg, 731.0, 600.0, &set), Strategy::Horizontal);
    assert_eq!(strategy_at(cfg, 732.0, 600.0, &set), Strategy::Horizontal);
    assert_eq!(strategy_at(cfg, 733.0, 600.0, &set), Strategy::Horizontal);
}

#[test]
fn classic_breakpoints_are_not_decision_inputs() {
    // The same 768-wide viewport yields different strategies for different
    // control widths.
    let cfg = OptimizerConfig::default().with_max_board_edge(Some(400.0));
    assert_eq!(strategy_at(cfg, 768.0, 900.0, &controls(300.0, 2)), Strategy::Horizontal);
    assert_ne!(strategy_at(cfg, 768.0, 900.0, &controls(340.0, 2)), Strategy::Horizontal);
}

#[test]
fn hybrid_needs_first_control_beside_board() {
    let vp = ViewportInfo::new(1000.0, 1400.0).unwrap();
    let board = size_board(968.0, 1368.0, 1.0, 280.0, Some(600.0));
    let narrow_first = [
        ControlSpec::new(ControlId::new(0), 300.0, 100.0),
        ControlSpec::new(ControlId::new(1), 600.0, 100.0),
    ];
    assert_eq!(select_strategy(&vp, board, &narrow_first, 16.0), Strategy::Hybrid);

    let wide_first = [
        ControlSpec::new(ControlId::new(0), 600.0, 100.0),
        ControlSpec::new(ControlId::new(1), 300.0, 100.0),
    ];
    assert_eq!(select_strategy(&vp, board, &wide_first, 16.0), Strategy::Vertical);
}

#[test]
fn board_is_invariant_to_control_count() {
    let vp = ViewportInfo::new(1280.0, 800.0).unwrap();
    let opt = LayoutOptimizer::default();
    let edges: Vec<f64> = (1..15)
        .map(|n| opt.compute(&vp, &controls(200.0, n), 1.0).unwrap().board_edge())
        .collect();
    assert!(edges.iter().all(|&e| e == 768.0), "{edges:?}");
}

#[test]
fn minimum_viewport_keeps_minimum_board() {
    let plan = LayoutOptimizer::default()
        .compute(&ViewportInfo::new(320.0, 480.0).unwrap(), &controls(200.0, 4), 1.0)
        .unwrap();
    assert_eq!(plan.board_edge(), 288.0);
    let tiny_cap = LayoutOptimizer::new(OptimizerConfig::default().with_max_board_edge(Some(10.0)))
        .compute(&ViewportInfo::new(320.0, 480.0).unwrap(), &[], 1.0)
        .unwrap();
    assert_eq!(tiny_cap.board_edge(), 280.0);
}
