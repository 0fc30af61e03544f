//! End-to-end engine runs with geometric visibility.

use std::time::Duration;

use boardfit_core::geometry::Rectangle;
use boardfit_layout::{ControlId, GeometricVisibility, RecordingPackager, Strategy};
use boardfit_runtime::{
    ControlSurface, EngineConfig, LayoutEngine, MemorySurface, RendererState, Target,
};
use web_time::Instant;

const MS: Duration = Duration::from_millis(1);

fn home(id: u32) -> Rectangle {
    match id {
        1 => Rectangle::new(1500.0, 100.0, 200.0, 48.0),
        _ => Rectangle::new(100.0, 900.0, 200.0, 48.0),
    }
}

fn engine() -> LayoutEngine<GeometricVisibility, MemorySurface, RecordingPackager> {
    let mut visibility = GeometricVisibility::new();
    let mut surface =
        MemorySurface::new().with(Target::Board, Rectangle::new(0.0, 0.0, 500.0, 500.0));
    for id in [1, 2] {
        visibility.track(ControlId::new(id), home(id));
        surface.insert(Target::Control(ControlId::new(id)), home(id));
    }
    LayoutEngine::new(
        EngineConfig::default(),
        visibility,
        surface,
        RecordingPackager::new(),
    )
}

#[test]
fn offscreen_controls_are_relocated_then_released() {
    let mut e = engine();
    let t0 = Instant::now();

    e.on_change_at(1280.0, 800.0, t0);
    let tick = e.tick_at(t0 + 150 * MS);
    assert!(tick.applied.is_some());
    let plan = e.monitor().state().last_plan.clone().unwrap();
    assert_eq!(plan.strategy(), Strategy::Horizontal);
    assert_eq!(plan.controls().len(), 2);

    e.tick_at(t0 + 450 * MS);
    assert_eq!(e.renderer().renderer_state(), RendererState::Idle);
    for placed in plan.controls() {
        let rect = e.renderer().surface().measure(Target::Control(placed.id)).unwrap();
        assert_eq!(rect, placed.rect);
        assert!(rect.right() <= 1280.0 && rect.bottom() <= 800.0);
    }

    // Large enough that both home rects are visible again.
    e.on_change_at(1920.0, 1080.0, t0 + 500 * MS);
    e.tick_at(t0 + 650 * MS);
    let plan = e.monitor().state().last_plan.clone().unwrap();
    assert!(plan.controls().is_empty());
    assert!(!plan.requires_scrolling());
    assert!(e.scroll_regions().is_empty());
    assert_eq!(e.performance_stats().analyses, 2);

    e.tick_at(t0 + 950 * MS);
    assert_eq!(e.renderer().renderer_state(), RendererState::Idle);
    for id in [1, 2] {
        let rect = e.renderer().surface().measure(Target::Control(ControlId::new(id)));
        assert_eq!(rect, Some(home(id)));
    }
}

#[test]
fn revert_restores_home_rects() {
    let mut e = engine();
    let t0 = Instant::now();
    e.on_change_at(1280.0, 800.0, t0);
    e.tick_at(t0 + 150 * MS);
    let revert = e.revert_to_default_at(None, t0 + 200 * MS);
    assert_eq!(e.renderer().queue_len(), 1);

    e.tick_at(t0 + 450 * MS);
    e.tick_at(t0 + 750 * MS);
    assert!(revert.is_complete());
    let surface = e.renderer().surface();
    assert_eq!(surface.measure(Target::Board), Some(Rectangle::new(0.0, 0.0, 500.0, 500.0)));
    for id in [1, 2] {
        assert_eq!(surface.measure(Target::Control(ControlId::new(id))), Some(home(id)));
    }
}

#[test]
fn idle_engine_has_nothing_scheduled() {
    let e = engine();
    assert_eq!(e.time_until_next(Instant::now()), None);
    assert!(!e.is_animating());
    assert!(e.error_log().is_empty());
}
