//! Structured log emission.
//!
//! Verifies that the runtime reports analyses, clamping, recorded errors, and
//! transitions on their stable targets.

use std::sync::{Arc, Mutex};

use boardfit_core::geometry::Rectangle;
use boardfit_layout::{ControlId, ControlSpec, RecordingPackager, StaticVisibility};
use boardfit_runtime::{EngineConfig, LayoutEngine, MemorySurface, Target};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use web_time::Instant;

#[derive(Debug, Clone)]
struct CapturedEvent {
    target: String,
    level: Level,
    message: String,
}

/// A tracing Layer that records every event.
#[derive(Clone, Default)]
struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl EventCapture {
    fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    fn has(&self, target: &str, level: Level, message: &str) -> bool {
        self.events()
            .iter()
            .any(|e| e.target == target && e.level == level && e.message.contains(message))
    }
}

struct MessageVisitor(String);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.0 = value.to_string();
        }
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            target: event.metadata().target().to_string(),
            level: *event.metadata().level(),
            message: visitor.0,
        });
    }
}

fn engine() -> LayoutEngine<StaticVisibility, MemorySurface, RecordingPackager> {
    let id = ControlId::new(1);
    LayoutEngine::new(
        EngineConfig::default(),
        StaticVisibility::new([ControlSpec::new(id, 240.0, 48.0)]),
        MemorySurface::new()
            .with(Target::Board, Rectangle::new(0.0, 0.0, 400.0, 400.0))
            .with(Target::Control(id), Rectangle::new(0.0, 420.0, 240.0, 48.0)),
        RecordingPackager::new(),
    )
}

fn capture(run: impl FnOnce()) -> EventCapture {
    let capture = EventCapture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    tracing::subscriber::with_default(subscriber, run);
    capture
}

#[test]
fn analysis_and_transition_are_logged() {
    let events = capture(|| {
        let mut e = engine();
        let t0 = Instant::now();
        e.on_change_at(1400.0, 800.0, t0);
        e.tick_at(t0 + std::time::Duration::from_millis(150));
        e.tick_at(t0 + std::time::Duration::from_millis(450));
    });
    assert!(events.has("boardfit.monitor", Level::TRACE, "analysis scheduled"));
    assert!(events.has("boardfit.monitor", Level::DEBUG, "viewport analyzed"));
    assert!(events.has("boardfit.transition", Level::DEBUG, "transition started"));
    assert!(events.has("boardfit.transition", Level::DEBUG, "transition completed"));
}

#[test]
fn clamping_warns() {
    let events = capture(|| {
        let mut e = engine();
        e.on_change_at(100.0, 9000.0, Instant::now());
    });
    assert!(events.has(
        "boardfit.monitor",
        Level::WARN,
        "viewport clamped into supported range"
    ));
}

#[test]
fn recorded_errors_are_emitted() {
    let events = capture(|| {
        let mut e = engine();
        e.on_change_at(f64::NAN, 600.0, Instant::now());
    });
    let errors: Vec<_> = events
        .events()
        .into_iter()
        .filter(|e| e.target == "boardfit.errors")
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].level, Level::WARN);
    assert!(errors[0].message.contains("recoverable layout error"));
}
