#![forbid(unsafe_code)]

//! Core: geometry value types, transition easing, and logging helpers shared
//! by the boardfit layout and runtime crates.

pub mod animation;
pub mod geometry;
pub mod logging;

pub use animation::{Animation, Easing, Tween};
pub use geometry::{
    Dimensions, ExtremeKind, GeometryError, Orientation, Rectangle, ViewportBounds, ViewportInfo,
};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, error, info, trace, warn};
