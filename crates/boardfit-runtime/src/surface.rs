#![forbid(unsafe_code)]

//! Host-side geometry access for the transition renderer.

use std::collections::HashMap;
use std::fmt;

use boardfit_core::geometry::Rectangle;
use boardfit_layout::ControlId;

/// Something the renderer can position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Target {
    Board,
    Control(ControlId),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Board => f.write_str("board"),
            Self::Control(id) => write!(f, "{id}"),
        }
    }
}

/// How a rect is applied to a live element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum PlacementMode {
    /// Offset from the element's layout position (compositor friendly).
    #[default]
    Transform,
    /// Absolute coordinates in the viewport.
    Absolute,
}

impl PlacementMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transform => "transform",
            Self::Absolute => "absolute",
        }
    }
}

/// A target could not be updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceError {
    pub target: Target,
    pub message: String,
}

impl SurfaceError {
    pub fn new(target: Target, message: impl Into<String>) -> Self {
        Self {
            target,
            message: message.into(),
        }
    }
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot update {}: {}", self.target, self.message)
    }
}

impl std::error::Error for SurfaceError {}

/// Geometry-only view of the live board and controls.
pub trait ControlSurface {
    /// Current rect of a target, `None` if it cannot be located.
    fn measure(&self, target: Target) -> Option<Rectangle>;

    /// Move a target.
    fn place(&mut self, target: Target, rect: Rectangle, mode: PlacementMode) -> Result<(), SurfaceError>;
}

impl<T: ControlSurface + ?Sized> ControlSurface for Box<T> {
    fn measure(&self, target: Target) -> Option<Rectangle> {
        (**self).measure(target)
    }

    fn place(&mut self, target: Target, rect: Rectangle, mode: PlacementMode) -> Result<(), SurfaceError> {
        (**self).place(target, rect, mode)
    }
}

/// In-memory surface. Targets must be registered before they can be placed.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    rects: HashMap<Target, Rectangle>,
    placements: u64,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a target at its initial rect.
    pub fn insert(&mut self, target: Target, rect: Rectangle) {
        self.rects.insert(target, rect);
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, target: Target, rect: Rectangle) -> Self {
        self.insert(target, rect);
        self
    }

    /// Unregister a target; later placements fail.
    pub fn remove(&mut self, target: Target) -> Option<Rectangle> {
        self.rects.remove(&target)
    }

    /// Successful `place` calls so far.
    pub fn placements(&self) -> u64 {
        self.placements
    }
}

impl ControlSurface for MemorySurface {
    fn measure(&self, target: Target) -> Option<Rectangle> {
        self.rects.get(&target).copied()
    }

    fn place(&mut self, target: Target, rect: Rectangle, _mode: PlacementMode) -> Result<(), SurfaceError> {
        match self.rects.get_mut(&target) {
            Some(slot) => {
                *slot = rect;
                self.placements += 1;
                Ok(())
            }
            None => Err(SurfaceError::new(target, "not attached")),
        }
    }
}
