#![forbid(unsafe_code)]

//! Geometric value types.
//!
//! All coordinates are layout units in `f64`, origin at the top-left corner of
//! the viewport. Values are plain `Copy` data; the only fallible step is
//! [`Rectangle::validate`], which every consumer runs before trusting a rect.

use std::fmt;

/// Smallest accepted viewport width.
pub const MIN_VIEWPORT_WIDTH: f64 = 320.0;
/// Largest accepted viewport width.
pub const MAX_VIEWPORT_WIDTH: f64 = 3840.0;
/// Smallest accepted viewport height.
pub const MIN_VIEWPORT_HEIGHT: f64 = 480.0;
/// Largest accepted viewport height.
pub const MAX_VIEWPORT_HEIGHT: f64 = 2160.0;

/// Aspect ratio above which a viewport is classified as ultra-wide.
pub const ULTRA_WIDE_RATIO: f64 = 3.0;
/// Aspect ratio below which a viewport is classified as very tall.
pub const VERY_TALL_RATIO: f64 = 0.33;

/// Reason a geometric value was rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryError {
    /// A field was NaN or infinite.
    NonFinite { field: &'static str, value: f64 },
    /// A coordinate was negative.
    Negative { field: &'static str, value: f64 },
    /// An extent was zero or negative.
    Empty { field: &'static str, value: f64 },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite { field, value } => write!(f, "{field} is not finite ({value})"),
            Self::Negative { field, value } => write!(f, "{field} is negative ({value})"),
            Self::Empty { field, value } => write!(f, "{field} must be positive ({value})"),
        }
    }
}

impl std::error::Error for GeometryError {}

#[inline]
fn check_finite(field: &'static str, value: f64) -> Result<f64, GeometryError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(GeometryError::NonFinite { field, value })
    }
}

#[inline]
fn check_positive(field: &'static str, value: f64) -> Result<f64, GeometryError> {
    let value = check_finite(field, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(GeometryError::Empty { field, value })
    }
}

/// Width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimensions {
    pub w: f64,
    pub h: f64,
}

impl Dimensions {
    /// Create a new size.
    #[inline]
    pub const fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }

    /// Whether both extents are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.w.is_finite() && self.h.is_finite()
    }

    /// Require finite, strictly positive extents.
    pub fn validate(&self) -> Result<(), GeometryError> {
        check_positive("w", self.w)?;
        check_positive("h", self.h)?;
        Ok(())
    }

    /// Width over height, or `None` for a degenerate size.
    #[inline]
    pub fn aspect_ratio(&self) -> Option<f64> {
        (self.h > 0.0 && self.is_finite()).then(|| self.w / self.h)
    }

    /// Shorter of the two extents.
    #[inline]
    pub fn short_side(&self) -> f64 {
        self.w.min(self.h)
    }
}

/// Axis-aligned rectangle.
///
/// A valid rectangle has finite fields, `x >= 0`, `y >= 0`, `w > 0`, `h > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rectangle {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Place a size at the given origin.
    #[inline]
    pub const fn from_origin(x: f64, y: f64, size: Dimensions) -> Self {
        Self::new(x, y, size.w, size.h)
    }

    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Extents as [`Dimensions`].
    #[inline]
    pub fn size(&self) -> Dimensions {
        Dimensions::new(self.w, self.h)
    }

    /// Area in square units.
    #[inline]
    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    /// Check the rectangle invariant.
    pub fn validate(&self) -> Result<(), GeometryError> {
        for (field, value) in [("x", self.x), ("y", self.y)] {
            if check_finite(field, value)? < 0.0 {
                return Err(GeometryError::Negative { field, value });
            }
        }
        check_positive("w", self.w)?;
        check_positive("h", self.h)?;
        Ok(())
    }

    /// Whether `other` lies entirely inside `self` (edges may touch).
    #[inline]
    pub fn contains_rect(&self, other: &Rectangle) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Whether the interiors of the two rectangles overlap.
    #[inline]
    pub fn intersects(&self, other: &Rectangle) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Separation between two rectangles on each axis.
    ///
    /// Zero on an axis where their projections touch or overlap.
    pub fn separation(&self, other: &Rectangle) -> (f64, f64) {
        let dx = (other.x - self.right()).max(self.x - other.right()).max(0.0);
        let dy = (other.y - self.bottom()).max(self.y - other.bottom()).max(0.0);
        (dx, dy)
    }

    /// Largest per-axis separation; the gap used for adjacency checks.
    #[inline]
    pub fn gap_to(&self, other: &Rectangle) -> f64 {
        let (dx, dy) = self.separation(other);
        dx.max(dy)
    }

    /// Linear interpolation between `self` (t = 0) and `to` (t = 1).
    pub fn lerp(&self, to: &Rectangle, t: f64) -> Rectangle {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Rectangle::new(mix(self.x, to.x), mix(self.y, to.y), mix(self.w, to.w), mix(self.h, to.h))
    }

    /// Whether every field is within `tolerance` of `other`.
    pub fn approx_eq(&self, other: &Rectangle, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.w - other.w).abs() <= tolerance
            && (self.h - other.h).abs() <= tolerance
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1},{:.1} {:.1}x{:.1}", self.x, self.y, self.w, self.h)
    }
}

/// Viewport orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// Classify a size. Square viewports count as landscape.
    #[inline]
    pub fn of(width: f64, height: f64) -> Self {
        if height > width {
            Self::Portrait
        } else {
            Self::Landscape
        }
    }

    /// Stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Portrait => "portrait",
            Self::Landscape => "landscape",
        }
    }
}

/// Extreme aspect-ratio classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ExtremeKind {
    #[default]
    None,
    /// Aspect ratio above [`ULTRA_WIDE_RATIO`].
    UltraWide,
    /// Aspect ratio below [`VERY_TALL_RATIO`].
    VeryTall,
}

impl ExtremeKind {
    /// Classify an aspect ratio.
    pub fn of(aspect_ratio: f64) -> Self {
        if aspect_ratio > ULTRA_WIDE_RATIO {
            Self::UltraWide
        } else if aspect_ratio < VERY_TALL_RATIO {
            Self::VeryTall
        } else {
            Self::None
        }
    }

    /// Stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::UltraWide => "ultra_wide",
            Self::VeryTall => "very_tall",
        }
    }
}

/// Accepted viewport range. Raw sizes are clamped into it before analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ViewportBounds {
    pub min_width: f64,
    pub max_width: f64,
    pub min_height: f64,
    pub max_height: f64,
}

impl Default for ViewportBounds {
    fn default() -> Self {
        Self {
            min_width: MIN_VIEWPORT_WIDTH,
            max_width: MAX_VIEWPORT_WIDTH,
            min_height: MIN_VIEWPORT_HEIGHT,
            max_height: MAX_VIEWPORT_HEIGHT,
        }
    }
}

impl ViewportBounds {
    /// Clamp a finite size into range. Returns the clamped size and whether
    /// either axis moved.
    ///
    /// NaN bounds are ignored on that side rather than propagated.
    pub fn clamp(&self, width: f64, height: f64) -> (Dimensions, bool) {
        let w = width
            .max(self.min_width)
            .min(self.max_width.max(self.min_width));
        let h = height
            .max(self.min_height)
            .min(self.max_height.max(self.min_height));
        (Dimensions::new(w, h), w != width || h != height)
    }

    /// Positive, finite, non-empty on both axes.
    pub fn is_valid(&self) -> bool {
        [self.min_width, self.max_width, self.min_height, self.max_height]
            .iter()
            .all(|v| v.is_finite())
            && self.min_width > 0.0
            && self.min_width <= self.max_width
            && self.min_height > 0.0
            && self.min_height <= self.max_height
    }

    /// Whether a size lies inside the range.
    pub fn contains(&self, size: Dimensions) -> bool {
        (self.min_width..=self.max_width).contains(&size.w)
            && (self.min_height..=self.max_height).contains(&size.h)
    }
}

/// Derived description of a viewport for one analysis cycle.
///
/// Immutable: fields are private and computed once in [`ViewportInfo::new`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportInfo {
    width: f64,
    height: f64,
    aspect_ratio: f64,
    orientation: Orientation,
    extreme_kind: ExtremeKind,
}

impl ViewportInfo {
    /// Describe a viewport of the given size.
    ///
    /// Both extents must be finite and positive; range clamping is the
    /// caller's concern (see [`ViewportBounds`]).
    pub fn new(width: f64, height: f64) -> Result<Self, GeometryError> {
        let width = check_positive("width", width)?;
        let height = check_positive("height", height)?;
        let aspect_ratio = width / height;
        Ok(Self {
            width,
            height,
            aspect_ratio,
            orientation: Orientation::of(width, height),
            extreme_kind: ExtremeKind::of(aspect_ratio),
        })
    }

    /// Describe a size, clamped into `bounds` first.
    pub fn clamped(
        width: f64,
        height: f64,
        bounds: &ViewportBounds,
    ) -> Result<(Self, bool), GeometryError> {
        check_finite("width", width)?;
        check_finite("height", height)?;
        let (size, clamped) = bounds.clamp(width, height);
        Ok((Self::new(size.w, size.h)?, clamped))
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[inline]
    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    #[inline]
    pub fn extreme_kind(&self) -> ExtremeKind {
        self.extreme_kind
    }

    /// Viewport extents.
    #[inline]
    pub fn size(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// The viewport as a rectangle at the origin.
    #[inline]
    pub fn bounds(&self) -> Rectangle {
        Rectangle::new(0.0, 0.0, self.width, self.height)
    }

    /// Whether `rect` is fully visible.
    #[inline]
    pub fn contains(&self, rect: &Rectangle) -> bool {
        self.bounds().contains_rect(rect)
    }

    /// Whether both axes moved by less than `threshold` relative to `other`.
    pub fn within_threshold(&self, other: &ViewportInfo, threshold: f64) -> bool {
        (self.width - other.width).abs() < threshold
            && (self.height - other.height).abs() < threshold
    }
}

/// Viewport assumed when no measurement is available.
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 1024.0;
/// Viewport assumed when no measurement is available.
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 768.0;

impl Default for ViewportInfo {
    /// A 1024x768 landscape viewport.
    fn default() -> Self {
        let aspect_ratio = DEFAULT_VIEWPORT_WIDTH / DEFAULT_VIEWPORT_HEIGHT;
        Self {
            width: DEFAULT_VIEWPORT_WIDTH,
            height: DEFAULT_VIEWPORT_HEIGHT,
            aspect_ratio,
            orientation: Orientation::Landscape,
            extreme_kind: ExtremeKind::of(aspect_ratio),
        }
    }
}

impl fmt::Display for ViewportInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.0}x{:.0} ({}, ratio {:.3}, extreme {})",
            self.width,
            self.height,
            self.orientation.as_str(),
            self.aspect_ratio,
            self.extreme_kind.as_str()
        )
    }
}
