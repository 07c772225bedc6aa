//! Points, sizes and the viewport that floating panels live in.

use serde::{Deserialize, Serialize};

/// A position in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X position (pixels from left).
    pub x: f32,
    /// Y position (pixels from top).
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - other`.
    #[must_use]
    pub fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// A width/height pair in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Size {
    /// Create a new size.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// The visible area panels are constrained to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Viewport width in pixels.
    pub width: f32,
    /// Viewport height in pixels.
    pub height: f32,
}

impl Viewport {
    /// Create a new viewport.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Position and size of one floating panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PanelGeometry {
    /// Top-left corner.
    pub position: Point,
    /// Panel size, header included.
    pub size: Size,
}

impl PanelGeometry {
    /// Check if a point lies within the panel rectangle (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        let p = self.position;
        point.x >= p.x
            && point.x <= p.x + self.size.width
            && point.y >= p.y
            && point.y <= p.y + self.size.height
    }
}

/// Clamp `value` into `[0, max(0, upper)]`.
///
/// A panel larger than the viewport pins to the origin instead of producing
/// an empty range.
#[must_use]
pub fn clamp_to_range(value: f32, upper: f32) -> f32 {
    value.min(upper.max(0.0)).max(0.0)
}
