#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! All coordinates are logical pixels with the origin at the top-left of the
//! list's coordinate space. `y` grows downward.

use serde::{Deserialize, Serialize};

/// An immutable sample of pointer position.
///
/// Produced by the pointer tracker for every accepted event of a gesture and
/// never kept past the end of that gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GesturePoint {
    /// Horizontal position.
    pub x: f32,
    /// Vertical position.
    pub y: f32,
    /// Host timestamp in milliseconds. Only ordering matters.
    pub timestamp_ms: u64,
}

impl GesturePoint {
    /// Create a new sample.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32, timestamp_ms: u64) -> Self {
        Self { x, y, timestamp_ms }
    }

    /// Signed vertical displacement from `origin` (positive = downward).
    #[inline]
    #[must_use]
    pub fn dy_from(&self, origin: &Self) -> f32 {
        self.y - origin.y
    }

    /// Signed horizontal displacement from `origin`.
    #[inline]
    #[must_use]
    pub fn dx_from(&self, origin: &Self) -> f32 {
        self.x - origin.x
    }
}

/// Vertical extent of one list row.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RowBounds {
    /// Top edge (inclusive).
    pub top: f32,
    /// Row height.
    pub height: f32,
}

impl RowBounds {
    /// Create new row bounds.
    #[inline]
    #[must_use]
    pub const fn new(top: f32, height: f32) -> Self {
        Self { top, height }
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Vertical midpoint.
    #[inline]
    #[must_use]
    pub fn mid_y(&self) -> f32 {
        self.top + self.height / 2.0
    }

    /// Check if `y` falls inside the row.
    #[inline]
    #[must_use]
    pub fn contains_y(&self, y: f32) -> bool {
        y >= self.top && y < self.bottom()
    }
}

/// An axis-aligned rectangle used for handle hit testing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: f32,
    /// Top edge (inclusive).
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    #[inline]
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Check if the rectangle has zero (or negative) area.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        !self.is_empty() && x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Return a copy moved vertically by `dy`.
    #[inline]
    #[must_use]
    pub fn offset_y(&self, dy: f32) -> Self {
        Self {
            y: self.y + dy,
            ..*self
        }
    }
}
