//! Plain geometry values shared by every controller.
//!
//! Points are interpreted by context: pointer events carry points in the
//! root's screen space, controllers convert them into content space through a
//! [`crate::transform::Transform`] and the surface's outer scale.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

/// A point in either screen or content space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate, growing downward.
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - other`.
    #[must_use]
    pub fn delta_from(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    /// Divide both components by a uniform factor. A non-positive factor
    /// leaves the point unchanged.
    #[must_use]
    pub fn scaled_down(self, factor: f64) -> Point {
        if factor > 0.0 && factor.is_finite() {
            Point::new(self.x / factor, self.y / factor)
        } else {
            self
        }
    }
}

/// Width and height of a viewport or element.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle given by its two corners. `x0 <= x1` and `y0 <= y1`
/// hold for every rectangle built through [`Rect::from_corners`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x0: f64,
    /// Top edge.
    pub y0: f64,
    /// Right edge.
    pub x1: f64,
    /// Bottom edge.
    pub y1: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Normalized rectangle spanning two arbitrary corner points.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x0: a.x.min(b.x),
            y0: a.y.min(b.y),
            x1: a.x.max(b.x),
            y1: a.y.max(b.y),
        }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x0 && p.x <= self.x1 && p.y >= self.y0 && p.y <= self.y1
    }

    /// Clamp a point into this rectangle. An inverted rectangle resolves to
    /// its `x1`/`y1` edge instead of panicking like `f64::clamp`.
    #[must_use]
    pub fn clamp(&self, p: Point) -> Point {
        Point::new(p.x.max(self.x0).min(self.x1), p.y.max(self.y0).min(self.y1))
    }
}
