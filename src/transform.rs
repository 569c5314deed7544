//! Uniform-scale affine transform: `translate(x, y) · scale(k)`.
//!
//! A [`Transform`] is the matrix `[k 0 x; 0 k y; 0 0 1]`. It maps content
//! coordinates to screen coordinates with [`Transform::apply`] and back with
//! [`Transform::invert`]. Values are immutable; every operation returns a new
//! transform, mirroring how the zoom controller replaces its state wholesale.
//!
//! Composition is not commutative. [`Transform::translate_by`] multiplies on
//! the right, so its offset is expressed in content units and is scaled by the
//! current `k`; [`Transform::pan_by`] shifts the translation directly in screen
//! units.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TransformParseError;
use crate::geometry::Point;

/// Scale + translate transform from content space to screen space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Uniform scale factor. Always positive and finite.
    pub k: f64,
    /// Horizontal translation in screen units.
    pub x: f64,
    /// Vertical translation in screen units.
    pub y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self { k: 1.0, x: 0.0, y: 0.0 };

    #[must_use]
    pub fn new(k: f64, x: f64, y: f64) -> Self {
        Self { k, x, y }
    }

    /// Multiply the scale by `factor`, keeping the translation.
    #[must_use]
    pub fn scale(self, factor: f64) -> Self {
        Self { k: self.k * factor, ..self }
    }

    /// Translate by `(dx, dy)` content units: `self · translate(dx, dy)`.
    #[must_use]
    pub fn translate_by(self, dx: f64, dy: f64) -> Self {
        Self { k: self.k, x: self.x + self.k * dx, y: self.y + self.k * dy }
    }

    /// Shift the translation by `(dx, dy)` screen units: `translate(dx, dy) · self`.
    #[must_use]
    pub fn pan_by(self, dx: f64, dy: f64) -> Self {
        Self { k: self.k, x: self.x + dx, y: self.y + dy }
    }

    /// Map a content-space point to screen space.
    #[must_use]
    pub fn apply(&self, p: Point) -> Point {
        Point::new(p.x * self.k + self.x, p.y * self.k + self.y)
    }

    /// Map a screen-space point back to content space.
    #[must_use]
    pub fn invert(&self, p: Point) -> Point {
        Point::new((p.x - self.x) / self.k, (p.y - self.y) / self.k)
    }

    /// Convert a screen-space distance to content units.
    #[must_use]
    pub fn invert_distance(&self, d: f64) -> f64 {
        d / self.k
    }

    /// Rescale to `k` while holding the content point under `screen` fixed.
    #[must_use]
    pub fn zoom_around(self, screen: Point, k: f64) -> Self {
        let content = self.invert(screen);
        let scaled = self.scale(k / self.k);
        let landed = scaled.apply(content);
        scaled.pan_by(screen.x - landed.x, screen.y - landed.y)
    }

    /// Component-wise comparison within `epsilon`.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self.k - other.k).abs() <= epsilon
            && (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
    }

    /// Whether the scale is usable (positive and finite) and the translation finite.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.k > 0.0 && self.k.is_finite() && self.x.is_finite() && self.y.is_finite()
    }

    /// Attribute form, e.g. `translate(10,20) scale(2)`.
    #[must_use]
    pub fn to_attribute(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "translate({},{}) scale({})", self.x, self.y, self.k)
    }
}

impl FromStr for Transform {
    type Err = TransformParseError;

    /// Parse a sequence of `translate(..)` and `scale(..)` functions, composing
    /// them left to right. An empty string is the identity.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut out = Self::IDENTITY;
        let mut rest = s.trim();

        while !rest.is_empty() {
            let Some(open) = rest.find('(') else {
                return Err(TransformParseError::UnsupportedFunction(rest.to_owned()));
            };
            let Some(close_rel) = rest[open..].find(')') else {
                return Err(TransformParseError::MalformedArguments {
                    function: rest[..open].trim().to_owned(),
                    args: rest[open + 1..].to_owned(),
                });
            };
            let close = open + close_rel;
            let name = rest[..open].trim();
            let raw_args = &rest[open + 1..close];
            let args = parse_args(name, raw_args)?;

            out = match (name, args.as_slice()) {
                ("translate", [tx]) => out.translate_by(*tx, 0.0),
                ("translate", [tx, ty]) => out.translate_by(*tx, *ty),
                ("scale", [s]) => out.scale(*s),
                ("scale", [sx, sy]) if (sx - sy).abs() < f64::EPSILON => out.scale(*sx),
                ("translate" | "scale", _) => {
                    return Err(TransformParseError::MalformedArguments {
                        function: name.to_owned(),
                        args: raw_args.to_owned(),
                    });
                }
                _ => return Err(TransformParseError::UnsupportedFunction(name.to_owned())),
            };

            rest = rest[close + 1..].trim_start_matches(|c: char| c == ',' || c.is_whitespace());
        }

        if out.k > 0.0 && out.k.is_finite() {
            Ok(out)
        } else {
            Err(TransformParseError::InvalidScale(out.k))
        }
    }
}

fn parse_args(function: &str, raw: &str) -> Result<Vec<f64>, TransformParseError> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<f64>().map_err(|_| TransformParseError::MalformedArguments {
                function: function.to_owned(),
                args: raw.to_owned(),
            })
        })
        .collect()
}
