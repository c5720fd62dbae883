//! Points and small vector helpers.
//!
//! Positions travel on the wire as two-element arrays (`[x, y]`), so
//! [`Point`] serializes through `[f64; 2]`.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A point (or a 2-vector) in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Componentwise linear interpolation from `self` to `to`.
    #[must_use]
    pub fn lerp(self, to: Point, t: f64) -> Point {
        Point {
            x: lerp(self.x, to.x, t),
            y: lerp(self.y, to.y, t),
        }
    }

    /// Parse a `[x, y]` JSON array.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Point> {
        let items = value.as_array()?;
        let [x, y] = items.as_slice() else {
            return None;
        };
        Some(Point::new(x.as_f64()?, y.as_f64()?))
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Scalar linear interpolation.
#[must_use]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}
