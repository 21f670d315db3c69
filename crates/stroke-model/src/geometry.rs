//! Two-dimensional vector type and interpolation helpers.

use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// A point or displacement in stroke space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Euclidean length.
    pub fn norm(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Vec2) -> f64 {
        (self - other).norm()
    }

    /// Linear interpolation, `t` clamped to `[0, 1]`.
    pub fn lerp(a: Vec2, b: Vec2, t: f64) -> Vec2 {
        a + (b - a) * t.clamp(0.0, 1.0)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Vec2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Vec2 {
    type Output = Vec2;
    fn div(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Inverse linear interpolation clamped to `[0, 1]`.
///
/// Returns 0 when `value <= start` and 1 when `value >= end`. A degenerate
/// range (`start == end`) yields 1 for values above it and 0 otherwise.
pub fn normalize01(start: f64, end: f64, value: f64) -> f64 {
    if start == end {
        if value > start {
            1.0
        } else {
            0.0
        }
    } else {
        ((value - start) / (end - start)).clamp(0.0, 1.0)
    }
}

/// Scalar linear interpolation, `t` clamped to `[0, 1]`.
pub fn lerp(start: f64, end: f64, t: f64) -> f64 {
    start + (end - start) * t.clamp(0.0, 1.0)
}

/// Parameter along `start..end` of the point closest to `point`, clamped to
/// `[0, 1]`. A degenerate segment returns 0.
pub fn nearest_point_on_segment(start: Vec2, end: Vec2, point: Vec2) -> f64 {
    if start == end {
        return 0.0;
    }
    let segment = end - start;
    ((point - start).dot(segment) / segment.dot(segment)).clamp(0.0, 1.0)
}
