//! Planar geometry
//!
//! coordinate system: mathematical, y grows upward. "Left" of a direction `d` is `d` rotated
//! counter-clockwise by a right angle.
//!
//! ```svgbob
//!   ^ y
//!   |     left
//!   |      ^
//!   |      |
//!   |      *-----> d
//!   |
//!   +------------------> x
//! ```
use derive_more::{Add, Display, Mul, Neg, Sub};
use std::f64::consts::TAU;

/// A point on the plane. Also used as a 2D vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Add, Sub, Neg, Mul, Display)]
#[display(fmt = "({}, {})", x, y)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub const fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn dot(&self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product. Positive when `other` is counter-clockwise of `self`.
    pub fn cross(&self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (*self - *other).length()
    }

    /// Returns the unit vector, or `None` for a (near) zero vector.
    pub fn normalize(&self) -> Option<Point> {
        let len = self.length();
        if len <= f64::EPSILON || !len.is_finite() {
            None
        } else {
            Some(Point::new(self.x / len, self.y / len))
        }
    }

    /// `self` rotated counter-clockwise by 90°.
    pub fn left_normal(&self) -> Point {
        Point::new(-self.y, self.x)
    }

    pub fn lerp(&self, other: Point, t: f64) -> Point {
        *self + (other - *self) * t
    }

    /// Angle from `+x`, counter-clockwise, in `(-π, π]`.
    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Clockwise angle from direction `from` to direction `to`, in `[0, 2π)`.
pub fn clockwise_angle(from: Point, to: Point) -> f64 {
    let a = from.angle() - to.angle();
    let a = a.rem_euclid(TAU);
    // `rem_euclid` may round up to exactly TAU for tiny negative inputs.
    if a >= TAU {
        0.0
    } else {
        a
    }
}

/// Unsigned angle between two directions, in `[0, π]`.
pub fn angle_between(a: Point, b: Point) -> f64 {
    a.cross(b).atan2(a.dot(b)).abs()
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle, used as the boundary shape of a node.
///
/// ```svgbob
///            minX       midX      maxX
///   (origin) *----------*----------* minY
///            |                     |
///            * (center) *          * midY
///            |                     |
///            *----------*----------* maxY
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// A rectangle of `size` centered on `center`.
    pub fn centered(center: Point, size: Size) -> Self {
        let origin = Point::new(center.x - size.width / 2.0, center.y - size.height / 2.0);
        Self::new(origin, size)
    }

    pub fn center(&self) -> Point {
        Point::new(self.mid_x(), self.mid_y())
    }

    pub fn min_x(&self) -> f64 {
        self.origin.x
    }

    pub fn mid_x(&self) -> f64 {
        self.origin.x + self.size.width / 2.0
    }

    pub fn max_x(&self) -> f64 {
        self.origin.x + self.size.width
    }

    pub fn min_y(&self) -> f64 {
        self.origin.y
    }

    pub fn mid_y(&self) -> f64 {
        self.origin.y + self.size.height / 2.0
    }

    pub fn max_y(&self) -> f64 {
        self.origin.y + self.size.height
    }

    /// Shrinks (positive) or grows (negative) the rectangle on every side.
    pub fn inset_by(&self, dx: f64, dy: f64) -> Self {
        Self::new(
            Point::new(self.origin.x + dx, self.origin.y + dy),
            Size::new(
                (self.size.width - dx * 2.0).max(0.0),
                (self.size.height - dy * 2.0).max(0.0),
            ),
        )
    }

    /// Strict containment; points on the border are outside.
    pub fn contains_point(&self, p: &Point) -> bool {
        p.x > self.min_x() && p.x < self.max_x() && p.y > self.min_y() && p.y < self.max_y()
    }

    /// Returns `true` if the line segment `p`-`q` passes through the interior.
    pub fn intersects_line(&self, p: &Point, q: &Point) -> bool {
        if self.contains_point(p) || self.contains_point(q) {
            return true;
        }

        // Liang-Barsky clipping against the open rectangle.
        let d = *q - *p;
        let mut t0 = 0.0f64;
        let mut t1 = 1.0f64;

        for (denom, num) in [
            (-d.x, p.x - self.min_x()),
            (d.x, self.max_x() - p.x),
            (-d.y, p.y - self.min_y()),
            (d.y, self.max_y() - p.y),
        ] {
            if denom == 0.0 {
                if num <= 0.0 {
                    return false;
                }
                continue;
            }
            let t = num / denom;
            if denom < 0.0 {
                t0 = t0.max(t);
            } else {
                t1 = t1.min(t);
            }
            if t0 >= t1 {
                return false;
            }
        }

        self.contains_point(&p.lerp(*q, (t0 + t1) / 2.0))
    }
}
