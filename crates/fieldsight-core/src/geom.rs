//! Cell coordinates, cell rectangles and positions on the field.
//!
//! [`Point`] and [`Range`] address grid cells. [`WorldPoint`] is a position
//! on the physical field in meters, with `x`/`y` on the ground plane and `z`
//! as elevation.

use std::fmt;

/// An integer cell coordinate. X grows along the field length, Y along its
/// width.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ZERO: Self = Self::new(0, 0);

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cells `min.x..max.x` by `min.y..max.y`, upper bounds excluded.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    pub min: Point,
    pub max: Point,
}

impl Range {
    /// The rectangle spanned by two corners, in any order.
    #[inline]
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            min: Point::new(x0.min(x1), y0.min(y1)),
            max: Point::new(x0.max(x1), y0.max(y1)),
        }
    }

    /// The cells of a `width × height` grid. Negative sizes give an empty
    /// range.
    #[inline]
    pub fn with_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width.max(0), height.max(0))
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y
    }

    #[inline]
    pub fn contains(self, p: Point) -> bool {
        (self.min.x..self.max.x).contains(&p.x) && (self.min.y..self.max.y).contains(&p.y)
    }

    /// Cells in both ranges; [`Range::default`] when they do not overlap.
    pub fn intersect(self, other: Range) -> Self {
        let r = Self {
            min: Point::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            max: Point::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        };
        if r.is_empty() { Self::default() } else { r }
    }

    /// Cells row by row, left to right.
    #[inline]
    pub fn iter(self) -> RangeIter {
        RangeIter {
            next: (!self.is_empty()).then_some(self.min),
            range: self,
        }
    }
}

impl IntoIterator for Range {
    type Item = Point;
    type IntoIter = RangeIter;

    fn into_iter(self) -> RangeIter {
        self.iter()
    }
}

/// Iterator returned by [`Range::iter`].
#[derive(Clone, Debug)]
pub struct RangeIter {
    range: Range,
    next: Option<Point>,
}

impl Iterator for RangeIter {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        let p = self.next?;
        let right = Point::new(p.x + 1, p.y);
        self.next = if right.x < self.range.max.x {
            Some(right)
        } else if p.y + 1 < self.range.max.y {
            Some(Point::new(self.range.min.x, p.y + 1))
        } else {
            None
        };
        Some(p)
    }
}

impl std::iter::FusedIterator for RangeIter {}

/// A continuous position on the field, in meters.
///
/// `x` runs along the field length, `y` along the field width and `z` is
/// elevation above the field floor.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl WorldPoint {
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// A ground-plane position with zero elevation.
    #[inline]
    pub const fn planar(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0)
    }

    /// The same planar position at elevation `z`.
    #[inline]
    pub const fn with_z(self, z: f64) -> Self {
        Self { z, ..self }
    }

    /// Distance on the ground plane, elevation ignored.
    #[inline]
    pub fn planar_distance(self, other: WorldPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Straight-line distance in 3D.
    #[inline]
    pub fn distance(self, other: WorldPoint) -> f64 {
        self.planar_distance(other).hypot(self.z - other.z)
    }
}
