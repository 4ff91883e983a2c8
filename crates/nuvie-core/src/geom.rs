//! Geometry primitives: screen-space [`Point`] and [`Range`], toroidal map
//! coordinates ([`MapCoord`], [`wrap`]) and the eight compass [`Direction`]s.

use std::fmt;
use std::ops::{Add, Mul, Sub};

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A 2D integer point. X grows right, Y grows down (screen coordinates).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Origin (0, 0).
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Return a point shifted by (dx, dy).
    #[inline]
    pub const fn shift(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Chebyshev distance: the number of king moves between two points.
    #[inline]
    pub fn distance(self, other: Point) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add for Point {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<i32> for Point {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: i32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

// ---------------------------------------------------------------------------
// Range
// ---------------------------------------------------------------------------

/// A half-open rectangle \[min, max). `min` is inclusive, `max` is exclusive.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    pub min: Point,
    pub max: Point,
}

impl Range {
    /// Create a new range from two corners, canonicalized so that
    /// `min` ≤ `max` on each axis.
    #[inline]
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            min: Point::new(x0.min(x1), y0.min(y1)),
            max: Point::new(x0.max(x1), y0.max(y1)),
        }
    }

    /// A range from a top-left corner and a size.
    #[inline]
    pub fn with_size(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self::new(x, y, x + w.max(0), y + h.max(0))
    }

    /// Size as a `Point` (width, height).
    #[inline]
    pub fn size(self) -> Point {
        Point::new(self.max.x - self.min.x, self.max.y - self.min.y)
    }

    #[inline]
    pub fn width(self) -> i32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(self) -> i32 {
        self.max.y - self.min.y
    }

    /// Whether the range has zero or negative area.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y
    }

    /// Whether `p` is inside the half-open range.
    #[inline]
    pub fn contains(self, p: Point) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }

    /// Intersection of two ranges. Returns the zero range if they do not
    /// overlap.
    #[inline]
    pub fn intersect(self, other: Range) -> Self {
        let r = Self {
            min: Point::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            max: Point::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        };
        if r.is_empty() { Self::default() } else { r }
    }

    /// Smallest range that contains both ranges.
    #[inline]
    pub fn union(self, other: Range) -> Self {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        Self {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Row-major iterator over every point in the range.
    #[inline]
    pub fn iter(self) -> RangeIter {
        RangeIter {
            range: self,
            cur: self.min,
        }
    }
}

impl IntoIterator for Range {
    type Item = Point;
    type IntoIter = RangeIter;
    #[inline]
    fn into_iter(self) -> RangeIter {
        self.iter()
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}-{})", self.min, self.max)
    }
}

/// Row-major iterator over the points in a [`Range`].
#[derive(Clone, Debug)]
pub struct RangeIter {
    range: Range,
    cur: Point,
}

impl Iterator for RangeIter {
    type Item = Point;

    #[inline]
    fn next(&mut self) -> Option<Point> {
        if self.cur.y >= self.range.max.y || self.range.is_empty() {
            return None;
        }
        let p = self.cur;
        self.cur.x += 1;
        if self.cur.x >= self.range.max.x {
            self.cur.x = self.range.min.x;
            self.cur.y += 1;
        }
        Some(p)
    }
}

// ---------------------------------------------------------------------------
// Toroidal wrap
// ---------------------------------------------------------------------------

/// Wrap `v` into `[0, size)`. A zero `size` yields 0.
#[inline]
pub fn wrap(v: i32, size: i32) -> i32 {
    if size <= 0 { 0 } else { v.rem_euclid(size) }
}

/// Signed offset of `p` from the viewport `origin` along one axis of a
/// wrapped map, in `(-size/2, size/2]`. Keeps points just across the seam
/// adjacent to a viewport that straddles it.
#[inline]
pub fn wrapped_offset(origin: i32, p: i32, size: i32) -> i32 {
    if size <= 0 {
        return p - origin;
    }
    let d = wrap(p - origin, size);
    if d > size / 2 { d - size } else { d }
}

// ---------------------------------------------------------------------------
// MapCoord
// ---------------------------------------------------------------------------

/// A location on a map level. `z` is 0 for the surface, 1.. for dungeons.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapCoord {
    pub x: u16,
    pub y: u16,
    pub z: u8,
}

impl MapCoord {
    #[inline]
    pub const fn new(x: u16, y: u16, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Chebyshev distance on the same plane. Levels are ignored.
    #[inline]
    pub fn distance(self, other: MapCoord) -> u16 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// The coordinate shifted by (dx, dy), wrapped into a `width`×`height`
    /// level.
    #[inline]
    pub fn offset(self, dx: i32, dy: i32, width: u16, height: u16) -> Self {
        Self {
            x: wrap(self.x as i32 + dx, width as i32) as u16,
            y: wrap(self.y as i32 + dy, height as i32) as u16,
            z: self.z,
        }
    }

    #[inline]
    pub fn point(self) -> Point {
        Point::new(self.x as i32, self.y as i32)
    }
}

impl fmt::Display for MapCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// One of the eight compass directions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    North,
    East,
    South,
    West,
    NorthEast,
    SouthEast,
    SouthWest,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::NorthEast,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::NorthWest,
    ];

    /// Unit step for this direction.
    pub const fn delta(self) -> Point {
        match self {
            Direction::North => Point::new(0, -1),
            Direction::East => Point::new(1, 0),
            Direction::South => Point::new(0, 1),
            Direction::West => Point::new(-1, 0),
            Direction::NorthEast => Point::new(1, -1),
            Direction::SouthEast => Point::new(1, 1),
            Direction::SouthWest => Point::new(-1, 1),
            Direction::NorthWest => Point::new(-1, -1),
        }
    }

    /// The direction of an arbitrary delta, by sign only. `None` for (0, 0).
    pub fn from_delta(dx: i32, dy: i32) -> Option<Direction> {
        match (dx.signum(), dy.signum()) {
            (0, -1) => Some(Direction::North),
            (1, 0) => Some(Direction::East),
            (0, 1) => Some(Direction::South),
            (-1, 0) => Some(Direction::West),
            (1, -1) => Some(Direction::NorthEast),
            (1, 1) => Some(Direction::SouthEast),
            (-1, 1) => Some(Direction::SouthWest),
            (-1, -1) => Some(Direction::NorthWest),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Direction::North => "North",
            Direction::East => "East",
            Direction::South => "South",
            Direction::West => "West",
            Direction::NorthEast => "Northeast",
            Direction::SouthEast => "Southeast",
            Direction::SouthWest => "Southwest",
            Direction::NorthWest => "Northwest",
        }
    }
}

/// Name of the direction of a delta, or "nowhere" for no movement.
pub fn direction_name(dx: i32, dy: i32) -> &'static str {
    Direction::from_delta(dx, dy).map_or("nowhere", Direction::name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_arithmetic() {
        let a = Point::new(1, 2);
        let b = Point::new(3, 4);
        assert_eq!(a + b, Point::new(4, 6));
        assert_eq!(b - a, Point::new(2, 2));
        assert_eq!(a * 3, Point::new(3, 6));
        assert_eq!(a.distance(Point::new(4, 0)), 3);
    }

    #[test]
    fn range_basics() {
        let r = Range::new(3, 2, 0, 0);
        assert_eq!(r.min, Point::new(0, 0));
        assert_eq!(r.size(), Point::new(3, 2));
        assert!(r.contains(Point::new(2, 1)));
        assert!(!r.contains(Point::new(3, 0)));
        assert_eq!(r.iter().count(), 6);
    }

    #[test]
    fn range_intersect_and_union() {
        let a = Range::new(0, 0, 4, 4);
        let b = Range::new(2, 2, 6, 6);
        assert_eq!(a.intersect(b), Range::new(2, 2, 4, 4));
        assert_eq!(a.union(b), Range::new(0, 0, 6, 6));
        assert!(a.intersect(Range::new(5, 5, 7, 7)).is_empty());
        assert_eq!(Range::default().union(b), b);
    }

    #[test]
    fn wrap_stays_in_bounds() {
        for width in [1, 7, 128, 1024] {
            for x in -3000..3000 {
                let w = wrap(x, width);
                assert!((0..width).contains(&w), "wrap({x}, {width}) = {w}");
                assert_eq!(wrap(w + width, width), w, "re-wrap of {x} for {width}");
            }
        }
        assert_eq!(wrap(5, 0), 0);
    }

    #[test]
    fn wrapped_offset_crosses_seam() {
        assert_eq!(wrapped_offset(1020, 2, 1024), 6);
        assert_eq!(wrapped_offset(2, 1020, 1024), -6);
        assert_eq!(wrapped_offset(10, 15, 1024), 5);
    }

    #[test]
    fn mapcoord_offset_wraps() {
        let c = MapCoord::new(0, 1023, 0);
        assert_eq!(c.offset(-1, 1, 1024, 1024), MapCoord::new(1023, 0, 0));
        assert_eq!(c.distance(MapCoord::new(3, 1020, 0)), 3);
    }

    #[test]
    fn direction_roundtrip_and_names() {
        for d in Direction::ALL {
            let p = d.delta();
            assert_eq!(Direction::from_delta(p.x, p.y), Some(d));
        }
        assert_eq!(Direction::from_delta(5, -2), Some(Direction::NorthEast));
        assert_eq!(direction_name(0, 0), "nowhere");
        assert_eq!(direction_name(0, -1), "North");
    }
}
