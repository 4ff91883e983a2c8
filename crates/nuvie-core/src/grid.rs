//! A dense, owned 2D [`Grid`] of `Copy` values.
//!
//! Used for map tile layers, the visibility scratch buffer and per-pixel
//! alpha maps. Out-of-bounds reads return `None`, out-of-bounds writes are
//! ignored.

use crate::geom::{Point, Range};

/// A row-major 2D buffer of `T`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid<T> {
    cells: Vec<T>,
    width: i32,
    height: i32,
}

impl<T: Copy + Default> Grid<T> {
    /// Create a new grid filled with `T::default()`. Negative sizes are
    /// clamped to zero.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            cells: vec![T::default(); (width * height) as usize],
            width,
            height,
        }
    }

    /// Create a grid filled with `value`.
    pub fn filled(width: i32, height: i32, value: T) -> Self {
        let mut g = Self::new(width, height);
        g.fill(value);
        g
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Size as a `Point` (width, height).
    #[inline]
    pub fn size(&self) -> Point {
        Point::new(self.width, self.height)
    }

    /// The range `[0, width) × [0, height)`.
    #[inline]
    pub fn bounds(&self) -> Range {
        Range::new(0, 0, self.width, self.height)
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    #[inline]
    fn index(&self, p: Point) -> Option<usize> {
        if self.contains(p) {
            Some((p.y * self.width + p.x) as usize)
        } else {
            None
        }
    }

    /// Get the value at a point, or `None` if out of bounds.
    #[inline]
    pub fn at(&self, p: Point) -> Option<T> {
        self.index(p).map(|i| self.cells[i])
    }

    /// Get the value at a point, or `T::default()` if out of bounds.
    #[inline]
    pub fn at_or_default(&self, p: Point) -> T {
        self.at(p).unwrap_or_default()
    }

    /// Set the value at a point. Does nothing if out of bounds.
    #[inline]
    pub fn set(&mut self, p: Point, value: T) {
        if let Some(i) = self.index(p) {
            self.cells[i] = value;
        }
    }

    /// Fill the whole grid with `value`.
    pub fn fill(&mut self, value: T) {
        self.cells.fill(value);
    }

    /// Fill the part of `r` that lies inside the grid with `value`.
    pub fn fill_range(&mut self, r: Range, value: T) {
        for p in r.intersect(self.bounds()) {
            self.set(p, value);
        }
    }

    /// Number of cells for which `f` returns true.
    pub fn count_fn(&self, mut f: impl FnMut(Point, T) -> bool) -> usize {
        self.iter().filter(|&(p, v)| f(p, v)).count()
    }

    /// Row-major iterator over `(Point, T)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Point, T)> + '_ {
        self.bounds().iter().zip(self.cells.iter().copied())
    }

    /// The raw row-major cell buffer.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_size() {
        let g: Grid<u16> = Grid::new(4, 3);
        assert_eq!(g.size(), Point::new(4, 3));
        assert_eq!(g.as_slice().len(), 12);
        assert_eq!(Grid::<u8>::new(-2, 5).size(), Point::new(0, 5));
    }

    #[test]
    fn test_set_and_at() {
        let mut g: Grid<u16> = Grid::new(4, 3);
        g.set(Point::new(3, 2), 7);
        g.set(Point::new(4, 2), 9);
        assert_eq!(g.at(Point::new(3, 2)), Some(7));
        assert_eq!(g.at(Point::new(4, 2)), None, "out of bounds read");
        assert_eq!(g.at_or_default(Point::new(-1, 0)), 0);
        assert_eq!(g.count_fn(|_, v| v != 0), 1, "out of bounds write ignored");
    }

    #[test]
    fn test_fill_range_clips() {
        let mut g: Grid<u8> = Grid::filled(5, 5, 1);
        g.fill_range(Range::new(3, 3, 10, 10), 0);
        assert_eq!(g.count_fn(|_, v| v == 0), 4);
        assert_eq!(g.iter().nth(6), Some((Point::new(1, 1), 1)));
    }
}
