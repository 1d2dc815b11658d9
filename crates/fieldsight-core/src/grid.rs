//! A typed 2D grid with bounds-checked access.
//!
//! [`Grid`] stores one value per cell in row-major order and is addressed by
//! [`Point`]. Every read goes through [`Grid::get`]/[`Grid::at`], which return
//! `None` outside the grid, so callers never index out of bounds.

use crate::geom::{Point, Range};

/// A `width × height` grid of `T` values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid<T> {
    cells: Vec<T>,
    width: i32,
    height: i32,
}

impl<T: Clone> Grid<T> {
    /// Create a grid with every cell set to `value`.
    ///
    /// Negative dimensions are treated as zero.
    pub fn filled(width: i32, height: i32, value: T) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            cells: vec![value; (width as usize) * (height as usize)],
            width,
            height,
        }
    }
}

impl<T> Grid<T> {
    /// Build a grid by evaluating `f` at every cell, in row-major order.
    pub fn from_fn(width: i32, height: i32, f: impl FnMut(Point) -> T) -> Self {
        let (width, height) = (width.max(0), height.max(0));
        Self {
            cells: Range::with_size(width, height).iter().map(f).collect(),
            width,
            height,
        }
    }

    /// Wrap an existing row-major buffer.
    ///
    /// Returns `None` unless `cells.len() == width * height`.
    pub fn from_vec(width: i32, height: i32, cells: Vec<T>) -> Option<Self> {
        let (width, height) = (width.max(0), height.max(0));
        if cells.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            cells,
            width,
            height,
        })
    }

    /// The range of valid points.
    #[inline]
    pub fn bounds(&self) -> Range {
        Range::with_size(self.width, self.height)
    }

    /// Returns the size as a Point (width = x, height = y).
    #[inline]
    pub fn size(&self) -> Point {
        Point::new(self.width, self.height)
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Whether `p` addresses a cell of this grid.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    #[inline]
    fn index(&self, p: Point) -> Option<usize> {
        if self.contains(p) {
            Some((p.y as usize) * (self.width as usize) + (p.x as usize))
        } else {
            None
        }
    }

    /// Borrow the value at `p`, or `None` if out of bounds.
    #[inline]
    pub fn get(&self, p: Point) -> Option<&T> {
        self.index(p).map(|i| &self.cells[i])
    }

    /// Set the value at `p`. Does nothing if out of bounds.
    #[inline]
    pub fn set(&mut self, p: Point, value: T) {
        if let Some(i) = self.index(p) {
            self.cells[i] = value;
        }
    }

    /// Count how many cells satisfy a predicate.
    pub fn count_fn(&self, mut f: impl FnMut(Point, &T) -> bool) -> usize {
        self.iter().filter(|(p, v)| f(*p, *v)).count()
    }

    /// Iterate over `(Point, &T)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Point, &T)> + '_ {
        self.bounds().iter().zip(self.cells.iter())
    }

    /// The row-major backing slice, mutably.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.cells
    }

    /// Produce a new grid of the same size by mapping every cell.
    pub fn map<U>(&self, mut f: impl FnMut(Point, &T) -> U) -> Grid<U> {
        Grid {
            cells: self.iter().map(|(p, v)| f(p, v)).collect(),
            width: self.width,
            height: self.height,
        }
    }
}

impl<T: Copy> Grid<T> {
    /// Copy of the value at `p`, or `None` if out of bounds.
    #[inline]
    pub fn at(&self, p: Point) -> Option<T> {
        self.get(p).copied()
    }
}

impl Grid<bool> {
    /// Number of `true` cells.
    pub fn count_true(&self) -> usize {
        self.cells.iter().filter(|&&b| b).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_and_size() {
        let g = Grid::filled(10, 5, 0.5);
        assert_eq!(g.size(), Point::new(10, 5));
        assert_eq!(g.iter().count(), 50);
        assert_eq!(g.at(Point::new(9, 4)), Some(0.5));
        assert_eq!(Grid::filled(-2, 3, 0u8).size(), Point::new(0, 3));
    }

    #[test]
    fn set_and_at() {
        let mut g = Grid::filled(4, 4, 0u8);
        let p = Point::new(2, 3);
        g.set(p, 42);
        assert_eq!(g.at(p), Some(42));
        assert_eq!(g.at(Point::new(0, 0)), Some(0));
        assert_eq!(g.at(Point::new(4, 0)), None);
        assert_eq!(g.at(Point::new(-1, 2)), None);
    }

    #[test]
    fn out_of_bounds_set_is_noop() {
        let mut g = Grid::filled(2, 2, false);
        g.set(Point::new(5, 5), true);
        assert_eq!(g.count_true(), 0);
    }

    #[test]
    fn from_fn_is_row_major() {
        let g = Grid::from_fn(3, 2, |p| p.x + 10 * p.y);
        let cells: Vec<_> = g.iter().map(|(_, &v)| v).collect();
        assert_eq!(cells, [0, 1, 2, 10, 11, 12]);
        assert_eq!(g.at(Point::new(1, 1)), Some(11));
    }

    #[test]
    fn from_vec_checks_length() {
        assert!(Grid::from_vec(2, 2, vec![1, 2, 3]).is_none());
        let g = Grid::from_vec(2, 2, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(g.at(Point::new(0, 1)), Some(3));
    }

    #[test]
    fn iter_and_count() {
        let mut g = Grid::filled(3, 3, false);
        g.set(Point::new(1, 0), true);
        g.set(Point::new(2, 2), true);
        let items: Vec<_> = g.iter().collect();
        assert_eq!(items.len(), 9);
        assert_eq!(items[1], (Point::new(1, 0), &true));
        assert_eq!(g.count_true(), 2);
        assert_eq!(g.count_fn(|p, &v| v && p.y == 2), 1);
    }

    #[test]
    fn map_keeps_shape() {
        let g = Grid::from_fn(4, 2, |p| p.x);
        let doubled = g.map(|_, &v| v * 2);
        assert_eq!(doubled.size(), g.size());
        assert_eq!(doubled.at(Point::new(3, 1)), Some(6));
    }
}
