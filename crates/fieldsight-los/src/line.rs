//! Grid traversal along a straight segment.
//!
//! [`CellLine`] enumerates the cells between two grid points with the
//! integer Bresenham algorithm: an error accumulator seeded with `dx - |dy|`
//! decides at each step whether to advance along x, y, or both. The sequence
//! starts at the origin, ends at the destination and every consecutive pair
//! of cells is 8-adjacent.
//!
//! Bresenham's tie-breaking depends on the walking direction, so the
//! accumulator always runs from the smaller endpoint (by x, then y). A line
//! requested in the other direction replays that walk backwards, which makes
//! `a → b` and `b → a` cover exactly the same cells.

use std::iter::FusedIterator;

use fieldsight_core::Point;

/// Bresenham error-accumulator state.
#[derive(Debug, Clone)]
struct Bresenham {
    cur: Point,
    end: Point,
    dx: i32,
    dy: i32,
    sx: i32,
    sy: i32,
    err: i32,
    done: bool,
}

impl Bresenham {
    fn new(from: Point, to: Point) -> Self {
        let dx = (to.x - from.x).abs();
        let dy = -(to.y - from.y).abs();
        Self {
            cur: from,
            end: to,
            dx,
            dy,
            sx: if from.x < to.x { 1 } else { -1 },
            sy: if from.y < to.y { 1 } else { -1 },
            err: dx + dy,
            done: false,
        }
    }
}

impl Iterator for Bresenham {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.done {
            return None;
        }
        let p = self.cur;
        if p == self.end {
            self.done = true;
            return Some(p);
        }
        let e2 = 2 * self.err;
        if e2 >= self.dy {
            self.err += self.dy;
            self.cur.x += self.sx;
        }
        if e2 <= self.dx {
            self.err += self.dx;
            self.cur.y += self.sy;
        }
        Some(p)
    }
}

#[derive(Debug, Clone)]
enum Walk {
    Forward(Bresenham),
    /// Canonical walk collected up front, yielded from the back.
    Reverse(Vec<Point>),
}

/// Iterator over the cells of the segment `from → to`, both inclusive.
///
/// Clone the iterator to restart a traversal from its current position.
#[derive(Debug, Clone)]
pub struct CellLine {
    walk: Walk,
}

impl CellLine {
    pub fn new(from: Point, to: Point) -> Self {
        let walk = if (from.x, from.y) <= (to.x, to.y) {
            Walk::Forward(Bresenham::new(from, to))
        } else {
            Walk::Reverse(Bresenham::new(to, from).collect())
        };
        Self { walk }
    }

    /// Number of cells the full traversal visits.
    pub fn cell_count(from: Point, to: Point) -> usize {
        let dx = (to.x - from.x).unsigned_abs() as usize;
        let dy = (to.y - from.y).unsigned_abs() as usize;
        dx.max(dy) + 1
    }
}

impl Iterator for CellLine {
    type Item = Point;

    #[inline]
    fn next(&mut self) -> Option<Point> {
        match &mut self.walk {
            Walk::Forward(b) => b.next(),
            Walk::Reverse(cells) => cells.pop(),
        }
    }
}

impl FusedIterator for CellLine {}

/// Cells on the segment `from → to`, both endpoints included.
#[inline]
pub fn cells_on_line(from: Point, to: Point) -> CellLine {
    CellLine::new(from, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn line(a: (i32, i32), b: (i32, i32)) -> Vec<Point> {
        cells_on_line(Point::new(a.0, a.1), Point::new(b.0, b.1)).collect()
    }

    /// Endpoints spread over all octants, axes and diagonals.
    fn endpoint_pairs() -> Vec<(Point, Point)> {
        let mut pairs = Vec::new();
        let origins = [Point::new(0, 0), Point::new(3, -2), Point::new(-4, 5)];
        for &o in &origins {
            for dx in -7..=7 {
                for dy in -7..=7 {
                    pairs.push((o, Point::new(o.x + dx, o.y + dy)));
                }
            }
        }
        pairs
    }

    #[test]
    fn horizontal_line() {
        let cells = line((0, 0), (5, 0));
        assert_eq!(cells, (0..=5).map(|x| Point::new(x, 0)).collect::<Vec<_>>());
    }

    #[test]
    fn vertical_line_backwards() {
        let cells = line((2, 4), (2, 1));
        assert_eq!(
            cells,
            vec![
                Point::new(2, 4),
                Point::new(2, 3),
                Point::new(2, 2),
                Point::new(2, 1)
            ]
        );
    }

    #[test]
    fn diagonal_steps_both_axes() {
        let cells = line((0, 0), (3, 3));
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[1], Point::new(1, 1));
    }

    #[test]
    fn shallow_slope() {
        let cells = line((0, 0), (4, 2));
        assert_eq!(
            cells,
            vec![
                Point::new(0, 0),
                Point::new(1, 1),
                Point::new(2, 1),
                Point::new(3, 2),
                Point::new(4, 2)
            ]
        );
    }

    #[test]
    fn tie_breaking_ignores_direction() {
        let mut back = line((4, 2), (0, 0));
        back.reverse();
        assert_eq!(back, line((0, 0), (4, 2)));
    }

    #[test]
    fn single_cell() {
        assert_eq!(line((7, 7), (7, 7)), vec![Point::new(7, 7)]);
    }

    #[test]
    fn traversal_is_complete_and_connected() {
        for (a, b) in endpoint_pairs() {
            let cells: Vec<_> = cells_on_line(a, b).collect();
            assert_eq!(cells.first(), Some(&a));
            assert_eq!(cells.last(), Some(&b));
            assert_eq!(cells.len(), CellLine::cell_count(a, b), "{a} -> {b}");
            for w in cells.windows(2) {
                let step = (w[1].x - w[0].x).abs().max((w[1].y - w[0].y).abs());
                assert_eq!(step, 1, "{a} -> {b}: {} then {}", w[0], w[1]);
            }
        }
    }

    #[test]
    fn reversed_traversal_visits_same_cells() {
        for (a, b) in endpoint_pairs() {
            let fwd: HashSet<_> = cells_on_line(a, b).collect();
            let back: HashSet<_> = cells_on_line(b, a).collect();
            assert_eq!(fwd, back, "{a} <-> {b}");
        }
    }

    #[test]
    fn clone_restarts_from_current_position() {
        let mut it = cells_on_line(Point::new(0, 0), Point::new(6, 2));
        it.next();
        it.next();
        let rest: Vec<_> = it.clone().collect();
        let again: Vec<_> = it.collect();
        assert_eq!(rest, again);
        assert_eq!(rest.len(), 5);
    }

    #[test]
    fn fused_after_end() {
        let mut it = cells_on_line(Point::new(0, 0), Point::new(1, 0));
        assert_eq!(it.next(), Some(Point::new(0, 0)));
        assert_eq!(it.next(), Some(Point::new(1, 0)));
        assert_eq!(it.next(), None);
        assert_eq!(it.next(), None);
    }
}
