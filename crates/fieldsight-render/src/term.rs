//! ANSI preview of the coverage grid.

use std::io::{self, Write};

use crossterm::{
    queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
};

use fieldsight_core::{Grid, Point, Range};
use fieldsight_los::{Coverage, VisibilityPair};

use crate::overlay::{Palette, coverage_grid};

/// Glyph marking the observer.
const OBSERVER_GLYPH: char = '@';
/// Glyph marking the enemy.
const ENEMY_GLYPH: char = 'E';

/// One terminal cell of the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewCell {
    pub coverage: Coverage,
    pub glyph: char,
}

/// Downsampled terminal rendering of visibility grids.
///
/// Each terminal cell stands for a block of `step` columns by `2 * step`
/// rows of the grid, since terminal cells are about twice as tall as wide.
/// A block shows its most common coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalPreview {
    columns: u16,
    palette: Palette,
}

impl TerminalPreview {
    pub fn new(columns: u16) -> Self {
        Self {
            columns: columns.max(1),
            palette: Palette::default(),
        }
    }

    pub fn columns(&self) -> u16 {
        self.columns
    }

    /// Grid columns per terminal column for a grid `grid_width` cells wide.
    pub fn step(&self, grid_width: i32) -> i32 {
        let cols = i32::from(self.columns);
        ((grid_width + cols - 1) / cols).max(1)
    }

    /// Grid cells covered by terminal cell `(column, row)`.
    pub fn block(&self, grid_size: Point, column: u16, row: u16) -> Range {
        let step = self.step(grid_size.x);
        let (x, y) = (i32::from(column) * step, i32::from(row) * 2 * step);
        let bounds = Range::with_size(grid_size.x, grid_size.y);
        Range::new(x, y, x + step, y + 2 * step).intersect(bounds)
    }

    /// Grid cell at the middle of terminal cell `(column, row)`.
    pub fn grid_cell(&self, grid_size: Point, column: u16, row: u16) -> Point {
        let step = self.step(grid_size.x);
        Point::new(
            i32::from(column) * step + step / 2,
            i32::from(row) * 2 * step + step,
        )
    }

    /// Terminal rows of the preview, top to bottom.
    pub fn rows(
        &self,
        pair: &VisibilityPair,
        observer: Option<Point>,
        enemy: Option<Point>,
    ) -> Vec<Vec<PreviewCell>> {
        let coverage = coverage_grid(pair);
        let size = coverage.size();
        let step = self.step(size.x);
        let cols = (size.x + step - 1) / step;
        let rows = (size.y + 2 * step - 1) / (2 * step);
        (0..rows)
            .map(|row| {
                (0..cols)
                    .map(|col| {
                        let block = self.block(size, col as u16, row as u16);
                        let glyph = if observer.is_some_and(|p| block.contains(p)) {
                            OBSERVER_GLYPH
                        } else if enemy.is_some_and(|p| block.contains(p)) {
                            ENEMY_GLYPH
                        } else {
                            ' '
                        };
                        PreviewCell {
                            coverage: dominant(&coverage, block),
                            glyph,
                        }
                    })
                    .collect()
            })
            .collect()
    }

    /// Terminal color of a coverage class; hidden cells keep the terminal
    /// background.
    pub fn color(&self, c: Coverage) -> Color {
        let [r, g, b, a] = self.palette.color(c);
        if a == 0 {
            Color::Reset
        } else {
            Color::Rgb { r, g, b }
        }
    }

    /// Queue one preview row at the cursor.
    pub fn queue_row<W: Write>(&self, out: &mut W, row: &[PreviewCell]) -> io::Result<()> {
        for cell in row {
            queue!(out, SetBackgroundColor(self.color(cell.coverage)))?;
            if cell.glyph != ' ' {
                let [r, g, b, _] = self.palette.observer;
                let fg = if cell.glyph == OBSERVER_GLYPH {
                    Color::Rgb { r, g, b }
                } else {
                    Color::White
                };
                queue!(out, SetForegroundColor(fg))?;
            }
            queue!(out, Print(cell.glyph))?;
        }
        queue!(out, ResetColor)
    }

    /// Write the whole preview, one line per row.
    pub fn write<W: Write>(
        &self,
        out: &mut W,
        pair: &VisibilityPair,
        observer: Option<Point>,
        enemy: Option<Point>,
    ) -> io::Result<()> {
        for row in self.rows(pair, observer, enemy) {
            self.queue_row(out, &row)?;
            queue!(out, Print('\n'))?;
        }
        out.flush()
    }
}

impl Default for TerminalPreview {
    fn default() -> Self {
        Self::new(80)
    }
}

/// Most common coverage in `block`; ties favor the more visible class.
fn dominant(coverage: &Grid<Coverage>, block: Range) -> Coverage {
    let mut counts = [0usize; 4];
    for p in block {
        if let Some(c) = coverage.at(p) {
            counts[c as usize] += 1;
        }
    }
    let mut best = Coverage::Hidden;
    let mut best_count = 0;
    for c in Coverage::ALL {
        if counts[c as usize] > best_count {
            best = c;
            best_count = counts[c as usize];
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 8x8 grids: the left half visible, the top-right quarter seen only.
    fn halves() -> VisibilityPair {
        let mut pair = VisibilityPair::hidden(8, 8);
        for p in Range::new(0, 0, 4, 8) {
            pair.can_hit.set(p, true);
        }
        for p in Range::new(4, 0, 8, 4) {
            pair.be_seen.set(p, true);
        }
        pair
    }

    #[test]
    fn step_fits_columns() {
        let t = TerminalPreview::new(80);
        assert_eq!(t.step(280), 4);
        assert_eq!(t.step(80), 1);
        assert_eq!(t.step(10), 1);
        assert_eq!(TerminalPreview::new(0).columns(), 1);
    }

    #[test]
    fn rows_downsample() {
        let t = TerminalPreview::new(4);
        let rows = t.rows(&halves(), None, None);
        // step 2: blocks of 2 x 4 cells.
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.len() == 4));
        assert_eq!(rows[0][0].coverage, Coverage::Visible);
        assert_eq!(rows[0][3].coverage, Coverage::SeenOnly);
        assert_eq!(rows[1][3].coverage, Coverage::Hidden);
    }

    #[test]
    fn markers_land_in_their_block() {
        let t = TerminalPreview::new(4);
        let rows = t.rows(&halves(), Some(Point::new(1, 1)), Some(Point::new(7, 6)));
        assert_eq!(rows[0][0].glyph, '@');
        assert_eq!(rows[1][3].glyph, 'E');
        let blanks = rows.iter().flatten().filter(|c| c.glyph == ' ').count();
        assert_eq!(blanks, 6);
    }

    #[test]
    fn grid_cell_is_inside_block() {
        let t = TerminalPreview::new(80);
        let size = Point::new(280, 150);
        for (col, row) in [(0, 0), (13, 7), (69, 18)] {
            let p = t.grid_cell(size, col, row);
            assert!(t.block(size, col, row).contains(p), "{col},{row} -> {p}");
        }
    }

    #[test]
    fn ties_favor_visibility() {
        let mut g = Grid::filled(2, 1, Coverage::Hidden);
        g.set(Point::new(0, 0), Coverage::Visible);
        assert_eq!(dominant(&g, g.bounds()), Coverage::Visible);
    }

    #[test]
    fn write_emits_colors_and_glyphs() {
        let t = TerminalPreview::new(4);
        let mut out = Vec::new();
        t.write(&mut out, &halves(), Some(Point::new(1, 1)), None).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("48;2;208;22;22"), "{text:?}");
        assert!(text.contains("48;2;226;192;24"), "{text:?}");
        assert!(text.contains('@'));
        assert_eq!(text.matches('\n').count(), 2);
    }
}
