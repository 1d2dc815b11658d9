//! Line-of-sight evaluation over a [`HeightField`].
//!
//! A sightline runs between two ground positions, each lifted to the terrain
//! height of its cell plus a role-specific offset (camera or armor height).
//! The cells under the segment are visited with [`CellLine`]; at each cell
//! center the sightline height is linearly interpolated by the planar
//! distance travelled, and a cell whose terrain reaches that height blocks
//! the line.

use fieldsight_core::{Point, WorldPoint};

use crate::heightfield::HeightField;
use crate::line::CellLine;
use crate::mapper::CoordinateMapper;
use crate::params::{SightDirection, SightParams};

/// Planar distance below which two endpoints count as the same spot.
pub const PLANAR_EPSILON: f64 = 1e-6;

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// One traversed cell of a sightline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SightSample {
    pub cell: Point,
    /// Terrain elevation of the cell.
    pub terrain: f64,
    /// Sightline elevation above the cell center.
    pub sightline: f64,
    /// `terrain < sightline`.
    pub clear: bool,
}

/// Evaluates sightlines against one height field.
#[derive(Debug, Clone, Copy)]
pub struct LineOfSight<'a> {
    field: &'a HeightField,
    mapper: CoordinateMapper,
}

impl<'a> LineOfSight<'a> {
    pub fn new(field: &'a HeightField, mapper: CoordinateMapper) -> Self {
        Self { field, mapper }
    }

    /// Lift both endpoints onto the terrain and prepare the cell walk.
    ///
    /// Only the planar part of `from` and `to` is used. Returns `None` when
    /// either endpoint lies outside the height field.
    pub fn walk(
        &self,
        from: WorldPoint,
        to: WorldPoint,
        from_offset: f64,
        to_offset: f64,
    ) -> Option<SightWalk<'a>> {
        let from_cell = self.mapper.cell_of(from);
        let to_cell = self.mapper.cell_of(to);
        let from = from.with_z(self.field.elevation(from_cell)? + from_offset);
        let to = to.with_z(self.field.elevation(to_cell)? + to_offset);
        let total = from.planar_distance(to);
        let degenerate = total < PLANAR_EPSILON || from_cell == to_cell;
        Some(SightWalk {
            field: self.field,
            mapper: self.mapper,
            cells: CellLine::new(from_cell, to_cell),
            from,
            to,
            total,
            degenerate,
        })
    }

    /// Whether the sightline `from → to` is unobstructed and within
    /// `max_distance`.
    ///
    /// Endpoints outside the field are never visible. Endpoints in the same
    /// cell are always visible (range permitting).
    pub fn evaluate(
        &self,
        from: WorldPoint,
        to: WorldPoint,
        max_distance: f64,
        from_offset: f64,
        to_offset: f64,
    ) -> bool {
        let Some(mut walk) = self.walk(from, to, from_offset, to_offset) else {
            return false;
        };
        if walk.from().distance(walk.to()) > max_distance {
            return false;
        }
        if walk.is_degenerate() {
            return true;
        }
        walk.all(|s| s.clear)
    }

    /// [`evaluate`](Self::evaluate) with offsets and range taken from
    /// `params` for the given direction.
    #[inline]
    pub fn check(
        &self,
        from: WorldPoint,
        to: WorldPoint,
        params: &SightParams,
        direction: SightDirection,
    ) -> bool {
        let (from_offset, to_offset) = params.offsets(direction);
        self.evaluate(from, to, params.max_range, from_offset, to_offset)
    }
}

/// Lazily tests each in-field cell under a sightline.
///
/// Cells outside the field are skipped. A degenerate walk (both endpoints
/// in one cell, or at the same planar spot) yields nothing.
#[derive(Debug, Clone)]
pub struct SightWalk<'a> {
    field: &'a HeightField,
    mapper: CoordinateMapper,
    cells: CellLine,
    from: WorldPoint,
    to: WorldPoint,
    total: f64,
    degenerate: bool,
}

impl SightWalk<'_> {
    /// Elevated start point.
    pub fn from(&self) -> WorldPoint {
        self.from
    }

    /// Elevated end point.
    pub fn to(&self) -> WorldPoint {
        self.to
    }

    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }
}

impl Iterator for SightWalk<'_> {
    type Item = SightSample;

    fn next(&mut self) -> Option<SightSample> {
        if self.degenerate {
            return None;
        }
        for cell in self.cells.by_ref() {
            let Some(terrain) = self.field.elevation(cell) else {
                continue;
            };
            let center = self.mapper.cell_center(cell);
            let k = self.from.planar_distance(center) / self.total;
            let sightline = lerp(self.from.z, self.to.z, k);
            return Some(SightSample {
                cell,
                terrain,
                sightline,
                clear: terrain < sightline,
            });
        }
        None
    }
}
