//! Conversion between field meters and grid cells.

use fieldsight_core::{Point, WorldPoint};

/// Slack, in cells, added before flooring so that a cell's own origin maps
/// back to that cell despite rounding in the meters conversion.
const SNAP: f64 = 1e-9;

/// Physical size of the competition field, in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FieldDimensions {
    /// Extent along world `x` (grid columns).
    pub length: f64,
    /// Extent along world `y` (grid rows).
    pub width: f64,
}

impl FieldDimensions {
    pub const fn new(length: f64, width: f64) -> Self {
        Self { length, width }
    }
}

impl Default for FieldDimensions {
    fn default() -> Self {
        Self::new(28.0, 15.0)
    }
}

/// Maps world positions onto a `grid_width × grid_height` grid covering the
/// field, and back.
///
/// Results are not clamped: points outside the field map to cells outside
/// the grid, which callers must check before reading cell data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    field: FieldDimensions,
    grid_width: i32,
    grid_height: i32,
}

impl CoordinateMapper {
    pub fn new(field: FieldDimensions, grid_width: i32, grid_height: i32) -> Self {
        Self {
            field,
            grid_width,
            grid_height,
        }
    }

    pub fn field(&self) -> FieldDimensions {
        self.field
    }

    /// Grid size as a `Point` (width = x, height = y).
    pub fn grid_size(&self) -> Point {
        Point::new(self.grid_width, self.grid_height)
    }

    /// The cell containing a planar world position.
    #[inline]
    pub fn world_to_grid(&self, x: f64, y: f64) -> Point {
        Point::new(
            (x / self.field.length * f64::from(self.grid_width) + SNAP).floor() as i32,
            (y / self.field.width * f64::from(self.grid_height) + SNAP).floor() as i32,
        )
    }

    /// The cell containing `p`, ignoring its elevation.
    #[inline]
    pub fn cell_of(&self, p: WorldPoint) -> Point {
        self.world_to_grid(p.x, p.y)
    }

    /// World position of fractional grid coordinates, at zero elevation.
    #[inline]
    pub fn grid_to_world(&self, gx: f64, gy: f64) -> WorldPoint {
        WorldPoint::planar(
            gx / f64::from(self.grid_width) * self.field.length,
            gy / f64::from(self.grid_height) * self.field.width,
        )
    }

    /// World position of a cell's minimum corner.
    #[inline]
    pub fn cell_origin(&self, p: Point) -> WorldPoint {
        self.grid_to_world(f64::from(p.x), f64::from(p.y))
    }

    /// World position of a cell's center.
    #[inline]
    pub fn cell_center(&self, p: Point) -> WorldPoint {
        self.grid_to_world(f64::from(p.x) + 0.5, f64::from(p.y) + 0.5)
    }
}
