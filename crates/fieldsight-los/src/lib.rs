//! Terrain line-of-sight for a competition field.
//!
//! The engine is built from four pieces:
//!
//! - [`HeightField`]: per-cell elevations decoded from a grayscale height map.
//! - [`CoordinateMapper`]: meters ⇄ grid cells for a given field and grid size.
//! - [`LineOfSight`]: walks the [`CellLine`] between two points and tests the
//!   terrain under the sightline.
//! - [`VisibilityMap`]: keeps the query state (observer, enemy, heights,
//!   range) and the two visibility grids built from it.
//!
//! # Example
//!
//! ```
//! use fieldsight_core::Point;
//! use fieldsight_los::{FieldDimensions, HeightField, VisibilityMap};
//!
//! let mut map = VisibilityMap::new(FieldDimensions::default());
//! map.load_height_field(HeightField::flat(280, 150));
//! map.set_observer(Point::new(140, 75));
//! let grids = map.grids().unwrap();
//! assert!(grids.can_hit.at(Point::new(141, 75)).unwrap());
//! ```

pub mod heightfield;
pub mod line;
pub mod los;
pub mod mapper;
pub mod params;
pub mod visibility;

pub use heightfield::{
    DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, HeightField, HeightFieldError, MAX_HEIGHT,
};
pub use line::{CellLine, cells_on_line};
pub use los::{LineOfSight, PLANAR_EPSILON, SightSample, SightWalk};
pub use mapper::{CoordinateMapper, FieldDimensions};
pub use params::{EnemyUpdate, EngineConfig, SightDirection, SightParams};
pub use visibility::{Coverage, Duel, VisibilityMap, VisibilityPair, build_visibility};
