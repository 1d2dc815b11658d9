//! **fieldsight-core**: geometry and grid types shared by the visibility
//! engine and its renderers.
//!
//! This crate provides integer cell coordinates ([`Point`]), half-open cell
//! rectangles ([`Range`]), continuous field positions ([`WorldPoint`]) and a
//! bounds-checked, row-major [`Grid`] used for both elevations and
//! visibility results.

pub mod geom;
pub mod grid;

pub use geom::{Point, Range, RangeIter, WorldPoint};
pub use grid::Grid;
