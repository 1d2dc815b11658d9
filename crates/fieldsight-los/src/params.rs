//! Query parameters and engine configuration.

use crate::heightfield::MAX_HEIGHT;
use crate::mapper::FieldDimensions;

/// Allowed camera and target heights, in meters, as offered by the viewer.
pub const HEIGHT_LIMITS: (f64, f64) = (0.1, 2.0);

/// Allowed maximum range, in meters, as offered by the viewer.
pub const RANGE_LIMITS: (f64, f64) = (0.0, 15.0);

/// Heights and range shared by every sightline of a query.
///
/// Values are used as given. Use [`SightParams::clamped`] to restrict them
/// to [`HEIGHT_LIMITS`] and [`RANGE_LIMITS`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SightParams {
    /// Eye height above the terrain of the looking unit.
    pub camera_height: f64,
    /// Armor plate height above the terrain of the target unit.
    pub target_height: f64,
    /// Sightlines longer than this (in 3D) are not visible.
    pub max_range: f64,
}

impl Default for SightParams {
    fn default() -> Self {
        Self {
            camera_height: 0.3,
            target_height: 0.15,
            max_range: 6.0,
        }
    }
}

impl SightParams {
    /// Copy with every value clamped to the viewer's slider ranges.
    pub fn clamped(self) -> Self {
        Self {
            camera_height: self.camera_height.clamp(HEIGHT_LIMITS.0, HEIGHT_LIMITS.1),
            target_height: self.target_height.clamp(HEIGHT_LIMITS.0, HEIGHT_LIMITS.1),
            max_range: self.max_range.clamp(RANGE_LIMITS.0, RANGE_LIMITS.1),
        }
    }

    /// Height offsets `(from, to)` for a sightline in the given direction.
    #[inline]
    pub fn offsets(&self, direction: SightDirection) -> (f64, f64) {
        match direction {
            SightDirection::Hit => (self.camera_height, self.target_height),
            SightDirection::BeSeen => (self.target_height, self.camera_height),
        }
    }
}

/// Which end of a sightline carries the camera.
///
/// The two directions are not symmetric because the height offsets swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SightDirection {
    /// The observer's camera looks at a target's armor.
    Hit,
    /// An enemy camera at the far end looks at the observer's armor.
    BeSeen,
}

/// How [`VisibilityMap`](crate::VisibilityMap) reacts when only the enemy
/// moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EnemyUpdate {
    /// Rebuild both grids.
    #[default]
    FullRecompute,
    /// Only rewrite the "can hit" cells on the observer → enemy line.
    ///
    /// This is an approximation: cells off that line keep whatever they held
    /// before, even if a full rebuild would mark them differently.
    LinePatch,
}

/// Everything needed to set up a [`VisibilityMap`](crate::VisibilityMap).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    pub field: FieldDimensions,
    /// Elevation of a black height-map pixel, in meters.
    pub max_height: f64,
    pub params: SightParams,
    pub enemy_update: EnemyUpdate,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            field: FieldDimensions::default(),
            max_height: MAX_HEIGHT,
            params: SightParams::default(),
            enemy_update: EnemyUpdate::default(),
        }
    }
}
