//! Whole-grid visibility for an observer.
//!
//! [`build_visibility`] runs the line-of-sight test from the observer to the
//! center of every cell, once per [`SightDirection`], and returns both grids.
//! [`VisibilityMap`] holds the query state around it and decides when the
//! grids are rebuilt.

use std::time::Instant;

use fieldsight_core::{Grid, Point, WorldPoint};

use crate::heightfield::{DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, HeightField};
use crate::los::LineOfSight;
use crate::mapper::{CoordinateMapper, FieldDimensions};
use crate::params::{EnemyUpdate, EngineConfig, SightDirection, SightParams};

/// The two visibility grids of one observer.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityPair {
    /// The observer's camera sees the armor of a unit in the cell.
    pub can_hit: Grid<bool>,
    /// A camera in the cell sees the observer's armor.
    pub be_seen: Grid<bool>,
}

impl VisibilityPair {
    /// Grids of the given size with every cell hidden.
    pub fn hidden(width: i32, height: i32) -> Self {
        Self {
            can_hit: Grid::filled(width, height, false),
            be_seen: Grid::filled(width, height, false),
        }
    }

    pub fn size(&self) -> Point {
        self.can_hit.size()
    }

    /// Combined state of one cell, or `None` outside the grids.
    pub fn coverage(&self, p: Point) -> Option<Coverage> {
        Some(Coverage::classify(self.can_hit.at(p)?, self.be_seen.at(p)?))
    }
}

/// Combined visibility state of a cell, as shown on the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Coverage {
    /// The observer can hit a unit here, unseen.
    Visible,
    VisibleAndSeen,
    /// A unit here sees the observer but cannot be hit.
    SeenOnly,
    #[default]
    Hidden,
}

impl Coverage {
    pub const ALL: [Coverage; 4] = [
        Coverage::Visible,
        Coverage::VisibleAndSeen,
        Coverage::SeenOnly,
        Coverage::Hidden,
    ];

    #[inline]
    pub fn classify(can_hit: bool, be_seen: bool) -> Self {
        match (can_hit, be_seen) {
            (true, false) => Coverage::Visible,
            (true, true) => Coverage::VisibleAndSeen,
            (false, true) => Coverage::SeenOnly,
            (false, false) => Coverage::Hidden,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Coverage::Visible => "visible",
            Coverage::VisibleAndSeen => "visible and seen",
            Coverage::SeenOnly => "seen only",
            Coverage::Hidden => "hidden",
        }
    }
}

/// Line-of-sight between the observer and the enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duel {
    pub observer_hits_enemy: bool,
    pub enemy_sees_observer: bool,
}

/// Evaluate `eval` for every cell of `grid`.
#[cfg(not(feature = "parallel"))]
fn fill_cells(grid: &mut Grid<bool>, eval: impl Fn(Point) -> bool) {
    let width = grid.width().max(1) as usize;
    for (i, v) in grid.as_mut_slice().iter_mut().enumerate() {
        *v = eval(Point::new((i % width) as i32, (i / width) as i32));
    }
}

/// Evaluate `eval` for every cell of `grid`, spread over the rayon pool.
#[cfg(feature = "parallel")]
fn fill_cells(grid: &mut Grid<bool>, eval: impl Fn(Point) -> bool + Sync + Send) {
    use rayon::prelude::*;

    let width = grid.width().max(1) as usize;
    grid.as_mut_slice()
        .par_iter_mut()
        .enumerate()
        .for_each(|(i, v)| *v = eval(Point::new((i % width) as i32, (i / width) as i32)));
}

/// Build both visibility grids for `observer`.
///
/// Sightlines start at the observer cell's origin corner and end at each
/// cell's center. The grids have the height field's dimensions.
pub fn build_visibility(
    field: &HeightField,
    mapper: CoordinateMapper,
    observer: Point,
    params: &SightParams,
) -> VisibilityPair {
    let started = Instant::now();
    let los = LineOfSight::new(field, mapper);
    let from = mapper.cell_origin(observer);
    let mut pair = VisibilityPair::hidden(field.width(), field.height());
    fill_cells(&mut pair.can_hit, |p| {
        los.check(from, mapper.cell_center(p), params, SightDirection::Hit)
    });
    fill_cells(&mut pair.be_seen, |p| {
        los.check(from, mapper.cell_center(p), params, SightDirection::BeSeen)
    });
    log::debug!(
        "visibility from {observer}: {} can-hit, {} be-seen cells on {}x{} in {:?}",
        pair.can_hit.count_true(),
        pair.be_seen.count_true(),
        field.width(),
        field.height(),
        started.elapsed()
    );
    pair
}

/// Query state and current visibility grids.
///
/// Every setter brings the grids up to date before returning. Until a
/// height field is loaded the setters only record their input and
/// [`grids`](Self::grids) returns `None`.
#[derive(Debug, Clone)]
pub struct VisibilityMap {
    field: Option<HeightField>,
    mapper: CoordinateMapper,
    observer: Point,
    enemy: Point,
    params: SightParams,
    enemy_update: EnemyUpdate,
    grids: Option<VisibilityPair>,
}

impl VisibilityMap {
    /// An empty map over a field of the given size, with default parameters.
    pub fn new(field: FieldDimensions) -> Self {
        Self {
            field: None,
            mapper: CoordinateMapper::new(field, DEFAULT_GRID_WIDTH, DEFAULT_GRID_HEIGHT),
            observer: Point::ZERO,
            enemy: Point::ZERO,
            params: SightParams::default(),
            enemy_update: EnemyUpdate::default(),
            grids: None,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        let mut map = Self::new(config.field);
        map.params = config.params;
        map.enemy_update = config.enemy_update;
        map
    }

    /// Replace the height field and rebuild both grids.
    ///
    /// The grid size follows the new field.
    pub fn load_height_field(&mut self, field: HeightField) {
        self.mapper = CoordinateMapper::new(self.mapper.field(), field.width(), field.height());
        log::debug!("height field replaced: {}x{}", field.width(), field.height());
        self.field = Some(field);
        self.recompute();
    }

    pub fn is_loaded(&self) -> bool {
        self.field.is_some()
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn observer(&self) -> Point {
        self.observer
    }

    pub fn enemy(&self) -> Point {
        self.enemy
    }

    pub fn params(&self) -> SightParams {
        self.params
    }

    pub fn enemy_update(&self) -> EnemyUpdate {
        self.enemy_update
    }

    pub fn set_enemy_update(&mut self, mode: EnemyUpdate) {
        self.enemy_update = mode;
    }

    /// Current grids, or `None` before a height field is loaded.
    pub fn grids(&self) -> Option<&VisibilityPair> {
        self.grids.as_ref()
    }

    /// Move the observer and rebuild both grids.
    pub fn set_observer(&mut self, p: Point) {
        if p == self.observer && self.grids.is_some() {
            return;
        }
        self.observer = p;
        self.recompute();
    }

    /// Move the enemy marker.
    ///
    /// With [`EnemyUpdate::LinePatch`] only the "can hit" cells on the
    /// observer → enemy line are rewritten; see [`EnemyUpdate`].
    pub fn set_enemy(&mut self, p: Point) {
        if p == self.enemy && self.grids.is_some() {
            return;
        }
        self.enemy = p;
        match self.enemy_update {
            EnemyUpdate::FullRecompute => self.recompute(),
            EnemyUpdate::LinePatch => self.patch_enemy_line(),
        }
    }

    /// Replace all heights and the range, then rebuild both grids.
    pub fn set_params(&mut self, params: SightParams) {
        if params == self.params && self.grids.is_some() {
            return;
        }
        self.params = params;
        self.recompute();
    }

    pub fn set_camera_height(&mut self, h: f64) {
        self.set_params(SightParams {
            camera_height: h,
            ..self.params
        });
    }

    pub fn set_target_height(&mut self, h: f64) {
        self.set_params(SightParams {
            target_height: h,
            ..self.params
        });
    }

    pub fn set_max_range(&mut self, range: f64) {
        self.set_params(SightParams {
            max_range: range,
            ..self.params
        });
    }

    /// Rebuild both grids from the current state. No-op before a height
    /// field is loaded.
    pub fn recompute(&mut self) {
        let Some(field) = &self.field else {
            log::debug!("no height field loaded; visibility not computed");
            return;
        };
        if !field.contains(self.observer) {
            log::warn!(
                "observer {} is outside the {}x{} field",
                self.observer,
                field.width(),
                field.height()
            );
        }
        self.grids = Some(build_visibility(field, self.mapper, self.observer, &self.params));
    }

    fn patch_enemy_line(&mut self) {
        let (Some(field), Some(grids)) = (&self.field, &mut self.grids) else {
            return;
        };
        let los = LineOfSight::new(field, self.mapper);
        let (from_offset, to_offset) = self.params.offsets(SightDirection::Hit);
        let from = self.mapper.cell_origin(self.observer);
        let to = self.mapper.cell_origin(self.enemy);
        let Some(walk) = los.walk(from, to, from_offset, to_offset) else {
            return;
        };
        let mut patched = 0usize;
        for s in walk {
            grids.can_hit.set(s.cell, s.clear);
            patched += 1;
        }
        log::debug!("patched {patched} cells on {} -> {}", self.observer, self.enemy);
    }

    /// Coverage of one cell in the current grids.
    pub fn coverage(&self, p: Point) -> Option<Coverage> {
        self.grids.as_ref()?.coverage(p)
    }

    /// Whether the observer and the enemy can see each other's armor.
    ///
    /// Uses the same sightlines as the grids, so the answer matches the
    /// enemy cell of a fully rebuilt [`VisibilityPair`].
    pub fn duel(&self) -> Option<Duel> {
        let field = self.field.as_ref()?;
        let los = LineOfSight::new(field, self.mapper);
        let from: WorldPoint = self.mapper.cell_origin(self.observer);
        let to = self.mapper.cell_center(self.enemy);
        Some(Duel {
            observer_hits_enemy: los.check(from, to, &self.params, SightDirection::Hit),
            enemy_sees_observer: los.check(from, to, &self.params, SightDirection::BeSeen),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 1 m cells: 20 x 20 grid over a 20 m x 20 m field.
    fn meter_field() -> FieldDimensions {
        FieldDimensions::new(20.0, 20.0)
    }

    /// A 2 m wall along x = 10 for y in 5..15.
    fn walled() -> HeightField {
        HeightField::from_fn(20, 20, |p| {
            if p.x == 10 && (5..15).contains(&p.y) {
                2.0
            } else {
                0.0
            }
        })
    }

    fn loaded(field: HeightField) -> VisibilityMap {
        let mut map = VisibilityMap::new(meter_field());
        map.set_params(SightParams {
            camera_height: 0.3,
            target_height: 0.15,
            max_range: 30.0,
        });
        map.load_height_field(field);
        map
    }

    #[test]
    fn unloaded_map_is_inert() {
        let mut map = VisibilityMap::new(FieldDimensions::default());
        map.set_observer(Point::new(3, 4));
        map.set_enemy(Point::new(9, 9));
        map.set_max_range(2.0);
        map.recompute();
        assert!(!map.is_loaded());
        assert!(map.grids().is_none());
        assert!(map.duel().is_none());
        assert_eq!(map.observer(), Point::new(3, 4));
        assert_eq!(map.params().max_range, 2.0);
        assert_eq!(map.mapper().grid_size(), Point::new(280, 150));
    }

    #[test]
    fn grids_follow_height_field_size() {
        let mut map = VisibilityMap::new(FieldDimensions::default());
        map.load_height_field(HeightField::flat(56, 30));
        let grids = map.grids().unwrap();
        assert_eq!(grids.size(), Point::new(56, 30));
        assert_eq!(grids.be_seen.size(), Point::new(56, 30));
        assert_eq!(map.mapper().grid_size(), Point::new(56, 30));
    }

    #[test]
    fn flat_field_within_range_is_all_visible() {
        let map = loaded(HeightField::flat(20, 20));
        let grids = map.grids().unwrap();
        assert_eq!(grids.can_hit.count_true(), 400);
        assert_eq!(grids.be_seen.count_true(), 400);
    }

    #[test]
    fn range_limits_the_visible_disc() {
        let mut map = loaded(HeightField::flat(20, 20));
        map.set_max_range(5.0);
        let grids = map.grids().unwrap();
        let from = map.mapper().cell_origin(Point::ZERO);
        for (p, &v) in grids.can_hit.iter() {
            let d = from.planar_distance(map.mapper().cell_center(p));
            if d > 5.0 {
                assert!(!v, "{p} is {d:.2} m away");
            }
            if d < 4.8 {
                assert!(v, "{p} is {d:.2} m away");
            }
        }
    }

    #[test]
    fn zero_range_hides_everything() {
        let mut map = loaded(HeightField::flat(20, 20));
        map.set_max_range(0.0);
        let grids = map.grids().unwrap();
        assert_eq!(grids.can_hit.count_true(), 0);
        assert_eq!(grids.be_seen.count_true(), 0);
    }

    #[test]
    fn wall_casts_a_shadow() {
        let mut map = loaded(walled());
        map.set_observer(Point::new(3, 10));
        let grids = map.grids().unwrap();
        assert!(grids.can_hit.at(Point::new(8, 10)).unwrap());
        assert!(!grids.can_hit.at(Point::new(15, 10)).unwrap());
        assert!(!grids.be_seen.at(Point::new(15, 10)).unwrap());
        // Around the end of the wall.
        assert!(grids.can_hit.at(Point::new(15, 19)).unwrap());
    }

    #[test]
    fn observer_outside_field_sees_nothing() {
        let mut map = loaded(HeightField::flat(20, 20));
        map.set_observer(Point::new(25, 3));
        let grids = map.grids().unwrap();
        assert_eq!(grids.can_hit.count_true(), 0);
        assert_eq!(grids.be_seen.count_true(), 0);
    }

    #[test]
    fn matches_direct_evaluation() {
        let mut map = loaded(walled());
        map.set_observer(Point::new(4, 7));
        let field = walled();
        let los = LineOfSight::new(&field, *map.mapper());
        let from = map.mapper().cell_origin(Point::new(4, 7));
        let params = map.params();
        let (cam, armor) = (params.camera_height, params.target_height);
        let grids = map.grids().unwrap();
        for p in field.grid().bounds() {
            let to = map.mapper().cell_center(p);
            assert_eq!(
                grids.can_hit.at(p),
                Some(los.evaluate(from, to, params.max_range, cam, armor))
            );
            assert_eq!(
                grids.be_seen.at(p),
                Some(los.evaluate(from, to, params.max_range, armor, cam))
            );
        }
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_build_matches_sequential_fold() {
        // Scattered 0.6 m posts over gently ridged ground.
        let field = HeightField::from_fn(280, 150, |p| match (p.x + 3 * p.y) % 17 {
            0 => 0.6,
            _ => 0.05 * f64::from(p.x % 5),
        });
        let mapper = CoordinateMapper::new(FieldDimensions::default(), 280, 150);
        let params = SightParams::default();
        let observer = Point::new(97, 41);
        let los = LineOfSight::new(&field, mapper);
        let from = mapper.cell_origin(observer);
        let sequential = |direction| {
            Grid::from_fn(280, 150, |p| {
                los.check(from, mapper.cell_center(p), &params, direction)
            })
        };
        let pair = build_visibility(&field, mapper, observer, &params);
        assert_eq!(pair.can_hit, sequential(SightDirection::Hit));
        assert_eq!(pair.be_seen, sequential(SightDirection::BeSeen));
        assert!(pair.can_hit.count_true() > 0);
    }

    #[test]
    fn full_recompute_ignores_enemy() {
        let mut map = loaded(walled());
        map.set_observer(Point::new(3, 10));
        let before = map.grids().unwrap().clone();
        map.set_enemy(Point::new(17, 12));
        assert_eq!(map.grids().unwrap(), &before);
    }

    #[test]
    fn line_patch_only_touches_the_line() {
        let mut map = loaded(walled());
        map.set_observer(Point::new(3, 10));
        map.set_enemy_update(EnemyUpdate::LinePatch);
        // Make every cell stale so patched cells stand out.
        let mut stale = map.grids().unwrap().clone();
        stale.can_hit = Grid::filled(20, 20, true);
        map.grids = Some(stale.clone());

        let enemy = Point::new(17, 12);
        map.set_enemy(enemy);

        let field = walled();
        let los = LineOfSight::new(&field, *map.mapper());
        let walk: Vec<_> = los
            .walk(
                map.mapper().cell_origin(Point::new(3, 10)),
                map.mapper().cell_origin(enemy),
                0.3,
                0.15,
            )
            .unwrap()
            .collect();
        let grids = map.grids().unwrap();
        for (p, &v) in grids.can_hit.iter() {
            match walk.iter().find(|s| s.cell == p) {
                Some(s) => assert_eq!(v, s.clear, "{p}"),
                None => assert!(v, "{p} should be untouched"),
            }
        }
        assert!(walk.iter().any(|s| !s.clear), "the wall is on the line");
        assert_eq!(grids.be_seen, stale.be_seen);
    }

    #[test]
    fn line_patch_skips_range_check() {
        let mut map = loaded(HeightField::flat(20, 20));
        map.set_max_range(3.0);
        map.set_enemy_update(EnemyUpdate::LinePatch);
        let far = Point::new(15, 0);
        assert!(!map.grids().unwrap().can_hit.at(far).unwrap());
        map.set_enemy(far);
        // The patch marks the line clear even past the range limit; a full
        // recompute would not.
        assert!(map.grids().unwrap().can_hit.at(Point::new(14, 0)).unwrap());
        map.recompute();
        assert!(!map.grids().unwrap().can_hit.at(Point::new(14, 0)).unwrap());
    }

    #[test]
    fn line_patch_onto_observer_cell_changes_nothing() {
        let mut map = loaded(walled());
        map.set_observer(Point::new(6, 6));
        map.set_enemy_update(EnemyUpdate::LinePatch);
        let before = map.grids().unwrap().clone();
        map.set_enemy(Point::new(6, 6));
        assert_eq!(map.enemy(), Point::new(6, 6));
        assert_eq!(map.grids().unwrap(), &before);
    }

    #[test]
    fn duel_agrees_with_grids() {
        let mut map = loaded(walled());
        map.set_observer(Point::new(3, 10));
        for enemy in [Point::new(8, 10), Point::new(15, 10), Point::new(15, 19)] {
            map.set_enemy(enemy);
            let duel = map.duel().unwrap();
            let grids = map.grids().unwrap();
            assert_eq!(Some(duel.observer_hits_enemy), grids.can_hit.at(enemy));
            assert_eq!(Some(duel.enemy_sees_observer), grids.be_seen.at(enemy));
        }
    }

    #[test]
    fn coverage_combines_both_grids() {
        assert_eq!(Coverage::classify(true, false), Coverage::Visible);
        assert_eq!(Coverage::classify(true, true), Coverage::VisibleAndSeen);
        assert_eq!(Coverage::classify(false, true), Coverage::SeenOnly);
        assert_eq!(Coverage::classify(false, false), Coverage::Hidden);

        let mut map = loaded(walled());
        assert_eq!(map.coverage(Point::new(1, 1)), Some(Coverage::VisibleAndSeen));
        map.set_observer(Point::new(3, 10));
        assert_eq!(map.coverage(Point::new(15, 10)), Some(Coverage::Hidden));
        assert_eq!(map.coverage(Point::new(20, 0)), None);
        assert_eq!(VisibilityMap::new(meter_field()).coverage(Point::ZERO), None);
    }

    #[test]
    fn config_seeds_the_map() {
        let cfg = EngineConfig {
            params: SightParams {
                camera_height: 1.0,
                target_height: 0.5,
                max_range: 2.0,
            },
            enemy_update: EnemyUpdate::LinePatch,
            ..EngineConfig::default()
        };
        let map = VisibilityMap::from_config(&cfg);
        assert_eq!(map.params(), cfg.params);
        assert_eq!(map.enemy_update(), EnemyUpdate::LinePatch);
        assert_eq!(map.mapper().field(), FieldDimensions::default());
    }

    #[test]
    fn unchanged_setters_keep_grids() {
        let mut map = loaded(walled());
        map.set_observer(Point::new(3, 10));
        let before = map.grids().unwrap().clone();
        map.set_observer(Point::new(3, 10));
        map.set_params(map.params());
        assert_eq!(map.grids().unwrap(), &before);
    }
}
