//! Level generation and hostile spawning
//!
//! Obstacle placement never lands on an occupied cell: random probes first,
//! then a scan of the remaining free cells, and nothing at all when the
//! region is saturated.

use std::ops::RangeInclusive;

use glam::{IVec2, Vec2};
use rand::Rng;
use rand_pcg::Pcg32;

use super::grid::cells_in;
use super::state::{
    Bee, DdtBomb, EntityStore, Earwig, GameEvent, GameState, HostileKind, Millipede, Mushroom,
    Player, Spider,
};
use crate::consts::*;

/// Random probes before falling back to a free-cell scan
const PLACEMENT_PROBES: usize = 32;

/// Mushroom field rows at level start
const FIELD_ROWS: RangeInclusive<i32> = 1..=(ROWS - 10);
/// DDT bomb columns/rows
const DDT_COLS: RangeInclusive<i32> = 1..=(COLS - 2);
const DDT_ROWS: RangeInclusive<i32> = 5..=(ROWS - 10);
/// Earwigs enter on one of these rows
const EARWIG_ROWS: RangeInclusive<i32> = 10..=19;

/// Clamp a tuned probability into `0..=1` (NaN never fires)
fn probability(p: f64) -> f64 {
    if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
}

/// Pick a free cell inside the rectangle, or `None` if it is saturated
pub fn free_cell(
    rng: &mut Pcg32,
    store: &EntityStore,
    cols: RangeInclusive<i32>,
    rows: RangeInclusive<i32>,
) -> Option<IVec2> {
    if cols.is_empty() || rows.is_empty() {
        return None;
    }
    for _ in 0..PLACEMENT_PROBES {
        let cell = IVec2::new(
            rng.random_range(cols.clone()),
            rng.random_range(rows.clone()),
        );
        if !store.is_occupied(cell) {
            return Some(cell);
        }
    }
    let free: Vec<IVec2> = cells_in(cols, rows)
        .filter(|&cell| !store.is_occupied(cell))
        .collect();
    if free.is_empty() {
        return None;
    }
    Some(free[rng.random_range(0..free.len())])
}

/// Reset the board for `level`.
///
/// Level 0 starts a fresh run: score reset, full mushroom field. Later levels
/// keep the score and carry part of the surviving field over.
pub fn start_level(state: &mut GameState, level: u32) {
    let GameState {
        rng, tuning, store, ..
    } = state;

    store.bullets.clear();
    store.spiders.clear();
    store.bees.clear();
    store.earwigs.clear();
    store.ddt_bombs.clear();
    store.effects.clear();
    store.player = Player::default();

    if level == 0 {
        store.mushrooms.clear();
        for _ in 0..tuning.mushroom_count {
            match free_cell(rng, store, 0..=(COLS - 1), FIELD_ROWS) {
                Some(cell) => store.mushrooms.push(Mushroom::new(cell)),
                None => break,
            }
        }
    } else {
        let keep = probability(tuning.mushroom_carry_over);
        store.mushrooms.retain(|_| rng.random_bool(keep));
    }

    for _ in 0..tuning.ddt_count {
        if let Some(cell) = free_cell(rng, store, DDT_COLS, DDT_ROWS) {
            store.ddt_bombs.push(DdtBomb { cell, active: true });
        }
    }

    let head_x = (tuning.millipede_length as i32 - 1).clamp(0, COLS - 1);
    store.millipedes = vec![Millipede::spawn(
        IVec2::new(head_x, 0),
        tuning.millipede_length,
    )];

    if level == 0 {
        state.score = 0;
    }
    state.level = level;
    state.time_ticks = 0;
    state.last_shot_tick = None;

    log::info!(
        "Level {} ready: {} mushrooms, {} bombs, {}-segment millipede",
        level,
        state.store.mushrooms.len(),
        state.store.ddt_bombs.len(),
        state.tuning.millipede_length
    );
}

/// Board cleared: move to the next level in place
pub fn advance_level(state: &mut GameState) {
    let cleared = state.level;
    state.emit(GameEvent::LevelCleared { level: cleared });
    start_level(state, cleared + 1);
}

/// Spawn spiders, bees and earwigs on their tick schedules
pub fn spawn_hostiles(state: &mut GameState) {
    let tick = state.time_ticks;
    let GameState {
        rng, tuning, store, ..
    } = state;
    let mut spawned = Vec::new();

    if tuning.spider.due(tick, store.spiders.len())
        && rng.random_bool(probability(tuning.spider.chance))
    {
        let left = rng.random_bool(0.5);
        let x = if left { 0.0 } else { (COLS - 1) as f32 };
        let vx = if rng.random_bool(0.5) {
            tuning.spider_speed
        } else {
            -tuning.spider_speed
        };
        store.spiders.push(Spider {
            pos: Vec2::new(x, (PLAYER_ZONE_START + 1) as f32),
            vel: Vec2::new(vx, tuning.spider_speed),
            timer: 0,
        });
        spawned.push(HostileKind::Spider);
    }

    if tuning.bee.due(tick, store.bees.len())
        && rng.random_bool(probability(tuning.bee.chance))
    {
        let x = rng.random_range(0..COLS) as f32;
        store.bees.push(Bee {
            pos: Vec2::new(x, 0.0),
            vel_y: tuning.bee_speed,
            dropped: false,
        });
        spawned.push(HostileKind::Bee);
    }

    if tuning.earwig.due(tick, store.earwigs.len())
        && rng.random_bool(probability(tuning.earwig.chance))
    {
        let y = rng.random_range(EARWIG_ROWS) as f32;
        store.earwigs.push(Earwig {
            pos: Vec2::new(0.0, y),
            vel_x: tuning.earwig_speed,
        });
        spawned.push(HostileKind::Earwig);
    }

    for kind in spawned {
        log::debug!("Spawned {:?} at tick {}", kind, tick);
        state.emit(GameEvent::HostileSpawned { kind });
    }
}
