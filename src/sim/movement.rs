//! Per-kind movement rules
//!
//! Only the millipede head reads the terrain; body segments follow the
//! segment ahead of them. Spiders, bees and earwigs run simple scripted
//! motion and are dropped once they leave the board.

use glam::{IVec2, Vec2};
use rand::Rng;

use super::grid::{cell_in_bounds, cell_of, clamp_to_zone, in_bounds, zone_max, zone_min};
use super::state::{Bullet, GameEvent, GameState, Millipede, Mushroom, Segment};
use super::tick::TickInput;
use crate::consts::*;

/// Integrate directional input (or an absolute pointer) into the player position
pub fn move_player(state: &mut GameState, input: &TickInput) {
    let player = &mut state.store.player;
    if let Some(pointer) = input.pointer {
        player.pos = clamp_to_zone(pointer - Vec2::splat(0.5));
        return;
    }
    let dir = input.direction();
    if dir != Vec2::ZERO {
        player.pos = clamp_to_zone(player.pos + dir * state.tuning.player_speed);
    }
}

/// Spawn a bullet if fire is held and the cooldown has elapsed
pub fn fire(state: &mut GameState, input: &TickInput) -> bool {
    if !input.fire {
        return false;
    }
    let ready = match state.last_shot_tick {
        Some(last) => state
            .tuning
            .cooldown_elapsed(state.time_ticks.saturating_sub(last)),
        None => true,
    };
    if !ready {
        return false;
    }
    let pos = state.store.player.pos + Vec2::new(0.5, 0.0);
    state.store.bullets.push(Bullet { pos });
    state.last_shot_tick = Some(state.time_ticks);
    state.emit(GameEvent::ShotFired);
    true
}

/// Move bullets up one step; bullets leaving the top are dropped
pub fn advance_bullets(state: &mut GameState) {
    let step = state.tuning.bullet_step;
    state.store.bullets.retain_mut(|bullet| {
        bullet.pos.y -= step;
        in_bounds(bullet.pos)
    });
}

/// Step every chain one cell (call on millipede move ticks only)
pub fn step_millipedes(state: &mut GameState) {
    let store = &mut state.store;
    for chain in &mut store.millipedes {
        step_chain(chain, &store.mushrooms);
    }
}

/// Move the head by the terrain rules, then pull the body along
pub fn step_chain(chain: &mut Millipede, mushrooms: &[Mushroom]) {
    let Some(head) = chain.segments.first_mut() else {
        return;
    };
    let mut prev = *head;
    advance_head(head, mushrooms);

    for segment in chain.segments.iter_mut().skip(1) {
        let current = *segment;
        segment.cell = prev.cell;
        segment.dir = prev.dir;
        prev = current;
    }
}

/// Head rules: dive, turn at walls/mushrooms, or walk
fn advance_head(head: &mut Segment, mushrooms: &[Mushroom]) {
    if head.diving {
        head.cell.y = (head.cell.y + 1).min(ROWS - 1);
        if head.cell.y >= ROWS - 1 {
            head.diving = false;
        }
        return;
    }

    let next = IVec2::new(head.cell.x + head.dir, head.cell.y);
    let blocker = if !cell_in_bounds(next) {
        Some(false)
    } else {
        mushrooms.iter().find(|m| m.cell == next).map(|m| m.poisoned)
    };

    match blocker {
        None => head.cell.x = next.x,
        Some(true) => {
            head.diving = true;
            head.cell.y = (head.cell.y + 1).min(ROWS - 1);
            if head.cell.y >= ROWS - 1 {
                head.diving = false;
            }
        }
        Some(false) => {
            head.cell.y += 1;
            head.dir = -head.dir;
            if head.cell.y >= ROWS {
                head.cell.y = PLAYER_ZONE_START;
            }
        }
    }
}

/// Bounce spiders around the player zone; they chew mushrooms as they go
pub fn move_spiders(state: &mut GameState) {
    let tick = state.time_ticks;
    let GameState {
        rng,
        tuning,
        store,
        events,
        ..
    } = state;
    let (min, max) = (zone_min(), zone_max());

    for spider in &mut store.spiders {
        spider.pos += spider.vel;
        spider.timer += 1;

        if spider.pos.x < min.x {
            spider.pos.x = min.x;
            spider.vel.x = spider.vel.x.abs();
        } else if spider.pos.x > max.x {
            spider.pos.x = max.x;
            spider.vel.x = -spider.vel.x.abs();
        }
        if spider.pos.y < min.y {
            spider.pos.y = min.y;
            spider.vel.y = spider.vel.y.abs();
        } else if spider.pos.y > max.y {
            spider.pos.y = max.y;
            spider.vel.y = -spider.vel.y.abs();
        }

        if tuning.spider_turn_period > 0
            && spider.timer % tuning.spider_turn_period == 0
            && rng.random_bool(0.5)
        {
            spider.vel.y = -spider.vel.y;
        }

        if tuning.spider_eat_period > 0 && tick % tuning.spider_eat_period == 0 {
            let cell = cell_of(spider.pos);
            if let Some(idx) = store.mushrooms.iter().position(|m| m.cell == cell) {
                store.mushrooms.swap_remove(idx);
                events.push(GameEvent::MushroomEaten { cell });
            }
        }
    }
    store.spiders.retain(|s| in_bounds(s.pos));
}

/// Bees fall through the field and plant at most one mushroom each
pub fn move_bees(state: &mut GameState) {
    let tick = state.time_ticks;
    let drop_tick = state.tuning.bee_drop_period > 0 && tick % state.tuning.bee_drop_period == 0;
    let mut bees = std::mem::take(&mut state.store.bees);

    for bee in &mut bees {
        bee.pos.y += bee.vel_y;
        if drop_tick && !bee.dropped && bee.pos.y < PLAYER_ZONE_START as f32 {
            let cell = cell_of(bee.pos);
            if cell_in_bounds(cell) && state.store.plant_mushroom(cell) {
                bee.dropped = true;
                state.emit(GameEvent::MushroomPlanted { cell });
            }
        }
    }

    bees.retain(|b| b.pos.y < ROWS as f32);
    state.store.bees = bees;
}

/// Earwigs crawl right and poison any mushroom beneath them
pub fn move_earwigs(state: &mut GameState) {
    let GameState { store, events, .. } = state;
    for earwig in &mut store.earwigs {
        earwig.pos.x += earwig.vel_x;
        let cell = cell_of(earwig.pos);
        if let Some(mushroom) = store.mushrooms.iter_mut().find(|m| m.cell == cell) {
            if !mushroom.poisoned {
                mushroom.poisoned = true;
                events.push(GameEvent::MushroomPoisoned { cell });
            }
        }
    }
    store.earwigs.retain(|e| in_bounds(e.pos));
}
