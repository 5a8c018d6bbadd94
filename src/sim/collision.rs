//! Collision and combat resolution
//!
//! Bullets are tested against destructible kinds in a fixed priority order
//! (DDT bombs, mushrooms, spiders, bees, millipede segments). The first match
//! consumes the bullet, so one shot scores at most one hit per tick.

use glam::{IVec2, Vec2};

use super::grid::{cell_center, cell_of, near};
use super::state::{Effect, EffectKind, GAS_COLOR, GameEvent, GameState, Millipede};

/// Bullet vs DDT bomb tolerance (per axis, from the bomb's cell center)
pub const DDT_TOLERANCE: f32 = 0.8;
/// Bullet vs spider/bee tolerance
pub const HOSTILE_TOLERANCE: f32 = 1.0;
/// Bullet vs millipede segment tolerance
pub const SEGMENT_TOLERANCE: f32 = 0.7;
/// Player vs any hostile tolerance
pub const PLAYER_TOLERANCE: f32 = 0.8;

/// Lifetimes of the cosmetic bursts
const MUSHROOM_BURST_TICKS: u32 = 8;
const SPIDER_BURST_TICKS: u32 = 15;
const BEE_BURST_TICKS: u32 = 10;
const BEE_BURST_COLOR: u32 = 0xFFFFFF;

/// What a bullet struck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletHit {
    Ddt,
    Mushroom,
    Spider,
    Bee,
    Segment { head: bool },
}

/// Resolve every live bullet; bullets that hit something are removed
pub fn resolve_bullets(state: &mut GameState) -> Vec<BulletHit> {
    let bullets = std::mem::take(&mut state.store.bullets);
    let mut survivors = Vec::with_capacity(bullets.len());
    let mut hits = Vec::new();

    for bullet in bullets {
        match resolve_bullet(state, bullet.pos) {
            Some(hit) => hits.push(hit),
            None => survivors.push(bullet),
        }
    }

    state.store.bullets = survivors;
    hits
}

/// Apply the first hit for a bullet at `pos`
pub fn resolve_bullet(state: &mut GameState, pos: Vec2) -> Option<BulletHit> {
    hit_ddt(state, pos)
        .or_else(|| hit_mushroom(state, pos))
        .or_else(|| hit_spider(state, pos))
        .or_else(|| hit_bee(state, pos))
        .or_else(|| hit_segment(state, pos))
}

fn hit_ddt(state: &mut GameState, pos: Vec2) -> Option<BulletHit> {
    let bomb = state
        .store
        .ddt_bombs
        .iter_mut()
        .find(|d| d.active && near(pos, cell_center(d.cell), DDT_TOLERANCE))?;
    bomb.active = false;
    let cell = bomb.cell;

    state.store.effects.push(Effect {
        center: cell_center(cell),
        color: GAS_COLOR,
        life_ticks: state.tuning.gas_lifetime,
        kind: EffectKind::Gas {
            radius: state.tuning.gas_radius,
        },
    });
    state.award(state.tuning.scores.ddt);
    state.emit(GameEvent::DdtDetonated { cell });
    log::debug!("DDT detonated at {:?}", cell);
    Some(BulletHit::Ddt)
}

fn hit_mushroom(state: &mut GameState, pos: Vec2) -> Option<BulletHit> {
    let cell = cell_of(pos);
    let idx = state.store.mushroom_at(cell)?;
    let palette = state.palette();
    let mushroom = &mut state.store.mushrooms[idx];
    mushroom.health = mushroom.health.saturating_sub(1);
    let destroyed = mushroom.health == 0;
    let color = if mushroom.poisoned {
        palette.poisoned
    } else {
        palette.mushroom
    };
    if destroyed {
        state.store.mushrooms.remove(idx);
    }

    state
        .store
        .effects
        .push(Effect::burst(cell_center(cell), color, MUSHROOM_BURST_TICKS));
    state.award(state.tuning.scores.mushroom);
    state.emit(GameEvent::MushroomHit { cell, destroyed });
    Some(BulletHit::Mushroom)
}

fn hit_spider(state: &mut GameState, pos: Vec2) -> Option<BulletHit> {
    let idx = state
        .store
        .spiders
        .iter()
        .position(|s| near(pos, s.center(), HOSTILE_TOLERANCE))?;
    let spider = state.store.spiders.remove(idx);
    let color = state.palette().spider;
    state
        .store
        .effects
        .push(Effect::burst(spider.center(), color, SPIDER_BURST_TICKS));
    state.award(state.tuning.scores.spider);
    state.emit(GameEvent::SpiderKilled { pos: spider.pos });
    Some(BulletHit::Spider)
}

fn hit_bee(state: &mut GameState, pos: Vec2) -> Option<BulletHit> {
    let idx = state
        .store
        .bees
        .iter()
        .position(|b| near(pos, b.center(), HOSTILE_TOLERANCE))?;
    let bee = state.store.bees.remove(idx);
    state
        .store
        .effects
        .push(Effect::burst(bee.center(), BEE_BURST_COLOR, BEE_BURST_TICKS));
    state.award(state.tuning.scores.bee);
    state.emit(GameEvent::BeeKilled { pos: bee.pos });
    Some(BulletHit::Bee)
}

/// Destroy the struck segment, leave a mushroom, and sever the chain there
fn hit_segment(state: &mut GameState, pos: Vec2) -> Option<BulletHit> {
    let (chain_idx, seg_idx) = state
        .store
        .millipedes
        .iter()
        .enumerate()
        .find_map(|(ci, chain)| {
            chain
                .segments
                .iter()
                .position(|s| near(pos, s.center(), SEGMENT_TOLERANCE))
                .map(|si| (ci, si))
        })?;

    let chain = std::mem::take(&mut state.store.millipedes[chain_idx]);
    let cell = chain.segments[seg_idx].cell;
    let head = seg_idx == 0;
    let (front, back) = chain.split_at(seg_idx);
    let front_len = front.len();
    let back_len = back.as_ref().map_or(0, Millipede::len);

    state.store.millipedes[chain_idx] = front;
    if let Some(back) = back {
        state.store.millipedes.push(back);
    }
    state.store.plant_mushroom(cell);

    let points = if head {
        state.tuning.scores.head
    } else {
        state.tuning.scores.body
    };
    state.award(points);
    state.emit(GameEvent::SegmentDestroyed { cell, head });
    if front_len > 0 && back_len > 0 {
        state.emit(GameEvent::ChainSplit {
            front: front_len,
            back: back_len,
        });
    }
    Some(BulletHit::Segment { head })
}

/// Player touching a millipede head, spider or bee ends the run
pub fn check_player_hostiles(state: &mut GameState) -> bool {
    let store = &state.store;
    let player = store.player.pos;
    let touched = store
        .millipedes
        .iter()
        .filter_map(Millipede::head)
        .any(|h| near(h.cell.as_vec2(), player, PLAYER_TOLERANCE))
        || store
            .spiders
            .iter()
            .any(|s| near(s.pos, player, PLAYER_TOLERANCE))
        || store
            .bees
            .iter()
            .any(|b| near(b.pos, player, PLAYER_TOLERANCE));

    if touched {
        state.kill_player();
    }
    touched
}

/// Live gas clouds destroy every segment, bee and spider inside their radius
pub fn apply_gas(state: &mut GameState) {
    let clouds: Vec<(Vec2, f32)> = state
        .store
        .effects
        .iter()
        .filter_map(|e| e.area_radius().map(|r| (e.center, r)))
        .collect();
    if clouds.is_empty() {
        return;
    }
    let gassed = |p: Vec2| clouds.iter().any(|&(c, r)| near(p, c, r));

    let chains = std::mem::take(&mut state.store.millipedes);
    let mut rebuilt = Vec::with_capacity(chains.len());
    let mut killed_cells: Vec<(IVec2, bool)> = Vec::new();
    for chain in chains {
        let mut index = 0;
        let (pieces, _) = chain.remove_where(|s| {
            let hit = gassed(s.center());
            if hit {
                killed_cells.push((s.cell, index == 0));
            }
            index += 1;
            hit
        });
        rebuilt.extend(pieces);
    }
    state.store.millipedes = rebuilt;

    let bees_before = state.store.bees.len();
    state.store.bees.retain(|b| !gassed(b.center()));
    let bees_killed = bees_before - state.store.bees.len();

    let spiders_before = state.store.spiders.len();
    state.store.spiders.retain(|s| !gassed(s.center()));
    let spiders_killed = spiders_before - state.store.spiders.len();

    let scores = state.tuning.scores;
    state.award(scores.body * killed_cells.len() as u64);
    state.award(scores.bee * bees_killed as u64);
    state.award(scores.spider * spiders_killed as u64);
    for (cell, head) in killed_cells {
        state.emit(GameEvent::SegmentDestroyed { cell, head });
    }
}

/// Age effects; expired ones disappear
pub fn decay_effects(state: &mut GameState) {
    state.store.effects.retain_mut(|e| {
        e.life_ticks = e.life_ticks.saturating_sub(1);
        e.life_ticks > 0
    });
}
