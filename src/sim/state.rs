//! Game state and core simulation types
//!
//! The entity store owns every live entity in one typed collection per kind.
//! Entities never reference each other; all cross-entity effects are computed
//! by the collision pass reading the whole store.

use glam::{IVec2, Vec2};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::grid::cell_center;
use super::spawn;
use crate::consts::*;
use crate::tuning::Tuning;
use crate::{Palette, palette_for_level};

/// The player's turret
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::new(PLAYER_START_X, PLAYER_START_Y),
        }
    }
}

/// A player shot travelling up the board
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
}

/// Destructible obstacle occupying one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mushroom {
    pub cell: IVec2,
    pub health: u8,
    /// Sticky once set; poisoned mushrooms send millipede heads diving
    pub poisoned: bool,
}

impl Mushroom {
    pub fn new(cell: IVec2) -> Self {
        Self {
            cell,
            health: MUSHROOM_HEALTH,
            poisoned: false,
        }
    }
}

/// One body cell of a millipede chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub cell: IVec2,
    /// Horizontal direction, -1 or +1
    pub dir: i32,
    /// Head is dropping straight down after touching a poisoned mushroom
    pub diving: bool,
}

impl Segment {
    pub fn new(cell: IVec2, dir: i32) -> Self {
        Self {
            cell,
            dir,
            diving: false,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        cell_center(self.cell)
    }
}

/// An ordered chain of segments; index 0 is the head
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Millipede {
    pub segments: Vec<Segment>,
}

impl Millipede {
    /// Spawn a chain with its head at `head`, body trailing to the left
    pub fn spawn(head: IVec2, length: usize) -> Self {
        let segments = (0..length as i32)
            .map(|i| Segment::new(IVec2::new((head.x - i).max(0), head.y), 1))
            .collect();
        Self { segments }
    }

    pub fn head(&self) -> Option<&Segment> {
        self.segments.first()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Destroy the segment at `index`, severing the chain there.
    ///
    /// Returns the front part `[0, index)` and, when non-empty, the back part
    /// `(index, len)` as an independent chain led by its first segment.
    pub fn split_at(mut self, index: usize) -> (Millipede, Option<Millipede>) {
        if index >= self.segments.len() {
            return (self, None);
        }
        let back: Vec<Segment> = self.segments.split_off(index + 1);
        self.segments.truncate(index);
        let back = (!back.is_empty()).then(|| Millipede { segments: back });
        (self, back)
    }

    /// Remove every segment matching `dead`, rebuilding the survivors into
    /// contiguous chains (in order). Returns the pieces and the kill count.
    pub fn remove_where(self, mut dead: impl FnMut(&Segment) -> bool) -> (Vec<Millipede>, usize) {
        let mut pieces = Vec::new();
        let mut current = Vec::new();
        let mut killed = 0;
        for segment in self.segments {
            if dead(&segment) {
                killed += 1;
                if !current.is_empty() {
                    pieces.push(Millipede {
                        segments: std::mem::take(&mut current),
                    });
                }
            } else {
                current.push(segment);
            }
        }
        if !current.is_empty() {
            pieces.push(Millipede { segments: current });
        }
        (pieces, killed)
    }
}

/// Bouncing hostile confined to the player zone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spider {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Ticks since spawn
    pub timer: u32,
}

impl Spider {
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(0.5)
    }
}

/// Falling hostile that can plant one mushroom
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bee {
    pub pos: Vec2,
    pub vel_y: f32,
    /// Already left its mushroom behind
    pub dropped: bool,
}

impl Bee {
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(0.5)
    }
}

/// Crawls across the field poisoning mushrooms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Earwig {
    pub pos: Vec2,
    pub vel_x: f32,
}

/// One-shot area weapon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DdtBomb {
    pub cell: IVec2,
    pub active: bool,
}

/// Effect kinds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Cosmetic hit flash
    Burst,
    /// DDT gas cloud; kills hostiles within `radius` while alive
    Gas { radius: f32 },
}

/// Transient effect (explosion or gas cloud)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub center: Vec2,
    pub color: u32,
    pub life_ticks: u32,
    pub kind: EffectKind,
}

impl Effect {
    pub fn burst(center: Vec2, color: u32, life_ticks: u32) -> Self {
        Self {
            center,
            color,
            life_ticks,
            kind: EffectKind::Burst,
        }
    }

    /// Kill radius while this effect is a live gas cloud
    pub fn area_radius(&self) -> Option<f32> {
        match self.kind {
            EffectKind::Gas { radius } if self.life_ticks > 0 => Some(radius),
            _ => None,
        }
    }
}

/// Gas cloud color
pub const GAS_COLOR: u32 = 0xFFFF00;

/// Events emitted during a tick for render/audio collaborators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ShotFired,
    MushroomHit { cell: IVec2, destroyed: bool },
    MushroomPlanted { cell: IVec2 },
    MushroomPoisoned { cell: IVec2 },
    MushroomEaten { cell: IVec2 },
    DdtDetonated { cell: IVec2 },
    SpiderKilled { pos: Vec2 },
    BeeKilled { pos: Vec2 },
    SegmentDestroyed { cell: IVec2, head: bool },
    ChainSplit { front: usize, back: usize },
    HostileSpawned { kind: HostileKind },
    PlayerKilled,
    LevelCleared { level: u32 },
}

/// Auxiliary hostile kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostileKind {
    Spider,
    Bee,
    Earwig,
}

/// All live entities, one collection per kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityStore {
    pub player: Player,
    pub bullets: Vec<Bullet>,
    pub mushrooms: Vec<Mushroom>,
    pub millipedes: Vec<Millipede>,
    pub spiders: Vec<Spider>,
    pub bees: Vec<Bee>,
    pub earwigs: Vec<Earwig>,
    pub ddt_bombs: Vec<DdtBomb>,
    pub effects: Vec<Effect>,
}

impl EntityStore {
    /// Index of the mushroom occupying `cell`
    pub fn mushroom_at(&self, cell: IVec2) -> Option<usize> {
        self.mushrooms.iter().position(|m| m.cell == cell)
    }

    /// Whether `cell` already holds an obstacle (mushroom or live bomb)
    pub fn is_occupied(&self, cell: IVec2) -> bool {
        self.mushroom_at(cell).is_some()
            || self.ddt_bombs.iter().any(|d| d.active && d.cell == cell)
    }

    /// Total segments across all chains
    pub fn segment_count(&self) -> usize {
        self.millipedes.iter().map(Millipede::len).sum()
    }

    /// Drop chains that have lost every segment
    pub fn prune_chains(&mut self) {
        self.millipedes.retain(|c| !c.is_empty());
    }

    /// Plant a fresh mushroom unless the cell is taken
    pub fn plant_mushroom(&mut self, cell: IVec2) -> bool {
        if self.is_occupied(cell) {
            return false;
        }
        self.mushrooms.push(Mushroom::new(cell));
        true
    }
}

/// Complete run state: the simulation context passed to every update
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    /// Ticks since the level started
    pub time_ticks: u64,
    pub level: u32,
    pub score: u64,
    pub store: EntityStore,
    /// Tick of the last accepted shot
    pub last_shot_tick: Option<u64>,
    /// Set by any fatal collision; the session freezes the run
    pub player_dead: bool,
    /// Events from the most recent tick
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a run at level 0 with the given seed
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            time_ticks: 0,
            level: 0,
            score: 0,
            store: EntityStore::default(),
            last_shot_tick: None,
            player_dead: false,
            events: Vec::new(),
        };
        spawn::start_level(&mut state, 0);
        state
    }

    /// Add points (score never decreases)
    #[inline]
    pub fn award(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Mark the player dead (idempotent)
    pub fn kill_player(&mut self) {
        if !self.player_dead {
            self.player_dead = true;
            log::info!(
                "Player killed on level {} at tick {} (score {})",
                self.level,
                self.time_ticks,
                self.score
            );
            self.emit(GameEvent::PlayerKilled);
        }
    }

    pub fn palette(&self) -> &'static Palette {
        palette_for_level(self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(len: usize) -> Millipede {
        Millipede::spawn(IVec2::new(11, 0), len)
    }

    #[test]
    fn test_spawn_trails_left_of_head() {
        let milli = chain(12);
        assert_eq!(milli.len(), 12);
        assert_eq!(milli.segments[0].cell, IVec2::new(11, 0));
        assert_eq!(milli.segments[11].cell, IVec2::new(0, 0));
        assert!(milli.segments.iter().all(|s| s.dir == 1 && !s.diving));
    }

    #[test]
    fn test_split_middle() {
        let (front, back) = chain(12).split_at(5);
        assert_eq!(front.len(), 5);
        let back = back.unwrap();
        assert_eq!(back.len(), 6);
        assert_eq!(back.segments[0].cell, IVec2::new(5, 0));
    }

    #[test]
    fn test_split_head_leaves_empty_front() {
        let (front, back) = chain(4).split_at(0);
        assert!(front.is_empty());
        assert_eq!(back.unwrap().len(), 3);
    }

    #[test]
    fn test_split_tail_has_no_back() {
        let (front, back) = chain(4).split_at(3);
        assert_eq!(front.len(), 3);
        assert!(back.is_none());
    }

    #[test]
    fn test_remove_where_rebuilds_runs() {
        let (pieces, killed) = chain(8).remove_where(|s| s.cell.x == 9 || s.cell.x == 8);
        assert_eq!(killed, 2);
        let lens: Vec<_> = pieces.iter().map(Millipede::len).collect();
        assert_eq!(lens, vec![2, 4]);

        let (pieces, killed) = chain(3).remove_where(|_| true);
        assert_eq!(killed, 3);
        assert!(pieces.is_empty());
    }

    #[test]
    fn test_plant_mushroom_rejects_occupied() {
        let mut store = EntityStore::default();
        assert!(store.plant_mushroom(IVec2::new(2, 2)));
        assert!(!store.plant_mushroom(IVec2::new(2, 2)));
        store.ddt_bombs.push(DdtBomb {
            cell: IVec2::new(3, 3),
            active: true,
        });
        assert!(!store.plant_mushroom(IVec2::new(3, 3)));
    }

    #[test]
    fn test_gas_radius_expires() {
        let mut gas = Effect {
            center: Vec2::ZERO,
            color: GAS_COLOR,
            life_ticks: 1,
            kind: EffectKind::Gas { radius: 3.0 },
        };
        assert_eq!(gas.area_radius(), Some(3.0));
        gas.life_ticks = 0;
        assert_eq!(gas.area_radius(), None);
        assert_eq!(Effect::burst(Vec2::ZERO, 0, 5).area_radius(), None);
    }
}
