//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (storage order of each entity list)
//! - No rendering or platform dependencies

pub mod collision;
pub mod grid;
pub mod movement;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::BulletHit;
pub use state::{
    Bee, Bullet, DdtBomb, Earwig, Effect, EffectKind, EntityStore, GameEvent, GameState,
    HostileKind, Millipede, Mushroom, Player, Segment, Spider,
};
pub use tick::{TickInput, tick};
