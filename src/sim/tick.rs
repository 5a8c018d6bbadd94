//! Fixed tick simulation
//!
//! One call advances the run by exactly one tick. The tick counter is the
//! only time base, so a seed plus an input sequence replays exactly.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision;
use super::movement;
use super::spawn;
use super::state::GameState;

/// Logical input snapshot for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Fire held (key or pointer down)
    pub fire: bool,
    /// Absolute pointer position in grid units (touch control)
    pub pointer: Option<Vec2>,
}

impl TickInput {
    /// Normalized movement direction; opposite keys cancel per axis
    pub fn direction(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down)).normalize_or_zero()
    }
}

/// Advance the run by one tick. A dead player freezes the run.
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.events.clear();
    if state.player_dead {
        return;
    }
    state.time_ticks += 1;

    // Player and bullets
    movement::move_player(state, input);
    movement::fire(state, input);
    movement::advance_bullets(state);
    collision::resolve_bullets(state);

    // Millipedes step on a level-scaled cadence
    if state.time_ticks % state.tuning.move_period(state.level) == 0 {
        movement::step_millipedes(state);
    }

    // Auxiliary hostiles
    spawn::spawn_hostiles(state);
    movement::move_bees(state);
    movement::move_earwigs(state);
    movement::move_spiders(state);

    collision::check_player_hostiles(state);
    collision::apply_gas(state);
    collision::decay_effects(state);

    state.store.prune_chains();
    if !state.player_dead && state.store.millipedes.is_empty() {
        log::info!("Level {} cleared (score {})", state.level, state.score);
        spawn::advance_level(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{GameEvent, Millipede, Segment};
    use crate::tuning::Tuning;
    use glam::IVec2;

    #[test]
    fn test_direction_cancels_and_normalizes() {
        let input = TickInput {
            left: true,
            right: true,
            down: true,
            ..Default::default()
        };
        assert_eq!(input.direction(), Vec2::new(0.0, 1.0));

        let input = TickInput {
            left: true,
            up: true,
            ..Default::default()
        };
        assert!((input.direction().length() - 1.0).abs() < 1e-6);
        assert_eq!(TickInput::default().direction(), Vec2::ZERO);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = GameState::new(99999, Tuning::default());
        let mut state2 = GameState::new(99999, Tuning::default());

        let inputs = [
            TickInput {
                left: true,
                fire: true,
                ..Default::default()
            },
            TickInput {
                up: true,
                ..Default::default()
            },
            TickInput {
                right: true,
                fire: true,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for i in 0..2000 {
            let input = &inputs[i % inputs.len()];
            tick(&mut state1, input);
            tick(&mut state2, input);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.level, state2.level);
        assert_eq!(state1.player_dead, state2.player_dead);
        assert_eq!(state1.store.mushrooms, state2.store.mushrooms);
        assert_eq!(state1.store.millipedes, state2.store.millipedes);
        assert_eq!(state1.store.player, state2.store.player);
    }

    #[test]
    fn test_dead_player_freezes_run() {
        let mut state = GameState::new(1, Tuning::default());
        state.player_dead = true;
        let before = state.time_ticks;
        tick(
            &mut state,
            &TickInput {
                fire: true,
                ..Default::default()
            },
        );
        assert_eq!(state.time_ticks, before);
        assert!(state.store.bullets.is_empty());
    }

    #[test]
    fn test_level_advances_once_when_last_chain_dies() {
        let mut state = GameState::new(2, Tuning::default());
        state.score = 500;
        state.store.mushrooms.clear();
        // One segment left, about to be shot
        state.store.millipedes = vec![Millipede {
            segments: vec![Segment::new(IVec2::new(3, 2), 1)],
        }];
        state.store.bullets.push(crate::sim::state::Bullet {
            pos: Vec2::new(3.5, 3.5),
        });

        tick(&mut state, &TickInput::default());

        assert_eq!(state.level, 1);
        assert_eq!(state.score, 600);
        assert_eq!(state.store.millipedes.len(), 1);
        assert_eq!(state.store.millipedes[0].len(), 12);
        let cleared = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::LevelCleared { .. }))
            .count();
        assert_eq!(cleared, 1);

        // Next tick stays on level 1
        tick(&mut state, &TickInput::default());
        assert_eq!(state.level, 1);
    }

    #[test]
    fn test_empty_chain_removed_same_tick() {
        let mut state = GameState::new(4, Tuning::default());
        state.store.millipedes.push(Millipede {
            segments: vec![Segment::new(IVec2::new(15, 3), -1)],
        });
        let target = state.store.millipedes[1].segments[0].center();
        state.store.bullets.push(crate::sim::state::Bullet {
            pos: target + Vec2::new(0.0, 1.0),
        });
        // Keep the shot clear of mushrooms in the target's cell column
        state
            .store
            .mushrooms
            .retain(|m| m.cell.x != 15 || m.cell.y != 3);

        tick(&mut state, &TickInput::default());

        assert_eq!(state.store.millipedes.len(), 1);
        assert!(state.store.millipedes.iter().all(|c| !c.is_empty()));
    }
}
