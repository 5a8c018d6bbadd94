//! Game balance tuning
//!
//! Every balance constant lives here so a run can be re-tuned from a JSON
//! file without touching the simulation. Missing fields fall back to the
//! arcade defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed tuning json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Spawn schedule for an auxiliary hostile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnSchedule {
    /// Spawn is attempted when `tick % period == 0`
    pub period: u64,
    /// No spawn while this many are alive
    pub cap: usize,
    /// Probability that a scheduled attempt actually spawns
    #[serde(default = "always")]
    pub chance: f64,
}

fn always() -> f64 {
    1.0
}

impl SpawnSchedule {
    pub const fn new(period: u64, cap: usize) -> Self {
        Self {
            period,
            cap,
            chance: 1.0,
        }
    }

    /// Whether `tick` is a scheduled attempt with room for one more
    pub fn due(&self, tick: u64, alive: usize) -> bool {
        self.period > 0 && tick % self.period == 0 && alive < self.cap
    }
}

/// Points awarded per kill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreTable {
    pub ddt: u64,
    pub mushroom: u64,
    pub spider: u64,
    pub bee: u64,
    pub head: u64,
    pub body: u64,
}

impl Default for ScoreTable {
    fn default() -> Self {
        Self {
            ddt: 800,
            mushroom: 1,
            spider: 600,
            bee: 200,
            head: 100,
            body: 10,
        }
    }
}

/// Game balance parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Simulation ticks per second (used to convert millisecond cooldowns)
    pub tick_rate_hz: u32,

    // === Player ===
    pub player_speed: f32,
    pub fire_cooldown_ms: u32,
    /// Rows a bullet climbs per tick
    pub bullet_step: f32,

    // === Millipede ===
    pub millipede_length: usize,
    /// Move period at level 0; each level shortens it by one tick (min 1)
    pub base_move_period: u64,

    // === Field ===
    pub mushroom_count: usize,
    pub ddt_count: usize,
    /// Fraction of mushrooms that survive into the next level
    pub mushroom_carry_over: f64,

    // === Hostiles ===
    pub spider: SpawnSchedule,
    pub bee: SpawnSchedule,
    pub earwig: SpawnSchedule,
    pub spider_speed: f32,
    pub bee_speed: f32,
    pub earwig_speed: f32,
    /// Spider flips vertical direction (p = 0.5) every this many of its own ticks
    pub spider_turn_period: u32,
    /// Spider eats the mushroom under it on ticks that are multiples of this
    pub spider_eat_period: u64,
    /// Bees drop their mushroom on ticks that are multiples of this
    pub bee_drop_period: u64,

    // === DDT ===
    pub gas_radius: f32,
    pub gas_lifetime: u32,

    pub scores: ScoreTable,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60,

            player_speed: 0.35,
            fire_cooldown_ms: 120,
            bullet_step: 1.0,

            millipede_length: 12,
            base_move_period: 4,

            mushroom_count: 55,
            ddt_count: 3,
            mushroom_carry_over: 0.8,

            spider: SpawnSchedule::new(600, 1),
            bee: SpawnSchedule::new(400, 2),
            earwig: SpawnSchedule::new(900, 1),
            spider_speed: 0.08,
            bee_speed: 0.2,
            earwig_speed: 0.1,
            spider_turn_period: 50,
            spider_eat_period: 10,
            bee_drop_period: 45,

            gas_radius: 3.0,
            gas_lifetime: 45,

            scores: ScoreTable::default(),
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.tick_rate_hz == 0 {
            return invalid("tick_rate_hz", "must be positive");
        }
        if self.base_move_period == 0 {
            return invalid("base_move_period", "must be positive");
        }
        if self.millipede_length == 0 {
            return invalid("millipede_length", "must be positive");
        }
        if self.bullet_step.is_nan() || self.bullet_step <= 0.0 {
            return invalid("bullet_step", "must be positive");
        }
        if !(0.0..=1.0).contains(&self.mushroom_carry_over) {
            return invalid("mushroom_carry_over", "must be within 0..=1");
        }
        for (field, schedule) in [
            ("spider.chance", &self.spider),
            ("bee.chance", &self.bee),
            ("earwig.chance", &self.earwig),
        ] {
            if !(0.0..=1.0).contains(&schedule.chance) {
                return invalid(field, "must be within 0..=1");
            }
        }
        if self.gas_radius < 0.0 {
            return invalid("gas_radius", "must not be negative");
        }
        Ok(())
    }

    /// Ticks between millipede steps at `level` (faster on later levels)
    pub fn move_period(&self, level: u32) -> u64 {
        self.base_move_period.saturating_sub(level as u64).max(1)
    }

    /// Whether enough time has passed since the last accepted shot
    pub fn cooldown_elapsed(&self, elapsed_ticks: u64) -> bool {
        elapsed_ticks * 1000 > self.fire_cooldown_ms as u64 * self.tick_rate_hz as u64
    }
}

fn invalid(field: &'static str, reason: &'static str) -> Result<(), TuningError> {
    Err(TuningError::Invalid { field, reason })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "mushroom_count": 10 }"#).unwrap();
        assert_eq!(tuning.mushroom_count, 10);
        assert_eq!(tuning.millipede_length, 12);
        assert_eq!(tuning.scores.ddt, 800);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Tuning::from_json(r#"{ "mushroom_carry_over": 1.5 }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid {
                field: "mushroom_carry_over",
                ..
            }
        ));
        assert!(matches!(
            Tuning::from_json("not json"),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_move_period_speeds_up() {
        let tuning = Tuning::default();
        assert_eq!(tuning.move_period(0), 4);
        assert_eq!(tuning.move_period(2), 2);
        assert_eq!(tuning.move_period(10), 1);
    }

    #[test]
    fn test_fire_cooldown_at_60hz() {
        let tuning = Tuning::default();
        // 7 ticks = 116.7ms, 8 ticks = 133.3ms
        assert!(!tuning.cooldown_elapsed(7));
        assert!(tuning.cooldown_elapsed(8));
    }
}
