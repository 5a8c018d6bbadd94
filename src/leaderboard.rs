//! Score sink and standings collaborators
//!
//! The core never talks to a backend directly. It hands finished runs to a
//! [`ScoreSink`] and reads standings from a [`LeaderboardSource`]; both may
//! fail without affecting the game.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::highscores::{HighScores, MAX_HIGH_SCORES, ScoreEntry};

/// Errors raised by score backends
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("score backend unavailable: {0}")]
    Unavailable(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed leaderboard data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Raw input that sanitized to nothing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("initials must contain 1-3 letters or digits, got {0:?}")]
pub struct InitialsError(pub String);

/// Player initials: 1-3 uppercase ASCII letters or digits
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Initials(String);

impl Initials {
    pub const MAX_LEN: usize = 3;

    /// Uppercase, drop anything but `A-Z0-9`, keep the first three
    pub fn parse(raw: &str) -> Result<Self, InitialsError> {
        let clean: String = raw
            .chars()
            .map(|c| c.to_ascii_uppercase())
            .filter(char::is_ascii_alphanumeric)
            .take(Self::MAX_LEN)
            .collect();
        if clean.is_empty() {
            return Err(InitialsError(raw.to_string()));
        }
        Ok(Self(clean))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Initials {
    type Error = InitialsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Initials> for String {
    fn from(value: Initials) -> Self {
        value.0
    }
}

impl fmt::Display for Initials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Receives finished runs
pub trait ScoreSink {
    fn submit(&mut self, game_id: &str, initials: &Initials, score: u64) -> Result<(), SinkError>;
}

/// Supplies the standings shown while browsing
pub trait LeaderboardSource {
    fn fetch_top(&self, game_id: &str) -> Result<Vec<ScoreEntry>, SinkError>;
}

/// Normalize a standings payload into at most 10 entries, best first.
///
/// Accepts a bare array or an object wrapping one under `top10`, `scores` or
/// `leaderboard`. Rows without usable initials or score are skipped; any
/// other shape yields an empty list.
pub fn parse_standings(json: &str) -> Vec<ScoreEntry> {
    let value: Value = match serde_json::from_str(json) {
        Ok(value) => value,
        Err(err) => {
            log::warn!("Ignoring unreadable standings: {}", err);
            return Vec::new();
        }
    };

    let rows = match &value {
        Value::Array(rows) => rows.as_slice(),
        Value::Object(map) => ["top10", "scores", "leaderboard"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .map_or(&[][..], Vec::as_slice),
        _ => &[],
    };

    let entries = rows
        .iter()
        .filter_map(|row| serde_json::from_value::<ScoreEntry>(row.clone()).ok())
        .collect();
    HighScores::from_entries(entries).entries().to_vec()
}

/// File-backed local leaderboard, one table per game id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalLeaderboard {
    tables: BTreeMap<String, HighScores>,
}

impl LocalLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON file. A missing or unreadable-as-JSON file starts
    /// empty; only I/O failures are errors.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No leaderboard at {}, starting fresh", path.display());
            return Ok(Self::new());
        }
        let board: Self = match serde_json::from_str(&fs::read_to_string(path)?) {
            Ok(board) => board,
            Err(err) => {
                log::warn!("Ignoring malformed leaderboard {}: {}", path.display(), err);
                return Ok(Self::new());
            }
        };
        log::info!(
            "Loaded leaderboard from {} ({} games)",
            path.display(),
            board.tables.len()
        );
        Ok(board)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SinkError> {
        let path = path.as_ref();
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        log::info!("Leaderboard saved to {}", path.display());
        Ok(())
    }
}

impl ScoreSink for LocalLeaderboard {
    fn submit(&mut self, game_id: &str, initials: &Initials, score: u64) -> Result<(), SinkError> {
        let rank = self
            .tables
            .entry(game_id.to_string())
            .or_default()
            .add_score(initials.clone(), score);
        match rank {
            Some(rank) => log::info!("{} scored {} (rank {})", initials, score, rank),
            None => log::debug!("{} scored {} (not ranked)", initials, score),
        }
        Ok(())
    }
}

impl LeaderboardSource for LocalLeaderboard {
    fn fetch_top(&self, game_id: &str) -> Result<Vec<ScoreEntry>, SinkError> {
        Ok(self
            .tables
            .get(game_id)
            .map(|t| t.entries().iter().take(MAX_HIGH_SCORES).cloned().collect())
            .unwrap_or_default())
    }
}
