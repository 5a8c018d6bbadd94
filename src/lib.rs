//! Millipede Arcade - a grid survival shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, collisions, spawning, tick)
//! - `session`: Browsing / Playing / AwaitingInitials state machine
//! - `driver`: Frame-paced loop that feeds input into the session
//! - `leaderboard`: Score sink and standings collaborator interfaces
//! - `highscores`: In-memory top-10 table
//! - `tuning`: Data-driven game balance

pub mod driver;
pub mod highscores;
pub mod leaderboard;
pub mod session;
pub mod sim;
pub mod tuning;

pub use driver::{Driver, FrameView};
pub use highscores::{HighScores, ScoreEntry};
pub use leaderboard::{
    Initials, LeaderboardSource, LocalLeaderboard, ScoreSink, SinkError, parse_standings,
};
pub use session::{Phase, Session, SessionError};
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Board width in cells
    pub const COLS: i32 = 20;
    /// Board height in cells
    pub const ROWS: i32 = 32;
    /// First row of the player's movement zone
    pub const PLAYER_ZONE_START: i32 = ROWS - 8;
    /// Pixel size of one cell (renderers only)
    pub const CELL_SIZE: u32 = 20;

    /// Player spawn position
    pub const PLAYER_START_X: f32 = COLS as f32 / 2.0;
    pub const PLAYER_START_Y: f32 = (ROWS - 4) as f32;

    /// Mushroom starting health
    pub const MUSHROOM_HEALTH: u8 = 4;

    /// Leaderboard namespace for this game
    pub const GAME_ID: &str = "millipede-arcade-v2";
}

/// Palette used for a level (0xRRGGBB)
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Palette {
    pub mushroom: u32,
    pub millipede: u32,
    pub spider: u32,
    pub laser: u32,
    pub poisoned: u32,
    pub background: u32,
}

/// Palettes cycle with the level index
pub const PALETTES: [Palette; 3] = [
    Palette {
        mushroom: 0xFFCC00,
        millipede: 0xFF0000,
        spider: 0xFFFFFF,
        laser: 0xFFFFFF,
        poisoned: 0x00FF00,
        background: 0x000000,
    },
    Palette {
        mushroom: 0x00FFFF,
        millipede: 0x00FF00,
        spider: 0xFFFF00,
        laser: 0x00FFFF,
        poisoned: 0xFF00FF,
        background: 0x050005,
    },
    Palette {
        mushroom: 0xFF00FF,
        millipede: 0xFFFFFF,
        spider: 0x00FFFF,
        laser: 0xFF00FF,
        poisoned: 0xFFFF00,
        background: 0x000505,
    },
];

/// Palette for a given level
#[inline]
pub fn palette_for_level(level: u32) -> &'static Palette {
    &PALETTES[level as usize % PALETTES.len()]
}
