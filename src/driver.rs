//! Frame-paced driver
//!
//! Owns the session and a score backend. Each animation callback calls
//! [`Driver::frame`] once; renderers read a [`FrameView`] afterwards.

use crate::highscores::ScoreEntry;
use crate::leaderboard::{LeaderboardSource, ScoreSink};
use crate::session::{Phase, Session, SessionError};
use crate::sim::{GameEvent, GameState, TickInput};
use crate::{Palette, palette_for_level};

/// Read-only snapshot for renderers and audio
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub phase: Phase,
    pub game: Option<&'a GameState>,
    pub standings: &'a [ScoreEntry],
    /// Best score on the board, for the header
    pub best_score: Option<u64>,
    pub palette: &'static Palette,
    /// Events produced by the last tick
    pub events: &'a [GameEvent],
}

pub struct Driver<B> {
    session: Session,
    backend: B,
}

impl<B: ScoreSink + LeaderboardSource> Driver<B> {
    /// Wrap a session; standings are fetched immediately
    pub fn new(session: Session, backend: B) -> Self {
        let mut driver = Self { session, backend };
        driver.refresh_standings();
        driver
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Run one tick when the phase read now is Playing
    pub fn frame(&mut self, input: &TickInput) -> bool {
        self.session.update(input)
    }

    pub fn start(&mut self) -> Result<(), SessionError> {
        self.session.start()
    }

    pub fn abandon_run(&mut self) -> Result<(), SessionError> {
        self.session.abandon_run()
    }

    /// Commit initials, then reload standings for the browsing screen
    pub fn commit_initials(&mut self, raw: &str) -> Result<bool, SessionError> {
        let accepted = self.session.commit_initials(raw, &mut self.backend)?;
        self.refresh_standings();
        Ok(accepted)
    }

    /// Pull standings from the backend; failures leave an empty table
    pub fn refresh_standings(&mut self) {
        let entries = match self.backend.fetch_top(self.session.game_id()) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!("Could not fetch standings: {}", err);
                Vec::new()
            }
        };
        self.session.set_standings(entries);
    }

    pub fn view(&self) -> FrameView<'_> {
        let game = self.session.game();
        FrameView {
            phase: self.session.phase(),
            game,
            standings: self.session.standings(),
            best_score: self.session.best_score(),
            palette: palette_for_level(self.session.level()),
            events: game.map_or(&[][..], |g| g.events.as_slice()),
        }
    }
}
