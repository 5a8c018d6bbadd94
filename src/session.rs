//! Session state machine
//!
//! Browsing -> Playing -> AwaitingInitials -> Browsing. A run only advances
//! while Playing; any fatal collision freezes it until initials are committed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::GAME_ID;
use crate::highscores::{HighScores, ScoreEntry};
use crate::leaderboard::{Initials, InitialsError, ScoreSink};
use crate::sim::{GameState, TickInput, tick};
use crate::tuning::Tuning;

/// Multiplier spreading consecutive run seeds
const RUN_SEED_STRIDE: u64 = 2_654_435_761;

/// Coarse game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Showing standings, waiting for a start command
    Browsing,
    Playing,
    /// Run over; waiting for a name
    AwaitingInitials,
}

/// Commands the session refused
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("expected {expected:?} phase, session is {actual:?}")]
    WrongPhase { expected: Phase, actual: Phase },
    #[error(transparent)]
    InvalidInitials(#[from] InitialsError),
}

#[derive(Debug, Clone)]
pub struct Session {
    phase: Phase,
    /// Current or frozen run; `None` while browsing
    game: Option<GameState>,
    tuning: Tuning,
    seed: u64,
    runs: u64,
    standings: HighScores,
    game_id: String,
    initials: String,
}

impl Session {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            phase: Phase::Browsing,
            game: None,
            tuning,
            seed,
            runs: 0,
            standings: HighScores::new(),
            game_id: GAME_ID.to_string(),
            initials: String::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn game(&self) -> Option<&GameState> {
        self.game.as_ref()
    }

    /// Mutable access to the run, for editors and test harnesses
    pub fn game_mut(&mut self) -> Option<&mut GameState> {
        self.game.as_mut()
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    /// Score of the current (or frozen) run
    pub fn score(&self) -> u64 {
        self.game.as_ref().map_or(0, |g| g.score)
    }

    pub fn level(&self) -> u32 {
        self.game.as_ref().map_or(0, |g| g.level)
    }

    pub fn standings(&self) -> &[ScoreEntry] {
        self.standings.entries()
    }

    /// Best score in the cached standings
    pub fn best_score(&self) -> Option<u64> {
        self.standings.top_score()
    }

    pub fn set_standings(&mut self, entries: Vec<ScoreEntry>) {
        self.standings = HighScores::from_entries(entries);
    }

    /// Rank the current score would reach in the cached standings
    pub fn potential_rank(&self) -> Option<usize> {
        self.standings.potential_rank(self.score())
    }

    /// Seed used by run number `run`
    pub fn run_seed(&self, run: u64) -> u64 {
        self.seed.wrapping_add(run.wrapping_mul(RUN_SEED_STRIDE))
    }

    fn expect_phase(&self, expected: Phase) -> Result<(), SessionError> {
        if self.phase != expected {
            log::warn!("Rejected command: expected {:?}, in {:?}", expected, self.phase);
            return Err(SessionError::WrongPhase {
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }

    /// Begin a new run at level 0
    pub fn start(&mut self) -> Result<(), SessionError> {
        self.expect_phase(Phase::Browsing)?;
        let seed = self.run_seed(self.runs);
        self.runs += 1;
        self.game = Some(GameState::new(seed, self.tuning.clone()));
        self.initials.clear();
        self.phase = Phase::Playing;
        log::info!("Run {} started (seed {})", self.runs, seed);
        Ok(())
    }

    /// Advance one tick if playing. Returns whether a tick ran.
    pub fn update(&mut self, input: &TickInput) -> bool {
        if self.phase != Phase::Playing {
            return false;
        }
        let Some(game) = self.game.as_mut() else {
            return false;
        };
        tick(game, input);
        if game.player_dead {
            self.phase = Phase::AwaitingInitials;
            log::info!("Game over: score {} on level {}", game.score, game.level);
        }
        true
    }

    /// End the current run early; the score can still be committed
    pub fn abandon_run(&mut self) -> Result<(), SessionError> {
        self.expect_phase(Phase::Playing)?;
        self.phase = Phase::AwaitingInitials;
        log::info!("Run abandoned with score {}", self.score());
        Ok(())
    }

    /// Typed initials so far
    pub fn initials_buffer(&self) -> &str {
        &self.initials
    }

    /// Append a character to the initials buffer. Non-alphanumerics and
    /// input past three characters are ignored.
    pub fn push_initial(&mut self, c: char) -> bool {
        if self.phase != Phase::AwaitingInitials
            || !c.is_ascii_alphanumeric()
            || self.initials.len() >= Initials::MAX_LEN
        {
            return false;
        }
        self.initials.push(c.to_ascii_uppercase());
        true
    }

    pub fn pop_initial(&mut self) -> Option<char> {
        self.initials.pop()
    }

    /// Commit the typed buffer
    pub fn commit_buffer(&mut self, sink: &mut dyn ScoreSink) -> Result<bool, SessionError> {
        let raw = self.initials.clone();
        self.commit_initials(&raw, sink)
    }

    /// Submit the finished run and return to browsing.
    ///
    /// Sink failures are logged and swallowed; the returned flag reports
    /// whether the sink accepted the score.
    pub fn commit_initials(
        &mut self,
        raw: &str,
        sink: &mut dyn ScoreSink,
    ) -> Result<bool, SessionError> {
        self.expect_phase(Phase::AwaitingInitials)?;
        let initials = Initials::parse(raw).inspect_err(|err| log::warn!("{}", err))?;
        let score = self.score();

        let accepted = match sink.submit(&self.game_id, &initials, score) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("Score submission failed: {}", err);
                false
            }
        };

        self.game = None;
        self.initials.clear();
        self.phase = Phase::Browsing;
        log::info!("{} submitted {}, back to browsing", initials, score);
        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::SinkError;
    use crate::sim::{Millipede, Segment};

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(String, String, u64)>,
        fail: bool,
    }

    impl ScoreSink for Recorder {
        fn submit(
            &mut self,
            game_id: &str,
            initials: &Initials,
            score: u64,
        ) -> Result<(), SinkError> {
            self.calls
                .push((game_id.to_string(), initials.to_string(), score));
            if self.fail {
                return Err(SinkError::Unavailable("offline".into()));
            }
            Ok(())
        }
    }

    /// Start a run and kill the player on the first tick
    fn dead_session() -> Session {
        let mut session = Session::new(1, Tuning::default());
        session.start().unwrap();
        let game = session.game.as_mut().unwrap();
        game.score = 4200;
        let cell = game.store.player.pos.floor().as_ivec2();
        game.store.millipedes.push(Millipede {
            segments: vec![Segment::new(cell, 1)],
        });
        session.update(&TickInput::default());
        session
    }

    #[test]
    fn test_phase_cycle() {
        let mut session = Session::new(1, Tuning::default());
        assert_eq!(session.phase(), Phase::Browsing);
        assert!(!session.update(&TickInput::default()));

        session.start().unwrap();
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.level(), 0);
        assert!(session.update(&TickInput::default()));

        let mut session = dead_session();
        assert_eq!(session.phase(), Phase::AwaitingInitials);
        let ticks = session.game().unwrap().time_ticks;
        assert!(!session.update(&TickInput::default()));
        assert_eq!(session.game().unwrap().time_ticks, ticks);

        let mut sink = Recorder::default();
        assert!(session.commit_initials("ace", &mut sink).unwrap());
        assert_eq!(session.phase(), Phase::Browsing);
        assert_eq!(session.score(), 0);
        assert_eq!(
            sink.calls,
            vec![(GAME_ID.to_string(), "ACE".to_string(), 4200)]
        );
    }

    #[test]
    fn test_start_rejected_outside_browsing() {
        let mut session = Session::new(1, Tuning::default());
        session.start().unwrap();
        assert!(matches!(
            session.start(),
            Err(SessionError::WrongPhase {
                expected: Phase::Browsing,
                actual: Phase::Playing
            })
        ));
    }

    #[test]
    fn test_commit_rejected_while_playing() {
        let mut session = Session::new(1, Tuning::default());
        session.start().unwrap();
        let mut sink = Recorder::default();
        assert!(session.commit_initials("ACE", &mut sink).is_err());
        assert!(sink.calls.is_empty());
        assert_eq!(session.phase(), Phase::Playing);
    }

    #[test]
    fn test_invalid_initials_keep_waiting() {
        let mut session = dead_session();
        let mut sink = Recorder::default();
        let err = session.commit_initials("!!", &mut sink).unwrap_err();
        assert!(matches!(err, SessionError::InvalidInitials(_)));
        assert_eq!(session.phase(), Phase::AwaitingInitials);
        assert!(sink.calls.is_empty());
        assert_eq!(session.score(), 4200);
    }

    #[test]
    fn test_sink_failure_is_not_fatal() {
        let mut session = dead_session();
        let mut sink = Recorder {
            fail: true,
            ..Default::default()
        };
        assert!(!session.commit_initials("ACE", &mut sink).unwrap());
        assert_eq!(sink.calls.len(), 1);
        assert_eq!(session.phase(), Phase::Browsing);
        assert!(session.game().is_none());
    }

    #[test]
    fn test_initials_buffer() {
        let mut session = Session::new(1, Tuning::default());
        assert!(!session.push_initial('a'));

        let mut session = dead_session();
        for c in ['a', '-', 'b', 'c', 'd'] {
            session.push_initial(c);
        }
        assert_eq!(session.initials_buffer(), "ABC");
        assert_eq!(session.pop_initial(), Some('C'));

        let mut sink = Recorder::default();
        assert!(session.commit_buffer(&mut sink).unwrap());
        assert_eq!(sink.calls[0].1, "AB");
        assert_eq!(session.initials_buffer(), "");
    }

    #[test]
    fn test_abandon_keeps_score() {
        let mut session = Session::new(1, Tuning::default());
        assert!(session.abandon_run().is_err());
        session.start().unwrap();
        session.update(&TickInput::default());
        session.abandon_run().unwrap();
        assert_eq!(session.phase(), Phase::AwaitingInitials);
        assert!(!session.update(&TickInput::default()));
    }

    #[test]
    fn test_runs_use_distinct_seeds() {
        let mut session = Session::new(7, Tuning::default());
        session.start().unwrap();
        let first = session.game().unwrap().seed;
        assert_eq!(first, 7);

        session.phase = Phase::Browsing;
        session.start().unwrap();
        assert_eq!(session.game().unwrap().seed, 7 + RUN_SEED_STRIDE);
    }

    #[test]
    fn test_potential_rank_against_standings() {
        let mut session = dead_session();
        let entry = |s: &str, score| ScoreEntry {
            initials: Initials::parse(s).unwrap(),
            score,
        };
        session.set_standings(vec![entry("AAA", 5000), entry("BBB", 1000)]);
        assert_eq!(session.potential_rank(), Some(2));
        assert_eq!(session.best_score(), Some(5000));
    }
}
