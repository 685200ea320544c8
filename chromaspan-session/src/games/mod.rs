//! The ten training games. Each one supplies trial content and scoring; the
//! [`Sequencer`](crate::Sequencer) owns timing and state.

mod drill;
mod matching;
mod nback;
mod span;
mod speed;
mod spelling;

pub use drill::{DelayedMatch, PassiveDrill};
pub use matching::EarlyMatch;
pub use nback::NBack;
pub use span::{SpanGame, SpanVariant};
pub use speed::{SpeedDirection, SpeedTest};
pub use spelling::Spelling;

use crate::config::GameConfig;
use crate::error::UnknownGame;
use crate::state::Step;
use crate::trial::{Response, Trial};
use chromaspan_core::{Outcome, Rgb, Score, Setting, Summary, TrialRecord};
use rand::RngCore;
use std::fmt;
use std::str::FromStr;

/// Content and scoring rules for one game.
pub trait Game: Send {
    fn kind(&self) -> GameKind;

    /// Resets per-session state and returns the trial budget.
    fn begin(&mut self, config: &GameConfig, rng: &mut dyn RngCore) -> usize;

    fn build_trial(&mut self, index: usize, config: &GameConfig, rng: &mut dyn RngCore) -> Trial;

    /// Scores a concluded trial and applies any difficulty change.
    fn judge(&mut self, trial: &Trial, response: &Response) -> Outcome {
        standard_outcome(trial, response)
    }

    /// Called once when the budget is exhausted, before [`Game::summary`].
    fn finish(&mut self, _score: &Score) {}

    fn summary(&self, score: &Score, records: &[TrialRecord]) -> Summary;

    /// Changes the idle-time setting, if the game has one.
    fn adjust(&mut self, _config: &mut GameConfig, _step: Step) -> Option<Setting> {
        None
    }

    fn setting(&self, _config: &GameConfig) -> Option<Setting> {
        None
    }

    fn background(&self) -> Rgb {
        Rgb::BACKGROUND
    }
}

/// Selection trials are correct when the answer matches in order; silence
/// is a timeout; a match key press means nothing to a selection trial.
pub fn standard_outcome(trial: &Trial, response: &Response) -> Outcome {
    match response {
        Response::NoAnswer => Outcome::TimedOut,
        Response::Selections(selected) => Outcome::from_correct(trial.selections_match(selected)),
        Response::Match => Outcome::Incorrect,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameKind {
    EarlySpan,
    LateSpan,
    BackwardSpan,
    Spelling,
    EarlyMatch,
    DelayedMatch,
    PassiveDrill,
    LettersToColours,
    ColoursToLetters,
    NBack,
}

impl GameKind {
    pub const ALL: [GameKind; 10] = [
        GameKind::EarlySpan,
        GameKind::LateSpan,
        GameKind::BackwardSpan,
        GameKind::Spelling,
        GameKind::EarlyMatch,
        GameKind::DelayedMatch,
        GameKind::PassiveDrill,
        GameKind::LettersToColours,
        GameKind::ColoursToLetters,
        GameKind::NBack,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            GameKind::EarlySpan => "early-span",
            GameKind::LateSpan => "late-span",
            GameKind::BackwardSpan => "backward-span",
            GameKind::Spelling => "spelling",
            GameKind::EarlyMatch => "early-match",
            GameKind::DelayedMatch => "delayed-match",
            GameKind::PassiveDrill => "passive-drill",
            GameKind::LettersToColours => "letters-to-colours",
            GameKind::ColoursToLetters => "colours-to-letters",
            GameKind::NBack => "n-back",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GameKind::EarlySpan => "Early Span",
            GameKind::LateSpan => "Late Span",
            GameKind::BackwardSpan => "Backward Span",
            GameKind::Spelling => "Spelling Task",
            GameKind::EarlyMatch => "Early Match (E-DMTS)",
            GameKind::DelayedMatch => "Delayed Match",
            GameKind::PassiveDrill => "Passive Drill",
            GameKind::LettersToColours => "Letters to Colours Speed Test",
            GameKind::ColoursToLetters => "Colours to Letters Speed Test",
            GameKind::NBack => "Synaesthesia N-Back",
        }
    }

    pub fn default_config(self) -> GameConfig {
        let base = GameConfig::default();
        match self {
            GameKind::EarlySpan => base,
            GameKind::LateSpan => GameConfig {
                trial_count: 3,
                ..base
            },
            GameKind::BackwardSpan => GameConfig {
                gap_ms: 0,
                feedback_ms: 1000,
                ..base
            },
            GameKind::Spelling => GameConfig {
                display_ms: 500,
                gap_ms: 0,
                retention_ms: 0,
                feedback_ms: 1000,
                ..base
            },
            GameKind::EarlyMatch => GameConfig {
                trial_count: 30,
                display_ms: 1500,
                gap_ms: 0,
                retention_ms: 3000,
                response_timeout_ms: Some(4000),
                ..base
            },
            GameKind::DelayedMatch => GameConfig {
                trial_count: 260,
                display_ms: 1000,
                gap_ms: 0,
                retention_ms: 0,
                feedback_ms: 500,
                ..base
            },
            GameKind::PassiveDrill => GameConfig {
                trial_count: 260,
                display_ms: 1000,
                gap_ms: 0,
                retention_ms: 0,
                feedback_ms: 500,
                ..base
            },
            GameKind::LettersToColours | GameKind::ColoursToLetters => GameConfig {
                trial_count: 100,
                gap_ms: 0,
                retention_ms: 0,
                feedback_ms: 500,
                inter_trial_ms: 250,
                ..base
            },
            GameKind::NBack => GameConfig {
                trial_count: 50,
                display_ms: 500,
                gap_ms: 0,
                retention_ms: 0,
                response_timeout_ms: Some(2500),
                feedback_ms: 500,
                ..base
            },
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for GameKind {
    type Err = UnknownGame;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        GameKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == wanted)
            .ok_or_else(|| UnknownGame(s.to_string()))
    }
}

pub fn make_game(kind: GameKind) -> Box<dyn Game> {
    match kind {
        GameKind::EarlySpan => Box::new(SpanGame::new(SpanVariant::Early)),
        GameKind::LateSpan => Box::new(SpanGame::new(SpanVariant::Late)),
        GameKind::BackwardSpan => Box::new(SpanGame::new(SpanVariant::Backward)),
        GameKind::Spelling => Box::new(Spelling::new()),
        GameKind::EarlyMatch => Box::new(EarlyMatch::new()),
        GameKind::DelayedMatch => Box::new(DelayedMatch::new()),
        GameKind::PassiveDrill => Box::new(PassiveDrill::new()),
        GameKind::LettersToColours => Box::new(SpeedTest::new(SpeedDirection::LettersToColours)),
        GameKind::ColoursToLetters => Box::new(SpeedTest::new(SpeedDirection::ColoursToLetters)),
        GameKind::NBack => Box::new(NBack::new()),
    }
}
