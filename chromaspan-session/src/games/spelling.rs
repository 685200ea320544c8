use super::{Game, GameKind};
use crate::config::GameConfig;
use crate::trial::{ResponseMode, Trial};
use chromaspan_core::palette::{alphabetical, sample_distinct};
use chromaspan_core::{Choice, Rgb, Score, Stimulus, Summary, TrialRecord};
use rand::{Rng, RngCore};
use tracing::info;

pub const MAX_LEVEL: u8 = 4;
/// Session accuracy needed to move up a level.
pub const PROMOTION_PERCENT: f64 = 90.0;

/// Spell a "word" of colour squares with letter keys. The level survives
/// restarts.
#[derive(Debug, Clone)]
pub struct Spelling {
    level: u8,
}

impl Spelling {
    pub fn new() -> Self {
        Self { level: 1 }
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    fn word_length(&self, rng: &mut dyn RngCore) -> usize {
        match self.level {
            1 => rng.random_range(2..=3),
            2 => 4,
            3 => 5,
            _ => rng.random_range(6..=7),
        }
    }
}

impl Default for Spelling {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for Spelling {
    fn kind(&self) -> GameKind {
        GameKind::Spelling
    }

    fn begin(&mut self, config: &GameConfig, _rng: &mut dyn RngCore) -> usize {
        config.trial_count
    }

    fn build_trial(&mut self, index: usize, _config: &GameConfig, rng: &mut dyn RngCore) -> Trial {
        let length = self.word_length(rng);
        let word = sample_distinct(rng, length);
        Trial {
            index,
            span: word.len(),
            items: vec![Stimulus::SwatchRow {
                colours: word.iter().map(|s| s.rgb).collect(),
            }],
            cue: None,
            prompt: Some("Click the letters to spell the word".to_string()),
            options: alphabetical().iter().map(Choice::letter_of).collect(),
            mode: ResponseMode::Select {
                count: word.len(),
                distinct: false,
            },
            expected: word,
            reveal: None,
        }
    }

    fn finish(&mut self, score: &Score) {
        if score.accuracy_percent() >= PROMOTION_PERCENT && self.level < MAX_LEVEL {
            self.level += 1;
            info!(level = self.level, "spelling level raised");
        }
    }

    fn summary(&self, score: &Score, _records: &[TrialRecord]) -> Summary {
        Summary::Spelling {
            score: *score,
            level: self.level,
        }
    }

    fn background(&self) -> Rgb {
        Rgb::PAPER
    }
}
