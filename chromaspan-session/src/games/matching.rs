use super::{Game, GameKind, standard_outcome};
use crate::config::GameConfig;
use crate::trial::{Response, ResponseMode, Trial};
use chromaspan_core::palette::pick;
use chromaspan_core::{
    Choice, DifficultyIndex, Outcome, PALETTE, PALETTE_SIZE, Score, Stimulus, Summary,
    TrialRecord,
};
use rand::{Rng, RngCore};
use tracing::debug;

/// Delayed match-to-sample with a per-letter foil difficulty.
#[derive(Debug, Clone)]
pub struct EarlyMatch {
    difficulty: [DifficultyIndex; PALETTE_SIZE],
}

impl EarlyMatch {
    pub fn new() -> Self {
        Self {
            difficulty: [DifficultyIndex::default(); PALETTE_SIZE],
        }
    }

    pub fn difficulty(&self, letter: char) -> Option<DifficultyIndex> {
        chromaspan_core::palette::index_of(letter).map(|i| self.difficulty[i])
    }
}

impl Default for EarlyMatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for EarlyMatch {
    fn kind(&self) -> GameKind {
        GameKind::EarlyMatch
    }

    fn begin(&mut self, config: &GameConfig, _rng: &mut dyn RngCore) -> usize {
        self.difficulty = [DifficultyIndex::default(); PALETTE_SIZE];
        config.trial_count
    }

    fn build_trial(&mut self, index: usize, _config: &GameConfig, rng: &mut dyn RngCore) -> Trial {
        let symbol = pick(rng);
        let similarity = self
            .difficulty(symbol.letter)
            .unwrap_or_default()
            .value();
        let foil = symbol.rgb.foil(similarity);
        let mut options = vec![Choice::Swatch(symbol.rgb), Choice::Swatch(foil)];
        if rng.random_bool(0.5) {
            options.swap(0, 1);
        }
        Trial {
            index,
            span: 1,
            items: vec![Stimulus::coloured_letter(&symbol)],
            cue: None,
            prompt: Some("Which colour was the letter?".to_string()),
            options,
            mode: ResponseMode::Select {
                count: 1,
                distinct: false,
            },
            expected: vec![symbol],
            reveal: None,
        }
    }

    fn judge(&mut self, trial: &Trial, response: &Response) -> Outcome {
        let outcome = standard_outcome(trial, response);
        if let Some(i) = trial.expected.first().and_then(|s| s.index()) {
            let value = self.difficulty[i].nudge(outcome.is_correct());
            debug!(letter = %PALETTE[i].letter, value, "difficulty index moved");
        }
        outcome
    }

    fn summary(&self, score: &Score, _records: &[TrialRecord]) -> Summary {
        Summary::LetterDifficulty {
            score: *score,
            per_letter: PALETTE
                .iter()
                .zip(&self.difficulty)
                .map(|(s, d)| (s.letter, d.value()))
                .collect(),
        }
    }
}
