use super::{Game, GameKind};
use crate::config::GameConfig;
use crate::trial::{ResponseMode, Trial};
use chromaspan_core::{Choice, PALETTE, Score, Stimulus, Summary, Symbol, TrialRecord};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use std::ops::RangeInclusive;
use tracing::debug;

/// Repetitions of each letter within one pass of a block.
pub const REPETITIONS: RangeInclusive<usize> = 3..=10;

/// Every palette letter repeated a random number of times, in palette order,
/// and the whole pass run twice.
pub fn drill_block(rng: &mut dyn RngCore) -> Vec<Symbol> {
    let mut pass = Vec::new();
    for symbol in PALETTE {
        let reps = rng.random_range(REPETITIONS);
        pass.extend(std::iter::repeat_n(symbol, reps));
    }
    let mut block = pass.clone();
    block.extend(pass);
    block
}

/// Black letter, then pick its colour from the full palette. Feedback
/// floods the screen with the true colour.
#[derive(Debug, Clone, Default)]
pub struct DelayedMatch {
    block: Vec<Symbol>,
}

impl DelayedMatch {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Game for DelayedMatch {
    fn kind(&self) -> GameKind {
        GameKind::DelayedMatch
    }

    fn begin(&mut self, config: &GameConfig, rng: &mut dyn RngCore) -> usize {
        let mut block = drill_block(rng);
        block.shuffle(rng);
        self.block = block;
        debug!(len = self.block.len(), "delayed match block built");
        self.block.len().min(config.trial_count)
    }

    fn build_trial(&mut self, index: usize, _config: &GameConfig, _rng: &mut dyn RngCore) -> Trial {
        let symbol = self.block.get(index).copied().unwrap_or(PALETTE[0]);
        Trial {
            index,
            span: 1,
            items: vec![Stimulus::black_letter(symbol.letter)],
            cue: None,
            prompt: Some("Pick the letter's colour".to_string()),
            options: PALETTE.iter().map(Choice::swatch_of).collect(),
            mode: ResponseMode::Select {
                count: 1,
                distinct: false,
            },
            expected: vec![symbol],
            reveal: Some(Stimulus::Flood { colour: symbol.rgb }),
        }
    }

    fn summary(&self, score: &Score, records: &[TrialRecord]) -> Summary {
        Summary::Block {
            steps: records.len(),
            score: Some(*score),
        }
    }
}

/// Coloured letter then a full-field flood of its colour. Nothing to answer.
#[derive(Debug, Clone, Default)]
pub struct PassiveDrill {
    block: Vec<Symbol>,
}

impl PassiveDrill {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Game for PassiveDrill {
    fn kind(&self) -> GameKind {
        GameKind::PassiveDrill
    }

    fn begin(&mut self, config: &GameConfig, rng: &mut dyn RngCore) -> usize {
        self.block = drill_block(rng);
        debug!(len = self.block.len(), "passive drill block built");
        self.block.len().min(config.trial_count)
    }

    fn build_trial(&mut self, index: usize, _config: &GameConfig, _rng: &mut dyn RngCore) -> Trial {
        let symbol = self.block.get(index).copied().unwrap_or(PALETTE[0]);
        Trial {
            index,
            span: 1,
            items: vec![Stimulus::coloured_letter(&symbol)],
            cue: None,
            prompt: None,
            options: Vec::new(),
            mode: ResponseMode::Passive,
            expected: vec![symbol],
            reveal: Some(Stimulus::Flood { colour: symbol.rgb }),
        }
    }

    fn summary(&self, _score: &Score, records: &[TrialRecord]) -> Summary {
        Summary::Block {
            steps: records.len(),
            score: None,
        }
    }
}
