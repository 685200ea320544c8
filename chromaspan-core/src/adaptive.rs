//! Difficulty rules shared by the adaptive games.

use crate::palette::PALETTE_SIZE;
use serde::{Deserialize, Serialize};

/// Sequence length that steps up after a correct answer and down after a
/// miss, always within `1..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    value: usize,
    max: usize,
}

impl Span {
    pub fn new(initial: usize, max: usize) -> Self {
        let max = max.max(1);
        Self {
            value: initial.clamp(1, max),
            max,
        }
    }

    /// Span bounded by the palette size.
    pub fn palette(initial: usize) -> Self {
        Self::new(initial, PALETTE_SIZE)
    }

    pub fn get(&self) -> usize {
        self.value
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// Applies one outcome and returns the new span.
    pub fn adapt(&mut self, correct: bool) -> usize {
        self.value = if correct {
            (self.value + 1).min(self.max)
        } else {
            self.value.saturating_sub(1).max(1)
        };
        self.value
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::palette(1)
    }
}

/// Continuous difficulty in `[MIN, MAX]`. Higher means the foil sits closer
/// to the true colour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyIndex(f64);

impl DifficultyIndex {
    pub const MIN: f64 = 0.05;
    pub const MAX: f64 = 0.95;
    pub const STEP: f64 = 0.2;
    pub const INITIAL: f64 = 0.5;

    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn nudge(&mut self, correct: bool) -> f64 {
        let step = if correct { Self::STEP } else { -Self::STEP };
        self.0 = (self.0 + step).clamp(Self::MIN, Self::MAX);
        self.0
    }
}

impl Default for DifficultyIndex {
    fn default() -> Self {
        Self(Self::INITIAL)
    }
}
