use super::{Game, GameKind, standard_outcome};
use crate::config::GameConfig;
use crate::state::Step;
use crate::trial::{Response, ResponseMode, Trial};
use chromaspan_core::palette::{alphabetical, sample_distinct, shuffled};
use chromaspan_core::summary::floored_mean_span;
use chromaspan_core::{
    Choice, Outcome, Score, Setting, Span, Stimulus, Summary, Symbol, TrialRecord,
};
use rand::RngCore;
use tracing::debug;

pub const SPEED_MIN_MS: u64 = 100;
pub const SPEED_MAX_MS: u64 = 2000;
pub const SPEED_STEP_MS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanVariant {
    /// Coloured letters, recalled by clicking colour swatches.
    Early,
    /// Colour squares, recalled by clicking letters.
    Late,
    /// Coloured letters, recalled as letters in reverse order.
    Backward,
}

/// Adaptive sequence-recall games.
#[derive(Debug, Clone)]
pub struct SpanGame {
    variant: SpanVariant,
    span: Span,
}

impl SpanGame {
    pub fn new(variant: SpanVariant) -> Self {
        Self {
            variant,
            span: Span::default(),
        }
    }

    pub fn span(&self) -> usize {
        self.span.get()
    }

    fn item(&self, symbol: &Symbol) -> Stimulus {
        match self.variant {
            SpanVariant::Early => Stimulus::coloured_letter(symbol),
            SpanVariant::Late => Stimulus::swatch(symbol),
            SpanVariant::Backward => Stimulus::Glyph {
                letter: symbol.letter.to_ascii_uppercase(),
                ink: symbol.rgb,
            },
        }
    }
}

impl Game for SpanGame {
    fn kind(&self) -> GameKind {
        match self.variant {
            SpanVariant::Early => GameKind::EarlySpan,
            SpanVariant::Late => GameKind::LateSpan,
            SpanVariant::Backward => GameKind::BackwardSpan,
        }
    }

    fn begin(&mut self, config: &GameConfig, _rng: &mut dyn RngCore) -> usize {
        self.span = Span::palette(config.initial_span);
        config.trial_count
    }

    fn build_trial(&mut self, index: usize, _config: &GameConfig, rng: &mut dyn RngCore) -> Trial {
        let span = self.span.get();
        let sequence = sample_distinct(rng, span);
        let items = sequence.iter().map(|s| self.item(s)).collect();

        let (options, expected, prompt, distinct) = match self.variant {
            SpanVariant::Early => (
                shuffled(rng).iter().map(Choice::swatch_of).collect(),
                sequence,
                "Respond",
                false,
            ),
            SpanVariant::Late => (
                alphabetical().iter().map(Choice::letter_of).collect(),
                sequence,
                "Select the letters",
                false,
            ),
            SpanVariant::Backward => {
                let mut reversed = sequence;
                reversed.reverse();
                (
                    alphabetical().iter().map(Choice::letter_of).collect(),
                    reversed,
                    "Click letters in REVERSE order",
                    true,
                )
            }
        };

        Trial {
            index,
            span,
            items,
            cue: None,
            prompt: Some(prompt.to_string()),
            options,
            mode: ResponseMode::Select {
                count: span,
                distinct,
            },
            expected,
            reveal: None,
        }
    }

    fn judge(&mut self, trial: &Trial, response: &Response) -> Outcome {
        let outcome = standard_outcome(trial, response);
        if outcome.is_scored() {
            let before = self.span.get();
            let after = self.span.adapt(outcome.is_correct());
            debug!(before, after, ?outcome, "span adapted");
        }
        outcome
    }

    fn summary(&self, _score: &Score, records: &[TrialRecord]) -> Summary {
        Summary::AverageSpan {
            average: floored_mean_span(records),
            trials: records.len(),
        }
    }

    fn adjust(&mut self, config: &mut GameConfig, step: Step) -> Option<Setting> {
        if self.variant != SpanVariant::Backward {
            return None;
        }
        config.display_ms = match step {
            Step::Up => config.display_ms.saturating_add(SPEED_STEP_MS),
            Step::Down => config.display_ms.saturating_sub(SPEED_STEP_MS),
        }
        .clamp(SPEED_MIN_MS, SPEED_MAX_MS);
        self.setting(config)
    }

    fn setting(&self, config: &GameConfig) -> Option<Setting> {
        (self.variant == SpanVariant::Backward).then_some(Setting {
            label: "Speed (ms)",
            value: config.display_ms,
        })
    }
}
