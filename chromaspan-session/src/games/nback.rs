use super::{Game, GameKind};
use crate::config::GameConfig;
use crate::state::Step;
use crate::trial::{Response, ResponseMode, Trial};
use chromaspan_core::palette::pick;
use chromaspan_core::{Outcome, Rgb, Score, Setting, Stimulus, Summary, Symbol, TrialRecord};
use rand::{Rng, RngCore};

pub const MIN_LEVEL: usize = 1;
pub const MAX_LEVEL: usize = 10;

/// Cross-modal n-back: each step shows a letter or a colour, and Space means
/// "same symbol as N steps ago". Letters and colours are compared through
/// the palette, so `r` matches red.
#[derive(Debug, Clone)]
pub struct NBack {
    level: usize,
    history: Vec<Symbol>,
}

impl NBack {
    pub fn new() -> Self {
        Self {
            level: MIN_LEVEL,
            history: Vec::new(),
        }
    }

    pub fn level(&self) -> usize {
        self.level
    }

    /// The symbol `level` steps before `index`, once that far in.
    fn target(&self, index: usize) -> Option<&Symbol> {
        index
            .checked_sub(self.level)
            .and_then(|i| self.history.get(i))
    }
}

impl Default for NBack {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for NBack {
    fn kind(&self) -> GameKind {
        GameKind::NBack
    }

    fn begin(&mut self, config: &GameConfig, _rng: &mut dyn RngCore) -> usize {
        self.history.clear();
        config.trial_count
    }

    fn build_trial(&mut self, index: usize, _config: &GameConfig, rng: &mut dyn RngCore) -> Trial {
        let symbol = pick(rng);
        let cue = if rng.random_bool(0.5) {
            Stimulus::black_letter(symbol.letter.to_ascii_uppercase())
        } else {
            Stimulus::swatch(&symbol)
        };
        self.history.truncate(index);
        self.history.push(symbol);
        Trial {
            index,
            span: self.level,
            items: Vec::new(),
            cue: Some(cue),
            prompt: Some(format!(
                "Press SPACE if this matches the {}-back stimulus",
                self.level
            )),
            options: Vec::new(),
            mode: ResponseMode::MatchKey,
            expected: vec![symbol],
            reveal: None,
        }
    }

    /// Presses are scored once there is something N back to compare with.
    /// Silence is never scored.
    fn judge(&mut self, trial: &Trial, response: &Response) -> Outcome {
        let Some(target) = self.target(trial.index) else {
            return Outcome::Unscored;
        };
        match response {
            Response::Match => {
                Outcome::from_correct(trial.expected.first().is_some_and(|s| s == target))
            }
            _ => Outcome::Unscored,
        }
    }

    fn summary(&self, score: &Score, _records: &[TrialRecord]) -> Summary {
        Summary::Accuracy { score: *score }
    }

    fn adjust(&mut self, config: &mut GameConfig, step: Step) -> Option<Setting> {
        self.level = match step {
            Step::Up => self.level + 1,
            Step::Down => self.level.saturating_sub(1),
        }
        .clamp(MIN_LEVEL, MAX_LEVEL);
        self.setting(config)
    }

    fn setting(&self, _config: &GameConfig) -> Option<Setting> {
        Some(Setting {
            label: "N-back level",
            value: self.level as u64,
        })
    }

    fn background(&self) -> Rgb {
        Rgb::PAPER
    }
}
