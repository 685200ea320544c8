use super::{Game, GameKind};
use crate::config::GameConfig;
use crate::trial::{ResponseMode, Trial};
use chromaspan_core::palette::{alphabetical, pick, shuffled};
use chromaspan_core::summary::mean_correct_reaction;
use chromaspan_core::{Choice, Score, Stimulus, Summary, TrialRecord};
use rand::RngCore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedDirection {
    /// Black letter cue, answer with a colour swatch.
    LettersToColours,
    /// Colour square cue, answer with a letter.
    ColoursToLetters,
}

/// Reaction-time test: the cue stays up until a single answer is given.
#[derive(Debug, Clone)]
pub struct SpeedTest {
    direction: SpeedDirection,
}

impl SpeedTest {
    pub fn new(direction: SpeedDirection) -> Self {
        Self { direction }
    }
}

impl Game for SpeedTest {
    fn kind(&self) -> GameKind {
        match self.direction {
            SpeedDirection::LettersToColours => GameKind::LettersToColours,
            SpeedDirection::ColoursToLetters => GameKind::ColoursToLetters,
        }
    }

    fn begin(&mut self, config: &GameConfig, _rng: &mut dyn RngCore) -> usize {
        config.trial_count
    }

    fn build_trial(&mut self, index: usize, _config: &GameConfig, rng: &mut dyn RngCore) -> Trial {
        let symbol = pick(rng);
        let (cue, options, prompt) = match self.direction {
            SpeedDirection::LettersToColours => (
                Stimulus::black_letter(symbol.letter.to_ascii_uppercase()),
                shuffled(rng).iter().map(Choice::swatch_of).collect(),
                "Click the colour of this letter",
            ),
            SpeedDirection::ColoursToLetters => (
                Stimulus::swatch(&symbol),
                alphabetical().iter().map(Choice::letter_of).collect(),
                "Click the letter of this colour",
            ),
        };
        Trial {
            index,
            span: 1,
            items: Vec::new(),
            cue: Some(cue),
            prompt: Some(prompt.to_string()),
            options,
            mode: ResponseMode::Select {
                count: 1,
                distinct: false,
            },
            expected: vec![symbol],
            reveal: None,
        }
    }

    fn summary(&self, score: &Score, records: &[TrialRecord]) -> Summary {
        Summary::ReactionTime {
            average_ms: mean_correct_reaction(records),
            score: *score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chromaspan_core::{Outcome, PALETTE_SIZE};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn cue_matches_direction() {
        let mut rng = StdRng::seed_from_u64(10);
        let config = GameKind::LettersToColours.default_config();

        let mut to_colours = SpeedTest::new(SpeedDirection::LettersToColours);
        let trial = to_colours.build_trial(0, &config, &mut rng);
        assert!(trial.items.is_empty());
        assert!(matches!(trial.cue, Some(Stimulus::Glyph { .. })));
        assert!(trial.options.iter().all(|c| matches!(c, Choice::Swatch(_))));
        assert_eq!(trial.options.len(), PALETTE_SIZE);

        let mut to_letters = SpeedTest::new(SpeedDirection::ColoursToLetters);
        let trial = to_letters.build_trial(0, &config, &mut rng);
        assert!(matches!(trial.cue, Some(Stimulus::Swatch { .. })));
        assert_eq!(trial.options.first(), Some(&Choice::Letter('b')));
    }

    #[test]
    fn summary_averages_correct_reactions() {
        let game = SpeedTest::new(SpeedDirection::ColoursToLetters);
        let records = [
            TrialRecord {
                index: 0,
                span: 1,
                outcome: Outcome::Correct,
                reaction_ms: Some(400),
            },
            TrialRecord {
                index: 1,
                span: 1,
                outcome: Outcome::Incorrect,
                reaction_ms: Some(90),
            },
            TrialRecord {
                index: 2,
                span: 1,
                outcome: Outcome::Correct,
                reaction_ms: Some(601),
            },
        ];
        let score = Score {
            correct: 2,
            total: 3,
        };
        assert_eq!(
            game.summary(&score, &records),
            Summary::ReactionTime {
                average_ms: 501,
                score
            }
        );
    }
}
