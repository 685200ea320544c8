use serde::{Deserialize, Serialize};

/// How a single trial ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Correct,
    Incorrect,
    /// No answer inside the response window. Scored as incorrect.
    TimedOut,
    /// Nothing to score (passive steps, silent n-back windows).
    Unscored,
}

impl Outcome {
    pub fn from_correct(correct: bool) -> Self {
        if correct {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        }
    }

    pub fn is_correct(self) -> bool {
        matches!(self, Outcome::Correct)
    }

    pub fn is_scored(self) -> bool {
        !matches!(self, Outcome::Unscored)
    }
}

/// Running tally for a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub correct: u32,
    pub total: u32,
}

impl Score {
    pub fn record(&mut self, outcome: Outcome) {
        if outcome.is_scored() {
            self.total += 1;
            if outcome.is_correct() {
                self.correct += 1;
            }
        }
    }

    /// Percentage correct, 0 when nothing was scored.
    pub fn accuracy_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 * 100.0 / self.total as f64
        }
    }
}

/// Recorded result per trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub index: usize,
    /// Number of stimuli the participant had to hold.
    pub span: usize,
    pub outcome: Outcome,
    /// Time from the response window opening to the answer.
    pub reaction_ms: Option<u64>,
}
