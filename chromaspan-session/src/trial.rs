use chromaspan_core::{Choice, Stimulus, Symbol};

/// How the participant answers a trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// Nothing to answer; the trial ends after its presentation.
    Passive,
    /// Click `count` options. With `distinct`, an option can be chosen once.
    Select { count: usize, distinct: bool },
    /// A single key press, or silence.
    MatchKey,
}

/// What the participant did by the time the trial concluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Selections(Vec<usize>),
    Match,
    NoAnswer,
}

/// One fully generated trial.
#[derive(Debug, Clone, PartialEq)]
pub struct Trial {
    pub index: usize,
    /// Difficulty shown to the participant: number of items to hold.
    pub span: usize,
    /// Shown one after another while presenting.
    pub items: Vec<Stimulus>,
    /// Kept on screen while the response window is open.
    pub cue: Option<Stimulus>,
    pub prompt: Option<String>,
    pub options: Vec<Choice>,
    pub mode: ResponseMode,
    /// Answer key, in order.
    pub expected: Vec<Symbol>,
    /// Replaces the stimulus during feedback.
    pub reveal: Option<Stimulus>,
}

impl Trial {
    /// Whether `selected` names exactly the expected symbols in order.
    pub fn selections_match(&self, selected: &[usize]) -> bool {
        selected.len() == self.expected.len()
            && selected
                .iter()
                .zip(&self.expected)
                .all(|(&i, symbol)| self.options.get(i).is_some_and(|c| c.matches(symbol)))
    }

    pub fn required_selections(&self) -> usize {
        match self.mode {
            ResponseMode::Select { count, .. } => count,
            _ => 0,
        }
    }
}

/// Clock readings for the trial in progress, in sequencer milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrialTimestamps {
    pub response_opened_ms: Option<u64>,
    pub answered_ms: Option<u64>,
}

impl TrialTimestamps {
    pub fn reaction_ms(&self) -> Option<u64> {
        let opened = self.response_opened_ms?;
        self.answered_ms.map(|t| t.saturating_sub(opened))
    }
}
