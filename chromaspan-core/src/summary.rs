use crate::trial::{Score, TrialRecord};
use serde::{Deserialize, Serialize};

/// Aggregate statistics reported when a session is done.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Summary {
    AverageSpan { average: usize, trials: usize },
    Accuracy { score: Score },
    ReactionTime { average_ms: u64, score: Score },
    LetterDifficulty { score: Score, per_letter: Vec<(char, f64)> },
    Spelling { score: Score, level: u8 },
    Block { steps: usize, score: Option<Score> },
}

impl Summary {
    /// Human readable lines for the results screen.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Summary::AverageSpan { average, trials } => vec![
                format!("Average sequence length: {average}"),
                format!("Trials: {trials}"),
            ],
            Summary::Accuracy { score } => vec![score_line(score)],
            Summary::ReactionTime { average_ms, score } => vec![
                format!("Average correct response time: {average_ms} ms"),
                score_line(score),
            ],
            Summary::LetterDifficulty { score, per_letter } => {
                let mut lines = vec![
                    score_line(score),
                    "Difficulty index (0.05 - 0.95) per letter:".to_string(),
                ];
                lines.extend(per_letter.chunks(5).map(|row| {
                    row.iter()
                        .map(|(letter, d)| format!("{}: {d:.2}", letter.to_ascii_uppercase()))
                        .collect::<Vec<_>>()
                        .join("   ")
                }));
                lines
            }
            Summary::Spelling { score, level } => vec![
                score_line(score),
                format!("Current difficulty level: {level}"),
            ],
            Summary::Block { steps, score } => {
                let mut lines = vec![format!("Block complete: {steps} letters shown")];
                if let Some(score) = score {
                    lines.push(score_line(score));
                }
                lines
            }
        }
    }
}

fn score_line(score: &Score) -> String {
    if score.total == 0 {
        return "No answers scored".to_string();
    }
    format!(
        "You answered {} out of {} correctly ({:.1}%)",
        score.correct,
        score.total,
        score.accuracy_percent()
    )
}

/// Floor of the mean span over `records`; 1 when there are none.
pub fn floored_mean_span(records: &[TrialRecord]) -> usize {
    if records.is_empty() {
        return 1;
    }
    records.iter().map(|r| r.span).sum::<usize>() / records.len()
}

/// Mean rounded half up; 0 for an empty slice.
pub fn rounded_mean(values: &[u64]) -> u64 {
    if values.is_empty() {
        return 0;
    }
    let n = values.len() as u64;
    let sum: u64 = values.iter().sum();
    (2 * sum + n) / (2 * n)
}

/// Mean reaction time over correct answers, rounded.
pub fn mean_correct_reaction(records: &[TrialRecord]) -> u64 {
    let times: Vec<u64> = records
        .iter()
        .filter(|r| r.outcome.is_correct())
        .filter_map(|r| r.reaction_ms)
        .collect();
    rounded_mean(&times)
}
