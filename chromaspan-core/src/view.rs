//! Render-ready snapshots. Nothing in here knows how to draw; the renderer
//! consumes these by value each frame.

use crate::colour::Rgb;
use crate::phase::SessionPhase;
use crate::stimulus::{Choice, Stimulus};
use crate::summary::Summary;
use crate::trial::Outcome;

/// An idle-time adjustable parameter, e.g. presentation speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Setting {
    pub label: &'static str,
    pub value: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionView {
    pub choice: Choice,
    pub chosen: bool,
    /// During feedback: `Some(true)` on a correct option, `Some(false)` on a
    /// wrongly chosen one.
    pub verdict: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub title: &'static str,
    pub phase: SessionPhase,
    pub background: Rgb,
    pub stimulus: Option<Stimulus>,
    pub prompt: Option<String>,
    pub options: Vec<OptionView>,
    /// Short line under the options: running answer or feedback text.
    pub status: Option<String>,
    pub feedback: Option<Outcome>,
    /// 1-based trial number and trial budget while running.
    pub progress: Option<(usize, usize)>,
    pub summary: Option<Summary>,
    pub setting: Option<Setting>,
}

impl SessionView {
    /// Background after any full-field stimulus is applied.
    pub fn effective_background(&self) -> Rgb {
        self.stimulus
            .as_ref()
            .and_then(Stimulus::flood)
            .unwrap_or(self.background)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuView {
    pub title: &'static str,
    pub entries: Vec<String>,
    pub selected: usize,
}

/// One character cell of a reading page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextCell {
    Char { ch: char, ink: Rgb },
    /// The letter is replaced by a block of its colour.
    Block { colour: Rgb },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingView {
    pub title: String,
    pub lines: Vec<Vec<TextCell>>,
    /// First line shown; the page scrolls by lines.
    pub scroll: usize,
}
