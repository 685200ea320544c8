use crate::colour::Rgb;
use crate::palette::Symbol;
use serde::{Deserialize, Serialize};

/// Something drawn while a trial is presenting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stimulus {
    /// A single large letter in the given ink.
    Glyph { letter: char, ink: Rgb },
    /// A bordered colour square.
    Swatch { colour: Rgb },
    /// Several squares shown side by side at once.
    SwatchRow { colours: Vec<Rgb> },
    /// The whole background turns this colour.
    Flood { colour: Rgb },
}

impl Stimulus {
    /// A letter drawn in its own palette colour.
    pub fn coloured_letter(symbol: &Symbol) -> Self {
        Stimulus::Glyph {
            letter: symbol.letter,
            ink: symbol.rgb,
        }
    }

    pub fn black_letter(letter: char) -> Self {
        Stimulus::Glyph {
            letter,
            ink: Rgb::BLACK,
        }
    }

    pub fn swatch(symbol: &Symbol) -> Self {
        Stimulus::Swatch { colour: symbol.rgb }
    }

    /// Background colour this stimulus imposes, if any.
    pub fn flood(&self) -> Option<Rgb> {
        match self {
            Stimulus::Flood { colour } => Some(*colour),
            _ => None,
        }
    }
}

/// A response affordance the participant can click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Choice {
    Swatch(Rgb),
    Letter(char),
}

impl Choice {
    pub fn swatch_of(symbol: &Symbol) -> Self {
        Choice::Swatch(symbol.rgb)
    }

    pub fn letter_of(symbol: &Symbol) -> Self {
        Choice::Letter(symbol.letter)
    }

    /// Whether picking this choice names `symbol`.
    pub fn matches(&self, symbol: &Symbol) -> bool {
        match self {
            Choice::Swatch(rgb) => *rgb == symbol.rgb,
            Choice::Letter(letter) => letter.eq_ignore_ascii_case(&symbol.letter),
        }
    }

    /// Uppercase key label for letter choices.
    pub fn label(&self) -> Option<char> {
        match self {
            Choice::Letter(letter) => Some(letter.to_ascii_uppercase()),
            Choice::Swatch(_) => None,
        }
    }
}
