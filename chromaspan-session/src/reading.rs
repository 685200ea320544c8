//! Text colouring for the reading exercises.

use chromaspan_core::palette::{PALETTE, lookup};
use chromaspan_core::{PALETTE_SIZE, ReadingView, Rgb, TextCell};

pub const EASY_SESSIONS: std::ops::RangeInclusive<u32> = 1..=13;
pub const ADVANCED_SESSIONS: std::ops::RangeInclusive<u32> = 14..=26;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingMode {
    /// The first `session` palette letters are drawn in colour.
    Easy { session: u32 },
    /// The first `session - 13` palette letters become colour blocks.
    Advanced { session: u32 },
    /// Every palette letter in colour.
    Homework,
}

impl ReadingMode {
    /// Easy mode with the session number clamped into range.
    pub fn easy(session: i64) -> Self {
        ReadingMode::Easy {
            session: clamp_session(session, EASY_SESSIONS),
        }
    }

    pub fn advanced(session: i64) -> Self {
        ReadingMode::Advanced {
            session: clamp_session(session, ADVANCED_SESSIONS),
        }
    }

    pub fn title(&self) -> String {
        match self {
            ReadingMode::Easy { session } => format!("Reading (session {session})"),
            ReadingMode::Advanced { session } => format!("Advanced reading (session {session})"),
            ReadingMode::Homework => "Book homework".to_string(),
        }
    }

    /// How many palette letters, in palette order, this mode transforms.
    pub fn active_letters(&self) -> usize {
        let count = match *self {
            ReadingMode::Easy { session } => session as usize,
            ReadingMode::Advanced { session } => session.saturating_sub(13) as usize,
            ReadingMode::Homework => PALETTE_SIZE,
        };
        count.min(PALETTE_SIZE)
    }

    pub fn cell(&self, ch: char) -> TextCell {
        let active = &PALETTE[..self.active_letters()];
        let colour = lookup(ch)
            .filter(|s| active.iter().any(|a| a.letter == s.letter))
            .map(|s| s.rgb);
        match (self, colour) {
            (ReadingMode::Advanced { .. }, Some(colour)) => TextCell::Block { colour },
            (_, Some(ink)) => TextCell::Char { ch, ink },
            (_, None) => TextCell::Char {
                ch,
                ink: Rgb::BLACK,
            },
        }
    }

    /// Colours `text` line by line, wrapping lines longer than `columns` at
    /// the last space that fits.
    pub fn transform(&self, text: &str, columns: usize) -> ReadingView {
        let lines = text
            .lines()
            .flat_map(|line| wrap(line, columns))
            .map(|line| line.chars().map(|ch| self.cell(ch)).collect())
            .collect();
        ReadingView {
            title: self.title(),
            lines,
            scroll: 0,
        }
    }
}

fn clamp_session(session: i64, range: std::ops::RangeInclusive<u32>) -> u32 {
    session.clamp(*range.start() as i64, *range.end() as i64) as u32
}

fn wrap(line: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut out = Vec::new();
    let mut rest: Vec<char> = line.trim_end().chars().collect();
    while rest.len() > columns {
        let cut = rest[..=columns]
            .iter()
            .rposition(|c| c.is_whitespace())
            .filter(|&i| i > 0)
            .unwrap_or(columns);
        out.push(rest[..cut].iter().collect());
        let skip = rest[cut..].iter().take_while(|c| c.is_whitespace()).count();
        rest.drain(..cut + skip);
    }
    out.push(rest.into_iter().collect());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ink(cell: &TextCell) -> Rgb {
        match cell {
            TextCell::Char { ink, .. } => *ink,
            TextCell::Block { colour } => *colour,
        }
    }

    #[test]
    fn sessions_are_clamped() {
        assert_eq!(ReadingMode::easy(0), ReadingMode::Easy { session: 1 });
        assert_eq!(ReadingMode::easy(40), ReadingMode::Easy { session: 13 });
        assert_eq!(ReadingMode::advanced(3), ReadingMode::Advanced { session: 14 });
        assert_eq!(ReadingMode::advanced(99).active_letters(), 13);
    }

    #[test]
    fn easy_colours_only_the_first_letters() {
        let mode = ReadingMode::easy(2);
        // b and d are the first two palette letters; e is third.
        assert_eq!(ink(&mode.cell('B')), PALETTE[0].rgb);
        assert_eq!(ink(&mode.cell('d')), PALETTE[1].rgb);
        assert_eq!(ink(&mode.cell('e')), Rgb::BLACK);
        assert_eq!(ink(&mode.cell('a')), Rgb::BLACK);
    }

    #[test]
    fn advanced_replaces_letters_with_blocks() {
        let mode = ReadingMode::advanced(15);
        assert_eq!(
            mode.cell('d'),
            TextCell::Block {
                colour: PALETTE[1].rgb
            }
        );
        assert_eq!(
            mode.cell('e'),
            TextCell::Char {
                ch: 'e',
                ink: Rgb::BLACK
            }
        );
    }

    #[test]
    fn homework_keeps_lines() {
        let view = ReadingMode::Homework.transform("bad\n\nyes", 80);
        assert_eq!(view.lines.len(), 3);
        assert!(view.lines[1].is_empty());
        assert_eq!(ink(&view.lines[2][0]), PALETTE[12].rgb);
        assert_eq!(ink(&view.lines[0][1]), Rgb::BLACK);
    }

    #[test]
    fn long_lines_wrap_at_spaces() {
        assert_eq!(wrap("the quick brown fox", 10), vec!["the quick", "brown fox"]);
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap("", 4), vec![""]);
    }
}
