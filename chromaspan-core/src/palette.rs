//! The shared letter/colour table every game trains on.

use crate::colour::Rgb;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// A trainable letter and the colour it is associated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    pub letter: char,
    pub rgb: Rgb,
}

impl Symbol {
    pub const fn new(letter: char, rgb: Rgb) -> Self {
        Self { letter, rgb }
    }

    /// Position of this symbol in [`PALETTE`].
    pub fn index(&self) -> Option<usize> {
        index_of(self.letter)
    }
}

pub const PALETTE: [Symbol; 13] = [
    Symbol::new('b', Rgb::new(0, 0, 153)),
    Symbol::new('d', Rgb::new(153, 51, 0)),
    Symbol::new('e', Rgb::new(102, 255, 102)),
    Symbol::new('g', Rgb::new(0, 128, 0)),
    Symbol::new('i', Rgb::new(0, 204, 255)),
    Symbol::new('o', Rgb::new(255, 161, 23)),
    Symbol::new('p', Rgb::new(255, 0, 255)),
    Symbol::new('q', Rgb::new(128, 0, 128)),
    Symbol::new('r', Rgb::new(255, 0, 0)),
    Symbol::new('u', Rgb::new(128, 128, 128)),
    Symbol::new('w', Rgb::new(255, 255, 255)),
    Symbol::new('x', Rgb::new(85, 85, 85)),
    Symbol::new('y', Rgb::new(255, 255, 0)),
];

pub const PALETTE_SIZE: usize = PALETTE.len();

/// Case-insensitive lookup by letter.
pub fn lookup(letter: char) -> Option<&'static Symbol> {
    index_of(letter).map(|i| &PALETTE[i])
}

pub fn index_of(letter: char) -> Option<usize> {
    let lower = letter.to_ascii_lowercase();
    PALETTE.iter().position(|s| s.letter == lower)
}

/// The palette sorted by letter, as shown on letter keyboards.
pub fn alphabetical() -> Vec<Symbol> {
    let mut out = PALETTE.to_vec();
    out.sort_by_key(|s| s.letter);
    out
}

/// The whole palette in uniformly random order.
pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Vec<Symbol> {
    let mut out = PALETTE.to_vec();
    out.shuffle(rng);
    out
}

/// `count` distinct symbols in random order; `count` is capped at the
/// palette size.
pub fn sample_distinct<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<Symbol> {
    let mut out = shuffled(rng);
    out.truncate(count.min(PALETTE_SIZE));
    out
}

/// One symbol drawn uniformly.
pub fn pick<R: Rng + ?Sized>(rng: &mut R) -> Symbol {
    PALETTE[rng.random_range(0..PALETTE_SIZE)]
}
