//! Process-wide interning of on-screen labels, so rasterised text can be
//! cached by a small integer id.

use lazy_static::lazy_static;
use std::sync::{PoisonError, RwLock};
pub use string_cache::DefaultAtom as Atom;

lazy_static! {
    static ref LABELS: RwLock<Vec<Atom>> = RwLock::new(Vec::new());
}

/// Interned label id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelId(usize);

impl LabelId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Intern a label and return its id. Equal strings always share an id.
pub fn intern_label(s: &str) -> LabelId {
    let atom = Atom::from(s);
    if let Some(idx) = LABELS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .position(|a| *a == atom)
    {
        return LabelId(idx);
    }
    let mut labels = LABELS.write().unwrap_or_else(PoisonError::into_inner);
    // Another thread may have interned it between the two locks.
    match labels.iter().position(|a| *a == atom) {
        Some(idx) => LabelId(idx),
        None => {
            labels.push(atom);
            LabelId(labels.len() - 1)
        }
    }
}

pub fn label(id: LabelId) -> Option<Atom> {
    LABELS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(id.0)
        .cloned()
}
