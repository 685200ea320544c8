pub mod adaptive;
pub mod colour;
pub mod palette;
pub mod phase;
pub mod stimulus;
pub mod summary;
pub mod trial;
pub mod view;

pub use adaptive::{DifficultyIndex, Span};
pub use colour::Rgb;
pub use palette::{PALETTE, PALETTE_SIZE, Symbol};
pub use phase::SessionPhase;
pub use stimulus::{Choice, Stimulus};
pub use summary::Summary;
pub use trial::{Outcome, Score, TrialRecord};
pub use view::{MenuView, OptionView, ReadingView, SessionView, Setting, TextCell};
