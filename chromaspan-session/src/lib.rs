pub mod config;
pub mod error;
pub mod games;
pub mod reading;
pub mod state;
pub mod trial;

pub use config::{ConfigFile, GameConfig, GameOverrides};
pub use error::{ConfigError, UnknownGame};
pub use games::{Game, GameKind, make_game};
pub use reading::ReadingMode;
pub use state::{Sequencer, SessionEvent, Step};
pub use trial::{Response, ResponseMode, Trial, TrialTimestamps};
