pub mod clock;
pub mod frames;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use frames::{FrameTimeStats, FrameTimes};
pub use timer::TimerSlot;
