pub mod layout;
pub mod render;

pub use layout::Bounds;
pub use render::{FrameStats, Renderer, SkiaRenderer};
