pub mod frame;
pub mod pattern;

pub use frame::{FrameBuffer, PatternRow};
pub use pattern::{build_pattern, Pattern};
