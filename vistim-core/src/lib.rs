pub mod config;
pub mod error;
pub mod phase;
pub mod tick;

pub use config::{PatternSpec, StimulusConfig, SurfaceHints};
pub use error::StimulusError;
pub use phase::{BarSweep, FlashPhase, ScrollPhase};
pub use tick::{ProbeState, Tick};
