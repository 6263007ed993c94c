pub mod stats;
pub mod timer;

pub use stats::{IntervalReport, IntervalStats};
pub use timer::{precise_sleep, RedrawGate, RefreshDriver};
