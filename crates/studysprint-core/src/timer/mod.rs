pub mod checkpoint;
mod engine;
mod mode;

pub use checkpoint::RestoredTimer;
pub use engine::{TimerEngine, MODE_SWITCH_DELAY_MS};
pub use mode::{ModeDurations, TimerMode, TimerPhase};
