//! Step timing
//!
//! The speed controller turns a 0-100 user speed into a per-step delay and
//! a chip-wide carrier rate. [`StepTiming`] waits that delay between ticks.

pub mod speed;
pub mod step;

pub use speed::{ChipState, SpeedSetting, StepDelay, DEFAULT_STEP_DELAY, MAX_SPEED};
pub use step::StepTiming;
