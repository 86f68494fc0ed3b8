//! Board-agnostic stepper sequencing
//!
//! This crate contains all stepping logic that does not depend on a specific
//! motor-driver chip:
//!
//! - Motor output backend trait (the chip is an external collaborator)
//! - Full-step phase sequencer (A+, B-, A-, B+)
//! - Dual-axis tick planning on a shared stage counter
//! - Speed controller and blocking step timing
//! - Axis configuration and angle-to-steps conversion
//!
//! The system is open-loop and full-step only. Missed steps are not
//! detected or corrected, and axis position is not tracked between runs.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod motion;
pub mod sequence;
pub mod steppers;
pub mod timing;
pub mod traits;

#[cfg(test)]
mod testing;

pub use config::{AxisConfig, AxisId, ConfigError, StepperConfig};
pub use motion::{AxisMove, RunReport, RunRequest, StepperError};
pub use sequence::{PhaseStage, RotationDirection};
pub use steppers::Steppers;
pub use traits::{CarrierRate, Channel, MotorOutputBackend, Polarity};
