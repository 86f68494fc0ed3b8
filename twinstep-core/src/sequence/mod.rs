//! Full-step phase sequencing
//!
//! A bipolar stepper turns when its two coils are energized in a rotating
//! order. This module holds the 4-stage cycle and the table mapping each
//! stage to the coil and polarity to drive.

pub mod phase;
pub mod table;

pub use phase::{PhaseStage, RotationDirection};
pub use table::{AxisCoils, Coil, CoilDrive, Commutation, PhaseSequencer};
