//! Hardware abstraction traits
//!
//! These traits define the interface between the stepping logic and the
//! motor-driver chip that actually energizes the coils.

pub mod output;

pub use output::{CarrierRate, Channel, MotorOutputBackend, Polarity};
