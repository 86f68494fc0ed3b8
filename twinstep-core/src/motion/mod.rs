//! Run planning and execution
//!
//! A [`RunRequest`] names one or two axes with a direction and step count.
//! [`TickPlan`] turns it into the sequence of per-tick coil writes, and
//! [`execute`] applies those writes to a backend with the step delay in
//! between.

pub mod executor;
pub mod plan;

pub use executor::{execute, RunReport, StepperError, STEP_DUTY_PERCENT};
pub use plan::{AxisMove, RunRequest, Tick, TickPlan};
