//! Tick execution
//!
//! Applies a [`TickPlan`] to a backend: write the tick's coils (axis 1
//! first), wait one step delay, repeat. The call blocks for the whole run
//! and cannot be cancelled part-way. A backend error ends the run at the
//! failing write; nothing is retried and the coils keep whatever state the
//! chip last accepted.

use embedded_hal::delay::DelayNs;

use super::plan::TickPlan;
use crate::config::ConfigError;
use crate::sequence::PhaseStage;
use crate::timing::{StepDelay, StepTiming};
use crate::traits::MotorOutputBackend;

/// Duty applied to an energized coil
pub const STEP_DUTY_PERCENT: u8 = 100;

/// Errors that can occur with stepper operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepperError<E> {
    /// The backend rejected a write
    Backend(E),
    /// Invalid configuration
    InvalidConfig(ConfigError),
}

impl<E> From<ConfigError> for StepperError<E> {
    fn from(err: ConfigError) -> Self {
        StepperError::InvalidConfig(err)
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RunReport {
    /// Ticks issued (the larger of the requested step counts)
    pub ticks: u32,
    /// Shared stage after the last advance
    pub final_stage: PhaseStage,
}

/// Run a plan to completion against a backend
pub fn execute<B, D>(
    mut plan: TickPlan,
    backend: &mut B,
    timing: &mut StepTiming<D>,
    step_delay: StepDelay,
) -> Result<RunReport, B::Error>
where
    B: MotorOutputBackend,
    D: DelayNs,
{
    #[cfg(feature = "defmt")]
    defmt::debug!(
        "run: {} ticks, {} us per step",
        plan.total(),
        step_delay.as_micros()
    );

    for tick in plan.by_ref() {
        for write in tick.writes() {
            backend.drive_channel(write.channel, write.polarity, STEP_DUTY_PERCENT)?;
        }

        #[cfg(feature = "defmt")]
        defmt::trace!("tick {} stage {}", tick.index, tick.stage.number());

        timing.wait(step_delay);
    }

    Ok(RunReport {
        ticks: plan.completed(),
        final_stage: plan.stage(),
    })
}
