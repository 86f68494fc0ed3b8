//! Blocking wait between ticks

use embedded_hal::delay::DelayNs;

use super::speed::StepDelay;

/// Inserts the per-step delay using a blocking delay provider
///
/// Any [`DelayNs`] implementation works: a hardware timer on the target, or
/// a sleeping delay on the host. The delay is a floor, not a guarantee;
/// scheduling jitter can only make a tick longer.
pub struct StepTiming<D> {
    delay: D,
}

impl<D: DelayNs> StepTiming<D> {
    pub fn new(delay: D) -> Self {
        Self { delay }
    }

    /// Block for one step delay
    pub fn wait(&mut self, step_delay: StepDelay) {
        self.delay.delay_us(step_delay.as_micros());
    }

    /// Release the underlying delay provider
    pub fn into_inner(self) -> D {
        self.delay
    }
}
