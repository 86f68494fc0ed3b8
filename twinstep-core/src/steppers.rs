//! Stepper board facade
//!
//! [`Steppers`] owns the backend, the delay provider, the chip-wide speed
//! state and the per-axis configuration, and exposes the blocking run
//! surface:
//!
//! ```ignore
//! let mut steppers = Steppers::new(board, delay);
//! steppers.set_steps_per_revolution(AxisId::Axis2, 48)?;
//! steppers.set_speed(60)?;
//! steppers.turn_angle(AxisId::Axis1, RotationDirection::Forward, 90)?;
//! steppers.turn_both_steps(AxisMove::forward(200), AxisMove::reverse(50))?;
//! ```
//!
//! # Shared chip state
//!
//! Speed is chip-wide. [`Steppers::set_speed`] rewrites the PWM carrier for
//! every output on the board, so a DC motor started with
//! [`Steppers::motor_on`] changes timing too.
//!
//! # Concurrency
//!
//! Every operation takes `&mut self` and blocks until done. Sharing one
//! board between threads or interrupt handlers needs an outer lock chosen
//! by the caller; nothing here synchronizes internally.

use embedded_hal::delay::DelayNs;

use crate::config::{AxisConfig, AxisId, ConfigError, StepperConfig};
use crate::motion::{execute, AxisMove, RunReport, RunRequest, StepperError};
use crate::sequence::RotationDirection;
use crate::timing::{ChipState, SpeedSetting, StepTiming};
use crate::traits::{Channel, MotorOutputBackend, Polarity};

/// Two steppers on one 4-channel motor-driver board
pub struct Steppers<B, D> {
    backend: B,
    timing: StepTiming<D>,
    chip: ChipState,
    axes: [AxisConfig; 2],
}

impl<B, D> Steppers<B, D>
where
    B: MotorOutputBackend,
    D: DelayNs,
{
    /// Create a facade with default axis configuration
    ///
    /// The backend is not touched until the first operation that needs it.
    pub fn new(backend: B, delay: D) -> Self {
        Self {
            backend,
            timing: StepTiming::new(delay),
            chip: ChipState::new(),
            axes: [AxisConfig::default(); 2],
        }
    }

    /// Create a facade and apply a stored configuration
    pub fn with_config(
        backend: B,
        delay: D,
        config: &StepperConfig,
    ) -> Result<Self, StepperError<B::Error>> {
        let mut steppers = Self::new(backend, delay);
        steppers.apply_config(config)?;
        Ok(steppers)
    }

    /// Apply a configuration record
    ///
    /// The axes are validated before anything is written, so an invalid
    /// record leaves both the configuration and the chip untouched.
    pub fn apply_config(&mut self, config: &StepperConfig) -> Result<(), StepperError<B::Error>> {
        let axes = config.axes()?;
        self.set_speed(config.speed())?;
        self.axes = axes;
        Ok(())
    }

    /// Initialize the backend if it has not been initialized yet
    pub fn ensure_initialized(&mut self) -> Result<(), StepperError<B::Error>> {
        if !self.chip.is_initialized() {
            self.backend.initialize().map_err(StepperError::Backend)?;
            self.chip.mark_initialized();

            #[cfg(feature = "defmt")]
            defmt::debug!("motor driver initialized");
        }
        Ok(())
    }

    /// Make the next operation initialize the backend again
    ///
    /// Re-initialization restores the default carrier and step delay.
    pub fn rearm(&mut self) {
        self.chip.rearm();
    }

    /// Set the speed of all steppers (0 = slowest, 100 = fastest)
    ///
    /// Writes the carrier rate to the chip once and changes the delay used
    /// between every subsequent tick. The carrier is chip-wide and also
    /// affects any DC motor output on the board.
    pub fn set_speed(&mut self, speed: u8) -> Result<SpeedSetting, StepperError<B::Error>> {
        self.ensure_initialized()?;

        let setting = SpeedSetting::for_speed(speed);
        self.backend
            .set_carrier_rate(setting.carrier)
            .map_err(StepperError::Backend)?;
        self.chip.apply(setting);

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "speed {}: step delay {} us, prescale {}",
            setting.speed,
            setting.step_delay.as_micros(),
            setting.carrier.prescale()
        );

        Ok(setting)
    }

    /// Chip-wide state currently in force
    pub fn chip(&self) -> &ChipState {
        &self.chip
    }

    /// Set the number of full steps in one revolution of an axis
    pub fn set_steps_per_revolution(&mut self, axis: AxisId, steps: u32) -> Result<(), ConfigError> {
        self.axes[axis.index()] = AxisConfig::new(steps)?;
        Ok(())
    }

    /// Full steps in one revolution of an axis
    pub fn steps_per_revolution(&self, axis: AxisId) -> u32 {
        self.axes[axis.index()].steps_per_revolution()
    }

    /// Convert an angle to steps using an axis's steps per revolution
    pub fn angle_to_steps(&self, axis: AxisId, angle_deg: i32) -> u32 {
        self.axes[axis.index()].angle_to_steps(angle_deg)
    }

    /// Turn one stepper a number of steps
    pub fn turn_steps(
        &mut self,
        axis: AxisId,
        direction: RotationDirection,
        steps: u32,
    ) -> Result<RunReport, StepperError<B::Error>> {
        self.run(RunRequest::single(axis, AxisMove::new(direction, steps)))
    }

    /// Turn one stepper by an angle in degrees
    ///
    /// The angle is expected in 1-360 but is not clamped; values outside
    /// extrapolate linearly.
    pub fn turn_angle(
        &mut self,
        axis: AxisId,
        direction: RotationDirection,
        angle_deg: i32,
    ) -> Result<RunReport, StepperError<B::Error>> {
        let steps = self.angle_to_steps(axis, angle_deg);
        self.turn_steps(axis, direction, steps)
    }

    /// Turn both steppers together
    ///
    /// Both axes step on the same ticks until the shorter move is done, then
    /// the longer one continues alone. The axes do not arrive together when
    /// their step counts differ.
    pub fn turn_both_steps(
        &mut self,
        axis1: AxisMove,
        axis2: AxisMove,
    ) -> Result<RunReport, StepperError<B::Error>> {
        self.run(RunRequest::dual(axis1, axis2))
    }

    /// Turn both steppers together by angles in degrees
    pub fn turn_both_angle(
        &mut self,
        direction1: RotationDirection,
        angle1_deg: i32,
        direction2: RotationDirection,
        angle2_deg: i32,
    ) -> Result<RunReport, StepperError<B::Error>> {
        let steps1 = self.angle_to_steps(AxisId::Axis1, angle1_deg);
        let steps2 = self.angle_to_steps(AxisId::Axis2, angle2_deg);
        self.turn_both_steps(
            AxisMove::new(direction1, steps1),
            AxisMove::new(direction2, steps2),
        )
    }

    /// Execute a run request to completion
    pub fn run(&mut self, request: RunRequest) -> Result<RunReport, StepperError<B::Error>> {
        self.ensure_initialized()?;
        execute(
            request.plan(),
            &mut self.backend,
            &mut self.timing,
            self.chip.step_delay(),
        )
        .map_err(StepperError::Backend)
    }

    /// Drive a single output as a DC motor
    ///
    /// `duty_percent` above 100 is treated as 100.
    pub fn motor_on(
        &mut self,
        channel: Channel,
        polarity: Polarity,
        duty_percent: u8,
    ) -> Result<(), StepperError<B::Error>> {
        self.ensure_initialized()?;
        self.backend
            .drive_channel(channel, polarity, duty_percent.min(100))
            .map_err(StepperError::Backend)
    }

    /// Turn off a single output
    ///
    /// Stopping never wakes the chip: an untouched board is left
    /// uninitialized and only the channel's pins are zeroed.
    pub fn motor_off(&mut self, channel: Channel) -> Result<(), StepperError<B::Error>> {
        self.backend
            .stop_channel(channel)
            .map_err(StepperError::Backend)
    }

    /// Turn off every output, releasing both steppers
    ///
    /// Like [`Self::motor_off`], this does not initialize the chip.
    pub fn all_off(&mut self) -> Result<(), StepperError<B::Error>> {
        self.backend.stop_all().map_err(StepperError::Backend)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Release the backend and delay provider
    pub fn release(self) -> (B, D) {
        (self.backend, self.timing.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::PhaseStage;
    use crate::testing::{BackendCall, BusError, RecordingBackend, RecordingDelay};
    use crate::traits::CarrierRate;

    type TestSteppers = Steppers<RecordingBackend, RecordingDelay>;

    fn steppers() -> TestSteppers {
        Steppers::new(RecordingBackend::default(), RecordingDelay::default())
    }

    #[test]
    fn test_backend_untouched_until_first_use() {
        let steppers = steppers();
        assert!(steppers.backend().calls.is_empty());
        assert!(!steppers.chip().is_initialized());
    }

    #[test]
    fn test_lazy_initialization_runs_once() {
        let mut steppers = steppers();

        steppers
            .turn_steps(AxisId::Axis1, RotationDirection::Forward, 2)
            .unwrap();
        steppers
            .turn_steps(AxisId::Axis2, RotationDirection::Reverse, 2)
            .unwrap();

        let backend = steppers.backend();
        assert_eq!(backend.calls[0], BackendCall::Initialize);
        assert_eq!(backend.count(BackendCall::Initialize), 1);
        assert_eq!(backend.calls.len(), 5);
    }

    #[test]
    fn test_default_delay_before_speed_set() {
        let mut steppers = steppers();
        steppers
            .turn_steps(AxisId::Axis1, RotationDirection::Forward, 3)
            .unwrap();

        let (_, delay) = steppers.release();
        assert_eq!(delay.waits_us, [20_000; 3]);
    }

    #[test]
    fn test_set_speed_writes_carrier_once() {
        let mut steppers = steppers();

        let setting = steppers.set_speed(100).unwrap();
        assert_eq!(setting.step_delay.as_micros(), 600);

        steppers
            .turn_both_steps(AxisMove::forward(4), AxisMove::forward(4))
            .unwrap();

        let (backend, delay) = steppers.release();
        assert_eq!(
            backend.calls[..2],
            [
                BackendCall::Initialize,
                BackendCall::Carrier(CarrierRate::from_prescale(0x03))
            ]
        );
        assert_eq!(backend.calls.iter().filter(|c| matches!(c, BackendCall::Carrier(_))).count(), 1);
        assert_eq!(delay.waits_us, [600; 4]);
    }

    #[test]
    fn test_zero_steps_per_revolution_rejected() {
        let mut steppers = steppers();

        assert_eq!(
            steppers.set_steps_per_revolution(AxisId::Axis1, 0),
            Err(ConfigError::ZeroStepsPerRevolution)
        );
        assert_eq!(steppers.steps_per_revolution(AxisId::Axis1), 200);
    }

    #[test]
    fn test_angle_run_uses_axis_steps() {
        let mut steppers = steppers();
        steppers.set_steps_per_revolution(AxisId::Axis2, 48).unwrap();

        let report = steppers
            .turn_angle(AxisId::Axis2, RotationDirection::Forward, 360)
            .unwrap();
        assert_eq!(report.ticks, 48);
        assert_eq!(report.final_stage, PhaseStage::One);

        let report = steppers
            .turn_angle(AxisId::Axis1, RotationDirection::Reverse, 1)
            .unwrap();
        assert_eq!(report.ticks, 1);
        assert_eq!(report.final_stage, PhaseStage::Four);
    }

    #[test]
    fn test_dual_angle_run() {
        let mut steppers = steppers();
        steppers.set_steps_per_revolution(AxisId::Axis2, 100).unwrap();

        // 200 steps on axis 1, 100 on axis 2
        let report = steppers
            .turn_both_angle(RotationDirection::Forward, 360, RotationDirection::Forward, 360)
            .unwrap();

        assert_eq!(report.ticks, 200);
        let drives = steppers.backend().drives();
        let axis2 = drives
            .iter()
            .filter(|(c, _)| matches!(c, Channel::Motor3 | Channel::Motor4))
            .count();
        assert_eq!(axis2, 101);
    }

    #[test]
    fn test_opposite_directions_scenario() {
        let mut steppers = steppers();
        steppers
            .turn_both_steps(AxisMove::forward(4), AxisMove::reverse(4))
            .unwrap();

        let (backend, delay) = steppers.release();
        assert_eq!(
            backend.drives(),
            [
                (Channel::Motor1, Polarity::Forward),
                (Channel::Motor4, Polarity::Reverse),
                (Channel::Motor2, Polarity::Reverse),
                (Channel::Motor3, Polarity::Forward),
                (Channel::Motor1, Polarity::Reverse),
                (Channel::Motor4, Polarity::Forward),
                (Channel::Motor2, Polarity::Forward),
                (Channel::Motor3, Polarity::Reverse),
            ]
        );
        assert_eq!(delay.waits_us.len(), 4);
    }

    #[test]
    fn test_motor_surface() {
        let mut steppers = steppers();

        steppers.motor_on(Channel::Motor2, Polarity::Reverse, 150).unwrap();
        steppers.motor_off(Channel::Motor2).unwrap();
        steppers.motor_off(Channel::Motor2).unwrap();
        steppers.all_off().unwrap();

        assert_eq!(
            steppers.backend().calls,
            [
                BackendCall::Initialize,
                BackendCall::Drive(Channel::Motor2, Polarity::Reverse, 100),
                BackendCall::Stop(Channel::Motor2),
                BackendCall::Stop(Channel::Motor2),
                BackendCall::Stop(Channel::Motor1),
                BackendCall::Stop(Channel::Motor2),
                BackendCall::Stop(Channel::Motor3),
                BackendCall::Stop(Channel::Motor4),
            ]
        );
    }

    #[test]
    fn test_stopping_does_not_initialize() {
        let mut steppers = steppers();

        steppers.motor_off(Channel::Motor3).unwrap();
        steppers.all_off().unwrap();

        assert!(!steppers.chip().is_initialized());
        assert_eq!(
            steppers.backend().calls,
            [
                BackendCall::Stop(Channel::Motor3),
                BackendCall::Stop(Channel::Motor1),
                BackendCall::Stop(Channel::Motor2),
                BackendCall::Stop(Channel::Motor3),
                BackendCall::Stop(Channel::Motor4),
            ]
        );

        // The first drive still wakes the chip
        steppers
            .turn_steps(AxisId::Axis1, RotationDirection::Forward, 1)
            .unwrap();
        assert_eq!(steppers.backend().calls[5], BackendCall::Initialize);
    }

    #[test]
    fn test_rearm_restores_defaults() {
        let mut steppers = steppers();
        steppers.set_speed(100).unwrap();

        steppers.rearm();
        steppers
            .turn_steps(AxisId::Axis1, RotationDirection::Forward, 1)
            .unwrap();

        assert_eq!(steppers.backend().count(BackendCall::Initialize), 2);
        assert_eq!(steppers.chip().step_delay().as_micros(), 20_000);
    }

    #[test]
    fn test_invalid_config_leaves_chip_untouched() {
        let mut steppers = steppers();
        let config = StepperConfig {
            steps_per_revolution: [0, 200],
            speed: 50,
        };

        assert_eq!(
            steppers.apply_config(&config),
            Err(StepperError::InvalidConfig(ConfigError::ZeroStepsPerRevolution))
        );
        assert!(steppers.backend().calls.is_empty());
    }

    #[test]
    fn test_with_config() {
        let config = StepperConfig {
            steps_per_revolution: [400, 64],
            speed: 50,
        };
        let steppers = Steppers::with_config(
            RecordingBackend::default(),
            RecordingDelay::default(),
            &config,
        )
        .unwrap();

        assert_eq!(steppers.steps_per_revolution(AxisId::Axis1), 400);
        assert_eq!(steppers.steps_per_revolution(AxisId::Axis2), 64);
        assert_eq!(steppers.chip().step_delay().as_micros(), 10_300);
    }

    #[test]
    fn test_failed_initialization_retried_next_call() {
        let mut steppers = Steppers::new(RecordingBackend::failing_after(0), RecordingDelay::default());

        assert_eq!(
            steppers.turn_steps(AxisId::Axis1, RotationDirection::Forward, 5),
            Err(StepperError::Backend(BusError))
        );
        assert!(!steppers.chip().is_initialized());

        steppers.backend_mut().fail_after = None;
        steppers
            .turn_steps(AxisId::Axis1, RotationDirection::Forward, 5)
            .unwrap();
        assert!(steppers.chip().is_initialized());
    }
}
