//! Axis identity and per-axis configuration
//!
//! Stepper 1 is wired to Motor 1 and Motor 2, stepper 2 to Motor 3 and
//! Motor 4.

use core::num::NonZeroU32;

use crate::sequence::AxisCoils;
use crate::traits::Channel;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default full steps per revolution (1.8° per step)
pub const DEFAULT_STEPS_PER_REVOLUTION: u32 = 200;

/// Upper end of the angle range that maps onto one revolution
pub const DEGREES_PER_REVOLUTION: i32 = 360;

/// Errors that can occur when configuring the steppers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Steps per revolution must be at least 1
    ZeroStepsPerRevolution,
    /// Stored configuration could not be encoded or decoded
    InvalidBlob,
}

/// Stepper axis identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AxisId {
    /// Stepper 1 (Motor 1 + Motor 2)
    Axis1,
    /// Stepper 2 (Motor 3 + Motor 4)
    Axis2,
}

impl AxisId {
    pub const ALL: [AxisId; 2] = [AxisId::Axis1, AxisId::Axis2];

    /// Zero-based axis index
    pub const fn index(self) -> usize {
        match self {
            AxisId::Axis1 => 0,
            AxisId::Axis2 => 1,
        }
    }

    /// Channels the axis's two coils are wired to
    pub const fn coils(self) -> AxisCoils {
        match self {
            AxisId::Axis1 => AxisCoils::new(Channel::Motor1, Channel::Motor2),
            AxisId::Axis2 => AxisCoils::new(Channel::Motor3, Channel::Motor4),
        }
    }
}

/// Per-axis configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisConfig {
    steps_per_revolution: NonZeroU32,
}

const DEFAULT_STEPS: NonZeroU32 = match NonZeroU32::new(DEFAULT_STEPS_PER_REVOLUTION) {
    Some(steps) => steps,
    None => panic!("default steps per revolution must be non-zero"),
};

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            steps_per_revolution: DEFAULT_STEPS,
        }
    }
}

impl AxisConfig {
    /// Create an axis configuration, rejecting zero steps per revolution
    pub fn new(steps_per_revolution: u32) -> Result<Self, ConfigError> {
        NonZeroU32::new(steps_per_revolution)
            .map(|steps_per_revolution| Self {
                steps_per_revolution,
            })
            .ok_or(ConfigError::ZeroStepsPerRevolution)
    }

    /// Full steps in one revolution
    pub fn steps_per_revolution(&self) -> u32 {
        self.steps_per_revolution.get()
    }

    /// Convert an angle in degrees to a step count for this axis
    pub fn angle_to_steps(&self, angle_deg: i32) -> u32 {
        angle_to_steps(angle_deg, self.steps_per_revolution)
    }
}

/// Convert an angle in degrees to full steps
///
/// Maps 1° onto 1 step and 360° onto `steps_per_revolution` steps, linearly,
/// rounding to the nearest step. Angles outside 1-360 are not clamped; they
/// extrapolate along the same line. Anything that lands below zero is a
/// zero-step move, anything past `u32::MAX` saturates.
///
/// Fractional results round to nearest, not up: 90° on a 200-step motor is
/// 50 steps (50.33), and 0° is no move at all rather than a single step.
pub fn angle_to_steps(angle_deg: i32, steps_per_revolution: NonZeroU32) -> u32 {
    // i128 so the full i32 x u32 input range cannot overflow
    let span_deg = (DEGREES_PER_REVOLUTION - 1) as i128;
    let span_steps = steps_per_revolution.get() as i128 - 1;
    let numerator = (angle_deg as i128 - 1) * span_steps;

    // round(numerator / span_deg); span_deg is odd so there is never a tie
    let rounded = (2 * numerator + span_deg).div_euclid(2 * span_deg);
    (rounded + 1).clamp(0, u32::MAX as i128) as u32
}
