//! Speed controller
//!
//! Maps a user speed linearly onto two ranges:
//!
//! | speed | step delay | carrier prescale |
//! |-------|------------|------------------|
//! | 0     | 20 ms      | 0x85             |
//! | 100   | 0.6 ms     | 0x03             |
//!
//! The carrier rate is chip-wide. Changing the stepper speed also changes
//! the PWM timing of any DC motor driven from the same board.

use crate::traits::CarrierRate;

/// Highest accepted speed value
pub const MAX_SPEED: u8 = 100;

/// Step delay at speed 0 in microseconds
const SLOWEST_DELAY_US: u32 = 20_000;

/// Step delay at speed 100 in microseconds
const FASTEST_DELAY_US: u32 = 600;

/// Delay applied before any explicit speed has been set
pub const DEFAULT_STEP_DELAY: StepDelay = StepDelay::from_micros(SLOWEST_DELAY_US);

/// Pause inserted after every tick so the rotor can follow the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepDelay {
    micros: u32,
}

impl StepDelay {
    pub const fn from_micros(micros: u32) -> Self {
        Self { micros }
    }

    pub const fn as_micros(self) -> u32 {
        self.micros
    }
}

impl Default for StepDelay {
    fn default() -> Self {
        DEFAULT_STEP_DELAY
    }
}

/// Result of mapping a user speed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpeedSetting {
    /// Speed after clamping to 0-100
    pub speed: u8,
    /// Delay between ticks
    pub step_delay: StepDelay,
    /// Chip-wide carrier rate
    pub carrier: CarrierRate,
}

impl SpeedSetting {
    /// Map a speed (0 = slowest, 100 = fastest); values above 100 saturate
    pub fn for_speed(speed: u8) -> Self {
        let speed = speed.min(MAX_SPEED);
        let s = speed as u32;

        // Linear in whole microseconds: 20000 + (600 - 20000) * s / 100
        let delay_us = SLOWEST_DELAY_US - (SLOWEST_DELAY_US - FASTEST_DELAY_US) * s / 100;

        // 133 - 130 * s / 100, rounded half up, computed in hundredths
        let slow = CarrierRate::DEFAULT.prescale() as u32;
        let fast = CarrierRate::FASTEST.prescale() as u32;
        let carrier_x100 = slow * 100 - (slow - fast) * s;
        let carrier = ((carrier_x100 + 50) / 100) as u8;

        Self {
            speed,
            step_delay: StepDelay::from_micros(delay_us),
            carrier: CarrierRate::from_prescale(carrier),
        }
    }
}

/// Chip-wide state shared by every output on the board
///
/// Tracks whether the backend has been initialized and the speed settings
/// currently in force. Re-arming clears the flag so the next use
/// initializes the chip again and restores the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChipState {
    initialized: bool,
    step_delay: StepDelay,
    carrier: CarrierRate,
}

impl Default for ChipState {
    fn default() -> Self {
        Self::new()
    }
}

impl ChipState {
    /// State before the chip has been touched
    pub const fn new() -> Self {
        Self {
            initialized: false,
            step_delay: DEFAULT_STEP_DELAY,
            carrier: CarrierRate::DEFAULT,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Record a completed backend initialization
    ///
    /// Initialization resets the chip to its default carrier, so the
    /// default step delay comes back with it.
    pub fn mark_initialized(&mut self) {
        self.initialized = true;
        self.step_delay = DEFAULT_STEP_DELAY;
        self.carrier = CarrierRate::DEFAULT;
    }

    /// Force initialization to run again on next use
    pub fn rearm(&mut self) {
        self.initialized = false;
    }

    /// Record a speed setting that has been written to the chip
    pub fn apply(&mut self, setting: SpeedSetting) {
        self.step_delay = setting.step_delay;
        self.carrier = setting.carrier;
    }

    pub fn step_delay(&self) -> StepDelay {
        self.step_delay
    }

    pub fn carrier(&self) -> CarrierRate {
        self.carrier
    }
}
