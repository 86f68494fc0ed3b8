//! Motor output backend trait
//!
//! The backend owns everything chip-specific: register layout, bus framing,
//! and the mapping from a logical [`Channel`] to a hardware address. The
//! stepping logic only ever asks it to drive or stop a channel.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One PWM output pair on the motor-driver board
///
/// Each channel drives one coil terminal. A stepper axis uses two channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Channel {
    Motor1,
    Motor2,
    Motor3,
    Motor4,
}

impl Channel {
    /// Every channel on the board, in output order
    pub const ALL: [Channel; 4] = [
        Channel::Motor1,
        Channel::Motor2,
        Channel::Motor3,
        Channel::Motor4,
    ];

    /// Zero-based channel index
    pub const fn index(self) -> usize {
        match self {
            Channel::Motor1 => 0,
            Channel::Motor2 => 1,
            Channel::Motor3 => 2,
            Channel::Motor4 => 3,
        }
    }
}

/// Output polarity of a channel
///
/// Selects which of the channel's two pins receives the PWM duty while the
/// other is held low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Polarity {
    Forward,
    Reverse,
}

/// Chip-wide PWM carrier setting (frequency prescaler value)
///
/// Larger values mean a slower carrier. The setting is shared by every
/// channel on the chip, so changing it for the steppers also changes the
/// output timing of any DC motor on the same board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CarrierRate(u8);

impl CarrierRate {
    /// Carrier applied by chip initialization (50 Hz pulse repetition)
    pub const DEFAULT: CarrierRate = CarrierRate(0x85);

    /// Carrier used at full stepper speed
    pub const FASTEST: CarrierRate = CarrierRate(0x03);

    /// Wrap a raw prescaler value
    pub const fn from_prescale(value: u8) -> Self {
        Self(value)
    }

    /// Raw prescaler value to write to the chip
    pub const fn prescale(self) -> u8 {
        self.0
    }
}

impl Default for CarrierRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Trait for the 4-channel motor-driver chip
///
/// All calls are blocking. Failures are reported through [`Self::Error`]
/// and are never retried by the caller; a failed write leaves the hardware
/// out of step with the software stage counter.
pub trait MotorOutputBackend {
    /// Error type for bus or chip failures
    type Error;

    /// Bring the chip out of reset/sleep
    ///
    /// Sets the default carrier rate and zeroes every channel output.
    /// Must be safe to call more than once.
    fn initialize(&mut self) -> Result<(), Self::Error>;

    /// Set the chip-wide PWM carrier rate
    fn set_carrier_rate(&mut self, rate: CarrierRate) -> Result<(), Self::Error>;

    /// Energize one channel at `duty_percent` (0-100) with the given polarity
    fn drive_channel(
        &mut self,
        channel: Channel,
        polarity: Polarity,
        duty_percent: u8,
    ) -> Result<(), Self::Error>;

    /// Zero both output pins of a channel
    ///
    /// Stopping an already stopped channel leaves it in the same state.
    fn stop_channel(&mut self, channel: Channel) -> Result<(), Self::Error>;

    /// Stop every channel on the chip
    fn stop_all(&mut self) -> Result<(), Self::Error> {
        for channel in Channel::ALL {
            self.stop_channel(channel)?;
        }
        Ok(())
    }
}

impl<T: MotorOutputBackend + ?Sized> MotorOutputBackend for &mut T {
    type Error = T::Error;

    fn initialize(&mut self) -> Result<(), Self::Error> {
        T::initialize(self)
    }

    fn set_carrier_rate(&mut self, rate: CarrierRate) -> Result<(), Self::Error> {
        T::set_carrier_rate(self, rate)
    }

    fn drive_channel(
        &mut self,
        channel: Channel,
        polarity: Polarity,
        duty_percent: u8,
    ) -> Result<(), Self::Error> {
        T::drive_channel(self, channel, polarity, duty_percent)
    }

    fn stop_channel(&mut self, channel: Channel) -> Result<(), Self::Error> {
        T::stop_channel(self, channel)
    }

    fn stop_all(&mut self) -> Result<(), Self::Error> {
        T::stop_all(self)
    }
}
