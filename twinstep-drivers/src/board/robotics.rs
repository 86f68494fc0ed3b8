//! 4-motor robotics board (PCA9685-class PWM chip over I2C)
//!
//! Each motor output is an H-bridge input pair fed from two PWM channels of
//! the chip. Driving a motor output "forward" puts the duty on the upper
//! register pair and holds the lower pair at zero; "reverse" is the mirror.
//!
//! # Register writes
//!
//! Every register write is a separate 2-byte I2C transfer `[reg, value]`:
//!
//! - Initialize: prescale 0x85, all-LED block zeroed, MODE1 awake
//! - Carrier change: MODE1 sleep, prescale, MODE1 awake
//! - Drive: 12-bit duty into one register pair, zero into the other
//! - Stop: zero into all four registers of the output
//!
//! # Usage
//!
//! ```ignore
//! let board = RoboticsBoard::new(i2c);
//! let mut steppers = Steppers::new(board, delay);
//! steppers.turn_steps(AxisId::Axis1, RotationDirection::Forward, 200)?;
//! ```

use embedded_hal::i2c::I2c;
use twinstep_core::traits::{CarrierRate, Channel, MotorOutputBackend, Polarity};

/// Default 7-bit I2C address of the board
pub const DEFAULT_ADDRESS: u8 = 0x6C;

/// Full-scale PWM count (12-bit)
pub const PWM_FULL_SCALE: u16 = 4095;

/// Register addresses
pub mod reg {
    /// Mode 1 (sleep/restart control)
    pub const MODE1: u8 = 0x00;
    /// Base register of motor output 1
    pub const MOTOR1: u8 = 0x28;
    /// Base register of motor output 2
    pub const MOTOR2: u8 = 0x30;
    /// Base register of motor output 3
    pub const MOTOR3: u8 = 0x38;
    /// Base register of motor output 4
    pub const MOTOR4: u8 = 0x40;
    /// All-outputs block, written to zero everything at once
    pub const ALL_LED_ON_L: u8 = 0xFA;
    pub const ALL_LED_ON_H: u8 = 0xFB;
    pub const ALL_LED_OFF_L: u8 = 0xFC;
    pub const ALL_LED_OFF_H: u8 = 0xFD;
    /// PWM frequency prescaler
    pub const PRESCALE: u8 = 0xFE;
}

/// MODE1 register values
pub mod mode1 {
    /// Awake, responding to all-call
    pub const AWAKE: u8 = 0x01;
    /// Asleep (oscillator off) so the prescaler can be written
    pub const SLEEP: u8 = 0x91;
}

/// Base register of a motor output
pub const fn channel_base(channel: Channel) -> u8 {
    match channel {
        Channel::Motor1 => reg::MOTOR1,
        Channel::Motor2 => reg::MOTOR2,
        Channel::Motor3 => reg::MOTOR3,
        Channel::Motor4 => reg::MOTOR4,
    }
}

/// Convert a 0-100 duty to a 12-bit PWM count, rounded
///
/// Duties above 100 are treated as 100.
pub fn duty_to_counts(duty_percent: u8) -> u16 {
    let duty = duty_percent.min(100) as u32;
    ((duty * PWM_FULL_SCALE as u32 + 50) / 100) as u16
}

/// Robotics board backend
pub struct RoboticsBoard<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> RoboticsBoard<I2C> {
    /// Create a backend at the default address (0x6C)
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, DEFAULT_ADDRESS)
    }

    /// Create a backend at a custom address (board jumpers changed)
    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Release the I2C bus
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[reg, value])
    }

    /// Write a 12-bit count into a low/high register pair
    fn write_pair(&mut self, reg: u8, counts: u16) -> Result<(), I2C::Error> {
        self.write_reg(reg, (counts & 0xFF) as u8)?;
        self.write_reg(reg + 1, (counts >> 8) as u8)
    }
}

impl<I2C: I2c> MotorOutputBackend for RoboticsBoard<I2C> {
    type Error = I2C::Error;

    fn initialize(&mut self) -> Result<(), Self::Error> {
        self.write_reg(reg::PRESCALE, CarrierRate::DEFAULT.prescale())?;

        for all_reg in [
            reg::ALL_LED_ON_L,
            reg::ALL_LED_ON_H,
            reg::ALL_LED_OFF_L,
            reg::ALL_LED_OFF_H,
        ] {
            self.write_reg(all_reg, 0x00)?;
        }

        self.write_reg(reg::MODE1, mode1::AWAKE)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("robotics board 0x{:02x} awake", self.address);

        Ok(())
    }

    fn set_carrier_rate(&mut self, rate: CarrierRate) -> Result<(), Self::Error> {
        // The prescaler only latches while the oscillator is asleep
        self.write_reg(reg::MODE1, mode1::SLEEP)?;
        self.write_reg(reg::PRESCALE, rate.prescale())?;
        self.write_reg(reg::MODE1, mode1::AWAKE)
    }

    fn drive_channel(
        &mut self,
        channel: Channel,
        polarity: Polarity,
        duty_percent: u8,
    ) -> Result<(), Self::Error> {
        let base = channel_base(channel);
        let counts = duty_to_counts(duty_percent);

        let (active, idle) = match polarity {
            Polarity::Forward => (base + 4, base),
            Polarity::Reverse => (base, base + 4),
        };

        self.write_pair(active, counts)?;
        self.write_pair(idle, 0)
    }

    fn stop_channel(&mut self, channel: Channel) -> Result<(), Self::Error> {
        let base = channel_base(channel);
        self.write_pair(base, 0)?;
        self.write_pair(base + 4, 0)
    }
}
