//! Stepper board configuration record
//!
//! With the `serde` feature enabled the record can be persisted as a
//! postcard-serialized blob.

use super::axis::{AxisConfig, AxisId, ConfigError, DEFAULT_STEPS_PER_REVOLUTION};
use crate::timing::MAX_SPEED;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest encoded size of a [`StepperConfig`]
pub const MAX_CONFIG_BLOB_LEN: usize = 16;

/// Board-level stepper configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepperConfig {
    /// Full steps per revolution, indexed by axis
    pub steps_per_revolution: [u32; 2],
    /// Initial stepper speed (0-100)
    pub speed: u8,
}

impl Default for StepperConfig {
    fn default() -> Self {
        Self {
            steps_per_revolution: [DEFAULT_STEPS_PER_REVOLUTION; 2],
            speed: 0,
        }
    }
}

impl StepperConfig {
    /// Steps per revolution for one axis
    pub fn steps_for(&self, axis: AxisId) -> u32 {
        self.steps_per_revolution[axis.index()]
    }

    /// Validate the record and build the per-axis configuration
    pub fn axes(&self) -> Result<[AxisConfig; 2], ConfigError> {
        Ok([
            AxisConfig::new(self.steps_for(AxisId::Axis1))?,
            AxisConfig::new(self.steps_for(AxisId::Axis2))?,
        ])
    }

    /// Speed clamped to the valid range
    pub fn speed(&self) -> u8 {
        self.speed.min(MAX_SPEED)
    }

    /// Encode to a postcard blob, returning the used part of `buf`
    #[cfg(feature = "serde")]
    pub fn to_blob<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], ConfigError> {
        postcard::to_slice(self, buf).map_err(|_| ConfigError::InvalidBlob)
    }

    /// Decode and validate a postcard blob
    #[cfg(feature = "serde")]
    pub fn from_blob(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::InvalidBlob)?;
        config.axes()?;
        Ok(config)
    }
}
