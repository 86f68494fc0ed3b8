//! Stage to coil mapping
//!
//! The canonical full-step bipolar sequence is A+, B-, A-, B+:
//!
//! | stage | coil | polarity |
//! |-------|------|----------|
//! | 1     | A    | Forward  |
//! | 2     | B    | Reverse  |
//! | 3     | A    | Reverse  |
//! | 4     | B    | Forward  |
//!
//! When two axes share one stage counter but are asked to turn in opposite
//! directions, the second axis reads the counter-rotating table instead
//! (B-, A+, B+, A-). Both axes stay stage-synchronized; they are not
//! phase-independent.

use super::phase::{PhaseStage, RotationDirection};
use crate::traits::{Channel, Polarity};

/// Which coil of an axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Coil {
    A,
    B,
}

/// The pair of backend channels wired to one stepper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisCoils {
    pub coil_a: Channel,
    pub coil_b: Channel,
}

impl AxisCoils {
    pub const fn new(coil_a: Channel, coil_b: Channel) -> Self {
        Self { coil_a, coil_b }
    }

    /// Backend channel for a coil
    pub const fn channel(&self, coil: Coil) -> Channel {
        match coil {
            Coil::A => self.coil_a,
            Coil::B => self.coil_b,
        }
    }
}

/// A single channel write: which channel, and which way to drive it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CoilDrive {
    pub channel: Channel,
    pub polarity: Polarity,
}

/// Which stage table an axis reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Commutation {
    /// A+, B-, A-, B+
    #[default]
    Standard,
    /// B-, A+, B+, A-
    Counter,
}

const STANDARD: [(Coil, Polarity); 4] = [
    (Coil::A, Polarity::Forward),
    (Coil::B, Polarity::Reverse),
    (Coil::A, Polarity::Reverse),
    (Coil::B, Polarity::Forward),
];

const COUNTER: [(Coil, Polarity); 4] = [
    (Coil::B, Polarity::Reverse),
    (Coil::A, Polarity::Forward),
    (Coil::B, Polarity::Forward),
    (Coil::A, Polarity::Reverse),
];

impl Commutation {
    /// Table for a follower axis driven off a stage counter that advances in
    /// the lead axis's direction
    pub fn for_follower(lead: RotationDirection, follower: RotationDirection) -> Self {
        if lead == follower {
            Commutation::Standard
        } else {
            Commutation::Counter
        }
    }

    /// Coil and polarity for a stage
    pub const fn lookup(self, stage: PhaseStage) -> (Coil, Polarity) {
        let index = (stage.number() - 1) as usize;
        match self {
            Commutation::Standard => STANDARD[index],
            Commutation::Counter => COUNTER[index],
        }
    }
}

/// Coil-energization lookup for one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhaseSequencer {
    coils: AxisCoils,
    commutation: Commutation,
}

impl PhaseSequencer {
    /// Sequencer reading the standard table
    pub const fn new(coils: AxisCoils) -> Self {
        Self {
            coils,
            commutation: Commutation::Standard,
        }
    }

    /// Sequencer reading a specific table
    pub const fn with_commutation(coils: AxisCoils, commutation: Commutation) -> Self {
        Self { coils, commutation }
    }

    /// Channel and polarity to energize at `stage`
    pub const fn drive(&self, stage: PhaseStage) -> CoilDrive {
        let (coil, polarity) = self.commutation.lookup(stage);
        CoilDrive {
            channel: self.coils.channel(coil),
            polarity,
        }
    }
}
