//! Phase stage state machine

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Direction in which the phase stage progresses
///
/// This only says which way the stage counter moves. Whether that turns the
/// shaft clockwise depends on how the coils are wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RotationDirection {
    /// Stage 1 -> 2 -> 3 -> 4 -> 1
    #[default]
    Forward,
    /// Stage 1 -> 4 -> 3 -> 2 -> 1
    Reverse,
}

/// One of the four coil-energization states of the full-step cycle
///
/// The stage only ever moves one position at a time, wrapping 4 -> 1 going
/// forward and 1 -> 4 going in reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhaseStage {
    #[default]
    One,
    Two,
    Three,
    Four,
}

impl PhaseStage {
    /// All stages in forward order
    pub const ALL: [PhaseStage; 4] = [
        PhaseStage::One,
        PhaseStage::Two,
        PhaseStage::Three,
        PhaseStage::Four,
    ];

    /// 1-based stage number
    pub const fn number(self) -> u8 {
        match self {
            PhaseStage::One => 1,
            PhaseStage::Two => 2,
            PhaseStage::Three => 3,
            PhaseStage::Four => 4,
        }
    }

    /// Stage for a 1-based number, if it is in 1..=4
    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(PhaseStage::One),
            2 => Some(PhaseStage::Two),
            3 => Some(PhaseStage::Three),
            4 => Some(PhaseStage::Four),
            _ => None,
        }
    }

    /// Next stage going forward (4 wraps to 1)
    pub const fn next(self) -> Self {
        match self {
            PhaseStage::One => PhaseStage::Two,
            PhaseStage::Two => PhaseStage::Three,
            PhaseStage::Three => PhaseStage::Four,
            PhaseStage::Four => PhaseStage::One,
        }
    }

    /// Previous stage (1 wraps to 4)
    pub const fn prev(self) -> Self {
        match self {
            PhaseStage::One => PhaseStage::Four,
            PhaseStage::Two => PhaseStage::One,
            PhaseStage::Three => PhaseStage::Two,
            PhaseStage::Four => PhaseStage::Three,
        }
    }

    /// Advance one position in `direction`
    pub const fn advance(self, direction: RotationDirection) -> Self {
        match direction {
            RotationDirection::Forward => self.next(),
            RotationDirection::Reverse => self.prev(),
        }
    }

    /// Advance `steps` positions in `direction`
    pub fn advance_by(self, direction: RotationDirection, steps: u32) -> Self {
        let offset = (steps % 4) as u8;
        let index = self.number() - 1;
        let index = match direction {
            RotationDirection::Forward => (index + offset) % 4,
            RotationDirection::Reverse => (index + 4 - offset) % 4,
        };
        Self::ALL[index as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_forward_wraps_four_to_one() {
        assert_eq!(PhaseStage::Four.next(), PhaseStage::One);
        assert_eq!(PhaseStage::One.next(), PhaseStage::Two);
    }

    #[test]
    fn test_reverse_wraps_one_to_four() {
        assert_eq!(PhaseStage::One.prev(), PhaseStage::Four);
        assert_eq!(PhaseStage::Three.prev(), PhaseStage::Two);
    }

    #[test]
    fn test_number_round_trip() {
        for stage in PhaseStage::ALL {
            assert_eq!(PhaseStage::from_number(stage.number()), Some(stage));
        }
        assert_eq!(PhaseStage::from_number(0), None);
        assert_eq!(PhaseStage::from_number(5), None);
    }

    #[test]
    fn test_default_is_stage_one() {
        assert_eq!(PhaseStage::default(), PhaseStage::One);
    }

    proptest! {
        #[test]
        fn advance_by_matches_repeated_advance(start in 1u8..=4, steps in 0u32..64, reverse: bool) {
            let start = PhaseStage::from_number(start).unwrap();
            let direction = if reverse { RotationDirection::Reverse } else { RotationDirection::Forward };

            let mut stage = start;
            for _ in 0..steps {
                stage = stage.advance(direction);
            }

            prop_assert_eq!(start.advance_by(direction, steps), stage);
        }

        #[test]
        fn forward_then_reverse_is_identity(start in 1u8..=4, steps in 0u32..1000) {
            let start = PhaseStage::from_number(start).unwrap();
            let there = start.advance_by(RotationDirection::Forward, steps);
            prop_assert_eq!(there.advance_by(RotationDirection::Reverse, steps), start);
        }
    }
}
