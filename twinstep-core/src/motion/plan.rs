//! Dual-axis tick planning
//!
//! One shared [`PhaseStage`] drives both axes. It starts at stage 1 and
//! advances after every tick in the direction of axis 1 (or of the only
//! axis, for a single-axis run). Axis 2's own direction only selects which
//! stage table it reads: the standard one when it matches axis 1, the
//! counter-rotating one when it does not.
//!
//! # Unequal step counts
//!
//! Both axes are written while the tick index is `<= lesser`. After that only
//! the axis that asked for `greater` steps keeps being written; the other is
//! left energized at its last coil. This is cap-and-continue, not a
//! proportional interleave: the shorter move finishes early and the longer
//! one runs on alone, so the two axes do not arrive together. Because the
//! cap is inclusive, the shorter axis receives `lesser + 1` writes.

use crate::config::AxisId;
use crate::sequence::{CoilDrive, Commutation, PhaseSequencer, PhaseStage, RotationDirection};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Direction and step count for one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisMove {
    pub direction: RotationDirection,
    pub steps: u32,
}

impl AxisMove {
    pub const fn new(direction: RotationDirection, steps: u32) -> Self {
        Self { direction, steps }
    }

    pub const fn forward(steps: u32) -> Self {
        Self::new(RotationDirection::Forward, steps)
    }

    pub const fn reverse(steps: u32) -> Self {
        Self::new(RotationDirection::Reverse, steps)
    }
}

/// A request to turn one axis, or both together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RunRequest {
    /// Only `axis` is driven; the other axis is never written
    Single { axis: AxisId, motion: AxisMove },
    /// Both axes driven off one stage counter
    Dual { axis1: AxisMove, axis2: AxisMove },
}

impl RunRequest {
    pub const fn single(axis: AxisId, motion: AxisMove) -> Self {
        Self::Single { axis, motion }
    }

    pub const fn dual(axis1: AxisMove, axis2: AxisMove) -> Self {
        Self::Dual { axis1, axis2 }
    }

    /// Number of ticks the run takes
    pub fn greater_steps(&self) -> u32 {
        match *self {
            Self::Single { motion, .. } => motion.steps,
            Self::Dual { axis1, axis2 } => axis1.steps.max(axis2.steps),
        }
    }

    /// Last tick index on which both axes are written in a dual run
    ///
    /// A single-axis run reports 0; it has only one axis, which is written
    /// on every tick.
    pub fn lesser_steps(&self) -> u32 {
        match *self {
            Self::Single { .. } => 0,
            Self::Dual { axis1, axis2 } => axis1.steps.min(axis2.steps),
        }
    }

    /// Direction the shared stage counter advances in
    pub fn lead_direction(&self) -> RotationDirection {
        match *self {
            Self::Single { motion, .. } => motion.direction,
            Self::Dual { axis1, .. } => axis1.direction,
        }
    }

    /// Build the tick plan for this request
    pub fn plan(&self) -> TickPlan {
        TickPlan::new(*self)
    }
}

/// Coil writes for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tick {
    /// Zero-based tick index
    pub index: u32,
    /// Shared stage for this tick
    pub stage: PhaseStage,
    /// Write for axis 1, if it is driven this tick
    pub axis1: Option<CoilDrive>,
    /// Write for axis 2, if it is driven this tick
    pub axis2: Option<CoilDrive>,
}

impl Tick {
    /// Write for an axis, if it is driven this tick
    pub fn drive(&self, axis: AxisId) -> Option<CoilDrive> {
        match axis {
            AxisId::Axis1 => self.axis1,
            AxisId::Axis2 => self.axis2,
        }
    }

    /// Writes in the order they go to the backend
    pub fn writes(&self) -> impl Iterator<Item = CoilDrive> {
        self.axis1.into_iter().chain(self.axis2)
    }
}

#[derive(Debug, Clone, Copy)]
struct Lane {
    sequencer: PhaseSequencer,
    steps: u32,
}

/// Iterator over the ticks of one run
///
/// Allocation-free and hardware-free; [`execute`](super::execute) is what
/// applies the ticks to a backend.
#[derive(Debug, Clone)]
pub struct TickPlan {
    lanes: [Option<Lane>; 2],
    lead: RotationDirection,
    stage: PhaseStage,
    counter: u32,
    greater: u32,
    lesser: u32,
}

impl TickPlan {
    pub fn new(request: RunRequest) -> Self {
        let lanes = match request {
            RunRequest::Single { axis, motion } => {
                let lane = Lane {
                    sequencer: PhaseSequencer::new(axis.coils()),
                    steps: motion.steps,
                };
                match axis {
                    AxisId::Axis1 => [Some(lane), None],
                    AxisId::Axis2 => [None, Some(lane)],
                }
            }
            RunRequest::Dual { axis1, axis2 } => {
                let follower = Commutation::for_follower(axis1.direction, axis2.direction);
                [
                    Some(Lane {
                        sequencer: PhaseSequencer::new(AxisId::Axis1.coils()),
                        steps: axis1.steps,
                    }),
                    Some(Lane {
                        sequencer: PhaseSequencer::with_commutation(
                            AxisId::Axis2.coils(),
                            follower,
                        ),
                        steps: axis2.steps,
                    }),
                ]
            }
        };

        Self {
            lanes,
            lead: request.lead_direction(),
            stage: PhaseStage::One,
            counter: 0,
            greater: request.greater_steps(),
            lesser: request.lesser_steps(),
        }
    }

    /// Stage the next tick will use (the final stage once exhausted)
    pub fn stage(&self) -> PhaseStage {
        self.stage
    }

    /// Ticks already produced
    pub fn completed(&self) -> u32 {
        self.counter
    }

    /// Total ticks in the run
    pub fn total(&self) -> u32 {
        self.greater
    }

    fn lane_drive(&self, lane: &Option<Lane>, index: u32) -> Option<CoilDrive> {
        let lane = lane.as_ref()?;
        let active = index <= self.lesser || lane.steps == self.greater;
        active.then(|| lane.sequencer.drive(self.stage))
    }
}

impl Iterator for TickPlan {
    type Item = Tick;

    fn next(&mut self) -> Option<Tick> {
        if self.counter >= self.greater {
            return None;
        }

        let index = self.counter;
        let tick = Tick {
            index,
            stage: self.stage,
            axis1: self.lane_drive(&self.lanes[0], index),
            axis2: self.lane_drive(&self.lanes[1], index),
        };

        self.stage = self.stage.advance(self.lead);
        self.counter += 1;
        Some(tick)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.greater - self.counter) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TickPlan {}
