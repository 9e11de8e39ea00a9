#![cfg_attr(not(test), no_std)]

use core::fmt::Display;

use common::AxisIndex;
use homing::HomingState;

pub mod axis;
pub mod homing;
pub mod motion;

pub use axis::Axis;
pub use motion::{InitOptions, MotionConfig, MotionCoordinator};

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
pub enum MotionError {
    MoveOutOfBounds,
    MoveNotValid,
    HomingFailed { axis: AxisIndex, state: HomingState },
}

impl Display for MotionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MotionError::MoveOutOfBounds => core::write!(f, "Move out of bounds"),
            MotionError::MoveNotValid => core::write!(f, "Move not valid"),
            MotionError::HomingFailed { axis, state } => {
                core::write!(f, "Homing failed: {:?} while {:?}", axis, state)
            }
        }
    }
}

/// Outcome of a successful `begin_move`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
pub enum MoveStart {
    Started,
    /// Target equals the current position, nothing to do.
    Redundant,
}
