#![cfg_attr(not(test), no_std)]

use core::fmt::Display;

pub mod actuator;

pub use actuator::{PenActuator, PenConfig, PenMode};

/// A rejected pen transition. The actuator state is left untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
pub enum PenError {
    AlreadyHot,
    Heating,
    Extruding,
    Retracting,
}

impl Display for PenError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PenError::AlreadyHot => core::write!(f, "Pen already hot"),
            PenError::Heating => core::write!(f, "Pen is heating"),
            PenError::Extruding => core::write!(f, "Pen is extruding"),
            PenError::Retracting => core::write!(f, "Pen is retracting"),
        }
    }
}
