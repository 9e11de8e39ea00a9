#![cfg_attr(not(test), no_std)]

extern crate alloc;

use core::fmt::Display;

pub mod intent;
pub mod ir;
pub mod packet;

pub use intent::Intent;
pub use ir::{IrButton, IrCode};
pub use packet::{CommandPacket, PacketCommand, StatusReport};

/// Why an incoming command was dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
pub enum CommandError {
    UnknownSource,
    MalformedPayload,
    UnrecognizedCommand,
    MissingCommand,
}

impl Display for CommandError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CommandError::UnknownSource => core::write!(f, "Request from unknown source"),
            CommandError::MalformedPayload => core::write!(f, "Malformed command payload"),
            CommandError::UnrecognizedCommand => core::write!(f, "Requested action not recognized"),
            CommandError::MissingCommand => core::write!(f, "No action requested"),
        }
    }
}
