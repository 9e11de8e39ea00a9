#![cfg_attr(not(test), no_std)]

pub mod controller;
pub mod inbox;
pub mod inputs;
pub mod router;

pub use controller::{Printer, PrinterConfig, PrinterEvent};
pub use inbox::{Inbox, Packet};
