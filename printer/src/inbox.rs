use core::net::Ipv4Addr;

use embassy_sync::{blocking_mutex::raw::RawMutex, signal::Signal};
use heapless::Vec;
use parser::{
    ir::{self, IrCode},
    packet::MAX_PAYLOAD_LEN,
};

/// Datagram handed over by the network task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    pub source: Ipv4Addr,
    pub payload: Vec<u8, MAX_PAYLOAD_LEN>,
    /// The datagram did not fit in `payload`.
    pub oversized: bool,
}

impl Packet {
    pub fn new(source: Ipv4Addr, data: &[u8]) -> Self {
        let len = data.len().min(MAX_PAYLOAD_LEN);
        let mut payload = Vec::new();
        // len never exceeds the capacity
        let _ = payload.extend_from_slice(&data[..len]);
        Self {
            source,
            payload,
            oversized: data.len() > MAX_PAYLOAD_LEN,
        }
    }
}

/// Hand-off point between the input producers and the control tick.
///
/// Holds at most one pending event per producer; posting again before the
/// tick consumed it replaces the older event.
pub struct Inbox<M: RawMutex> {
    ir: Signal<M, IrCode>,
    packet: Signal<M, Packet>,
}

impl<M: RawMutex> Inbox<M> {
    pub const fn new() -> Self {
        Self {
            ir: Signal::new(),
            packet: Signal::new(),
        }
    }

    pub fn post_ir_code(&self, code: IrCode) {
        self.ir.signal(code);
    }

    /// Post a raw decoder value.
    pub fn post_ir_raw(&self, raw: u32) {
        self.post_ir_code(ir::format_code(raw));
    }

    pub fn post_packet(&self, packet: Packet) {
        self.packet.signal(packet);
    }

    pub fn take_ir_code(&self) -> Option<IrCode> {
        self.ir.try_take()
    }

    pub fn take_packet(&self) -> Option<Packet> {
        self.packet.try_take()
    }
}

impl<M: RawMutex> Default for Inbox<M> {
    fn default() -> Self {
        Self::new()
    }
}
