use alloc::string::String;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::CommandError;

/// Largest payload accepted from the network.
pub const MAX_PAYLOAD_LEN: usize = 200;

pub const MAX_SPEED: u8 = 100;

static CMD_PEN_ON: &str = "PEN_ON";
static CMD_PEN_FWD: &str = "PEN_FWD";
static CMD_PEN_BCK: &str = "PEN_BCK";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
pub enum PacketCommand {
    PenOn,
    PenFwd,
    PenBck,
}

impl PacketCommand {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            t if t == CMD_PEN_ON => Some(PacketCommand::PenOn),
            t if t == CMD_PEN_FWD => Some(PacketCommand::PenFwd),
            t if t == CMD_PEN_BCK => Some(PacketCommand::PenBck),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            PacketCommand::PenOn => CMD_PEN_ON,
            PacketCommand::PenFwd => CMD_PEN_FWD,
            PacketCommand::PenBck => CMD_PEN_BCK,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
pub struct CommandPacket {
    pub command: PacketCommand,
    /// Pen speed in percent, applied before the command.
    pub speed: Option<u8>,
}

#[derive(Deserialize)]
struct RawPacket {
    #[serde(rename = "CMD")]
    cmd: Option<Value>,
    #[serde(rename = "SPEED")]
    speed: Option<u8>,
}

impl CommandPacket {
    /// Decode a JSON command object such as `{"CMD":"PEN_FWD","SPEED":40}`.
    pub fn parse(payload: &[u8]) -> Result<Self, CommandError> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(CommandError::MalformedPayload);
        }
        let raw: RawPacket =
            serde_json::from_slice(payload).map_err(|_| CommandError::MalformedPayload)?;

        let speed = match raw.speed {
            Some(s) if s > MAX_SPEED => return Err(CommandError::MalformedPayload),
            s => s,
        };
        // any non-string CMD is a well-formed request for an unknown action
        let command = match raw.cmd {
            None => return Err(CommandError::MissingCommand),
            Some(Value::String(token)) => PacketCommand::from_token(&token),
            Some(_) => None,
        }
        .ok_or(CommandError::UnrecognizedCommand)?;
        Ok(Self { command, speed })
    }
}

/// Body pushed to the status endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub status: bool,
}

impl StatusReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
