use std::net::{AddrParseError, Ipv4Addr};
use std::time::Duration;

use common::AXIS_COUNT;
use motion::homing::{HomingConfig, HomingStrategy};
use motion::MotionConfig;
use pen::PenConfig;
use printer::PrinterConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case", tag = "strategy")]
pub enum HomingSection {
    LimitSwitches { step_limit: u32 },
    Rewind { steps: u32 },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MotionSection {
    pub axis_max: [f32; AXIS_COUNT],
    pub synchronize_planar: bool,
    pub homing: HomingSection,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PenSection {
    pub heat_pulse_ms: u64,
    pub speed: u8,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MachineSection {
    /// Distance between the two limit switches of each axis, in steps.
    pub travel: [i32; AXIS_COUNT],
    /// Carriage positions at power-on, in steps from the min switch.
    pub carriage: [i32; AXIS_COUNT],
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SimulatorConfig {
    pub listen_address: String,
    pub allowed_source: String,
    pub tick_period_ms: u64,
    pub motion: MotionSection,
    pub pen: PenSection,
    pub machine: MachineSection,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        let printer = PrinterConfig::default();
        let homing = match printer.motion.homing.strategy {
            HomingStrategy::LimitSwitches => HomingSection::LimitSwitches {
                step_limit: printer.motion.homing.step_limit,
            },
            HomingStrategy::Rewind { steps } => HomingSection::Rewind { steps },
        };
        Self {
            listen_address: String::from("127.0.0.1:4225"),
            allowed_source: String::from("127.0.0.1"),
            tick_period_ms: 10,
            motion: MotionSection {
                axis_max: printer.motion.axis_max,
                synchronize_planar: printer.motion.synchronize_planar,
                homing,
            },
            pen: PenSection {
                heat_pulse_ms: printer.pen.heat_pulse.as_millis() as u64,
                speed: printer.pen.speed,
            },
            machine: MachineSection {
                travel: [260; AXIS_COUNT],
                carriage: [40, 200, 100],
            },
        }
    }
}

impl SimulatorConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    pub fn printer_config(&self) -> Result<PrinterConfig, AddrParseError> {
        let homing = match self.motion.homing {
            HomingSection::LimitSwitches { step_limit } => HomingConfig {
                strategy: HomingStrategy::LimitSwitches,
                step_limit,
            },
            HomingSection::Rewind { steps } => HomingConfig {
                strategy: HomingStrategy::Rewind { steps },
                ..HomingConfig::default()
            },
        };
        Ok(PrinterConfig {
            motion: MotionConfig {
                axis_max: self.motion.axis_max,
                synchronize_planar: self.motion.synchronize_planar,
                homing,
            },
            pen: PenConfig {
                heat_pulse: Duration::from_millis(self.pen.heat_pulse_ms),
                speed: self.pen.speed,
            },
            allowed_source: self.allowed_source.parse::<Ipv4Addr>()?,
        })
    }
}
