//! Simulated hardware for host tests and the simulator.

use heapless::String;

use crate::{
    AxisIndex, Direction, DisplayBase, LimitSide, PwmBase, StatusReporterBase, StatusSnapshot,
    StepperBase, SwitchesBase, AXIS_COUNT,
};

pub const ALERT_LEN: usize = 64;

/// A carriage per axis running between a min and a max limit switch.
///
/// Positions are physical steps measured from the min switch; stepping
/// past either end stalls the carriage.
pub struct SimulatedMachine {
    travel: [i32; AXIS_COUNT],
    carriage: [i32; AXIS_COUNT],
    pulses: [u32; AXIS_COUNT],
    last_direction: [Option<Direction>; AXIS_COUNT],
    switch_connected: [bool; AXIS_COUNT],
    jog_buttons: [[bool; 2]; AXIS_COUNT],
    refresh_button: bool,
}

impl SimulatedMachine {
    pub fn new(travel: [i32; AXIS_COUNT], carriage: [i32; AXIS_COUNT]) -> Self {
        Self {
            travel,
            carriage,
            pulses: [0; AXIS_COUNT],
            last_direction: [None; AXIS_COUNT],
            switch_connected: [true; AXIS_COUNT],
            jog_buttons: [[false; 2]; AXIS_COUNT],
            refresh_button: false,
        }
    }

    pub fn carriage(&self, axis: AxisIndex) -> i32 {
        self.carriage[axis.index()]
    }

    pub fn travel(&self, axis: AxisIndex) -> i32 {
        self.travel[axis.index()]
    }

    /// Number of step pulses emitted on `axis` since the last reset.
    pub fn pulses(&self, axis: AxisIndex) -> u32 {
        self.pulses[axis.index()]
    }

    pub fn last_direction(&self, axis: AxisIndex) -> Option<Direction> {
        self.last_direction[axis.index()]
    }

    pub fn reset_pulses(&mut self) {
        self.pulses = [0; AXIS_COUNT];
        self.last_direction = [None; AXIS_COUNT];
    }

    /// A disconnected switch never reads as triggered.
    pub fn disconnect_switches(&mut self, axis: AxisIndex) {
        self.switch_connected[axis.index()] = false;
    }

    pub fn set_jog_button(&mut self, axis: AxisIndex, direction: Direction, pressed: bool) {
        self.jog_buttons[axis.index()][button_slot(direction)] = pressed;
    }

    pub fn set_refresh_button(&mut self, pressed: bool) {
        self.refresh_button = pressed;
    }
}

fn button_slot(direction: Direction) -> usize {
    match direction {
        Direction::Positive => 0,
        Direction::Negative => 1,
    }
}

impl StepperBase for SimulatedMachine {
    fn step_one_unit(&mut self, axis: AxisIndex, direction: Direction) {
        let i = axis.index();
        self.pulses[i] += 1;
        self.last_direction[i] = Some(direction);
        let next = self.carriage[i] + i32::from(i8::from(direction));
        self.carriage[i] = next.clamp(0, self.travel[i]);
    }
}

impl SwitchesBase for SimulatedMachine {
    fn read_limit_switch(&self, axis: AxisIndex, side: LimitSide) -> bool {
        let i = axis.index();
        if !self.switch_connected[i] {
            return false;
        }
        match side {
            LimitSide::Min => self.carriage[i] <= 0,
            LimitSide::Max => self.carriage[i] >= self.travel[i],
        }
    }

    fn read_jog_button(&self, axis: AxisIndex, direction: Direction) -> bool {
        self.jog_buttons[axis.index()][button_slot(direction)]
    }

    fn read_refresh_button(&self) -> bool {
        self.refresh_button
    }
}

#[derive(Default, Clone, Copy)]
pub struct PwmChannel {
    pub enabled: bool,
    pub duty_cycle: u64,
}

pub struct MockPwm {
    pub channels: [PwmChannel; 4],
    pub max_duty: u64,
}

impl MockPwm {
    pub fn new(max_duty: u64) -> Self {
        Self {
            channels: [PwmChannel::default(); 4],
            max_duty,
        }
    }

    pub fn channel(&self, channel: u8) -> PwmChannel {
        self.channels[usize::from(channel)]
    }
}

impl PwmBase for MockPwm {
    type Channel = u8;

    fn enable(&mut self, channel: Self::Channel) {
        self.channels[usize::from(channel)].enabled = true;
    }

    fn disable(&mut self, channel: Self::Channel) {
        self.channels[usize::from(channel)].enabled = false;
    }

    fn get_max_duty(&self) -> u64 {
        self.max_duty
    }

    fn set_duty(&mut self, channel: Self::Channel, duty_cycle: u64) {
        self.channels[usize::from(channel)].duty_cycle = duty_cycle;
    }
}

#[derive(Default)]
pub struct RecordingDisplay {
    pub redraws: u32,
    pub ready: bool,
    pub alerts: u32,
    pub last_alert: String<ALERT_LEN>,
}

impl DisplayBase for RecordingDisplay {
    fn draw_status(&mut self, ready: bool, _version: &str) {
        self.redraws += 1;
        self.ready = ready;
    }

    fn alert(&mut self, message: &str) {
        self.alerts += 1;
        self.last_alert.clear();
        for c in message.chars() {
            if self.last_alert.push(c).is_err() {
                break;
            }
        }
    }
}

#[derive(Default)]
pub struct RecordingReporter {
    pub reports: u32,
    pub last: Option<StatusSnapshot>,
}

impl StatusReporterBase for RecordingReporter {
    fn report(&mut self, snapshot: StatusSnapshot) {
        self.reports += 1;
        self.last = Some(snapshot);
    }
}
