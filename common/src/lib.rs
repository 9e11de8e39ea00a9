#![cfg_attr(not(test), no_std)]

//! Hardware contract between the motion core and the physical layer.
//!
//! The core never touches pins directly: every board (real or simulated)
//! implements these traits and the core only ever talks to them.

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub const AXIS_COUNT: usize = 3;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
pub enum AxisIndex {
    Planar0,
    Planar1,
    Vertical,
}

impl AxisIndex {
    pub const ALL: [AxisIndex; AXIS_COUNT] =
        [AxisIndex::Planar0, AxisIndex::Planar1, AxisIndex::Vertical];

    pub const fn index(self) -> usize {
        match self {
            AxisIndex::Planar0 => 0,
            AxisIndex::Planar1 => 1,
            AxisIndex::Vertical => 2,
        }
    }

    pub fn is_planar(self) -> bool {
        matches!(self, AxisIndex::Planar0 | AxisIndex::Planar1)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    /// Direction of travel for a signed increment. Zero counts as positive.
    pub fn from_sign(value: f32) -> Self {
        if value.is_sign_negative() {
            Direction::Negative
        } else {
            Direction::Positive
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Positive => Direction::Negative,
            Direction::Negative => Direction::Positive,
        }
    }
}

impl From<Direction> for i8 {
    fn from(value: Direction) -> Self {
        match value {
            Direction::Positive => 1,
            Direction::Negative => -1,
        }
    }
}

impl From<Direction> for f32 {
    fn from(value: Direction) -> Self {
        f32::from(i8::from(value))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
pub enum LimitSide {
    Min,
    Max,
}

/// Physical stepper output. One call is exactly one whole step.
pub trait StepperBase {
    fn step_one_unit(&mut self, axis: AxisIndex, direction: Direction);
}

/// Level-triggered physical inputs, sampled once per tick.
pub trait SwitchesBase {
    /// `true` while the limit switch at `side` of `axis` is triggered.
    fn read_limit_switch(&self, axis: AxisIndex, side: LimitSide) -> bool;

    /// `true` while the jog button moving `axis` toward `direction` is held.
    fn read_jog_button(&self, axis: AxisIndex, direction: Direction) -> bool;

    /// `true` while the display refresh button is held.
    fn read_refresh_button(&self) -> bool {
        false
    }
}

pub trait PwmBase {
    type Channel: Copy;

    fn enable(&mut self, channel: Self::Channel);
    fn disable(&mut self, channel: Self::Channel);
    fn get_max_duty(&self) -> u64;
    fn set_duty(&mut self, channel: Self::Channel, duty_cycle: u64);
}

pub trait DisplayBase {
    fn draw_status(&mut self, ready: bool, version: &str);
    fn alert(&mut self, message: &str);
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
pub struct StatusSnapshot {
    pub initialized: bool,
}

/// Remote status endpoint, fed on every display refresh.
pub trait StatusReporterBase {
    fn report(&mut self, snapshot: StatusSnapshot);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_sign() {
        assert_eq!(Direction::from_sign(0.25), Direction::Positive);
        assert_eq!(Direction::from_sign(-0.25), Direction::Negative);
        assert_eq!(Direction::from_sign(0.0), Direction::Positive);
    }

    #[test]
    fn test_direction_sign() {
        assert_eq!(i8::from(Direction::Positive), 1);
        assert_eq!(f32::from(Direction::Negative), -1.0);
        assert_eq!(Direction::Negative.opposite(), Direction::Positive);
    }

    #[test]
    fn test_axis_index() {
        for (i, axis) in AxisIndex::ALL.iter().enumerate() {
            assert_eq!(axis.index(), i);
        }
        assert!(AxisIndex::Planar1.is_planar());
        assert!(!AxisIndex::Vertical.is_planar());
    }
}
