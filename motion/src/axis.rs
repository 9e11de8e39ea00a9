use common::{AxisIndex, Direction, StepperBase};
#[allow(unused_imports)]
use micromath::F32Ext;

use crate::{MotionError, MoveStart};

/// Share of the last increment under which the remaining distance counts
/// as arrived.
pub const ARRIVAL_TOLERANCE: f32 = 1e-3;

pub struct Axis {
    index: AxisIndex,
    position: f32,
    last_position: f32,
    // crossing made by the last tick of a move that ended before pulsing it
    owed: Option<Direction>,
    target: f32,
    moving: bool,
    max: f32,
    ready: bool,
}

impl Axis {
    pub fn new(index: AxisIndex, max: f32) -> Self {
        Self {
            index,
            position: 0.0,
            last_position: 0.0,
            owed: None,
            target: 0.0,
            moving: false,
            max,
            ready: false,
        }
    }

    pub fn index(&self) -> AxisIndex {
        self.index
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn last_position(&self) -> f32 {
        self.last_position
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn set_max(&mut self, max: f32) {
        self.max = max;
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    pub fn begin_move(&mut self, target: f32) -> Result<MoveStart, MotionError> {
        if !target.is_finite() {
            return Err(MotionError::MoveNotValid);
        }
        if target < 0.0 || target > self.max {
            return Err(MotionError::MoveOutOfBounds);
        }
        // exact comparison: a move to where we already are is never started
        if target == self.position {
            if self.moving {
                self.end_move();
            }
            return Ok(MoveStart::Redundant);
        }

        #[cfg(feature = "defmt-log")]
        defmt::debug!("{}: scrolling {} -> {}", self.index, self.position, target);

        // arrival is judged against this move's direction only
        self.settle();
        self.target = target;
        self.moving = true;
        Ok(MoveStart::Started)
    }

    /// Apply this tick's signed increment.
    ///
    /// The driver only takes whole steps, so a pulse is emitted only when the
    /// previous tick carried the position across an integer boundary.
    pub fn advance<S: StepperBase>(&mut self, delta: f32, io: &mut S) {
        self.flush(io);
        if self.position as i32 != self.last_position as i32 {
            io.step_one_unit(self.index, Direction::from_sign(delta));
        }
        self.last_position = self.position;
        self.position += delta;
    }

    /// The last tick stepped at or past the target in the direction of travel.
    pub fn has_arrived(&self) -> bool {
        (self.last_position < self.position && self.position >= self.target)
            || (self.last_position > self.position && self.position <= self.target)
    }

    /// Within `ARRIVAL_TOLERANCE` of the last increment from the target.
    pub fn is_on_target(&self) -> bool {
        let step = (self.position - self.last_position).abs();
        (self.target - self.position).abs() < ARRIVAL_TOLERANCE * step
    }

    /// Distance left for a scripted move still in progress, 0 otherwise.
    pub fn remaining(&self) -> f32 {
        if !self.moving || self.has_arrived() || self.is_on_target() {
            return 0.0;
        }
        (self.target - self.position).abs()
    }

    pub fn end_move(&mut self) {
        #[cfg(feature = "defmt-log")]
        defmt::debug!("{}: ending scroll at {}", self.index, self.position);

        self.moving = false;
        self.target = self.position;
        self.settle();
    }

    fn settle(&mut self) {
        if self.position as i32 != self.last_position as i32 {
            self.owed = Some(Direction::from_sign(self.position - self.last_position));
        }
        self.last_position = self.position;
    }

    /// Emit the pulse still owed by the last crossing of an ended move.
    pub fn flush<S: StepperBase>(&mut self, io: &mut S) {
        if let Some(direction) = self.owed.take() {
            io.step_one_unit(self.index, direction);
        }
    }

    /// One whole step outside of any move, used while calibrating.
    pub fn step_unit<S: StepperBase>(&mut self, direction: Direction, io: &mut S) {
        io.step_one_unit(self.index, direction);
        self.position += f32::from(direction);
        self.last_position = self.position;
        self.owed = None;
        self.target = self.position;
    }

    /// Declare the current location as the origin.
    pub fn zero(&mut self) {
        self.position = 0.0;
        self.last_position = 0.0;
        self.owed = None;
        self.target = 0.0;
        self.moving = false;
    }
}
