use common::{AxisIndex, Direction, LimitSide, StepperBase, SwitchesBase, AXIS_COUNT};

use crate::{Axis, MotionError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
pub enum HomingState {
    Idle,
    SeekingMin,
    AtMin,
    SeekingMax,
    AtMax,
    Ready,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
pub enum HomingStrategy {
    /// Seek both limit switches and measure the travel of every axis.
    LimitSwitches,
    /// No switches: drive the planar axes `steps` units toward their minimum
    /// and take the result as origin.
    Rewind { steps: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HomingConfig {
    pub strategy: HomingStrategy,
    /// Steps allowed per seeking phase before giving up.
    pub step_limit: u32,
}

impl Default for HomingConfig {
    fn default() -> Self {
        Self {
            strategy: HomingStrategy::LimitSwitches,
            step_limit: 1000,
        }
    }
}

pub struct Homing {
    state: HomingState,
    triggered: [bool; AXIS_COUNT],
    steps: u32,
    step_limit: u32,
}

impl Homing {
    pub fn new(config: HomingConfig) -> Self {
        Self {
            state: HomingState::Idle,
            triggered: [false; AXIS_COUNT],
            steps: 0,
            step_limit: config.step_limit,
        }
    }

    pub fn state(&self) -> HomingState {
        self.state
    }

    /// Advance the state machine by one iteration.
    ///
    /// Seeking phases issue at most one step per untriggered axis per call.
    pub fn update<I: StepperBase + SwitchesBase>(
        &mut self,
        axes: &mut [Axis; AXIS_COUNT],
        io: &mut I,
    ) -> Result<HomingState, MotionError> {
        match self.state {
            HomingState::Idle => self.enter(HomingState::SeekingMin),
            HomingState::SeekingMin => {
                if self.seek(axes, io, LimitSide::Min)? {
                    self.enter(HomingState::AtMin);
                }
            }
            HomingState::AtMin => self.enter(HomingState::SeekingMax),
            HomingState::SeekingMax => {
                if self.seek(axes, io, LimitSide::Max)? {
                    self.enter(HomingState::AtMax);
                }
            }
            HomingState::AtMax => self.enter(HomingState::Ready),
            HomingState::Ready => {}
        }
        Ok(self.state)
    }

    /// Run to completion. Nothing else is serviced meanwhile.
    pub fn run<I: StepperBase + SwitchesBase>(
        &mut self,
        axes: &mut [Axis; AXIS_COUNT],
        io: &mut I,
    ) -> Result<(), MotionError> {
        while self.update(axes, io)? != HomingState::Ready {}
        Ok(())
    }

    fn enter(&mut self, state: HomingState) {
        #[cfg(feature = "defmt-log")]
        defmt::info!("homing: {} -> {}", self.state, state);

        self.state = state;
        self.triggered = [false; AXIS_COUNT];
        self.steps = 0;
    }

    // returns true once every axis sits on its `side` switch
    fn seek<I: StepperBase + SwitchesBase>(
        &mut self,
        axes: &mut [Axis; AXIS_COUNT],
        io: &mut I,
        side: LimitSide,
    ) -> Result<bool, MotionError> {
        for axis in axes.iter_mut() {
            let i = axis.index().index();
            if self.triggered[i] || !io.read_limit_switch(axis.index(), side) {
                continue;
            }
            match side {
                LimitSide::Min => axis.zero(),
                LimitSide::Max => axis.set_max(axis.position()),
            }
            self.triggered[i] = true;
        }

        if self.triggered.iter().all(|t| *t) {
            return Ok(true);
        }

        if self.steps >= self.step_limit {
            let axis = AxisIndex::ALL
                .into_iter()
                .find(|a| !self.triggered[a.index()])
                .unwrap_or(AxisIndex::Planar0);

            #[cfg(feature = "defmt-log")]
            defmt::error!("homing: {} never reached {}", axis, side);

            return Err(MotionError::HomingFailed {
                axis,
                state: self.state,
            });
        }

        let direction = match side {
            LimitSide::Min => Direction::Negative,
            LimitSide::Max => Direction::Positive,
        };
        for axis in axes.iter_mut() {
            if !self.triggered[axis.index().index()] {
                axis.step_unit(direction, io);
            }
        }
        self.steps += 1;
        Ok(false)
    }
}

/// Drive the planar axes `steps` units toward their minimum, then declare
/// every axis at its origin.
pub fn rewind<S: StepperBase>(axes: &mut [Axis; AXIS_COUNT], steps: u32, io: &mut S) {
    #[cfg(feature = "defmt-log")]
    defmt::info!("homing: rewinding {} steps", steps);

    for _ in 0..steps {
        for axis in axes.iter_mut().filter(|a| a.index().is_planar()) {
            axis.step_unit(Direction::Negative, io);
        }
    }
    for axis in axes.iter_mut() {
        axis.zero();
    }
}
