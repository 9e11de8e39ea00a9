use common::{AxisIndex, Direction, StepperBase, SwitchesBase, AXIS_COUNT};

use crate::{
    homing::{self, Homing, HomingConfig, HomingStrategy},
    Axis, MotionError, MoveStart,
};

/// Per-tick increment of the leading axis.
pub const UNIT_INCREMENT: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionConfig {
    pub axis_max: [f32; AXIS_COUNT],
    /// Scale the planar increments so diagonal moves end on the same tick.
    pub synchronize_planar: bool,
    pub homing: HomingConfig,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            axis_max: [260.0; AXIS_COUNT],
            synchronize_planar: true,
            homing: HomingConfig::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct InitOptions {
    pub skip_homing: bool,
}

pub struct MotionCoordinator {
    axes: [Axis; AXIS_COUNT],
    jog: [Option<Direction>; AXIS_COUNT],
    config: MotionConfig,
}

impl MotionCoordinator {
    pub fn new(config: MotionConfig) -> Self {
        Self {
            axes: AxisIndex::ALL.map(|i| Axis::new(i, config.axis_max[i.index()])),
            jog: [None; AXIS_COUNT],
            config,
        }
    }

    pub fn axis(&self, index: AxisIndex) -> &Axis {
        &self.axes[index.index()]
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn jog_direction(&self, index: AxisIndex) -> Option<Direction> {
        self.jog[index.index()]
    }

    pub fn all_ready(&self) -> bool {
        self.axes.iter().all(|a| a.is_ready())
    }

    /// No scripted move and no jog in progress.
    pub fn is_idle(&self) -> bool {
        self.axes.iter().all(|a| !a.is_moving()) && self.jog.iter().all(|j| j.is_none())
    }

    pub fn mark_ready(&mut self) {
        for axis in self.axes.iter_mut() {
            axis.set_ready(true);
        }
    }

    /// Start a scripted move, cancelling any jog on the axis.
    pub fn move_to(&mut self, index: AxisIndex, target: f32) -> Result<MoveStart, MotionError> {
        let i = index.index();
        if self.jog[i].take().is_some() {
            self.axes[i].end_move();
        }
        let res = self.axes[i].begin_move(target);

        #[cfg(feature = "defmt-log")]
        if let Ok(MoveStart::Redundant) = res {
            defmt::debug!("{}: already at {}", index, target);
        }

        res
    }

    pub fn move_to_origin(&mut self) -> Result<(), MotionError> {
        self.move_all(|_| 0.0)
    }

    pub fn move_to_max(&mut self) -> Result<(), MotionError> {
        self.move_all(|axis| axis.max())
    }

    pub fn move_to_center(&mut self) -> Result<(), MotionError> {
        self.move_all(|axis| axis.max() / 2.0)
    }

    // every axis gets its move even if an earlier one was rejected
    fn move_all<F: Fn(&Axis) -> f32>(&mut self, target: F) -> Result<(), MotionError> {
        let mut res = Ok(());
        for index in AxisIndex::ALL {
            let t = target(self.axis(index));
            if let Err(e) = self.move_to(index, t) {
                res = res.and(Err(e));
            }
        }
        res
    }

    /// Enter jog mode, cancelling any scripted move on the axis.
    pub fn jog_begin(&mut self, index: AxisIndex, direction: Direction) {
        #[cfg(feature = "defmt-log")]
        defmt::info!("{}: jog {}", index, direction);

        let i = index.index();
        if self.axes[i].is_moving() {
            self.axes[i].end_move();
        }
        self.jog[i] = Some(direction);
    }

    pub fn jog_end(&mut self, index: AxisIndex) {
        let i = index.index();
        if self.jog[i].take().is_some() {
            #[cfg(feature = "defmt-log")]
            defmt::info!("{}: jog end", index);

            self.axes[i].end_move();
        }
    }

    /// Cancel every scripted move and jog.
    pub fn stop_all(&mut self) {
        self.jog = [None; AXIS_COUNT];
        for axis in self.axes.iter_mut() {
            axis.end_move();
        }
    }

    /// Declare the current location the origin of every axis.
    pub fn soft_init(&mut self) {
        self.stop_all();
        for axis in self.axes.iter_mut() {
            axis.zero();
        }
        self.mark_ready();
    }

    /// Calibrate the axes, blocking until done.
    ///
    /// With limit switches the planar axes are then sent to the center of
    /// their travel and the vertical axis to its origin.
    pub fn initialize<I: StepperBase + SwitchesBase>(
        &mut self,
        options: InitOptions,
        io: &mut I,
    ) -> Result<(), MotionError> {
        if options.skip_homing {
            self.soft_init();
            return Ok(());
        }

        self.stop_all();
        for axis in self.axes.iter_mut() {
            axis.set_ready(false);
        }

        match self.config.homing.strategy {
            HomingStrategy::LimitSwitches => {
                let mut homing = Homing::new(self.config.homing);
                homing.run(&mut self.axes, io)?;
                self.mark_ready();
                for index in AxisIndex::ALL {
                    let target = match index {
                        AxisIndex::Vertical => 0.0,
                        _ => self.axis(index).max() / 2.0,
                    };
                    self.move_to(index, target)?;
                }
            }
            HomingStrategy::Rewind { steps } => {
                homing::rewind(&mut self.axes, steps, io);
                self.mark_ready();
            }
        }
        Ok(())
    }

    /// Planar increment magnitudes for this tick.
    pub fn planar_increments(&self) -> (f32, f32) {
        if !self.config.synchronize_planar {
            return (UNIT_INCREMENT, UNIT_INCREMENT);
        }
        proportional_increments(
            self.axes[AxisIndex::Planar0.index()].remaining(),
            self.axes[AxisIndex::Planar1.index()].remaining(),
        )
    }

    /// One control cycle: finish arrived moves, advance the others and
    /// every jogging axis.
    pub fn tick<S: StepperBase>(&mut self, io: &mut S) {
        // both planar magnitudes come from positions before either advances
        let (planar0, planar1) = self.planar_increments();

        for index in AxisIndex::ALL {
            let i = index.index();
            let axis = &mut self.axes[i];
            axis.flush(io);

            if let Some(direction) = self.jog[i] {
                axis.advance(f32::from(direction) * UNIT_INCREMENT, io);
                continue;
            }
            if !axis.is_moving() {
                continue;
            }
            if axis.has_arrived() || axis.is_on_target() {
                axis.end_move();
                axis.flush(io);
                continue;
            }

            let magnitude = match index {
                AxisIndex::Planar0 => planar0,
                AxisIndex::Planar1 => planar1,
                AxisIndex::Vertical => UNIT_INCREMENT,
            };
            let delta = if axis.target() > axis.position() {
                magnitude
            } else {
                -magnitude
            };
            axis.advance(delta, io);
        }
    }
}

/// Increments that bring two planar axes to their targets on the same tick.
///
/// The axis with the longer way to go moves a full unit, the other moves the
/// ratio of the two distances. Never NaN, never above one unit.
pub fn proportional_increments(diff_x: f32, diff_y: f32) -> (f32, f32) {
    if !(diff_x > 0.0 || diff_y > 0.0) {
        return (0.0, 0.0);
    }
    if diff_x >= diff_y {
        (UNIT_INCREMENT, UNIT_INCREMENT * diff_y.max(0.0) / diff_x)
    } else {
        (UNIT_INCREMENT * diff_x.max(0.0) / diff_y, UNIT_INCREMENT)
    }
}
