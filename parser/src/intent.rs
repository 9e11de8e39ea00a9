use common::{AxisIndex, Direction};

/// Everything an input channel can ask of the machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
pub enum Intent {
    FullInit,
    SoftInit,
    MoveToOrigin,
    MoveToMax,
    MoveToCenter,
    JogBegin { axis: AxisIndex, direction: Direction },
    JogEnd { axis: AxisIndex },
    PenHeat,
    PenToggleExtrude,
    PenToggleRetract,
    // percent
    PenSetSpeed(u8),
}
