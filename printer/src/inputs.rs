use common::{AxisIndex, Direction, SwitchesBase, AXIS_COUNT};
use heapless::Vec;

/// Every jog button plus the refresh button can change in the same tick.
pub const MAX_INPUT_EVENTS: usize = AXIS_COUNT * 2 + 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
pub enum InputEvent {
    JogPressed { axis: AxisIndex, direction: Direction },
    JogReleased { axis: AxisIndex, direction: Direction },
    RefreshPressed,
}

const DIRECTIONS: [Direction; 2] = [Direction::Positive, Direction::Negative];

/// Turns level-triggered buttons into press/release edges by comparing
/// consecutive samples.
#[derive(Default)]
pub struct ButtonSampler {
    jog: [[bool; 2]; AXIS_COUNT],
    refresh: bool,
}

impl ButtonSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample<S: SwitchesBase>(&mut self, io: &S) -> Vec<InputEvent, MAX_INPUT_EVENTS> {
        let mut events = Vec::new();

        for axis in AxisIndex::ALL {
            for (slot, direction) in DIRECTIONS.into_iter().enumerate() {
                let pressed = io.read_jog_button(axis, direction);
                let was_pressed = core::mem::replace(&mut self.jog[axis.index()][slot], pressed);
                let event = match (was_pressed, pressed) {
                    (false, true) => InputEvent::JogPressed { axis, direction },
                    (true, false) => InputEvent::JogReleased { axis, direction },
                    _ => continue,
                };
                // capacity covers every button
                let _ = events.push(event);
            }
        }

        let refresh = io.read_refresh_button();
        if refresh && !self.refresh {
            let _ = events.push(InputEvent::RefreshPressed);
        }
        self.refresh = refresh;

        events
    }
}
