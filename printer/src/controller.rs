use core::{fmt::Display, fmt::Write, net::Ipv4Addr, time::Duration};

use common::{
    AxisIndex, DisplayBase, PwmBase, StatusReporterBase, StatusSnapshot, StepperBase, SwitchesBase,
};
use embassy_sync::blocking_mutex::raw::RawMutex;
use heapless::{String, Vec};
use motion::{InitOptions, MotionConfig, MotionCoordinator, MotionError};
use parser::{CommandError, Intent};
use pen::{PenActuator, PenConfig, PenError};

use crate::{
    inbox::Inbox,
    inputs::{ButtonSampler, InputEvent},
    router::{self, Event, RouterState},
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const ALERT_LEN: usize = 64;
pub const MAX_EVENTS_PER_TICK: usize = 8;

static INITIALIZING: &str = "Initializing...";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PrinterConfig {
    pub motion: MotionConfig,
    pub pen: PenConfig,
    /// Only command packets from this address are accepted.
    pub allowed_source: Ipv4Addr,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            motion: MotionConfig::default(),
            pen: PenConfig::default(),
            allowed_source: Ipv4Addr::new(128, 199, 7, 114),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
pub enum PrinterEvent {
    Command(CommandError),
    Motion(MotionError),
    Pen(PenError),
}

impl Display for PrinterEvent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self {
            PrinterEvent::Command(error) => core::write!(f, "{}", error),
            PrinterEvent::Motion(error) => core::write!(f, "Motion error: {}", error),
            PrinterEvent::Pen(error) => core::write!(f, "Pen error: {}", error),
        }
    }
}

impl From<CommandError> for PrinterEvent {
    fn from(value: CommandError) -> Self {
        PrinterEvent::Command(value)
    }
}

impl From<MotionError> for PrinterEvent {
    fn from(value: MotionError) -> Self {
        PrinterEvent::Motion(value)
    }
}

impl From<PenError> for PrinterEvent {
    fn from(value: PenError) -> Self {
        PrinterEvent::Pen(value)
    }
}

/// Owns every piece of machine state and the hardware it drives.
pub struct Printer<IO, P, D, R>
where
    IO: StepperBase + SwitchesBase,
    P: PwmBase,
    D: DisplayBase,
    R: StatusReporterBase,
{
    io: IO,
    pwm: P,
    display: D,
    reporter: R,
    motion: MotionCoordinator,
    pen: PenActuator<P>,
    buttons: ButtonSampler,
    allowed_source: Ipv4Addr,
}

impl<IO, P, D, R> Printer<IO, P, D, R>
where
    IO: StepperBase + SwitchesBase,
    P: PwmBase,
    D: DisplayBase,
    R: StatusReporterBase,
{
    pub fn new(
        config: PrinterConfig,
        io: IO,
        pwm: P,
        pen_channels: (P::Channel, P::Channel),
        display: D,
        reporter: R,
    ) -> Self {
        Self {
            io,
            pwm,
            display,
            reporter,
            motion: MotionCoordinator::new(config.motion),
            pen: PenActuator::new(pen_channels.0, pen_channels.1, config.pen),
            buttons: ButtonSampler::new(),
            allowed_source: config.allowed_source,
        }
    }

    pub fn motion(&self) -> &MotionCoordinator {
        &self.motion
    }

    pub fn pen(&self) -> &PenActuator<P> {
        &self.pen
    }

    pub fn io(&self) -> &IO {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut IO {
        &mut self.io
    }

    pub fn pwm(&self) -> &P {
        &self.pwm
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn router_state(&self) -> RouterState {
        RouterState {
            pen_hot: self.pen.is_hot(),
            jog: AxisIndex::ALL.map(|axis| self.motion.jog_direction(axis)),
        }
    }

    /// One control cycle.
    ///
    /// Consumes the pending inputs, applies what they ask for, then advances
    /// the motion and the pen by one step. Returns the errors raised on the
    /// way, all of which have already been reported.
    pub fn tick<M: RawMutex>(
        &mut self,
        inbox: &Inbox<M>,
        dt: Duration,
    ) -> Vec<PrinterEvent, MAX_EVENTS_PER_TICK> {
        let mut events = Vec::new();

        if let Some(code) = inbox.take_ir_code() {
            self.dispatch(Event::Ir(code.as_str()), &mut events);
        }
        if let Some(packet) = inbox.take_packet() {
            self.dispatch(Event::Packet(&packet), &mut events);
        }
        for input in self.buttons.sample(&self.io) {
            match input {
                InputEvent::RefreshPressed => self.refresh_display(),
                input => self.dispatch(Event::Button(input), &mut events),
            }
        }

        self.motion.tick(&mut self.io);
        self.pen.update(dt, &mut self.pwm);

        events
    }

    /// Route one event and apply the resulting intents.
    ///
    /// Stops at the first rejected intent; the ones after it are dropped.
    pub fn handle(&mut self, event: Event) -> Result<(), PrinterEvent> {
        let intents = router::route(&event, &self.router_state(), self.allowed_source)?;
        for intent in intents {
            self.apply(intent)?;
        }
        Ok(())
    }

    pub fn apply(&mut self, intent: Intent) -> Result<(), PrinterEvent> {
        #[cfg(feature = "defmt-log")]
        defmt::info!("applying {}", intent);

        match intent {
            Intent::FullInit => {
                self.display.alert(INITIALIZING);
                let res = self.motion.initialize(InitOptions::default(), &mut self.io);
                self.refresh_display();
                res?;
            }
            Intent::SoftInit => {
                self.motion
                    .initialize(InitOptions { skip_homing: true }, &mut self.io)?;
                self.refresh_display();
            }
            Intent::MoveToOrigin => self.motion.move_to_origin()?,
            Intent::MoveToMax => self.motion.move_to_max()?,
            Intent::MoveToCenter => self.motion.move_to_center()?,
            Intent::JogBegin { axis, direction } => self.motion.jog_begin(axis, direction),
            Intent::JogEnd { axis } => self.motion.jog_end(axis),
            Intent::PenHeat => self.pen.heat(&mut self.pwm)?,
            Intent::PenToggleExtrude => {
                self.pen.toggle_extrude(&mut self.pwm)?;
            }
            Intent::PenToggleRetract => {
                self.pen.toggle_retract(&mut self.pwm)?;
            }
            Intent::PenSetSpeed(speed) => self.pen.set_speed(speed, &mut self.pwm),
        }
        Ok(())
    }

    /// Redraw the status screen and push the status to the reporter.
    pub fn refresh_display(&mut self) {
        let ready = self.motion.all_ready();
        self.display.draw_status(ready, VERSION);
        self.reporter.report(StatusSnapshot { initialized: ready });
    }

    fn dispatch(&mut self, event: Event, events: &mut Vec<PrinterEvent, MAX_EVENTS_PER_TICK>) {
        if let Err(e) = self.handle(event) {
            self.report(e);
            let _ = events.push(e);
        }
    }

    fn report(&mut self, event: PrinterEvent) {
        match event {
            // a rejected pen toggle is routine, keep it off the screen
            PrinterEvent::Pen(_) => {
                #[cfg(feature = "defmt-log")]
                defmt::info!("{}", event);
            }
            _ => {
                #[cfg(feature = "defmt-log")]
                defmt::warn!("{}", event);

                let mut message: String<ALERT_LEN> = String::new();
                // an overlong message is cut, not dropped
                let _ = core::write!(message, "{}", event);
                self.display.alert(&message);
            }
        }
    }
}
