use core::time::Duration;

use common::PwmBase;

use crate::PenError;

pub const MAX_SPEED: u8 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PenConfig {
    /// How long the forward output is held at full duty to warm the pen up.
    pub heat_pulse: Duration,
    /// Extrusion/retraction speed in percent of the maximum duty.
    pub speed: u8,
}

impl Default for PenConfig {
    fn default() -> Self {
        Self {
            heat_pulse: Duration::from_millis(500),
            speed: MAX_SPEED,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
pub enum PenMode {
    Idle,
    Extruding,
    Retracting,
}

/// 3D pen driven by a forward and a backward PWM output.
pub struct PenActuator<P: PwmBase> {
    forward: P::Channel,
    backward: P::Channel,
    mode: PenMode,
    hot: bool,
    heat_remaining: Option<Duration>,
    speed: u8,
    heat_pulse: Duration,
}

impl<P: PwmBase> PenActuator<P> {
    pub fn new(forward: P::Channel, backward: P::Channel, config: PenConfig) -> Self {
        Self {
            forward,
            backward,
            mode: PenMode::Idle,
            hot: false,
            heat_remaining: None,
            speed: config.speed.min(MAX_SPEED),
            heat_pulse: config.heat_pulse,
        }
    }

    pub fn mode(&self) -> PenMode {
        self.mode
    }

    pub fn is_hot(&self) -> bool {
        self.hot
    }

    pub fn is_heating(&self) -> bool {
        self.heat_remaining.is_some()
    }

    pub fn is_extruding(&self) -> bool {
        self.mode == PenMode::Extruding
    }

    pub fn is_retracting(&self) -> bool {
        self.mode == PenMode::Retracting
    }

    pub fn speed(&self) -> u8 {
        self.speed
    }

    /// Start the one-shot heat pulse.
    pub fn heat(&mut self, pwm: &mut P) -> Result<(), PenError> {
        if self.hot {
            return Err(PenError::AlreadyHot);
        }
        self.check_idle()?;

        #[cfg(feature = "defmt-log")]
        defmt::info!("pen: heating for {} ms", self.heat_pulse.as_millis() as u64);

        self.heat_remaining = Some(self.heat_pulse);
        let max = pwm.get_max_duty();
        pwm.set_duty(self.forward, max);
        pwm.enable(self.forward);
        Ok(())
    }

    /// Start extruding, or stop if already extruding.
    pub fn toggle_extrude(&mut self, pwm: &mut P) -> Result<PenMode, PenError> {
        match self.mode {
            PenMode::Retracting => Err(PenError::Retracting),
            PenMode::Extruding => {
                self.stop(pwm);
                Ok(self.mode)
            }
            PenMode::Idle => {
                self.check_idle()?;
                self.start(PenMode::Extruding, pwm);
                Ok(self.mode)
            }
        }
    }

    /// Start retracting, or stop if already retracting.
    pub fn toggle_retract(&mut self, pwm: &mut P) -> Result<PenMode, PenError> {
        match self.mode {
            PenMode::Extruding => Err(PenError::Extruding),
            PenMode::Retracting => {
                self.stop(pwm);
                Ok(self.mode)
            }
            PenMode::Idle => {
                self.check_idle()?;
                self.start(PenMode::Retracting, pwm);
                Ok(self.mode)
            }
        }
    }

    /// Set the speed in percent, applied right away to a running pen.
    pub fn set_speed(&mut self, speed: u8, pwm: &mut P) {
        self.speed = speed.min(MAX_SPEED);

        #[cfg(feature = "defmt-log")]
        defmt::info!("pen: speed {}%", self.speed);

        if let Some(ch) = self.active_channel() {
            pwm.set_duty(ch, self.duty(pwm));
        }
    }

    /// Advance the heat pulse by the elapsed time.
    pub fn update(&mut self, dt: Duration, pwm: &mut P) {
        let Some(remaining) = self.heat_remaining else {
            return;
        };
        let remaining = remaining.saturating_sub(dt);
        if remaining.is_zero() {
            #[cfg(feature = "defmt-log")]
            defmt::info!("pen: hot");

            self.heat_remaining = None;
            self.hot = true;
            pwm.set_duty(self.forward, 0);
            pwm.disable(self.forward);
        } else {
            self.heat_remaining = Some(remaining);
        }
    }

    fn check_idle(&self) -> Result<(), PenError> {
        if self.is_heating() {
            return Err(PenError::Heating);
        }
        match self.mode {
            PenMode::Idle => Ok(()),
            PenMode::Extruding => Err(PenError::Extruding),
            PenMode::Retracting => Err(PenError::Retracting),
        }
    }

    fn active_channel(&self) -> Option<P::Channel> {
        match self.mode {
            PenMode::Idle => None,
            PenMode::Extruding => Some(self.forward),
            PenMode::Retracting => Some(self.backward),
        }
    }

    fn duty(&self, pwm: &P) -> u64 {
        pwm.get_max_duty() * u64::from(self.speed) / u64::from(MAX_SPEED)
    }

    fn start(&mut self, mode: PenMode, pwm: &mut P) {
        #[cfg(feature = "defmt-log")]
        defmt::info!("pen: {}", mode);

        self.mode = mode;
        if let Some(ch) = self.active_channel() {
            pwm.set_duty(ch, self.duty(pwm));
            pwm.enable(ch);
        }
    }

    fn stop(&mut self, pwm: &mut P) {
        if let Some(ch) = self.active_channel() {
            pwm.set_duty(ch, 0);
            pwm.disable(ch);
        }
        self.mode = PenMode::Idle;

        #[cfg(feature = "defmt-log")]
        defmt::info!("pen: idle");
    }
}
