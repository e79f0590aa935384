use super::{Professor, Switch};
use crate::clock::{elapsed, Clock, Millis};
use crate::config::ProfessorConfig;
use crate::error::KnobError;

/// Turns a valve off `hold_ms` after it was switched on.
///
/// Shortly before expiry it warns by blinking the output off for
/// `warning_pulse_ms`, once at `first_warning_ms` and once at
/// `second_warning_ms` before the end. The blink uses the valve's mute, so
/// the logical state stays on throughout. Timing is polled from the
/// valve's [`tick`](Switch::tick); a late tick only delays the action.
/// Once expired, the switch-off is repeated on every tick until the valve
/// accepts it, so a valve locked at expiry goes off after unlocking.
///
/// ```
/// use knobs::clock::Clock;
/// use knobs::{Switch, TimedProfessor, Valve, PushPull};
/// # use core::convert::Infallible;
/// # struct Lamp;
/// # impl embedded_hal::digital::ErrorType for Lamp { type Error = Infallible; }
/// # impl embedded_hal::digital::OutputPin for Lamp {
/// #     fn set_low(&mut self) -> Result<(), Infallible> { Ok(()) }
/// #     fn set_high(&mut self) -> Result<(), Infallible> { Ok(()) }
/// # }
/// # struct Uptime(u32);
/// # impl Clock for Uptime { fn now_ms(&self) -> u32 { self.0 } }
///
/// let mut timer = TimedProfessor::new(Uptime(0), 60_000);
/// let mut stairs = Valve::new("stairs", PushPull(Lamp)).handover(&mut timer);
/// stairs.turn_on().unwrap();
/// stairs.tick(60_000).unwrap();
/// assert!(!stairs.active());
/// ```
#[derive(Debug)]
pub struct TimedProfessor<C: Clock> {
    clock: C,
    config: ProfessorConfig,
    running: bool,
    start_time: Millis,
}

impl<C: Clock> TimedProfessor<C> {
    /// Default warnings (10 s and 3 s before expiry, 100 ms blinks).
    pub fn new(clock: C, hold_ms: Millis) -> Self {
        Self::with_config(clock, ProfessorConfig::with_hold(hold_ms))
    }

    pub fn with_config(clock: C, config: ProfessorConfig) -> Self {
        Self {
            clock,
            config,
            running: false,
            start_time: 0,
        }
    }

    /// (Re)start the countdown from now.
    pub fn start(&mut self) {
        self.start_time = self.clock.now_ms();
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Restart a running countdown; a stopped one stays stopped.
    pub fn reset(&mut self) {
        if self.running {
            self.start();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn hold_time(&self) -> Millis {
        self.config.hold_ms
    }

    pub fn set_hold_time(&mut self, hold_ms: Millis) {
        self.config.hold_ms = hold_ms;
    }

    /// Time left at `now`, or `None` when not running.
    pub fn remaining(&self, now: Millis) -> Option<Millis> {
        self.running
            .then(|| self.config.hold_ms.saturating_sub(elapsed(now, self.start_time)))
    }
}

impl<C: Clock> Professor for TimedProfessor<C> {
    fn on_change(&mut self, _valve: &'static str, old: bool, new: bool) -> bool {
        if !old && new {
            self.start();
        }
        if old && !new {
            self.stop();
        }
        new
    }

    fn on_loop(&mut self, valve: &mut dyn Switch, now: Millis) -> Result<(), KnobError> {
        if !self.running {
            return Ok(());
        }

        let passed = elapsed(now, self.start_time);
        let hold = self.config.hold_ms;

        if passed >= hold {
            #[cfg(feature = "defmt")]
            defmt::debug!("{}: hold time over", valve.name());
            // a valve caught mid-blink would ignore the request
            if valve.muted() {
                valve.unmute()?;
            }
            let result = valve.set_active(false, false);
            // a locked or failing valve is retried on the next tick
            if !valve.active() {
                self.running = false;
            }
            return result;
        }

        let pulse = self.config.warning_pulse_ms;
        for warning in [self.config.second_warning_ms, self.config.first_warning_ms] {
            if warning == 0 {
                continue;
            }
            if passed > hold.saturating_sub(warning.saturating_sub(pulse)) {
                if valve.muted() {
                    valve.unmute()?;
                }
                return Ok(());
            }
            if passed > hold.saturating_sub(warning) {
                if !valve.muted() {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("{}: {} ms left", valve.name(), hold - passed);
                    valve.mute(false)?;
                }
                return Ok(());
            }
        }
        Ok(())
    }
}
