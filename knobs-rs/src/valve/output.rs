use embedded_hal::digital::PinState;

use super::{Buttler, Professor, Switch};
use crate::clock::Millis;
use crate::error::KnobError;
use crate::hal::{Direction, ValvePin};

/// One binary output.
///
/// ```
/// use knobs::valve::{Switch, Valve};
/// use knobs::PushPull;
/// # use core::convert::Infallible;
/// # struct Relay;
/// # impl embedded_hal::digital::ErrorType for Relay { type Error = Infallible; }
/// # impl embedded_hal::digital::OutputPin for Relay {
/// #     fn set_low(&mut self) -> Result<(), Infallible> { Ok(()) }
/// #     fn set_high(&mut self) -> Result<(), Infallible> { Ok(()) }
/// # }
///
/// let mut changes = 0;
/// let mut count = |_: &'static str, _: bool, _: bool| changes += 1;
///
/// let mut pump = Valve::new("pump", PushPull(Relay)).invert(true).direct(&mut count);
/// pump.begin().unwrap();
/// pump.turn_on().unwrap();
/// pump.set_active(false, true).unwrap(); // silent
/// assert!(!pump.active());
/// drop(pump);
/// assert_eq!(changes, 1);
/// ```
pub struct Valve<'a, P: ValvePin> {
    name: &'static str,
    pin: P,
    active: bool,
    stored: bool,
    invert: bool,
    open_drain: bool,
    muted: bool,
    locked: bool,
    slave: Option<&'a mut dyn Switch>,
    professor: Option<&'a mut dyn Professor>,
    buttler: Option<&'a mut dyn Buttler>,
}

impl<'a, P: ValvePin> Valve<'a, P> {
    /// A valve that starts off. Call [`begin`](Switch::begin) before use
    /// to configure the pin.
    pub fn new(name: &'static str, pin: P) -> Self {
        Self {
            name,
            pin,
            active: false,
            stored: false,
            invert: false,
            open_drain: false,
            muted: false,
            locked: false,
            slave: None,
            professor: None,
            buttler: None,
        }
    }

    /// Drive the pin low for "on".
    pub fn invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    /// Float the pin (input) whenever it would be driven low.
    pub fn open_drain(mut self, open_drain: bool) -> Self {
        self.open_drain = open_drain;
        self
    }

    /// Forward every committed change to `slave`.
    pub fn enslave(mut self, slave: &'a mut dyn Switch) -> Self {
        self.slave = Some(slave);
        self
    }

    /// Let `professor` decide on changes.
    pub fn handover(mut self, professor: &'a mut dyn Professor) -> Self {
        self.professor = Some(professor);
        self
    }

    /// Report changes to `buttler`.
    pub fn direct(mut self, buttler: &'a mut dyn Buttler) -> Self {
        self.buttler = Some(buttler);
        self
    }

    /// Give the pin back.
    pub fn release(self) -> P {
        self.pin
    }

    fn drive(&mut self, on: bool) -> Result<(), KnobError> {
        let high = on != self.invert;
        if self.open_drain {
            let direction = if high {
                Direction::Output
            } else {
                Direction::Input
            };
            self.pin.set_direction(direction).map_err(KnobError::pin)?;
        }
        self.pin
            .set_state(PinState::from(high))
            .map_err(KnobError::pin)
    }
}

impl<P: ValvePin> Switch for Valve<'_, P> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, on: bool, silent: bool) -> Result<(), KnobError> {
        if self.locked || self.muted {
            #[cfg(feature = "defmt")]
            defmt::debug!("{}: request ignored (locked {}, muted {})", self.name, self.locked, self.muted);
            return Ok(());
        }

        let old = self.active;
        let on = match &mut self.professor {
            Some(professor) => professor.on_change(self.name, old, on),
            None => on,
        };
        // commit only what the pin actually shows
        self.drive(on)?;
        self.active = on;

        let result = match &mut self.slave {
            Some(slave) => slave.set_active(on, silent),
            None => Ok(()),
        };
        if !silent {
            if let Some(buttler) = &mut self.buttler {
                buttler.on_change(self.name, old, on);
            }
        }
        result
    }

    fn store(&mut self) {
        self.stored = self.active;
    }

    fn restore(&mut self) -> Result<(), KnobError> {
        self.set_active(self.stored, false)
    }

    fn mute(&mut self, level: bool) -> Result<(), KnobError> {
        self.muted = true;
        self.drive(level)
    }

    fn unmute(&mut self) -> Result<(), KnobError> {
        if !self.muted {
            return Ok(());
        }
        self.muted = false;
        self.drive(self.active)
    }

    fn muted(&self) -> bool {
        self.muted
    }

    fn lock(&mut self) {
        self.locked = true;
    }

    fn unlock(&mut self) {
        self.locked = false;
    }

    fn locked(&self) -> bool {
        self.locked
    }

    fn begin(&mut self) -> Result<(), KnobError> {
        if !self.open_drain {
            self.pin
                .set_direction(Direction::Output)
                .map_err(KnobError::pin)?;
        }
        self.drive(self.active)
    }

    fn tick(&mut self, now: Millis) -> Result<(), KnobError> {
        let Some(professor) = self.professor.take() else {
            return Ok(());
        };
        let result = professor.on_loop(self, now);
        self.professor = Some(professor);
        result
    }
}

impl<P: ValvePin> core::fmt::Debug for Valve<'_, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Valve")
            .field("name", &self.name)
            .field("active", &self.active)
            .field("invert", &self.invert)
            .field("open_drain", &self.open_drain)
            .field("muted", &self.muted)
            .field("locked", &self.locked)
            .field("slave", &self.slave.as_ref().map(|slave| slave.name()))
            .finish_non_exhaustive()
    }
}
