//! Binary outputs and the policies that drive them.
//!
//! A [`Valve`] owns one output pin and keeps it at
//! `invert ? !active : active` unless muted. A [`Professor`] may rewrite
//! each requested change and gets a per-tick hook to act on its own (the
//! [`TimedProfessor`] turns valves off after a hold time); a [`Buttler`]
//! only hears about committed changes. A [`Transducer`] switches many
//! valves at once.

mod output;
mod professor;
mod transducer;

pub use output::Valve;
pub use professor::TimedProfessor;
pub use transducer::Transducer;

use crate::clock::Millis;
use crate::error::KnobError;

/// The operations a [`Valve`] offers, object safe so that slaves,
/// professors and transducers can hold any valve type.
pub trait Switch {
    fn name(&self) -> &'static str;

    /// Logical state, independent of inversion and mute.
    fn active(&self) -> bool;

    /// Request a new state. Ignored while locked or muted; otherwise the
    /// professor (if any) decides the committed state. `silent` skips the
    /// buttler.
    fn set_active(&mut self, on: bool, silent: bool) -> Result<(), KnobError>;

    fn turn_on(&mut self) -> Result<(), KnobError> {
        self.set_active(true, false)
    }

    fn turn_off(&mut self) -> Result<(), KnobError> {
        self.set_active(false, false)
    }

    /// Request the opposite state and return the committed one.
    fn toggle(&mut self) -> Result<bool, KnobError> {
        let on = !self.active();
        self.set_active(on, false)?;
        Ok(self.active())
    }

    /// Remember the current state for [`restore`](Switch::restore).
    fn store(&mut self);

    /// Request the remembered state.
    fn restore(&mut self) -> Result<(), KnobError>;

    /// Drive the pin to `level` (subject to inversion) regardless of the
    /// logical state, and ignore requests until unmuted.
    fn mute(&mut self, level: bool) -> Result<(), KnobError>;

    /// Drive the pin from the logical state again.
    fn unmute(&mut self) -> Result<(), KnobError>;

    fn muted(&self) -> bool;

    /// Ignore requests until unlocked. The pin is left as it is.
    fn lock(&mut self);

    fn unlock(&mut self);

    fn locked(&self) -> bool;

    /// Configure the pin and drive the current state.
    fn begin(&mut self) -> Result<(), KnobError>;

    /// Give the professor its per-tick turn.
    fn tick(&mut self, now: Millis) -> Result<(), KnobError>;
}

/// Policy a valve hands its changes over to.
pub trait Professor {
    /// Called with each requested change; returns the state to commit.
    fn on_change(&mut self, valve: &'static str, old: bool, new: bool) -> bool;

    /// Called on every valve tick. The valve's own professor is detached
    /// during this call, so changes made here are not fed back into
    /// [`on_change`](Professor::on_change).
    fn on_loop(&mut self, _valve: &mut dyn Switch, _now: Millis) -> Result<(), KnobError> {
        Ok(())
    }
}

/// Observer told about committed, non-silent changes.
pub trait Buttler {
    fn on_change(&mut self, valve: &'static str, old: bool, new: bool);
}

impl<F: FnMut(&'static str, bool, bool)> Buttler for F {
    fn on_change(&mut self, valve: &'static str, old: bool, new: bool) {
        self(valve, old, new)
    }
}
