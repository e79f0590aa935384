use embedded_hal::digital::InputPin;

use super::{Attach, Device, HandlerChain};
use crate::clock::{elapsed, Millis};
use crate::config::{KnobConfig, HANDLER_CAPACITY};
use crate::error::KnobError;
use crate::handler::{Handler, Sample};

/// A debounced digital input.
///
/// Each tick the raw level moves a debounce counter toward `0` (off) or
/// the debounce window (on) by the time since the previous tick. The
/// stable value follows only when the counter sits at one of those two
/// bounds, and on those ticks handlers receive
/// `(value, previous value, time unchanged)`.
///
/// Bounces shorter than the window never reach a bound, so they are
/// invisible to handlers. Tick well under the window (every few ms).
pub struct Knob<'a, P: InputPin, const N: usize = HANDLER_CAPACITY> {
    name: &'static str,
    pin: P,
    invert: bool,
    time_debounce: Millis,
    count_debounce: Millis,
    value: bool,
    time_unchanged: Millis,
    last_time: Option<Millis>,
    chain: HandlerChain<'a, N>,
}

impl<'a, P: InputPin, const N: usize> Knob<'a, P, N> {
    pub fn new(name: &'static str, pin: P) -> Self {
        Self::with_config(name, pin, KnobConfig::default())
    }

    pub fn with_config(name: &'static str, pin: P, config: KnobConfig) -> Self {
        Self {
            name,
            pin,
            invert: config.invert,
            time_debounce: config.debounce_ms,
            count_debounce: 0,
            value: false,
            time_unchanged: 0,
            last_time: None,
            chain: HandlerChain::new(),
        }
    }

    /// Set the debounce window. `0` accepts every raw sample.
    pub fn debounce(&mut self, ms: Millis) -> &mut Self {
        self.time_debounce = ms;
        self.count_debounce = self.count_debounce.min(ms);
        self
    }

    /// Treat a low pin as "on".
    pub fn invert(&mut self, invert: bool) -> &mut Self {
        self.invert = invert;
        self
    }

    /// Stable, debounced state.
    pub fn is_on(&self) -> bool {
        self.value
    }

    /// Mirror every activation to `slave`.
    pub fn enslave(&mut self, slave: &'a mut dyn Device) -> &mut Self {
        self.chain.enslave(slave);
        self
    }

    pub fn handlers(&self) -> &[Handler<'a>] {
        self.chain.handlers()
    }

    fn read(&mut self) -> Result<bool, KnobError> {
        let high = self.pin.is_high().map_err(KnobError::pin)?;
        Ok(high != self.invert)
    }

    fn step(&mut self, raw: bool, now: Millis) {
        let delta = self.last_time.map_or(0, |last| elapsed(now, last));
        self.last_time = Some(now);

        self.count_debounce = if raw {
            self.count_debounce
                .saturating_add(delta)
                .min(self.time_debounce)
        } else {
            self.count_debounce.saturating_sub(delta)
        };

        let settled = if self.time_debounce == 0 {
            raw
        } else if self.count_debounce == self.time_debounce {
            true
        } else if self.count_debounce == 0 {
            false
        } else {
            return;
        };

        let old = self.value;
        if settled != old {
            self.time_unchanged = 0;
        }
        self.time_unchanged = self.time_unchanged.saturating_add(delta);
        self.value = settled;

        let sample = Sample {
            new: settled as i32,
            old: old as i32,
            time: self.time_unchanged,
            now,
        };
        self.chain.dispatch(self.name, &sample);
    }
}

impl<'a, P: InputPin, const N: usize> Device for Knob<'a, P, N> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn value(&self) -> i32 {
        self.value as i32
    }

    fn tick(&mut self, now: Millis) -> Result<(), KnobError> {
        if self.chain.muted() {
            self.last_time = Some(now);
            return Ok(());
        }
        let raw = self.read()?;
        self.step(raw, now);
        Ok(())
    }

    fn activate(&mut self, sample: &Sample) {
        self.chain.dispatch(self.name, sample);
    }

    fn set_muted(&mut self, muted: bool) {
        self.chain.set_muted(muted);
    }

    fn is_muted(&self) -> bool {
        self.chain.muted()
    }
}

impl<'a, P: InputPin, const N: usize> Attach<'a> for Knob<'a, P, N> {
    fn try_on(&mut self, handler: Handler<'a>) -> Result<(), KnobError> {
        self.chain.push(handler)
    }
}

impl<P: InputPin, const N: usize> core::fmt::Debug for Knob<'_, P, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Knob")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("count_debounce", &self.count_debounce)
            .field("time_unchanged", &self.time_unchanged)
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}
