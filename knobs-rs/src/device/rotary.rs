use super::{Attach, Device, HandlerChain};
use crate::clock::Millis;
use crate::config::HANDLER_CAPACITY;
use crate::error::KnobError;
use crate::handler::{Handler, Sample};
use crate::rotary::Quadrature;

/// A rotary encoder as a device.
///
/// The decoder itself runs in interrupt context; the device only reads
/// its count once per tick, divides it into detents and dispatches
/// `(value, previous value, now)` on every tick. Pair it with a
/// [`DelayedChoice`](crate::handler::DelayedChoice) to get one event per
/// burst of turning.
pub struct Rotary<'a, const N: usize = HANDLER_CAPACITY> {
    name: &'static str,
    quadrature: &'a Quadrature,
    div: i32,
    invert: bool,
    last_value: i32,
    chain: HandlerChain<'a, N>,
}

impl<'a, const N: usize> Rotary<'a, N> {
    /// `div` raw steps make one reported step (4 for most detented
    /// encoders). Values below 1 are treated as 1.
    pub fn new(name: &'static str, quadrature: &'a Quadrature, div: i32) -> Self {
        Self {
            name,
            quadrature,
            div: div.max(1),
            invert: false,
            last_value: 0,
            chain: HandlerChain::new(),
        }
    }

    /// Report the opposite direction.
    pub fn invert(&mut self, invert: bool) -> &mut Self {
        self.invert = invert;
        self
    }

    pub fn enslave(&mut self, slave: &'a mut dyn Device) -> &mut Self {
        self.chain.enslave(slave);
        self
    }

    pub fn handlers(&self) -> &[Handler<'a>] {
        self.chain.handlers()
    }
}

impl<'a, const N: usize> Device for Rotary<'a, N> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn value(&self) -> i32 {
        let value = self.quadrature.count() / self.div;
        if self.invert {
            value.wrapping_neg()
        } else {
            value
        }
    }

    fn tick(&mut self, now: Millis) -> Result<(), KnobError> {
        if self.chain.muted() {
            return Ok(());
        }
        let value = self.value();
        let sample = Sample {
            new: value,
            old: self.last_value,
            time: now,
            now,
        };
        self.last_value = value;
        self.chain.dispatch(self.name, &sample);
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

impl<'a, const N: usize> Attach<'a> for Rotary<'a, N> {
    fn try_on(&mut self, handler: Handler<'a>) -> Result<(), KnobError> {
        self.chain.push(handler)
    }
}

impl<const N: usize> core::fmt::Debug for Rotary<'_, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Rotary")
            .field("name", &self.name)
            .field("div", &self.div)
            .field("invert", &self.invert)
            .field("last_value", &self.last_value)
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::*;
    use crate::handler::Event;
    use crate::rotary::tests::turn;
    use crate::rotary::Phase;

    #[test]
    fn detents_divide_raw_steps() {
        let q = Quadrature::new();
        let rotary: Rotary<'_> = Rotary::new("volume", &q, 4);

        turn(&q, Phase::B, 7);
        assert_eq!(rotary.value(), 7);

        q.reset();
        turn(&q, Phase::A, 7);
        assert_eq!(rotary.value(), -7);
    }

    #[test]
    fn invert_flips_direction() {
        let q = Quadrature::new();
        let mut rotary: Rotary<'_> = Rotary::new("volume", &q, 4);
        rotary.invert(true);
        turn(&q, Phase::B, 2);
        assert_eq!(rotary.value(), -2);
    }

    #[test]
    fn delayed_choice_coalesces_a_burst() {
        let q = Quadrature::new();
        let chosen = Cell::new(None);
        let mut on_choice = |event: &Event| {
            chosen.set(Some(event.new));
            true
        };
        let mut rotary: Rotary<'_> = Rotary::new("volume", &q, 4);
        rotary.on_delayed_choice(&mut on_choice, 200);

        let mut now = 0;
        for _ in 0..3 {
            turn(&q, Phase::B, 1);
            rotary.tick(now).unwrap();
            now += 20;
        }
        assert_eq!(chosen.get(), None);

        while now < 400 {
            rotary.tick(now).unwrap();
            now += 20;
        }
        assert_eq!(chosen.get(), Some(3));
    }

    #[test]
    fn muted_rotary_does_not_dispatch() {
        let q = Quadrature::new();
        let fired = Cell::new(false);
        let mut on_always = |_: &Event| {
            fired.set(true);
            true
        };
        let mut rotary: Rotary<'_> = Rotary::new("volume", &q, 1);
        rotary.on_always(&mut on_always);
        rotary.set_muted(true);
        rotary.tick(0).unwrap();
        assert!(!fired.get());
    }
}
