use super::{Attach, Device, HandlerChain};
use crate::clock::{elapsed, Millis};
use crate::config::{HANDLER_CAPACITY, MODIFIER_CAPACITY};
use crate::error::KnobError;
use crate::hal::AnalogChannel;
use crate::handler::{Handler, Sample};
use crate::modifier::{Modifier, ValueRange};

/// An analog input with a modifier pipeline.
///
/// Each tick takes one sample and runs it through the modifiers. When all
/// of them are ready, handlers receive the result together with the
/// previous activated value and the time since that activation.
///
/// ```
/// use knobs::device::{Attach, Device, Lever};
/// use knobs::hal::AnalogChannel;
/// use knobs::handler::Event;
/// use knobs::modifier::{Average, Transpose};
///
/// struct Pot(i32);
/// impl AnalogChannel for Pot {
///     type Error = ();
///     fn read(&mut self) -> Result<i32, ()> { Ok(self.0) }
/// }
///
/// let mut percent = Transpose::new(0, 100);
/// let mut smooth = Average::new(2);
/// let mut last = 0;
/// let mut on_change = |event: &Event| { last = event.new; true };
///
/// let mut pot: Lever<'_, Pot> = Lever::new("pot", Pot(1023), 0, 1023);
/// pot.modify(&mut percent).modify(&mut smooth).on_always(&mut on_change);
/// pot.tick(0).unwrap();
/// pot.tick(10).unwrap();
/// drop(pot);
/// assert_eq!(last, 100);
/// ```
pub struct Lever<
    'a,
    A: AnalogChannel,
    const N: usize = HANDLER_CAPACITY,
    const M: usize = MODIFIER_CAPACITY,
> {
    name: &'static str,
    channel: A,
    range: ValueRange,
    modifiers: heapless::Vec<&'a mut dyn Modifier, M>,
    value: i32,
    last_time: Option<Millis>,
    chain: HandlerChain<'a, N>,
}

impl<'a, A: AnalogChannel, const N: usize, const M: usize> Lever<'a, A, N, M> {
    /// `min` and `max` describe the raw range of the channel.
    pub fn new(name: &'static str, channel: A, min: i32, max: i32) -> Self {
        Self {
            name,
            channel,
            range: ValueRange { min, max },
            modifiers: heapless::Vec::new(),
            value: 0,
            last_time: None,
            chain: HandlerChain::new(),
        }
    }

    /// Append a modifier, failing when the pipeline is full.
    pub fn modify_with(&mut self, modifier: &'a mut dyn Modifier) -> Result<(), KnobError> {
        self.modifiers
            .push(modifier)
            .map_err(|_| KnobError::RegistryFull)
    }

    /// Append a modifier; a full pipeline drops it.
    pub fn modify(&mut self, modifier: &'a mut dyn Modifier) -> &mut Self {
        if let Err(_e) = self.modify_with(modifier) {
            #[cfg(feature = "defmt")]
            defmt::warn!("{}: modifier dropped: {}", self.name, _e);
        }
        self
    }

    pub fn range(&self) -> ValueRange {
        self.range
    }

    pub fn enslave(&mut self, slave: &'a mut dyn Device) -> &mut Self {
        self.chain.enslave(slave);
        self
    }

    pub fn handlers(&self) -> &[Handler<'a>] {
        self.chain.handlers()
    }

    /// Run `value` through the pipeline. `None` while any stage is
    /// holding back.
    fn condition(&mut self, mut value: i32, now: Millis) -> Option<i32> {
        for modifier in self.modifiers.iter_mut() {
            if !modifier.modify(&self.range, &mut value, now) {
                return None;
            }
        }
        Some(value)
    }
}

impl<'a, A: AnalogChannel, const N: usize, const M: usize> Device for Lever<'a, A, N, M> {
    fn name(&self) -> &'static str {
        self.name
    }

    /// Last activated value.
    fn value(&self) -> i32 {
        self.value
    }

    fn tick(&mut self, now: Millis) -> Result<(), KnobError> {
        if self.chain.muted() {
            return Ok(());
        }
        let raw = self.channel.read().map_err(|_e| {
            #[cfg(feature = "defmt")]
            defmt::warn!("{}: analog read failed: {}", self.name, defmt::Debug2Format(&_e));
            KnobError::Analog
        })?;

        let Some(value) = self.condition(raw, now) else {
            return Ok(());
        };

        let sample = Sample {
            new: value,
            old: self.value,
            time: self.last_time.map_or(0, |last| elapsed(now, last)),
            now,
        };
        self.value = value;
        self.last_time = Some(now);
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

impl<'a, A: AnalogChannel, const N: usize, const M: usize> Attach<'a> for Lever<'a, A, N, M> {
    fn try_on(&mut self, handler: Handler<'a>) -> Result<(), KnobError> {
        self.chain.push(handler)
    }
}

impl<A: AnalogChannel, const N: usize, const M: usize> core::fmt::Debug for Lever<'_, A, N, M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Lever")
            .field("name", &self.name)
            .field("range", &self.range)
            .field("modifiers", &self.modifiers.len())
            .field("value", &self.value)
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::*;
    use crate::handler::Event;
    use crate::modifier::{AcsVariant, RunningAverage, RunningDeviation, Scale, Transpose};
    use crate::testing::FakeAdc;

    #[test]
    fn activation_reports_previous_value_and_interval() {
        let adc = FakeAdc::default();
        let seen = Cell::new(None);
        let mut on_always = |event: &Event| {
            seen.set(Some((event.new, event.old, event.time)));
            true
        };
        let mut lever: Lever<'_, &FakeAdc> = Lever::new("pot", &adc, 0, 1023);
        lever.on_always(&mut on_always);

        adc.set(100);
        lever.tick(1_000).unwrap();
        assert_eq!(seen.get(), Some((100, 0, 0)));
        adc.set(300);
        lever.tick(1_040).unwrap();
        assert_eq!(seen.get(), Some((300, 100, 40)));
        assert_eq!(lever.value(), 300);
    }

    #[test]
    fn unready_modifier_stops_the_tick() {
        let adc = FakeAdc::default();
        let fired = Cell::new(0);
        let mut on_always = |_: &Event| {
            fired.set(fired.get() + 1);
            true
        };
        let mut running = RunningAverage::new(3);
        let mut lever: Lever<'_, &FakeAdc> = Lever::new("pot", &adc, 0, 1023);
        lever.modify(&mut running).on_always(&mut on_always);

        adc.set(500);
        lever.tick(0).unwrap();
        lever.tick(10).unwrap();
        assert_eq!(fired.get(), 0);
        lever.tick(20).unwrap();
        assert_eq!(fired.get(), 1);
        assert_eq!(lever.value(), 500);
    }

    #[test]
    fn modifiers_apply_in_order() {
        let adc = FakeAdc::default();
        let mut percent = Transpose::new(0, 100);
        let mut double = Scale::new(2.0);
        let mut lever: Lever<'_, &FakeAdc> = Lever::new("pot", &adc, 0, 1000);
        lever.modify(&mut percent).modify(&mut double);

        adc.set(500);
        lever.tick(0).unwrap();
        assert_eq!(lever.value(), 100);
    }

    #[test]
    fn current_sensor_pipeline() {
        let adc = FakeAdc::default();
        let mut ripple = RunningDeviation::new(8);
        let mut milliamps = Scale::acs(AcsVariant::X20A);
        let mut lever: Lever<'_, &FakeAdc> = Lever::new("mains", &adc, 0, 2047);
        lever.modify(&mut ripple).modify(&mut milliamps);

        for i in 0..400 {
            adc.set(if i % 2 == 0 { 1_064 } else { 984 });
            lever.tick(i).unwrap();
        }
        // ±40 divisions of ripple, somewhat under 1 A after smoothing lag
        assert!((800..1_000).contains(&lever.value()), "{}", lever.value());
    }

    #[test]
    fn slow_hysteresis_on_a_lever() {
        let adc = FakeAdc::default();
        let states = Cell::new(0);
        let mut on_state = |event: &Event| {
            states.set(event.new);
            true
        };
        let mut lever: Lever<'_, &FakeAdc> = Lever::new("temp", &adc, 0, 1023);
        lever.on_slow_hysteresis(&mut on_state, 200.0, 800.0, 1);

        adc.set(900);
        for now in (0..=1_000).step_by(100) {
            lever.tick(now).unwrap();
        }
        assert_eq!(states.get(), 1);

        adc.set(100);
        for now in (1_100..=2_000).step_by(100) {
            lever.tick(now).unwrap();
        }
        assert_eq!(states.get(), 0);
    }

    #[test]
    fn full_pipeline_rejects_modifier() {
        let adc = FakeAdc::default();
        let mut a = Scale::new(1.0);
        let mut b = Scale::new(1.0);
        let mut lever: Lever<'_, &FakeAdc, 1, 1> = Lever::new("pot", &adc, 0, 1);
        assert!(lever.modify_with(&mut a).is_ok());
        assert_eq!(lever.modify_with(&mut b), Err(KnobError::RegistryFull));
    }

    #[test]
    fn read_failure_skips_tick() {
        let adc = FakeAdc::default();
        let mut lever: Lever<'_, &FakeAdc> = Lever::new("pot", &adc, 0, 1023);
        adc.set(7);
        adc.fail(true);
        assert_eq!(lever.tick(0), Err(KnobError::Analog));
        assert_eq!(lever.value(), 0);
        adc.fail(false);
        assert!(lever.tick(5).is_ok());
        assert_eq!(lever.value(), 7);
    }
}
