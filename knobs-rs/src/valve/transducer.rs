use super::Switch;
use crate::clock::{Clock, Millis};
use crate::config::TRANSDUCER_CAPACITY;
use crate::error::KnobError;

/// A group of valves switched together.
///
/// Bit `i` of a mask is the `i`-th valve added; valves past the 32nd are
/// left out of mask operations. Bulk operations visit every valve even
/// when one fails and return the first error.
pub struct Transducer<'a, const N: usize = TRANSDUCER_CAPACITY> {
    name: &'static str,
    valves: heapless::Vec<&'a mut dyn Switch, N>,
}

impl<'a, const N: usize> Transducer<'a, N> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            valves: heapless::Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Append a valve, failing when the transducer is full.
    pub fn add(&mut self, valve: &'a mut dyn Switch) -> Result<(), KnobError> {
        self.valves.push(valve).map_err(|_| {
            #[cfg(feature = "defmt")]
            defmt::warn!("{}: transducer full", self.name);
            KnobError::RegistryFull
        })
    }

    pub fn len(&self) -> usize {
        self.valves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valves.is_empty()
    }

    fn apply(
        &mut self,
        mut f: impl FnMut(&mut dyn Switch) -> Result<(), KnobError>,
    ) -> Result<(), KnobError> {
        let mut result = Ok(());
        for valve in self.valves.iter_mut() {
            if let Err(e) = f(&mut **valve) {
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        result
    }

    // ── Bulk ─────────────────────────────────────────────────────────────

    pub fn set_active(&mut self, on: bool) -> Result<(), KnobError> {
        self.apply(|valve| valve.set_active(on, false))
    }

    pub fn turn_on(&mut self) -> Result<(), KnobError> {
        self.set_active(true)
    }

    pub fn turn_off(&mut self) -> Result<(), KnobError> {
        self.set_active(false)
    }

    /// Toggle every valve individually.
    pub fn toggle(&mut self) -> Result<(), KnobError> {
        self.apply(|valve| valve.toggle().map(|_| ()))
    }

    pub fn store(&mut self) {
        for valve in self.valves.iter_mut() {
            valve.store();
        }
    }

    pub fn restore(&mut self) -> Result<(), KnobError> {
        self.apply(|valve| valve.restore())
    }

    pub fn mute(&mut self, level: bool) -> Result<(), KnobError> {
        self.apply(|valve| valve.mute(level))
    }

    pub fn unmute(&mut self) -> Result<(), KnobError> {
        self.apply(|valve| valve.unmute())
    }

    pub fn lock(&mut self) {
        for valve in self.valves.iter_mut() {
            valve.lock();
        }
    }

    pub fn unlock(&mut self) {
        for valve in self.valves.iter_mut() {
            valve.unlock();
        }
    }

    pub fn begin(&mut self) -> Result<(), KnobError> {
        self.apply(|valve| valve.begin())
    }

    /// Tick every valve's professor.
    pub fn tick(&mut self, now: Millis) -> Result<(), KnobError> {
        self.apply(|valve| valve.tick(now))
    }

    /// Read `clock` once and tick every valve with that reading.
    pub fn poll(&mut self, clock: &impl Clock) -> Result<(), KnobError> {
        self.tick(clock.now_ms())
    }

    // ── Masks ────────────────────────────────────────────────────────────

    pub fn active_mask(&self) -> u32 {
        self.valves
            .iter()
            .take(32)
            .enumerate()
            .filter(|(_, valve)| valve.active())
            .fold(0, |mask, (i, _)| mask | (1 << i))
    }

    /// Request bit `i` of `mask` on valve `i`.
    pub fn set_active_mask(&mut self, mask: u32) -> Result<(), KnobError> {
        let mut result = Ok(());
        for (i, valve) in self.valves.iter_mut().take(32).enumerate() {
            if let Err(e) = valve.set_active(mask & (1 << i) != 0, false) {
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        result
    }

    /// Replace the pattern with `f(pattern)` and store it. With a shift,
    /// this walks a light along a chain of valves.
    pub fn rotate(&mut self, f: fn(u32) -> u32) -> Result<(), KnobError> {
        let mask = f(self.active_mask());
        let result = self.set_active_mask(mask);
        self.store();
        result
    }

    /// A single on/off control for a group.
    ///
    /// If anything is on, turn everything off. Otherwise bring back the
    /// stored pattern, or `f(0)` when nothing was stored.
    pub fn toggle_with(&mut self, f: fn(u32) -> u32) -> Result<(), KnobError> {
        if self.active_mask() != 0 {
            return self.turn_off();
        }
        self.restore()?;
        if self.active_mask() == 0 {
            self.set_active_mask(f(0))?;
        }
        Ok(())
    }

    // ── Access ───────────────────────────────────────────────────────────

    /// First valve whose name starts with `prefix`, so `"hall"` selects
    /// `"hall.light"` but `"hall.light"` does not select `"hall"`.
    pub fn find(&mut self, prefix: &str) -> Option<&mut (dyn Switch + 'a)> {
        self.valves
            .iter_mut()
            .find(|valve| valve.name().starts_with(prefix))
            .map(|valve| &mut **valve)
    }

    /// Run `f` on every valve in order.
    pub fn each(&mut self, mut f: impl FnMut(&mut dyn Switch)) {
        for valve in self.valves.iter_mut() {
            f(&mut **valve);
        }
    }
}

impl<const N: usize> core::fmt::Debug for Transducer<'_, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Transducer")
            .field("name", &self.name)
            .field("valves", &self.valves.len())
            .field("active_mask", &self.active_mask())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{BrokenPin, FakeClock, FakeLine};
    use crate::valve::{TimedProfessor, Valve};

    fn shift_left(mask: u32) -> u32 {
        if mask == 0 || mask & 0b100 != 0 {
            0b001
        } else {
            mask << 1
        }
    }

    #[test]
    fn mask_round_trip() {
        let lines = [FakeLine::new(), FakeLine::new(), FakeLine::new()];
        let [mut a, mut b, mut c] = [
            Valve::new("red", &lines[0]),
            Valve::new("amber", &lines[1]),
            Valve::new("green", &lines[2]),
        ];
        let mut lights: Transducer<'_, 4> = Transducer::new("signal");
        lights.add(&mut a).unwrap();
        lights.add(&mut b).unwrap();
        lights.add(&mut c).unwrap();

        lights.set_active_mask(0b101).unwrap();
        assert_eq!(lights.active_mask(), 0b101);
        drop(lights);
        assert!(lines[0].is_set() && !lines[1].is_set() && lines[2].is_set());
    }

    #[test]
    fn rotate_walks_and_stores() {
        let lines = [FakeLine::new(), FakeLine::new(), FakeLine::new()];
        let [mut a, mut b, mut c] = [
            Valve::new("a", &lines[0]),
            Valve::new("b", &lines[1]),
            Valve::new("c", &lines[2]),
        ];
        let mut chase: Transducer<'_> = Transducer::new("chase");
        chase.add(&mut a).unwrap();
        chase.add(&mut b).unwrap();
        chase.add(&mut c).unwrap();

        let mut seen = [0; 4];
        for step in seen.iter_mut() {
            chase.rotate(shift_left).unwrap();
            *step = chase.active_mask();
        }
        assert_eq!(seen, [0b001, 0b010, 0b100, 0b001]);

        chase.turn_off().unwrap();
        chase.restore().unwrap();
        assert_eq!(chase.active_mask(), 0b001);
    }

    #[test]
    fn toggle_with_restores_or_seeds() {
        let lines = [FakeLine::new(), FakeLine::new()];
        let [mut a, mut b] = [Valve::new("a", &lines[0]), Valve::new("b", &lines[1])];
        let mut group: Transducer<'_> = Transducer::new("group");
        group.add(&mut a).unwrap();
        group.add(&mut b).unwrap();

        // nothing stored yet: seeded by f(0)
        group.toggle_with(shift_left).unwrap();
        assert_eq!(group.active_mask(), 0b01);

        group.set_active_mask(0b10).unwrap();
        group.store();
        group.toggle_with(shift_left).unwrap();
        assert_eq!(group.active_mask(), 0);
        group.toggle_with(shift_left).unwrap();
        assert_eq!(group.active_mask(), 0b10);
    }

    #[test]
    fn find_by_prefix() {
        let lines = [FakeLine::new(), FakeLine::new()];
        let [mut a, mut b] = [
            Valve::new("kitchen.light", &lines[0]),
            Valve::new("hall.light", &lines[1]),
        ];
        let mut house: Transducer<'_> = Transducer::new("house");
        house.add(&mut a).unwrap();
        house.add(&mut b).unwrap();

        let hall = house.find("hall").map(|valve| valve.name());
        assert_eq!(hall, Some("hall.light"));
        assert!(house.find("garage").is_none());
        // a longer query never matches a shorter name
        assert!(house.find("hall.light.main").is_none());

        if let Some(valve) = house.find("kitchen") {
            valve.turn_on().unwrap();
        }
        assert_eq!(house.active_mask(), 0b01);
    }

    #[test]
    fn bulk_mute_lock_and_each() {
        let lines = [FakeLine::new(), FakeLine::new()];
        let [mut a, mut b] = [Valve::new("a", &lines[0]), Valve::new("b", &lines[1])];
        let mut group: Transducer<'_> = Transducer::new("group");
        group.add(&mut a).unwrap();
        group.add(&mut b).unwrap();

        group.mute(true).unwrap();
        group.turn_on().unwrap();
        assert_eq!(group.active_mask(), 0);
        group.unmute().unwrap();

        group.lock();
        group.turn_on().unwrap();
        assert_eq!(group.active_mask(), 0);
        group.unlock();

        group.toggle().unwrap();
        let mut on = 0;
        group.each(|valve| on += valve.active() as u32);
        assert_eq!(on, 2);
    }

    #[test]
    fn failing_valve_does_not_stop_the_rest() {
        let line = FakeLine::new();
        let mut broken = Valve::new("broken", BrokenPin);
        let mut good = Valve::new("good", &line);
        let mut group: Transducer<'_> = Transducer::new("group");
        group.add(&mut broken).unwrap();
        group.add(&mut good).unwrap();

        assert!(group.turn_on().is_err());
        drop(group);
        assert!(line.is_set());
    }

    #[test]
    fn poll_ticks_professors() {
        let clock = FakeClock::at(0);
        let line = FakeLine::new();
        let mut timer = TimedProfessor::new(&clock, 1_000);
        let mut valve = Valve::new("v", &line).handover(&mut timer);
        let mut group: Transducer<'_> = Transducer::new("group");
        group.add(&mut valve).unwrap();

        group.turn_on().unwrap();
        clock.advance(1_000);
        group.poll(&clock).unwrap();
        assert_eq!(group.active_mask(), 0);
    }

    #[test]
    fn full_transducer_rejects_valve() {
        let line = FakeLine::new();
        let mut a = Valve::new("a", &line);
        let mut b = Valve::new("b", &line);
        let mut group: Transducer<'_, 1> = Transducer::new("group");
        assert!(group.add(&mut a).is_ok());
        assert_eq!(group.add(&mut b), Err(KnobError::RegistryFull));
    }
}
