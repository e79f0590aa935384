//! Stateless edge classifiers and the periodic transport handler.

use super::{Classify, Sample};
use crate::clock::{elapsed, Millis};

/// Fires on every sample.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Always;

impl Classify for Always {
    fn classify(&mut self, s: &Sample, fire: &mut dyn FnMut(i32, i32, Millis) -> bool) -> bool {
        fire(s.new, s.old, s.time)
    }
}

/// Fires on off → on.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Push;

impl Classify for Push {
    fn classify(&mut self, s: &Sample, fire: &mut dyn FnMut(i32, i32, Millis) -> bool) -> bool {
        if s.new != 0 && s.old == 0 {
            return fire(s.new, s.old, s.time);
        }
        true
    }
}

/// Fires on on → off.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Release;

impl Classify for Release {
    fn classify(&mut self, s: &Sample, fire: &mut dyn FnMut(i32, i32, Millis) -> bool) -> bool {
        if s.new == 0 && s.old != 0 {
            return fire(s.new, s.old, s.time);
        }
        true
    }
}

/// Fires on any change of value.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Toggle;

impl Classify for Toggle {
    fn classify(&mut self, s: &Sample, fire: &mut dyn FnMut(i32, i32, Millis) -> bool) -> bool {
        if s.new != s.old {
            return fire(s.new, s.old, s.time);
        }
        true
    }
}

/// Streams while held: fires every `period` ms while the value stays on,
/// and once more when it goes off.
///
/// The press itself only starts the period.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transport {
    period: Millis,
    last_time: Millis,
}

impl Transport {
    pub fn new(period: Millis) -> Self {
        Self {
            period,
            last_time: 0,
        }
    }
}

impl Classify for Transport {
    fn classify(&mut self, s: &Sample, fire: &mut dyn FnMut(i32, i32, Millis) -> bool) -> bool {
        match (s.old != 0, s.new != 0) {
            (false, true) => {
                self.last_time = s.now;
                true
            }
            (true, true) if elapsed(s.now, self.last_time) >= self.period => {
                self.last_time = s.now;
                fire(s.new, s.old, s.time)
            }
            (true, false) => fire(s.new, s.old, s.time),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(new: i32, old: i32, now: Millis) -> Sample {
        Sample { new, old, time: 0, now }
    }

    fn count_fires(kind: &mut impl Classify, samples: &[Sample]) -> usize {
        let mut fired = 0;
        for s in samples {
            kind.classify(s, &mut |_, _, _| {
                fired += 1;
                true
            });
        }
        fired
    }

    #[test]
    fn always_fires_every_sample() {
        let samples = [sample(0, 0, 0), sample(0, 0, 10), sample(1, 0, 20)];
        assert_eq!(count_fires(&mut Always, &samples), 3);
    }

    #[test]
    fn push_and_release_are_edge_triggered() {
        let samples = [
            sample(0, 0, 0),
            sample(1, 0, 10),
            sample(1, 1, 20),
            sample(0, 1, 30),
            sample(0, 0, 40),
        ];
        assert_eq!(count_fires(&mut Push, &samples), 1);
        assert_eq!(count_fires(&mut Release, &samples), 1);
        assert_eq!(count_fires(&mut Toggle, &samples), 2);
    }

    #[test]
    fn transport_streams_while_held_and_once_on_release() {
        let mut transport = Transport::new(100);
        let mut samples = [sample(0, 0, 0); 32];
        samples[0] = sample(1, 0, 0);
        for (i, s) in samples.iter_mut().enumerate().skip(1).take(30) {
            // held from t=10 to t=300 in 10 ms steps
            *s = sample(1, 1, i as Millis * 10);
        }
        samples[31] = sample(0, 1, 310);

        // 100, 200, 300 while held, then the release
        assert_eq!(count_fires(&mut transport, &samples), 4);
    }

    #[test]
    fn transport_ignores_idle_samples() {
        let mut transport = Transport::new(10);
        assert_eq!(count_fires(&mut transport, &[sample(0, 0, 0), sample(0, 0, 50)]), 0);
    }
}
