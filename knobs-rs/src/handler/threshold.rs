//! Threshold classifiers for analog and multi-valued devices.

use super::{Classify, Sample};
use crate::clock::{elapsed, Millis};
use crate::config::SLOW_HYSTERESIS_DELAY_MS;

/// Fires when the value rises above `value`.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Over {
    value: i32,
}

impl Over {
    pub fn new(value: i32) -> Self {
        Self { value }
    }
}

impl Classify for Over {
    fn classify(&mut self, s: &Sample, fire: &mut dyn FnMut(i32, i32, Millis) -> bool) -> bool {
        if s.new > self.value && s.old <= self.value {
            return fire(s.new, s.old, s.time);
        }
        true
    }
}

/// Fires when the value falls below `value`.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Under {
    value: i32,
}

impl Under {
    pub fn new(value: i32) -> Self {
        Self { value }
    }
}

impl Classify for Under {
    fn classify(&mut self, s: &Sample, fire: &mut dyn FnMut(i32, i32, Millis) -> bool) -> bool {
        if s.new < self.value && s.old >= self.value {
            return fire(s.new, s.old, s.time);
        }
        true
    }
}

/// Fires when the value rises above `upper` or falls below `lower`.
///
/// Movement inside the band between the two bounds is silent.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Hysteresis {
    lower: i32,
    upper: i32,
}

impl Hysteresis {
    pub fn new(lower: i32, upper: i32) -> Self {
        Self { lower, upper }
    }
}

impl Classify for Hysteresis {
    fn classify(&mut self, s: &Sample, fire: &mut dyn FnMut(i32, i32, Millis) -> bool) -> bool {
        let rising = s.new > self.upper && s.old <= self.upper;
        let falling = s.new < self.lower && s.old >= self.lower;
        if rising || falling {
            return fire(s.new, s.old, s.time);
        }
        true
    }
}

/// Hysteresis over an exponentially smoothed value.
///
/// The average is updated on every sample, but compared against the bounds
/// at most once per second. Crossing `upper` reports `(1, 0)`, crossing
/// `lower` reports `(0, 1)`; each side fires only once until the other is
/// crossed.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlowAveragingHysteresis {
    lower: f32,
    upper: f32,
    averaging: i32,
    delay: Millis,
    average: Option<f32>,
    last_time: Option<Millis>,
    state: bool,
}

impl SlowAveragingHysteresis {
    /// `averaging` is the smoothing weight: each sample moves the average
    /// by `1/averaging` of the difference.
    pub fn new(lower: f32, upper: f32, averaging: i32) -> Self {
        Self {
            lower,
            upper,
            averaging: averaging.max(1),
            delay: SLOW_HYSTERESIS_DELAY_MS,
            average: None,
            last_time: None,
            state: false,
        }
    }

    /// Current smoothed value, once seeded.
    pub fn average(&self) -> Option<f32> {
        self.average
    }

    fn smooth(&mut self, value: i32) -> f32 {
        let n = self.averaging as f32;
        let avg = match self.average {
            Some(avg) => avg * (n - 1.0) / n + value as f32 / n,
            None => value as f32,
        };
        self.average = Some(avg);
        avg
    }
}

impl Classify for SlowAveragingHysteresis {
    fn classify(&mut self, s: &Sample, fire: &mut dyn FnMut(i32, i32, Millis) -> bool) -> bool {
        let avg = self.smooth(s.new);

        let Some(last) = self.last_time else {
            self.last_time = Some(s.now);
            return true;
        };
        if elapsed(s.now, last) < self.delay {
            return true;
        }
        self.last_time = Some(s.now);

        if !self.state && avg > self.upper {
            self.state = true;
            return fire(1, 0, s.time);
        }
        if self.state && avg < self.lower {
            self.state = false;
            return fire(0, 1, s.time);
        }
        true
    }
}
