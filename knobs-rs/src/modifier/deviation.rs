//! Spread estimators, for AC-like signals around a drifting centre.

use super::{narrow, round, AverageTime, Modifier, RunningAverage, ValueRange};
use crate::clock::Millis;

/// Half the min-to-max spread around the windowed mean.
///
/// Over each [`AverageTime`] window the raw minimum and maximum are
/// tracked; when the window closes the value becomes
/// `(|max - avg| + |avg - min|) / 2` and both bounds reset.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Deviation {
    average: AverageTime,
    min: i32,
    max: i32,
}

impl Deviation {
    pub fn new(window: Millis) -> Self {
        Self {
            average: AverageTime::new(window),
            min: i32::MAX,
            max: i32::MIN,
        }
    }
}

impl Modifier for Deviation {
    fn modify(&mut self, range: &ValueRange, value: &mut i32, now: Millis) -> bool {
        self.min = self.min.min(*value);
        self.max = self.max.max(*value);

        if !self.average.modify(range, value, now) {
            return false;
        }
        let avg = *value as i64;
        let above = (self.max as i64 - avg).abs();
        let below = (avg - self.min as i64).abs();
        *value = narrow((above + below) / 2);

        self.min = i32::MAX;
        self.max = i32::MIN;
        true
    }
}

/// Exponentially smoothed spread around a [`RunningAverage`].
///
/// Samples below the average pull a "below" bound, samples above pull an
/// "above" bound, both with the same weight as the average. Once the
/// average is ready the value becomes `(|below| + |above|) / 2`.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RunningDeviation {
    average: RunningAverage,
    below: f32,
    above: f32,
}

impl RunningDeviation {
    pub fn new(samples: u32) -> Self {
        Self {
            average: RunningAverage::new(samples),
            below: 0.0,
            above: 0.0,
        }
    }
}

impl Modifier for RunningDeviation {
    fn modify(&mut self, _range: &ValueRange, value: &mut i32, _now: Millis) -> bool {
        let raw = *value as f32;
        let avg = self.average.update(*value);

        let n = self.average.samples() as f32;
        let diff = raw - avg;
        if diff < 0.0 {
            self.below = self.below * (n - 1.0) / n + diff / n;
        } else if diff > 0.0 {
            self.above = self.above * (n - 1.0) / n + diff / n;
        }

        if !self.average.is_ready() {
            return false;
        }
        *value = round((self.below.abs() + self.above.abs()) / 2.0);
        true
    }
}
