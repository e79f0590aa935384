use super::{narrow, round, Modifier, ValueRange};
use crate::clock::{elapsed, Millis};

/// Block mean of exactly `samples` values.
///
/// Ready on every `samples`-th call, then starts a new block.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Average {
    samples: u32,
    count: u32,
    sum: i64,
}

impl Average {
    pub fn new(samples: u32) -> Self {
        Self {
            samples: samples.max(1),
            count: 0,
            sum: 0,
        }
    }
}

impl Modifier for Average {
    fn modify(&mut self, _range: &ValueRange, value: &mut i32, _now: Millis) -> bool {
        self.sum += *value as i64;
        self.count += 1;
        if self.count < self.samples {
            return false;
        }
        *value = narrow(self.sum / self.count as i64);
        self.sum = 0;
        self.count = 0;
        true
    }
}

/// Mean of every value seen during a `window`-ms interval.
///
/// The first call opens the window; the first call at least `window` ms
/// later closes it, reports the mean (including its own value) and opens
/// the next one.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AverageTime {
    window: Millis,
    start: Option<Millis>,
    sum: i64,
    count: u32,
}

impl AverageTime {
    pub fn new(window: Millis) -> Self {
        Self {
            window,
            start: None,
            sum: 0,
            count: 0,
        }
    }
}

impl Modifier for AverageTime {
    fn modify(&mut self, _range: &ValueRange, value: &mut i32, now: Millis) -> bool {
        let start = *self.start.get_or_insert(now);
        self.sum += *value as i64;
        self.count = self.count.saturating_add(1);

        if elapsed(now, start) < self.window {
            return false;
        }
        *value = narrow(self.sum / self.count as i64);
        self.sum = 0;
        self.count = 0;
        self.start = Some(now);
        true
    }
}

/// Exponential moving average:
/// `avg = avg * (samples - 1) / samples + value / samples`.
///
/// Seeded with the first value. The first `samples - 1` calls are held
/// back while the average settles; from then on every call is ready.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RunningAverage {
    samples: u32,
    count: u32,
    average: Option<f32>,
}

impl RunningAverage {
    pub fn new(samples: u32) -> Self {
        Self {
            samples: samples.max(1),
            count: 0,
            average: None,
        }
    }

    /// Unrounded average so far.
    pub fn average(&self) -> Option<f32> {
        self.average
    }

    pub fn is_ready(&self) -> bool {
        self.count >= self.samples
    }

    pub(crate) fn samples(&self) -> u32 {
        self.samples
    }

    /// Fold one value into the average and return it.
    pub(crate) fn update(&mut self, value: i32) -> f32 {
        let n = self.samples as f32;
        let avg = match self.average {
            Some(avg) => avg * (n - 1.0) / n + value as f32 / n,
            None => value as f32,
        };
        self.average = Some(avg);
        // counter stops at `samples`
        self.count = (self.count + 1).min(self.samples);
        avg
    }
}

impl Modifier for RunningAverage {
    fn modify(&mut self, _range: &ValueRange, value: &mut i32, _now: Millis) -> bool {
        let avg = self.update(*value);
        if !self.is_ready() {
            return false;
        }
        *value = round(avg);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RANGE: ValueRange = ValueRange { min: 0, max: 1023 };

    fn feed(m: &mut impl Modifier, value: i32, now: Millis) -> Option<i32> {
        let mut value = value;
        m.modify(&RANGE, &mut value, now).then_some(value)
    }

    #[test]
    fn average_reports_every_nth_sample() {
        let mut avg = Average::new(4);
        assert_eq!(feed(&mut avg, 10, 0), None);
        assert_eq!(feed(&mut avg, 20, 0), None);
        assert_eq!(feed(&mut avg, 30, 0), None);
        assert_eq!(feed(&mut avg, 40, 0), Some(25));
        // next block starts clean
        assert_eq!(feed(&mut avg, 100, 0), None);
    }

    #[test]
    fn average_time_closes_window_after_interval() {
        let mut avg = AverageTime::new(100);
        assert_eq!(feed(&mut avg, 10, 1_000), None);
        assert_eq!(feed(&mut avg, 20, 1_050), None);
        assert_eq!(feed(&mut avg, 30, 1_100), Some(20));
        assert_eq!(feed(&mut avg, 50, 1_150), None);
        assert_eq!(feed(&mut avg, 70, 1_200), Some(60));
    }

    #[test]
    fn average_time_across_clock_wrap() {
        let mut avg = AverageTime::new(100);
        assert_eq!(feed(&mut avg, 10, u32::MAX - 49), None);
        assert_eq!(feed(&mut avg, 30, 50), Some(20));
    }

    #[test]
    fn running_average_startup_suppression() {
        let mut avg = RunningAverage::new(8);
        for _ in 0..7 {
            assert_eq!(feed(&mut avg, 100, 0), None);
        }
        for _ in 0..20 {
            assert_eq!(feed(&mut avg, 100, 0), Some(100));
        }
    }

    #[test]
    fn running_average_converges_to_constant_input() {
        let mut avg = RunningAverage::new(4);
        feed(&mut avg, 0, 0);
        let mut last = 0;
        for _ in 0..60 {
            if let Some(v) = feed(&mut avg, 400, 0) {
                assert!(v >= last);
                last = v;
            }
        }
        assert_eq!(last, 400);
    }

    #[test]
    fn running_average_of_one_passes_through() {
        let mut avg = RunningAverage::new(1);
        assert_eq!(feed(&mut avg, 5, 0), Some(5));
        assert_eq!(feed(&mut avg, 9, 0), Some(9));
    }
}
