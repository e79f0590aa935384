use super::{Classify, Sample};
use crate::clock::{elapsed, Millis};

/// Coalesces a burst of changes into one event.
///
/// Every change adds `new - old` to a running sum. Once no change has
/// arrived for more than `delay` ms the sum is reported as `new` (with
/// `old` of `0`) and cleared. Pairs naturally with a rotary encoder.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DelayedChoice {
    delay: Millis,
    last_time: Millis,
    sum: i32,
}

impl DelayedChoice {
    pub fn new(delay: Millis) -> Self {
        Self {
            delay,
            last_time: 0,
            sum: 0,
        }
    }

    /// Accumulated, not yet reported, movement.
    pub fn pending(&self) -> i32 {
        self.sum
    }
}

impl Classify for DelayedChoice {
    fn classify(&mut self, s: &Sample, fire: &mut dyn FnMut(i32, i32, Millis) -> bool) -> bool {
        let diff = s.new.wrapping_sub(s.old);
        if diff != 0 {
            self.sum = self.sum.wrapping_add(diff);
            self.last_time = s.now;
            return true;
        }
        if self.sum != 0 && elapsed(s.now, self.last_time) > self.delay {
            let sum = self.sum;
            self.sum = 0;
            return fire(sum, 0, s.time);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_is_reported_once_after_quiet_period() {
        let mut choice = DelayedChoice::new(200);
        let steps = [(0, 0), (1, 10), (2, 20), (3, 30), (3, 100), (3, 230), (3, 300), (3, 400)];

        let mut reported = None;
        let mut count = 0;
        let mut old = 0;
        for (new, now) in steps {
            choice.classify(&Sample { new, old, time: now, now }, &mut |sum: i32, _, _| {
                reported = Some(sum);
                count += 1;
                true
            });
            old = new;
        }
        assert_eq!((reported, count), (Some(3), 1));
        assert_eq!(choice.pending(), 0);
    }

    #[test]
    fn reverse_motion_cancels_out() {
        let mut choice = DelayedChoice::new(50);
        let mut fired = false;
        let mut fire = |_: i32, _: i32, _: Millis| {
            fired = true;
            true
        };
        choice.classify(&Sample { new: 2, old: 0, time: 0, now: 0 }, &mut fire);
        choice.classify(&Sample { new: 0, old: 2, time: 0, now: 10 }, &mut fire);
        choice.classify(&Sample { new: 0, old: 0, time: 0, now: 100 }, &mut fire);
        assert!(!fired);
    }
}
