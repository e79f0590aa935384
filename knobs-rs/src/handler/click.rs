//! Click, double-click and multi-click classifiers.
//!
//! All three share the same press/release detection: a press stamps the
//! clock, and the matching release is a click when it arrives less than
//! `max_time_click` ms later (`0` disables the limit). Double and multi
//! clicks then chain clicks whose gaps stay under `max_time_inbetween`.

use super::{Classify, Sample};
use crate::clock::{elapsed, Millis};
use crate::config::{
    CLICK_GAP_MS, CLICK_MAX_MS, DOUBLE_CLICK_COUNT, DOUBLE_CLICK_MAX_MS, MULTI_CLICK_MAX_MS,
};

/// Fires on off → on → off when the press was short enough.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Click {
    max_time_click: Millis,
    time_start: Option<Millis>,
}

impl Click {
    /// `max_time_click` of `0` accepts presses of any length.
    pub fn new(max_time_click: Millis) -> Self {
        Self {
            max_time_click,
            time_start: None,
        }
    }

    /// Track press and release; returns `true` on the release that
    /// completes a click.
    fn detect(&mut self, s: &Sample) -> bool {
        if s.new == s.old {
            return false;
        }
        if s.new != 0 {
            self.time_start = Some(s.now);
            return false;
        }
        match self.time_start.take() {
            Some(start) => self.max_time_click == 0 || elapsed(s.now, start) < self.max_time_click,
            None => false,
        }
    }
}

impl Default for Click {
    fn default() -> Self {
        Self::new(CLICK_MAX_MS)
    }
}

impl Classify for Click {
    fn classify(&mut self, s: &Sample, fire: &mut dyn FnMut(i32, i32, Millis) -> bool) -> bool {
        if self.detect(s) {
            return fire(s.new, s.old, s.time);
        }
        true
    }
}

/// Fires on the `max_clicks`-th click of a sequence.
///
/// A click more than `max_time_inbetween` ms after the previous one starts
/// a new sequence (and counts as its first click). Once a sequence has
/// fired, further quick clicks are absorbed until such a pause resets it.
/// The event's `time` is the length of the sequence.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DoubleClick {
    click: Click,
    max_time_inbetween: Millis,
    max_clicks: i32,
    clicks: i32,
    time_first_click: Millis,
    time_last_click: Millis,
}

impl DoubleClick {
    pub fn new(max_clicks: i32, max_time_click: Millis, max_time_inbetween: Millis) -> Self {
        Self {
            click: Click::new(max_time_click),
            max_time_inbetween,
            max_clicks: max_clicks.max(1),
            clicks: 0,
            time_first_click: 0,
            time_last_click: 0,
        }
    }

    /// Clicks counted in the current sequence.
    pub fn clicks(&self) -> i32 {
        self.clicks
    }
}

impl Default for DoubleClick {
    fn default() -> Self {
        Self::new(DOUBLE_CLICK_COUNT, DOUBLE_CLICK_MAX_MS, CLICK_GAP_MS)
    }
}

impl Classify for DoubleClick {
    fn classify(&mut self, s: &Sample, fire: &mut dyn FnMut(i32, i32, Millis) -> bool) -> bool {
        if !self.click.detect(s) {
            return true;
        }

        if self.clicks > 0 && elapsed(s.now, self.time_last_click) < self.max_time_inbetween {
            // saturate one past the target so an absorbed sequence stays absorbed
            self.clicks = (self.clicks + 1).min(self.max_clicks + 1);
        } else {
            self.clicks = 1;
            self.time_first_click = s.now;
        }
        self.time_last_click = s.now;

        if self.clicks == self.max_clicks {
            return fire(s.new, s.old, elapsed(s.now, self.time_first_click));
        }
        true
    }
}

/// Fires on every click after the first while gaps stay under
/// `max_time_inbetween`.
///
/// The event reports the running click count as `new` (previous count as
/// `old`) and the gap to the previous click as `time`.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MultiClick {
    click: Click,
    max_time_inbetween: Millis,
    clicks: i32,
    time_last_click: Millis,
}

impl MultiClick {
    pub fn new(max_time_click: Millis, max_time_inbetween: Millis) -> Self {
        Self {
            click: Click::new(max_time_click),
            max_time_inbetween,
            clicks: 0,
            time_last_click: 0,
        }
    }
}

impl Default for MultiClick {
    fn default() -> Self {
        Self::new(MULTI_CLICK_MAX_MS, CLICK_GAP_MS)
    }
}

impl Classify for MultiClick {
    fn classify(&mut self, s: &Sample, fire: &mut dyn FnMut(i32, i32, Millis) -> bool) -> bool {
        if !self.click.detect(s) {
            return true;
        }

        let gap = elapsed(s.now, self.time_last_click);
        self.time_last_click = s.now;

        if self.clicks > 0 && gap < self.max_time_inbetween {
            self.clicks = self.clicks.saturating_add(1);
            return fire(self.clicks, self.clicks - 1, gap);
        }
        self.clicks = 1;
        true
    }
}
