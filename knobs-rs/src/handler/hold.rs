use super::{Classify, Sample};
use crate::clock::Millis;

/// Fires once the value has been on for `time_hold` ms.
///
/// Fires once per "on" span unless `continues` is set, in which case it
/// fires on every qualifying sample. The release that ends a reported hold
/// returns `false`, so a click handler attached after it does not also
/// see that press.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Hold {
    time_hold: Millis,
    continues: bool,
    has_sent: bool,
}

impl Hold {
    pub fn new(time_hold: Millis) -> Self {
        Self {
            time_hold,
            continues: false,
            has_sent: false,
        }
    }

    /// Keep firing on every sample past `time_hold`.
    pub fn continues(mut self, continues: bool) -> Self {
        self.continues = continues;
        self
    }
}

impl Classify for Hold {
    fn classify(&mut self, s: &Sample, fire: &mut dyn FnMut(i32, i32, Millis) -> bool) -> bool {
        if s.new == 0 {
            let veto = self.has_sent && s.old != 0;
            self.has_sent = false;
            return !veto;
        }
        if s.time >= self.time_hold && (!self.has_sent || self.continues) {
            self.has_sent = true;
            return fire(s.new, s.old, s.time);
        }
        true
    }
}
