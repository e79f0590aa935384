//! Handler family: stateful classifiers turning a device's value stream
//! into discrete events.
//!
//! A device hands every committed sample to its handlers in attachment
//! order. Each [`Handler`] pairs one classifier (click, hold, threshold,
//! ...) with one callback. The classifier decides from its private timers
//! and counters whether the sample completes its pattern; if so the
//! callback receives an [`Event`] and its return value becomes the
//! handler's continuation flag. Returning `false` stops later handlers on
//! the same device for that tick.
//!
//! ```text
//! Knob ──Sample──▶ [Push] ──▶ [Hold] ──▶ [Click] ──▶ slave
//!                     │          │           │
//!                   Event      Event       Event
//! ```

mod click;
mod delayed;
mod edge;
mod hold;
mod threshold;

pub use click::{Click, DoubleClick, MultiClick};
pub use delayed::DelayedChoice;
pub use edge::{Always, Push, Release, Toggle, Transport};
pub use hold::Hold;
pub use threshold::{Hysteresis, Over, SlowAveragingHysteresis, Under};

use crate::clock::Millis;

/// One committed value from a device, as seen by its handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    /// Value after this tick.
    pub new: i32,
    /// Value before this tick.
    pub old: i32,
    /// Device-specific duration: time unchanged for knobs, time since the
    /// previous activation for levers, the clock reading for rotaries.
    pub time: Millis,
    /// Clock reading of the tick.
    pub now: Millis,
}

/// Which classifier produced an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandlerType {
    Always,
    Push,
    Release,
    Toggle,
    Transport,
    Hold,
    Click,
    DoubleClick,
    MultiClick,
    Over,
    Under,
    Hysteresis,
    SlowAveragingHysteresis,
    DelayedChoice,
}

/// What a callback receives when its handler fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Event {
    /// Name of the device that dispatched the sample.
    pub device: &'static str,
    /// Classifier that fired.
    pub handler: HandlerType,
    /// Reported new state. Usually the sample value; some classifiers
    /// report synthetic states (click counts, 0/1, accumulated deltas).
    pub new: i32,
    /// Reported old state.
    pub old: i32,
    /// Reported duration.
    pub time: Millis,
}

/// User callback. The return value is the handler's continuation flag.
pub type Callback<'a> = &'a mut dyn FnMut(&Event) -> bool;

/// Classifier contract shared by every handler kind.
///
/// `fire(new, old, time)` invokes the user callback and returns its
/// continuation flag. A classifier that does not fire returns `true`
/// unless it deliberately vetoes later handlers.
pub(crate) trait Classify {
    fn classify(&mut self, sample: &Sample, fire: &mut dyn FnMut(i32, i32, Millis) -> bool)
        -> bool;
}

/// The classifier half of a [`Handler`].
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandlerKind {
    Always(Always),
    Push(Push),
    Release(Release),
    Toggle(Toggle),
    Transport(Transport),
    Hold(Hold),
    Click(Click),
    DoubleClick(DoubleClick),
    MultiClick(MultiClick),
    Over(Over),
    Under(Under),
    Hysteresis(Hysteresis),
    SlowAveragingHysteresis(SlowAveragingHysteresis),
    DelayedChoice(DelayedChoice),
}

macro_rules! handler_kinds {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for HandlerKind {
                fn from(kind: $variant) -> Self {
                    HandlerKind::$variant(kind)
                }
            }
        )*

        impl HandlerKind {
            /// Tag reported in [`Event::handler`].
            pub fn handler_type(&self) -> HandlerType {
                match self {
                    $(HandlerKind::$variant(_) => HandlerType::$variant,)*
                }
            }

            fn classify(
                &mut self,
                sample: &Sample,
                fire: &mut dyn FnMut(i32, i32, Millis) -> bool,
            ) -> bool {
                match self {
                    $(HandlerKind::$variant(kind) => kind.classify(sample, fire),)*
                }
            }
        }
    };
}

handler_kinds!(
    Always,
    Push,
    Release,
    Toggle,
    Transport,
    Hold,
    Click,
    DoubleClick,
    MultiClick,
    Over,
    Under,
    Hysteresis,
    SlowAveragingHysteresis,
    DelayedChoice,
);

/// A classifier bound to its callback.
///
/// # Example
///
/// ```
/// use knobs::handler::{Click, Event, Handler, Sample};
///
/// let mut clicks = 0;
/// let mut on_click = |_: &Event| {
///     clicks += 1;
///     true
/// };
/// let mut handler = Handler::new(Click::new(250), &mut on_click);
///
/// handler.handle("button", &Sample { new: 1, old: 0, time: 0, now: 1_000 });
/// handler.handle("button", &Sample { new: 0, old: 1, time: 0, now: 1_100 });
/// drop(handler);
/// assert_eq!(clicks, 1);
/// ```
pub struct Handler<'a> {
    kind: HandlerKind,
    callback: Callback<'a>,
}

impl<'a> Handler<'a> {
    /// Bind a classifier to a callback.
    pub fn new(kind: impl Into<HandlerKind>, callback: Callback<'a>) -> Self {
        Self {
            kind: kind.into(),
            callback,
        }
    }

    /// The classifier and its current state.
    pub fn kind(&self) -> &HandlerKind {
        &self.kind
    }

    /// Tag reported in events from this handler.
    pub fn handler_type(&self) -> HandlerType {
        self.kind.handler_type()
    }

    /// Feed one sample. Returns `false` to stop later handlers.
    pub fn handle(&mut self, device: &'static str, sample: &Sample) -> bool {
        let Handler { kind, callback } = self;
        let handler = kind.handler_type();
        let mut fire = |new: i32, old: i32, time: Millis| {
            (*callback)(&Event {
                device,
                handler,
                new,
                old,
                time,
            })
        };
        kind.classify(sample, &mut fire)
    }
}

impl core::fmt::Debug for Handler<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Handler").field("kind", &self.kind).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_reports_device_and_type() {
        let mut seen = None;
        let mut callback = |event: &Event| {
            seen = Some(*event);
            true
        };
        let mut handler = Handler::new(Push, &mut callback);
        assert_eq!(handler.handler_type(), HandlerType::Push);

        let cont = handler.handle("door", &Sample { new: 1, old: 0, time: 7, now: 100 });
        assert!(cont);
        drop(handler);

        assert_eq!(
            seen,
            Some(Event {
                device: "door",
                handler: HandlerType::Push,
                new: 1,
                old: 0,
                time: 7,
            })
        );
    }

    #[test]
    fn callback_result_is_continuation_flag() {
        let mut callback = |_: &Event| false;
        let mut handler = Handler::new(Always, &mut callback);
        assert!(!handler.handle("x", &Sample { new: 0, old: 0, time: 0, now: 0 }));
    }

    #[test]
    fn non_firing_handler_continues() {
        let mut callback = |_: &Event| false;
        let mut handler = Handler::new(Release, &mut callback);
        assert!(handler.handle("x", &Sample { new: 1, old: 0, time: 0, now: 0 }));
    }
}
