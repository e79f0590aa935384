//! Input devices: debounced buttons, analog levers, rotary encoders and
//! the panel that ticks them together.
//!
//! Every device owns a [`HandlerChain`]: the handlers attached to it, an
//! optional slave that mirrors its activations, and a mute flag. Devices
//! are ticked by the host with the current clock reading; sampling and
//! handler callbacks run synchronously inside that call.

mod knob;
mod lever;
mod panel;
mod rotary;

pub use knob::Knob;
pub use lever::Lever;
pub use panel::Panel;
pub use rotary::Rotary;

use crate::clock::Millis;
use crate::error::KnobError;
use crate::handler::{
    Always, Callback, Click, DelayedChoice, DoubleClick, Handler, Hold, Hysteresis, MultiClick,
    Over, Push, Release, Sample, SlowAveragingHysteresis, Toggle, Transport, Under,
};

/// A named source of values that can be ticked.
pub trait Device {
    fn name(&self) -> &'static str;

    /// Current committed value.
    fn value(&self) -> i32;

    /// Sample the hardware and dispatch to handlers.
    ///
    /// A muted device keeps its timing bookkeeping current but neither
    /// samples nor dispatches.
    fn tick(&mut self, now: Millis) -> Result<(), KnobError>;

    /// Run this device's handlers on a sample produced elsewhere.
    ///
    /// Used for master → slave mirroring; ignores the mute flag.
    fn activate(&mut self, sample: &Sample);

    fn set_muted(&mut self, muted: bool);

    fn is_muted(&self) -> bool;
}

/// Ordered handlers plus the slave and mute state every device carries.
pub struct HandlerChain<'a, const N: usize> {
    handlers: heapless::Vec<Handler<'a>, N>,
    slave: Option<&'a mut dyn Device>,
    muted: bool,
}

impl<'a, const N: usize> HandlerChain<'a, N> {
    pub const fn new() -> Self {
        Self {
            handlers: heapless::Vec::new(),
            slave: None,
            muted: false,
        }
    }

    /// Append a handler. Fails when the chain is full.
    pub fn push(&mut self, handler: Handler<'a>) -> Result<(), KnobError> {
        self.handlers
            .push(handler)
            .map_err(|_| KnobError::RegistryFull)
    }

    /// Feed `sample` to the handlers in attachment order, stopping at the
    /// first one that returns `false`, then mirror it to the slave.
    pub fn dispatch(&mut self, device: &'static str, sample: &Sample) {
        for handler in self.handlers.iter_mut() {
            if !handler.handle(device, sample) {
                break;
            }
        }
        if let Some(slave) = &mut self.slave {
            slave.activate(sample);
        }
    }

    /// Mirror every future activation to `slave`.
    pub fn enslave(&mut self, slave: &'a mut dyn Device) {
        self.slave = Some(slave);
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn handlers(&self) -> &[Handler<'a>] {
        &self.handlers
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }
}

impl<const N: usize> Default for HandlerChain<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> core::fmt::Debug for HandlerChain<'_, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HandlerChain")
            .field("handlers", &self.handlers)
            .field("slave", &self.slave.as_ref().map(|slave| slave.name()))
            .field("muted", &self.muted)
            .finish()
    }
}

/// Attaching handlers to a device.
///
/// `try_on` reports a full chain; every other method logs and drops the
/// handler instead, so wiring code can chain calls.
///
/// ```
/// use knobs::device::{Attach, Knob};
/// use knobs::handler::Event;
/// # use core::convert::Infallible;
/// # struct Pin;
/// # impl embedded_hal::digital::ErrorType for Pin { type Error = Infallible; }
/// # impl embedded_hal::digital::InputPin for Pin {
/// #     fn is_high(&mut self) -> Result<bool, Infallible> { Ok(false) }
/// #     fn is_low(&mut self) -> Result<bool, Infallible> { Ok(true) }
/// # }
///
/// let mut on_click = |_: &Event| true;
/// let mut on_hold = |_: &Event| true;
///
/// let mut button: Knob<'_, Pin> = Knob::new("button", Pin);
/// button.on_hold(&mut on_hold, 500).on_click(&mut on_click, 250);
/// assert_eq!(button.handlers().len(), 2);
/// ```
pub trait Attach<'a>: Sized {
    /// Append `handler`, failing when the device's chain is full.
    fn try_on(&mut self, handler: Handler<'a>) -> Result<(), KnobError>;

    /// Append `handler`; a full chain drops it.
    fn on(&mut self, handler: Handler<'a>) -> &mut Self {
        if let Err(_e) = self.try_on(handler) {
            #[cfg(feature = "defmt")]
            defmt::warn!("handler dropped: {}", _e);
        }
        self
    }

    fn on_always(&mut self, callback: Callback<'a>) -> &mut Self {
        self.on(Handler::new(Always, callback))
    }

    fn on_push(&mut self, callback: Callback<'a>) -> &mut Self {
        self.on(Handler::new(Push, callback))
    }

    fn on_release(&mut self, callback: Callback<'a>) -> &mut Self {
        self.on(Handler::new(Release, callback))
    }

    fn on_toggle(&mut self, callback: Callback<'a>) -> &mut Self {
        self.on(Handler::new(Toggle, callback))
    }

    /// Click no longer than `max_time` ms (`0` for unbounded).
    fn on_click(&mut self, callback: Callback<'a>, max_time: Millis) -> &mut Self {
        self.on(Handler::new(Click::new(max_time), callback))
    }

    fn on_double_click(&mut self, callback: Callback<'a>) -> &mut Self {
        self.on(Handler::new(DoubleClick::default(), callback))
    }

    fn on_multi_click(&mut self, callback: Callback<'a>) -> &mut Self {
        self.on(Handler::new(MultiClick::default(), callback))
    }

    fn on_hold(&mut self, callback: Callback<'a>, time: Millis) -> &mut Self {
        self.on(Handler::new(Hold::new(time), callback))
    }

    fn on_transport(&mut self, callback: Callback<'a>, period: Millis) -> &mut Self {
        self.on(Handler::new(Transport::new(period), callback))
    }

    fn on_over(&mut self, callback: Callback<'a>, value: i32) -> &mut Self {
        self.on(Handler::new(Over::new(value), callback))
    }

    fn on_under(&mut self, callback: Callback<'a>, value: i32) -> &mut Self {
        self.on(Handler::new(Under::new(value), callback))
    }

    fn on_hysteresis(&mut self, callback: Callback<'a>, lower: i32, upper: i32) -> &mut Self {
        self.on(Handler::new(Hysteresis::new(lower, upper), callback))
    }

    /// Hysteresis on a smoothed value, evaluated at most once per second.
    fn on_slow_hysteresis(
        &mut self,
        callback: Callback<'a>,
        lower: f32,
        upper: f32,
        averaging: i32,
    ) -> &mut Self {
        self.on(Handler::new(
            SlowAveragingHysteresis::new(lower, upper, averaging),
            callback,
        ))
    }

    fn on_delayed_choice(&mut self, callback: Callback<'a>, delay: Millis) -> &mut Self {
        self.on(Handler::new(DelayedChoice::new(delay), callback))
    }
}
