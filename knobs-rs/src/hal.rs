//! Hardware boundary.
//!
//! Digital inputs and outputs use the embedded-hal 1.0 traits directly.
//! This module adds the two pieces embedded-hal 1.0 does not cover: analog
//! sampling and switching an output pin between driving and high impedance.

use embedded_hal::digital::{ErrorType, OutputPin};

/// An analog input channel sampled once per tick.
///
/// Values are in the ADC's native resolution; nothing in the crate assumes
/// a particular range.
pub trait AnalogChannel {
    /// Error returned by a failed conversion.
    type Error: core::fmt::Debug;

    /// Take one sample.
    fn read(&mut self) -> Result<i32, Self::Error>;
}

/// Pin direction for outputs that float when off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// High impedance.
    Input,
    /// Actively driven.
    Output,
}

/// An output pin a [`Valve`](crate::Valve) can drive.
///
/// `set_direction` is only called for valves configured as open drain.
pub trait ValvePin: OutputPin {
    /// Switch the pin between driving and high impedance.
    fn set_direction(&mut self, direction: Direction) -> Result<(), Self::Error>;
}

/// Adapts any push-pull [`OutputPin`] into a [`ValvePin`] whose direction
/// never changes.
///
/// ```
/// use knobs::{PushPull, Switch, Valve};
/// # use core::convert::Infallible;
/// # struct Led;
/// # impl embedded_hal::digital::ErrorType for Led { type Error = Infallible; }
/// # impl embedded_hal::digital::OutputPin for Led {
/// #     fn set_low(&mut self) -> Result<(), Infallible> { Ok(()) }
/// #     fn set_high(&mut self) -> Result<(), Infallible> { Ok(()) }
/// # }
///
/// let valve = Valve::new("led", PushPull(Led));
/// assert!(!valve.active());
/// ```
#[derive(Debug)]
pub struct PushPull<P>(pub P);

impl<P: ErrorType> ErrorType for PushPull<P> {
    type Error = P::Error;
}

impl<P: OutputPin> OutputPin for PushPull<P> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set_low()
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set_high()
    }
}

impl<P: OutputPin> ValvePin for PushPull<P> {
    fn set_direction(&mut self, _direction: Direction) -> Result<(), Self::Error> {
        Ok(())
    }
}
