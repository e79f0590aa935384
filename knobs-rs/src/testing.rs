//! In-memory pins, ADC and clock for unit tests.

use core::cell::Cell;
use core::convert::Infallible;

use embedded_hal::digital::{ErrorKind, ErrorType, InputPin, OutputPin};

use crate::clock::{Clock, Millis};
use crate::hal::{AnalogChannel, Direction, ValvePin};

/// A digital line shared between the code under test and the test body.
///
/// Pin traits are implemented for `&FakeLine`, so a test keeps the line
/// and hands out references.
#[derive(Debug)]
pub(crate) struct FakeLine {
    level: Cell<bool>,
    direction: Cell<Direction>,
}

impl FakeLine {
    pub(crate) fn new() -> Self {
        Self {
            level: Cell::new(false),
            direction: Cell::new(Direction::Input),
        }
    }

    pub(crate) fn set(&self, high: bool) {
        self.level.set(high);
    }

    pub(crate) fn is_set(&self) -> bool {
        self.level.get()
    }

    pub(crate) fn direction(&self) -> Direction {
        self.direction.get()
    }
}

impl ErrorType for &FakeLine {
    type Error = Infallible;
}

impl InputPin for &FakeLine {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.level.get())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.level.get())
    }
}

impl OutputPin for &FakeLine {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.level.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.level.set(true);
        Ok(())
    }
}

impl ValvePin for &FakeLine {
    fn set_direction(&mut self, direction: Direction) -> Result<(), Infallible> {
        self.direction.set(direction);
        Ok(())
    }
}

/// A pin whose every operation fails.
#[derive(Debug)]
pub(crate) struct BrokenPin;

impl ErrorType for BrokenPin {
    type Error = ErrorKind;
}

impl InputPin for BrokenPin {
    fn is_high(&mut self) -> Result<bool, ErrorKind> {
        Err(ErrorKind::Other)
    }

    fn is_low(&mut self) -> Result<bool, ErrorKind> {
        Err(ErrorKind::Other)
    }
}

impl OutputPin for BrokenPin {
    fn set_low(&mut self) -> Result<(), ErrorKind> {
        Err(ErrorKind::Other)
    }

    fn set_high(&mut self) -> Result<(), ErrorKind> {
        Err(ErrorKind::Other)
    }
}

impl ValvePin for BrokenPin {
    fn set_direction(&mut self, _direction: Direction) -> Result<(), ErrorKind> {
        Err(ErrorKind::Other)
    }
}

/// Analog channel returning whatever the test last stored.
#[derive(Debug, Default)]
pub(crate) struct FakeAdc {
    value: Cell<i32>,
    failing: Cell<bool>,
}

impl FakeAdc {
    pub(crate) fn set(&self, value: i32) {
        self.value.set(value);
    }

    pub(crate) fn fail(&self, failing: bool) {
        self.failing.set(failing);
    }
}

impl AnalogChannel for &FakeAdc {
    type Error = ();

    fn read(&mut self) -> Result<i32, ()> {
        if self.failing.get() {
            return Err(());
        }
        Ok(self.value.get())
    }
}

/// Manually advanced clock.
#[derive(Debug, Default)]
pub(crate) struct FakeClock {
    now: Cell<Millis>,
}

impl FakeClock {
    pub(crate) fn at(now: Millis) -> Self {
        Self { now: Cell::new(now) }
    }

    pub(crate) fn advance(&self, ms: Millis) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> Millis {
        self.now.get()
    }
}
