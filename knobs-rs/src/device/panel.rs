use super::Device;
use crate::clock::{Clock, Millis};
use crate::config::PANEL_CAPACITY;
use crate::error::KnobError;

/// A group of devices ticked together.
///
/// ```
/// use knobs::device::{Device, Knob, Panel};
/// # use core::convert::Infallible;
/// # struct Pin;
/// # impl embedded_hal::digital::ErrorType for Pin { type Error = Infallible; }
/// # impl embedded_hal::digital::InputPin for Pin {
/// #     fn is_high(&mut self) -> Result<bool, Infallible> { Ok(true) }
/// #     fn is_low(&mut self) -> Result<bool, Infallible> { Ok(false) }
/// # }
///
/// let mut start: Knob<'_, Pin> = Knob::new("start", Pin);
/// let mut stop: Knob<'_, Pin> = Knob::new("stop", Pin);
///
/// let mut panel: Panel<'_> = Panel::new("front");
/// panel.add(&mut start).unwrap();
/// panel.add(&mut stop).unwrap();
/// panel.tick(0).unwrap();
/// panel.tick(30).unwrap();
/// drop(panel);
/// assert!(start.is_on() && stop.is_on());
/// ```
pub struct Panel<'a, const N: usize = PANEL_CAPACITY> {
    name: &'static str,
    devices: heapless::Vec<&'a mut dyn Device, N>,
}

impl<'a, const N: usize> Panel<'a, N> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            devices: heapless::Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Register a device, failing when the panel is full.
    pub fn add(&mut self, device: &'a mut dyn Device) -> Result<(), KnobError> {
        self.devices.push(device).map_err(|_| {
            #[cfg(feature = "defmt")]
            defmt::warn!("{}: panel full", self.name);
            KnobError::RegistryFull
        })
    }

    /// Tick every device in registration order.
    ///
    /// A failing device does not stop the others; the first error is
    /// returned once all have been ticked.
    pub fn tick(&mut self, now: Millis) -> Result<(), KnobError> {
        let mut result = Ok(());
        for device in self.devices.iter_mut() {
            if let Err(e) = device.tick(now) {
                #[cfg(feature = "defmt")]
                defmt::warn!("{}: tick failed: {}", device.name(), e);
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        result
    }

    /// Read `clock` once and tick every device with that reading.
    pub fn poll(&mut self, clock: &impl Clock) -> Result<(), KnobError> {
        self.tick(clock.now_ms())
    }

    /// Look up a device by name.
    pub fn find(&mut self, name: &str) -> Option<&mut (dyn Device + 'a)> {
        self.devices
            .iter_mut()
            .find(|device| device.name() == name)
            .map(|device| &mut **device)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl<const N: usize> core::fmt::Debug for Panel<'_, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Panel")
            .field("name", &self.name)
            .field("devices", &self.devices.len())
            .finish()
    }
}
