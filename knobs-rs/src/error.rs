//! Error types for knobs devices and valves.

use core::fmt;

use embedded_hal::digital::ErrorKind;

/// Errors surfaced by per-tick entry points and registry attachment.
///
/// Pin errors are reduced to their [`ErrorKind`] so the type stays
/// non-generic and can cross `dyn Device` / `dyn Switch` boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnobError {
    /// A digital pin read, write or direction change failed.
    Pin(ErrorKind),

    /// The analog channel could not be sampled.
    Analog,

    /// A fixed-capacity registry is already full.
    RegistryFull,
}

impl KnobError {
    /// Convert any embedded-hal digital error.
    pub fn pin<E: embedded_hal::digital::Error>(error: E) -> Self {
        KnobError::Pin(error.kind())
    }
}

impl fmt::Display for KnobError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KnobError::Pin(kind) => write!(f, "Pin error: {:?}", kind),
            KnobError::Analog => write!(f, "Analog read failed"),
            KnobError::RegistryFull => write!(f, "Registry is full"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for KnobError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            KnobError::Pin(kind) => defmt::write!(f, "Pin error: {}", kind),
            KnobError::Analog => defmt::write!(f, "Analog read failed"),
            KnobError::RegistryFull => defmt::write!(f, "Registry is full"),
        }
    }
}
