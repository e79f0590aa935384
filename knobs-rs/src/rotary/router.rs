use super::{Phase, Quadrature};
use crate::error::KnobError;

#[derive(Debug, Clone, Copy)]
struct Route<'a> {
    pin: u8,
    phase: Phase,
    quadrature: &'a Quadrature,
}

/// Maps interrupt sources to decoder phases.
///
/// The wiring program registers each encoder's two pins once; the GPIO
/// interrupt handler then forwards every edge with the pin's id and new
/// level. Pin ids are whatever the HAL uses to tell interrupt sources
/// apart.
///
/// ```
/// use knobs::rotary::{EdgeRouter, Quadrature};
///
/// static VOLUME: Quadrature = Quadrature::new();
///
/// let mut router: EdgeRouter<'_> = EdgeRouter::new();
/// router.attach(14, 15, &VOLUME).unwrap();
///
/// // inside the GPIO interrupt
/// assert!(router.on_edge(15, false));
/// assert!(!router.on_edge(3, true));
/// assert_eq!(VOLUME.count(), 1);
/// ```
#[derive(Debug)]
pub struct EdgeRouter<'a, const N: usize = 8> {
    routes: heapless::Vec<Route<'a>, N>,
}

impl<'a, const N: usize> EdgeRouter<'a, N> {
    pub const fn new() -> Self {
        Self {
            routes: heapless::Vec::new(),
        }
    }

    /// Route edges of `pin` to one phase of `quadrature`.
    pub fn register(
        &mut self,
        pin: u8,
        phase: Phase,
        quadrature: &'a Quadrature,
    ) -> Result<(), KnobError> {
        self.routes
            .push(Route {
                pin,
                phase,
                quadrature,
            })
            .map_err(|_| KnobError::RegistryFull)
    }

    /// Route both phases of an encoder. Registers nothing unless both fit.
    pub fn attach(
        &mut self,
        pin_a: u8,
        pin_b: u8,
        quadrature: &'a Quadrature,
    ) -> Result<(), KnobError> {
        if N - self.routes.len() < 2 {
            return Err(KnobError::RegistryFull);
        }
        self.register(pin_a, Phase::A, quadrature)?;
        self.register(pin_b, Phase::B, quadrature)
    }

    /// Forward an edge. Returns `false` if no decoder listens on `pin`.
    pub fn on_edge(&self, pin: u8, high: bool) -> bool {
        match self.routes.iter().find(|route| route.pin == pin) {
            Some(route) => {
                route.quadrature.edge(route.phase, high);
                true
            }
            None => {
                #[cfg(feature = "defmt")]
                defmt::debug!("no decoder on pin {}", pin);
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<const N: usize> Default for EdgeRouter<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}
