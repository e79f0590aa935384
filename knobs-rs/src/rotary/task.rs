use core::convert::Infallible;

use embassy_futures::select::{select, Either};
use embedded_hal::digital::InputPin;
use embedded_hal_async::digital::Wait;

use super::{Phase, Quadrature};
use crate::error::KnobError;

/// Feed `quadrature` from two interrupt-capable input pins.
///
/// Primes the decoder with the current levels, then waits for an edge on
/// either phase and applies it. Runs until a pin fails; wrap it in an
/// executor task:
///
/// ```ignore
/// #[embassy_executor::task]
/// async fn volume_task(a: Input<'static>, b: Input<'static>) {
///     let _ = knobs::rotary::watch_quadrature(a, b, &VOLUME).await;
/// }
/// ```
pub async fn watch_quadrature<A, B>(
    mut a: A,
    mut b: B,
    quadrature: &Quadrature,
) -> Result<Infallible, KnobError>
where
    A: Wait + InputPin,
    B: Wait + InputPin,
{
    let a_high = a.is_high().map_err(KnobError::pin)?;
    let b_high = b.is_high().map_err(KnobError::pin)?;
    quadrature.prime(a_high, b_high);

    loop {
        let phase = match select(a.wait_for_any_edge(), b.wait_for_any_edge()).await {
            Either::First(edge) => edge.map(|_| Phase::A).map_err(KnobError::pin)?,
            Either::Second(edge) => edge.map(|_| Phase::B).map_err(KnobError::pin)?,
        };
        let high = match phase {
            Phase::A => a.is_high().map_err(KnobError::pin)?,
            Phase::B => b.is_high().map_err(KnobError::pin)?,
        };
        quadrature.edge(phase, high);
    }
}
