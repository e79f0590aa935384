//! Monotonic millisecond time.
//!
//! Every timeout in this crate (debounce window, click window, hold time,
//! auto-off) is re-derived on each tick from a stored start timestamp and
//! the current reading, so nothing here ever sleeps or waits.

/// Milliseconds from a free-running monotonic counter.
///
/// The counter wraps at `u32::MAX` (about 49.7 days); all durations are
/// computed with [`elapsed`].
pub type Millis = u32;

/// Milliseconds elapsed between `last` and `now`, compensating for one
/// wraparound of the counter.
///
/// Equivalent to `now >= last ? now - last : (MAX - last) + now + 1`.
///
/// # Examples
///
/// ```
/// use knobs::clock::elapsed;
///
/// assert_eq!(elapsed(1_250, 1_000), 250);
/// assert_eq!(elapsed(4, u32::MAX - 5), 10);
/// ```
#[inline]
pub fn elapsed(now: Millis, last: Millis) -> Millis {
    now.wrapping_sub(last)
}

/// Source of the current monotonic time.
pub trait Clock {
    /// Current reading of the millisecond counter.
    fn now_ms(&self) -> Millis;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> Millis {
        (**self).now_ms()
    }
}

/// [`Clock`] backed by the Embassy time driver.
///
/// The 64-bit Embassy instant is truncated to the 32-bit wrapping counter
/// the rest of the crate expects.
#[cfg(feature = "embassy")]
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

#[cfg(feature = "embassy")]
impl Clock for EmbassyClock {
    fn now_ms(&self) -> Millis {
        embassy_time::Instant::now().as_millis() as Millis
    }
}
