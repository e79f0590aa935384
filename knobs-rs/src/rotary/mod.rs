//! Interrupt-driven quadrature decoding.
//!
//! A [`Quadrature`] holds the decoder state shared between the edge
//! interrupts (or the async watcher) and the polling side. It is usually
//! a `static`, fed by [`EdgeRouter::on_edge`] from an ISR or by
//! [`watch_quadrature`] from an Embassy task, and read by a
//! [`Rotary`](crate::Rotary) device once per tick.
//!
//! ```text
//!  phase A  ──┐   ┌───┐   ┌──
//!             └───┘   └───┘
//!  phase B  ────┐   ┌───┐   ┌
//!               └───┘   └───┘
//!            A leads: count falls by 4 per cycle
//! ```

mod router;
#[cfg(feature = "task")]
mod task;

pub use router::EdgeRouter;
#[cfg(feature = "task")]
pub use task::watch_quadrature;

use core::cell::Cell;

use critical_section::Mutex;

/// One of the two encoder signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    A,
    B,
}

/// Last recorded level of each phase (`+1` high, `-1` low) and the raw
/// step count.
#[derive(Debug, Clone, Copy)]
struct Phases {
    a: i8,
    b: i8,
    count: i32,
}

/// Quadrature decoder state, safe to update from interrupt context.
///
/// Each edge adds or subtracts the recorded level of the opposite phase.
/// An edge that does not change its phase's recorded level is a duplicate
/// and ignored.
pub struct Quadrature {
    state: Mutex<Cell<Phases>>,
}

impl Quadrature {
    /// Both phases assumed high (pulled up, at rest on a detent).
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(Cell::new(Phases {
                a: 1,
                b: 1,
                count: 0,
            })),
        }
    }

    /// Record the actual levels before the first edge.
    pub fn prime(&self, a_high: bool, b_high: bool) {
        self.update(|p| {
            p.a = level(a_high);
            p.b = level(b_high);
        });
    }

    /// Apply an edge on `phase` that left it at `high`.
    pub fn edge(&self, phase: Phase, high: bool) {
        let new = level(high);
        self.update(|p| match phase {
            Phase::A if p.a != new => {
                p.a = new;
                // rising adds B, falling subtracts it
                p.count = p.count.wrapping_add((p.b * new) as i32);
            }
            Phase::B if p.b != new => {
                p.b = new;
                p.count = p.count.wrapping_sub((p.a * new) as i32);
            }
            _ => {}
        });
    }

    pub fn edge_a(&self, high: bool) {
        self.edge(Phase::A, high);
    }

    pub fn edge_b(&self, high: bool) {
        self.edge(Phase::B, high);
    }

    /// Raw step count.
    pub fn count(&self) -> i32 {
        critical_section::with(|cs| self.state.borrow(cs).get().count)
    }

    pub fn reset(&self) {
        self.update(|p| p.count = 0);
    }

    fn update(&self, f: impl FnOnce(&mut Phases)) {
        critical_section::with(|cs| {
            let cell = self.state.borrow(cs);
            let mut phases = cell.get();
            f(&mut phases);
            cell.set(phases);
        });
    }
}

impl Default for Quadrature {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Quadrature {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Quadrature")
            .field("count", &self.count())
            .finish_non_exhaustive()
    }
}

fn level(high: bool) -> i8 {
    if high {
        1
    } else {
        -1
    }
}
