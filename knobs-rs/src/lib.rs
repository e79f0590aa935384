//! Event classification and output automation for panel controls.
//!
//! This crate turns raw pin readings into discrete events and application
//! intents into correctly sequenced output changes:
//!
//! - [`Knob`], [`Lever`] and [`Rotary`] sample buttons, analog channels
//!   and quadrature encoders. Attached [handlers](handler) classify the
//!   value stream into pushes, clicks, double clicks, holds and threshold
//!   crossings and call back synchronously.
//! - [`Valve`] drives an output pin with inversion, open drain, lock and
//!   mute. A [`TimedProfessor`] switches it off after a hold time with
//!   blinking warnings; a [`Transducer`] switches many valves at once.
//!
//! Everything is `no_std` with fixed-capacity registries and no
//! allocation. Hardware comes in through embedded-hal 1.0 pins, the
//! [`AnalogChannel`] trait and a millisecond [`Clock`].
//!
//! # Quick Start
//!
//! ```ignore
//! use core::cell::Cell;
//!
//! use knobs::clock::EmbassyClock;
//! use knobs::{Attach, Clock, Device, Event, Knob, PushPull, Switch, TimedProfessor, Valve};
//!
//! let mut timer = TimedProfessor::new(EmbassyClock, 120_000);
//! let mut lamp = Valve::new("lamp", PushPull(led)).handover(&mut timer);
//! lamp.begin()?;
//!
//! let request = Cell::new(false);
//! let mut on_click = |_: &Event| { request.set(true); true };
//! let mut button: Knob<'_, _> = Knob::new("button", input);
//! button.invert(true).on_click(&mut on_click, 250);
//!
//! loop {
//!     let now = EmbassyClock.now_ms();
//!     button.tick(now)?;
//!     if request.replace(false) {
//!         lamp.toggle()?;
//!     }
//!     lamp.tick(now)?;
//!     Timer::after(Duration::from_millis(5)).await;
//! }
//! ```
//!
//! # Crate Features
//!
//! - **`defmt`**: [`defmt::Format`] for public types and logging of
//!   dropped registrations, ignored valve requests and auto-off events.
//! - **`embassy`**: [`clock::EmbassyClock`] backed by `embassy-time`.
//! - **`task`**: [`rotary::watch_quadrature`], an async edge watcher for
//!   Embassy GPIO inputs.

#![no_std]

pub mod clock;
pub mod config;
pub mod device;
pub mod error;
pub mod hal;
pub mod handler;
pub mod modifier;
pub mod rotary;
pub mod valve;

#[cfg(test)]
mod testing;

// ── Re-exports for convenience ───────────────────────────────────────────

pub use clock::{Clock, Millis};
pub use config::{KnobConfig, ProfessorConfig};
pub use device::{Attach, Device, Knob, Lever, Panel, Rotary};
pub use error::KnobError;
pub use hal::{AnalogChannel, PushPull, ValvePin};
pub use handler::{Event, HandlerType};
pub use rotary::{EdgeRouter, Quadrature};
pub use valve::{Buttler, Professor, Switch, TimedProfessor, Transducer, Valve};
