//! Panel demo
//!
//! A push button, a detented rotary encoder and a staircase-style LED on
//! the Raspberry Pi Pico 2:
//!
//! - a click toggles the LED, which switches itself off again after 30 s
//!   (blinking 10 s and 3 s before it does);
//! - holding the button locks or unlocks the LED;
//! - turning the encoder logs the number of detents once it comes to rest.
//!
//! # Wiring
//!
//! | Signal  | Pico 2 Pin | Notes                          |
//! |---------|------------|--------------------------------|
//! | BUTTON  | GP15       | To ground, pull-up enabled     |
//! | ENC A   | GP16       | Pull-up enabled                |
//! | ENC B   | GP17       | Pull-up enabled                |
//! | LED     | GP25       | On-board LED                   |

#![no_std]
#![no_main]

use core::cell::Cell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_time::{Duration, Timer};
use {defmt_rtt as _, panic_probe as _};

use knobs::clock::EmbassyClock;
use knobs::handler::Event;
use knobs::rotary::watch_quadrature;
use knobs::{
    Attach, Clock, Knob, Panel, PushPull, Quadrature, Rotary, Switch, TimedProfessor, Valve,
};

/// Tell the RP2350 Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = embassy_rp::block::ImageDef::secure_exe();

/// Decoder state, fed by `encoder_task` and read by the `Rotary` device.
static VOLUME: Quadrature = Quadrature::new();

/// Poll interval for the panel and the LED's professor.
const TICK: Duration = Duration::from_millis(5);

#[embassy_executor::task]
async fn encoder_task(a: Input<'static>, b: Input<'static>) {
    if let Err(e) = watch_quadrature(a, b, &VOLUME).await {
        error!("Encoder watcher stopped: {}", e);
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("panel-demo starting");

    // -----------------------------------------------------------------------
    // Encoder
    // -----------------------------------------------------------------------

    let enc_a = Input::new(p.PIN_16, Pull::Up);
    let enc_b = Input::new(p.PIN_17, Pull::Up);
    spawner.spawn(encoder_task(enc_a, enc_b)).unwrap();

    // -----------------------------------------------------------------------
    // LED with 30 s auto-off
    // -----------------------------------------------------------------------

    let mut timer = TimedProfessor::new(EmbassyClock, 30_000);
    let mut led = Valve::new("led", PushPull(Output::new(p.PIN_25, Level::Low)))
        .handover(&mut timer);
    if let Err(e) = led.begin() {
        error!("LED init failed: {}", e);
    }

    // -----------------------------------------------------------------------
    // Input devices
    // -----------------------------------------------------------------------
    // Callbacks only record what happened; the loop below acts on it, so
    // the LED is not borrowed by the panel.

    let clicked = Cell::new(false);
    let held = Cell::new(false);
    let turned = Cell::new(None);

    let mut on_click = |event: &Event| {
        debug!("{}: click after {} ms", event.device, event.time);
        clicked.set(true);
        true
    };
    let mut on_hold = |event: &Event| {
        debug!("{}: held {} ms", event.device, event.time);
        held.set(true);
        true
    };
    let mut on_turn = |event: &Event| {
        turned.set(Some(event.new));
        true
    };

    let mut button: Knob<'_, Input<'static>> = Knob::new("button", Input::new(p.PIN_15, Pull::Up));
    button
        .invert(true)
        .on_hold(&mut on_hold, 800)
        .on_click(&mut on_click, 300);

    let mut volume: Rotary<'_> = Rotary::new("volume", &VOLUME, 4);
    volume.on_delayed_choice(&mut on_turn, 150);

    let mut panel: Panel<'_, 4> = Panel::new("front");
    unwrap!(panel.add(&mut button));
    unwrap!(panel.add(&mut volume));

    info!("Panel ready with {} devices", panel.len());

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------

    loop {
        let now = EmbassyClock.now_ms();

        if let Err(e) = panel.tick(now) {
            warn!("Panel tick failed: {}", e);
        }

        if clicked.replace(false) {
            match led.toggle() {
                Ok(on) => info!("LED {}", if on { "on" } else { "off" }),
                Err(e) => error!("LED toggle failed: {}", e),
            }
        }

        if held.replace(false) {
            if led.locked() {
                led.unlock();
            } else {
                led.lock();
            }
            info!("LED locked: {}", led.locked());
        }

        if let Some(detents) = turned.take() {
            info!("Encoder moved {} detents", detents);
        }

        if let Err(e) = led.tick(now) {
            warn!("LED tick failed: {}", e);
        }

        Timer::after(TICK).await;
    }
}
