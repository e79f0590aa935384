//! Default timings, registry capacities and configuration structs.
//!
//! Everything a wiring program might want to tune lives here; device and
//! handler constructors take these values as parameters.

use crate::clock::Millis;

// ── Timing defaults ──────────────────────────────────────────────────────

/// Time a raw digital level must persist before a [`Knob`](crate::Knob) accepts it.
pub const DEBOUNCE_MS: Millis = 25;

/// Longest press still reported as a click.
pub const CLICK_MAX_MS: Millis = 500;

/// Per-click limit for double clicks. `0` means unbounded.
pub const DOUBLE_CLICK_MAX_MS: Millis = 0;

/// Per-click limit for multi clicks.
pub const MULTI_CLICK_MAX_MS: Millis = 250;

/// Longest gap between two clicks of one sequence.
pub const CLICK_GAP_MS: Millis = 750;

/// Clicks that complete a double click.
pub const DOUBLE_CLICK_COUNT: i32 = 2;

/// Refractory period between two evaluations of a slow averaging hysteresis.
pub const SLOW_HYSTERESIS_DELAY_MS: Millis = 1000;

/// First auto-off warning, measured back from expiry.
pub const FIRST_WARNING_MS: Millis = 10_000;

/// Second auto-off warning, measured back from expiry.
pub const SECOND_WARNING_MS: Millis = 3_000;

/// Length of one warning blink.
pub const WARNING_PULSE_MS: Millis = 100;

// ── Registry capacities ──────────────────────────────────────────────────

/// Handlers per device.
pub const HANDLER_CAPACITY: usize = 5;

/// Devices per panel.
pub const PANEL_CAPACITY: usize = 20;

/// Modifiers per lever.
pub const MODIFIER_CAPACITY: usize = 5;

/// Valves per transducer. Masks are `u32`, so only the first 32 take part
/// in mask operations.
pub const TRANSDUCER_CAPACITY: usize = 16;

// ── Configuration structs ────────────────────────────────────────────────

/// Construction-time settings for a [`Knob`](crate::Knob).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KnobConfig {
    /// Debounce window in milliseconds. Default: 25.
    pub debounce_ms: Millis,
    /// Invert the logical pin level (active-low wiring). Default: `false`.
    pub invert: bool,
}

impl Default for KnobConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEBOUNCE_MS,
            invert: false,
        }
    }
}

/// Settings for a [`TimedProfessor`](crate::TimedProfessor).
///
/// A warning of `0` disables that warning. Warnings are measured back from
/// expiry, so a warning longer than `hold_ms` never blinks: its window
/// would open before the valve was switched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProfessorConfig {
    /// Time after switch-on at which the valve is forced off.
    pub hold_ms: Millis,
    /// First warning blink, measured back from expiry. Default: 10 s.
    pub first_warning_ms: Millis,
    /// Second warning blink, measured back from expiry. Default: 3 s.
    pub second_warning_ms: Millis,
    /// Length of each warning blink. Default: 100 ms.
    pub warning_pulse_ms: Millis,
}

impl ProfessorConfig {
    /// Default warnings with the given hold time.
    pub fn with_hold(hold_ms: Millis) -> Self {
        Self {
            hold_ms,
            ..Self::default()
        }
    }
}

impl Default for ProfessorConfig {
    fn default() -> Self {
        Self {
            hold_ms: 60_000,
            first_warning_ms: FIRST_WARNING_MS,
            second_warning_ms: SECOND_WARNING_MS,
            warning_pulse_ms: WARNING_PULSE_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knob_config_defaults() {
        let config = KnobConfig::default();
        assert_eq!(config.debounce_ms, 25);
        assert!(!config.invert);
    }

    #[test]
    fn professor_config_with_hold_keeps_warnings() {
        let config = ProfessorConfig::with_hold(5_000);
        assert_eq!(config.hold_ms, 5_000);
        assert_eq!(config.first_warning_ms, FIRST_WARNING_MS);
        assert_eq!(config.second_warning_ms, SECOND_WARNING_MS);
        assert_eq!(config.warning_pulse_ms, WARNING_PULSE_MS);
    }
}
