//! Controller state owned by the control loop.
//!
//! One `ControllerState` exists per controlled unit. The loop owns it
//! exclusively and mutates it once per tick; the controller and the guard
//! receive read-only snapshots and return decisions. No module-level state.

use crate::time::Millis;
use serde::{Deserialize, Serialize};

/// Commanded power level of the appliance.
///
/// `Unknown` is the state between process start and the first applied
/// decision: after a restart the real switch position has not been commanded
/// by us yet, so the first applied level always reaches the actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerState {
    Unknown,
    Off,
    On,
}

impl PowerState {
    pub fn is_on(self) -> bool {
        matches!(self, PowerState::On)
    }

    /// Digit used in the control log (`1` on, `0` off, `-1` unknown).
    pub fn log_digit(self) -> i8 {
        match self {
            PowerState::Unknown => -1,
            PowerState::Off => 0,
            PowerState::On => 1,
        }
    }
}

/// Mutable state of one control loop, updated once per tick.
///
/// Timing invariants (the correctness contract of the guard, checked by the
/// integration tests):
/// - `power == On` implies the transition to on happened no earlier than
///   `stay_off_until` permitted, and `stay_on_until` was armed from that same
///   transition.
/// - `power == Off` after a transition implies `stay_off_until` was armed
///   from that transition.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    /// Timestamp of the previous completed tick. `None` until the first tick
    /// after (re)start; the guard's startup rule keys off this.
    pub last_tick: Option<Millis>,
    /// Current commanded power level. Authoritative, independent of any
    /// external reflection of the switch.
    pub power: PowerState,
    /// Earliest time power may next turn on.
    pub stay_off_until: Millis,
    /// Earliest time power may next turn off.
    pub stay_on_until: Millis,
    /// Most recent enclosure reading (°F). `None` until the first good read.
    pub enclosure_temp: Option<f64>,
    /// Most recent secondary/fermenter reading (°F), when a probe is fitted.
    pub fermenter_temp: Option<f64>,
    /// One-time warning latch for enclosure probe failures. Cleared by a
    /// successful read so a later outage warns again.
    pub enclosure_probe_warned: bool,
    /// Same latch for the fermenter probe.
    pub fermenter_probe_warned: bool,
    /// Previous log (reason, note) pair, for suppressing identical
    /// consecutive notes in the control log.
    pub previous_reason: &'static str,
    pub previous_note: String,
}

impl ControllerState {
    pub fn new() -> Self {
        Self {
            last_tick: None,
            power: PowerState::Unknown,
            stay_off_until: 0,
            stay_on_until: 0,
            enclosure_temp: None,
            fermenter_temp: None,
            enclosure_probe_warned: false,
            fermenter_probe_warned: false,
            previous_reason: "",
            previous_note: String::new(),
        }
    }
}

impl Default for ControllerState {
    fn default() -> Self {
        Self::new()
    }
}
