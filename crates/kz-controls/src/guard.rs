//! Compressor and contents protection.
//!
//! The guard can veto or override the controller's request. Rules are
//! evaluated in strict priority order, first match wins:
//!
//! 1. Startup delay: on the first tick after (re)start the real elapsed
//!    off-time is unknown, so assume zero and wait out a full rest period.
//! 2. Minimum rest: power may not return until `stay_off_until`.
//! 3. Minimum run: once on, power stays on until `stay_on_until`.
//! 4. Freeze floor: below the floor, force off unconditionally. This
//!    overrides rule 3; frozen contents are a worse outcome than a
//!    short-cycled compressor.

use kz_core::{ControllerState, Millis};

pub const REASON_STARTUP: &str =
    "Startup delay to prevent premature start after power failure";
pub const REASON_MIN_REST: &str = "Ensure minimum compressor off time between run cycles";
pub const REASON_MIN_RUN: &str = "Ensure minimum compressor run time";
pub const REASON_FREEZE_FLOOR: &str = "Prevent freezing of enclosure contents";

/// Outcome of one protection evaluation. At most one of `force_off` /
/// `force_on` is true; when neither is, the controller's request passes
/// through.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtectionDecision {
    pub force_off: bool,
    pub force_on: bool,
    /// Human-readable cause for a forced decision, empty otherwise.
    pub reason: &'static str,
    /// When set, the loop must arm `stay_off_until` to this value. Only the
    /// startup rule uses it; ordinary rest arming happens on the off
    /// transition itself.
    pub arm_rest_until: Option<Millis>,
}

impl ProtectionDecision {
    pub fn pass() -> Self {
        Self {
            force_off: false,
            force_on: false,
            reason: "",
            arm_rest_until: None,
        }
    }

    pub fn is_forced(&self) -> bool {
        self.force_off || self.force_on
    }
}

/// Computes a protection decision from a read-only state snapshot.
pub trait ProtectionPolicy {
    fn decide(&self, now: Millis, state: &ControllerState) -> ProtectionDecision;
}

/// The standard guard: startup delay, minimum rest, minimum run, freeze
/// floor.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressorGuard {
    /// Minimum off time between run cycles (ms).
    pub rest_ms: Millis,
    /// Minimum run time once started (ms).
    pub run_ms: Millis,
    /// Absolute low-temperature cutoff (°F).
    pub low_temp_floor: f64,
}

impl CompressorGuard {
    pub fn new(rest_ms: Millis, run_ms: Millis, low_temp_floor: f64) -> Self {
        Self {
            rest_ms,
            run_ms,
            low_temp_floor,
        }
    }
}

impl ProtectionPolicy for CompressorGuard {
    fn decide(&self, now: Millis, state: &ControllerState) -> ProtectionDecision {
        let mut decision = ProtectionDecision::pass();

        if state.last_tick.is_none() {
            decision.force_off = true;
            decision.reason = REASON_STARTUP;
            decision.arm_rest_until = Some(now + self.rest_ms);
        } else if now < state.stay_off_until {
            decision.force_off = true;
            decision.reason = REASON_MIN_REST;
        } else if state.power.is_on() && now < state.stay_on_until {
            decision.force_on = true;
            decision.reason = REASON_MIN_RUN;
        }

        // The floor check runs last and unconditionally so it can override
        // the minimum-run lock.
        if let Some(temp) = state.enclosure_temp {
            if temp < self.low_temp_floor {
                decision.force_off = true;
                decision.force_on = false;
                decision.reason = REASON_FREEZE_FLOOR;
            }
        }

        debug_assert!(!(decision.force_off && decision.force_on));
        decision
    }
}
