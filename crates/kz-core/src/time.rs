//! Millisecond timestamps for the control domain.
//!
//! The control loop, the protection timers, and the simulator all speak the
//! same unit: milliseconds on a monotonically non-decreasing timeline. The
//! origin is arbitrary; a virtual clock starts at zero, a wall clock uses the
//! Unix epoch. Nothing in the decision logic depends on which one it is.

/// Timestamp or duration in milliseconds.
pub type Millis = u64;

/// Convert whole seconds to milliseconds.
pub const fn secs_to_millis(seconds: u64) -> Millis {
    seconds * 1000
}

/// Convert a millisecond span to fractional seconds.
pub fn millis_to_secs_f64(millis: Millis) -> f64 {
    millis as f64 / 1000.0
}
