//! Control and protection decision engine for the keezer.
//!
//! Three pieces, composed by dependency injection:
//! - `HysteresisController`: maps the current enclosure temperature to a
//!   requested power level, holding the current level inside the dead zone.
//! - `CompressorGuard`: overrides any requested level to enforce minimum
//!   rest, minimum run, the startup delay, and the freeze floor.
//! - `ControlLoop`: the per-tick orchestrator. Reads probes, asks the
//!   controller, asks the guard, applies the final level, logs the outcome.
//!
//! Data flows one direction per tick: probes -> controller -> guard ->
//! actuator. All decision functions are pure with respect to shared state;
//! the loop owns the only mutable `ControllerState`.

pub mod guard;
pub mod hysteresis;
pub mod runner;

pub use guard::{CompressorGuard, ProtectionDecision, ProtectionPolicy};
pub use hysteresis::{HysteresisController, TemperatureControl};
pub use runner::{ControlLoop, LoopPhase};
