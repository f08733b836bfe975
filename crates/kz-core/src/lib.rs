//! kz-core: stable foundation for the keezer controller.
//!
//! Contains:
//! - time (millisecond timestamps used throughout the control domain)
//! - config (clamped control configuration + probe matching)
//! - state (controller state owned by the control loop)
//! - ports (hardware seams: probes, power switch, control log)
//! - error (shared error types)

pub mod config;
pub mod error;
pub mod log;
pub mod ports;
pub mod state;
pub mod time;

// Re-exports: nice ergonomics for downstream crates
pub use config::{ConfigFile, ControlConfig};
pub use error::{ActuatorError, KzError, KzResult, ProbeError};
pub use log::{ControlRecord, LogSink, MemorySink};
pub use ports::{PowerActuator, ProbeId, ProbeReader, ProbeSample};
pub use state::{ControllerState, PowerState};
pub use time::Millis;
