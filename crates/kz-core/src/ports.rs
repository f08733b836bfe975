//! Hardware seams: temperature probes and the power switch.
//!
//! The control and protection logic never touches hardware directly. It is
//! composed with implementations of these traits: a DS18B20/GPIO adapter on a
//! real unit, simulator-backed adapters in tests and accelerated runs.
//!
//! Contract notes (these keep the control loop sound):
//! - `ProbeReader::read` must not block longer than one control interval; on
//!   failure the loop keeps the last known reading.
//! - `PowerActuator::set_power` must tolerate being told to set its current
//!   value. The loop only calls it on a change, but makes no promise.

use crate::error::{ActuatorError, ProbeError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a temperature probe (e.g. a 1-Wire id like `28-041652951fff`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProbeId(pub String);

impl ProbeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProbeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One discovered probe with its current reading, in degrees Fahrenheit.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeSample {
    pub id: ProbeId,
    pub temp_f: f64,
}

/// Reads temperatures from attached probes.
pub trait ProbeReader {
    /// List all attached probes with a current reading. Used at startup to
    /// match configured probe ids against what is actually connected.
    fn discover(&mut self) -> Result<Vec<ProbeSample>, ProbeError>;

    /// Read one probe, in degrees Fahrenheit.
    fn read(&mut self, id: &ProbeId) -> Result<f64, ProbeError>;
}

/// Switches power to the cooling appliance.
///
/// This seam has no protection logic of its own. It will switch power on and
/// off on command; short-cycle protection lives entirely in the decision
/// engine above it.
pub trait PowerActuator {
    fn set_power(&mut self, on: bool) -> Result<(), ActuatorError>;
}
