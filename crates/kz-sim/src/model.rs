//! Physical parameters of the lumped-capacitance freezer model.

use crate::error::{SimError, SimResult};

/// Parameters for `FreezerSim`. Rates are first-order coefficients in
/// degrees per second per degree of temperature delta.
///
/// Defaults describe a typical chest freezer in a 72 °F room.
#[derive(Debug, Clone, PartialEq)]
pub struct FreezerParams {
    /// Temperature outside the freezer (°F). Infinite thermal mass.
    pub ambient_temp: f64,
    /// Lowest coil temperature with the compressor running (°F). A home
    /// freezer cools the enclosure to around -20 °F, so the coils sit a bit
    /// below that.
    pub min_coil_temp: f64,
    /// Heat removal from the enclosure into the coils (1/s per °F delta).
    pub enclosure_to_coil_rate: f64,
    /// Upper bound on the removal rate (°F/s). Below it, removal follows
    /// `enclosure_to_coil_rate`.
    pub enclosure_to_coil_max_rate: f64,
    /// Heat leakage from ambient into the enclosure (1/s per °F delta).
    pub enclosure_to_ambient_rate: f64,
}

impl Default for FreezerParams {
    fn default() -> Self {
        Self {
            ambient_temp: 72.0,
            min_coil_temp: -30.0,
            enclosure_to_coil_rate: 5e-4,
            enclosure_to_coil_max_rate: 0.5,
            enclosure_to_ambient_rate: 1e-4,
        }
    }
}

impl FreezerParams {
    /// Check physical plausibility of the parameter set.
    pub fn validate(&self) -> SimResult<()> {
        if !(self.min_coil_temp < self.ambient_temp) {
            return Err(SimError::InvalidArg {
                what: "min_coil_temp must be below ambient_temp",
            });
        }
        if self.enclosure_to_coil_rate <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "enclosure_to_coil_rate must be positive",
            });
        }
        if self.enclosure_to_coil_max_rate <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "enclosure_to_coil_max_rate must be positive",
            });
        }
        if self.enclosure_to_ambient_rate <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "enclosure_to_ambient_rate must be positive",
            });
        }
        Ok(())
    }
}
