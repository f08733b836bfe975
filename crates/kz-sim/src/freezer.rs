//! Lumped-capacitance freezer enclosure simulation.
//!
//! One thermal node (the enclosure air) with two first-order fluxes:
//! leakage in from ambient, proportional to `ambient - enclosure`; and,
//! while powered, removal into the coils, proportional to
//! `enclosure - min_coil_temp` and clamped to a maximum rate. Explicit Euler
//! over the span between `advance` calls. Coils are treated as having no
//! thermal inertia: powered coils sit at `min_coil_temp`, unpowered coils
//! sit at the enclosure temperature and move no heat.
//!
//! Pure f64 arithmetic with no hidden state: identical start temperature,
//! power schedule, and timestamps reproduce bit-identical trajectories.

use crate::error::{SimError, SimResult};
use crate::model::FreezerParams;
use kz_core::Millis;
use kz_core::time::millis_to_secs_f64;

/// Thermal state of one simulated freezer.
#[derive(Debug, Clone, PartialEq)]
pub struct FreezerSim {
    params: FreezerParams,
    enclosure_temp: f64,
    power_on: bool,
    ts: Millis,
}

impl FreezerSim {
    /// Create a simulator at the given starting enclosure temperature, with
    /// power off, at timestamp zero.
    pub fn new(params: FreezerParams, start_temp: f64) -> SimResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            enclosure_temp: start_temp,
            power_on: false,
            ts: 0,
        })
    }

    pub fn enclosure_temp(&self) -> f64 {
        self.enclosure_temp
    }

    pub fn power_on(&self) -> bool {
        self.power_on
    }

    pub fn params(&self) -> &FreezerParams {
        &self.params
    }

    /// Set the commanded power level. Takes effect from the current
    /// timestamp forward; the elapsed span already integrated is untouched.
    pub fn set_power(&mut self, on: bool) {
        self.power_on = on;
    }

    /// Advance the model to timestamp `ts` (monotonically non-decreasing),
    /// integrating the applied power over the elapsed span.
    pub fn advance(&mut self, ts: Millis) -> SimResult<()> {
        if ts < self.ts {
            return Err(SimError::NonMonotonicTime {
                now: ts,
                previous: self.ts,
            });
        }
        let seconds = millis_to_secs_f64(ts - self.ts);

        let coil_temp = if self.power_on {
            self.params.min_coil_temp
        } else {
            self.enclosure_temp
        };

        let mut coil_rate = (coil_temp - self.enclosure_temp) * self.params.enclosure_to_coil_rate;
        if coil_rate.abs() > self.params.enclosure_to_coil_max_rate {
            coil_rate = coil_rate.signum() * self.params.enclosure_to_coil_max_rate;
        }
        let delta_from_coils = coil_rate * seconds;

        let delta_from_ambient = (self.params.ambient_temp - self.enclosure_temp)
            * self.params.enclosure_to_ambient_rate
            * seconds;

        self.enclosure_temp += delta_from_coils + delta_from_ambient;
        self.ts = ts;
        Ok(())
    }
}
