//! Hysteresis (bang-bang) temperature control.
//!
//! Requests cooling above `target + band`, requests off below `target - band`,
//! and holds the current level inside the dead zone. The hold is what makes
//! this hysteresis rather than a bare threshold: sensor noise near the target
//! cannot request a power-state change.

use kz_core::PowerState;

/// Maps a temperature reading to a *requested* power level. The request is
/// advisory; the guard may override it.
pub trait TemperatureControl {
    /// Pure function of the current level and the most recent enclosure
    /// reading. `None` (no reading ever obtained) must fail safe toward off.
    fn requested_power(&self, current: PowerState, enclosure_temp: Option<f64>) -> bool;
}

/// On/off controller with a symmetric dead zone around the target.
#[derive(Debug, Clone, PartialEq)]
pub struct HysteresisController {
    /// Target enclosure temperature (°F).
    pub target: f64,
    /// Half-width of the dead zone (°F).
    pub band: f64,
}

impl HysteresisController {
    pub fn new(target: f64, band: f64) -> Self {
        Self { target, band }
    }
}

impl TemperatureControl for HysteresisController {
    fn requested_power(&self, current: PowerState, enclosure_temp: Option<f64>) -> bool {
        let Some(temp) = enclosure_temp else {
            // Never request cooling without a valid reading.
            return false;
        };

        if temp > self.target + self.band {
            true
        } else if temp < self.target - self.band {
            false
        } else {
            // Inside the band: no change. Unknown holds to off.
            current.is_on()
        }
    }
}
