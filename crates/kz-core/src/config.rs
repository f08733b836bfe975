//! Control configuration: raw file schema, clamping, and probe matching.
//!
//! Out-of-range values are clamped to the nearest safe bound with a warning
//! naming the field and the bound applied; the decision engine only ever sees
//! a clamped `ControlConfig`. Missing required values (target temperature,
//! enclosure probe id) are fatal here, before the control loop starts.

use crate::error::{KzError, KzResult};
use crate::ports::{ProbeId, ProbeReader};
use crate::time::{Millis, secs_to_millis};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Compressor rest bounds (seconds). Shorter rests risk compressor damage;
/// longer ones interfere with temperature control.
pub const REST_SECONDS_MIN: u64 = 120;
pub const REST_SECONDS_MAX: u64 = 600;
pub const REST_SECONDS_DEFAULT: u64 = 300;

/// Minimum-run bounds (seconds). Runs longer than this risk overshooting
/// into unintentional freezing.
pub const RUN_SECONDS_MAX: u64 = 600;
pub const RUN_SECONDS_DEFAULT: u64 = 120;

/// Control interval bounds (seconds).
pub const INTERVAL_SECONDS_MIN: u64 = 1;
pub const INTERVAL_SECONDS_MAX: u64 = 60;
pub const INTERVAL_SECONDS_DEFAULT: u64 = 30;

pub const HYSTERESIS_BAND_DEFAULT: f64 = 1.0;
pub const LOW_TEMP_FLOOR_DEFAULT: f64 = 32.0;

/// Raw on-disk configuration, before clamping and validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Target enclosure temperature (°F). Required.
    pub target_enclosure_temp: Option<f64>,
    /// Dead zone around the target (°F) within which no change is requested.
    pub hysteresis_band: Option<f64>,
    /// Minimum compressor off time between run cycles (seconds).
    pub compressor_rest_seconds: Option<u64>,
    /// Minimum compressor run time once started (seconds).
    pub min_compressor_run_seconds: Option<u64>,
    /// Absolute low-temperature cutoff (°F) protecting the contents.
    pub low_temp_floor: Option<f64>,
    /// Control loop tick interval (seconds).
    pub control_interval_seconds: Option<u64>,
    /// Probe id for the enclosure sensor. Required.
    pub enclosure_probe_id: Option<String>,
    /// Probe id for the fermenter sensor. Optional; secondary readings are
    /// simply absent without it.
    pub fermenter_probe_id: Option<String>,
}

/// Validated, clamped configuration consumed by the decision engine.
/// Immutable per run.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlConfig {
    pub target_temp: f64,
    pub hysteresis_band: f64,
    pub rest_ms: Millis,
    pub run_ms: Millis,
    pub low_temp_floor: f64,
    pub interval_ms: Millis,
    pub enclosure_probe: ProbeId,
    pub fermenter_probe: Option<ProbeId>,
}

impl ConfigFile {
    /// Clamp and validate into a `ControlConfig`.
    ///
    /// Clamps emit a warning; a missing target temperature or enclosure
    /// probe id is fatal.
    pub fn validate(self) -> KzResult<ControlConfig> {
        let target_temp = self.target_enclosure_temp.ok_or_else(|| KzError::Config {
            what: "target_enclosure_temp is missing".to_string(),
        })?;
        if target_temp > 72.0 {
            warn!(
                target_temp,
                "target_enclosure_temp > 72; the appliance will likely never be powered"
            );
        } else if target_temp < 0.0 {
            warn!(
                target_temp,
                "target_enclosure_temp < 0; the appliance will run continuously and \
                 the contents will freeze"
            );
        }

        let enclosure_probe = self
            .enclosure_probe_id
            .map(ProbeId::new)
            .ok_or_else(|| KzError::Config {
                what: "enclosure_probe_id is missing; set it to an attached probe id"
                    .to_string(),
            })?;
        let fermenter_probe = self.fermenter_probe_id.map(ProbeId::new);
        if fermenter_probe.is_none() {
            warn!("fermenter_probe_id not set; secondary readings will be absent");
        }

        let rest_seconds = clamp_field(
            "compressor_rest_seconds",
            self.compressor_rest_seconds,
            REST_SECONDS_MIN,
            REST_SECONDS_MAX,
            REST_SECONDS_DEFAULT,
        );
        let run_seconds = clamp_field(
            "min_compressor_run_seconds",
            self.min_compressor_run_seconds,
            0,
            RUN_SECONDS_MAX,
            RUN_SECONDS_DEFAULT,
        );
        let interval_seconds = clamp_field(
            "control_interval_seconds",
            self.control_interval_seconds,
            INTERVAL_SECONDS_MIN,
            INTERVAL_SECONDS_MAX,
            INTERVAL_SECONDS_DEFAULT,
        );

        let hysteresis_band = match self.hysteresis_band {
            Some(band) if band > 0.0 => band,
            Some(band) => {
                warn!(band, "hysteresis_band must be positive; using default");
                HYSTERESIS_BAND_DEFAULT
            }
            None => HYSTERESIS_BAND_DEFAULT,
        };
        let low_temp_floor = self.low_temp_floor.unwrap_or(LOW_TEMP_FLOOR_DEFAULT);

        Ok(ControlConfig {
            target_temp,
            hysteresis_band,
            rest_ms: secs_to_millis(rest_seconds),
            run_ms: secs_to_millis(run_seconds),
            low_temp_floor,
            interval_ms: secs_to_millis(interval_seconds),
            enclosure_probe,
            fermenter_probe,
        })
    }
}

fn clamp_field(name: &str, value: Option<u64>, min: u64, max: u64, default: u64) -> u64 {
    match value {
        None => default,
        Some(v) if v < min => {
            warn!(field = name, value = v, bound = min, "value too low; clamping");
            min
        }
        Some(v) if v > max => {
            warn!(field = name, value = v, bound = max, "value too high; clamping");
            max
        }
        Some(v) => v,
    }
}

impl ControlConfig {
    /// Match configured probe ids against the probes actually attached.
    ///
    /// A missing enclosure probe is fatal. A configured-but-absent fermenter
    /// probe downgrades with a warning (the id is dropped). Attached probes
    /// that no configured id claims produce a warning, since a mis-set id is
    /// the most common wiring mistake.
    pub fn match_probes(&mut self, reader: &mut impl ProbeReader) -> KzResult<()> {
        let attached = reader.discover().map_err(KzError::Probe)?;

        let enclosure_found = attached.iter().any(|p| p.id == self.enclosure_probe);
        if !enclosure_found {
            return Err(KzError::Config {
                what: format!(
                    "enclosure_probe_id is set to '{}' but no such probe is attached",
                    self.enclosure_probe
                ),
            });
        }

        if let Some(fermenter) = &self.fermenter_probe {
            if !attached.iter().any(|p| p.id == *fermenter) {
                warn!(
                    probe = %fermenter,
                    "fermenter_probe_id names a probe that is not attached; \
                     secondary readings disabled"
                );
                self.fermenter_probe = None;
            }
        }

        for probe in &attached {
            let used = probe.id == self.enclosure_probe
                || self.fermenter_probe.as_ref() == Some(&probe.id);
            if !used {
                warn!(probe = %probe.id, temp_f = probe.temp_f, "attached probe is unused");
            }
        }

        Ok(())
    }
}
