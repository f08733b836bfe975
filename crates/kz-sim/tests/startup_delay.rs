//! Scenario: after process start with the enclosure far above target, power
//! must not come on until a full compressor rest period has elapsed, because
//! the real elapsed off-time before the restart is unknown.

use kz_core::{ConfigFile, ControlConfig, PowerState};
use kz_sim::{FreezerParams, SimRig};

fn config() -> ControlConfig {
    ConfigFile {
        target_enclosure_temp: Some(60.0),
        hysteresis_band: None,
        compressor_rest_seconds: Some(300),
        min_compressor_run_seconds: Some(120),
        low_temp_floor: None,
        control_interval_seconds: Some(30),
        enclosure_probe_id: Some("28-sim".to_string()),
        fermenter_probe_id: None,
    }
    .validate()
    .unwrap()
}

#[test]
fn power_stays_off_through_the_startup_rest_period() {
    let cfg = config();
    let rest_ms = cfg.rest_ms;
    let mut rig = SimRig::new(cfg, FreezerParams::default(), 72.0).unwrap();

    // Rest period plus ten control intervals of margin.
    rig.run_until(rest_ms + 10 * 30_000).unwrap();

    let first_on = rig
        .records()
        .iter()
        .find(|r| r.power == PowerState::On)
        .expect("enclosure is 12 degrees above target; power must come on");
    assert!(
        first_on.ts >= rest_ms,
        "power came on at {} ms, before the {} ms startup rest",
        first_on.ts,
        rest_ms
    );
}

#[test]
fn power_comes_on_at_the_first_permitted_tick() {
    let cfg = config();
    let rest_ms = cfg.rest_ms;
    let mut rig = SimRig::new(cfg, FreezerParams::default(), 72.0).unwrap();
    rig.run_until(rest_ms + 10 * 30_000).unwrap();

    // With the enclosure hot the whole time, the first tick at or after
    // `stay_off_until` must turn power on; the delay is exactly the rest
    // period, not longer.
    let first_on = rig
        .records()
        .iter()
        .find(|r| r.power == PowerState::On)
        .unwrap();
    assert_eq!(first_on.ts, rest_ms);
}

#[test]
fn every_record_in_the_rest_window_is_protection_forced() {
    let cfg = config();
    let rest_ms = cfg.rest_ms;
    let mut rig = SimRig::new(cfg, FreezerParams::default(), 72.0).unwrap();
    rig.run_until(rest_ms + 10 * 30_000).unwrap();

    for record in rig.records().iter().filter(|r| r.ts < rest_ms) {
        assert_eq!(record.power, PowerState::Off);
        assert_eq!(record.reason, "protection");
    }
}
