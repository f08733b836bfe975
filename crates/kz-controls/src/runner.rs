//! The control loop: per-tick orchestration and the loop state machine.
//!
//! Phases: `Stopped -> Running -> Stopping -> Stopped`. `Running` is
//! re-entered on each timer tick; there are no sub-states. One tick performs,
//! in order: read probes (fail-soft) -> compute the requested level ->
//! compute the protection decision -> resolve the final level (protection
//! overrides the request) -> apply on change only -> emit one log record.
//!
//! Errors never escape a tick: probe failures degrade to the last known
//! reading with a one-time warning, actuator failures are logged every time
//! and retried on the next tick.

use crate::guard::ProtectionPolicy;
use crate::hysteresis::TemperatureControl;
use kz_core::{
    ControlConfig, ControlRecord, ControllerState, LogSink, Millis, PowerActuator, PowerState,
    ProbeError, ProbeId, ProbeReader,
};
use tracing::{debug, error, info, warn};

const MODE_ENCLOSURE: &str = "enclosure";

const REASON_CONTROL: &str = "control";
const REASON_PROTECTION: &str = "protection";
const REASON_SHUTDOWN: &str = "shutdown";

/// Lifecycle phase of a control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Stopped,
    Running,
    Stopping,
}

/// Orchestrates one controlled unit. Owns the only mutable
/// `ControllerState`; collaborators are injected and receive read-only
/// snapshots.
pub struct ControlLoop<P, A, C, G, L> {
    config: ControlConfig,
    probes: P,
    actuator: A,
    control: C,
    guard: G,
    sink: L,
    state: ControllerState,
    phase: LoopPhase,
}

impl<P, A, C, G, L> ControlLoop<P, A, C, G, L>
where
    P: ProbeReader,
    A: PowerActuator,
    C: TemperatureControl,
    G: ProtectionPolicy,
    L: LogSink,
{
    pub fn new(config: ControlConfig, probes: P, actuator: A, control: C, guard: G, sink: L) -> Self {
        Self {
            config,
            probes,
            actuator,
            control,
            guard,
            sink,
            state: ControllerState::new(),
            phase: LoopPhase::Stopped,
        }
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    pub fn sink(&self) -> &L {
        &self.sink
    }

    /// Transition `Stopped -> Running`. Commands the switch off once as a
    /// precaution; the commanded state stays `Unknown` so the first real
    /// decision still reaches the actuator.
    pub fn start(&mut self) {
        if self.phase != LoopPhase::Stopped {
            return;
        }
        if let Err(err) = self.actuator.set_power(false) {
            warn!(error = %err, "initial power-off command failed");
        }
        info!(target_temp = self.config.target_temp, "control loop started");
        self.phase = LoopPhase::Running;
    }

    /// Execute one control tick at timestamp `now`.
    ///
    /// Ticks are driven by an external cadence (a timer in production, a
    /// virtual clock in simulation) and are not re-entrant: the caller must
    /// not start a new tick before this returns.
    pub fn tick(&mut self, now: Millis) {
        if self.phase != LoopPhase::Running {
            debug!(phase = ?self.phase, "tick ignored outside Running phase");
            return;
        }

        self.read_probes();

        let requested = self
            .control
            .requested_power(self.state.power, self.state.enclosure_temp);
        let decision = self.guard.decide(now, &self.state);

        let mut reason = REASON_CONTROL;
        let mut note = String::new();
        let final_on = if decision.force_off {
            reason = REASON_PROTECTION;
            note.push_str(decision.reason);
            false
        } else if decision.force_on {
            reason = REASON_PROTECTION;
            note.push_str(decision.reason);
            true
        } else {
            requested
        };
        if let Some(until) = decision.arm_rest_until {
            self.state.stay_off_until = until;
        }

        // Must happen after the guard ran, or the startup rule would never
        // see the first tick.
        self.state.last_tick = Some(now);

        // Suppress identical consecutive (reason, note) pairs in the log.
        if reason == self.state.previous_reason && note == self.state.previous_note {
            note.clear();
        } else {
            self.state.previous_reason = reason;
            self.state.previous_note = note.clone();
        }

        self.apply_power(final_on, now);

        self.sink.append(&ControlRecord {
            ts: now,
            power: self.state.power,
            enclosure_temp: self.state.enclosure_temp,
            fermenter_temp: self.state.fermenter_temp,
            mode: MODE_ENCLOSURE,
            reason,
            note,
        });
    }

    /// Transition to `Stopping`, force power off regardless of any
    /// protection window, then come to rest in `Stopped`.
    ///
    /// The forced off is the one action allowed to bypass the guard; a safe
    /// shutdown is unconditional.
    pub fn shutdown(&mut self, now: Millis) {
        self.phase = LoopPhase::Stopping;
        if let Err(err) = self.actuator.set_power(false) {
            error!(error = %err, "power-off command failed during shutdown");
        }
        if self.state.power != PowerState::Off {
            self.state.stay_off_until = now + self.config.rest_ms;
        }
        self.state.power = PowerState::Off;

        self.sink.append(&ControlRecord {
            ts: now,
            power: self.state.power,
            enclosure_temp: self.state.enclosure_temp,
            fermenter_temp: self.state.fermenter_temp,
            mode: MODE_ENCLOSURE,
            reason: REASON_SHUTDOWN,
            note: "Forced power off at shutdown".to_string(),
        });
        info!("control loop stopped");
        self.phase = LoopPhase::Stopped;
    }

    /// Read the configured probes, keeping the last known reading on
    /// failure. Each probe warns once per outage, not once per tick.
    fn read_probes(&mut self) {
        match self.probes.read(&self.config.enclosure_probe) {
            Ok(temp) => {
                self.state.enclosure_temp = Some(temp);
                self.state.enclosure_probe_warned = false;
            }
            Err(err) => {
                if !self.state.enclosure_probe_warned {
                    warn_probe(&self.config.enclosure_probe, "enclosure", &err);
                    self.state.enclosure_probe_warned = true;
                }
            }
        }

        if let Some(fermenter) = self.config.fermenter_probe.clone() {
            match self.probes.read(&fermenter) {
                Ok(temp) => {
                    self.state.fermenter_temp = Some(temp);
                    self.state.fermenter_probe_warned = false;
                }
                Err(err) => {
                    if !self.state.fermenter_probe_warned {
                        warn_probe(&fermenter, "fermenter", &err);
                        self.state.fermenter_probe_warned = true;
                    }
                }
            }
        }
    }

    /// Command the actuator if the resolved level differs from the current
    /// one, and arm the corresponding protection timer on the transition.
    ///
    /// On actuator failure the commanded state is left unchanged, so the
    /// change is re-detected and retried on the next tick.
    fn apply_power(&mut self, on: bool, now: Millis) {
        let desired = if on { PowerState::On } else { PowerState::Off };
        if self.state.power == desired {
            return;
        }
        match self.actuator.set_power(on) {
            Ok(()) => {
                self.state.power = desired;
                if on {
                    self.state.stay_on_until = now + self.config.run_ms;
                } else {
                    self.state.stay_off_until = now + self.config.rest_ms;
                }
            }
            Err(err) => {
                // Logged every occurrence: commanding cooling hardware must
                // never fail silently.
                warn!(error = %err, requested_on = on, "power switch command failed; retrying next tick");
            }
        }
    }
}

fn warn_probe(id: &ProbeId, role: &str, err: &ProbeError) {
    warn!(probe = %id, role, error = %err, "probe read failed; keeping last known reading");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::{CompressorGuard, REASON_STARTUP};
    use crate::hysteresis::HysteresisController;
    use kz_core::{ConfigFile, MemorySink, ProbeSample};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Probe reader returning a scripted sequence of results.
    struct ScriptedProbes {
        id: ProbeId,
        script: Vec<Result<f64, ProbeError>>,
        cursor: usize,
    }

    impl ScriptedProbes {
        fn new(id: &str, script: Vec<Result<f64, ProbeError>>) -> Self {
            Self {
                id: ProbeId::new(id),
                script,
                cursor: 0,
            }
        }
    }

    impl ProbeReader for ScriptedProbes {
        fn discover(&mut self) -> Result<Vec<ProbeSample>, ProbeError> {
            Ok(vec![])
        }

        fn read(&mut self, id: &ProbeId) -> Result<f64, ProbeError> {
            assert_eq!(*id, self.id);
            let result = self.script[self.cursor.min(self.script.len() - 1)].clone();
            self.cursor += 1;
            result
        }
    }

    /// Actuator recording every command; optionally failing.
    #[derive(Clone, Default)]
    struct RecordingActuator {
        commands: Rc<RefCell<Vec<bool>>>,
        failing: Rc<RefCell<bool>>,
    }

    impl PowerActuator for RecordingActuator {
        fn set_power(&mut self, on: bool) -> Result<(), kz_core::ActuatorError> {
            if *self.failing.borrow() {
                return Err(kz_core::ActuatorError::Write {
                    detail: "pin unavailable".to_string(),
                });
            }
            self.commands.borrow_mut().push(on);
            Ok(())
        }
    }

    fn config() -> ControlConfig {
        ConfigFile {
            target_enclosure_temp: Some(60.0),
            hysteresis_band: None,
            compressor_rest_seconds: Some(300),
            min_compressor_run_seconds: Some(120),
            low_temp_floor: None,
            control_interval_seconds: Some(30),
            enclosure_probe_id: Some("28-test".to_string()),
            fermenter_probe_id: None,
        }
        .validate()
        .unwrap()
    }

    type TestLoop = ControlLoop<
        ScriptedProbes,
        RecordingActuator,
        HysteresisController,
        CompressorGuard,
        MemorySink,
    >;

    fn make_loop(script: Vec<Result<f64, ProbeError>>, actuator: RecordingActuator) -> TestLoop {
        let cfg = config();
        let control = HysteresisController::new(cfg.target_temp, cfg.hysteresis_band);
        let guard = CompressorGuard::new(cfg.rest_ms, cfg.run_ms, cfg.low_temp_floor);
        let probes = ScriptedProbes::new("28-test", script);
        let mut control_loop =
            ControlLoop::new(cfg, probes, actuator, control, guard, MemorySink::new());
        control_loop.start();
        control_loop
    }

    #[test]
    fn first_tick_forces_off_with_startup_note() {
        let actuator = RecordingActuator::default();
        let mut control_loop = make_loop(vec![Ok(70.0)], actuator.clone());
        control_loop.tick(0);

        let records = &control_loop.sink().records;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].power, PowerState::Off);
        assert_eq!(records[0].reason, "protection");
        assert_eq!(records[0].note, REASON_STARTUP);
        assert_eq!(control_loop.state().stay_off_until, 300_000);
    }

    #[test]
    fn actuator_commanded_only_on_change() {
        let actuator = RecordingActuator::default();
        let mut control_loop = make_loop(vec![Ok(70.0)], actuator.clone());
        for i in 0..20 {
            control_loop.tick(i * 30_000);
        }
        // start() off, Unknown->Off on the first tick, then Off->On once the
        // rest window expires. No redundant commands in between.
        assert_eq!(*actuator.commands.borrow(), vec![false, false, true]);
    }

    #[test]
    fn probe_failure_keeps_last_reading() {
        let actuator = RecordingActuator::default();
        let mut control_loop = make_loop(
            vec![
                Ok(70.0),
                Err(ProbeError::Timeout {
                    id: "28-test".to_string(),
                }),
            ],
            actuator,
        );
        control_loop.tick(0);
        control_loop.tick(30_000);
        assert_eq!(control_loop.state().enclosure_temp, Some(70.0));
        assert!(control_loop.state().enclosure_probe_warned);
    }

    #[test]
    fn no_reading_ever_means_power_stays_off() {
        let actuator = RecordingActuator::default();
        let mut control_loop = make_loop(
            vec![Err(ProbeError::NotFound {
                id: "28-test".to_string(),
            })],
            actuator.clone(),
        );
        for i in 0..30 {
            control_loop.tick(i * 30_000);
        }
        assert!(!control_loop.state().power.is_on());
        assert!(!actuator.commands.borrow().iter().any(|&on| on));
    }

    #[test]
    fn actuator_failure_is_retried_next_tick() {
        let actuator = RecordingActuator::default();
        let mut control_loop = make_loop(vec![Ok(70.0)], actuator.clone());
        // Ride out the startup rest window (stay_off_until = 300_000).
        for i in 0..=9 {
            control_loop.tick(i * 30_000);
        }
        assert_eq!(control_loop.state().power, PowerState::Off);

        // Fail the command that would turn power on.
        *actuator.failing.borrow_mut() = true;
        control_loop.tick(300_000);
        assert_eq!(control_loop.state().power, PowerState::Off);

        *actuator.failing.borrow_mut() = false;
        control_loop.tick(330_000);
        assert_eq!(control_loop.state().power, PowerState::On);
        // The run timer is armed from the successful transition, not the
        // failed attempt.
        assert_eq!(control_loop.state().stay_on_until, 330_000 + 120_000);
    }

    #[test]
    fn duplicate_reason_and_note_blanks_the_note() {
        let actuator = RecordingActuator::default();
        let mut control_loop = make_loop(vec![Ok(70.0)], actuator);
        control_loop.tick(0);
        control_loop.tick(30_000);

        let records = &control_loop.sink().records;
        // Startup note on the first record, minimum-rest note on the second
        // (different note), then repeats are blanked.
        assert_eq!(records[0].note, REASON_STARTUP);
        control_loop.tick(60_000);
        let records = &control_loop.sink().records;
        assert_eq!(records[1].reason, "protection");
        assert!(!records[1].note.is_empty());
        assert_eq!(records[2].reason, "protection");
        assert!(records[2].note.is_empty());
    }

    #[test]
    fn shutdown_forces_off_even_inside_run_window() {
        let actuator = RecordingActuator::default();
        let mut control_loop = make_loop(vec![Ok(70.0)], actuator.clone());
        for i in 0..=11 {
            control_loop.tick(i * 30_000);
        }
        assert_eq!(control_loop.state().power, PowerState::On);
        assert!(control_loop.state().stay_on_until > 330_000);

        control_loop.shutdown(340_000);
        assert_eq!(control_loop.phase(), LoopPhase::Stopped);
        assert_eq!(control_loop.state().power, PowerState::Off);
        assert_eq!(*actuator.commands.borrow().last().unwrap(), false);
        let last = control_loop.sink().records.last().unwrap();
        assert_eq!(last.reason, "shutdown");
    }

    #[test]
    fn ticks_ignored_when_stopped() {
        let actuator = RecordingActuator::default();
        let mut control_loop = make_loop(vec![Ok(70.0)], actuator);
        control_loop.shutdown(0);
        control_loop.tick(30_000);
        // Only the shutdown record; the tick did nothing.
        assert_eq!(control_loop.sink().records.len(), 1);
        assert_eq!(control_loop.state().last_tick, None);
    }
}
