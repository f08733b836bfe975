//! Virtual-time rig: the control loop wired to the simulator.
//!
//! `SimProbes` and `SimActuator` implement the hardware seams on top of a
//! shared `FreezerSim`, and `SimRig` drives the composed loop tick by tick
//! on a virtual clock. The rig is what the integration tests and the CLI
//! `simulate` command run.

use crate::error::SimResult;
use crate::freezer::FreezerSim;
use crate::model::FreezerParams;
use kz_controls::{CompressorGuard, ControlLoop, HysteresisController};
use kz_core::{
    ActuatorError, ControlConfig, ControlRecord, ControllerState, MemorySink, Millis,
    PowerActuator, ProbeError, ProbeId, ProbeReader, ProbeSample,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Simulator-backed probe reader. Serves the enclosure probe id it was
/// given; any other id reads as not attached.
pub struct SimProbes {
    sim: Rc<RefCell<FreezerSim>>,
    enclosure: ProbeId,
}

impl SimProbes {
    pub fn new(sim: Rc<RefCell<FreezerSim>>, enclosure: ProbeId) -> Self {
        Self { sim, enclosure }
    }
}

impl ProbeReader for SimProbes {
    fn discover(&mut self) -> Result<Vec<ProbeSample>, ProbeError> {
        Ok(vec![ProbeSample {
            id: self.enclosure.clone(),
            temp_f: self.sim.borrow().enclosure_temp(),
        }])
    }

    fn read(&mut self, id: &ProbeId) -> Result<f64, ProbeError> {
        if *id == self.enclosure {
            Ok(self.sim.borrow().enclosure_temp())
        } else {
            Err(ProbeError::NotFound {
                id: id.as_str().to_string(),
            })
        }
    }
}

/// Simulator-backed power switch.
pub struct SimActuator {
    sim: Rc<RefCell<FreezerSim>>,
}

impl SimActuator {
    pub fn new(sim: Rc<RefCell<FreezerSim>>) -> Self {
        Self { sim }
    }
}

impl PowerActuator for SimActuator {
    fn set_power(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.sim.borrow_mut().set_power(on);
        Ok(())
    }
}

type SimLoop =
    ControlLoop<SimProbes, SimActuator, HysteresisController, CompressorGuard, MemorySink>;

/// The composed loop plus its simulated plant, stepped on a virtual clock.
pub struct SimRig {
    sim: Rc<RefCell<FreezerSim>>,
    control_loop: SimLoop,
    now: Millis,
    interval_ms: Millis,
}

impl SimRig {
    /// Build a rig from a validated configuration and simulator parameters,
    /// starting the loop. The virtual clock starts at zero.
    pub fn new(config: ControlConfig, params: FreezerParams, start_temp: f64) -> SimResult<Self> {
        let sim = Rc::new(RefCell::new(FreezerSim::new(params, start_temp)?));
        let probes = SimProbes::new(Rc::clone(&sim), config.enclosure_probe.clone());
        let actuator = SimActuator::new(Rc::clone(&sim));
        let control = HysteresisController::new(config.target_temp, config.hysteresis_band);
        let guard = CompressorGuard::new(config.rest_ms, config.run_ms, config.low_temp_floor);
        let interval_ms = config.interval_ms;

        let mut control_loop =
            ControlLoop::new(config, probes, actuator, control, guard, MemorySink::new());
        control_loop.start();
        tracing::debug!(start_temp, interval_ms, "simulation rig ready");

        Ok(Self {
            sim,
            control_loop,
            now: 0,
            interval_ms,
        })
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    pub fn enclosure_temp(&self) -> f64 {
        self.sim.borrow().enclosure_temp()
    }

    pub fn state(&self) -> &ControllerState {
        self.control_loop.state()
    }

    pub fn records(&self) -> &[ControlRecord] {
        &self.control_loop.sink().records
    }

    /// Advance the plant to the current virtual time and run one control
    /// tick, then schedule the next tick one interval later.
    pub fn step(&mut self) -> SimResult<()> {
        self.sim.borrow_mut().advance(self.now)?;
        self.control_loop.tick(self.now);
        self.now += self.interval_ms;
        Ok(())
    }

    /// Step until the virtual clock passes `end` (inclusive).
    pub fn run_until(&mut self, end: Millis) -> SimResult<()> {
        while self.now <= end {
            self.step()?;
        }
        Ok(())
    }

    /// Shut the loop down at the current virtual time.
    pub fn shutdown(&mut self) {
        self.control_loop.shutdown(self.now);
    }
}
