//! Deterministic thermal simulation of the freezer enclosure.
//!
//! This crate is the validation harness for the decision engine: a linear
//! lumped-capacitance model of the enclosure plus simulator-backed
//! implementations of the hardware seams, so the control loop can be driven
//! on an accelerated virtual clock. Hundreds of simulated hours run in
//! milliseconds of real time, which is how the timing invariants of the
//! guard get exercised without hardware.
//!
//! Never part of the production control flow.

pub mod error;
pub mod freezer;
pub mod model;
pub mod rig;

pub use error::{SimError, SimResult};
pub use freezer::FreezerSim;
pub use model::FreezerParams;
pub use rig::{SimActuator, SimProbes, SimRig};
