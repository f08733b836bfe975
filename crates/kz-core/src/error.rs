use thiserror::Error;

pub type KzResult<T> = Result<T, KzError>;

#[derive(Error, Debug)]
pub enum KzError {
    /// Fatal configuration problem. Raised before the control loop starts,
    /// never from inside a tick.
    #[error("Configuration error: {what}")]
    Config { what: String },

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Actuator(#[from] ActuatorError),
}

/// Failure reading a temperature probe. Recoverable: the loop keeps the last
/// known reading and continues.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProbeError {
    #[error("No probe with id '{id}' is attached")]
    NotFound { id: String },

    #[error("Probe '{id}' read failed: {detail}")]
    Read { id: String, detail: String },

    #[error("Probe '{id}' did not respond within the control interval")]
    Timeout { id: String },
}

/// Failure commanding the power switch. Recoverable per tick, but logged on
/// every occurrence; the loop retries on the next tick.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActuatorError {
    #[error("Power switch write failed: {detail}")]
    Write { detail: String },
}
