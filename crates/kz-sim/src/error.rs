use thiserror::Error;

pub type SimResult<T> = Result<T, SimError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// `advance` was called with a timestamp earlier than the previous one.
    #[error("Non-monotonic timestamp: {now} is earlier than {previous}")]
    NonMonotonicTime { now: u64, previous: u64 },
}
