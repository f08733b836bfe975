//! Control log records and the append-only sink seam.
//!
//! One record is emitted per tick. The sink's persistence mechanism (file
//! path, rotation) is outside the core's concern; `append` must be a bounded,
//! best-effort operation that never blocks the control tick, so the trait is
//! infallible and implementations swallow and report their own I/O trouble.

use crate::state::PowerState;
use crate::time::Millis;
use serde::Serialize;

/// One structured control-log record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlRecord {
    pub ts: Millis,
    pub power: PowerState,
    pub enclosure_temp: Option<f64>,
    pub fermenter_temp: Option<f64>,
    pub mode: &'static str,
    pub reason: &'static str,
    pub note: String,
}

impl ControlRecord {
    /// CSV line in the historical log format:
    /// `ts,power,enclosure,fermenter,mode,reason,note`.
    pub fn csv_line(&self) -> String {
        format!(
            "{},{},{},{},{},{},{}",
            self.ts,
            self.power.log_digit(),
            fmt_temp(self.enclosure_temp),
            fmt_temp(self.fermenter_temp),
            self.mode,
            self.reason,
            self.note
        )
    }
}

fn fmt_temp(temp: Option<f64>) -> String {
    match temp {
        Some(t) => format!("{t:.3}"),
        None => "-".to_string(),
    }
}

/// Append-only control log sink.
pub trait LogSink {
    fn append(&mut self, record: &ControlRecord);
}

/// In-memory sink, used by tests and the simulation rig.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<ControlRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LogSink for MemorySink {
    fn append(&mut self, record: &ControlRecord) {
        self.records.push(record.clone());
    }
}
