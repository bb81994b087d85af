//! Display-ready statistics for the overlay
//!
//! Rows shown next to graph nodes and in the menu footer. Values stay typed
//! until they are displayed.

use std::fmt;

use devlens_shared::ProfileSample;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;

/// The value of one stat row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatValue {
    /// Milliseconds, shown with one decimal
    Millis(f64),
    /// Payload size, shown as B/KB/MB
    Bytes(u64),
    Count(u64),
    /// Outcome label of the last invocation
    Status(&'static str),
}

impl StatValue {
    pub fn count(n: usize) -> Self {
        StatValue::Count(n as u64)
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            StatValue::Millis(ms) => write!(f, "{ms:.1} ms"),
            StatValue::Bytes(b) if b >= MIB => write!(f, "{:.1} MB", b as f64 / MIB as f64),
            StatValue::Bytes(b) if b >= KIB => write!(f, "{:.1} KB", b as f64 / KIB as f64),
            StatValue::Bytes(b) => write!(f, "{b} B"),
            StatValue::Count(n) => write!(f, "{n}"),
            StatValue::Status(label) => f.write_str(label),
        }
    }
}

/// A labelled stat row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStat {
    pub name: &'static str,
    pub value: StatValue,
}

impl OverlayStat {
    pub const fn new(name: &'static str, value: StatValue) -> Self {
        Self { name, value }
    }
}

impl fmt::Display for OverlayStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

/// Rows for one callback. A callback that has not run only shows its status.
pub fn sample_stats(sample: Option<&ProfileSample>, calls: u64) -> Vec<OverlayStat> {
    let Some(sample) = sample else {
        return vec![OverlayStat::new("status", StatValue::Status("not run"))];
    };
    vec![
        OverlayStat::new("compute", StatValue::Millis(sample.compute)),
        OverlayStat::new("network", StatValue::Millis(sample.network.time)),
        OverlayStat::new("total", StatValue::Millis(sample.total)),
        OverlayStat::new("upload", StatValue::Bytes(sample.network.upload)),
        OverlayStat::new("download", StatValue::Bytes(sample.network.download)),
        OverlayStat::new("calls", StatValue::Count(calls)),
        OverlayStat::new("status", StatValue::Status(sample.outcome.label())),
    ]
}
