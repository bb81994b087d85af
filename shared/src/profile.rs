//! Callback timing records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::CallbackId;

/// How a profiled invocation ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum InvocationOutcome {
    /// Callback returned and its outputs were applied.
    Success,
    /// Callback ran but declined to update its outputs.
    NoUpdate,
    /// Callback raised; timing covers the work done up to the failure.
    Failed(String),
}

impl InvocationOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, InvocationOutcome::Failed(_))
    }

    /// Short label used by the overlay.
    pub fn label(&self) -> &'static str {
        match self {
            InvocationOutcome::Success => "success",
            InvocationOutcome::NoUpdate => "no_update",
            InvocationOutcome::Failed(_) => "failed",
        }
    }
}

/// Network phase of a single invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkTiming {
    /// Milliseconds spent waiting on round trips
    pub time: f64,
    /// Request payload size in bytes
    pub upload: u64,
    /// Response payload size in bytes
    pub download: u64,
}

/// Timing breakdown for the most recent invocation of one callback.
///
/// Samples are published whole; readers never observe a half-written record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSample {
    pub callback_id: CallbackId,
    /// Wall time minus network time, in milliseconds
    pub compute: f64,
    pub network: NetworkTiming,
    /// Wall time of the whole invocation, in milliseconds
    pub total: f64,
    pub timestamp: DateTime<Utc>,
    pub outcome: InvocationOutcome,
}

impl ProfileSample {
    /// A sample with fixed timings, as written by tooling that pins values.
    pub fn fixed(callback_id: CallbackId, compute: f64, network: f64, total: f64) -> Self {
        Self {
            callback_id,
            compute,
            network: NetworkTiming {
                time: network,
                ..NetworkTiming::default()
            },
            total,
            timestamp: Utc::now(),
            outcome: InvocationOutcome::Success,
        }
    }
}
