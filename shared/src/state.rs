//! Snapshot of the debug state read by the rendering layer.
//!
//! Serializes as
//! `{"profile": {"callbacks": {...}, "graphLayout": {"positions": {...}}}}`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::layout::LayoutPosition;
use crate::profile::{NetworkTiming, ProfileSample};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservableState {
    pub profile: ProfileState,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileState {
    /// Keyed by callback id
    pub callbacks: BTreeMap<String, CallbackProfileView>,
    pub graph_layout: GraphLayoutState,
}

/// One callback's live sample plus its invocation count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackProfileView {
    pub compute: f64,
    pub network: NetworkTiming,
    pub total: f64,
    pub calls: u64,
    pub status: String,
}

impl CallbackProfileView {
    pub fn new(sample: &ProfileSample, calls: u64) -> Self {
        Self {
            compute: sample.compute,
            network: sample.network,
            total: sample.total,
            calls,
            status: sample.outcome.label().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphLayoutState {
    /// Keyed by `"componentId.propName"`
    pub positions: BTreeMap<String, PositionView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionView {
    pub x: f64,
    pub y: f64,
}

impl From<&LayoutPosition> for PositionView {
    fn from(pos: &LayoutPosition) -> Self {
        Self { x: pos.x, y: pos.y }
    }
}

impl ObservableState {
    pub fn callback(&self, id: &str) -> Option<&CallbackProfileView> {
        self.profile.callbacks.get(id)
    }

    pub fn position(&self, node_key: &str) -> Option<PositionView> {
        self.profile.graph_layout.positions.get(node_key).copied()
    }
}
