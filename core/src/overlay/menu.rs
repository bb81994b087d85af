//! Debug menu and callbacks panel views

use devlens_shared::{CallbackId, LayoutPosition, NodeKey, ProfileSample};

use super::stats::{OverlayStat, sample_stats};
use crate::graph::{GraphEdge, NodeRoles};
use crate::layout::LayoutReport;

/// What the debug menu shows. Only exists while the UI is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugMenu {
    pub open: bool,
    /// Callbacks graph button pressed
    pub callbacks_open: bool,
    /// Number of entries in the visible error list
    pub error_count: usize,
    /// Hot reload indicator
    pub hot_reload: bool,
}

/// Live timing of one callback attached to a node.
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackSampleView {
    pub callback_id: CallbackId,
    /// `None` until the callback has run or been pinned
    pub sample: Option<ProfileSample>,
    pub calls: u64,
}

impl CallbackSampleView {
    pub fn stats(&self) -> Vec<OverlayStat> {
        sample_stats(self.sample.as_ref(), self.calls)
    }
}

/// A node as drawn in the callbacks panel.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeView {
    pub key: NodeKey,
    pub roles: NodeRoles,
    pub position: LayoutPosition,
    /// Owning callbacks, in registration order
    pub callbacks: Vec<CallbackSampleView>,
}

/// Everything the callbacks panel needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackGraphView {
    /// Nodes in key order
    pub nodes: Vec<NodeView>,
    pub edges: Vec<GraphEdge>,
    /// Advisory; drawn highlighted, never an error
    pub cycles: Vec<Vec<NodeKey>>,
    /// Result of the most recent layout pass
    pub report: LayoutReport,
}

impl CallbackGraphView {
    pub fn node(&self, key: &NodeKey) -> Option<&NodeView> {
        self.nodes.iter().find(|n| &n.key == key)
    }

    pub fn position(&self, key: &NodeKey) -> Option<&LayoutPosition> {
        self.node(key).map(|n| &n.position)
    }
}
