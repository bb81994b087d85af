//! Graph node positions.

use serde::{Deserialize, Serialize};

use crate::ids::NodeKey;

/// Where a graph node sits on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPosition {
    pub node_key: NodeKey,
    pub x: f64,
    pub y: f64,
    /// Set by a user drag; automatic layout leaves such nodes alone
    #[serde(default)]
    pub manual_override: bool,
}

impl LayoutPosition {
    /// A position produced by the automatic layout.
    pub fn computed(node_key: NodeKey, x: f64, y: f64) -> Self {
        Self {
            node_key,
            x,
            y,
            manual_override: false,
        }
    }

    /// A position set by the user.
    pub fn manual(node_key: NodeKey, x: f64, y: f64) -> Self {
        Self {
            node_key,
            x,
            y,
            manual_override: true,
        }
    }

    /// Both coordinates are finite numbers.
    pub fn is_well_formed(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}
