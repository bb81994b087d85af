//! Graph layout
//!
//! [`GraphLayoutEngine`] places nodes in layers and merges the result with the
//! previous positions so user drags survive every recomputation.
//! [`LayoutScheduler`] decides when a pass actually runs.

mod engine;
mod scheduler;

pub use engine::{
    GraphLayoutEngine, LayoutConfig, LayoutMap, LayoutReport, LayoutResult, drag_by, drag_to,
};
pub use scheduler::{LayoutPass, LayoutScheduler};
