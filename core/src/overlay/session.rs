//! Per-session debug state
//!
//! Created lazily by the controller, replaced when the app is redefined and
//! dropped at teardown. Nothing here outlives the session.

use devlens_shared::{CallbackId, NodeKey};

use crate::graph::{CallbackSpec, DependencyGraph, fingerprint};
use crate::layout::{GraphLayoutEngine, LayoutMap, LayoutReport, LayoutScheduler};
use crate::profiler::CallbackProfiler;
use crate::validation::ValidationViolation;

/// An entry in the visible error list.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayError {
    /// Invalid prop reported during a render pass
    Violation(ValidationViolation),
    /// Callback raised during an invocation
    Callback {
        callback_id: CallbackId,
        message: String,
    },
}

impl OverlayError {
    pub fn message(&self) -> &str {
        match self {
            OverlayError::Violation(v) => &v.message,
            OverlayError::Callback { message, .. } => message,
        }
    }
}

#[derive(Debug, Default)]
pub struct DebugSessionState {
    pub(crate) errors: Vec<OverlayError>,
    pub(crate) profiler: CallbackProfiler,
    pub(crate) graph: Option<DependencyGraph>,
    pub(crate) positions: LayoutMap,
    pub(crate) last_report: LayoutReport,
    pub(crate) menu_open: bool,
    pub(crate) callbacks_open: bool,
    pub(crate) scheduler: LayoutScheduler,
    /// Bumped whenever the graph is rebuilt
    pub(crate) generation: u64,
}

impl DebugSessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh state for a redefined app.
    ///
    /// Positions and panel flags carry over; the next layout pass drops nodes
    /// that no longer exist.
    pub(crate) fn successor(&mut self) -> Self {
        Self {
            positions: std::mem::take(&mut self.positions),
            menu_open: self.menu_open,
            callbacks_open: self.callbacks_open,
            ..Self::default()
        }
    }

    pub fn errors(&self) -> &[OverlayError] {
        &self.errors
    }

    pub fn profiler(&self) -> &CallbackProfiler {
        &self.profiler
    }

    pub fn graph(&self) -> Option<&DependencyGraph> {
        self.graph.as_ref()
    }

    pub fn positions(&self) -> &LayoutMap {
        &self.positions
    }

    pub fn last_report(&self) -> &LayoutReport {
        &self.last_report
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn scheduler(&self) -> &LayoutScheduler {
        &self.scheduler
    }

    /// Rebuild the graph if it is missing or was built from other specs.
    ///
    /// Returns true when a rebuild happened.
    pub(crate) fn sync_graph(&mut self, specs: &[CallbackSpec]) -> bool {
        let current = fingerprint(specs);
        if self.graph.as_ref().map(DependencyGraph::fingerprint) == Some(current) {
            return false;
        }
        self.graph = Some(DependencyGraph::build(specs));
        self.generation += 1;
        true
    }

    /// Run queued layout passes for the current generation.
    pub(crate) fn run_layout(&mut self, engine: &GraphLayoutEngine) {
        self.scheduler.request(self.generation);
        while let Some(pass) = self.scheduler.begin() {
            if let Some(graph) = &self.graph {
                let result = engine.layout(graph, &self.positions);
                self.positions = result.positions;
                self.last_report = result.report;
            }
            self.scheduler.complete(pass);
        }
    }

    pub(crate) fn has_position(&self, key: &NodeKey) -> bool {
        self.positions.contains_key(key)
    }
}
