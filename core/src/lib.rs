//! Devlens Core - runtime introspection for callback-driven UIs
//!
//! Validates component props, times every reactive callback, derives the
//! callback dependency graph and lays it out with positions the user can pin.
//!
//! # Architecture
//!
//! - [`PropValidator`] - Structural prop checks against declared schemas
//! - [`CallbackProfiler`] - Per-invocation timing with independent tokens
//! - [`DependencyGraph`] - Graph of component properties built from callback specs
//! - [`GraphLayoutEngine`] - Layered placement that preserves manual overrides
//! - [`DebugOverlayController`] - Session state and the views the overlay renders

pub mod config;
pub mod graph;
#[cfg(test)]
mod integration;
pub mod layout;
pub mod logging;
pub mod overlay;
pub mod profiler;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use config::{ConfigError, DevToolsConfig};
pub use graph::{CallbackSpec, DependencyGraph, GraphEdge, GraphNode, NodeRoles};
pub use layout::{
    GraphLayoutEngine, LayoutConfig, LayoutMap, LayoutReport, LayoutResult, LayoutScheduler,
};
pub use overlay::{
    CallbackGraphView, ConsoleLevel, ConsoleSink, DebugMenu, DebugOverlayController,
    DebugSessionState, MemorySink, OverlayError, TracingSink,
};
pub use profiler::{CallbackProfiler, InvocationToken};
pub use validation::{PropKind, PropSchema, PropSpec, PropValidator, ValidationViolation};

// Re-export shared types
pub use devlens_shared::{
    CallbackId, InvocationOutcome, LayoutPosition, NodeKey, NodeKeyError, ObservableState,
    ProfileSample,
};
