//! Callback dependency graph
//!
//! [`DependencyGraph::build`] turns the registered [`CallbackSpec`]s into a
//! directed graph of component properties. It is rebuilt only when the spec
//! set changes (see [`fingerprint`]), never per invocation.

mod builder;
mod spec;

pub use builder::{DependencyGraph, GraphEdge, GraphNode, NodeRoles, fingerprint};
pub use spec::CallbackSpec;
