//! Shared test utilities for integration and unit tests

use std::time::{Duration, Instant};

use anyhow::{Context, bail};
use devlens_shared::{CallbackId, NodeKey};
use serde::Deserialize;

use crate::config::DevToolsConfig;
use crate::graph::CallbackSpec;
use crate::overlay::{ConsoleSink, DebugOverlayController, MemorySink};
use crate::validation::{PropKind, PropSchema, PropSpec};

// ============================================================================
// Todo app fixture
// ============================================================================

/// Callback definitions of a small todo app, in the framework's wire format.
pub const TODO_DEPENDENCIES: &str = r#"[
    {
        "output": "..list-container.children...new-item.value..",
        "inputs": [
            {"id": "add", "property": "n_clicks"},
            {"id": "new-item", "property": "n_submit"}
        ],
        "state": [
            {"id": "new-item", "property": "value"},
            {"id": "list-container", "property": "children"}
        ]
    },
    {
        "output": "totals.children",
        "inputs": [{"id": "list-container", "property": "children"}],
        "state": []
    },
    {
        "output": "clear-done.style",
        "inputs": [{"id": "list-container", "property": "children"}],
        "state": []
    },
    {
        "output": "filter-label.children",
        "inputs": [{"id": "filter", "property": "value"}],
        "state": []
    },
    {
        "output": "status.children",
        "inputs": [{"id": "ping", "property": "n_clicks"}]
    }
]"#;

#[derive(Debug, Deserialize)]
struct WireDependency {
    output: String,
    inputs: Vec<WireRef>,
    #[serde(default)]
    state: Vec<WireRef>,
}

#[derive(Debug, Deserialize)]
struct WireRef {
    id: String,
    property: String,
}

impl WireRef {
    fn key(&self) -> anyhow::Result<NodeKey> {
        NodeKey::new(&self.id, &self.property)
            .with_context(|| format!("bad reference {}.{}", self.id, self.property))
    }
}

/// Split `..a.b...c.d..` (or a plain `a.b`) into node keys.
fn parse_outputs(output: &str) -> anyhow::Result<Vec<NodeKey>> {
    let parts: Vec<&str> = match output.strip_prefix("..").and_then(|s| s.strip_suffix("..")) {
        Some(inner) => inner.split("...").collect(),
        None => vec![output],
    };
    if parts.iter().any(|p| p.is_empty()) {
        bail!("malformed output list `{output}`");
    }
    parts
        .into_iter()
        .map(|p| p.parse::<NodeKey>().with_context(|| format!("in `{output}`")))
        .collect()
}

/// Parse a dependency list in the framework's JSON format.
pub fn load_dependencies(json: &str) -> anyhow::Result<Vec<CallbackSpec>> {
    let wire: Vec<WireDependency> = serde_json::from_str(json).context("dependency JSON")?;
    wire.into_iter()
        .map(|dep| {
            let outputs = parse_outputs(&dep.output)?;
            let inputs = dep
                .inputs
                .iter()
                .map(WireRef::key)
                .collect::<anyhow::Result<Vec<_>>>()?;
            let state = dep
                .state
                .iter()
                .map(WireRef::key)
                .collect::<anyhow::Result<Vec<_>>>()?;
            Ok(CallbackSpec::new(outputs, inputs).with_state(state))
        })
        .collect()
}

pub fn todo_specs() -> Vec<CallbackSpec> {
    load_dependencies(TODO_DEPENDENCIES).unwrap()
}

/// Schemas for the components the todo app renders.
pub fn todo_schemas() -> Vec<PropSchema> {
    vec![
        PropSchema::builder("Input")
            .optional("id", PropKind::String)
            .optional("value", PropKind::String)
            .optional("n_submit", PropKind::Integer)
            .build(),
        PropSchema::builder("Button")
            .optional("id", PropKind::String)
            .optional("n_clicks", PropKind::Integer)
            .optional("children", PropKind::Any)
            .build(),
        PropSchema::builder("Graph")
            .optional("id", PropKind::String)
            .optional("animate", PropKind::Bool)
            .optional("figure", PropKind::object_of(PropKind::Any))
            .build(),
        PropSchema::builder("Dropdown")
            .optional("id", PropKind::String)
            .optional(
                "options",
                PropKind::array_of(PropKind::shape([
                    ("label", PropSpec::required(PropKind::String)),
                    ("value", PropSpec::required(PropKind::String)),
                ])),
            )
            .optional("value", PropKind::String)
            .build(),
    ]
}

// ============================================================================
// Harness
// ============================================================================

/// A controller wired to an in-memory console with the todo app registered.
pub fn todo_controller(
    config: DevToolsConfig,
) -> (DebugOverlayController<MemorySink>, MemorySink) {
    let sink = MemorySink::new();
    let mut controller = DebugOverlayController::with_sink(config, sink.clone());
    for schema in todo_schemas() {
        controller.register_schema(schema);
    }
    controller.register_callbacks(todo_specs());
    (controller, sink)
}

/// Open the menu and the callbacks panel.
pub fn open_callbacks_panel<S: ConsoleSink>(controller: &mut DebugOverlayController<S>) {
    if !controller.menu().is_some_and(|m| m.open) {
        controller.toggle_menu();
    }
    if !controller.menu().is_some_and(|m| m.callbacks_open) {
        controller.toggle_callbacks_panel();
    }
}

/// Simulate a user change to `prop`: run every callback it triggers with a
/// fixed network round trip. Returns the fired callback ids.
pub fn fire<S: ConsoleSink>(
    controller: &mut DebugOverlayController<S>,
    prop: &str,
    network: Duration,
) -> Vec<CallbackId> {
    let changed: NodeKey = prop.parse().unwrap();
    let fired = controller.callbacks_triggered_by(&changed);
    for id in &fired {
        let mut token = controller.begin_invocation(id.clone());
        token.record_network_round_trip(network);
        controller.end_invocation(token);
    }
    fired
}

/// Instants `ms` apart starting now, for deterministic timing.
pub fn instants(ms: &[u64]) -> Vec<Instant> {
    let base = Instant::now();
    ms.iter().map(|&m| base + Duration::from_millis(m)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_fixture_parses() {
        let specs = todo_specs();
        assert_eq!(specs.len(), 5);
        assert_eq!(
            specs[0].id().as_str(),
            "..list-container.children...new-item.value.."
        );
        assert_eq!(specs[0].state().len(), 2);
        assert_eq!(specs[1].id().as_str(), "totals.children");
    }

    #[test]
    fn malformed_fixture_is_an_error() {
        assert!(load_dependencies("not json").is_err());
        assert!(load_dependencies(r#"[{"output": "....", "inputs": []}]"#).is_err());
        assert!(load_dependencies(r#"[{"output": "nodot", "inputs": []}]"#).is_err());
    }
}
