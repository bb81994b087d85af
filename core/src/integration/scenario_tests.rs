//! End-to-end scenarios against the todo app fixture

use std::collections::BTreeSet;
use std::time::Duration;

use devlens_shared::{CallbackId, NodeKey, ProfileSample};
use serde_json::{Map, Value, json};

use crate::config::DevToolsConfig;
use crate::graph::{CallbackSpec, DependencyGraph};
use crate::overlay::CallbackGraphView;
use crate::test_utils::*;

fn props(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("props must be an object"),
    }
}

fn key(s: &str) -> NodeKey {
    s.parse().unwrap()
}

/// Scenario A: invalid prop with props checking off renders untouched.
#[test]
fn test_invalid_prop_with_props_check_disabled() {
    let (mut controller, sink) = todo_controller(DevToolsConfig {
        props_check: false,
        ..DevToolsConfig::default()
    });
    let input = props(json!({"id": "broken", "animate": 3}));

    let rendered = controller.render_component("Graph", Some("broken"), input.clone());

    assert_eq!(rendered, input);
    assert_eq!(controller.validation_passes(), 0);
    assert!(sink.is_empty());
    assert_eq!(controller.menu().unwrap().error_count, 0);
}

/// Scenario B: UI off still reports to the console, with no menu.
#[test]
fn test_ui_disabled_reports_to_console_only() {
    let (mut controller, sink) = todo_controller(DevToolsConfig {
        ui: false,
        ..DevToolsConfig::default()
    });

    let input = props(json!({"id": "broken", "animate": 3}));
    let rendered = controller.render_component("Graph", Some("broken"), input.clone());

    assert_eq!(rendered, input);
    assert!(controller.menu().is_none());
    assert!(sink.contains("Invalid argument `animate` passed into Graph"));
    assert_eq!(
        sink.messages()[0],
        "Invalid argument `animate` passed into Graph with ID \"broken\".\n\
         Expected `boolean`.\n\
         Was supplied type `number`.\n\
         Value provided: 3"
    );
    assert!(controller.errors().is_empty());
}

/// Scenario C: a click updates only the sample of the callback it fires.
#[test]
fn test_click_updates_only_fired_callback() {
    let (mut controller, _) = todo_controller(DevToolsConfig::default());
    let ids: Vec<CallbackId> = todo_specs().iter().map(|s| s.id().clone()).collect();
    for id in &ids {
        controller.pin_sample(ProfileSample::fixed(id.clone(), 44.0, 33.0, 77.0));
    }

    let fired = fire(&mut controller, "ping.n_clicks", Duration::ZERO);
    assert_eq!(fired, [CallbackId::new("status.children")]);

    let state = controller.observable_state();
    for id in &ids {
        let view = state.callback(id.as_str()).unwrap();
        if fired.contains(id) {
            assert_eq!(view.calls, 1);
            assert!(view.total < 77.0);
            assert_eq!(view.compute + view.network.time, view.total);
        } else {
            assert_eq!((view.compute, view.network.time, view.total), (44.0, 33.0, 77.0));
            assert_eq!(view.calls, 0);
        }
    }
}

/// Scenario D: a drag sticks through unrelated invocations and reopening.
#[test]
fn test_dragged_node_survives_reopen() {
    let (mut controller, _) = todo_controller(DevToolsConfig::default());
    open_callbacks_panel(&mut controller);
    let target = key("totals.children");
    let before_y = controller.callbacks_view().unwrap().position(&target).unwrap().y;

    assert!(controller.drag_node_by(&target, 0.0, -100.0));
    fire(&mut controller, "ping.n_clicks", Duration::from_millis(2));

    // Close and reopen the panel.
    controller.toggle_callbacks_panel();
    open_callbacks_panel(&mut controller);

    let first = controller.callbacks_view().unwrap();
    let second = controller.callbacks_view().unwrap();
    let y = first.position(&target).unwrap().y;
    assert_eq!(before_y - y, 100.0);
    assert_eq!(first.position(&target), second.position(&target));
    assert_eq!(
        controller.observable_state().position("totals.children").unwrap().y,
        y
    );
}

/// Manual positions survive re-registration of the same spec set and the
/// invocations that follow.
#[test]
fn test_manual_position_survives_same_spec_set() {
    let (mut controller, _) = todo_controller(DevToolsConfig::default());
    open_callbacks_panel(&mut controller);
    controller.callbacks_view();
    let target = key("filter.value");
    assert!(controller.drag_node_to(&target, -250.0, 40.0));

    let mut reordered = todo_specs();
    reordered.rotate_left(2);
    assert!(!controller.register_callbacks(reordered));
    fire(&mut controller, "add.n_clicks", Duration::from_millis(1));

    let view = controller.callbacks_view().unwrap();
    let pos = view.position(&target).unwrap();
    assert_eq!((pos.x, pos.y, pos.manual_override), (-250.0, 40.0, true));
}

/// Node set and edge count follow the registered specs.
#[test]
fn test_graph_matches_registrations() {
    let (mut controller, _) = todo_controller(DevToolsConfig::default());
    open_callbacks_panel(&mut controller);
    let view = controller.callbacks_view().unwrap();

    let specs = todo_specs();
    let declared: BTreeSet<NodeKey> = specs.iter().flat_map(|s| s.refs().cloned()).collect();
    let shown: BTreeSet<NodeKey> = view.nodes.iter().map(|n| n.key.clone()).collect();
    assert_eq!(shown, declared);
    assert_eq!(
        view.edges.len(),
        specs.iter().map(CallbackSpec::edge_count).sum::<usize>()
    );
    assert!(view.cycles.is_empty());
    assert!(!view.report.has_malformed());
}

/// Reopening the panel without changes lays out to the same positions.
#[test]
fn test_reopen_is_stable() {
    let (mut controller, _) = todo_controller(DevToolsConfig::default());
    open_callbacks_panel(&mut controller);
    let first = controller.callbacks_view().unwrap();
    controller.toggle_menu();
    open_callbacks_panel(&mut controller);
    let second = controller.callbacks_view().unwrap();

    let positions = |v: &CallbackGraphView| {
        v.nodes.iter().map(|n| n.position.clone()).collect::<Vec<_>>()
    };
    assert_eq!(positions(&first), positions(&second));
}

/// Valid props and opening the graph are silent.
#[test]
fn test_valid_session_is_silent() {
    let (mut controller, sink) = todo_controller(DevToolsConfig::default());

    controller.render_component("Input", Some("new-item"), props(json!({"value": "milk"})));
    controller.render_component("Button", Some("add"), props(json!({"n_clicks": 0})));
    controller.render_component(
        "Dropdown",
        Some("filter"),
        props(json!({"options": [{"label": "All", "value": "all"}], "value": "all"})),
    );
    open_callbacks_panel(&mut controller);
    controller.callbacks_view().unwrap();
    fire(&mut controller, "add.n_clicks", Duration::ZERO);

    assert_eq!(controller.validation_passes(), 3);
    assert!(sink.is_empty());
    assert!(controller.errors().is_empty());
}

/// One add click runs the add callback and everything downstream of it.
#[test]
fn test_add_click_cascades() {
    let (mut controller, _) = todo_controller(DevToolsConfig::default());
    let fired = fire(&mut controller, "add.n_clicks", Duration::ZERO);
    let fired: Vec<&str> = fired.iter().map(CallbackId::as_str).collect();
    assert_eq!(
        fired,
        [
            "..list-container.children...new-item.value..",
            "totals.children",
            "clear-done.style",
        ]
    );

    let state = controller.observable_state();
    assert!(state.callback("filter-label.children").is_none());
    assert_eq!(state.callback("totals.children").unwrap().status, "success");
}

/// Cycles are shown, not rejected.
#[test]
fn test_cyclic_app_still_opens() {
    let (mut controller, sink) = todo_controller(DevToolsConfig::default());
    let mut specs = todo_specs();
    specs.push(
        CallbackSpec::parse(&["list-container.children"], &["totals.children"], &[]).unwrap(),
    );
    assert!(DependencyGraph::build(&specs).has_cycles());
    controller.register_callbacks(specs);

    open_callbacks_panel(&mut controller);
    let view = controller.callbacks_view().unwrap();
    assert_eq!(
        view.cycles,
        [vec![key("list-container.children"), key("totals.children")]]
    );
    assert!(sink.is_empty());
}

/// Teardown ends the session; a later session starts clean.
#[test]
fn test_teardown_then_new_session() {
    let (mut controller, _) = todo_controller(DevToolsConfig::default());
    controller.render_component("Graph", None, props(json!({"animate": "yes"})));
    fire(&mut controller, "ping.n_clicks", Duration::ZERO);
    assert_eq!(controller.errors().len(), 1);

    controller.teardown();
    assert!(controller.errors().is_empty());
    assert!(controller.observable_state().profile.callbacks.is_empty());

    fire(&mut controller, "ping.n_clicks", Duration::ZERO);
    let state = controller.observable_state();
    assert_eq!(state.callback("status.children").unwrap().calls, 1);
}
