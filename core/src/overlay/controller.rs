//! Debug overlay controller
//!
//! Glue between the host framework and the dev tools. The host calls in on
//! render, on callback registration and around each callback invocation; the
//! rendering layer reads [`DebugOverlayController::menu`],
//! [`DebugOverlayController::callbacks_view`] and
//! [`DebugOverlayController::observable_state`].

use std::fmt::Display;

use devlens_shared::{
    CallbackId, CallbackProfileView, NodeKey, ObservableState, PositionView, ProfileSample,
};
use serde_json::{Map, Value};

use super::menu::{CallbackGraphView, CallbackSampleView, DebugMenu, NodeView};
use super::session::{DebugSessionState, OverlayError};
use super::sink::{ConsoleLevel, ConsoleSink, TracingSink};
use super::stats::{OverlayStat, StatValue};
use crate::config::DevToolsConfig;
use crate::graph::{CallbackSpec, fingerprint};
use crate::layout::{GraphLayoutEngine, drag_by, drag_to};
use crate::profiler::InvocationToken;
use crate::validation::{PropSchema, PropValidator, ValidationViolation};

pub struct DebugOverlayController<S: ConsoleSink = TracingSink> {
    config: DevToolsConfig,
    validator: PropValidator,
    engine: GraphLayoutEngine,
    specs: Vec<CallbackSpec>,
    session: Option<DebugSessionState>,
    sink: S,
    /// Number of times the validator was run
    validation_passes: u64,
}

impl DebugOverlayController<TracingSink> {
    pub fn new(config: DevToolsConfig) -> Self {
        Self::with_sink(config, TracingSink)
    }
}

impl<S: ConsoleSink> DebugOverlayController<S> {
    pub fn with_sink(config: DevToolsConfig, sink: S) -> Self {
        tracing::debug!(
            props_check = config.props_check,
            ui = config.ui,
            hot_reload = config.hot_reload,
            "dev tools configured"
        );
        Self {
            engine: GraphLayoutEngine::new(config.layout),
            config,
            validator: PropValidator::new(),
            specs: Vec::new(),
            session: None,
            sink,
            validation_passes: 0,
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    pub fn config(&self) -> &DevToolsConfig {
        &self.config
    }

    pub fn is_ui_enabled(&self) -> bool {
        self.config.ui
    }

    pub fn is_hot_reload_enabled(&self) -> bool {
        self.config.hot_reload
    }

    pub fn is_props_check_enabled(&self) -> bool {
        self.config.props_check
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    // =========================================================================
    // Prop validation
    // =========================================================================

    /// Declare a component schema. Replaces any earlier declaration.
    pub fn register_schema(&mut self, schema: PropSchema) {
        self.validator.register(schema);
    }

    pub fn validator(&self) -> &PropValidator {
        &self.validator
    }

    /// Render hook: validate `props` when enabled and hand them back untouched.
    ///
    /// Invalid props never stop the render.
    pub fn render_component(
        &mut self,
        component_type: &str,
        component_id: Option<&str>,
        props: Map<String, Value>,
    ) -> Map<String, Value> {
        if self.config.props_check {
            self.validation_passes += 1;
            let violations = self.validator.validate(component_type, component_id, &props);
            if !violations.is_empty() {
                self.report_violations(violations);
            }
        }
        props
    }

    /// Send violations to the console and, with the UI on, the error list.
    pub fn report_violations(&mut self, violations: Vec<ValidationViolation>) {
        for violation in violations {
            self.sink.emit(ConsoleLevel::Error, &violation.message);
            if self.config.ui {
                self.session_mut().errors.push(OverlayError::Violation(violation));
            }
        }
    }

    /// How many render passes ran the validator
    pub fn validation_passes(&self) -> u64 {
        self.validation_passes
    }

    // =========================================================================
    // Menu and callbacks panel
    // =========================================================================

    /// The debug menu, or `None` when the UI is disabled.
    pub fn menu(&self) -> Option<DebugMenu> {
        if !self.config.ui {
            return None;
        }
        let session = self.session.as_ref();
        Some(DebugMenu {
            open: session.is_some_and(|s| s.menu_open),
            callbacks_open: session.is_some_and(|s| s.callbacks_open),
            error_count: session.map_or(0, |s| s.errors.len()),
            hot_reload: self.config.hot_reload,
        })
    }

    /// Open or close the menu. Returns the new open state.
    ///
    /// Closing the menu also closes the callbacks panel.
    pub fn toggle_menu(&mut self) -> bool {
        if !self.config.ui {
            return false;
        }
        let session = self.session_mut();
        session.menu_open = !session.menu_open;
        if !session.menu_open {
            session.callbacks_open = false;
        }
        session.menu_open
    }

    /// Show or hide the callbacks graph. Returns the new state.
    ///
    /// Only works while the menu is open.
    pub fn toggle_callbacks_panel(&mut self) -> bool {
        if !self.config.ui {
            return false;
        }
        let specs = &self.specs;
        let session = self.session.get_or_insert_with(DebugSessionState::new);
        if !session.menu_open {
            return false;
        }
        session.callbacks_open = !session.callbacks_open;
        if session.callbacks_open {
            session.sync_graph(specs);
            session.scheduler.request(session.generation);
        }
        session.callbacks_open
    }

    /// Graph, positions and live samples for the open callbacks panel.
    ///
    /// Runs any pending layout first. `None` while the panel is closed.
    pub fn callbacks_view(&mut self) -> Option<CallbackGraphView> {
        if !self.config.ui {
            return None;
        }
        let (specs, engine) = (&self.specs, &self.engine);
        let session = self.session.as_mut()?;
        if !session.callbacks_open {
            return None;
        }
        session.sync_graph(specs);
        session.run_layout(engine);

        let graph = session.graph.as_ref()?;
        let nodes = graph
            .nodes()
            .filter_map(|node| {
                let position = session.positions.get(&node.key)?.clone();
                let callbacks = node
                    .callbacks
                    .iter()
                    .map(|id| CallbackSampleView {
                        callback_id: id.clone(),
                        sample: session.profiler.sample(id).cloned(),
                        calls: session.profiler.calls(id),
                    })
                    .collect();
                Some(NodeView {
                    key: node.key.clone(),
                    roles: node.roles,
                    position,
                    callbacks,
                })
            })
            .collect();

        Some(CallbackGraphView {
            nodes,
            edges: graph.edges().collect(),
            cycles: graph.cycles().to_vec(),
            report: session.last_report.clone(),
        })
    }

    /// Pin a node at `(x, y)`.
    pub fn drag_node_to(&mut self, key: &NodeKey, x: f64, y: f64) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if !session.has_position(key) {
            tracing::debug!(node = %key, "drag on a node with no position");
            return false;
        }
        drag_to(&mut session.positions, key, x, y)
    }

    /// Move a node by `(dx, dy)` and pin it.
    pub fn drag_node_by(&mut self, key: &NodeKey, dx: f64, dy: f64) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if !session.has_position(key) {
            tracing::debug!(node = %key, "drag on a node with no position");
            return false;
        }
        drag_by(&mut session.positions, key, dx, dy)
    }

    // =========================================================================
    // Callback registration and profiling
    // =========================================================================

    /// Install the app's callback definitions.
    ///
    /// A spec set with a new fingerprint resets the session. Returns true in
    /// that case.
    pub fn register_callbacks(&mut self, specs: Vec<CallbackSpec>) -> bool {
        let changed = fingerprint(&specs) != fingerprint(&self.specs);
        self.specs = specs;
        if !changed {
            return false;
        }
        tracing::info!(callbacks = self.specs.len(), "app definition changed");
        if let Some(session) = self.session.as_mut() {
            let next = session.successor();
            *session = next;
        }
        true
    }

    pub fn specs(&self) -> &[CallbackSpec] {
        &self.specs
    }

    /// Callbacks fired, in order, by a change to `changed`.
    ///
    /// Uses the session graph, building it only when the spec set changed.
    pub fn callbacks_triggered_by(&mut self, changed: &NodeKey) -> Vec<CallbackId> {
        let specs = &self.specs;
        let session = self.session.get_or_insert_with(DebugSessionState::new);
        session.sync_graph(specs);
        session
            .graph
            .as_ref()
            .map(|graph| graph.triggered_by(changed))
            .unwrap_or_default()
    }

    pub fn begin_invocation(&mut self, callback_id: CallbackId) -> InvocationToken {
        self.session_mut().profiler.begin(callback_id)
    }

    pub fn end_invocation(&mut self, token: InvocationToken) -> &ProfileSample {
        self.session_mut().profiler.end(token)
    }

    pub fn end_invocation_no_update(&mut self, token: InvocationToken) -> &ProfileSample {
        self.session_mut().profiler.end_no_update(token)
    }

    /// Record a failed invocation and surface its message.
    pub fn fail_invocation(
        &mut self,
        token: InvocationToken,
        reason: impl Display,
    ) -> &ProfileSample {
        let callback_id = token.callback_id().clone();
        let message = format!("Callback error updating {callback_id}: {reason}");
        self.sink.emit(ConsoleLevel::Error, &message);

        let ui = self.config.ui;
        let session = self.session_mut();
        if ui {
            session.errors.push(OverlayError::Callback {
                callback_id,
                message,
            });
        }
        session.profiler.fail(token, reason)
    }

    /// Overwrite the live sample for a callback.
    pub fn pin_sample(&mut self, sample: ProfileSample) {
        self.session_mut().profiler.set_sample(sample);
    }

    pub fn sample(&self, callback_id: &CallbackId) -> Option<&ProfileSample> {
        self.session.as_ref()?.profiler.sample(callback_id)
    }

    // =========================================================================
    // State access
    // =========================================================================

    /// Snapshot read by the rendering layer.
    pub fn observable_state(&self) -> ObservableState {
        let mut state = ObservableState::default();
        let Some(session) = &self.session else {
            return state;
        };

        for sample in session.profiler.samples() {
            let calls = session.profiler.calls(&sample.callback_id);
            state.profile.callbacks.insert(
                sample.callback_id.to_string(),
                CallbackProfileView::new(sample, calls),
            );
        }
        for (key, position) in &session.positions {
            state
                .profile
                .graph_layout
                .positions
                .insert(key.to_string(), PositionView::from(position));
        }
        state
    }

    /// Visible error list. Empty when the UI is disabled.
    pub fn errors(&self) -> &[OverlayError] {
        self.session
            .as_ref()
            .map(DebugSessionState::errors)
            .unwrap_or_default()
    }

    pub fn clear_errors(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.errors.clear();
        }
    }

    pub fn session(&self) -> Option<&DebugSessionState> {
        self.session.as_ref()
    }

    /// Summary numbers for the menu footer.
    pub fn stats(&self) -> Vec<OverlayStat> {
        let session = self.session.as_ref();
        let graph = session.and_then(|s| s.graph.as_ref());
        vec![
            OverlayStat::new("callbacks", StatValue::count(self.specs.len())),
            OverlayStat::new("profiled", StatValue::count(session.map_or(0, |s| s.profiler.len()))),
            OverlayStat::new("nodes", StatValue::count(graph.map_or(0, |g| g.node_count()))),
            OverlayStat::new("edges", StatValue::count(graph.map_or(0, |g| g.edge_count()))),
            OverlayStat::new("errors", StatValue::count(session.map_or(0, |s| s.errors.len()))),
            OverlayStat::new(
                "layout passes",
                StatValue::Count(session.map_or(0, |s| s.scheduler.passes())),
            ),
        ]
    }

    /// End the session and drop all its state.
    pub fn teardown(&mut self) {
        if self.session.take().is_some() {
            tracing::debug!("debug session torn down");
        }
    }

    fn session_mut(&mut self) -> &mut DebugSessionState {
        self.session.get_or_insert_with(|| {
            tracing::debug!("debug session started");
            DebugSessionState::new()
        })
    }
}
