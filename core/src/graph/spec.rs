//! Callback registrations

use std::collections::BTreeSet;

use devlens_shared::{CallbackId, NodeKey, NodeKeyError};

/// Declared inputs, outputs and state of one registered callback.
///
/// Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallbackSpec {
    id: CallbackId,
    inputs: Vec<NodeKey>,
    outputs: Vec<NodeKey>,
    state: BTreeSet<NodeKey>,
}

impl CallbackSpec {
    /// Create a spec whose id is derived from its outputs.
    pub fn new(outputs: Vec<NodeKey>, inputs: Vec<NodeKey>) -> Self {
        Self {
            id: CallbackId::from_outputs(&outputs),
            inputs,
            outputs,
            state: BTreeSet::new(),
        }
    }

    /// Parse `"component.prop"` strings into a spec.
    ///
    /// ```
    /// # use devlens_core::graph::CallbackSpec;
    /// let spec = CallbackSpec::parse(&["totals.children"], &["list.children"], &[]).unwrap();
    /// assert_eq!(spec.id().as_str(), "totals.children");
    /// ```
    pub fn parse(outputs: &[&str], inputs: &[&str], state: &[&str]) -> Result<Self, NodeKeyError> {
        let parse_all = |refs: &[&str]| -> Result<Vec<NodeKey>, NodeKeyError> {
            refs.iter().map(|r| r.parse()).collect()
        };
        Ok(Self::new(parse_all(outputs)?, parse_all(inputs)?).with_state(parse_all(state)?))
    }

    pub fn with_state(mut self, state: impl IntoIterator<Item = NodeKey>) -> Self {
        self.state.extend(state);
        self
    }

    /// Replace the derived id with an explicit one.
    pub fn with_id(mut self, id: CallbackId) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> &CallbackId {
        &self.id
    }

    pub fn inputs(&self) -> &[NodeKey] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[NodeKey] {
        &self.outputs
    }

    pub fn state(&self) -> &BTreeSet<NodeKey> {
        &self.state
    }

    /// Every node this callback touches.
    pub fn refs(&self) -> impl Iterator<Item = &NodeKey> {
        self.inputs
            .iter()
            .chain(self.outputs.iter())
            .chain(self.state.iter())
    }

    /// `|inputs| * |outputs|`
    pub fn edge_count(&self) -> usize {
        self.inputs.len() * self.outputs.len()
    }
}
