//! Dependency graph construction
//!
//! Nodes are the union of every input, output and state reference; edges run
//! from each input to each output of a callback. The graph is fully determined
//! by the spec set and is never edited by hand.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use devlens_shared::{CallbackId, NodeKey};
use petgraph::Directed;
use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use smallvec::SmallVec;
use xxhash_rust::xxh3::Xxh3;

use super::spec::CallbackSpec;

/// How callbacks use a node. A node can play several roles at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeRoles {
    pub input: bool,
    pub output: bool,
    pub state: bool,
}

/// A component property referenced by at least one callback.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub key: NodeKey,
    pub roles: NodeRoles,
    /// Callbacks that read or write this node, in registration order
    pub callbacks: SmallVec<[CallbackId; 2]>,
}

/// Directed input -> output edge contributed by one callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdge {
    pub from: NodeKey,
    pub to: NodeKey,
    pub callback: CallbackId,
}

/// Graph derived from a set of callback specs.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    inner: StableGraph<GraphNode, CallbackId, Directed>,
    /// Key-ordered index; iteration order of `nodes()`
    index: BTreeMap<NodeKey, NodeIndex>,
    specs: Vec<CallbackSpec>,
    cycles: Vec<Vec<NodeKey>>,
    fingerprint: u64,
}

impl DependencyGraph {
    /// Build the graph implied by `specs`.
    ///
    /// Cycles are recorded for display, never rejected.
    pub fn build(specs: &[CallbackSpec]) -> Self {
        let mut graph = Self {
            inner: StableGraph::new(),
            index: BTreeMap::new(),
            specs: specs.to_vec(),
            cycles: Vec::new(),
            fingerprint: fingerprint(specs),
        };

        for spec in specs {
            for key in spec.inputs() {
                graph.touch(key, spec.id()).input = true;
            }
            for key in spec.outputs() {
                graph.touch(key, spec.id()).output = true;
            }
            for key in spec.state() {
                graph.touch(key, spec.id()).state = true;
            }

            for input in spec.inputs() {
                for output in spec.outputs() {
                    let (from, to) = (graph.index[input], graph.index[output]);
                    graph.inner.add_edge(from, to, spec.id().clone());
                }
            }
        }

        graph.cycles = graph.find_cycles();

        tracing::debug!(
            callbacks = specs.len(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "dependency graph built"
        );
        if !graph.cycles.is_empty() {
            tracing::warn!(
                cycles = graph.cycles.len(),
                "callback graph contains circular dependencies"
            );
        }

        graph
    }

    fn touch(&mut self, key: &NodeKey, callback: &CallbackId) -> &mut NodeRoles {
        let idx = match self.index.get(key) {
            Some(&idx) => idx,
            None => {
                let idx = self.inner.add_node(GraphNode {
                    key: key.clone(),
                    roles: NodeRoles::default(),
                    callbacks: SmallVec::new(),
                });
                self.index.insert(key.clone(), idx);
                idx
            }
        };

        let node = &mut self.inner[idx];
        if !node.callbacks.contains(callback) {
            node.callbacks.push(callback.clone());
        }
        &mut node.roles
    }

    fn find_cycles(&self) -> Vec<Vec<NodeKey>> {
        let mut cycles: Vec<Vec<NodeKey>> = tarjan_scc(&self.inner)
            .into_iter()
            .filter(|scc| scc.len() > 1 || self.inner.find_edge(scc[0], scc[0]).is_some())
            .map(|scc| self.sorted_keys(&scc))
            .collect();
        cycles.sort();
        cycles
    }

    fn sorted_keys(&self, indices: &[NodeIndex]) -> Vec<NodeKey> {
        let mut keys: Vec<NodeKey> = indices.iter().map(|&i| self.inner[i].key.clone()).collect();
        keys.sort();
        keys
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Nodes in key order
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.index.values().map(|&idx| &self.inner[idx])
    }

    pub fn node_keys(&self) -> impl Iterator<Item = &NodeKey> {
        self.index.keys()
    }

    pub fn node(&self, key: &NodeKey) -> Option<&GraphNode> {
        self.index.get(key).map(|&idx| &self.inner[idx])
    }

    pub fn contains(&self, key: &NodeKey) -> bool {
        self.index.contains_key(key)
    }

    /// Edges in registration order
    pub fn edges(&self) -> impl Iterator<Item = GraphEdge> + '_ {
        self.inner.edge_references().map(|edge| GraphEdge {
            from: self.inner[edge.source()].key.clone(),
            to: self.inner[edge.target()].key.clone(),
            callback: edge.weight().clone(),
        })
    }

    /// Distinct nodes with an edge into `key`, in key order.
    pub fn predecessors(&self, key: &NodeKey) -> Vec<&NodeKey> {
        self.neighbors(key, Direction::Incoming)
    }

    /// Distinct nodes `key` has an edge to, in key order.
    pub fn successors(&self, key: &NodeKey) -> Vec<&NodeKey> {
        self.neighbors(key, Direction::Outgoing)
    }

    fn neighbors(&self, key: &NodeKey, direction: Direction) -> Vec<&NodeKey> {
        let Some(&idx) = self.index.get(key) else {
            return Vec::new();
        };
        let found: BTreeSet<&NodeKey> = self
            .inner
            .neighbors_directed(idx, direction)
            .map(|n| &self.inner[n].key)
            .collect();
        found.into_iter().collect()
    }

    /// Callbacks that read or write `key`.
    pub fn callbacks_for(&self, key: &NodeKey) -> &[CallbackId] {
        self.node(key).map(|n| n.callbacks.as_slice()).unwrap_or(&[])
    }

    /// Strongly connected groups of nodes that depend on themselves.
    pub fn cycles(&self) -> &[Vec<NodeKey>] {
        &self.cycles
    }

    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }

    /// Strongly connected components in topological order, each sorted by key.
    ///
    /// Acyclic graphs yield one singleton per node.
    pub fn components_topological(&self) -> Vec<Vec<NodeKey>> {
        // tarjan_scc reports components in reverse topological order.
        tarjan_scc(&self.inner)
            .into_iter()
            .rev()
            .map(|scc| self.sorted_keys(&scc))
            .collect()
    }

    /// Callbacks fired, in order, when `changed` is updated.
    ///
    /// Follows outputs of fired callbacks into further inputs; each callback
    /// fires at most once per change.
    pub fn triggered_by(&self, changed: &NodeKey) -> Vec<CallbackId> {
        let mut fired: Vec<CallbackId> = Vec::new();
        let mut seen: BTreeSet<&NodeKey> = BTreeSet::new();
        let mut queue: VecDeque<&NodeKey> = VecDeque::from([changed]);

        while let Some(prop) = queue.pop_front() {
            if !seen.insert(prop) {
                continue;
            }
            for spec in &self.specs {
                if fired.contains(spec.id()) || !spec.inputs().contains(prop) {
                    continue;
                }
                fired.push(spec.id().clone());
                queue.extend(spec.outputs());
            }
        }

        fired
    }

    pub fn specs(&self) -> &[CallbackSpec] {
        &self.specs
    }

    /// Fingerprint of the spec set this graph was built from.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// True when `specs` differs from the set this graph was built from.
    pub fn is_stale(&self, specs: &[CallbackSpec]) -> bool {
        fingerprint(specs) != self.fingerprint
    }
}

/// Order-independent hash of a callback spec set.
pub fn fingerprint(specs: &[CallbackSpec]) -> u64 {
    let mut per_spec: Vec<u64> = specs.iter().map(spec_hash).collect();
    per_spec.sort_unstable();

    let mut hasher = Xxh3::new();
    for h in per_spec {
        hasher.update(&h.to_le_bytes());
    }
    hasher.digest()
}

fn spec_hash(spec: &CallbackSpec) -> u64 {
    let mut hasher = Xxh3::new();
    hasher.update(spec.id().as_str().as_bytes());
    for (tag, keys) in [
        (b'i', spec.inputs().iter().collect::<Vec<_>>()),
        (b'o', spec.outputs().iter().collect()),
        (b's', spec.state().iter().collect()),
    ] {
        hasher.update(&[0, tag]);
        for key in keys {
            hasher.update(key.to_string().as_bytes());
            hasher.update(&[0]);
        }
    }
    hasher.digest()
}
