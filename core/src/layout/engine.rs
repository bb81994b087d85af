//! Layered placement and the merge with previous positions

use std::collections::BTreeMap;

use devlens_shared::{LayoutPosition, NodeKey};
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::Xxh3;

use crate::graph::DependencyGraph;

/// Positions keyed by node, in key order.
pub type LayoutMap = BTreeMap<NodeKey, LayoutPosition>;

fn default_layer_spacing() -> f64 {
    160.0
}

fn default_node_spacing() -> f64 {
    60.0
}

/// Spacing and ordering parameters for automatic placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Vertical distance between layers
    #[serde(default = "default_layer_spacing")]
    pub layer_spacing: f64,
    /// Horizontal distance between nodes of one layer
    #[serde(default = "default_node_spacing")]
    pub node_spacing: f64,
    /// Seed for the per-node ordering keys of the first layer
    #[serde(default)]
    pub seed: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            layer_spacing: default_layer_spacing(),
            node_spacing: default_node_spacing(),
            seed: 0,
        }
    }
}

/// What a layout pass did with each previous entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutReport {
    /// Previous entries with unusable data, recomputed with the override cleared
    pub malformed: Vec<NodeKey>,
    /// Manual positions carried over untouched
    pub kept_manual: Vec<NodeKey>,
    /// Previous automatic positions that were recomputed
    pub recomputed: Vec<NodeKey>,
    /// Nodes seen for the first time
    pub placed: Vec<NodeKey>,
    /// Previous entries whose node left the graph
    pub dropped: Vec<NodeKey>,
}

impl LayoutReport {
    pub fn has_malformed(&self) -> bool {
        !self.malformed.is_empty()
    }
}

/// Output of one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    pub positions: LayoutMap,
    pub report: LayoutReport,
}

/// Computes node positions for a [`DependencyGraph`].
#[derive(Debug, Clone, Default)]
pub struct GraphLayoutEngine {
    config: LayoutConfig,
}

impl GraphLayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lay out `graph`, honoring manual overrides in `previous`.
    ///
    /// Never fails: a malformed previous entry only affects its own node.
    pub fn layout(&self, graph: &DependencyGraph, previous: &LayoutMap) -> LayoutResult {
        let computed = self.place_anchored(graph, previous);
        let mut report = LayoutReport::default();
        let mut positions = LayoutMap::new();

        for (key, fresh) in computed {
            let position = match previous.get(&key) {
                Some(prev) if !prev.is_well_formed() || prev.node_key != key => {
                    tracing::warn!(
                        node = %key,
                        x = prev.x,
                        y = prev.y,
                        "malformed layout entry, recomputing"
                    );
                    report.malformed.push(key.clone());
                    fresh
                }
                Some(prev) if prev.manual_override => {
                    report.kept_manual.push(key.clone());
                    prev.clone()
                }
                Some(_) => {
                    report.recomputed.push(key.clone());
                    fresh
                }
                None => {
                    report.placed.push(key.clone());
                    fresh
                }
            };
            positions.insert(key, position);
        }

        report.dropped = previous
            .keys()
            .filter(|key| !graph.contains(key))
            .cloned()
            .collect();

        tracing::debug!(
            nodes = positions.len(),
            kept_manual = report.kept_manual.len(),
            malformed = report.malformed.len(),
            dropped = report.dropped.len(),
            "layout pass finished"
        );

        LayoutResult { positions, report }
    }

    /// Automatic positions for every node, ignoring any previous state.
    pub fn place(&self, graph: &DependencyGraph) -> LayoutMap {
        let layers = self.order_layers(graph, assign_layers(graph));
        self.positions_for(layers)
    }

    /// Automatic positions that keep the in-layer order of `previous`.
    ///
    /// Each node is ranked by its previous x when that entry is usable, and by
    /// its fresh x otherwise. Existing nodes keep their relative order, so a
    /// node added to a layer shifts its neighbours by half a spacing at most.
    fn place_anchored(&self, graph: &DependencyGraph, previous: &LayoutMap) -> LayoutMap {
        let layers = self.order_layers(graph, assign_layers(graph));
        if previous.is_empty() {
            return self.positions_for(layers);
        }
        let fresh = self.positions_for(layers.clone());
        let anchor = |key: &NodeKey| {
            previous
                .get(key)
                .filter(|p| p.is_well_formed() && p.node_key == *key)
                .or_else(|| fresh.get(key))
                .map_or(0.0, |p| p.x)
        };

        let anchored = layers
            .into_iter()
            .map(|mut layer| {
                layer.sort_by(|a, b| anchor(a).total_cmp(&anchor(b)).then_with(|| a.cmp(b)));
                layer
            })
            .collect();
        self.positions_for(anchored)
    }

    fn positions_for(&self, layers: Vec<Vec<NodeKey>>) -> LayoutMap {
        let mut positions = LayoutMap::new();
        for (depth, layer) in layers.into_iter().enumerate() {
            let y = depth as f64 * self.config.layer_spacing;
            let center = (layer.len() as f64 - 1.0) / 2.0;
            for (slot, key) in layer.into_iter().enumerate() {
                let x = (slot as f64 - center) * self.config.node_spacing;
                positions.insert(key.clone(), LayoutPosition::computed(key, x, y));
            }
        }
        positions
    }

    /// Order nodes inside each layer: seeded per-node keys for the first
    /// layer, then one barycenter sweep downwards.
    fn order_layers(
        &self,
        graph: &DependencyGraph,
        mut layers: Vec<Vec<NodeKey>>,
    ) -> Vec<Vec<NodeKey>> {
        if layers.is_empty() {
            return layers;
        }
        let seed = self.config.seed;
        layers[0].sort_by_cached_key(|key| (order_key(key, seed), key.clone()));

        let mut slot: BTreeMap<NodeKey, usize> = BTreeMap::new();
        for (i, key) in layers[0].iter().enumerate() {
            slot.insert(key.clone(), i);
        }

        for layer in layers.iter_mut().skip(1) {
            let mut weighted: Vec<(f64, NodeKey)> = layer
                .drain(..)
                .map(|key| {
                    let placed: Vec<f64> = graph
                        .predecessors(&key)
                        .into_iter()
                        .filter_map(|p| slot.get(p))
                        .map(|&i| i as f64)
                        .collect();
                    let barycenter = if placed.is_empty() {
                        f64::INFINITY
                    } else {
                        placed.iter().sum::<f64>() / placed.len() as f64
                    };
                    (barycenter, key)
                })
                .collect();
            weighted.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

            for (i, (_, key)) in weighted.into_iter().enumerate() {
                slot.insert(key.clone(), i);
                layer.push(key);
            }
        }

        layers
    }
}

/// Ordering key of a first-layer node. Depends only on the node and the seed.
fn order_key(key: &NodeKey, seed: u64) -> u64 {
    let mut hasher = Xxh3::with_seed(seed);
    hasher.update(key.component_id().as_bytes());
    hasher.update(&[0]);
    hasher.update(key.prop_name().as_bytes());
    hasher.digest()
}

/// Longest-path layering over the condensation of `graph`.
///
/// Members of one strongly connected component share a layer. Each layer is
/// returned in key order.
fn assign_layers(graph: &DependencyGraph) -> Vec<Vec<NodeKey>> {
    let components = graph.components_topological();
    let mut component_of: BTreeMap<&NodeKey, usize> = BTreeMap::new();
    for (c, members) in components.iter().enumerate() {
        for key in members {
            component_of.insert(key, c);
        }
    }

    let mut depth = vec![0usize; components.len()];
    for (c, members) in components.iter().enumerate() {
        let mut d = 0;
        for key in members {
            for pred in graph.predecessors(key) {
                let pc = component_of[pred];
                if pc != c {
                    d = d.max(depth[pc] + 1);
                }
            }
        }
        depth[c] = d;
    }

    let mut layers: Vec<Vec<NodeKey>> = Vec::new();
    for (c, members) in components.iter().enumerate() {
        let d = depth[c];
        if layers.len() <= d {
            layers.resize_with(d + 1, Vec::new);
        }
        layers[d].extend(members.iter().cloned());
    }
    for layer in &mut layers {
        layer.sort();
    }
    layers
}

/// Pin `key` at `(x, y)`.
///
/// Returns false when the node has no position or is already pinned there.
pub fn drag_to(map: &mut LayoutMap, key: &NodeKey, x: f64, y: f64) -> bool {
    if !x.is_finite() || !y.is_finite() {
        tracing::warn!(node = %key, x, y, "ignoring drag to non-finite position");
        return false;
    }
    let Some(pos) = map.get_mut(key) else {
        return false;
    };
    if pos.manual_override && pos.x == x && pos.y == y {
        return false;
    }
    pos.x = x;
    pos.y = y;
    pos.manual_override = true;
    true
}

/// Move `key` by `(dx, dy)` and pin it there.
pub fn drag_by(map: &mut LayoutMap, key: &NodeKey, dx: f64, dy: f64) -> bool {
    let Some((x, y)) = map.get(key).map(|p| (p.x + dx, p.y + dy)) else {
        return false;
    };
    drag_to(map, key, x, y)
}
