//! Flow-graph construction: classification, multi-source BFS layering,
//! and grid layout.
//!
//! The builder is a total function over any record set — malformed URLs,
//! dangling referrers, self-loops and empty inputs all produce a valid
//! (possibly empty) graph rather than an error.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use crate::normalize::{NormalizedUrl, normalize};
use crate::{FlowEdge, FlowGraph, FlowNode, NodeRole, Position, VisitRecord, palette_color};

/// Horizontal spacing between nodes within a layer, in pixels.
pub const DEFAULT_X_STEP: f64 = 250.0;
/// Vertical spacing between layers, in pixels.
pub const DEFAULT_Y_STEP: f64 = 180.0;

/// Layout spacing knobs for the built graph.
#[derive(Debug, Clone, Copy)]
pub struct FlowLayout {
    pub x_step: f64,
    pub y_step: f64,
}

impl Default for FlowLayout {
    fn default() -> Self {
        Self {
            x_step: DEFAULT_X_STEP,
            y_step: DEFAULT_Y_STEP,
        }
    }
}

/// Build the referrer flow graph for one project's visit records.
pub fn build_flow_graph(records: &[VisitRecord]) -> FlowGraph {
    build_flow_graph_with_layout(records, FlowLayout::default())
}

/// Same as [`build_flow_graph`] with explicit layout spacing.
pub fn build_flow_graph_with_layout(records: &[VisitRecord], layout: FlowLayout) -> FlowGraph {
    if records.is_empty() {
        return FlowGraph::default();
    }

    // Classification order is also the legend/color order.
    let ordered = classify_nodes(records);

    // Adjacency from every record that has a referrer, plus the
    // first-seen order of referrers (BFS seed order must be stable).
    let mut adjacency: HashMap<NormalizedUrl, Vec<NormalizedUrl>> = HashMap::new();
    let mut sources = OrderedSet::new();
    for record in records {
        if let Some(referrer) = &record.referrer {
            let from = normalize(referrer);
            sources.insert(from.clone());
            adjacency.entry(from).or_default().push(normalize(&record.url));
        }
    }

    // Entry nodes: referrers with no incoming edge (nothing refers to
    // them). These seed the BFS at layer 0.
    let edge_targets: HashSet<NormalizedUrl> = records
        .iter()
        .filter(|r| r.referrer.is_some())
        .map(|r| normalize(&r.url))
        .collect();
    let entries: Vec<&NormalizedUrl> = sources
        .items
        .iter()
        .filter(|r| !edge_targets.contains(*r))
        .collect();

    // Multi-source BFS; first discovery wins, so a layer is the shortest
    // hop distance from any entry node.
    let mut layer_of: HashMap<NormalizedUrl, u32> = HashMap::new();
    let mut assigned: Vec<NormalizedUrl> = Vec::new();
    let mut queue: VecDeque<(NormalizedUrl, u32)> =
        entries.iter().map(|&n| (n.clone(), 0)).collect();
    while let Some((node, depth)) = queue.pop_front() {
        if layer_of.contains_key(&node) {
            continue;
        }
        layer_of.insert(node.clone(), depth);
        assigned.push(node.clone());
        if let Some(children) = adjacency.get(&node) {
            for child in children {
                if !layer_of.contains_key(child) {
                    queue.push_back((child.clone(), depth + 1));
                }
            }
        }
    }

    // Nodes BFS never reached (isolated, or targets with no recognized
    // entry upstream) sit at layer 0.
    for (node, _) in &ordered {
        if !layer_of.contains_key(node) {
            layer_of.insert(node.clone(), 0);
            assigned.push(node.clone());
        }
    }

    // Bucket by layer in assignment order. Intra-layer order is
    // deliberately just this insertion order; no canonical tiebreak exists.
    let max_layer = layer_of.values().copied().max().unwrap_or(0);
    let mut layers: Vec<Vec<&NormalizedUrl>> = vec![Vec::new(); max_layer as usize + 1];
    for node in &assigned {
        layers[layer_of[node] as usize].push(node);
    }

    let mut positions: HashMap<&NormalizedUrl, Position> = HashMap::new();
    for (layer_idx, layer) in layers.iter().enumerate() {
        for (idx, &node) in layer.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            positions.insert(
                node,
                Position {
                    x: idx as f64 * layout.x_step,
                    y: layer_idx as f64 * layout.y_step,
                },
            );
        }
    }

    let nodes: Vec<FlowNode> = ordered
        .iter()
        .enumerate()
        .map(|(idx, (id, _))| FlowNode {
            id: id.clone(),
            layer: layer_of[id],
            position: positions[id],
            color: palette_color(idx).to_owned(),
        })
        .collect();

    // Map each normalized URL to its owning project; guards against edges
    // crossing tenants if record sets were ever mixed.
    let url_project: HashMap<NormalizedUrl, &str> = records
        .iter()
        .map(|r| (normalize(&r.url), r.project.as_str()))
        .collect();

    let edges: Vec<FlowEdge> = records
        .iter()
        .enumerate()
        .filter_map(|(idx, record)| {
            let referrer = record.referrer.as_deref()?;
            let target = normalize(&record.url);
            if url_project.get(&target) != Some(&record.project.as_str()) {
                return None;
            }
            let source = normalize(referrer);
            Some(FlowEdge {
                id: format!("{source}->{target}-{idx}"),
                source,
                target,
            })
        })
        .collect();

    debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        layers = layers.len(),
        "Built flow graph"
    );

    FlowGraph { nodes, edges }
}

/// Classify every node in a record set by its role: external sources
/// first, then pass-through pages, then terminals, each group in
/// first-seen order. The sets are Vec-backed so insertion order survives.
pub fn classify_nodes(records: &[VisitRecord]) -> Vec<(NormalizedUrl, NodeRole)> {
    let mut urls = OrderedSet::new();
    let mut referrers = OrderedSet::new();
    for record in records {
        urls.insert(normalize(&record.url));
        if let Some(referrer) = &record.referrer {
            referrers.insert(normalize(referrer));
        }
    }
    let mut ordered = Vec::new();
    for r in &referrers.items {
        if !urls.contains(r) {
            ordered.push((r.clone(), NodeRole::Source));
        }
    }
    for u in &urls.items {
        if referrers.contains(u) {
            ordered.push((u.clone(), NodeRole::Passthrough));
        }
    }
    for u in &urls.items {
        if !referrers.contains(u) {
            ordered.push((u.clone(), NodeRole::Terminal));
        }
    }
    ordered
}

/// Vec-backed set preserving first-insertion order.
struct OrderedSet {
    items: Vec<NormalizedUrl>,
    seen: HashSet<NormalizedUrl>,
}

impl OrderedSet {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn insert(&mut self, item: NormalizedUrl) {
        if self.seen.insert(item.clone()) {
            self.items.push(item);
        }
    }

    fn contains(&self, item: &NormalizedUrl) -> bool {
        self.seen.contains(item)
    }
}
