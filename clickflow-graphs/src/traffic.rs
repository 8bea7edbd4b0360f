//! Traffic projection: the flow graph collapsed into a weighted digraph.
//!
//! Where [`crate::FlowGraph`] keeps one edge per visit so a renderer can
//! show volume as parallel strands, the projection sums multiplicity into
//! edge weights and answers "who sends traffic here, and how much" per node.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::{Direction, visit::EdgeRef};

use crate::FlowGraph;
use crate::normalize::NormalizedUrl;

/// Weighted digraph over normalized URLs; edge weight is visit count.
pub struct TrafficProjection {
    pub graph: DiGraph<NormalizedUrl, u64>,
    pub node_to_index: HashMap<NormalizedUrl, NodeIndex>,
    pub index_to_node: HashMap<NodeIndex, NormalizedUrl>,
}

/// One neighbor of a node together with the summed visit count on that edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborTraffic {
    pub url: NormalizedUrl,
    pub visits: u64,
}

impl TrafficProjection {
    /// Collapse a flow graph's parallel edges into per-pair weights.
    pub fn from_flow(flow: &FlowGraph) -> Self {
        let estimated_nodes = flow.node_count();
        let mut graph = DiGraph::<NormalizedUrl, u64>::with_capacity(estimated_nodes, flow.edge_count());
        let mut node_to_index: HashMap<NormalizedUrl, NodeIndex> =
            HashMap::with_capacity(estimated_nodes);
        let mut index_to_node: HashMap<NodeIndex, NormalizedUrl> =
            HashMap::with_capacity(estimated_nodes);

        for node in &flow.nodes {
            node_to_index.entry(node.id.clone()).or_insert_with(|| {
                let idx = graph.add_node(node.id.clone());
                index_to_node.insert(idx, node.id.clone());
                idx
            });
        }

        // Parallel flow edges sum onto one weighted edge per (source, target).
        let mut weights: HashMap<(NodeIndex, NodeIndex), u64> = HashMap::new();
        for edge in &flow.edges {
            if let (Some(&src), Some(&tgt)) = (
                node_to_index.get(&edge.source),
                node_to_index.get(&edge.target),
            ) {
                *weights.entry((src, tgt)).or_insert(0) += 1;
            }
        }
        for ((src, tgt), count) in weights {
            graph.add_edge(src, tgt, count);
        }

        Self {
            graph,
            node_to_index,
            index_to_node,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Pages and sources sending traffic into `url`, with visit counts.
    pub fn incoming(&self, url: &NormalizedUrl) -> Vec<NeighborTraffic> {
        self.neighbors(url, Direction::Incoming)
    }

    /// Pages receiving traffic from `url`, with visit counts.
    pub fn outgoing(&self, url: &NormalizedUrl) -> Vec<NeighborTraffic> {
        self.neighbors(url, Direction::Outgoing)
    }

    /// Total visits arriving at `url` from any neighbor.
    pub fn inbound_visits(&self, url: &NormalizedUrl) -> u64 {
        self.incoming(url).iter().map(|n| n.visits).sum()
    }

    fn neighbors(&self, url: &NormalizedUrl, direction: Direction) -> Vec<NeighborTraffic> {
        let Some(&idx) = self.node_to_index.get(url) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(idx, direction)
            .map(|edge| {
                let other = match direction {
                    Direction::Incoming => edge.source(),
                    Direction::Outgoing => edge.target(),
                };
                NeighborTraffic {
                    url: self.index_to_node[&other].clone(),
                    visits: *edge.weight(),
                }
            })
            .collect()
    }
}
