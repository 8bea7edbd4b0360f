//! Flow-graph engine — turns flat page-visit records into a layered,
//! renderable referrer graph.
//!
//! The main entry point is [`flow::build_flow_graph`], which normalizes URL
//! identities, assigns BFS layers and layout coordinates, and emits the
//! node/edge lists a graph widget consumes. [`traffic::TrafficProjection`]
//! collapses the parallel edges into per-neighbor visit counts.

pub mod flow;
pub mod normalize;
pub mod traffic;

use serde::{Deserialize, Serialize};

pub use normalize::{NormalizedUrl, normalize};

/// Error type for the flow-graph engine.
///
/// Graph construction itself is total; errors only arise at the export
/// boundary.
#[derive(thiserror::Error, Debug)]
pub enum GraphError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GraphError>;

// ── Input record ───────────────────────────────────────────────────

/// A single page visit as seen by the graph builder.
///
/// `project` is an opaque tenant key; edges are only emitted when the
/// visited URL belongs to the same project as the record itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitRecord {
    pub url: String,
    pub referrer: Option<String>,
    pub project: String,
}

// ── Graph output ───────────────────────────────────────────────────

/// 2D layout position, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// One node per distinct normalized URL in the record set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowNode {
    /// The normalized key — the sole node identity.
    pub id: NormalizedUrl,
    /// BFS depth from the entry nodes; 0 for entries and unreached nodes.
    pub layer: u32,
    pub position: Position,
    /// Palette color, assigned cyclically by classification order.
    pub color: String,
}

/// How a node participates in the record set. Determines color/legend
/// ordering only, never layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRole {
    /// Appears only as a referrer — an external traffic source.
    Source,
    /// Appears as both referrer and visited URL — an internal page.
    Passthrough,
    /// Appears only as a visited URL — a terminal/landing page.
    Terminal,
}

/// One edge per visit record that has a referrer. Parallel edges are
/// preserved; multiplicity encodes traffic volume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowEdge {
    /// `"{source}->{target}-{index}"` — keeps parallel edges distinct.
    pub id: String,
    pub source: NormalizedUrl,
    pub target: NormalizedUrl,
}

/// The built graph: nodes in classification order, edges in record order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

impl FlowGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Look up a node by its normalized key.
    pub fn node(&self, id: &NormalizedUrl) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Serialize the graph for an external rendering widget.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Fixed 8-color node palette, cycled by classification-order index.
pub const PALETTE: [&str; 8] = [
    "#6366f1", // indigo
    "#f59e42", // orange
    "#10b981", // green
    "#ef4444", // red
    "#3b82f6", // blue
    "#eab308", // yellow
    "#a21caf", // purple
    "#14b8a6", // teal
];

/// Palette lookup by index, wrapping past the end.
pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}
