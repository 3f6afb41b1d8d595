//! Data structures for layout computation.

use std::collections::BTreeMap;

/// A node's box in the layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NodeBox {
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Edge between node indices; `link` indexes the serialized link list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphEdge {
    pub link: usize,
    pub from: usize,
    pub to: usize,
}

impl GraphEdge {
    pub fn is_self_ref(&self) -> bool {
        self.from == self.to
    }
}

/// Index-based view of a serialized diagram.
#[derive(Debug, Clone)]
pub struct RankGraph {
    pub node_count: usize,
    pub edges: Vec<GraphEdge>,
}

/// Channel index -> edges (by position in `RankGraph::edges`) routed through it.
/// Channel N is below rank N; channel -1 is above rank 0.
pub type ChannelUsage = BTreeMap<i64, Vec<usize>>;

/// Result of node placement phase.
#[derive(Debug, Clone)]
pub struct Placement {
    pub boxes: Vec<NodeBox>,
    /// Channel index -> center Y coordinate
    pub channel_y: BTreeMap<i64, f64>,
    /// Right edge of the widest rank
    pub content_right: f64,
}
