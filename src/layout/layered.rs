//! Default hierarchical layout engine.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::analysis::{acyclic_edges, assign_ranks, channel_usage, order_layers};
use super::placement::place_nodes;
use super::routing::route_edges;
use super::serialized::{SerializedDiagram, SerializedPoint};
use super::types::RankGraph;
use super::{LayoutEngine, LayoutError};

/// Layered layout: FK holders above the tables they reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayeredLayout {
    /// Space around the diagram
    pub margin: f64,
    /// Horizontal gap between nodes in a rank
    pub node_gap_x: f64,
    /// Minimum height of the routing channel between ranks
    pub rank_gap: f64,
    /// Spacing between parallel edges in one channel or corridor
    pub lane_spacing: f64,
    /// Spacing between link anchors on one port
    pub anchor_spacing: f64,
    /// Minimum distance from a node edge to a channel lane
    pub entity_margin: f64,
    /// Distance from the widest rank to the outer corridor
    pub corridor_gap: f64,
    /// Barycenter ordering passes
    pub ordering_sweeps: usize,
}

impl Default for LayeredLayout {
    fn default() -> Self {
        Self {
            margin: 40.0,
            node_gap_x: 60.0,
            rank_gap: 80.0,
            lane_spacing: 16.0,
            anchor_spacing: 24.0,
            entity_margin: 20.0,
            corridor_gap: 40.0,
            ordering_sweeps: 8,
        }
    }
}

impl LayoutEngine for LayeredLayout {
    fn layout(&self, mut diagram: SerializedDiagram) -> Result<SerializedDiagram, LayoutError> {
        if diagram.nodes.is_empty() {
            return Ok(diagram);
        }

        // Phase 1: ranks
        let graph = RankGraph::from_diagram(&diagram)?;
        if !graph.edges.is_empty() && graph.edges.iter().all(|e| e.is_self_ref()) {
            warn!(links = graph.edges.len(), "every link is a self reference; ranks are flat");
        }
        let ranked = acyclic_edges(&graph);
        let rank = assign_ranks(graph.node_count, &ranked);

        // Phase 2: ordering within ranks
        let layers = order_layers(&graph, &rank, self.ordering_sweeps);

        // Phase 3: placement
        let usage = channel_usage(&graph, &rank);
        let sizes: Vec<(f64, f64)> = diagram.nodes.iter().map(|n| (n.width, n.height)).collect();
        let placement = place_nodes(&sizes, &layers, &usage, self);

        // Phase 4: routing
        let routes = route_edges(&graph, &rank, &usage, &placement, self);

        for (node, b) in diagram.nodes.iter_mut().zip(&placement.boxes) {
            node.x = b.x;
            node.y = b.y;
        }
        for (edge, points) in graph.edges.iter().zip(routes) {
            diagram.links[edge.link].points = points
                .into_iter()
                .map(|(x, y)| SerializedPoint { x, y })
                .collect();
        }

        debug!(
            nodes = diagram.nodes.len(),
            links = diagram.links.len(),
            ranks = layers.len(),
            "layered layout done"
        );

        Ok(diagram)
    }
}
