//! Edge routing and waypoint generation.
//!
//! Links leave their source through the bottom and enter their target
//! through the top. Horizontal runs happen in the channels between ranks.

use std::collections::HashMap;

use super::layered::LayeredLayout;
use super::types::{ChannelUsage, NodeBox, Placement, RankGraph};

/// Calculate lane offset for centered lane distribution.
#[inline]
pub fn calculate_lane_offset(lane: usize, total: usize, lane_spacing: f64) -> f64 {
    if total <= 1 {
        0.0
    } else {
        (lane as f64 - (total - 1) as f64 / 2.0) * lane_spacing
    }
}

/// Distribute anchor points along a node's horizontal edge.
pub fn distribute_anchor(
    node: &NodeBox,
    position: usize,
    total: usize,
    anchor_spacing: f64,
) -> f64 {
    let cx = node.center_x();
    if total <= 1 {
        cx
    } else {
        let spacing = anchor_spacing.min(node.width / total as f64);
        cx + (position as f64 - (total - 1) as f64 / 2.0) * spacing
    }
}

/// Generate waypoints for a self-referential edge.
pub fn route_self_ref(node: &NodeBox) -> Vec<(f64, f64)> {
    let x = node.x + node.width;
    let y_top = node.y + node.height * 0.3;
    let y_bottom = node.y + node.height * 0.7;
    let loop_offset = 25.0;

    vec![
        (x, y_top),
        (x + loop_offset, y_top),
        (x + loop_offset, y_bottom),
        (x, y_bottom),
    ]
}

/// Adjacent ranks: down into the shared channel, across, down into the target.
pub fn route_through_channel(
    from_node: &NodeBox,
    to_node: &NodeBox,
    from_cx: f64,
    to_cx: f64,
    ch_y: f64,
) -> Vec<(f64, f64)> {
    vec![
        (from_cx, from_node.bottom()),
        (from_cx, ch_y),
        (to_cx, ch_y),
        (to_cx, to_node.y),
    ]
}

/// Non-adjacent ranks (including upward and same-rank links): out through the
/// channel below the source, along the outer corridor, in through the channel
/// above the target.
pub fn route_via_corridor(
    from_node: &NodeBox,
    to_node: &NodeBox,
    from_cx: f64,
    to_cx: f64,
    exit_y: f64,
    entry_y: f64,
    corridor_x: f64,
) -> Vec<(f64, f64)> {
    vec![
        (from_cx, from_node.bottom()),
        (from_cx, exit_y),
        (corridor_x, exit_y),
        (corridor_x, entry_y),
        (to_cx, entry_y),
        (to_cx, to_node.y),
    ]
}

/// Anchor x per edge (by position in `graph.edges`): (source anchor, target anchor).
/// Anchors on a port are ordered by the x of the opposite end.
fn calculate_anchors(
    graph: &RankGraph,
    boxes: &[NodeBox],
    anchor_spacing: f64,
) -> HashMap<usize, (f64, f64)> {
    let mut exits: HashMap<usize, Vec<(usize, f64)>> = HashMap::new();
    let mut entries: HashMap<usize, Vec<(usize, f64)>> = HashMap::new();

    for (idx, e) in graph.edges.iter().enumerate() {
        if e.is_self_ref() {
            continue;
        }
        exits
            .entry(e.from)
            .or_default()
            .push((idx, boxes[e.to].center_x()));
        entries
            .entry(e.to)
            .or_default()
            .push((idx, boxes[e.from].center_x()));
    }

    let mut anchors: HashMap<usize, (f64, f64)> = HashMap::new();
    for (node, mut list) in exits {
        list.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        let total = list.len();
        for (pos, (idx, _)) in list.into_iter().enumerate() {
            anchors.entry(idx).or_insert((0.0, 0.0)).0 =
                distribute_anchor(&boxes[node], pos, total, anchor_spacing);
        }
    }
    for (node, mut list) in entries {
        list.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        let total = list.len();
        for (pos, (idx, _)) in list.into_iter().enumerate() {
            anchors.entry(idx).or_insert((0.0, 0.0)).1 =
                distribute_anchor(&boxes[node], pos, total, anchor_spacing);
        }
    }

    anchors
}

/// Route all edges. Returns waypoints in `graph.edges` order.
pub fn route_edges(
    graph: &RankGraph,
    rank: &[i64],
    usage: &ChannelUsage,
    placement: &Placement,
    settings: &LayeredLayout,
) -> Vec<Vec<(f64, f64)>> {
    let boxes = &placement.boxes;
    let anchors = calculate_anchors(graph, boxes, settings.anchor_spacing);

    let lane_y = |channel: i64, idx: usize| -> f64 {
        let base = placement.channel_y.get(&channel).copied().unwrap_or(0.0);
        let lanes = usage.get(&channel).map(Vec::as_slice).unwrap_or(&[]);
        let lane = lanes.iter().position(|&e| e == idx).unwrap_or(0);
        base + calculate_lane_offset(lane, lanes.len(), settings.lane_spacing)
    };

    let mut corridor_lane = 0usize;

    graph
        .edges
        .iter()
        .enumerate()
        .map(|(idx, e)| {
            let from_node = &boxes[e.from];
            let to_node = &boxes[e.to];

            if e.is_self_ref() {
                return route_self_ref(from_node);
            }

            let (from_cx, to_cx) = anchors
                .get(&idx)
                .copied()
                .unwrap_or((from_node.center_x(), to_node.center_x()));
            let exit = rank[e.from];
            let entry = rank[e.to] - 1;

            if exit == entry {
                route_through_channel(from_node, to_node, from_cx, to_cx, lane_y(exit, idx))
            } else {
                let corridor_x = placement.content_right
                    + settings.corridor_gap
                    + corridor_lane as f64 * settings.lane_spacing;
                corridor_lane += 1;
                route_via_corridor(
                    from_node,
                    to_node,
                    from_cx,
                    to_cx,
                    lane_y(exit, idx),
                    lane_y(entry, idx),
                    corridor_x,
                )
            }
        })
        .collect()
}
