//! Node placement: ranks stacked top to bottom, rows centered.

use std::collections::BTreeMap;

use super::layered::LayeredLayout;
use super::types::{ChannelUsage, NodeBox, Placement};

/// Channel height needed for `edge_count` parallel lanes.
pub fn channel_gap(edge_count: usize, settings: &LayeredLayout) -> f64 {
    let needed = settings.entity_margin * 2.0
        + (edge_count.saturating_sub(1) as f64) * settings.lane_spacing;
    needed.max(settings.rank_gap)
}

/// Place nodes given their sizes and in-rank ordering.
pub fn place_nodes(
    sizes: &[(f64, f64)],
    layers: &[Vec<usize>],
    usage: &ChannelUsage,
    settings: &LayeredLayout,
) -> Placement {
    let used = |channel: i64| usage.get(&channel).map_or(0, Vec::len);

    let top_extra = match used(-1) {
        0 => 0.0,
        n => channel_gap(n, settings),
    };

    let row_widths: Vec<f64> = layers
        .iter()
        .map(|layer| {
            let widths: f64 = layer.iter().map(|&n| sizes[n].0).sum();
            widths + layer.len().saturating_sub(1) as f64 * settings.node_gap_x
        })
        .collect();
    let max_row = row_widths.iter().copied().fold(0.0, f64::max);

    let mut boxes = vec![
        NodeBox {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
        };
        sizes.len()
    ];
    let mut channel_y: BTreeMap<i64, f64> = BTreeMap::new();
    let mut y = settings.margin + top_extra;

    if top_extra > 0.0 {
        channel_y.insert(-1, y - top_extra / 2.0);
    }

    for (r, layer) in layers.iter().enumerate() {
        let mut x = settings.margin + (max_row - row_widths[r]) / 2.0;
        let mut max_height: f64 = 0.0;

        for &node in layer {
            let (w, h) = sizes[node];
            boxes[node] = NodeBox {
                x,
                y,
                width: w,
                height: h,
            };
            x += w + settings.node_gap_x;
            max_height = max_height.max(h);
        }

        let is_last = r + 1 == layers.len();
        let gap = match (is_last, used(r as i64)) {
            (true, 0) => 0.0,
            (_, n) => channel_gap(n, settings),
        };
        channel_y.insert(r as i64, y + max_height + gap / 2.0);
        y += max_height + gap;
    }

    Placement {
        boxes,
        channel_y,
        content_right: settings.margin + max_row,
    }
}
