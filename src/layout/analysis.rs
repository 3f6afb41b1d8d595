//! Rank assignment and in-rank ordering.

use std::collections::HashMap;

use super::LayoutError;
use super::serialized::SerializedDiagram;
use super::types::{ChannelUsage, GraphEdge, RankGraph};

impl RankGraph {
    /// Resolve link endpoints to node indices.
    pub fn from_diagram(diagram: &SerializedDiagram) -> Result<Self, LayoutError> {
        let index: HashMap<&str, usize> = diagram
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect();

        let edges = diagram
            .links
            .iter()
            .enumerate()
            .map(|(link, l)| {
                let from = *index
                    .get(l.source.as_str())
                    .ok_or_else(|| LayoutError::UnknownNode(l.source.clone()))?;
                let to = *index
                    .get(l.target.as_str())
                    .ok_or_else(|| LayoutError::UnknownNode(l.target.clone()))?;
                Ok(GraphEdge { link, from, to })
            })
            .collect::<Result<Vec<_>, LayoutError>>()?;

        Ok(Self {
            node_count: diagram.nodes.len(),
            edges,
        })
    }
}

/// Break cycles by reversing DFS back edges. Self-references are dropped.
/// Returns (upper, lower) node pairs.
pub fn acyclic_edges(graph: &RankGraph) -> Vec<(usize, usize)> {
    let mut out: Vec<Vec<usize>> = vec![Vec::new(); graph.node_count];
    for edge in &graph.edges {
        if !edge.is_self_ref() {
            out[edge.from].push(edge.to);
        }
    }

    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        New,
        OnStack,
        Done,
    }

    let mut mark = vec![Mark::New; graph.node_count];
    let mut result = Vec::new();

    for root in 0..graph.node_count {
        if mark[root] != Mark::New {
            continue;
        }
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
        mark[root] = Mark::OnStack;

        while let Some(top) = stack.last_mut() {
            let (node, next) = *top;
            if let Some(&to) = out[node].get(next) {
                top.1 += 1;
                match mark[to] {
                    Mark::OnStack => result.push((to, node)),
                    Mark::Done => result.push((node, to)),
                    Mark::New => {
                        result.push((node, to));
                        mark[to] = Mark::OnStack;
                        stack.push((to, 0));
                    }
                }
            } else {
                mark[node] = Mark::Done;
                stack.pop();
            }
        }
    }

    result
}

/// Longest-path ranking: every node sits at least one rank below each of
/// its predecessors. Nodes without predecessors get rank 0.
pub fn assign_ranks(node_count: usize, edges: &[(usize, usize)]) -> Vec<i64> {
    let mut indegree = vec![0usize; node_count];
    let mut succ: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for &(from, to) in edges {
        succ[from].push(to);
        indegree[to] += 1;
    }

    let mut rank = vec![0i64; node_count];
    let mut ready: Vec<usize> = (0..node_count).filter(|&n| indegree[n] == 0).rev().collect();

    while let Some(node) = ready.pop() {
        for &to in &succ[node] {
            rank[to] = rank[to].max(rank[node] + 1);
            indegree[to] -= 1;
            if indegree[to] == 0 {
                ready.push(to);
            }
        }
    }

    rank
}

/// Group nodes into ranks, keeping input order within a rank.
pub fn group_by_rank(rank: &[i64]) -> Vec<Vec<usize>> {
    let max_rank = rank.iter().copied().max().unwrap_or(0);
    let mut layers: Vec<Vec<usize>> = vec![Vec::new(); max_rank as usize + 1];
    for (node, &r) in rank.iter().enumerate() {
        layers[r as usize].push(node);
    }
    layers
}

fn positions(layers: &[Vec<usize>], node_count: usize) -> Vec<usize> {
    let mut pos = vec![0usize; node_count];
    for layer in layers {
        for (i, &node) in layer.iter().enumerate() {
            pos[node] = i;
        }
    }
    pos
}

/// Count crossings between adjacent ranks.
pub fn count_crossings(layers: &[Vec<usize>], rank: &[i64], graph: &RankGraph) -> usize {
    let pos = positions(layers, graph.node_count);
    let mut total = 0;

    for r in 0..layers.len().saturating_sub(1) as i64 {
        let segments: Vec<(usize, usize)> = graph
            .edges
            .iter()
            .filter_map(|e| {
                if rank[e.from] == r && rank[e.to] == r + 1 {
                    Some((pos[e.from], pos[e.to]))
                } else if rank[e.to] == r && rank[e.from] == r + 1 {
                    Some((pos[e.to], pos[e.from]))
                } else {
                    None
                }
            })
            .collect();

        for (i, a) in segments.iter().enumerate() {
            for b in &segments[i + 1..] {
                if (a.0 < b.0 && a.1 > b.1) || (a.0 > b.0 && a.1 < b.1) {
                    total += 1;
                }
            }
        }
    }

    total
}

/// Barycenter sweeps alternating down and up; keeps the ordering with the
/// fewest crossings seen.
pub fn order_layers(graph: &RankGraph, rank: &[i64], sweeps: usize) -> Vec<Vec<usize>> {
    let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); graph.node_count];
    for e in graph.edges.iter().filter(|e| !e.is_self_ref()) {
        neighbors[e.from].push(e.to);
        neighbors[e.to].push(e.from);
    }

    let mut layers = group_by_rank(rank);
    let mut best = layers.clone();
    let mut best_crossings = count_crossings(&layers, rank, graph);

    for sweep in 0..sweeps {
        if best_crossings == 0 {
            break;
        }
        let down = sweep % 2 == 0;
        let order: Vec<usize> = if down {
            (1..layers.len()).collect()
        } else {
            (0..layers.len().saturating_sub(1)).rev().collect()
        };

        for r in order {
            let pos = positions(&layers, graph.node_count);
            let mut keyed: Vec<(usize, f64)> = layers[r]
                .iter()
                .map(|&node| {
                    let fixed: Vec<usize> = neighbors[node]
                        .iter()
                        .copied()
                        .filter(|&n| {
                            if down {
                                rank[n] < r as i64
                            } else {
                                rank[n] > r as i64
                            }
                        })
                        .collect();
                    let key = if fixed.is_empty() {
                        pos[node] as f64
                    } else {
                        fixed.iter().map(|&n| pos[n] as f64).sum::<f64>() / fixed.len() as f64
                    };
                    (node, key)
                })
                .collect();
            keyed.sort_by(|a, b| a.1.total_cmp(&b.1));
            layers[r] = keyed.into_iter().map(|(node, _)| node).collect();
        }

        let crossings = count_crossings(&layers, rank, graph);
        if crossings < best_crossings {
            best_crossings = crossings;
            best = layers.clone();
        }
    }

    best
}

/// Channels each edge passes through: the one below its source rank and the
/// one above its target rank (the same channel for adjacent ranks).
pub fn channel_usage(graph: &RankGraph, rank: &[i64]) -> ChannelUsage {
    let mut usage = ChannelUsage::new();
    for (idx, e) in graph.edges.iter().enumerate() {
        if e.is_self_ref() {
            continue;
        }
        let exit = rank[e.from];
        let entry = rank[e.to] - 1;
        usage.entry(exit).or_default().push(idx);
        if entry != exit {
            usage.entry(entry).or_default().push(idx);
        }
    }
    usage
}
