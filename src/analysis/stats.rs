//! Degree tables, connected components and distance summaries

use super::scc::ComponentSet;
use super::types::DistanceStats;
use crate::graph::{Graph, NodeId};
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-node degree figures (self-loops excluded)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DegreeRow {
    pub id: NodeId,
    pub in_degree: usize,
    pub out_degree: usize,
    pub degree: usize,
    pub weighted_degree: f64,
}

/// Degree figures for every node, in graph order
///
/// For undirected graphs in, out and total degree coincide.
pub fn degree_table(graph: &Graph) -> Vec<DegreeRow> {
    let n = graph.node_count();
    let mut incoming = vec![0usize; n];
    let mut outgoing = vec![0usize; n];
    let mut weighted = vec![0.0f64; n];

    for edge in graph.edges().filter(|e| !e.is_self_loop()) {
        let (Some(s), Some(t)) = (graph.index_of(&edge.source), graph.index_of(&edge.target))
        else {
            continue;
        };
        outgoing[s] += 1;
        incoming[t] += 1;
        weighted[s] += edge.weight;
        weighted[t] += edge.weight;
    }

    (0..n)
        .map(|i| {
            let degree = incoming[i] + outgoing[i];
            let (in_degree, out_degree) = if graph.is_directed() {
                (incoming[i], outgoing[i])
            } else {
                (degree, degree)
            };
            DegreeRow {
                id: graph.node_at(i).id.clone(),
                in_degree,
                out_degree,
                degree,
                weighted_degree: weighted[i],
            }
        })
        .collect()
}

/// The `n` most cited nodes by in-degree; ties keep graph order
pub fn top_cited(graph: &Graph, n: usize) -> Vec<(NodeId, usize)> {
    let mut rows: Vec<(NodeId, usize)> = degree_table(graph)
        .into_iter()
        .map(|row| (row.id, row.in_degree))
        .collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1));
    rows.truncate(n);
    rows
}

/// Connected components ignoring edge direction
pub fn connected_components(graph: &Graph) -> ComponentSet {
    let n = graph.node_count();
    let mut parent: Vec<usize> = (0..n).collect();

    fn find(parent: &mut [usize], mut x: usize) -> usize {
        while parent[x] != x {
            parent[x] = parent[parent[x]];
            x = parent[x];
        }
        x
    }

    for edge in graph.edges() {
        let (Some(a), Some(b)) = (graph.index_of(&edge.source), graph.index_of(&edge.target))
        else {
            continue;
        };
        let (ra, rb) = (find(&mut parent, a), find(&mut parent, b));
        if ra != rb {
            parent[ra.max(rb)] = ra.min(rb);
        }
    }

    // groups appear in order of their first member
    let mut slot: BTreeMap<usize, usize> = BTreeMap::new();
    let mut groups: Vec<Vec<NodeId>> = Vec::new();
    for i in 0..n {
        let root = find(&mut parent, i);
        let idx = *slot.entry(root).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[idx].push(graph.node_at(i).id.clone());
    }
    ComponentSet::from_discovered(groups)
}

/// Count, mean and maximum of the finite off-diagonal entries
pub fn distance_stats(distances: &BTreeMap<NodeId, BTreeMap<NodeId, f64>>) -> DistanceStats {
    let mut count = 0usize;
    let mut total = 0.0;
    let mut max: Option<f64> = None;

    for (source, row) in distances {
        for (target, &d) in row {
            if source == target || !d.is_finite() {
                continue;
            }
            count += 1;
            total += d;
            max = Some(max.map_or(d, |m: f64| m.max(d)));
        }
    }

    DistanceStats {
        count,
        average: (count > 0).then(|| total / count as f64),
        max,
    }
}
