//! Weighted shortest paths over cost-transformed graphs
//!
//! Edge weights are turned into non-negative costs by a [`CostMode`], then:
//!
//! - single pairs and single sources use binary-heap Dijkstra
//! - all pairs use either dense Floyd-Warshall (size-guarded) or Dijkstra
//!   repeated from every source in parallel
//!
//! Undirected graphs are traversed in both directions.

use super::cost::{sanitize_epsilon, CostMode, DEFAULT_EPSILON};
use super::stats::distance_stats;
use super::types::{AnalysisError, AnalysisResult, DistanceStats, PathOutcome, SingleSource};
use crate::graph::{Edge, Graph, NodeId};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

/// Largest graph Floyd-Warshall runs on unless configured otherwise
pub const DEFAULT_MAX_FLOYD_NODES: usize = 2000;

/// All-pairs algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllPairsStrategy {
    FloydWarshall,
    RepeatedDijkstra,
}

impl FromStr for AllPairsStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "floyd" | "floyd_warshall" | "floyd-warshall" => Ok(AllPairsStrategy::FloydWarshall),
            "dijkstra" | "repeated_dijkstra" | "repeated-dijkstra" => {
                Ok(AllPairsStrategy::RepeatedDijkstra)
            }
            other => Err(format!("unknown all-pairs strategy: {other}")),
        }
    }
}

impl fmt::Display for AllPairsStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllPairsStrategy::FloydWarshall => f.write_str("floyd_warshall"),
            AllPairsStrategy::RepeatedDijkstra => f.write_str("repeated_dijkstra"),
        }
    }
}

/// Min-heap entry; equal costs pop in insertion order
#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    cost: f64,
    seq: u64,
    node: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Distances and predecessors of one Dijkstra run, indexed by node position
struct ShortestTree {
    dist: Vec<f64>,
    pred: Vec<Option<usize>>,
}

/// Nodes from `source` to `target` following predecessor links
fn reconstruct_path(pred: &[Option<usize>], source: usize, target: usize) -> Vec<usize> {
    let mut path = vec![target];
    let mut current = target;
    while current != source {
        match pred[current] {
            Some(prev) => {
                path.push(prev);
                current = prev;
            }
            None => return Vec::new(),
        }
    }
    path.reverse();
    path
}

/// Shortest path queries over one graph and cost transform
pub struct PathAnalyzer<'g> {
    graph: &'g Graph,
    mode: CostMode,
    epsilon: f64,
    max_floyd_nodes: usize,
    /// `(neighbor, cost)` per node, in graph order
    adjacency: Vec<Vec<(usize, f64)>>,
}

impl<'g> PathAnalyzer<'g> {
    pub fn new(graph: &'g Graph, mode: CostMode) -> Self {
        Self::with_epsilon(graph, mode, DEFAULT_EPSILON)
    }

    /// Analyzer with a custom cost floor; non-positive or NaN values fall
    /// back to [`DEFAULT_EPSILON`]
    pub fn with_epsilon(graph: &'g Graph, mode: CostMode, epsilon: f64) -> Self {
        let sanitized = sanitize_epsilon(epsilon);
        if sanitized != epsilon {
            tracing::warn!(epsilon, fallback = sanitized, "invalid epsilon replaced");
        }
        let epsilon = sanitized;
        let edges: Vec<&Edge> = graph.edges().collect();
        let adjacency = graph
            .adjacency()
            .into_iter()
            .map(|neighbors| {
                neighbors
                    .into_iter()
                    .map(|(n, e)| (n, mode.cost(edges[e].weight, epsilon)))
                    .collect()
            })
            .collect();
        Self {
            graph,
            mode,
            epsilon,
            max_floyd_nodes: DEFAULT_MAX_FLOYD_NODES,
            adjacency,
        }
    }

    /// Node count above which Floyd-Warshall is refused
    pub fn max_floyd_nodes(mut self, limit: usize) -> Self {
        self.max_floyd_nodes = limit;
        self
    }

    pub fn mode(&self) -> CostMode {
        self.mode
    }

    /// Cost of one edge under this analyzer's transform
    pub fn cost_of(&self, edge: &Edge) -> f64 {
        self.mode.cost(edge.weight, self.epsilon)
    }

    fn ids(&self, path: Vec<usize>) -> Vec<NodeId> {
        path.into_iter()
            .map(|i| self.graph.node_at(i).id.clone())
            .collect()
    }

    fn dijkstra(&self, source: usize, stop_at: Option<usize>) -> ShortestTree {
        let n = self.adjacency.len();
        let mut dist = vec![f64::INFINITY; n];
        let mut pred = vec![None; n];
        let mut settled = vec![false; n];
        let mut heap = BinaryHeap::new();
        let mut seq = 0u64;

        dist[source] = 0.0;
        heap.push(HeapEntry {
            cost: 0.0,
            seq,
            node: source,
        });

        while let Some(HeapEntry { cost, node, .. }) = heap.pop() {
            if settled[node] {
                continue;
            }
            settled[node] = true;
            if stop_at == Some(node) {
                break;
            }
            for &(next, edge_cost) in &self.adjacency[node] {
                let candidate = cost + edge_cost;
                if candidate < dist[next] {
                    dist[next] = candidate;
                    pred[next] = Some(node);
                    seq += 1;
                    heap.push(HeapEntry {
                        cost: candidate,
                        seq,
                        node: next,
                    });
                }
            }
        }
        ShortestTree { dist, pred }
    }

    fn require(&self, source: &NodeId) -> AnalysisResult<usize> {
        self.graph
            .index_of(source)
            .ok_or_else(|| AnalysisError::SourceNotFound(source.clone()))
    }

    /// Cheapest path from `source` to `target`
    ///
    /// An unknown or unreachable target yields the unreachable sentinel; an
    /// unknown source is an error.
    pub fn shortest_path(&self, source: &NodeId, target: &NodeId) -> AnalysisResult<PathOutcome> {
        let s = self.require(source)?;
        let Some(t) = self.graph.index_of(target) else {
            return Ok(PathOutcome::unreachable());
        };
        if s == t {
            return Ok(PathOutcome::found(0.0, vec![source.clone()]));
        }

        let tree = self.dijkstra(s, Some(t));
        if tree.dist[t].is_infinite() {
            return Ok(PathOutcome::unreachable());
        }
        Ok(PathOutcome::found(
            tree.dist[t],
            self.ids(reconstruct_path(&tree.pred, s, t)),
        ))
    }

    /// Distances and paths from `source` to every reachable node
    pub fn single_source(&self, source: &NodeId) -> AnalysisResult<SingleSource> {
        let s = self.require(source)?;
        let tree = self.dijkstra(s, None);

        let mut distances = BTreeMap::new();
        let mut paths = BTreeMap::new();
        for (t, &d) in tree.dist.iter().enumerate() {
            if d.is_finite() {
                let id = self.graph.node_at(t).id.clone();
                distances.insert(id.clone(), d);
                paths.insert(id, self.ids(reconstruct_path(&tree.pred, s, t)));
            }
        }
        Ok(SingleSource {
            source: source.clone(),
            distances,
            paths,
        })
    }

    /// Distances between all pairs, from every node or the first `limit` nodes
    pub fn all_pairs(
        &self,
        strategy: AllPairsStrategy,
        limit: Option<usize>,
    ) -> AnalysisResult<AllPairs> {
        let n = self.graph.node_count();
        let rows = limit.map_or(n, |l| l.min(n));
        tracing::info!(%strategy, nodes = n, sources = rows, cost = %self.mode, "all-pairs started");

        let (dist, pred) = match strategy {
            AllPairsStrategy::FloydWarshall => {
                if n > self.max_floyd_nodes {
                    return Err(AnalysisError::ScaleGuard {
                        nodes: n,
                        limit: self.max_floyd_nodes,
                    });
                }
                let (mut dist, mut pred) = self.floyd_warshall();
                dist.truncate(rows);
                pred.truncate(rows);
                (dist, pred)
            }
            AllPairsStrategy::RepeatedDijkstra => self.repeated_dijkstra(rows),
        };

        tracing::info!(%strategy, sources = rows, "all-pairs finished");
        Ok(AllPairs {
            strategy,
            nodes: self.graph.node_ids().cloned().collect(),
            dist,
            pred,
        })
    }

    fn floyd_warshall(&self) -> (Vec<Vec<f64>>, Vec<Vec<Option<usize>>>) {
        let n = self.adjacency.len();
        let mut dist = vec![vec![f64::INFINITY; n]; n];
        let mut pred = vec![vec![None; n]; n];

        for (i, neighbors) in self.adjacency.iter().enumerate() {
            dist[i][i] = 0.0;
            for &(j, cost) in neighbors {
                if cost < dist[i][j] {
                    dist[i][j] = cost;
                    pred[i][j] = Some(i);
                }
            }
        }

        for k in 0..n {
            for i in 0..n {
                let via = dist[i][k];
                if via.is_infinite() {
                    continue;
                }
                for j in 0..n {
                    let candidate = via + dist[k][j];
                    if candidate < dist[i][j] {
                        dist[i][j] = candidate;
                        pred[i][j] = pred[k][j];
                    }
                }
            }
        }
        (dist, pred)
    }

    fn repeated_dijkstra(&self, rows: usize) -> (Vec<Vec<f64>>, Vec<Vec<Option<usize>>>) {
        let progress = AtomicUsize::new(0);
        let trees: Vec<ShortestTree> = (0..rows)
            .into_par_iter()
            .map(|s| {
                let tree = self.dijkstra(s, None);
                let done = progress.fetch_add(1, AtomicOrdering::Relaxed) + 1;
                if done % 250 == 0 {
                    tracing::debug!(done, total = rows, "dijkstra sources finished");
                }
                tree
            })
            .collect();
        trees.into_iter().map(|t| (t.dist, t.pred)).unzip()
    }
}

/// All-pairs result: one distance row per source node
#[derive(Debug, Clone)]
pub struct AllPairs {
    pub strategy: AllPairsStrategy,
    nodes: Vec<NodeId>,
    /// `dist[s][t]` for source row `s` (graph order) and node `t`
    dist: Vec<Vec<f64>>,
    /// `pred[s][t]`: node before `t` on the path from `s`
    pred: Vec<Vec<Option<usize>>>,
}

impl AllPairs {
    fn position(&self, id: &NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| n == id)
    }

    /// Source nodes with a computed row
    pub fn sources(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.iter().take(self.dist.len())
    }

    /// Distance between two nodes; `None` when the source has no row or the
    /// target is unknown, infinity when unreachable
    pub fn distance(&self, source: &NodeId, target: &NodeId) -> Option<f64> {
        let s = self.position(source)?;
        let t = self.position(target)?;
        self.dist.get(s).map(|row| row[t])
    }

    /// Path between two nodes; empty when unreachable
    pub fn path(&self, source: &NodeId, target: &NodeId) -> Option<Vec<NodeId>> {
        let s = self.position(source)?;
        let t = self.position(target)?;
        let pred = self.pred.get(s)?;
        if self.dist[s][t].is_infinite() {
            return Some(Vec::new());
        }
        Some(
            reconstruct_path(pred, s, t)
                .into_iter()
                .map(|i| self.nodes[i].clone())
                .collect(),
        )
    }

    /// Finite distances per source, self-pairs included
    pub fn distances(&self) -> BTreeMap<NodeId, BTreeMap<NodeId, f64>> {
        self.dist
            .iter()
            .enumerate()
            .map(|(s, row)| {
                let reachable = row
                    .iter()
                    .enumerate()
                    .filter(|(_, d)| d.is_finite())
                    .map(|(t, &d)| (self.nodes[t].clone(), d))
                    .collect();
                (self.nodes[s].clone(), reachable)
            })
            .collect()
    }

    pub fn stats(&self) -> DistanceStats {
        distance_stats(&self.distances())
    }
}
