//! Analysis result types and errors

use crate::graph::NodeId;
use serde::Serialize;
use std::collections::BTreeMap;

/// Error types for graph analysis
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error("Source node not in graph: {0}")]
    SourceNotFound(NodeId),

    #[error("Graph too large for Floyd-Warshall: {nodes} nodes (max: {limit})")]
    ScaleGuard { nodes: usize, limit: usize },

    #[error("Unknown cost mode: {0} (expected inverse, one_minus or unit)")]
    InvalidCostMode(String),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Result of a single-pair shortest path query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathOutcome {
    /// Total cost; infinite when the target is unreachable
    pub distance: f64,
    /// Nodes from source to target; empty when unreachable
    pub path: Vec<NodeId>,
}

impl PathOutcome {
    pub fn found(distance: f64, path: Vec<NodeId>) -> Self {
        Self { distance, path }
    }

    pub fn unreachable() -> Self {
        Self {
            distance: f64::INFINITY,
            path: Vec::new(),
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.distance.is_finite()
    }
}

/// Distances and paths from one source to every reachable node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SingleSource {
    pub source: NodeId,
    /// Reachable nodes only, the source included at 0
    pub distances: BTreeMap<NodeId, f64>,
    pub paths: BTreeMap<NodeId, Vec<NodeId>>,
}

impl SingleSource {
    /// Outcome for one target (unreachable sentinel when absent)
    pub fn outcome(&self, target: &NodeId) -> PathOutcome {
        match (self.distances.get(target), self.paths.get(target)) {
            (Some(&d), Some(path)) => PathOutcome::found(d, path.clone()),
            _ => PathOutcome::unreachable(),
        }
    }
}

/// Count, mean and maximum over finite non-self distances
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceStats {
    pub count: usize,
    pub average: Option<f64>,
    pub max: Option<f64>,
}
