//! Weighted edge representation

use super::node::NodeId;
use serde::{Deserialize, Serialize};

/// A weighted edge between two nodes
///
/// In directed graphs the edge runs `source → target`. In undirected graphs
/// the endpoints are stored in first-insertion order and the edge is reachable
/// from both sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Source node
    pub source: NodeId,
    /// Target node
    pub target: NodeId,
    /// Edge weight (similarity in [0, 1] for inferred edges, counts for co-occurrence)
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl Edge {
    /// Create a new edge
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>, weight: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight,
        }
    }

    /// Whether both endpoints are the same node
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}
