//! Graph: node and edge sets with enforced invariants
//!
//! One structure serves both directed citation graphs and undirected term
//! co-occurrence graphs. Node and edge insertion order is preserved so every
//! analysis over the same input is reproducible.

use super::edge::Edge;
use super::node::{Node, NodeId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Whether edges are ordered pairs or unordered pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphKind {
    Directed,
    Undirected,
}

/// Metadata about a graph, carried through the JSON document form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphMetadata {
    /// When the graph was created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Producer of the graph (e.g. "citation-builder")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl GraphMetadata {
    pub fn is_empty(&self) -> bool {
        self.created_at.is_none() && self.source.is_none()
    }
}

/// A graph of string-identified nodes and weighted edges
///
/// Invariants:
/// - node ids are unique
/// - a directed graph holds at most one edge per ordered pair
/// - an undirected graph holds at most one edge per unordered pair
/// - every edge endpoint is a node of the graph
#[derive(Debug, Clone)]
pub struct Graph {
    kind: GraphKind,
    /// Human-readable name
    pub name: String,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    node_index: HashMap<NodeId, usize>,
    edge_index: HashMap<(usize, usize), usize>,
    /// Graph metadata
    pub metadata: GraphMetadata,
}

impl Graph {
    /// Create an empty graph of the given kind
    pub fn new(kind: GraphKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
            node_index: HashMap::new(),
            edge_index: HashMap::new(),
            metadata: GraphMetadata {
                created_at: Some(Utc::now()),
                source: None,
            },
        }
    }

    /// Create an empty directed graph
    pub fn directed(name: impl Into<String>) -> Self {
        Self::new(GraphKind::Directed, name)
    }

    /// Create an empty undirected graph
    pub fn undirected(name: impl Into<String>) -> Self {
        Self::new(GraphKind::Undirected, name)
    }

    /// Set the producer recorded in the metadata
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.metadata.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    pub fn is_directed(&self) -> bool {
        self.kind == GraphKind::Directed
    }

    /// Add a node, or merge its attributes into an existing node
    ///
    /// Non-empty attributes of the incoming node replace the stored ones.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id.clone();
        match self.node_index.get(&id) {
            Some(&idx) => {
                if !node.attributes.is_empty() {
                    self.nodes[idx].attributes = node.attributes;
                }
            }
            None => {
                self.node_index.insert(id.clone(), self.nodes.len());
                self.nodes.push(node);
            }
        }
        id
    }

    /// Index of a node, inserting a bare node if it is missing
    fn ensure_node(&mut self, id: &NodeId) -> usize {
        if let Some(&idx) = self.node_index.get(id) {
            return idx;
        }
        let idx = self.nodes.len();
        self.node_index.insert(id.clone(), idx);
        self.nodes.push(Node::new(id.clone()));
        idx
    }

    fn edge_key(&self, a: usize, b: usize) -> (usize, usize) {
        match self.kind {
            GraphKind::Directed => (a, b),
            GraphKind::Undirected => (a.min(b), a.max(b)),
        }
    }

    /// Add an edge, creating missing endpoints
    ///
    /// If the pair already has an edge its weight is replaced.
    pub fn add_edge(&mut self, edge: Edge) {
        let a = self.ensure_node(&edge.source);
        let b = self.ensure_node(&edge.target);
        let key = self.edge_key(a, b);
        match self.edge_index.get(&key) {
            Some(&idx) => self.edges[idx].weight = edge.weight,
            None => {
                self.edge_index.insert(key, self.edges.len());
                self.edges.push(edge);
            }
        }
    }

    /// Add `amount` to the weight of an edge, creating it at `amount` if absent
    pub fn increment_edge(&mut self, source: &NodeId, target: &NodeId, amount: f64) {
        let a = self.ensure_node(source);
        let b = self.ensure_node(target);
        let key = self.edge_key(a, b);
        match self.edge_index.get(&key) {
            Some(&idx) => self.edges[idx].weight += amount,
            None => {
                self.edge_index.insert(key, self.edges.len());
                self.edges
                    .push(Edge::new(source.clone(), target.clone(), amount));
            }
        }
    }

    /// Get a node by ID
    pub fn get_node(&self, id: &NodeId) -> Option<&Node> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx])
    }

    /// Whether a node exists
    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.node_index.contains_key(id)
    }

    /// Position of a node in insertion order
    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.node_index.get(id).copied()
    }

    /// Node at a position in insertion order
    pub fn node_at(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    /// Get the edge between two nodes (either orientation for undirected graphs)
    pub fn get_edge(&self, source: &NodeId, target: &NodeId) -> Option<&Edge> {
        let a = *self.node_index.get(source)?;
        let b = *self.node_index.get(target)?;
        self.edge_index
            .get(&self.edge_key(a, b))
            .map(|&idx| &self.edges[idx])
    }

    /// Get all nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Get all node ids in insertion order
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.iter().map(|n| &n.id)
    }

    /// Get all edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Index-based adjacency lists: `(neighbor index, edge index)`
    ///
    /// Undirected edges appear in both endpoint lists. Neighbor order follows
    /// edge insertion order.
    pub fn adjacency(&self) -> Vec<Vec<(usize, usize)>> {
        let mut adj = vec![Vec::new(); self.nodes.len()];
        for (edge_idx, edge) in self.edges.iter().enumerate() {
            let a = self.node_index[&edge.source];
            let b = self.node_index[&edge.target];
            adj[a].push((b, edge_idx));
            if self.kind == GraphKind::Undirected && a != b {
                adj[b].push((a, edge_idx));
            }
        }
        adj
    }

    /// Number of non-self-loop edges touching a node
    ///
    /// For directed graphs this is in-degree plus out-degree.
    pub fn degree(&self, id: &NodeId) -> usize {
        self.edges
            .iter()
            .filter(|e| !e.is_self_loop() && (&e.source == id || &e.target == id))
            .count()
    }

    /// Sum of the weights of non-self-loop edges touching a node
    pub fn weighted_degree(&self, id: &NodeId) -> f64 {
        self.edges
            .iter()
            .filter(|e| !e.is_self_loop() && (&e.source == id || &e.target == id))
            .map(|e| e.weight)
            .sum()
    }

    /// Number of incoming non-self-loop edges (equals `degree` for undirected graphs)
    pub fn in_degree(&self, id: &NodeId) -> usize {
        if self.kind == GraphKind::Undirected {
            return self.degree(id);
        }
        self.edges
            .iter()
            .filter(|e| !e.is_self_loop() && &e.target == id)
            .count()
    }

    /// Number of outgoing non-self-loop edges (equals `degree` for undirected graphs)
    pub fn out_degree(&self, id: &NodeId) -> usize {
        if self.kind == GraphKind::Undirected {
            return self.degree(id);
        }
        self.edges
            .iter()
            .filter(|e| !e.is_self_loop() && &e.source == id)
            .count()
    }

    /// Induced subgraph over the given nodes, keeping this graph's order
    pub fn subgraph<'a>(&self, ids: impl IntoIterator<Item = &'a NodeId>) -> Graph {
        let keep: HashSet<&NodeId> = ids.into_iter().collect();
        let mut sub = Graph::new(self.kind, self.name.clone());
        sub.metadata.source = self.metadata.source.clone();
        for node in self.nodes.iter().filter(|n| keep.contains(&n.id)) {
            sub.add_node(node.clone());
        }
        for edge in self
            .edges
            .iter()
            .filter(|e| keep.contains(&e.source) && keep.contains(&e.target))
        {
            sub.add_edge(edge.clone());
        }
        sub
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_edge_replaces_weight_for_same_pair() {
        let mut g = Graph::directed("test");
        g.add_edge(Edge::new("a", "b", 0.5));
        g.add_edge(Edge::new("a", "b", 0.8));

        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.edges().next().unwrap().weight, 0.8);
    }

    #[test]
    fn test_directed_keeps_both_orientations() {
        let mut g = Graph::directed("test");
        g.add_edge(Edge::new("a", "b", 0.5));
        g.add_edge(Edge::new("b", "a", 0.7));

        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.get_edge(&"b".into(), &"a".into()).unwrap().weight, 0.7);
    }

    #[test]
    fn test_undirected_stores_pair_once() {
        let mut g = Graph::undirected("terms");
        g.add_edge(Edge::new("x", "y", 1.0));
        g.add_edge(Edge::new("y", "x", 3.0));

        assert_eq!(g.edge_count(), 1);
        let e = g.get_edge(&"x".into(), &"y".into()).unwrap();
        assert_eq!(e.source.as_str(), "x");
        assert_eq!(e.weight, 3.0);
    }

    #[test]
    fn test_increment_edge_accumulates() {
        let mut g = Graph::undirected("terms");
        g.increment_edge(&"x".into(), &"y".into(), 1.0);
        g.increment_edge(&"y".into(), &"x".into(), 1.0);

        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.get_edge(&"y".into(), &"x".into()).unwrap().weight, 2.0);
    }

    #[test]
    fn test_add_edge_creates_missing_endpoints() {
        let mut g = Graph::directed("test");
        g.add_edge(Edge::new("a", "b", 1.0));

        assert_eq!(g.node_count(), 2);
        let ids: Vec<&str> = g.node_ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_add_node_merges_attributes() {
        let mut g = Graph::directed("test");
        g.add_edge(Edge::new("a", "b", 1.0));
        g.add_node(Node::new("a").with_title("A Title"));

        assert_eq!(g.node_count(), 2);
        assert_eq!(
            g.get_node(&"a".into()).unwrap().attributes.title.as_deref(),
            Some("A Title")
        );
    }

    #[test]
    fn test_degree_excludes_self_loops() {
        let mut g = Graph::directed("test");
        g.add_edge(Edge::new("a", "a", 1.0));
        g.add_edge(Edge::new("a", "b", 0.5));
        g.add_edge(Edge::new("c", "a", 0.25));

        let a = NodeId::from("a");
        assert_eq!(g.degree(&a), 2);
        assert_eq!(g.out_degree(&a), 1);
        assert_eq!(g.in_degree(&a), 1);
        assert!((g.weighted_degree(&a) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_adjacency_undirected_is_symmetric() {
        let mut g = Graph::undirected("terms");
        g.add_edge(Edge::new("x", "y", 1.0));

        let adj = g.adjacency();
        assert_eq!(adj[0], vec![(1, 0)]);
        assert_eq!(adj[1], vec![(0, 0)]);
    }

    #[test]
    fn test_subgraph_is_induced() {
        let mut g = Graph::directed("test");
        g.add_edge(Edge::new("a", "b", 1.0));
        g.add_edge(Edge::new("b", "c", 1.0));
        g.add_edge(Edge::new("c", "a", 1.0));

        let keep = [NodeId::from("a"), NodeId::from("b")];
        let sub = g.subgraph(keep.iter());
        assert_eq!(sub.node_count(), 2);
        assert_eq!(sub.edge_count(), 1);
        assert!(sub.get_edge(&"a".into(), &"b".into()).is_some());
    }
}
