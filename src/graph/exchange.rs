//! Graph exchange formats
//!
//! - JSON document: `{ "directed": bool, "nodes": [...], "edges": [...] }`
//! - Edge list CSV: `source,target,weight`
//! - Adjacency JSON: `{ "source": { "target": weight } }`
//!
//! The JSON document preserves node and edge order, so a graph written and
//! read back analyses identically.

use super::edge::Edge;
use super::network::{Graph, GraphKind, GraphMetadata};
use super::node::Node;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while reading or writing graphs
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unsupported graph format: {0}")]
    UnsupportedFormat(String),
}

/// Result type for graph exchange operations
pub type GraphResult<T> = Result<T, GraphError>;

/// Serializable node/edge list form of a graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    pub directed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default, skip_serializing_if = "GraphMetadata::is_empty")]
    pub metadata: GraphMetadata,
}

impl From<&Graph> for GraphDocument {
    fn from(graph: &Graph) -> Self {
        Self {
            directed: graph.is_directed(),
            name: Some(graph.name.clone()),
            nodes: graph.nodes().cloned().collect(),
            edges: graph.edges().cloned().collect(),
            metadata: graph.metadata.clone(),
        }
    }
}

impl GraphDocument {
    /// Rebuild the graph, nodes first so attribute order is kept
    pub fn into_graph(self) -> Graph {
        let kind = if self.directed {
            GraphKind::Directed
        } else {
            GraphKind::Undirected
        };
        let mut graph = Graph::new(kind, self.name.unwrap_or_default());
        // a document without a creation time keeps the one just assigned
        if self.metadata.created_at.is_some() {
            graph.metadata.created_at = self.metadata.created_at;
        }
        graph.metadata.source = self.metadata.source;
        for node in self.nodes {
            graph.add_node(node);
        }
        for edge in self.edges {
            graph.add_edge(edge);
        }
        graph
    }
}

/// Serialize a graph to the JSON document form
pub fn to_json(graph: &Graph) -> GraphResult<String> {
    Ok(serde_json::to_string_pretty(&GraphDocument::from(graph))?)
}

/// Parse a graph from JSON, accepting the document or the adjacency form
pub fn from_json(json: &str) -> GraphResult<Graph> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let is_document = value
        .as_object()
        .map(|obj| obj.contains_key("edges") || obj.contains_key("nodes"))
        .unwrap_or(false);
    if is_document {
        let doc: GraphDocument = serde_json::from_value(value)?;
        Ok(doc.into_graph())
    } else {
        let adjacency: BTreeMap<String, BTreeMap<String, f64>> = serde_json::from_value(value)?;
        Ok(from_adjacency(adjacency, GraphKind::Directed))
    }
}

/// Adjacency map `{source: {target: weight}}`
pub fn to_adjacency(graph: &Graph) -> BTreeMap<String, BTreeMap<String, f64>> {
    let mut adj: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    for edge in graph.edges() {
        adj.entry(edge.source.as_str().to_string())
            .or_default()
            .insert(edge.target.as_str().to_string(), edge.weight);
    }
    adj
}

/// Build a graph from an adjacency map
pub fn from_adjacency(adjacency: BTreeMap<String, BTreeMap<String, f64>>, kind: GraphKind) -> Graph {
    let mut graph = Graph::new(kind, "adjacency");
    for (source, targets) in adjacency {
        graph.add_node(Node::new(source.clone()));
        for (target, weight) in targets {
            graph.add_edge(Edge::new(source.clone(), target, weight));
        }
    }
    graph
}

#[derive(Debug, Deserialize)]
struct EdgeRow {
    #[serde(alias = "Source")]
    source: Option<String>,
    #[serde(alias = "Target")]
    target: Option<String>,
    #[serde(default, alias = "Weight")]
    weight: Option<String>,
}

/// Write the edge list as CSV with a `source,target,weight` header
pub fn write_edges_csv<W: Write>(graph: &Graph, writer: W) -> GraphResult<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(["source", "target", "weight"])?;
    for edge in graph.edges() {
        let weight = edge.weight.to_string();
        out.write_record([edge.source.as_str(), edge.target.as_str(), weight.as_str()])?;
    }
    out.flush()?;
    Ok(())
}

/// Read an edge list CSV
///
/// Rows missing a source or target are skipped. A missing or unparseable
/// weight becomes 1.0.
pub fn read_edges_csv<R: Read>(reader: R, kind: GraphKind) -> GraphResult<Graph> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut graph = Graph::new(kind, "edges");
    for row in rdr.deserialize::<EdgeRow>() {
        let row = row?;
        let (source, target) = match (row.source, row.target) {
            (Some(s), Some(t)) if !s.is_empty() && !t.is_empty() => (s, t),
            _ => continue,
        };
        let weight = row
            .weight
            .and_then(|w| w.parse::<f64>().ok())
            .unwrap_or(1.0);
        graph.add_edge(Edge::new(source, target, weight));
    }
    Ok(graph)
}

/// Load a graph from a `.json` or `.csv` file (CSV edge lists are directed)
pub fn read_graph(path: &Path) -> GraphResult<Graph> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "json" => {
            let text = std::fs::read_to_string(path)?;
            from_json(&text)
        }
        "csv" => {
            let file = std::fs::File::open(path)?;
            read_edges_csv(file, GraphKind::Directed)
        }
        other => Err(GraphError::UnsupportedFormat(other.to_string())),
    }
}

/// Write a graph as the JSON document form
pub fn write_json(graph: &Graph, path: &Path) -> GraphResult<()> {
    std::fs::write(path, to_json(graph)?)?;
    Ok(())
}

/// Write the three standard outputs `<prefix>.json`, `<prefix>_edges.csv`
/// and `<prefix>_adj.json` into `dir`, returning their paths
pub fn export_all(graph: &Graph, dir: &Path, prefix: &str) -> GraphResult<Vec<std::path::PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let json_path = dir.join(format!("{}.json", prefix));
    let csv_path = dir.join(format!("{}_edges.csv", prefix));
    let adj_path = dir.join(format!("{}_adj.json", prefix));

    write_json(graph, &json_path)?;
    write_edges_csv(graph, std::fs::File::create(&csv_path)?)?;
    std::fs::write(&adj_path, serde_json::to_string_pretty(&to_adjacency(graph))?)?;

    Ok(vec![json_path, csv_path, adj_path])
}

