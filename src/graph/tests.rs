//! Serialization tests with exchange-format fixtures

use serde_json::{json, Value};

/// Fixture: node list entry as written by the citation builder
fn record_node_fixture() -> Value {
    json!({
        "id": "Wang2024",
        "title": "Generative AI in the classroom",
        "authors": ["Li Wang", "Ana Pérez"],
        "year": "2024",
        "doi": "10.1000/xyz123"
    })
}

/// Fixture: graph document with one citation edge
fn citation_document_fixture() -> Value {
    json!({
        "directed": true,
        "name": "citations",
        "nodes": [
            { "id": "Wang2024", "title": "Generative AI in the classroom" },
            { "id": "Smith2023" }
        ],
        "edges": [
            { "source": "Wang2024", "target": "Smith2023", "weight": 0.8123 }
        ]
    })
}

#[cfg(test)]
mod serialization_tests {
    use super::*;
    use crate::graph::exchange::{from_json, read_edges_csv, to_adjacency, to_json, write_edges_csv};
    use crate::graph::{Edge, Graph, GraphDocument, GraphKind, Node, NodeId};

    #[test]
    fn node_id_serializes_as_string() {
        let id = NodeId::from_string("Wang2024");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"Wang2024\"");
    }

    #[test]
    fn node_deserializes_with_flattened_attributes() {
        let node: Node = serde_json::from_value(record_node_fixture()).unwrap();
        assert_eq!(node.id.as_str(), "Wang2024");
        assert_eq!(node.attributes.authors.len(), 2);
        assert_eq!(node.attributes.doi.as_deref(), Some("10.1000/xyz123"));
        assert!(node.attributes.url.is_none());
    }

    #[test]
    fn bare_node_serializes_without_empty_attributes() {
        let json = serde_json::to_value(Node::new("machine learning")).unwrap();
        assert_eq!(json, json!({ "id": "machine learning" }));
    }

    #[test]
    fn edge_weight_defaults_to_one() {
        let edge: Edge = serde_json::from_value(json!({ "source": "a", "target": "b" })).unwrap();
        assert_eq!(edge.weight, 1.0);
    }

    #[test]
    fn document_fixture_builds_graph() {
        let doc: GraphDocument = serde_json::from_value(citation_document_fixture()).unwrap();
        let graph = doc.into_graph();

        assert!(graph.is_directed());
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        let edge = graph.get_edge(&"Wang2024".into(), &"Smith2023".into()).unwrap();
        assert!((edge.weight - 0.8123).abs() < 1e-12);
    }

    #[test]
    fn json_roundtrip_preserves_order_and_attributes() {
        let mut graph = Graph::directed("citations");
        graph.add_node(Node::new("c").with_title("Third").with_year("2021"));
        graph.add_edge(Edge::new("a", "b", 0.7));
        graph.add_edge(Edge::new("b", "c", 0.9));

        let restored = from_json(&to_json(&graph).unwrap()).unwrap();

        let ids: Vec<&str> = restored.node_ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        let edges: Vec<&Edge> = restored.edges().collect();
        assert_eq!(edges, graph.edges().collect::<Vec<_>>());
        assert_eq!(
            restored.get_node(&"c".into()).unwrap().attributes.year.as_deref(),
            Some("2021")
        );
    }

    #[test]
    fn json_roundtrip_keeps_metadata() {
        let mut graph = Graph::directed("citations").with_source("citation-builder");
        graph.add_edge(Edge::new("a", "b", 1.0));

        let json = to_json(&graph).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["metadata"]["source"], json!("citation-builder"));
        assert!(value["metadata"]["created_at"].is_string());

        let restored = from_json(&json).unwrap();
        assert_eq!(restored.metadata, graph.metadata);
    }

    #[test]
    fn document_without_metadata_gets_a_creation_time() {
        let doc: GraphDocument = serde_json::from_value(citation_document_fixture()).unwrap();
        assert!(doc.metadata.is_empty());
        let graph = doc.into_graph();
        assert!(graph.metadata.created_at.is_some());
        assert!(graph.metadata.source.is_none());
    }

    #[test]
    fn undirected_document_roundtrip() {
        let mut graph = Graph::undirected("terms");
        graph.add_node(Node::new("isolated"));
        graph.increment_edge(&"x".into(), &"y".into(), 2.0);

        let restored = from_json(&to_json(&graph).unwrap()).unwrap();
        assert_eq!(restored.kind(), GraphKind::Undirected);
        assert_eq!(restored.node_count(), 3);
        assert_eq!(restored.get_edge(&"y".into(), &"x".into()).unwrap().weight, 2.0);
    }

    #[test]
    fn adjacency_json_is_accepted() {
        let json = r#"{ "a": { "b": 1.0, "c": 0.5 }, "b": { "c": 0.25 } }"#;
        let graph = from_json(json).unwrap();
        assert!(graph.is_directed());
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(to_adjacency(&graph)["a"]["c"], 0.5);
    }

    #[test]
    fn csv_roundtrip() {
        let mut graph = Graph::directed("citations");
        graph.add_edge(Edge::new("a", "b", 0.75));
        graph.add_edge(Edge::new("b", "c", 1.0));

        let mut buf = Vec::new();
        write_edges_csv(&graph, &mut buf).unwrap();
        let restored = read_edges_csv(buf.as_slice(), GraphKind::Directed).unwrap();

        assert_eq!(restored.edge_count(), 2);
        assert_eq!(restored.get_edge(&"a".into(), &"b".into()).unwrap().weight, 0.75);
    }

    #[test]
    fn csv_tolerates_missing_weights_and_rows() {
        let csv = "Source,Target,Weight\na,b,\nb,c,oops\n,d,0.5\nc,a,0.2\n";
        let graph = read_edges_csv(csv.as_bytes(), GraphKind::Directed).unwrap();

        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.get_edge(&"a".into(), &"b".into()).unwrap().weight, 1.0);
        assert_eq!(graph.get_edge(&"b".into(), &"c".into()).unwrap().weight, 1.0);
        assert_eq!(graph.get_edge(&"c".into(), &"a".into()).unwrap().weight, 0.2);
        assert!(!graph.contains_node(&"d".into()));
    }

    #[test]
    fn csv_without_weight_column() {
        let csv = "source,target\na,b\n";
        let graph = read_edges_csv(csv.as_bytes(), GraphKind::Directed).unwrap();
        assert_eq!(graph.get_edge(&"a".into(), &"b".into()).unwrap().weight, 1.0);
    }
}
