//! citegraph: text similarity and citation-graph inference
//!
//! A toolkit for bibliometric pipelines: compare texts with an ensemble of
//! lexical, TF-IDF and optional embedding metrics, infer directed citation
//! graphs from bibliographic records, and analyze the resulting graphs.
//!
//! # Core Concepts
//!
//! - **Records**: bibliographic entries parsed from raw bibliography text
//! - **Similarity ensemble**: ten metrics in [0, 1], each with fallbacks for
//!   degenerate inputs
//! - **Citation graph**: directed edges from explicit references or fused
//!   title/author similarity
//! - **Analysis**: cost-transformed shortest paths, strongly connected
//!   components, degree statistics
//! - **Co-occurrence**: undirected term graphs over abstracts
//!
//! # Example
//!
//! ```
//! use citegraph::{Metric, SimilarityEnsemble};
//!
//! let ensemble = SimilarityEnsemble::new();
//! let result = ensemble.compare("graph neural networks", "neural graph networks");
//! assert_eq!(result.get(Metric::Jaccard), Some(1.0));
//! ```

pub mod analysis;
pub mod bib;
pub mod citation;
pub mod config;
pub mod cooccurrence;
pub mod graph;
pub mod similarity;
pub mod text;

pub use analysis::{
    strongly_connected_components, AllPairsStrategy, AnalysisError, ComponentSet, CostMode,
    PathAnalyzer, PathOutcome,
};
pub use bib::{BibRecord, ParseError};
pub use citation::{CitationConfig, CitationGraph, CitationGraphBuilder};
pub use config::{Config, ConfigError};
pub use cooccurrence::{extract_abstracts, CoOccurrenceBuilder, DEFAULT_VOCABULARY};
pub use graph::{Edge, Graph, GraphError, GraphKind, Node, NodeId};
pub use similarity::{Metric, SimilarityEnsemble, SimilarityResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
