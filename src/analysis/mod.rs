//! Graph analysis: shortest paths, components and degree statistics
//!
//! Path queries run over costs derived from edge weights. Similarity weights
//! grow with closeness while path costs must shrink, so a [`CostMode`] sits
//! between the two.
//!
//! # Example
//!
//! ```
//! use citegraph::analysis::{strongly_connected_components, CostMode, PathAnalyzer};
//! use citegraph::graph::{Edge, Graph};
//!
//! let mut g = Graph::directed("demo");
//! g.add_edge(Edge::new("a", "b", 0.5));
//! g.add_edge(Edge::new("b", "a", 0.5));
//!
//! let outcome = PathAnalyzer::new(&g, CostMode::Inverse)
//!     .shortest_path(&"a".into(), &"b".into())
//!     .unwrap();
//! assert_eq!(outcome.distance, 2.0);
//!
//! let components = strongly_connected_components(&g);
//! assert_eq!(components.sizes(), vec![2]);
//! ```

pub mod cost;
pub mod path;
pub mod scc;
pub mod stats;
mod types;

pub use cost::{sanitize_epsilon, CostMode, DEFAULT_EPSILON};
pub use path::{AllPairs, AllPairsStrategy, PathAnalyzer, DEFAULT_MAX_FLOYD_NODES};
pub use scc::{strongly_connected_components, ComponentSet, ComponentSummary};
pub use stats::{connected_components, degree_table, distance_stats, top_cited, DegreeRow};
pub use types::{AnalysisError, AnalysisResult, DistanceStats, PathOutcome, SingleSource};
