//! Shared fixtures for integration tests
//!
//! Provides a small bibliography with explicit citations, and seeded random
//! graphs for comparing path algorithms.

#![allow(dead_code)]

use citegraph::graph::{Edge, Graph, GraphKind, Node};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Four records: smith2020 and wang2021 cite each other, garcia2022 cites
/// smith2020, lee2019 stands alone. Titles share no vocabulary.
pub const BIBLIOGRAPHY: &str = r#"@article{smith2020,
  title = {Deep learning for citation analysis},
  author = {John Smith and Maria Garcia},
  year = {2020},
  doi = {10.1000/alpha.2020},
  abstract = {We apply machine learning and fine-tuning to training data.},
  references = {wang2021}
}

@article{wang2021,
  title = {Graph methods in bibliometrics},
  author = {Li Wang},
  year = {2021},
  abstract = {Ethics and privacy of training data in machine learning.},
  references = {smith2020}
}

@inproceedings{garcia2022,
  title = "Instructor attitudes toward chatbots",
  author = {Garcia, Maria},
  year = 2022,
  abstract = {Survey on ai literacy and ethics among instructors.},
  references = {see https://doi.org/10.1000/ALPHA.2020}
}

@misc{lee2019,
  title = {Soil erosion in mountain regions},
  author = {Kim Lee},
  year = {2019}
}
"#;

/// Keys of [`BIBLIOGRAPHY`] in input order
pub const KEYS: [&str; 4] = ["smith2020", "wang2021", "garcia2022", "lee2019"];

/// Random graph with `n` nodes `n0..n{n-1}` and edge probability `p`
///
/// Weights are drawn from (0, 1]. Node order is fixed before any edge is
/// added, so graphs from the same seed are identical.
pub fn random_graph(seed: u64, n: usize, p: f64, kind: GraphKind) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut graph = Graph::new(kind, format!("random-{seed}"));
    for i in 0..n {
        graph.add_node(Node::new(format!("n{i}")));
    }
    for i in 0..n {
        for j in 0..n {
            if i == j || (kind == GraphKind::Undirected && j < i) {
                continue;
            }
            if rng.gen_bool(p) {
                let weight: f64 = rng.gen_range(0.05..=1.0);
                graph.add_edge(Edge::new(format!("n{i}"), format!("n{j}"), weight));
            }
        }
    }
    graph
}

/// Directed cycle `c0 -> c1 -> ... -> c{len-1} -> c0`
pub fn cycle(len: usize, prefix: &str) -> Vec<Edge> {
    (0..len)
        .map(|i| {
            Edge::new(
                format!("{prefix}{i}"),
                format!("{prefix}{}", (i + 1) % len),
                1.0,
            )
        })
        .collect()
}
