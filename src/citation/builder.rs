//! Citation edge inference
//!
//! Titles are embedded jointly with word TF-IDF and compared pairwise. An
//! ordered pair `(i, j)` becomes the edge `i -> j` when
//!
//! - `i` carries explicit evidence of citing `j` (key, DOI or URL match), in
//!   which case the weight is 1.0, or
//! - the fused score `title_weight * cos + author_weight * overlap` reaches
//!   `sim_threshold`, where only pairs with `cos >= title_threshold` are
//!   considered.

use crate::bib::BibRecord;
use crate::config::ConfigError;
use crate::graph::{Edge, Graph, Node, NodeAttributes};
use crate::similarity::metrics::{overlap_coefficient, round_to};
use crate::text::{Analyzer, TfidfMatrix};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Thresholds and weights for citation inference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CitationConfig {
    /// Minimum title cosine for a pair to be scored
    pub title_threshold: f64,
    /// Minimum fused score for an edge
    pub sim_threshold: f64,
    pub title_weight: f64,
    pub author_weight: f64,
    /// Round edge weights to 4 decimals
    pub round_weights: bool,
}

impl Default for CitationConfig {
    fn default() -> Self {
        Self {
            title_threshold: 0.50,
            sim_threshold: 0.60,
            title_weight: 0.7,
            author_weight: 0.3,
            round_weights: true,
        }
    }
}

impl CitationConfig {
    /// Every threshold and weight must be finite and within [0, 1]
    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = [
            ("title_threshold", self.title_threshold),
            ("sim_threshold", self.sim_threshold),
            ("title_weight", self.title_weight),
            ("author_weight", self.author_weight),
        ];
        for (name, value) in values {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "citation.{name} must be within [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Counts reported by a build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSummary {
    pub nodes: usize,
    pub edges: usize,
    /// Edges created by explicit evidence
    pub explicit_edges: usize,
    /// Ordered pairs that passed the title threshold
    pub candidates: usize,
}

/// Output of a build: the directed citation graph and its summary
#[derive(Debug, Clone)]
pub struct CitationGraph {
    pub graph: Graph,
    pub summary: BuildSummary,
}

/// Scored outgoing edges of one source record
#[derive(Default)]
struct RowEdges {
    edges: Vec<(usize, f64)>,
    explicit: usize,
    candidates: usize,
}

/// Builds directed citation graphs from bibliographic records
#[derive(Debug, Clone, Default)]
pub struct CitationGraphBuilder {
    config: CitationConfig,
}

impl CitationGraphBuilder {
    pub fn new(config: CitationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CitationConfig {
        &self.config
    }

    /// Infer citation edges among `records`
    ///
    /// Nodes follow record order; edges are emitted by source, then target
    /// order.
    pub fn build(&self, records: &[BibRecord]) -> CitationGraph {
        let mut graph = Graph::directed("citations").with_source("citation-builder");
        for record in records {
            graph.add_node(record_node(record));
        }

        let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
        let tfidf = TfidfMatrix::fit_transform(&titles, Analyzer::word_bigrams());
        let cosine = tfidf.cosine_matrix();
        let last_names: Vec<BTreeSet<String>> = records.iter().map(BibRecord::last_names).collect();
        let record_ids: Vec<Vec<String>> = records.iter().map(identifiers).collect();
        let lowered: Vec<(String, Option<String>)> = records
            .iter()
            .map(|r| {
                (
                    r.raw_text.to_lowercase(),
                    r.references_raw.as_ref().map(|refs| refs.to_lowercase()),
                )
            })
            .collect();

        let progress = AtomicUsize::new(0);
        let total = records.len();
        let rows: Vec<RowEdges> = (0..total)
            .into_par_iter()
            .map(|i| {
                let row = self.score_row(i, records, &cosine[i], &last_names, &record_ids, &lowered);
                let done = progress.fetch_add(1, Ordering::Relaxed) + 1;
                if done % 500 == 0 || done == total {
                    tracing::debug!(done, total, "citation rows scored");
                }
                row
            })
            .collect();

        let mut summary = BuildSummary {
            nodes: graph.node_count(),
            ..Default::default()
        };
        for (i, row) in rows.into_iter().enumerate() {
            summary.candidates += row.candidates;
            summary.explicit_edges += row.explicit;
            for (j, weight) in row.edges {
                graph.add_edge(Edge::new(
                    records[i].key.as_str(),
                    records[j].key.as_str(),
                    weight,
                ));
            }
        }
        summary.edges = graph.edge_count();

        tracing::info!(
            nodes = summary.nodes,
            edges = summary.edges,
            explicit = summary.explicit_edges,
            candidates = summary.candidates,
            "citation graph built"
        );
        CitationGraph { graph, summary }
    }

    fn score_row(
        &self,
        i: usize,
        records: &[BibRecord],
        cosine_row: &[f64],
        last_names: &[BTreeSet<String>],
        record_ids: &[Vec<String>],
        lowered: &[(String, Option<String>)],
    ) -> RowEdges {
        let cfg = &self.config;
        let mut row = RowEdges::default();

        for (j, target) in records.iter().enumerate() {
            if i == j {
                continue;
            }
            let title_cos = cosine_row[j];
            let candidate = title_cos >= cfg.title_threshold;
            if candidate {
                row.candidates += 1;
            }

            let explicit = cites_explicitly(&records[i], &lowered[i], target, &record_ids[j]);
            let score = if explicit {
                1.0
            } else if candidate {
                let overlap = overlap_coefficient(&last_names[i], &last_names[j]);
                cfg.title_weight * title_cos + cfg.author_weight * overlap
            } else {
                continue;
            };

            if score >= cfg.sim_threshold || explicit {
                let weight = score.clamp(0.0, 1.0);
                let weight = if cfg.round_weights {
                    round_to(weight, 4)
                } else {
                    weight
                };
                row.edges.push((j, weight));
                if explicit {
                    row.explicit += 1;
                }
            }
        }
        row
    }
}

/// Normalized DOI and lowercased URL of a record, when present
fn identifiers(record: &BibRecord) -> Vec<String> {
    let url = record
        .url
        .as_deref()
        .map(|u| u.trim().to_lowercase())
        .filter(|u| !u.is_empty());
    record.normalized_doi().into_iter().chain(url).collect()
}

/// Whether `source` carries direct evidence of citing `target`
///
/// - the target key appears as a whole word in the source references field
/// - a DOI or URL identifying the target appears in the source references
/// - the target DOI appears anywhere in the source raw text
fn cites_explicitly(
    source: &BibRecord,
    (source_raw, source_refs): &(String, Option<String>),
    target: &BibRecord,
    target_ids: &[String],
) -> bool {
    if let (Some(refs), Some(refs_lower)) = (source.references_raw.as_deref(), source_refs) {
        if !target.key.is_empty() && mentions_key(refs, &target.key) {
            return true;
        }
        if target_ids.iter().any(|id| refs_lower.contains(id.as_str())) {
            return true;
        }
    }
    target
        .normalized_doi()
        .is_some_and(|doi| source_raw.contains(doi.as_str()))
}

/// Whether `key` occurs in `text` with no word character on either side
///
/// Keeps `entry_1` from matching inside `entry_12`.
fn mentions_key(text: &str, key: &str) -> bool {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    text.match_indices(key).any(|(at, _)| {
        let before = text[..at].chars().next_back();
        let after = text[at + key.len()..].chars().next();
        !before.is_some_and(is_word) && !after.is_some_and(is_word)
    })
}

fn record_node(record: &BibRecord) -> Node {
    let non_empty = |s: &str| (!s.trim().is_empty()).then(|| s.to_string());
    Node {
        id: record.key.as_str().into(),
        attributes: NodeAttributes {
            title: non_empty(&record.title),
            authors: record.authors.clone(),
            year: non_empty(&record.year),
            doi: record.doi.clone(),
            url: record.url.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> CitationGraphBuilder {
        CitationGraphBuilder::new(CitationConfig::default()).unwrap()
    }

    #[test]
    fn near_duplicate_titles_are_linked() {
        // title cosine alone tops out at 0.7 of the fused score
        let records = vec![
            BibRecord::new("a")
                .with_title("Deep Learning for X")
                .with_authors(["Li Wang"]),
            BibRecord::new("b")
                .with_title("Deep Learning for X (extended)")
                .with_authors(["L. Wang"]),
        ];
        let built = builder().build(&records);

        let edge = built.graph.get_edge(&"a".into(), &"b".into()).unwrap();
        assert!(edge.weight >= 0.60);
        assert!(built.graph.get_edge(&"b".into(), &"a".into()).is_some());
        assert_eq!(built.summary.candidates, 2);
        assert_eq!(built.summary.explicit_edges, 0);
    }

    #[test]
    fn near_duplicate_titles_alone_stay_below_threshold() {
        let records = vec![
            BibRecord::new("a").with_title("Deep Learning for X"),
            BibRecord::new("b").with_title("Deep Learning for X (extended)"),
        ];
        let built = builder().build(&records);

        let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
        let cos = TfidfMatrix::fit_transform(&titles, Analyzer::word_bigrams()).cosine(0, 1);
        let fused = 0.7 * cos;
        assert!((fused - 0.523).abs() < 1e-3, "fused = {fused}");
        assert_eq!(built.summary.candidates, 2);
        assert_eq!(built.graph.edge_count(), 0);
    }

    #[test]
    fn reference_to_key_forces_full_weight() {
        let records = vec![
            BibRecord::new("a")
                .with_title("Quantum annealing schedules")
                .with_references("see b for details"),
            BibRecord::new("b").with_title("Medieval trade routes"),
        ];
        let built = builder().build(&records);

        assert_eq!(built.graph.get_edge(&"a".into(), &"b".into()).unwrap().weight, 1.0);
        assert!(built.graph.get_edge(&"b".into(), &"a".into()).is_none());
        assert_eq!(built.summary.explicit_edges, 1);
        assert_eq!(built.summary.candidates, 0);
    }

    #[test]
    fn reference_keys_match_whole_words_only() {
        let records = vec![
            BibRecord::new("entry_1").with_title("Quantum annealing schedules"),
            BibRecord::new("entry_2")
                .with_title("Medieval trade routes")
                .with_references("entry_12; entry_10"),
            BibRecord::new("entry_3")
                .with_title("Coral reef acoustics")
                .with_references("(entry_1), entry_2."),
        ];
        let built = builder().build(&records);

        assert!(built.graph.get_edge(&"entry_2".into(), &"entry_1".into()).is_none());
        assert!(built.graph.get_edge(&"entry_3".into(), &"entry_1".into()).is_some());
        assert!(built.graph.get_edge(&"entry_3".into(), &"entry_2".into()).is_some());
        assert_eq!(built.summary.explicit_edges, 2);
    }

    #[test]
    fn mentions_key_boundaries() {
        assert!(mentions_key("see b for details", "b"));
        assert!(mentions_key("smith2020,wang2021", "wang2021"));
        assert!(!mentions_key("smith2020a", "smith2020"));
        assert!(!mentions_key("entry_12", "entry_1"));
        assert!(mentions_key("entry_12 entry_1", "entry_1"));
    }

    #[test]
    fn doi_in_raw_text_is_explicit() {
        let records = vec![
            BibRecord::new("a")
                .with_title("Alpha")
                .with_raw_text("@article{a, note = {builds on 10.1000/ABC}}"),
            BibRecord::new("b").with_title("Beta").with_doi("doi:10.1000/abc"),
        ];
        let built = builder().build(&records);
        assert_eq!(built.graph.get_edge(&"a".into(), &"b".into()).unwrap().weight, 1.0);
    }

    #[test]
    fn url_in_references_is_explicit() {
        let mut target = BibRecord::new("b").with_title("Beta");
        target.url = Some("https://example.org/Paper".to_string());
        let records = vec![
            BibRecord::new("a")
                .with_title("Alpha")
                .with_references("HTTPS://EXAMPLE.ORG/paper"),
            target,
        ];
        let built = builder().build(&records);
        assert_eq!(built.graph.edge_count(), 1);
    }

    #[test]
    fn author_overlap_lifts_fused_score() {
        let records = vec![
            BibRecord::new("a")
                .with_title("graph mining at scale")
                .with_authors(["Ana Pérez", "Li Wang"]),
            BibRecord::new("b")
                .with_title("graph mining methods")
                .with_authors(["Ana Pérez"]),
            BibRecord::new("c")
                .with_title("graph mining methods revisited")
                .with_authors(["John Smith"]),
        ];
        let config = CitationConfig {
            title_threshold: 0.0,
            round_weights: false,
            ..Default::default()
        };
        let built = CitationGraphBuilder::new(config).unwrap().build(&records);

        let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
        let cos = TfidfMatrix::fit_transform(&titles, Analyzer::word_bigrams()).cosine(0, 1);
        let expected = 0.7 * cos + 0.3;
        if expected >= 0.6 {
            let w = built.graph.get_edge(&"a".into(), &"b".into()).unwrap().weight;
            assert!((w - expected).abs() < 1e-12);
        } else {
            assert!(built.graph.get_edge(&"a".into(), &"b".into()).is_none());
        }
    }

    #[test]
    fn nodes_carry_record_attributes_and_no_self_loops() {
        let records = vec![
            BibRecord::new("a").with_title("Same").with_references("a"),
            BibRecord::new("b").with_title("").with_doi("10.1/x"),
        ];
        let built = builder().build(&records);

        assert!(built.graph.edges().all(|e| !e.is_self_loop()));
        let b = built.graph.get_node(&"b".into()).unwrap();
        assert!(b.attributes.title.is_none());
        assert_eq!(b.attributes.doi.as_deref(), Some("10.1/x"));
        assert_eq!(built.summary.nodes, 2);
    }

    #[test]
    fn weights_are_rounded_and_bounded() {
        let records = vec![
            BibRecord::new("a").with_title("neural topic models for short texts"),
            BibRecord::new("b").with_title("neural topic models for long texts"),
            BibRecord::new("c").with_title("topic models for short texts"),
        ];
        let built = builder().build(&records);
        for edge in built.graph.edges() {
            assert!((0.0..=1.0).contains(&edge.weight));
            assert_eq!(edge.weight, round_to(edge.weight, 4));
        }
    }

    #[test]
    fn build_is_deterministic() {
        let records: Vec<BibRecord> = (0..12)
            .map(|i| BibRecord::new(format!("r{i}")).with_title(format!("learning systems part {}", i % 3)))
            .collect();
        let first = builder().build(&records);
        let second = builder().build(&records);
        let a: Vec<&Edge> = first.graph.edges().collect();
        let b: Vec<&Edge> = second.graph.edges().collect();
        assert_eq!(a, b);
        assert_eq!(first.summary, second.summary);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = CitationConfig {
            sim_threshold: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            CitationGraphBuilder::new(config),
            Err(ConfigError::Invalid(_))
        ));
        let config = CitationConfig {
            title_weight: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_input_builds_empty_graph() {
        let built = builder().build(&[]);
        assert_eq!(built.graph.node_count(), 0);
        assert_eq!(built.summary, BuildSummary::default());
    }
}
