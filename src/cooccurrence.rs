//! Term co-occurrence graphs over abstracts
//!
//! Every vocabulary term becomes a node of an undirected graph. Two terms are
//! joined when they appear in the same abstract, and the edge weight counts
//! the abstracts they share.
//!
//! A term is present when it matches as a whole word or phrase: a word
//! boundary is required at both ends, while hyphens and spaces inside the
//! term match literally.

use crate::graph::{Graph, Node, NodeId};
use regex_lite::Regex;
use std::sync::LazyLock;
use tracing::{debug, info};

/// Vocabulary used when none is configured
pub const DEFAULT_VOCABULARY: [&str; 15] = [
    "machine learning",
    "generative models",
    "prompting",
    "ethics",
    "training data",
    "fine-tuning",
    "multimodality",
    "transparency",
    "privacy",
    "explainability",
    "human-ai interaction",
    "ai literacy",
    "co-creation",
    "personalization",
    "algorithmic bias",
];

static ABSTRACT_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)abstract\s*=\s*\{(.*?)\}").expect("valid abstract regex")
});

/// Builds undirected term co-occurrence graphs
#[derive(Debug, Clone)]
pub struct CoOccurrenceBuilder {
    terms: Vec<String>,
}

impl Default for CoOccurrenceBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_VOCABULARY)
    }
}

impl CoOccurrenceBuilder {
    /// Vocabulary is lowercased and deduplicated, first occurrence wins
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocabulary: Vec<String> = Vec::new();
        for term in terms {
            let term = term.as_ref().trim().to_lowercase();
            if !term.is_empty() && !vocabulary.contains(&term) {
                vocabulary.push(term);
            }
        }
        Self { terms: vocabulary }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Vocabulary terms found in `text`, in vocabulary order
    pub fn present_terms(&self, text: &str) -> Vec<&str> {
        let haystack = text.to_lowercase();
        self.terms
            .iter()
            .filter(|term| contains_phrase(&haystack, term))
            .map(String::as_str)
            .collect()
    }

    /// Co-occurrence graph over `abstracts`
    ///
    /// All terms are nodes, including terms that never appear.
    pub fn build<S: AsRef<str>>(&self, abstracts: &[S]) -> Graph {
        let mut graph = Graph::undirected("cooccurrence").with_source("cooccurrence-builder");
        for term in &self.terms {
            graph.add_node(Node::new(term.as_str()));
        }

        for text in abstracts {
            let present: Vec<NodeId> = self
                .present_terms(text.as_ref())
                .into_iter()
                .map(NodeId::from)
                .collect();
            for (i, a) in present.iter().enumerate() {
                for b in &present[i + 1..] {
                    graph.increment_edge(a, b, 1.0);
                }
            }
        }

        info!(
            abstracts = abstracts.len(),
            terms = graph.node_count(),
            edges = graph.edge_count(),
            "built co-occurrence graph"
        );
        graph
    }

    /// Number of abstracts each term appears in, in vocabulary order
    pub fn term_frequencies<S: AsRef<str>>(&self, abstracts: &[S]) -> Vec<(String, usize)> {
        let mut counts = vec![0usize; self.terms.len()];
        for text in abstracts {
            let haystack = text.as_ref().to_lowercase();
            for (i, term) in self.terms.iter().enumerate() {
                if contains_phrase(&haystack, term) {
                    counts[i] += 1;
                }
            }
        }
        self.terms.iter().cloned().zip(counts).collect()
    }
}

/// `abstract = {...}` bodies from raw bibliography text, trimmed and lowercased
pub fn extract_abstracts(raw: &str) -> Vec<String> {
    let abstracts: Vec<String> = ABSTRACT_FIELD
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_lowercase())
        .filter(|a| !a.is_empty())
        .collect();
    debug!(count = abstracts.len(), "extracted abstracts");
    abstracts
}

fn is_word_char(c: Option<char>) -> bool {
    c.is_some_and(|c| c.is_alphanumeric() || c == '_')
}

/// Whole-word match of `term` in `haystack` (both already lowercase)
fn contains_phrase(haystack: &str, term: &str) -> bool {
    let (Some(first), Some(last)) = (term.chars().next(), term.chars().next_back()) else {
        return false;
    };
    haystack.match_indices(term).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + term.len()..].chars().next();
        is_word_char(before) != is_word_char(Some(first))
            && is_word_char(Some(last)) != is_word_char(after)
    })
}
