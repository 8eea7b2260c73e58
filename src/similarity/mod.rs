//! Multi-metric text similarity
//!
//! `SimilarityEnsemble::compare` scores a pair of texts with every metric in
//! [`Metric`], each yielding a value in [0, 1] or nothing when the metric
//! cannot be computed. Degenerate zero results walk an explicit fallback
//! ladder per metric (see `ensemble`).

mod ensemble;
pub mod metrics;
pub mod semantic;

pub use ensemble::SimilarityEnsemble;
pub use semantic::{Embedder, EmbeddingSimilarity, SemanticError, SemanticSimilarity};

#[cfg(feature = "embeddings")]
pub use semantic::FastEmbedEmbedder;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Names of the metrics an ensemble reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Levenshtein,
    Jaccard,
    Dice,
    CosineTfidf,
    OverlapCoeff,
    WeightedJaccardTfidf,
    JaroWinkler,
    JaccardChar,
    DiceChar,
    Semantic,
}

impl Metric {
    /// Every metric, in reporting order
    pub const ALL: [Metric; 10] = [
        Metric::Levenshtein,
        Metric::Jaccard,
        Metric::Dice,
        Metric::CosineTfidf,
        Metric::OverlapCoeff,
        Metric::WeightedJaccardTfidf,
        Metric::JaroWinkler,
        Metric::JaccardChar,
        Metric::DiceChar,
        Metric::Semantic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Levenshtein => "levenshtein",
            Metric::Jaccard => "jaccard",
            Metric::Dice => "dice",
            Metric::CosineTfidf => "cosine_tfidf",
            Metric::OverlapCoeff => "overlap_coeff",
            Metric::WeightedJaccardTfidf => "weighted_jaccard_tfidf",
            Metric::JaroWinkler => "jaro_winkler",
            Metric::JaccardChar => "jaccard_char",
            Metric::DiceChar => "dice_char",
            Metric::Semantic => "semantic",
        }
    }

    /// Whether `metric(a, b) == metric(b, a)` holds by construction
    pub fn is_symmetric(&self) -> bool {
        !matches!(self, Metric::Semantic)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scores for one text pair
///
/// Serializes as a flat object: one key per metric (null when absent) plus
/// `char_ngram_n`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityResult {
    #[serde(flatten)]
    scores: BTreeMap<Metric, Option<f64>>,
    /// Character n-gram size the char metrics settled on
    pub char_ngram_n: usize,
}

impl SimilarityResult {
    pub(crate) fn new(char_ngram_n: usize) -> Self {
        Self {
            scores: Metric::ALL.iter().map(|m| (*m, None)).collect(),
            char_ngram_n,
        }
    }

    pub(crate) fn set(&mut self, metric: Metric, score: Option<f64>) {
        self.scores.insert(metric, score);
    }

    /// Score for a metric, `None` when absent
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.scores.get(&metric).copied().flatten()
    }

    /// All metrics with their optional scores, in reporting order
    pub fn iter(&self) -> impl Iterator<Item = (Metric, Option<f64>)> + '_ {
        self.scores.iter().map(|(m, s)| (*m, *s))
    }
}
