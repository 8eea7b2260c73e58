//! TF-IDF vector space over a small joint corpus
//!
//! Weighting follows the common smoothed scheme:
//! `idf(t) = ln((1 + N) / (1 + df(t))) + 1`, raw term counts as tf, and
//! L2-normalized rows, so the cosine of two rows is their dot product.

use super::normalize::word_tokens;
use super::stopwords::ENGLISH_SET;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// How documents are split into terms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Analyzer {
    /// Word n-grams over `word_tokens`, `min_n..=max_n`
    Word {
        min_n: usize,
        max_n: usize,
        remove_stopwords: bool,
    },
    /// Character n-grams of exactly `n` characters over whitespace-collapsed text
    Char { n: usize },
}

impl Analyzer {
    /// Unigrams and bigrams, stopwords kept
    pub fn word_bigrams() -> Self {
        Analyzer::Word {
            min_n: 1,
            max_n: 2,
            remove_stopwords: false,
        }
    }

    /// Character n-grams of size `n`
    pub fn chars(n: usize) -> Self {
        Analyzer::Char { n: n.max(1) }
    }

    fn terms(&self, doc: &str) -> Vec<String> {
        match *self {
            Analyzer::Word {
                min_n,
                max_n,
                remove_stopwords,
            } => {
                let tokens: Vec<String> = word_tokens(doc)
                    .into_iter()
                    .filter(|t| !remove_stopwords || !ENGLISH_SET.contains(t.as_str()))
                    .collect();
                let mut terms = Vec::new();
                for n in min_n.max(1)..=max_n.max(min_n) {
                    if n == 1 {
                        terms.extend(tokens.iter().cloned());
                    } else {
                        terms.extend(tokens.windows(n).map(|w| w.join(" ")));
                    }
                }
                terms
            }
            Analyzer::Char { n } => {
                let collapsed = doc
                    .to_lowercase()
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ");
                let chars: Vec<char> = collapsed.chars().collect();
                if chars.len() < n {
                    return Vec::new();
                }
                chars.windows(n).map(|w| w.iter().collect()).collect()
            }
        }
    }
}

/// Sparse L2-normalized TF-IDF rows, one per document
#[derive(Debug, Clone)]
pub struct TfidfMatrix {
    vocabulary_size: usize,
    /// `(term index, weight)` sorted by term index
    rows: Vec<Vec<(usize, f64)>>,
}

impl TfidfMatrix {
    /// Fit the vocabulary over `docs` and transform them jointly
    pub fn fit_transform<S: AsRef<str>>(docs: &[S], analyzer: Analyzer) -> Self {
        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut counts: Vec<HashMap<usize, usize>> = Vec::with_capacity(docs.len());

        for doc in docs {
            let mut doc_counts: HashMap<usize, usize> = HashMap::new();
            for term in analyzer.terms(doc.as_ref()) {
                let next = vocabulary.len();
                let idx = *vocabulary.entry(term).or_insert(next);
                *doc_counts.entry(idx).or_insert(0) += 1;
            }
            counts.push(doc_counts);
        }

        let n_docs = docs.len() as f64;
        let mut df = vec![0usize; vocabulary.len()];
        for doc_counts in &counts {
            for &idx in doc_counts.keys() {
                df[idx] += 1;
            }
        }
        let idf: Vec<f64> = df
            .iter()
            .map(|&d| ((1.0 + n_docs) / (1.0 + d as f64)).ln() + 1.0)
            .collect();

        let rows = counts
            .into_iter()
            .map(|doc_counts| {
                let mut row: Vec<(usize, f64)> = doc_counts
                    .into_iter()
                    .map(|(idx, tf)| (idx, tf as f64 * idf[idx]))
                    .collect();
                row.sort_by_key(|&(idx, _)| idx);
                let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
                if norm > 0.0 {
                    for (_, w) in &mut row {
                        *w /= norm;
                    }
                }
                row
            })
            .collect();

        Self {
            vocabulary_size: vocabulary.len(),
            rows,
        }
    }

    /// Number of distinct terms
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary_size
    }

    /// Number of documents
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cosine similarity of two documents (0.0 if either row is empty)
    pub fn cosine(&self, i: usize, j: usize) -> f64 {
        let (a, b) = (&self.rows[i], &self.rows[j]);
        let (mut x, mut y, mut dot) = (0, 0, 0.0);
        while x < a.len() && y < b.len() {
            match a[x].0.cmp(&b[y].0) {
                std::cmp::Ordering::Less => x += 1,
                std::cmp::Ordering::Greater => y += 1,
                std::cmp::Ordering::Equal => {
                    dot += a[x].1 * b[y].1;
                    x += 1;
                    y += 1;
                }
            }
        }
        dot.clamp(0.0, 1.0)
    }

    /// `Σ min / Σ max` over the joint term space, `None` when `Σ max` is 0
    pub fn weighted_jaccard(&self, i: usize, j: usize) -> Option<f64> {
        let mut a: HashMap<usize, f64> = self.rows[i].iter().copied().collect();
        let (mut num, mut den) = (0.0, 0.0);
        for &(idx, wb) in &self.rows[j] {
            let wa = a.remove(&idx).unwrap_or(0.0);
            num += wa.min(wb);
            den += wa.max(wb);
        }
        den += a.values().sum::<f64>();
        if den > 0.0 {
            Some((num / den).clamp(0.0, 1.0))
        } else {
            None
        }
    }

    /// Dense pairwise cosine matrix, rows computed in parallel
    ///
    /// Each row is written by exactly one task; `progress` counts finished
    /// rows for logging.
    pub fn cosine_matrix(&self) -> Vec<Vec<f64>> {
        let n = self.rows.len();
        let progress = AtomicUsize::new(0);
        (0..n)
            .into_par_iter()
            .map(|i| {
                let row: Vec<f64> = (0..n).map(|j| self.cosine(i, j)).collect();
                let done = progress.fetch_add(1, Ordering::Relaxed) + 1;
                if done % 1000 == 0 {
                    tracing::debug!(done, total = n, "cosine rows computed");
                }
                row
            })
            .collect()
    }
}
