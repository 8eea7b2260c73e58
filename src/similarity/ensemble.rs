//! The similarity ensemble and its fallback ladders

use super::metrics;
use super::semantic::SemanticSimilarity;
use super::{Metric, SimilarityResult};
use crate::text::{char_ngrams, heuristic_char_n, simple_tokens, Analyzer, Normalizer, TfidfMatrix};
use std::collections::BTreeSet;

/// Ordered fallback attempts for one metric.
///
/// Attempts run in insertion order; the first strictly positive value wins.
/// When no attempt is positive the primary attempt's value is reported.
struct Ladder<'a> {
    attempts: Vec<Box<dyn Fn() -> Option<f64> + 'a>>,
}

impl<'a> Ladder<'a> {
    fn new() -> Self {
        Self {
            attempts: Vec::new(),
        }
    }

    fn then(mut self, attempt: impl Fn() -> Option<f64> + 'a) -> Self {
        self.attempts.push(Box::new(attempt));
        self
    }

    fn then_if(self, condition: bool, attempt: impl Fn() -> Option<f64> + 'a) -> Self {
        if condition {
            self.then(attempt)
        } else {
            self
        }
    }

    /// Returns the winning score and the position of the attempt that produced it
    fn resolve_indexed(self) -> (Option<f64>, usize) {
        let mut primary = None;
        for (idx, attempt) in self.attempts.iter().enumerate() {
            let score = attempt();
            if idx == 0 {
                primary = score;
            }
            if matches!(score, Some(s) if s > 0.0) {
                return (score.map(clamp_unit), idx);
            }
        }
        (primary.map(clamp_unit), 0)
    }

    fn resolve(self) -> Option<f64> {
        self.resolve_indexed().0
    }
}

fn clamp_unit(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}

/// Scores text pairs with every metric in [`Metric`]
pub struct SimilarityEnsemble {
    normalizer: Normalizer,
    semantic: Option<Box<dyn SemanticSimilarity>>,
}

impl Default for SimilarityEnsemble {
    fn default() -> Self {
        Self::new()
    }
}

impl SimilarityEnsemble {
    /// Ensemble with the default normalizer and no semantic capability
    pub fn new() -> Self {
        Self {
            normalizer: Normalizer::new(),
            semantic: None,
        }
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Enable the `semantic` metric
    pub fn with_semantic(mut self, semantic: Box<dyn SemanticSimilarity>) -> Self {
        self.semantic = Some(semantic);
        self
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Compute every metric for `a` and `b`
    pub fn compare(&self, a: &str, b: &str) -> SimilarityResult {
        let (jaccard_char, used_n) = self.char_ladder(a, b, metrics::jaccard);
        let mut result = SimilarityResult::new(used_n);

        result.set(Metric::Levenshtein, Some(self.levenshtein(a, b)));
        result.set(Metric::Jaccard, self.jaccard(a, b));
        result.set(Metric::Dice, self.dice(a, b));
        result.set(Metric::CosineTfidf, self.cosine_tfidf(a, b));
        result.set(Metric::OverlapCoeff, self.overlap_coeff(a, b));
        result.set(Metric::WeightedJaccardTfidf, self.weighted_jaccard_tfidf(a, b));
        result.set(Metric::JaroWinkler, Some(self.jaro_winkler(a, b)));
        result.set(Metric::JaccardChar, jaccard_char);
        result.set(Metric::DiceChar, self.dice_char(a, b));
        result.set(Metric::Semantic, self.semantic(a, b));
        result
    }

    /// Compute a single metric
    pub fn score(&self, metric: Metric, a: &str, b: &str) -> Option<f64> {
        match metric {
            Metric::Levenshtein => Some(self.levenshtein(a, b)),
            Metric::Jaccard => self.jaccard(a, b),
            Metric::Dice => self.dice(a, b),
            Metric::CosineTfidf => self.cosine_tfidf(a, b),
            Metric::OverlapCoeff => self.overlap_coeff(a, b),
            Metric::WeightedJaccardTfidf => self.weighted_jaccard_tfidf(a, b),
            Metric::JaroWinkler => Some(self.jaro_winkler(a, b)),
            Metric::JaccardChar => self.jaccard_char(a, b),
            Metric::DiceChar => self.dice_char(a, b),
            Metric::Semantic => self.semantic(a, b),
        }
    }

    pub fn levenshtein(&self, a: &str, b: &str) -> f64 {
        clamp_unit(metrics::levenshtein_ratio(a, b))
    }

    pub fn jaro_winkler(&self, a: &str, b: &str) -> f64 {
        clamp_unit(metrics::jaro_winkler(a, b))
    }

    pub fn jaccard(&self, a: &str, b: &str) -> Option<f64> {
        self.token_ladder(a, b, metrics::jaccard)
    }

    pub fn dice(&self, a: &str, b: &str) -> Option<f64> {
        self.token_ladder(a, b, metrics::dice)
    }

    pub fn overlap_coeff(&self, a: &str, b: &str) -> Option<f64> {
        self.token_ladder(a, b, metrics::overlap_coefficient)
    }

    /// Depurated-token score, then raw tokens
    ///
    /// When cleaning leaves either side with no tokens (text outside the
    /// alphabet, punctuation only) a last attempt runs on Unicode tokens.
    fn token_ladder(
        &self,
        a: &str,
        b: &str,
        score: fn(&BTreeSet<String>, &BTreeSet<String>) -> f64,
    ) -> Option<f64> {
        let n = &self.normalizer;
        let (raw_a, raw_b) = (n.raw_token_set(a), n.raw_token_set(b));
        let cleaned_away = raw_a.is_empty() || raw_b.is_empty();
        Ladder::new()
            .then(|| Some(score(&n.token_set(a), &n.token_set(b))))
            .then(|| Some(score(&raw_a, &raw_b)))
            .then_if(cleaned_away, || {
                Some(score(&unicode_token_set(a), &unicode_token_set(b)))
            })
            .resolve()
    }

    pub fn jaccard_char(&self, a: &str, b: &str) -> Option<f64> {
        self.char_ladder(a, b, metrics::jaccard).0
    }

    pub fn dice_char(&self, a: &str, b: &str) -> Option<f64> {
        self.char_ladder(a, b, metrics::dice).0
    }

    /// Char n-gram score at the heuristic `n`, then `n - 1`, then 1
    ///
    /// Also returns the n-gram size of the winning attempt.
    fn char_ladder(
        &self,
        a: &str,
        b: &str,
        score: fn(&BTreeSet<String>, &BTreeSet<String>) -> f64,
    ) -> (Option<f64>, usize) {
        let sizes = char_ladder_sizes(heuristic_char_n(a, b));
        let mut ladder = Ladder::new();
        for &n in &sizes {
            ladder = ladder.then(move || Some(score(&char_ngrams(a, n), &char_ngrams(b, n))));
        }
        let (value, idx) = ladder.resolve_indexed();
        (value, sizes[idx])
    }

    /// Word TF-IDF cosine with a char n-gram retry for short texts
    pub fn cosine_tfidf(&self, a: &str, b: &str) -> Option<f64> {
        let (tokens_a, tokens_b) = (simple_tokens(a).len(), simple_tokens(b).len());
        let char_cosine = || {
            let n = heuristic_char_n(a, b);
            Some(TfidfMatrix::fit_transform(&[a, b], Analyzer::chars(n)).cosine(0, 1))
        };

        if tokens_a < 3 && tokens_b < 3 {
            return Ladder::new().then(char_cosine).resolve();
        }

        let word = TfidfMatrix::fit_transform(&[a, b], word_analyzer());
        let retry = tokens_a < 5 || tokens_b < 5 || word.vocabulary_size() == 0;
        Ladder::new()
            .then(|| Some(word.cosine(0, 1)))
            .then_if(retry, char_cosine)
            .resolve()
    }

    /// `Σ min / Σ max` over joint word TF-IDF, then char TF-IDF with n = 3 and n = 2
    ///
    /// Falls back only when the denominator is zero, so the result is absent
    /// only when neither text yields a single term.
    pub fn weighted_jaccard_tfidf(&self, a: &str, b: &str) -> Option<f64> {
        let docs = [a, b];
        TfidfMatrix::fit_transform(&docs, word_analyzer())
            .weighted_jaccard(0, 1)
            .or_else(|| TfidfMatrix::fit_transform(&docs, Analyzer::chars(3)).weighted_jaccard(0, 1))
            .or_else(|| TfidfMatrix::fit_transform(&docs, Analyzer::chars(2)).weighted_jaccard(0, 1))
            .map(clamp_unit)
    }

    /// Delegated to the semantic capability; absent without one or on error
    pub fn semantic(&self, a: &str, b: &str) -> Option<f64> {
        let capability = self.semantic.as_ref()?;
        match capability.embed_similarity(a, b) {
            Ok(score) => Some(clamp_unit(score)),
            Err(e) => {
                tracing::debug!(error = %e, "semantic similarity unavailable");
                None
            }
        }
    }
}

fn word_analyzer() -> Analyzer {
    Analyzer::Word {
        min_n: 1,
        max_n: 2,
        remove_stopwords: true,
    }
}

/// Word-character tokens, or whitespace tokens when there are none
fn unicode_token_set(text: &str) -> BTreeSet<String> {
    let tokens = simple_tokens(text);
    if tokens.is_empty() {
        text.to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect()
    } else {
        tokens.into_iter().collect()
    }
}

/// Distinct sizes `n, n - 1, 1` in descending order, all at least 1
fn char_ladder_sizes(n: usize) -> Vec<usize> {
    let mut sizes = vec![n.max(1)];
    for candidate in [n.saturating_sub(1), 1] {
        if candidate >= 1 && !sizes.contains(&candidate) {
            sizes.push(candidate);
        }
    }
    sizes
}
