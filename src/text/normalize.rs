//! Text normalization: cleaning, tokenization, stopwords, character n-grams
//!
//! Everything here is a pure function of the input text and the
//! normalizer's static configuration.

use super::stopwords::BILINGUAL_SET;
use std::collections::{BTreeSet, HashSet};

/// Letters kept beside ASCII alphanumerics when cleaning text.
pub const DEFAULT_EXTRA_ALPHABET: &str = "áéíóúüñç";

/// Normalizer configuration: kept alphabet and stopword set
#[derive(Debug, Clone)]
pub struct Normalizer {
    extra_alphabet: HashSet<char>,
    stopwords: HashSet<String>,
    keep_hyphens: bool,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    /// Normalizer with the default alphabet and the bilingual stopword set
    pub fn new() -> Self {
        Self {
            extra_alphabet: DEFAULT_EXTRA_ALPHABET.chars().collect(),
            stopwords: BILINGUAL_SET.iter().map(|s| s.to_string()).collect(),
            keep_hyphens: false,
        }
    }

    /// Replace the extra alphabet kept beside ASCII alphanumerics
    pub fn with_alphabet(mut self, alphabet: &str) -> Self {
        self.extra_alphabet = alphabet.chars().flat_map(char::to_lowercase).collect();
        self
    }

    /// Add words to the stopword set
    pub fn with_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stopwords
            .extend(words.into_iter().map(|w| w.as_ref().to_lowercase()));
        self
    }

    /// Keep `-` inside cleaned text (compound terms such as `fine-tuning`)
    pub fn keep_hyphens(mut self, keep: bool) -> Self {
        self.keep_hyphens = keep;
        self
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    /// Lowercase and drop every character outside the alphabet
    ///
    /// Whitespace is kept (runs collapse later at tokenization); punctuation
    /// is removed without inserting a separator.
    pub fn clean(&self, text: &str) -> String {
        text.chars()
            .flat_map(char::to_lowercase)
            .filter(|c| {
                c.is_ascii_alphanumeric()
                    || c.is_whitespace()
                    || self.extra_alphabet.contains(c)
                    || (self.keep_hyphens && *c == '-')
            })
            .collect::<String>()
            .trim()
            .to_string()
    }

    /// Whitespace tokens of the cleaned text, stopwords included
    pub fn raw_tokens(&self, text: &str) -> Vec<String> {
        self.clean(text)
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    /// Depurated tokens: raw tokens with stopwords and noise words removed
    pub fn tokens(&self, text: &str) -> Vec<String> {
        self.raw_tokens(text)
            .into_iter()
            .filter(|t| !self.is_stopword(t))
            .collect()
    }

    /// Distinct raw tokens
    pub fn raw_token_set(&self, text: &str) -> BTreeSet<String> {
        self.raw_tokens(text).into_iter().collect()
    }

    /// Distinct depurated tokens
    pub fn token_set(&self, text: &str) -> BTreeSet<String> {
        self.tokens(text).into_iter().collect()
    }
}

/// Character n-grams of the trimmed, lowercased text
///
/// Returns the whole string as a single gram when it is shorter than `n`,
/// and an empty set for empty input. `n` below 1 is treated as 1.
pub fn char_ngrams(text: &str, n: usize) -> BTreeSet<String> {
    let n = n.max(1);
    let lowered = text.trim().to_lowercase();
    if lowered.is_empty() {
        return BTreeSet::new();
    }
    let chars: Vec<char> = lowered.chars().collect();
    if chars.len() < n {
        return BTreeSet::from([lowered]);
    }
    chars.windows(n).map(|w| w.iter().collect()).collect()
}

/// Character n-gram size picked from the shorter input's length
///
/// 1 for two characters or fewer, 2 for up to four, 3 otherwise.
pub fn heuristic_char_n(a: &str, b: &str) -> usize {
    let shortest = a.trim().chars().count().min(b.trim().chars().count());
    match shortest {
        0..=2 => 1,
        3..=4 => 2,
        _ => 3,
    }
}

/// Word tokens for TF-IDF: maximal runs of word characters, at least two long
pub fn word_tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}

/// Simple word split used for the short-text heuristic (any word characters)
pub fn simple_tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
