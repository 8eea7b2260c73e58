//! Primitive similarity functions over strings and sets
//!
//! These are the building blocks of the ensemble. They do no normalization
//! of their own beyond what each metric's definition requires.

use std::collections::BTreeSet;

/// Round to `places` decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Edit distance over Unicode scalar values
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// `1 - distance / max_len`, rounded to 3 decimals; 0.0 if either side is empty
pub fn levenshtein_ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let max_len = a.chars().count().max(b.chars().count());
    let ratio = 1.0 - levenshtein_distance(a, b) as f64 / max_len as f64;
    round_to(ratio, 3)
}

/// `|A ∩ B| / |A ∪ B|`, 0.0 if either set is empty
pub fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let inter = a.intersection(b).count();
    let union = a.len() + b.len() - inter;
    inter as f64 / union as f64
}

/// `2 |A ∩ B| / (|A| + |B|)`, 0.0 if either set is empty
pub fn dice<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let inter = a.intersection(b).count();
    2.0 * inter as f64 / (a.len() + b.len()) as f64
}

/// `|A ∩ B| / min(|A|, |B|)`, 0.0 if either set is empty
pub fn overlap_coefficient<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let inter = a.intersection(b).count();
    inter as f64 / a.len().min(b.len()) as f64
}

/// Jaro-Winkler over lowercased, trimmed text
///
/// Common prefix of up to four characters, scaling factor 0.1, applied
/// whatever the Jaro score. Empty input on either side scores 0.0.
pub fn jaro_winkler(a: &str, b: &str) -> f64 {
    const MAX_PREFIX: usize = 4;
    const SCALING: f64 = 0.1;

    let (a, b) = (a.trim().to_lowercase(), b.trim().to_lowercase());
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    // strsim only boosts above 0.7; the prefix boost here is unconditional
    let sim = strsim::jaro(&a, &b);
    let prefix = a
        .chars()
        .zip(b.chars())
        .take(MAX_PREFIX)
        .take_while(|(x, y)| x == y)
        .count();
    (sim + prefix as f64 * SCALING * (1.0 - sim)).clamp(0.0, 1.0)
}
