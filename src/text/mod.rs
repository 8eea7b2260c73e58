//! Text preprocessing shared by the similarity metrics and the citation builder

pub mod normalize;
pub mod stopwords;
pub mod tfidf;

pub use normalize::{
    char_ngrams, heuristic_char_n, simple_tokens, word_tokens, Normalizer, DEFAULT_EXTRA_ALPHABET,
};
pub use tfidf::{Analyzer, TfidfMatrix};
