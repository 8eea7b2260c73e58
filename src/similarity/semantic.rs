//! Semantic similarity as an injected capability
//!
//! The ensemble never loads a model itself. Callers hand it a
//! `SemanticSimilarity` implementation; `EmbeddingSimilarity` adapts any
//! `Embedder` (fastembed behind the `embeddings` feature, mocks in tests).

use thiserror::Error;

/// Errors from a semantic capability; the ensemble reports them as an absent score
#[derive(Debug, Error)]
pub enum SemanticError {
    #[error("embedding returned no results")]
    EmptyResult,

    #[error("embedding dimensions differ: {0} vs {1}")]
    DimensionMismatch(usize, usize),

    #[error("embedding model error: {0}")]
    Model(String),
}

/// Narrow interface for the `semantic` metric
pub trait SemanticSimilarity: Send + Sync {
    /// Similarity of two texts; the ensemble clamps the value into [0, 1]
    fn embed_similarity(&self, a: &str, b: &str) -> Result<f64, SemanticError>;
}

/// Trait for embedding text into vectors.
///
/// Implementations handle model loading and inference.
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, returning one vector per text.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, SemanticError>;
}

/// Cosine of two embedding vectors; 0.0 when either has zero norm
pub fn cosine(a: &[f32], b: &[f32]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum();
    let norm_a: f64 = a.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// `SemanticSimilarity` backed by an `Embedder`: embed both texts in one
/// batch and take the cosine
pub struct EmbeddingSimilarity<E: Embedder> {
    embedder: E,
}

impl<E: Embedder> EmbeddingSimilarity<E> {
    pub fn new(embedder: E) -> Self {
        Self { embedder }
    }
}

impl<E: Embedder> SemanticSimilarity for EmbeddingSimilarity<E> {
    fn embed_similarity(&self, a: &str, b: &str) -> Result<f64, SemanticError> {
        let vectors = self.embedder.embed_batch(&[a, b])?;
        let (va, vb) = match vectors.as_slice() {
            [va, vb, ..] => (va, vb),
            _ => return Err(SemanticError::EmptyResult),
        };
        if va.len() != vb.len() {
            return Err(SemanticError::DimensionMismatch(va.len(), vb.len()));
        }
        Ok(cosine(va, vb))
    }
}

#[cfg(feature = "embeddings")]
mod fastembed_impl {
    use super::{Embedder, SemanticError};
    use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
    use std::sync::Mutex;

    /// Embedder backed by fastembed (ONNX Runtime).
    ///
    /// `TextEmbedding::embed` takes `&mut self`, hence the `Mutex`.
    pub struct FastEmbedEmbedder {
        model: Mutex<TextEmbedding>,
    }

    impl FastEmbedEmbedder {
        pub fn new(model: EmbeddingModel) -> Result<Self, SemanticError> {
            let options = InitOptions::new(model).with_show_download_progress(false);
            let embedding =
                TextEmbedding::try_new(options).map_err(|e| SemanticError::Model(e.to_string()))?;
            Ok(Self {
                model: Mutex::new(embedding),
            })
        }

        /// all-MiniLM-L6-v2 sentence embeddings
        pub fn default_model() -> Result<Self, SemanticError> {
            Self::new(EmbeddingModel::AllMiniLML6V2)
        }
    }

    impl Embedder for FastEmbedEmbedder {
        fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, SemanticError> {
            if texts.is_empty() {
                return Ok(Vec::new());
            }
            let mut model = self
                .model
                .lock()
                .map_err(|e| SemanticError::Model(e.to_string()))?;
            let embeddings = model
                .embed(texts.to_vec(), None)
                .map_err(|e| SemanticError::Model(e.to_string()))?;
            if embeddings.is_empty() {
                return Err(SemanticError::EmptyResult);
            }
            Ok(embeddings)
        }
    }
}

#[cfg(feature = "embeddings")]
pub use fastembed_impl::FastEmbedEmbedder;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MockEmbedder {
        vectors: HashMap<String, Vec<f32>>,
    }

    impl Embedder for MockEmbedder {
        fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, SemanticError> {
            texts
                .iter()
                .map(|t| {
                    self.vectors
                        .get(*t)
                        .cloned()
                        .ok_or_else(|| SemanticError::Model(format!("unknown text: {t}")))
                })
                .collect()
        }
    }

    fn mock() -> MockEmbedder {
        let mut vectors = HashMap::new();
        vectors.insert("travel".to_string(), vec![1.0, 0.0]);
        vectors.insert("journey".to_string(), vec![0.8, 0.6]);
        vectors.insert("zero".to_string(), vec![0.0, 0.0]);
        vectors.insert("wide".to_string(), vec![1.0, 0.0, 0.0]);
        MockEmbedder { vectors }
    }

    #[test]
    fn cosine_of_embeddings() {
        let sim = EmbeddingSimilarity::new(mock());
        let score = sim.embed_similarity("travel", "journey").unwrap();
        assert!((score - 0.8).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_scores_zero() {
        let sim = EmbeddingSimilarity::new(mock());
        assert_eq!(sim.embed_similarity("travel", "zero").unwrap(), 0.0);
    }

    #[test]
    fn embedder_failure_propagates() {
        let sim = EmbeddingSimilarity::new(mock());
        assert!(matches!(
            sim.embed_similarity("travel", "unknown"),
            Err(SemanticError::Model(_))
        ));
    }

    #[test]
    fn dimension_mismatch_is_an_error() {
        let sim = EmbeddingSimilarity::new(mock());
        assert!(matches!(
            sim.embed_similarity("travel", "wide"),
            Err(SemanticError::DimensionMismatch(2, 3))
        ));
    }
}
