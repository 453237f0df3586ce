//! Fixed-length face embedding vector and its vector-space operations.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Length of every embedding produced by the model.
pub const EMBEDDING_SIZE: usize = 512;

/// A 512-dimensional face embedding.
///
/// Produced fresh per extraction; ownership transfers to the caller.
/// Embeddings coming out of [`crate::FaceEmbedder`] are L2-normalized,
/// so cosine similarity between two of them is a plain dot product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    /// Creates an embedding from raw model output.
    ///
    /// # Errors
    ///
    /// Returns an error if `values` is not exactly [`EMBEDDING_SIZE`] long.
    pub fn from_values(values: Vec<f32>) -> Result<Self> {
        if values.len() != EMBEDDING_SIZE {
            bail!(
                "embedding must have {EMBEDDING_SIZE} components, got {}",
                values.len()
            );
        }
        Ok(Self(values))
    }

    /// Returns the embedding components.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Returns the number of components (always [`EMBEDDING_SIZE`]).
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; embeddings have a fixed non-zero length.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Euclidean (L2) norm of the vector.
    #[must_use]
    pub fn norm(&self) -> f32 {
        self.0.iter().map(|v| f64::from(*v) * f64::from(*v)).sum::<f64>().sqrt() as f32
    }

    /// Returns the L2-normalized embedding.
    ///
    /// A zero vector is returned unchanged rather than dividing by zero.
    #[must_use]
    pub fn l2_normalized(mut self) -> Self {
        let norm = self.norm();
        if norm > 0.0 {
            for v in &mut self.0 {
                *v /= norm;
            }
        }
        self
    }

    /// Cosine similarity with another embedding, in [-1, 1].
    ///
    /// Uses the full normalized form so it is meaningful even for
    /// embeddings that were not L2-normalized beforehand.
    #[must_use]
    pub fn cosine_similarity(&self, other: &Self) -> f32 {
        let dot: f64 = self
            .0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| f64::from(*a) * f64::from(*b))
            .sum();
        let norms = f64::from(self.norm()) * f64::from(other.norm());
        if norms > 0.0 {
            (dot / norms) as f32
        } else {
            0.0
        }
    }

    /// Sanity check on an extracted embedding: finite components and an
    /// L2 norm close to 1.0 (the extractor normalizes before returning).
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        if self.0.iter().any(|v| !v.is_finite()) {
            return false;
        }
        let norm = self.norm();
        norm > 0.9 && norm < 1.1
    }
}
