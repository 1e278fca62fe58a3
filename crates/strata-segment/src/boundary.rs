//! Topic boundary detection over adjacent message embeddings.

use strata_vector::cosine_similarity;

/// Detects topic boundaries by thresholding adjacent cosine similarity.
///
/// The decision is strictly local: only consecutive message pairs are
/// compared, with no smoothing or windowing.
pub struct BoundaryDetector {
    /// Similarity below this value opens a new topic at that index.
    pub threshold: f64,
}

impl BoundaryDetector {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Return the indices at which a new topic begins.
    ///
    /// Index 0 is always a boundary for non-empty input; a boundary at `i`
    /// means message `i` starts a new topic relative to message `i - 1`.
    /// Empty input yields no boundaries.
    pub fn detect(&self, embeddings: &[Vec<f32>]) -> Vec<usize> {
        if embeddings.is_empty() {
            return Vec::new();
        }

        let mut boundaries = vec![0];
        for i in 1..embeddings.len() {
            let sim = cosine_similarity(&embeddings[i - 1], &embeddings[i]);
            if sim < self.threshold {
                boundaries.push(i);
            }
        }
        boundaries
    }
}

impl Default for BoundaryDetector {
    fn default() -> Self {
        Self::new(0.5)
    }
}
