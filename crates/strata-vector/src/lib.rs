//! Embedding backends and vector math for Strata.

pub mod embedding;
pub mod similarity;

pub use embedding::{EmbeddingService, MockEmbedding, OnnxEmbeddingService};
pub use similarity::{centroid, cosine_similarity};
