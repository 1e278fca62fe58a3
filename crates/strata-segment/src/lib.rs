//! Topic segmentation engine for chat transcripts.
//!
//! Splits a linear transcript into topically coherent blocks and picks the
//! sentence(s) most representative of each block:
//!
//! 1. Boundary detection over adjacent message-embedding similarity
//! 2. Structural grouping into contiguous blocks
//! 3. Two merge passes folding spurious singleton blocks into neighbors
//! 4. Centroid-ranked key-sentence extraction per block
//!
//! Conversations are mutually independent; the batch driver isolates
//! per-conversation failures.

pub mod boundary;
pub mod extractor;
pub mod grouper;
pub mod merger;
pub mod pipeline;

pub use boundary::BoundaryDetector;
pub use extractor::extract_key_sentences;
pub use grouper::group_by_topic;
pub use merger::BlockMerger;
pub use pipeline::{verify_coverage, BatchOutcome, ConversationFailure, SegmentationPipeline};
