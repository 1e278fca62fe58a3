//! Post-merge passes that fold spurious singleton blocks into neighbors.
//!
//! Boundary detection is purely local, so a stray emoji or short
//! interjection often lands in a block of its own even when it continues
//! the surrounding topic. Two passes correct this:
//!
//! 1. Trivial-content absorption: a lone message of at most 3 characters
//!    (trimmed) is folded into the previous merged block, or ahead into the
//!    next block when nothing has been emitted yet.
//! 2. Short-but-substantive re-attachment: a lone message whose embedding
//!    is highly similar to a neighboring block's centroid rejoins that
//!    neighbor.
//!
//! Each pass builds a fresh block sequence instead of splicing a shared
//! list mid-iteration. "Prepend into the next block" is modeled as a
//! carry-forward buffer applied when the next block is consumed.

use std::collections::VecDeque;

use strata_core::error::{Result, StrataError};
use strata_core::types::{Message, TopicBlock};
use strata_vector::{centroid, cosine_similarity, EmbeddingService};
use tracing::debug;

/// Trimmed character count at or below which a lone message is treated as
/// trivial content (stray emoji, bare acknowledgment).
const TRIVIAL_CHARS: usize = 3;

/// Minimum block count for the re-attachment pass to run.
const MIN_BLOCKS_FOR_REATTACH: usize = 3;

/// Folds spurious singleton blocks into their neighbors.
pub struct BlockMerger {
    /// Similarity a singleton must exceed against a neighbor centroid to be
    /// re-attached.
    pub merge_threshold: f64,
}

impl BlockMerger {
    pub fn new(merge_threshold: f64) -> Self {
        Self { merge_threshold }
    }

    /// Pass 1: absorb single-message blocks with trivial content.
    ///
    /// Left-to-right, single pass. The absorption target reflects already
    /// merged state, so consecutive trivial singletons chain into a growing
    /// previous block; with no previous block the messages move ahead into
    /// the next original block. A lone trivial block with no neighbor at
    /// all passes through unchanged.
    pub fn absorb_trivial(&self, blocks: Vec<TopicBlock>) -> Vec<TopicBlock> {
        let total = blocks.len();
        let mut merged: Vec<TopicBlock> = Vec::with_capacity(total);
        let mut carry: Vec<Message> = Vec::new();

        for (i, mut block) in blocks.into_iter().enumerate() {
            if !carry.is_empty() {
                let mut messages = std::mem::take(&mut carry);
                messages.append(&mut block.messages);
                block.messages = messages;
            }

            if is_trivial_singleton(&block) {
                if let Some(prev) = merged.last_mut() {
                    debug!(
                        text = %block.messages[0].text,
                        "Absorbing trivial block into previous"
                    );
                    prev.messages.append(&mut block.messages);
                    continue;
                }
                if i + 1 < total {
                    debug!(
                        text = %block.messages[0].text,
                        "Absorbing trivial block into next"
                    );
                    carry = std::mem::take(&mut block.messages);
                    continue;
                }
            }

            merged.push(block);
        }

        merged
    }

    /// Pass 2: re-attach singleton blocks that stay semantically close to a
    /// neighbor.
    ///
    /// Skipped entirely when fewer than 3 blocks remain. A singleton's
    /// embedding is compared against the centroid of the previous emitted
    /// block and of the next unprocessed block (0 when a neighbor is
    /// absent); it merges into the higher-scoring neighbor when that score
    /// exceeds the merge threshold, ties favoring the previous block.
    /// A merged singleton is not re-examined.
    pub async fn reattach_short<E: EmbeddingService>(
        &self,
        embedder: &E,
        blocks: Vec<TopicBlock>,
    ) -> Result<Vec<TopicBlock>> {
        if blocks.len() < MIN_BLOCKS_FOR_REATTACH {
            return Ok(blocks);
        }

        let mut result: Vec<TopicBlock> = Vec::with_capacity(blocks.len());
        let mut queue: VecDeque<TopicBlock> = blocks.into();
        let mut carry: Vec<Message> = Vec::new();
        // Centroid of the last emitted block, valid until that block changes.
        let mut prev_centroid: Option<Vec<f32>> = None;

        while let Some(mut block) = queue.pop_front() {
            if !carry.is_empty() {
                let mut messages = std::mem::take(&mut carry);
                messages.append(&mut block.messages);
                block.messages = messages;
            }

            if block.is_singleton() {
                let current = block_centroid(embedder, &block).await?;

                let sim_prev = match result.last() {
                    Some(prev) => {
                        let cached = match prev_centroid.take() {
                            Some(c) => c,
                            None => block_centroid(embedder, prev).await?,
                        };
                        let sim = cosine_similarity(&current, &cached);
                        prev_centroid = Some(cached);
                        sim
                    }
                    None => 0.0,
                };
                let sim_next = match queue.front() {
                    Some(next) => {
                        let next_centroid = block_centroid(embedder, next).await?;
                        cosine_similarity(&current, &next_centroid)
                    }
                    None => 0.0,
                };

                if sim_prev.max(sim_next) > self.merge_threshold {
                    match result.last_mut() {
                        Some(prev) if sim_prev >= sim_next => {
                            debug!(sim_prev, sim_next, "Re-attaching singleton to previous");
                            prev.messages.append(&mut block.messages);
                            prev_centroid = None;
                            continue;
                        }
                        _ => {
                            if queue.front().is_some() {
                                debug!(sim_prev, sim_next, "Re-attaching singleton to next");
                                carry = std::mem::take(&mut block.messages);
                                continue;
                            }
                        }
                    }
                }
            }

            result.push(block);
            prev_centroid = None;
        }

        Ok(result)
    }
}

impl Default for BlockMerger {
    fn default() -> Self {
        Self::new(0.9)
    }
}

fn is_trivial_singleton(block: &TopicBlock) -> bool {
    block.is_singleton() && block.messages[0].text.trim().chars().count() <= TRIVIAL_CHARS
}

/// Mean embedding of a block's messages, embedded in one batch call.
async fn block_centroid<E: EmbeddingService>(
    embedder: &E,
    block: &TopicBlock,
) -> Result<Vec<f32>> {
    let texts: Vec<&str> = block.messages.iter().map(|m| m.text.as_str()).collect();
    let embeddings = embedder.embed_batch(&texts).await?;
    centroid(&embeddings).ok_or_else(|| {
        StrataError::InconsistentBlockState("cannot take the centroid of an empty block".to_string())
    })
}
