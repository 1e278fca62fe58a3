//! Purely structural grouping of messages into topic blocks.

use strata_core::types::{Message, TopicBlock};

/// Split messages into contiguous blocks at the given boundary indices.
///
/// Each block spans from its boundary to the next boundary (exclusive); the
/// last block runs to the end of the sequence. Boundaries must be strictly
/// increasing and start at 0, as produced by
/// [`crate::boundary::BoundaryDetector`].
pub fn group_by_topic(messages: Vec<Message>, boundaries: &[usize]) -> Vec<TopicBlock> {
    let total = messages.len();
    let mut blocks = Vec::with_capacity(boundaries.len());
    let mut messages = messages.into_iter();

    for (i, &start) in boundaries.iter().enumerate() {
        let end = boundaries.get(i + 1).copied().unwrap_or(total);
        let block: Vec<Message> = messages.by_ref().take(end.saturating_sub(start)).collect();
        blocks.push(TopicBlock::new(block));
    }

    blocks
}
