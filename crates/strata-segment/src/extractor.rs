//! Key-sentence extraction via centroid similarity.
//!
//! Splits a block's messages into line-based sentences, embeds them in one
//! batch, and ranks each by cosine similarity to the block centroid. The
//! centroid stands in for "what this block is about", giving a cheap,
//! deterministic extractive summary without a generative model.

use std::cmp::Ordering;

use strata_core::error::Result;
use strata_core::types::{Message, TopicBlock};
use strata_vector::{centroid, cosine_similarity, EmbeddingService};
use tracing::debug;

/// Lines at or below this character count are not sentences.
const MIN_SENTENCE_CHARS: usize = 3;

/// Blocks with more qualifying sentences than this get two key sentences.
const SINGLE_PICK_MAX: usize = 5;

/// A candidate sentence; exists only while extraction runs.
struct Sentence {
    text: String,
    source_message_index: usize,
}

/// Pick the sentence(s) most representative of a block.
///
/// Returns at most two sentences in ranked order (highest centroid
/// similarity first); two only when the block has more than five
/// qualifying sentences. Equal scores keep block order, so the earlier
/// sentence wins. Blocks with no qualifying sentence yield an empty list.
pub async fn extract_key_sentences<E: EmbeddingService>(
    embedder: &E,
    block: &TopicBlock,
) -> Result<Vec<String>> {
    let sentences = collect_sentences(&block.messages);
    if sentences.is_empty() {
        return Ok(Vec::new());
    }

    let texts: Vec<&str> = sentences.iter().map(|s| s.text.as_str()).collect();
    let embeddings = embedder.embed_batch(&texts).await?;
    let Some(center) = centroid(&embeddings) else {
        return Ok(Vec::new());
    };

    let mut ranked: Vec<(f64, usize)> = embeddings
        .iter()
        .enumerate()
        .map(|(i, embedding)| (cosine_similarity(&center, embedding), i))
        .collect();
    ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    let top_n = if sentences.len() > SINGLE_PICK_MAX { 2 } else { 1 };
    Ok(ranked
        .into_iter()
        .take(top_n)
        .map(|(score, i)| {
            let sentence = &sentences[i];
            debug!(
                score,
                source_message_index = sentence.source_message_index,
                "Key sentence selected"
            );
            sentence.text.clone()
        })
        .collect())
}

/// Split messages into trimmed, line-based sentences in source order.
fn collect_sentences(messages: &[Message]) -> Vec<Sentence> {
    let mut sentences = Vec::new();
    for message in messages {
        for line in message.text.split('\n') {
            let line = line.trim();
            if line.chars().count() > MIN_SENTENCE_CHARS {
                sentences.push(Sentence {
                    text: line.to_string(),
                    source_message_index: message.original_index,
                });
            }
        }
    }
    sentences
}
