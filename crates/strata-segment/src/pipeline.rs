//! Per-conversation segmentation pipeline and batch driver.
//!
//! Stages run strictly in order: embed all messages in one batch, detect
//! boundaries, group, merge (two passes), extract key sentences. The block
//! coverage invariant is re-checked after grouping and after every merge
//! pass; a violation is a programming error and fails the conversation
//! loudly rather than emitting corrupted output.

use tracing::{debug, info, warn};
use uuid::Uuid;

use strata_core::config::SegmentationConfig;
use strata_core::error::{Result, StrataError};
use strata_core::types::{Conversation, TopicBlock, Transcript};
use strata_vector::EmbeddingService;

use crate::boundary::BoundaryDetector;
use crate::extractor::extract_key_sentences;
use crate::grouper::group_by_topic;
use crate::merger::BlockMerger;

/// Composes boundary detection, grouping, merging, and extraction over one
/// embedding backend.
pub struct SegmentationPipeline<E: EmbeddingService> {
    embedder: E,
    detector: BoundaryDetector,
    merger: BlockMerger,
}

impl<E: EmbeddingService> SegmentationPipeline<E> {
    /// Create a pipeline with the given thresholds.
    pub fn new(embedder: E, config: &SegmentationConfig) -> Self {
        Self {
            embedder,
            detector: BoundaryDetector::new(config.boundary_threshold),
            merger: BlockMerger::new(config.merge_threshold),
        }
    }

    /// Create a pipeline with the default thresholds (0.5 / 0.9).
    pub fn with_defaults(embedder: E) -> Self {
        Self::new(embedder, &SegmentationConfig::default())
    }

    /// Segment one conversation and extract its key sentences.
    ///
    /// A transcript with no usable messages yields a conversation with zero
    /// topics, not an error.
    pub async fn process(&self, transcript: Transcript) -> Result<Conversation> {
        let Transcript {
            id,
            title,
            create_time,
            update_time,
            messages,
        } = transcript;

        if messages.is_empty() {
            debug!(%id, title = %title, "Conversation has no usable messages");
            return Ok(Conversation {
                id,
                title,
                create_time,
                update_time,
                topics: Vec::new(),
            });
        }

        let expected: Vec<usize> = messages.iter().map(|m| m.original_index).collect();

        let texts: Vec<&str> = messages.iter().map(|m| m.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        let boundaries = self.detector.detect(&embeddings);
        drop(texts);

        let blocks = group_by_topic(messages, &boundaries);
        verify_coverage(&blocks, &expected)?;

        let blocks = self.merger.absorb_trivial(blocks);
        verify_coverage(&blocks, &expected)?;

        let mut blocks = self.merger.reattach_short(&self.embedder, blocks).await?;
        verify_coverage(&blocks, &expected)?;

        for block in &mut blocks {
            block.key_sentences = extract_key_sentences(&self.embedder, block).await?;
        }

        info!(%id, title = %title, topic_count = blocks.len(), "Conversation segmented");

        Ok(Conversation {
            id,
            title,
            create_time,
            update_time,
            topics: blocks,
        })
    }

    /// Segment a batch of conversations.
    ///
    /// Conversations are mutually independent; one conversation's failure is
    /// recorded with its identity and does not abort the others.
    pub async fn process_all(&self, transcripts: Vec<Transcript>) -> BatchOutcome {
        let mut outcome = BatchOutcome {
            conversations: Vec::with_capacity(transcripts.len()),
            failures: Vec::new(),
        };

        for transcript in transcripts {
            let id = transcript.id;
            let title = transcript.title.clone();
            match self.process(transcript).await {
                Ok(conversation) => outcome.conversations.push(conversation),
                Err(error) => {
                    warn!(%id, title = %title, %error, "Conversation processing failed");
                    outcome.failures.push(ConversationFailure { id, title, error });
                }
            }
        }

        outcome
    }
}

/// Result of a batch run: segmented conversations plus any per-conversation
/// failures, each carrying the failed conversation's identity.
#[derive(Debug)]
pub struct BatchOutcome {
    pub conversations: Vec<Conversation>,
    pub failures: Vec<ConversationFailure>,
}

/// One conversation that could not be processed.
#[derive(Debug)]
pub struct ConversationFailure {
    pub id: Uuid,
    pub title: String,
    pub error: StrataError,
}

/// Check that blocks cover the transcript exactly: no empty block, no lost,
/// duplicated, or reordered message.
pub fn verify_coverage(blocks: &[TopicBlock], expected_indices: &[usize]) -> Result<()> {
    let mut flattened = Vec::with_capacity(expected_indices.len());
    for block in blocks {
        if block.messages.is_empty() {
            return Err(StrataError::InconsistentBlockState(
                "empty topic block".to_string(),
            ));
        }
        flattened.extend(block.messages.iter().map(|m| m.original_index));
    }

    if flattened != expected_indices {
        return Err(StrataError::InconsistentBlockState(format!(
            "block coverage mismatch: expected indices {:?}, found {:?}",
            expected_indices, flattened
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use strata_core::types::{Message, Role};
    use strata_vector::MockEmbedding;

    struct StubEmbedding {
        vectors: HashMap<String, Vec<f32>>,
    }

    impl StubEmbedding {
        fn new(entries: &[(&str, [f32; 3])]) -> Self {
            Self {
                vectors: entries
                    .iter()
                    .map(|(text, v)| (text.to_string(), v.to_vec()))
                    .collect(),
            }
        }
    }

    impl EmbeddingService for StubEmbedding {
        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            texts
                .iter()
                .map(|t| {
                    self.vectors
                        .get(*t)
                        .cloned()
                        .ok_or_else(|| StrataError::Embedding(format!("no stub vector for {t:?}")))
                })
                .collect()
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    fn transcript(title: &str, texts: &[&str]) -> Transcript {
        Transcript {
            id: Uuid::new_v4(),
            title: title.to_string(),
            create_time: None,
            update_time: None,
            messages: texts
                .iter()
                .enumerate()
                .map(|(i, t)| Message {
                    role: if i % 2 == 0 { Role::User } else { Role::Assistant },
                    text: t.to_string(),
                    original_index: i,
                })
                .collect(),
        }
    }

    fn block_of(indices: &[usize]) -> TopicBlock {
        TopicBlock::new(
            indices
                .iter()
                .map(|&i| Message {
                    role: Role::User,
                    text: format!("message {i}"),
                    original_index: i,
                })
                .collect(),
        )
    }

    // ── verify_coverage ─────────────────────────────────────────────

    #[test]
    fn test_verify_coverage_accepts_exact_cover() {
        let blocks = vec![block_of(&[0, 1]), block_of(&[2])];
        assert!(verify_coverage(&blocks, &[0, 1, 2]).is_ok());
    }

    #[test]
    fn test_verify_coverage_rejects_empty_block() {
        let blocks = vec![block_of(&[0]), TopicBlock::new(Vec::new())];
        let err = verify_coverage(&blocks, &[0]).unwrap_err();
        assert!(matches!(err, StrataError::InconsistentBlockState(_)));
    }

    #[test]
    fn test_verify_coverage_rejects_loss() {
        let blocks = vec![block_of(&[0, 1])];
        assert!(verify_coverage(&blocks, &[0, 1, 2]).is_err());
    }

    #[test]
    fn test_verify_coverage_rejects_reorder() {
        let blocks = vec![block_of(&[1, 0])];
        assert!(verify_coverage(&blocks, &[0, 1]).is_err());
    }

    // ── process ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_process_empty_transcript_zero_topics() {
        let pipeline = SegmentationPipeline::with_defaults(StubEmbedding::new(&[]));
        let conversation = pipeline.process(transcript("empty", &[])).await.unwrap();
        assert!(conversation.topics.is_empty());
        assert_eq!(conversation.title, "empty");
    }

    #[tokio::test]
    async fn test_process_single_topic() {
        const A: [f32; 3] = [1.0, 0.0, 0.0];
        let pipeline = SegmentationPipeline::with_defaults(StubEmbedding::new(&[
            ("we should plan the offsite", A),
            ("agreed, the offsite needs planning", A),
        ]));
        let conversation = pipeline
            .process(transcript(
                "offsite",
                &["we should plan the offsite", "agreed, the offsite needs planning"],
            ))
            .await
            .unwrap();
        assert_eq!(conversation.topics.len(), 1);
        assert_eq!(conversation.topics[0].messages.len(), 2);
        assert_eq!(conversation.topics[0].key_sentences.len(), 1);
    }

    #[tokio::test]
    async fn test_process_embedding_failure_propagates() {
        let pipeline = SegmentationPipeline::with_defaults(StubEmbedding::new(&[]));
        let result = pipeline
            .process(transcript("doomed", &["text with no stub vector"]))
            .await;
        assert!(matches!(result, Err(StrataError::Embedding(_))));
    }

    #[tokio::test]
    async fn test_process_deterministic_across_runs() {
        let pipeline = SegmentationPipeline::with_defaults(MockEmbedding::new());
        let make = || {
            transcript(
                "repeat",
                &[
                    "first message about one thing",
                    "second message about another thing",
                    "third message closing out",
                ],
            )
        };
        let first = pipeline.process(make()).await.unwrap();
        let second = pipeline.process(make()).await.unwrap();
        // Ids differ per transcript; the derived structure must not.
        assert_eq!(first.topics, second.topics);
        assert!(!first.topics.is_empty());
    }

    // ── process_all ─────────────────────────────────────────────────

    #[tokio::test]
    async fn test_process_all_isolates_failures() {
        const A: [f32; 3] = [1.0, 0.0, 0.0];
        let pipeline = SegmentationPipeline::with_defaults(StubEmbedding::new(&[
            ("a perfectly embeddable message", A),
        ]));
        let good = transcript("good", &["a perfectly embeddable message"]);
        let bad = transcript("bad", &["nothing known about this text"]);
        let bad_id = bad.id;

        let outcome = pipeline.process_all(vec![good, bad]).await;
        assert_eq!(outcome.conversations.len(), 1);
        assert_eq!(outcome.conversations[0].title, "good");
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].id, bad_id);
        assert_eq!(outcome.failures[0].title, "bad");
        assert!(matches!(
            outcome.failures[0].error,
            StrataError::Embedding(_)
        ));
    }

    #[tokio::test]
    async fn test_process_all_empty_batch() {
        let pipeline = SegmentationPipeline::with_defaults(StubEmbedding::new(&[]));
        let outcome = pipeline.process_all(Vec::new()).await;
        assert!(outcome.conversations.is_empty());
        assert!(outcome.failures.is_empty());
    }
}
