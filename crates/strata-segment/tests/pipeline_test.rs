//! End-to-end pipeline tests with a scripted embedder.
//!
//! The embedder maps every known text to a fixed unit vector, making
//! boundary decisions, merges, and extraction fully predictable.

use std::collections::HashMap;

use uuid::Uuid;

use strata_core::error::{Result, StrataError};
use strata_core::types::{Message, Role, Transcript};
use strata_ingest::{build_transcripts, parse_export};
use strata_segment::SegmentationPipeline;
use strata_vector::EmbeddingService;

// =============================================================================
// Helpers
// =============================================================================

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
        create_time: Some(1714000000.0),
        update_time: Some(1714003600.0),
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

fn block_texts(conversation: &strata_core::types::Conversation) -> Vec<Vec<&str>> {
    conversation
        .topics
        .iter()
        .map(|t| t.messages.iter().map(|m| m.text.as_str()).collect())
        .collect()
}

const X: [f32; 3] = [1.0, 0.0, 0.0];
const Y: [f32; 3] = [0.0, 1.0, 0.0];
const Z: [f32; 3] = [0.0, 0.0, 1.0];

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_greeting_budget_scenario() {
    // Adjacent similarities: low, low, low, high, high. Four raw blocks;
    // the leading two-character greeting moves ahead in the trivial pass,
    // the budget opener stays separate (its neighbors are dissimilar).
    let embedder = StubEmbedding::new(&[
        ("hi", X),
        ("👍", Y),
        ("Let's discuss the Q3 budget.", Z),
        ("I think we should cut marketing spend.", X),
        ("Marketing cuts seem risky though.", X),
        ("ok", X),
    ]);
    let pipeline = SegmentationPipeline::with_defaults(embedder);

    let conversation = pipeline
        .process(transcript(
            "Q3 budget",
            &[
                "hi",
                "👍",
                "Let's discuss the Q3 budget.",
                "I think we should cut marketing spend.",
                "Marketing cuts seem risky though.",
                "ok",
            ],
        ))
        .await
        .unwrap();

    assert_eq!(
        block_texts(&conversation),
        vec![
            vec!["hi", "👍"],
            vec!["Let's discuss the Q3 budget."],
            vec![
                "I think we should cut marketing spend.",
                "Marketing cuts seem risky though.",
                "ok",
            ],
        ]
    );

    // Coverage: concatenating the blocks reproduces the original sequence.
    let indices: Vec<usize> = conversation
        .topics
        .iter()
        .flat_map(|t| t.messages.iter().map(|m| m.original_index))
        .collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);

    // Extraction: the greeting block has no qualifying line; the budget
    // opener represents itself; the discussion block picks one sentence
    // ("ok" is too short to qualify).
    assert!(conversation.topics[0].key_sentences.is_empty());
    assert_eq!(
        conversation.topics[1].key_sentences,
        vec!["Let's discuss the Q3 budget.".to_string()]
    );
    assert_eq!(
        conversation.topics[2].key_sentences,
        vec!["I think we should cut marketing spend.".to_string()]
    );

    // Labels are left for a downstream stage.
    assert!(conversation.topics.iter().all(|t| t.label.is_none()));
}

#[tokio::test]
async fn test_empty_conversation_yields_zero_topics() {
    let pipeline = SegmentationPipeline::with_defaults(StubEmbedding::new(&[]));
    let conversation = pipeline.process(transcript("silent", &[])).await.unwrap();
    assert!(conversation.topics.is_empty());
    assert_eq!(conversation.title, "silent");
    assert_eq!(conversation.create_time, Some(1714000000.0));
}

#[tokio::test]
async fn test_metadata_survives_pipeline() {
    let embedder = StubEmbedding::new(&[("a single long enough message", X)]);
    let pipeline = SegmentationPipeline::with_defaults(embedder);
    let input = transcript("metadata check", &["a single long enough message"]);
    let id = input.id;

    let conversation = pipeline.process(input).await.unwrap();
    assert_eq!(conversation.id, id);
    assert_eq!(conversation.title, "metadata check");
    assert_eq!(conversation.create_time, Some(1714000000.0));
    assert_eq!(conversation.update_time, Some(1714003600.0));
}

#[tokio::test]
async fn test_export_to_topics_full_flow() {
    // From raw export JSON through ingest and segmentation in one go.
    let export = r#"[
        {
            "title": "Trip planning",
            "create_time": 1714000000.0,
            "mapping": {
                "root": {
                    "message": {
                        "author": { "role": "user" },
                        "content": { "parts": ["Where should we go hiking?"] }
                    },
                    "children": ["reply"]
                },
                "reply": {
                    "message": {
                        "author": { "role": "assistant" },
                        "content": { "parts": ["The coastal trail is lovely this season."] }
                    },
                    "children": []
                }
            }
        }
    ]"#;

    let transcripts = build_transcripts(parse_export(export).unwrap());
    assert_eq!(transcripts.len(), 1);
    assert_eq!(transcripts[0].messages.len(), 2);

    let embedder = StubEmbedding::new(&[
        ("Where should we go hiking?", X),
        ("The coastal trail is lovely this season.", X),
    ]);
    let pipeline = SegmentationPipeline::with_defaults(embedder);
    let outcome = pipeline.process_all(transcripts).await;

    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.conversations.len(), 1);
    let conversation = &outcome.conversations[0];
    assert_eq!(conversation.title, "Trip planning");
    assert_eq!(conversation.topics.len(), 1);
    assert_eq!(conversation.topics[0].messages.len(), 2);
    assert_eq!(conversation.topics[0].key_sentences.len(), 1);
}
