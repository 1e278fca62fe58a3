use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The author of a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    /// Any other author (system, tool, ...).
    Other,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Other => "other",
        }
    }

    /// Parse a raw role string from an export. Case and surrounding
    /// whitespace are ignored; unknown roles map to [`Role::Other`].
    pub fn from_raw(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "user" => Self::User,
            "assistant" => Self::Assistant,
            _ => Self::Other,
        }
    }
}

/// A single turn of a linearized chat transcript.
///
/// `original_index` is the position in the reconstructed linear history and
/// is the sole ordering relation; every downstream transformation preserves
/// it. `text` is non-empty and trimmed (the ingest stage guarantees both).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    pub original_index: usize,
}

/// A contiguous run of messages about one topic.
///
/// `label` is never set by this pipeline; a downstream labeling stage may
/// populate it. The concatenation of all blocks' messages, in block order,
/// reproduces the source transcript exactly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopicBlock {
    pub label: Option<String>,
    pub messages: Vec<Message>,
    pub key_sentences: Vec<String>,
}

impl TopicBlock {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            label: None,
            messages,
            key_sentences: Vec::new(),
        }
    }

    /// A block containing exactly one message.
    pub fn is_singleton(&self) -> bool {
        self.messages.len() == 1
    }
}

/// A linearized conversation before segmentation.
///
/// `id` is assigned at ingest and identifies the conversation in logs and
/// failure reports. `create_time` / `update_time` are epoch seconds carried
/// over verbatim from the export.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transcript {
    pub id: Uuid,
    pub title: String,
    pub create_time: Option<f64>,
    pub update_time: Option<f64>,
    pub messages: Vec<Message>,
}

impl Transcript {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.create_time
            .and_then(|secs| DateTime::from_timestamp(secs as i64, 0))
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.update_time
            .and_then(|secs| DateTime::from_timestamp(secs as i64, 0))
    }
}

/// A segmented conversation: the transcript's metadata plus its topic
/// blocks with populated key sentences.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub title: String,
    pub create_time: Option<f64>,
    pub update_time: Option<f64>,
    pub topics: Vec<TopicBlock>,
}
