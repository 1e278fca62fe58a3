//! Role and whitespace normalization: raw chats -> ordered [`Transcript`]s.

use std::path::Path;

use tracing::debug;
use uuid::Uuid;

use strata_core::error::Result;
use strata_core::types::{Message, Role, Transcript};

use crate::export::{self, RawChat, RawTurn};

/// Clean a linearized turn sequence into messages.
///
/// Text is trimmed, empty turns are dropped, roles are canonicalized, and
/// `original_index` is assigned sequentially over the kept messages.
pub fn normalize_turns(turns: Vec<RawTurn>) -> Vec<Message> {
    turns
        .into_iter()
        .filter_map(|turn| {
            let text = turn.text.trim();
            if text.is_empty() {
                return None;
            }
            Some((Role::from_raw(&turn.role), text.to_string()))
        })
        .enumerate()
        .map(|(original_index, (role, text))| Message {
            role,
            text,
            original_index,
        })
        .collect()
}

/// Build a [`Transcript`] from one raw chat, assigning it a fresh id.
pub fn build_transcript(chat: RawChat) -> Transcript {
    let messages = normalize_turns(export::linearize(&chat));
    let transcript = Transcript {
        id: Uuid::new_v4(),
        title: chat.title,
        create_time: chat.create_time,
        update_time: chat.update_time,
        messages,
    };
    debug!(
        id = %transcript.id,
        title = %transcript.title,
        message_count = transcript.messages.len(),
        "Transcript normalized"
    );
    transcript
}

/// Build transcripts for every chat in an export.
pub fn build_transcripts(chats: Vec<RawChat>) -> Vec<Transcript> {
    chats.into_iter().map(build_transcript).collect()
}

/// Read an export file and produce normalized transcripts.
pub fn load_export(path: &Path) -> Result<Vec<Transcript>> {
    let json = std::fs::read_to_string(path)?;
    let chats = export::parse_export(&json)?;
    Ok(build_transcripts(chats))
}
