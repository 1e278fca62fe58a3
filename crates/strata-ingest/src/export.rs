//! Chat-export parsing and tree-to-linear reconstruction.
//!
//! An export file is a JSON array of chats. Each chat carries a `mapping`
//! of node id to tree node; nodes reference their children by id. The
//! conversation is reconstructed breadth-first from the first meaningful
//! user message, in mapping order.

use std::collections::{HashMap, VecDeque};

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use strata_core::error::Result;

/// One chat as it appears in the raw export.
#[derive(Debug, Deserialize)]
pub struct RawChat {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub create_time: Option<f64>,
    #[serde(default)]
    pub update_time: Option<f64>,
    /// Node id -> tree node. Iteration order matches the file (the crate's
    /// `preserve_order` feature), which decides root selection.
    #[serde(default)]
    pub mapping: serde_json::Map<String, Value>,
}

fn default_title() -> String {
    "Untitled Chat".to_string()
}

/// A single turn pulled out of the tree, role still raw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTurn {
    pub role: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    #[serde(default)]
    message: Option<RawNodeMessage>,
    #[serde(default)]
    children: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawNodeMessage {
    #[serde(default)]
    author: Option<RawAuthor>,
    #[serde(default)]
    content: Option<RawContent>,
}

#[derive(Debug, Deserialize)]
struct RawAuthor {
    #[serde(default)]
    role: String,
}

#[derive(Debug, Deserialize)]
struct RawContent {
    #[serde(default)]
    parts: Value,
}

/// Parse a raw export file (JSON array of chats).
pub fn parse_export(json: &str) -> Result<Vec<RawChat>> {
    Ok(serde_json::from_str(json)?)
}

/// Reconstruct a linear turn sequence from a chat's mapping tree.
///
/// Traversal starts at the first node, in mapping order, whose message has
/// role `user` and non-empty text, and follows `children` breadth-first.
/// Nodes without a message end their branch; messages whose text is empty
/// after trimming contribute nothing but their children are still visited.
pub fn linearize(chat: &RawChat) -> Vec<RawTurn> {
    // Decode nodes up front, preserving mapping order. Malformed nodes are
    // skipped (MalformedInput policy), as are later references to them.
    let mut nodes: Vec<RawNode> = Vec::with_capacity(chat.mapping.len());
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(chat.mapping.len());
    for (id, value) in &chat.mapping {
        match serde_json::from_value::<RawNode>(value.clone()) {
            Ok(node) => {
                index.insert(id.as_str(), nodes.len());
                nodes.push(node);
            }
            Err(e) => {
                debug!(node_id = %id, error = %e, "Skipping malformed export node");
            }
        }
    }

    let Some(root) = find_root(&nodes) else {
        return Vec::new();
    };

    let mut turns = Vec::new();
    let mut visited = vec![false; nodes.len()];
    let mut queue = VecDeque::from([root]);

    while let Some(current) = queue.pop_front() {
        if visited[current] {
            continue;
        }
        visited[current] = true;

        let node = &nodes[current];
        let Some(message) = &node.message else {
            continue;
        };

        let role = message
            .author
            .as_ref()
            .map(|a| a.role.as_str())
            .unwrap_or("");
        if let Some(text) = message_text(message) {
            turns.push(RawTurn {
                role: role.to_string(),
                text,
            });
        }

        for child in &node.children {
            if let Some(&child_idx) = index.get(child.as_str()) {
                queue.push_back(child_idx);
            }
        }
    }

    turns
}

/// Find the first meaningful user message in the chat tree, in mapping order.
fn find_root(nodes: &[RawNode]) -> Option<usize> {
    nodes.iter().position(|node| {
        node.message.as_ref().is_some_and(|message| {
            let role = message
                .author
                .as_ref()
                .map(|a| a.role.as_str())
                .unwrap_or("");
            role == "user" && message_text(message).is_some()
        })
    })
}

/// Extract a message's trimmed text, tolerating both `parts` shapes:
/// a list whose first element is a string, or a dict keyed by stringified
/// index whose values carry `text`. Returns `None` when empty.
fn message_text(message: &RawNodeMessage) -> Option<String> {
    let parts = &message.content.as_ref()?.parts;
    let text = match parts {
        Value::Array(items) => items.first()?.as_str()?,
        Value::Object(map) => map.get("0")?.as_object()?.get("text")?.as_str()?,
        _ => return None,
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
