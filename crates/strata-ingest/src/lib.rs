//! Export ingestion for Strata: raw chat-export JSON -> ordered transcripts.
//!
//! Handles the export's tree structure (`mapping` of nodes linked by
//! `children` ids), both `parts` wire shapes, and role/whitespace
//! normalization. The segmentation engine only ever sees the unified
//! [`strata_core::types::Message`] shape produced here.

pub mod export;
pub mod normalize;

pub use export::{parse_export, RawChat, RawTurn};
pub use normalize::{build_transcript, build_transcripts, load_export, normalize_turns};
