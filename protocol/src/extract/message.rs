//! A covenant candidate recovered from text.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::payload::CovenantPayload;

/// Which carrier produced the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingVersion {
    /// 56 dictionary words.
    V1Words,
    /// 103 codebook sentences.
    V2Stego,
}

impl fmt::Display for EncodingVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1Words => f.write_str("v1"),
            Self::V2Stego => f.write_str("v2"),
        }
    }
}

/// A structurally valid payload plus where it came from.
///
/// Only the extractor builds these. `signature_verified` and
/// `authorized_wa_id` stay `None` until a verifier has looked at it.
#[derive(Debug, Clone)]
pub struct CovenantMessage {
    pub source_text: String,
    pub source_channel: String,
    pub payload: CovenantPayload,
    pub encoding: EncodingVersion,
    /// 1.0 for v2. For v1, 56 divided by the number of dictionary words in
    /// the text: a bare word list scores 1.0, words buried in chatter less.
    pub extraction_confidence: f64,
    pub timestamp_valid: bool,
    pub signature_verified: Option<bool>,
    pub authorized_wa_id: Option<String>,
    pub received_at: DateTime<Utc>,
}

impl CovenantMessage {
    /// True once a verifier accepted the signature.
    pub fn is_verified(&self) -> bool {
        self.signature_verified == Some(true)
    }
}

/// Outcome of scanning one text.
#[derive(Debug, Clone)]
pub enum Extraction {
    /// Ordinary text. The overwhelmingly common case.
    NotFound,
    /// A structurally valid, not yet verified, candidate.
    Found(Box<CovenantMessage>),
}

impl Extraction {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn into_message(self) -> Option<CovenantMessage> {
        match self {
            Self::Found(m) => Some(*m),
            Self::NotFound => None,
        }
    }
}
