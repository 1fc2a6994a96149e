//! The v2 codebook: 103 slots × 64 sentences, plus the reverse index.
//!
//! The compiled-in table ([`Codebook::builtin`]) is version `v2.0`. An
//! external copy can be distributed as JSON and loaded with
//! [`Codebook::from_json`]; loading re-validates everything, because a
//! single duplicated sentence would make decoding ambiguous.
//!
//! ```json
//! {
//!   "version": "v2.0",
//!   "bits_per_slot": 6,
//!   "slots": [["sentence for 000000.", "..."], "..."],
//!   "reverse_index": { "normalized sentence": [slot, bits] }
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::codebook_data::{FAMILIES, LEADS, TAILS, TOPICS};
use crate::config::{CODEBOOK_VERSION, STEGO_BITS_PER_SLOT, STEGO_SLOT_COUNT, STEGO_VARIANTS_PER_SLOT};

/// Characters that end a sentence in carrier text.
pub const SENTENCE_TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Reasons an external codebook is refused.
#[derive(Debug, Error)]
pub enum CodebookError {
    #[error("malformed codebook JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("codebook version {found:?} does not match {expected:?}")]
    VersionMismatch { expected: &'static str, found: String },

    #[error("codebook uses {0} bits per slot, expected {STEGO_BITS_PER_SLOT}")]
    BitsPerSlot(usize),

    #[error("codebook has {0} slots, expected {STEGO_SLOT_COUNT}")]
    SlotCount(usize),

    #[error("slot {slot} has {count} variants, expected {STEGO_VARIANTS_PER_SLOT}")]
    VariantCount { slot: usize, count: usize },

    #[error("slot {slot} variant {bits} is not a single terminated sentence")]
    MalformedSentence { slot: usize, bits: u32 },

    #[error("slot {slot} variant {bits} duplicates another sentence")]
    DuplicateSentence { slot: usize, bits: u32 },

    #[error("reverse index disagrees with the slot table")]
    ReverseIndexMismatch,
}

/// On-disk shape of a codebook artifact.
#[derive(Debug, Serialize, Deserialize)]
struct CodebookFile {
    version: String,
    bits_per_slot: usize,
    slots: Vec<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reverse_index: Option<BTreeMap<String, (usize, u32)>>,
}

/// A validated, immutable codebook.
#[derive(Debug, Clone)]
pub struct Codebook {
    version: String,
    slots: Vec<Vec<String>>,
    reverse: HashMap<String, (usize, u32)>,
}

impl Codebook {
    /// The compiled-in v2.0 codebook, built on first use.
    pub fn builtin() -> &'static Codebook {
        static BUILTIN: OnceLock<Codebook> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let slots: Vec<Vec<String>> = TOPICS
                .iter()
                .enumerate()
                .map(|(slot, topic)| {
                    let family = slot % FAMILIES;
                    (0..STEGO_VARIANTS_PER_SLOT)
                        .map(|v| format!("{} {} {}.", LEADS[family][v >> 3], topic, TAILS[family][v & 7]))
                        .collect()
                })
                .collect();
            let reverse = build_reverse_index(&slots);
            Codebook {
                version: CODEBOOK_VERSION.to_string(),
                slots,
                reverse,
            }
        })
    }

    /// Load and validate an external codebook.
    pub fn from_json(json: &str) -> Result<Self, CodebookError> {
        let file: CodebookFile = serde_json::from_str(json)?;

        if file.version != CODEBOOK_VERSION {
            return Err(CodebookError::VersionMismatch {
                expected: CODEBOOK_VERSION,
                found: file.version,
            });
        }
        if file.bits_per_slot != STEGO_BITS_PER_SLOT {
            return Err(CodebookError::BitsPerSlot(file.bits_per_slot));
        }
        if file.slots.len() != STEGO_SLOT_COUNT {
            return Err(CodebookError::SlotCount(file.slots.len()));
        }

        let mut reverse = HashMap::with_capacity(STEGO_SLOT_COUNT * STEGO_VARIANTS_PER_SLOT);
        for (slot, variants) in file.slots.iter().enumerate() {
            if variants.len() != STEGO_VARIANTS_PER_SLOT {
                return Err(CodebookError::VariantCount {
                    slot,
                    count: variants.len(),
                });
            }
            for (bits, sentence) in variants.iter().enumerate() {
                let bits = bits as u32;
                if !is_single_sentence(sentence) {
                    return Err(CodebookError::MalformedSentence { slot, bits });
                }
                if reverse.insert(normalize_sentence(sentence), (slot, bits)).is_some() {
                    return Err(CodebookError::DuplicateSentence { slot, bits });
                }
            }
        }

        if let Some(index) = &file.reverse_index {
            let consistent = index.len() == reverse.len()
                && index
                    .iter()
                    .all(|(sentence, entry)| reverse.get(&normalize_sentence(sentence)) == Some(entry));
            if !consistent {
                return Err(CodebookError::ReverseIndexMismatch);
            }
        }

        Ok(Self {
            version: file.version,
            slots: file.slots,
            reverse,
        })
    }

    /// Serialize as a distributable artifact, reverse index included.
    pub fn to_json(&self) -> Result<String, CodebookError> {
        let file = CodebookFile {
            version: self.version.clone(),
            bits_per_slot: STEGO_BITS_PER_SLOT,
            slots: self.slots.clone(),
            reverse_index: Some(self.reverse.iter().map(|(k, v)| (k.clone(), *v)).collect()),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Sentence for a slot and its 6-bit value. `None` if either is out of range.
    pub fn sentence(&self, slot: usize, bits: u32) -> Option<&str> {
        self.slots.get(slot)?.get(bits as usize).map(String::as_str)
    }

    /// Resolve a sentence to `(slot, bits)`. Input is normalized first.
    pub fn lookup(&self, sentence: &str) -> Option<(usize, u32)> {
        self.reverse.get(&normalize_sentence(sentence)).copied()
    }
}

/// Canonical form used by the reverse index: terminal punctuation
/// dropped, whitespace collapsed, lowercased.
pub fn normalize_sentence(sentence: &str) -> String {
    sentence
        .trim()
        .trim_end_matches(SENTENCE_TERMINATORS)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn is_single_sentence(sentence: &str) -> bool {
    let body = sentence.trim().trim_end_matches(SENTENCE_TERMINATORS);
    !body.trim().is_empty()
        && sentence.trim().ends_with(SENTENCE_TERMINATORS)
        && !body.contains(SENTENCE_TERMINATORS)
}

fn build_reverse_index(slots: &[Vec<String>]) -> HashMap<String, (usize, u32)> {
    slots
        .iter()
        .enumerate()
        .flat_map(|(slot, variants)| {
            variants
                .iter()
                .enumerate()
                .map(move |(bits, s)| (normalize_sentence(s), (slot, bits as u32)))
        })
        .collect()
}
