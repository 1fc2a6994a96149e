//! # Linguistic Encoders
//!
//! Two ways to hide the 77-byte payload in text a human can paste into
//! any chat window:
//!
//! | Carrier | Unit | Bits/unit | Units | Looks like |
//! |---------|------|-----------|-------|------------|
//! | v1 [`words`] | dictionary word | 11 | 56 | a journal entry of odd word lists |
//! | v2 [`stego`] | codebook sentence | 6 | 103 | ordinary chatty prose |
//!
//! Both share [`bits::BitBuffer`] so bit order is identical everywhere.
//! Decoding is expected to fail on almost every message an agent sees;
//! failures are plain [`EncodingError`] values, never panics.

pub mod bits;
pub mod codebook;
mod codebook_data;
pub mod stego;
pub mod words;

use thiserror::Error;

pub use codebook::{Codebook, CodebookError};
pub use stego::{create_stego_message, decode_prose_to_payload, encode_payload_to_prose};
pub use words::{create_natural_message, decode_words_to_payload, encode_payload_to_words};

/// Why a text did not decode to a payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// v1 needs exactly 56 dictionary words.
    #[error("expected {expected} dictionary words, found {found}")]
    WordCount { expected: usize, found: usize },

    /// A v1 word is not in the dictionary. Carries the 0-based position.
    #[error("word #{0} is not in the dictionary")]
    UnknownWord(usize),

    /// No sentence in the text resolved this v2 slot.
    #[error("codebook slot {0} has no matching sentence")]
    UnresolvedSlot(usize),
}
