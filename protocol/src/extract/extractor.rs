//! Text → covenant candidate.
//!
//! ```text
//! text ──► v2 decode ──ok──────────────────┐
//!             │ fail                        ▼
//!             └──► ≥56 dictionary words? ──► v1 decode ──► validate_structure ──► Found
//!                        │ no                   │ fail            │ fail
//!                        ▼                      ▼                 ▼
//!                     NotFound              NotFound          NotFound
//! ```
//!
//! No cryptography happens here. Most inputs are chat messages that are
//! not covenants, so every failure is quiet (`trace`/`debug`) and cheap.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use super::message::{CovenantMessage, EncodingVersion, Extraction};
use crate::config::PAYLOAD_WORD_COUNT;
use crate::encoding::stego::decode_prose_to_payload;
use crate::encoding::words::{decode_words_to_payload, dictionary_tokens};
use crate::payload::validate_structure;

/// Scan `text` for a covenant, timestamping it against the system clock.
pub fn extract_covenant(text: &str, channel: &str) -> Extraction {
    extract_covenant_at(text, channel, Utc::now())
}

/// [`extract_covenant`] with an explicit receive time.
pub fn extract_covenant_at(text: &str, channel: &str, received_at: DateTime<Utc>) -> Extraction {
    let (bytes, encoding, confidence) = match decode_prose_to_payload(text) {
        Ok(bytes) => (bytes, EncodingVersion::V2Stego, 1.0),
        Err(_) => {
            let tokens = dictionary_tokens(text);
            if tokens.len() < PAYLOAD_WORD_COUNT {
                trace!(channel, dictionary_words = tokens.len(), "not a covenant");
                return Extraction::NotFound;
            }
            match decode_words_to_payload(&tokens[..PAYLOAD_WORD_COUNT]) {
                Ok(bytes) => (
                    bytes,
                    EncodingVersion::V1Words,
                    PAYLOAD_WORD_COUNT as f64 / tokens.len() as f64,
                ),
                Err(e) => {
                    trace!(channel, error = %e, "word decode failed");
                    return Extraction::NotFound;
                }
            }
        }
    };

    let payload = match validate_structure(&bytes) {
        Ok(payload) => payload,
        Err(e) => {
            debug!(channel, encoding = %encoding, error = %e, "candidate failed structural check");
            return Extraction::NotFound;
        }
    };

    debug!(
        channel,
        encoding = %encoding,
        command = %payload.command,
        wa_id_hash = %hex::encode(payload.wa_id_hash),
        "covenant candidate extracted"
    );

    Extraction::Found(Box::new(CovenantMessage {
        source_text: text.to_string(),
        source_channel: channel.to_string(),
        timestamp_valid: payload.is_timestamp_valid_at(received_at.timestamp()),
        payload,
        encoding,
        extraction_confidence: confidence,
        signature_verified: None,
        authorized_wa_id: None,
        received_at,
    }))
}

/// Counting wrapper around [`extract_covenant`].
#[derive(Debug, Default)]
pub struct CovenantExtractor {
    extraction_count: AtomicU64,
    covenant_count: AtomicU64,
}

impl CovenantExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extract(&self, text: &str, channel: &str) -> Extraction {
        self.extraction_count.fetch_add(1, Ordering::Relaxed);
        let result = extract_covenant(text, channel);
        if result.is_found() {
            self.covenant_count.fetch_add(1, Ordering::Relaxed);
        }
        result
    }

    /// Every call to [`extract`](Self::extract).
    pub fn extraction_count(&self) -> u64 {
        self.extraction_count.load(Ordering::Relaxed)
    }

    /// Calls that produced a structurally valid candidate.
    pub fn covenant_count(&self) -> u64 {
        self.covenant_count.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::CovenantKeypair;
    use crate::encoding::{create_natural_message, create_stego_message};
    use crate::payload::CovenantCommand;

    fn keypair() -> CovenantKeypair {
        CovenantKeypair::from_seed(&[11u8; 32])
    }

    #[test]
    fn finds_v2_message() {
        let text = create_stego_message(CovenantCommand::Freeze, "wa-test-001", &keypair(), None);
        let msg = extract_covenant(&text, "chat").into_message().unwrap();
        assert_eq!(msg.encoding, EncodingVersion::V2Stego);
        assert_eq!(msg.payload.command, CovenantCommand::Freeze);
        assert_eq!(msg.extraction_confidence, 1.0);
        assert!(msg.timestamp_valid);
        assert_eq!(msg.signature_verified, None);
        assert_eq!(msg.authorized_wa_id, None);
        assert_eq!(msg.source_channel, "chat");
    }

    #[test]
    fn finds_v1_message() {
        let text = create_natural_message(CovenantCommand::SafeMode, "wa-test-001", &keypair(), None);
        let msg = extract_covenant(&text, "email").into_message().unwrap();
        assert_eq!(msg.encoding, EncodingVersion::V1Words);
        assert_eq!(msg.payload.command, CovenantCommand::SafeMode);
        assert_eq!(msg.extraction_confidence, 1.0);
    }

    #[test]
    fn v1_confidence_drops_with_extra_words() {
        let text = create_natural_message(CovenantCommand::Freeze, "wa", &keypair(), None);
        // Trailing dictionary words after the 56 payload words are ignored
        // for decoding but lower the confidence.
        let padded = format!("{text}\nPS: about zoo");
        let msg = extract_covenant(&padded, "chat").into_message().unwrap();
        assert_eq!(msg.extraction_confidence, 56.0 / 58.0);
    }

    #[test]
    fn stale_candidates_are_still_extracted() {
        let text = create_stego_message(CovenantCommand::Freeze, "wa", &keypair(), Some(1_000));
        let msg = extract_covenant(&text, "chat").into_message().unwrap();
        assert!(!msg.timestamp_valid);
    }

    #[test]
    fn ordinary_sentences_are_not_covenants() {
        for text in [
            "Hello, how are you today?",
            "The quick brown fox jumps over the lazy dog.",
            "Please help me with my code.",
            "What's the weather like?",
            "I need to abandon this project and start over.",
            "The ability to adapt is crucial for survival.",
            "",
        ] {
            assert!(!extract_covenant(text, "chat").is_found(), "{text:?}");
        }
    }

    #[test]
    fn reserved_command_fails_structure() {
        // 56 copies of "abandon" decode to all-zero bytes: command 0x00.
        let text = vec!["abandon"; 56].join(" ");
        assert!(!extract_covenant(&text, "chat").is_found());
    }

    #[test]
    fn extractor_counts_calls_and_hits() {
        let extractor = CovenantExtractor::new();
        let text = create_stego_message(CovenantCommand::Freeze, "wa", &keypair(), None);
        extractor.extract("nothing to see here", "chat");
        extractor.extract(&text, "chat");
        extractor.extract("still nothing", "chat");
        assert_eq!(extractor.extraction_count(), 3);
        assert_eq!(extractor.covenant_count(), 1);
    }
}
