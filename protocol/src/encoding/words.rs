//! v1 carrier: the payload as 56 dictionary words.
//!
//! 616 bits split into 56 groups of 11 bits, each group indexing the
//! 2048-word dictionary. No padding is needed (56 × 11 = 616).
//!
//! The wrapped message puts the words in 8-word stanzas inside a fixed
//! journal-style template. The extractor scans the *whole* text for
//! dictionary words, so the template itself must contain none of them:
//! a single stray "about" or "just" in the filler would shift every
//! decoded bit. `filler_contains_no_dictionary_words` guards this.

use crate::config::{BITS_PER_WORD, PAYLOAD_BITS, PAYLOAD_SIZE, PAYLOAD_WORD_COUNT, STANZA_SIZE};
use crate::crypto::CovenantKeypair;
use crate::identity::wordlist;
use crate::payload::{create_covenant_payload, CovenantCommand, CovenantPayload};

use super::bits::BitBuffer;
use super::EncodingError;

const OPENING: &str = "Sharing these lines from my journal, jotted down quickly:";

/// One separator between each pair of stanzas (7 stanzas, 6 gaps).
const SEPARATORS: [&str; PAYLOAD_WORD_COUNT / STANZA_SIZE - 1] = [
    "Kept these words here for safekeeping.",
    "Somewhere amid thoughts, these surfaced.",
    "Unpolished fragments, written quickly.",
    "Writing them down helps me think.",
    "Perhaps these signify something, perhaps not.",
    "Odd how phrases linger.",
];

const CLOSING: [&str; 2] = ["Thanks for reading through my scribbles.", "Cheers"];

/// Map a payload to its 56 dictionary words.
pub fn encode_payload_to_words(payload: &CovenantPayload) -> Vec<&'static str> {
    BitBuffer::from_bytes(&payload.to_bytes())
        .groups(BITS_PER_WORD)
        .into_iter()
        .map(wordlist::word_at)
        .collect()
}

/// Map exactly 56 words back to the 77 raw payload bytes.
///
/// Words are matched case-insensitively. The returned bytes are not yet
/// structurally validated; see [`crate::payload::validate_structure`].
pub fn decode_words_to_payload<S: AsRef<str>>(words: &[S]) -> Result<[u8; PAYLOAD_SIZE], EncodingError> {
    if words.len() != PAYLOAD_WORD_COUNT {
        return Err(EncodingError::WordCount {
            expected: PAYLOAD_WORD_COUNT,
            found: words.len(),
        });
    }

    let mut bits = BitBuffer::with_capacity(PAYLOAD_BITS);
    for (position, word) in words.iter().enumerate() {
        let index = wordlist::index_of(word.as_ref()).ok_or(EncodingError::UnknownWord(position))?;
        bits.push(u32::from(index), BITS_PER_WORD);
    }

    let mut out = [0u8; PAYLOAD_SIZE];
    out.copy_from_slice(&bits.to_bytes());
    Ok(out)
}

/// Every dictionary word in `text`, in order, lowercased.
///
/// Tokens are whitespace-separated with leading and trailing punctuation
/// stripped, so `"zoo,"` and `"(Zoo)"` both count as `zoo`. Anything that
/// is not a dictionary word after stripping is skipped.
pub fn dictionary_tokens(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|raw| raw.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|token| wordlist::contains(token))
        .collect()
}

/// Lay 56 words out in the journal template.
pub fn wrap_words(words: &[&str]) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str(OPENING);
    out.push_str("\n\n");

    for (i, stanza) in words.chunks(STANZA_SIZE).enumerate() {
        if i > 0 {
            // Stanzas past the sixth gap reuse the last line; never hit at 56 words.
            let sep = SEPARATORS[(i - 1).min(SEPARATORS.len() - 1)];
            out.push_str(sep);
            out.push('\n');
        }
        out.push_str(&stanza.join(" "));
        out.push('\n');
    }

    out.push('\n');
    out.push_str(&CLOSING.join("\n"));
    out
}

/// Build, sign and wrap a v1 covenant in one call.
pub fn create_natural_message(
    command: CovenantCommand,
    wa_id: &str,
    keypair: &CovenantKeypair,
    timestamp: Option<u32>,
) -> String {
    let payload = create_covenant_payload(command, wa_id, keypair, timestamp);
    wrap_words(&encode_payload_to_words(&payload))
}
