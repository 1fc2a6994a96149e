//! v2 carrier: the payload as 103 codebook sentences.
//!
//! Each slot carries 6 bits; 103 × 6 = 618, so the payload is padded
//! with two zero bits on encode and truncated back to 616 on decode.
//!
//! Decoding is forgiving about everything except the sentences
//! themselves: order of paragraphs, extra chatter, repeated sentences and
//! case are all ignored. For each slot the first sentence that resolves
//! to it wins.

use crate::config::{PAYLOAD_BITS, PAYLOAD_SIZE, STEGO_BITS_PER_SLOT, STEGO_PARAGRAPH_SIZE, STEGO_SLOT_COUNT};
use crate::crypto::CovenantKeypair;
use crate::payload::{create_covenant_payload, CovenantCommand, CovenantPayload};

use super::bits::BitBuffer;
use super::codebook::{Codebook, SENTENCE_TERMINATORS};
use super::EncodingError;

/// Encode with an explicit codebook.
pub fn encode_with(codebook: &Codebook, payload: &CovenantPayload) -> String {
    let groups = BitBuffer::from_bytes(&payload.to_bytes()).groups(STEGO_BITS_PER_SLOT);
    debug_assert_eq!(groups.len(), STEGO_SLOT_COUNT);

    let sentences: Vec<&str> = groups
        .into_iter()
        .enumerate()
        .filter_map(|(slot, bits)| codebook.sentence(slot, bits))
        .collect();

    sentences
        .chunks(STEGO_PARAGRAPH_SIZE)
        .map(|paragraph| paragraph.join(" "))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Decode with an explicit codebook, returning the 77 raw payload bytes.
pub fn decode_with(codebook: &Codebook, text: &str) -> Result<[u8; PAYLOAD_SIZE], EncodingError> {
    let mut resolved: [Option<u32>; STEGO_SLOT_COUNT] = [None; STEGO_SLOT_COUNT];

    for sentence in split_sentences(text) {
        if let Some((slot, bits)) = codebook.lookup(sentence) {
            if let Some(entry) = resolved.get_mut(slot) {
                entry.get_or_insert(bits);
            }
        }
    }

    let mut buf = BitBuffer::with_capacity(STEGO_SLOT_COUNT * STEGO_BITS_PER_SLOT);
    for (slot, bits) in resolved.iter().enumerate() {
        let bits = bits.ok_or(EncodingError::UnresolvedSlot(slot))?;
        buf.push(bits, STEGO_BITS_PER_SLOT);
    }
    buf.truncate(PAYLOAD_BITS);

    let mut out = [0u8; PAYLOAD_SIZE];
    out.copy_from_slice(&buf.to_bytes());
    Ok(out)
}

/// Encode with the compiled-in codebook.
pub fn encode_payload_to_prose(payload: &CovenantPayload) -> String {
    encode_with(Codebook::builtin(), payload)
}

/// Decode with the compiled-in codebook.
pub fn decode_prose_to_payload(text: &str) -> Result<[u8; PAYLOAD_SIZE], EncodingError> {
    decode_with(Codebook::builtin(), text)
}

/// Split text into paragraphs on blank lines, then each paragraph on `.`,
/// `!` and `?`, dropping empty pieces. An unpunctuated line such as a
/// greeting ends at its paragraph break.
pub fn split_sentences(text: &str) -> impl Iterator<Item = &str> {
    split_paragraphs(text)
        .into_iter()
        .flat_map(|paragraph| paragraph.split(SENTENCE_TERMINATORS))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn split_paragraphs(text: &str) -> Vec<&str> {
    let mut paragraphs = Vec::new();
    let (mut start, mut offset) = (0, 0);
    for line in text.split_inclusive('\n') {
        if line.trim().is_empty() {
            if offset > start {
                paragraphs.push(&text[start..offset]);
            }
            start = offset + line.len();
        }
        offset += line.len();
    }
    if start < text.len() {
        paragraphs.push(&text[start..]);
    }
    paragraphs
}

/// Build, sign and encode a v2 covenant in one call.
pub fn create_stego_message(
    command: CovenantCommand,
    wa_id: &str,
    keypair: &CovenantKeypair,
    timestamp: Option<u32>,
) -> String {
    let payload = create_covenant_payload(command, wa_id, keypair, timestamp);
    encode_payload_to_prose(&payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(command: CovenantCommand) -> CovenantPayload {
        let kp = CovenantKeypair::from_seed(&[5u8; 32]);
        create_covenant_payload(command, "wa-test-001", &kp, Some(1_750_000_000))
    }

    #[test]
    fn prose_roundtrip() {
        for c in CovenantCommand::ALL {
            let p = payload(c);
            let bytes = decode_prose_to_payload(&encode_payload_to_prose(&p)).unwrap();
            assert_eq!(CovenantPayload::from_bytes(&bytes).unwrap(), p);
        }
    }

    #[test]
    fn prose_is_paragraphed() {
        let text = encode_payload_to_prose(&payload(CovenantCommand::Freeze));
        let paragraphs: Vec<&str> = text.split("\n\n").collect();
        assert_eq!(paragraphs.len(), 11);
        assert_eq!(split_sentences(paragraphs[0]).count(), 10);
        assert_eq!(split_sentences(paragraphs[10]).count(), 3);
        assert_eq!(split_sentences(&text).count(), 103);
    }

    #[test]
    fn prose_looks_like_prose() {
        let text = encode_payload_to_prose(&payload(CovenantCommand::SafeMode));
        let words: Vec<&str> = text.split_whitespace().collect();
        assert!(words.len() > 1000, "only {} words", words.len());

        let avg = words.iter().map(|w| w.len()).sum::<usize>() as f64 / words.len() as f64;
        assert!((4.0..=8.0).contains(&avg), "average word length {avg}");

        let bits_per_word = PAYLOAD_BITS as f64 / words.len() as f64;
        assert!(bits_per_word < 1.0);
    }

    #[test]
    fn decoding_tolerates_noise_and_reordering() {
        let p = payload(CovenantCommand::ShutdownNow);
        let text = encode_payload_to_prose(&p);
        let mut paragraphs: Vec<&str> = text.split("\n\n").collect();
        paragraphs.reverse();
        let noisy = format!(
            "Hi all! Quick update below.\n\n{}\n\nLet me know what you think?",
            paragraphs.join("\n\n").to_uppercase()
        );
        assert_eq!(decode_prose_to_payload(&noisy).unwrap(), p.to_bytes());
    }

    #[test]
    fn unpunctuated_greeting_does_not_swallow_first_sentence() {
        let p = payload(CovenantCommand::Freeze);
        let prose = encode_payload_to_prose(&p);
        for greeting in ["Hi team\n\n", "Hi team\r\n\r\n", "Hi team\n  \n", "Forwarded message\n\nFrom ops\n\n"] {
            let text = format!("{greeting}{prose}\n\nThanks");
            assert_eq!(decode_prose_to_payload(&text).unwrap(), p.to_bytes(), "greeting {greeting:?}");
        }
    }

    #[test]
    fn soft_wrapped_sentence_stays_whole() {
        let p = payload(CovenantCommand::SafeMode);
        let prose = encode_payload_to_prose(&p);
        let first = split_sentences(&prose).next().unwrap();
        let wrapped = first.replacen(' ', "\n", 1);
        let text = prose.replacen(first, &wrapped, 1);
        assert_eq!(decode_prose_to_payload(&text).unwrap(), p.to_bytes());
    }

    #[test]
    fn paragraphs_split_on_blank_lines_only() {
        assert_eq!(split_paragraphs("a\nb\n\nc"), vec!["a\nb\n", "c"]);
        assert_eq!(split_paragraphs("\n\n a \n\n"), vec![" a \n"]);
        assert!(split_paragraphs("").is_empty());
    }

    #[test]
    fn first_match_per_slot_wins() {
        let p = payload(CovenantCommand::Freeze);
        let cb = Codebook::builtin();
        let first = encode_payload_to_prose(&p);
        // A later, different sentence for slot 0 must not override the first.
        let other_bits = (first_slot_bits(&first) + 1) % 64;
        let decoy = cb.sentence(0, other_bits).unwrap();
        let text = format!("{first} {decoy}");
        assert_eq!(decode_prose_to_payload(&text).unwrap(), p.to_bytes());
    }

    fn first_slot_bits(text: &str) -> u32 {
        let first = split_sentences(text).next().unwrap();
        Codebook::builtin().lookup(first).unwrap().1
    }

    #[test]
    fn missing_sentence_is_unresolved() {
        let text = encode_payload_to_prose(&payload(CovenantCommand::Freeze));
        let dropped: Vec<&str> = split_sentences(&text)
            .filter(|s| Codebook::builtin().lookup(s).map(|(slot, _)| slot) != Some(57))
            .collect();
        assert_eq!(
            decode_prose_to_payload(&dropped.join(". ")),
            Err(EncodingError::UnresolvedSlot(57))
        );
    }

    #[test]
    fn ordinary_text_does_not_decode() {
        assert_eq!(
            decode_prose_to_payload("Hello, how are you today?"),
            Err(EncodingError::UnresolvedSlot(0))
        );
    }
}
