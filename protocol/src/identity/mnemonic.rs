//! # Mnemonics
//!
//! BIP-39 mnemonic generation, validation and seed derivation.
//!
//! An authority's signing key is never stored anywhere. It is re-derived
//! from a memorized (or safe-deposited) word list whenever a covenant has
//! to be issued:
//!
//! ```text
//! entropy ──► entropy ‖ SHA-256(entropy)[..cs] ──► 11-bit groups ──► words
//! words ──► PBKDF2-HMAC-SHA512("mnemonic" + passphrase, 2048) ──► 64-byte seed
//! ```
//!
//! For `n` words the entropy is `n·11 − n/3` bits and the checksum `n/3`
//! bits, so 12 words carry 128 bits of entropy and 24 words carry 256.

use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha512;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::wordlist;
use crate::config::{BITS_PER_WORD, PBKDF2_ROUNDS, SEED_LENGTH, SEED_SALT_PREFIX, VALID_MNEMONIC_LENGTHS};
use crate::crypto::sha256;
use crate::encoding::bits::BitBuffer;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a mnemonic was rejected.
///
/// Deliberately does not echo the offending word back: error strings end
/// up in logs, and a partial mnemonic in a log is a partial key.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MnemonicError {
    /// Word count outside {12, 15, 18, 21, 24}.
    #[error("invalid mnemonic length: {0} words (expected 12, 15, 18, 21 or 24)")]
    InvalidWordCount(usize),

    /// Entropy length outside {16, 20, 24, 28, 32} bytes.
    #[error("invalid entropy length: {0} bytes")]
    InvalidEntropyLength(usize),

    /// A word is not in the dictionary. Carries the 0-based position.
    #[error("word #{0} is not in the dictionary")]
    UnknownWord(usize),

    /// Every word is known but the embedded checksum does not match.
    #[error("mnemonic checksum mismatch")]
    ChecksumMismatch,
}

// ---------------------------------------------------------------------------
// Seed
// ---------------------------------------------------------------------------

/// A 64-byte BIP-39 seed. Wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; SEED_LENGTH]);

impl Seed {
    /// The raw seed bytes.
    pub fn as_bytes(&self) -> &[u8; SEED_LENGTH] {
        &self.0
    }
}

impl std::fmt::Debug for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Seed(<redacted>)")
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Checksum length in bits for a given word count.
fn checksum_bits(word_count: usize) -> usize {
    word_count / 3
}

/// Entropy length in bits for a given word count.
fn entropy_bits(word_count: usize) -> usize {
    word_count * BITS_PER_WORD - checksum_bits(word_count)
}

/// Generate a fresh mnemonic of `word_count` words from the OS CSPRNG.
///
/// ```
/// use covenant_protocol::identity::{generate_mnemonic, validate_mnemonic};
///
/// let phrase = generate_mnemonic(24).unwrap();
/// assert_eq!(phrase.split_whitespace().count(), 24);
/// assert!(validate_mnemonic(&phrase));
/// ```
pub fn generate_mnemonic(word_count: usize) -> Result<String, MnemonicError> {
    if !VALID_MNEMONIC_LENGTHS.contains(&word_count) {
        return Err(MnemonicError::InvalidWordCount(word_count));
    }
    let mut entropy = vec![0u8; entropy_bits(word_count) / 8];
    OsRng.fill_bytes(&mut entropy);
    let phrase = mnemonic_from_entropy(&entropy);
    entropy.zeroize();
    phrase
}

/// Build the mnemonic for a given entropy (16, 20, 24, 28 or 32 bytes).
///
/// Deterministic, which makes it the entry point for test vectors:
/// sixteen zero bytes give "abandon" × 11 followed by "about".
pub fn mnemonic_from_entropy(entropy: &[u8]) -> Result<String, MnemonicError> {
    let word_count = entropy.len() * 8 * 3 / 32;
    if entropy.len() % 4 != 0 || !VALID_MNEMONIC_LENGTHS.contains(&word_count) {
        return Err(MnemonicError::InvalidEntropyLength(entropy.len()));
    }

    let mut checksum = BitBuffer::from_bytes(&sha256(entropy));
    checksum.truncate(checksum_bits(word_count));

    let mut bits = BitBuffer::from_bytes(entropy);
    bits.extend(&checksum);

    let phrase = bits
        .groups(BITS_PER_WORD)
        .into_iter()
        .map(wordlist::word_at)
        .collect::<Vec<_>>()
        .join(" ");
    Ok(phrase)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a mnemonic and say why it failed.
///
/// Checks, cheapest first: word count, dictionary membership (case-
/// insensitive), then the SHA-256 checksum.
pub fn check_mnemonic(phrase: &str) -> Result<(), MnemonicError> {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    if !VALID_MNEMONIC_LENGTHS.contains(&words.len()) {
        return Err(MnemonicError::InvalidWordCount(words.len()));
    }

    let mut bits = BitBuffer::with_capacity(words.len() * BITS_PER_WORD);
    for (position, word) in words.iter().enumerate() {
        let index = wordlist::index_of(word).ok_or(MnemonicError::UnknownWord(position))?;
        bits.push(u32::from(index), BITS_PER_WORD);
    }

    let ent = entropy_bits(words.len());
    let cs = checksum_bits(words.len());

    let mut entropy_buf = bits.clone();
    entropy_buf.truncate(ent);
    let mut entropy = entropy_buf.to_bytes();

    let expected = BitBuffer::from_bytes(&sha256(&entropy)).read(0, cs);
    let embedded = bits.read(ent, cs);
    entropy.zeroize();

    if expected != embedded {
        return Err(MnemonicError::ChecksumMismatch);
    }
    Ok(())
}

/// Boolean form of [`check_mnemonic`].
pub fn validate_mnemonic(phrase: &str) -> bool {
    check_mnemonic(phrase).is_ok()
}

/// Canonical form of a mnemonic: lowercase words joined by single spaces.
///
/// Seed derivation hashes the exact bytes it is given, so two spellings of
/// the same phrase ("Abandon  abandon ...") must be folded to one before
/// deriving keys.
pub fn normalize_mnemonic(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Seed derivation
// ---------------------------------------------------------------------------

/// PBKDF2-HMAC-SHA512 over the mnemonic bytes with salt
/// `"mnemonic" + passphrase`, 2048 rounds, 64-byte output.
///
/// Hashes `mnemonic` exactly as given; callers wanting case/whitespace
/// tolerance should pass it through [`normalize_mnemonic`] first.
pub fn mnemonic_to_seed(mnemonic: &str, passphrase: &str) -> Seed {
    let mut salt = String::with_capacity(SEED_SALT_PREFIX.len() + passphrase.len());
    salt.push_str(SEED_SALT_PREFIX);
    salt.push_str(passphrase);

    let mut out = [0u8; SEED_LENGTH];
    pbkdf2_hmac::<Sha512>(mnemonic.as_bytes(), salt.as_bytes(), PBKDF2_ROUNDS, &mut out);
    salt.zeroize();
    Seed(out)
}
