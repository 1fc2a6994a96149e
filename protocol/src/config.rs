//! # Protocol Configuration & Constants
//!
//! Every magic number in the covenant channel lives here. The encoders,
//! the extractor and the verifier all read from this file, so an encoder
//! and a decoder built from the same crate version can never disagree on
//! a size.
//!
//! Changing any of these after keys and codebooks have been distributed
//! breaks every covenant already written down. Treat them as wire format.

// ---------------------------------------------------------------------------
// Payload Layout
// ---------------------------------------------------------------------------

/// Length of the big-endian Unix timestamp field.
pub const TIMESTAMP_LENGTH: usize = 4;

/// Length of the command byte.
pub const COMMAND_LENGTH: usize = 1;

/// Length of the truncated SHA-256 digest identifying the issuing authority.
pub const WA_ID_HASH_LENGTH: usize = 8;

/// Ed25519 signature length. Always 64 bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// Ed25519 public (verifying) key length.
pub const PUBLIC_KEY_LENGTH: usize = 32;

/// Ed25519 secret seed length.
pub const SECRET_KEY_LENGTH: usize = 32;

/// Bytes covered by the signature: timestamp ‖ command ‖ wa_id_hash.
pub const SIGNABLE_LENGTH: usize = TIMESTAMP_LENGTH + COMMAND_LENGTH + WA_ID_HASH_LENGTH;

/// Total serialized payload size. 13 signable bytes + 64 signature bytes.
pub const PAYLOAD_SIZE: usize = SIGNABLE_LENGTH + SIGNATURE_LENGTH;

/// Payload size in bits. Both linguistic encoders are sized around this.
pub const PAYLOAD_BITS: usize = PAYLOAD_SIZE * 8;

/// Accepted clock distance between the issuer and the agent, in seconds.
/// Applied symmetrically: a covenant may be up to a day old or a day early.
pub const TIMESTAMP_WINDOW_SECONDS: i64 = 86_400;

// ---------------------------------------------------------------------------
// Mnemonic / Key Derivation
// ---------------------------------------------------------------------------

/// Number of entries in the mnemonic dictionary.
pub const WORDLIST_SIZE: usize = 2048;

/// Bits carried by a single dictionary word (2^11 = 2048).
pub const BITS_PER_WORD: usize = 11;

/// Mnemonic lengths we accept, in words.
pub const VALID_MNEMONIC_LENGTHS: [usize; 5] = [12, 15, 18, 21, 24];

/// Default mnemonic length for freshly generated keys (256 bits of entropy).
pub const DEFAULT_MNEMONIC_LENGTH: usize = 24;

/// PBKDF2-HMAC-SHA512 iteration count for seed derivation.
pub const PBKDF2_ROUNDS: u32 = 2048;

/// Salt prefix for seed derivation; the passphrase is appended to it.
pub const SEED_SALT_PREFIX: &str = "mnemonic";

/// Length of the derived seed in bytes.
pub const SEED_LENGTH: usize = 64;

// ---------------------------------------------------------------------------
// Word Encoder (v1)
// ---------------------------------------------------------------------------

/// Words needed to carry one payload. 56 × 11 = 616, no padding.
pub const PAYLOAD_WORD_COUNT: usize = PAYLOAD_BITS / BITS_PER_WORD;

/// Words per stanza in the wrapped v1 message.
pub const STANZA_SIZE: usize = 8;

// ---------------------------------------------------------------------------
// Steganographic Encoder (v2)
// ---------------------------------------------------------------------------

/// Version tag of the compiled-in codebook. Encoder and decoder must match.
pub const CODEBOOK_VERSION: &str = "v2.0";

/// Bits selected by each sentence slot.
pub const STEGO_BITS_PER_SLOT: usize = 6;

/// Sentence variants per slot (2^6).
pub const STEGO_VARIANTS_PER_SLOT: usize = 1 << STEGO_BITS_PER_SLOT;

/// Number of sentence slots. 103 × 6 = 618 bits, the payload is zero-padded
/// by two bits to fill the last slot.
pub const STEGO_SLOT_COUNT: usize = PAYLOAD_BITS.div_ceil(STEGO_BITS_PER_SLOT);

/// Sentences per paragraph in the v2 carrier text.
pub const STEGO_PARAGRAPH_SIZE: usize = 10;

// ---------------------------------------------------------------------------
// Authorities
// ---------------------------------------------------------------------------

/// Role tag given to the bundled root authority.
pub const ROOT_ROLE: &str = "ROOT";
