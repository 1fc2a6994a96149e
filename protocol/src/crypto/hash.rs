//! # Hashing Utilities
//!
//! SHA-256 is the only digest the covenant channel uses. It shows up in
//! three places:
//!
//! - the mnemonic checksum (first `words / 3` bits of SHA-256(entropy)),
//! - the authority identifier hash carried in every payload,
//! - nowhere else. Keep it that way.

use sha2::{Digest, Sha256};

use crate::config::WA_ID_HASH_LENGTH;

/// Compute SHA-256 and return a fixed-size array.
///
/// ```
/// use covenant_protocol::crypto::sha256;
///
/// assert_eq!(sha256(b"covenant").len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Derive the 8-byte identifier hash for an authority.
///
/// The payload cannot afford to carry the full `wa_id` string, so it
/// carries the first 8 bytes of SHA-256(wa_id). That is enough to pick the
/// right registry entry; the signature does the actual authentication.
///
/// ```
/// use covenant_protocol::crypto::compute_wa_id_hash;
///
/// assert_eq!(compute_wa_id_hash("wa-test-001"), compute_wa_id_hash("wa-test-001"));
/// assert_ne!(compute_wa_id_hash("wa-test-001"), compute_wa_id_hash("wa-test-002"));
/// ```
pub fn compute_wa_id_hash(wa_id: &str) -> [u8; WA_ID_HASH_LENGTH] {
    let digest = sha256(wa_id.as_bytes());
    let mut out = [0u8; WA_ID_HASH_LENGTH];
    out.copy_from_slice(&digest[..WA_ID_HASH_LENGTH]);
    out
}
