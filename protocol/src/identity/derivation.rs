//! Mnemonic → Ed25519 key derivation for covenant authorities.
//!
//! The first 32 bytes of the BIP-39 seed are used directly as the Ed25519
//! secret key. No BIP-32/SLIP-10 path: an authority has exactly one
//! covenant key per mnemonic, and that key must be reproducible with
//! nothing more than the words.

use super::mnemonic::{check_mnemonic, mnemonic_to_seed, normalize_mnemonic, MnemonicError, Seed};
use crate::config::SECRET_KEY_LENGTH;
use crate::crypto::CovenantKeypair;

/// Result of [`derive_covenant_keypair`].
#[derive(Debug, Clone)]
pub struct DerivedKeys {
    /// The authority's signing keypair.
    pub keypair: CovenantKeypair,
    /// The public key, base64url without padding, ready for a seed file.
    pub public_key_b64: String,
}

/// Turn a BIP-39 seed into an Ed25519 keypair. Deterministic.
pub fn seed_to_ed25519_keypair(seed: &Seed) -> CovenantKeypair {
    let mut secret = [0u8; SECRET_KEY_LENGTH];
    secret.copy_from_slice(&seed.as_bytes()[..SECRET_KEY_LENGTH]);
    let keypair = CovenantKeypair::from_seed(&secret);
    zeroize::Zeroize::zeroize(&mut secret);
    keypair
}

/// Validate a mnemonic and derive the authority keypair from it.
///
/// The phrase is normalized (lowercase, single spaces) before hashing so
/// that the same words always yield the same key no matter how they were
/// typed. An invalid mnemonic is an `Err`, never a panic.
///
/// ```
/// use covenant_protocol::identity::derive_covenant_keypair;
///
/// let keys = derive_covenant_keypair(
///     "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about",
///     "",
/// ).unwrap();
/// assert_eq!(keys.public_key_b64, "xXheGGW3CJOK_4Fh1XMAZJZmOxqhCDTjltxWaGmixmo");
/// ```
pub fn derive_covenant_keypair(mnemonic: &str, passphrase: &str) -> Result<DerivedKeys, MnemonicError> {
    check_mnemonic(mnemonic)?;
    let seed = mnemonic_to_seed(&normalize_mnemonic(mnemonic), passphrase);
    let keypair = seed_to_ed25519_keypair(&seed);
    let public_key_b64 = keypair.public_key().to_base64url();
    Ok(DerivedKeys {
        keypair,
        public_key_b64,
    })
}
