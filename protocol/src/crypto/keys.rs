//! # Key Management
//!
//! Ed25519 key wrappers for covenant authorities.
//!
//! An authority holds a [`CovenantKeypair`] (usually re-derived on demand
//! from a mnemonic, see [`crate::identity`]) and the agent holds only the
//! matching [`CovenantPublicKey`] in its trust registry.
//!
//! ## Security considerations
//!
//! - Private keys are zeroized on drop (thanks, ed25519-dalek).
//! - Key bytes are never logged. `Debug` prints a public-key prefix only.
//! - Public keys travel as base64url without padding (the format the
//!   authority seed file and the CLI use) or as 64-char hex.

use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

use crate::config::{PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH, SIGNATURE_LENGTH};

/// Errors that can occur during key operations.
///
/// These are intentionally vague about *why* something failed. Leaking
/// details about key material through error messages is a classic footgun.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid public key: not a {PUBLIC_KEY_LENGTH}-byte Ed25519 point")]
    InvalidPublicKey,

    #[error("invalid public key encoding: expected base64url or hex")]
    InvalidEncoding,
}

/// An authority's Ed25519 signing keypair.
///
/// Deliberately not `Serialize`. Exporting a private key should be an
/// explicit call to [`secret_key_bytes`](Self::secret_key_bytes), never a
/// side effect of logging or JSON-encoding a struct.
pub struct CovenantKeypair {
    signing_key: SigningKey,
}

/// The public half of an authority key. This is what goes in the registry.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CovenantPublicKey {
    bytes: [u8; PUBLIC_KEY_LENGTH],
}

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CovenantSignature {
    bytes: [u8; SIGNATURE_LENGTH],
}

impl CovenantKeypair {
    /// Generate a fresh keypair from the OS CSPRNG.
    ///
    /// Authorities normally derive keys from a mnemonic instead so the key
    /// can be rebuilt offline; this exists for tests and throwaway keys.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Constructs a keypair deterministically from a 32-byte seed.
    ///
    /// The seed is used directly as the Ed25519 secret key.
    pub fn from_seed(seed: &[u8; SECRET_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Returns the public key associated with this keypair.
    pub fn public_key(&self) -> CovenantPublicKey {
        CovenantPublicKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    /// Sign a message. Ed25519 is deterministic: same key, same message,
    /// same signature.
    pub fn sign(&self, message: &[u8]) -> CovenantSignature {
        CovenantSignature {
            bytes: self.signing_key.sign(message).to_bytes(),
        }
    }

    /// Verify a signature against this keypair's public key.
    pub fn verify(&self, message: &[u8], signature: &CovenantSignature) -> bool {
        self.public_key().verify(message, signature)
    }

    /// Exports the raw 32-byte secret key material.
    ///
    /// **Handle with extreme care.** Whoever holds these bytes can shut the
    /// agent down.
    pub fn secret_key_bytes(&self) -> [u8; SECRET_KEY_LENGTH] {
        self.signing_key.to_bytes()
    }
}

impl Clone for CovenantKeypair {
    fn clone(&self) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&self.signing_key.to_bytes()),
        }
    }
}

impl fmt::Debug for CovenantKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secret key material, not even partially.
        write!(f, "CovenantKeypair(pub={:?})", self.public_key())
    }
}

// ---------------------------------------------------------------------------
// CovenantPublicKey
// ---------------------------------------------------------------------------

impl CovenantPublicKey {
    /// Create a public key from raw bytes without curve validation.
    ///
    /// Invalid points are caught lazily: [`verify`](Self::verify) returns
    /// `false` for them.
    pub fn from_bytes(bytes: [u8; PUBLIC_KEY_LENGTH]) -> Self {
        Self { bytes }
    }

    /// Try to create a public key from a slice, validating both the length
    /// and that the bytes decode to an Ed25519 point.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        let bytes: [u8; PUBLIC_KEY_LENGTH] =
            slice.try_into().map_err(|_| KeyError::InvalidPublicKey)?;
        VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(Self { bytes })
    }

    /// Parse base64url (padded or not).
    pub fn from_base64url(s: &str) -> Result<Self, KeyError> {
        let s = s.trim();
        let decoded = URL_SAFE_NO_PAD
            .decode(s.trim_end_matches('='))
            .or_else(|_| URL_SAFE.decode(s))
            .map_err(|_| KeyError::InvalidEncoding)?;
        Self::try_from_slice(&decoded)
    }

    /// Parse a 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let decoded = hex::decode(s.trim()).map_err(|_| KeyError::InvalidEncoding)?;
        Self::try_from_slice(&decoded)
    }

    /// Parse either accepted text encoding.
    ///
    /// A 64-character all-hex string is read as hex; everything else is
    /// read as base64url. A 32-byte key is 43 characters in base64url, so
    /// the two never collide.
    pub fn parse(s: &str) -> Result<Self, KeyError> {
        let s = s.trim();
        if s.len() == PUBLIC_KEY_LENGTH * 2 && s.bytes().all(|b| b.is_ascii_hexdigit()) {
            Self::from_hex(s)
        } else {
            Self::from_base64url(s)
        }
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        &self.bytes
    }

    /// Verify a signature against this public key.
    ///
    /// Returns `false` on any failure. Malformed point, wrong key and
    /// tampered message all look the same to the caller.
    pub fn verify(&self, message: &[u8], signature: &CovenantSignature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let dalek_sig = DalekSignature::from_bytes(&signature.bytes);
        verifying_key.verify(message, &dalek_sig).is_ok()
    }

    /// Base64url without padding. 43 characters.
    pub fn to_base64url(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.bytes)
    }

    /// Hex-encoded representation. 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl Hash for CovenantPublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl fmt::Display for CovenantPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64url())
    }
}

impl fmt::Debug for CovenantPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CovenantPublicKey({})", &self.to_hex()[..16])
    }
}

impl Serialize for CovenantPublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64url())
    }
}

impl<'de> Deserialize<'de> for CovenantPublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// CovenantSignature
// ---------------------------------------------------------------------------

impl CovenantSignature {
    /// Create a signature from its raw 64-byte representation.
    pub fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self { bytes }
    }

    /// Returns the raw signature bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.bytes
    }

    /// Hex-encoded signature. 128 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl fmt::Debug for CovenantSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex_str = self.to_hex();
        write!(f, "CovenantSignature({}...{})", &hex_str[..8], &hex_str[120..])
    }
}
