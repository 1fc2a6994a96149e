//! # Cryptographic Primitives
//!
//! Everything security-related in the covenant channel flows through here:
//!
//! - **Ed25519** for covenant signatures. Deterministic, 32-byte keys,
//!   64-byte signatures, and nobody has broken it.
//! - **SHA-256** for the mnemonic checksum and the authority identifier hash.
//!
//! ## A note on "rolling your own crypto"
//!
//! We don't. These are thin, type-safe wrappers around `ed25519-dalek`
//! and `sha2`. The bit-packing in [`crate::encoding`] is ours; the
//! cryptography is not.

pub mod hash;
pub mod keys;

pub use hash::{compute_wa_id_hash, sha256};
pub use keys::{CovenantKeypair, CovenantPublicKey, CovenantSignature, KeyError};
