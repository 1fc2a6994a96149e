//! # Identity Module
//!
//! Key derivation for the humans allowed to invoke a covenant.
//!
//! The identity stack is layered:
//!
//! 1. **Wordlist**: the 2048-word BIP-39 English dictionary. The v1 word
//!    encoder reuses it, which is why it lives here and not in `encoding`.
//! 2. **Mnemonic**: generation, checksum validation and PBKDF2 seed
//!    derivation, bit-compatible with BIP-39.
//! 3. **Derivation**: seed → Ed25519 keypair, plus the one-call
//!    [`derive_covenant_keypair`] used by authorities and the CLI.
//!
//! ## Design Decisions
//!
//! - Keys are derived, not stored. Losing the laptop must not lose the
//!   ability to stop the agent.
//! - The passphrase is optional and defaults to empty, matching BIP-39.

pub mod derivation;
pub mod mnemonic;
pub mod wordlist;

pub use derivation::{derive_covenant_keypair, seed_to_ed25519_keypair, DerivedKeys};
pub use mnemonic::{
    check_mnemonic, generate_mnemonic, mnemonic_from_entropy, mnemonic_to_seed,
    normalize_mnemonic, validate_mnemonic, MnemonicError, Seed,
};
