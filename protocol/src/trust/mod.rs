//! # Trust Registry & Verification
//!
//! Who may issue covenants, and the check that a candidate really came
//! from one of them.
//!
//! ## Components
//!
//! - [`authority`]: `TrustedAuthority`, seed-file parsing, the bundled root.
//! - [`registry`]: the lock-guarded, ordered authority list.
//! - [`verifier`]: timestamp + identity + signature verification.

pub mod authority;
pub mod registry;
pub mod verifier;

use std::path::PathBuf;

use thiserror::Error;

use crate::crypto::KeyError;

pub use authority::{AuthorityRecord, AuthoritySummary, SeedFile, TrustedAuthority, BUNDLED_SEED};
pub use registry::{AuthorityRegistry, AuthoritySource, BundledSeed, SeedPath};
pub use verifier::{verify_covenant, verify_covenant_at, CovenantVerifier, RejectionReason, VerificationResult};

/// Errors raised while loading authorities.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read seed file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed seed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid public key for authority {wa_id}: {source}")]
    InvalidKey {
        wa_id: String,
        #[source]
        source: KeyError,
    },
}
