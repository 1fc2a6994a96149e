//! Trusted authorities and the seed files they are loaded from.
//!
//! ```json
//! { "authorities": [ { "wa_id": "...", "public_key": "<base64url or hex>", "role": "ROOT" } ] }
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::RegistryError;
use crate::config::WA_ID_HASH_LENGTH;
use crate::crypto::{compute_wa_id_hash, CovenantPublicKey};

/// Seed compiled into the library: the single root authority.
pub const BUNDLED_SEED: &str = include_str!("../../seed/root_authority.json");

/// A human (or role) allowed to issue covenants.
///
/// `wa_id_hash` is derived from `wa_id` at construction and has no setter,
/// so the two can never drift apart.
#[derive(Clone, PartialEq, Eq)]
pub struct TrustedAuthority {
    wa_id: String,
    wa_id_hash: [u8; WA_ID_HASH_LENGTH],
    public_key: CovenantPublicKey,
    role: String,
}

impl TrustedAuthority {
    pub fn new(wa_id: impl Into<String>, public_key: CovenantPublicKey, role: impl Into<String>) -> Self {
        let wa_id = wa_id.into();
        Self {
            wa_id_hash: compute_wa_id_hash(&wa_id),
            wa_id,
            public_key,
            role: role.into(),
        }
    }

    pub fn wa_id(&self) -> &str {
        &self.wa_id
    }

    pub fn wa_id_hash(&self) -> &[u8; WA_ID_HASH_LENGTH] {
        &self.wa_id_hash
    }

    pub fn public_key(&self) -> &CovenantPublicKey {
        &self.public_key
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    /// Key-free view for listings.
    pub fn summary(&self) -> AuthoritySummary {
        AuthoritySummary {
            wa_id: self.wa_id.clone(),
            wa_id_hash_hex: hex::encode(self.wa_id_hash),
            role: self.role.clone(),
        }
    }
}

impl fmt::Debug for TrustedAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustedAuthority")
            .field("wa_id", &self.wa_id)
            .field("wa_id_hash", &hex::encode(self.wa_id_hash))
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// What a registry listing exposes about an authority. No key material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthoritySummary {
    pub wa_id: String,
    pub wa_id_hash_hex: String,
    pub role: String,
}

/// One entry of a seed file, before key parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorityRecord {
    pub wa_id: String,
    pub public_key: String,
    pub role: String,
}

impl TryFrom<&AuthorityRecord> for TrustedAuthority {
    type Error = RegistryError;

    fn try_from(record: &AuthorityRecord) -> Result<Self, Self::Error> {
        let public_key = CovenantPublicKey::parse(&record.public_key).map_err(|source| RegistryError::InvalidKey {
            wa_id: record.wa_id.clone(),
            source,
        })?;
        Ok(Self::new(record.wa_id.clone(), public_key, record.role.clone()))
    }
}

/// A parsed seed document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedFile {
    pub authorities: Vec<AuthorityRecord>,
}

impl SeedFile {
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The seed compiled into the library.
    pub fn bundled() -> Result<Self, RegistryError> {
        Self::from_json(BUNDLED_SEED)
    }

    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let json = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Parse every record. The first bad key fails the whole file.
    pub fn to_authorities(&self) -> Result<Vec<TrustedAuthority>, RegistryError> {
        self.authorities.iter().map(TrustedAuthority::try_from).collect()
    }
}
