//! The in-memory set of trusted authorities.
//!
//! All mutation goes through one `parking_lot::RwLock`. The handler's
//! fail-closed checks take the write half via [`AuthorityRegistry::exclusive`]
//! so no reader can see a half-applied change and two disable attempts
//! cannot both slip past the "authorities loaded?" check.

use std::path::PathBuf;

use parking_lot::{RwLock, RwLockWriteGuard};
use tracing::{info, warn};

use super::authority::{AuthoritySummary, SeedFile, TrustedAuthority};
use super::RegistryError;

/// Somewhere authorities can be loaded from at startup.
pub trait AuthoritySource {
    fn load(&self) -> Result<Vec<TrustedAuthority>, RegistryError>;

    /// Short label for logs.
    fn describe(&self) -> String;
}

/// The seed compiled into the library.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledSeed;

impl AuthoritySource for BundledSeed {
    fn load(&self) -> Result<Vec<TrustedAuthority>, RegistryError> {
        SeedFile::bundled()?.to_authorities()
    }

    fn describe(&self) -> String {
        "bundled seed".to_string()
    }
}

/// A seed file on disk.
#[derive(Debug, Clone)]
pub struct SeedPath(pub PathBuf);

impl AuthoritySource for SeedPath {
    fn load(&self) -> Result<Vec<TrustedAuthority>, RegistryError> {
        SeedFile::load(&self.0)?.to_authorities()
    }

    fn describe(&self) -> String {
        self.0.display().to_string()
    }
}

impl AuthoritySource for SeedFile {
    fn load(&self) -> Result<Vec<TrustedAuthority>, RegistryError> {
        self.to_authorities()
    }

    fn describe(&self) -> String {
        format!("inline seed ({} records)", self.authorities.len())
    }
}

/// Ordered list of trusted authorities. Order matters: verification
/// accepts the first authority whose hash and key both match.
#[derive(Debug, Default)]
pub struct AuthorityRegistry {
    authorities: RwLock<Vec<TrustedAuthority>>,
}

impl AuthorityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_authorities(authorities: Vec<TrustedAuthority>) -> Self {
        Self {
            authorities: RwLock::new(authorities),
        }
    }

    /// Add an authority, or replace the key and role of an existing one
    /// with the same `wa_id`. Returns `true` if it was new.
    pub fn add_authority(&self, authority: TrustedAuthority) -> bool {
        let mut guard = self.authorities.write();
        if let Some(existing) = guard.iter_mut().find(|a| a.wa_id() == authority.wa_id()) {
            info!(wa_id = authority.wa_id(), role = authority.role(), "trusted authority updated");
            *existing = authority;
            false
        } else {
            info!(wa_id = authority.wa_id(), role = authority.role(), "trusted authority added");
            guard.push(authority);
            true
        }
    }

    /// Remove by `wa_id`. Returns `true` if something was removed.
    pub fn remove_authority(&self, wa_id: &str) -> bool {
        let mut guard = self.authorities.write();
        let before = guard.len();
        guard.retain(|a| a.wa_id() != wa_id);
        let removed = guard.len() != before;
        if removed {
            info!(wa_id, "trusted authority removed");
            if guard.is_empty() {
                warn!("last trusted authority removed; covenants can no longer be verified");
            }
        }
        removed
    }

    /// Append everything a source yields. Returns how many were new.
    pub fn load_from(&self, source: &dyn AuthoritySource) -> Result<usize, RegistryError> {
        let mut added = 0;
        for authority in source.load()? {
            if self.add_authority(authority) {
                added += 1;
            }
        }
        info!(source = %source.describe(), added, "authorities loaded");
        Ok(added)
    }

    /// Key-free listing, in verification order.
    pub fn list(&self) -> Vec<AuthoritySummary> {
        self.authorities.read().iter().map(TrustedAuthority::summary).collect()
    }

    pub fn get(&self, wa_id: &str) -> Option<TrustedAuthority> {
        self.authorities.read().iter().find(|a| a.wa_id() == wa_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.authorities.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.authorities.read().is_empty()
    }

    /// Run `f` over the authorities under the read lock.
    pub fn with_authorities<R>(&self, f: impl FnOnce(&[TrustedAuthority]) -> R) -> R {
        f(self.authorities.read().as_slice())
    }

    /// Hold the write lock. Used by checks that must not race a mutation.
    pub(crate) fn exclusive(&self) -> RwLockWriteGuard<'_, Vec<TrustedAuthority>> {
        self.authorities.write()
    }
}
