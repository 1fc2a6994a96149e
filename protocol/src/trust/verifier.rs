//! Covenant verification: timestamp window, then identity plus signature.
//!
//! 1. Outside the ±24 h window → `TimestampOutOfWindow`. No authority is
//!    looked at and no signature is checked.
//! 2. The first authority whose `wa_id_hash` matches *and* whose key
//!    verifies the signature wins.
//! 3. Otherwise → `NoMatchingAuthority`. Unknown identity and wrong key
//!    are reported identically; telling them apart would let an attacker
//!    enumerate which identities are trusted.
//!
//! Step 2 checks the signature against every authority, matching hash or
//! not, so the time taken depends only on the registry size.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::authority::TrustedAuthority;
use super::registry::AuthorityRegistry;
use crate::extract::CovenantMessage;
use crate::payload::{verify_covenant_signature, CovenantCommand, CovenantPayload};

/// Why a candidate was rejected. Deliberately coarse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    TimestampOutOfWindow,
    NoMatchingAuthority,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimestampOutOfWindow => f.write_str("timestamp outside the accepted window"),
            Self::NoMatchingAuthority => f.write_str("no matching authority"),
        }
    }
}

/// Outcome of [`verify_covenant`].
///
/// Build with [`accepted`](Self::accepted) or [`rejected`](Self::rejected)
/// so `rejection_reason` is set exactly when `valid` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    pub valid: bool,
    pub command: Option<CovenantCommand>,
    pub wa_id: Option<String>,
    pub wa_role: Option<String>,
    pub rejection_reason: Option<RejectionReason>,
}

impl VerificationResult {
    pub fn accepted(command: CovenantCommand, authority: &TrustedAuthority) -> Self {
        Self {
            valid: true,
            command: Some(command),
            wa_id: Some(authority.wa_id().to_string()),
            wa_role: Some(authority.role().to_string()),
            rejection_reason: None,
        }
    }

    pub fn rejected(reason: RejectionReason) -> Self {
        Self {
            valid: false,
            command: None,
            wa_id: None,
            wa_role: None,
            rejection_reason: Some(reason),
        }
    }
}

/// Verify against the system clock.
pub fn verify_covenant(payload: &CovenantPayload, authorities: &[TrustedAuthority]) -> VerificationResult {
    verify_covenant_at(payload, authorities, Utc::now().timestamp())
}

/// Verify at an explicit Unix time.
pub fn verify_covenant_at(payload: &CovenantPayload, authorities: &[TrustedAuthority], now: i64) -> VerificationResult {
    if !payload.is_timestamp_valid_at(now) {
        warn!(
            age_secs = payload.age_at(now),
            wa_id_hash = %hex::encode(payload.wa_id_hash),
            "covenant rejected: {}",
            RejectionReason::TimestampOutOfWindow
        );
        return VerificationResult::rejected(RejectionReason::TimestampOutOfWindow);
    }

    let (matched, _) = match_authority(payload, authorities);

    match matched {
        Some(authority) => {
            info!(
                wa_id = authority.wa_id(),
                role = authority.role(),
                command = %payload.command,
                "covenant verified"
            );
            VerificationResult::accepted(payload.command, authority)
        }
        None => {
            warn!(
                wa_id_hash = %hex::encode(payload.wa_id_hash),
                "covenant rejected: {}",
                RejectionReason::NoMatchingAuthority
            );
            VerificationResult::rejected(RejectionReason::NoMatchingAuthority)
        }
    }
}

/// First authority whose hash and key both match, plus the number of
/// signature checks performed, which is always `authorities.len()`.
fn match_authority<'a>(
    payload: &CovenantPayload,
    authorities: &'a [TrustedAuthority],
) -> (Option<&'a TrustedAuthority>, usize) {
    let mut matched = None;
    let mut checks = 0;
    for authority in authorities {
        let signature_ok = verify_covenant_signature(payload, authority.public_key());
        checks += 1;
        if matched.is_none() && signature_ok && *authority.wa_id_hash() == payload.wa_id_hash {
            matched = Some(authority);
        }
    }
    (matched, checks)
}

/// Registry-backed verifier with counters.
#[derive(Debug)]
pub struct CovenantVerifier {
    registry: Arc<AuthorityRegistry>,
    verification_count: AtomicU64,
    valid_count: AtomicU64,
}

impl CovenantVerifier {
    pub fn new(registry: Arc<AuthorityRegistry>) -> Self {
        Self {
            registry,
            verification_count: AtomicU64::new(0),
            valid_count: AtomicU64::new(0),
        }
    }

    pub fn registry(&self) -> &Arc<AuthorityRegistry> {
        &self.registry
    }

    /// Verify a bare payload against the current registry.
    pub fn verify_payload(&self, payload: &CovenantPayload) -> VerificationResult {
        self.verify_payload_at(payload, Utc::now().timestamp())
    }

    pub fn verify_payload_at(&self, payload: &CovenantPayload, now: i64) -> VerificationResult {
        self.verification_count.fetch_add(1, Ordering::Relaxed);
        let result = self
            .registry
            .with_authorities(|authorities| verify_covenant_at(payload, authorities, now));
        if result.valid {
            self.valid_count.fetch_add(1, Ordering::Relaxed);
        }
        result
    }

    /// Verify an extracted message and record the verdict on it.
    pub fn verify_message(&self, message: &mut CovenantMessage) -> VerificationResult {
        let result = self.verify_payload(&message.payload);
        message.signature_verified = Some(result.valid);
        message.authorized_wa_id = result.wa_id.clone();
        result
    }

    pub fn verification_count(&self) -> u64 {
        self.verification_count.load(Ordering::Relaxed)
    }

    pub fn valid_count(&self) -> u64 {
        self.valid_count.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::CovenantKeypair;
    use crate::payload::create_covenant_payload;

    const NOW: i64 = 1_760_000_000;

    fn keypair(seed: u8) -> CovenantKeypair {
        CovenantKeypair::from_seed(&[seed; 32])
    }

    fn authority(wa_id: &str, seed: u8, role: &str) -> TrustedAuthority {
        TrustedAuthority::new(wa_id, keypair(seed).public_key(), role)
    }

    fn payload(wa_id: &str, seed: u8, ts: i64) -> CovenantPayload {
        create_covenant_payload(CovenantCommand::Freeze, wa_id, &keypair(seed), Some(ts as u32))
    }

    #[test]
    fn accepts_matching_authority() {
        let authorities = [authority("wa-test-001", 1, "ROOT")];
        let result = verify_covenant_at(&payload("wa-test-001", 1, NOW), &authorities, NOW);
        assert!(result.valid);
        assert_eq!(result.command, Some(CovenantCommand::Freeze));
        assert_eq!(result.wa_id.as_deref(), Some("wa-test-001"));
        assert_eq!(result.wa_role.as_deref(), Some("ROOT"));
        assert_eq!(result.rejection_reason, None);
    }

    #[test]
    fn stale_payload_is_rejected_before_authorities() {
        let authorities = [authority("wa-test-001", 1, "ROOT")];
        let result = verify_covenant_at(&payload("wa-test-001", 1, NOW - 86_401), &authorities, NOW);
        assert_eq!(result, VerificationResult::rejected(RejectionReason::TimestampOutOfWindow));
        // Same answer with nobody trusted at all.
        let result = verify_covenant_at(&payload("wa-test-001", 1, NOW + 86_401), &[], NOW);
        assert_eq!(result.rejection_reason, Some(RejectionReason::TimestampOutOfWindow));
    }

    #[test]
    fn unknown_identity_and_wrong_key_look_the_same() {
        let authorities = [authority("wa-test-001", 1, "ROOT")];
        let unknown = verify_covenant_at(&payload("wa-stranger", 1, NOW), &authorities, NOW);
        let wrong_key = verify_covenant_at(&payload("wa-test-001", 2, NOW), &authorities, NOW);
        assert_eq!(unknown, wrong_key);
        assert_eq!(unknown, VerificationResult::rejected(RejectionReason::NoMatchingAuthority));
        assert_eq!(unknown.rejection_reason.unwrap().to_string(), "no matching authority");
    }

    #[test]
    fn first_full_match_wins() {
        // Same wa_id registered twice; only the second has the right key.
        let authorities = [authority("wa-dup", 9, "DECOY"), authority("wa-dup", 1, "REAL")];
        let result = verify_covenant_at(&payload("wa-dup", 1, NOW), &authorities, NOW);
        assert_eq!(result.wa_role.as_deref(), Some("REAL"));
    }

    #[test]
    fn matching_key_under_another_identity_is_skipped() {
        // Same key trusted under two identities; the payload names the second.
        let authorities = [authority("wa-other", 1, "OTHER"), authority("wa-test-001", 1, "ROOT")];
        let result = verify_covenant_at(&payload("wa-test-001", 1, NOW), &authorities, NOW);
        assert_eq!(result.wa_id.as_deref(), Some("wa-test-001"));
        assert_eq!(result.wa_role.as_deref(), Some("ROOT"));
    }

    #[test]
    fn every_authority_is_checked_whatever_the_outcome() {
        let authorities: Vec<_> = (1..=5).map(|i| authority(&format!("wa-{i}"), i, "OPS")).collect();
        let cases = [
            (payload("wa-1", 1, NOW), Some("wa-1")),
            (payload("wa-3", 3, NOW), Some("wa-3")),
            (payload("wa-stranger", 1, NOW), None),
            (payload("wa-2", 9, NOW), None),
        ];
        for (p, expected) in cases {
            let (matched, checks) = match_authority(&p, &authorities);
            assert_eq!(matched.map(TrustedAuthority::wa_id), expected);
            assert_eq!(checks, authorities.len());
        }
    }

    #[test]
    fn verifier_counts_and_stamps() {
        let registry = Arc::new(AuthorityRegistry::from_authorities(vec![authority("wa-a", 1, "ROOT")]));
        let verifier = CovenantVerifier::new(registry);
        let now = Utc::now().timestamp();

        assert!(verifier.verify_payload(&payload("wa-a", 1, now)).valid);
        assert!(!verifier.verify_payload(&payload("wa-a", 2, now)).valid);
        assert_eq!(verifier.verification_count(), 2);
        assert_eq!(verifier.valid_count(), 1);
    }

    #[test]
    fn registry_changes_are_seen_immediately() {
        let registry = Arc::new(AuthorityRegistry::new());
        let verifier = CovenantVerifier::new(Arc::clone(&registry));
        let p = payload("wa-late", 4, NOW);
        assert!(!verifier.verify_payload_at(&p, NOW).valid);
        registry.add_authority(authority("wa-late", 4, "OPS"));
        assert!(verifier.verify_payload_at(&p, NOW).valid);
    }
}
