//! The 77-byte covenant payload.
//!
//! ```text
//!  0        4   5              13                                77
//!  ┌────────┬───┬──────────────┬─────────────────────────────────┐
//!  │ ts u32 │cmd│ wa_id_hash 8 │ Ed25519 signature (64)          │
//!  └────────┴───┴──────────────┴─────────────────────────────────┘
//!  └──────── signable (13) ────┘
//! ```
//!
//! All multi-byte fields are big-endian. The signature covers the first
//! 13 bytes only, so "what was signed" never depends on the signature.

use chrono::Utc;
use thiserror::Error;

use super::command::CovenantCommand;
use crate::config::{
    PAYLOAD_SIZE, SIGNABLE_LENGTH, SIGNATURE_LENGTH, TIMESTAMP_WINDOW_SECONDS, WA_ID_HASH_LENGTH,
};
use crate::crypto::{compute_wa_id_hash, CovenantKeypair, CovenantPublicKey, CovenantSignature};

/// Structural payload errors. Raised before any cryptography runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("invalid payload length: expected {PAYLOAD_SIZE} bytes, got {0}")]
    InvalidLength(usize),

    #[error("invalid command byte: 0x{0:02x}")]
    InvalidCommand(u8),

    #[error("payload timestamp is zero")]
    ZeroTimestamp,
}

/// A decoded covenant payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CovenantPayload {
    /// Unix seconds at which the authority issued the command.
    pub timestamp: u32,
    /// What the authority wants done.
    pub command: CovenantCommand,
    /// First 8 bytes of SHA-256(wa_id) of the issuing authority.
    pub wa_id_hash: [u8; WA_ID_HASH_LENGTH],
    /// Ed25519 signature over [`signable_data`](Self::signable_data).
    pub signature: CovenantSignature,
}

impl CovenantPayload {
    /// Serialize to the fixed 77-byte wire layout.
    pub fn to_bytes(&self) -> [u8; PAYLOAD_SIZE] {
        let mut out = [0u8; PAYLOAD_SIZE];
        out[..SIGNABLE_LENGTH].copy_from_slice(&self.signable_data());
        out[SIGNABLE_LENGTH..].copy_from_slice(self.signature.as_bytes());
        out
    }

    /// Parse the 77-byte wire layout.
    ///
    /// Rejects any other length and any command byte outside 0x01–0x03.
    /// A zero timestamp parses (it is a well-formed u32); the extractor's
    /// [`validate_structure`] is what filters it out.
    pub fn from_bytes(data: &[u8]) -> Result<Self, PayloadError> {
        if data.len() != PAYLOAD_SIZE {
            return Err(PayloadError::InvalidLength(data.len()));
        }
        let timestamp = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
        let command = CovenantCommand::from_byte(data[4]).ok_or(PayloadError::InvalidCommand(data[4]))?;

        let mut wa_id_hash = [0u8; WA_ID_HASH_LENGTH];
        wa_id_hash.copy_from_slice(&data[5..SIGNABLE_LENGTH]);

        let mut signature = [0u8; SIGNATURE_LENGTH];
        signature.copy_from_slice(&data[SIGNABLE_LENGTH..]);

        Ok(Self {
            timestamp,
            command,
            wa_id_hash,
            signature: CovenantSignature::from_bytes(signature),
        })
    }

    /// The 13 bytes the signature covers: timestamp ‖ command ‖ wa_id_hash.
    pub fn signable_data(&self) -> [u8; SIGNABLE_LENGTH] {
        let mut out = [0u8; SIGNABLE_LENGTH];
        out[..4].copy_from_slice(&self.timestamp.to_be_bytes());
        out[4] = self.command.as_byte();
        out[5..].copy_from_slice(&self.wa_id_hash);
        out
    }

    /// True iff `|now − timestamp| ≤ 86400`. Both edges are inclusive.
    pub fn is_timestamp_valid_at(&self, now: i64) -> bool {
        (now - i64::from(self.timestamp)).abs() <= TIMESTAMP_WINDOW_SECONDS
    }

    /// [`is_timestamp_valid_at`](Self::is_timestamp_valid_at) against the
    /// system clock.
    pub fn is_timestamp_valid(&self) -> bool {
        self.is_timestamp_valid_at(Utc::now().timestamp())
    }

    /// Signed clock distance `now − timestamp`, in seconds.
    pub fn age_at(&self, now: i64) -> i64 {
        now - i64::from(self.timestamp)
    }
}

/// Cheap structural filter over raw decoded bytes.
///
/// Runs before the trust registry is consulted: exact length, a defined
/// command byte and a nonzero timestamp. Random bit soup from ordinary
/// text fails here roughly 253 times out of 256.
pub fn validate_structure(data: &[u8]) -> Result<CovenantPayload, PayloadError> {
    let payload = CovenantPayload::from_bytes(data)?;
    if payload.timestamp == 0 {
        return Err(PayloadError::ZeroTimestamp);
    }
    Ok(payload)
}

/// Assemble and sign a payload.
///
/// `timestamp` defaults to the current time when `None`.
///
/// ```
/// use covenant_protocol::crypto::CovenantKeypair;
/// use covenant_protocol::payload::{create_covenant_payload, verify_covenant_signature, CovenantCommand};
///
/// let kp = CovenantKeypair::generate();
/// let payload = create_covenant_payload(CovenantCommand::Freeze, "wa-test-001", &kp, None);
/// assert!(verify_covenant_signature(&payload, &kp.public_key()));
/// ```
pub fn create_covenant_payload(
    command: CovenantCommand,
    wa_id: &str,
    keypair: &CovenantKeypair,
    timestamp: Option<u32>,
) -> CovenantPayload {
    let timestamp = timestamp.unwrap_or_else(current_timestamp);
    let mut payload = CovenantPayload {
        timestamp,
        command,
        wa_id_hash: compute_wa_id_hash(wa_id),
        signature: CovenantSignature::from_bytes([0u8; SIGNATURE_LENGTH]),
    };
    payload.signature = keypair.sign(&payload.signable_data());
    payload
}

/// Check the payload signature against one public key. Never panics;
/// any mismatch is just `false`.
pub fn verify_covenant_signature(payload: &CovenantPayload, public_key: &CovenantPublicKey) -> bool {
    public_key.verify(&payload.signable_data(), &payload.signature)
}

/// Current Unix time as the payload's u32 field.
///
/// Clamped into u32 range; the field runs out in 2106.
pub fn current_timestamp() -> u32 {
    Utc::now().timestamp().clamp(0, i64::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keypair() -> CovenantKeypair {
        CovenantKeypair::from_seed(&[7u8; 32])
    }

    fn sample(command: CovenantCommand, ts: u32) -> CovenantPayload {
        create_covenant_payload(command, "wa-test-001", &keypair(), Some(ts))
    }

    #[test]
    fn serialized_length_is_77() {
        for c in CovenantCommand::ALL {
            assert_eq!(sample(c, 1_700_000_000).to_bytes().len(), 77);
        }
    }

    #[test]
    fn bytes_roundtrip() {
        let payload = sample(CovenantCommand::SafeMode, 1_700_000_000);
        let restored = CovenantPayload::from_bytes(&payload.to_bytes()).unwrap();
        assert_eq!(restored, payload);
    }

    #[test]
    fn layout_is_big_endian() {
        let payload = sample(CovenantCommand::Freeze, 0x0102_0304);
        let bytes = payload.to_bytes();
        assert_eq!(&bytes[..5], &[0x01, 0x02, 0x03, 0x04, 0x02]);
        assert_eq!(&bytes[5..13], &compute_wa_id_hash("wa-test-001"));
        assert_eq!(&bytes[13..], payload.signature.as_bytes());
    }

    #[test]
    fn signable_data_excludes_signature() {
        let payload = sample(CovenantCommand::Freeze, 1_700_000_000);
        assert_eq!(payload.signable_data(), payload.to_bytes()[..13]);
    }

    #[test]
    fn wrong_lengths_are_rejected() {
        assert_eq!(CovenantPayload::from_bytes(&[0u8; 76]), Err(PayloadError::InvalidLength(76)));
        assert_eq!(CovenantPayload::from_bytes(&[0u8; 78]), Err(PayloadError::InvalidLength(78)));
        assert_eq!(CovenantPayload::from_bytes(&[]), Err(PayloadError::InvalidLength(0)));
    }

    #[test]
    fn reserved_commands_are_rejected_at_decode() {
        let mut bytes = sample(CovenantCommand::Freeze, 1_700_000_000).to_bytes();
        for reserved in [0x00, 0xFF, 0x04] {
            bytes[4] = reserved;
            assert_eq!(CovenantPayload::from_bytes(&bytes), Err(PayloadError::InvalidCommand(reserved)));
        }
    }

    #[test]
    fn structure_check_rejects_zero_timestamp() {
        let mut bytes = sample(CovenantCommand::Freeze, 1_700_000_000).to_bytes();
        bytes[..4].copy_from_slice(&[0, 0, 0, 0]);
        assert!(CovenantPayload::from_bytes(&bytes).is_ok());
        assert_eq!(validate_structure(&bytes), Err(PayloadError::ZeroTimestamp));
    }

    #[test]
    fn timestamp_window_is_symmetric_and_inclusive() {
        let now: i64 = 1_700_000_000;
        let at = |offset: i64| sample(CovenantCommand::Freeze, (now + offset) as u32);

        assert!(at(0).is_timestamp_valid_at(now));
        assert!(at(-86_400).is_timestamp_valid_at(now));
        assert!(!at(-86_401).is_timestamp_valid_at(now));
        assert!(at(86_400).is_timestamp_valid_at(now));
        assert!(!at(86_401).is_timestamp_valid_at(now));
        assert!(at(-82_800).is_timestamp_valid_at(now));
        assert!(!at(-90_000).is_timestamp_valid_at(now));
    }

    #[test]
    fn fresh_payload_is_valid_now() {
        let payload = create_covenant_payload(CovenantCommand::Freeze, "wa", &keypair(), None);
        assert!(payload.is_timestamp_valid());
    }

    #[test]
    fn signature_verifies_with_matching_key_only() {
        let payload = sample(CovenantCommand::ShutdownNow, 1_700_000_000);
        assert!(verify_covenant_signature(&payload, &keypair().public_key()));
        let other = CovenantKeypair::from_seed(&[8u8; 32]).public_key();
        assert!(!verify_covenant_signature(&payload, &other));
    }

    #[test]
    fn every_signable_bit_flip_breaks_the_signature() {
        let payload = sample(CovenantCommand::Freeze, 1_700_000_000);
        let pk = keypair().public_key();
        let original = payload.to_bytes();

        for bit in 0..SIGNABLE_LENGTH * 8 {
            let mut bytes = original;
            bytes[bit / 8] ^= 0x80 >> (bit % 8);
            // Flips that land on an undefined command byte can't even be
            // decoded, which is just as good as a failed signature.
            if let Ok(tampered) = CovenantPayload::from_bytes(&bytes) {
                assert!(!verify_covenant_signature(&tampered, &pk), "bit {bit} flip verified");
            }
        }
    }
}
