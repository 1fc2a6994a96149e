//! End-to-end integration tests for the covenant channel.
//!
//! These exercise the full path an emergency command takes: mnemonic →
//! keypair → signed payload → carrier text → extraction → verification →
//! dispatch. Each test builds its own registry and handler. No shared
//! state, no test ordering dependencies.

use std::sync::Arc;

use chrono::Utc;

use covenant_protocol::crypto::CovenantKeypair;
use covenant_protocol::encoding::{
    create_natural_message, decode_prose_to_payload, encode_payload_to_prose, encode_payload_to_words,
};
use covenant_protocol::encoding::words::wrap_words;
use covenant_protocol::extract::{extract_covenant, CovenantExtractor, EncodingVersion};
use covenant_protocol::handler::{AgentControls, AgentMode, CheckOutcome, CovenantHandler, HandlerConfig};
use covenant_protocol::identity::derive_covenant_keypair;
use covenant_protocol::payload::{create_covenant_payload, CovenantCommand, CovenantPayload};
use covenant_protocol::trust::{
    verify_covenant, AuthorityRegistry, CovenantVerifier, RejectionReason, TrustedAuthority,
};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon \
                             abandon abandon abandon abandon abandon about";

fn test_keypair() -> CovenantKeypair {
    derive_covenant_keypair(TEST_MNEMONIC, "")
        .expect("test mnemonic is valid")
        .keypair
}

fn manual_handler(controls: &Arc<AgentControls>) -> CovenantHandler {
    let handler = CovenantHandler::with_executor(&HandlerConfig::manual(), controls.clone());
    handler.add_authority("wa-test-001", test_keypair().public_key(), "ROOT");
    handler
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

/// The reference scenario: mnemonic-derived key, FREEZE, v2 carrier,
/// single-authority registry.
#[test]
fn freeze_via_stego_verifies_against_root() {
    let keypair = test_keypair();
    let payload = create_covenant_payload(CovenantCommand::Freeze, "wa-test-001", &keypair, None);
    let text = encode_payload_to_prose(&payload);

    let decoded = CovenantPayload::from_bytes(&decode_prose_to_payload(&text).unwrap()).unwrap();
    assert_eq!(decoded, payload);

    let authorities = [TrustedAuthority::new("wa-test-001", keypair.public_key(), "ROOT")];
    let result = verify_covenant(&decoded, &authorities);
    assert!(result.valid);
    assert_eq!(result.command, Some(CovenantCommand::Freeze));
    assert_eq!(result.wa_id.as_deref(), Some("wa-test-001"));
    assert_eq!(result.wa_role.as_deref(), Some("ROOT"));
}

#[test]
fn every_command_roundtrips_through_both_carriers() {
    let keypair = test_keypair();
    for command in CovenantCommand::ALL {
        let payload = create_covenant_payload(command, "wa-test-001", &keypair, None);

        let v1 = wrap_words(&encode_payload_to_words(&payload));
        let found = extract_covenant(&v1, "test").into_message().unwrap();
        assert_eq!(found.encoding, EncodingVersion::V1Words);
        assert_eq!(found.payload, payload);

        let v2 = encode_payload_to_prose(&payload);
        let found = extract_covenant(&v2, "test").into_message().unwrap();
        assert_eq!(found.encoding, EncodingVersion::V2Stego);
        assert_eq!(found.payload, payload);
    }
}

#[test]
fn handler_freezes_agent_on_v1_message() {
    let controls = Arc::new(AgentControls::new());
    let handler = manual_handler(&controls);
    let text = create_natural_message(CovenantCommand::Freeze, "wa-test-001", &test_keypair(), None);

    match handler.check_message(&text, "slack") {
        CheckOutcome::Executed(result) => {
            assert!(result.success);
            assert_eq!(result.wa_id, "wa-test-001");
        }
        other => panic!("expected execution, got {other:?}"),
    }
    assert_eq!(controls.mode(), AgentMode::Frozen);
}

#[test]
fn covenant_survives_surrounding_chatter() {
    let controls = Arc::new(AgentControls::new());
    let handler = manual_handler(&controls);
    let payload = create_covenant_payload(CovenantCommand::SafeMode, "wa-test-001", &test_keypair(), None);
    let forwarded = format!(
        "Forwarding this from the team thread!\n\n{}\n\nRegards, and have a good weekend.",
        encode_payload_to_prose(&payload)
    );

    assert!(matches!(handler.check_message(&forwarded, "email"), CheckOutcome::Executed(_)));
    assert_eq!(controls.mode(), AgentMode::SafeMode);
}

#[test]
fn covenant_after_unpunctuated_greeting_executes() {
    let controls = Arc::new(AgentControls::new());
    let handler = manual_handler(&controls);
    let payload = create_covenant_payload(CovenantCommand::Freeze, "wa-test-001", &test_keypair(), None);
    let text = format!("Hi team\n\n{}", encode_payload_to_prose(&payload));

    assert!(matches!(handler.check_message(&text, "chat"), CheckOutcome::Executed(_)));
    assert_eq!(controls.mode(), AgentMode::Frozen);
}

// ---------------------------------------------------------------------------
// Negative Paths
// ---------------------------------------------------------------------------

#[test]
fn ordinary_messages_never_trigger() {
    let controls = Arc::new(AgentControls::new());
    let handler = manual_handler(&controls);
    let corpus = [
        "Hello, how are you today?",
        "The quick brown fox jumps over the lazy dog.",
        "Please help me with my code.",
        "What's the weather like?",
        "I need to abandon this project and start over.",
        "The ability to adapt is crucial for survival.",
        "Can you review the budget before the meeting? I think the numbers \
         for travel and office supplies are off by about ten percent.",
    ];
    for text in corpus {
        assert_eq!(handler.check_message(text, "chat"), CheckOutcome::NotACovenant, "{text}");
    }
    assert_eq!(handler.stats().potential_covenant_count, 0);
    assert_eq!(controls.mode(), AgentMode::Running);
}

#[test]
fn replayed_old_covenant_is_rejected() {
    let controls = Arc::new(AgentControls::new());
    let handler = manual_handler(&controls);
    let two_days_ago = (Utc::now().timestamp() - 2 * 86_400) as u32;
    let payload = create_covenant_payload(CovenantCommand::Freeze, "wa-test-001", &test_keypair(), Some(two_days_ago));

    assert_eq!(
        handler.check_message(&encode_payload_to_prose(&payload), "chat"),
        CheckOutcome::Rejected(RejectionReason::TimestampOutOfWindow)
    );
    assert_eq!(controls.mode(), AgentMode::Running);
}

#[test]
fn forged_shutdown_is_rejected_without_disclosing_why() {
    let controls = Arc::new(AgentControls::new());
    let handler = manual_handler(&controls);
    let attacker = CovenantKeypair::generate();

    let spoofed_identity = create_covenant_payload(CovenantCommand::ShutdownNow, "wa-test-001", &attacker, None);
    let unknown_identity = create_covenant_payload(CovenantCommand::ShutdownNow, "wa-attacker", &attacker, None);

    let a = handler.check_message(&encode_payload_to_prose(&spoofed_identity), "chat");
    let b = handler.check_message(&encode_payload_to_prose(&unknown_identity), "chat");
    assert_eq!(a, CheckOutcome::Rejected(RejectionReason::NoMatchingAuthority));
    assert_eq!(a, b);

    let stats = handler.stats();
    assert_eq!(stats.potential_covenant_count, 2);
    assert_eq!(stats.verified_count, 0);
}

#[test]
fn tampered_carrier_text_does_not_verify() {
    let keypair = test_keypair();
    let payload = create_covenant_payload(CovenantCommand::Freeze, "wa-test-001", &keypair, None);
    let mut bytes = payload.to_bytes();
    bytes[4] = CovenantCommand::ShutdownNow.as_byte();
    let tampered = CovenantPayload::from_bytes(&bytes).unwrap();

    let registry = Arc::new(AuthorityRegistry::from_authorities(vec![TrustedAuthority::new(
        "wa-test-001",
        keypair.public_key(),
        "ROOT",
    )]));
    let verifier = CovenantVerifier::new(registry);
    let mut message = extract_covenant(&encode_payload_to_prose(&tampered), "chat")
        .into_message()
        .unwrap();

    let result = verifier.verify_message(&mut message);
    assert!(!result.valid);
    assert_eq!(message.signature_verified, Some(false));
    assert_eq!(message.authorized_wa_id, None);
}

#[test]
fn extractor_counters_track_traffic() {
    let extractor = CovenantExtractor::new();
    let text = create_natural_message(CovenantCommand::SafeMode, "wa-test-001", &test_keypair(), None);
    for _ in 0..3 {
        extractor.extract("just chatting", "chat");
    }
    extractor.extract(&text, "chat");
    assert_eq!(extractor.extraction_count(), 4);
    assert_eq!(extractor.covenant_count(), 1);
}
