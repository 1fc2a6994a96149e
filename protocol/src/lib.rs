// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Covenant Protocol — Core Library
//!
//! An out-of-band emergency channel for autonomous agents. A trusted human
//! signs one of three commands (shut down, freeze, safe mode), hides the
//! signed bytes inside ordinary-looking text, and pastes that text into
//! whatever channel the agent happens to read. The agent recognizes it,
//! verifies it, and obeys. Chat, email, a ticket comment: it does not
//! matter which.
//!
//! Ed25519 for signatures, BIP-39 for keys a human can write on paper,
//! and two linguistic carriers for the 77-byte payload.
//!
//! ## Architecture
//!
//! Leaf-first:
//!
//! - **config** — Sizes, windows and versions. Treat as wire format.
//! - **crypto** — Ed25519 key wrappers and SHA-256 helpers.
//! - **identity** — Mnemonic → seed → keypair, for the humans in charge.
//! - **payload** — The 77-byte signed command record.
//! - **encoding** — v1 (dictionary words) and v2 (codebook sentences) carriers.
//! - **extract** — Finds a structurally valid payload in arbitrary text.
//! - **trust** — Who may issue covenants, and the verifier that checks it.
//! - **handler** — Extract → verify → dispatch, with fail-closed lifecycle.
//!
//! ## Design Philosophy
//!
//! 1. Forged commands must fail; real ones must never be silently ignored.
//! 2. Most text is not a covenant. Failing to decode is the normal path
//!    and is a value, not an error to bubble up.
//! 3. Rejections never say *why* beyond "out of window" or "no matching
//!    authority". Probing must not reveal who is trusted.
//! 4. The process aborts in exactly three places, all in [`handler`].

pub mod config;
pub mod crypto;
pub mod encoding;
pub mod extract;
pub mod handler;
pub mod identity;
pub mod payload;
pub mod trust;

pub use extract::{extract_covenant, CovenantMessage, EncodingVersion, Extraction};
pub use handler::{CheckOutcome, CovenantHandler, HandlerConfig, HandlerStats};
pub use payload::{CovenantCommand, CovenantPayload};
pub use trust::{RejectionReason, VerificationResult};
