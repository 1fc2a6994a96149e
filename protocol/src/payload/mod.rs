//! # Payload Codec
//!
//! The binary heart of a covenant: a 77-byte record holding a timestamp,
//! one of three commands, the issuer's identifier hash and an Ed25519
//! signature. Both linguistic encoders carry exactly these bytes.

pub mod codec;
pub mod command;

pub use codec::{
    create_covenant_payload, current_timestamp, validate_structure, verify_covenant_signature,
    CovenantPayload, PayloadError,
};
pub use command::{CovenantCommand, UnknownCommand};
