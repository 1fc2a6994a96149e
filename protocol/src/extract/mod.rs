//! # Extraction
//!
//! Finds a structurally valid covenant payload in arbitrary text. Tries
//! the v2 sentence carrier first, then falls back to the v1 word carrier.
//! Verification is somebody else's job; see [`crate::trust`].

pub mod extractor;
pub mod message;

pub use extractor::{extract_covenant, extract_covenant_at, CovenantExtractor};
pub use message::{CovenantMessage, EncodingVersion, Extraction};
