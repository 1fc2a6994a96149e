// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Covenant CLI
//!
//! Entry point for the `covenant` binary: the reference tool for humans
//! who issue covenants and for operators who want to see what an agent
//! would make of a given text.
//!
//! - `keygen` — generate an authority mnemonic and public key
//! - `encode` — sign a command and emit v1 or v2 carrier text
//! - `decode` — extract and print a payload without verifying it
//! - `verify` — check timestamp and signature against one public key
//! - `check`  — run a full handler, as an agent would
//!
//! Exit code 0 means success/valid, 1 means failure/invalid.

mod cli;
mod logging;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Serialize;

use covenant_protocol::crypto::CovenantPublicKey;
use covenant_protocol::encoding::{create_natural_message, create_stego_message};
use covenant_protocol::extract::{extract_covenant, CovenantMessage};
use covenant_protocol::handler::{AgentControls, CheckOutcome, CovenantHandler, HandlerConfig};
use covenant_protocol::identity::{derive_covenant_keypair, generate_mnemonic};
use covenant_protocol::payload::verify_covenant_signature;
use covenant_protocol::trust::{verify_covenant, TrustedAuthority};

use cli::{CarrierFormat, CheckArgs, Commands, CovenantCli, DecodeArgs, EncodeArgs, KeygenArgs, MessageInput, VerifyArgs};

fn main() -> Result<ExitCode> {
    let cli = CovenantCli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);

    match cli.command {
        Commands::Keygen(args) => keygen(args),
        Commands::Encode(args) => encode(args),
        Commands::Decode(args) => decode(args),
        Commands::Verify(args) => verify(args),
        Commands::Check(args) => check(args),
    }
}

fn read_input(input: &MessageInput) -> Result<String> {
    match (&input.message, &input.file) {
        (Some(text), _) => Ok(text.clone()),
        (None, Some(path)) => {
            std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
        }
        (None, None) => anyhow::bail!("either --message or --file is required"),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("failed to serialize output")?);
    Ok(())
}

// ---------------------------------------------------------------------------
// keygen / encode
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct KeygenReport {
    mnemonic: String,
    public_key: String,
    public_key_hex: String,
}

fn keygen(args: KeygenArgs) -> Result<ExitCode> {
    let mnemonic = generate_mnemonic(args.words).context("failed to generate mnemonic")?;
    let keys = derive_covenant_keypair(&mnemonic, &args.passphrase).context("failed to derive keypair")?;
    tracing::info!(words = args.words, "generated authority mnemonic");

    print_json(&KeygenReport {
        public_key_hex: keys.keypair.public_key().to_hex(),
        public_key: keys.public_key_b64,
        mnemonic,
    })?;
    Ok(ExitCode::SUCCESS)
}

fn encode(args: EncodeArgs) -> Result<ExitCode> {
    let keys = derive_covenant_keypair(&args.mnemonic, &args.passphrase).context("invalid mnemonic")?;

    let text = match args.format {
        CarrierFormat::V1 => create_natural_message(args.command, &args.wa_id, &keys.keypair, args.timestamp),
        CarrierFormat::V2 => create_stego_message(args.command, &args.wa_id, &keys.keypair, args.timestamp),
    };
    tracing::info!(command = %args.command, wa_id = %args.wa_id, format = ?args.format, "covenant encoded");

    match &args.output {
        Some(path) => {
            std::fs::write(path, &text).with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "carrier text written");
        }
        None => println!("{text}"),
    }
    Ok(ExitCode::SUCCESS)
}

// ---------------------------------------------------------------------------
// decode / verify / check
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct DecodeReport<'a> {
    encoding: String,
    command: String,
    timestamp: u32,
    issued_at: Option<DateTime<Utc>>,
    timestamp_valid: bool,
    wa_id_hash: String,
    signature: String,
    extraction_confidence: f64,
    source_channel: &'a str,
}

impl<'a> From<&'a CovenantMessage> for DecodeReport<'a> {
    fn from(m: &'a CovenantMessage) -> Self {
        Self {
            encoding: m.encoding.to_string(),
            command: m.payload.command.to_string(),
            timestamp: m.payload.timestamp,
            issued_at: DateTime::from_timestamp(i64::from(m.payload.timestamp), 0),
            timestamp_valid: m.timestamp_valid,
            wa_id_hash: hex::encode(m.payload.wa_id_hash),
            signature: m.payload.signature.to_hex(),
            extraction_confidence: m.extraction_confidence,
            source_channel: &m.source_channel,
        }
    }
}

fn decode(args: DecodeArgs) -> Result<ExitCode> {
    let text = read_input(&args.input)?;
    let Some(message) = extract_covenant(&text, "cli").into_message() else {
        eprintln!("no covenant found");
        return Ok(ExitCode::FAILURE);
    };
    print_json(&DecodeReport::from(&message))?;
    Ok(ExitCode::SUCCESS)
}

fn verify(args: VerifyArgs) -> Result<ExitCode> {
    let text = read_input(&args.input)?;
    let public_key = CovenantPublicKey::parse(&args.public_key).context("invalid --public-key")?;

    let Some(message) = extract_covenant(&text, "cli").into_message() else {
        println!("INVALID: no covenant found");
        return Ok(ExitCode::FAILURE);
    };
    let payload = &message.payload;

    let verdict = match &args.wa_id {
        Some(wa_id) => {
            let authority = TrustedAuthority::new(wa_id.clone(), public_key, "CLI");
            let result = verify_covenant(payload, std::slice::from_ref(&authority));
            result.rejection_reason.map(|r| r.to_string())
        }
        None if !payload.is_timestamp_valid() => Some("timestamp outside the accepted window".to_string()),
        None if !verify_covenant_signature(payload, &public_key) => Some("signature does not verify".to_string()),
        None => None,
    };

    match verdict {
        None => {
            println!("VALID: {} (wa_id_hash {})", payload.command, hex::encode(payload.wa_id_hash));
            Ok(ExitCode::SUCCESS)
        }
        Some(reason) => {
            println!("INVALID: {reason}");
            Ok(ExitCode::FAILURE)
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
enum CheckReport {
    NotACovenant,
    Rejected { reason: String },
    Executed { success: bool, command: String, wa_id: String, detail: String },
}

fn check(args: CheckArgs) -> Result<ExitCode> {
    let text = read_input(&args.input)?;
    let config = HandlerConfig {
        auto_load_authorities: true,
        seed_path: args.seed.clone(),
    };
    let controls = Arc::new(AgentControls::new());
    let handler = CovenantHandler::with_executor(&config, controls.clone());

    let (report, ok) = match handler.check_message(&text, &args.channel) {
        CheckOutcome::NotACovenant => (CheckReport::NotACovenant, false),
        CheckOutcome::Rejected(reason) => (CheckReport::Rejected { reason: reason.to_string() }, false),
        CheckOutcome::Executed(result) => (
            CheckReport::Executed {
                success: result.success,
                command: result.command.to_string(),
                wa_id: result.wa_id,
                detail: result.detail,
            },
            result.success,
        ),
    };
    print_json(&report)?;
    tracing::debug!(mode = ?controls.mode(), stats = ?handler.stats(), "check finished");

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn read_input_prefers_inline_message() {
        let input = MessageInput {
            message: Some("inline".into()),
            file: None,
        };
        assert_eq!(read_input(&input).unwrap(), "inline");
    }

    #[test]
    fn read_input_loads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "from disk").unwrap();
        let input = MessageInput {
            message: None,
            file: Some(file.path().to_path_buf()),
        };
        assert_eq!(read_input(&input).unwrap(), "from disk");
    }

    #[test]
    fn read_input_reports_missing_file() {
        let input = MessageInput {
            message: None,
            file: Some("/nonexistent/covenant.txt".into()),
        };
        let err = read_input(&input).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
