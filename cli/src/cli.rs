//! # CLI Interface
//!
//! Argument structure for `covenant`, via `clap` derive. Five subcommands:
//! `keygen`, `encode`, `decode`, `verify` and `check`.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use covenant_protocol::config::DEFAULT_MNEMONIC_LENGTH;
use covenant_protocol::CovenantCommand;

use crate::logging::LogFormat;

/// Issue and inspect covenant messages.
///
/// A covenant is a signed emergency command (SHUTDOWN_NOW, FREEZE or
/// SAFE_MODE) hidden in ordinary-looking text.
#[derive(Parser, Debug)]
#[command(name = "covenant", version, propagate_version = true)]
pub struct CovenantCli {
    /// Log output format (logs go to stderr).
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Default log filter when RUST_LOG is unset.
    #[arg(long, global = true, env = "COVENANT_LOG", default_value = "covenant=info,covenant_protocol=warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a fresh authority mnemonic and print its public key.
    Keygen(KeygenArgs),
    /// Sign a command and write it out as carrier text.
    Encode(EncodeArgs),
    /// Extract a covenant from text and print its fields. No verification.
    Decode(DecodeArgs),
    /// Check a covenant's timestamp and signature against one public key.
    Verify(VerifyArgs),
    /// Run a full handler over the text, exactly as an agent would.
    ///
    /// A verified SHUTDOWN_NOW aborts this process.
    Check(CheckArgs),
}

/// Where the carrier text comes from.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct MessageInput {
    /// Carrier text given inline.
    #[arg(long, short = 'm')]
    pub message: Option<String>,

    /// Read carrier text from a file.
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,
}

/// Carrier format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CarrierFormat {
    /// 56 dictionary words in a journal template.
    V1,
    /// 103 codebook sentences of ordinary prose.
    V2,
}

#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Mnemonic length: 12, 15, 18, 21 or 24 words.
    #[arg(long, default_value_t = DEFAULT_MNEMONIC_LENGTH)]
    pub words: usize,

    /// Optional BIP-39 passphrase mixed into the seed.
    #[arg(long, env = "COVENANT_PASSPHRASE", default_value = "", hide_env_values = true)]
    pub passphrase: String,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Authority mnemonic. Prefer the env var over the flag.
    #[arg(long, env = "COVENANT_MNEMONIC", hide_env_values = true)]
    pub mnemonic: String,

    /// BIP-39 passphrase used when the key was generated.
    #[arg(long, env = "COVENANT_PASSPHRASE", default_value = "", hide_env_values = true)]
    pub passphrase: String,

    /// SHUTDOWN_NOW, FREEZE or SAFE_MODE.
    #[arg(long, short = 'c')]
    pub command: CovenantCommand,

    /// Identifier of the issuing authority.
    #[arg(long)]
    pub wa_id: String,

    #[arg(long, value_enum, default_value_t = CarrierFormat::V2)]
    pub format: CarrierFormat,

    /// Unix timestamp to sign instead of now.
    #[arg(long)]
    pub timestamp: Option<u32>,

    /// Write the carrier text here instead of stdout.
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    #[command(flatten)]
    pub input: MessageInput,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub input: MessageInput,

    /// Authority public key, base64url or hex.
    #[arg(long, short = 'k')]
    pub public_key: String,

    /// Also require the payload to name this authority.
    #[arg(long)]
    pub wa_id: Option<String>,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub input: MessageInput,

    /// Seed file of trusted authorities. Defaults to the bundled root.
    #[arg(long, env = "COVENANT_SEED")]
    pub seed: Option<PathBuf>,

    /// Channel label recorded with the message.
    #[arg(long, default_value = "cli")]
    pub channel: String,
}
