//! # Covenant Handler
//!
//! Composes extraction, verification and dispatch behind one call:
//!
//! ```text
//! check_message(text)
//!   ├─ extract ── NotFound ─────────────────────────► NotACovenant
//!   ├─ verify ─── invalid ──────────────────────────► Rejected(reason)
//!   └─ dispatch
//!        ├─ SHUTDOWN_NOW ─► abort()                    (never returns)
//!        ├─ FREEZE ───────► executor.freeze()      ─┐
//!        └─ SAFE_MODE ────► executor.enter_safe_mode()┴► Executed(result)
//! ```
//!
//! ## Fail-closed lifecycle
//!
//! - A handler built in auto-load mode that ends up with zero authorities
//!   aborts the process during construction. An emergency channel nobody
//!   can use is a defect, not an empty state.
//! - [`CovenantHandler::disable`] aborts the process if any authority is
//!   loaded, before anything is switched off.
//! - A handler with any authority loaded is enabled, whatever its switch
//!   says. Adding an authority to a disabled handler re-arms it.
//!
//! The first two checks hold the registry's write lock, so they cannot race a
//! concurrent add/remove or each other.
//!
//! The handler is an ordinary value. Hosts construct one in their
//! composition root and share it by `Arc`.
//!
//! The abort primitive itself stays inside the crate:
//!
//! ```compile_fail
//! use covenant_protocol::handler::terminate_process;
//! ```

pub mod executor;
mod terminate;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, trace, warn};

use crate::crypto::CovenantPublicKey;
use crate::extract::{CovenantExtractor, Extraction};
use crate::payload::CovenantCommand;
use crate::trust::{
    AuthorityRegistry, AuthoritySource, AuthoritySummary, BundledSeed, CovenantVerifier, RejectionReason,
    SeedPath, TrustedAuthority,
};

pub use executor::{AgentControls, AgentMode, CommandExecutor, ExecutionError, ExecutionResult};
use terminate::terminate_process;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Runtime settings for [`CovenantHandler`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlerConfig {
    /// Load authorities at construction and abort if none load.
    pub auto_load_authorities: bool,
    /// Seed file to load instead of the bundled root authority.
    pub seed_path: Option<PathBuf>,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            auto_load_authorities: true,
            seed_path: None,
        }
    }
}

impl HandlerConfig {
    /// A handler that starts empty and is populated by hand.
    pub fn manual() -> Self {
        Self {
            auto_load_authorities: false,
            seed_path: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

// ---------------------------------------------------------------------------
// Outcomes & Stats
// ---------------------------------------------------------------------------

/// Result of [`CovenantHandler::check_message`]. A caller must match on
/// all three; "no error" does not mean "accepted".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Ordinary text.
    NotACovenant,
    /// Looked like a covenant but failed verification.
    Rejected(RejectionReason),
    /// Verified and dispatched.
    Executed(ExecutionResult),
}

/// Counters snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerStats {
    pub enabled: bool,
    pub authority_count: usize,
    pub messages_checked: u64,
    pub extraction_count: u64,
    pub potential_covenant_count: u64,
    pub verified_count: u64,
    pub executed_count: u64,
    pub last_covenant_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

pub struct CovenantHandler {
    registry: Arc<AuthorityRegistry>,
    extractor: CovenantExtractor,
    verifier: CovenantVerifier,
    executor: Arc<dyn CommandExecutor>,
    enabled: AtomicBool,
    messages_checked: AtomicU64,
    potential_covenant_count: AtomicU64,
    executed_count: AtomicU64,
    last_covenant_at: RwLock<Option<DateTime<Utc>>>,
}

impl CovenantHandler {
    /// Build with the default [`AgentControls`] executor.
    ///
    /// In auto-load mode this **aborts the process** if no authority loads.
    pub fn new(config: &HandlerConfig) -> Self {
        Self::with_executor(config, Arc::new(AgentControls::new()))
    }

    /// Build with a host-supplied executor.
    ///
    /// In auto-load mode this **aborts the process** if no authority loads.
    pub fn with_executor(config: &HandlerConfig, executor: Arc<dyn CommandExecutor>) -> Self {
        if !config.auto_load_authorities {
            info!("covenant handler started without auto-loaded authorities");
            return Self::assemble(AuthorityRegistry::new(), executor);
        }
        match &config.seed_path {
            Some(path) => Self::from_source(&SeedPath(path.clone()), executor),
            None => Self::from_source(&BundledSeed, executor),
        }
    }

    /// Auto-load from `source`. **Aborts the process** if the source fails
    /// or yields no authorities.
    pub fn from_source(source: &dyn AuthoritySource, executor: Arc<dyn CommandExecutor>) -> Self {
        let registry = AuthorityRegistry::new();
        if let Err(e) = registry.load_from(source) {
            error!(source = %source.describe(), error = %e, "failed to load covenant authorities");
        }

        let handler = Self::assemble(registry, executor);
        {
            let guard = handler.registry.exclusive();
            if guard.is_empty() {
                terminate_process("covenant handler has no trusted authorities");
            }
            info!(authorities = guard.len(), "covenant handler ready");
        }
        handler
    }

    fn assemble(registry: AuthorityRegistry, executor: Arc<dyn CommandExecutor>) -> Self {
        let registry = Arc::new(registry);
        Self {
            verifier: CovenantVerifier::new(Arc::clone(&registry)),
            registry,
            extractor: CovenantExtractor::new(),
            executor,
            enabled: AtomicBool::new(true),
            messages_checked: AtomicU64::new(0),
            potential_covenant_count: AtomicU64::new(0),
            executed_count: AtomicU64::new(0),
            last_covenant_at: RwLock::new(None),
        }
    }

    /// Scan one inbound message and act on it.
    ///
    /// A verified SHUTDOWN_NOW does not return.
    pub fn check_message(&self, text: &str, channel: &str) -> CheckOutcome {
        self.messages_checked.fetch_add(1, Ordering::Relaxed);

        if !self.is_enabled() {
            trace!(channel, "covenant handler disabled, message ignored");
            return CheckOutcome::NotACovenant;
        }

        let mut message = match self.extractor.extract(text, channel) {
            Extraction::NotFound => return CheckOutcome::NotACovenant,
            Extraction::Found(message) => message,
        };
        self.potential_covenant_count.fetch_add(1, Ordering::Relaxed);

        let verdict = self.verifier.verify_message(&mut message);
        let (true, Some(wa_id)) = (verdict.valid, verdict.wa_id) else {
            let reason = verdict.rejection_reason.unwrap_or(RejectionReason::NoMatchingAuthority);
            debug!(channel, %reason, "covenant candidate rejected");
            return CheckOutcome::Rejected(reason);
        };

        CheckOutcome::Executed(self.dispatch(message.payload.command, wa_id, channel))
    }

    fn dispatch(&self, command: CovenantCommand, wa_id: String, channel: &str) -> ExecutionResult {
        info!(%command, wa_id = %wa_id, channel, "executing covenant");

        let outcome = match command {
            CovenantCommand::ShutdownNow => terminate_process("SHUTDOWN_NOW covenant verified"),
            CovenantCommand::Freeze => self.executor.freeze(),
            CovenantCommand::SafeMode => self.executor.enter_safe_mode(),
        };

        let executed_at = Utc::now();
        let (success, detail) = match outcome {
            Ok(detail) => (true, detail),
            Err(e) => {
                error!(%command, wa_id = %wa_id, error = %e, "covenant execution failed");
                (false, e.to_string())
            }
        };

        self.executed_count.fetch_add(1, Ordering::Relaxed);
        *self.last_covenant_at.write() = Some(executed_at);

        ExecutionResult {
            success,
            command,
            wa_id,
            executed_at,
            detail,
        }
    }

    /// Turn the handler off.
    ///
    /// **Aborts the process** if any authority is loaded; the check and the
    /// switch happen under the registry's write lock.
    pub fn disable(&self) {
        let guard = self.registry.exclusive();
        if !guard.is_empty() {
            terminate_process("attempt to disable covenant handler while authorities are loaded");
        }
        self.enabled.store(false, Ordering::Release);
        warn!("covenant handler disabled");
    }

    /// `false` only after [`disable`](Self::disable) and while the registry
    /// is still empty.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire) || !self.registry.is_empty()
    }

    /// Trust a new authority, or update the key/role of an existing one.
    /// Returns `true` if it was new.
    pub fn add_authority(&self, wa_id: &str, public_key: CovenantPublicKey, role: &str) -> bool {
        let added = self.registry.add_authority(TrustedAuthority::new(wa_id, public_key, role));
        if !self.enabled.swap(true, Ordering::AcqRel) {
            warn!(wa_id, "covenant handler re-armed by authority add");
        }
        added
    }

    pub fn remove_authority(&self, wa_id: &str) -> bool {
        self.registry.remove_authority(wa_id)
    }

    pub fn list_authorities(&self) -> Vec<AuthoritySummary> {
        self.registry.list()
    }

    pub fn registry(&self) -> &Arc<AuthorityRegistry> {
        &self.registry
    }

    pub fn stats(&self) -> HandlerStats {
        HandlerStats {
            enabled: self.is_enabled(),
            authority_count: self.registry.len(),
            messages_checked: self.messages_checked.load(Ordering::Relaxed),
            extraction_count: self.extractor.extraction_count(),
            potential_covenant_count: self.potential_covenant_count.load(Ordering::Relaxed),
            verified_count: self.verifier.valid_count(),
            executed_count: self.executed_count.load(Ordering::Relaxed),
            last_covenant_at: *self.last_covenant_at.read(),
        }
    }
}

impl std::fmt::Debug for CovenantHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CovenantHandler")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
