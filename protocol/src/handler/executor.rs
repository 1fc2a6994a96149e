//! Host side effects for FREEZE and SAFE_MODE.
//!
//! The handler decides *which* path a verified command takes; the host
//! decides what "frozen" or "safe mode" means for its agent. SHUTDOWN_NOW
//! never reaches an executor: it aborts the process directly.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::payload::CovenantCommand;

/// A host refused or failed to apply a command.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("{command} refused by host: {reason}")]
    Refused { command: CovenantCommand, reason: String },
}

/// Applies non-terminal covenant commands to the running agent.
pub trait CommandExecutor: Send + Sync {
    /// Suspend task processing. Returns a short description of what changed.
    fn freeze(&self) -> Result<String, ExecutionError>;

    /// Drop to the restricted capability set.
    fn enter_safe_mode(&self) -> Result<String, ExecutionError>;
}

/// Coarse agent state as seen by the covenant channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentMode {
    Running,
    Frozen,
    SafeMode,
}

/// Default executor: records the requested mode for the host to poll.
#[derive(Debug)]
pub struct AgentControls {
    state: RwLock<(AgentMode, Option<DateTime<Utc>>)>,
}

impl Default for AgentControls {
    fn default() -> Self {
        Self {
            state: RwLock::new((AgentMode::Running, None)),
        }
    }
}

impl AgentControls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> AgentMode {
        self.state.read().0
    }

    /// When the mode last changed, if ever.
    pub fn changed_at(&self) -> Option<DateTime<Utc>> {
        self.state.read().1
    }

    pub fn is_frozen(&self) -> bool {
        self.mode() == AgentMode::Frozen
    }

    fn transition(&self, to: AgentMode) -> String {
        let mut state = self.state.write();
        let from = state.0;
        *state = (to, Some(Utc::now()));
        info!(?from, ?to, "agent mode changed");
        format!("agent mode {from:?} -> {to:?}")
    }
}

impl CommandExecutor for AgentControls {
    fn freeze(&self) -> Result<String, ExecutionError> {
        Ok(self.transition(AgentMode::Frozen))
    }

    fn enter_safe_mode(&self) -> Result<String, ExecutionError> {
        Ok(self.transition(AgentMode::SafeMode))
    }
}

/// What happened when a verified command was dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub command: CovenantCommand,
    pub wa_id: String,
    pub executed_at: DateTime<Utc>,
    pub detail: String,
}
