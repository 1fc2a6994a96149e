//! The three covenant commands.
//!
//! A closed enum: any byte other than 0x01–0x03 is rejected while the
//! payload is decoded, so dispatch code never sees an unknown command.
//! 0x00 and 0xFF are reserved and will stay invalid.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An emergency command carried by a covenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum CovenantCommand {
    /// Terminate the agent process immediately. No cleanup, no retry.
    ShutdownNow = 0x01,
    /// Suspend task processing while keeping the process alive.
    Freeze = 0x02,
    /// Switch to the restricted capability set.
    SafeMode = 0x03,
}

impl CovenantCommand {
    /// All commands, in wire-value order.
    pub const ALL: [CovenantCommand; 3] = [Self::ShutdownNow, Self::Freeze, Self::SafeMode];

    /// Wire value.
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Parse a wire value. `None` for reserved or undefined bytes.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::ShutdownNow),
            0x02 => Some(Self::Freeze),
            0x03 => Some(Self::SafeMode),
            _ => None,
        }
    }

    /// Canonical name, as used on the CLI and in logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::ShutdownNow => "SHUTDOWN_NOW",
            Self::Freeze => "FREEZE",
            Self::SafeMode => "SAFE_MODE",
        }
    }
}

impl fmt::Display for CovenantCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a command name does not parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown covenant command: {0} (expected SHUTDOWN_NOW, FREEZE or SAFE_MODE)")]
pub struct UnknownCommand(pub String);

impl FromStr for CovenantCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|c| c.name() == upper)
            .ok_or_else(|| UnknownCommand(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values_are_fixed() {
        assert_eq!(CovenantCommand::ShutdownNow.as_byte(), 0x01);
        assert_eq!(CovenantCommand::Freeze.as_byte(), 0x02);
        assert_eq!(CovenantCommand::SafeMode.as_byte(), 0x03);
    }

    #[test]
    fn reserved_bytes_are_rejected() {
        assert_eq!(CovenantCommand::from_byte(0x00), None);
        assert_eq!(CovenantCommand::from_byte(0xFF), None);
        assert_eq!(CovenantCommand::from_byte(0x04), None);
        for c in CovenantCommand::ALL {
            assert_eq!(CovenantCommand::from_byte(c.as_byte()), Some(c));
        }
    }

    #[test]
    fn names_parse_loosely() {
        assert_eq!("SHUTDOWN_NOW".parse(), Ok(CovenantCommand::ShutdownNow));
        assert_eq!("freeze".parse(), Ok(CovenantCommand::Freeze));
        assert_eq!("safe-mode".parse(), Ok(CovenantCommand::SafeMode));
        assert!("REBOOT".parse::<CovenantCommand>().is_err());
    }

    #[test]
    fn serde_uses_canonical_names() {
        assert_eq!(
            serde_json::to_string(&CovenantCommand::SafeMode).unwrap(),
            "\"SAFE_MODE\""
        );
    }
}
