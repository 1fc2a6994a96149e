//! The one place this crate ends the process.
//!
//! Called from exactly three sites: an auto-loaded handler with no
//! authorities, a disable attempt while authorities are loaded, and a
//! verified `SHUTDOWN_NOW`. Nothing else in the crate may call it.

use tracing::error;

/// Log and abort. No unwinding, no destructors, no exit hooks.
pub(crate) fn terminate_process(reason: &str) -> ! {
    error!(reason, "covenant fail-safe triggered, aborting process");
    std::process::abort()
}
