//! Capability probing
//!
//! Pure presence checks used by steps as idempotency guards: if the host
//! already satisfies a step, the step is skipped rather than re-done.
//! Absence is a normal outcome, never an error.

use std::path::Path;

/// Check whether a named executable is resolvable.
///
/// Accepts either a bare command name (searched on PATH) or an absolute
/// path to a binary.
pub fn command_exists(name: &str) -> bool {
    which::which(name).is_ok()
}

/// Check whether a well-known path exists on the host.
pub fn path_present(path: &Path) -> bool {
    path.exists()
}
