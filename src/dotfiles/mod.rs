//! Canonical dotfiles location
//!
//! Resolves the single directory that holds the canonical copy of every
//! managed configuration file. The location is either unified (a cross-host
//! shared mount, reachable from more than one host environment) or local to
//! this host. Resolution happens once per run; every later step sees the
//! same value.

pub mod git;
pub mod links;
pub mod manifest;

use std::path::{Path, PathBuf};

use crate::context::ExecutionContext;
use crate::error::{Result, RigupError};
use crate::paths::HomeLayout;

/// Shared-mount candidate, relative to home. Reachable from more than one
/// host environment when such a mount exists.
const UNIFIED_DIR: &str = "sync/dotfiles";

/// Host-local candidate, relative to home.
const HOST_LOCAL_DIR: &str = ".dotfiles";

/// Probe file used to verify the resolved directory is writable
const WRITE_PROBE: &str = ".rigup-write-probe";

/// Whether the canonical directory is shared across hosts or local to
/// this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationMode {
    Unified,
    HostLocal,
}

/// The resolved canonical configuration source.
#[derive(Debug, Clone)]
pub struct DotfilesLocation {
    pub root: PathBuf,
    pub mode: LocationMode,
}

impl DotfilesLocation {
    /// Absolute path of a payload inside the canonical directory.
    pub fn source_path(&self, source_rel: &str) -> PathBuf {
        self.root.join(source_rel)
    }
}

fn not_creatable(path: &Path, e: &std::io::Error) -> RigupError {
    RigupError::DotfilesNotCreatable {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

/// Verify the directory accepts writes by round-tripping a probe file.
fn verify_writable(root: &Path) -> Result<()> {
    let probe = root.join(WRITE_PROBE);
    let failed = std::fs::write(&probe, b"probe").is_err();
    let _ = std::fs::remove_file(&probe);
    if failed {
        return Err(RigupError::DotfilesNotWritable {
            path: root.display().to_string(),
        });
    }
    Ok(())
}

/// Canonicalize for stable comparisons; falls back to the given path when
/// canonicalization fails (e.g. exotic mounts).
fn canonical(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Resolve the dotfiles location.
///
/// Detection order: an explicit `RIGUP_DOTFILES` override, a pre-existing
/// unified directory, a pre-existing host-local directory. When none
/// exists, attended runs choose interactively and unattended runs default
/// to host-local; the chosen directory is then created.
pub fn resolve(ctx: &ExecutionContext, layout: &HomeLayout) -> Result<DotfilesLocation> {
    if let Ok(root) = std::env::var("RIGUP_DOTFILES") {
        let root = PathBuf::from(root);
        std::fs::create_dir_all(&root).map_err(|e| not_creatable(&root, &e))?;
        verify_writable(&root)?;
        return Ok(DotfilesLocation {
            root: canonical(&root),
            mode: LocationMode::HostLocal,
        });
    }

    let unified = layout.home.join(UNIFIED_DIR);
    let host_local = layout.home.join(HOST_LOCAL_DIR);

    let (root, mode) = if unified.is_dir() {
        (unified, LocationMode::Unified)
    } else if host_local.is_dir() {
        (host_local, LocationMode::HostLocal)
    } else {
        let share = ctx.confirm(
            "Share dotfiles across hosts (requires a sync mount under your home)?",
            false,
        )?;
        if share {
            (unified, LocationMode::Unified)
        } else {
            (host_local, LocationMode::HostLocal)
        }
    };

    std::fs::create_dir_all(&root).map_err(|e| not_creatable(&root, &e))?;
    verify_writable(&root)?;

    let location = DotfilesLocation {
        root: canonical(&root),
        mode,
    };

    // A unified location is reachable from other hosts and must be under
    // version control from the moment it exists
    if mode == LocationMode::Unified {
        git::ensure_repository(&location.root)?;
    }

    Ok(location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleanup::temp_dir_base;
    use crate::context::InteractionMode;

    fn unattended() -> ExecutionContext {
        ExecutionContext::new(InteractionMode::Unattended)
    }

    fn sandbox() -> (tempfile::TempDir, HomeLayout) {
        let temp = tempfile::TempDir::new_in(temp_dir_base()).unwrap();
        let layout = HomeLayout {
            home: temp.path().to_path_buf(),
        };
        (temp, layout)
    }

    #[test]
    fn test_unattended_defaults_to_host_local() {
        let (_temp, layout) = sandbox();
        let location = resolve(&unattended(), &layout).unwrap();
        assert_eq!(location.mode, LocationMode::HostLocal);
        assert!(location.root.is_dir());
        assert!(location.root.ends_with(HOST_LOCAL_DIR));
    }

    #[test]
    fn test_existing_unified_directory_is_detected() {
        let (_temp, layout) = sandbox();
        std::fs::create_dir_all(layout.home.join(UNIFIED_DIR)).unwrap();

        let location = resolve(&unattended(), &layout).unwrap();
        assert_eq!(location.mode, LocationMode::Unified);
    }

    #[test]
    fn test_unified_location_is_version_controlled() {
        let (_temp, layout) = sandbox();
        std::fs::create_dir_all(layout.home.join(UNIFIED_DIR)).unwrap();

        let location = resolve(&unattended(), &layout).unwrap();
        assert!(location.root.join(".git").exists());
    }

    #[test]
    fn test_existing_unified_wins_over_host_local() {
        let (_temp, layout) = sandbox();
        std::fs::create_dir_all(layout.home.join(UNIFIED_DIR)).unwrap();
        std::fs::create_dir_all(layout.home.join(HOST_LOCAL_DIR)).unwrap();

        let location = resolve(&unattended(), &layout).unwrap();
        assert_eq!(location.mode, LocationMode::Unified);
    }

    #[test]
    #[cfg(unix)]
    fn test_unwritable_directory_is_fatal() {
        use std::os::unix::fs::PermissionsExt;

        let (_temp, layout) = sandbox();
        let root = layout.home.join(HOST_LOCAL_DIR);
        std::fs::create_dir_all(&root).unwrap();
        std::fs::set_permissions(&root, std::fs::Permissions::from_mode(0o555)).unwrap();

        // A privileged user ignores mode bits; nothing to assert then
        if std::fs::write(root.join("privilege-check"), b"x").is_ok() {
            let _ = std::fs::remove_file(root.join("privilege-check"));
            return;
        }

        let result = resolve(&unattended(), &layout);
        // Restore permissions so the temp dir can be cleaned up
        std::fs::set_permissions(&root, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(
            result.unwrap_err(),
            RigupError::DotfilesNotWritable { .. }
        ));
    }

    #[test]
    fn test_source_path() {
        let location = DotfilesLocation {
            root: PathBuf::from("/home/user/.dotfiles"),
            mode: LocationMode::HostLocal,
        };
        assert_eq!(
            location.source_path("shell/bashrc"),
            PathBuf::from("/home/user/.dotfiles/shell/bashrc")
        );
    }
}
