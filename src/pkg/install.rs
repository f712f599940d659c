//! Retrying installer
//!
//! Wraps a single package-manager invocation with a bounded retry loop.
//! Each failed attempt advances the mirror registry, rewrites the endpoint
//! configuration, forces an index refresh, pauses for a fixed delay, and
//! tries again. The installer reports exhaustion to its caller; it never
//! terminates the process itself.

use std::time::Duration;

use crate::context::ExecutionContext;
use crate::error::{Result, RigupError};
use crate::exec;
use crate::pkg::MirrorRegistry;

/// Upper bound on install attempts for one package set
const MAX_ATTEMPTS: u32 = 3;

/// Fixed pause between attempts. Deterministic by design: no exponential
/// growth, no jitter.
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Default package manager command
const DEFAULT_COMMAND: &str = "pacman";

/// The external package manager plus the mirror registry it escalates
/// through on failure.
#[derive(Debug)]
pub struct PackageManager {
    command: String,
    registry: MirrorRegistry,
}

impl PackageManager {
    /// Package manager from the environment: `RIGUP_PKG` overrides the
    /// command (integration tests point this at a stub).
    pub fn from_env() -> Self {
        let command = std::env::var("RIGUP_PKG").unwrap_or_else(|_| DEFAULT_COMMAND.to_string());
        Self {
            command,
            registry: MirrorRegistry::from_env(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Install flags for the current interaction mode. Unattended runs get
    /// the auto-confirm flag so no provider prompt can block the pipeline.
    fn install_args<'a>(&self, ctx: &ExecutionContext, packages: &[&'a str]) -> Vec<&'a str> {
        let mut args = vec!["-S", "--needed"];
        if !ctx.is_attended() {
            args.push("--noconfirm");
        }
        args.extend_from_slice(packages);
        args
    }

    /// Install `packages`, described as `what` in diagnostics.
    ///
    /// Exit status of the underlying tool is the sole success signal; its
    /// stdout is only filtered for known noise.
    pub fn install(&mut self, ctx: &ExecutionContext, packages: &[&str], what: &str) -> Result<()> {
        let mut attempts = 0;

        loop {
            attempts += 1;
            let args = self.install_args(ctx, packages);
            let output = exec::run_tool(&self.command, &args, ctx)?;
            if output.success() {
                return Ok(());
            }

            if attempts >= MAX_ATTEMPTS || !self.registry.advance() {
                return Err(RigupError::PackageInstallFailed {
                    what: what.to_string(),
                    attempts,
                });
            }

            eprintln!(
                "Install of {what} failed; retrying via '{}' mirrors",
                self.registry.active().name
            );
            self.registry.write_endpoint_config()?;
            self.refresh_index(ctx);
            std::thread::sleep(RETRY_DELAY);
        }
    }

    /// Force a package index refresh against the newly-activated tier.
    /// A failed refresh is not an error of its own: the next install
    /// attempt surfaces it.
    fn refresh_index(&self, ctx: &ExecutionContext) {
        let mut args = vec!["-Syy"];
        if !ctx.is_attended() {
            args.push("--noconfirm");
        }
        let _ = exec::run_tool(&self.command, &args, ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleanup::temp_dir_base;
    use crate::context::InteractionMode;
    use crate::pkg::mirrors::MirrorTier;
    use std::path::PathBuf;

    fn unattended() -> ExecutionContext {
        ExecutionContext::new(InteractionMode::Unattended)
    }

    /// Write an executable stub that exits with `code` and logs each
    /// invocation's arguments to `log`.
    #[cfg(unix)]
    fn write_stub(dir: &std::path::Path, code: i32, log: &std::path::Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let stub = dir.join("pkgstub");
        std::fs::write(
            &stub,
            format!("#!/bin/sh\necho \"$@\" >> {}\nexit {code}\n", log.display()),
        )
        .unwrap();
        std::fs::set_permissions(&stub, std::fs::Permissions::from_mode(0o755)).unwrap();
        stub
    }

    fn manager_with(stub: PathBuf, tiers: Vec<MirrorTier>, mirrorlist: PathBuf) -> PackageManager {
        PackageManager {
            command: stub.display().to_string(),
            registry: MirrorRegistry::new(tiers, mirrorlist),
        }
    }

    fn three_tiers() -> Vec<MirrorTier> {
        vec![
            MirrorTier {
                name: "optimized",
                endpoints: &["https://fast.example/$repo"],
            },
            MirrorTier {
                name: "curated",
                endpoints: &["https://stable.example/$repo"],
            },
            MirrorTier {
                name: "emergency",
                endpoints: &["https://archive.example/$repo"],
            },
        ]
    }

    #[test]
    fn test_unattended_args_include_noconfirm() {
        let pm = PackageManager {
            command: "pacman".to_string(),
            registry: MirrorRegistry::new(three_tiers(), PathBuf::from("/dev/null")),
        };
        let args = pm.install_args(&unattended(), &["git", "curl"]);
        assert_eq!(args, vec!["-S", "--needed", "--noconfirm", "git", "curl"]);

        let attended = ExecutionContext::new(InteractionMode::Attended);
        let args = pm.install_args(&attended, &["git"]);
        assert_eq!(args, vec!["-S", "--needed", "git"]);
    }

    #[test]
    #[cfg(unix)]
    fn test_install_succeeds_first_try_without_touching_mirrors() {
        let temp = tempfile::TempDir::new_in(temp_dir_base()).unwrap();
        let log = temp.path().join("invocations.log");
        let stub = write_stub(temp.path(), 0, &log);
        let mirrorlist = temp.path().join("mirrorlist");
        let mut pm = manager_with(stub, three_tiers(), mirrorlist.clone());

        pm.install(&unattended(), &["git"], "core toolchain").unwrap();

        // One invocation, and the endpoint file was never rewritten
        assert_eq!(std::fs::read_to_string(&log).unwrap().lines().count(), 1);
        assert!(!mirrorlist.exists());
    }

    #[test]
    #[cfg(unix)]
    fn test_exhaustion_terminates_with_fatal_outcome() {
        let temp = tempfile::TempDir::new_in(temp_dir_base()).unwrap();
        let log = temp.path().join("invocations.log");
        let stub = write_stub(temp.path(), 1, &log);
        let mirrorlist = temp.path().join("mirrorlist");
        let mut pm = manager_with(stub, three_tiers(), mirrorlist.clone());

        let err = pm
            .install(&unattended(), &["git"], "core toolchain")
            .unwrap_err();

        assert!(matches!(
            err,
            RigupError::PackageInstallFailed { attempts: 3, .. }
        ));
        // Install attempts plus index refreshes, all bounded
        let invocations = std::fs::read_to_string(&log).unwrap().lines().count();
        assert_eq!(invocations, 5); // 3 installs + 2 refreshes

        // The last tier written before exhaustion is the emergency one
        let content = std::fs::read_to_string(&mirrorlist).unwrap();
        assert!(content.contains("emergency"));
    }

    #[test]
    #[cfg(unix)]
    fn test_two_tier_registry_exhausts_before_attempt_bound() {
        let temp = tempfile::TempDir::new_in(temp_dir_base()).unwrap();
        let log = temp.path().join("invocations.log");
        let stub = write_stub(temp.path(), 1, &log);
        let tiers = three_tiers().into_iter().take(2).collect();
        let mut pm = manager_with(stub, tiers, temp.path().join("mirrorlist"));

        let err = pm.install(&unattended(), &["git"], "extras").unwrap_err();
        assert!(matches!(
            err,
            RigupError::PackageInstallFailed { attempts: 2, .. }
        ));
    }
}
