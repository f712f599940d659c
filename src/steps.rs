//! The provisioning catalog
//!
//! The fixed, ordered step table the pipeline executes. Core toolchain,
//! layout, dotfiles resolution, shell configuration, and the snapshot
//! commit are Fatal; editor payloads, extra tools, and the provisioning
//! notes are WarnAndContinue. Payload content lives here as inert data:
//! the steps only apply it through the managed-link interface.

use std::path::PathBuf;

use crate::dotfiles::links::{self, LinkOutcome};
use crate::dotfiles::{git as gitops, DotfilesLocation};
use crate::error::Result;
use crate::pipeline::{FailurePolicy, Step, StepOutcome};
use crate::probe;
use crate::provisioner::Provisioner;
use crate::shellrc;

/// Core packages and the command that proves each is present.
const CORE_PACKAGES: &[(&str, &str)] = &[("git", "git"), ("curl", "curl"), ("openssh", "ssh")];

/// Optional convenience packages, same shape.
const EXTRA_PACKAGES: &[(&str, &str)] = &[("ripgrep", "rg"), ("fzf", "fzf"), ("bat", "bat")];

/// Lines appended (once) to the shell profile.
const PROFILE_LINES: &[&str] = &[
    "export PATH=\"$HOME/bin:$PATH\"",
    "command -v fzf >/dev/null 2>&1 && export FZF_DEFAULT_COMMAND='rg --files'",
];

const BASHRC_SEED: &str = "\
# Managed by rigup; edit here, not in $HOME.
alias ll='ls -lah'
alias g=git
export EDITOR=vim
";

const VIMRC_SEED: &str = "\
\" Managed by rigup; edit here, not in $HOME.
set nocompatible
set hidden
syntax on
";

/// The full step table, in execution order.
pub fn catalog() -> Vec<Step> {
    vec![
        Step {
            name: "preflight",
            title: "Checking preconditions",
            policy: FailurePolicy::Fatal,
            run: preflight,
        },
        Step {
            name: "workspace-layout",
            title: "Creating home directory layout",
            policy: FailurePolicy::Fatal,
            run: workspace_layout,
        },
        Step {
            name: "resolve-dotfiles",
            title: "Resolving dotfiles location",
            policy: FailurePolicy::Fatal,
            run: resolve_dotfiles,
        },
        Step {
            name: "core-packages",
            title: "Installing core toolchain",
            policy: FailurePolicy::Fatal,
            run: core_packages,
        },
        Step {
            name: "shell-config",
            title: "Deploying shell configuration",
            policy: FailurePolicy::Fatal,
            run: shell_config,
        },
        Step {
            name: "editor-config",
            title: "Deploying editor configuration",
            policy: FailurePolicy::WarnAndContinue,
            run: editor_config,
        },
        Step {
            name: "extra-tools",
            title: "Installing extra tools",
            policy: FailurePolicy::WarnAndContinue,
            run: extra_tools,
        },
        Step {
            name: "dotfiles-snapshot",
            title: "Committing dotfiles snapshot",
            policy: FailurePolicy::Fatal,
            run: dotfiles_snapshot,
        },
        Step {
            name: "provision-notes",
            title: "Writing provisioning notes",
            policy: FailurePolicy::WarnAndContinue,
            run: provision_notes,
        },
    ]
}

/// Preconditions that cannot be retried meaningfully: a writable home and
/// a present package manager. A dead network is not probed here; it
/// surfaces through the installer's own retry loop.
fn preflight(prov: &mut Provisioner) -> Result<StepOutcome> {
    let home = &prov.layout.home;
    std::fs::create_dir_all(home).map_err(|e| crate::error::RigupError::HomeNotWritable {
        path: home.display().to_string(),
        reason: e.to_string(),
    })?;

    let probe_file = home.join(".rigup-write-probe");
    let write_result = std::fs::write(&probe_file, b"probe");
    let _ = std::fs::remove_file(&probe_file);
    write_result.map_err(|e| crate::error::RigupError::HomeNotWritable {
        path: home.display().to_string(),
        reason: e.to_string(),
    })?;

    if !probe::command_exists(prov.pkg.command()) {
        return Err(crate::error::RigupError::PackageManagerMissing {
            command: prov.pkg.command().to_string(),
        });
    }

    Ok(StepOutcome::Done)
}

fn workspace_layout(prov: &mut Provisioner) -> Result<StepOutcome> {
    let dirs = prov.layout.subdirectories();
    let already = dirs.iter().all(|d| probe::path_present(d));

    for dir in &dirs {
        std::fs::create_dir_all(dir).map_err(|e| crate::error::RigupError::FileWriteFailed {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;
    }

    if already {
        Ok(StepOutcome::Skipped("layout already present".to_string()))
    } else {
        Ok(StepOutcome::Done)
    }
}

fn resolve_dotfiles(prov: &mut Provisioner) -> Result<StepOutcome> {
    let location = prov.dotfiles()?;
    let mode = location.mode;
    let root = location.root.display().to_string();
    println!("Dotfiles: {root} ({mode:?})");
    Ok(StepOutcome::Done)
}

fn missing_packages(packages: &'static [(&'static str, &'static str)]) -> Vec<&'static str> {
    packages
        .iter()
        .filter(|(_, command)| !probe::command_exists(command))
        .map(|(package, _)| *package)
        .collect()
}

fn core_packages(prov: &mut Provisioner) -> Result<StepOutcome> {
    let missing = missing_packages(CORE_PACKAGES);
    if missing.is_empty() {
        return Ok(StepOutcome::Skipped("core toolchain present".to_string()));
    }
    prov.pkg.install(&prov.ctx, &missing, "core toolchain")?;
    Ok(StepOutcome::Done)
}

fn extra_tools(prov: &mut Provisioner) -> Result<StepOutcome> {
    let missing = missing_packages(EXTRA_PACKAGES);
    if missing.is_empty() {
        return Ok(StepOutcome::Skipped("extra tools present".to_string()));
    }
    prov.pkg.install(&prov.ctx, &missing, "extra tools")?;
    Ok(StepOutcome::Done)
}

fn shell_config(prov: &mut Provisioner) -> Result<StepOutcome> {
    let location = prov.dotfiles()?.clone();
    let home = prov.layout.home.clone();
    let profile = prov.layout.profile();

    let mut changed = false;

    let bashrc = home.join(".bashrc");
    let outcome = links::ensure_managed(&location, &bashrc, "shell/bashrc", BASHRC_SEED)?;
    changed |= outcome != LinkOutcome::AlreadyLinked;
    prov.manifest.record_file(&location, &bashrc, "shell/bashrc")?;

    for line in PROFILE_LINES {
        changed |= shellrc::append_line_once(&profile, line)?;
    }

    if changed {
        Ok(StepOutcome::Done)
    } else {
        Ok(StepOutcome::Skipped("shell already configured".to_string()))
    }
}

fn editor_config(prov: &mut Provisioner) -> Result<StepOutcome> {
    let location = prov.dotfiles()?.clone();
    let home = prov.layout.home.clone();

    let mut changed = false;

    let vimrc = home.join(".vimrc");
    let outcome = links::ensure_managed(&location, &vimrc, "vim/vimrc", VIMRC_SEED)?;
    changed |= outcome != LinkOutcome::AlreadyLinked;
    prov.manifest.record_file(&location, &vimrc, "vim/vimrc")?;

    let nvim_dir = prov.layout.config().join("nvim");
    let outcome = links::ensure_managed_dir(&location, &nvim_dir, "nvim")?;
    changed |= outcome != LinkOutcome::AlreadyLinked;
    prov.manifest.record_dir(&nvim_dir, "nvim");

    if changed {
        Ok(StepOutcome::Done)
    } else {
        Ok(StepOutcome::Skipped("editor already configured".to_string()))
    }
}

fn dotfiles_snapshot(prov: &mut Provisioner) -> Result<StepOutcome> {
    let location: DotfilesLocation = prov.dotfiles()?.clone();
    prov.manifest.save(&location)?;

    let repo = gitops::ensure_repository(&location.root)?;
    // Identity is a precondition: checked before anything is staged
    let sig = gitops::identity(&repo)?;

    if !gitops::commit_all(&repo, &sig, "rigup: provisioning snapshot")? {
        return Ok(StepOutcome::Skipped("nothing to commit".to_string()));
    }

    match gitops::push_origin(&repo) {
        Ok(_) => Ok(StepOutcome::Done),
        Err(e) => Ok(StepOutcome::Warned(format!("snapshot push failed: {e}"))),
    }
}

fn provision_notes(prov: &mut Provisioner) -> Result<StepOutcome> {
    let notes_path: PathBuf = prov.layout.docs().join("provisioning.md");

    let mut entries: Vec<String> = prov
        .manifest
        .links
        .iter()
        .map(|link| format!("- `{}` -> `{}`", link.target, link.source))
        .collect();
    entries.sort();

    let content = format!(
        "# Provisioned by rigup\n\n\
         Managed links:\n\n{}\n\n\
         Re-run `rigup` any time; satisfied steps are skipped.\n",
        entries.join("\n")
    );

    let current = std::fs::read_to_string(&notes_path).unwrap_or_default();
    if current == content {
        return Ok(StepOutcome::Skipped("notes up to date".to_string()));
    }

    std::fs::write(&notes_path, content).map_err(|e| crate::error::RigupError::FileWriteFailed {
        path: notes_path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(StepOutcome::Done)
}
