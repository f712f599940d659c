//! Managed links: backup-then-link discipline
//!
//! A managed target always resolves to its canonical source inside the
//! dotfiles directory. Pre-existing content is renamed aside with a
//! timestamped suffix, never deleted, and the link itself is created
//! through a temporary name plus rename so an interrupt cannot leave the
//! target in a state where the data is neither backed up nor linked.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use normpath::PathExt;

use crate::cleanup;
use crate::dotfiles::DotfilesLocation;
use crate::error::{Result, RigupError};

/// What `ensure_managed` did to reach the managed state.
#[derive(Debug, PartialEq, Eq)]
pub enum LinkOutcome {
    /// Target already pointed at the canonical source
    AlreadyLinked,
    /// Target did not exist; link created
    Created,
    /// Pre-existing content was renamed aside before linking
    BackedUp(PathBuf),
}

fn link_error(target: &Path, e: std::io::Error) -> RigupError {
    RigupError::LinkFailed {
        target: target.display().to_string(),
        reason: e.to_string(),
    }
}

fn write_error(path: &Path, e: std::io::Error) -> RigupError {
    RigupError::FileWriteFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

/// Ensure parent directory exists for a path
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| write_error(parent, e))?;
    }
    Ok(())
}

/// Timestamped backup path next to the target; bumps the suffix until it
/// names nothing, so repeated backups within one millisecond still never
/// overwrite each other.
fn backup_path(target: &Path) -> PathBuf {
    let mut ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    loop {
        let candidate = PathBuf::from(format!("{}.backup.{ts}", target.display()));
        if !candidate.exists() {
            return candidate;
        }
        ts += 1;
    }
}

/// True when `target` is a link that already resolves to `source`.
fn points_at(target: &Path, source: &Path) -> bool {
    let Ok(meta) = std::fs::symlink_metadata(target) else {
        return false;
    };
    if !meta.file_type().is_symlink() {
        return false;
    }
    let Ok(dest) = std::fs::read_link(target) else {
        return false;
    };
    if dest == source {
        return true;
    }
    // Follow both through mounts/relative segments before giving up
    match (dest.normalize(), source.normalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(unix)]
fn symlink(source: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(source, link)
}

#[cfg(windows)]
fn symlink(source: &Path, link: &Path) -> std::io::Result<()> {
    if source.is_dir() {
        std::os::windows::fs::symlink_dir(source, link)
    } else {
        std::os::windows::fs::symlink_file(source, link)
    }
}

/// Create the link atomically: symlink under a temporary name in the
/// target's parent, then rename over the final name.
fn atomic_symlink(source: &Path, target: &Path) -> Result<()> {
    let file_name = target
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("link");
    let parent = target.parent().unwrap_or_else(|| Path::new("."));
    let tmp = parent.join(format!(".{file_name}.rigup-tmp"));

    let _ = std::fs::remove_file(&tmp);
    cleanup::register_transient(&tmp);
    symlink(source, &tmp).map_err(|e| link_error(target, e))?;
    let renamed = std::fs::rename(&tmp, target);
    cleanup::clear_transient(&tmp);
    renamed.map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        link_error(target, e)
    })
}

/// Move pre-existing content aside. Rename only, never delete.
fn back_up(target: &Path) -> Result<PathBuf> {
    let backup = backup_path(target);
    std::fs::rename(target, &backup).map_err(|e| RigupError::BackupFailed {
        target: target.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(backup)
}

/// Ensure `target` is a link to `source_rel` inside the dotfiles location,
/// seeding the source with `content` when it does not exist yet.
///
/// Running this twice in a row produces the same end state with no new
/// backups on the second run.
pub fn ensure_managed(
    location: &DotfilesLocation,
    target: &Path,
    source_rel: &str,
    content: &str,
) -> Result<LinkOutcome> {
    let source = location.source_path(source_rel);

    if !source.exists() {
        ensure_parent_dir(&source)?;
        std::fs::write(&source, content).map_err(|e| write_error(&source, e))?;
    }

    if points_at(target, &source) {
        return Ok(LinkOutcome::AlreadyLinked);
    }

    ensure_parent_dir(target)?;

    let pre_existing = std::fs::symlink_metadata(target).is_ok();
    let backup = if pre_existing {
        Some(back_up(target)?)
    } else {
        None
    };

    atomic_symlink(&source, target)?;

    Ok(match backup {
        Some(path) => LinkOutcome::BackedUp(path),
        None => LinkOutcome::Created,
    })
}

/// Directory variant of [`ensure_managed`].
///
/// When the source directory does not exist yet and the target is a real
/// directory, the target's contents are copied into the source first, so
/// the canonical copy starts from what the host already had.
pub fn ensure_managed_dir(
    location: &DotfilesLocation,
    target: &Path,
    source_rel: &str,
) -> Result<LinkOutcome> {
    let source = location.source_path(source_rel);

    if !source.exists() {
        let target_meta = std::fs::symlink_metadata(target);
        let target_is_real_dir = target_meta
            .map(|m| m.file_type().is_dir())
            .unwrap_or(false);
        if target_is_real_dir {
            copy_dir(target, &source)?;
        } else {
            std::fs::create_dir_all(&source).map_err(|e| write_error(&source, e))?;
        }
    }

    if points_at(target, &source) {
        return Ok(LinkOutcome::AlreadyLinked);
    }

    ensure_parent_dir(target)?;

    let pre_existing = std::fs::symlink_metadata(target).is_ok();
    let backup = if pre_existing {
        Some(back_up(target)?)
    } else {
        None
    };

    atomic_symlink(&source, target)?;

    Ok(match backup {
        Some(path) => LinkOutcome::BackedUp(path),
        None => LinkOutcome::Created,
    })
}

/// Copy a directory tree into `dest` (which must not exist yet).
fn copy_dir(src: &Path, dest: &Path) -> Result<()> {
    for entry in walkdir::WalkDir::new(src) {
        let entry = entry.map_err(|e| RigupError::IoError {
            message: e.to_string(),
        })?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| RigupError::IoError {
                message: e.to_string(),
            })?;
        let out = dest.join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&out).map_err(|e| write_error(&out, e))?;
        } else {
            ensure_parent_dir(&out)?;
            std::fs::copy(entry.path(), &out).map_err(|e| write_error(&out, e))?;
        }
    }
    Ok(())
}
