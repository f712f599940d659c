//! Interrupt handling and transient state cleanup
//!
//! Steps register any temporary working paths they create; the interrupt
//! handler removes them synchronously before the process exits, restores the
//! terminal cursor, and exits with the conventional SIGINT code. Only temp
//! state is interrupt-safe; partially-applied configuration is left for the
//! next (idempotent) run to finish.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use console::Term;

static TRANSIENT: Mutex<Vec<PathBuf>> = Mutex::new(Vec::new());

/// Exit code for an interrupted run (128 + SIGINT)
const INTERRUPT_EXIT_CODE: i32 = 130;

fn transient_paths() -> std::sync::MutexGuard<'static, Vec<PathBuf>> {
    TRANSIENT.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Register a temporary path to be removed if the run is interrupted.
pub fn register_transient(path: &Path) {
    transient_paths().push(path.to_path_buf());
}

/// Unregister a path once it has been finalized or removed normally.
pub fn clear_transient(path: &Path) {
    transient_paths().retain(|p| p != path);
}

/// Remove every registered transient path. Missing paths are fine.
pub fn remove_registered() {
    let paths = std::mem::take(&mut *transient_paths());
    for path in paths {
        if path.is_dir() {
            let _ = std::fs::remove_dir_all(&path);
        } else {
            let _ = std::fs::remove_file(&path);
        }
    }
}

/// Install the process-wide SIGINT handler.
///
/// Failure to install is reported but not fatal: the run can proceed, it
/// just loses interrupt-time cleanup.
pub fn install_interrupt_handler() {
    let result = ctrlc::set_handler(|| {
        remove_registered();
        let _ = Term::stdout().show_cursor();
        eprintln!("\nInterrupted; transient files removed.");
        std::process::exit(INTERRUPT_EXIT_CODE);
    });

    if result.is_err() {
        eprintln!("Warning: could not install interrupt handler");
    }
}

/// Returns an absolute directory for creating temporary files, so temp state
/// is never created under the current working directory (e.g. when
/// TMPDIR=tmp and cwd is the provisioned checkout).
pub fn temp_dir_base() -> PathBuf {
    let t = std::env::temp_dir();
    if t.is_absolute() {
        t
    } else {
        #[cfg(windows)]
        {
            std::env::var("TEMP")
                .or_else(|_| std::env::var("TMP"))
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("C:\\Windows\\Temp"))
        }
        #[cfg(not(windows))]
        {
            PathBuf::from("/tmp")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_registered_cleans_files_and_dirs() {
        let temp = tempfile::TempDir::new_in(temp_dir_base()).unwrap();
        let file = temp.path().join("partial.download");
        let dir = temp.path().join("extract");
        std::fs::write(&file, "partial").unwrap();
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join("inner"), "x").unwrap();

        register_transient(&file);
        register_transient(&dir);
        remove_registered();

        assert!(!file.exists());
        assert!(!dir.exists());
    }

    #[test]
    fn test_clear_transient_spares_path() {
        let temp = tempfile::TempDir::new_in(temp_dir_base()).unwrap();
        let keep = temp.path().join("finalized");
        std::fs::write(&keep, "done").unwrap();

        register_transient(&keep);
        clear_transient(&keep);
        remove_registered();

        assert!(keep.exists());
    }

    #[test]
    fn test_temp_dir_base_is_absolute() {
        assert!(temp_dir_base().is_absolute());
    }
}
