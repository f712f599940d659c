//! Idempotent shell startup file appends
//!
//! PATH extensions and tool init hooks are appended to the user's shell
//! startup files guarded by an "is this line already present" check, so
//! re-running the pipeline never duplicates entries.

use std::path::Path;

use crate::error::{Result, RigupError};

fn read_error(path: &Path, e: std::io::Error) -> RigupError {
    RigupError::FileReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

fn write_error(path: &Path, e: std::io::Error) -> RigupError {
    RigupError::FileWriteFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

/// Append `line` to `file` unless an identical line (trim-compared) is
/// already present. Creates the file if missing. Returns whether the file
/// was modified.
pub fn append_line_once(file: &Path, line: &str) -> Result<bool> {
    let existing = match std::fs::read_to_string(file) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(read_error(file, e)),
    };

    if existing.lines().any(|l| l.trim() == line.trim()) {
        return Ok(false);
    }

    let mut content = existing;
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(line);
    content.push('\n');

    std::fs::write(file, content).map_err(|e| write_error(file, e))?;
    Ok(true)
}
