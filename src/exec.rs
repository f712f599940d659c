//! External tool invocation
//!
//! Every external command goes through [`run_tool`], which returns an
//! explicit `{exit code, filtered output}` result. Filtering only ever drops
//! known-benign noise lines from stdout; the exit code is reported verbatim,
//! so a filtered run can never be mistaken for a successful one.

use std::process::{Command, Stdio};

use crate::context::ExecutionContext;
use crate::error::{Result, RigupError};

/// Stdout lines containing any of these markers are dropped as noise.
const NOISE_MARKERS: &[&str] = &[
    "is up to date -- skipping",
    "there is nothing to do",
    "warning: skipping target",
];

/// Result of one external tool invocation.
#[derive(Debug)]
pub struct ToolOutput {
    /// Exit code (-1 when the process was killed by a signal)
    pub code: i32,
    /// Retained stdout lines, noise removed (empty for attended runs,
    /// which inherit the terminal)
    pub lines: Vec<String>,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

fn is_noise(line: &str) -> bool {
    NOISE_MARKERS.iter().any(|marker| line.contains(marker))
}

/// Run an external tool to completion.
///
/// Attended runs inherit the terminal so the underlying tool can prompt.
/// Unattended runs get a closed stdin (nothing may block on input) and a
/// captured, noise-filtered stdout that is echoed line by line.
pub fn run_tool(program: &str, args: &[&str], ctx: &ExecutionContext) -> Result<ToolOutput> {
    let spawn_error = |e: std::io::Error| RigupError::ToolSpawnFailed {
        command: program.to_string(),
        reason: e.to_string(),
    };

    if ctx.is_attended() {
        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(spawn_error)?;
        return Ok(ToolOutput {
            code: status.code().unwrap_or(-1),
            lines: Vec::new(),
        });
    }

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .output()
        .map_err(spawn_error)?;

    let lines: Vec<String> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|line| !is_noise(line))
        .map(str::to_string)
        .collect();

    for line in &lines {
        println!("{line}");
    }

    Ok(ToolOutput {
        code: output.status.code().unwrap_or(-1),
        lines,
    })
}
