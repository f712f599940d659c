//! CLI definitions using clap derive API
//!
//! The surface is deliberately tiny: one flag switches the interaction
//! mode, `--help` prints usage, and anything unrecognized exits non-zero
//! with a usage message.

use clap::Parser;
use clap::builder::{Styles, styling::AnsiColor};

/// rigup - idempotent development environment provisioner
///
/// Runs a fixed pipeline of installation and configuration steps against
/// this host. Safe to re-run: satisfied steps are skipped or refreshed.
#[derive(Parser, Debug)]
#[command(
    name = "rigup",
    author,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Idempotent development environment provisioner",
    long_about = "rigup provisions a development environment onto this host: core packages \
                  (with mirror failover), a canonical dotfiles directory with backed-up \
                  symlinks, shell PATH extensions, and a git snapshot of the result. \
                  Every step is idempotent, so re-running is always safe.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  rigup             \x1b[90m# Unattended run: defaults, no prompts\x1b[0m\n   \
                  rigup --attended  \x1b[90m# Prompt on choices and before risky continues\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Prompt interactively instead of auto-selecting defaults
    #[arg(long, short = 'a')]
    pub attended: bool,
}
