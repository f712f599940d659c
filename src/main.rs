//! rigup - idempotent development environment provisioner
//!
//! A single-binary tool that drives a fixed pipeline of idempotent steps:
//! package installation with mirror failover, dotfiles deployment with a
//! backup-then-link discipline, shell environment extension, and a git
//! snapshot of the canonical configuration.

use clap::Parser;

mod cleanup;
mod cli;
mod context;
mod dotfiles;
mod error;
mod exec;
mod paths;
mod pipeline;
mod pkg;
mod probe;
mod provisioner;
mod shellrc;
mod steps;

use cli::Cli;
use context::InteractionMode;
use pipeline::{Pipeline, Terminal};
use provisioner::Provisioner;

fn main() {
    let cli = Cli::parse();
    cleanup::install_interrupt_handler();

    let mode = if cli.attended {
        InteractionMode::Attended
    } else {
        InteractionMode::Unattended
    };

    let mut prov = match Provisioner::bootstrap(mode) {
        Ok(prov) => prov,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let report = Pipeline::new(steps::catalog()).run(&mut prov);
    pipeline::print_summary(&report);

    if report.terminal == Terminal::Aborted {
        std::process::exit(1);
    }
}
