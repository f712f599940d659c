//! Step pipeline runner
//!
//! Executes a fixed, ordered list of named steps. Each step is idempotent
//! and independently fallible; its declared failure policy decides whether
//! a failure aborts the run or is collected as a warning. A step failure
//! with Fatal policy offers a continue-anyway prompt in attended mode and
//! aborts immediately in unattended mode.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::Result;
use crate::provisioner::Provisioner;

/// What a step failure means for the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    Fatal,
    WarnAndContinue,
}

/// Successful step results.
#[derive(Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step did work
    Done,
    /// The host already satisfied the step
    Skipped(String),
    /// The step finished but something is worth surfacing in the summary
    Warned(String),
}

/// Per-step execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Pending,
    Running,
    Succeeded,
    Skipped,
    Warned,
    Failed,
}

pub type StepFn = fn(&mut Provisioner) -> Result<StepOutcome>;

/// One named, idempotent unit of provisioning work.
pub struct Step {
    pub name: &'static str,
    pub title: &'static str,
    pub policy: FailurePolicy,
    pub run: StepFn,
}

/// Terminal state of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Completed,
    Aborted,
}

/// Everything the run produced, for the end-of-run summary and exit code.
#[derive(Debug)]
pub struct PipelineReport {
    pub statuses: Vec<(&'static str, StepStatus)>,
    pub warnings: Vec<String>,
    pub terminal: Terminal,
}

/// The ordered step list, executed top to bottom.
pub struct Pipeline {
    steps: Vec<Step>,
}

impl Pipeline {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// Run every step in declared order. No step begins before the
    /// previous one reaches a terminal state.
    pub fn run(&self, prov: &mut Provisioner) -> PipelineReport {
        let bar_style = ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-");
        let bar = ProgressBar::new(self.steps.len() as u64);
        bar.set_style(bar_style);

        let mut statuses: Vec<(&'static str, StepStatus)> =
            self.steps.iter().map(|s| (s.name, StepStatus::Pending)).collect();
        let mut warnings = Vec::new();
        let mut terminal = Terminal::Completed;

        for (idx, step) in self.steps.iter().enumerate() {
            statuses[idx].1 = StepStatus::Running;
            bar.set_message(step.title);

            let status = match (step.run)(prov) {
                Ok(StepOutcome::Done) => {
                    bar.println(format!("{} {}", style("✓").green(), step.title));
                    StepStatus::Succeeded
                }
                Ok(StepOutcome::Skipped(reason)) => {
                    bar.println(format!(
                        "{} {} ({})",
                        style("-").dim(),
                        style(step.title).dim(),
                        reason
                    ));
                    StepStatus::Skipped
                }
                Ok(StepOutcome::Warned(message)) => {
                    bar.println(format!("{} {}", style("!").yellow(), step.title));
                    warnings.push(format!("{}: {message}", step.name));
                    StepStatus::Warned
                }
                Err(e) => {
                    bar.println(format!(
                        "{} {}: {e}",
                        style("✗").red(),
                        style(step.title).red()
                    ));

                    match step.policy {
                        FailurePolicy::WarnAndContinue => {
                            warnings.push(format!("{}: {e}", step.name));
                            StepStatus::Failed
                        }
                        FailurePolicy::Fatal => {
                            // Attended runs get a chance to keep going;
                            // unattended runs abort immediately
                            let proceed = prov
                                .ctx
                                .confirm("A required step failed. Continue anyway?", false)
                                .unwrap_or(false);
                            if proceed {
                                warnings.push(format!("{} (continued past failure): {e}", step.name));
                                StepStatus::Failed
                            } else {
                                statuses[idx].1 = StepStatus::Failed;
                                terminal = Terminal::Aborted;
                                bar.abandon();
                                break;
                            }
                        }
                    }
                }
            };

            statuses[idx].1 = status;
            bar.inc(1);
        }

        if terminal == Terminal::Completed {
            bar.finish_and_clear();
        }

        PipelineReport {
            statuses,
            warnings,
            terminal,
        }
    }
}

/// Print the end-of-run summary: accumulated warnings, then the terminal
/// state.
pub fn print_summary(report: &PipelineReport) {
    println!();
    if !report.warnings.is_empty() {
        println!("{}", style("Warnings:").yellow().bold());
        for warning in &report.warnings {
            println!("  {} {warning}", style("!").yellow());
        }
        println!();
    }

    match report.terminal {
        Terminal::Completed => {
            let done = report
                .statuses
                .iter()
                .filter(|(_, s)| *s != StepStatus::Pending)
                .count();
            println!(
                "{} {done} step(s) finished, {} warning(s)",
                style("Provisioning complete.").green().bold(),
                report.warnings.len()
            );
        }
        Terminal::Aborted => {
            // The aborting step is the most recent failure; any earlier
            // Failed entries were continued past
            let failed = report
                .statuses
                .iter()
                .rev()
                .find(|(_, s)| *s == StepStatus::Failed)
                .map(|(name, _)| *name)
                .unwrap_or("unknown");
            println!(
                "{} step '{failed}' failed; remaining steps were not run",
                style("Provisioning aborted:").red().bold()
            );
        }
    }
}
