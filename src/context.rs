//! Interaction mode controller
//!
//! The mode is decided exactly once at startup from the command line and is
//! immutable for the rest of the process, so re-runs of the whole pipeline
//! behave deterministically. Every component that could otherwise block on
//! user input goes through [`ExecutionContext::confirm`].

use inquire::Confirm;

use crate::error::Result;

/// How the run interacts with the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    /// Prompt before ambiguous or destructive choices
    Attended,
    /// Never block on input; every choice resolves to its default
    Unattended,
}

/// Process-wide execution context, constructed once at startup.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    mode: InteractionMode,
}

impl ExecutionContext {
    pub fn new(mode: InteractionMode) -> Self {
        Self { mode }
    }

    pub fn is_attended(&self) -> bool {
        self.mode == InteractionMode::Attended
    }

    /// Ask a yes/no question, or resolve to `default` without touching
    /// standard input when running unattended.
    pub fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        if !self.is_attended() {
            return Ok(default);
        }

        let answer = Confirm::new(prompt)
            .with_default(default)
            .with_help_message("Press Enter to accept the default")
            .prompt()?;
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unattended_confirm_returns_default_without_input() {
        let ctx = ExecutionContext::new(InteractionMode::Unattended);
        assert!(ctx.confirm("Install everything?", true).unwrap());
        assert!(!ctx.confirm("Destroy everything?", false).unwrap());
    }

    #[test]
    fn test_mode_query() {
        assert!(ExecutionContext::new(InteractionMode::Attended).is_attended());
        assert!(!ExecutionContext::new(InteractionMode::Unattended).is_attended());
    }
}
