//! Confirmation decision logic and the interactive yes/no prompt.
//!
//! The decision of whether a mutation needs confirming is a pure function so
//! it can be tested without I/O; the prompt itself sits behind [`Prompter`]
//! so handlers never touch a TTY in tests.

use anyhow::anyhow;
use dialoguer::Confirm;

use crate::client::{CliError, CliResult};

/// Whether a bulk mutation needs interactive confirmation: always when the
/// caller asked for a preview (`--check`), otherwise only when more than one
/// target path is affected.
pub(crate) const fn confirmation_required(target_count: usize, check: bool) -> bool {
    check || target_count > 1
}

/// Source of yes/no answers for destructive operations.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Prompter {
    /// Ask on the terminal via dialoguer.
    Interactive,
    /// Answer every question with a fixed value (tests, `--force`).
    Assume(bool),
}

impl Prompter {
    /// Ask a yes/no question, defaulting to "no".
    pub(crate) fn confirm(self, message: &str) -> CliResult<bool> {
        match self {
            Self::Assume(answer) => Ok(answer),
            Self::Interactive => Confirm::new()
                .with_prompt(message)
                .default(false)
                .interact()
                .map_err(|err| CliError::failure(anyhow!("failed to read confirmation: {err}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_target_without_check_needs_no_confirmation() {
        assert!(!confirmation_required(1, false));
        assert!(!confirmation_required(0, false));
    }

    #[test]
    fn multiple_targets_or_check_need_confirmation() {
        assert!(confirmation_required(2, false));
        assert!(confirmation_required(1, true));
    }

    #[test]
    fn assume_prompter_returns_fixed_answer() -> CliResult<()> {
        assert!(Prompter::Assume(true).confirm("continue?")?);
        assert!(!Prompter::Assume(false).confirm("continue?")?);
        Ok(())
    }
}
