//! Interactive prompts behind a trait so command flows can be driven in tests.

use anyhow::{anyhow, Result};
use inquire::{Confirm, MultiSelect, Select};
use std::io::IsTerminal;

#[cfg(test)]
use mockall::automock;

/// Asks the user to pick or confirm. Indices refer to the `options` slice.
#[cfg_attr(test, automock)]
pub trait Prompter {
    /// Pick any number of options; `defaults` start checked.
    fn multi_select(&self, message: &str, options: &[String], defaults: &[usize])
        -> Result<Vec<usize>>;

    /// Pick exactly one option, starting at `default`.
    fn select(&self, message: &str, options: &[String], default: usize) -> Result<usize>;

    /// Yes or no.
    fn confirm(&self, message: &str, default: bool) -> Result<bool>;
}

/// Terminal prompts via `inquire`. Fails when stdout is not a TTY.
#[derive(Debug, Default, Clone, Copy)]
pub struct InquirePrompter;

fn require_tty() -> Result<()> {
    if !std::io::stdout().is_terminal() {
        return Err(anyhow!(
            "interactive selection requires a TTY; pass component names as arguments"
        ));
    }
    Ok(())
}

impl Prompter for InquirePrompter {
    fn multi_select(
        &self,
        message: &str,
        options: &[String],
        defaults: &[usize],
    ) -> Result<Vec<usize>> {
        require_tty()?;
        let picked = MultiSelect::new(message, options.to_vec())
            .with_default(defaults)
            .with_page_size(15)
            .raw_prompt()?;
        Ok(picked.into_iter().map(|o| o.index).collect())
    }

    fn select(&self, message: &str, options: &[String], default: usize) -> Result<usize> {
        require_tty()?;
        let picked = Select::new(message, options.to_vec())
            .with_starting_cursor(default)
            .raw_prompt()?;
        Ok(picked.index)
    }

    fn confirm(&self, message: &str, default: bool) -> Result<bool> {
        require_tty()?;
        Ok(Confirm::new(message).with_default(default).prompt()?)
    }
}
