use std::time::Duration;

use dialoguer::{theme::ColorfulTheme, MultiSelect};
use eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use inspire::{select::Selector, Error, ErrorKind};

/// Asks the user on the terminal, one page of records at a time.
pub struct TerminalSelector {
    page_size: usize,
}

impl TerminalSelector {
    pub const fn new(page_size: usize) -> Self {
        Self { page_size }
    }
}

impl Selector for TerminalSelector {
    fn present(&mut self, labels: &[String]) -> Result<Option<Vec<usize>>, Error> {
        MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt("Select records (space to toggle, enter to confirm, esc to cancel)")
            .items(labels)
            .max_length(self.page_size)
            .interact_opt()
            .map_err(|e| Error::wrap_with(ErrorKind::Io, e, "Record selection cancelled"))
    }
}

/// A spinner on stderr showing `message`, hidden when `quiet`.
pub fn spinner(message: &str, quiet: bool) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner:.blue} {msg}")?);
    spinner.set_message(message.to_owned());
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

/// A progress bar on stderr over `len` steps, hidden when `quiet`.
pub fn progress_bar(len: u64, quiet: bool) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }

    let bar = ProgressBar::new(len);
    bar.set_style(ProgressStyle::with_template(
        "{bar:40.blue} {pos}/{len} ({eta}) {msg}",
    )?);
    Ok(bar)
}
